//! Dimension extraction from free-form prompts.

use super::patterns::{
    self, build, Scanner, Taken, CHAMFER_AFTER, CHAMFER_FIRST, CUBE, FILLET_AFTER, FILLET_FIRST,
    FIT_CODE, HOLE_COUNT_SPELLED, HOLE_COUNT_TIMES, HOLE_COUNT_WORD, HOLE_DIAMETER_AFTER,
    HOLE_DIAMETER_FIRST, LONG_NOUN, PAIR, ROUND_NOUN, THREAD, TOLERANCE_SIGN, TOLERANCE_WORD,
    TRIPLE,
};
use crate::config::{round_mm, Unit};
use crate::model::DimensionSet;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Named dimension fields, most specific first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    OuterDiameter,
    InnerDiameter,
    BoltCircleDiameter,
    WallThickness,
    Thickness,
    Length,
    Width,
    Height,
    Diameter,
    Radius,
    Teeth,
    Lobes,
    BoltCount,
}

impl Field {
    const ALL: [Field; 13] = [
        Field::OuterDiameter,
        Field::InnerDiameter,
        Field::BoltCircleDiameter,
        Field::WallThickness,
        Field::Thickness,
        Field::Length,
        Field::Width,
        Field::Height,
        Field::Diameter,
        Field::Radius,
        Field::Teeth,
        Field::Lobes,
        Field::BoltCount,
    ];

    fn keywords(&self) -> &'static str {
        match self {
            Field::OuterDiameter => r"outer\s+diameter|outside\s+diameter|od",
            Field::InnerDiameter => r"inner\s+diameter|inside\s+diameter|id|bore\s+diameter|bore",
            Field::BoltCircleDiameter => {
                r"bolt\s+circle\s+diameter|bolt\s+circle|pitch\s+circle\s+diameter|pitch\s+circle|pcd|bcd"
            }
            Field::WallThickness => r"wall\s+thickness|walls|wall",
            Field::Thickness => r"thickness|thick",
            Field::Length => r"length|long|len",
            Field::Width => r"width|wide",
            Field::Height => r"height|tall|high",
            Field::Diameter => r"diameter|diam|dia",
            Field::Radius => r"radius|rad",
            Field::Teeth => r"teeth|tooth",
            Field::Lobes => r"lobes|lobe",
            Field::BoltCount => r"bolt\s+count|bolts",
        }
    }

    fn length_slot<'a>(&self, dims: &'a mut DimensionSet) -> Option<&'a mut Option<f64>> {
        match self {
            Field::OuterDiameter => Some(&mut dims.outer_diameter),
            Field::InnerDiameter => Some(&mut dims.inner_diameter),
            Field::BoltCircleDiameter => Some(&mut dims.bolt_circle_diameter),
            Field::WallThickness => Some(&mut dims.wall_thickness),
            Field::Thickness => Some(&mut dims.thickness),
            Field::Length => Some(&mut dims.length),
            Field::Width => Some(&mut dims.width),
            Field::Height => Some(&mut dims.height),
            Field::Diameter => Some(&mut dims.diameter),
            Field::Radius => Some(&mut dims.radius),
            Field::Teeth | Field::Lobes | Field::BoltCount => None,
        }
    }

    fn count_slot<'a>(&self, dims: &'a mut DimensionSet) -> Option<&'a mut Option<u32>> {
        match self {
            Field::Teeth => Some(&mut dims.teeth),
            Field::Lobes => Some(&mut dims.lobes),
            Field::BoltCount => Some(&mut dims.bolt_count),
            _ => None,
        }
    }

    /// Store the number captured in groups 1/2 unless the field is already set.
    fn store(&self, dims: &mut DimensionSet, taken: &Taken) {
        if let Some(slot) = self.count_slot(dims) {
            if slot.is_none() {
                *slot = taken.get(1).and_then(patterns::parse_count);
            }
        } else if let Some(slot) = self.length_slot(dims) {
            if slot.is_none() {
                *slot = taken.mm(1, 2);
            }
        }
    }
}

struct NamedPattern {
    field: Field,
    /// `20mm diameter`
    number_first: Regex,
    /// `diameter 20mm`
    keyword_first: Regex,
}

static NAMED: Lazy<Vec<NamedPattern>> = Lazy::new(|| {
    Field::ALL
        .iter()
        .map(|&field| NamedPattern {
            field,
            number_first: build(&format!(
                r"{{LEAD}}{{NUM}}\s*{{UNIT}}?\s*(?:in\s+)?(?:{})\b",
                field.keywords()
            )),
            keyword_first: build(&format!(
                r"\b(?:{})\b\s*(?:of\s+)?[:=]?\s*{{NUM}}\s*{{UNIT}}?",
                field.keywords()
            )),
        })
        .collect()
});

/// A dimension keyword at the end of the text, with the number before it if any.
static KEYWORD_TAIL: Lazy<Regex> = Lazy::new(|| {
    let all = Field::ALL
        .iter()
        .map(|f| f.keywords())
        .collect::<Vec<_>>()
        .join("|");
    build(&format!(
        r"{{LEAD}}({{NUM}}\s*{{UNIT}}?\s*)?(?:{})\s*(?:of\s+)?[:=]?\s*$",
        all
    ))
});

/// Whether the number at `start` directly follows a keyword that has no number
/// of its own, as in `diameter 20mm height 10`.
fn follows_bare_keyword(text: &str, start: usize) -> bool {
    KEYWORD_TAIL
        .captures(&text[..start])
        .is_some_and(|caps| caps.get(1).is_none())
}

/// Extract a typed, millimeter-normalized dimension set from a prompt.
///
/// Specific phrases are consumed before generic ones so a number is read at
/// most once: tolerance, fit, thread callouts, hole/fillet/chamfer phrases,
/// `NxMxK` shorthand, named dimensions, then bare nouns (`30mm cube`).
pub fn extract_dimensions(text: &str) -> DimensionSet {
    let mut dims = DimensionSet::new();
    let mut scanner = Scanner::new(text);

    extract_tolerance(&mut scanner, &mut dims);
    extract_fit(text, &mut scanner, &mut dims);
    extract_thread(&mut scanner, &mut dims);
    extract_feature_sizes(&mut scanner, &mut dims);
    extract_shorthand(&mut scanner, &mut dims);
    extract_named(&mut scanner, &mut dims);
    extract_bare_nouns(&mut scanner, &mut dims);

    dims.derive_radius_diameter();
    dims.derive_height_from_thickness();

    debug!(?dims, "extracted dimensions");
    dims
}

fn extract_tolerance(scanner: &mut Scanner, dims: &mut DimensionSet) {
    let taken = scanner
        .take(&TOLERANCE_SIGN)
        .or_else(|| scanner.take(&TOLERANCE_WORD));
    if let Some(taken) = taken {
        dims.tolerance = taken.mm(1, 2);
    }
}

fn extract_fit(text: &str, scanner: &mut Scanner, dims: &mut DimensionSet) {
    let found = FIT_CODE.captures_iter(text).find_map(|caps| {
        let grade: u32 = caps.get(2)?.as_str().parse().ok()?;
        let whole = caps.get(0)?;
        (1..=18).contains(&grade).then(|| (whole.range(), whole.as_str().to_string()))
    });
    if let Some((range, code)) = found {
        scanner.blank(range);
        dims.fit = Some(code);
    }
}

fn extract_thread(scanner: &mut Scanner, dims: &mut DimensionSet) {
    let Some(taken) = scanner.take(&THREAD) else {
        return;
    };
    let Some(nominal) = taken.get(1).and_then(patterns::parse_number) else {
        return;
    };
    dims.thread_size = Some(round_mm(nominal));

    let length = taken.mm(2, 3);
    if length.is_some() || taken.get(4).is_some() {
        if dims.diameter.is_none() && dims.radius.is_none() {
            dims.set_diameter(nominal);
        }
        if dims.length.is_none() {
            dims.length = length;
        }
    }
}

fn extract_feature_sizes(scanner: &mut Scanner, dims: &mut DimensionSet) {
    // Counts first so "4 holes" is not read as a 4 mm hole.
    if let Some(taken) = scanner.take(&HOLE_COUNT_TIMES) {
        if taken.get(2).is_some() {
            dims.hole_diameter = taken.mm(2, 3);
        }
    }
    scanner.take_if(&HOLE_COUNT_WORD, |caps, _| {
        caps.get(2)
            .map_or(true, |word| Unit::from_token(word.as_str()).is_none())
    });
    scanner.take(&HOLE_COUNT_SPELLED);

    if let Some(taken) = scanner
        .take(&HOLE_DIAMETER_FIRST)
        .or_else(|| scanner.take(&HOLE_DIAMETER_AFTER))
    {
        if dims.hole_diameter.is_none() {
            dims.hole_diameter = taken.mm(1, 2);
        }
    }
    if let Some(taken) = scanner
        .take(&FILLET_FIRST)
        .or_else(|| scanner.take(&FILLET_AFTER))
    {
        dims.fillet_radius = taken.mm(1, 2);
    }
    if let Some(taken) = scanner
        .take(&CHAMFER_FIRST)
        .or_else(|| scanner.take(&CHAMFER_AFTER))
    {
        dims.chamfer_size = taken.mm(1, 2);
    }
}

fn extract_shorthand(scanner: &mut Scanner, dims: &mut DimensionSet) {
    if let Some(taken) = scanner.take(&TRIPLE) {
        // A single trailing unit applies to all three numbers.
        let shared = taken.get(6).or(taken.get(4)).or(taken.get(2));
        let value = |n: usize| {
            taken
                .get(n)
                .and_then(|num| patterns::to_mm(num, taken.get(n + 1).or(shared)))
        };
        dims.length = dims.length.or(value(1));
        dims.width = dims.width.or(value(3));
        dims.height = dims.height.or(value(5));
    }
    if let Some(taken) = scanner.take(&PAIR) {
        let shared = taken.get(4).or(taken.get(2));
        let value = |n: usize| {
            taken
                .get(n)
                .and_then(|num| patterns::to_mm(num, taken.get(n + 1).or(shared)))
        };
        dims.length = dims.length.or(value(1));
        dims.width = dims.width.or(value(3));
    }
}

fn extract_named(scanner: &mut Scanner, dims: &mut DimensionSet) {
    for named in NAMED.iter() {
        let taken = scanner.take_if(&named.number_first, |caps, text| {
            let start = caps.get(1).map_or(0, |m| m.start());
            !follows_bare_keyword(text, start)
        });
        if let Some(taken) = taken {
            named.field.store(dims, &taken);
        }
    }
    for named in NAMED.iter() {
        if let Some(taken) = scanner.take(&named.keyword_first) {
            named.field.store(dims, &taken);
        }
    }
}

fn extract_bare_nouns(scanner: &mut Scanner, dims: &mut DimensionSet) {
    if let Some(side) = scanner.take(&CUBE).and_then(|t| t.mm(1, 2)) {
        dims.length = dims.length.or(Some(side));
        dims.width = dims.width.or(Some(side));
        dims.height = dims.height.or(Some(side));
    }
    if let Some(diameter) = scanner.take(&ROUND_NOUN).and_then(|t| t.mm(1, 2)) {
        if dims.diameter.is_none() && dims.radius.is_none() && dims.outer_diameter.is_none() {
            dims.set_diameter(diameter);
        }
    }
    if let Some(length) = scanner.take(&LONG_NOUN).and_then(|t| t.mm(1, 2)) {
        dims.length = dims.length.or(Some(length));
    }
}
