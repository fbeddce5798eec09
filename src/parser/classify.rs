//! Shape classification and feature detection by keyword.

use super::patterns::{
    self, compile_words, Scanner, CHAMFER_AFTER, CHAMFER_FIRST, CHAMFER_WORD, COORDINATE,
    FILLET_AFTER, FILLET_FIRST, FILLET_WORD, HOLE_COUNT_SPELLED, HOLE_COUNT_TIMES, HOLE_COUNT_WORD,
    HOLE_DIAMETER_AFTER, HOLE_DIAMETER_FIRST, HOLE_WORD, THREAD, THREAD_WORD,
};
use crate::config::{
    round_mm, Unit, DEFAULT_CHAMFER_SIZE, DEFAULT_FILLET_RADIUS, DEFAULT_HOLE_DIAMETER,
    DEFAULT_THREAD_SIZE,
};
use crate::model::{ChamferSpec, FeatureSpec, FilletSpec, HolePlacement, HoleSpec, ShapeKind};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// Shape keywords in priority order. The first rule that matches wins.
static SHAPE_RULES: Lazy<Vec<(ShapeKind, Regex)>> = Lazy::new(|| {
    vec![
        (ShapeKind::Crankshaft, compile_words(&["crankshaft", "crank shaft"])),
        (ShapeKind::Camshaft, compile_words(&["camshaft", "cam shaft"])),
        (ShapeKind::Gear, compile_words(&["gear", "sprocket", "cog", "teeth", "tooth"])),
        (ShapeKind::Bolt, compile_words(&["bolt", "screw"])),
        (ShapeKind::Washer, compile_words(&["washer"])),
        (ShapeKind::Piston, compile_words(&["piston"])),
        (ShapeKind::Flange, compile_words(&["flange", "coupling", "collar"])),
        (ShapeKind::Tube, compile_words(&["tube", "pipe", "hollow", "ring", "bushing", "sleeve"])),
        (ShapeKind::Sphere, compile_words(&["sphere", "ball"])),
        (ShapeKind::Cone, compile_words(&["cone", "taper", "tapered", "conical"])),
        (
            ShapeKind::Cylinder,
            compile_words(&["cylinder", "cylindrical", "rod", "shaft", "pin", "disc", "disk", "bar"]),
        ),
        (
            ShapeKind::Box,
            compile_words(&["box", "cube", "block", "plate", "sheet", "panel", "bracket", "rectangular"]),
        ),
    ]
});

static PLATE_WORD: Lazy<Regex> = Lazy::new(|| compile_words(&["plate", "sheet", "panel"]));

/// Phrases where "bolt" describes a flange feature, not a fastener.
static BOLT_FEATURE: Lazy<Regex> = Lazy::new(|| {
    patterns::build(r"\bbolt\s+(?:circle|holes?|pattern|pcd)\b|\b\d+\s+bolts\b|\bbolt\s+count\b")
});

static CENTER_WORD: Lazy<Regex> =
    Lazy::new(|| compile_words(&["center", "centre", "central", "centered", "centred", "middle"]));

static CORNER_PHRASE: Lazy<Regex> = Lazy::new(|| {
    patterns::compile(
        r"\bholes?\s+(?:on|at|in|near)\s+(?:the\s+|each\s+|all\s+|four\s+|4\s+)?corners?\b|\bcorner\s+holes?\b|\b(?:each|all|four|4)\s+corners\b",
    )
});

static EDGE_PHRASE: Lazy<Regex> = Lazy::new(|| {
    patterns::compile(
        r"\bholes?\s+(?:on|at|along|near|around)\s+(?:the\s+|each\s+|all\s+|both\s+|four\s+|4\s+)?(?:long\s+|short\s+)?edges?\b|\bedge\s+holes?\b",
    )
});

/// Classify the primary shape of a prompt. Never fails; defaults to a box.
pub fn classify_shape(text: &str) -> ShapeKind {
    let lower = text.to_ascii_lowercase();

    // A plate/sheet with holes is its own shape, ranked just above spheres.
    let plate_with_hole = PLATE_WORD.is_match(&lower) && HOLE_WORD.is_match(&lower);
    let lower = BOLT_FEATURE.replace_all(&lower, " ");

    let shape = SHAPE_RULES
        .iter()
        .find_map(|(kind, re)| {
            if plate_with_hole && *kind == ShapeKind::Sphere {
                return Some(ShapeKind::PlateWithHole);
            }
            re.is_match(&lower).then_some(*kind)
        })
        .unwrap_or(if plate_with_hole {
            ShapeKind::PlateWithHole
        } else {
            ShapeKind::Box
        });

    debug!(%shape, "classified prompt");
    shape
}

/// Detect holes, fillets and chamfers requested in a prompt.
pub fn detect_features(text: &str) -> FeatureSpec {
    let lower = text.to_ascii_lowercase();
    let features = FeatureSpec {
        holes: detect_holes(text, &lower),
        fillet: detect_fillet(&lower),
        chamfer: detect_chamfer(&lower),
    };
    debug!(?features, "detected features");
    features
}

fn detect_holes(text: &str, lower: &str) -> Option<HoleSpec> {
    if !HOLE_WORD.is_match(lower) {
        return None;
    }

    let mut scanner = Scanner::new(text);

    let thread_size = scanner
        .take(&THREAD)
        .and_then(|t| t.get(1).and_then(patterns::parse_number))
        .map(round_mm);
    let threaded = thread_size.is_some() || THREAD_WORD.is_match(lower);

    let mut count = None;
    let mut diameter = None;
    if let Some(taken) = scanner.take(&HOLE_COUNT_TIMES) {
        count = taken.get(1).and_then(patterns::parse_count);
        diameter = taken.mm(2, 3);
    }
    if count.is_none() {
        count = scanner
            .take_if(&HOLE_COUNT_WORD, |caps, _| {
                caps.get(2)
                    .map_or(true, |word| Unit::from_token(word.as_str()).is_none())
            })
            .and_then(|t| t.get(1).and_then(patterns::parse_count));
    }
    if count.is_none() {
        count = scanner
            .take(&HOLE_COUNT_SPELLED)
            .and_then(|t| t.get(1).and_then(patterns::parse_spelled_count));
    }
    if diameter.is_none() {
        diameter = scanner
            .take(&HOLE_DIAMETER_FIRST)
            .or_else(|| scanner.take(&HOLE_DIAMETER_AFTER))
            .and_then(|t| t.mm(1, 2));
    }

    let placement = detect_placement(lower);
    let count = match placement {
        HolePlacement::Corners | HolePlacement::Edges => 4,
        HolePlacement::Center | HolePlacement::At { .. } => 1,
        HolePlacement::Unspecified => count.unwrap_or(1).max(1),
    };

    let diameter_explicit = diameter.is_some();
    let diameter = diameter.unwrap_or_else(|| match (threaded, thread_size) {
        (true, Some(nominal)) => nominal,
        (true, None) => DEFAULT_THREAD_SIZE,
        (false, _) => DEFAULT_HOLE_DIAMETER,
    });

    Some(HoleSpec {
        count,
        diameter,
        diameter_explicit,
        placement,
        threaded,
        thread_size: if threaded {
            Some(thread_size.unwrap_or(DEFAULT_THREAD_SIZE))
        } else {
            None
        },
    })
}

fn detect_placement(lower: &str) -> HolePlacement {
    if let Some(caps) = COORDINATE.captures(lower) {
        let coord = |i: usize| caps.get(i).and_then(|m| patterns::parse_number(m.as_str()));
        if let (Some(x), Some(y)) = (coord(1), coord(2)) {
            return HolePlacement::At { x, y, z: coord(3) };
        }
    }
    if CENTER_WORD.is_match(lower) {
        HolePlacement::Center
    } else if CORNER_PHRASE.is_match(lower) {
        HolePlacement::Corners
    } else if EDGE_PHRASE.is_match(lower) {
        HolePlacement::Edges
    } else {
        HolePlacement::Unspecified
    }
}

fn detect_fillet(lower: &str) -> Option<FilletSpec> {
    let mut scanner = Scanner::new(lower);
    let radius = scanner
        .take(&FILLET_FIRST)
        .or_else(|| scanner.take(&FILLET_AFTER))
        .and_then(|t| t.mm(1, 2));
    match radius {
        Some(radius) => Some(FilletSpec { radius }),
        None if FILLET_WORD.is_match(lower) => Some(FilletSpec {
            radius: DEFAULT_FILLET_RADIUS,
        }),
        None => None,
    }
}

fn detect_chamfer(lower: &str) -> Option<ChamferSpec> {
    let mut scanner = Scanner::new(lower);
    let size = scanner
        .take(&CHAMFER_FIRST)
        .or_else(|| scanner.take(&CHAMFER_AFTER))
        .and_then(|t| t.mm(1, 2));
    let size = match size {
        Some(size) => size,
        None if CHAMFER_WORD.is_match(lower) => DEFAULT_CHAMFER_SIZE,
        None => return None,
    };
    Some(ChamferSpec {
        size,
        angle_degrees: 45.0,
    })
}

/// Connective words that signal several parts in one prompt.
const ASSEMBLY_CONNECTIVES: [&str; 10] = [
    "assembly",
    "assemble",
    "assembled",
    " and ",
    " with ",
    "connected to",
    "attached to",
    "mounted on",
    "fitted to",
    "joined to",
];

/// Component vocabulary for assembly detection.
static COMPONENT_WORDS: Lazy<Regex> = Lazy::new(|| {
    compile_words(&[
        "gear", "shaft", "housing", "plate", "bracket", "cylinder", "box", "motor", "bearing",
        "bolt", "nut", "washer", "rod", "tube", "disk", "pulley", "flange", "piston", "spring",
        "pin", "cover",
    ])
});

/// Detect whether a prompt describes several connected components.
///
/// Returns the distinct component names in order of first appearance.
pub fn detect_assembly(text: &str) -> (bool, Vec<String>) {
    let lower = format!(" {} ", text.to_ascii_lowercase());
    let connected = ASSEMBLY_CONNECTIVES.iter().any(|kw| lower.contains(kw));
    if !connected {
        return (false, Vec::new());
    }

    let mut components: Vec<String> = Vec::new();
    for m in COMPONENT_WORDS.find_iter(&lower) {
        let name = m.as_str().trim_end_matches('s').to_string();
        if !components.contains(&name) {
            components.push(name);
        }
    }

    (components.len() > 1, components)
}
