//! Shared prompt patterns and scanning helpers.
//!
//! Patterns run against ASCII-lowercased text. Non-ASCII characters such as
//! `±` and `×` are left alone, so byte offsets match the original prompt.

use crate::config::Unit;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::ops::Range;

/// Decimal number without sign.
pub const NUM: &str = r"(\d+(?:\.\d+)?|\.\d+)";

/// Optional unit token following a number.
pub const UNIT: &str =
    r#"(millimet(?:er|re)s?|centimet(?:er|re)s?|met(?:er|re)s?|inch(?:es)?|mm|cm|ft|feet|foot|in\b|m\b|"|')"#;

/// Start of a number that is not glued to a preceding letter or digit.
pub const LEAD: &str = r"(?:^|[^a-z0-9.])";

/// Words that may sit between a size or count and `hole`.
pub const HOLE_QUALIFIER: &str = r"(?:center|centre|central|through|thru|mounting|bolt|corner|edge|tapped|threaded|blind|drilled)";

/// Compile a built-in pattern. Patterns are constants, so failure is a bug.
pub fn compile(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(re) => re,
        Err(e) => panic!("invalid built-in pattern {pattern:?}: {e}"),
    }
}

/// Whole-word match of any of `words`, allowing a plural `s`.
pub fn compile_words(words: &[&str]) -> Regex {
    let alternatives = words
        .iter()
        .map(|w| regex::escape(w).replace(' ', r"\s+"))
        .collect::<Vec<_>>()
        .join("|");
    compile(&format!(r"\b(?:{})s?\b", alternatives))
}

/// Expand `{NUM}`, `{UNIT}`, `{LEAD}` and `{QUAL}` placeholders and compile.
pub fn build(template: &str) -> Regex {
    compile(
        &template
            .replace("{NUM}", NUM)
            .replace("{UNIT}", UNIT)
            .replace("{LEAD}", LEAD)
            .replace("{QUAL}", HOLE_QUALIFIER),
    )
}

/// `±0.1mm`, `+/- 0.1`.
pub static TOLERANCE_SIGN: Lazy<Regex> = Lazy::new(|| build(r"(?:±|\+/-|\+-)\s*{NUM}\s*{UNIT}?"));

/// `tolerance 0.05`, `tol: ±0.1 mm`.
pub static TOLERANCE_WORD: Lazy<Regex> = Lazy::new(|| {
    build(r"\b(?:tolerance|tol)\b\.?\s*(?:of\s+)?[:=]?\s*(?:±|\+/-|\+-)?\s*{NUM}\s*{UNIT}?")
});

/// ISO fit code, matched case-sensitively on the original text.
pub static FIT_CODE: Lazy<Regex> = Lazy::new(|| compile(r"\b([D-LN-WYZd-ln-wyz])([0-9]{1,2})\b"));

/// Metric thread callout: `m8`, `m8x40`, `m8 hex bolt`.
pub static THREAD: Lazy<Regex> = Lazy::new(|| {
    build(
        r"\bm(\d+(?:\.\d+)?)(?:\s*[x×]\s*{NUM}\s*{UNIT}?)?(?:\s+(?:[a-z]+\s+)?(bolt|screw|washer|nut|stud)s?\b)?",
    )
});

/// `50x50x10`, `2 x 3 x 4 in`.
pub static TRIPLE: Lazy<Regex> = Lazy::new(|| {
    build(r"{LEAD}{NUM}\s*{UNIT}?\s*[x×*]\s*{NUM}\s*{UNIT}?\s*[x×*]\s*{NUM}\s*{UNIT}?")
});

/// `100x60`.
pub static PAIR: Lazy<Regex> = Lazy::new(|| build(r"{LEAD}{NUM}\s*{UNIT}?\s*[x×*]\s*{NUM}\s*{UNIT}?"));

/// `4x holes`, `4 x 5mm holes`, `4x tapped holes`. Only hole qualifiers may
/// precede the noun, so `100x60 plate hole` stays a footprint.
pub static HOLE_COUNT_TIMES: Lazy<Regex> = Lazy::new(|| {
    build(r"{LEAD}(\d+)\s*x\s*(?:{NUM}\s*{UNIT}?\s*)?(?:(?:diameter|dia)\s+)?(?:{QUAL}\s+)?holes?\b")
});

/// `4 holes`, `4 mounting holes`.
pub static HOLE_COUNT_WORD: Lazy<Regex> =
    Lazy::new(|| build(r"{LEAD}(\d+)\s+(?:([a-z-]+)\s+)?holes\b"));

/// `four holes`.
pub static HOLE_COUNT_SPELLED: Lazy<Regex> = Lazy::new(|| {
    compile(r"\b(two|three|four|five|six|eight|ten|twelve)\s+(?:[a-z-]+\s+)?holes\b")
});

/// `5mm hole`, `5mm diameter hole`, `5 mm center hole`.
pub static HOLE_DIAMETER_FIRST: Lazy<Regex> = Lazy::new(|| {
    build(
        r"{LEAD}{NUM}\s*{UNIT}?\s*(?:(?:diameter|dia)\s+)?(?:{QUAL}\s+)?holes?\b",
    )
});

/// `hole 5mm`, `holes of diameter 6`.
pub static HOLE_DIAMETER_AFTER: Lazy<Regex> = Lazy::new(|| {
    build(r"\bholes?\s+(?:of\s+)?(?:(?:diameter|dia|size)\s+)?(?:of\s+)?[:=]?\s*{NUM}\s*{UNIT}?")
});

/// `2mm fillet`, `3 mm rounded edges`.
pub static FILLET_FIRST: Lazy<Regex> = Lazy::new(|| {
    build(r"{LEAD}{NUM}\s*{UNIT}?\s*(?:radius\s+)?(?:fillets?|rounded\s+(?:edges?|corners?)|edge\s+radius)\b")
});

/// `fillet 2mm`, `fillet radius of 2`.
pub static FILLET_AFTER: Lazy<Regex> = Lazy::new(|| {
    build(r"\bfillets?\s+(?:radius\s+)?(?:of\s+)?[:=]?\s*{NUM}\s*{UNIT}?")
});

/// Fillet keywords without a size.
pub static FILLET_WORD: Lazy<Regex> =
    Lazy::new(|| compile(r"\b(?:fillets?|filleted|rounded\s+(?:edges?|corners?)|round\s+edges?)\b"));

/// `1mm chamfer`, `1 x 45° chamfer`.
pub static CHAMFER_FIRST: Lazy<Regex> = Lazy::new(|| {
    build(
        r"{LEAD}{NUM}\s*{UNIT}?(?:\s*[x×]\s*45\s*(?:°|deg(?:rees?)?)?)?\s*(?:chamfers?|chamfered\s+edges?|bevels?|bevell?ed\s+edges?)\b",
    )
});

/// `chamfer 1mm`, `bevel of 2`.
pub static CHAMFER_AFTER: Lazy<Regex> = Lazy::new(|| {
    build(r"\b(?:chamfers?|bevels?)\s+(?:size\s+)?(?:of\s+)?[:=]?\s*{NUM}\s*{UNIT}?")
});

/// Chamfer keywords without a size.
pub static CHAMFER_WORD: Lazy<Regex> =
    Lazy::new(|| compile(r"\b(?:chamfers?|chamfered|bevels?|bevell?ed)\b"));

/// `30mm cube`.
pub static CUBE: Lazy<Regex> =
    Lazy::new(|| build(r"{LEAD}{NUM}\s*{UNIT}?\s*(?:[a-z]+\s+)?cubes?\b"));

/// `30mm shaft`, `20 mm steel rod`.
pub static ROUND_NOUN: Lazy<Regex> = Lazy::new(|| {
    build(
        r"{LEAD}{NUM}\s*{UNIT}?\s*(?:[a-z-]+\s+)?(?:shaft|rod|pin|cylinder|sphere|ball|disc|disk|gear|tube|pipe|flange|washer|piston)s?\b",
    )
});

/// `150mm crankshaft`.
pub static LONG_NOUN: Lazy<Regex> =
    Lazy::new(|| build(r"{LEAD}{NUM}\s*{UNIT}?\s*(?:[a-z-]+\s+)?(?:crankshaft|camshaft)s?\b"));

/// Explicit coordinate: `at 10,20`, `at (10, 20, 0)`.
pub static COORDINATE: Lazy<Regex> = Lazy::new(|| {
    compile(
        r"\bat\s*\(?\s*(-?\d+(?:\.\d+)?)\s*,\s*(-?\d+(?:\.\d+)?)(?:\s*,\s*(-?\d+(?:\.\d+)?))?\s*\)?",
    )
});

/// Any hole keyword.
pub static HOLE_WORD: Lazy<Regex> = Lazy::new(|| compile(r"\b(?:holes?|drilled|tapped)\b"));

/// Thread keywords.
pub static THREAD_WORD: Lazy<Regex> =
    Lazy::new(|| compile(r"\b(?:threads?|threaded|tapped)\b"));

/// Parse a decimal number, rejecting non-finite values.
pub fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a whole count.
pub fn parse_count(s: &str) -> Option<u32> {
    let value = parse_number(s)?;
    if value.fract() == 0.0 && value >= 0.0 && value <= u32::MAX as f64 {
        Some(value as u32)
    } else {
        None
    }
}

/// Spelled count used in hole phrases.
pub fn parse_spelled_count(word: &str) -> Option<u32> {
    match word {
        "two" => Some(2),
        "three" => Some(3),
        "four" => Some(4),
        "five" => Some(5),
        "six" => Some(6),
        "eight" => Some(8),
        "ten" => Some(10),
        "twelve" => Some(12),
        _ => None,
    }
}

/// Convert a number with an optional unit token to millimeters.
pub fn to_mm(number: &str, unit: Option<&str>) -> Option<f64> {
    let value = parse_number(number)?;
    let unit = match unit {
        Some(token) => Unit::from_token(token)?,
        None => Unit::default(),
    };
    Some(unit.to_mm(value))
}

/// One regex match with its groups copied out.
#[derive(Debug, Clone)]
pub struct Taken {
    groups: Vec<Option<String>>,
}

impl Taken {
    fn from_captures(caps: &Captures) -> Self {
        Self {
            groups: (1..caps.len())
                .map(|i| caps.get(i).map(|g| g.as_str().to_string()))
                .collect(),
        }
    }

    /// Capture group `index` (1-based, like `Captures::get`).
    pub fn get(&self, index: usize) -> Option<&str> {
        self.groups.get(index.checked_sub(1)?)?.as_deref()
    }

    /// Group `number` converted to mm using group `unit`.
    pub fn mm(&self, number: usize, unit: usize) -> Option<f64> {
        to_mm(self.get(number)?, self.get(unit))
    }
}

/// Working copy of a prompt from which matched phrases are blanked out.
///
/// Taking a match replaces it with spaces so later, more generic patterns
/// cannot read the same numbers again.
#[derive(Debug, Clone)]
pub struct Scanner {
    text: String,
}

impl Scanner {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_ascii_lowercase(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn blank(&mut self, range: Range<usize>) {
        let width = range.len();
        self.text.replace_range(range, &" ".repeat(width));
    }

    /// Take the first match of `re`.
    pub fn take(&mut self, re: &Regex) -> Option<Taken> {
        self.take_if(re, |_, _| true)
    }

    /// Take the first match of `re` accepted by `accept`, which sees the
    /// captures and the whole working text.
    pub fn take_if(&mut self, re: &Regex, accept: impl Fn(&Captures, &str) -> bool) -> Option<Taken> {
        let (range, taken) = re.captures_iter(&self.text).find_map(|caps| {
            let whole = caps.get(0)?;
            accept(&caps, &self.text).then(|| (whole.range(), Taken::from_captures(&caps)))
        })?;
        self.blank(range);
        Some(taken)
    }
}
