//! Clarification prompts and the optional AI re-parse hook.

use super::patterns::{compile_words, CUBE, TRIPLE};
use crate::model::DimensionSet;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Source of an alternative dimension reading when the deterministic parse
/// looks unreliable.
///
/// Implementations may call out to a language model. Returning `None` keeps the
/// deterministic result.
pub trait AiReparser {
    fn reparse(&self, text: &str) -> Option<DimensionSet>;
}

/// Reparser used when no assistant is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAssist;

impl AiReparser for NoAssist {
    fn reparse(&self, _text: &str) -> Option<DimensionSet> {
        None
    }
}

/// What a clarification question is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguityKind {
    Orientation,
    Dimensions,
    FeaturePlacement,
    Material,
}

/// How much an answer changes the generated part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    Low,
    Medium,
    High,
    Critical,
}

/// A question to put back to the user before generating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ambiguity {
    #[serde(rename = "type")]
    pub kind: AmbiguityKind,
    pub question: String,
    pub options: Vec<String>,
    pub importance: Importance,
}

impl Ambiguity {
    fn new(kind: AmbiguityKind, question: &str, options: &[&str], importance: Importance) -> Self {
        Self {
            kind,
            question: question.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            importance,
        }
    }
}

static SHAFT_WORD: Lazy<Regex> = Lazy::new(|| compile_words(&["shaft", "rod", "pole"]));
static WHEEL_WORD: Lazy<Regex> = Lazy::new(|| compile_words(&["gear", "wheel", "disk", "disc"]));
static ORIENTATION_WORD: Lazy<Regex> =
    Lazy::new(|| compile_words(&["vertical", "vertically", "horizontal", "horizontally", "upright"]));
static BOX_WORD: Lazy<Regex> = Lazy::new(|| compile_words(&["box", "cube", "block"]));
static HOLE_NOUN: Lazy<Regex> = Lazy::new(|| compile_words(&["hole"]));
static PLACEMENT_WORD: Lazy<Regex> = Lazy::new(|| {
    compile_words(&[
        "center", "centre", "central", "middle", "corner", "edge", "position", "at",
    ])
});
static QUALITY_WORD: Lazy<Regex> = Lazy::new(|| compile_words(&["strong", "lightweight", "durable"]));

/// Detect prompts that need a clarifying question before generation.
///
/// `material` is the material chosen outside the prompt, if any.
pub fn detect_ambiguities(text: &str, material: Option<&str>) -> Vec<Ambiguity> {
    let lower = text.to_ascii_lowercase();
    let mut found = Vec::new();

    if SHAFT_WORD.is_match(&lower) && WHEEL_WORD.is_match(&lower) && !ORIENTATION_WORD.is_match(&lower) {
        found.push(Ambiguity::new(
            AmbiguityKind::Orientation,
            "How should the shaft be oriented relative to the gear?",
            &[
                "Vertical (shaft stands upright through gear center)",
                "Horizontal (shaft lies flat through gear)",
                "At an angle (specify degrees)",
            ],
            Importance::High,
        ));
    }

    let sized = TRIPLE.is_match(&lower)
        || CUBE.is_match(&lower)
        || ["length", "width", "height"].iter().all(|w| lower.contains(w));
    if BOX_WORD.is_match(&lower) && !sized {
        found.push(Ambiguity::new(
            AmbiguityKind::Dimensions,
            "What dimensions would you like for the box?",
            &[
                "Standard cube (50x50x50mm)",
                "Thin plate (100x100x10mm)",
                "Custom dimensions (please specify)",
            ],
            Importance::Critical,
        ));
    }

    if HOLE_NOUN.is_match(&lower) && !PLACEMENT_WORD.is_match(&lower) {
        found.push(Ambiguity::new(
            AmbiguityKind::FeaturePlacement,
            "Where should the hole be placed?",
            &[
                "Center of the part",
                "Corners (4 holes)",
                "Custom position (I will specify coordinates)",
            ],
            Importance::Medium,
        ));
    }

    if QUALITY_WORD.is_match(&lower) && material.map_or(true, |m| m.trim().is_empty()) {
        found.push(Ambiguity::new(
            AmbiguityKind::Material,
            "What material are you planning to use?",
            &[
                "PLA (3D printing)",
                "ABS (stronger 3D printing)",
                "Aluminum (CNC machining)",
                "Steel (heavy duty)",
            ],
            Importance::Low,
        ));
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str, material: Option<&str>) -> Vec<AmbiguityKind> {
        detect_ambiguities(text, material)
            .into_iter()
            .map(|a| a.kind)
            .collect()
    }

    #[test]
    fn test_orientation_question() {
        assert_eq!(
            kinds("gear on a 10mm shaft", None),
            vec![AmbiguityKind::Orientation]
        );
        assert!(kinds("gear on a vertical shaft", None).is_empty());
    }

    #[test]
    fn test_box_dimensions_question() {
        assert_eq!(kinds("a box", None), vec![AmbiguityKind::Dimensions]);
        assert!(kinds("50x50x10 box", None).is_empty());
        assert!(kinds("30mm cube", None).is_empty());
        assert!(kinds("box length 10 width 20 height 5", None).is_empty());
    }

    #[test]
    fn test_hole_placement_question() {
        assert_eq!(
            kinds("50x40x5 plate with a 6mm hole", None),
            vec![AmbiguityKind::FeaturePlacement]
        );
        assert!(kinds("50x40x5 plate with a center hole", None).is_empty());
        assert!(kinds("plate with hole at 10,10", None).is_empty());
    }

    #[test]
    fn test_material_question() {
        let found = detect_ambiguities("strong 50x50x10 bracket", None);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].kind, AmbiguityKind::Material);
        assert_eq!(found[0].importance, Importance::Low);
        assert!(kinds("strong 50x50x10 bracket", Some("steel")).is_empty());
    }

    #[test]
    fn test_no_assist_returns_none() {
        assert_eq!(NoAssist.reparse("anything"), None);
    }

    #[test]
    fn test_serializes_type_field() {
        let found = detect_ambiguities("a box", None);
        let json = serde_json::to_value(&found[0]).expect("serializes");
        assert_eq!(json["type"], "dimensions");
        assert_eq!(json["importance"], "critical");
    }
}
