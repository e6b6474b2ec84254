//! Label Formatting
//!
//! Classifier labels come back as `Plant___Condition_words`
//! (e.g. `Tomato___Late_blight`). These helpers turn them into display text
//! and derive the healthy/diseased status used for styling.

use serde::{Deserialize, Serialize};

const PART_SEPARATOR: &str = "___";

/// Turn a raw label into display text
///
/// `___` becomes ` - `, every other `_` a space, and the first letter of each
/// whitespace-delimited word is upper-cased.
///
/// ```
/// use plantdoc_core::format_label;
///
/// assert_eq!(format_label("Tomato___Late_blight"), "Tomato - Late Blight");
/// ```
pub fn format_label(raw: &str) -> String {
    let spaced = raw.replace(PART_SEPARATOR, " - ").replace('_', " ");

    let mut out = String::with_capacity(spaced.len());
    let mut at_word_start = true;
    for ch in spaced.chars() {
        if ch.is_whitespace() {
            at_word_start = true;
            out.push(ch);
        } else if at_word_start {
            at_word_start = false;
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// True iff the lower-cased label contains `healthy`
pub fn is_healthy(label: &str) -> bool {
    label.to_lowercase().contains("healthy")
}

/// Presentation status of a classification
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Diseased,
}

impl HealthStatus {
    pub fn from_label(label: &str) -> Self {
        if is_healthy(label) {
            Self::Healthy
        } else {
            Self::Diseased
        }
    }

    /// CSS modifier used by the result card
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Diseased => "diseased",
        }
    }

    pub const fn headline(self) -> &'static str {
        match self {
            Self::Healthy => "Your plant looks healthy",
            Self::Diseased => "Disease detected",
        }
    }
}

/// Plant and condition halves of a label
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelParts {
    pub plant: String,
    pub condition: Option<String>,
}

impl LabelParts {
    /// Split at the first `___`; labels without it are all plant
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(PART_SEPARATOR) {
            Some((plant, condition)) => Self {
                plant: format_label(plant),
                condition: Some(format_label(condition)),
            },
            None => Self {
                plant: format_label(raw),
                condition: None,
            },
        }
    }
}

/// Render a confidence score as a percentage with one decimal
///
/// Scores in `[0, 1]` are fractions; anything larger is already a percentage.
pub fn format_confidence(confidence: f64) -> String {
    let percent = if confidence <= 1.0 {
        confidence * 100.0
    } else {
        confidence
    };
    format!("{:.1}%", percent.clamp(0.0, 100.0))
}
