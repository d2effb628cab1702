//! The closed set of evidence-strength verdicts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Evidence-strength verdict for a claim.
///
/// The verdict-to-glyph mapping lives here and nowhere else: the synthesis
/// stage discards whatever glyph the generation service proposes and derives
/// it from the parsed verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    #[serde(rename = "Strongly Supported")]
    StronglySupported,
    #[serde(rename = "Supported")]
    Supported,
    #[serde(rename = "Partially Supported")]
    PartiallySupported,
    #[serde(rename = "Inconclusive")]
    Inconclusive,
    #[serde(rename = "Not Supported")]
    NotSupported,
    #[serde(rename = "Contradicted")]
    Contradicted,
}

impl Verdict {
    /// All verdicts, strongest first.
    pub const ALL: [Verdict; 6] = [
        Verdict::StronglySupported,
        Verdict::Supported,
        Verdict::PartiallySupported,
        Verdict::Inconclusive,
        Verdict::NotSupported,
        Verdict::Contradicted,
    ];

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Verdict::StronglySupported => "Strongly Supported",
            Verdict::Supported => "Supported",
            Verdict::PartiallySupported => "Partially Supported",
            Verdict::Inconclusive => "Inconclusive",
            Verdict::NotSupported => "Not Supported",
            Verdict::Contradicted => "Contradicted",
        }
    }

    /// Status glyph for this verdict.
    pub fn glyph(&self) -> &'static str {
        match self {
            Verdict::StronglySupported => "✅",
            Verdict::Supported => "✓",
            Verdict::PartiallySupported => "⚖️",
            Verdict::Inconclusive => "❓",
            Verdict::NotSupported => "❌",
            Verdict::Contradicted => "🚫",
        }
    }

    /// Parse a verdict label, case-insensitively.
    ///
    /// Tolerates trailing qualifiers the generation service sometimes adds,
    /// e.g. "Inconclusive - insufficient relevant evidence".
    pub fn parse(label: &str) -> Option<Verdict> {
        let lower = label.trim().to_lowercase();
        Verdict::ALL
            .iter()
            .copied()
            .find(|v| lower.starts_with(&v.label().to_lowercase()))
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
