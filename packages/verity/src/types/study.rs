//! Structured study entities derived from bibliographic records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Study design classification.
///
/// Mutually exclusive; the extractor assigns exactly one type per study
/// using a fixed priority chain (meta-analysis outranks everything else).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StudyType {
    #[serde(rename = "meta-analysis")]
    MetaAnalysis,
    #[serde(rename = "rct")]
    Rct,
    #[serde(rename = "cohort study")]
    CohortStudy,
    #[serde(rename = "case-control")]
    CaseControl,
    #[serde(rename = "review")]
    Review,
    #[serde(rename = "observational")]
    Observational,
}

impl StudyType {
    /// Display label for this study type.
    pub fn as_str(&self) -> &'static str {
        match self {
            StudyType::MetaAnalysis => "meta-analysis",
            StudyType::Rct => "rct",
            StudyType::CohortStudy => "cohort study",
            StudyType::CaseControl => "case-control",
            StudyType::Review => "review",
            StudyType::Observational => "observational",
        }
    }
}

impl fmt::Display for StudyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One bibliographic record plus derived fields.
///
/// `quality_score` is present only after the quality stage runs; absence
/// means "unscored", not a score of zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Study {
    /// External record identifier, unique within a run
    pub record_id: String,

    /// Article title
    pub title: String,

    /// Pre-formatted display string: up to 3 names plus "et al."
    pub authors: String,

    /// Journal title
    pub journal: String,

    /// Publication year; defaults to the current year when unparseable
    pub year: i32,

    /// Inferred study design
    pub study_type: StudyType,

    /// Inferred sample size; 0 means unknown or aggregate
    pub sample_size: u64,

    /// Reduced abstract text (Results/Conclusions when structured)
    #[serde(rename = "abstract")]
    pub abstract_text: String,

    /// Canonical URL for the record
    pub url: String,

    /// Quality score on a 0-10 scale, set by the quality stage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_score: Option<f64>,

    /// Short justification for the score
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality_rationale: Option<String>,
}

impl Study {
    /// Attach a quality score and rationale.
    pub fn with_score(mut self, score: f64, rationale: impl Into<String>) -> Self {
        self.quality_score = Some(score);
        self.quality_rationale = Some(rationale.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn study_type_round_trips_through_serde() {
        let json = serde_json::to_string(&StudyType::CohortStudy).unwrap();
        assert_eq!(json, "\"cohort study\"");

        let parsed: StudyType = serde_json::from_str("\"meta-analysis\"").unwrap();
        assert_eq!(parsed, StudyType::MetaAnalysis);
    }

    #[test]
    fn unscored_study_serializes_without_score_fields() {
        let study = Study {
            record_id: "1".into(),
            title: "t".into(),
            authors: "Unknown".into(),
            journal: "J".into(),
            year: 2024,
            study_type: StudyType::Observational,
            sample_size: 0,
            abstract_text: "a".into(),
            url: "u".into(),
            quality_score: None,
            quality_rationale: None,
        };

        let json = serde_json::to_string(&study).unwrap();
        assert!(!json.contains("quality_score"));
    }
}
