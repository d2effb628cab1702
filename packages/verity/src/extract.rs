//! Record extractor: raw bibliographic records into structured studies.
//!
//! Pure functions, no I/O. A single malformed record never aborts a batch;
//! it is skipped and the rest continue.

use chrono::{Datelike, Utc};
use regex::Regex;
use std::sync::OnceLock;

use crate::types::record::{AbstractSection, RawAuthor, RawRecord};
use crate::types::study::{Study, StudyType};

const NO_ABSTRACT: &str = "No abstract available";

/// Abstract section labels whose content survives reduction.
const TARGET_LABELS: [&str; 4] = ["RESULTS", "CONCLUSIONS", "CONCLUSION", "FINDINGS"];

/// Convert a batch of raw records, skipping any that fail to parse.
pub fn extract_studies(records: &[RawRecord]) -> Vec<Study> {
    records
        .iter()
        .filter_map(|record| {
            let study = extract_study(record);
            if study.is_none() {
                tracing::warn!(record_id = %record.record_id, "skipping unparseable record");
            }
            study
        })
        .collect()
}

/// Convert one raw record into a [`Study`].
///
/// Returns `None` when the record lacks the identifier or title needed to
/// cite it; every other field degrades to a documented default instead.
pub fn extract_study(record: &RawRecord) -> Option<Study> {
    if record.record_id.trim().is_empty() || record.title.trim().is_empty() {
        return None;
    }

    let abstract_text = reduce_abstract(&record.abstract_sections);
    let study_type = classify_study_type(&record.title, &abstract_text);
    let sample_size = extract_sample_size(&abstract_text);

    let url = record
        .url
        .clone()
        .unwrap_or_else(|| format!("https://pubmed.ncbi.nlm.nih.gov/{}/", record.record_id));

    Some(Study {
        record_id: record.record_id.clone(),
        title: record.title.clone(),
        authors: format_authors(&record.authors),
        journal: record
            .journal
            .clone()
            .unwrap_or_else(|| "Unknown Journal".to_string()),
        year: parse_year(record.pub_year.as_deref()),
        study_type,
        sample_size,
        abstract_text,
        url,
        quality_score: None,
        quality_rationale: None,
    })
}

/// Format an author list as a display string.
///
/// First 3 authors as "LastName Initials", comma-joined, with a literal
/// "et al." appended when the source list is longer. "Unknown" when empty.
pub fn format_authors(authors: &[RawAuthor]) -> String {
    if authors.is_empty() {
        return "Unknown".to_string();
    }

    let mut names: Vec<String> = authors
        .iter()
        .take(3)
        .filter(|a| !a.last_name.is_empty())
        .map(|a| format!("{} {}", a.last_name, a.initials).trim().to_string())
        .collect();

    if authors.len() > 3 {
        names.push("et al.".to_string());
    }

    if names.is_empty() {
        "Unknown".to_string()
    } else {
        names.join(", ")
    }
}

/// Parse the publication year, defaulting to the current calendar year.
///
/// The default is a documented imprecision, not an error: undated records
/// are treated as recent rather than dropped.
pub fn parse_year(raw: Option<&str>) -> i32 {
    raw.and_then(|y| y.trim().parse::<i32>().ok())
        .unwrap_or_else(|| Utc::now().year())
}

fn type_rules() -> &'static [(Regex, StudyType)] {
    static RULES: OnceLock<Vec<(Regex, StudyType)>> = OnceLock::new();
    RULES.get_or_init(|| {
        // Ordered, first match wins. Meta-analysis outranks everything: a
        // title mentioning both "meta-analysis" and "cohort" classifies as
        // meta-analysis.
        [
            (
                r"meta-analysis|meta analysis|systematic review",
                StudyType::MetaAnalysis,
            ),
            (
                r"randomized controlled trial|randomized control trial|rct|randomised",
                StudyType::Rct,
            ),
            (
                r"cohort study|prospective study|longitudinal",
                StudyType::CohortStudy,
            ),
            (r"case-control|case control", StudyType::CaseControl),
            (r"review", StudyType::Review),
        ]
        .into_iter()
        .map(|(pattern, study_type)| {
            (
                Regex::new(pattern).expect("study-type pattern is valid"),
                study_type,
            )
        })
        .collect()
    })
}

/// Classify the study design from title and abstract.
pub fn classify_study_type(title: &str, abstract_text: &str) -> StudyType {
    let combined = format!("{} {}", title, abstract_text).to_lowercase();

    type_rules()
        .iter()
        .find(|(pattern, _)| pattern.is_match(&combined))
        .map(|(_, study_type)| *study_type)
        .unwrap_or(StudyType::Observational)
}

fn sample_size_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        // Ordered, first match wins (not best match).
        [
            r"(?i)n\s*=\s*(\d+,?\d*)",
            r"(?i)(\d+,?\d*)\s+participants",
            r"(?i)(\d+,?\d*)\s+subjects",
            r"(?i)(\d+,?\d*)\s+patients",
        ]
        .into_iter()
        .map(|pattern| Regex::new(pattern).expect("sample-size pattern is valid"))
        .collect()
    })
}

/// Infer the sample size from abstract text. Returns 0 when unknown.
pub fn extract_sample_size(abstract_text: &str) -> u64 {
    for pattern in sample_size_patterns() {
        if let Some(captures) = pattern.captures(abstract_text) {
            let digits = captures[1].replace(',', "");
            if let Ok(n) = digits.parse::<u64>() {
                return n;
            }
        }
    }
    0
}

/// Reduce an abstract to its evidentiary sections.
///
/// Structured abstracts keep only Results/Conclusions/Findings, joined with
/// their labels; Background and Methods are redundant because the claim
/// context travels separately and study type and sample size are stored as
/// their own fields. When a structured abstract has no target section, or
/// the abstract is unstructured, the full text is returned.
pub fn reduce_abstract(sections: &[AbstractSection]) -> String {
    if sections.is_empty() {
        return NO_ABSTRACT.to_string();
    }

    let has_labels = sections.iter().any(|s| s.label.is_some());
    if !has_labels {
        return join_sections(sections);
    }

    let parts: Vec<String> = sections
        .iter()
        .filter_map(|section| {
            let label = section.label.as_deref()?;
            if TARGET_LABELS.contains(&label.to_uppercase().as_str()) {
                Some(format!("{}: {}", label, section.text))
            } else {
                None
            }
        })
        .collect();

    if parts.is_empty() {
        // Structured but nothing matched; fall back to the full text.
        return join_sections(sections);
    }

    parts.join(" ")
}

fn join_sections(sections: &[AbstractSection]) -> String {
    sections
        .iter()
        .map(|s| s.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}
