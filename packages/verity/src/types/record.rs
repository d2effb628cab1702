//! Raw bibliographic records as delivered by a literature search provider.
//!
//! These types are wire-format agnostic: the provider adapter is responsible
//! for mapping its own response shape onto `RawRecord`. The record extractor
//! turns these into structured [`Study`](crate::types::study::Study) values.

use serde::{Deserialize, Serialize};

/// One author entry on a raw record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawAuthor {
    /// Family name, e.g. "Smith"
    pub last_name: String,

    /// Initials, e.g. "JK"
    #[serde(default)]
    pub initials: String,
}

impl RawAuthor {
    /// Create an author entry.
    pub fn new(last_name: impl Into<String>, initials: impl Into<String>) -> Self {
        Self {
            last_name: last_name.into(),
            initials: initials.into(),
        }
    }
}

/// A section of an abstract, optionally labeled.
///
/// Structured abstracts carry labels like "BACKGROUND", "METHODS",
/// "RESULTS", "CONCLUSIONS". Unstructured abstracts are a single unlabeled
/// section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbstractSection {
    /// Section label, `None` for unstructured text
    pub label: Option<String>,

    /// Section body
    pub text: String,
}

impl AbstractSection {
    /// Create a labeled section.
    pub fn labeled(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            text: text.into(),
        }
    }

    /// Create an unlabeled (plain text) section.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            label: None,
            text: text.into(),
        }
    }
}

/// A raw bibliographic record, before extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRecord {
    /// External identifier, unique within a provider
    pub record_id: String,

    /// Article title
    pub title: String,

    /// Full author list (may be longer than the displayed subset)
    #[serde(default)]
    pub authors: Vec<RawAuthor>,

    /// Journal title, if known
    pub journal: Option<String>,

    /// Publication year as reported by the provider, unparsed
    pub pub_year: Option<String>,

    /// Abstract sections in source order
    #[serde(default)]
    pub abstract_sections: Vec<AbstractSection>,

    /// Canonical URL for the record, if the provider supplies one
    pub url: Option<String>,
}

impl RawRecord {
    /// Create a record with an identifier and title.
    pub fn new(record_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            record_id: record_id.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    /// Add an author.
    pub fn with_author(mut self, last_name: impl Into<String>, initials: impl Into<String>) -> Self {
        self.authors.push(RawAuthor::new(last_name, initials));
        self
    }

    /// Set the journal title.
    pub fn with_journal(mut self, journal: impl Into<String>) -> Self {
        self.journal = Some(journal.into());
        self
    }

    /// Set the raw publication year.
    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.pub_year = Some(year.into());
        self
    }

    /// Add an abstract section.
    pub fn with_section(mut self, section: AbstractSection) -> Self {
        self.abstract_sections.push(section);
        self
    }

    /// Set an unstructured abstract from plain text.
    pub fn with_abstract(mut self, text: impl Into<String>) -> Self {
        self.abstract_sections.push(AbstractSection::plain(text));
        self
    }

    /// Set the record URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }
}
