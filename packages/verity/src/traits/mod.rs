//! Collaborator trait abstractions.

pub mod generation;
pub mod search;
pub mod store;

pub use generation::{Prompt, TextGeneration};
pub use search::LiteratureSearch;
pub use store::ResultStore;
