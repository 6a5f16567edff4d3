//! FHIR Search Completion Library
//!
//! This library provides context-aware completion for FHIR search queries.
//! Given a query string and a cursor position, it classifies the grammatical
//! slot under the cursor and produces ranked suggestions: resource types,
//! search parameters, modifiers, comparison operators, values and
//! include/revinclude paths.
//!
//! # Modules
//!
//! - `capability`: Server CapabilityStatement parsing and metadata store
//! - `cli`: Command-line interface and argument parsing
//! - `completion`: Classifier, suggestion engine and edit applier
//! - `config`: Configuration management
//! - `error`: Error types and handling
//! - `formatter`: Output formatting and display
//! - `registry`: Static grammar data (resource types, modifiers, operators)
//! - `repl`: Interactive query console
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use fhirsearch::capability::CapabilityStore;
//! use fhirsearch::completion::SuggestionEngine;
//!
//! let engine = SuggestionEngine::new(Arc::new(CapabilityStore::new()));
//! let (parsed, suggestions) = engine.suggest_at("/Pat", 4);
//! assert_eq!(parsed.context.as_str(), "resource_type");
//! assert!(suggestions.iter().any(|s| s.label == "Patient"));
//! ```

pub mod capability;
pub mod cli;
pub mod completion;
pub mod config;
pub mod error;
pub mod formatter;
pub mod registry;
pub mod repl;

// Re-export commonly used types
pub use capability::{CapabilitySnapshot, CapabilityStore, MetadataSource};
pub use completion::{AppliedEdit, ParsedQuery, QueryContext, Suggestion, SuggestionEngine};
pub use config::Config;
pub use error::{FhirSearchError, Result};
pub use formatter::Formatter;
pub use registry::TypeRegistry;
pub use repl::Console;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
