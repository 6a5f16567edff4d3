//! Completer for reedline - provides completion suggestions

use std::sync::Arc;

use reedline::{Completer, Span, Suggestion};

use crate::capability::MetadataSource;
use crate::completion::{SuggestionEngine, insertion_text, replace_start};

/// Query completer for reedline
pub struct QueryCompleter {
    /// Completion engine for context-aware suggestions
    engine: SuggestionEngine,

    /// Maximum number of suggestions shown in the menu
    max_suggestions: usize,
}

impl QueryCompleter {
    /// Create a new query completer
    ///
    /// # Arguments
    /// * `metadata` - Shared capability metadata source
    /// * `max_suggestions` - Menu size limit
    ///
    /// # Returns
    /// * `Self` - New completer
    pub fn new(metadata: Arc<dyn MetadataSource>, max_suggestions: usize) -> Self {
        Self {
            engine: SuggestionEngine::new(metadata),
            max_suggestions,
        }
    }
}

impl Completer for QueryCompleter {
    /// Complete the input at the given cursor position
    ///
    /// # Arguments
    /// * `line` - The input line
    /// * `pos` - Cursor position (byte index)
    ///
    /// # Returns
    /// * `Vec<Suggestion>` - List of completion suggestions
    fn complete(&mut self, line: &str, pos: usize) -> Vec<Suggestion> {
        let parsed = self.engine.classify(line, pos);
        let mut candidates = self.engine.suggest(&parsed);
        candidates.truncate(self.max_suggestions);

        let start = replace_start(&parsed);

        candidates
            .into_iter()
            .map(|s| Suggestion {
                value: insertion_text(&parsed, &s),
                description: s.description.clone(),
                style: None,
                extra: None,
                span: Span::new(start, parsed.cursor),
                append_whitespace: false,
                match_indices: None,
            })
            .collect()
    }
}
