//! Custom prompt implementation for the query console

use reedline::{Prompt, PromptEditMode, PromptHistorySearch, PromptHistorySearchStatus};

/// Console prompt showing whether capability metadata is loaded
pub struct SearchPrompt {
    /// Whether a capability snapshot is loaded
    capability_loaded: bool,
}

impl SearchPrompt {
    /// Create a new prompt
    ///
    /// # Arguments
    /// * `capability_loaded` - Whether server metadata is available
    pub fn new(capability_loaded: bool) -> Self {
        Self { capability_loaded }
    }
}

impl Prompt for SearchPrompt {
    fn render_prompt_left(&self) -> std::borrow::Cow<'_, str> {
        if self.capability_loaded {
            "fhir> ".into()
        } else {
            "fhir (no capability)> ".into()
        }
    }

    fn render_prompt_right(&self) -> std::borrow::Cow<'_, str> {
        "".into()
    }

    fn render_prompt_indicator(&self, _prompt_mode: PromptEditMode) -> std::borrow::Cow<'_, str> {
        "".into()
    }

    fn render_prompt_multiline_indicator(&self) -> std::borrow::Cow<'_, str> {
        "... ".into()
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> std::borrow::Cow<'_, str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };

        format!("({}reverse-search: {}) ", prefix, history_search.term).into()
    }
}
