//! Output formatting for classification and suggestion results
//!
//! This module renders the completion core's data types for the CLI:
//! - Plain line-oriented output, suitable for piping
//! - JSON formatting (plain and pretty-printed, with optional coloring)
//! - Table formatting for suggestion lists

use colored_json::to_colored_json_auto;
use serde::Serialize;
use serde_json::json;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::completion::{AppliedEdit, ParsedQuery, Suggestion};
use crate::config::OutputFormat;
use crate::error::{FhirSearchError, Result};

/// Main formatter for CLI results
pub struct Formatter {
    /// Output format type
    format_type: OutputFormat,

    /// Enable colored output
    use_colors: bool,
}

/// One suggestion rendered as a table row
#[derive(Tabled)]
struct SuggestionRow {
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Type")]
    param_type: String,
    #[tabled(rename = "Description")]
    description: String,
}

impl Formatter {
    /// Create a new formatter
    ///
    /// # Arguments
    /// * `format_type` - Output format type
    /// * `use_colors` - Enable colored output
    pub fn new(format_type: OutputFormat, use_colors: bool) -> Self {
        Self {
            format_type,
            use_colors,
        }
    }

    /// Format a classification result
    pub fn format_parsed(&self, parsed: &ParsedQuery) -> Result<String> {
        match self.format_type {
            OutputFormat::Plain | OutputFormat::Table => Ok(self.parsed_lines(parsed)),
            OutputFormat::Json => self.to_json(parsed, false),
            OutputFormat::JsonPretty => self.to_json(parsed, true),
        }
    }

    /// Format a suggestion list
    pub fn format_suggestions(&self, suggestions: &[Suggestion]) -> Result<String> {
        match self.format_type {
            OutputFormat::Plain => Ok(suggestions
                .iter()
                .map(|s| match &s.description {
                    Some(d) => format!("{}\t{}\t{}", s.label, s.category, d),
                    None => format!("{}\t{}", s.label, s.category),
                })
                .collect::<Vec<_>>()
                .join("\n")),
            OutputFormat::Json => self.to_json(&suggestions, false),
            OutputFormat::JsonPretty => self.to_json(&suggestions, true),
            OutputFormat::Table => Ok(self.suggestions_table(suggestions)),
        }
    }

    /// Format an applied edit
    pub fn format_edit(&self, edit: &AppliedEdit) -> Result<String> {
        match self.format_type {
            OutputFormat::Plain | OutputFormat::Table => Ok(edit.new_query.clone()),
            OutputFormat::Json => self.to_json(edit, false),
            OutputFormat::JsonPretty => self.to_json(edit, true),
        }
    }

    fn parsed_lines(&self, parsed: &ParsedQuery) -> String {
        let mut lines = vec![
            format!("context: {}", parsed.context),
            format!("prefix: {:?}", parsed.prefix),
        ];
        if let Some(rt) = &parsed.resource_type {
            lines.push(format!("resource_type: {rt}"));
        }
        if let Some(param) = &parsed.current_param {
            lines.push(format!("current_param: {param}"));
        }
        if let Some(pt) = &parsed.current_param_type {
            lines.push(format!("current_param_type: {pt}"));
        }
        if let Some(chained) = &parsed.chained_resource_type {
            lines.push(format!("chained_resource_type: {chained}"));
        }
        if !parsed.used_params.is_empty() {
            lines.push(format!("used_params: {}", parsed.used_params.join(", ")));
        }
        lines.join("\n")
    }

    fn suggestions_table(&self, suggestions: &[Suggestion]) -> String {
        if suggestions.is_empty() {
            return "no suggestions".to_string();
        }
        let rows: Vec<SuggestionRow> = suggestions
            .iter()
            .map(|s| SuggestionRow {
                label: s.label.clone(),
                category: s.category.to_string(),
                param_type: s.param_type.clone().unwrap_or_default(),
                description: s.description.clone().unwrap_or_default(),
            })
            .collect();
        Table::new(rows).with(Style::rounded()).to_string()
    }

    fn to_json<T: Serialize>(&self, value: &T, pretty: bool) -> Result<String> {
        let value = json!(value);
        if pretty && self.use_colors {
            to_colored_json_auto(&value).map_err(|e| FhirSearchError::Generic(e.to_string()))
        } else if pretty {
            serde_json::to_string_pretty(&value).map_err(|e| FhirSearchError::Generic(e.to_string()))
        } else {
            serde_json::to_string(&value).map_err(|e| FhirSearchError::Generic(e.to_string()))
        }
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new(OutputFormat::Plain, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::{Suggestion, SuggestionCategory};

    fn suggestions() -> Vec<Suggestion> {
        vec![
            Suggestion::plain("Patient", SuggestionCategory::Resource),
            Suggestion::plain("_count", SuggestionCategory::Global)
                .with_description("Number of results per page"),
        ]
    }

    #[test]
    fn test_plain_suggestions() {
        let formatter = Formatter::new(OutputFormat::Plain, false);
        let out = formatter.format_suggestions(&suggestions()).unwrap();
        assert_eq!(
            out,
            "Patient\tresource\n_count\tglobal\tNumber of results per page"
        );
    }

    #[test]
    fn test_json_suggestions() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let out = formatter.format_suggestions(&suggestions()).unwrap();
        assert!(out.starts_with('['));
        assert!(out.contains("\"label\":\"Patient\""));
        assert!(out.contains("\"category\":\"resource\""));
    }

    #[test]
    fn test_table_suggestions() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let out = formatter.format_suggestions(&suggestions()).unwrap();
        assert!(out.contains("Label"));
        assert!(out.contains("Patient"));
    }

    #[test]
    fn test_empty_table() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let out = formatter.format_suggestions(&[]).unwrap();
        assert_eq!(out, "no suggestions");
    }

    #[test]
    fn test_parsed_plain() {
        let formatter = Formatter::new(OutputFormat::Plain, false);
        let parsed = ParsedQuery::unknown("???", 3);
        let out = formatter.format_parsed(&parsed).unwrap();
        assert!(out.contains("context: unknown"));
    }
}
