//! Completion data model: query contexts, parsed queries and suggestions.

use serde::Serialize;

use crate::registry::ParamType;

/// Grammatical category of the token under the cursor.
///
/// Closed set; classification assigns exactly one per (query, cursor)
/// pair and falls back to [`QueryContext::Unknown`] instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryContext {
    /// Typing the resource type in the path, e.g. `/Pat`.
    ResourceType,
    /// Typing an instance-level operation, e.g. `/Patient/123/_hi`.
    ResourceOperation,
    /// Typing a search parameter name after `?` or `&`.
    ParameterName,
    /// Typing a modifier after `name:`.
    Modifier,
    /// Typing a value after `name=`.
    ParameterValue,
    /// Typing an `_include=` value.
    IncludeValue,
    /// Typing a `_revinclude=` value.
    RevIncludeValue,
    /// Typing the sub-parameter of a chained reference, `ref:Type.x`.
    ChainedParameter,
    /// Nothing the grammar recognizes; no suggestions.
    Unknown,
}

impl QueryContext {
    /// Stable identifier used in CLI output and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryContext::ResourceType => "resource_type",
            QueryContext::ResourceOperation => "resource_operation",
            QueryContext::ParameterName => "parameter_name",
            QueryContext::Modifier => "modifier",
            QueryContext::ParameterValue => "parameter_value",
            QueryContext::IncludeValue => "include_value",
            QueryContext::RevIncludeValue => "revinclude_value",
            QueryContext::ChainedParameter => "chained_parameter",
            QueryContext::Unknown => "unknown",
        }
    }

    /// Check if this is the Unknown context.
    pub fn is_unknown(&self) -> bool {
        matches!(self, QueryContext::Unknown)
    }
}

impl std::fmt::Display for QueryContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying a query at a cursor position.
///
/// Ephemeral value, rebuilt on every keystroke; owns no resources and has
/// no identity beyond its fields. The `used_*` collections are computed
/// over the entire query text, not just the part before the cursor — they
/// describe what the query has already committed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedQuery {
    /// Verbatim query text.
    pub query: String,
    /// Cursor position (byte offset), clamped to the query bounds.
    pub cursor: usize,
    /// Classified context at the cursor.
    pub context: QueryContext,
    /// Resource type named in the query path, wherever the cursor is.
    pub resource_type: Option<String>,
    /// Parameter the cursor is inside (modifier, value and chained contexts).
    pub current_param: Option<String>,
    /// Resolved type of `current_param`; only populated for values.
    pub current_param_type: Option<ParamType>,
    /// Partial token before the cursor, matched against candidates and
    /// replaced when a suggestion is accepted.
    pub prefix: String,
    /// Parameter names already assigned anywhere in the query, in order,
    /// duplicates preserved.
    pub used_params: Vec<String>,
    /// Values already present in `_include=` assignments.
    pub used_include_values: Vec<String>,
    /// Values already present in `_revinclude=` assignments.
    pub used_rev_include_values: Vec<String>,
    /// Target resource type of a chained reference filter.
    pub chained_resource_type: Option<String>,
}

impl ParsedQuery {
    /// A parsed query with no recognized structure beyond the inputs.
    pub fn unknown(query: &str, cursor: usize) -> Self {
        Self {
            query: query.to_string(),
            cursor,
            context: QueryContext::Unknown,
            resource_type: None,
            current_param: None,
            current_param_type: None,
            prefix: String::new(),
            used_params: Vec::new(),
            used_include_values: Vec::new(),
            used_rev_include_values: Vec::new(),
            chained_resource_type: None,
        }
    }
}

/// Category of a suggestion, used for display grouping and styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionCategory {
    Resource,
    Parameter,
    Modifier,
    Operator,
    Value,
    Global,
    Include,
}

impl SuggestionCategory {
    /// Stable identifier used in CLI output.
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionCategory::Resource => "resource",
            SuggestionCategory::Parameter => "parameter",
            SuggestionCategory::Modifier => "modifier",
            SuggestionCategory::Operator => "operator",
            SuggestionCategory::Value => "value",
            SuggestionCategory::Global => "global",
            SuggestionCategory::Include => "include",
        }
    }
}

impl std::fmt::Display for SuggestionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One completion candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    /// Display text.
    pub label: String,
    /// Text spliced into the query when accepted.
    pub insert_text: String,
    /// Display category.
    pub category: SuggestionCategory,
    /// Optional short description shown next to the label.
    pub description: Option<String>,
    /// Parameter type marker; `"reference-type"` flags resource type
    /// candidates offered in modifier position for chained search, which
    /// the applier follows with `.` instead of `=`.
    pub param_type: Option<String>,
}

impl Suggestion {
    /// Create a suggestion whose insert text equals its label.
    pub fn plain(label: impl Into<String>, category: SuggestionCategory) -> Self {
        let label = label.into();
        Self {
            insert_text: label.clone(),
            label,
            category,
            description: None,
            param_type: None,
        }
    }

    /// Attach a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Whether this is a reference-chaining resource type candidate.
    pub fn is_reference_type(&self) -> bool {
        self.param_type.as_deref() == Some("reference-type")
    }
}

/// Result of applying a suggestion to a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedEdit {
    /// Query text after the splice.
    pub new_query: String,
    /// Cursor position after the splice (end of the inserted text).
    pub new_cursor: usize,
}
