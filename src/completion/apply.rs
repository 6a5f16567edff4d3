//! Splicing an accepted suggestion back into the query text.
//!
//! The applier re-classifies the query, computes the byte range occupied by
//! the token being completed and replaces exactly that range. Everything
//! after the cursor is preserved so accepting a suggestion mid-query never
//! destroys trailing text.

use super::classifier::classify;
use super::context::{AppliedEdit, ParsedQuery, QueryContext, Suggestion};
use crate::capability::MetadataSource;
use crate::error::{FhirSearchError, Result};
use crate::registry::TypeRegistry;

/// Apply `suggestion` to `query` at `cursor`.
///
/// # Errors
///
/// Returns [`FhirSearchError::CursorOutOfRange`] when `cursor` lies past
/// the end of the query.
pub fn apply_suggestion(
    query: &str,
    cursor: usize,
    suggestion: &Suggestion,
    registry: &TypeRegistry,
    metadata: &dyn MetadataSource,
) -> Result<AppliedEdit> {
    if cursor > query.len() {
        return Err(FhirSearchError::CursorOutOfRange {
            cursor,
            len: query.len(),
        });
    }

    let parsed = classify(query, cursor, registry, metadata);
    let start = replace_start(&parsed);
    let insertion = insertion_text(&parsed, suggestion);

    let mut new_query = String::with_capacity(query.len() + insertion.len());
    new_query.push_str(&query[..start]);
    new_query.push_str(&insertion);
    new_query.push_str(&query[parsed.cursor..]);

    Ok(AppliedEdit {
        new_cursor: start + insertion.len(),
        new_query,
    })
}

/// Byte offset where the token under the cursor begins; the replaced range
/// is `start..cursor`. Shared with the interactive completer, which reports
/// the same range as a span.
///
/// Every context's prefix is the literal query text between the token start
/// and the cursor, so the anchor is derived from it directly. The classifier
/// is the single authority on token boundaries; filtering and replacement
/// always agree, even for values that contain their own delimiter
/// (`Patient?name=a=b` replaces all of `a=b`).
pub(crate) fn replace_start(parsed: &ParsedQuery) -> usize {
    parsed.cursor - parsed.prefix.len()
}

/// Text spliced in for `suggestion`. Modifier completions get their
/// follow-up delimiter here: `=` to move straight to the value, or `.` when
/// the accepted candidate is a resource type starting a chained path.
pub(crate) fn insertion_text(parsed: &ParsedQuery, suggestion: &Suggestion) -> String {
    let mut text = suggestion.insert_text.clone();
    if parsed.context == QueryContext::Modifier {
        text.push(if suggestion.is_reference_type() { '.' } else { '=' });
    }
    text
}
