//! Cursor context classification.
//!
//! `classify` maps (query text, cursor offset) to a [`ParsedQuery`]. It is
//! a pure function of its inputs plus the injected metadata snapshot, never
//! fails, and tolerates arbitrarily malformed input: anything the grammar
//! does not recognize classifies as [`QueryContext::Unknown`].
//!
//! The grammar is decided by an ordered list of matchers evaluated
//! top-to-bottom against the text before the cursor, first match wins.
//! Order carries meaning; see the notes on the individual matchers.

use super::context::{ParsedQuery, QueryContext};
use crate::capability::MetadataSource;
use crate::registry::{ParamType, TypeRegistry};

/// Outcome of a single matcher. Tagged per context so the conversion into
/// a [`ParsedQuery`] stays exhaustive when a context is added.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ContextMatch {
    ResourceType { prefix: String },
    ResourceOperation { resource_type: String, prefix: String },
    ChainedParameter { param: String, target: String, prefix: String },
    Modifier { param: String, prefix: String },
    ParameterValue { param: String, prefix: String },
    IncludeValue { prefix: String },
    RevIncludeValue { prefix: String },
    ParameterName { prefix: String },
}

/// Classify `query` at `cursor`.
///
/// The cursor is clamped to `[0, query.len()]` and floored to a char
/// boundary; classification itself has no failure path.
pub fn classify(
    query: &str,
    cursor: usize,
    registry: &TypeRegistry,
    metadata: &dyn MetadataSource,
) -> ParsedQuery {
    let cursor = clamp_cursor(query, cursor);
    let before = &query[..cursor];

    // Query-wide facts, independent of the cursor position. Used-value
    // extraction deliberately scans the whole string: a parameter assigned
    // after the cursor is still committed and must not be re-suggested.
    let resource_type = extract_resource_type(query);
    let (used_params, used_include_values, used_rev_include_values) = extract_used(query);

    let matched = match_resource_type(before)
        .or_else(|| match_resource_operation(before))
        .or_else(|| match_chained_parameter(before))
        .or_else(|| match_modifier(before))
        .or_else(|| match_parameter_value(before))
        .or_else(|| match_parameter_name(before));

    let mut parsed = ParsedQuery {
        query: query.to_string(),
        cursor,
        context: QueryContext::Unknown,
        resource_type,
        current_param: None,
        current_param_type: None,
        prefix: String::new(),
        used_params,
        used_include_values,
        used_rev_include_values,
        chained_resource_type: None,
    };

    let Some(matched) = matched else {
        return parsed;
    };

    match matched {
        ContextMatch::ResourceType { prefix } => {
            parsed.context = QueryContext::ResourceType;
            parsed.prefix = prefix;
        }
        ContextMatch::ResourceOperation { resource_type, prefix } => {
            parsed.context = QueryContext::ResourceOperation;
            parsed.resource_type = Some(resource_type);
            parsed.prefix = prefix;
        }
        ContextMatch::ChainedParameter { param, target, prefix } => {
            parsed.context = QueryContext::ChainedParameter;
            parsed.current_param = Some(param);
            parsed.chained_resource_type = Some(target);
            parsed.prefix = prefix;
        }
        ContextMatch::Modifier { param, prefix } => {
            parsed.context = QueryContext::Modifier;
            parsed.current_param = Some(param);
            parsed.prefix = prefix;
        }
        ContextMatch::ParameterValue { param, prefix } => {
            parsed.context = QueryContext::ParameterValue;
            parsed.current_param_type = resolve_param_type(
                &param,
                parsed.resource_type.as_deref(),
                registry,
                metadata,
            );
            parsed.current_param = Some(param);
            parsed.prefix = prefix;
        }
        ContextMatch::IncludeValue { prefix } => {
            parsed.context = QueryContext::IncludeValue;
            parsed.prefix = prefix;
        }
        ContextMatch::RevIncludeValue { prefix } => {
            parsed.context = QueryContext::RevIncludeValue;
            parsed.prefix = prefix;
        }
        ContextMatch::ParameterName { prefix } => {
            parsed.context = QueryContext::ParameterName;
            parsed.prefix = prefix;
        }
    }

    parsed
}

/// Resolve a parameter's primitive type: global parameters first, then the
/// metadata snapshot of the query's resource type.
pub(crate) fn resolve_param_type(
    name: &str,
    resource_type: Option<&str>,
    registry: &TypeRegistry,
    metadata: &dyn MetadataSource,
) -> Option<ParamType> {
    if let Some(global) = registry.global_parameter(name) {
        return Some(global.param_type);
    }
    let resource_type = resource_type?;
    metadata
        .search_parameters(resource_type)?
        .iter()
        .find(|p| p.name == name)
        .map(|p| p.param_type)
}

/* ============================== Matchers ============================== */

/// Matcher 1+2: an optional leading `/` followed by nothing but letters
/// (including the empty query) is a resource type being typed.
fn match_resource_type(before: &str) -> Option<ContextMatch> {
    let rest = before.strip_prefix('/').unwrap_or(before);
    if rest.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(ContextMatch::ResourceType { prefix: rest.to_string() })
    } else {
        None
    }
}

/// Matcher 3: `/<Type>/<id>/` optionally followed by a partial operation
/// token (`_history`, `$everything`).
fn match_resource_operation(before: &str) -> Option<ContextMatch> {
    let rest = before.strip_prefix('/').unwrap_or(before);
    let mut parts = rest.split('/');
    let (ty, id, partial) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(ty), Some(id), Some(partial), None) => (ty, id, partial),
        _ => return None,
    };

    if ty.is_empty() || !ty.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    if id.is_empty() || id.contains('?') {
        return None;
    }
    if !partial.is_empty() {
        let mut chars = partial.chars();
        if !matches!(chars.next(), Some('_' | '$')) {
            return None;
        }
        if !chars.all(is_ident_char) {
            return None;
        }
    }

    Some(ContextMatch::ResourceOperation {
        resource_type: ty.to_string(),
        prefix: partial.to_string(),
    })
}

/// Matcher 4: the parameter segment reads `<param>:<Type>.<partial>`.
///
/// Must run before the modifier matcher: both share the `:` delimiter and
/// the chained form is the more specific one. Swapping the order would
/// classify every chained path as a modifier.
fn match_chained_parameter(before: &str) -> Option<ContextMatch> {
    let seg = param_segment(before)?;
    let colon = seg.find(':')?;
    let (name, rest) = (&seg[..colon], &seg[colon + 1..]);
    let dot = rest.find('.')?;
    let (target, partial) = (&rest[..dot], &rest[dot + 1..]);

    if name.is_empty() || !name.chars().all(is_ident_char) {
        return None;
    }
    if target.is_empty() || !target.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    if !partial.chars().all(is_ident_char) {
        return None;
    }

    Some(ContextMatch::ChainedParameter {
        param: name.to_string(),
        target: target.to_string(),
        prefix: partial.to_string(),
    })
}

/// Matcher 5: the parameter segment reads `<param>:<partial>` with no dot
/// and no value assignment yet.
fn match_modifier(before: &str) -> Option<ContextMatch> {
    let seg = param_segment(before)?;
    let colon = seg.find(':')?;
    let (name, partial) = (&seg[..colon], &seg[colon + 1..]);

    if name.is_empty() || !name.chars().all(is_ident_char) {
        return None;
    }
    if !partial.chars().all(is_ident_char) {
        return None;
    }

    Some(ContextMatch::Modifier {
        param: name.to_string(),
        prefix: partial.to_string(),
    })
}

/// Matcher 6: the parameter segment reads `<param>[:<modifier>]=<value>`.
/// `_include` and `_revinclude` get their own contexts with the prefix cut
/// at the last comma so multi-value editing completes the current element.
fn match_parameter_value(before: &str) -> Option<ContextMatch> {
    let seg = param_segment(before)?;
    let eq = seg.find('=')?;
    let (name_part, value) = (&seg[..eq], &seg[eq + 1..]);
    let (name, _modifier) = split_name_modifier(name_part)?;

    Some(match name {
        "_include" => ContextMatch::IncludeValue { prefix: tail_after_comma(value) },
        "_revinclude" => ContextMatch::RevIncludeValue { prefix: tail_after_comma(value) },
        _ => ContextMatch::ParameterValue {
            param: name.to_string(),
            prefix: value.to_string(),
        },
    })
}

/// Matcher 7: the parameter segment is a bare (possibly empty) identifier
/// right after `?` or `&`.
fn match_parameter_name(before: &str) -> Option<ContextMatch> {
    let seg = param_segment(before)?;
    if seg.chars().all(is_ident_char) {
        Some(ContextMatch::ParameterName { prefix: seg.to_string() })
    } else {
        None
    }
}

/* =========================== Query-wide scans ========================== */

/// Resource type named by the query path: optional leading `/`, then the
/// initial run of letters.
fn extract_resource_type(query: &str) -> Option<String> {
    let rest = query.strip_prefix('/').unwrap_or(query);
    let end = rest
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(rest.len());
    if end == 0 {
        None
    } else {
        Some(rest[..end].to_string())
    }
}

/// One pass over the whole query collecting every `[?&]name(:modifier)?=`
/// assignment plus the comma-split values of `_include=`/`_revinclude=`.
fn extract_used(query: &str) -> (Vec<String>, Vec<String>, Vec<String>) {
    let mut used_params = Vec::new();
    let mut used_includes = Vec::new();
    let mut used_rev_includes = Vec::new();

    for (i, ch) in query.char_indices() {
        if ch != '?' && ch != '&' {
            continue;
        }
        let rest = &query[i + 1..];
        let name_end = rest.find(|c| !is_ident_char(c)).unwrap_or(rest.len());
        let name = &rest[..name_end];
        if name.is_empty() {
            continue;
        }

        let mut after_name = &rest[name_end..];
        if let Some(after_colon) = after_name.strip_prefix(':') {
            let m_end = after_colon
                .find(|c| !is_ident_char(c))
                .unwrap_or(after_colon.len());
            after_name = &after_colon[m_end..];
        }
        let Some(value_on) = after_name.strip_prefix('=') else {
            continue;
        };

        used_params.push(name.to_string());

        if name == "_include" || name == "_revinclude" {
            let value = value_on.split('&').next().unwrap_or("");
            let bucket = if name == "_include" {
                &mut used_includes
            } else {
                &mut used_rev_includes
            };
            for part in value.split(',') {
                let trimmed = part.trim();
                if !trimmed.is_empty() {
                    bucket.push(trimmed.to_string());
                }
            }
        }
    }

    (used_params, used_includes, used_rev_includes)
}

/* ============================== Helpers =============================== */

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Text after the last `?`/`&` before the cursor; `None` when the query
/// part has not started yet.
fn param_segment(before: &str) -> Option<&str> {
    before.rfind(['?', '&']).map(|i| &before[i + 1..])
}

/// Split `name` or `name:modifier`, anchored at the end of the slice so a
/// chained prefix (`subject:Patient.name`) still yields the leaf name.
fn split_name_modifier(part: &str) -> Option<(&str, Option<&str>)> {
    let start1 = trailing_ident_start(part);
    let run1 = &part[start1..];
    if run1.is_empty() {
        return None;
    }
    if let Some(head) = part[..start1].strip_suffix(':') {
        let start2 = trailing_ident_start(head);
        let run2 = &head[start2..];
        if !run2.is_empty() {
            return Some((run2, Some(run1)));
        }
    }
    Some((run1, None))
}

/// Byte index where the trailing identifier run of `s` begins (`s.len()`
/// when the last char is not an identifier char).
fn trailing_ident_start(s: &str) -> usize {
    s.char_indices()
        .rev()
        .take_while(|(_, c)| is_ident_char(*c))
        .last()
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Portion of an include value list after its last comma.
fn tail_after_comma(value: &str) -> String {
    value.rsplit(',').next().unwrap_or("").to_string()
}

/// Clamp to the query bounds and floor to a char boundary so slicing is
/// always valid even for callers tracking UTF-16 style offsets.
fn clamp_cursor(query: &str, cursor: usize) -> usize {
    let mut cursor = cursor.min(query.len());
    while cursor > 0 && !query.is_char_boundary(cursor) {
        cursor -= 1;
    }
    cursor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{CapabilitySnapshot, SearchParam};

    fn registry() -> TypeRegistry {
        TypeRegistry::new()
    }

    fn empty_metadata() -> CapabilitySnapshot {
        CapabilitySnapshot::new()
    }

    fn patient_metadata() -> CapabilitySnapshot {
        let mut snapshot = CapabilitySnapshot::new();
        snapshot.add_resource(
            "Patient",
            vec![
                SearchParam {
                    name: "name".to_string(),
                    param_type: ParamType::String,
                    documentation: None,
                },
                SearchParam {
                    name: "gender".to_string(),
                    param_type: ParamType::Token,
                    documentation: None,
                },
                SearchParam {
                    name: "birthdate".to_string(),
                    param_type: ParamType::Date,
                    documentation: None,
                },
                SearchParam {
                    name: "general-practitioner".to_string(),
                    param_type: ParamType::Reference,
                    documentation: None,
                },
            ],
            vec!["Patient:organization".to_string()],
            vec!["Observation:subject".to_string()],
        );
        snapshot
    }

    fn classify_plain(query: &str, cursor: usize) -> ParsedQuery {
        classify(query, cursor, &registry(), &empty_metadata())
    }

    #[test]
    fn empty_query_is_resource_type() {
        let parsed = classify_plain("", 0);
        assert_eq!(parsed.context, QueryContext::ResourceType);
        assert_eq!(parsed.prefix, "");
    }

    #[test]
    fn bare_slash_is_resource_type() {
        let parsed = classify_plain("/", 1);
        assert_eq!(parsed.context, QueryContext::ResourceType);
        assert_eq!(parsed.prefix, "");
    }

    #[test]
    fn partial_resource_type() {
        let parsed = classify_plain("/Pat", 4);
        assert_eq!(parsed.context, QueryContext::ResourceType);
        assert_eq!(parsed.prefix, "Pat");
    }

    #[test]
    fn resource_type_without_leading_slash() {
        let parsed = classify_plain("Pat", 3);
        assert_eq!(parsed.context, QueryContext::ResourceType);
        assert_eq!(parsed.prefix, "Pat");
    }

    #[test]
    fn cursor_inside_resource_type() {
        let parsed = classify_plain("/Patient?name=Al", 5);
        assert_eq!(parsed.context, QueryContext::ResourceType);
        assert_eq!(parsed.prefix, "Pati");
        // Query-wide facts still see the whole string.
        assert_eq!(parsed.resource_type.as_deref(), Some("Patient"));
        assert_eq!(parsed.used_params, vec!["name"]);
    }

    #[test]
    fn question_mark_starts_parameter_name() {
        let parsed = classify_plain("/Patient?", 9);
        assert_eq!(parsed.context, QueryContext::ParameterName);
        assert_eq!(parsed.resource_type.as_deref(), Some("Patient"));
        assert_eq!(parsed.prefix, "");
    }

    #[test]
    fn partial_parameter_name() {
        let parsed = classify_plain("Patient?_c", 10);
        assert_eq!(parsed.context, QueryContext::ParameterName);
        assert_eq!(parsed.prefix, "_c");
    }

    #[test]
    fn parameter_value_context() {
        let parsed = classify_plain("Patient?gender=", 15);
        assert_eq!(parsed.context, QueryContext::ParameterValue);
        assert_eq!(parsed.current_param.as_deref(), Some("gender"));
        assert_eq!(parsed.prefix, "");
    }

    #[test]
    fn parameter_value_type_resolved_from_metadata() {
        let parsed = classify("Patient?gender=", 15, &registry(), &patient_metadata());
        assert_eq!(parsed.current_param_type, Some(ParamType::Token));
    }

    #[test]
    fn parameter_value_type_prefers_global_parameters() {
        let parsed = classify("Patient?_count=", 15, &registry(), &patient_metadata());
        assert_eq!(parsed.current_param_type, Some(ParamType::Number));
    }

    #[test]
    fn parameter_value_type_absent_without_metadata() {
        let parsed = classify_plain("Patient?gender=", 15);
        assert_eq!(parsed.current_param_type, None);
    }

    #[test]
    fn modifier_context() {
        let parsed = classify_plain("Patient?name:", 13);
        assert_eq!(parsed.context, QueryContext::Modifier);
        assert_eq!(parsed.current_param.as_deref(), Some("name"));
        assert_eq!(parsed.prefix, "");
    }

    #[test]
    fn partial_modifier() {
        let parsed = classify_plain("Patient?name:ex", 15);
        assert_eq!(parsed.context, QueryContext::Modifier);
        assert_eq!(parsed.prefix, "ex");
    }

    #[test]
    fn chained_parameter_wins_over_modifier() {
        let parsed = classify_plain("Observation?subject:Patient.na", 30);
        assert_eq!(parsed.context, QueryContext::ChainedParameter);
        assert_eq!(parsed.current_param.as_deref(), Some("subject"));
        assert_eq!(parsed.chained_resource_type.as_deref(), Some("Patient"));
        assert_eq!(parsed.prefix, "na");
    }

    #[test]
    fn chained_parameter_with_empty_tail() {
        let parsed = classify_plain("Observation?subject:Patient.", 28);
        assert_eq!(parsed.context, QueryContext::ChainedParameter);
        assert_eq!(parsed.prefix, "");
    }

    #[test]
    fn modifier_with_value_is_parameter_value() {
        let parsed = classify_plain("Patient?name:exact=Al", 21);
        assert_eq!(parsed.context, QueryContext::ParameterValue);
        assert_eq!(parsed.current_param.as_deref(), Some("name"));
        assert_eq!(parsed.prefix, "Al");
    }

    #[test]
    fn include_value_context_splits_on_comma() {
        let query = "Patient?_include=Patient:organization,Pat";
        let parsed = classify_plain(query, query.len());
        assert_eq!(parsed.context, QueryContext::IncludeValue);
        assert_eq!(parsed.prefix, "Pat");
        assert!(parsed
            .used_include_values
            .contains(&"Patient:organization".to_string()));
    }

    #[test]
    fn include_value_with_colon_is_not_a_modifier() {
        let query = "Patient?_include=Patient:organ";
        let parsed = classify_plain(query, query.len());
        assert_eq!(parsed.context, QueryContext::IncludeValue);
        assert_eq!(parsed.prefix, "Patient:organ");
    }

    #[test]
    fn revinclude_value_context() {
        let query = "Patient?_revinclude=Obs";
        let parsed = classify_plain(query, query.len());
        assert_eq!(parsed.context, QueryContext::RevIncludeValue);
        assert_eq!(parsed.prefix, "Obs");
    }

    #[test]
    fn include_with_iterate_modifier_still_include_value() {
        let query = "Patient?_include:iterate=Patient:link";
        let parsed = classify_plain(query, query.len());
        assert_eq!(parsed.context, QueryContext::IncludeValue);
        assert_eq!(parsed.prefix, "Patient:link");
    }

    #[test]
    fn resource_operation_context() {
        let parsed = classify_plain("/Patient/123/_hi", 16);
        assert_eq!(parsed.context, QueryContext::ResourceOperation);
        assert_eq!(parsed.resource_type.as_deref(), Some("Patient"));
        assert_eq!(parsed.prefix, "_hi");
    }

    #[test]
    fn resource_operation_empty_tail() {
        let parsed = classify_plain("/Patient/abc-42/", 16);
        assert_eq!(parsed.context, QueryContext::ResourceOperation);
        assert_eq!(parsed.prefix, "");
    }

    #[test]
    fn resource_operation_dollar_prefix() {
        let parsed = classify_plain("/Patient/1/$ev", 14);
        assert_eq!(parsed.context, QueryContext::ResourceOperation);
        assert_eq!(parsed.prefix, "$ev");
    }

    #[test]
    fn garbage_is_unknown() {
        let parsed = classify_plain("///", 3);
        assert_eq!(parsed.context, QueryContext::Unknown);
        assert!(parsed.prefix.is_empty());
    }

    #[test]
    fn used_params_scan_whole_query() {
        // Cursor sits between the two assignments; both are still reported.
        let query = "Patient?gender=male&name=";
        for cursor in [8, query.len()] {
            let parsed = classify_plain(query, cursor);
            assert!(parsed.used_params.contains(&"gender".to_string()));
            assert!(parsed.used_params.contains(&"name".to_string()));
        }
    }

    #[test]
    fn used_params_preserve_order_and_duplicates() {
        let query = "Patient?gender=male&gender=female&name=x";
        let parsed = classify_plain(query, query.len());
        assert_eq!(parsed.used_params, vec!["gender", "gender", "name"]);
    }

    #[test]
    fn used_params_include_modifier_forms() {
        let query = "Patient?name:exact=Smith&";
        let parsed = classify_plain(query, query.len());
        assert_eq!(parsed.used_params, vec!["name"]);
        assert_eq!(parsed.context, QueryContext::ParameterName);
    }

    #[test]
    fn revinclude_assignment_does_not_pollute_include_values() {
        let query = "Patient?_revinclude=Observation:subject&_include=Patient:link";
        let parsed = classify_plain(query, query.len());
        assert_eq!(parsed.used_include_values, vec!["Patient:link"]);
        assert_eq!(parsed.used_rev_include_values, vec!["Observation:subject"]);
    }

    #[test]
    fn cursor_clamped_to_length() {
        let parsed = classify_plain("/Pat", 400);
        assert_eq!(parsed.cursor, 4);
        assert_eq!(parsed.context, QueryContext::ResourceType);
    }

    #[test]
    fn cursor_floored_to_char_boundary() {
        let query = "Patient?name=Ål";
        // Index one past 'Å's first byte is not a boundary.
        let inside = query.find('Å').unwrap() + 1;
        let parsed = classify_plain(query, inside);
        assert_eq!(parsed.context, QueryContext::ParameterValue);
    }
}
