//! Suggestion engine: context in, ranked candidates out.
//!
//! The engine owns the static [`TypeRegistry`] and a shared
//! [`MetadataSource`]; per call it dispatches on the classified context and
//! builds the candidate list for that context only. Every list is filtered
//! case-insensitively against the typed prefix. Missing server metadata
//! degrades to fewer candidates, never to an error.

use std::sync::Arc;

use tracing::debug;

use super::apply::apply_suggestion;
use super::classifier::{classify, resolve_param_type};
use super::context::{AppliedEdit, ParsedQuery, QueryContext, Suggestion, SuggestionCategory};
use crate::capability::MetadataSource;
use crate::error::Result;
use crate::registry::{ParamType, TypeRegistry};

/// Context-sensitive suggestion engine over a metadata source.
pub struct SuggestionEngine {
    registry: TypeRegistry,
    metadata: Arc<dyn MetadataSource>,
}

impl SuggestionEngine {
    /// Create an engine over the given metadata source.
    pub fn new(metadata: Arc<dyn MetadataSource>) -> Self {
        Self {
            registry: TypeRegistry::new(),
            metadata,
        }
    }

    /// The static grammar registry.
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Classify `query` at `cursor`.
    pub fn classify(&self, query: &str, cursor: usize) -> ParsedQuery {
        classify(query, cursor, &self.registry, self.metadata.as_ref())
    }

    /// Suggestions for an already-classified query.
    pub fn suggest(&self, parsed: &ParsedQuery) -> Vec<Suggestion> {
        let suggestions = match parsed.context {
            QueryContext::ResourceType => self.resource_types(parsed),
            QueryContext::ResourceOperation => self.resource_operations(parsed),
            QueryContext::ParameterName => self.parameter_names(parsed),
            QueryContext::Modifier => self.modifiers(parsed),
            QueryContext::ParameterValue => self.parameter_values(parsed),
            QueryContext::IncludeValue => {
                self.include_values(parsed, &parsed.used_include_values, false)
            }
            QueryContext::RevIncludeValue => {
                self.include_values(parsed, &parsed.used_rev_include_values, true)
            }
            QueryContext::ChainedParameter => self.chained_parameters(parsed),
            QueryContext::Unknown => Vec::new(),
        };
        debug!(
            context = %parsed.context,
            prefix = %parsed.prefix,
            count = suggestions.len(),
            "suggestions built"
        );
        suggestions
    }

    /// Classify and suggest in one step.
    pub fn suggest_at(&self, query: &str, cursor: usize) -> (ParsedQuery, Vec<Suggestion>) {
        let parsed = self.classify(query, cursor);
        let suggestions = self.suggest(&parsed);
        (parsed, suggestions)
    }

    /// Splice `suggestion` into `query` at `cursor`.
    pub fn apply(&self, query: &str, cursor: usize, suggestion: &Suggestion) -> Result<AppliedEdit> {
        apply_suggestion(query, cursor, suggestion, &self.registry, self.metadata.as_ref())
    }

    /* ------------------------- per-context lists ------------------------- */

    fn resource_types(&self, parsed: &ParsedQuery) -> Vec<Suggestion> {
        self.registry
            .resource_types()
            .iter()
            .filter(|name| matches_prefix(name, &parsed.prefix))
            .map(|name| Suggestion::plain(*name, SuggestionCategory::Resource))
            .collect()
    }

    fn resource_operations(&self, parsed: &ParsedQuery) -> Vec<Suggestion> {
        self.registry
            .instance_operations()
            .iter()
            .filter(|op| matches_prefix(op.name, &parsed.prefix))
            .map(|op| {
                Suggestion::plain(op.name, SuggestionCategory::Operator)
                    .with_description(op.description)
            })
            .collect()
    }

    /// Global parameters plus the server-declared parameters of the current
    /// resource type, minus those already assigned in the query.
    fn parameter_names(&self, parsed: &ParsedQuery) -> Vec<Suggestion> {
        let mut suggestions = Vec::new();

        for global in self.registry.global_parameters() {
            if parsed.used_params.iter().any(|u| u == global.name) {
                continue;
            }
            if !matches_prefix(global.name, &parsed.prefix) {
                continue;
            }
            suggestions.push(Suggestion {
                label: global.name.to_string(),
                insert_text: format!("{}=", global.name),
                category: SuggestionCategory::Global,
                description: Some(global.description.to_string()),
                param_type: Some(global.param_type.as_str().to_string()),
            });
        }

        if let Some(params) = parsed
            .resource_type
            .as_deref()
            .and_then(|rt| self.metadata.search_parameters(rt))
        {
            for param in params {
                if parsed.used_params.iter().any(|u| *u == param.name) {
                    continue;
                }
                if !matches_prefix(&param.name, &parsed.prefix) {
                    continue;
                }
                suggestions.push(Suggestion {
                    label: param.name.clone(),
                    insert_text: format!("{}=", param.name),
                    category: SuggestionCategory::Parameter,
                    description: param.documentation.clone(),
                    param_type: Some(param.param_type.as_str().to_string()),
                });
            }
        }

        rank(&mut suggestions, &parsed.prefix);
        suggestions
    }

    /// Modifiers for the current parameter's type. Reference parameters
    /// additionally offer resource type names for chained search, marked so
    /// the applier follows them with `.`.
    fn modifiers(&self, parsed: &ParsedQuery) -> Vec<Suggestion> {
        let param_type = parsed
            .current_param
            .as_deref()
            .and_then(|name| {
                resolve_param_type(
                    name,
                    parsed.resource_type.as_deref(),
                    &self.registry,
                    self.metadata.as_ref(),
                )
            })
            .unwrap_or(ParamType::Special);

        let mut suggestions: Vec<Suggestion> = self
            .registry
            .modifiers(param_type)
            .iter()
            .filter(|name| matches_prefix(name, &parsed.prefix))
            .map(|name| Suggestion::plain(*name, SuggestionCategory::Modifier))
            .collect();

        if param_type == ParamType::Reference {
            for name in self.registry.resource_types() {
                if !matches_prefix(name, &parsed.prefix) {
                    continue;
                }
                let mut s = Suggestion::plain(*name, SuggestionCategory::Modifier);
                s.param_type = Some("reference-type".to_string());
                suggestions.push(s);
            }
        }

        suggestions
    }

    /// Comparison prefix operators for ordinal types, then any fixed value
    /// set registered for the parameter.
    fn parameter_values(&self, parsed: &ParsedQuery) -> Vec<Suggestion> {
        let mut suggestions = Vec::new();

        if parsed
            .current_param_type
            .is_some_and(|t| t.supports_prefix_operators())
        {
            for op in self.registry.prefix_operators() {
                if !matches_prefix(op.prefix, &parsed.prefix) {
                    continue;
                }
                suggestions.push(
                    Suggestion::plain(op.prefix, SuggestionCategory::Operator)
                        .with_description(op.label),
                );
            }
        }

        if let Some(param) = parsed.current_param.as_deref() {
            let values = parsed
                .resource_type
                .as_deref()
                .and_then(|rt| self.registry.enum_values(&format!("{rt}.{param}")))
                .or_else(|| self.registry.enum_values(param));
            if let Some(values) = values {
                for value in values {
                    if matches_prefix(value, &parsed.prefix) {
                        suggestions.push(Suggestion::plain(*value, SuggestionCategory::Value));
                    }
                }
            }
        }

        suggestions
    }

    fn include_values(&self, parsed: &ParsedQuery, used: &[String], reverse: bool) -> Vec<Suggestion> {
        let Some(rt) = parsed.resource_type.as_deref() else {
            return Vec::new();
        };
        let paths = if reverse {
            self.metadata.rev_include_paths(rt)
        } else {
            self.metadata.include_paths(rt)
        };

        let mut suggestions: Vec<Suggestion> = paths
            .into_iter()
            .filter(|p| !used.iter().any(|u| u == p))
            .filter(|p| matches_prefix(p, &parsed.prefix))
            .map(|p| Suggestion::plain(p, SuggestionCategory::Include))
            .collect();
        suggestions.sort_by(|a, b| a.label.cmp(&b.label));
        suggestions
    }

    /// Search parameters of the chained target resource type, minus any
    /// name already assigned in the query.
    fn chained_parameters(&self, parsed: &ParsedQuery) -> Vec<Suggestion> {
        let Some(params) = parsed
            .chained_resource_type
            .as_deref()
            .and_then(|rt| self.metadata.search_parameters(rt))
        else {
            return Vec::new();
        };

        let mut suggestions: Vec<Suggestion> = params
            .into_iter()
            .filter(|p| !parsed.used_params.contains(&p.name))
            .filter(|p| matches_prefix(&p.name, &parsed.prefix))
            .map(|p| Suggestion {
                insert_text: format!("{}=", p.name),
                label: p.name,
                category: SuggestionCategory::Parameter,
                description: p.documentation,
                param_type: Some(p.param_type.as_str().to_string()),
            })
            .collect();

        rank(&mut suggestions, &parsed.prefix);
        suggestions
    }
}

impl std::fmt::Debug for SuggestionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuggestionEngine").finish_non_exhaustive()
    }
}

/// Case-insensitive prefix match; an empty prefix matches everything.
fn matches_prefix(candidate: &str, prefix: &str) -> bool {
    candidate.len() >= prefix.len()
        && candidate
            .chars()
            .zip(prefix.chars())
            .all(|(c, p)| c.eq_ignore_ascii_case(&p))
}

/// Two-tier ordering for name lists: an exact (case-insensitive) match on
/// the typed prefix first, the rest lexical ascending.
fn rank(suggestions: &mut [Suggestion], prefix: &str) {
    suggestions.sort_by(|a, b| {
        let a_exact = a.label.eq_ignore_ascii_case(prefix);
        let b_exact = b.label.eq_ignore_ascii_case(prefix);
        b_exact.cmp(&a_exact).then_with(|| a.label.cmp(&b.label))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::{CapabilitySnapshot, SearchParam};

    fn engine_with(snapshot: CapabilitySnapshot) -> SuggestionEngine {
        SuggestionEngine::new(Arc::new(snapshot))
    }

    fn empty_engine() -> SuggestionEngine {
        engine_with(CapabilitySnapshot::new())
    }

    fn patient_engine() -> SuggestionEngine {
        let mut snapshot = CapabilitySnapshot::new();
        snapshot.add_resource(
            "Patient",
            vec![
                SearchParam {
                    name: "name".to_string(),
                    param_type: ParamType::String,
                    documentation: Some("A portion of any name".to_string()),
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
            vec![
                "Patient:organization".to_string(),
                "Patient:general-practitioner".to_string(),
            ],
            vec!["Observation:subject".to_string()],
        );
        snapshot.add_resource(
            "Observation",
            vec![
                SearchParam {
                    name: "code".to_string(),
                    param_type: ParamType::Token,
                    documentation: None,
                },
                SearchParam {
                    name: "subject".to_string(),
                    param_type: ParamType::Reference,
                    documentation: None,
                },
            ],
            Vec::new(),
            Vec::new(),
        );
        engine_with(snapshot)
    }

    fn labels(suggestions: &[Suggestion]) -> Vec<&str> {
        suggestions.iter().map(|s| s.label.as_str()).collect()
    }

    #[test]
    fn resource_types_filter_case_insensitively() {
        let engine = empty_engine();
        let (_, suggestions) = engine.suggest_at("/pat", 4);
        assert_eq!(labels(&suggestions), vec!["Patient"]);
    }

    #[test]
    fn empty_query_offers_all_resource_types() {
        let engine = empty_engine();
        let (parsed, suggestions) = engine.suggest_at("", 0);
        assert_eq!(parsed.context, QueryContext::ResourceType);
        assert!(suggestions.len() > 100);
        assert!(suggestions.iter().all(|s| s.category == SuggestionCategory::Resource));
    }

    #[test]
    fn parameter_names_merge_globals_and_metadata() {
        let engine = patient_engine();
        let (_, suggestions) = engine.suggest_at("Patient?", 8);
        let names = labels(&suggestions);
        assert!(names.contains(&"_count"));
        assert!(names.contains(&"name"));
        assert!(names.contains(&"gender"));
    }

    #[test]
    fn parameter_names_insert_with_equals() {
        let engine = patient_engine();
        let (_, suggestions) = engine.suggest_at("Patient?na", 10);
        let name = suggestions.iter().find(|s| s.label == "name").unwrap();
        assert_eq!(name.insert_text, "name=");
        assert_eq!(name.category, SuggestionCategory::Parameter);
    }

    #[test]
    fn used_parameters_are_excluded() {
        let engine = patient_engine();
        let (_, suggestions) = engine.suggest_at("Patient?gender=male&", 20);
        let names = labels(&suggestions);
        assert!(!names.contains(&"gender"));
        assert!(names.contains(&"name"));
    }

    #[test]
    fn exact_label_match_ranks_first() {
        let mut snapshot = CapabilitySnapshot::new();
        snapshot.add_resource(
            "Patient",
            vec![
                SearchParam {
                    name: "name-use".to_string(),
                    param_type: ParamType::Token,
                    documentation: None,
                },
                SearchParam {
                    name: "name".to_string(),
                    param_type: ParamType::String,
                    documentation: None,
                },
            ],
            Vec::new(),
            Vec::new(),
        );
        let engine = engine_with(snapshot);
        let (_, suggestions) = engine.suggest_at("Patient?name", 12);
        assert_eq!(labels(&suggestions), vec!["name", "name-use"]);
    }

    #[test]
    fn without_metadata_only_globals_remain() {
        let engine = empty_engine();
        let (_, suggestions) = engine.suggest_at("Patient?", 8);
        assert!(!suggestions.is_empty());
        assert!(suggestions
            .iter()
            .all(|s| s.category == SuggestionCategory::Global));
    }

    #[test]
    fn string_parameter_modifiers() {
        let engine = patient_engine();
        let (_, suggestions) = engine.suggest_at("Patient?name:", 13);
        let names = labels(&suggestions);
        assert!(names.contains(&"exact"));
        assert!(names.contains(&"contains"));
        assert!(!names.contains(&"of-type"));
    }

    #[test]
    fn reference_modifiers_offer_resource_types() {
        let engine = patient_engine();
        let (_, suggestions) = engine.suggest_at("Patient?general-practitioner:Org", 32);
        let org = suggestions.iter().find(|s| s.label == "Organization").unwrap();
        assert!(org.is_reference_type());
    }

    #[test]
    fn unknown_parameter_modifiers_fall_back_to_missing() {
        let engine = empty_engine();
        let (_, suggestions) = engine.suggest_at("Patient?whatever:", 17);
        assert_eq!(labels(&suggestions), vec!["missing"]);
    }

    #[test]
    fn date_values_offer_prefix_operators() {
        let engine = patient_engine();
        let (_, suggestions) = engine.suggest_at("Patient?birthdate=", 18);
        let codes = labels(&suggestions);
        assert_eq!(codes, vec!["eq", "ne", "gt", "lt", "ge", "le", "sa", "eb", "ap"]);
        assert!(suggestions
            .iter()
            .all(|s| s.category == SuggestionCategory::Operator));
    }

    #[test]
    fn token_values_offer_enum_values() {
        let engine = patient_engine();
        let (_, suggestions) = engine.suggest_at("Patient?gender=", 15);
        let values = labels(&suggestions);
        assert!(values.contains(&"male"));
        assert!(values.contains(&"unknown"));
    }

    #[test]
    fn string_values_offer_nothing() {
        let engine = patient_engine();
        let (parsed, suggestions) = engine.suggest_at("Patient?name=Al", 15);
        assert_eq!(parsed.context, QueryContext::ParameterValue);
        assert!(suggestions.is_empty());
    }

    #[test]
    fn include_values_exclude_used_and_sort() {
        let engine = patient_engine();
        let query = "Patient?_include=Patient:organization&_include=";
        let (_, suggestions) = engine.suggest_at(query, query.len());
        assert_eq!(labels(&suggestions), vec!["Patient:general-practitioner"]);
    }

    #[test]
    fn revinclude_values_come_from_rev_paths() {
        let engine = patient_engine();
        let query = "Patient?_revinclude=";
        let (_, suggestions) = engine.suggest_at(query, query.len());
        assert_eq!(labels(&suggestions), vec!["Observation:subject"]);
    }

    #[test]
    fn include_values_without_metadata_are_empty() {
        let engine = empty_engine();
        let query = "Patient?_include=";
        let (_, suggestions) = engine.suggest_at(query, query.len());
        assert!(suggestions.is_empty());
    }

    #[test]
    fn chained_parameters_use_target_resource() {
        let engine = patient_engine();
        let query = "Observation?subject:Patient.na";
        let (_, suggestions) = engine.suggest_at(query, query.len());
        assert_eq!(labels(&suggestions), vec!["name"]);
        assert_eq!(suggestions[0].insert_text, "name=");
    }

    #[test]
    fn chained_parameters_exclude_used_names() {
        let engine = patient_engine();
        let query = "Observation?name=x&subject:Patient.na";
        let (_, suggestions) = engine.suggest_at(query, query.len());
        assert!(labels(&suggestions).is_empty());

        let query = "Observation?name=x&subject:Patient.";
        let (_, suggestions) = engine.suggest_at(query, query.len());
        let names = labels(&suggestions);
        assert!(!names.contains(&"name"));
        assert!(names.contains(&"gender"));
    }

    #[test]
    fn unknown_context_yields_nothing() {
        let engine = patient_engine();
        let (parsed, suggestions) = engine.suggest_at("///", 3);
        assert!(parsed.context.is_unknown());
        assert!(suggestions.is_empty());
    }

    #[test]
    fn instance_operations_are_suggested() {
        let engine = empty_engine();
        let (_, suggestions) = engine.suggest_at("/Patient/123/_h", 15);
        assert_eq!(labels(&suggestions), vec!["_history"]);
        let (_, suggestions) = engine.suggest_at("/Patient/123/", 13);
        assert_eq!(labels(&suggestions), vec!["_history", "$everything"]);
    }
}
