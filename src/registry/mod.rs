//! Static type registry for the FHIR search grammar.
//!
//! The registry is the seeded, server-independent half of the suggestion
//! data: resource type names, the modifier table keyed by search parameter
//! type, comparison prefix operators, cross-resource (global) search
//! parameters, small fixed value sets, and instance-level operations.
//! Everything here is pure lookup; server-declared data lives in
//! [`crate::capability`].

mod resource_types;
mod value_sets;

use serde::{Deserialize, Serialize};

pub use resource_types::RESOURCE_TYPES;
pub use value_sets::VALUE_SETS;

/// Primitive type of a search parameter, as declared in a capability
/// statement (`searchParam.type`, lowercase on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    Number,
    Date,
    String,
    Token,
    Reference,
    Composite,
    Quantity,
    Uri,
    Special,
}

impl ParamType {
    /// Wire-format code for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::Number => "number",
            ParamType::Date => "date",
            ParamType::String => "string",
            ParamType::Token => "token",
            ParamType::Reference => "reference",
            ParamType::Composite => "composite",
            ParamType::Quantity => "quantity",
            ParamType::Uri => "uri",
            ParamType::Special => "special",
        }
    }

    /// Parse a wire-format code; unknown codes map to `Special` so a
    /// forward-incompatible capability statement never breaks completion.
    pub fn from_code(code: &str) -> Self {
        match code {
            "number" => ParamType::Number,
            "date" => ParamType::Date,
            "string" => ParamType::String,
            "token" => ParamType::Token,
            "reference" => ParamType::Reference,
            "composite" => ParamType::Composite,
            "quantity" => ParamType::Quantity,
            "uri" => ParamType::Uri,
            _ => ParamType::Special,
        }
    }

    /// Ordinal types accept comparison prefix operators (`ge2024-01-01`).
    pub fn supports_prefix_operators(&self) -> bool {
        matches!(self, ParamType::Date | ParamType::Number | ParamType::Quantity)
    }
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// Deserialized through `from_code` so unknown wire codes degrade instead
// of failing the whole capability document.
impl<'de> Deserialize<'de> for ParamType {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let code = String::deserialize(deserializer)?;
        Ok(ParamType::from_code(&code))
    }
}

/// Comparison prefix operator for ordinal-valued parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixOperator {
    /// Two-letter code prefixed to the value, e.g. `ge`.
    pub prefix: &'static str,
    /// Short human label.
    pub label: &'static str,
    /// Longer description of the match semantics.
    pub description: &'static str,
}

/// Cross-resource search parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalParam {
    pub name: &'static str,
    pub param_type: ParamType,
    pub description: &'static str,
}

/// Instance-level operation appended after `/<Type>/<id>/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceOperation {
    pub name: &'static str,
    pub description: &'static str,
}

/// Canonical prefix operator list. Order is part of the suggestion
/// contract: equality family first, then ordering, then temporal, then
/// approximate.
const PREFIX_OPERATORS: &[PrefixOperator] = &[
    PrefixOperator { prefix: "eq", label: "equals", description: "the value is equal to the provided value" },
    PrefixOperator { prefix: "ne", label: "not equals", description: "the value is not equal to the provided value" },
    PrefixOperator { prefix: "gt", label: "greater than", description: "the value is greater than the provided value" },
    PrefixOperator { prefix: "lt", label: "less than", description: "the value is less than the provided value" },
    PrefixOperator { prefix: "ge", label: "greater or equal", description: "the value is greater than or equal to the provided value" },
    PrefixOperator { prefix: "le", label: "less or equal", description: "the value is less than or equal to the provided value" },
    PrefixOperator { prefix: "sa", label: "starts after", description: "the range of the value starts after the provided value" },
    PrefixOperator { prefix: "eb", label: "ends before", description: "the range of the value ends before the provided value" },
    PrefixOperator { prefix: "ap", label: "approximately", description: "the value is approximately the provided value" },
];

const GLOBAL_PARAMS: &[GlobalParam] = &[
    GlobalParam { name: "_id", param_type: ParamType::Token, description: "Logical id of the resource" },
    GlobalParam { name: "_lastUpdated", param_type: ParamType::Date, description: "When the resource version last changed" },
    GlobalParam { name: "_tag", param_type: ParamType::Token, description: "Tags applied to the resource" },
    GlobalParam { name: "_profile", param_type: ParamType::Uri, description: "Profiles the resource claims to conform to" },
    GlobalParam { name: "_security", param_type: ParamType::Token, description: "Security labels applied to the resource" },
    GlobalParam { name: "_text", param_type: ParamType::String, description: "Search on the narrative text" },
    GlobalParam { name: "_content", param_type: ParamType::String, description: "Search on the entire content of the resource" },
    GlobalParam { name: "_list", param_type: ParamType::String, description: "Resources referenced by the given list" },
    GlobalParam { name: "_has", param_type: ParamType::String, description: "Reverse chaining filter" },
    GlobalParam { name: "_type", param_type: ParamType::Token, description: "Restrict a cross-type search to listed types" },
    GlobalParam { name: "_sort", param_type: ParamType::String, description: "Order results by the given parameter" },
    GlobalParam { name: "_count", param_type: ParamType::Number, description: "Number of results per page" },
    GlobalParam { name: "_include", param_type: ParamType::Special, description: "Also fetch resources referenced by matches" },
    GlobalParam { name: "_revinclude", param_type: ParamType::Special, description: "Also fetch resources referencing matches" },
    GlobalParam { name: "_summary", param_type: ParamType::Token, description: "Return only a summary of matching resources" },
    GlobalParam { name: "_total", param_type: ParamType::Token, description: "Requested precision of the total result count" },
    GlobalParam { name: "_elements", param_type: ParamType::String, description: "Restrict returned elements" },
    GlobalParam { name: "_contained", param_type: ParamType::Token, description: "Whether to return contained resources" },
    GlobalParam { name: "_containedType", param_type: ParamType::Token, description: "Whether to return the container or contained resource" },
];

const INSTANCE_OPERATIONS: &[InstanceOperation] = &[
    InstanceOperation { name: "_history", description: "Fetch the version history of the resource instance" },
    InstanceOperation { name: "$everything", description: "Fetch the instance and all resources related to it" },
];

/// Static registry of grammar-level completion data.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry;

impl TypeRegistry {
    /// Create a registry over the built-in tables.
    pub fn new() -> Self {
        Self
    }

    /// All known resource type names, alphabetical.
    pub fn resource_types(&self) -> &'static [&'static str] {
        RESOURCE_TYPES
    }

    /// Whether `name` is a known resource type (exact, case-sensitive —
    /// resource type names are case-sensitive in the grammar).
    pub fn is_valid_resource_type(&self, name: &str) -> bool {
        RESOURCE_TYPES.binary_search(&name).is_ok()
    }

    /// Modifiers applicable to a parameter of the given type.
    pub fn modifiers(&self, param_type: ParamType) -> &'static [&'static str] {
        match param_type {
            ParamType::String => &["missing", "exact", "contains"],
            ParamType::Token => &[
                "missing", "text", "not", "in", "not-in", "below", "above", "of-type",
            ],
            ParamType::Reference => &["missing", "identifier", "above", "below"],
            ParamType::Uri => &["missing", "below", "above"],
            ParamType::Number
            | ParamType::Date
            | ParamType::Quantity
            | ParamType::Composite
            | ParamType::Special => &["missing"],
        }
    }

    /// Comparison prefix operators, canonical order.
    pub fn prefix_operators(&self) -> &'static [PrefixOperator] {
        PREFIX_OPERATORS
    }

    /// Cross-resource search parameters.
    pub fn global_parameters(&self) -> &'static [GlobalParam] {
        GLOBAL_PARAMS
    }

    /// Look up a global parameter by name.
    pub fn global_parameter(&self, name: &str) -> Option<&'static GlobalParam> {
        GLOBAL_PARAMS.iter().find(|p| p.name == name)
    }

    /// Fixed value set for `field_path` (`"ResourceType.param"` or a bare
    /// parameter name), if one exists.
    pub fn enum_values(&self, field_path: &str) -> Option<&'static [&'static str]> {
        VALUE_SETS
            .iter()
            .find(|(key, _)| *key == field_path)
            .map(|(_, values)| *values)
    }

    /// Instance-level operations.
    pub fn instance_operations(&self) -> &'static [InstanceOperation] {
        INSTANCE_OPERATIONS
    }
}
