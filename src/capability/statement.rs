//! Serde models for the server-advertised CapabilityStatement.
//!
//! Only the slice of the document the completion engine consumes is
//! modelled: `rest[].resource[]` with declared search parameters and
//! include/revinclude paths. Unknown fields are ignored so documents from
//! any server version parse.

use serde::Deserialize;

use crate::registry::ParamType;

/// Top-level CapabilityStatement document.
#[derive(Debug, Clone, Deserialize)]
pub struct CapabilityStatement {
    /// Server software description, informational only.
    pub software: Option<Software>,

    /// FHIR version advertised by the server.
    #[serde(rename = "fhirVersion")]
    pub fhir_version: Option<String>,

    /// REST interface declarations.
    #[serde(default)]
    pub rest: Vec<RestComponent>,
}

/// `software` element.
#[derive(Debug, Clone, Deserialize)]
pub struct Software {
    pub name: Option<String>,
    pub version: Option<String>,
}

/// One `rest` entry; completion only cares about `mode == "server"`.
#[derive(Debug, Clone, Deserialize)]
pub struct RestComponent {
    pub mode: Option<String>,

    #[serde(default)]
    pub resource: Vec<RestResource>,
}

/// Per-resource-type REST declaration.
#[derive(Debug, Clone, Deserialize)]
pub struct RestResource {
    /// Resource type name, e.g. `Patient`.
    #[serde(rename = "type")]
    pub resource_type: String,

    /// Declared search parameters.
    #[serde(rename = "searchParam", default)]
    pub search_params: Vec<RestSearchParam>,

    /// Supported `_include` values, e.g. `Patient:organization`.
    #[serde(rename = "searchInclude", default)]
    pub search_includes: Vec<String>,

    /// Supported `_revinclude` values.
    #[serde(rename = "searchRevInclude", default)]
    pub search_rev_includes: Vec<String>,
}

/// Declared search parameter.
#[derive(Debug, Clone, Deserialize)]
pub struct RestSearchParam {
    pub name: String,

    #[serde(rename = "type")]
    pub param_type: ParamType,

    pub documentation: Option<String>,
}

impl CapabilityStatement {
    /// The server-mode rest components (the only ones that declare search
    /// support relevant to completion).
    pub fn server_rests(&self) -> impl Iterator<Item = &RestComponent> {
        self.rest
            .iter()
            .filter(|r| r.mode.as_deref().is_none_or(|m| m == "server"))
    }
}
