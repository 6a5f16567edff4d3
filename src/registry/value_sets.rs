//! Fixed value sets for search parameters with small enumerations.
//!
//! Lookup is keyed by `"ResourceType.param"` first, then by the bare
//! parameter name, so `Patient.gender` and a plain `gender` both resolve.

/// Value-set table entries: (field path, allowed values).
pub const VALUE_SETS: &[(&str, &[&str])] = &[
    ("Patient.gender", GENDER),
    ("Person.gender", GENDER),
    ("Practitioner.gender", GENDER),
    ("RelatedPerson.gender", GENDER),
    ("gender", GENDER),
    ("Patient.active", BOOLEAN),
    ("Organization.active", BOOLEAN),
    ("Practitioner.active", BOOLEAN),
    ("active", BOOLEAN),
    ("Patient.deceased", BOOLEAN),
    ("deceased", BOOLEAN),
    (
        "Observation.status",
        &[
            "registered",
            "preliminary",
            "final",
            "amended",
            "corrected",
            "cancelled",
            "entered-in-error",
            "unknown",
        ],
    ),
    (
        "Encounter.status",
        &[
            "planned",
            "arrived",
            "triaged",
            "in-progress",
            "onleave",
            "finished",
            "cancelled",
            "entered-in-error",
            "unknown",
        ],
    ),
    (
        "Condition.clinical-status",
        &["active", "recurrence", "relapse", "inactive", "remission", "resolved"],
    ),
    ("_summary", &["true", "text", "data", "count", "false"]),
    ("_total", &["none", "estimate", "accurate"]),
    ("_contained", &["true", "false", "both"]),
    ("_containedType", &["container", "contained"]),
];

const GENDER: &[&str] = &["male", "female", "other", "unknown"];
const BOOLEAN: &[&str] = &["true", "false"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gender_paths_present() {
        assert!(VALUE_SETS.iter().any(|(k, _)| *k == "Patient.gender"));
        assert!(VALUE_SETS.iter().any(|(k, _)| *k == "gender"));
    }

    #[test]
    fn summary_values() {
        let (_, values) = VALUE_SETS.iter().find(|(k, _)| *k == "_summary").unwrap();
        assert!(values.contains(&"count"));
    }
}
