//! Metadata-endpoint responses: facet value listings and dataset schemas.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::resolve::Candidate;

/// Legal values for one facet, as listed by `{route}/facet/{id}`.
#[derive(Debug, Deserialize)]
pub struct FacetValuesResponse {
    #[serde(default)]
    pub facets: Vec<Candidate>,
    /// Total values the facet has, when the listing itself is paged.
    #[serde(default, alias = "totalFacets")]
    pub total: Option<u64>,
}

/// Schema description returned by the bare dataset route.
#[derive(Debug, Deserialize)]
pub struct DatasetMetadata {
    /// Data columns keyed by field identifier. BTreeMap keeps candidate
    /// order stable across calls.
    #[serde(default)]
    pub fields: BTreeMap<String, FieldInfo>,
}

/// Descriptive attributes of one data column.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FieldInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub units: Option<String>,
}

impl DatasetMetadata {
    /// Views the schema fields as resolver candidates.
    pub fn field_candidates(&self) -> Vec<Candidate> {
        self.fields
            .iter()
            .map(|(id, info)| Candidate {
                id: id.clone(),
                name: info.name.clone(),
                alias: info.alias.clone(),
            })
            .collect()
    }

    /// Units declared for a field, if any.
    pub fn units_for(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(|info| info.units.as_deref())
    }
}
