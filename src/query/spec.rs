//! Immutable filter descriptions and their query-string serialization.

use std::fmt;

/// Page-size ceiling most feature services declare.
pub const DEFAULT_PAGE_LIMIT: u64 = 2000;

/// Immutable description of one fetch: the dataset route, the filter
/// constraints, the columns to request, the ordering key, and the page-size
/// ceiling the remote service imposes.
///
/// Built once per invocation with the `with_*` methods and then only read.
/// The ordering key is mandatory at construction: without a stable order by
/// an immutable identifier, pages can overlap or skip rows whenever the
/// service mutates between page fetches.
#[derive(Debug, Clone)]
pub struct FetchSpec {
    route: String,
    facets: Vec<(String, Vec<String>)>,
    columns: Vec<String>,
    range: Option<(String, String)>,
    bbox: Option<BoundingBox>,
    order_by: String,
    page_limit: u64,
}

impl FetchSpec {
    pub fn new(route: &str, order_by: &str) -> Self {
        FetchSpec {
            route: route.trim_matches('/').to_string(),
            facets: Vec::new(),
            columns: Vec::new(),
            range: None,
            bbox: None,
            order_by: order_by.to_string(),
            page_limit: DEFAULT_PAGE_LIMIT,
        }
    }

    /// Adds one accepted value for an equality facet. Repeated calls with
    /// the same facet accumulate values.
    pub fn with_facet(mut self, facet: &str, value: &str) -> Self {
        match self.facets.iter_mut().find(|(name, _)| name == facet) {
            Some((_, values)) => values.push(value.to_string()),
            None => self
                .facets
                .push((facet.to_string(), vec![value.to_string()])),
        }
        self
    }

    pub fn with_facet_values(mut self, facet: &str, values: &[&str]) -> Self {
        for value in values {
            self = self.with_facet(facet, value);
        }
        self
    }

    /// Requests a data column by name.
    pub fn with_column(mut self, column: &str) -> Self {
        self.columns.push(column.to_string());
        self
    }

    pub fn with_columns(mut self, columns: &[&str]) -> Self {
        for column in columns {
            self = self.with_column(column);
        }
        self
    }

    /// Restricts the period range, inclusive on both ends.
    pub fn with_range(mut self, start: &str, end: &str) -> Self {
        self.range = Some((start.to_string(), end.to_string()));
        self
    }

    pub fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    /// Overrides the page-size ceiling. Clamped to at least 1.
    pub fn with_page_limit(mut self, limit: u64) -> Self {
        self.page_limit = limit.max(1);
        self
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn order_by(&self) -> &str {
        &self.order_by
    }

    pub fn page_limit(&self) -> u64 {
        self.page_limit
    }

    /// Serializes the filter as query-string pairs. Array-valued
    /// constraints become repeated keys.
    pub fn query_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        for (facet, values) in &self.facets {
            for value in values {
                params.push((format!("facet[{}]", facet), value.clone()));
            }
        }
        for column in &self.columns {
            params.push(("fields".to_string(), column.clone()));
        }
        if let Some((start, end)) = &self.range {
            params.push(("start".to_string(), start.clone()));
            params.push(("end".to_string(), end.clone()));
        }
        if let Some(bbox) = &self.bbox {
            params.push(("bbox".to_string(), bbox.to_string()));
        }
        params.push(("order_by".to_string(), self.order_by.clone()));
        params
    }
}

/// Geographic bounding box, serialized `west,south,east,north`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.west, self.south, self.east, self.north)
    }
}
