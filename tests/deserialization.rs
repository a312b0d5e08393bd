use opendata_harvest::types::{CountResponse, DatasetMetadata, ErrorBody, FacetValuesResponse, RowsetResponse};
use opendata_harvest::{normalize_item, resolve, PreferenceList};
use serde_json::{json, Value};

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

#[test]
fn deserialize_feature_rowset() {
    let json = load_fixture("rowset_features.json");
    let resp: RowsetResponse = serde_json::from_str(&json).unwrap();
    assert_eq!(resp.rows.len(), 2);

    let rec = normalize_item(&resp.rows[0]);
    assert_eq!(rec.get("OBJECTID"), Some(&json!(18231)));
    assert_eq!(rec.get("COUNTYNAME"), Some(&json!("MARICOPA (13)")));
    assert_eq!(rec.get("lon"), Some(&json!(-112.0740373)));
    assert_eq!(rec.get("lat"), Some(&json!(33.4483771)));
    assert_eq!(rec.get("date"), Some(&json!("2022-03-15")));
}

#[test]
fn deserialize_flat_rowset() {
    let json = load_fixture("rowset_rows.json");
    let resp: RowsetResponse = serde_json::from_str(&json).unwrap();
    assert_eq!(resp.rows.len(), 2);

    let rec = normalize_item(&resp.rows[0]);
    assert_eq!(rec.get("period"), Some(&json!("2021-01")));
    assert_eq!(rec.get("sales"), Some(&json!(2418.21135)));
    assert_eq!(rec.key_text("period").as_deref(), Some("2021-01"));
}

#[test]
fn deserialize_facet_listing() {
    let json = load_fixture("facets.json");
    let resp: FacetValuesResponse = serde_json::from_str(&json).unwrap();
    assert_eq!(resp.facets.len(), 3);
    assert_eq!(resp.total, Some(3));
    assert_eq!(resp.facets[0].id, "AZ");
    assert_eq!(resp.facets[0].alias.as_deref(), Some("(AZ) Arizona"));
    assert_eq!(resp.facets[1].alias, None);

    // The listed values feed the resolver directly.
    let prefs = PreferenceList::new(&[], &["arizona"]);
    assert_eq!(resolve(&resp.facets, &prefs), Some("AZ"));
}

#[test]
fn deserialize_metadata_schema() {
    let json = load_fixture("metadata.json");
    let meta: DatasetMetadata = serde_json::from_str(&json).unwrap();
    assert_eq!(meta.fields.len(), 3);
    assert_eq!(meta.units_for("net-generation"), Some("thousand megawatthours"));
    assert_eq!(meta.units_for("receipts"), None);

    let candidates = meta.field_candidates();
    let prefs = PreferenceList::new(&["net-generation"], &["generation"]);
    assert_eq!(resolve(&candidates, &prefs), Some("net-generation"));
}

#[test]
fn deserialize_error_payload() {
    let json = load_fixture("error.json");
    let value: Value = serde_json::from_str(&json).unwrap();
    let body = ErrorBody::from_value(value.get("error").unwrap());
    assert_eq!(body.code, Some(400));
    assert_eq!(body.message, "Invalid facet value");
    assert_eq!(body.details.len(), 1);
}

#[test]
fn count_tolerates_missing_field() {
    let resp: CountResponse = serde_json::from_str("{}").unwrap();
    assert_eq!(resp.count, 0);

    let resp: CountResponse = serde_json::from_str(r#"{"count": 1466}"#).unwrap();
    assert_eq!(resp.count, 1466);
}

#[test]
fn rowset_with_neither_key_decodes_empty() {
    let resp: RowsetResponse = serde_json::from_str(r#"{"unrelated": true}"#).unwrap();
    assert!(resp.rows.is_empty());
}
