mod common;

use solrmap::datatype::TargetType;
use solrmap::error::SolrmapError;
use solrmap::schema::{CopyField, DynamicFieldPattern, SchemaDocument, SchemaField, SchemaFieldType, SchemaResolver};

const SCHEMA_JSON: &str = r#"{
  "responseHeader": {"status": 0, "QTime": 1},
  "schema": {
    "name": "example",
    "version": 1.6,
    "uniqueKey": "id",
    "fieldTypes": [
      {"name": "string", "class": "solr.StrField", "sortMissingLast": true},
      {"name": "pint", "class": "solr.IntPointField"},
      {"name": "pdate", "class": "solr.DatePointField"},
      {"name": "location", "class": "solr.LatLonPointSpatialField"}
    ],
    "fields": [
      {"name": "id", "type": "string", "required": true, "multiValued": false},
      {"name": "cat", "type": "string", "multiValued": true, "docValues": true},
      {"name": "store", "type": "location", "stored": false}
    ],
    "dynamicFields": [
      {"name": "*_i", "type": "pint"},
      {"name": "*_dt", "type": "pdate", "multiValued": true}
    ],
    "copyFields": [
      {"source": "cat", "dest": "text"},
      {"source": "cat", "dest": "cat_facet"}
    ]
  }
}"#;

fn example() -> SchemaResolver {
    SchemaResolver::new(SchemaDocument::from_json(SCHEMA_JSON).unwrap()).unwrap()
}

#[test]
fn missing_and_empty_unique_keys_are_both_none() {
    common::init_tracing();
    assert_eq!(SchemaDocument::new().unique_key(), None);
    assert_eq!(SchemaDocument::new().with_unique_key("").unique_key(), None);
    assert_eq!(SchemaDocument::new().with_unique_key("  ").unique_key(), None);
    let resolver = SchemaResolver::new(SchemaDocument::new().with_unique_key("")).unwrap();
    assert_eq!(resolver.unique_key(), None);
    let from_json = SchemaDocument::from_json(r#"{"uniqueKey": ""}"#).unwrap();
    assert_eq!(from_json.unique_key(), None);
    assert_eq!(example().unique_key(), Some("id"));
}

#[test]
fn dynamic_patterns_match_by_prefix_or_suffix() {
    let suffix = DynamicFieldPattern::new("*_s").unwrap();
    assert!(suffix.matches("title_s"));
    assert!(!suffix.matches("title"));
    let prefix = DynamicFieldPattern::new("attr_*").unwrap();
    assert!(prefix.matches("attr_color"));
    assert!(!prefix.matches("color_attr"));
    assert_eq!(prefix.to_string(), "attr_*");
}

#[test]
fn patterns_need_one_outer_wildcard() {
    for bad in ["a*b", "*a*", "abc", "**"] {
        let err = DynamicFieldPattern::new(bad).unwrap_err();
        assert_eq!(err, SolrmapError::InvalidPattern(bad.to_string()));
    }
    let schema = SchemaDocument::new().with_dynamic_field(SchemaField::new("a*b", "string"));
    assert!(matches!(SchemaResolver::new(schema), Err(SolrmapError::InvalidPattern(_))));
}

#[test]
fn exact_fields_win_over_patterns() {
    let schema = SchemaDocument::new()
        .with_field(SchemaField::new("title_s", "text"))
        .with_dynamic_field(SchemaField::new("*_s", "string"));
    let resolver = SchemaResolver::new(schema).unwrap();
    let exact = resolver.resolve_field("title_s").unwrap();
    assert!(!exact.is_dynamic());
    assert_eq!(exact.field().type_name(), "text");
    let dynamic = resolver.resolve_field("name_s").unwrap();
    assert!(dynamic.is_dynamic());
    assert_eq!(dynamic.pattern().map(|p| p.pattern()), Some("*_s"));
    assert!(resolver.resolve_field("name").is_none());
}

#[test]
fn patterns_are_tried_in_declaration_order() {
    let schema = SchemaDocument::new()
        .with_dynamic_field(SchemaField::new("*_s", "string"))
        .with_dynamic_field(SchemaField::new("*s", "text"));
    let resolver = SchemaResolver::new(schema).unwrap();
    assert_eq!(resolver.resolve_field("x_s").unwrap().field().type_name(), "string");
    assert_eq!(resolver.resolve_field("xs").unwrap().field().type_name(), "text");
}

#[test]
fn first_declaration_of_a_name_wins() {
    let schema = SchemaDocument::new()
        .with_field(SchemaField::new("id", "string"))
        .with_field(SchemaField::new("id", "pint"));
    let resolver = SchemaResolver::new(schema).unwrap();
    assert_eq!(resolver.resolve_field("id").unwrap().field().type_name(), "string");
}

#[test]
fn default_field_fallback() {
    let schema = SchemaDocument::new().with_field(SchemaField::new("text", "text_general"));
    let resolver = SchemaResolver::new(schema.clone()).unwrap();
    assert!(resolver.resolve_or_default("nope").is_none());
    let resolver = resolver.with_default_field(Some("text".to_string()));
    assert_eq!(resolver.resolve_or_default("nope").unwrap().field().name(), "text");
    let resolver = SchemaResolver::new(schema)
        .unwrap()
        .with_default_field(Some("missing".to_string()));
    assert!(resolver.resolve_or_default("nope").is_none());
}

#[test]
fn json_listing_with_attribute_defaults() {
    let resolver = example();
    let id = resolver.resolve_field("id").unwrap().field();
    assert!(id.is_required() && id.is_indexed() && id.is_stored());
    assert!(!id.is_multi_valued() && !id.is_doc_values());
    let cat = resolver.resolve_field("cat").unwrap().field();
    assert!(cat.is_multi_valued() && cat.is_doc_values());
    assert!(!resolver.resolve_field("store").unwrap().field().is_stored());
    assert_eq!(resolver.schema().field_types().len(), 4);

    let bare = SchemaDocument::from_json(r#"{"fields": [{"name": "id", "type": "string"}]}"#).unwrap();
    assert_eq!(bare, SchemaDocument::new().with_field(SchemaField::new("id", "string")));
}

#[test]
fn malformed_json_is_a_schema_error() {
    assert!(matches!(SchemaDocument::from_json("{"), Err(SolrmapError::Schema(_))));
    let err = SchemaDocument::from_json(r#"{"fields": [{"name": "id"}]}"#).unwrap_err();
    assert!(matches!(err, SolrmapError::Schema(_)), "field without a type");
}

#[test]
fn type_hints_from_implementation_classes() {
    let resolver = example();
    assert_eq!(resolver.target_hint("id"), Some(TargetType::Str));
    assert_eq!(resolver.target_hint("cat"), Some(TargetType::list(TargetType::Str)));
    assert_eq!(resolver.target_hint("count_i"), Some(TargetType::Int));
    assert_eq!(resolver.target_hint("seen_dt"), Some(TargetType::list(TargetType::Date)));
    assert_eq!(resolver.target_hint("store"), None);
    assert_eq!(resolver.target_hint("undeclared"), None);
    assert_eq!(
        SchemaFieldType::new("uuid", "org.apache.solr.schema.UUIDField").target_hint(),
        Some(TargetType::Guid)
    );
}

#[test]
fn copy_field_destinations() {
    let resolver = example();
    assert_eq!(resolver.copy_destinations("cat"), vec!["text", "cat_facet"]);
    assert!(resolver.copy_destinations("id").is_empty());
    assert_eq!(resolver.schema().copy_fields()[0], CopyField::new("cat", "text"));
}
