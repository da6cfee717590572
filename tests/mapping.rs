mod common;

use solrmap::datatype::{HostValue, TargetType};
use solrmap::error::SolrmapError;
use solrmap::mapping::{Document, MappingTable, Severity};
use solrmap::node::{NodeTag, ValueNode};
use solrmap::parser::ParserRegistry;
use solrmap::schema::{SchemaDocument, SchemaField, SchemaFieldType, SchemaResolver};
use solrmap::serializer::FieldSerializer;

fn resolver() -> SchemaResolver {
    let schema = SchemaDocument::new()
        .with_field_type(SchemaFieldType::new("string", "solr.StrField"))
        .with_field_type(SchemaFieldType::new("text_general", "solr.TextField"))
        .with_field_type(SchemaFieldType::new("pfloat", "solr.FloatPointField"))
        .with_field_type(SchemaFieldType::new("pint", "solr.IntPointField"))
        .with_field(SchemaField::new("id", "string").required())
        .with_field(SchemaField::new("title", "text_general"))
        .with_field(SchemaField::new("cat", "string").multi_valued())
        .with_field(SchemaField::new("price", "pfloat"))
        .with_dynamic_field(SchemaField::new("*_i", "pint"))
        .with_unique_key("id");
    SchemaResolver::new(schema).unwrap()
}

fn products() -> MappingTable {
    MappingTable::new()
        .map_as::<String>("id", "id")
        .map_as::<String>("name", "title")
        .map_as::<Vec<String>>("categories", "cat")
        .map_as::<Option<f32>>("price", "price")
        .map_as::<i32>("popularity", "popularity_i")
}

fn response() -> Vec<ValueNode> {
    vec![
        ValueNode::scalar(NodeTag::Str, "SOLR1000").named("id"),
        ValueNode::scalar(NodeTag::Str, "Solr, the Enterprise Search Server").named("title"),
        ValueNode::array(vec![
            ValueNode::scalar(NodeTag::Str, "software"),
            ValueNode::scalar(NodeTag::Str, "search"),
        ])
        .named("cat"),
        ValueNode::scalar(NodeTag::Float, "0.0").named("price"),
        ValueNode::scalar(NodeTag::Int, "10").named("popularity_i"),
        ValueNode::scalar(NodeTag::Float, "1.25").named("score"),
        ValueNode::scalar(NodeTag::Str, "stray"),
    ]
}

#[test]
fn reads_mapped_fields_only() {
    common::init_tracing();
    let registry = ParserRegistry::new();
    let document = products().read_document(&registry, &response()).unwrap();
    assert_eq!(document.len(), 5);
    assert_eq!(document["id"], HostValue::Str("SOLR1000".to_string()));
    assert_eq!(
        document["categories"],
        HostValue::List(vec![
            HostValue::Str("software".to_string()),
            HostValue::Str("search".to_string()),
        ])
    );
    assert_eq!(document["price"], HostValue::Float(0.0));
    assert_eq!(document["popularity"], HostValue::Int(10));
    assert!(!document.contains_key("score"));
}

#[test]
fn read_failures_propagate() {
    let registry = ParserRegistry::new();
    let nodes = vec![ValueNode::scalar(NodeTag::Int, "lots").named("popularity_i")];
    let err = products().read_document(&registry, &nodes).unwrap_err();
    assert!(matches!(err, SolrmapError::Format { ref field, .. } if field == "popularity_i"));
}

#[test]
fn writes_in_mapping_order() {
    let serializer = FieldSerializer::new();
    let mut document = Document::new();
    document.insert("popularity".to_string(), HostValue::Int(6));
    document.insert("price".to_string(), HostValue::Null);
    document.insert(
        "categories".to_string(),
        HostValue::List(vec![HostValue::Str("a".to_string()), HostValue::Str("b".to_string())]),
    );
    document.insert("id".to_string(), HostValue::Str("X1".to_string()));
    let fields = products().write_document(&serializer, &document).unwrap();
    let rendered: Vec<String> = fields.iter().map(|f| f.to_string()).collect();
    assert_eq!(rendered, vec!["id=X1", "cat=a", "cat=b", "popularity_i=6"]);
}

#[test]
fn remapping_a_property_replaces_it() {
    let table = MappingTable::new()
        .map("name", "title", TargetType::Str)
        .map("name", "headline", TargetType::Str);
    assert_eq!(table.mappings().len(), 1);
    assert_eq!(table.by_property("name").unwrap().wire_name(), "headline");
    assert!(table.by_wire_name("title").is_none());
    assert_eq!(table.by_wire_name("headline").unwrap().property(), "name");
}

#[test]
fn shared_wire_name_moves_to_the_remaining_property() {
    let table = MappingTable::new()
        .map_as::<String>("name", "title")
        .map_as::<String>("heading", "title")
        .map_as::<String>("name", "headline");
    assert_eq!(table.by_wire_name("title").unwrap().property(), "heading");
    assert_eq!(table.by_wire_name("headline").unwrap().property(), "name");

    let registry = ParserRegistry::new();
    let nodes = vec![
        ValueNode::scalar(NodeTag::Str, "Solr").named("title"),
        ValueNode::scalar(NodeTag::Str, "Search").named("headline"),
    ];
    let document = table.read_document(&registry, &nodes).unwrap();
    assert_eq!(document["heading"], HostValue::Str("Solr".to_string()));
    assert_eq!(document["name"], HostValue::Str("Search".to_string()));
}

#[test]
fn consistent_mapping_has_no_issues() {
    let issues = products().validate(&resolver());
    assert!(issues.is_empty(), "{:?}", issues);
}

#[test]
fn validation_reports_every_problem() {
    let table = MappingTable::new()
        .map_as::<String>("categories", "cat")
        .map_as::<Vec<String>>("title", "title")
        .map_as::<String>("headline", "title")
        .map_as::<i32>("price", "price")
        .map_as::<String>("colour", "colour");
    let issues = table.validate(&resolver());
    let errors: Vec<&str> = issues.iter().filter(|i| i.is_error()).map(|i| i.property()).collect();
    assert_eq!(errors, vec!["categories", "title", "headline", "colour"]);
    let warnings: Vec<&str> = issues
        .iter()
        .filter(|i| i.severity() == Severity::Warning)
        .map(|i| i.property())
        .collect();
    assert_eq!(warnings, vec!["price", "id"]);
    assert!(issues.iter().any(|i| i.message().contains("unique key 'id'")));
}
