mod common;

use chrono::NaiveDate;
use solrmap::datatype::{DataType, HostValue};
use solrmap::error::SolrmapError;
use solrmap::query::{
    QueryFragment, RangeQuery, and, build_range_query, by, by_range, field_query, field_query_unquoted, not, or, quote,
};

solrmap::solr_enum! {
    pub enum Numbers { One, Two }
}

#[test]
fn field_values_are_escaped() {
    common::init_tracing();
    let q = field_query("title", &HostValue::Str("hello world".to_string())).unwrap();
    assert_eq!(q.as_str(), "title:(\"hello world\")");
    let q = field_query("title", &HostValue::Str("a+b:c".to_string())).unwrap();
    assert_eq!(q.as_str(), r"title:(a\+b\:c)");
    let q = field_query("price", &HostValue::Int(5)).unwrap();
    assert_eq!(q.as_str(), "price:(5)");
    let q = field_query("my field", &HostValue::Bool(true)).unwrap();
    assert_eq!(q.as_str(), r"my\ field:(true)");
    assert_eq!(quote(""), "\"\"");
}

#[test]
fn field_names_are_escaped() {
    let q = field_query("a:b", &HostValue::Int(1)).unwrap();
    assert_eq!(q.as_str(), r"a\:b:(1)");
    let q = field_query("x) OR (y", &HostValue::Int(1)).unwrap();
    assert_eq!(q.as_str(), r"x\)\ OR\ \(y:(1)");
    let q = build_range_query("a:b", Some(HostValue::Int(1)), None).unwrap();
    assert_eq!(q.as_str(), r"a\:b:[1 TO *]");
    let q = field_query_unquoted("in-stock", "true").unwrap();
    assert_eq!(q.as_str(), r"in\-stock:(true)");
}

#[test]
fn unquoted_values_pass_through() {
    let q = field_query_unquoted("title", "solr OR lucene").unwrap();
    assert_eq!(q.as_str(), "title:(solr OR lucene)");
}

#[test]
fn field_query_validation() {
    let err = field_query("", &HostValue::Int(1)).unwrap_err();
    assert_eq!(err, SolrmapError::MissingField);
    let err = field_query("price", &HostValue::Null).unwrap_err();
    assert!(matches!(err, SolrmapError::ValueMismatch { .. }));
    let err = field_query("ids", &HostValue::List(vec![HostValue::Int(1)])).unwrap_err();
    assert!(matches!(err, SolrmapError::ValueMismatch { .. }));
}

#[test]
fn ranges_with_open_bounds() {
    let q = build_range_query("price", Some(HostValue::Int(1)), Some(HostValue::Int(10))).unwrap();
    assert_eq!(q.as_str(), "price:[1 TO 10]");
    let q = build_range_query("price", None, Some(HostValue::Int(10))).unwrap();
    assert_eq!(q.as_str(), "price:[* TO 10]");
    let q = build_range_query("price", Some(HostValue::Double(0.5)), None).unwrap();
    assert_eq!(q.as_str(), "price:[0.5 TO *]");
    let q = build_range_query("price", Some(HostValue::Null), None).unwrap();
    assert_eq!(q.as_str(), "price:[* TO *]");
}

#[test]
fn range_inclusivity() {
    let q = RangeQuery::new("price").from(1).to(10).exclusive().build().unwrap();
    assert_eq!(q.as_str(), "price:{1 TO 10}");
    let q = RangeQuery::new("price").from(1).to(10).inclusive(true, false).build().unwrap();
    assert_eq!(q.as_str(), "price:[1 TO 10}");
}

#[test]
fn range_bounds_use_wire_text() {
    let q = RangeQuery::new("name")
        .from("a".to_string())
        .to("m z".to_string())
        .build()
        .unwrap();
    assert_eq!(q.as_str(), "name:[a TO \"m z\"]");
    let day = NaiveDate::from_ymd_opt(2013, 1, 2).unwrap().and_hms_opt(0, 0, 0).unwrap();
    let q = RangeQuery::new("timestamp").from(day).build().unwrap();
    assert_eq!(q.as_str(), "timestamp:[2013-01-02T00:00:00Z TO *]");
    let q = RangeQuery::new("n").from(Numbers::One).to(Numbers::Two).build().unwrap();
    assert_eq!(q.as_str(), "n:[One TO Two]");
    let err = RangeQuery::new("").from(1).build().unwrap_err();
    assert_eq!(err, SolrmapError::MissingField);
}

#[test]
fn fluent_queries() {
    assert_eq!(by("price").is(5).unwrap().as_str(), "price:(5)");
    assert_eq!(by("price").between(1).and(10).unwrap().as_str(), "price:[1 TO 10]");
    assert_eq!(by_range("price", None::<i32>, 10).unwrap().as_str(), "price:[* TO 10]");
    assert_eq!(by("n").is(Numbers::Two).unwrap().as_str(), "n:(Two)");
    assert_eq!(by("n").is(Numbers::Two).unwrap(), field_query("n", &Numbers::Two.into_host()).unwrap());
}

#[test]
fn composition() {
    let a = by("price").is(5).unwrap();
    let b = by("cat").is("book".to_string()).unwrap();
    assert_eq!(and(vec![a.clone(), b.clone()]).as_str(), "(price:(5) AND cat:(book))");
    assert_eq!(or(vec![a.clone(), b.clone()]).as_str(), "(price:(5) OR cat:(book))");
    assert_eq!(not(a.clone()).as_str(), "-price:(5)");
    assert_eq!(and(Vec::<QueryFragment>::new()), QueryFragment::all());
    assert_eq!(or(vec![a.clone()]), a);
    let nested = or(vec![and(vec![a.clone(), b]), not(a)]);
    assert_eq!(nested.as_str(), "((price:(5) AND cat:(book)) OR -price:(5))");
}
