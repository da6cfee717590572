//! Solrmap – typed field conversion and query building for Solr-style search engines.
//!
//! The engine speaks a text protocol: every document field arrives as a
//! typed text node (`str`, `int`, `float`, `date`, `arr` of those, ...), and
//! queries are strings in the engine's query syntax. Solrmap sits between
//! that protocol and strongly typed Rust values:
//! * A [`node::ValueNode`] is one wire field as handed over by the transport layer.
//! * A [`datatype::TargetType`] describes the host type a caller asks for
//!   (base type, nullability, element type).
//! * The [`parser::ParserRegistry`] converts nodes into [`datatype::HostValue`]s
//!   by dispatching to the first capable [`parser::FieldParser`].
//! * The [`serializer::FieldSerializer`] goes the other way, producing
//!   [`serializer::WireField`]s that read back to the same values.
//! * The [`query`] module builds validated [`query::QueryFragment`]s: field,
//!   range and spatial distance queries and their combinations.
//! * The [`schema::SchemaResolver`] resolves field names against a loaded
//!   schema, dynamic field patterns included.
//!
//! Network transport, response caching and the structural schema XML parser
//! live outside this crate. Nothing here performs I/O apart from
//! [`settings::Settings::load`], and every component is immutable after
//! construction, so a registry or resolver can be shared between threads.
//!
//! ## Modules
//! * [`datatype`] – TargetType descriptors, host values and the [`datatype::DataType`]
//!   trait binding Rust types to them.
//! * [`node`] – The wire value node.
//! * [`parser`] – Field parsers and the parser registry.
//! * [`serializer`] – Host values to wire fields.
//! * [`query`] – Query fragment construction.
//! * [`schema`] – Schema document model and field resolution.
//! * [`mapping`] – Host property bindings, document conversion and mapping validation.
//! * [`settings`] – Configuration.
//!
//! ## Quick Start
//! ```
//! use solrmap::node::{NodeTag, ValueNode};
//! use solrmap::parser::ParserRegistry;
//! use solrmap::query::build_distance_query;
//!
//! let registry = ParserRegistry::new();
//! let node = ValueNode::array(vec![
//!     ValueNode::scalar(NodeTag::Int, "1"),
//!     ValueNode::scalar(NodeTag::Int, "2"),
//! ]).named("ids");
//! let ids: Vec<i32> = registry.parse_as(&node).unwrap();
//! assert_eq!(ids, vec![1, 2]);
//!
//! let q = build_distance_query("store", 45.15, -93.85, 5.2, None).unwrap();
//! assert_eq!(q.as_str(), "{!geofilt pt=45.15,-93.85 sfield=store d=5.2}");
//! ```

pub mod datatype;
pub mod error;
pub mod mapping;
pub mod node;
pub mod parser;
pub mod query;
pub mod schema;
pub mod serializer;
pub mod settings;

pub use datatype::{DataType, HostValue, TargetType};
pub use error::{Result, SolrmapError};
pub use node::{NodeTag, ValueNode};
pub use parser::ParserRegistry;
pub use query::QueryFragment;
pub use schema::{SchemaDocument, SchemaResolver};
pub use serializer::{FieldSerializer, WireField};
