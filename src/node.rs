//! The read-only wire representation of one response field.
//!
//! A [`ValueNode`] is what the transport layer hands over per document field:
//! a type tag, an optional field name, the text payload and, for `arr`/`lst`
//! nodes, the nested child nodes in wire order. Nodes are immutable once built.

use std::fmt;

use crate::datatype::TargetType;

/// The wire type tag of a node, named after the engine's response elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeTag {
    Str,
    Int,
    Float,
    Double,
    Long,
    Bool,
    Date,
    Guid,
    Array,
    List,
}

impl NodeTag {
    /// Maps a response element name (`str`, `int`, `arr`, ...) to its tag.
    pub fn from_element(element: &str) -> Option<NodeTag> {
        match element {
            "str" => Some(NodeTag::Str),
            "int" => Some(NodeTag::Int),
            "float" => Some(NodeTag::Float),
            "double" => Some(NodeTag::Double),
            "long" => Some(NodeTag::Long),
            "bool" => Some(NodeTag::Bool),
            "date" => Some(NodeTag::Date),
            "guid" => Some(NodeTag::Guid),
            "arr" => Some(NodeTag::Array),
            "lst" => Some(NodeTag::List),
            _ => None,
        }
    }
    pub fn element(&self) -> &'static str {
        match self {
            NodeTag::Str => "str",
            NodeTag::Int => "int",
            NodeTag::Float => "float",
            NodeTag::Double => "double",
            NodeTag::Long => "long",
            NodeTag::Bool => "bool",
            NodeTag::Date => "date",
            NodeTag::Guid => "guid",
            NodeTag::Array => "arr",
            NodeTag::List => "lst",
        }
    }
    pub fn is_collection(&self) -> bool {
        matches!(self, NodeTag::Array | NodeTag::List)
    }
    /// The tag the engine uses when sending a value of the given type.
    /// Decimals, enums and other text-encoded values travel as `str`.
    pub fn for_target(target: &TargetType) -> NodeTag {
        match target {
            TargetType::Int => NodeTag::Int,
            TargetType::Long => NodeTag::Long,
            TargetType::Float => NodeTag::Float,
            TargetType::Double => NodeTag::Double,
            TargetType::Bool => NodeTag::Bool,
            TargetType::Date => NodeTag::Date,
            TargetType::Guid => NodeTag::Guid,
            TargetType::Nullable(inner) => NodeTag::for_target(inner),
            TargetType::Array(_) | TargetType::List(_) | TargetType::Set(_) => NodeTag::Array,
            _ => NodeTag::Str,
        }
    }
}

impl fmt::Display for NodeTag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.element())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueNode {
    tag: NodeTag,
    name: Option<String>,
    text: String,
    children: Vec<ValueNode>,
}

impl ValueNode {
    /// A scalar node. Children can only be attached through [`ValueNode::array`]
    /// and [`ValueNode::list`], so scalar tags never carry any.
    pub fn scalar(tag: NodeTag, text: impl Into<String>) -> Self {
        Self {
            tag,
            name: None,
            text: text.into(),
            children: Vec::new(),
        }
    }
    pub fn array(children: Vec<ValueNode>) -> Self {
        Self {
            tag: NodeTag::Array,
            name: None,
            text: String::new(),
            children,
        }
    }
    pub fn list(children: Vec<ValueNode>) -> Self {
        Self {
            tag: NodeTag::List,
            name: None,
            text: String::new(),
            children,
        }
    }
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
    pub fn tag(&self) -> NodeTag {
        self.tag
    }
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
    pub fn text(&self) -> &str {
        &self.text
    }
    pub fn children(&self) -> &[ValueNode] {
        &self.children
    }
    /// The field name used in diagnostics, `?` when the node is unnamed.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("?")
    }
}
