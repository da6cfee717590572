//! Explicit field bindings between host properties and wire fields.
//!
//! A [`MappingTable`] is built once at setup time and says, for each host
//! property, which wire field it travels as and which TargetType it is
//! requested as. It drives whole-document conversion in both directions and
//! can be checked against a schema before use.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use tracing::{debug, warn};

use crate::datatype::{DataType, HostValue, TargetType};
use crate::error::Result;
use crate::node::ValueNode;
use crate::parser::ParserRegistry;
use crate::schema::{FieldHasher, SchemaResolver};
use crate::serializer::{FieldSerializer, WireField};

/// Converted field values keyed by host property.
pub type Document = BTreeMap<String, HostValue>;

#[derive(Debug, Clone, PartialEq)]
pub struct FieldMapping {
    property: String,
    wire_name: String,
    target: TargetType,
}

impl FieldMapping {
    pub fn property(&self) -> &str {
        &self.property
    }
    pub fn wire_name(&self) -> &str {
        &self.wire_name
    }
    pub fn target(&self) -> &TargetType {
        &self.target
    }
}

#[derive(Debug, Clone, Default)]
pub struct MappingTable {
    mappings: Vec<FieldMapping>,
    by_property: HashMap<String, usize, FieldHasher>,
    by_wire_name: HashMap<String, usize, FieldHasher>,
}

impl MappingTable {
    pub fn new() -> Self {
        Self::default()
    }
    /// Binds `property` to `wire_name`. Mapping a property again replaces
    /// its earlier binding.
    pub fn map(mut self, property: &str, wire_name: &str, target: TargetType) -> Self {
        let mapping = FieldMapping {
            property: property.to_string(),
            wire_name: wire_name.to_string(),
            target,
        };
        match self.by_property.get(property) {
            Some(&i) => {
                self.mappings[i] = mapping;
                self.index_wire_names();
            }
            None => {
                let i = self.mappings.len();
                self.mappings.push(mapping);
                self.by_property.insert(property.to_string(), i);
                self.by_wire_name.entry(wire_name.to_string()).or_insert(i);
            }
        }
        self
    }
    // A wire name read by several properties resolves to the earliest mapping.
    fn index_wire_names(&mut self) {
        self.by_wire_name.clear();
        for (i, mapping) in self.mappings.iter().enumerate() {
            self.by_wire_name.entry(mapping.wire_name.clone()).or_insert(i);
        }
    }
    pub fn map_as<T: DataType>(self, property: &str, wire_name: &str) -> Self {
        self.map(property, wire_name, T::target_type())
    }
    pub fn mappings(&self) -> &[FieldMapping] {
        &self.mappings
    }
    pub fn by_property(&self, property: &str) -> Option<&FieldMapping> {
        self.by_property.get(property).map(|&i| &self.mappings[i])
    }
    pub fn by_wire_name(&self, wire_name: &str) -> Option<&FieldMapping> {
        self.by_wire_name.get(wire_name).map(|&i| &self.mappings[i])
    }

    /// Parses every named node whose name is mapped. Unnamed and unmapped
    /// nodes are skipped.
    pub fn read_document(&self, registry: &ParserRegistry, nodes: &[ValueNode]) -> Result<Document> {
        let mut document = Document::new();
        for node in nodes {
            let Some(mapping) = node.name().and_then(|name| self.by_wire_name(name)) else {
                debug!(field = node.label(), "unmapped field skipped");
                continue;
            };
            let value = registry.parse(node, &mapping.target)?;
            document.insert(mapping.property.clone(), value);
        }
        Ok(document)
    }

    /// Serializes mapped properties in mapping order. Absent and null
    /// properties produce no fields.
    pub fn write_document(&self, serializer: &FieldSerializer, document: &Document) -> Result<Vec<WireField>> {
        let mut fields = Vec::new();
        for mapping in &self.mappings {
            if let Some(value) = document.get(&mapping.property) {
                fields.extend(serializer.serialize(value, &mapping.target, &mapping.wire_name)?);
            }
        }
        Ok(fields)
    }

    /// Checks the bindings against a schema, logging every issue found.
    pub fn validate(&self, resolver: &SchemaResolver) -> Vec<MappingIssue> {
        let mut issues = Vec::new();
        let mut seen = HashMap::<&str, &str, FieldHasher>::default();
        for mapping in &self.mappings {
            if let Some(other) = seen.insert(&mapping.wire_name, &mapping.property) {
                issues.push(MappingIssue::error(
                    &mapping.property,
                    format!("wire field '{}' is also mapped by '{}'", mapping.wire_name, other),
                ));
            }
            let Some(resolved) = resolver.resolve_field(&mapping.wire_name) else {
                issues.push(MappingIssue::error(
                    &mapping.property,
                    format!("wire field '{}' is not declared in the schema", mapping.wire_name),
                ));
                continue;
            };
            let field = resolved.field();
            let collection = mapping.target.is_collection();
            if field.is_multi_valued() && !collection {
                issues.push(MappingIssue::error(
                    &mapping.property,
                    format!("multi-valued field '{}' is mapped to {}", mapping.wire_name, mapping.target),
                ));
            } else if !field.is_multi_valued() && collection {
                issues.push(MappingIssue::error(
                    &mapping.property,
                    format!("single-valued field '{}' is mapped to {}", mapping.wire_name, mapping.target),
                ));
            }
            let declared = mapping.target.element().unwrap_or(&mapping.target).base();
            if let Some(hint) = resolver.field_type(field).and_then(|t| t.target_hint()) {
                if !compatible(&hint, declared) {
                    issues.push(MappingIssue::warning(
                        &mapping.property,
                        format!(
                            "field '{}' of type '{}' holds {} values but is mapped to {}",
                            mapping.wire_name,
                            field.type_name(),
                            hint,
                            declared
                        ),
                    ));
                }
            }
        }
        if let Some(key) = resolver.unique_key() {
            if self.by_wire_name(key).is_none() {
                issues.push(MappingIssue::warning(key, format!("unique key '{}' is not mapped", key)));
            }
        }
        for issue in &issues {
            warn!(severity = ?issue.severity, property = %issue.property, "{}", issue.message);
        }
        issues
    }
}

// Text-typed fields may carry enums, identifiers and decimals; floating
// point fields may be read as decimals.
fn compatible(hint: &TargetType, declared: &TargetType) -> bool {
    match (hint, declared) {
        (h, d) if h == d => true,
        (TargetType::Str, TargetType::Enum(_) | TargetType::Guid | TargetType::Decimal) => true,
        (TargetType::Float | TargetType::Double, TargetType::Decimal) => true,
        _ => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingIssue {
    severity: Severity,
    property: String,
    message: String,
}

impl MappingIssue {
    fn error(property: &str, message: String) -> Self {
        Self {
            severity: Severity::Error,
            property: property.to_string(),
            message,
        }
    }
    fn warning(property: &str, message: String) -> Self {
        Self {
            severity: Severity::Warning,
            property: property.to_string(),
            message,
        }
    }
    pub fn severity(&self) -> Severity {
        self.severity
    }
    pub fn property(&self) -> &str {
        &self.property
    }
    pub fn message(&self) -> &str {
        &self.message
    }
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for MappingIssue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?} [{}]: {}", self.severity, self.property, self.message)
    }
}
