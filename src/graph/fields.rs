use super::node::{FieldCondition, OperatorArity};
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// The external entity a condition field belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldNamespace {
    Return,
    Customer,
    Ticket,
}

impl FieldNamespace {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "return" => Some(FieldNamespace::Return),
            "customer" => Some(FieldNamespace::Customer),
            "ticket" => Some(FieldNamespace::Ticket),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FieldNamespace::Return => "Return",
            FieldNamespace::Customer => "Customer",
            FieldNamespace::Ticket => "Ticket",
        }
    }
}

impl fmt::Display for FieldNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldDataType {
    String,
    Number,
    Boolean,
    Date,
    Enum,
}

/// One entry of a namespace's field catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub key: String,
    pub label: String,
    pub data_type: FieldDataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
}

/// A field definition resolved from a dotted path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedField<'a> {
    pub namespace: FieldNamespace,
    pub definition: &'a FieldDefinition,
}

/// Which kind of value editor a condition needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueInput<'a> {
    /// Unary operators take no value.
    None,
    Enum(&'a [String]),
    FreeText(FieldDataType),
}

/// Lookup table of the fields conditions may reference, supplied by the host application.
///
/// The catalog's contents are owned elsewhere; this type only resolves paths against it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldCatalog {
    #[serde(rename = "return", default)]
    pub return_fields: Vec<FieldDefinition>,
    #[serde(rename = "customer", default)]
    pub customer_fields: Vec<FieldDefinition>,
    #[serde(rename = "ticket", default)]
    pub ticket_fields: Vec<FieldDefinition>,
}

impl FieldCatalog {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn fields(&self, namespace: FieldNamespace) -> &[FieldDefinition] {
        match namespace {
            FieldNamespace::Return => &self.return_fields,
            FieldNamespace::Customer => &self.customer_fields,
            FieldNamespace::Ticket => &self.ticket_fields,
        }
    }

    /// Resolves `namespace.key` to its definition.
    pub fn resolve(&self, path: &str) -> Option<ResolvedField<'_>> {
        let (namespace, key) = path.split_once('.')?;
        let namespace = FieldNamespace::parse(namespace)?;
        self.fields(namespace)
            .iter()
            .find(|f| f.key == key)
            .map(|definition| ResolvedField {
                namespace,
                definition,
            })
    }

    /// Chooses the value editor for `condition`: none for unary operators, a picker for enum
    /// fields, free text otherwise (including unknown fields).
    pub fn value_input<'a>(&'a self, condition: &FieldCondition) -> ValueInput<'a> {
        if condition.operator.arity() == OperatorArity::Unary {
            return ValueInput::None;
        }
        match self.resolve(&condition.field) {
            Some(resolved) => match &resolved.definition.enum_values {
                Some(values) => ValueInput::Enum(values),
                None => ValueInput::FreeText(resolved.definition.data_type),
            },
            None => ValueInput::FreeText(FieldDataType::String),
        }
    }
}

impl FieldCondition {
    /// Renders the condition as a short sentence, e.g. `Return Status equals "approved"`.
    pub fn describe(&self, catalog: &FieldCatalog) -> String {
        let field = match catalog.resolve(&self.field) {
            Some(resolved) => format!("{} {}", resolved.namespace, resolved.definition.label),
            None => self.field.clone(),
        };
        match self.operator.arity() {
            OperatorArity::Unary => format!("{} {}", field, self.operator.label()),
            OperatorArity::Binary => format!(
                "{} {} {}",
                field,
                self.operator.label(),
                describe_value(&self.value)
            ),
        }
    }
}

fn describe_value(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => format!("\"{}\"", s),
        JsonValue::Array(items) => format!("[{}]", items.iter().map(describe_value).join(", ")),
        other => other.to_string(),
    }
}
