//! Schema - Declare the arguments and attributes of a resource
//!
//! Resources declare which fields a user may set (arguments) and which are
//! reported back by the remote system (attributes). The same declarations
//! drive config validation and default handling in the host.

use std::collections::HashMap;
use std::fmt;

use crate::resource::{AttributeMap, Value};

/// Attribute type
#[derive(Debug, Clone)]
pub enum AttributeType {
    /// String
    String,
    /// Integer
    Int,
    /// Boolean
    Bool,
    /// Enum (list of allowed values)
    Enum(Vec<String>),
    /// Custom type (with validation function)
    Custom {
        name: String,
        base: Box<AttributeType>,
        validate: fn(&Value) -> Result<(), String>,
    },
    /// List
    List(Box<AttributeType>),
    /// Map
    Map(Box<AttributeType>),
    /// Nested block, represented as a list of maps
    Block {
        attributes: Vec<AttributeSchema>,
        max_items: Option<usize>,
    },
}

impl AttributeType {
    /// Check if a value conforms to this type
    pub fn validate(&self, value: &Value) -> Result<(), TypeError> {
        match (self, value) {
            (AttributeType::String, Value::String(_)) => Ok(()),
            (AttributeType::Int, Value::Int(_)) => Ok(()),
            (AttributeType::Bool, Value::Bool(_)) => Ok(()),

            (AttributeType::Enum(variants), Value::String(s)) => {
                if variants.iter().any(|v| v == s) {
                    Ok(())
                } else {
                    Err(TypeError::InvalidEnumVariant {
                        value: s.clone(),
                        expected: variants.clone(),
                    })
                }
            }

            (AttributeType::Custom { validate, base, .. }, v) => {
                base.validate(v)?;
                validate(v).map_err(|msg| TypeError::ValidationFailed { message: msg })
            }

            (AttributeType::List(inner), Value::List(items)) => {
                for (i, item) in items.iter().enumerate() {
                    inner.validate(item).map_err(|e| TypeError::ListItemError {
                        index: i,
                        inner: Box::new(e),
                    })?;
                }
                Ok(())
            }

            (AttributeType::Map(inner), Value::Map(map)) => {
                for (k, v) in map {
                    inner.validate(v).map_err(|e| TypeError::MapValueError {
                        key: k.clone(),
                        inner: Box::new(e),
                    })?;
                }
                Ok(())
            }

            (
                AttributeType::Block {
                    attributes,
                    max_items,
                },
                Value::List(items),
            ) => {
                if let Some(max) = max_items
                    && items.len() > *max
                {
                    return Err(TypeError::TooManyItems {
                        max: *max,
                        got: items.len(),
                    });
                }
                for (i, item) in items.iter().enumerate() {
                    let Value::Map(fields) = item else {
                        return Err(TypeError::ListItemError {
                            index: i,
                            inner: Box::new(TypeError::TypeMismatch {
                                expected: "Block".to_string(),
                                got: item.type_name(),
                            }),
                        });
                    };
                    let errors = validate_fields(attributes.iter(), fields);
                    if let Some(first) = errors.into_iter().next() {
                        return Err(TypeError::ListItemError {
                            index: i,
                            inner: Box::new(first),
                        });
                    }
                }
                Ok(())
            }

            _ => Err(TypeError::TypeMismatch {
                expected: self.type_name(),
                got: value.type_name(),
            }),
        }
    }

    fn type_name(&self) -> String {
        match self {
            AttributeType::String => "String".to_string(),
            AttributeType::Int => "Int".to_string(),
            AttributeType::Bool => "Bool".to_string(),
            AttributeType::Enum(variants) => format!("Enum({})", variants.join(" | ")),
            AttributeType::Custom { name, .. } => name.clone(),
            AttributeType::List(inner) => format!("List<{}>", inner.type_name()),
            AttributeType::Map(inner) => format!("Map<{}>", inner.type_name()),
            AttributeType::Block { .. } => "Block".to_string(),
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// Type error
#[derive(Debug, Clone, thiserror::Error)]
pub enum TypeError {
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("Invalid enum variant '{value}', expected one of: {}", expected.join(", "))]
    InvalidEnumVariant {
        value: String,
        expected: Vec<String>,
    },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Required attribute '{name}' is missing")]
    MissingRequired { name: String },

    #[error("Unknown attribute '{name}'")]
    UnknownAttribute { name: String },

    #[error("Attribute '{name}' is computed and cannot be set")]
    ComputedOnly { name: String },

    #[error("Too many items: at most {max} allowed, got {got}")]
    TooManyItems { max: usize, got: usize },

    #[error("Attribute '{name}': {inner}")]
    AttributeError { name: String, inner: Box<TypeError> },

    #[error("List item at index {index}: {inner}")]
    ListItemError { index: usize, inner: Box<TypeError> },

    #[error("Map value for key '{key}': {inner}")]
    MapValueError { key: String, inner: Box<TypeError> },
}

/// Attribute schema
#[derive(Debug, Clone)]
pub struct AttributeSchema {
    pub name: String,
    pub attr_type: AttributeType,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    /// Changing this argument replaces the resource
    pub force_new: bool,
    /// List items form a set; their order carries no meaning
    pub unordered: bool,
    /// Maps equivalent spellings of a value onto one form before comparison
    pub canonical: Option<fn(&Value) -> Value>,
    pub default: Option<Value>,
    pub description: Option<String>,
}

impl AttributeSchema {
    pub fn new(name: impl Into<String>, attr_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            attr_type,
            required: false,
            optional: false,
            computed: false,
            sensitive: false,
            force_new: false,
            unordered: false,
            canonical: None,
            default: None,
            description: None,
        }
    }

    /// Nested block attribute
    pub fn block(
        name: impl Into<String>,
        attributes: Vec<AttributeSchema>,
        max_items: Option<usize>,
    ) -> Self {
        Self::new(
            name,
            AttributeType::Block {
                attributes,
                max_items,
            },
        )
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self.optional = false;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self.required = false;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn unordered(mut self) -> Self {
        self.unordered = true;
        self
    }

    pub fn with_canonical(mut self, canonical: fn(&Value) -> Value) -> Self {
        self.canonical = Some(canonical);
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Whether a user may set this attribute in config
    pub fn is_argument(&self) -> bool {
        self.required || self.optional
    }

    /// Turn this argument into a computed-only attribute, including nested blocks.
    ///
    /// Validators are dropped since the value comes from the remote system.
    pub fn into_computed(self) -> Self {
        let attr_type = match self.attr_type {
            AttributeType::Block { attributes, .. } => AttributeType::Block {
                attributes: attributes
                    .into_iter()
                    .map(AttributeSchema::into_computed)
                    .collect(),
                max_items: None,
            },
            AttributeType::Custom { base, .. } => *base,
            AttributeType::Enum(_) => AttributeType::String,
            other => other,
        };
        Self {
            name: self.name,
            attr_type,
            required: false,
            optional: false,
            computed: true,
            sensitive: self.sensitive,
            force_new: false,
            unordered: self.unordered,
            canonical: self.canonical,
            default: None,
            description: self.description,
        }
    }

    /// Short flag summary, e.g. "required, force-new"
    pub fn flags(&self) -> String {
        let mut flags = Vec::new();
        if self.required {
            flags.push("required");
        }
        if self.optional {
            flags.push("optional");
        }
        if self.computed {
            flags.push("computed");
        }
        if self.sensitive {
            flags.push("sensitive");
        }
        if self.force_new {
            flags.push("force-new");
        }
        if self.unordered {
            flags.push("set");
        }
        flags.join(", ")
    }
}

/// Resource schema
#[derive(Debug, Clone)]
pub struct ResourceSchema {
    pub resource_type: String,
    pub attributes: HashMap<String, AttributeSchema>,
    pub description: Option<String>,
}

impl ResourceSchema {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            attributes: HashMap::new(),
            description: None,
        }
    }

    pub fn attribute(mut self, schema: AttributeSchema) -> Self {
        self.attributes.insert(schema.name.clone(), schema);
        self
    }

    pub fn with_attributes(mut self, schemas: impl IntoIterator<Item = AttributeSchema>) -> Self {
        for schema in schemas {
            self.attributes.insert(schema.name.clone(), schema);
        }
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Names of the arguments a user may set, sorted
    pub fn argument_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .attributes
            .values()
            .filter(|a| a.is_argument())
            .map(|a| a.name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    /// Validate a user config against this schema
    pub fn validate(&self, config: &AttributeMap) -> Result<(), Vec<TypeError>> {
        let errors = validate_fields(self.attributes.values(), config);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Fill unset optional arguments that declare a default, including those
    /// nested in configured blocks
    pub fn apply_defaults(&self, config: &mut AttributeMap) {
        fill_defaults(self.attributes.values(), config);
    }

    /// The arguments of `attributes` in the form config and state are compared in
    pub fn comparable_arguments(&self, attributes: &AttributeMap) -> AttributeMap {
        self.attributes
            .values()
            .filter(|a| a.is_argument())
            .filter_map(|a| {
                attributes
                    .get(&a.name)
                    .and_then(|v| normalize(Some(a), v))
                    .map(|v| (a.name.clone(), v))
            })
            .collect()
    }
}

/// Drop zero values and nested computed-only fields so that config and state compare
/// the way the host treats them: an unset optional field equals its zero value.
/// Items of unordered lists are put in a canonical order.
pub(crate) fn normalize(schema: Option<&AttributeSchema>, value: &Value) -> Option<Value> {
    let value = match (schema.map(|s| &s.attr_type), value) {
        (Some(AttributeType::Block { attributes, .. }), Value::List(items)) => {
            let items: Vec<Value> = items
                .iter()
                .filter_map(|item| match item {
                    Value::Map(fields) => {
                        let fields: HashMap<String, Value> = fields
                            .iter()
                            .filter_map(|(k, v)| {
                                let nested = attributes.iter().find(|a| &a.name == k);
                                if nested.is_some_and(|a| !a.is_argument()) {
                                    return None;
                                }
                                normalize(nested, v).map(|v| (k.clone(), v))
                            })
                            .collect();
                        Some(Value::Map(fields))
                    }
                    other => normalize(None, other),
                })
                .collect();
            Value::List(items)
        }
        (_, Value::Map(map)) => Value::Map(
            map.iter()
                .filter_map(|(k, v)| normalize(None, v).map(|v| (k.clone(), v)))
                .collect(),
        ),
        (_, Value::List(items)) => Value::List(items.clone()),
        (_, other) => other.clone(),
    };

    let value = match schema.and_then(|s| s.canonical) {
        Some(canonical) => canonical(&value),
        None => value,
    };
    let value = match value {
        Value::List(mut items) if schema.is_some_and(|s| s.unordered) => {
            items.sort_by_cached_key(|item| item.to_json().to_string());
            Value::List(items)
        }
        other => other,
    };

    let zero = match &value {
        Value::Bool(b) => !b,
        Value::Int(i) => *i == 0,
        other => other.is_empty(),
    };
    if zero { None } else { Some(value) }
}

fn fill_defaults<'a>(
    schemas: impl Iterator<Item = &'a AttributeSchema>,
    values: &mut HashMap<String, Value>,
) {
    for schema in schemas {
        if let Some(default) = &schema.default
            && !values.contains_key(&schema.name)
        {
            values.insert(schema.name.clone(), default.clone());
        }

        if let AttributeType::Block { attributes, .. } = &schema.attr_type
            && let Some(Value::List(items)) = values.get_mut(&schema.name)
        {
            for item in items {
                if let Value::Map(fields) = item {
                    fill_defaults(attributes.iter(), fields);
                }
            }
        }
    }
}

fn validate_fields<'a>(
    schemas: impl Iterator<Item = &'a AttributeSchema>,
    values: &HashMap<String, Value>,
) -> Vec<TypeError> {
    let mut errors = Vec::new();
    let by_name: HashMap<&str, &AttributeSchema> =
        schemas.map(|s| (s.name.as_str(), s)).collect();

    for (name, schema) in &by_name {
        if schema.required && !values.contains_key(*name) && schema.default.is_none() {
            errors.push(TypeError::MissingRequired {
                name: name.to_string(),
            });
        }
    }

    for (name, value) in values {
        match by_name.get(name.as_str()) {
            None => errors.push(TypeError::UnknownAttribute { name: name.clone() }),
            Some(schema) if !schema.is_argument() => {
                errors.push(TypeError::ComputedOnly { name: name.clone() })
            }
            Some(schema) => {
                if let Err(e) = schema.attr_type.validate(value) {
                    errors.push(TypeError::AttributeError {
                        name: name.clone(),
                        inner: Box::new(e),
                    });
                }
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn non_empty() -> AttributeType {
        AttributeType::Custom {
            name: "NonEmpty".to_string(),
            base: Box::new(AttributeType::String),
            validate: |value| match value {
                Value::String(s) if !s.is_empty() => Ok(()),
                _ => Err("must not be empty".to_string()),
            },
        }
    }

    fn schema() -> ResourceSchema {
        ResourceSchema::new("widget")
            .attribute(AttributeSchema::new("name", non_empty()).required().force_new())
            .attribute(
                AttributeSchema::new("enabled", AttributeType::Bool)
                    .optional()
                    .with_default(Value::Bool(true)),
            )
            .attribute(
                AttributeSchema::block(
                    "backup",
                    vec![
                        AttributeSchema::new("name", AttributeType::String).required(),
                        AttributeSchema::new(
                            "unit",
                            AttributeType::Enum(vec!["Day".to_string(), "Hour".to_string()]),
                        )
                        .optional(),
                        AttributeSchema::new("last_run", AttributeType::String).computed(),
                    ],
                    Some(1),
                )
                .optional(),
            )
            .attribute(AttributeSchema::new("hostname", AttributeType::String).computed())
    }

    fn block(fields: Vec<(&str, Value)>) -> Value {
        Value::Map(
            fields
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
        )
    }

    #[test]
    fn validate_string_type() {
        let t = AttributeType::String;
        assert!(t.validate(&Value::String("hello".to_string())).is_ok());
        assert!(t.validate(&Value::Int(42)).is_err());
    }

    #[test]
    fn validate_enum_type() {
        let t = AttributeType::Enum(vec!["a".to_string(), "b".to_string()]);
        assert!(t.validate(&Value::String("a".to_string())).is_ok());
        assert!(t.validate(&Value::String("c".to_string())).is_err());
    }

    #[test]
    fn valid_config() {
        let mut attrs = HashMap::new();
        attrs.insert("name".to_string(), Value::String("w1".to_string()));
        attrs.insert(
            "backup".to_string(),
            Value::List(vec![block(vec![
                ("name", Value::String("nightly".to_string())),
                ("unit", Value::String("Day".to_string())),
            ])]),
        );
        assert!(schema().validate(&attrs).is_ok());
    }

    #[test]
    fn missing_required_attribute() {
        let result = schema().validate(&HashMap::new());
        let errors = result.unwrap_err();
        assert!(
            errors
                .iter()
                .any(|e| matches!(e, TypeError::MissingRequired { name } if name == "name"))
        );
    }

    #[test]
    fn custom_validator_runs() {
        let mut attrs = HashMap::new();
        attrs.insert("name".to_string(), Value::String(String::new()));
        assert!(schema().validate(&attrs).is_err());
    }

    #[test]
    fn computed_attribute_cannot_be_set() {
        let mut attrs = HashMap::new();
        attrs.insert("name".to_string(), Value::String("w1".to_string()));
        attrs.insert("hostname".to_string(), Value::String("x".to_string()));
        let errors = schema().validate(&attrs).unwrap_err();
        assert!(matches!(&errors[0], TypeError::ComputedOnly { name } if name == "hostname"));
    }

    #[test]
    fn unknown_attribute_is_rejected() {
        let mut attrs = HashMap::new();
        attrs.insert("name".to_string(), Value::String("w1".to_string()));
        attrs.insert("colour".to_string(), Value::String("red".to_string()));
        assert!(schema().validate(&attrs).is_err());
    }

    #[test]
    fn block_max_items_enforced() {
        let item = block(vec![("name", Value::String("b".to_string()))]);
        let mut attrs = HashMap::new();
        attrs.insert("name".to_string(), Value::String("w1".to_string()));
        attrs.insert("backup".to_string(), Value::List(vec![item.clone(), item]));
        let errors = schema().validate(&attrs).unwrap_err();
        assert_eq!(
            errors[0].to_string(),
            "Attribute 'backup': Too many items: at most 1 allowed, got 2"
        );
    }

    #[test]
    fn nested_block_fields_are_validated() {
        let mut attrs = HashMap::new();
        attrs.insert("name".to_string(), Value::String("w1".to_string()));
        attrs.insert(
            "backup".to_string(),
            Value::List(vec![block(vec![(
                "unit",
                Value::String("Week".to_string()),
            )])]),
        );
        let errors = schema().validate(&attrs).unwrap_err();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn defaults_fill_unset_arguments() {
        let mut attrs = HashMap::new();
        attrs.insert("name".to_string(), Value::String("w1".to_string()));
        schema().apply_defaults(&mut attrs);
        assert_eq!(attrs.get("enabled"), Some(&Value::Bool(true)));

        let mut attrs = HashMap::new();
        attrs.insert("enabled".to_string(), Value::Bool(false));
        schema().apply_defaults(&mut attrs);
        assert_eq!(attrs.get("enabled"), Some(&Value::Bool(false)));
    }

    #[test]
    fn defaults_fill_nested_blocks() {
        let schema = ResourceSchema::new("widget").attribute(
            AttributeSchema::block(
                "backup",
                vec![
                    AttributeSchema::new("name", AttributeType::String).required(),
                    AttributeSchema::new("keep", AttributeType::Int)
                        .optional()
                        .with_default(Value::Int(30)),
                ],
                Some(1),
            )
            .optional(),
        );

        let mut attrs = HashMap::new();
        schema.apply_defaults(&mut attrs);
        assert!(attrs.is_empty());

        attrs.insert(
            "backup".to_string(),
            Value::List(vec![block(vec![(
                "name",
                Value::String("nightly".to_string()),
            )])]),
        );
        schema.apply_defaults(&mut attrs);
        assert_eq!(
            attrs["backup"],
            Value::List(vec![block(vec![
                ("name", Value::String("nightly".to_string())),
                ("keep", Value::Int(30)),
            ])])
        );
    }

    #[test]
    fn into_computed_strips_argument_flags() {
        let schema = schema();
        let backup = schema.attributes["backup"].clone().into_computed();
        assert!(backup.computed);
        assert!(!backup.is_argument());
        let AttributeType::Block {
            attributes,
            max_items,
        } = backup.attr_type
        else {
            panic!("Expected block");
        };
        assert!(max_items.is_none());
        assert!(attributes.iter().all(|a| a.computed && !a.required));

        let name = schema.attributes["name"].clone().into_computed();
        assert!(matches!(name.attr_type, AttributeType::String));
        assert!(!name.force_new);
    }

    #[test]
    fn comparable_arguments_use_the_canonical_form() {
        let schema = ResourceSchema::new("widget").with_attributes([
            AttributeSchema::new("sku", AttributeType::String)
                .optional()
                .with_canonical(|v| match v {
                    Value::String(s) => Value::String(s.to_ascii_lowercase()),
                    other => other.clone(),
                }),
            AttributeSchema::new("hostname", AttributeType::String).computed(),
        ]);
        let upper = AttributeMap::from([
            ("sku".to_string(), Value::String("P1V2".to_string())),
            ("hostname".to_string(), Value::String("w1.example.net".to_string())),
        ]);
        let lower = AttributeMap::from([("sku".to_string(), Value::String("p1v2".to_string()))]);

        assert_eq!(schema.comparable_arguments(&upper), schema.comparable_arguments(&lower));
        assert!(!schema.comparable_arguments(&upper).contains_key("hostname"));
    }

    #[test]
    fn argument_names_sorted() {
        assert_eq!(schema().argument_names(), vec!["backup", "enabled", "name"]);
    }
}
