//! Schema-related structure definitions

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;

/// Schema for one use site: a reference, an array, an object, or a data type.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum Schema {
    /// Component reference (e.g., "#/components/schemas/User")
    Ref(Reference),
    /// `type: array` with an item schema
    Array(ArraySchema),
    /// `type: object`, optionally with properties
    Object(ObjectSchema),
    /// Attributes produced by a rendering rule (`type`, `format`, ...)
    Data(Attributes),
}

impl Schema {
    /// Create a component schema reference
    #[must_use]
    pub fn reference(name: &str) -> Self {
        Self::Ref(Reference::schema(name))
    }

    #[must_use]
    pub fn array(items: Schema) -> Self {
        Self::Array(ArraySchema {
            schema_type: SchemaType::Array,
            items: Box::new(items),
        })
    }

    /// Bare `type: object` with no properties block
    #[must_use]
    pub const fn object() -> Self {
        Self::Object(ObjectSchema {
            schema_type: SchemaType::Object,
            properties: None,
        })
    }

    /// Object with the given properties. An empty map yields a bare object.
    #[must_use]
    pub fn object_with(properties: IndexMap<String, Schema>) -> Self {
        Self::Object(ObjectSchema {
            schema_type: SchemaType::Object,
            properties: (!properties.is_empty()).then_some(properties),
        })
    }

    #[must_use]
    pub const fn data(attributes: Attributes) -> Self {
        Self::Data(attributes)
    }

    /// The `$ref` path if this schema is a reference
    #[must_use]
    pub fn ref_path(&self) -> Option<&str> {
        match self {
            Self::Ref(reference) => Some(&reference.ref_path),
            _ => None,
        }
    }
}

/// Reference definition
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Reference {
    /// Reference path (e.g., "#/components/schemas/User")
    #[serde(rename = "$ref")]
    pub ref_path: String,
}

impl Reference {
    /// Create a new reference
    #[must_use]
    pub const fn new(ref_path: String) -> Self {
        Self { ref_path }
    }

    /// Create a component schema reference
    #[must_use]
    pub fn schema(name: &str) -> Self {
        Self::new(format!("#/components/schemas/{name}"))
    }
}

/// Structural schema types. Scalar types live in [`Attributes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    Array,
    Object,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ArraySchema {
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    pub items: Box<Schema>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ObjectSchema {
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, Schema>>,
}

/// Scalar schema attributes written by rendering rules, such as
/// `type: string, format: date-time`.
///
/// Serialization writes `type` first and every other key alphabetically.
/// Keyword values that read as booleans or numbers are written as YAML
/// booleans or numbers, so `nullable: true` is not a quoted string. `default`
/// and `example` follow the schema's own `type`, so a string schema keeps a
/// string default such as `"0123"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(BTreeMap<String, String>);

impl Attributes {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key`, replacing any earlier value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in emission order: `type` first, the rest alphabetical.
    #[must_use]
    pub fn sorted(&self) -> Vec<(&str, &str)> {
        let head = self.0.get_key_value("type");
        let rest = self.0.iter().filter(|(k, _)| k.as_str() != "type");
        head.into_iter()
            .chain(rest)
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// How an attribute value is written out.
#[derive(Debug, Clone, Copy, PartialEq)]
enum ScalarValue<'a> {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(&'a str),
}

/// Keys whose value is an instance of the schema itself.
const INSTANCE_KEYS: [&str; 2] = ["default", "example"];

/// Keys whose value is always text.
const TEXT_KEYS: [&str; 5] = ["type", "format", "pattern", "description", "title"];

impl<'a> ScalarValue<'a> {
    /// How the value of `key` is written in a schema of type `schema_type`.
    fn classify(key: &str, raw: &'a str, schema_type: Option<&str>) -> Self {
        if TEXT_KEYS.contains(&key) {
            return Self::Str(raw);
        }
        if INSTANCE_KEYS.contains(&key) {
            return Self::instance(raw, schema_type);
        }
        Self::literal(raw)
    }

    /// A value typed as the schema, or text when it does not fit the type.
    fn instance(raw: &'a str, schema_type: Option<&str>) -> Self {
        match (schema_type, Self::literal(raw)) {
            (Some("boolean"), value @ Self::Bool(_))
            | (Some("integer"), value @ Self::Int(_))
            | (Some("number"), value @ (Self::Int(_) | Self::Float(_))) => value,
            _ => Self::Str(raw),
        }
    }

    /// Typed by the text alone.
    fn literal(raw: &'a str) -> Self {
        match raw {
            "true" => return Self::Bool(true),
            "false" => return Self::Bool(false),
            _ => {}
        }
        if let Ok(int) = raw.parse::<i64>() {
            return Self::Int(int);
        }
        let decimal = raw.contains('.')
            && raw
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+'));
        match raw.parse::<f64>() {
            Ok(float) if decimal && float.is_finite() => Self::Float(float),
            _ => Self::Str(raw),
        }
    }
}

impl Serialize for ScalarValue<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            Self::Bool(b) => serializer.serialize_bool(b),
            Self::Int(i) => serializer.serialize_i64(i),
            Self::Float(f) => serializer.serialize_f64(f),
            Self::Str(s) => serializer.serialize_str(s),
        }
    }
}

impl Serialize for Attributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let schema_type = self.get("type");
        let entries = self.sorted();
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (key, value) in entries {
            map.serialize_entry(key, &ScalarValue::classify(key, value, schema_type))?;
        }
        map.end()
    }
}

/// `OpenAPI` Components (reusable components)
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Components {
    /// Schema definitions, in emission order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schemas: Option<IndexMap<String, Schema>>,
    /// Security scheme definitions, in registration order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_schemes: Option<IndexMap<String, SecurityScheme>>,
}

impl Components {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.schemas.is_none() && self.security_schemes.is_none()
    }
}

/// Security scheme type
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SecuritySchemeType {
    ApiKey,
    Http,
}

/// Security scheme definition. Fields after `type` are alphabetical.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityScheme {
    /// Security scheme type
    pub r#type: SecuritySchemeType,
    /// Bearer format (for HTTP Bearer)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bearer_format: Option<String>,
    /// Location (for API Key: query, header, cookie)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#in: Option<String>,
    /// Name (for API Key)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Scheme (for HTTP: bearer, basic, etc.)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
}

impl SecurityScheme {
    #[must_use]
    pub fn http(scheme: &str) -> Self {
        Self {
            r#type: SecuritySchemeType::Http,
            bearer_format: None,
            r#in: None,
            name: None,
            scheme: Some(scheme.to_string()),
        }
    }

    #[must_use]
    pub fn with_bearer_format(mut self, format: &str) -> Self {
        self.bearer_format = Some(format.to_string());
        self
    }

    #[must_use]
    pub fn api_key(location: &str, name: &str) -> Self {
        Self {
            r#type: SecuritySchemeType::ApiKey,
            bearer_format: None,
            r#in: Some(location.to_string()),
            name: Some(name.to_string()),
            scheme: None,
        }
    }
}
