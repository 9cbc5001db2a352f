use log::{debug, warn};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Schema type names allowed by the OpenAPI object model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    Object,
    Array,
    String,
    Integer,
    Number,
    Boolean,
}

impl SchemaType {
    /// Parse a schema type from a JSON value, typically coming from a
    /// documentation fragment.
    fn from_value(value: &Value) -> Option<SchemaType> {
        serde_json::from_value(value.clone()).ok()
    }
}

/// OpenAPI Schema definition.
///
/// Used both for named definitions in the `definitions` table and for
/// properties scoped to a single field of a parent object definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// The type of the schema (object, array, string, integer, number, boolean)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,
    /// Format for primitive types (e.g., "date", "date-time", "password")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Properties for object types, in declaration order
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
    /// Required property names for object types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    /// Enum values as JSON literals
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    /// Items schema for array types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    /// Whether (or with what shape) extra keys are allowed on an object
    #[serde(
        rename = "additionalProperties",
        skip_serializing_if = "Option::is_none"
    )]
    pub additional_properties: Option<AdditionalProperties>,
    /// Reference to another named definition
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

/// `additionalProperties` is either a boolean switch or a nested schema
/// describing the values of an open/dictionary object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Allowed(bool),
    Schema(Box<Schema>),
}

/// Ordered mapping of property names to schemas.
///
/// Iteration and serialization follow insertion order, which the describers
/// keep equal to field declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties(Vec<(String, Schema)>);

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.0.iter().any(|(n, _)| n == name)
    }

    pub fn get(&self, name: &str) -> Option<&Schema> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, s)| s)
    }

    /// Returns the property named `name`, creating an empty one at the end
    /// of the map if it does not exist yet.
    pub fn entry(&mut self, name: &str) -> &mut Schema {
        let index = match self.0.iter().position(|(n, _)| n == name) {
            Some(index) => index,
            None => {
                self.0.push((name.to_string(), Schema::new()));
                self.0.len() - 1
            }
        };
        &mut self.0[index].1
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Schema)> {
        self.0.iter().map(|(n, s)| (n.as_str(), s))
    }

    /// Property names in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(n, _)| n.as_str())
    }
}

impl Serialize for Properties {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, schema) in &self.0 {
            map.serialize_entry(name, schema)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Properties {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct PropertiesVisitor;

        impl<'de> Visitor<'de> for PropertiesVisitor {
            type Value = Properties;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of property names to schemas")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(entry) = access.next_entry()? {
                    entries.push(entry);
                }
                Ok(Properties(entries))
            }
        }

        deserializer.deserialize_map(PropertiesVisitor)
    }
}

impl Schema {
    /// Create a new empty schema
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a schema with only its type set
    pub fn of(schema_type: SchemaType) -> Self {
        Schema {
            schema_type: Some(schema_type),
            ..Self::default()
        }
    }

    /// Returns the property named `name`, creating it if necessary
    pub fn property_mut(&mut self, name: &str) -> &mut Schema {
        self.properties
            .get_or_insert_with(Properties::new)
            .entry(name)
    }

    /// Append a name to the required list if not already present
    pub fn push_required(&mut self, name: &str) {
        let required = self.required.get_or_insert_with(Vec::new);
        if !required.iter().any(|n| n == name) {
            required.push(name.to_string());
        }
    }

    /// Overlay an externally supplied documentation fragment onto this
    /// schema. Fragment values overwrite current ones; type inference run
    /// afterwards only fills attributes the fragment left unset, so an
    /// explicit annotation always wins over an inferred value.
    pub fn merge_fragment(&mut self, fragment: &Value) {
        let map = match fragment.as_object() {
            Some(map) => map,
            None => {
                warn!("documentation fragment is not an object, ignoring: {}", fragment);
                return;
            }
        };

        for (key, value) in map {
            match key.as_str() {
                "type" => match SchemaType::from_value(value) {
                    Some(schema_type) => self.schema_type = Some(schema_type),
                    None => warn!("unknown schema type in documentation fragment: {}", value),
                },
                "format" => {
                    if let Some(format) = value.as_str() {
                        self.format = Some(format.to_string());
                    }
                }
                "enum" => {
                    if let Some(values) = value.as_array() {
                        self.enum_values = Some(values.clone());
                    }
                }
                "items" => {
                    let mut items = Schema::new();
                    items.merge_fragment(value);
                    self.items = Some(Box::new(items));
                }
                "properties" => {
                    if let Some(entries) = value.as_object() {
                        for (name, sub_fragment) in entries {
                            self.property_mut(name).merge_fragment(sub_fragment);
                        }
                    }
                }
                "required" => {
                    if let Some(names) = value.as_array() {
                        self.required = Some(
                            names
                                .iter()
                                .filter_map(Value::as_str)
                                .map(str::to_string)
                                .collect(),
                        );
                    }
                }
                "additionalProperties" => match value {
                    Value::Bool(allowed) => {
                        self.additional_properties =
                            Some(AdditionalProperties::Allowed(*allowed));
                    }
                    Value::Object(_) => {
                        let mut nested = Schema::new();
                        nested.merge_fragment(value);
                        self.additional_properties =
                            Some(AdditionalProperties::Schema(Box::new(nested)));
                    }
                    _ => warn!("invalid additionalProperties in documentation fragment"),
                },
                "$ref" => {
                    if let Some(reference) = value.as_str() {
                        self.reference = Some(reference.to_string());
                    }
                }
                other => {
                    debug!("ignoring unsupported documentation key '{}'", other);
                }
            }
        }
    }

    // The fill_* setters write only when the attribute is still unset:
    // the first inference wins and merged documentation is never clobbered.

    pub(crate) fn fill_type(&mut self, schema_type: SchemaType) {
        if self.schema_type.is_none() {
            self.schema_type = Some(schema_type);
        }
    }

    pub(crate) fn fill_format(&mut self, format: impl Into<String>) {
        if self.format.is_none() {
            self.format = Some(format.into());
        }
    }

    pub(crate) fn fill_enum(&mut self, values: Vec<Value>) {
        if self.enum_values.is_none() {
            self.enum_values = Some(values);
        }
    }

    pub(crate) fn fill_items(&mut self, items: Schema) {
        if self.items.is_none() {
            self.items = Some(Box::new(items));
        }
    }

    pub(crate) fn fill_required(&mut self, names: Vec<String>) {
        if self.required.is_none() {
            self.required = Some(names);
        }
    }

    pub(crate) fn fill_reference(&mut self, reference: impl Into<String>) {
        if self.reference.is_none() {
            self.reference = Some(reference.into());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_properties_preserve_insertion_order() {
        let mut schema = Schema::of(SchemaType::Object);
        schema.property_mut("zulu").fill_type(SchemaType::String);
        schema.property_mut("alpha").fill_type(SchemaType::Integer);
        schema.property_mut("mike").fill_type(SchemaType::Boolean);

        let names: Vec<&str> = schema.properties.as_ref().unwrap().keys().collect();
        assert_eq!(names, vec!["zulu", "alpha", "mike"]);

        let serialized = serde_json::to_string(&schema).unwrap();
        let zulu = serialized.find("zulu").unwrap();
        let alpha = serialized.find("alpha").unwrap();
        let mike = serialized.find("mike").unwrap();
        assert!(zulu < alpha && alpha < mike);
    }

    #[test]
    fn test_property_mut_reuses_existing_entry() {
        let mut schema = Schema::new();
        schema.property_mut("name").fill_type(SchemaType::String);
        schema.property_mut("name").fill_type(SchemaType::Integer);

        let properties = schema.properties.as_ref().unwrap();
        assert_eq!(properties.len(), 1);
        // First write wins
        assert_eq!(
            properties.get("name").unwrap().schema_type,
            Some(SchemaType::String)
        );
    }

    #[test]
    fn test_push_required_deduplicates() {
        let mut schema = Schema::new();
        schema.push_required("email");
        schema.push_required("email");
        schema.push_required("name");

        assert_eq!(
            schema.required,
            Some(vec!["email".to_string(), "name".to_string()])
        );
    }

    #[test]
    fn test_merge_fragment_sets_attributes() {
        let mut schema = Schema::new();
        schema.merge_fragment(&json!({
            "type": "string",
            "format": "uuid",
            "enum": ["a", "b"],
        }));

        assert_eq!(schema.schema_type, Some(SchemaType::String));
        assert_eq!(schema.format, Some("uuid".to_string()));
        assert_eq!(schema.enum_values, Some(vec![json!("a"), json!("b")]));
    }

    #[test]
    fn test_merge_fragment_unknown_type_ignored() {
        let mut schema = Schema::new();
        schema.merge_fragment(&json!({"type": "whatever"}));

        assert_eq!(schema.schema_type, None);
    }

    #[test]
    fn test_merge_fragment_nested_items_and_properties() {
        let mut schema = Schema::new();
        schema.merge_fragment(&json!({
            "type": "object",
            "properties": {"tags": {"type": "array", "items": {"type": "string"}}},
            "required": ["tags"],
        }));

        let tags = schema
            .properties
            .as_ref()
            .unwrap()
            .get("tags")
            .unwrap();
        assert_eq!(tags.schema_type, Some(SchemaType::Array));
        assert_eq!(
            tags.items.as_ref().unwrap().schema_type,
            Some(SchemaType::String)
        );
        assert_eq!(schema.required, Some(vec!["tags".to_string()]));
    }

    #[test]
    fn test_fill_does_not_overwrite_merged_values() {
        let mut schema = Schema::new();
        schema.merge_fragment(&json!({"format": "custom"}));

        schema.fill_type(SchemaType::String);
        schema.fill_format("date");

        assert_eq!(schema.schema_type, Some(SchemaType::String));
        assert_eq!(schema.format, Some("custom".to_string()));
    }

    #[test]
    fn test_additional_properties_serialization() {
        let mut open = Schema::of(SchemaType::Object);
        open.additional_properties = Some(AdditionalProperties::Allowed(true));
        assert_eq!(
            serde_json::to_value(&open).unwrap(),
            json!({"type": "object", "additionalProperties": true})
        );

        let mut dictionary = Schema::of(SchemaType::Object);
        dictionary.additional_properties = Some(AdditionalProperties::Schema(Box::new(
            Schema::of(SchemaType::Integer),
        )));
        assert_eq!(
            serde_json::to_value(&dictionary).unwrap(),
            json!({"type": "object", "additionalProperties": {"type": "integer"}})
        );
    }

    #[test]
    fn test_unset_attributes_are_skipped_in_output() {
        let schema = Schema::of(SchemaType::String);
        assert_eq!(
            serde_json::to_value(&schema).unwrap(),
            json!({"type": "string"})
        );
    }

    #[test]
    fn test_schema_roundtrip() {
        let mut schema = Schema::of(SchemaType::Object);
        schema.property_mut("id").fill_type(SchemaType::Integer);
        schema.property_mut("name").fill_type(SchemaType::String);
        schema.push_required("id");

        let serialized = serde_json::to_string(&schema).unwrap();
        let deserialized: Schema = serde_json::from_str(&serialized).unwrap();
        assert_eq!(deserialized, schema);
    }
}
