//! Declared response schemas for structured generation.
//!
//! A [`ResponseSchema`] is a plain description of the object the service must
//! return: field names, value kinds, and whether each field is required.
//! Providers render it to JSON Schema for the request and use
//! [`ResponseSchema::parse`] to validate what comes back.

use serde_json::{Map, Value, json};

use crate::{completion::GenerationResponse, error::ServiceError};

/// Field carrying the attribute names echoed by the service.
pub(crate) const ATTRIBUTE_NAMES: &str = "attribute_names";
/// Field carrying the generated descriptions.
pub(crate) const DESCRIPTIONS: &str = "descriptions";
/// Field carrying the echoed entity name in the stereotype variant.
pub(crate) const ENTITY_NAME: &str = "entity_name";

/// Value shape of a [`SchemaField`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A single string.
    String,
    /// An ordered list of strings.
    StringList,
}

impl FieldKind {
    fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::StringList => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
        }
    }

    fn json_schema(self) -> Value {
        match self {
            Self::String => json!({ "type": "string" }),
            Self::StringList => json!({ "type": "array", "items": { "type": "string" } }),
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::String => "a string",
            Self::StringList => "an array of strings",
        }
    }
}

/// One named field of a [`ResponseSchema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaField {
    /// JSON property name.
    pub name: &'static str,
    /// Expected value shape.
    pub kind: FieldKind,
    /// Whether the property must be present.
    pub required: bool,
}

/// Shape of the structured object a completion service must return.
///
/// # Examples
/// ```
/// use aura_core::ResponseSchema;
///
/// let response = ResponseSchema::DESCRIPTIONS.parse(
///     r#"{"attribute_names":["Customer ID"],"descriptions":["Müşteri Tekil Anahtarı"]}"#,
/// )?;
/// assert_eq!(response.attribute_names, ["Customer ID"]);
/// # Ok::<(), aura_core::ServiceError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseSchema {
    /// Name reported to the service alongside the schema.
    pub name: &'static str,
    /// Declared fields, in declaration order.
    pub fields: &'static [SchemaField],
}

impl ResponseSchema {
    /// Attribute names paired with free-text descriptions.
    pub const DESCRIPTIONS: Self = Self {
        name: "attribute_description",
        fields: &[
            SchemaField {
                name: ATTRIBUTE_NAMES,
                kind: FieldKind::StringList,
                required: true,
            },
            SchemaField {
                name: DESCRIPTIONS,
                kind: FieldKind::StringList,
                required: true,
            },
        ],
    };

    /// Attribute names paired with stereotype tags, plus the echoed entity.
    pub const STEREOTYPES: Self = Self {
        name: "attribute_stereotype",
        fields: &[
            SchemaField {
                name: ENTITY_NAME,
                kind: FieldKind::String,
                required: true,
            },
            SchemaField {
                name: ATTRIBUTE_NAMES,
                kind: FieldKind::StringList,
                required: true,
            },
            SchemaField {
                name: DESCRIPTIONS,
                kind: FieldKind::StringList,
                required: true,
            },
        ],
    };

    /// Returns whether the schema declares a field called `name`.
    #[must_use]
    pub fn declares(&self, name: &str) -> bool {
        self.fields.iter().any(|field| field.name == name)
    }

    /// Returns whether responses echo an entity name, which means requests
    /// must carry one.
    #[must_use]
    pub fn expects_entity(&self) -> bool {
        self.declares(ENTITY_NAME)
    }

    /// Renders the schema as a closed JSON Schema object.
    ///
    /// # Examples
    /// ```
    /// use aura_core::ResponseSchema;
    ///
    /// let schema = ResponseSchema::DESCRIPTIONS.json_schema();
    /// assert_eq!(schema["required"][0], "attribute_names");
    /// assert_eq!(schema["additionalProperties"], false);
    /// ```
    #[must_use]
    pub fn json_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|field| (field.name.to_owned(), field.kind.json_schema()))
            .collect();
        let required: Vec<&str> = self
            .fields
            .iter()
            .filter(|field| field.required)
            .map(|field| field.name)
            .collect();
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        })
    }

    /// Parses `raw` as JSON and checks it against the declared fields.
    ///
    /// # Errors
    /// Returns [`ServiceError::SchemaValidation`] when `raw` is not a JSON
    /// object, a required field is missing, or a field has the wrong shape.
    pub fn parse(&self, raw: &str) -> Result<GenerationResponse, ServiceError> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|err| self.violation(format!("invalid JSON: {err}")))?;
        let Value::Object(object) = value else {
            return Err(self.violation("expected a JSON object"));
        };

        for field in self.fields {
            match object.get(field.name) {
                None if field.required => {
                    return Err(self.violation(format!("missing field `{}`", field.name)));
                }
                Some(value) if !field.kind.matches(value) => {
                    return Err(self.violation(format!(
                        "field `{}` must be {}",
                        field.name,
                        field.kind.label()
                    )));
                }
                _ => {}
            }
        }

        Ok(GenerationResponse {
            attribute_names: string_list(&object, ATTRIBUTE_NAMES),
            descriptions: string_list(&object, DESCRIPTIONS),
            entity_name: object
                .get(ENTITY_NAME)
                .and_then(Value::as_str)
                .map(ToOwned::to_owned),
        })
    }

    fn violation(&self, reason: impl Into<String>) -> ServiceError {
        ServiceError::SchemaValidation {
            schema: self.name.to_owned(),
            reason: reason.into(),
        }
    }
}

fn string_list(object: &Map<String, Value>, name: &str) -> Vec<String> {
    object
        .get(name)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(ToOwned::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[test]
    fn parse_accepts_description_payload() {
        let response = ResponseSchema::DESCRIPTIONS
            .parse(r#"{"attribute_names":["Order Date"],"descriptions":["Sipariş Tarihi"]}"#)
            .expect("payload conforms");
        assert_eq!(response.attribute_names, ["Order Date"]);
        assert_eq!(response.descriptions, ["Sipariş Tarihi"]);
        assert_eq!(response.entity_name, None);
    }

    #[test]
    fn parse_reads_entity_echo() {
        let response = ResponseSchema::STEREOTYPES
            .parse(
                r#"{"entity_name":"Customer","attribute_names":["Customer ID"],"descriptions":["core"]}"#,
            )
            .expect("payload conforms");
        assert_eq!(response.entity_name.as_deref(), Some("Customer"));
        assert_eq!(response.descriptions, ["core"]);
    }

    #[test]
    fn parse_keeps_mismatched_lengths() {
        let response = ResponseSchema::DESCRIPTIONS
            .parse(r#"{"attribute_names":["a","b","c"],"descriptions":["x","y"]}"#)
            .expect("lengths are not part of the schema");
        assert_eq!(response.attribute_names.len(), 3);
        assert_eq!(response.descriptions.len(), 2);
    }

    #[rstest]
    #[case::not_json("not json", "invalid JSON")]
    #[case::not_object("[1, 2]", "expected a JSON object")]
    #[case::missing_field(r#"{"attribute_names":[]}"#, "missing field `descriptions`")]
    #[case::wrong_shape(
        r#"{"attribute_names":"a","descriptions":[]}"#,
        "field `attribute_names` must be an array of strings"
    )]
    #[case::non_string_item(
        r#"{"attribute_names":["a"],"descriptions":[1]}"#,
        "field `descriptions` must be an array of strings"
    )]
    fn parse_rejects_non_conforming_payloads(#[case] raw: &str, #[case] expected: &str) {
        let err = ResponseSchema::DESCRIPTIONS
            .parse(raw)
            .expect_err("payload must be rejected");
        match err {
            ServiceError::SchemaValidation { schema, reason } => {
                assert_eq!(schema, "attribute_description");
                assert!(reason.contains(expected), "unexpected reason: {reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn stereotype_schema_requires_entity_echo() {
        let err = ResponseSchema::STEREOTYPES
            .parse(r#"{"attribute_names":[],"descriptions":[]}"#)
            .expect_err("entity echo is required");
        assert!(matches!(err, ServiceError::SchemaValidation { .. }));
        assert!(ResponseSchema::STEREOTYPES.expects_entity());
        assert!(!ResponseSchema::DESCRIPTIONS.expects_entity());
    }

    #[test]
    fn json_schema_lists_every_field() {
        let schema = ResponseSchema::STEREOTYPES.json_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["entity_name"]["type"], "string");
        assert_eq!(schema["properties"]["descriptions"]["type"], "array");
        assert_eq!(
            schema["properties"]["descriptions"]["items"]["type"],
            "string"
        );
        assert_eq!(
            schema["required"],
            json!(["entity_name", "attribute_names", "descriptions"])
        );
    }
}
