//! The two recognized annotation kinds and their field schemas

use serde::Serialize;
use std::fmt;

use crate::errors::EvalError;
use crate::parser::Literal;

/// Package both annotations are declared in
pub const ANNOTATIONS_PACKAGE: &str = "nl.openweb.hippo.groovy.annotations";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AnnotationKind {
    Bootstrap,
    Updater,
}

impl AnnotationKind {
    pub const ALL: [AnnotationKind; 2] = [AnnotationKind::Bootstrap, AnnotationKind::Updater];

    pub fn simple_name(self) -> &'static str {
        match self {
            AnnotationKind::Bootstrap => "Bootstrap",
            AnnotationKind::Updater => "Updater",
        }
    }

    pub fn qualified_name(self) -> &'static str {
        match self {
            AnnotationKind::Bootstrap => "nl.openweb.hippo.groovy.annotations.Bootstrap",
            AnnotationKind::Updater => "nl.openweb.hippo.groovy.annotations.Updater",
        }
    }

    /// Match a name as written after `@`, simple or fully qualified
    pub fn from_name(name: &str) -> Option<Self> {
        AnnotationKind::ALL
            .into_iter()
            .find(|kind| kind.simple_name() == name || kind.qualified_name() == name)
    }

    /// Match a fully qualified name only
    pub fn from_qualified_name(name: &str) -> Option<Self> {
        AnnotationKind::ALL
            .into_iter()
            .find(|kind| kind.qualified_name() == name)
    }

    pub fn import_statement(self) -> String {
        format!("import {};", self.qualified_name())
    }

    pub fn fields(self) -> &'static [FieldSchema] {
        match self {
            AnnotationKind::Bootstrap => BOOTSTRAP_FIELDS,
            AnnotationKind::Updater => UPDATER_FIELDS,
        }
    }

    /// Check `arguments` against this kind's schema and fill in defaults
    pub fn evaluate(self, arguments: &[(String, Literal)]) -> Result<FieldValues, EvalError> {
        evaluate_fields(self.simple_name(), self.fields(), arguments)
    }
}

impl fmt::Display for AnnotationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.simple_name())
    }
}

// =============================================================================
// FIELD SCHEMAS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Boolean,
    Integer,
    Double,
}

impl FieldType {
    pub fn describe(self) -> &'static str {
        match self {
            FieldType::String => "a string",
            FieldType::Boolean => "a boolean",
            FieldType::Integer => "an integer",
            FieldType::Double => "a number",
        }
    }
}

/// Default of a field; `Required` fields have none
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldDefault {
    Required,
    String(&'static str),
    Boolean(bool),
    Integer(i64),
    Double(f64),
}

impl FieldDefault {
    fn value(self) -> Option<FieldValue> {
        match self {
            FieldDefault::Required => None,
            FieldDefault::String(s) => Some(FieldValue::String(s.to_string())),
            FieldDefault::Boolean(b) => Some(FieldValue::Boolean(b)),
            FieldDefault::Integer(i) => Some(FieldValue::Integer(i)),
            FieldDefault::Double(d) => Some(FieldValue::Double(d)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSchema {
    pub name: &'static str,
    pub field_type: FieldType,
    pub default: FieldDefault,
}

const fn field(name: &'static str, field_type: FieldType, default: FieldDefault) -> FieldSchema {
    FieldSchema {
        name,
        field_type,
        default,
    }
}

pub const BOOTSTRAP_FIELDS: &[FieldSchema] = &[
    field("contentroot", FieldType::String, FieldDefault::String("queue")),
    field("reload", FieldType::Boolean, FieldDefault::Boolean(false)),
    field("sequence", FieldType::Double, FieldDefault::Double(99999.0)),
    field("version", FieldType::String, FieldDefault::String("")),
    field("exclude", FieldType::Boolean, FieldDefault::Boolean(false)),
];

pub const UPDATER_FIELDS: &[FieldSchema] = &[
    field("name", FieldType::String, FieldDefault::Required),
    field("description", FieldType::String, FieldDefault::String("")),
    field("path", FieldType::String, FieldDefault::String("")),
    field("xpath", FieldType::String, FieldDefault::String("")),
    field("parameters", FieldType::String, FieldDefault::String("")),
    field("batchSize", FieldType::Integer, FieldDefault::Integer(10)),
    field("throttle", FieldType::Integer, FieldDefault::Integer(1000)),
    field("dryRun", FieldType::Boolean, FieldDefault::Boolean(false)),
];

// =============================================================================
// EVALUATION
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    String(String),
    Boolean(bool),
    Integer(i64),
    Double(f64),
}

/// Every field of one annotation, in schema order, with defaults applied
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValues {
    values: Vec<(&'static str, FieldValue)>,
}

impl FieldValues {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.values.iter().map(|(n, v)| (*n, v))
    }

    pub fn string(&self, name: &str) -> &str {
        match self.get(name) {
            Some(FieldValue::String(s)) => s,
            _ => "",
        }
    }

    pub fn boolean(&self, name: &str) -> bool {
        matches!(self.get(name), Some(FieldValue::Boolean(true)))
    }

    pub fn integer(&self, name: &str) -> i64 {
        match self.get(name) {
            Some(FieldValue::Integer(i)) => *i,
            _ => 0,
        }
    }

    pub fn double(&self, name: &str) -> f64 {
        match self.get(name) {
            Some(FieldValue::Double(d)) => *d,
            _ => 0.0,
        }
    }
}

/// Evaluate literal arguments against a field schema.
///
/// Every argument must name a schema field and carry a constant of the
/// field's type. Missing fields take their default; a missing required field
/// is an error.
pub fn evaluate_fields(
    annotation: &'static str,
    schema: &'static [FieldSchema],
    arguments: &[(String, Literal)],
) -> Result<FieldValues, EvalError> {
    let mut values: Vec<(&'static str, FieldValue)> = Vec::with_capacity(schema.len());

    for (name, literal) in arguments {
        let Some(field_schema) = schema.iter().find(|s| s.name == name) else {
            return Err(EvalError::UnknownField {
                annotation,
                field: name.clone(),
            });
        };
        if values.iter().any(|(n, _)| *n == field_schema.name) {
            return Err(EvalError::DuplicateField {
                annotation,
                field: name.clone(),
            });
        }
        values.push((field_schema.name, coerce(annotation, field_schema, literal)?));
    }

    for field_schema in schema {
        if values.iter().any(|(n, _)| *n == field_schema.name) {
            continue;
        }
        let default = field_schema.default.value().ok_or(EvalError::MissingField {
            annotation,
            field: field_schema.name,
        })?;
        values.push((field_schema.name, default));
    }

    values.sort_by_key(|(name, _)| schema.iter().position(|s| s.name == *name));
    Ok(FieldValues { values })
}

fn coerce(
    annotation: &'static str,
    field_schema: &FieldSchema,
    literal: &Literal,
) -> Result<FieldValue, EvalError> {
    if let Literal::Name(name) = literal {
        return Err(EvalError::UnresolvedConstant {
            annotation,
            field: field_schema.name,
            name: name.clone(),
        });
    }

    let value = match (field_schema.field_type, literal) {
        (FieldType::String, Literal::Str(s)) => Some(FieldValue::String(s.clone())),
        (FieldType::Boolean, Literal::Bool(b)) => Some(FieldValue::Boolean(*b)),
        (FieldType::Integer, Literal::Int(i)) => Some(FieldValue::Integer(*i)),
        (FieldType::Double, Literal::Float(f)) => Some(FieldValue::Double(*f)),
        (FieldType::Double, Literal::Int(i)) => Some(FieldValue::Double(*i as f64)),
        _ => None,
    };

    value.ok_or_else(|| EvalError::TypeMismatch {
        annotation,
        field: field_schema.name,
        expected: field_schema.field_type.describe(),
        found: literal.describe(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arg(name: &str, value: Literal) -> (String, Literal) {
        (name.to_string(), value)
    }

    fn text(value: &str) -> Literal {
        Literal::Str(value.to_string())
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(AnnotationKind::from_name("Updater"), Some(AnnotationKind::Updater));
        assert_eq!(
            AnnotationKind::from_name("nl.openweb.hippo.groovy.annotations.Bootstrap"),
            Some(AnnotationKind::Bootstrap)
        );
        assert_eq!(AnnotationKind::from_name("other.Updater"), None);
        assert_eq!(AnnotationKind::from_qualified_name("Updater"), None);
        assert_eq!(
            AnnotationKind::Updater.import_statement(),
            "import nl.openweb.hippo.groovy.annotations.Updater;"
        );
    }

    #[test]
    fn test_updater_defaults() -> Result<(), EvalError> {
        let values = AnnotationKind::Updater.evaluate(&[arg("name", text("Fix"))])?;
        assert_eq!(values.string("name"), "Fix");
        assert_eq!(values.string("description"), "");
        assert_eq!(values.integer("batchSize"), 10);
        assert_eq!(values.integer("throttle"), 1000);
        assert!(!values.boolean("dryRun"));

        let order: Vec<&str> = values.iter().map(|(n, _)| n).collect();
        let schema: Vec<&str> = UPDATER_FIELDS.iter().map(|f| f.name).collect();
        assert_eq!(order, schema);
        Ok(())
    }

    #[test]
    fn test_bootstrap_values() -> Result<(), EvalError> {
        let values = AnnotationKind::Bootstrap.evaluate(&[
            arg("reload", Literal::Bool(true)),
            arg("sequence", Literal::Int(3)),
            arg("contentroot", text("registry")),
        ])?;
        assert!(values.boolean("reload"));
        assert_eq!(values.double("sequence"), 3.0);
        assert_eq!(values.string("contentroot"), "registry");
        assert!(!values.boolean("exclude"));
        Ok(())
    }

    #[test]
    fn test_evaluation_errors() {
        let updater = AnnotationKind::Updater;
        assert!(matches!(
            updater.evaluate(&[]),
            Err(EvalError::MissingField { field: "name", .. })
        ));
        assert!(matches!(
            updater.evaluate(&[arg("name", text("a")), arg("nme", text("b"))]),
            Err(EvalError::UnknownField { .. })
        ));
        assert!(matches!(
            updater.evaluate(&[arg("name", text("a")), arg("batchSize", text("5"))]),
            Err(EvalError::TypeMismatch { field: "batchSize", .. })
        ));
        assert!(matches!(
            updater.evaluate(&[arg("name", text("a")), arg("throttle", Literal::Float(1.5))]),
            Err(EvalError::TypeMismatch { .. })
        ));
        assert!(matches!(
            updater.evaluate(&[arg("name", Literal::Name("Names.FIX".to_string()))]),
            Err(EvalError::UnresolvedConstant { .. })
        ));
        assert!(matches!(
            updater.evaluate(&[arg("name", text("a")), arg("name", text("b"))]),
            Err(EvalError::DuplicateField { .. })
        ));
        assert!(matches!(
            updater.evaluate(&[arg("value", text("a"))]),
            Err(EvalError::UnknownField { .. })
        ));
    }

    #[test]
    fn test_list_arguments_are_rejected() {
        let values = AnnotationKind::Updater.evaluate(&[
            arg("name", text("a")),
            arg("parameters", Literal::List(vec![text("x"), text("y")])),
        ]);
        assert!(matches!(
            values,
            Err(EvalError::TypeMismatch {
                field: "parameters",
                expected: "a string",
                ..
            })
        ));
    }
}
