//! # Type Predicates
//!
//! Classification of raw values as primitive, array, or neither. The engine pairs
//! these with [`PropertyType::is_primitive`](crate::PropertyType::is_primitive) and
//! [`PropertyType::is_array`](crate::PropertyType::is_array) on the declared side.

use serde_json::Value;

/// Coarse shape of a raw value, as far as routing cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueClass {
    /// String, number or boolean.
    Primitive,
    Array,
    /// Objects and `null`.
    Other,
}

pub fn classify(value: &Value) -> ValueClass {
    match value {
        Value::String(_) | Value::Number(_) | Value::Bool(_) => ValueClass::Primitive,
        Value::Array(_) => ValueClass::Array,
        Value::Object(_) | Value::Null => ValueClass::Other,
    }
}

/// `null` is not a primitive.
pub fn is_primitive(value: &Value) -> bool {
    classify(value) == ValueClass::Primitive
}

pub fn is_array(value: &Value) -> bool {
    classify(value) == ValueClass::Array
}
