//! # Routed Values & Field Slots
//!
//! Routing a raw value produces a [`Routed`] value: either the raw JSON itself, a
//! type-erased instance, or a list of routed values. [`FromRouted`] turns that
//! back into the concrete shape of the target field.

use crate::error::MappingError;
use crate::types::Instance;
use serde_json::Value;
use std::sync::Arc;

/// Output of routing one property value.
#[derive(Debug)]
pub enum Routed {
    /// Raw value, copied unchanged.
    Raw(Value),
    /// Result of a nested deserializer or native constructor.
    Instance(Instance),
    /// Element-wise routed array.
    Many(Vec<Routed>),
}

impl Routed {
    /// Converts back to plain data. `None` if an instance is involved.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Routed::Raw(value) => Some(value),
            Routed::Instance(_) => None,
            Routed::Many(items) => items
                .into_iter()
                .map(Routed::into_value)
                .collect::<Option<Vec<_>>>()
                .map(Value::Array),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Routed::Raw(Value::Null))
    }
}

/// Failure inside [`FromRouted`]; the caller attaches class and property.
#[derive(Debug)]
pub struct SlotMismatch {
    pub expected: &'static str,
}

/// Field shapes that can hold routed instances of `T`.
///
/// Implemented for `T`, `Box<T>`, `Arc<T>`, `Vec<T>`, `Vec<Arc<T>>` and their
/// `Option` forms. `Option` fields take `None` for a `null` input.
pub trait FromRouted<T>: Sized {
    fn from_routed(routed: Routed) -> Result<Self, SlotMismatch>;
}

fn instance<T: 'static>(routed: Routed) -> Result<T, SlotMismatch> {
    let expected = std::any::type_name::<T>();
    match routed {
        Routed::Instance(boxed) => boxed
            .downcast::<T>()
            .map(|b| *b)
            .map_err(|_| SlotMismatch { expected }),
        _ => Err(SlotMismatch { expected }),
    }
}

fn list<T, S>(routed: Routed, wrap: fn(T) -> S) -> Result<Vec<S>, SlotMismatch>
where
    T: 'static,
{
    match routed {
        Routed::Many(items) => items.into_iter().map(|i| instance(i).map(wrap)).collect(),
        _ => Err(SlotMismatch {
            expected: std::any::type_name::<Vec<T>>(),
        }),
    }
}

impl<T: 'static> FromRouted<T> for T {
    fn from_routed(routed: Routed) -> Result<Self, SlotMismatch> {
        instance(routed)
    }
}

impl<T: 'static> FromRouted<T> for Box<T> {
    fn from_routed(routed: Routed) -> Result<Self, SlotMismatch> {
        instance(routed).map(Box::new)
    }
}

impl<T: 'static> FromRouted<T> for Arc<T> {
    fn from_routed(routed: Routed) -> Result<Self, SlotMismatch> {
        instance(routed).map(Arc::new)
    }
}

impl<T: 'static> FromRouted<T> for Vec<T> {
    fn from_routed(routed: Routed) -> Result<Self, SlotMismatch> {
        list(routed, |t| t)
    }
}

impl<T: 'static> FromRouted<T> for Vec<Arc<T>> {
    fn from_routed(routed: Routed) -> Result<Self, SlotMismatch> {
        list(routed, Arc::new)
    }
}

impl<T: 'static> FromRouted<T> for Option<T> {
    fn from_routed(routed: Routed) -> Result<Self, SlotMismatch> {
        if routed.is_null() {
            return Ok(None);
        }
        instance(routed).map(Some)
    }
}

impl<T: 'static> FromRouted<T> for Option<Box<T>> {
    fn from_routed(routed: Routed) -> Result<Self, SlotMismatch> {
        if routed.is_null() {
            return Ok(None);
        }
        instance(routed).map(|t| Some(Box::new(t)))
    }
}

impl<T: 'static> FromRouted<T> for Option<Arc<T>> {
    fn from_routed(routed: Routed) -> Result<Self, SlotMismatch> {
        if routed.is_null() {
            return Ok(None);
        }
        instance(routed).map(|t| Some(Arc::new(t)))
    }
}

impl<T: 'static> FromRouted<T> for Option<Vec<T>> {
    fn from_routed(routed: Routed) -> Result<Self, SlotMismatch> {
        if routed.is_null() {
            return Ok(None);
        }
        list(routed, |t| t).map(Some)
    }
}

impl<T: 'static> FromRouted<T> for Option<Vec<Arc<T>>> {
    fn from_routed(routed: Routed) -> Result<Self, SlotMismatch> {
        if routed.is_null() {
            return Ok(None);
        }
        list(routed, Arc::new).map(Some)
    }
}
