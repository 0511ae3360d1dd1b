//! # Property Types
//!
//! The closed set of routing variants a declared property can carry, plus the
//! runtime handles ([`ModelType`], [`NativeType`]) that stand in for "a class
//! reference" and the [`TypeResolver`] that lets a declaration point at a type
//! lazily.

use crate::error::MappingError;
use crate::model::{class_name, AnyModel, Model};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde_json::Value;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::trace;

/// A type-erased value produced by a nested deserializer or a native constructor.
pub type Instance = Box<dyn Any + Send>;

/// Runtime handle to a [`Model`] type: its name, identity and nested deserializer.
#[derive(Clone, Copy)]
pub struct ModelType {
    name: &'static str,
    type_id: TypeId,
    deserialize: fn(Option<&Value>) -> Result<Instance, MappingError>,
    deserialize_shared: fn(Option<&Value>) -> Result<Arc<dyn AnyModel>, MappingError>,
}

impl ModelType {
    pub fn of<T: Model>() -> Self {
        Self {
            name: class_name::<T>(),
            type_id: TypeId::of::<T>(),
            deserialize: deserialize_boxed::<T>,
            deserialize_shared: deserialize_shared::<T>,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Runs `T::from_value`, so types that override it (resources) are honoured.
    pub fn deserialize(&self, data: Option<&Value>) -> Result<Instance, MappingError> {
        (self.deserialize)(data)
    }

    pub(crate) fn deserialize_shared(
        &self,
        data: Option<&Value>,
    ) -> Result<Arc<dyn AnyModel>, MappingError> {
        (self.deserialize_shared)(data)
    }
}

impl fmt::Debug for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ModelType").field(&self.name).finish()
    }
}

fn deserialize_boxed<T: Model>(data: Option<&Value>) -> Result<Instance, MappingError> {
    Ok(Box::new(T::from_value(data)?))
}

fn deserialize_shared<T: Model>(data: Option<&Value>) -> Result<Arc<dyn AnyModel>, MappingError> {
    Ok(Arc::new(T::from_value(data)?))
}

/// Types built directly from a raw value, such as timestamps.
///
/// Errors are returned as [`MappingError::Construct`] and reach the caller as-is.
pub trait Construct: Sized + Send + 'static {
    fn construct(raw: &Value) -> Result<Self, MappingError>;
}

fn construct_failed(message: String) -> MappingError {
    MappingError::Construct(message.into())
}

impl Construct for DateTime<Utc> {
    /// Accepts an RFC 3339 string or a millisecond timestamp.
    fn construct(raw: &Value) -> Result<Self, MappingError> {
        match raw {
            Value::String(s) => DateTime::parse_from_rfc3339(s)
                .map(|d| d.with_timezone(&Utc))
                .map_err(|e| MappingError::Construct(Box::new(e))),
            Value::Number(n) => n
                .as_i64()
                .and_then(DateTime::<Utc>::from_timestamp_millis)
                .ok_or_else(|| construct_failed(format!("timestamp out of range: {n}"))),
            other => Err(construct_failed(format!("cannot build a date from {other}"))),
        }
    }
}

impl Construct for DateTime<FixedOffset> {
    fn construct(raw: &Value) -> Result<Self, MappingError> {
        match raw {
            Value::String(s) => {
                DateTime::parse_from_rfc3339(s).map_err(|e| MappingError::Construct(Box::new(e)))
            }
            other => Err(construct_failed(format!("cannot build a date from {other}"))),
        }
    }
}

impl Construct for NaiveDate {
    fn construct(raw: &Value) -> Result<Self, MappingError> {
        match raw {
            Value::String(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_err(|e| MappingError::Construct(Box::new(e))),
            other => Err(construct_failed(format!("cannot build a date from {other}"))),
        }
    }
}

/// Runtime handle to a [`Construct`] type.
#[derive(Clone, Copy)]
pub struct NativeType {
    name: &'static str,
    type_id: TypeId,
    construct: fn(&Value) -> Result<Instance, MappingError>,
}

impl NativeType {
    pub fn of<T: Construct>() -> Self {
        Self {
            name: class_name::<T>(),
            type_id: TypeId::of::<T>(),
            construct: construct_boxed::<T>,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn construct(&self, raw: &Value) -> Result<Instance, MappingError> {
        (self.construct)(raw)
    }
}

impl fmt::Debug for NativeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NativeType").field(&self.name).finish()
    }
}

fn construct_boxed<T: Construct>(raw: &Value) -> Result<Instance, MappingError> {
    Ok(Box::new(T::construct(raw)?))
}

/// Declared type of a property. Selects the routing branch during deserialization.
#[derive(Debug, Clone, Copy)]
pub enum PropertyType {
    /// String, number or boolean, copied as-is.
    Primitive,
    /// Array of primitives; no element type.
    PrimitiveArray,
    /// A nested model. Arrays of it are deserialized element by element.
    Model(ModelType),
    /// A type constructed from the raw value, e.g. a timestamp.
    Native(NativeType),
    /// Plain structural data, assigned as-is.
    Opaque,
}

impl PropertyType {
    pub fn model<T: Model>() -> Self {
        PropertyType::Model(ModelType::of::<T>())
    }

    pub fn native<T: Construct>() -> Self {
        PropertyType::Native(NativeType::of::<T>())
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, PropertyType::Primitive)
    }

    pub fn is_array(&self) -> bool {
        matches!(self, PropertyType::PrimitiveArray)
    }

    /// The nested-deserialize capability, if this type has one.
    pub fn as_model(&self) -> Option<&ModelType> {
        match self {
            PropertyType::Model(model) => Some(model),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PropertyType::Primitive => "primitive",
            PropertyType::PrimitiveArray => "primitive array",
            PropertyType::Model(model) => model.name(),
            PropertyType::Native(native) => native.name(),
            PropertyType::Opaque => "opaque",
        }
    }
}

/// Points a declaration at its [`PropertyType`], either directly or through a
/// callback that runs on first use.
///
/// Deferred resolvers let a model name itself, or a type whose declarations are
/// not installed yet, as a property type.
pub enum TypeResolver {
    Eager(PropertyType),
    Deferred {
        resolve: fn() -> PropertyType,
        resolved: OnceLock<PropertyType>,
    },
}

impl TypeResolver {
    pub fn eager(ty: PropertyType) -> Self {
        TypeResolver::Eager(ty)
    }

    pub fn deferred(resolve: fn() -> PropertyType) -> Self {
        TypeResolver::Deferred {
            resolve,
            resolved: OnceLock::new(),
        }
    }

    /// Returns the concrete type, running a deferred resolver at most once.
    pub fn resolve(&self) -> PropertyType {
        match self {
            TypeResolver::Eager(ty) => *ty,
            TypeResolver::Deferred { resolve, resolved } => *resolved.get_or_init(|| {
                let ty = resolve();
                trace!(ty = ty.name(), "Resolved deferred type");
                ty
            }),
        }
    }

    pub fn is_resolved(&self) -> bool {
        match self {
            TypeResolver::Eager(_) => true,
            TypeResolver::Deferred { resolved, .. } => resolved.get().is_some(),
        }
    }
}

impl fmt::Debug for TypeResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeResolver::Eager(ty) => f.debug_tuple("Eager").field(ty).finish(),
            TypeResolver::Deferred { resolved, .. } => {
                f.debug_tuple("Deferred").field(&resolved.get()).finish()
            }
        }
    }
}

impl From<PropertyType> for TypeResolver {
    fn from(ty: PropertyType) -> Self {
        TypeResolver::Eager(ty)
    }
}
