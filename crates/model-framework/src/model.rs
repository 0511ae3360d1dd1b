//! # Model Trait
//!
//! The `Model` trait is the contract every mapped type implements. A model
//! declares its properties once; the framework then provides deserialization,
//! serialization, deep clone, shallow copy and merge on top of that declaration.
//!
//! # Provided Methods
//! Everything except [`Model::declare`] has a default implementation. Types only
//! override [`Model::from_value`] to extend deserialization, which is how the
//! [`resource`](crate::resource) layer attaches `_embedded` data.
//!
//! # Serialization
//! Serialization goes through `serde::Serialize`, so it covers every serialized
//! field of the struct, declared or not. Skipped fields (`#[serde(skip)]`) play the
//! role of non-enumerable members.

use crate::engine;
use crate::error::MappingError;
use crate::metadata::Declarations;
use serde::Serialize;
use serde_json::Value;
use std::any::Any;

/// Trait that any mapped type must implement.
///
/// ```rust
/// use model_framework::{Declarations, Model};
/// use serde::Serialize;
/// use serde_json::json;
///
/// #[derive(Debug, Default, Clone, Serialize)]
/// struct Point {
///     x: f64,
///     y: f64,
/// }
///
/// impl Model for Point {
///     fn declare(props: &mut Declarations<Self>) {
///         props.primitive("x", |p| &mut p.x);
///         props.primitive("y", |p| &mut p.y);
///     }
/// }
///
/// let point = Point::from_value(Some(&json!({"x": 1.0, "y": 2.0, "z": 3.0}))).unwrap();
/// assert_eq!(point.y, 2.0);
/// assert_eq!(point.to_value().unwrap(), json!({"x": 1.0, "y": 2.0}));
/// ```
pub trait Model: Default + Clone + Serialize + Send + Sync + 'static {
    /// Declares the mapped properties. Runs once, the first time the type is used.
    fn declare(props: &mut Declarations<Self>);

    /// Name used in errors and logs.
    fn class_name() -> &'static str {
        class_name::<Self>()
    }

    /// Builds an instance from plain data. `None` and `null` give `Self::default()`.
    fn from_value(data: Option<&Value>) -> Result<Self, MappingError> {
        engine::deserialize(data)
    }

    /// Serializes every field of the instance to plain data.
    fn to_value(&self) -> Result<Value, MappingError> {
        engine::serialize(self, &[])
    }

    /// Serializes, then removes each dotted path (e.g. `"position.z"`).
    ///
    /// Fails with [`MappingError::MissingProperty`] if a path does not resolve.
    fn to_value_excluding(&self, exclude: &[&str]) -> Result<Value, MappingError> {
        engine::serialize(self, exclude)
    }

    /// Deep clone through a full serialize/deserialize round trip.
    fn deep_clone(&self) -> Result<Self, MappingError> {
        Self::from_value(Some(&self.to_value()?))
    }

    /// Shallow copy. Nested values held in `Arc` stay shared with `self`.
    fn copy(&self) -> Self {
        self.clone()
    }

    /// Serializes `self`, merges each partial on top (later ones win) and
    /// deserializes the result into a new instance.
    fn map_to_model<P, I>(&self, partials: I) -> Result<Self, MappingError>
    where
        P: Serialize,
        I: IntoIterator<Item = P>,
    {
        engine::map_to_model(self, partials)
    }
}

/// Object-safe view of a model, used where the concrete type is only known at
/// runtime (embedded resources).
pub trait AnyModel: Any + Send + Sync {
    fn model_name(&self) -> &'static str;

    fn to_value_erased(&self) -> Result<Value, MappingError>;

    fn as_any(&self) -> &dyn Any;
}

impl<T: Model> AnyModel for T {
    fn model_name(&self) -> &'static str {
        T::class_name()
    }

    fn to_value_erased(&self) -> Result<Value, MappingError> {
        Model::to_value(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl dyn AnyModel {
    pub fn downcast_ref<T: Model>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn is<T: Model>(&self) -> bool {
        self.as_any().is::<T>()
    }
}

/// Short type name: the last path segment without generic arguments.
pub fn class_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or("Unknown")
}
