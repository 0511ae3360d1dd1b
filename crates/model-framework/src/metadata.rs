//! # Property Metadata Store
//!
//! Process-wide store of property descriptors, keyed by model type and source
//! key. A model's [`Model::declare`] runs the first time the type is touched,
//! which installs its descriptors before any deserialization reads them; after
//! that the table is only read, unless [`register`] is called explicitly.
//!
//! ## Declaring properties
//!
//! ```rust
//! use model_framework::{metadata, Declarations, Model};
//! use serde::Serialize;
//!
//! #[derive(Debug, Default, Clone, Serialize)]
//! struct Address {
//!     city: String,
//!     #[serde(rename = "postalCode")]
//!     postal_code: Option<String>,
//! }
//!
//! impl Model for Address {
//!     fn declare(props: &mut Declarations<Self>) {
//!         props.primitive("city", |a| &mut a.city);
//!         // Read from `postal_code` in the input, write to `postalCode`.
//!         props
//!             .primitive("postalCode", |a| &mut a.postal_code)
//!             .source("postal_code");
//!     }
//! }
//!
//! assert!(metadata::lookup::<Address>("postal_code").is_some());
//! assert!(metadata::lookup::<Address>("postalCode").is_none());
//! ```

use crate::error::MappingError;
use crate::model::Model;
use crate::slot::{FromRouted, Routed};
use crate::types::{Construct, PropertyType, TypeResolver};
use serde::de::DeserializeOwned;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use tracing::{debug, trace};

/// Projection from a model to one of its fields.
pub type Field<M, F> = fn(&mut M) -> &mut F;

type Assign<M> = Box<dyn Fn(&mut M, Routed) -> Result<(), MappingError> + Send + Sync>;

/// How one source key of a model is routed and where the result is written.
pub struct PropertyDescriptor<M> {
    target: &'static str,
    ty: TypeResolver,
    assign: Assign<M>,
}

impl<M: Model> PropertyDescriptor<M> {
    pub fn new<A>(target: &'static str, ty: impl Into<TypeResolver>, assign: A) -> Self
    where
        A: Fn(&mut M, Routed) -> Result<(), MappingError> + Send + Sync + 'static,
    {
        Self {
            target,
            ty: ty.into(),
            assign: Box::new(assign),
        }
    }

    /// Name of the property the value is written to.
    pub fn target(&self) -> &'static str {
        self.target
    }

    pub fn resolver(&self) -> &TypeResolver {
        &self.ty
    }

    pub fn resolve_type(&self) -> PropertyType {
        self.ty.resolve()
    }

    pub fn assign(&self, model: &mut M, routed: Routed) -> Result<(), MappingError> {
        (self.assign)(model, routed)
    }
}

impl<M> fmt::Debug for PropertyDescriptor<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDescriptor")
            .field("target", &self.target)
            .field("ty", &self.ty)
            .finish_non_exhaustive()
    }
}

/// Writes raw data into a `DeserializeOwned` field.
///
/// A `null` the field cannot hold leaves the field at its default.
fn raw_setter<M, F>(
    property: &'static str,
    field: Field<M, F>,
) -> impl Fn(&mut M, Routed) -> Result<(), MappingError> + Send + Sync + 'static
where
    M: Model,
    F: DeserializeOwned + 'static,
{
    move |model, routed| {
        let value = routed.into_value().ok_or(MappingError::TypeMismatch {
            class: M::class_name(),
            property,
            expected: std::any::type_name::<F>(),
        })?;
        let is_null = value.is_null();
        match serde_json::from_value(value) {
            Ok(assigned) => *field(model) = assigned,
            Err(_) if is_null => {
                trace!(class = M::class_name(), property, "Null left at default")
            }
            Err(source) => {
                return Err(MappingError::Assign {
                    class: M::class_name(),
                    property,
                    source,
                })
            }
        }
        Ok(())
    }
}

/// Writes routed instances of `T` into a field shaped like `S`.
///
/// A `null` the slot cannot hold leaves the field at its default.
fn instance_setter<M, T, S>(
    property: &'static str,
    field: Field<M, S>,
) -> impl Fn(&mut M, Routed) -> Result<(), MappingError> + Send + Sync + 'static
where
    M: Model,
    T: 'static,
    S: FromRouted<T> + 'static,
{
    move |model, routed| {
        let is_null = routed.is_null();
        match S::from_routed(routed) {
            Ok(assigned) => *field(model) = assigned,
            Err(_) if is_null => {
                trace!(class = M::class_name(), property, "Null left at default")
            }
            Err(mismatch) => {
                return Err(MappingError::TypeMismatch {
                    class: M::class_name(),
                    property,
                    expected: mismatch.expected,
                })
            }
        }
        Ok(())
    }
}

/// Declaration list collected by [`Model::declare`].
///
/// Each helper declares a property whose source key equals its target name;
/// call [`Declared::source`] on the result to read it from a different key.
pub struct Declarations<M: Model> {
    entries: Vec<(&'static str, PropertyDescriptor<M>)>,
}

/// Handle to the property just declared.
pub struct Declared<'a> {
    source: &'a mut &'static str,
}

impl Declared<'_> {
    /// Reads the property from `key` in the input instead of its target name.
    pub fn source(self, key: &'static str) -> Self {
        *self.source = key;
        self
    }
}

impl<M: Model> Declarations<M> {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Declares a property with an explicit resolver and assignment.
    pub fn property(&mut self, descriptor: PropertyDescriptor<M>) -> Declared<'_> {
        self.entries.push((descriptor.target, descriptor));
        let (source, _) = self
            .entries
            .last_mut()
            .unwrap_or_else(|| unreachable!("entry pushed above"));
        Declared { source }
    }

    /// String, number or boolean field (or an `Option` of one).
    pub fn primitive<F>(&mut self, name: &'static str, field: Field<M, F>) -> Declared<'_>
    where
        F: DeserializeOwned + 'static,
    {
        self.property(PropertyDescriptor::new(
            name,
            PropertyType::Primitive,
            raw_setter(name, field),
        ))
    }

    /// Array of primitives, assigned unchanged.
    pub fn primitive_array<F>(&mut self, name: &'static str, field: Field<M, F>) -> Declared<'_>
    where
        F: DeserializeOwned + 'static,
    {
        self.property(PropertyDescriptor::new(
            name,
            PropertyType::PrimitiveArray,
            raw_setter(name, field),
        ))
    }

    /// Plain structural data, assigned as-is (e.g. `_links`).
    pub fn opaque<F>(&mut self, name: &'static str, field: Field<M, F>) -> Declared<'_>
    where
        F: DeserializeOwned + 'static,
    {
        self.property(PropertyDescriptor::new(
            name,
            PropertyType::Opaque,
            raw_setter(name, field),
        ))
    }

    /// Nested model, or an array of them when the field is a `Vec`.
    pub fn model<T, S>(&mut self, name: &'static str, field: Field<M, S>) -> Declared<'_>
    where
        T: Model,
        S: FromRouted<T> + 'static,
    {
        self.property(PropertyDescriptor::new(
            name,
            PropertyType::model::<T>(),
            instance_setter::<M, T, S>(name, field),
        ))
    }

    /// Like [`Declarations::model`], but the type is resolved on first use.
    ///
    /// Use it for fields whose type is the model itself or a model whose
    /// declarations must not be touched yet.
    pub fn deferred<T, S>(&mut self, name: &'static str, field: Field<M, S>) -> Declared<'_>
    where
        T: Model,
        S: FromRouted<T> + 'static,
    {
        self.property(PropertyDescriptor::new(
            name,
            TypeResolver::deferred(PropertyType::model::<T>),
            instance_setter::<M, T, S>(name, field),
        ))
    }

    /// Field built by a native constructor from the raw value (e.g. a date).
    pub fn native<T, S>(&mut self, name: &'static str, field: Field<M, S>) -> Declared<'_>
    where
        T: Construct,
        S: FromRouted<T> + 'static,
    {
        self.property(PropertyDescriptor::new(
            name,
            PropertyType::native::<T>(),
            instance_setter::<M, T, S>(name, field),
        ))
    }
}

/// Process-wide table from a type to one value installed for it.
#[derive(Default)]
pub(crate) struct TypeTable {
    entries: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl TypeTable {
    /// Returns the value installed for `id`, installing `init()` on first use.
    ///
    /// `init` runs without the lock held; if two callers race, the first insert wins.
    pub(crate) fn get_or_install<V, I>(&self, id: TypeId, init: I) -> Arc<V>
    where
        V: Any + Send + Sync,
        I: FnOnce() -> V,
    {
        let existing = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned();
        let entry = match existing {
            Some(entry) => entry,
            None => {
                let fresh: Arc<dyn Any + Send + Sync> = Arc::new(init());
                self.entries
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .entry(id)
                    .or_insert(fresh)
                    .clone()
            }
        };
        match entry.downcast::<V>() {
            Ok(value) => value,
            Err(_) => unreachable!("type table entries are keyed by their own TypeId"),
        }
    }
}

struct ClassProperties<M> {
    by_source: RwLock<HashMap<&'static str, Arc<PropertyDescriptor<M>>>>,
}

fn properties() -> &'static TypeTable {
    static PROPERTIES: OnceLock<TypeTable> = OnceLock::new();
    PROPERTIES.get_or_init(TypeTable::default)
}

fn class<M: Model>() -> Arc<ClassProperties<M>> {
    properties().get_or_install(TypeId::of::<M>(), || {
        let mut declarations = Declarations::<M>::new();
        M::declare(&mut declarations);
        debug!(
            class = M::class_name(),
            properties = declarations.entries.len(),
            "Model declared"
        );
        let by_source = declarations
            .entries
            .into_iter()
            .map(|(source, descriptor)| (source, Arc::new(descriptor)))
            .collect();
        ClassProperties {
            by_source: RwLock::new(by_source),
        }
    })
}

/// Associates `descriptor` with `(M, source)`. A later call for the same pair
/// replaces the earlier descriptor.
pub fn register<M: Model>(source: &'static str, descriptor: PropertyDescriptor<M>) {
    let class = class::<M>();
    debug!(
        class = M::class_name(),
        source,
        target = descriptor.target(),
        "Property registered"
    );
    class
        .by_source
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(source, Arc::new(descriptor));
}

/// Descriptor for `(M, key)`. `None` means the key is not mapped by `M`.
pub fn lookup<M: Model>(key: &str) -> Option<Arc<PropertyDescriptor<M>>> {
    class::<M>()
        .by_source
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(key)
        .cloned()
}

/// Source keys mapped by `M`, sorted.
pub fn registered_keys<M: Model>() -> Vec<&'static str> {
    let class = class::<M>();
    let mut keys: Vec<_> = class
        .by_source
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .keys()
        .copied()
        .collect();
    keys.sort_unstable();
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use serde_json::json;

    #[derive(Debug, Default, Clone, Serialize)]
    struct Tag {
        label: String,
        weight: Option<f64>,
    }

    impl Model for Tag {
        fn declare(props: &mut Declarations<Self>) {
            props.primitive("label", |t| &mut t.label);
            props.primitive("weight", |t| &mut t.weight).source("w");
        }
    }

    #[derive(Debug, Default, Clone, Serialize)]
    struct Node {
        name: String,
        parent: Option<Box<Node>>,
    }

    impl Model for Node {
        fn declare(props: &mut Declarations<Self>) {
            props.primitive("name", |n| &mut n.name);
            props.deferred::<Node, _>("parent", |n| &mut n.parent);
        }
    }

    #[derive(Debug, Default, Clone, Serialize)]
    struct Overridden {
        value: Option<String>,
    }

    impl Model for Overridden {
        fn declare(props: &mut Declarations<Self>) {
            props.primitive("value", |o| &mut o.value);
        }
    }

    #[test]
    fn lookup_uses_source_keys() {
        assert_eq!(lookup::<Tag>("label").unwrap().target(), "label");
        assert_eq!(lookup::<Tag>("w").unwrap().target(), "weight");
        assert!(lookup::<Tag>("weight").is_none());
        assert!(lookup::<Tag>("unknown").is_none());
        assert_eq!(registered_keys::<Tag>(), vec!["label", "w"]);
    }

    #[test]
    fn deferred_types_resolve_only_when_asked() {
        let parent = lookup::<Node>("parent").unwrap();
        // Nothing deserializes `Node` in this test before the explicit resolve.
        assert!(!parent.resolver().is_resolved());
        let ty = parent.resolve_type();
        assert_eq!(ty.name(), "Node");
        assert!(parent.resolver().is_resolved());
    }

    #[test]
    fn later_registration_replaces_earlier() {
        register::<Overridden>(
            "other",
            PropertyDescriptor::new("value", PropertyType::Opaque, |o: &mut Overridden, _| {
                o.value = Some("first".into());
                Ok(())
            }),
        );
        register::<Overridden>(
            "other",
            PropertyDescriptor::new("value", PropertyType::Opaque, |o: &mut Overridden, _| {
                o.value = Some("second".into());
                Ok(())
            }),
        );

        let model = Overridden::from_value(Some(&json!({"other": 1}))).unwrap();
        assert_eq!(model.value.as_deref(), Some("second"));
    }

    #[test]
    fn raw_setter_reports_unassignable_values() {
        let err = Tag::from_value(Some(&json!({"label": {"nested": true}}))).unwrap_err();
        assert!(matches!(
            err,
            MappingError::Assign {
                class: "Tag",
                property: "label",
                ..
            }
        ));
    }
}
