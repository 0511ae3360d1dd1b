//! # Resource Layer
//!
//! A resource is a [`Model`] with two reserved members:
//!
//! 1. `_links`: link relation name to one link or several ([`Links`]). This is an
//!    ordinary declared property, routed like any other opaque value.
//! 2. `_embedded`: relation name to one nested resource or several
//!    ([`Embedded`]). Filled by [`deserialize`] after the declared properties,
//!    and only for types that opt in through [`Resource::embedded_defs`].
//!
//! ## Declaring a resource
//!
//! ```rust
//! use model_framework::resource::{self, Embedded, EmbeddedDef, Resource};
//! use model_framework::{Declarations, Links, MappingError, Model};
//! use serde::Serialize;
//! use serde_json::{json, Value};
//!
//! #[derive(Debug, Default, Clone, Serialize)]
//! struct Address {
//!     city: String,
//!     #[serde(rename = "_links", skip_serializing_if = "Option::is_none")]
//!     links: Option<Links>,
//!     #[serde(rename = "_embedded", skip_serializing_if = "Option::is_none")]
//!     embedded: Option<Embedded>,
//! }
//!
//! impl Model for Address {
//!     fn declare(props: &mut Declarations<Self>) {
//!         props.opaque("_links", |a| &mut a.links);
//!         props.primitive("city", |a| &mut a.city);
//!     }
//!
//!     fn from_value(data: Option<&Value>) -> Result<Self, MappingError> {
//!         resource::deserialize(data)
//!     }
//! }
//!
//! impl Resource for Address {
//!     fn links(&self) -> Option<&Links> { self.links.as_ref() }
//!     fn embedded(&self) -> Option<&Embedded> { self.embedded.as_ref() }
//!     fn embedded_mut(&mut self) -> &mut Option<Embedded> { &mut self.embedded }
//! }
//!
//! #[derive(Debug, Default, Clone, Serialize)]
//! struct User {
//!     name: String,
//!     #[serde(rename = "_links", skip_serializing_if = "Option::is_none")]
//!     links: Option<Links>,
//!     #[serde(rename = "_embedded", skip_serializing_if = "Option::is_none")]
//!     embedded: Option<Embedded>,
//! }
//!
//! impl Model for User {
//!     fn declare(props: &mut Declarations<Self>) {
//!         props.opaque("_links", |u| &mut u.links);
//!         props.primitive("name", |u| &mut u.name);
//!     }
//!
//!     fn from_value(data: Option<&Value>) -> Result<Self, MappingError> {
//!         resource::deserialize(data)
//!     }
//! }
//!
//! impl Resource for User {
//!     fn links(&self) -> Option<&Links> { self.links.as_ref() }
//!     fn embedded(&self) -> Option<&Embedded> { self.embedded.as_ref() }
//!     fn embedded_mut(&mut self) -> &mut Option<Embedded> { &mut self.embedded }
//!
//!     fn embedded_defs() -> Option<EmbeddedDef> {
//!         Some(EmbeddedDef::new().relation_to::<Address>("addresses"))
//!     }
//! }
//!
//! let user = User::from_value(Some(&json!({
//!     "name": "Tester",
//!     "_embedded": {"addresses": [{"city": "Warsaw"}]}
//! })))
//! .unwrap();
//!
//! let addresses = user.embedded().unwrap().many::<Address>("addresses").unwrap();
//! assert_eq!(addresses[0].city, "Warsaw");
//! ```

use crate::engine;
use crate::error::MappingError;
use crate::link::{LinkValue, Links};
use crate::metadata::{Declarations, TypeTable};
use crate::model::{AnyModel, Model};
use crate::predicates::classify;
use crate::types::{PropertyType, TypeResolver};
use serde::ser::Error as _;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::any::TypeId;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::{trace, warn};

/// Reserved key holding embedded resources in the input.
pub const EMBEDDED_KEY: &str = "_embedded";

/// Reserved key holding links.
pub const LINKS_KEY: &str = "_links";

/// A model carrying hypermedia links and, optionally, embedded resources.
///
/// Implementors override [`Model::from_value`] with [`deserialize`] so that the
/// `_embedded` section is processed.
pub trait Resource: Model {
    fn links(&self) -> Option<&Links>;

    fn embedded(&self) -> Option<&Embedded>;

    fn embedded_mut(&mut self) -> &mut Option<Embedded>;

    /// Embedded relation types. `None` means `_embedded` input is ignored.
    ///
    /// Evaluated once per type.
    fn embedded_defs() -> Option<EmbeddedDef> {
        None
    }

    fn link(&self, rel: &str) -> Option<&LinkValue> {
        self.links()?.get(rel)
    }
}

/// Maps embedded relation names to the type of their elements.
#[derive(Debug, Default)]
pub struct EmbeddedDef {
    relations: HashMap<&'static str, TypeResolver>,
}

impl EmbeddedDef {
    pub fn new() -> Self {
        Self::default()
    }

    /// Relation whose type is produced by `resolve` on first use.
    pub fn relation(mut self, key: &'static str, resolve: fn() -> PropertyType) -> Self {
        self.relations.insert(key, TypeResolver::deferred(resolve));
        self
    }

    /// Relation whose elements are `T`.
    pub fn relation_to<T: Model>(self, key: &'static str) -> Self {
        self.relation(key, PropertyType::model::<T>)
    }

    /// Element type for `key`, if the relation is declared.
    pub fn resolve(&self, key: &str) -> Option<PropertyType> {
        self.relations.get(key).map(TypeResolver::resolve)
    }
}

struct EmbeddedChannel(Option<EmbeddedDef>);

fn embedded_table() -> &'static TypeTable {
    static EMBEDDED: OnceLock<TypeTable> = OnceLock::new();
    EMBEDDED.get_or_init(TypeTable::default)
}

fn embedded_channel<R: Resource>() -> Arc<EmbeddedChannel> {
    embedded_table().get_or_install(TypeId::of::<R>(), || EmbeddedChannel(R::embedded_defs()))
}

/// Whether `R` registered embedded relations.
pub fn has_embedded_defs<R: Resource>() -> bool {
    embedded_channel::<R>().0.is_some()
}

/// Deserializes a resource: declared properties first, then `_embedded`.
pub fn deserialize<R: Resource>(data: Option<&Value>) -> Result<R, MappingError> {
    let mut resource = engine::deserialize::<R>(data)?;

    let raw = match data.and_then(|d| d.get(EMBEDDED_KEY)) {
        Some(raw) if !raw.is_null() => raw,
        _ => return Ok(resource),
    };

    let channel = embedded_channel::<R>();
    let Some(def) = channel.0.as_ref() else {
        trace!(class = R::class_name(), "No embedded definitions, _embedded ignored");
        return Ok(resource);
    };

    let mut embedded = Embedded::default();
    match raw {
        Value::Object(entries) => {
            for (key, value) in entries {
                let Some(ty) = def.resolve(key) else {
                    warn!(
                        class = R::class_name(),
                        key = %key,
                        "No embedded definition for key, entry skipped"
                    );
                    continue;
                };
                embedded.insert(key.clone(), deserialize_embedded(&ty, value)?);
            }
        }
        other => warn!(
            class = R::class_name(),
            kind = ?classify(other),
            "_embedded is not an object, no relations read"
        ),
    }

    *resource.embedded_mut() = Some(embedded);
    Ok(resource)
}

fn deserialize_embedded(ty: &PropertyType, value: &Value) -> Result<EmbeddedValue, MappingError> {
    let one = |item: &Value| -> Result<Arc<dyn AnyModel>, MappingError> {
        match ty.as_model() {
            Some(model) => model.deserialize_shared(Some(item)),
            None => Ok(Arc::new(PlainResource::default())),
        }
    };

    match value {
        Value::Array(items) => items
            .iter()
            .map(one)
            .collect::<Result<Vec<_>, _>>()
            .map(EmbeddedValue::Many),
        single => one(single).map(EmbeddedValue::One),
    }
}

/// One embedded resource or several under the same relation.
#[derive(Clone)]
pub enum EmbeddedValue {
    One(Arc<dyn AnyModel>),
    Many(Vec<Arc<dyn AnyModel>>),
}

impl EmbeddedValue {
    pub fn one<T: Model>(&self) -> Option<&T> {
        match self {
            EmbeddedValue::One(model) => model.downcast_ref::<T>(),
            EmbeddedValue::Many(_) => None,
        }
    }

    /// All elements as `T`. `None` for a singleton or if any element is another type.
    pub fn many<T: Model>(&self) -> Option<Vec<&T>> {
        match self {
            EmbeddedValue::One(_) => None,
            EmbeddedValue::Many(models) => models.iter().map(|m| m.downcast_ref::<T>()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            EmbeddedValue::One(_) => 1,
            EmbeddedValue::Many(models) => models.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for EmbeddedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmbeddedValue::One(model) => f.debug_tuple("One").field(&model.model_name()).finish(),
            EmbeddedValue::Many(models) => f
                .debug_tuple("Many")
                .field(&models.iter().map(|m| m.model_name()).collect::<Vec<_>>())
                .finish(),
        }
    }
}

impl Serialize for EmbeddedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            EmbeddedValue::One(model) => model
                .to_value_erased()
                .map_err(S::Error::custom)?
                .serialize(serializer),
            EmbeddedValue::Many(models) => models
                .iter()
                .map(|m| m.to_value_erased())
                .collect::<Result<Vec<_>, _>>()
                .map_err(S::Error::custom)?
                .serialize(serializer),
        }
    }
}

/// Deserialized `_embedded` section.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Embedded {
    relations: BTreeMap<String, EmbeddedValue>,
}

impl Embedded {
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: EmbeddedValue,
    ) -> Option<EmbeddedValue> {
        self.relations.insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<&EmbeddedValue> {
        self.relations.get(key)
    }

    pub fn one<T: Model>(&self, key: &str) -> Option<&T> {
        self.get(key)?.one::<T>()
    }

    pub fn many<T: Model>(&self, key: &str) -> Option<Vec<&T>> {
        self.get(key)?.many::<T>()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.relations.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}

/// Bare resource used for embedded relations whose type cannot deserialize itself.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PlainResource {
    #[serde(rename = "_links", skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
    #[serde(rename = "_embedded", skip_serializing_if = "Option::is_none")]
    pub embedded: Option<Embedded>,
}

impl Model for PlainResource {
    fn declare(props: &mut Declarations<Self>) {
        props.opaque(LINKS_KEY, |r| &mut r.links);
    }

    fn from_value(data: Option<&Value>) -> Result<Self, MappingError> {
        deserialize(data)
    }
}

impl Resource for PlainResource {
    fn links(&self) -> Option<&Links> {
        self.links.as_ref()
    }

    fn embedded(&self) -> Option<&Embedded> {
        self.embedded.as_ref()
    }

    fn embedded_mut(&mut self) -> &mut Option<Embedded> {
        &mut self.embedded
    }
}
