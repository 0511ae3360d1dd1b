//! # Model Framework
//!
//! This crate maps plain data (`serde_json::Value`) onto typed model structs and
//! back. A model declares, once, which input keys it maps and how each value is
//! routed; the framework then provides deserialization, serialization with
//! exclusions, deep clone, shallow copy and merge for every model.
//!
//! On top of that sits a small hypermedia layer: resources carry `_links` and may
//! opt in to deserializing `_embedded` sub-resources.
//!
//! ## Architecture Overview
//!
//! The framework separates concerns into three layers:
//!
//! 1. **Metadata Layer** ([`metadata`]) - Per-type property descriptors, keyed by source key
//! 2. **Engine Layer** ([`engine`]) - Routing of raw values against declared types
//! 3. **Resource Layer** ([`resource`]) - `_links` and `_embedded` handling
//!
//! You describe a model **once** in [`Model::declare`]; the engine does the rest.
//!
//! ## Core Abstractions
//!
//! ### [`Model`] - The Mapped Type
//!
//! ```rust
//! use chrono::{DateTime, Utc};
//! use model_framework::{Declarations, Model};
//! use serde::Serialize;
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! #[derive(Debug, Default, Clone, Serialize)]
//! struct Position {
//!     x: f64,
//!     y: f64,
//! }
//!
//! impl Model for Position {
//!     fn declare(props: &mut Declarations<Self>) {
//!         props.primitive("x", |p| &mut p.x);
//!         props.primitive("y", |p| &mut p.y);
//!     }
//! }
//!
//! #[derive(Debug, Default, Clone, Serialize)]
//! struct Marker {
//!     label: String,
//!     position: Option<Arc<Position>>,
//!     placed: Option<DateTime<Utc>>,
//! }
//!
//! impl Model for Marker {
//!     fn declare(props: &mut Declarations<Self>) {
//!         props.primitive("label", |m| &mut m.label);
//!         props.model::<Position, _>("position", |m| &mut m.position);
//!         props.native::<DateTime<Utc>, _>("placed", |m| &mut m.placed);
//!     }
//! }
//!
//! let marker = Marker::from_value(Some(&json!({
//!     "label": "home",
//!     "position": {"x": 1.0, "y": 2.0},
//!     "placed": "2018-10-02T11:53:50.327Z"
//! })))
//! .unwrap();
//!
//! assert_eq!(marker.position.as_ref().unwrap().y, 2.0);
//!
//! let moved = marker.map_to_model([json!({"label": "work"})]).unwrap();
//! assert_eq!(moved.label, "work");
//!
//! let trimmed = marker.to_value_excluding(&["position.y"]).unwrap();
//! assert_eq!(trimmed["position"], json!({"x": 1.0}));
//! ```
//!
//! ### [`Resource`] - Links and Embedded Resources
//!
//! See the [`resource`] module for a complete example.
//!
//! ## Routing Rules
//!
//! Every declared property carries a [`PropertyType`]. The engine picks one of five
//! branches per input value; see [`engine`] for the exact order. Keys the model does
//! not declare are skipped without error.
//!
//! ## Concurrency Model
//!
//! - Mapping is synchronous and does no I/O
//! - Declarations are installed once per type, behind an `RwLock`
//! - After that every mapping call only takes read locks, so models can be
//!   deserialized from many threads at once
//!
//! ## Logging
//!
//! The framework emits `tracing` events and leaves subscriber setup to the
//! application ([`setup_tracing`](crate::tracing::setup_tracing)).

pub mod engine;
pub mod error;
pub mod link;
pub mod metadata;
pub mod model;
pub mod predicates;
pub mod resource;
pub mod slot;
pub mod tracing;
pub mod types;

// Re-export core types for convenience
pub use error::MappingError;
pub use link::{Link, LinkValue, Links};
pub use metadata::{Declarations, Declared, PropertyDescriptor};
pub use model::{AnyModel, Model};
pub use predicates::ValueClass;
pub use resource::{Embedded, EmbeddedDef, EmbeddedValue, PlainResource, Resource};
pub use slot::{FromRouted, Routed};
pub use types::{Construct, ModelType, NativeType, PropertyType, TypeResolver};
