//! # Model Engine
//!
//! The deserialization, serialization and merge algorithms behind the provided
//! methods of [`Model`]. They are public so that types overriding a provided
//! method can still fall back to the stock behaviour.
//!
//! ## Routing
//!
//! For every key of the input that the model declares, the raw value is routed
//! by [`deserialize_property`] against the declared [`PropertyType`]:
//!
//! 1. primitive value, primitive type: copied unchanged;
//! 2. array value: unchanged for [`PropertyType::PrimitiveArray`], otherwise
//!    mapped element by element through the nested model. A type without a
//!    nested deserializer is constructed from the *whole* array once per element;
//! 3. model type, non-null value: nested deserialize;
//! 4. any other non-null value: constructed from the raw value
//!    ([`PropertyType::Native`]) or taken as-is;
//! 5. `null`: kept as `null`.
//!
//! Keys the model does not declare are skipped.

use crate::error::MappingError;
use crate::metadata;
use crate::model::Model;
use crate::predicates::{classify, is_primitive};
use crate::slot::Routed;
use crate::types::PropertyType;
use serde::Serialize;
use serde_json::Value;
use tracing::trace;

/// Builds an `M` from plain data. Never mutates `data`.
pub fn deserialize<M: Model>(data: Option<&Value>) -> Result<M, MappingError> {
    let mut model = M::default();
    let Some(Value::Object(fields)) = data else {
        return Ok(model);
    };

    let class = M::class_name();
    for (key, value) in fields {
        let Some(descriptor) = metadata::lookup::<M>(key) else {
            trace!(class, key = %key, "Unmapped key skipped");
            continue;
        };
        let ty = descriptor.resolve_type();
        trace!(class, key = %key, target = descriptor.target(), ty = ty.name(), "Routing");
        let routed = deserialize_property(value, &ty)?;
        descriptor.assign(&mut model, routed)?;
    }

    Ok(model)
}

/// Routes one raw value against its declared type.
pub fn deserialize_property(value: &Value, ty: &PropertyType) -> Result<Routed, MappingError> {
    if is_primitive(value) && ty.is_primitive() {
        return Ok(Routed::Raw(value.clone()));
    }

    if let Value::Array(items) = value {
        if ty.is_array() {
            return Ok(Routed::Raw(value.clone()));
        }
        return items
            .iter()
            .map(|item| match ty.as_model() {
                Some(model) => model.deserialize(Some(item)).map(Routed::Instance),
                // Whole array, not the element.
                None => construct(ty, value),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Routed::Many);
    }

    if value.is_null() {
        return Ok(Routed::Raw(Value::Null));
    }

    match ty.as_model() {
        Some(model) => model.deserialize(Some(value)).map(Routed::Instance),
        None => construct(ty, value),
    }
}

fn construct(ty: &PropertyType, raw: &Value) -> Result<Routed, MappingError> {
    match ty {
        PropertyType::Native(native) => native.construct(raw).map(Routed::Instance),
        _ => Ok(Routed::Raw(raw.clone())),
    }
}

/// Serializes `model`, then deletes every dotted path in `exclude`.
pub fn serialize<M: Model>(model: &M, exclude: &[&str]) -> Result<Value, MappingError> {
    let mut value = serde_json::to_value(model)?;
    for path in exclude {
        remove_path(&mut value, path, M::class_name())?;
    }
    Ok(value)
}

fn remove_path(root: &mut Value, path: &str, class: &'static str) -> Result<(), MappingError> {
    let (parents, leaf) = match path.rsplit_once('.') {
        Some((parents, leaf)) => (Some(parents), leaf),
        None => (None, path),
    };

    let mut current = root;
    for segment in parents.into_iter().flat_map(|p| p.split('.')) {
        current = child_mut(current, segment).ok_or_else(|| MappingError::missing(path, class))?;
    }

    let removed = match current {
        Value::Object(object) => object.remove(leaf).is_some(),
        // Array slots are nulled, not removed, so later indices keep their meaning.
        Value::Array(items) => match leaf.parse::<usize>().ok().and_then(|i| items.get_mut(i)) {
            Some(slot) => {
                *slot = Value::Null;
                true
            }
            None => false,
        },
        _ => false,
    };

    if removed {
        Ok(())
    } else {
        Err(MappingError::missing(path, class))
    }
}

/// Object member or array element named by one path segment.
fn child_mut<'a>(value: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    match value {
        Value::Object(object) => object.get_mut(segment),
        Value::Array(items) => items.get_mut(segment.parse::<usize>().ok()?),
        _ => None,
    }
}

/// Serializes `model`, shallow-merges each partial on top and deserializes the
/// merged data. Partials that do not serialize to an object are ignored.
pub fn map_to_model<M, P, I>(model: &M, partials: I) -> Result<M, MappingError>
where
    M: Model,
    P: Serialize,
    I: IntoIterator<Item = P>,
{
    let mut merged = model.to_value()?;
    for partial in partials {
        match (&mut merged, serde_json::to_value(partial)?) {
            (Value::Object(base), Value::Object(overrides)) => base.extend(overrides),
            (_, other) => {
                trace!(class = M::class_name(), kind = ?classify(&other), "Partial ignored")
            }
        }
    }
    M::from_value(Some(&merged))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::Declarations;
    use crate::types::PropertyType;
    use chrono::{DateTime, Utc};
    use serde::Serialize;
    use serde_json::json;
    use std::sync::Arc;

    #[derive(Debug, Default, Clone, Serialize, PartialEq)]
    struct Position {
        x: f64,
        y: f64,
        z: f64,
    }

    impl Model for Position {
        fn declare(props: &mut Declarations<Self>) {
            props.primitive("x", |p| &mut p.x);
            props.primitive("y", |p| &mut p.y);
            props.primitive("z", |p| &mut p.z);
        }
    }

    #[derive(Debug, Default, Clone, Serialize)]
    struct Ship {
        name: String,
        tags: Vec<String>,
        position: Option<Arc<Position>>,
        waypoints: Vec<Arc<Position>>,
        launched: Option<DateTime<Utc>>,
        extra: Option<Value>,
        #[serde(skip)]
        transient: u32,
    }

    impl Model for Ship {
        fn declare(props: &mut Declarations<Self>) {
            props.primitive("name", |s| &mut s.name);
            props.primitive_array("tags", |s| &mut s.tags);
            props.model::<Position, _>("position", |s| &mut s.position);
            props.model::<Position, _>("waypoints", |s| &mut s.waypoints);
            props.native::<DateTime<Utc>, _>("launched", |s| &mut s.launched);
            props.opaque("extra", |s| &mut s.extra);
            props.primitive("transient", |s| &mut s.transient);
        }
    }

    fn ship_data() -> Value {
        json!({
            "name": "Endeavour",
            "tags": ["fast", "old"],
            "position": {"x": 1.0, "y": 2.0, "z": 3.0},
            "waypoints": [{"x": 0.0, "y": 0.0, "z": 0.0}, {"x": 5.0, "y": 5.0, "z": 5.0}],
            "launched": "2018-10-02T11:53:50.327Z",
            "extra": {"crew": [1, 2]},
            "unknown": "ignored"
        })
    }

    #[test]
    fn absent_data_gives_default() {
        let ship = deserialize::<Ship>(None).unwrap();
        assert!(ship.name.is_empty());
        let ship = deserialize::<Ship>(Some(&Value::Null)).unwrap();
        assert!(ship.position.is_none());
    }

    #[test]
    fn routes_every_declared_kind() {
        let data = ship_data();
        let ship = deserialize::<Ship>(Some(&data)).unwrap();

        assert_eq!(ship.name, "Endeavour");
        assert_eq!(ship.tags, vec!["fast", "old"]);
        assert_eq!(ship.position.as_deref().map(|p| p.z), Some(3.0));
        assert_eq!(ship.waypoints.len(), 2);
        assert_eq!(ship.waypoints[1].x, 5.0);
        assert_eq!(ship.launched.unwrap().timestamp_millis(), 1_538_481_230_327);
        assert_eq!(ship.extra, Some(json!({"crew": [1, 2]})));
        // input untouched
        assert_eq!(data, ship_data());
    }

    #[test]
    fn null_values_are_preserved_as_absence() {
        let ship = deserialize::<Ship>(Some(&json!({
            "position": null,
            "launched": null,
            "extra": null
        })))
        .unwrap();
        assert!(ship.position.is_none());
        assert!(ship.launched.is_none());
        assert!(ship.extra.is_none());
    }

    #[test]
    fn null_leaves_non_optional_fields_at_default() {
        let ship = deserialize::<Ship>(Some(&json!({
            "name": null,
            "tags": null,
            "waypoints": null,
            "position": {"x": 1.0, "y": 2.0, "z": 3.0}
        })))
        .unwrap();
        assert!(ship.name.is_empty());
        assert!(ship.tags.is_empty());
        assert!(ship.waypoints.is_empty());
        assert!(ship.position.is_some());
    }

    #[test]
    fn primitive_fast_path_does_not_coerce() {
        let routed = deserialize_property(&json!("7"), &PropertyType::Primitive).unwrap();
        assert!(matches!(routed, Routed::Raw(Value::String(ref s)) if s == "7"));
    }

    #[test]
    fn non_model_arrays_construct_from_whole_array() {
        let raw = json!([1, 2]);
        let routed = deserialize_property(&raw, &PropertyType::Opaque).unwrap();
        assert_eq!(routed.into_value(), Some(json!([[1, 2], [1, 2]])));
    }

    #[test]
    fn native_failures_propagate() {
        let err = deserialize::<Ship>(Some(&json!({"launched": "yesterday"}))).unwrap_err();
        assert!(matches!(err, MappingError::Construct(_)));
    }

    #[test]
    fn serialize_includes_undeclared_fields_and_skips_skipped() {
        let mut ship = deserialize::<Ship>(Some(&ship_data())).unwrap();
        ship.transient = 9;
        let value = serialize(&ship, &[]).unwrap();
        assert_eq!(value["position"], json!({"x": 1.0, "y": 2.0, "z": 3.0}));
        assert_eq!(value["launched"], json!("2018-10-02T11:53:50.327Z"));
        assert!(value.get("transient").is_none());
    }

    #[test]
    fn serialize_excludes_nested_paths() {
        let ship = deserialize::<Ship>(Some(&ship_data())).unwrap();
        let value = serialize(&ship, &["position.z", "tags"]).unwrap();
        assert_eq!(value["position"], json!({"x": 1.0, "y": 2.0}));
        assert!(value.get("tags").is_none());
    }

    #[test]
    fn serialize_excludes_through_array_indices() {
        let ship = deserialize::<Ship>(Some(&ship_data())).unwrap();
        let value = serialize(&ship, &["waypoints.1.z", "tags.0"]).unwrap();
        assert_eq!(
            value["waypoints"],
            json!([{"x": 0.0, "y": 0.0, "z": 0.0}, {"x": 5.0, "y": 5.0}])
        );
        assert_eq!(value["tags"], json!([null, "old"]));

        let err = serialize(&ship, &["waypoints.2.z"]).unwrap_err();
        assert!(matches!(err, MappingError::MissingProperty { .. }));
        let err = serialize(&ship, &["waypoints.first.z"]).unwrap_err();
        assert!(matches!(err, MappingError::MissingProperty { .. }));
    }

    #[test]
    fn serialize_rejects_missing_paths() {
        let ship = Ship::default();
        let err = serialize(&ship, &["position.z"]).unwrap_err();
        assert_eq!(err.to_string(), "Property position.z does not exist on Ship");

        let err = serialize(&ship, &["nope"]).unwrap_err();
        assert!(matches!(
            err,
            MappingError::MissingProperty { ref path, class: "Ship" } if path == "nope"
        ));
    }

    #[test]
    fn map_to_model_overrides_in_order() {
        let ship = deserialize::<Ship>(Some(&ship_data())).unwrap();
        let moved = map_to_model(
            &ship,
            [
                json!({"name": "Discovery"}),
                json!("not an object"),
                json!({"position": {"x": 9.0, "y": 9.0, "z": 9.0}}),
            ],
        )
        .unwrap();
        assert_eq!(moved.name, "Discovery");
        assert_eq!(moved.position.as_deref().map(|p| p.x), Some(9.0));
        assert_eq!(moved.tags, ship.tags);
        assert_eq!(ship.name, "Endeavour");
    }
}
