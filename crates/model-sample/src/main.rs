//! # Model Framework Sample
//!
//! A walk through the framework on a HAL payload.
//!
//! ## Core Components
//!
//! - **[model_framework]**: The mapping engine, metadata store and resource layer.
//! - **[model]**: Fixture models ([`User`], [`Address`], [`Person`], [`Employee`]).
//!
//! ## Quick Start
//!
//! Run with `RUST_LOG=model_framework=trace` to see every property routed. The
//! demo:
//! 1.  Deserializes a [`User`] with embedded [`Address`] resources.
//! 2.  Serializes it with an exclusion.
//! 3.  Merges changes into a new instance with `map_to_model`.
//! 4.  Compares `copy` and `deep_clone` on an [`Employee`] chain.

use model_framework::tracing::setup_tracing;
use model_framework::{LinkValue, MappingError, Model, Resource};
use model_sample::model::{Address, Employee, Person, User};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, info_span};

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error("mapping failed: {0}")]
    Mapping(#[from] MappingError),

    #[error("payload is missing `{0}`")]
    Missing(&'static str),
}

fn main() -> Result<(), DemoError> {
    // Setup tracing once for the entire application
    setup_tracing();

    info!("Starting model framework demo");

    let payload = json!({
        "_links": {"self": {"href": "/users/123"}},
        "_embedded": {
            "addresses": [
                {
                    "_links": {"self": {"href": "/users/123/addresses/1"}},
                    "city": "Warsaw",
                    "country": "Poland",
                    "description": "Company",
                    "postalCode": "01-248",
                    "street": "Puławska 9933"
                }
            ],
            "bookmarks": [{"href": "/somewhere"}]
        },
        "name": "Tester"
    });

    let user = {
        let _span = info_span!("user_deserialize").entered();
        User::from_value(Some(&payload))?
    };

    let self_href = user
        .link("self")
        .and_then(LinkValue::first)
        .map(|l| l.href.clone())
        .ok_or(DemoError::Missing("_links.self"))?;
    info!(
        name = %user.name,
        href = %self_href,
        addresses = user.addresses().len(),
        "User deserialized"
    );

    for address in user.addresses() {
        info!(city = %address.city, street = %address.street, "Embedded address");
    }

    let trimmed = user.to_value_excluding(&["_links.self"])?;
    info!(json = %trimmed, "Serialized without self link");

    let renamed = user.map_to_model([json!({"name": "Renamed"})])?;
    info!(before = %user.name, after = %renamed.name, "Merged into new instance");

    let manager = Employee::from_value(Some(&json!({
        "grade": 3,
        "person": {"date": "2018-10-02T11:53:50.327Z", "name": "Ada", "surname": "Lovelace"},
        "hired": "2015-01-05",
        "skills": ["rust", "serde"],
        "reports": [
            {"grade": 1, "person": {"name": "Grace", "surname": "Hopper"}}
        ]
    })))?;

    let copy = manager.copy();
    let clone = manager.deep_clone()?;
    info!(
        copy_shares_person = ptr_eq(&manager.person, &copy.person),
        clone_shares_person = ptr_eq(&manager.person, &clone.person),
        "Copy vs deep clone"
    );

    let first_address: Option<&Address> = user.addresses().first().copied();
    let person: Option<&Person> = manager.person.as_deref();
    info!(
        city = first_address.map(|a| a.city.as_str()).unwrap_or_default(),
        person = person.map(|p| p.name.as_str()).unwrap_or_default(),
        "Demo finished"
    );

    Ok(())
}

fn ptr_eq(a: &Option<Arc<Person>>, b: &Option<Arc<Person>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        _ => false,
    }
}
