use model_framework::{MappingError, Model, PlainResource, Resource};
use model_sample::model::{Address, Employee, Person, User};
use serde_json::{json, Value};
use std::sync::Arc;

fn user_payload() -> Value {
    json!({
        "_embedded": {
            "addresses": [
                {
                    "_links": {"self": {"href": "/users/123/addresses/1"}},
                    "city": "Warsaw",
                    "country": "Poland",
                    "description": "Company",
                    "postalCode": "01-248",
                    "street": "Puławska 9933"
                },
                {
                    "city": "Cracow",
                    "country": "Poland",
                    "description": "Home",
                    "postalCode": "30-001",
                    "street": "Floriańska 1"
                }
            ]
        },
        "name": "Tester"
    })
}

fn employee_payload() -> Value {
    json!({
        "grade": 2,
        "person": {"date": "2018-10-02T11:53:50.327Z", "name": "Ada", "surname": "Lovelace"},
        "hired": "2015-01-05",
        "manager": {"grade": 5, "person": {"name": "Charles", "surname": "Babbage"}},
        "reports": [
            {"grade": 1, "person": {"name": "Grace", "surname": "Hopper"}},
            {"grade": 1, "person": {"name": "Alan", "surname": "Turing"}}
        ],
        "skills": ["analysis", "engines"]
    })
}

/// Date, name and surname mapped onto a plain model.
#[test]
fn test_person_deserializes_native_date() {
    let person = Person::from_value(Some(&json!({
        "date": "2018-10-02T11:53:50.327Z",
        "name": "Test name",
        "surname": "Test surname"
    })))
    .expect("Failed to deserialize person");

    let date = person.date.expect("Date not set");
    assert_eq!(date.timestamp_millis(), 1_538_481_230_327);
    assert_eq!(person.name, "Test name");
    assert_eq!(person.surname, "Test surname");
}

#[test]
fn test_absent_data_gives_default_instance() {
    let person = Person::from_value(None).expect("None should not fail");
    assert_eq!(person, Person::default());

    let person = Person::from_value(Some(&Value::Null)).expect("null should not fail");
    assert_eq!(person, Person::default());

    let user = User::from_value(None).expect("None should not fail");
    assert!(user.embedded().is_none());
}

/// Declared fields survive deserialize followed by serialize unchanged.
#[test]
fn test_round_trip_reproduces_declared_fields() {
    let data = json!({
        "date": "2018-10-02T11:53:50.327Z",
        "name": "Test name",
        "surname": "Test surname"
    });
    let person = Person::from_value(Some(&data)).unwrap();
    assert_eq!(person.to_value().unwrap(), data);

    let data = employee_payload();
    let employee = Employee::from_value(Some(&data)).unwrap();
    let value = employee.to_value().unwrap();
    for key in ["grade", "hired", "skills"] {
        assert_eq!(value[key], data[key], "field {key}");
    }
    assert_eq!(value["person"], data["person"]);
    assert_eq!(value["reports"][1]["person"]["name"], json!("Alan"));
    assert_eq!(value["manager"]["grade"], json!(5));
}

#[test]
fn test_user_embeds_addresses() {
    let payload = user_payload();
    let user = User::from_value(Some(&payload)).expect("Failed to deserialize user");

    assert_eq!(user.name, "Tester");
    let addresses = user
        .embedded()
        .expect("_embedded not set")
        .many::<Address>("addresses")
        .expect("addresses are not Address instances");
    assert_eq!(addresses.len(), 2);
    assert_eq!(addresses[0].city, "Warsaw");
    assert_eq!(addresses[0].postal_code, "01-248");
    assert_eq!(addresses[1].street, "Floriańska 1");
    assert!(addresses[0].link("self").is_some());
    assert!(addresses[1].links().is_none());
}

#[test]
fn test_unknown_embedded_keys_are_skipped() {
    let user = User::from_value(Some(&json!({
        "name": "Tester",
        "_embedded": {"bookmarks": [{"href": "/x"}]}
    })))
    .unwrap();

    let embedded = user.embedded().expect("_embedded should be initialised");
    assert!(embedded.is_empty());
    assert!(user.addresses().is_empty());
}

#[test]
fn test_embedded_is_ignored_without_definitions() {
    let address = Address::from_value(Some(&json!({
        "city": "Warsaw",
        "_embedded": {"addresses": [{"city": "Nested"}]}
    })))
    .unwrap();
    assert_eq!(address.city, "Warsaw");
    assert!(address.embedded().is_none());

    let plain = PlainResource::from_value(Some(&user_payload())).unwrap();
    assert!(plain.embedded.is_none());
}

/// Deep clone: every nested model is a new allocation.
#[test]
fn test_deep_clone_is_reference_distinct() {
    let employee = Employee::from_value(Some(&employee_payload())).unwrap();
    let clone = employee.deep_clone().unwrap();

    let original_person = employee.person.as_ref().unwrap();
    let cloned_person = clone.person.as_ref().unwrap();
    assert!(!Arc::ptr_eq(original_person, cloned_person));
    assert_eq!(original_person, cloned_person);

    assert_eq!(clone.reports.len(), employee.reports.len());
    for (original, cloned) in employee.reports.iter().zip(&clone.reports) {
        assert!(!Arc::ptr_eq(original, cloned));
        assert_eq!(original.person, cloned.person);
    }
    assert_eq!(clone.manager.as_ref().map(|m| m.grade), Some(5));
    assert_eq!(clone.hired, employee.hired);
}

/// Shallow copy: new outer instance, shared nested models.
#[test]
fn test_copy_shares_nested_models() {
    let employee = Employee::from_value(Some(&employee_payload())).unwrap();
    let copy = employee.copy();

    assert!(!std::ptr::eq(&employee, &copy));
    assert!(Arc::ptr_eq(
        employee.person.as_ref().unwrap(),
        copy.person.as_ref().unwrap()
    ));
    for (original, copied) in employee.reports.iter().zip(&copy.reports) {
        assert!(Arc::ptr_eq(original, copied));
    }
}

#[test]
fn test_map_to_model_produces_new_instance() {
    let employee = Employee::default();
    assert_eq!(employee.grade, 0);

    let promoted = employee.map_to_model([json!({"grade": 1})]).unwrap();
    assert_eq!(promoted.grade, 1);
    assert_eq!(employee.grade, 0);
    assert!(!std::ptr::eq(&employee, &promoted));
}

#[test]
fn test_map_to_model_later_partials_win() {
    let user = User::from_value(Some(&user_payload())).unwrap();
    let renamed = user
        .map_to_model([json!({"name": "First"}), json!({"name": "Second"})])
        .unwrap();
    assert_eq!(renamed.name, "Second");
    // Embedded addresses survive the serialize / deserialize round trip.
    assert_eq!(renamed.addresses().len(), 2);
}

#[test]
fn test_missing_exclude_path_fails() {
    let person = Person::default();
    let err = person.to_value_excluding(&["a.b"]).unwrap_err();
    match err {
        MappingError::MissingProperty { path, class } => {
            assert_eq!(path, "a.b");
            assert_eq!(class, "Person");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_exclude_removes_nested_paths() {
    let user = User::from_value(Some(&user_payload())).unwrap();
    let value = user.to_value_excluding(&["_embedded.addresses"]).unwrap();
    assert_eq!(value, json!({"_embedded": {}, "name": "Tester"}));
}

#[test]
fn test_invalid_date_is_reported() {
    let err = Person::from_value(Some(&json!({"date": "soon"}))).unwrap_err();
    assert!(matches!(err, MappingError::Construct(_)));
}

/// Partial server payloads: `null` for a plain field keeps its default.
#[test]
fn test_null_fields_do_not_reject_resource() {
    let user = User::from_value(Some(&json!({
        "name": null,
        "_embedded": {
            "addresses": [{"city": "Warsaw", "description": null, "postalCode": null}]
        }
    })))
    .expect("null fields should not fail");

    assert!(user.name.is_empty());
    let addresses = user.addresses();
    assert_eq!(addresses[0].city, "Warsaw");
    assert!(addresses[0].description.is_empty());
}

#[test]
fn test_exclude_path_through_array_index() {
    let employee = Employee::from_value(Some(&employee_payload())).unwrap();
    let value = employee.to_value_excluding(&["reports.0.grade"]).unwrap();

    assert!(value["reports"][0].get("grade").is_none());
    assert_eq!(value["reports"][0]["person"]["name"], json!("Grace"));
    assert_eq!(value["reports"][1]["grade"], json!(1));

    let err = employee.to_value_excluding(&["reports.7.grade"]).unwrap_err();
    assert!(matches!(err, MappingError::MissingProperty { .. }));
}
