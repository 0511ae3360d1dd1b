use chrono::{DateTime, Utc};
use model_framework::{Declarations, Model};
use serde::Serialize;

/// A plain model with a native date field.
#[derive(Debug, Default, Clone, Serialize, PartialEq)]
pub struct Person {
    pub date: Option<DateTime<Utc>>,
    pub name: String,
    pub surname: String,
}

impl Model for Person {
    fn declare(props: &mut Declarations<Self>) {
        props.native::<DateTime<Utc>, _>("date", |p| &mut p.date);
        props.primitive("name", |p| &mut p.name);
        props.primitive("surname", |p| &mut p.surname);
    }
}
