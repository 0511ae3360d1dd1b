use super::Person;
use chrono::NaiveDate;
use model_framework::{Declarations, Model};
use serde::Serialize;
use std::sync::Arc;

/// An employee in a reporting chain.
///
/// `manager` and `reports` refer back to `Employee` itself, so they are
/// declared with deferred types.
#[derive(Debug, Default, Clone, Serialize)]
pub struct Employee {
    pub grade: u32,
    pub person: Option<Arc<Person>>,
    pub hired: Option<NaiveDate>,
    pub manager: Option<Box<Employee>>,
    pub reports: Vec<Arc<Employee>>,
    pub skills: Vec<String>,
}

impl Model for Employee {
    fn declare(props: &mut Declarations<Self>) {
        props.primitive("grade", |e| &mut e.grade);
        props.model::<Person, _>("person", |e| &mut e.person);
        props.native::<NaiveDate, _>("hired", |e| &mut e.hired);
        props.deferred::<Employee, _>("manager", |e| &mut e.manager);
        props.deferred::<Employee, _>("reports", |e| &mut e.reports);
        props.primitive_array("skills", |e| &mut e.skills);
    }
}
