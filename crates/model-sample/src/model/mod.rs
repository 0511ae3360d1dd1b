//! Fixture models implementing the [`Model`](model_framework::Model) trait.

pub mod address;
pub mod employee;
pub mod person;
pub mod user;

pub use address::*;
pub use employee::*;
pub use person::*;
pub use user::*;
