use model_framework::resource::{self, Embedded};
use model_framework::{Declarations, Links, MappingError, Model, Resource};
use serde::Serialize;
use serde_json::Value;

/// A postal address, embedded in [`User`](super::User) resources.
#[derive(Debug, Default, Clone, Serialize)]
pub struct Address {
    pub city: String,
    pub country: String,
    pub description: String,
    #[serde(rename = "postalCode")]
    pub postal_code: String,
    pub street: String,
    #[serde(rename = "_links", skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
    #[serde(rename = "_embedded", skip_serializing_if = "Option::is_none")]
    pub embedded: Option<Embedded>,
}

impl Model for Address {
    fn declare(props: &mut Declarations<Self>) {
        props.opaque("_links", |a| &mut a.links);
        props.primitive("city", |a| &mut a.city);
        props.primitive("country", |a| &mut a.country);
        props.primitive("description", |a| &mut a.description);
        props.primitive("postalCode", |a| &mut a.postal_code);
        props.primitive("street", |a| &mut a.street);
    }

    fn from_value(data: Option<&Value>) -> Result<Self, MappingError> {
        resource::deserialize(data)
    }
}

impl Resource for Address {
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
