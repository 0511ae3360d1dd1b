use super::Address;
use model_framework::resource::{self, Embedded, EmbeddedDef};
use model_framework::{Declarations, Links, MappingError, Model, Resource};
use serde::Serialize;
use serde_json::Value;

/// A user resource with its addresses embedded.
///
/// # Embedded relations
/// - `addresses`: array of [`Address`]
#[derive(Debug, Default, Clone, Serialize)]
pub struct User {
    pub name: String,
    #[serde(rename = "_links", skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
    #[serde(rename = "_embedded", skip_serializing_if = "Option::is_none")]
    pub embedded: Option<Embedded>,
}

impl User {
    /// Embedded addresses, empty when the payload had none.
    pub fn addresses(&self) -> Vec<&Address> {
        self.embedded
            .as_ref()
            .and_then(|e| e.many::<Address>("addresses"))
            .unwrap_or_default()
    }
}

impl Model for User {
    fn declare(props: &mut Declarations<Self>) {
        props.opaque("_links", |u| &mut u.links);
        props.primitive("name", |u| &mut u.name);
    }

    fn from_value(data: Option<&Value>) -> Result<Self, MappingError> {
        resource::deserialize(data)
    }
}

impl Resource for User {
    fn links(&self) -> Option<&Links> {
        self.links.as_ref()
    }

    fn embedded(&self) -> Option<&Embedded> {
        self.embedded.as_ref()
    }

    fn embedded_mut(&mut self) -> &mut Option<Embedded> {
        &mut self.embedded
    }

    fn embedded_defs() -> Option<EmbeddedDef> {
        Some(EmbeddedDef::new().relation_to::<Address>("addresses"))
    }
}
