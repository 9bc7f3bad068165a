use netadmin_core::Resource;
use netadmin_form::{FieldDef, FieldKind, FormSchema, Rule};
use serde::{Deserialize, Serialize};

/// A site where devices and cables are installed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub information: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Resource for Location {
    const NAME: &'static str = "location";
    const PATH: &'static str = "location";
    const LABEL: &'static str = "Location";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

pub(super) fn schema() -> FormSchema {
    FormSchema::new(Location::NAME)
        .field(FieldDef::new("location", "Location Name"))
        .field(FieldDef::new("address", "Address").kind(FieldKind::LongText))
        .field(FieldDef::new("information", "Information").kind(FieldKind::LongText))
        .rule(Rule::required("location", "Location name is required"))
        .rule(Rule::required("address", "Address is required"))
}
