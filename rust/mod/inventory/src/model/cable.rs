use netadmin_core::Resource;
use netadmin_form::{FieldDef, FieldDefault, FieldKind, FormSchema, Rule};
use serde::{Deserialize, Serialize};

use super::DEVICE_STATUS;

/// A cable run, length in meters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub length: Option<f64>,
    #[serde(default)]
    pub location_id: String,
    #[serde(default)]
    pub date_installed: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub information: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Resource for Cable {
    const NAME: &'static str = "cable";
    const PATH: &'static str = "cable";
    const LABEL: &'static str = "Cable";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

pub(super) fn schema() -> FormSchema {
    FormSchema::new(Cable::NAME)
        .field(FieldDef::new("name", "Name"))
        .field(FieldDef::new("type", "Type"))
        .field(FieldDef::new("length", "Length (m)").kind(FieldKind::Number))
        .field(FieldDef::new("locationId", "Location").kind(FieldKind::Reference("location")))
        .field(
            FieldDef::new("dateInstalled", "Installation Date")
                .kind(FieldKind::Date)
                .default_to(FieldDefault::Today),
        )
        .field(FieldDef::new("status", "Status").kind(FieldKind::Select(DEVICE_STATUS)))
        .field(FieldDef::new("information", "Information").kind(FieldKind::LongText))
        .rule(Rule::required("name", "Name is required"))
        .rule(Rule::required("type", "Type is required"))
        .rule(Rule::required("length", "Length is required"))
        .rule(Rule::number("length", Some(0.0), "Length must be a number of at least 0"))
        .rule(Rule::required("locationId", "Location is required"))
        .rule(Rule::required("dateInstalled", "Installation date is required"))
        .rule(Rule::date("dateInstalled", "Installation date is not a valid date"))
        .rule(Rule::required("status", "Status is required"))
        .rule(Rule::one_of("status", DEVICE_STATUS, "Status must be Active, Ready or Terminate"))
}
