use netadmin_core::Resource;
use netadmin_form::{FieldDef, FieldDefault, FieldKind, FormSchema, Rule};
use serde::{Deserialize, Serialize};

use super::DEVICE_STATUS;

/// Optical network terminal installed at a customer unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ont {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub serial_number: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub number_wo: String,
    #[serde(default)]
    pub location_id: String,
    #[serde(default)]
    pub unit_address: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub date_activation: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub information: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Resource for Ont {
    const NAME: &'static str = "ont";
    const PATH: &'static str = "ont";
    const LABEL: &'static str = "Optical Network Terminal";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

pub(super) fn schema() -> FormSchema {
    FormSchema::new(Ont::NAME)
        .field(FieldDef::new("serialNumber", "Serial Number"))
        .field(FieldDef::new("type", "Type"))
        .field(FieldDef::new("numberWo", "Work Order Number"))
        .field(FieldDef::new("locationId", "Location").kind(FieldKind::Reference("location")))
        .field(FieldDef::new("unitAddress", "Unit Address"))
        .field(FieldDef::new("name", "Customer Name"))
        .field(
            FieldDef::new("dateActivation", "Activation Date")
                .kind(FieldKind::Date)
                .default_to(FieldDefault::Today),
        )
        .field(FieldDef::new("status", "Status").kind(FieldKind::Select(DEVICE_STATUS)))
        .field(FieldDef::new("information", "Information").kind(FieldKind::LongText))
        .rule(Rule::required("serialNumber", "Serial number is required"))
        .rule(Rule::required("type", "Type is required"))
        .rule(Rule::required("numberWo", "Work order number is required"))
        .rule(Rule::required("locationId", "Location is required"))
        .rule(Rule::required("unitAddress", "Unit address is required"))
        .rule(Rule::required("name", "Customer name is required"))
        .rule(Rule::required("dateActivation", "Activation date is required"))
        .rule(Rule::date("dateActivation", "Activation date is not a valid date"))
        .rule(Rule::required("status", "Status is required"))
        .rule(Rule::one_of("status", DEVICE_STATUS, "Status must be Active, Ready or Terminate"))
}
