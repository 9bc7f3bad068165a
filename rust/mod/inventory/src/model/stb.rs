use netadmin_core::Resource;
use netadmin_form::{FieldDef, FieldDefault, FieldKind, FormSchema, Rule};
use serde::{Deserialize, Serialize};

use super::DEVICE_STATUS;

/// Set-top box delivering a TV package to a unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stb {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub serial_number: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub device_id: String,
    #[serde(default)]
    pub number_wo: String,
    #[serde(default)]
    pub location_id: String,
    #[serde(default)]
    pub unit_address: String,
    #[serde(default)]
    pub package_name: String,
    #[serde(default)]
    pub date_activation: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub device_location: String,
    #[serde(default)]
    pub information: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Resource for Stb {
    const NAME: &'static str = "stb";
    const PATH: &'static str = "stb";
    const LABEL: &'static str = "Set Top Box";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

pub(super) fn schema() -> FormSchema {
    FormSchema::new(Stb::NAME)
        .field(FieldDef::new("serialNumber", "Serial Number"))
        .field(FieldDef::new("type", "Type"))
        .field(FieldDef::new("deviceId", "Device ID"))
        .field(FieldDef::new("numberWo", "Work Order Number"))
        .field(FieldDef::new("locationId", "Location").kind(FieldKind::Reference("location")))
        .field(FieldDef::new("unitAddress", "Unit Address"))
        .field(FieldDef::new("packageName", "Package"))
        .field(
            FieldDef::new("dateActivation", "Activation Date")
                .kind(FieldKind::Date)
                .default_to(FieldDefault::Today),
        )
        .field(FieldDef::new("status", "Status").kind(FieldKind::Select(DEVICE_STATUS)))
        .field(FieldDef::new("deviceLocation", "Device Location"))
        .field(FieldDef::new("information", "Information").kind(FieldKind::LongText))
        .field(FieldDef::new("notes", "Notes").kind(FieldKind::LongText))
        .rule(Rule::required("serialNumber", "Serial number is required"))
        .rule(Rule::required("type", "Type is required"))
        .rule(Rule::required("deviceId", "Device ID is required"))
        .rule(Rule::required("numberWo", "Work order number is required"))
        .rule(Rule::required("locationId", "Location is required"))
        .rule(Rule::required("unitAddress", "Unit address is required"))
        .rule(Rule::required("packageName", "Package is required"))
        .rule(Rule::required("dateActivation", "Activation date is required"))
        .rule(Rule::date("dateActivation", "Activation date is not a valid date"))
        .rule(Rule::one_of("status", DEVICE_STATUS, "Status must be Active, Ready or Terminate"))
        .rule(Rule::required("deviceLocation", "Device location is required"))
}
