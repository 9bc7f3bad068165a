use netadmin_core::Resource;
use netadmin_form::{Draft, FieldDef, FieldDefault, FieldKind, FormSchema, Rule, parse_date};
use serde::{Deserialize, Serialize};

/// Stock of spare equipment held at a location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub location_id: String,
    #[serde(default)]
    pub date_in: String,
    #[serde(default)]
    pub date_out: String,
    #[serde(default)]
    pub information: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Resource for InventoryItem {
    const NAME: &'static str = "inventory";
    const PATH: &'static str = "inventory";
    const LABEL: &'static str = "Inventory";

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

fn whole_quantity(draft: &Draft) -> bool {
    let raw = draft.get("quantity").trim();
    raw.is_empty() || raw.parse::<i64>().is_ok()
}

/// Checked only when both dates parse; malformed dates have their own rules.
fn out_not_before_in(draft: &Draft) -> bool {
    match (parse_date(draft.get("dateIn")), parse_date(draft.get("dateOut"))) {
        (Some(date_in), Some(date_out)) => date_out >= date_in,
        _ => true,
    }
}

pub(super) fn schema() -> FormSchema {
    FormSchema::new(InventoryItem::NAME)
        .field(FieldDef::new("name", "Item Name"))
        .field(FieldDef::new("category", "Category"))
        .field(FieldDef::new("quantity", "Quantity").kind(FieldKind::Number))
        .field(FieldDef::new("locationId", "Location").kind(FieldKind::Reference("location")))
        .field(
            FieldDef::new("dateIn", "Date In")
                .kind(FieldKind::Date)
                .default_to(FieldDefault::Today),
        )
        .field(FieldDef::new("dateOut", "Date Out").kind(FieldKind::Date))
        .field(FieldDef::new("information", "Information").kind(FieldKind::LongText))
        .rule(Rule::required("name", "Item name is required"))
        .rule(Rule::required("category", "Category is required"))
        .rule(Rule::required("quantity", "Quantity is required"))
        .rule(Rule::number("quantity", Some(0.0), "Quantity must be at least 0"))
        .rule(Rule::custom("quantity", whole_quantity, "Quantity must be a whole number"))
        .rule(Rule::required("locationId", "Location is required"))
        .rule(Rule::required("dateIn", "Date in is required"))
        .rule(Rule::date("dateIn", "Date in is not a valid date"))
        .rule(Rule::date("dateOut", "Date out is not a valid date"))
        .rule(Rule::custom("dateOut", out_not_before_in, "Date out cannot be before date in"))
}
