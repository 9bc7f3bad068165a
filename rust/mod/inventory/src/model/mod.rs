//! Entity records and their form schemas.

mod cable;
mod inventory;
mod location;
mod ont;
mod stb;

use std::fmt;
use std::str::FromStr;

use netadmin_core::Resource;
use netadmin_form::FormSchema;

pub use cable::Cable;
pub use inventory::InventoryItem;
pub use location::Location;
pub use ont::Ont;
pub use stb::Stb;

/// Lifecycle states shared by ONT, STB and cable records.
pub const DEVICE_STATUS: &[&str] = &["Active", "Ready", "Terminate"];

/// The managed entities, in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Location,
    Cable,
    Ont,
    Stb,
    Inventory,
}

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Location,
        EntityKind::Cable,
        EntityKind::Ont,
        EntityKind::Stb,
        EntityKind::Inventory,
    ];

    /// Machine name, also the `/admin/{name}` route segment.
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Location => Location::NAME,
            EntityKind::Cable => Cable::NAME,
            EntityKind::Ont => Ont::NAME,
            EntityKind::Stb => Stb::NAME,
            EntityKind::Inventory => InventoryItem::NAME,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Location => Location::LABEL,
            EntityKind::Cable => Cable::LABEL,
            EntityKind::Ont => Ont::LABEL,
            EntityKind::Stb => Stb::LABEL,
            EntityKind::Inventory => InventoryItem::LABEL,
        }
    }

    pub fn schema(&self) -> FormSchema {
        match self {
            EntityKind::Location => location::schema(),
            EntityKind::Cable => cable::schema(),
            EntityKind::Ont => ont::schema(),
            EntityKind::Stb => stb::schema(),
            EntityKind::Inventory => inventory::schema(),
        }
    }

    /// Devices can be listed per location (`/admin/ont/:locationId`).
    pub fn scoped_by_location(&self) -> bool {
        matches!(self, EntityKind::Ont | EntityKind::Stb)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let names: Vec<&str> = EntityKind::ALL.iter().map(|k| k.name()).collect();
                format!("unknown entity '{}' (expected one of: {})", s, names.join(", "))
            })
    }
}
