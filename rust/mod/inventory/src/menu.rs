use serde::Serialize;

use crate::model::EntityKind;
use crate::routes::Route;

/// One entry of the admin side menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub label: &'static str,
    pub path: String,
}

/// Side menu: the dashboard, then one list page per entity.
pub fn menu() -> Vec<MenuItem> {
    let mut items = vec![MenuItem {
        label: "Dashboard",
        path: Route::Dashboard.pattern(),
    }];
    items.extend(EntityKind::ALL.into_iter().map(|kind| MenuItem {
        label: kind.label(),
        path: Route::List(kind).pattern(),
    }));
    items
}
