use netadmin_flux::{RouteTable, build_path};

use crate::model::EntityKind;

/// Page a URL resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
    List(EntityKind),
    /// ONT/STB list filtered by `:locationId`.
    ListByLocation(EntityKind),
    Create(EntityKind),
    /// Edit page for `:id`.
    Edit(EntityKind),
}

impl Route {
    pub fn pattern(&self) -> String {
        match self {
            Route::Login => "/admin/login".to_string(),
            Route::Dashboard => "/".to_string(),
            Route::List(kind) => format!("/admin/{}", kind),
            Route::ListByLocation(kind) => format!("/admin/{}/:locationId", kind),
            Route::Create(kind) => format!("/admin/{}/create", kind),
            Route::Edit(kind) => format!("/admin/{}/edit/:id", kind),
        }
    }

    /// Page title shown in the navbar.
    pub fn title(&self) -> String {
        match self {
            Route::Login => "Login".to_string(),
            Route::Dashboard => "Dashboard".to_string(),
            Route::List(kind) | Route::ListByLocation(kind) => kind.label().to_string(),
            Route::Create(kind) => format!("Add {}", kind.label()),
            Route::Edit(kind) => format!("Update {}", kind.label()),
        }
    }

    pub fn entity(&self) -> Option<EntityKind> {
        match self {
            Route::Login | Route::Dashboard => None,
            Route::List(kind) | Route::ListByLocation(kind) | Route::Create(kind) | Route::Edit(kind) => {
                Some(*kind)
            }
        }
    }

    /// Concrete edit path for record `id`.
    pub fn edit_path(kind: EntityKind, id: &str) -> Option<String> {
        build_path(&Route::Edit(kind).pattern(), &[("id", id)])
    }
}

/// Every page, in registration order.
pub fn all_routes() -> Vec<Route> {
    let mut routes = vec![Route::Login, Route::Dashboard];
    for kind in EntityKind::ALL {
        routes.extend([Route::List(kind), Route::Create(kind), Route::Edit(kind)]);
        if kind.scoped_by_location() {
            routes.push(Route::ListByLocation(kind));
        }
    }
    routes
}

/// The admin route table.
pub fn route_table() -> RouteTable<Route> {
    let mut table = RouteTable::new();
    for route in all_routes() {
        table.add(&route.pattern(), route);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_pages() {
        let table = route_table();
        assert_eq!(table.resolve("/").unwrap().handler, Route::Dashboard);
        assert_eq!(table.resolve("/admin/login").unwrap().handler, Route::Login);
        assert!(table.resolve("/admin/router").is_none());
    }

    #[test]
    fn create_beats_location_param() {
        let table = route_table();
        assert_eq!(
            table.resolve("/admin/ont/create").unwrap().handler,
            Route::Create(EntityKind::Ont)
        );

        let m = table.resolve("/admin/stb/loc-3").unwrap();
        assert_eq!(m.handler, Route::ListByLocation(EntityKind::Stb));
        assert_eq!(m.param("locationId"), Some("loc-3"));
    }

    #[test]
    fn edit_captures_id() {
        let table = route_table();
        let m = table.resolve("/admin/cable/edit/42?from=list").unwrap();
        assert_eq!(m.handler, Route::Edit(EntityKind::Cable));
        assert_eq!(m.param("id"), Some("42"));
        assert_eq!(Route::edit_path(EntityKind::Cable, "42").as_deref(), Some("/admin/cable/edit/42"));
    }

    #[test]
    fn location_scope_only_for_devices() {
        let table = route_table();
        assert!(table.resolve("/admin/location/3").is_none());
        assert!(table.resolve("/admin/inventory/3").is_none());
        assert_eq!(table.patterns().len(), 2 + 5 * 3 + 2);
    }

    #[test]
    fn titles() {
        assert_eq!(Route::Edit(EntityKind::Location).title(), "Update Location");
        assert_eq!(Route::Create(EntityKind::Stb).title(), "Add Set Top Box");
        assert_eq!(Route::ListByLocation(EntityKind::Ont).entity(), Some(EntityKind::Ont));
    }
}
