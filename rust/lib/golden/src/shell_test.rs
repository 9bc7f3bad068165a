//! Page shell golden tests: navigation, forms and list refresh against
//! the HTTP backend.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use netadmin_client::StaticToken;
    use netadmin_core::{AdminConfig, ListParams};
    use netadmin_form::{Draft, FormMode, SubmitOutcome, ValidationErrors};
    use netadmin_inventory::{AdminContext, AdminShell, EntityApis, EntityKind, Page, ShellError};
    use serde_json::{Value, json};

    use crate::GoldenBackend;

    async fn connect() -> (GoldenBackend, AdminShell) {
        let server = GoldenBackend::start().await.unwrap();
        let config = AdminConfig {
            api_endpoint: server.base_url(),
            ..AdminConfig::default()
        };
        let apis = EntityApis::http(&config, Arc::new(StaticToken::new(server.issue_token()))).unwrap();
        (server, AdminShell::new(AdminContext::new(config, apis)))
    }

    fn stb(serial: &str, location: &str) -> Value {
        json!({
            "serialNumber": serial,
            "type": "ZTE B860H",
            "deviceId": "DEV-1",
            "numberWo": "WO-7",
            "locationId": location,
            "unitAddress": "Unit 9",
            "packageName": "Family HD",
            "dateActivation": "2024-03-10",
            "status": "",
            "deviceLocation": "Living room",
            "information": "",
            "notes": "",
            "computedSignal": "-21dBm"
        })
    }

    async fn form_page(shell: &AdminShell, path: &str) -> Box<dyn netadmin_form::FormSession> {
        match shell.navigate(path).await.unwrap() {
            Page::Form { session, .. } => session,
            other => panic!("expected form page, got {:?}", other),
        }
    }

    async fn list_page(shell: &AdminShell, path: &str) -> Vec<Value> {
        match shell.navigate(path).await.unwrap() {
            Page::List { rows, .. } => rows,
            other => panic!("expected list page, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn create_location_then_list() {
        let (server, shell) = connect().await;
        assert!(list_page(&shell, "/admin/location").await.is_empty());

        let form = form_page(&shell, "/admin/location/create").await;
        form.set_field("location", "POP Cilandak").unwrap();
        form.set_field("address", "Jl. TB Simatupang 5").unwrap();
        let SubmitOutcome::Saved(saved) = form.submit().await.unwrap() else {
            panic!("expected Saved");
        };
        assert_eq!(saved.data["location"], "POP Cilandak");
        assert_eq!(form.draft().get("location"), "");

        let rows = list_page(&shell, "/admin/location").await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["address"], "Jl. TB Simatupang 5");
        assert_eq!(server.requests_matching("GET /location"), 2);
        assert_eq!(server.requests_matching("POST /location"), 1);
    }

    #[tokio::test]
    async fn invalid_form_sends_nothing() {
        let (server, shell) = connect().await;
        let form = form_page(&shell, "/admin/ont/create").await;
        form.set_field("serialNumber", "  ").unwrap();

        let outcome = form.submit().await.unwrap();

        let SubmitOutcome::Invalid(errors) = outcome else {
            panic!("expected Invalid");
        };
        assert_eq!(errors.get("serialNumber"), Some("Serial number is required"));
        assert!(!errors.contains("dateActivation"));
        assert_eq!(server.requests_matching("POST /ont"), 0);
        assert_eq!(
            shell.store().get_as::<ValidationErrors>("form/ont/errors").as_deref(),
            Some(&errors)
        );
    }

    #[tokio::test]
    async fn edit_stb_sends_one_update() {
        let (server, shell) = connect().await;
        let id = server.seed("stb", stb("STB-1", "L1"));

        let form = form_page(&shell, &format!("/admin/stb/edit/{}", id)).await;
        assert_eq!(form.mode(), FormMode::Update);
        assert_eq!(form.draft().get("packageName"), "Family HD");
        assert!(!form.draft().values().contains_key("computedSignal"));

        form.set_field("status", "Active").unwrap();
        assert!(form.is_dirty());
        assert!(matches!(form.submit().await.unwrap(), SubmitOutcome::Saved(_)));
        assert!(!form.is_dirty());

        assert_eq!(server.requests_matching(&format!("PUT /stb/{}", id)), 1);
        assert_eq!(server.requests_matching("POST /stb"), 0);
        let stored = server.record("stb", &id).unwrap();
        assert_eq!(stored["status"], "Active");
        assert_eq!(stored["computedSignal"], "-21dBm");
        assert!(stored.get("id").is_some());
    }

    #[tokio::test]
    async fn double_submit_sends_one_request() {
        let (server, shell) = connect().await;
        let id = server.seed("stb", stb("STB-2", "L1"));
        let form = form_page(&shell, &format!("/admin/stb/edit/{}", id)).await;
        server.set_latency(Duration::from_millis(40));

        let (first, second) = tokio::join!(form.submit(), form.submit());

        assert!(matches!(first.unwrap(), SubmitOutcome::Saved(_)));
        assert!(matches!(second.unwrap(), SubmitOutcome::Busy));
        assert!(!form.is_busy());
        assert_eq!(server.requests_matching("PUT /stb"), 1);
    }

    #[tokio::test]
    async fn backend_rejection_surfaces_as_error() {
        let (server, shell) = connect().await;
        server.seed("stb", stb("TAKEN", "L1"));

        let form = form_page(&shell, "/admin/stb/create").await;
        let fields = stb("TAKEN", "L2");
        for field in &form.schema().fields {
            let value = fields[field.name].as_str().unwrap_or_default();
            form.set_field(field.name, value).unwrap();
        }

        let err = form.submit().await.unwrap_err();
        assert_eq!(err.to_string(), "HTTP 409: serial number TAKEN already registered");
        assert!(!form.is_busy());
        assert_eq!(form.draft().get("serialNumber"), "TAKEN");
        assert_eq!(server.count("stb"), 1);
    }

    #[tokio::test]
    async fn location_scoped_list_and_delete() {
        let (server, shell) = connect().await;
        server.seed("stb", stb("A", "L1"));
        let gone = server.seed("stb", stb("B", "L1"));
        server.seed("stb", stb("C", "L2"));

        let Page::List { rows, location_id, entity } = shell.navigate("/admin/stb/L1").await.unwrap() else {
            panic!("expected list page");
        };
        assert_eq!((entity, location_id.as_deref()), (EntityKind::Stb, Some("L1")));
        assert_eq!(rows.len(), 2);

        shell.delete(EntityKind::Stb, &gone).await.unwrap();

        let rows = shell.list(EntityKind::Stb, &ListParams::by_location("L1")).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["serialNumber"], "A");
        assert_eq!(server.requests_matching("GET /stb"), 2);
    }

    #[tokio::test]
    async fn inventory_dates_are_cross_checked() {
        let (server, shell) = connect().await;
        let form = form_page(&shell, "/admin/inventory/create").await;
        for (k, v) in [
            ("name", "ONT ZTE F670L"),
            ("category", "CPE"),
            ("quantity", "12"),
            ("locationId", "L1"),
            ("dateIn", "2024-06-10"),
            ("dateOut", "2024-06-01"),
        ] {
            form.set_field(k, v).unwrap();
        }

        let SubmitOutcome::Invalid(errors) = form.submit().await.unwrap() else {
            panic!("expected Invalid");
        };
        assert_eq!(errors.fields().collect::<Vec<_>>(), vec!["dateOut"]);

        form.set_field("dateOut", "2024-06-30").unwrap();
        let SubmitOutcome::Saved(saved) = form.submit().await.unwrap() else {
            panic!("expected Saved");
        };
        assert_eq!(saved.data["quantity"], 12);
        assert_eq!(server.count("inventory"), 1);
    }

    #[tokio::test]
    async fn navigation_state_is_published() {
        let (_, shell) = connect().await;
        shell.navigate("/admin/cable/create").await.unwrap();

        assert_eq!(shell.current_route().as_deref(), Some("/admin/cable/create"));
        assert_eq!(
            shell.store().get_as::<String>("app/page").as_deref().map(String::as_str),
            Some("Add Cable")
        );
        let draft = shell.store().get_as::<Draft>("form/cable/draft").unwrap();
        assert_eq!(draft.id(), None);
        assert!(!draft.get("dateInstalled").is_empty());

        let err = shell.navigate("/admin/router").await.unwrap_err();
        assert!(matches!(err, ShellError::NotFound(_)));
    }
}
