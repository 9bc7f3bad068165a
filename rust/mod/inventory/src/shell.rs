use std::fmt;
use std::sync::Arc;

use netadmin_client::{ApiError, ResourceApi, ResourceClient, TokenSource, http_client};
use netadmin_core::{AdminConfig, ListParams};
use netadmin_flux::{RouteTable, StateStore};
use netadmin_form::{FormController, FormError, FormMode, FormSession};
use netadmin_query::{MutationRequest, QueryCache, QueryError, ResourceHooks};
use serde_json::Value;
use tracing::{info, warn};

use crate::menu::{MenuItem, menu};
use crate::model::{Cable, EntityKind, InventoryItem, Location, Ont, Stb};
use crate::routes::{Route, route_table};

#[derive(Debug, thiserror::Error)]
pub enum ShellError {
    #[error("no page at '{0}'")]
    NotFound(String),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error("encode record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// One client per entity collection.
pub struct EntityApis {
    pub locations: Arc<dyn ResourceApi<Location>>,
    pub cables: Arc<dyn ResourceApi<Cable>>,
    pub onts: Arc<dyn ResourceApi<Ont>>,
    pub stbs: Arc<dyn ResourceApi<Stb>>,
    pub inventory: Arc<dyn ResourceApi<InventoryItem>>,
}

impl EntityApis {
    /// HTTP clients against `config.api_endpoint`, sharing one connection
    /// pool and token source.
    pub fn http(config: &AdminConfig, token: Arc<dyn TokenSource>) -> Result<Self, ApiError> {
        let http = http_client(config)?;
        let base = config.api_endpoint.as_str();
        Ok(Self {
            locations: Arc::new(ResourceClient::<Location>::with_http(http.clone(), base, token.clone())),
            cables: Arc::new(ResourceClient::<Cable>::with_http(http.clone(), base, token.clone())),
            onts: Arc::new(ResourceClient::<Ont>::with_http(http.clone(), base, token.clone())),
            stbs: Arc::new(ResourceClient::<Stb>::with_http(http.clone(), base, token.clone())),
            inventory: Arc::new(ResourceClient::<InventoryItem>::with_http(http, base, token)),
        })
    }
}

/// Everything a page needs: the store renderers observe, the shared query
/// cache and one hook set per entity.
pub struct AdminContext {
    pub config: AdminConfig,
    pub store: Arc<StateStore>,
    pub cache: Arc<QueryCache>,
    pub locations: ResourceHooks<Location>,
    pub cables: ResourceHooks<Cable>,
    pub onts: ResourceHooks<Ont>,
    pub stbs: ResourceHooks<Stb>,
    pub inventory: ResourceHooks<InventoryItem>,
}

impl AdminContext {
    pub fn new(config: AdminConfig, apis: EntityApis) -> Self {
        let store = Arc::new(StateStore::new());
        let cache = Arc::new(QueryCache::new(store.clone(), config.stale_time()));
        Self {
            locations: ResourceHooks::new(apis.locations, cache.clone()),
            cables: ResourceHooks::new(apis.cables, cache.clone()),
            onts: ResourceHooks::new(apis.onts, cache.clone()),
            stbs: ResourceHooks::new(apis.stbs, cache.clone()),
            inventory: ResourceHooks::new(apis.inventory, cache.clone()),
            config,
            store,
            cache,
        }
    }
}

/// Run `$body` with `$hooks` bound to the hook set of `$kind`.
macro_rules! with_hooks {
    ($ctx:expr, $kind:expr, |$hooks:ident| $body:expr) => {
        match $kind {
            EntityKind::Location => {
                let $hooks = &$ctx.locations;
                $body
            }
            EntityKind::Cable => {
                let $hooks = &$ctx.cables;
                $body
            }
            EntityKind::Ont => {
                let $hooks = &$ctx.onts;
                $body
            }
            EntityKind::Stb => {
                let $hooks = &$ctx.stbs;
                $body
            }
            EntityKind::Inventory => {
                let $hooks = &$ctx.inventory;
                $body
            }
        }
    };
}

/// What the shell shows for a path.
pub enum Page {
    Login,
    Dashboard {
        menu: Vec<MenuItem>,
    },
    List {
        entity: EntityKind,
        location_id: Option<String>,
        rows: Vec<Value>,
    },
    Form {
        entity: EntityKind,
        mode: FormMode,
        session: Box<dyn FormSession>,
    },
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Page::Login => f.write_str("Login"),
            Page::Dashboard { menu } => f.debug_struct("Dashboard").field("menu", menu).finish(),
            Page::List {
                entity,
                location_id,
                rows,
            } => f
                .debug_struct("List")
                .field("entity", entity)
                .field("location_id", location_id)
                .field("rows", &rows.len())
                .finish(),
            Page::Form { entity, mode, session } => f
                .debug_struct("Form")
                .field("entity", entity)
                .field("mode", mode)
                .field("draft", &session.draft())
                .finish(),
        }
    }
}

/// Resolves paths to pages and wires pages to the data layer.
///
/// The current route and page title are published to `app/route` and
/// `app/page`.
pub struct AdminShell {
    ctx: AdminContext,
    routes: RouteTable<Route>,
}

impl AdminShell {
    pub fn new(ctx: AdminContext) -> Self {
        Self {
            ctx,
            routes: route_table(),
        }
    }

    pub fn context(&self) -> &AdminContext {
        &self.ctx
    }

    pub fn store(&self) -> &Arc<StateStore> {
        &self.ctx.store
    }

    pub fn menu(&self) -> Vec<MenuItem> {
        menu()
    }

    pub fn routes(&self) -> &RouteTable<Route> {
        &self.routes
    }

    /// Path of the page last navigated to.
    pub fn current_route(&self) -> Option<String> {
        self.ctx.store.get_as::<String>("app/route").map(|p| (*p).clone())
    }

    /// Resolve `path` and build its page.
    ///
    /// Edit pages load the record through the query cache before the form
    /// is initialized.
    pub async fn navigate(&self, path: &str) -> Result<Page, ShellError> {
        let Some(m) = self.routes.resolve(path) else {
            warn!(path, "no route");
            return Err(ShellError::NotFound(path.to_string()));
        };
        let route = m.handler;
        info!(path, page = %route.title(), "navigate");
        self.ctx.store.set("app/route", path.to_string());
        self.ctx.store.set("app/page", route.title());

        Ok(match route {
            Route::Login => Page::Login,
            Route::Dashboard => Page::Dashboard { menu: menu() },
            Route::List(entity) => Page::List {
                entity,
                location_id: None,
                rows: self.list(entity, &ListParams::default()).await?,
            },
            Route::ListByLocation(entity) => {
                let location_id = m.param("locationId").unwrap_or_default().to_string();
                let rows = self.list(entity, &ListParams::by_location(location_id.clone())).await?;
                Page::List {
                    entity,
                    location_id: Some(location_id),
                    rows,
                }
            }
            Route::Create(entity) => Page::Form {
                entity,
                mode: FormMode::Create,
                session: self.open_form(entity, None).await?,
            },
            Route::Edit(entity) => {
                let id = m.param("id").unwrap_or_default();
                Page::Form {
                    entity,
                    mode: FormMode::Update,
                    session: self.open_form(entity, Some(id)).await?,
                }
            }
        })
    }

    /// Rows of `entity` as JSON, through the query cache.
    pub async fn list(&self, entity: EntityKind, params: &ListParams) -> Result<Vec<Value>, ShellError> {
        with_hooks!(self.ctx, entity, |hooks| {
            let rows = hooks.list(params).await?;
            rows.iter()
                .map(|r| serde_json::to_value(r).map_err(ShellError::from))
                .collect()
        })
    }

    /// One record of `entity` as JSON, through the query cache.
    pub async fn get(&self, entity: EntityKind, id: &str) -> Result<Value, ShellError> {
        with_hooks!(self.ctx, entity, |hooks| {
            let record = hooks.by_id(id).await?;
            Ok(serde_json::to_value(&*record)?)
        })
    }

    /// Form for a new record, or for record `id` loaded from the backend.
    pub async fn open_form(&self, entity: EntityKind, id: Option<&str>) -> Result<Box<dyn FormSession>, ShellError> {
        with_hooks!(self.ctx, entity, |hooks| {
            let form = FormController::new(entity.schema(), hooks.mutation(), self.ctx.store.clone());
            match id {
                Some(id) => {
                    let record = hooks.by_id(id).await?;
                    form.initialize(FormMode::Update, Some(&*record))?;
                }
                None => form.initialize(FormMode::Create, None)?,
            }
            Ok(Box::new(form) as Box<dyn FormSession>)
        })
    }

    /// Delete record `id`; the entity's cached reads are invalidated.
    pub async fn delete(&self, entity: EntityKind, id: &str) -> Result<(), ShellError> {
        with_hooks!(self.ctx, entity, |hooks| {
            hooks
                .mutation()
                .mutate_async(MutationRequest::Delete { id: id.to_string() })
                .await?;
            Ok(())
        })
    }
}
