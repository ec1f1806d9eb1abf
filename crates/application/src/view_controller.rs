//! Composition root for one paginated, filterable table view.
//!
//! A controller owns every piece of state a table screen renders: the
//! current page, the filter form, the effective column visibility, density
//! and secondary dialogs. Handlers take `&self` so a rendering layer can
//! trigger overlapping fetches; the fetch coordinator decides which response
//! wins.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use gatedeck_core::RoleClass;
use gatedeck_domain::{
    ColumnVisibilityMap, DensityMode, FilterFormValues, FilterQuery, PreferenceKey,
    ResourceDescriptor, resolve_page_size,
};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};

use crate::{
    Clipboard, Clock, ColumnVisibilityManager, FetchCoordinator, FetchPhase, IdentityProvider,
    ListDataSource, ModalOrchestrator, Notifier, PreferenceStorage, PreferenceStore, QueryBuilder,
    ViewState,
};

mod columns;
mod filters;
mod modals;
mod paging;

pub use modals::CopyOutcome;

/// Ports a table view controller talks to.
#[derive(Clone)]
pub struct ViewControllerPorts {
    /// Paginated list endpoint.
    pub data_source: Arc<dyn ListDataSource>,
    /// Durable preference storage.
    pub storage: Arc<dyn PreferenceStorage>,
    /// Toast notifications.
    pub notifier: Arc<dyn Notifier>,
    /// System clipboard.
    pub clipboard: Arc<dyn Clipboard>,
    /// Signed-in user.
    pub identity: Arc<dyn IdentityProvider>,
    /// Wall clock in the display offset.
    pub clock: Arc<dyn Clock>,
}

struct ControllerState {
    fetch: FetchCoordinator,
    visibility: ColumnVisibilityMap,
    density: DensityMode,
    form: FilterFormValues,
    last_query: FilterQuery,
    modals: ModalOrchestrator,
}

/// State and handlers behind one table screen.
pub struct TableViewController {
    resource: ResourceDescriptor,
    role: RoleClass,
    columns: ColumnVisibilityManager,
    query_builder: QueryBuilder,
    preferences: PreferenceStore,
    form_defaults: FilterFormValues,
    data_source: Arc<dyn ListDataSource>,
    notifier: Arc<dyn Notifier>,
    clipboard: Arc<dyn Clipboard>,
    clock: Arc<dyn Clock>,
    state: Mutex<ControllerState>,
    preference_writes: AsyncMutex<()>,
}

impl TableViewController {
    /// Builds a controller and issues the first fetch.
    ///
    /// The role is resolved first because it selects both the preference
    /// scope and the endpoint. Failing identity lookups degrade to the
    /// self-scoped role.
    pub async fn initialize(resource: ResourceDescriptor, ports: ViewControllerPorts) -> Self {
        let role = match ports.identity.current_identity().await {
            Ok(identity) => {
                debug!(
                    subject = identity.subject(),
                    display_name = identity.display_name(),
                    "resolved console identity"
                );
                identity.role()
            }
            Err(error) => {
                warn!(error = %error, "identity lookup failed, falling back to self-scoped role");
                RoleClass::SelfScoped
            }
        };

        let resource_type = resource.resource_type().to_owned();
        let preferences = PreferenceStore::new(ports.storage);
        let page_size = resolve_page_size(
            preferences
                .load::<i64>(&PreferenceKey::page_size(&resource_type))
                .await,
        );

        let columns = ColumnVisibilityManager::new(resource.columns().clone());
        let visibility_key = PreferenceKey::column_visibility(&resource_type, role);
        let visibility = match preferences
            .load::<ColumnVisibilityMap>(&visibility_key)
            .await
        {
            Some(persisted) => columns.resolve(role, &persisted),
            None => {
                let defaults = columns.resolve(role, &ColumnVisibilityMap::new());
                preferences.save(&visibility_key, &defaults).await;
                defaults
            }
        };

        let density = preferences
            .load::<DensityMode>(&PreferenceKey::density_mode(&resource_type, role))
            .await
            .unwrap_or_default();

        let now = ports.clock.now();
        let query_builder = QueryBuilder::new(&resource);
        let form_defaults = query_builder.initial_form(now);

        info!(
            resource = %resource_type,
            role = role.as_str(),
            page_size,
            density = ?density,
            "table view initialized"
        );

        let controller = Self {
            role,
            columns,
            query_builder,
            preferences,
            data_source: ports.data_source,
            notifier: ports.notifier,
            clipboard: ports.clipboard,
            clock: ports.clock,
            state: Mutex::new(ControllerState {
                fetch: FetchCoordinator::new(page_size, *now.offset()),
                visibility,
                density,
                form: form_defaults.clone(),
                last_query: FilterQuery::first_page(page_size),
                modals: ModalOrchestrator::new(),
            }),
            preference_writes: AsyncMutex::new(()),
            form_defaults,
            resource,
        };

        controller.load_page(1, page_size).await;
        controller
    }

    /// Returns the resource this view lists.
    #[must_use]
    pub fn resource(&self) -> &ResourceDescriptor {
        &self.resource
    }

    /// Returns the role the view was resolved for.
    #[must_use]
    pub fn role(&self) -> RoleClass {
        self.role
    }

    /// Returns a snapshot of the rendered list state.
    #[must_use]
    pub fn view_state(&self) -> ViewState {
        self.lock_state().fetch.view().clone()
    }

    /// Returns whether a fetch is outstanding.
    #[must_use]
    pub fn phase(&self) -> FetchPhase {
        self.lock_state().fetch.phase()
    }

    fn lock_state(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests;
