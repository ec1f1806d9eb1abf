use gatedeck_domain::{ColumnDefinition, ColumnSet, ColumnVisibilityMap, DensityMode, PreferenceKey};

use super::TableViewController;

impl TableViewController {
    /// Returns every column the resource defines, in display order.
    #[must_use]
    pub fn column_definitions(&self) -> &ColumnSet {
        self.columns.columns()
    }

    /// Returns the effective visibility map.
    #[must_use]
    pub fn column_visibility(&self) -> ColumnVisibilityMap {
        let state = self.lock_state();
        self.columns.enforce(&state.visibility, self.role)
    }

    /// Returns the visible columns in display order.
    #[must_use]
    pub fn visible_columns(&self) -> Vec<ColumnDefinition> {
        self.columns.visible_columns(&self.column_visibility())
    }

    /// Shows or hides one column and persists the result.
    pub async fn toggle_column(&self, key: &str, visible: bool) -> ColumnVisibilityMap {
        let updated = {
            let mut state = self.lock_state();
            let updated = self.columns.enforce(
                &self.columns.set_column(&state.visibility, key, visible),
                self.role,
            );
            state.visibility = updated.clone();
            updated
        };
        self.persist_visibility().await;
        updated
    }

    /// Shows or hides every column the role may see and persists the result.
    pub async fn select_all(&self, visible: bool) -> ColumnVisibilityMap {
        let updated = {
            let mut state = self.lock_state();
            let updated = self.columns.set_all(&state.visibility, visible, self.role);
            state.visibility = updated.clone();
            updated
        };
        self.persist_visibility().await;
        updated
    }

    /// Restores and persists the role defaults.
    pub async fn reset_columns(&self) -> ColumnVisibilityMap {
        let defaults = self.columns.resolve(self.role, &ColumnVisibilityMap::new());
        self.lock_state().visibility = defaults.clone();
        self.persist_visibility().await;
        defaults
    }

    /// Returns the current density mode.
    #[must_use]
    pub fn density(&self) -> DensityMode {
        self.lock_state().density
    }

    /// Sets and persists the density mode.
    pub async fn set_density(&self, density: DensityMode) {
        self.lock_state().density = density;
        self.persist_density().await;
    }

    /// Flips the density mode and returns the new one.
    pub async fn toggle_density(&self) -> DensityMode {
        let density = {
            let mut state = self.lock_state();
            state.density = state.density.toggled();
            state.density
        };
        self.persist_density().await;
        density
    }

    // Writes are serialized and each stores the state current at write time.
    async fn persist_visibility(&self) {
        let _write = self.preference_writes.lock().await;
        let latest = self.lock_state().visibility.clone();
        self.preferences
            .save(
                &PreferenceKey::column_visibility(self.resource.resource_type(), self.role),
                &latest,
            )
            .await;
    }

    async fn persist_density(&self) {
        let _write = self.preference_writes.lock().await;
        let latest = self.lock_state().density;
        self.preferences
            .save(
                &PreferenceKey::density_mode(self.resource.resource_type(), self.role),
                &latest,
            )
            .await;
    }
}
