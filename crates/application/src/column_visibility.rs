use gatedeck_core::RoleClass;
use gatedeck_domain::{ColumnDefinition, ColumnSet, ColumnVisibilityMap};

/// Computes the effective column visibility of one view.
///
/// The pipeline is always `compute_defaults → merge → enforce`: defaults make
/// the map complete, the merge keeps user choices, and the final enforce pass
/// keeps privileged columns away from roles that lack the privilege.
#[derive(Debug, Clone)]
pub struct ColumnVisibilityManager {
    columns: ColumnSet,
}

impl ColumnVisibilityManager {
    /// Creates a manager for a column set.
    #[must_use]
    pub fn new(columns: ColumnSet) -> Self {
        Self { columns }
    }

    /// Returns the managed columns.
    #[must_use]
    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    /// Returns the role's default map covering every known column.
    #[must_use]
    pub fn compute_defaults(&self, role: RoleClass) -> ColumnVisibilityMap {
        self.columns
            .columns()
            .iter()
            .map(|column| {
                let visible = column.is_default_visible()
                    && (!column.is_privileged() || role.is_privileged());
                (column.key(), visible)
            })
            .collect()
    }

    /// Overlays persisted choices on defaults.
    ///
    /// Only keys present in `defaults` survive, so stored entries for columns
    /// that no longer exist are dropped.
    #[must_use]
    pub fn merge(
        defaults: &ColumnVisibilityMap,
        persisted: &ColumnVisibilityMap,
    ) -> ColumnVisibilityMap {
        defaults
            .iter()
            .map(|(key, default_visible)| (key, persisted.get(key).unwrap_or(default_visible)))
            .collect()
    }

    /// Forces privileged columns hidden for roles without the privilege.
    #[must_use]
    pub fn enforce(&self, map: &ColumnVisibilityMap, role: RoleClass) -> ColumnVisibilityMap {
        map.iter()
            .map(|(key, visible)| {
                let restricted = !role.is_privileged()
                    && self
                        .columns
                        .get(key)
                        .is_some_and(ColumnDefinition::is_privileged);
                (key, visible && !restricted)
            })
            .collect()
    }

    /// Returns a copy with one known column updated; unknown keys are ignored.
    #[must_use]
    pub fn set_column(
        &self,
        map: &ColumnVisibilityMap,
        key: &str,
        visible: bool,
    ) -> ColumnVisibilityMap {
        let mut updated = map.clone();
        if self.columns.contains(key) {
            updated.set(key, visible);
        }
        updated
    }

    /// Sets every known column, then re-applies the role restriction.
    #[must_use]
    pub fn set_all(
        &self,
        map: &ColumnVisibilityMap,
        visible: bool,
        role: RoleClass,
    ) -> ColumnVisibilityMap {
        let mut updated = map.clone();
        for key in self.columns.keys() {
            updated.set(key, visible);
        }
        self.enforce(&updated, role)
    }

    /// Runs the full pipeline for a role and its persisted overrides.
    #[must_use]
    pub fn resolve(&self, role: RoleClass, persisted: &ColumnVisibilityMap) -> ColumnVisibilityMap {
        let defaults = self.compute_defaults(role);
        let merged = Self::merge(&defaults, persisted);
        self.enforce(&merged, role)
    }

    /// Returns visible columns in display order.
    #[must_use]
    pub fn visible_columns(&self, map: &ColumnVisibilityMap) -> Vec<ColumnDefinition> {
        self.columns
            .columns()
            .iter()
            .filter(|column| map.is_visible(column.key()))
            .cloned()
            .collect()
    }
}
