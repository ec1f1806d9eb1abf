use std::fmt::{Display, Formatter};

use gatedeck_core::RoleClass;
use serde::{Deserialize, Serialize};

/// Named user preference persisted for a tabular view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceName {
    /// Column key to visibility map.
    ColumnVisibility,
    /// Table density mode.
    DensityMode,
    /// Rows per page.
    PageSize,
}

impl PreferenceName {
    /// Returns the stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ColumnVisibility => "table-columns",
            Self::DensityMode => "compact-mode",
            Self::PageSize => "page-size",
        }
    }
}

/// Storage key segregating preferences by resource type and, where the
/// preference is role-sensitive, by role class.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PreferenceKey(String);

impl PreferenceKey {
    /// Key for the column visibility map of one resource and role.
    #[must_use]
    pub fn column_visibility(resource_type: &str, role: RoleClass) -> Self {
        Self::role_scoped(resource_type, role, PreferenceName::ColumnVisibility)
    }

    /// Key for the density mode of one resource and role.
    #[must_use]
    pub fn density_mode(resource_type: &str, role: RoleClass) -> Self {
        Self::role_scoped(resource_type, role, PreferenceName::DensityMode)
    }

    /// Key for the page size of one resource, shared by every role.
    #[must_use]
    pub fn page_size(resource_type: &str) -> Self {
        Self(format!(
            "{resource_type}:{}",
            PreferenceName::PageSize.as_str()
        ))
    }

    fn role_scoped(resource_type: &str, role: RoleClass, name: PreferenceName) -> Self {
        Self(format!("{resource_type}:{}:{}", role.as_str(), name.as_str()))
    }

    /// Returns the raw storage key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for PreferenceKey {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Row density of a table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DensityMode {
    /// Regular row height with secondary details.
    #[default]
    Comfortable,
    /// Condensed rows.
    Compact,
}

impl DensityMode {
    /// Returns the opposite mode.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Comfortable => Self::Compact,
            Self::Compact => Self::Comfortable,
        }
    }
}
