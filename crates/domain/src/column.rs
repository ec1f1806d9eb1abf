use std::collections::{BTreeMap, HashSet};

use gatedeck_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

/// One column of a tabular view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    key: NonEmptyString,
    label: String,
    privileged: bool,
    default_visible: bool,
}

impl ColumnDefinition {
    /// Creates a validated column definition.
    ///
    /// A privileged column is never shown to callers without the privileged
    /// role, whatever their stored preferences say.
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        privileged: bool,
        default_visible: bool,
    ) -> AppResult<Self> {
        let label = label.into().trim().to_owned();
        let key = NonEmptyString::new(key)?;

        Ok(Self {
            label: if label.is_empty() {
                key.as_str().to_owned()
            } else {
                label
            },
            key,
            privileged,
            default_visible,
        })
    }

    /// Returns the stable column key.
    #[must_use]
    pub fn key(&self) -> &str {
        self.key.as_str()
    }

    /// Returns the display label.
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_str()
    }

    /// Returns whether the column is restricted to privileged roles.
    #[must_use]
    pub fn is_privileged(&self) -> bool {
        self.privileged
    }

    /// Returns whether the column is visible before any user choice.
    #[must_use]
    pub fn is_default_visible(&self) -> bool {
        self.default_visible
    }
}

/// Ordered, duplicate-free set of columns known to a view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSet {
    columns: Vec<ColumnDefinition>,
}

impl ColumnSet {
    /// Creates a validated column set.
    pub fn new(columns: Vec<ColumnDefinition>) -> AppResult<Self> {
        if columns.is_empty() {
            return Err(AppError::Validation(
                "column sets must include at least one column".to_owned(),
            ));
        }

        let mut seen_keys = HashSet::new();
        for column in &columns {
            if !seen_keys.insert(column.key()) {
                return Err(AppError::Validation(format!(
                    "duplicate column key '{}'",
                    column.key()
                )));
            }
        }

        Ok(Self { columns })
    }

    /// Returns columns in display order.
    #[must_use]
    pub fn columns(&self) -> &[ColumnDefinition] {
        &self.columns
    }

    /// Looks up a column by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ColumnDefinition> {
        self.columns.iter().find(|column| column.key() == key)
    }

    /// Returns whether the key belongs to this set.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Returns column keys in display order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(ColumnDefinition::key)
    }
}

/// Column key to visibility flag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnVisibilityMap(BTreeMap<String, bool>);

impl ColumnVisibilityMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored flag for a key, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<bool> {
        self.0.get(key).copied()
    }

    /// Returns whether the key is present and visible.
    #[must_use]
    pub fn is_visible(&self, key: &str) -> bool {
        self.get(key).unwrap_or(false)
    }

    /// Sets the flag for a key.
    pub fn set(&mut self, key: impl Into<String>, visible: bool) {
        self.0.insert(key.into(), visible);
    }

    /// Returns whether the key is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Iterates entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.0.iter().map(|(key, visible)| (key.as_str(), *visible))
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, bool)> for ColumnVisibilityMap {
    fn from_iter<I: IntoIterator<Item = (K, bool)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, visible)| (key.into(), visible))
                .collect(),
        )
    }
}
