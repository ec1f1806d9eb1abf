use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Page size used when neither the caller nor storage provides a valid one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Resolves a requested page size, falling back to the default for absent,
/// zero or negative values.
#[must_use]
pub fn resolve_page_size(value: Option<i64>) -> u32 {
    match value {
        Some(size) if size > 0 => u32::try_from(size).unwrap_or(u32::MAX),
        _ => DEFAULT_PAGE_SIZE,
    }
}

/// Resolves a requested page number; pages are 1-based.
#[must_use]
pub fn resolve_page(value: Option<i64>) -> u32 {
    match value {
        Some(page) if page > 0 => u32::try_from(page).unwrap_or(u32::MAX),
        _ => 1,
    }
}

/// Normalized server query for one list fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterQuery {
    /// 1-based page number.
    pub page: u32,
    /// Rows per page, always positive.
    pub page_size: u32,
    /// Filter values keyed by transport field name.
    pub fields: BTreeMap<String, String>,
}

impl FilterQuery {
    /// Creates an unfiltered query for the first page.
    #[must_use]
    pub fn first_page(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            fields: BTreeMap::new(),
        }
        .with_page_size(page_size)
    }

    /// Returns a copy targeting another page.
    #[must_use]
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    /// Returns a copy with another page size.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = if page_size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            page_size
        };
        self
    }

    /// Returns one filter value.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

impl Default for FilterQuery {
    fn default() -> Self {
        Self::first_page(DEFAULT_PAGE_SIZE)
    }
}

/// Transient values of a filter form as entered by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterFormValues {
    fields: BTreeMap<String, String>,
    time_range: Option<(String, String)>,
}

impl FilterFormValues {
    /// Creates an empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a free-text field.
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Returns a free-text field value.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Sets the raw range bounds, formatted as `YYYY-MM-DD HH:MM:SS`.
    pub fn set_time_range(&mut self, start: impl Into<String>, end: impl Into<String>) {
        self.time_range = Some((start.into(), end.into()));
    }

    /// Removes the range so the default window applies.
    pub fn clear_time_range(&mut self) {
        self.time_range = None;
    }

    /// Returns the raw range bounds, if entered.
    #[must_use]
    pub fn time_range(&self) -> Option<(&str, &str)> {
        self.time_range
            .as_ref()
            .map(|(start, end)| (start.as_str(), end.as_str()))
    }
}
