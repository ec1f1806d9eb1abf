use gatedeck_core::{AppError, AppResult};
use gatedeck_domain::{FilterFormValues, FilterQuery};

use super::TableViewController;

impl TableViewController {
    /// Sets one free-text filter field.
    pub fn set_filter_field(&self, name: &str, value: impl Into<String>) -> AppResult<()> {
        if !self.resource.has_filter_field(name) {
            return Err(AppError::Validation(format!(
                "resource '{}' has no filter field '{name}'",
                self.resource.resource_type()
            )));
        }

        self.lock_state().form.set_field(name, value);
        Ok(())
    }

    /// Sets the raw time range bounds as `YYYY-MM-DD HH:MM:SS` strings.
    ///
    /// Unparseable bounds are accepted here and replaced by the default
    /// window when the query is built.
    pub fn set_time_range(
        &self,
        start: impl Into<String>,
        end: impl Into<String>,
    ) -> AppResult<()> {
        if self.resource.time_range().is_none() {
            return Err(AppError::Validation(format!(
                "resource '{}' has no time range filter",
                self.resource.resource_type()
            )));
        }

        self.lock_state().form.set_time_range(start, end);
        Ok(())
    }

    /// Clears the time range so the default window applies.
    pub fn clear_time_range(&self) {
        self.lock_state().form.clear_time_range();
    }

    /// Restores the values the form had when the view was mounted.
    pub fn reset_filters(&self) {
        self.lock_state().form = self.form_defaults.clone();
    }

    /// Returns the current filter form values.
    #[must_use]
    pub fn filter_form(&self) -> FilterFormValues {
        self.lock_state().form.clone()
    }

    /// Returns the values the form was mounted with.
    #[must_use]
    pub fn filter_form_defaults(&self) -> &FilterFormValues {
        &self.form_defaults
    }

    /// Returns the most recently issued query.
    #[must_use]
    pub fn last_query(&self) -> FilterQuery {
        self.lock_state().last_query.clone()
    }
}
