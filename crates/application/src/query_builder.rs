use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset, TimeZone};
use gatedeck_domain::{
    DEFAULT_PAGE_SIZE, FilterFormValues, FilterQuery, ResourceDescriptor, TimeRangeFilter,
    format_timestamp, parse_timestamp,
};

/// Derives normalized server queries from filter form input.
///
/// Building is pure: the same form, previous query and `now` always produce
/// the same query.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    filter_fields: Vec<String>,
    time_range: Option<TimeRangeFilter>,
}

impl QueryBuilder {
    /// Creates a builder for one resource.
    #[must_use]
    pub fn new(resource: &ResourceDescriptor) -> Self {
        Self {
            filter_fields: resource
                .filter_fields()
                .iter()
                .map(|field| field.name().to_owned())
                .collect(),
            time_range: resource.time_range().cloned(),
        }
    }

    /// Builds the query for the next fetch.
    ///
    /// Pagination is taken from `previous`; absent text filters become empty
    /// strings and an absent or malformed range becomes the default window.
    #[must_use]
    pub fn build(
        &self,
        form: &FilterFormValues,
        previous: &FilterQuery,
        now: DateTime<FixedOffset>,
    ) -> FilterQuery {
        let mut fields: BTreeMap<String, String> = self
            .filter_fields
            .iter()
            .map(|name| (name.clone(), form.field(name).unwrap_or_default().to_owned()))
            .collect();

        if let Some(range) = &self.time_range {
            let (start, end) = form
                .time_range()
                .and_then(|(start, end)| parse_range(start, end, *now.offset()))
                .unwrap_or_else(|| default_window(range, now));
            fields.insert(range.start_field().to_owned(), start.to_string());
            fields.insert(range.end_field().to_owned(), end.to_string());
        }

        FilterQuery {
            page: previous.page.max(1),
            page_size: if previous.page_size == 0 {
                DEFAULT_PAGE_SIZE
            } else {
                previous.page_size
            },
            fields,
        }
    }

    /// Returns the values a freshly mounted filter form displays.
    #[must_use]
    pub fn initial_form(&self, now: DateTime<FixedOffset>) -> FilterFormValues {
        let mut form = FilterFormValues::new();
        for name in &self.filter_fields {
            form.set_field(name.as_str(), "");
        }

        if let Some(range) = &self.time_range {
            let (start, end) = default_window(range, now);
            let offset = *now.offset();
            form.set_time_range(
                format_timestamp(start, offset).unwrap_or_default(),
                format_timestamp(end, offset).unwrap_or_default(),
            );
        }

        form
    }
}

/// Returns `[start of the current calendar day, now + forward buffer]` in
/// epoch seconds.
#[must_use]
pub fn default_window(range: &TimeRangeFilter, now: DateTime<FixedOffset>) -> (i64, i64) {
    let start_of_day = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| now.offset().from_local_datetime(&midnight).single())
        .map_or_else(|| now.timestamp(), |midnight| midnight.timestamp());

    (
        start_of_day,
        now.timestamp()
            .saturating_add(range.forward_buffer_seconds()),
    )
}

fn parse_range(start: &str, end: &str, offset: FixedOffset) -> Option<(i64, i64)> {
    let start = parse_timestamp(start, offset)?;
    let end = parse_timestamp(end, offset)?;
    (start <= end).then_some((start, end))
}
