//! Domain entities and invariants for tabular console views.

#![forbid(unsafe_code)]

mod column;
mod modal;
mod preference;
mod query;
mod record;
mod resource;

pub use column::{ColumnDefinition, ColumnSet, ColumnVisibilityMap};
pub use modal::{ModalKind, ModalPayload};
pub use preference::{DensityMode, PreferenceKey, PreferenceName};
pub use query::{
    DEFAULT_PAGE_SIZE, FilterFormValues, FilterQuery, resolve_page, resolve_page_size,
};
pub use record::{DisplayRecord, ListRecord, RecordId, format_timestamp, parse_timestamp};
pub use resource::{FilterField, ResourceDescriptor, ResourceKind, TimeRangeFilter};
