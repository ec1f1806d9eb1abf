use std::collections::HashSet;
use std::str::FromStr;

use gatedeck_core::{AppError, AppResult, NonEmptyString, RoleClass};
use serde::{Deserialize, Serialize};

use crate::{ColumnDefinition, ColumnSet, FilterQuery};

const RESERVED_PARAMETERS: &[&str] = &["p", "page_size"];

/// Free-text filter accepted by a list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterField {
    name: NonEmptyString,
    privileged: bool,
}

impl FilterField {
    /// Creates a validated filter field.
    ///
    /// Privileged fields are only sent to the privileged endpoint.
    pub fn new(name: impl Into<String>, privileged: bool) -> AppResult<Self> {
        Ok(Self {
            name: NonEmptyString::new(name)?,
            privileged,
        })
    }

    /// Returns the transport field name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Returns whether the field is restricted to privileged callers.
    #[must_use]
    pub fn is_privileged(&self) -> bool {
        self.privileged
    }
}

/// Required time window filter with its default forward buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRangeFilter {
    start_field: NonEmptyString,
    end_field: NonEmptyString,
    forward_buffer_seconds: i64,
}

impl TimeRangeFilter {
    /// Creates a validated time range filter.
    pub fn new(
        start_field: impl Into<String>,
        end_field: impl Into<String>,
        forward_buffer_seconds: i64,
    ) -> AppResult<Self> {
        if forward_buffer_seconds < 0 {
            return Err(AppError::Validation(
                "time range forward buffer must not be negative".to_owned(),
            ));
        }

        let start_field = NonEmptyString::new(start_field)?;
        let end_field = NonEmptyString::new(end_field)?;
        if start_field == end_field {
            return Err(AppError::Validation(
                "time range start and end fields must differ".to_owned(),
            ));
        }

        Ok(Self {
            start_field,
            end_field,
            forward_buffer_seconds,
        })
    }

    /// Returns the transport name of the range start.
    #[must_use]
    pub fn start_field(&self) -> &str {
        self.start_field.as_str()
    }

    /// Returns the transport name of the range end.
    #[must_use]
    pub fn end_field(&self) -> &str {
        self.end_field.as_str()
    }

    /// Returns how far past `now` the default window extends.
    #[must_use]
    pub fn forward_buffer_seconds(&self) -> i64 {
        self.forward_buffer_seconds
    }
}

/// Static description of one paginated list resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    resource_type: NonEmptyString,
    columns: ColumnSet,
    filter_fields: Vec<FilterField>,
    time_range: Option<TimeRangeFilter>,
    privileged_endpoint: NonEmptyString,
    self_scoped_endpoint: Option<NonEmptyString>,
}

impl ResourceDescriptor {
    /// Creates a validated resource descriptor.
    pub fn new(
        resource_type: impl Into<String>,
        columns: ColumnSet,
        filter_fields: Vec<FilterField>,
        time_range: Option<TimeRangeFilter>,
        privileged_endpoint: impl Into<String>,
        self_scoped_endpoint: Option<String>,
    ) -> AppResult<Self> {
        let mut seen_fields: HashSet<&str> = RESERVED_PARAMETERS.iter().copied().collect();
        let range_fields = time_range
            .iter()
            .flat_map(|range| [range.start_field(), range.end_field()]);

        for name in filter_fields.iter().map(FilterField::name).chain(range_fields) {
            if !seen_fields.insert(name) {
                return Err(AppError::Validation(format!(
                    "filter field '{name}' is duplicated or reserved"
                )));
            }
        }

        Ok(Self {
            resource_type: NonEmptyString::new(resource_type)?,
            columns,
            filter_fields,
            time_range,
            privileged_endpoint: NonEmptyString::new(privileged_endpoint)?,
            self_scoped_endpoint: self_scoped_endpoint
                .map(NonEmptyString::new)
                .transpose()?,
        })
    }

    /// Returns the stable resource type used in preference keys.
    #[must_use]
    pub fn resource_type(&self) -> &str {
        self.resource_type.as_str()
    }

    /// Returns the known columns.
    #[must_use]
    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    /// Returns the free-text filters.
    #[must_use]
    pub fn filter_fields(&self) -> &[FilterField] {
        &self.filter_fields
    }

    /// Returns the optional time window filter.
    #[must_use]
    pub fn time_range(&self) -> Option<&TimeRangeFilter> {
        self.time_range.as_ref()
    }

    /// Returns whether `name` is one of the free-text filters.
    #[must_use]
    pub fn has_filter_field(&self, name: &str) -> bool {
        self.filter_fields.iter().any(|field| field.name() == name)
    }

    /// Selects the list endpoint for a role.
    pub fn endpoint_for(&self, role: RoleClass) -> AppResult<&str> {
        if role.is_privileged() {
            return Ok(self.privileged_endpoint.as_str());
        }

        self.self_scoped_endpoint
            .as_ref()
            .map(NonEmptyString::as_str)
            .ok_or_else(|| {
                AppError::Forbidden(format!(
                    "resource '{}' is only available to privileged roles",
                    self.resource_type.as_str()
                ))
            })
    }

    /// Returns the query parameters sent for a role, in transport order.
    ///
    /// Privileged filter values are dropped for self-scoped callers.
    #[must_use]
    pub fn transport_parameters(
        &self,
        role: RoleClass,
        query: &FilterQuery,
    ) -> Vec<(String, String)> {
        let mut parameters = vec![
            ("p".to_owned(), query.page.to_string()),
            ("page_size".to_owned(), query.page_size.to_string()),
        ];

        for (name, value) in &query.fields {
            let privileged_only = self
                .filter_fields
                .iter()
                .any(|field| field.name() == name && field.is_privileged());
            if privileged_only && !role.is_privileged() {
                continue;
            }
            parameters.push((name.clone(), value.clone()));
        }

        parameters
    }

    /// Descriptor of the asynchronous task log table.
    pub fn task_logs() -> AppResult<Self> {
        let columns = ColumnSet::new(vec![
            ColumnDefinition::new("submit_time", "Submit time", false, true)?,
            ColumnDefinition::new("finish_time", "Finish time", false, true)?,
            ColumnDefinition::new("duration", "Duration", false, true)?,
            ColumnDefinition::new("channel", "Channel", true, true)?,
            ColumnDefinition::new("platform", "Platform", false, true)?,
            ColumnDefinition::new("type", "Type", false, true)?,
            ColumnDefinition::new("task_id", "Task ID", false, true)?,
            ColumnDefinition::new("task_status", "Task status", false, true)?,
            ColumnDefinition::new("progress", "Progress", false, true)?,
            ColumnDefinition::new("fail_reason", "Details", false, true)?,
            ColumnDefinition::new("result_url", "Result", false, true)?,
        ])?;

        Self::new(
            ResourceKind::TaskLogs.as_str(),
            columns,
            vec![
                FilterField::new("channel_id", true)?,
                FilterField::new("task_id", false)?,
            ],
            Some(TimeRangeFilter::new(
                "start_timestamp",
                "end_timestamp",
                3600,
            )?),
            "/api/task/",
            Some("/api/task/self".to_owned()),
        )
    }

    /// Descriptor of the upstream channel table.
    pub fn channels() -> AppResult<Self> {
        let columns = ColumnSet::new(vec![
            ColumnDefinition::new("id", "ID", false, true)?,
            ColumnDefinition::new("name", "Name", false, true)?,
            ColumnDefinition::new("group", "Group", false, true)?,
            ColumnDefinition::new("type", "Type", false, true)?,
            ColumnDefinition::new("status", "Status", false, true)?,
            ColumnDefinition::new("response_time", "Response time", false, true)?,
            ColumnDefinition::new("balance", "Balance", true, true)?,
            ColumnDefinition::new("priority", "Priority", false, true)?,
            ColumnDefinition::new("weight", "Weight", false, true)?,
            ColumnDefinition::new("operate", "Actions", false, true)?,
        ])?;

        Self::new(
            ResourceKind::Channels.as_str(),
            columns,
            vec![
                FilterField::new("keyword", false)?,
                FilterField::new("group", false)?,
                FilterField::new("model", false)?,
            ],
            None,
            "/api/channel/",
            None,
        )
    }
}

/// Resources that ship with a built-in descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// Asynchronous task logs.
    TaskLogs,
    /// Upstream channels.
    Channels,
}

impl ResourceKind {
    /// Returns the stable resource type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TaskLogs => "task_logs",
            Self::Channels => "channels",
        }
    }

    /// Builds the descriptor for this resource.
    pub fn descriptor(&self) -> AppResult<ResourceDescriptor> {
        match self {
            Self::TaskLogs => ResourceDescriptor::task_logs(),
            Self::Channels => ResourceDescriptor::channels(),
        }
    }
}

impl FromStr for ResourceKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "task_logs" => Ok(Self::TaskLogs),
            "channels" => Ok(Self::Channels),
            _ => Err(AppError::Validation(format!(
                "unknown resource type '{value}'"
            ))),
        }
    }
}
