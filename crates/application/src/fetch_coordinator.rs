use chrono::FixedOffset;
use gatedeck_core::AppResult;
use gatedeck_domain::{DisplayRecord, resolve_page};

use crate::{ListEnvelope, ListPayload};

/// What the rendering layer shows for one list.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    /// Rows of the current page.
    pub items: Vec<DisplayRecord>,
    /// Total rows matching the current filters.
    pub total_count: u64,
    /// Current 1-based page.
    pub page: u32,
    /// Current rows per page.
    pub page_size: u32,
    /// Whether the newest fetch is still outstanding.
    pub loading: bool,
}

impl ViewState {
    /// Creates an empty first-page state.
    #[must_use]
    pub fn new(page_size: u32) -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
            page: 1,
            page_size: page_size.max(1),
            loading: false,
        }
    }

    /// Returns the last page that holds rows for `page_size`, never below 1.
    #[must_use]
    pub fn last_page_for(&self, page_size: u32) -> u32 {
        let page_size = u64::from(page_size.max(1));
        let pages = self.total_count.div_ceil(page_size).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }
}

/// Coordinator lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPhase {
    /// No fetch outstanding.
    Idle,
    /// At least the newest fetch is outstanding.
    Loading,
}

/// Handle for one issued fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    sequence: u64,
}

impl FetchTicket {
    /// Returns the monotonically increasing sequence number.
    #[must_use]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

/// Result of settling one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response was written into the view state.
    Applied,
    /// The fetch failed; the view state is unchanged.
    Failed(String),
    /// A newer fetch already settled, so this one was dropped.
    Stale,
}

/// Reconciles list responses into view state.
///
/// Responses settle in sequence order: once a fetch has settled, every fetch
/// issued before it is dropped when it eventually completes.
#[derive(Debug, Clone)]
pub struct FetchCoordinator {
    view: ViewState,
    display_offset: FixedOffset,
    latest_issued: u64,
    latest_settled: u64,
}

impl FetchCoordinator {
    /// Creates a coordinator for an empty view.
    #[must_use]
    pub fn new(page_size: u32, display_offset: FixedOffset) -> Self {
        Self {
            view: ViewState::new(page_size),
            display_offset,
            latest_issued: 0,
            latest_settled: 0,
        }
    }

    /// Returns the current view state.
    #[must_use]
    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Returns the lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> FetchPhase {
        if self.view.loading {
            FetchPhase::Loading
        } else {
            FetchPhase::Idle
        }
    }

    /// Marks a new fetch as issued.
    pub fn begin(&mut self) -> FetchTicket {
        self.latest_issued = self.latest_issued.saturating_add(1);
        self.view.loading = true;
        FetchTicket {
            sequence: self.latest_issued,
        }
    }

    /// Settles an issued fetch with the data source result.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: AppResult<ListEnvelope>,
    ) -> FetchOutcome {
        if ticket.sequence >= self.latest_issued {
            self.view.loading = false;
        }

        if ticket.sequence <= self.latest_settled {
            return FetchOutcome::Stale;
        }
        self.latest_settled = ticket.sequence;

        match result.and_then(ListEnvelope::into_payload) {
            Ok(payload) => {
                self.apply(payload);
                FetchOutcome::Applied
            }
            Err(error) => FetchOutcome::Failed(error.message().to_owned()),
        }
    }

    fn apply(&mut self, payload: ListPayload) {
        let offset = self.display_offset;
        self.view.items = payload
            .items
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(position, record)| DisplayRecord::derive(record, position, offset))
            .collect();
        self.view.total_count = payload
            .total
            .and_then(|total| u64::try_from(total).ok())
            .unwrap_or(0);
        self.view.page = resolve_page(payload.page);
        if let Some(page_size) = payload
            .page_size
            .filter(|size| *size > 0)
            .and_then(|size| u32::try_from(size).ok())
        {
            self.view.page_size = page_size;
        }
    }
}
