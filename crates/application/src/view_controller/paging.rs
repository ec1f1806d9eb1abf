use gatedeck_domain::{FilterQuery, PreferenceKey, resolve_page, resolve_page_size};
use tracing::{debug, warn};

use super::TableViewController;
use crate::{FetchOutcome, ListRequest};

impl TableViewController {
    /// Fetches one page with the current filter form.
    ///
    /// Returns the query that was issued, whether or not its response ends
    /// up applied.
    pub async fn load_page(&self, page: u32, page_size: u32) -> FilterQuery {
        let now = self.clock.now();
        let (ticket, query) = {
            let mut state = self.lock_state();
            let previous = FilterQuery::first_page(page_size).with_page(page);
            let query = self.query_builder.build(&state.form, &previous, now);
            state.last_query = query.clone();
            (state.fetch.begin(), query)
        };

        let result = match self.resource.endpoint_for(self.role) {
            Ok(endpoint) => {
                let request = ListRequest {
                    endpoint: endpoint.to_owned(),
                    parameters: self.resource.transport_parameters(self.role, &query),
                };
                debug!(
                    resource = self.resource.resource_type(),
                    endpoint = %request.endpoint,
                    page = query.page,
                    page_size = query.page_size,
                    sequence = ticket.sequence(),
                    "fetching list page"
                );
                self.data_source.fetch_page(request).await
            }
            Err(error) => Err(error),
        };

        let outcome = self.lock_state().fetch.complete(ticket, result);
        match outcome {
            FetchOutcome::Applied => {}
            FetchOutcome::Failed(message) => {
                warn!(
                    resource = self.resource.resource_type(),
                    page = query.page,
                    error = %message,
                    "list fetch failed"
                );
                self.notifier.report_error(message.as_str());
            }
            FetchOutcome::Stale => {
                debug!(
                    resource = self.resource.resource_type(),
                    sequence = ticket.sequence(),
                    "dropping stale list response"
                );
            }
        }

        query
    }

    /// Re-fetches the current page without touching the filter form.
    pub async fn refresh(&self) -> FilterQuery {
        let (page, page_size) = {
            let state = self.lock_state();
            let view = state.fetch.view();
            (view.page, view.page_size)
        };
        self.load_page(page, page_size).await
    }

    /// Navigates to another page at the current page size.
    pub async fn handle_page_change(&self, page: i64) -> FilterQuery {
        let page_size = self.lock_state().fetch.view().page_size;
        self.load_page(resolve_page(Some(page)), page_size).await
    }

    /// Persists a new page size and re-fetches.
    ///
    /// The current page is kept while it still holds rows for the last known
    /// total; otherwise the view moves to the last valid page.
    pub async fn handle_page_size_change(&self, page_size: i64) -> FilterQuery {
        let page_size = resolve_page_size(Some(page_size));
        self.preferences
            .save(
                &PreferenceKey::page_size(self.resource.resource_type()),
                &page_size,
            )
            .await;

        let page = {
            let state = self.lock_state();
            let view = state.fetch.view();
            view.page.min(view.last_page_for(page_size))
        };
        self.load_page(page, page_size).await
    }

    /// Fetches the first page with the current filter form.
    pub async fn submit_filters(&self) -> FilterQuery {
        let page_size = self.lock_state().fetch.view().page_size;
        self.load_page(1, page_size).await
    }
}
