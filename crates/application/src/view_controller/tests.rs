use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, TimeZone};
use gatedeck_core::{AppError, AppResult, RoleClass, UserIdentity};
use gatedeck_domain::{
    ColumnVisibilityMap, DensityMode, ListRecord, ModalKind, ModalPayload, RecordId,
    ResourceDescriptor,
};
use tokio::sync::{Mutex, oneshot};

use super::{CopyOutcome, TableViewController, ViewControllerPorts};
use crate::{
    Clipboard, Clock, FetchPhase, IdentityProvider, ListDataSource, ListEnvelope, ListPayload,
    ListRequest, Notifier, PreferenceStorage,
};

const START_OF_DAY: i64 = 1_741_881_600;
const NOW: i64 = 1_741_936_166;

#[derive(Default)]
struct QueuedDataSource {
    responses: Mutex<VecDeque<AppResult<ListEnvelope>>>,
    requests: Mutex<Vec<ListRequest>>,
}

impl QueuedDataSource {
    async fn push(&self, response: AppResult<ListEnvelope>) {
        self.responses.lock().await.push_back(response);
    }

    async fn requests(&self) -> Vec<ListRequest> {
        self.requests.lock().await.clone()
    }

    async fn last_request(&self) -> ListRequest {
        self.requests
            .lock()
            .await
            .last()
            .cloned()
            .unwrap_or_else(|| unreachable!())
    }
}

#[async_trait]
impl ListDataSource for QueuedDataSource {
    async fn fetch_page(&self, request: ListRequest) -> AppResult<ListEnvelope> {
        let echoed = echo(&request);
        self.requests.lock().await.push(request);
        self.responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(echoed))
    }
}

/// Holds responses for selected pages until the test releases them.
#[derive(Default)]
struct GatedDataSource {
    gates: Mutex<HashMap<String, oneshot::Receiver<ListEnvelope>>>,
    requested_pages: Mutex<Vec<String>>,
}

impl GatedDataSource {
    async fn gate(&self, page: &str) -> oneshot::Sender<ListEnvelope> {
        let (sender, receiver) = oneshot::channel();
        self.gates.lock().await.insert(page.to_owned(), receiver);
        sender
    }

    async fn wait_until_requested(&self, page: &str) {
        loop {
            if self
                .requested_pages
                .lock()
                .await
                .iter()
                .any(|requested| requested == page)
            {
                return;
            }
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl ListDataSource for GatedDataSource {
    async fn fetch_page(&self, request: ListRequest) -> AppResult<ListEnvelope> {
        let page = request.parameter("p").unwrap_or("1").to_owned();
        self.requested_pages.lock().await.push(page.clone());
        let gate = self.gates.lock().await.remove(&page);
        match gate {
            Some(receiver) => receiver
                .await
                .map_err(|_| AppError::Transport("gate dropped".to_owned())),
            None => Ok(echo(&request)),
        }
    }
}

#[derive(Default)]
struct FakeStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl FakeStorage {
    async fn seed(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .await
            .insert(key.to_owned(), value.to_owned());
    }

    async fn entry(&self, key: &str) -> Option<String> {
        self.entries.lock().await.get(key).cloned()
    }
}

#[async_trait]
impl PreferenceStorage for FakeStorage {
    async fn read(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn write(&self, key: &str, value: String) -> AppResult<()> {
        self.entries.lock().await.insert(key.to_owned(), value);
        Ok(())
    }
}

/// Holds the next write to one key until the test releases it.
#[derive(Default)]
struct GatedStorage {
    entries: Mutex<HashMap<String, String>>,
    held_key: Mutex<Option<(String, oneshot::Receiver<()>)>>,
    started_writes: Mutex<Vec<String>>,
}

impl GatedStorage {
    async fn hold_next_write(&self, key: &str) -> oneshot::Sender<()> {
        let (sender, receiver) = oneshot::channel();
        *self.held_key.lock().await = Some((key.to_owned(), receiver));
        self.started_writes.lock().await.clear();
        sender
    }

    async fn wait_for_write(&self, key: &str) {
        while !self
            .started_writes
            .lock()
            .await
            .iter()
            .any(|started| started == key)
        {
            tokio::task::yield_now().await;
        }
    }

    async fn entry(&self, key: &str) -> Option<String> {
        self.entries.lock().await.get(key).cloned()
    }
}

#[async_trait]
impl PreferenceStorage for GatedStorage {
    async fn read(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn write(&self, key: &str, value: String) -> AppResult<()> {
        self.started_writes.lock().await.push(key.to_owned());
        let held = {
            let mut held_key = self.held_key.lock().await;
            match held_key.take() {
                Some((held, receiver)) if held == key => Some(receiver),
                other => {
                    *held_key = other;
                    None
                }
            }
        };
        if let Some(receiver) = held {
            let _ = receiver.await;
        }
        self.entries.lock().await.insert(key.to_owned(), value);
        Ok(())
    }
}

#[derive(Default)]
struct RecordingNotifier {
    errors: std::sync::Mutex<Vec<String>>,
    successes: std::sync::Mutex<Vec<String>>,
}

impl RecordingNotifier {
    fn errors(&self) -> Vec<String> {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn successes(&self) -> Vec<String> {
        self.successes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Notifier for RecordingNotifier {
    fn report_error(&self, message: &str) {
        self.errors
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_owned());
    }

    fn report_success(&self, message: &str) {
        self.successes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_owned());
    }
}

struct StubClipboard {
    accepts: bool,
}

#[async_trait]
impl Clipboard for StubClipboard {
    async fn copy(&self, _text: &str) -> bool {
        self.accepts
    }
}

struct StubIdentity {
    identity: AppResult<UserIdentity>,
}

#[async_trait]
impl IdentityProvider for StubIdentity {
    async fn current_identity(&self) -> AppResult<UserIdentity> {
        self.identity.clone()
    }
}

struct FixedClock;

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        let offset = FixedOffset::east_opt(8 * 3600).unwrap_or_else(|| unreachable!());
        offset
            .timestamp_opt(NOW, 0)
            .single()
            .unwrap_or_else(|| unreachable!())
    }
}

struct Harness {
    data_source: Arc<QueuedDataSource>,
    storage: Arc<FakeStorage>,
    notifier: Arc<RecordingNotifier>,
}

impl Harness {
    fn new() -> Self {
        Self {
            data_source: Arc::new(QueuedDataSource::default()),
            storage: Arc::new(FakeStorage::default()),
            notifier: Arc::new(RecordingNotifier::default()),
        }
    }

    fn ports(&self, role: RoleClass, clipboard_accepts: bool) -> ViewControllerPorts {
        ViewControllerPorts {
            data_source: self.data_source.clone(),
            storage: self.storage.clone(),
            notifier: self.notifier.clone(),
            clipboard: Arc::new(StubClipboard {
                accepts: clipboard_accepts,
            }),
            identity: Arc::new(StubIdentity {
                identity: Ok(UserIdentity::new("42", "operator", role)),
            }),
            clock: Arc::new(FixedClock),
        }
    }

    async fn task_logs(&self, role: RoleClass) -> TableViewController {
        TableViewController::initialize(task_logs(), self.ports(role, true)).await
    }
}

fn task_logs() -> ResourceDescriptor {
    ResourceDescriptor::task_logs().unwrap_or_else(|_| unreachable!())
}

fn echo(request: &ListRequest) -> ListEnvelope {
    let page = request
        .parameter("p")
        .and_then(|page| page.parse().ok())
        .unwrap_or(1);
    let page_size = request
        .parameter("page_size")
        .and_then(|size| size.parse().ok())
        .unwrap_or(10);
    ListEnvelope::success(ListPayload::new(Vec::new(), 0, page, page_size))
}

fn records(count: i64) -> Vec<ListRecord> {
    (1..=count)
        .map(|id| ListRecord {
            id: Some(RecordId::Number(id)),
            created_at: Some(NOW),
            ..ListRecord::default()
        })
        .collect()
}

fn page(count: i64, total: i64, page: i64, page_size: i64) -> AppResult<ListEnvelope> {
    Ok(ListEnvelope::success(ListPayload::new(
        records(count),
        total,
        page,
        page_size,
    )))
}

#[tokio::test]
async fn first_fetch_uses_default_filters_and_window() {
    let harness = Harness::new();
    let controller = harness.task_logs(RoleClass::Privileged).await;

    let requests = harness.data_source.requests().await;
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.endpoint, "/api/task/");
    assert_eq!(request.parameter("p"), Some("1"));
    assert_eq!(request.parameter("page_size"), Some("10"));
    assert_eq!(request.parameter("channel_id"), Some(""));
    assert_eq!(request.parameter("task_id"), Some(""));
    assert_eq!(
        request.parameter("start_timestamp"),
        Some(START_OF_DAY.to_string().as_str())
    );
    assert_eq!(
        request.parameter("end_timestamp"),
        Some((NOW + 3600).to_string().as_str())
    );

    let view = controller.view_state();
    assert_eq!(view.page, 1);
    assert_eq!(view.page_size, 10);
    assert!(!view.loading);
    assert_eq!(controller.phase(), FetchPhase::Idle);
}

#[tokio::test]
async fn self_scoped_role_uses_own_endpoint_without_privileged_filters() {
    let harness = Harness::new();
    let controller = harness.task_logs(RoleClass::SelfScoped).await;

    let request = harness.data_source.last_request().await;
    assert_eq!(controller.role(), RoleClass::SelfScoped);
    assert_eq!(request.endpoint, "/api/task/self");
    assert_eq!(request.parameter("channel_id"), None);
    assert_eq!(request.parameter("task_id"), Some(""));
}

#[tokio::test]
async fn identity_failure_falls_back_to_self_scoped_role() {
    let harness = Harness::new();
    let mut ports = harness.ports(RoleClass::Privileged, true);
    ports.identity = Arc::new(StubIdentity {
        identity: Err(AppError::Transport("status endpoint down".to_owned())),
    });

    let controller = TableViewController::initialize(task_logs(), ports).await;

    assert_eq!(controller.role(), RoleClass::SelfScoped);
    assert!(!controller.column_visibility().is_visible("channel"));
    assert_eq!(
        harness.data_source.last_request().await.endpoint,
        "/api/task/self"
    );
}

#[tokio::test]
async fn persisted_privileged_column_stays_hidden_for_self_scoped_role() {
    let harness = Harness::new();
    harness
        .storage
        .seed(
            "task_logs:user:table-columns",
            r#"{"channel":true,"task_id":false,"retired_column":true}"#,
        )
        .await;

    let controller = harness.task_logs(RoleClass::SelfScoped).await;
    let visibility = controller.column_visibility();

    assert!(!visibility.is_visible("channel"));
    assert!(!visibility.is_visible("task_id"));
    assert!(visibility.is_visible("platform"));
    assert!(!visibility.contains_key("retired_column"));

    let toggled = controller.toggle_column("channel", true).await;
    assert!(!toggled.is_visible("channel"));
    assert!(
        controller
            .visible_columns()
            .iter()
            .all(|column| column.key() != "channel")
    );
}

#[tokio::test]
async fn missing_column_preferences_persist_role_defaults() {
    let harness = Harness::new();
    let controller = harness.task_logs(RoleClass::Privileged).await;

    assert!(controller.column_visibility().is_visible("channel"));
    let stored = harness
        .storage
        .entry("task_logs:admin:table-columns")
        .await
        .unwrap_or_default();
    assert!(stored.contains(r#""channel":true"#));
    assert!(
        harness
            .storage
            .entry("task_logs:user:table-columns")
            .await
            .is_none()
    );
}

#[tokio::test]
async fn corrupt_column_preferences_fall_back_to_defaults() {
    let harness = Harness::new();
    harness
        .storage
        .seed("task_logs:admin:table-columns", "{not json")
        .await;

    let controller = harness.task_logs(RoleClass::Privileged).await;

    let all_visible: ColumnVisibilityMap = controller
        .column_definitions()
        .columns()
        .iter()
        .map(|column| (column.key(), true))
        .collect();
    assert_eq!(controller.column_visibility(), all_visible);
    assert!(harness.notifier.errors().is_empty());
    let stored = harness
        .storage
        .entry("task_logs:admin:table-columns")
        .await
        .unwrap_or_default();
    assert!(stored.starts_with('{') && stored.contains("channel"));
}

#[tokio::test]
async fn successful_fetch_reflects_server_pagination() {
    let harness = Harness::new();
    let controller = harness.task_logs(RoleClass::Privileged).await;
    harness.data_source.push(page(17, 57, 2, 20)).await;

    controller.handle_page_change(2).await;

    let view = controller.view_state();
    assert_eq!(view.page, 2);
    assert_eq!(view.page_size, 20);
    assert_eq!(view.total_count, 57);
    assert_eq!(view.items.len(), 17);
    assert_eq!(view.items[0].key(), "1");
    assert_eq!(view.items[0].display_timestamp(), "2025-03-14 15:09:26");
}

#[tokio::test]
async fn failed_fetch_keeps_rows_and_notifies() {
    let harness = Harness::new();
    harness.data_source.push(page(10, 42, 1, 10)).await;
    let controller = harness.task_logs(RoleClass::Privileged).await;
    let before = controller.view_state();

    harness
        .data_source
        .push(Ok(ListEnvelope::failure("timeout")))
        .await;
    controller.handle_page_change(2).await;

    let after = controller.view_state();
    assert_eq!(after.items, before.items);
    assert_eq!(after.total_count, 42);
    assert!(!after.loading);
    assert_eq!(harness.notifier.errors(), vec!["timeout".to_owned()]);

    harness
        .data_source
        .push(Err(AppError::Transport("connection refused".to_owned())))
        .await;
    controller.refresh().await;

    assert_eq!(controller.view_state().total_count, 42);
    assert_eq!(
        harness.notifier.errors(),
        vec!["timeout".to_owned(), "connection refused".to_owned()]
    );
    assert_eq!(controller.phase(), FetchPhase::Idle);
}

#[tokio::test]
async fn refresh_twice_issues_identical_queries() {
    let harness = Harness::new();
    let controller = harness.task_logs(RoleClass::Privileged).await;
    controller
        .set_filter_field("task_id", "task_abc")
        .unwrap_or_else(|_| unreachable!());

    let first = controller.refresh().await;
    let second = controller.refresh().await;

    assert_eq!(first, second);
    assert_eq!(first.field("task_id"), Some("task_abc"));
    assert_eq!(controller.filter_form().field("task_id"), Some("task_abc"));
}

#[tokio::test]
async fn page_size_change_persists_and_clamps_to_last_page() {
    let harness = Harness::new();
    let controller = harness.task_logs(RoleClass::Privileged).await;
    harness.data_source.push(page(7, 57, 6, 10)).await;
    controller.handle_page_change(6).await;

    let query = controller.handle_page_size_change(20).await;

    assert_eq!(query.page, 3);
    assert_eq!(query.page_size, 20);
    assert_eq!(
        harness.storage.entry("task_logs:page-size").await,
        Some("20".to_owned())
    );
}

#[tokio::test]
async fn page_size_change_keeps_page_still_in_range() {
    let harness = Harness::new();
    let controller = harness.task_logs(RoleClass::Privileged).await;
    harness.data_source.push(page(10, 57, 2, 10)).await;
    controller.handle_page_change(2).await;

    let query = controller.handle_page_size_change(20).await;

    assert_eq!(query.page, 2);
    assert_eq!(query.page_size, 20);
}

#[tokio::test]
async fn non_positive_page_size_resolves_to_default() {
    let harness = Harness::new();
    let controller = harness.task_logs(RoleClass::Privileged).await;

    assert_eq!(controller.handle_page_size_change(0).await.page_size, 10);
    assert_eq!(controller.handle_page_size_change(-5).await.page_size, 10);
    assert_eq!(
        harness.storage.entry("task_logs:page-size").await,
        Some("10".to_owned())
    );
}

#[tokio::test]
async fn persisted_page_size_is_used_for_first_fetch() {
    let harness = Harness::new();
    harness.storage.seed("task_logs:page-size", "50").await;

    harness.task_logs(RoleClass::SelfScoped).await;

    assert_eq!(
        harness.data_source.last_request().await.parameter("page_size"),
        Some("50")
    );
}

#[tokio::test]
async fn submit_filters_fetches_first_page_with_form_values() {
    let harness = Harness::new();
    let controller = harness.task_logs(RoleClass::Privileged).await;
    harness.data_source.push(page(10, 57, 4, 10)).await;
    controller.handle_page_change(4).await;

    controller
        .set_filter_field("channel_id", "7")
        .unwrap_or_else(|_| unreachable!());
    controller
        .set_time_range("2025-03-10 08:00:00", "2025-03-12 20:00:00")
        .unwrap_or_else(|_| unreachable!());
    controller.submit_filters().await;

    let request = harness.data_source.last_request().await;
    assert_eq!(request.parameter("p"), Some("1"));
    assert_eq!(request.parameter("channel_id"), Some("7"));
    assert_eq!(request.parameter("start_timestamp"), Some("1741564800"));
    assert_eq!(request.parameter("end_timestamp"), Some("1741780800"));
    assert_eq!(controller.last_query().field("channel_id"), Some("7"));
}

#[tokio::test]
async fn unknown_filter_field_is_rejected() {
    let harness = Harness::new();
    let controller = harness.task_logs(RoleClass::Privileged).await;

    let result = controller.set_filter_field("model", "gpt");

    assert!(matches!(result, Err(AppError::Validation(_))));
    assert_eq!(controller.filter_form(), *controller.filter_form_defaults());
}

#[tokio::test]
async fn reset_filters_restores_mounted_values() {
    let harness = Harness::new();
    let controller = harness.task_logs(RoleClass::Privileged).await;
    controller
        .set_filter_field("task_id", "task_abc")
        .unwrap_or_else(|_| unreachable!());
    controller.clear_time_range();

    controller.reset_filters();

    let form = controller.filter_form();
    assert_eq!(form.field("task_id"), Some(""));
    assert_eq!(
        form.time_range(),
        Some(("2025-03-14 00:00:00", "2025-03-14 16:09:26"))
    );
}

#[tokio::test]
async fn modals_stay_open_independently() {
    let harness = Harness::new();
    let controller = harness.task_logs(RoleClass::Privileged).await;

    controller.open_content_modal("upstream returned 502");
    controller.open_media_modal("https://cdn.example/result.mp4");

    let content = controller.modal(ModalKind::ContentDetail);
    let media = controller.modal(ModalKind::MediaPreview);
    assert!(content.is_visible());
    assert!(media.is_visible());
    assert_eq!(
        content.payload(),
        Some(&ModalPayload::Text("upstream returned 502".to_owned()))
    );
    assert_eq!(
        media.payload(),
        Some(&ModalPayload::MediaUrl(
            "https://cdn.example/result.mp4".to_owned()
        ))
    );

    controller.close_modal(ModalKind::ContentDetail);
    assert_eq!(controller.open_modals(), vec![ModalKind::MediaPreview]);
}

#[tokio::test]
async fn record_editor_carries_selected_row() {
    let harness = Harness::new();
    harness.data_source.push(page(3, 3, 1, 10)).await;
    let controller = harness.task_logs(RoleClass::Privileged).await;
    let row = controller.view_state().items[1].clone();

    controller.open_record_editor(row.clone());
    controller.open_column_selector();

    assert_eq!(
        controller.modal(ModalKind::RecordEditor).payload(),
        Some(&ModalPayload::Record(Box::new(row)))
    );
    assert!(controller.modal(ModalKind::ColumnSelector).is_visible());
}

#[tokio::test]
async fn copy_text_reports_success() {
    let harness = Harness::new();
    let controller = harness.task_logs(RoleClass::Privileged).await;

    let outcome = controller.copy_text("task_abc").await;

    assert_eq!(outcome, CopyOutcome::Copied);
    assert_eq!(harness.notifier.successes(), vec!["Copied: task_abc".to_owned()]);
    assert!(!controller.modal(ModalKind::ManualCopy).is_visible());
}

#[tokio::test]
async fn copy_text_falls_back_to_manual_dialog() {
    let harness = Harness::new();
    let controller =
        TableViewController::initialize(task_logs(), harness.ports(RoleClass::Privileged, false))
            .await;

    let outcome = controller.copy_text("task_abc").await;

    assert_eq!(outcome, CopyOutcome::ManualFallback);
    assert!(harness.notifier.successes().is_empty());
    assert_eq!(
        controller.modal(ModalKind::ManualCopy).payload(),
        Some(&ModalPayload::Text("task_abc".to_owned()))
    );
}

#[tokio::test]
async fn density_toggle_survives_reinitialization() {
    let harness = Harness::new();
    let controller = harness.task_logs(RoleClass::Privileged).await;
    assert_eq!(controller.density(), DensityMode::Comfortable);

    assert_eq!(controller.toggle_density().await, DensityMode::Compact);

    let reloaded = harness.task_logs(RoleClass::Privileged).await;
    assert_eq!(reloaded.density(), DensityMode::Compact);
    let other_role = harness.task_logs(RoleClass::SelfScoped).await;
    assert_eq!(other_role.density(), DensityMode::Comfortable);
}

#[tokio::test]
async fn select_all_and_reset_respect_role() {
    let harness = Harness::new();
    let controller = harness.task_logs(RoleClass::SelfScoped).await;

    let hidden = controller.select_all(false).await;
    assert!(hidden.iter().all(|(_, visible)| !visible));

    let shown = controller.select_all(true).await;
    assert!(!shown.is_visible("channel"));
    assert!(shown.is_visible("task_id"));

    controller.toggle_column("task_id", false).await;
    let reloaded = harness.task_logs(RoleClass::SelfScoped).await;
    assert!(!reloaded.column_visibility().is_visible("task_id"));

    let defaults = reloaded.reset_columns().await;
    assert!(defaults.is_visible("task_id"));
    assert!(!defaults.is_visible("channel"));
    let stored = harness
        .storage
        .entry("task_logs:user:table-columns")
        .await
        .unwrap_or_default();
    assert!(stored.contains(r#""task_id":true"#));
}

#[tokio::test]
async fn admin_only_resource_notifies_self_scoped_role() {
    let harness = Harness::new();
    let channels = ResourceDescriptor::channels().unwrap_or_else(|_| unreachable!());

    let controller =
        TableViewController::initialize(channels, harness.ports(RoleClass::SelfScoped, true))
            .await;

    assert!(harness.data_source.requests().await.is_empty());
    assert_eq!(harness.notifier.errors().len(), 1);
    assert!(controller.view_state().items.is_empty());
    assert!(!controller.view_state().loading);
}

fn gated_ports(harness: &Harness, data_source: Arc<GatedDataSource>) -> ViewControllerPorts {
    let mut ports = harness.ports(RoleClass::Privileged, true);
    ports.data_source = data_source;
    ports
}

#[tokio::test]
async fn later_request_wins_when_earlier_one_completes_last() {
    let harness = Harness::new();
    let data_source = Arc::new(GatedDataSource::default());
    let controller = Arc::new(
        TableViewController::initialize(task_logs(), gated_ports(&harness, data_source.clone()))
            .await,
    );
    let release_second = data_source.gate("2").await;
    let release_third = data_source.gate("3").await;

    let earlier = tokio::spawn({
        let controller = controller.clone();
        async move { controller.handle_page_change(2).await }
    });
    data_source.wait_until_requested("2").await;
    let later = tokio::spawn({
        let controller = controller.clone();
        async move { controller.handle_page_change(3).await }
    });
    data_source.wait_until_requested("3").await;
    assert!(controller.view_state().loading);

    let _ = release_third.send(page(10, 100, 3, 10).unwrap_or_else(|_| unreachable!()));
    later.await.unwrap_or_else(|_| unreachable!());
    assert_eq!(controller.view_state().page, 3);
    assert!(!controller.view_state().loading);

    let _ = release_second.send(page(10, 100, 2, 10).unwrap_or_else(|_| unreachable!()));
    earlier.await.unwrap_or_else(|_| unreachable!());
    assert_eq!(controller.view_state().page, 3);
    assert!(!controller.view_state().loading);
}

#[tokio::test]
async fn loading_persists_until_latest_request_settles() {
    let harness = Harness::new();
    let data_source = Arc::new(GatedDataSource::default());
    let controller = Arc::new(
        TableViewController::initialize(task_logs(), gated_ports(&harness, data_source.clone()))
            .await,
    );
    let release_second = data_source.gate("2").await;
    let release_third = data_source.gate("3").await;

    let earlier = tokio::spawn({
        let controller = controller.clone();
        async move { controller.handle_page_change(2).await }
    });
    data_source.wait_until_requested("2").await;
    let later = tokio::spawn({
        let controller = controller.clone();
        async move { controller.handle_page_change(3).await }
    });
    data_source.wait_until_requested("3").await;

    let _ = release_second.send(page(10, 100, 2, 10).unwrap_or_else(|_| unreachable!()));
    earlier.await.unwrap_or_else(|_| unreachable!());
    assert_eq!(controller.view_state().page, 2);
    assert!(controller.view_state().loading);

    let _ = release_third.send(page(10, 100, 3, 10).unwrap_or_else(|_| unreachable!()));
    later.await.unwrap_or_else(|_| unreachable!());
    assert_eq!(controller.view_state().page, 3);
    assert!(!controller.view_state().loading);
}

async fn gated_storage_controller(storage: Arc<GatedStorage>) -> Arc<TableViewController> {
    let harness = Harness::new();
    let mut ports = harness.ports(RoleClass::Privileged, true);
    ports.storage = storage;
    Arc::new(TableViewController::initialize(task_logs(), ports).await)
}

#[tokio::test]
async fn overlapping_column_toggles_store_latest_map() {
    const COLUMNS_KEY: &str = "task_logs:admin:table-columns";
    let storage = Arc::new(GatedStorage::default());
    let controller = gated_storage_controller(storage.clone()).await;
    let release = storage.hold_next_write(COLUMNS_KEY).await;

    let first = tokio::spawn({
        let controller = controller.clone();
        async move { controller.toggle_column("progress", false).await }
    });
    storage.wait_for_write(COLUMNS_KEY).await;
    let second = tokio::spawn({
        let controller = controller.clone();
        async move { controller.toggle_column("duration", false).await }
    });
    while controller.column_visibility().is_visible("duration") {
        tokio::task::yield_now().await;
    }
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }

    let _ = release.send(());
    first.await.unwrap_or_else(|_| unreachable!());
    second.await.unwrap_or_else(|_| unreachable!());

    let stored: ColumnVisibilityMap = storage
        .entry(COLUMNS_KEY)
        .await
        .and_then(|raw| serde_json::from_str(&raw).ok())
        .unwrap_or_default();
    assert_eq!(stored, controller.column_visibility());
    assert_eq!(stored.get("progress"), Some(false));
    assert_eq!(stored.get("duration"), Some(false));
}

#[tokio::test]
async fn overlapping_density_toggles_return_to_original_mode() {
    const DENSITY_KEY: &str = "task_logs:admin:compact-mode";
    let storage = Arc::new(GatedStorage::default());
    let controller = gated_storage_controller(storage.clone()).await;
    let release = storage.hold_next_write(DENSITY_KEY).await;

    let first = tokio::spawn({
        let controller = controller.clone();
        async move { controller.toggle_density().await }
    });
    storage.wait_for_write(DENSITY_KEY).await;
    let second = tokio::spawn({
        let controller = controller.clone();
        async move { controller.toggle_density().await }
    });
    while controller.density() == DensityMode::Compact {
        tokio::task::yield_now().await;
    }

    let _ = release.send(());
    let first = first.await.unwrap_or_else(|_| unreachable!());
    let second = second.await.unwrap_or_else(|_| unreachable!());

    assert_eq!(first, DensityMode::Compact);
    assert_eq!(second, DensityMode::Comfortable);
    assert_eq!(controller.density(), DensityMode::Comfortable);
    assert_eq!(
        storage.entry(DENSITY_KEY).await.as_deref(),
        Some(r#""comfortable""#)
    );
}
