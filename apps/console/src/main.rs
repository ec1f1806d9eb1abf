//! Gatedeck console runtime.
//!
//! Loads one resource table the way the admin console does on mount, applies
//! optional page navigation from the command line and logs the resulting page.

#![forbid(unsafe_code)]

mod console_config;

use std::env;
use std::sync::Arc;

use gatedeck_application::{PreferenceStorage, TableViewController, ViewControllerPorts};
use gatedeck_core::{AppError, AppResult, UserIdentity};
use gatedeck_domain::DisplayRecord;
use gatedeck_infrastructure::{
    HttpListDataSource, InMemoryPreferenceStorage, RedisPreferenceStorage, StaticIdentityProvider,
    SystemClock, TracingNotifier, UnavailableClipboard,
};
use tracing::info;

use crate::console_config::{ConsoleConfig, init_tracing};

const PREFERENCE_KEY_PREFIX: &str = "gatedeck:preferences";

#[derive(Debug, Default, PartialEq, Eq)]
struct PageArguments {
    page: Option<i64>,
    page_size: Option<i64>,
}

impl PageArguments {
    fn parse(arguments: impl IntoIterator<Item = String>) -> AppResult<Self> {
        let mut values = arguments.into_iter();
        Ok(Self {
            page: values.next().map(|value| parse_number(&value, "page")).transpose()?,
            page_size: values
                .next()
                .map(|value| parse_number(&value, "page size"))
                .transpose()?,
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ConsoleConfig::load()?;
    let arguments = PageArguments::parse(env::args().skip(1))?;
    let http_client = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

    let storage: Arc<dyn PreferenceStorage> = match config.redis_url.as_deref() {
        Some(redis_url) => {
            let client = redis::Client::open(redis_url).map_err(|error| {
                AppError::Validation(format!("invalid GATEDECK_REDIS_URL: {error}"))
            })?;
            Arc::new(RedisPreferenceStorage::new(client, PREFERENCE_KEY_PREFIX))
        }
        None => Arc::new(InMemoryPreferenceStorage::new()),
    };

    let subject = config
        .user_id
        .clone()
        .unwrap_or_else(|| "anonymous".to_owned());
    let ports = ViewControllerPorts {
        data_source: Arc::new(HttpListDataSource::new(
            http_client,
            config.api_base_url.clone(),
            config.user_id.clone(),
        )),
        storage,
        notifier: Arc::new(TracingNotifier::new()),
        clipboard: Arc::new(UnavailableClipboard),
        identity: Arc::new(StaticIdentityProvider::new(UserIdentity::new(
            subject.as_str(),
            subject.as_str(),
            config.role,
        ))),
        clock: Arc::new(SystemClock::new(config.display_offset)),
    };

    info!(
        api_base_url = %config.api_base_url,
        resource = config.resource.as_str(),
        role = config.role.as_str(),
        durable_preferences = config.redis_url.is_some(),
        "gatedeck console starting"
    );

    let controller = TableViewController::initialize(config.resource.descriptor()?, ports).await;
    if let Some(page_size) = arguments.page_size {
        controller.handle_page_size_change(page_size).await;
    }
    if let Some(page) = arguments.page {
        controller.handle_page_change(page).await;
    }

    log_page(&controller);
    Ok(())
}

fn log_page(controller: &TableViewController) {
    let view = controller.view_state();
    let columns = controller.visible_columns();

    info!(
        resource = controller.resource().resource_type(),
        page = view.page,
        page_size = view.page_size,
        total = view.total_count,
        rows = view.items.len(),
        columns = columns.len(),
        density = ?controller.density(),
        "page loaded"
    );

    for record in &view.items {
        info!(
            key = record.key(),
            created = record.display_timestamp(),
            "{}",
            render_row(record, columns.iter().map(|column| column.key()))
        );
    }
}

fn render_row<'a>(record: &DisplayRecord, keys: impl Iterator<Item = &'a str>) -> String {
    keys.filter_map(|key| {
        record.record().field(key).map(|value| {
            let rendered = value
                .as_str()
                .map_or_else(|| value.to_string(), str::to_owned);
            format!("{key}={rendered}")
        })
    })
    .collect::<Vec<_>>()
    .join(" ")
}

fn parse_number(value: &str, name: &str) -> AppResult<i64> {
    value
        .parse::<i64>()
        .map_err(|error| AppError::Validation(format!("invalid {name} '{value}': {error}")))
}
