use std::env;
use std::time::Duration;

use chrono::FixedOffset;
use gatedeck_core::{AppError, AppResult, RoleClass};
use gatedeck_domain::ResourceKind;
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    pub api_base_url: Url,
    pub user_id: Option<String>,
    pub role: RoleClass,
    pub resource: ResourceKind,
    pub redis_url: Option<String>,
    pub display_offset: FixedOffset,
    pub http_timeout: Duration,
}

impl ConsoleConfig {
    pub fn load() -> AppResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let optional = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let api_base_url = optional("GATEDECK_API_BASE_URL")
            .ok_or_else(|| AppError::Validation("GATEDECK_API_BASE_URL is required".to_owned()))?;
        let api_base_url = Url::parse(api_base_url.as_str()).map_err(|error| {
            AppError::Validation(format!(
                "invalid GATEDECK_API_BASE_URL value '{api_base_url}': {error}"
            ))
        })?;
        if !matches!(api_base_url.scheme(), "http" | "https") {
            return Err(AppError::Validation(format!(
                "GATEDECK_API_BASE_URL must use http or https, got '{}'",
                api_base_url.scheme()
            )));
        }

        let role = optional("GATEDECK_ROLE")
            .map(|value| value.parse::<RoleClass>())
            .transpose()?
            .unwrap_or(RoleClass::SelfScoped);
        let resource = optional("GATEDECK_RESOURCE")
            .map(|value| value.parse::<ResourceKind>())
            .transpose()?
            .unwrap_or(ResourceKind::TaskLogs);

        let offset_seconds = parse_i32(
            optional("GATEDECK_DISPLAY_UTC_OFFSET_SECONDS"),
            "GATEDECK_DISPLAY_UTC_OFFSET_SECONDS",
            0,
        )?;
        let display_offset = FixedOffset::east_opt(offset_seconds).ok_or_else(|| {
            AppError::Validation(format!(
                "GATEDECK_DISPLAY_UTC_OFFSET_SECONDS out of range: {offset_seconds}"
            ))
        })?;

        let timeout_seconds = parse_u64(
            optional("GATEDECK_HTTP_TIMEOUT_SECONDS"),
            "GATEDECK_HTTP_TIMEOUT_SECONDS",
            15,
        )?;
        if timeout_seconds == 0 {
            return Err(AppError::Validation(
                "GATEDECK_HTTP_TIMEOUT_SECONDS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            api_base_url,
            user_id: optional("GATEDECK_USER_ID"),
            role,
            resource,
            redis_url: optional("GATEDECK_REDIS_URL"),
            display_offset,
            http_timeout: Duration::from_secs(timeout_seconds),
        })
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn parse_i32(value: Option<String>, name: &str, default: i32) -> AppResult<i32> {
    match value {
        Some(value) => value.parse::<i32>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        None => Ok(default),
    }
}

fn parse_u64(value: Option<String>, name: &str, default: u64) -> AppResult<u64> {
    match value {
        Some(value) => value.parse::<u64>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        None => Ok(default),
    }
}
