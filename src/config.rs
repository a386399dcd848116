use std::{env, fmt::Display, path::PathBuf, str::FromStr, time::Duration};

use tracing::{info, warn};

use crate::filters::GuardPolicy;

pub const API_URL: &str = "ESTATE_API_URL";
pub const PAGE_SIZE: &str = "ESTATE_PAGE_SIZE";
pub const HTTP_TIMEOUT_SECS: &str = "ESTATE_HTTP_TIMEOUT_SECS";
pub const GUARD_POLICY: &str = "ESTATE_GUARD_POLICY";
pub const OUTPUT: &str = "ESTATE_OUTPUT";

const DEFAULT_PAGE_SIZE: u32 = 20;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Results API base URL. `None` searches the built-in sample listings.
    pub api_url: Option<String>,
    pub page_size: u32,
    pub http_timeout: Duration,
    pub guard_policy: GuardPolicy,
    /// Where to write the fetched page as JSON, if anywhere
    pub output: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: None,
            page_size: DEFAULT_PAGE_SIZE,
            http_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            guard_policy: GuardPolicy::default(),
            output: None,
        }
    }
}

impl Config {
    pub fn load() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Bad values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let page_size = try_load(PAGE_SIZE, var(PAGE_SIZE), DEFAULT_PAGE_SIZE);
        let page_size = if page_size == 0 {
            warn!("{PAGE_SIZE} must be positive, using default: {DEFAULT_PAGE_SIZE}");
            DEFAULT_PAGE_SIZE
        } else {
            page_size
        };

        let guard_policy = match var(GUARD_POLICY) {
            Some(name) => GuardPolicy::from_name(&name).unwrap_or_else(|| {
                warn!("Invalid {GUARD_POLICY} value: {name}, using default: drop");
                GuardPolicy::default()
            }),
            None => GuardPolicy::default(),
        };

        let config = Self {
            api_url: var(API_URL),
            page_size,
            http_timeout: Duration::from_secs(try_load(
                HTTP_TIMEOUT_SECS,
                var(HTTP_TIMEOUT_SECS),
                DEFAULT_TIMEOUT_SECS,
            )),
            guard_policy,
            output: var(OUTPUT).map(PathBuf::from),
        };

        if config.api_url.is_none() {
            info!("{API_URL} not set, searching sample listings");
        }
        config
    }
}

fn try_load<T: FromStr + Display>(key: &str, raw: Option<String>, default: T) -> T
where
    T::Err: Display,
{
    let Some(raw) = raw else {
        return default;
    };
    raw.parse().unwrap_or_else(|e| {
        warn!("Invalid {key} value: {e}, using default: {default}");
        default
    })
}
