use std::time::Duration;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

pub static START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// How often expired revocations and idle login throttles are swept.
pub const PURGE_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Grace period for in-flight requests once a shutdown signal arrives.
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 15;
