use std::{env, time::Duration};

use dynowalk_core::table::{ProvisionedThroughput, WaitPolicy};

/// Walkthrough configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Schedule for table status waits.
    pub wait_policy: WaitPolicy,
    /// Throughput the table is created with (default: 5/5)
    pub initial_throughput: ProvisionedThroughput,
    /// Throughput the table is updated to (default: 6/7)
    pub updated_throughput: ProvisionedThroughput,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `DYNOWALK_WAIT_MAX_ATTEMPTS` - Status checks before giving up (default: 60)
    /// - `DYNOWALK_WAIT_INITIAL_DELAY_MS` - First delay between checks (default: 500)
    /// - `DYNOWALK_WAIT_MAX_DELAY_MS` - Delay cap between checks (default: 5000)
    /// - `DYNOWALK_INITIAL_READ_CAPACITY` / `DYNOWALK_INITIAL_WRITE_CAPACITY` (default: 5/5)
    /// - `DYNOWALK_UPDATED_READ_CAPACITY` / `DYNOWALK_UPDATED_WRITE_CAPACITY` (default: 6/7)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Missing or unparsable values fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parse = |name: &str, default: u64| -> u64 {
            lookup(name)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default)
        };
        let capacity = |name: &str, default: i64| -> i64 {
            lookup(name)
                .and_then(|v| v.trim().parse().ok())
                .filter(|v: &i64| *v > 0)
                .unwrap_or(default)
        };

        let defaults = WaitPolicy::default();
        let wait_policy = WaitPolicy {
            max_attempts: parse(
                "DYNOWALK_WAIT_MAX_ATTEMPTS",
                u64::from(defaults.max_attempts),
            )
            .clamp(1, u64::from(u32::MAX)) as u32,
            initial_delay: Duration::from_millis(parse(
                "DYNOWALK_WAIT_INITIAL_DELAY_MS",
                defaults.initial_delay.as_millis() as u64,
            )),
            max_delay: Duration::from_millis(parse(
                "DYNOWALK_WAIT_MAX_DELAY_MS",
                defaults.max_delay.as_millis() as u64,
            )),
            multiplier: defaults.multiplier,
        };

        Self {
            wait_policy,
            initial_throughput: ProvisionedThroughput::new(
                capacity("DYNOWALK_INITIAL_READ_CAPACITY", 5),
                capacity("DYNOWALK_INITIAL_WRITE_CAPACITY", 5),
            ),
            updated_throughput: ProvisionedThroughput::new(
                capacity("DYNOWALK_UPDATED_READ_CAPACITY", 6),
                capacity("DYNOWALK_UPDATED_WRITE_CAPACITY", 7),
            ),
        }
    }
}
