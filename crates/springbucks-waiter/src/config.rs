//! # Configuration
//!
//! Runtime settings for the waiter, read from `WAITER_*` environment
//! variables. Every setting has a default, so an empty environment yields a
//! working configuration.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `WAITER_FINISHED_ORDERS_BINDING` | `finishedOrders` |
//! | `WAITER_NOTIFY_ORDERS_BINDING` | `notifyOrders-out-0` |
//! | `WAITER_NEW_ORDERS_BINDING` | `newOrders` |
//! | `WAITER_BUFFER_SIZE` | `32` |
//! | `WAITER_LOOKUP_TIMEOUT_MS` | unset (no timeout); `0` also disables it |
//! | `WAITER_FAILURE_POLICY` | `log`; or `dead-letter` |
//! | `WAITER_DEAD_LETTER_BINDING` | `<finished orders binding>.dlq` |

use crate::integration::{FINISHED_ORDERS, NEW_ORDERS, NOTIFY_ORDERS_OUT};
use springbucks_framework::FailurePolicy;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BUFFER_SIZE: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaiterConfig {
    pub finished_orders_binding: String,
    pub notify_orders_binding: String,
    pub new_orders_binding: String,
    /// Capacity of the order store and bridge request channels, and the
    /// number of finished orders handled at once.
    pub buffer_size: usize,
    pub lookup_timeout: Option<Duration>,
    pub failure_policy: FailurePolicy,
}

impl Default for WaiterConfig {
    fn default() -> Self {
        Self {
            finished_orders_binding: FINISHED_ORDERS.to_string(),
            notify_orders_binding: NOTIFY_ORDERS_OUT.to_string(),
            new_orders_binding: NEW_ORDERS.to_string(),
            buffer_size: DEFAULT_BUFFER_SIZE,
            lookup_timeout: None,
            failure_policy: FailurePolicy::LogAndDrop,
        }
    }
}

impl WaiterConfig {
    /// Reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let finished_orders_binding = get("WAITER_FINISHED_ORDERS_BINDING")
            .unwrap_or(defaults.finished_orders_binding);
        let notify_orders_binding =
            get("WAITER_NOTIFY_ORDERS_BINDING").unwrap_or(defaults.notify_orders_binding);
        let new_orders_binding =
            get("WAITER_NEW_ORDERS_BINDING").unwrap_or(defaults.new_orders_binding);

        let buffer_size = match get("WAITER_BUFFER_SIZE") {
            Some(value) => match value.trim().parse::<usize>() {
                Ok(size) if size > 0 => size,
                _ => return Err(invalid("WAITER_BUFFER_SIZE", value)),
            },
            None => defaults.buffer_size,
        };

        let lookup_timeout = match get("WAITER_LOOKUP_TIMEOUT_MS") {
            Some(value) => match value.trim().parse::<u64>() {
                Ok(0) => None,
                Ok(millis) => Some(Duration::from_millis(millis)),
                Err(_) => return Err(invalid("WAITER_LOOKUP_TIMEOUT_MS", value)),
            },
            None => defaults.lookup_timeout,
        };

        let failure_policy = match get("WAITER_FAILURE_POLICY").as_deref().map(str::trim) {
            None | Some("log") => FailurePolicy::LogAndDrop,
            Some("dead-letter") => FailurePolicy::DeadLetter(
                get("WAITER_DEAD_LETTER_BINDING")
                    .unwrap_or_else(|| format!("{finished_orders_binding}.dlq")),
            ),
            Some(other) => return Err(invalid("WAITER_FAILURE_POLICY", other.to_string())),
        };

        Ok(Self {
            finished_orders_binding,
            notify_orders_binding,
            new_orders_binding,
            buffer_size,
            lookup_timeout,
            failure_policy,
        })
    }
}

fn invalid(key: &'static str, value: String) -> ConfigError {
    ConfigError::Invalid { key, value }
}
