//! Filtered order listings

use std::sync::OnceLock;

use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use sqlx::{QueryBuilder, Sqlite};

use super::ledger::{row_to_summary, OrderLedger};
use super::types::OrderSummary;
use crate::error::ServiceError;
use crate::storage::timestamp_to_column;

/// Hard cap on rows returned by a listing
pub const MAX_ORDERS: i64 = 100;

/// Conjunctive filters for [`OrderLedger::get_orders`]
///
/// `status` and `last` hold the caller's raw text; unusable values are
/// treated as absent rather than rejected.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub user_id: Option<String>,
    /// Comma-separated statuses, e.g. `"pending,confirmed"`
    pub status: Option<String>,
    /// Recency window such as `30m`, `2h` or `7d`
    pub last: Option<String>,
}

/// Split a comma-separated status list into normalized names
///
/// Returns `None` when nothing usable remains.
pub fn parse_status_filter(raw: &str) -> Option<Vec<String>> {
    let statuses: Vec<String> = raw
        .split(',')
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    (!statuses.is_empty()).then_some(statuses)
}

fn window_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\d+)([mhd])$").expect("recency pattern is valid"))
}

/// Parse `<n>m`, `<n>h` or `<n>d` (case-insensitive) into a duration
pub fn parse_recency_window(raw: &str) -> Option<Duration> {
    let normalized = raw.trim().to_ascii_lowercase();
    let captures = window_pattern().captures(&normalized)?;
    let amount: i64 = captures[1].parse().ok()?;
    match &captures[2] {
        "m" => Duration::try_minutes(amount),
        "h" => Duration::try_hours(amount),
        "d" => Duration::try_days(amount),
        _ => None,
    }
}

impl OrderLedger {
    /// Orders matching `filter`, newest first
    pub async fn get_orders(&self, filter: &OrderFilter) -> Result<Vec<OrderSummary>, ServiceError> {
        self.get_orders_at(filter, Utc::now()).await
    }

    pub(crate) async fn get_orders_at(
        &self,
        filter: &OrderFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<OrderSummary>, ServiceError> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT id, user_id, nickname, status, total_price, created_at, updated_at \
             FROM orders WHERE 1 = 1",
        );

        if let Some(user_id) = filter.user_id.as_deref().filter(|u| !u.trim().is_empty()) {
            query.push(" AND user_id = ").push_bind(user_id.trim().to_string());
        }

        if let Some(statuses) = filter.status.as_deref().and_then(parse_status_filter) {
            query.push(" AND status IN (");
            let mut separated = query.separated(", ");
            for status in statuses {
                separated.push_bind(status);
            }
            separated.push_unseparated(")");
        }

        if let Some(raw) = filter.last.as_deref() {
            match parse_recency_window(raw).map(|window| now.checked_sub_signed(window)) {
                Some(Some(since)) => {
                    query
                        .push(" AND created_at >= ")
                        .push_bind(timestamp_to_column(since));
                }
                // Reaches back past the earliest representable time: nothing is excluded
                Some(None) => tracing::debug!(last = %raw, "Recency window covers all orders"),
                None => tracing::debug!(last = %raw, "Ignoring unrecognized recency window"),
            }
        }

        query
            .push(" ORDER BY created_at DESC, rowid DESC LIMIT ")
            .push_bind(MAX_ORDERS);

        let rows = query.build().fetch_all(self.pool()).await?;
        Ok(rows
            .iter()
            .map(row_to_summary)
            .collect::<Result<Vec<_>, _>>()?)
    }
}
