//! Per-client fixed-window rate limiting backed by Postgres.
//!
//! Each (client key, scope) pair gets a counter row per window. The counter
//! is bumped with a single atomic upsert, so concurrent requests near the
//! limit cannot both slip through.

use chrono::{DateTime, TimeZone, Utc};
use sqlx::PgPool;

use super::RepositoryError;

/// Default policy for public intake endpoints: 5 requests per 60 seconds.
pub const INTAKE_LIMIT: RateLimitPolicy = RateLimitPolicy {
    max_requests: 5,
    window_seconds: 60,
};

/// A fixed-window rate limit policy.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitPolicy {
    pub max_requests: i64,
    pub window_seconds: i64,
}

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    /// The request would exceed the policy; retry after the window rolls.
    Denied { retry_after_seconds: i64 },
}

impl RateLimitDecision {
    #[must_use]
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// Floor the given instant to the start of its fixed window.
#[must_use]
pub fn window_start(now: DateTime<Utc>, window_seconds: i64) -> DateTime<Utc> {
    let secs = now.timestamp();
    let floored = secs - secs.rem_euclid(window_seconds);
    Utc.timestamp_opt(floored, 0)
        .single()
        .unwrap_or(now)
}

/// Repository for rate limit counters.
pub struct RateLimitRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> RateLimitRepository<'a> {
    /// Create a new rate limit repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a hit for `(key, scope)` in the current window and decide
    /// whether it stays within the policy.
    ///
    /// The counter is incremented before the comparison, so a denied request
    /// still consumed a slot. That matches the fixed-window semantics: at
    /// most `max_requests` requests are admitted per window no matter how
    /// many arrive.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the upsert fails.
    pub async fn hit(
        &self,
        key: &str,
        scope: &str,
        policy: RateLimitPolicy,
    ) -> Result<RateLimitDecision, RepositoryError> {
        let now = Utc::now();
        let start = window_start(now, policy.window_seconds);

        let count: i64 = sqlx::query_scalar(
            "INSERT INTO rate_limit_windows (key, scope, window_start, count) \
             VALUES ($1, $2, $3, 1) \
             ON CONFLICT (key, scope, window_start) \
             DO UPDATE SET count = rate_limit_windows.count + 1 \
             RETURNING count",
        )
        .bind(key)
        .bind(scope)
        .bind(start)
        .fetch_one(self.pool)
        .await?;

        if count <= policy.max_requests {
            Ok(RateLimitDecision::Allowed)
        } else {
            let window_end = start.timestamp() + policy.window_seconds;
            Ok(RateLimitDecision::Denied {
                retry_after_seconds: (window_end - now.timestamp()).max(1),
            })
        }
    }

    /// Delete counter rows from windows that ended before `before`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn prune(&self, before: DateTime<Utc>) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM rate_limit_windows WHERE window_start < $1")
            .bind(before)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::window_start;

    #[test]
    fn floors_to_window_boundary() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 30, 47).unwrap();
        let start = window_start(now, 60);
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 6, 1, 12, 30, 0).unwrap());
    }

    #[test]
    fn boundary_instant_starts_its_own_window() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 31, 0).unwrap();
        assert_eq!(window_start(now, 60), now);
    }

    #[test]
    fn adjacent_windows_do_not_overlap() {
        let late = Utc.with_ymd_and_hms(2025, 6, 1, 12, 30, 59).unwrap();
        let next = Utc.with_ymd_and_hms(2025, 6, 1, 12, 31, 0).unwrap();
        assert_ne!(window_start(late, 60), window_start(next, 60));
    }
}
