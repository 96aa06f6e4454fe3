//! Admin dashboard: one aggregate snapshot for the overview page.

use std::collections::BTreeMap;

use axum::{Json, extract::State};
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use tracing::instrument;

use lumeo_core::ContactStatus;

use crate::db::revenues::RevenueFilter;
use crate::db::{ContactRepository, ProjectRepository, RevenueRepository, TaskRepository};
use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub total_contacts: i64,
    pub total_projects: i64,
    /// Contact counts keyed by status string, zero-count statuses omitted.
    pub contacts_by_status: BTreeMap<String, i64>,
    pub projects_by_status: BTreeMap<String, i64>,
    pub tasks_by_status: BTreeMap<String, i64>,
    /// Percentage of contacts that reached CONVERTED, rounded to the
    /// nearest whole number. Zero when there are no contacts at all.
    pub conversion_rate: i64,
    pub total_revenue: Option<f64>,
}

/// Converted contacts as a whole-number percentage of all contacts.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
fn conversion_rate(by_status: &BTreeMap<String, i64>) -> i64 {
    let total: i64 = by_status.values().sum();
    if total == 0 {
        return 0;
    }
    let converted = by_status
        .get(ContactStatus::Converted.as_str())
        .copied()
        .unwrap_or(0);

    (converted as f64 / total as f64 * 100.0).round() as i64
}

#[instrument(skip_all)]
pub async fn overview(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<DashboardResponse>, AppError> {
    let pool = state.pool();

    let contacts_by_status: BTreeMap<String, i64> = ContactRepository::new(pool)
        .count_by_status()
        .await?
        .into_iter()
        .collect();
    let projects_by_status: BTreeMap<String, i64> = ProjectRepository::new(pool)
        .count_by_status()
        .await?
        .into_iter()
        .collect();
    let tasks_by_status: BTreeMap<String, i64> = TaskRepository::new(pool)
        .count_by_status()
        .await?
        .into_iter()
        .collect();

    let total_contacts = ContactRepository::new(pool).count().await?;
    let total_projects = ProjectRepository::new(pool).count().await?;
    let total_revenue = RevenueRepository::new(pool)
        .total(&RevenueFilter::default())
        .await?;

    Ok(Json(DashboardResponse {
        total_contacts,
        total_projects,
        conversion_rate: conversion_rate(&contacts_by_status),
        contacts_by_status,
        projects_by_status,
        tasks_by_status,
        total_revenue: total_revenue.to_f64(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(pairs: &[(&str, i64)]) -> BTreeMap<String, i64> {
        pairs
            .iter()
            .map(|&(k, v)| (k.to_owned(), v))
            .collect()
    }

    #[test]
    fn test_conversion_rate_rounds_to_nearest() {
        // 1 of 3 converted: 33.33 rounds down.
        let by_status = counts(&[("NEW", 2), ("CONVERTED", 1)]);
        assert_eq!(conversion_rate(&by_status), 33);

        // 2 of 3 converted: 66.67 rounds up.
        let by_status = counts(&[("NEW", 1), ("CONVERTED", 2)]);
        assert_eq!(conversion_rate(&by_status), 67);
    }

    #[test]
    fn test_conversion_rate_no_contacts_is_zero() {
        assert_eq!(conversion_rate(&BTreeMap::new()), 0);
    }

    #[test]
    fn test_conversion_rate_none_converted() {
        let by_status = counts(&[("NEW", 5), ("CLOSED", 5)]);
        assert_eq!(conversion_rate(&by_status), 0);
    }

    #[test]
    fn test_conversion_rate_all_converted() {
        let by_status = counts(&[("CONVERTED", 4)]);
        assert_eq!(conversion_rate(&by_status), 100);
    }
}
