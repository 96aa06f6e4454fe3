//! SEO, uptime, report, and revenue domain types.
//!
//! Rankings, metrics, and revenues are append-only snapshots; reports allow
//! title/content edits after generation.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use lumeo_core::{MetricsId, ProjectId, RankingId, ReportId, ReportType, RevenueId};

/// A keyword position snapshot for a project.
#[derive(Debug, Clone)]
pub struct SeoRanking {
    pub id: RankingId,
    pub project_id: ProjectId,
    /// Tracked keyword.
    pub keyword: String,
    /// Ranked URL.
    pub url: String,
    /// Search location (e.g., "us", "london").
    pub location: Option<String>,
    /// Search engine name (e.g., "google").
    pub search_engine: String,
    /// Position in results (1-based).
    pub position: i32,
    pub recorded_at: DateTime<Utc>,
}

/// A website health snapshot for a project.
#[derive(Debug, Clone)]
pub struct WebsiteMetrics {
    pub id: MetricsId,
    /// Owning project; nullable for site-wide snapshots.
    pub project_id: Option<ProjectId>,
    /// Uptime percentage.
    pub uptime: Decimal,
    /// Average response time in milliseconds.
    pub response_time: Decimal,
    /// Page speed score (0-100).
    pub page_speed: i32,
    /// SEO score (0-100).
    pub seo_score: i32,
    /// Visits counted in the snapshot window.
    pub traffic_count: i64,
    /// Conversion rate percentage.
    pub conversion_rate: Decimal,
    pub recorded_at: DateTime<Utc>,
}

/// A generated client report.
#[derive(Debug, Clone)]
pub struct ClientReport {
    pub id: ReportId,
    pub project_id: ProjectId,
    pub title: String,
    /// Report body (sanitized HTML).
    pub content: String,
    pub report_type: ReportType,
    pub generated_at: DateTime<Utc>,
}

/// A revenue entry for a project.
#[derive(Debug, Clone)]
pub struct Revenue {
    pub id: RevenueId,
    pub project_id: ProjectId,
    /// Amount (fixed-point).
    pub amount: Decimal,
    pub description: Option<String>,
    pub recorded_at: DateTime<Utc>,
}
