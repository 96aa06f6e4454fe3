//! Admin SEO ranking tracking.
//!
//! The trends endpoint is the one in-memory reduction in the service:
//! measurements are grouped by (keyword, url, search engine, location) into
//! chronological series for charting.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use lumeo_core::{ProjectId, RankingId};

use crate::db::RankingRepository;
use crate::db::rankings::{NewRanking, RankingFilter};
use crate::error::AppError;
use crate::listing::{ListQuery, Listing, equality_filter};
use crate::middleware::RequireAuth;
use crate::models::SeoRanking;
use crate::sanitize::{sanitize_optional_text, sanitize_text};
use crate::state::AppState;

use super::{parse_date_filter, parse_filter};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingResponse {
    pub id: RankingId,
    pub project_id: ProjectId,
    pub keyword: String,
    pub url: String,
    pub location: Option<String>,
    pub search_engine: String,
    pub position: i32,
    pub recorded_at: DateTime<Utc>,
}

impl From<SeoRanking> for RankingResponse {
    fn from(ranking: SeoRanking) -> Self {
        Self {
            id: ranking.id,
            project_id: ranking.project_id,
            keyword: ranking.keyword,
            url: ranking.url,
            location: ranking.location,
            search_engine: ranking.search_engine,
            position: ranking.position,
            recorded_at: ranking.recorded_at,
        }
    }
}

fn filter_from_query(query: &ListQuery) -> Result<RankingFilter, AppError> {
    Ok(RankingFilter {
        search: query.term(),
        project_id: parse_filter(query.project_id.as_deref(), "projectId")?,
        search_engine: equality_filter(query.search_engine.as_deref()),
        date_from: parse_date_filter(query.date_from.as_deref(), "from")?,
        date_to: parse_date_filter(query.date_to.as_deref(), "to")?,
    })
}

#[instrument(skip_all)]
pub async fn list(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Listing<RankingResponse>>, AppError> {
    let filter = filter_from_query(&query)?;
    let pagination = query.pagination();

    let (rankings, total) = RankingRepository::new(state.pool())
        .list(&filter, pagination)
        .await?;

    let items = rankings.into_iter().map(RankingResponse::from).collect();
    Ok(Json(Listing::new(items, pagination, total)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRankingPayload {
    pub project_id: ProjectId,
    pub keyword: String,
    pub url: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub search_engine: Option<String>,
    pub position: i32,
}

#[instrument(skip_all)]
pub async fn create(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Json(payload): Json<CreateRankingPayload>,
) -> Result<(StatusCode, Json<RankingResponse>), AppError> {
    let keyword = sanitize_text(&payload.keyword);
    if keyword.trim().is_empty() {
        return Err(AppError::BadRequest("keyword is required".to_owned()));
    }
    if payload.position < 0 {
        return Err(AppError::BadRequest(
            "position must be non-negative".to_owned(),
        ));
    }

    let ranking = RankingRepository::new(state.pool())
        .create(&NewRanking {
            project_id: payload.project_id,
            keyword,
            url: sanitize_text(&payload.url),
            location: sanitize_optional_text(payload.location.as_deref()),
            search_engine: sanitize_optional_text(payload.search_engine.as_deref())
                .unwrap_or_else(|| "google".to_owned()),
            position: payload.position,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(ranking.into())))
}

/// One measurement within a trend series.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub position: i32,
    pub recorded_at: DateTime<Utc>,
}

/// A chronological series for one tracked (keyword, url, engine, location)
/// combination.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendSeries {
    pub keyword: String,
    pub url: String,
    pub search_engine: String,
    pub location: Option<String>,
    pub points: Vec<TrendPoint>,
}

/// Group time-ordered measurements into per-combination series, preserving
/// first-seen order of the combinations.
fn group_trends(rankings: Vec<SeoRanking>) -> Vec<TrendSeries> {
    let mut series: Vec<TrendSeries> = Vec::new();

    for ranking in rankings {
        let point = TrendPoint {
            position: ranking.position,
            recorded_at: ranking.recorded_at,
        };

        if let Some(existing) = series.iter_mut().find(|s| {
            s.keyword == ranking.keyword
                && s.url == ranking.url
                && s.search_engine == ranking.search_engine
                && s.location == ranking.location
        }) {
            existing.points.push(point);
        } else {
            series.push(TrendSeries {
                keyword: ranking.keyword,
                url: ranking.url,
                search_engine: ranking.search_engine,
                location: ranking.location,
                points: vec![point],
            });
        }
    }

    series
}

#[instrument(skip_all)]
pub async fn trends(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<TrendSeries>>, AppError> {
    let filter = filter_from_query(&query)?;

    let rankings = RankingRepository::new(state.pool())
        .list_for_trends(&filter)
        .await?;

    Ok(Json(group_trends(rankings)))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn measurement(keyword: &str, engine: &str, position: i32, day: u32) -> SeoRanking {
        SeoRanking {
            id: RankingId::generate(),
            project_id: ProjectId::generate(),
            keyword: keyword.to_owned(),
            url: "https://example.com".to_owned(),
            location: None,
            search_engine: engine.to_owned(),
            position,
            recorded_at: Utc.with_ymd_and_hms(2025, 6, day, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn groups_by_composite_key_keeping_order() {
        let series = group_trends(vec![
            measurement("seo", "google", 12, 1),
            measurement("seo", "bing", 20, 1),
            measurement("seo", "google", 9, 2),
            measurement("web design", "google", 4, 2),
        ]);

        assert_eq!(series.len(), 3);
        assert_eq!(series[0].keyword, "seo");
        assert_eq!(series[0].search_engine, "google");
        assert_eq!(
            series[0].points.iter().map(|p| p.position).collect::<Vec<_>>(),
            vec![12, 9]
        );
        assert_eq!(series[1].search_engine, "bing");
        assert_eq!(series[2].keyword, "web design");
    }

    #[test]
    fn empty_input_yields_no_series() {
        assert!(group_trends(Vec::new()).is_empty());
    }
}
