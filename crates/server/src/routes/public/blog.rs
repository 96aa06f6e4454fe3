//! Public blog endpoints. Only published posts are visible here.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::instrument;

use crate::db::BlogPostRepository;
use crate::error::AppError;
use crate::listing::{ListQuery, Listing};
use crate::models::BlogPost;
use crate::state::AppState;

/// Public shape of a published post.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicPost {
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub published_at: Option<DateTime<Utc>>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub author: Option<String>,
    pub featured_image: Option<String>,
}

impl From<BlogPost> for PublicPost {
    fn from(post: BlogPost) -> Self {
        Self {
            title: post.title,
            slug: post.slug,
            excerpt: post.excerpt,
            content: post.content,
            published_at: post.published_at,
            category: post.category,
            tags: post.tags,
            author: post.author,
            featured_image: post.featured_image,
        }
    }
}

/// List published posts, newest first.
#[instrument(skip_all)]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Listing<PublicPost>>, AppError> {
    let pagination = query.pagination();
    let (posts, total) = BlogPostRepository::new(state.pool())
        .list_published(pagination)
        .await?;

    let items = posts.into_iter().map(PublicPost::from).collect();
    Ok(Json(Listing::new(items, pagination, total)))
}

/// Fetch a single published post by slug.
#[instrument(skip_all, fields(slug = %slug))]
pub async fn detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PublicPost>, AppError> {
    let post = BlogPostRepository::new(state.pool())
        .get_published_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound("post not found".to_owned()))?;

    Ok(Json(post.into()))
}
