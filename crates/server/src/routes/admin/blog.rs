//! Admin blog post management.
//!
//! All user-authored fields pass through the sanitizer on create and update
//! alike; content keeps rich HTML, everything else is plain text.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use lumeo_core::BlogPostId;

use crate::db::BlogPostRepository;
use crate::db::blog_posts::{BlogPostFilter, BlogPostUpdate, NewBlogPost};
use crate::error::AppError;
use crate::listing::{ListQuery, Listing, equality_filter};
use crate::middleware::RequireAuth;
use crate::models::BlogPost;
use crate::sanitize::{sanitize_html, sanitize_optional_text, sanitize_text};
use crate::state::AppState;

use super::{deserialize_some, parse_filter};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPostResponse {
    pub id: BlogPostId,
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub author: Option<String>,
    pub featured_image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BlogPost> for BlogPostResponse {
    fn from(post: BlogPost) -> Self {
        Self {
            id: post.id,
            title: post.title,
            slug: post.slug,
            excerpt: post.excerpt,
            content: post.content,
            published: post.published,
            published_at: post.published_at,
            category: post.category,
            tags: post.tags,
            author: post.author,
            featured_image: post.featured_image,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

fn sanitize_slug(raw: &str) -> Result<String, AppError> {
    let slug = sanitize_text(raw).trim().to_lowercase();
    if slug.is_empty()
        || !slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(AppError::BadRequest(
            "slug must be non-empty and url-safe".to_owned(),
        ));
    }
    Ok(slug)
}

fn required_text(sanitized: String, field: &str) -> Result<String, AppError> {
    if sanitized.trim().is_empty() {
        return Err(AppError::BadRequest(format!("{field} is required")));
    }
    Ok(sanitized)
}

fn sanitize_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .filter_map(|t| sanitize_optional_text(Some(&t)))
        .collect()
}

#[instrument(skip_all)]
pub async fn list(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Listing<BlogPostResponse>>, AppError> {
    let published = parse_filter::<bool>(query.published.as_deref(), "published")?;
    let filter = BlogPostFilter {
        search: query.term(),
        published,
        category: equality_filter(query.category.as_deref()),
    };
    let pagination = query.pagination();

    let (posts, total) = BlogPostRepository::new(state.pool())
        .list(&filter, pagination)
        .await?;

    let items = posts.into_iter().map(BlogPostResponse::from).collect();
    Ok(Json(Listing::new(items, pagination, total)))
}

#[instrument(skip_all, fields(post_id = %id))]
pub async fn detail(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<BlogPostId>,
) -> Result<Json<BlogPostResponse>, AppError> {
    let post = BlogPostRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("post not found".to_owned()))?;
    Ok(Json(post.into()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostPayload {
    pub title: String,
    pub slug: String,
    pub content: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub published: bool,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub featured_image: Option<String>,
}

#[instrument(skip_all)]
pub async fn create(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Json(payload): Json<CreatePostPayload>,
) -> Result<(StatusCode, Json<BlogPostResponse>), AppError> {
    let title = required_text(sanitize_text(&payload.title), "title")?;
    let content = required_text(sanitize_html(&payload.content), "content")?;
    let slug = sanitize_slug(&payload.slug)?;

    let post = BlogPostRepository::new(state.pool())
        .create(&NewBlogPost {
            title,
            slug,
            excerpt: sanitize_optional_text(payload.excerpt.as_deref()),
            content,
            published: payload.published,
            category: sanitize_optional_text(payload.category.as_deref()),
            tags: sanitize_tags(payload.tags),
            author: sanitize_optional_text(payload.author.as_deref()),
            featured_image: sanitize_optional_text(payload.featured_image.as_deref()),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(post.into())))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostPayload {
    pub title: Option<String>,
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub excerpt: Option<Option<String>>,
    pub content: Option<String>,
    pub published: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub category: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub author: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub featured_image: Option<Option<String>>,
}

#[instrument(skip_all, fields(post_id = %id))]
pub async fn update(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<BlogPostId>,
    Json(payload): Json<UpdatePostPayload>,
) -> Result<Json<BlogPostResponse>, AppError> {
    let slug = payload.slug.as_deref().map(sanitize_slug).transpose()?;
    let title = payload
        .title
        .as_deref()
        .map(|t| required_text(sanitize_text(t), "title"))
        .transpose()?;
    let content = payload
        .content
        .as_deref()
        .map(|c| required_text(sanitize_html(c), "content"))
        .transpose()?;

    let post = BlogPostRepository::new(state.pool())
        .update(
            id,
            &BlogPostUpdate {
                title,
                slug,
                excerpt: payload
                    .excerpt
                    .map(|e| sanitize_optional_text(e.as_deref())),
                content,
                published: payload.published,
                category: payload
                    .category
                    .map(|c| sanitize_optional_text(c.as_deref())),
                tags: payload.tags.map(sanitize_tags),
                author: payload.author.map(|a| sanitize_optional_text(a.as_deref())),
                featured_image: payload
                    .featured_image
                    .map(|f| sanitize_optional_text(f.as_deref())),
            },
        )
        .await?;
    Ok(Json(post.into()))
}

#[instrument(skip_all, fields(post_id = %id))]
pub async fn remove(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<BlogPostId>,
) -> Result<StatusCode, AppError> {
    BlogPostRepository::new(state.pool()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::{required_text, sanitize_slug};

    #[test]
    fn slug_is_lowercased_and_validated() {
        assert_eq!(sanitize_slug("My-Post_1").unwrap(), "my-post_1");
        assert!(sanitize_slug("").is_err());
        assert!(sanitize_slug("has spaces").is_err());
        assert!(sanitize_slug("<script>").is_err());
    }

    #[test]
    fn required_text_rejects_sanitized_empty() {
        assert!(required_text(String::new(), "title").is_err());
        assert!(required_text("   ".to_owned(), "title").is_err());
        assert_eq!(
            required_text("Launch notes".to_owned(), "title").unwrap(),
            "Launch notes"
        );
    }
}
