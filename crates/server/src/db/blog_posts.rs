//! Blog post repository for database operations.
//!
//! Enforces the publish invariant on every write: `published_at` is
//! non-null iff `published` is true. Re-publishing an unpublished post sets
//! a fresh `published_at`.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use lumeo_core::BlogPostId;

use super::RepositoryError;
use crate::listing::Pagination;
use crate::models::BlogPost;

const POST_COLUMNS: &str = "id, title, slug, excerpt, content, published, published_at, \
                            category, tags, author, featured_image, created_at, updated_at";

/// Internal row type for blog post queries.
#[derive(Debug, sqlx::FromRow)]
struct BlogPostRow {
    id: BlogPostId,
    title: String,
    slug: String,
    excerpt: Option<String>,
    content: String,
    published: bool,
    published_at: Option<DateTime<Utc>>,
    category: Option<String>,
    tags: Vec<String>,
    author: Option<String>,
    featured_image: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BlogPostRow> for BlogPost {
    type Error = RepositoryError;

    fn try_from(row: BlogPostRow) -> Result<Self, Self::Error> {
        // The publish invariant is enforced on write; a violation here
        // means the data was mutated out of band.
        if row.published != row.published_at.is_some() {
            return Err(RepositoryError::DataCorruption(format!(
                "post {} violates the published/published_at invariant",
                row.id
            )));
        }

        Ok(Self {
            id: row.id,
            title: row.title,
            slug: row.slug,
            excerpt: row.excerpt,
            content: row.content,
            published: row.published,
            published_at: row.published_at,
            category: row.category,
            tags: row.tags,
            author: row.author,
            featured_image: row.featured_image,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Filters for admin blog listings.
#[derive(Debug, Default)]
pub struct BlogPostFilter {
    /// Case-insensitive substring over title and excerpt.
    pub search: Option<String>,
    pub published: Option<bool>,
    pub category: Option<String>,
}

/// Fields for creating a post. Content is already sanitized by the caller.
#[derive(Debug)]
pub struct NewBlogPost {
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub published: bool,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub author: Option<String>,
    pub featured_image: Option<String>,
}

/// Partial update of a post. Content is already sanitized by the caller.
#[derive(Debug, Default)]
pub struct BlogPostUpdate {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<Option<String>>,
    pub content: Option<String>,
    pub published: Option<bool>,
    pub category: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub author: Option<Option<String>>,
    pub featured_image: Option<Option<String>>,
}

impl BlogPostUpdate {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.slug.is_none()
            && self.excerpt.is_none()
            && self.content.is_none()
            && self.published.is_none()
            && self.category.is_none()
            && self.tags.is_none()
            && self.author.is_none()
            && self.featured_image.is_none()
    }
}

/// Repository for blog post database operations.
pub struct BlogPostRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BlogPostRepository<'a> {
    /// Create a new blog post repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &BlogPostFilter) {
        if let Some(term) = &filter.search {
            let pattern = format!("%{term}%");
            qb.push(" AND (title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR excerpt ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(published) = filter.published {
            qb.push(" AND published = ").push_bind(published);
        }
        if let Some(category) = &filter.category {
            qb.push(" AND category = ").push_bind(category.clone());
        }
    }

    /// List posts for the admin panel, most recently updated first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn list(
        &self,
        filter: &BlogPostFilter,
        pagination: Pagination,
    ) -> Result<(Vec<BlogPost>, i64), RepositoryError> {
        let mut count_qb =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM blog_posts WHERE 1=1");
        Self::push_filters(&mut count_qb, filter);
        let total: i64 = count_qb.build_query_scalar().fetch_one(self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {POST_COLUMNS} FROM blog_posts WHERE 1=1"
        ));
        Self::push_filters(&mut qb, filter);
        qb.push(" ORDER BY updated_at DESC LIMIT ")
            .push_bind(pagination.limit)
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let rows: Vec<BlogPostRow> = qb.build_query_as().fetch_all(self.pool).await?;
        let posts = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<_, _>>()?;
        Ok((posts, total))
    }

    /// List published posts for the public site, newest publish first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn list_published(
        &self,
        pagination: Pagination,
    ) -> Result<(Vec<BlogPost>, i64), RepositoryError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM blog_posts WHERE published")
            .fetch_one(self.pool)
            .await?;

        let rows: Vec<BlogPostRow> = sqlx::query_as(&format!(
            "SELECT {POST_COLUMNS} FROM blog_posts WHERE published \
             ORDER BY published_at DESC LIMIT $1 OFFSET $2"
        ))
        .bind(pagination.limit)
        .bind(pagination.offset())
        .fetch_all(self.pool)
        .await?;

        let posts = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<_, _>>()?;
        Ok((posts, total))
    }

    /// Published posts for the RSS feed, newest publish first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn list_for_feed(&self, limit: i64) -> Result<Vec<BlogPost>, RepositoryError> {
        let rows: Vec<BlogPostRow> = sqlx::query_as(&format!(
            "SELECT {POST_COLUMNS} FROM blog_posts WHERE published \
             ORDER BY published_at DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Slugs and publish dates of all published posts (for the sitemap).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn published_slugs(
        &self,
    ) -> Result<Vec<(String, DateTime<Utc>)>, RepositoryError> {
        let rows: Vec<(String, DateTime<Utc>)> = sqlx::query_as(
            "SELECT slug, published_at FROM blog_posts WHERE published \
             ORDER BY published_at DESC",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Get a post by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get(&self, id: BlogPostId) -> Result<Option<BlogPost>, RepositoryError> {
        let row: Option<BlogPostRow> = sqlx::query_as(&format!(
            "SELECT {POST_COLUMNS} FROM blog_posts WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a published post by slug (public detail view).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get_published_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<BlogPost>, RepositoryError> {
        let row: Option<BlogPostRow> = sqlx::query_as(&format!(
            "SELECT {POST_COLUMNS} FROM blog_posts WHERE slug = $1 AND published"
        ))
        .bind(slug)
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create a post. `published_at` is set iff `published` is true.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, new: &NewBlogPost) -> Result<BlogPost, RepositoryError> {
        let row: BlogPostRow = sqlx::query_as(&format!(
            "INSERT INTO blog_posts \
             (id, title, slug, excerpt, content, published, published_at, category, tags, \
              author, featured_image) \
             VALUES ($1, $2, $3, $4, $5, $6, CASE WHEN $6 THEN NOW() END, $7, $8, $9, $10) \
             RETURNING {POST_COLUMNS}"
        ))
        .bind(BlogPostId::generate().as_uuid())
        .bind(&new.title)
        .bind(&new.slug)
        .bind(&new.excerpt)
        .bind(&new.content)
        .bind(new.published)
        .bind(&new.category)
        .bind(&new.tags)
        .bind(&new.author)
        .bind(&new.featured_image)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "slug already exists"))?;

        row.try_into()
    }

    /// Apply a partial update to a post.
    ///
    /// Publish transitions keep the invariant: turning `published` on for a
    /// draft stamps a fresh `published_at`; turning it off clears it; an
    /// already-published post keeps its original timestamp.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the post doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new slug is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: BlogPostId,
        update: &BlogPostUpdate,
    ) -> Result<BlogPost, RepositoryError> {
        if update.is_empty() {
            return self.get(id).await?.ok_or(RepositoryError::NotFound);
        }

        let mut qb = QueryBuilder::<Postgres>::new("UPDATE blog_posts SET updated_at = NOW()");
        if let Some(title) = &update.title {
            qb.push(", title = ").push_bind(title);
        }
        if let Some(slug) = &update.slug {
            qb.push(", slug = ").push_bind(slug);
        }
        if let Some(excerpt) = &update.excerpt {
            qb.push(", excerpt = ").push_bind(excerpt.clone());
        }
        if let Some(content) = &update.content {
            qb.push(", content = ").push_bind(content);
        }
        if let Some(published) = update.published {
            qb.push(", published = ").push_bind(published);
            if published {
                // `published` on the right-hand side is the pre-update value
                qb.push(", published_at = CASE WHEN published THEN published_at ELSE NOW() END");
            } else {
                qb.push(", published_at = NULL");
            }
        }
        if let Some(category) = &update.category {
            qb.push(", category = ").push_bind(category.clone());
        }
        if let Some(tags) = &update.tags {
            qb.push(", tags = ").push_bind(tags.clone());
        }
        if let Some(author) = &update.author {
            qb.push(", author = ").push_bind(author.clone());
        }
        if let Some(featured_image) = &update.featured_image {
            qb.push(", featured_image = ").push_bind(featured_image.clone());
        }
        qb.push(" WHERE id = ")
            .push_bind(id.as_uuid())
            .push(format!(" RETURNING {POST_COLUMNS}"));

        let row: Option<BlogPostRow> = qb
            .build_query_as()
            .fetch_optional(self.pool)
            .await
            .map_err(|e| RepositoryError::from_unique(e, "slug already exists"))?;
        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    /// Delete a post by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the post doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: BlogPostId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM blog_posts WHERE id = $1")
            .bind(id.as_uuid())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(published: bool, published_at: Option<DateTime<Utc>>) -> BlogPostRow {
        BlogPostRow {
            id: BlogPostId::generate(),
            title: "Launch notes".to_owned(),
            slug: "launch-notes".to_owned(),
            excerpt: None,
            content: "<p>hello</p>".to_owned(),
            published,
            published_at,
            category: None,
            tags: vec![],
            author: None,
            featured_image: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn consistent_rows_convert() {
        let post = BlogPost::try_from(row(true, Some(Utc::now()))).expect("published row");
        assert!(post.published);
        assert!(post.published_at.is_some());

        let draft = BlogPost::try_from(row(false, None)).expect("draft row");
        assert!(!draft.published);
        assert!(draft.published_at.is_none());
    }

    #[test]
    fn published_without_timestamp_is_corruption() {
        assert!(matches!(
            BlogPost::try_from(row(true, None)),
            Err(RepositoryError::DataCorruption(_))
        ));
    }

    #[test]
    fn draft_with_timestamp_is_corruption() {
        assert!(matches!(
            BlogPost::try_from(row(false, Some(Utc::now()))),
            Err(RepositoryError::DataCorruption(_))
        ));
    }
}
