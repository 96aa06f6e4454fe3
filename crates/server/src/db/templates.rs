//! Email template repository.
//!
//! Template variables are extracted from the subject and content on every
//! write, so the stored `variables` column always reflects the current
//! `{{placeholder}}` set.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use sqlx::{PgPool, Postgres, QueryBuilder};

use lumeo_core::TemplateId;

use super::RepositoryError;
use crate::listing::Pagination;
use crate::models::EmailTemplate;

const TEMPLATE_COLUMNS: &str =
    "id, name, subject, content, category, variables, active, created_at, updated_at";

static VARIABLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z0-9_.]+)\s*\}\}").unwrap_or_else(|e| {
        // the pattern is a literal; this cannot fail at runtime
        unreachable!("invalid variable pattern: {e}")
    })
});

/// Extract the deduplicated, sorted set of `{{placeholder}}` names found in
/// the given texts.
#[must_use]
pub fn extract_variables(texts: &[&str]) -> Vec<String> {
    let mut names = BTreeSet::new();
    for text in texts {
        for capture in VARIABLE_RE.captures_iter(text) {
            if let Some(name) = capture.get(1) {
                names.insert(name.as_str().to_owned());
            }
        }
    }
    names.into_iter().collect()
}

#[derive(Debug, sqlx::FromRow)]
struct TemplateRow {
    id: TemplateId,
    name: String,
    subject: String,
    content: String,
    category: Option<String>,
    variables: Vec<String>,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TemplateRow> for EmailTemplate {
    fn from(row: TemplateRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            subject: row.subject,
            content: row.content,
            category: row.category,
            variables: row.variables,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Filters for template listings.
#[derive(Debug, Default)]
pub struct TemplateFilter {
    /// Case-insensitive substring over name and subject.
    pub search: Option<String>,
    pub category: Option<String>,
    pub active: Option<bool>,
}

/// Fields for creating a template. Content is already sanitized by the
/// caller; variables are derived here.
#[derive(Debug)]
pub struct NewTemplate {
    pub name: String,
    pub subject: String,
    pub content: String,
    pub category: Option<String>,
    pub active: bool,
}

/// Partial update of a template.
#[derive(Debug, Default)]
pub struct TemplateUpdate {
    pub name: Option<String>,
    pub subject: Option<String>,
    pub content: Option<String>,
    pub category: Option<Option<String>>,
    pub active: Option<bool>,
}

impl TemplateUpdate {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.subject.is_none()
            && self.content.is_none()
            && self.category.is_none()
            && self.active.is_none()
    }
}

/// Repository for email template database operations.
pub struct TemplateRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TemplateRepository<'a> {
    /// Create a new template repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &TemplateFilter) {
        if let Some(term) = &filter.search {
            let pattern = format!("%{term}%");
            qb.push(" AND (name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR subject ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(category) = &filter.category {
            qb.push(" AND category = ").push_bind(category.clone());
        }
        if let Some(active) = filter.active {
            qb.push(" AND active = ").push_bind(active);
        }
    }

    /// List templates, most recently updated first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(
        &self,
        filter: &TemplateFilter,
        pagination: Pagination,
    ) -> Result<(Vec<EmailTemplate>, i64), RepositoryError> {
        let mut count_qb =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM email_templates WHERE 1=1");
        Self::push_filters(&mut count_qb, filter);
        let total: i64 = count_qb.build_query_scalar().fetch_one(self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {TEMPLATE_COLUMNS} FROM email_templates WHERE 1=1"
        ));
        Self::push_filters(&mut qb, filter);
        qb.push(" ORDER BY updated_at DESC LIMIT ")
            .push_bind(pagination.limit)
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let rows: Vec<TemplateRow> = qb.build_query_as().fetch_all(self.pool).await?;
        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    /// Get a template by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: TemplateId) -> Result<Option<EmailTemplate>, RepositoryError> {
        let row: Option<TemplateRow> = sqlx::query_as(&format!(
            "SELECT {TEMPLATE_COLUMNS} FROM email_templates WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Create a template, deriving its variable set.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, new: &NewTemplate) -> Result<EmailTemplate, RepositoryError> {
        let variables = extract_variables(&[&new.subject, &new.content]);

        let row: TemplateRow = sqlx::query_as(&format!(
            "INSERT INTO email_templates (id, name, subject, content, category, variables, active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {TEMPLATE_COLUMNS}"
        ))
        .bind(TemplateId::generate().as_uuid())
        .bind(&new.name)
        .bind(&new.subject)
        .bind(&new.content)
        .bind(&new.category)
        .bind(&variables)
        .bind(new.active)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_unique(e, "template name already exists"))?;

        Ok(row.into())
    }

    /// Apply a partial update, re-deriving variables when subject or content
    /// change.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the template doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new name is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: TemplateId,
        update: &TemplateUpdate,
    ) -> Result<EmailTemplate, RepositoryError> {
        if update.is_empty() {
            return self.get(id).await?.ok_or(RepositoryError::NotFound);
        }

        // Variables depend on the post-update subject and content, so fetch
        // the current record first when either one changes.
        let variables = if update.subject.is_some() || update.content.is_some() {
            let current = self.get(id).await?.ok_or(RepositoryError::NotFound)?;
            let subject = update.subject.as_deref().unwrap_or(&current.subject);
            let content = update.content.as_deref().unwrap_or(&current.content);
            Some(extract_variables(&[subject, content]))
        } else {
            None
        };

        let mut qb = QueryBuilder::<Postgres>::new("UPDATE email_templates SET updated_at = NOW()");
        if let Some(name) = &update.name {
            qb.push(", name = ").push_bind(name);
        }
        if let Some(subject) = &update.subject {
            qb.push(", subject = ").push_bind(subject);
        }
        if let Some(content) = &update.content {
            qb.push(", content = ").push_bind(content);
        }
        if let Some(category) = &update.category {
            qb.push(", category = ").push_bind(category.clone());
        }
        if let Some(active) = update.active {
            qb.push(", active = ").push_bind(active);
        }
        if let Some(variables) = &variables {
            qb.push(", variables = ").push_bind(variables.clone());
        }
        qb.push(" WHERE id = ")
            .push_bind(id.as_uuid())
            .push(format!(" RETURNING {TEMPLATE_COLUMNS}"));

        let row: Option<TemplateRow> = qb
            .build_query_as()
            .fetch_optional(self.pool)
            .await
            .map_err(|e| RepositoryError::from_unique(e, "template name already exists"))?;
        Ok(row.ok_or(RepositoryError::NotFound)?.into())
    }

    /// Delete a template by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the template doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: TemplateId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM email_templates WHERE id = $1")
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
    use super::extract_variables;

    #[test]
    fn extracts_placeholder_names() {
        let vars = extract_variables(&["Hello {{name}}", "Your plan: {{plan}} for {{name}}"]);
        assert_eq!(vars, vec!["name".to_owned(), "plan".to_owned()]);
    }

    #[test]
    fn tolerates_whitespace_inside_braces() {
        let vars = extract_variables(&["{{ first_name }} {{last.touch}}"]);
        assert_eq!(vars, vec!["first_name".to_owned(), "last.touch".to_owned()]);
    }

    #[test]
    fn ignores_unclosed_and_empty_braces() {
        let vars = extract_variables(&["{{}} {{ }} {{open", "plain text"]);
        assert!(vars.is_empty());
    }
}
