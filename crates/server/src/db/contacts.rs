//! Contact repository for database operations.
//!
//! Contacts arrive through the public intake endpoints and are worked by
//! admins through status changes and assignment. There is no delete: closed
//! contacts keep their history.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use lumeo_core::{ContactId, ContactStatus, Email, UserId};

use super::RepositoryError;
use crate::listing::Pagination;
use crate::models::Contact;

const CONTACT_COLUMNS: &str =
    "id, name, email, company, industry, message, status, assigned_to, created_at, updated_at";

/// Internal row type for contact queries.
#[derive(Debug, sqlx::FromRow)]
struct ContactRow {
    id: ContactId,
    name: String,
    email: String,
    company: Option<String>,
    industry: Option<String>,
    message: Option<String>,
    status: String,
    assigned_to: Option<UserId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ContactRow> for Contact {
    type Error = RepositoryError;

    fn try_from(row: ContactRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let status: ContactStatus = row
            .status
            .parse()
            .map_err(RepositoryError::DataCorruption)?;

        Ok(Self {
            id: row.id,
            name: row.name,
            email,
            company: row.company,
            industry: row.industry,
            message: row.message,
            status,
            assigned_to: row.assigned_to,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Filters for contact listings.
#[derive(Debug, Default)]
pub struct ContactFilter {
    /// Case-insensitive substring over name, email, and company.
    pub search: Option<String>,
    pub status: Option<ContactStatus>,
    pub assigned_to: Option<UserId>,
}

/// Fields for creating a contact.
#[derive(Debug)]
pub struct NewContact {
    pub name: String,
    pub email: Email,
    pub company: Option<String>,
    pub industry: Option<String>,
    pub message: Option<String>,
}

/// Partial update of a contact.
///
/// `assigned_to` uses two levels of `Option`: the outer means "change this
/// field", the inner allows clearing the assignment.
#[derive(Debug, Default)]
pub struct ContactUpdate {
    pub name: Option<String>,
    pub company: Option<String>,
    pub industry: Option<String>,
    pub status: Option<ContactStatus>,
    pub assigned_to: Option<Option<UserId>>,
}

impl ContactUpdate {
    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.company.is_none()
            && self.industry.is_none()
            && self.status.is_none()
            && self.assigned_to.is_none()
    }
}

/// Repository for contact database operations.
pub struct ContactRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ContactRepository<'a> {
    /// Create a new contact repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &ContactFilter) {
        if let Some(term) = &filter.search {
            let pattern = format!("%{term}%");
            qb.push(" AND (name ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR email ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR company ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status.as_str());
        }
        if let Some(assigned_to) = filter.assigned_to {
            qb.push(" AND assigned_to = ").push_bind(assigned_to.as_uuid());
        }
    }

    /// List contacts matching the filter, most recently updated first.
    ///
    /// Returns the page of contacts and the total match count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn list(
        &self,
        filter: &ContactFilter,
        pagination: Pagination,
    ) -> Result<(Vec<Contact>, i64), RepositoryError> {
        let mut count_qb =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM contacts WHERE 1=1");
        Self::push_filters(&mut count_qb, filter);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(self.pool)
            .await?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts WHERE 1=1"
        ));
        Self::push_filters(&mut qb, filter);
        qb.push(" ORDER BY updated_at DESC LIMIT ")
            .push_bind(pagination.limit)
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let rows: Vec<ContactRow> = qb.build_query_as().fetch_all(self.pool).await?;
        let contacts = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<_, _>>()?;
        Ok((contacts, total))
    }

    /// Get a contact by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get(&self, id: ContactId) -> Result<Option<Contact>, RepositoryError> {
        let row: Option<ContactRow> = sqlx::query_as(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create a contact with status NEW.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, new: &NewContact) -> Result<Contact, RepositoryError> {
        let row: ContactRow = sqlx::query_as(&format!(
            "INSERT INTO contacts (id, name, email, company, industry, message, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {CONTACT_COLUMNS}"
        ))
        .bind(ContactId::generate().as_uuid())
        .bind(&new.name)
        .bind(new.email.as_str())
        .bind(&new.company)
        .bind(&new.industry)
        .bind(&new.message)
        .bind(ContactStatus::New.as_str())
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Apply a partial update to a contact.
    ///
    /// An update with no changed fields returns the current record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the contact doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: ContactId,
        update: &ContactUpdate,
    ) -> Result<Contact, RepositoryError> {
        if update.is_empty() {
            return self.get(id).await?.ok_or(RepositoryError::NotFound);
        }

        let mut qb = QueryBuilder::<Postgres>::new("UPDATE contacts SET updated_at = NOW()");
        if let Some(name) = &update.name {
            qb.push(", name = ").push_bind(name);
        }
        if let Some(company) = &update.company {
            qb.push(", company = ").push_bind(company);
        }
        if let Some(industry) = &update.industry {
            qb.push(", industry = ").push_bind(industry);
        }
        if let Some(status) = update.status {
            qb.push(", status = ").push_bind(status.as_str());
        }
        if let Some(assigned_to) = update.assigned_to {
            qb.push(", assigned_to = ")
                .push_bind(assigned_to.map(|u| u.as_uuid()));
        }
        qb.push(" WHERE id = ")
            .push_bind(id.as_uuid())
            .push(format!(" RETURNING {CONTACT_COLUMNS}"));

        let row: Option<ContactRow> = qb.build_query_as().fetch_optional(self.pool).await?;
        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    /// Count contacts grouped by status (for the dashboard).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_by_status(&self) -> Result<Vec<(String, i64)>, RepositoryError> {
        let rows: Vec<(String, i64)> =
            sqlx::query_as("SELECT status, COUNT(*) FROM contacts GROUP BY status")
                .fetch_all(self.pool)
                .await?;
        Ok(rows)
    }

    /// Total number of contacts.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contacts")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
