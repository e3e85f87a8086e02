use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{NewUser, UpdateProfileRequest, User, UserRole, UserSummary},
    error::{AppError, Result},
    repository::{from_json, like_pattern, parse_uuid, to_json, utc, UserRepository},
};

// Database row struct that matches SQLite schema
#[derive(FromRow)]
struct UserRow {
    id: String,
    name: String,
    email: String,
    role: String,
    bio: Option<String>,
    interests: String,
    profile_picture: Option<String>,
    is_active: i32,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

#[derive(FromRow)]
struct CredentialsRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: String,
}

#[derive(FromRow)]
struct SummaryRow {
    id: String,
    name: String,
    email: String,
    profile_picture: Option<String>,
}

const USER_COLUMNS: &str = "id, name, email, role, bio, interests, profile_picture, is_active, created_at, updated_at";

pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_user(row: UserRow) -> Result<User> {
        Ok(User {
            id: parse_uuid(&row.id)?,
            name: row.name,
            email: row.email,
            role: row
                .role
                .parse::<UserRole>()
                .map_err(|e| AppError::Database(e.to_string()))?,
            bio: row.bio,
            interests: from_json(&row.interests)?,
            profile_picture: row.profile_picture,
            is_active: row.is_active != 0,
            created_at: utc(row.created_at),
            updated_at: utc(row.updated_at),
        })
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn create(&self, user: NewUser) -> Result<User> {
        let id = Uuid::new_v4();
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            INSERT INTO users (
                id, name, email, password_hash, role, interests,
                is_active, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, '[]', 1, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::Conflict("User already exists".to_string())
            }
            other => AppError::Database(other.to_string()),
        })?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created user".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = ?",
            USER_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE email = ?",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_user).transpose()
    }

    async fn find_credentials(&self, email: &str) -> Result<Option<(User, String)>> {
        let row = sqlx::query_as::<_, CredentialsRow>(&format!(
            "SELECT {}, password_hash FROM users WHERE email = ?",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some((Self::row_to_user(r.user)?, r.password_hash))),
            None => Ok(None),
        }
    }

    async fn update_profile(&self, id: Uuid, update: UpdateProfileRequest) -> Result<User> {
        let interests = update.interests.as_ref().map(to_json).transpose()?;
        let now = Utc::now().naive_utc();

        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = COALESCE(?, name),
                bio = COALESCE(?, bio),
                interests = COALESCE(?, interests),
                profile_picture = CASE WHEN ? THEN ? ELSE profile_picture END,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&update.name)
        .bind(&update.bio)
        .bind(interests)
        .bind(update.profile_picture.is_some())
        .bind(update.profile_picture.clone().flatten())
        .bind(now)
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated user".to_string())
        })
    }

    async fn search(&self, query: &str, limit: i64, offset: i64) -> Result<Vec<User>> {
        let pattern = like_pattern(query);
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            SELECT {}
            FROM users
            WHERE is_active = 1
              AND (name LIKE ? ESCAPE '\' OR email LIKE ? ESCAPE '\')
            ORDER BY name ASC
            LIMIT ? OFFSET ?
            "#,
            USER_COLUMNS
        ))
        .bind(&pattern)
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_user).collect()
    }

    async fn count_search(&self, query: &str) -> Result<i64> {
        let pattern = like_pattern(query);
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM users
            WHERE is_active = 1
              AND (name LIKE ? ESCAPE '\' OR email LIKE ? ESCAPE '\')
            "#,
        )
        .bind(&pattern)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn find_summaries(&self, ids: &[Uuid]) -> Result<Vec<UserSummary>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT id, name, email, profile_picture FROM users WHERE id IN (");
        let mut separated = qb.separated(", ");
        for id in ids {
            separated.push_bind(id.to_string());
        }
        separated.push_unseparated(")");

        let rows = qb.build_query_as::<SummaryRow>().fetch_all(&self.pool).await?;

        let mut summaries = rows
            .into_iter()
            .map(|r| {
                Ok(UserSummary {
                    id: parse_uuid(&r.id)?,
                    name: r.name,
                    email: r.email,
                    profile_picture: r.profile_picture,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        // Keep the caller's order (membership / registration order)
        summaries.sort_by_key(|s| ids.iter().position(|id| *id == s.id));
        Ok(summaries)
    }
}
