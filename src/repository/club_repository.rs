use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{
        Club, ClubCategory, ClubFilter, ClubSummary, CreateClubRequest, MeetingSchedule,
        SocialLinks, Weekday,
    },
    error::{AppError, Result},
    repository::{from_json, like_pattern, parse_optional_uuid, parse_uuid, to_json, utc, ClubRepository},
};

#[derive(FromRow)]
struct ClubRow {
    id: String,
    name: String,
    description: String,
    category: String,
    logo: String,
    cover_image: String,
    president_id: String,
    vice_president_id: Option<String>,
    secretary_id: Option<String>,
    website: Option<String>,
    instagram: Option<String>,
    facebook: Option<String>,
    twitter: Option<String>,
    linkedin: Option<String>,
    meeting_day: Option<String>,
    meeting_time: Option<String>,
    meeting_location: Option<String>,
    is_active: i32,
    tags: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

#[derive(FromRow)]
struct ClubSummaryRow {
    id: String,
    name: String,
    logo: String,
    category: String,
}

const CLUB_COLUMNS: &str = r#"
    c.id, c.name, c.description, c.category, c.logo, c.cover_image,
    c.president_id, c.vice_president_id, c.secretary_id,
    c.website, c.instagram, c.facebook, c.twitter, c.linkedin,
    c.meeting_day, c.meeting_time, c.meeting_location,
    c.is_active, c.tags, c.created_at, c.updated_at
"#;

pub struct SqliteClubRepository {
    pool: SqlitePool,
}

impl SqliteClubRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_club(row: ClubRow) -> Result<Club> {
        Ok(Club {
            id: parse_uuid(&row.id)?,
            name: row.name,
            description: row.description,
            category: Self::parse_category(&row.category)?,
            logo: row.logo,
            cover_image: row.cover_image,
            president_id: parse_uuid(&row.president_id)?,
            vice_president_id: parse_optional_uuid(row.vice_president_id.as_deref())?,
            secretary_id: parse_optional_uuid(row.secretary_id.as_deref())?,
            social_links: SocialLinks {
                website: row.website,
                instagram: row.instagram,
                facebook: row.facebook,
                twitter: row.twitter,
                linkedin: row.linkedin,
            },
            meeting_schedule: MeetingSchedule {
                day: row
                    .meeting_day
                    .as_deref()
                    .map(|d| d.parse::<Weekday>())
                    .transpose()
                    .map_err(|e| AppError::Database(e.to_string()))?,
                time: row.meeting_time,
                location: row.meeting_location,
            },
            is_active: row.is_active != 0,
            tags: from_json(&row.tags)?,
            created_at: utc(row.created_at),
            updated_at: utc(row.updated_at),
        })
    }

    fn parse_category(s: &str) -> Result<ClubCategory> {
        s.parse::<ClubCategory>()
            .map_err(|e| AppError::Database(e.to_string()))
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, filter: &ClubFilter) {
        qb.push(" WHERE c.is_active = 1");
        if let Some(category) = filter.category {
            qb.push(" AND c.category = ").push_bind(category.as_str());
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
            let pattern = like_pattern(search);
            qb.push(" AND (c.name LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR c.description LIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\')");
        }
    }

    async fn fetch_clubs(&self, mut qb: QueryBuilder<'_, Sqlite>) -> Result<Vec<Club>> {
        let rows = qb.build_query_as::<ClubRow>().fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::row_to_club).collect()
    }
}

#[async_trait]
impl ClubRepository for SqliteClubRepository {
    async fn create(&self, president_id: Uuid, request: CreateClubRequest) -> Result<Club> {
        let id = Uuid::new_v4();
        let now = Utc::now().naive_utc();
        let tags = to_json(&request.tags)?;
        let links = &request.social_links;
        let schedule = &request.meeting_schedule;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO clubs (
                id, name, description, category, logo, cover_image, president_id,
                website, instagram, facebook, twitter, linkedin,
                meeting_day, meeting_time, meeting_location,
                is_active, tags, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&request.name)
        .bind(&request.description)
        .bind(request.category.as_str())
        .bind(&request.logo)
        .bind(&request.cover_image)
        .bind(president_id.to_string())
        .bind(&links.website)
        .bind(&links.instagram)
        .bind(&links.facebook)
        .bind(&links.twitter)
        .bind(&links.linkedin)
        .bind(schedule.day.map(|d| d.as_str()))
        .bind(&schedule.time)
        .bind(&schedule.location)
        .bind(&tags)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        // The president is always the first member
        sqlx::query("INSERT INTO club_members (club_id, user_id, joined_at) VALUES (?, ?, ?)")
            .bind(id.to_string())
            .bind(president_id.to_string())
            .bind(now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created club".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Club>> {
        let row = sqlx::query_as::<_, ClubRow>(&format!(
            "SELECT {} FROM clubs c WHERE c.id = ?",
            CLUB_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_club).transpose()
    }

    async fn list(&self, filter: &ClubFilter, limit: i64, offset: i64) -> Result<Vec<Club>> {
        let mut qb = QueryBuilder::new(format!("SELECT {} FROM clubs c", CLUB_COLUMNS));
        Self::push_filters(&mut qb, filter);
        qb.push(" ORDER BY c.created_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        self.fetch_clubs(qb).await
    }

    async fn count(&self, filter: &ClubFilter) -> Result<i64> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT COUNT(*) FROM clubs c");
        Self::push_filters(&mut qb, filter);

        let count = qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn list_trending(&self, limit: i64) -> Result<Vec<Club>> {
        let mut qb = QueryBuilder::new(format!(
            r#"
            SELECT {}
            FROM clubs c
            LEFT JOIN club_members m ON m.club_id = c.id
            WHERE c.is_active = 1
            GROUP BY c.id
            ORDER BY COUNT(m.user_id) DESC, c.created_at DESC
            LIMIT "#,
            CLUB_COLUMNS
        ));
        qb.push_bind(limit);

        self.fetch_clubs(qb).await
    }

    async fn update(&self, club: &Club) -> Result<Club> {
        let tags = to_json(&club.tags)?;
        let links = &club.social_links;
        let schedule = &club.meeting_schedule;
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            UPDATE clubs
            SET name = ?, description = ?, category = ?, logo = ?, cover_image = ?,
                vice_president_id = ?, secretary_id = ?,
                website = ?, instagram = ?, facebook = ?, twitter = ?, linkedin = ?,
                meeting_day = ?, meeting_time = ?, meeting_location = ?,
                is_active = ?, tags = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&club.name)
        .bind(&club.description)
        .bind(club.category.as_str())
        .bind(&club.logo)
        .bind(&club.cover_image)
        .bind(club.vice_president_id.map(|id| id.to_string()))
        .bind(club.secretary_id.map(|id| id.to_string()))
        .bind(&links.website)
        .bind(&links.instagram)
        .bind(&links.facebook)
        .bind(&links.twitter)
        .bind(&links.linkedin)
        .bind(schedule.day.map(|d| d.as_str()))
        .bind(&schedule.time)
        .bind(&schedule.location)
        .bind(club.is_active as i32)
        .bind(&tags)
        .bind(now)
        .bind(club.id.to_string())
        .execute(&self.pool)
        .await?;

        self.find_by_id(club.id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated club".to_string())
        })
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM clubs WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn add_member(&self, club_id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO club_members (club_id, user_id, joined_at) VALUES (?, ?, ?)",
        )
        .bind(club_id.to_string())
        .bind(user_id.to_string())
        .bind(Utc::now().naive_utc())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn remove_member(&self, club_id: Uuid, user_id: Uuid) -> Result<bool> {
        let club_id = club_id.to_string();
        let user_id = user_id.to_string();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM club_members WHERE club_id = ? AND user_id = ?")
            .bind(&club_id)
            .bind(&user_id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() != 1 {
            return Ok(false);
        }

        // Officers must be members
        sqlx::query(
            r#"
            UPDATE clubs SET
                vice_president_id = CASE WHEN vice_president_id = ? THEN NULL ELSE vice_president_id END,
                secretary_id = CASE WHEN secretary_id = ? THEN NULL ELSE secretary_id END,
                updated_at = ?
            WHERE id = ? AND (vice_president_id = ? OR secretary_id = ?)
            "#,
        )
        .bind(&user_id)
        .bind(&user_id)
        .bind(Utc::now().naive_utc())
        .bind(&club_id)
        .bind(&user_id)
        .bind(&user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn is_member(&self, club_id: Uuid, user_id: Uuid) -> Result<bool> {
        let found = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM club_members WHERE club_id = ? AND user_id = ?",
        )
        .bind(club_id.to_string())
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await?;

        Ok(found > 0)
    }

    async fn member_ids(&self, club_id: Uuid) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, String>(
            "SELECT user_id FROM club_members WHERE club_id = ? ORDER BY joined_at ASC",
        )
        .bind(club_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        ids.iter().map(|id| parse_uuid(id)).collect()
    }

    async fn member_count(&self, club_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM club_members WHERE club_id = ?",
        )
        .bind(club_id.to_string())
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn list_for_member(&self, user_id: Uuid) -> Result<Vec<Club>> {
        let rows = sqlx::query_as::<_, ClubRow>(&format!(
            r#"
            SELECT {}
            FROM clubs c
            JOIN club_members m ON m.club_id = c.id
            WHERE m.user_id = ?
            ORDER BY m.joined_at ASC
            "#,
            CLUB_COLUMNS
        ))
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_club).collect()
    }

    async fn club_ids_for_member(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, String>(
            "SELECT club_id FROM club_members WHERE user_id = ?",
        )
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        ids.iter().map(|id| parse_uuid(id)).collect()
    }

    async fn find_summaries(&self, ids: &[Uuid]) -> Result<Vec<ClubSummary>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT id, name, logo, category FROM clubs WHERE id IN (");
        let mut separated = qb.separated(", ");
        for id in ids {
            separated.push_bind(id.to_string());
        }
        separated.push_unseparated(")");

        let rows = qb.build_query_as::<ClubSummaryRow>().fetch_all(&self.pool).await?;

        rows.into_iter()
            .map(|r| {
                Ok(ClubSummary {
                    id: parse_uuid(&r.id)?,
                    name: r.name,
                    logo: r.logo,
                    category: Self::parse_category(&r.category)?,
                })
            })
            .collect()
    }
}
