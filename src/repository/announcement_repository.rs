use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{Announcement, AnnouncementFilter, Audience, Priority, TargetAudience},
    error::{AppError, Result},
    repository::{
        from_json, like_pattern, parse_optional_uuid, parse_uuid, to_json, utc,
        AnnouncementRepository,
    },
};

#[derive(FromRow)]
struct AnnouncementRow {
    id: String,
    title: String,
    content: String,
    author_id: String,
    club_id: Option<String>,
    priority: String,
    target_audience: String,
    target_club_id: Option<String>,
    target_user_ids: Option<String>,
    attachments: String,
    is_active: i32,
    expires_at: Option<NaiveDateTime>,
    tags: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

const ANNOUNCEMENT_COLUMNS: &str = r#"
    a.id, a.title, a.content, a.author_id, a.club_id, a.priority,
    a.target_audience, a.target_club_id,
    (SELECT group_concat(t.user_id) FROM announcement_targets t
        WHERE t.announcement_id = a.id) AS target_user_ids,
    a.attachments, a.is_active, a.expires_at, a.tags, a.created_at, a.updated_at
"#;

pub struct SqliteAnnouncementRepository {
    pool: SqlitePool,
}

impl SqliteAnnouncementRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_announcement(row: AnnouncementRow) -> Result<Announcement> {
        let target_user_ids = row
            .target_user_ids
            .as_deref()
            .filter(|ids| !ids.is_empty())
            .map(|ids| ids.split(',').map(parse_uuid).collect::<Result<Vec<_>>>())
            .transpose()?
            .unwrap_or_default();

        Ok(Announcement {
            id: parse_uuid(&row.id)?,
            title: row.title,
            content: row.content,
            author_id: parse_uuid(&row.author_id)?,
            club_id: parse_optional_uuid(row.club_id.as_deref())?,
            priority: row
                .priority
                .parse::<Priority>()
                .map_err(|e| AppError::Database(e.to_string()))?,
            target_audience: row
                .target_audience
                .parse::<TargetAudience>()
                .map_err(|e| AppError::Database(e.to_string()))?,
            target_club_id: parse_optional_uuid(row.target_club_id.as_deref())?,
            target_user_ids,
            attachments: from_json(&row.attachments)?,
            is_active: row.is_active != 0,
            expires_at: row.expires_at.map(utc),
            tags: from_json(&row.tags)?,
            created_at: utc(row.created_at),
            updated_at: utc(row.updated_at),
        })
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, filter: &AnnouncementFilter) {
        qb.push(" WHERE a.is_active = 1 AND (a.expires_at IS NULL OR a.expires_at > ")
            .push_bind(filter.now.naive_utc())
            .push(")");
        if let Some(club_id) = filter.club_id {
            qb.push(" AND a.club_id = ").push_bind(club_id.to_string());
        }
        if let Some(priority) = filter.priority {
            qb.push(" AND a.priority = ").push_bind(priority.as_str());
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
            let pattern = like_pattern(search);
            qb.push(" AND (a.title LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR a.content LIKE ")
                .push_bind(pattern.clone())
                .push(
                    " ESCAPE '\\' OR EXISTS \
                     (SELECT 1 FROM json_each(a.tags) tag WHERE tag.value LIKE ",
                )
                .push_bind(pattern)
                .push(" ESCAPE '\\'))");
        }

        match filter.audience {
            Audience::Admin(_) => {}
            Audience::Anonymous => {
                qb.push(" AND a.target_audience = 'all'");
            }
            Audience::User(viewer) => {
                let viewer = viewer.to_string();
                qb.push(" AND (a.target_audience = 'all' OR a.author_id = ")
                    .push_bind(viewer.clone())
                    .push(
                        " OR (a.target_audience = 'club_members' AND EXISTS \
                         (SELECT 1 FROM club_members m WHERE m.club_id = a.club_id AND m.user_id = ",
                    )
                    .push_bind(viewer.clone())
                    .push(
                        ")) OR (a.target_audience = 'specific_club' AND EXISTS \
                         (SELECT 1 FROM club_members m WHERE m.club_id = a.target_club_id AND m.user_id = ",
                    )
                    .push_bind(viewer.clone())
                    .push(
                        ")) OR (a.target_audience = 'specific_users' AND EXISTS \
                         (SELECT 1 FROM announcement_targets t WHERE t.announcement_id = a.id AND t.user_id = ",
                    )
                    .push_bind(viewer)
                    .push(")))");
            }
        }
    }

    async fn replace_targets(
        tx: &mut sqlx::Transaction<'_, Sqlite>,
        announcement_id: Uuid,
        user_ids: &[Uuid],
    ) -> Result<()> {
        sqlx::query("DELETE FROM announcement_targets WHERE announcement_id = ?")
            .bind(announcement_id.to_string())
            .execute(&mut **tx)
            .await?;

        for user_id in user_ids {
            sqlx::query(
                "INSERT OR IGNORE INTO announcement_targets (announcement_id, user_id) VALUES (?, ?)",
            )
            .bind(announcement_id.to_string())
            .bind(user_id.to_string())
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }
}

#[async_trait]
impl AnnouncementRepository for SqliteAnnouncementRepository {
    async fn create(&self, announcement: Announcement) -> Result<Announcement> {
        let attachments = to_json(&announcement.attachments)?;
        let tags = to_json(&announcement.tags)?;
        let now = Utc::now().naive_utc();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO announcements (
                id, title, content, author_id, club_id, priority, target_audience,
                target_club_id, attachments, is_active, expires_at, tags,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(announcement.id.to_string())
        .bind(&announcement.title)
        .bind(&announcement.content)
        .bind(announcement.author_id.to_string())
        .bind(announcement.club_id.map(|id| id.to_string()))
        .bind(announcement.priority.as_str())
        .bind(announcement.target_audience.as_str())
        .bind(announcement.target_club_id.map(|id| id.to_string()))
        .bind(&attachments)
        .bind(announcement.is_active as i32)
        .bind(announcement.expires_at.map(|dt| dt.naive_utc()))
        .bind(&tags)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        Self::replace_targets(&mut tx, announcement.id, &announcement.target_user_ids).await?;

        tx.commit().await?;

        self.find_by_id(announcement.id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created announcement".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Announcement>> {
        let row = sqlx::query_as::<_, AnnouncementRow>(&format!(
            "SELECT {} FROM announcements a WHERE a.id = ?",
            ANNOUNCEMENT_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_announcement).transpose()
    }

    async fn list(&self, filter: &AnnouncementFilter, limit: i64, offset: i64) -> Result<Vec<Announcement>> {
        let mut qb = QueryBuilder::new(format!(
            "SELECT {} FROM announcements a",
            ANNOUNCEMENT_COLUMNS
        ));
        Self::push_filters(&mut qb, filter);
        qb.push(
            r#"
            ORDER BY CASE a.priority
                WHEN 'urgent' THEN 3
                WHEN 'high' THEN 2
                WHEN 'medium' THEN 1
                ELSE 0
            END DESC, a.created_at DESC
            LIMIT "#,
        )
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);

        let rows = qb.build_query_as::<AnnouncementRow>().fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::row_to_announcement).collect()
    }

    async fn count(&self, filter: &AnnouncementFilter) -> Result<i64> {
        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new("SELECT COUNT(*) FROM announcements a");
        Self::push_filters(&mut qb, filter);

        let count = qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn update(&self, announcement: &Announcement) -> Result<Announcement> {
        let attachments = to_json(&announcement.attachments)?;
        let tags = to_json(&announcement.tags)?;
        let now = Utc::now().naive_utc();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE announcements
            SET title = ?, content = ?, priority = ?, target_audience = ?,
                target_club_id = ?, attachments = ?, is_active = ?, expires_at = ?,
                tags = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&announcement.title)
        .bind(&announcement.content)
        .bind(announcement.priority.as_str())
        .bind(announcement.target_audience.as_str())
        .bind(announcement.target_club_id.map(|id| id.to_string()))
        .bind(&attachments)
        .bind(announcement.is_active as i32)
        .bind(announcement.expires_at.map(|dt| dt.naive_utc()))
        .bind(&tags)
        .bind(now)
        .bind(announcement.id.to_string())
        .execute(&mut *tx)
        .await?;

        Self::replace_targets(&mut tx, announcement.id, &announcement.target_user_ids).await?;

        tx.commit().await?;

        self.find_by_id(announcement.id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated announcement".to_string())
        })
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM announcements WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
