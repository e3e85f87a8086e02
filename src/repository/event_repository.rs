use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::{
    domain::{CreateEventRequest, Event, EventFilter, EventStatus, EventType},
    error::{AppError, Result},
    repository::{from_json, like_pattern, parse_uuid, to_json, utc, EventRepository},
};

#[derive(FromRow)]
struct EventRow {
    id: String,
    title: String,
    description: String,
    club_id: String,
    organizer_id: String,
    event_type: String,
    start_date: NaiveDateTime,
    end_date: NaiveDateTime,
    location: String,
    venue: String,
    max_participants: i32,
    registration_deadline: Option<NaiveDateTime>,
    is_registration_required: i32,
    registration_fee: f64,
    images: String,
    tags: String,
    is_active: i32,
    status: String,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

const EVENT_COLUMNS: &str = r#"
    e.id, e.title, e.description, e.club_id, e.organizer_id, e.event_type,
    e.start_date, e.end_date, e.location, e.venue, e.max_participants,
    e.registration_deadline, e.is_registration_required, e.registration_fee,
    e.images, e.tags, e.is_active, e.status, e.created_at, e.updated_at
"#;

pub struct SqliteEventRepository {
    pool: SqlitePool,
}

impl SqliteEventRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_event(row: EventRow) -> Result<Event> {
        Ok(Event {
            id: parse_uuid(&row.id)?,
            title: row.title,
            description: row.description,
            club_id: parse_uuid(&row.club_id)?,
            organizer_id: parse_uuid(&row.organizer_id)?,
            event_type: row
                .event_type
                .parse::<EventType>()
                .map_err(|e| AppError::Database(e.to_string()))?,
            start_date: utc(row.start_date),
            end_date: utc(row.end_date),
            location: row.location,
            venue: row.venue,
            max_participants: row.max_participants,
            registration_deadline: row.registration_deadline.map(utc),
            is_registration_required: row.is_registration_required != 0,
            registration_fee: row.registration_fee,
            images: from_json(&row.images)?,
            tags: from_json(&row.tags)?,
            is_active: row.is_active != 0,
            status: row
                .status
                .parse::<EventStatus>()
                .map_err(|e| AppError::Database(e.to_string()))?,
            created_at: utc(row.created_at),
            updated_at: utc(row.updated_at),
        })
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, filter: &EventFilter) {
        qb.push(" WHERE e.is_active = 1");
        if let Some(club_id) = filter.club_id {
            qb.push(" AND e.club_id = ").push_bind(club_id.to_string());
        }
        if let Some(event_type) = filter.event_type {
            qb.push(" AND e.event_type = ").push_bind(event_type.as_str());
        }
        if let Some(status) = filter.status {
            qb.push(" AND e.status = ").push_bind(status.as_str());
        }
        if let Some(starts_after) = filter.starts_after {
            qb.push(" AND e.start_date >= ").push_bind(starts_after.naive_utc());
        }
        if let Some(participant_id) = filter.participant_id {
            qb.push(" AND EXISTS (SELECT 1 FROM event_registrations r WHERE r.event_id = e.id AND r.user_id = ")
                .push_bind(participant_id.to_string())
                .push(")");
        }
        if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
            let pattern = like_pattern(search);
            qb.push(" AND (e.title LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR e.description LIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\')");
        }
    }
}

#[async_trait]
impl EventRepository for SqliteEventRepository {
    async fn create(&self, organizer_id: Uuid, request: CreateEventRequest) -> Result<Event> {
        let id = Uuid::new_v4();
        let now = Utc::now().naive_utc();
        let images = to_json(&request.images)?;
        let tags = to_json(&request.tags)?;

        sqlx::query(
            r#"
            INSERT INTO events (
                id, title, description, club_id, organizer_id, event_type,
                start_date, end_date, location, venue, max_participants,
                registration_deadline, is_registration_required, registration_fee,
                images, tags, is_active, status, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.club.to_string())
        .bind(organizer_id.to_string())
        .bind(request.event_type.as_str())
        .bind(request.start_date.naive_utc())
        .bind(request.end_date.naive_utc())
        .bind(&request.location)
        .bind(&request.venue)
        .bind(request.max_participants)
        .bind(request.registration_deadline.map(|dt| dt.naive_utc()))
        .bind(request.is_registration_required as i32)
        .bind(request.registration_fee)
        .bind(&images)
        .bind(&tags)
        .bind(EventStatus::Upcoming.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.find_by_id(id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve created event".to_string())
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Event>> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {} FROM events e WHERE e.id = ?",
            EVENT_COLUMNS
        ))
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_event).transpose()
    }

    async fn list(&self, filter: &EventFilter, limit: i64, offset: i64) -> Result<Vec<Event>> {
        let mut qb = QueryBuilder::new(format!("SELECT {} FROM events e", EVENT_COLUMNS));
        Self::push_filters(&mut qb, filter);
        qb.push(" ORDER BY e.start_date ASC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = qb.build_query_as::<EventRow>().fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::row_to_event).collect()
    }

    async fn count(&self, filter: &EventFilter) -> Result<i64> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT COUNT(*) FROM events e");
        Self::push_filters(&mut qb, filter);

        let count = qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;
        Ok(count)
    }

    async fn update(&self, event: &Event) -> Result<Event> {
        let images = to_json(&event.images)?;
        let tags = to_json(&event.tags)?;
        let now = Utc::now().naive_utc();

        sqlx::query(
            r#"
            UPDATE events
            SET title = ?, description = ?, event_type = ?, start_date = ?, end_date = ?,
                location = ?, venue = ?, max_participants = ?, registration_deadline = ?,
                is_registration_required = ?, registration_fee = ?, images = ?, tags = ?,
                is_active = ?, status = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.event_type.as_str())
        .bind(event.start_date.naive_utc())
        .bind(event.end_date.naive_utc())
        .bind(&event.location)
        .bind(&event.venue)
        .bind(event.max_participants)
        .bind(event.registration_deadline.map(|dt| dt.naive_utc()))
        .bind(event.is_registration_required as i32)
        .bind(event.registration_fee)
        .bind(&images)
        .bind(&tags)
        .bind(event.is_active as i32)
        .bind(event.status.as_str())
        .bind(now)
        .bind(event.id.to_string())
        .execute(&self.pool)
        .await?;

        self.find_by_id(event.id).await?.ok_or_else(|| {
            AppError::Database("Failed to retrieve updated event".to_string())
        })
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn register(&self, event_id: Uuid, user_id: Uuid) -> Result<bool> {
        let event_id = event_id.to_string();

        // Seat check and insert are one statement.
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO event_registrations (event_id, user_id, registered_at)
            SELECT ?, ?, ?
            FROM events e
            WHERE e.id = ?
              AND (
                e.max_participants = 0
                OR (SELECT COUNT(*) FROM event_registrations r WHERE r.event_id = e.id)
                    < e.max_participants
              )
            "#,
        )
        .bind(&event_id)
        .bind(user_id.to_string())
        .bind(Utc::now().naive_utc())
        .bind(&event_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn unregister(&self, event_id: Uuid, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "DELETE FROM event_registrations WHERE event_id = ? AND user_id = ?",
        )
        .bind(event_id.to_string())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn is_registered(&self, event_id: Uuid, user_id: Uuid) -> Result<bool> {
        let found = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM event_registrations WHERE event_id = ? AND user_id = ?",
        )
        .bind(event_id.to_string())
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await?;

        Ok(found > 0)
    }

    async fn registration_count(&self, event_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM event_registrations WHERE event_id = ?",
        )
        .bind(event_id.to_string())
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    async fn participant_ids(&self, event_id: Uuid) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, String>(
            "SELECT user_id FROM event_registrations WHERE event_id = ? ORDER BY registered_at ASC",
        )
        .bind(event_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        ids.iter().map(|id| parse_uuid(id)).collect()
    }
}
