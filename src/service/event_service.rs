use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::*,
    error::{AppError, FieldViolation, Result},
    repository::{ClubRepository, EventRepository, UserRepository},
};

pub struct EventService {
    event_repo: Arc<dyn EventRepository>,
    club_repo: Arc<dyn ClubRepository>,
    user_repo: Arc<dyn UserRepository>,
}

fn check_dates(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<()> {
    if end < start {
        return Err(AppError::Validation(vec![FieldViolation {
            field: "endDate".to_string(),
            message: "End date must be after start date".to_string(),
        }]));
    }
    Ok(())
}

impl EventService {
    pub fn new(
        event_repo: Arc<dyn EventRepository>,
        club_repo: Arc<dyn ClubRepository>,
        user_repo: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            event_repo,
            club_repo,
            user_repo,
        }
    }

    pub async fn list(&self, filter: &EventFilter, page: Page) -> Result<Paginated<EventListItem>> {
        let events = self.event_repo.list(filter, page.limit, page.offset()).await?;
        let total = self.event_repo.count(filter).await?;

        Ok(Paginated {
            items: self.list_items(events).await?,
            total,
            page,
        })
    }

    /// Active events that have not started yet, soonest first.
    pub async fn upcoming(&self, limit: i64) -> Result<Vec<EventListItem>> {
        let filter = EventFilter {
            starts_after: Some(Utc::now()),
            ..Default::default()
        };
        let events = self.event_repo.list(&filter, limit, 0).await?;
        self.list_items(events).await
    }

    /// Events the user has registered for.
    pub async fn registered_for(
        &self,
        user_id: Uuid,
        status: Option<EventStatus>,
        page: Page,
    ) -> Result<Paginated<EventListItem>> {
        let filter = EventFilter {
            status,
            participant_id: Some(user_id),
            ..Default::default()
        };
        self.list(&filter, page).await
    }

    pub async fn get(&self, id: Uuid) -> Result<EventDetails> {
        let event = self.find(id).await?;

        let participant_ids = self.event_repo.participant_ids(id).await?;
        let mut wanted = participant_ids.clone();
        wanted.push(event.organizer_id);
        let by_id: HashMap<Uuid, UserSummary> = self
            .user_repo
            .find_summaries(&wanted)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();
        let club = self
            .club_repo
            .find_summaries(&[event.club_id])
            .await?
            .into_iter()
            .next();

        Ok(EventDetails {
            club,
            organizer: by_id.get(&event.organizer_id).cloned(),
            registered_participants: participant_ids
                .iter()
                .filter_map(|id| by_id.get(id).cloned())
                .collect(),
            event,
        })
    }

    pub async fn create(&self, organizer: &User, mut request: CreateEventRequest) -> Result<Event> {
        request.normalize();
        request.validate()?;
        check_dates(request.start_date, request.end_date)?;

        self.club_repo
            .find_by_id(request.club)
            .await?
            .ok_or_else(|| AppError::NotFound("Club not found".to_string()))?;

        if !organizer.is_admin() && !self.club_repo.is_member(request.club, organizer.id).await? {
            return Err(AppError::Forbidden(
                "Only club members can create events".to_string(),
            ));
        }

        let event = self.event_repo.create(organizer.id, request).await?;
        tracing::info!("Event {} created in club {} by {}", event.id, event.club_id, organizer.id);

        Ok(event)
    }

    pub async fn update(&self, actor: &User, id: Uuid, mut request: UpdateEventRequest) -> Result<Event> {
        request.normalize();
        request.validate()?;

        let mut event = self.find(id).await?;
        if !self.can_manage(actor, &event).await? {
            return Err(AppError::Forbidden(
                "Not authorized to update this event".to_string(),
            ));
        }

        request.apply_to(&mut event);
        check_dates(event.start_date, event.end_date)?;

        let registered = self.event_repo.registration_count(id).await?;
        if event.has_capacity_limit() && registered > i64::from(event.max_participants) {
            return Err(AppError::BadRequest(
                "Maximum participants cannot be below the current registrations".to_string(),
            ));
        }

        let updated = self.event_repo.update(&event).await?;
        tracing::info!("Event {} updated by {}", id, actor.id);

        Ok(updated)
    }

    pub async fn delete(&self, actor: &User, id: Uuid) -> Result<()> {
        let event = self.find(id).await?;
        if !self.can_manage(actor, &event).await? {
            return Err(AppError::Forbidden(
                "Not authorized to delete this event".to_string(),
            ));
        }

        self.event_repo.delete(id).await?;
        tracing::info!("Event {} deleted by {}", id, actor.id);

        Ok(())
    }

    pub async fn register(&self, user_id: Uuid, id: Uuid) -> Result<()> {
        let event = self.find(id).await?;

        let registered = self.event_repo.registration_count(id).await?;
        let already = self.event_repo.is_registered(id, user_id).await?;
        event
            .check_registration(Utc::now(), registered, already)
            .map_err(|refusal| AppError::BadRequest(refusal.to_string()))?;

        if !self.event_repo.register(id, user_id).await? {
            // Lost a race between the checks above and the insert.
            let refusal = if self.event_repo.is_registered(id, user_id).await? {
                RegistrationRefusal::AlreadyRegistered
            } else {
                RegistrationRefusal::Full
            };
            return Err(AppError::BadRequest(refusal.to_string()));
        }
        tracing::info!("User {} registered for event {}", user_id, id);

        Ok(())
    }

    pub async fn unregister(&self, user_id: Uuid, id: Uuid) -> Result<()> {
        self.find(id).await?;

        if !self.event_repo.unregister(id, user_id).await? {
            return Err(AppError::BadRequest(
                "Not registered for this event".to_string(),
            ));
        }
        tracing::info!("User {} unregistered from event {}", user_id, id);

        Ok(())
    }

    pub async fn is_registered(&self, id: Uuid, user_id: Uuid) -> Result<bool> {
        self.event_repo.is_registered(id, user_id).await
    }

    /// Organizer, president of the owning club, or admin.
    async fn can_manage(&self, actor: &User, event: &Event) -> Result<bool> {
        if actor.is_admin() || event.organizer_id == actor.id {
            return Ok(true);
        }
        let club = self.club_repo.find_by_id(event.club_id).await?;
        Ok(club.is_some_and(|c| c.president_id == actor.id))
    }

    async fn find(&self, id: Uuid) -> Result<Event> {
        self.event_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))
    }

    async fn list_items(&self, events: Vec<Event>) -> Result<Vec<EventListItem>> {
        let organizer_ids: Vec<Uuid> = events.iter().map(|e| e.organizer_id).collect();
        let organizers: HashMap<Uuid, UserSummary> = self
            .user_repo
            .find_summaries(&organizer_ids)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        let club_ids: Vec<Uuid> = events.iter().map(|e| e.club_id).collect();
        let clubs: HashMap<Uuid, ClubSummary> = self
            .club_repo
            .find_summaries(&club_ids)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        let mut items = Vec::with_capacity(events.len());
        for event in events {
            let registered_count = self.event_repo.registration_count(event.id).await?;
            items.push(EventListItem {
                club: clubs.get(&event.club_id).cloned(),
                organizer: organizers.get(&event.organizer_id).cloned(),
                registered_count,
                event,
            });
        }

        Ok(items)
    }
}
