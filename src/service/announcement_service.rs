use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::*,
    error::{AppError, Result},
    repository::{AnnouncementRepository, ClubRepository, UserRepository},
};

/// Caller-supplied narrowing of the announcement feed.
#[derive(Debug, Clone, Default)]
pub struct AnnouncementQuery {
    pub club_id: Option<Uuid>,
    pub priority: Option<Priority>,
    pub search: Option<String>,
}

pub struct AnnouncementService {
    announcement_repo: Arc<dyn AnnouncementRepository>,
    club_repo: Arc<dyn ClubRepository>,
    user_repo: Arc<dyn UserRepository>,
}

pub fn audience_of(viewer: Option<&User>) -> Audience {
    match viewer {
        None => Audience::Anonymous,
        Some(user) if user.is_admin() => Audience::Admin(user.id),
        Some(user) => Audience::User(user.id),
    }
}

impl AnnouncementService {
    pub fn new(
        announcement_repo: Arc<dyn AnnouncementRepository>,
        club_repo: Arc<dyn ClubRepository>,
        user_repo: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            announcement_repo,
            club_repo,
            user_repo,
        }
    }

    /// Active, unexpired announcements the viewer may see, most urgent first.
    pub async fn list(
        &self,
        viewer: Option<&User>,
        query: AnnouncementQuery,
        page: Page,
    ) -> Result<Paginated<AnnouncementListItem>> {
        let filter = AnnouncementFilter {
            club_id: query.club_id,
            priority: query.priority,
            search: query.search,
            audience: audience_of(viewer),
            now: Utc::now(),
        };

        let announcements = self
            .announcement_repo
            .list(&filter, page.limit, page.offset())
            .await?;
        let total = self.announcement_repo.count(&filter).await?;

        Ok(Paginated {
            items: self.list_items(announcements).await?,
            total,
            page,
        })
    }

    pub async fn get(&self, viewer: Option<&User>, id: Uuid) -> Result<AnnouncementDetails> {
        let announcement = self.find(id).await?;
        let audience = audience_of(viewer);

        let manager = viewer.is_some_and(|u| announcement.can_be_managed_by(u.id, u.is_admin()));
        if !manager && (!announcement.is_active || announcement.is_expired(Utc::now())) {
            return Err(AppError::NotFound("Announcement not found".to_string()));
        }

        let memberships = match viewer {
            Some(user) => self.club_repo.club_ids_for_member(user.id).await?,
            None => Vec::new(),
        };
        if !announcement.is_visible_to(audience, &memberships) {
            return Err(AppError::Forbidden(
                "Not authorized to view this announcement".to_string(),
            ));
        }

        let author = self
            .user_repo
            .find_summaries(&[announcement.author_id])
            .await?
            .into_iter()
            .next();
        let target_users = self
            .user_repo
            .find_summaries(&announcement.target_user_ids)
            .await?;

        let club_ids: Vec<Uuid> = announcement
            .club_id
            .into_iter()
            .chain(announcement.target_club_id)
            .collect();
        let clubs: HashMap<Uuid, ClubSummary> = self
            .club_repo
            .find_summaries(&club_ids)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        Ok(AnnouncementDetails {
            author,
            club: announcement.club_id.and_then(|id| clubs.get(&id).cloned()),
            target_club: announcement.target_club_id.and_then(|id| clubs.get(&id).cloned()),
            target_users,
            announcement,
        })
    }

    pub async fn create(&self, author: &User, mut request: CreateAnnouncementRequest) -> Result<Announcement> {
        request.normalize();
        request.validate()?;
        validate_targeting(
            request.target_audience,
            request.club,
            request.target_club,
            &request.target_users,
        )
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

        if let Some(club_id) = request.club {
            self.club_repo
                .find_by_id(club_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Club not found".to_string()))?;

            if !author.is_admin() && !self.club_repo.is_member(club_id, author.id).await? {
                return Err(AppError::Forbidden(
                    "Only club members can post announcements for this club".to_string(),
                ));
            }
        }
        self.check_targets(request.target_club, &request.target_users).await?;

        let now = Utc::now();
        let announcement = Announcement {
            id: Uuid::new_v4(),
            title: request.title,
            content: request.content,
            author_id: author.id,
            club_id: request.club,
            priority: request.priority,
            target_audience: request.target_audience,
            target_club_id: request.target_club,
            target_user_ids: request.target_users,
            attachments: request.attachments,
            is_active: true,
            expires_at: request.expires_at,
            tags: request.tags,
            created_at: now,
            updated_at: now,
        };

        let created = self.announcement_repo.create(announcement).await?;
        tracing::info!(
            "Announcement {} ({}) posted by {}",
            created.id,
            created.target_audience.as_str(),
            author.id
        );

        Ok(created)
    }

    pub async fn update(
        &self,
        actor: &User,
        id: Uuid,
        mut request: UpdateAnnouncementRequest,
    ) -> Result<Announcement> {
        request.normalize();
        request.validate()?;

        let mut announcement = self.find(id).await?;
        if !announcement.can_be_managed_by(actor.id, actor.is_admin()) {
            return Err(AppError::Forbidden(
                "Not authorized to update this announcement".to_string(),
            ));
        }

        request.apply_to(&mut announcement);
        validate_targeting(
            announcement.target_audience,
            announcement.club_id,
            announcement.target_club_id,
            &announcement.target_user_ids,
        )
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
        self.check_targets(announcement.target_club_id, &announcement.target_user_ids)
            .await?;

        let updated = self.announcement_repo.update(&announcement).await?;
        tracing::info!("Announcement {} updated by {}", id, actor.id);

        Ok(updated)
    }

    pub async fn delete(&self, actor: &User, id: Uuid) -> Result<()> {
        let announcement = self.find(id).await?;
        if !announcement.can_be_managed_by(actor.id, actor.is_admin()) {
            return Err(AppError::Forbidden(
                "Not authorized to delete this announcement".to_string(),
            ));
        }

        self.announcement_repo.delete(id).await?;
        tracing::info!("Announcement {} deleted by {}", id, actor.id);

        Ok(())
    }

    /// Referenced target club and users must exist.
    async fn check_targets(&self, target_club: Option<Uuid>, target_users: &[Uuid]) -> Result<()> {
        if let Some(club_id) = target_club {
            self.club_repo
                .find_by_id(club_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Target club not found".to_string()))?;
        }

        let found = self.user_repo.find_summaries(target_users).await?;
        if found.len() != target_users.len() {
            return Err(AppError::BadRequest(
                "One or more target users do not exist".to_string(),
            ));
        }

        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<Announcement> {
        self.announcement_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Announcement not found".to_string()))
    }

    async fn list_items(&self, announcements: Vec<Announcement>) -> Result<Vec<AnnouncementListItem>> {
        let author_ids: Vec<Uuid> = announcements.iter().map(|a| a.author_id).collect();
        let authors: HashMap<Uuid, UserSummary> = self
            .user_repo
            .find_summaries(&author_ids)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        let club_ids: Vec<Uuid> = announcements.iter().filter_map(|a| a.club_id).collect();
        let clubs: HashMap<Uuid, ClubSummary> = self
            .club_repo
            .find_summaries(&club_ids)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        Ok(announcements
            .into_iter()
            .map(|announcement| AnnouncementListItem {
                author: authors.get(&announcement.author_id).cloned(),
                club: announcement.club_id.and_then(|id| clubs.get(&id).cloned()),
                announcement,
            })
            .collect())
    }
}
