use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::*,
    error::{AppError, Result},
    repository::{ClubRepository, UserRepository},
};

pub struct ClubService {
    club_repo: Arc<dyn ClubRepository>,
    user_repo: Arc<dyn UserRepository>,
}

impl ClubService {
    pub fn new(club_repo: Arc<dyn ClubRepository>, user_repo: Arc<dyn UserRepository>) -> Self {
        Self {
            club_repo,
            user_repo,
        }
    }

    pub async fn list(&self, filter: &ClubFilter, page: Page) -> Result<Paginated<ClubListItem>> {
        let clubs = self.club_repo.list(filter, page.limit, page.offset()).await?;
        let total = self.club_repo.count(filter).await?;

        Ok(Paginated {
            items: self.list_items(clubs).await?,
            total,
            page,
        })
    }

    /// Active clubs with the most members.
    pub async fn trending(&self, limit: i64) -> Result<Vec<ClubListItem>> {
        let clubs = self.club_repo.list_trending(limit).await?;
        self.list_items(clubs).await
    }

    /// Clubs the user belongs to, oldest membership first.
    pub async fn joined_by(&self, user_id: Uuid) -> Result<Vec<ClubListItem>> {
        let clubs = self.club_repo.list_for_member(user_id).await?;
        self.list_items(clubs).await
    }

    pub async fn get(&self, id: Uuid) -> Result<ClubDetails> {
        let club = self.find(id).await?;

        let member_ids = self.club_repo.member_ids(id).await?;
        let mut wanted = member_ids.clone();
        wanted.push(club.president_id);
        wanted.extend(club.vice_president_id);
        wanted.extend(club.secretary_id);
        let by_id: HashMap<Uuid, UserSummary> = self
            .user_repo
            .find_summaries(&wanted)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        Ok(ClubDetails {
            president: by_id.get(&club.president_id).cloned(),
            vice_president: club.vice_president_id.and_then(|id| by_id.get(&id).cloned()),
            secretary: club.secretary_id.and_then(|id| by_id.get(&id).cloned()),
            members: member_ids
                .iter()
                .filter_map(|id| by_id.get(id).cloned())
                .collect(),
            club,
        })
    }

    pub async fn create(&self, president: &User, mut request: CreateClubRequest) -> Result<Club> {
        request.normalize();
        request.validate()?;

        let club = self.club_repo.create(president.id, request).await?;
        tracing::info!("Club {} created by {}", club.id, president.id);

        Ok(club)
    }

    pub async fn update(&self, actor: &User, id: Uuid, mut request: UpdateClubRequest) -> Result<Club> {
        request.normalize();
        request.validate()?;

        let mut club = self.find(id).await?;
        if !club.can_be_managed_by(actor.id, actor.is_admin()) {
            return Err(AppError::Forbidden(
                "Not authorized to update this club".to_string(),
            ));
        }

        if let Some(Some(vice_president)) = request.vice_president {
            if !self.club_repo.is_member(id, vice_president).await? {
                return Err(AppError::BadRequest(
                    "Vice president must be a club member".to_string(),
                ));
            }
        }
        if let Some(Some(secretary)) = request.secretary {
            if !self.club_repo.is_member(id, secretary).await? {
                return Err(AppError::BadRequest(
                    "Secretary must be a club member".to_string(),
                ));
            }
        }

        request.apply_to(&mut club);
        let updated = self.club_repo.update(&club).await?;
        tracing::info!("Club {} updated by {}", id, actor.id);

        Ok(updated)
    }

    pub async fn delete(&self, actor: &User, id: Uuid) -> Result<()> {
        let club = self.find(id).await?;
        if !club.can_be_managed_by(actor.id, actor.is_admin()) {
            return Err(AppError::Forbidden(
                "Not authorized to delete this club".to_string(),
            ));
        }

        self.club_repo.delete(id).await?;
        tracing::info!("Club {} deleted by {}", id, actor.id);

        Ok(())
    }

    pub async fn join(&self, user_id: Uuid, club_id: Uuid) -> Result<()> {
        let club = self.find(club_id).await?;
        if !club.is_active {
            return Err(AppError::BadRequest("Club is not active".to_string()));
        }

        if !self.club_repo.add_member(club_id, user_id).await? {
            return Err(AppError::BadRequest(
                "Already a member of this club".to_string(),
            ));
        }
        tracing::info!("User {} joined club {}", user_id, club_id);

        Ok(())
    }

    /// Vice president and secretary lose their office on leaving; the
    /// president has to hand over the club first.
    pub async fn leave(&self, user_id: Uuid, club_id: Uuid) -> Result<()> {
        let club = self.find(club_id).await?;
        if club.president_id == user_id {
            return Err(AppError::BadRequest(
                "The club president cannot leave the club".to_string(),
            ));
        }

        if !self.club_repo.remove_member(club_id, user_id).await? {
            return Err(AppError::BadRequest("Not a member of this club".to_string()));
        }
        tracing::info!("User {} left club {}", user_id, club_id);

        Ok(())
    }

    pub async fn is_member(&self, club_id: Uuid, user_id: Uuid) -> Result<bool> {
        self.club_repo.is_member(club_id, user_id).await
    }

    async fn find(&self, id: Uuid) -> Result<Club> {
        self.club_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Club not found".to_string()))
    }

    async fn list_items(&self, clubs: Vec<Club>) -> Result<Vec<ClubListItem>> {
        let president_ids: Vec<Uuid> = clubs.iter().map(|c| c.president_id).collect();
        let presidents: HashMap<Uuid, UserSummary> = self
            .user_repo
            .find_summaries(&president_ids)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        let mut items = Vec::with_capacity(clubs.len());
        for club in clubs {
            let member_count = self.club_repo.member_count(club.id).await?;
            items.push(ClubListItem {
                president: presidents.get(&club.president_id).cloned(),
                member_count,
                club,
            });
        }

        Ok(items)
    }
}
