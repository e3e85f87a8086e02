pub mod announcement_service;
pub mod club_service;
pub mod event_service;
pub mod user_service;

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::AuthService;
use crate::config::AuthConfig;
use crate::repository::*;

pub use announcement_service::{AnnouncementQuery, AnnouncementService};
pub use club_service::ClubService;
pub use event_service::EventService;
pub use user_service::UserService;

pub struct ServiceContext {
    pub user_repo: Arc<dyn UserRepository>,
    pub club_repo: Arc<dyn ClubRepository>,
    pub event_repo: Arc<dyn EventRepository>,
    pub announcement_repo: Arc<dyn AnnouncementRepository>,
    pub auth_service: Arc<AuthService>,
    pub user_service: Arc<UserService>,
    pub club_service: Arc<ClubService>,
    pub event_service: Arc<EventService>,
    pub announcement_service: Arc<AnnouncementService>,
    pub db_pool: SqlitePool,
}

impl ServiceContext {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        club_repo: Arc<dyn ClubRepository>,
        event_repo: Arc<dyn EventRepository>,
        announcement_repo: Arc<dyn AnnouncementRepository>,
        auth_service: Arc<AuthService>,
        db_pool: SqlitePool,
    ) -> Self {
        let user_service = Arc::new(UserService::new(
            user_repo.clone(),
            club_repo.clone(),
            auth_service.clone(),
        ));
        let club_service = Arc::new(ClubService::new(club_repo.clone(), user_repo.clone()));
        let event_service = Arc::new(EventService::new(
            event_repo.clone(),
            club_repo.clone(),
            user_repo.clone(),
        ));
        let announcement_service = Arc::new(AnnouncementService::new(
            announcement_repo.clone(),
            club_repo.clone(),
            user_repo.clone(),
        ));

        Self {
            user_repo,
            club_repo,
            event_repo,
            announcement_repo,
            auth_service,
            user_service,
            club_service,
            event_service,
            announcement_service,
            db_pool,
        }
    }

    /// Wires the SQLite repositories over one pool.
    pub fn from_pool(db_pool: SqlitePool, auth: &AuthConfig) -> Self {
        Self::new(
            Arc::new(SqliteUserRepository::new(db_pool.clone())),
            Arc::new(SqliteClubRepository::new(db_pool.clone())),
            Arc::new(SqliteEventRepository::new(db_pool.clone())),
            Arc::new(SqliteAnnouncementRepository::new(db_pool.clone())),
            Arc::new(AuthService::new(&auth.jwt_secret, auth.token_duration_hours)),
            db_pool,
        )
    }
}
