use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::AuthService,
    domain::*,
    error::{AppError, Result},
    repository::{ClubRepository, UserRepository},
};

pub struct UserService {
    user_repo: Arc<dyn UserRepository>,
    club_repo: Arc<dyn ClubRepository>,
    auth_service: Arc<AuthService>,
}

impl UserService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        club_repo: Arc<dyn ClubRepository>,
        auth_service: Arc<AuthService>,
    ) -> Self {
        Self {
            user_repo,
            club_repo,
            auth_service,
        }
    }

    /// Creates the account and returns it together with a fresh token.
    pub async fn register(&self, mut request: RegisterRequest) -> Result<(User, String)> {
        request.normalize();
        request.validate()?;

        let role = request.role.unwrap_or(UserRole::Student);
        if role == UserRole::Admin {
            return Err(AppError::BadRequest("Invalid role".to_string()));
        }

        if self.user_repo.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::Conflict("User already exists".to_string()));
        }

        let password_hash = AuthService::hash_password(&request.password)?;
        let user = self
            .user_repo
            .create(NewUser {
                name: request.name,
                email: request.email,
                password_hash,
                role,
            })
            .await?;

        let token = self.auth_service.issue_token(&user)?;
        tracing::info!("Registered user {} ({})", user.id, user.role.as_str());

        Ok((user, token))
    }

    pub async fn login(&self, request: LoginRequest) -> Result<(User, String)> {
        let email = request.email.trim().to_lowercase();

        let (user, password_hash) = self
            .user_repo
            .find_credentials(&email)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !AuthService::verify_password(&request.password, &password_hash)? {
            tracing::debug!("Failed login for {}", email);
            return Err(AppError::Unauthorized);
        }

        if !user.is_active {
            return Err(AppError::Unauthorized);
        }

        let token = self.auth_service.issue_token(&user)?;
        tracing::info!("User {} logged in", user.id);

        Ok((user, token))
    }

    /// Resolves a bearer token to an active user.
    pub async fn authenticate(&self, token: &str) -> Result<User> {
        let claims = self.auth_service.validate_token(token)?;

        match self.user_repo.find_by_id(claims.sub).await? {
            Some(user) if user.is_active => Ok(user),
            _ => Err(AppError::Unauthorized),
        }
    }

    pub async fn get(&self, id: Uuid) -> Result<User> {
        self.user_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn profile(&self, id: Uuid) -> Result<UserProfile> {
        let user = self.get(id).await?;
        let joined_clubs = self
            .club_repo
            .list_for_member(id)
            .await?
            .iter()
            .map(Club::summary)
            .collect();

        Ok(UserProfile { user, joined_clubs })
    }

    pub async fn update_profile(&self, id: Uuid, mut request: UpdateProfileRequest) -> Result<User> {
        request.normalize();
        request.validate()?;

        let user = self.user_repo.update_profile(id, request).await?;
        tracing::info!("Updated profile of user {}", id);

        Ok(user)
    }

    pub async fn search(&self, query: Option<&str>, page: Page) -> Result<Paginated<PublicProfile>> {
        let query = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .ok_or_else(|| AppError::BadRequest("Search query is required".to_string()))?;

        let users = self
            .user_repo
            .search(query, page.limit, page.offset())
            .await?;
        let total = self.user_repo.count_search(query).await?;

        Ok(Paginated {
            items: users.into_iter().map(PublicProfile::from).collect(),
            total,
            page,
        })
    }
}
