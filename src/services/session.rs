use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use tower_sessions::Session;
use crate::errors::AppResult;
use crate::models::UserId;

const USER_ID_KEY: &str = "user_id";

/// Binds the server-side session (keyed by the signed cookie) to a user.
///
/// A session is either anonymous or holds exactly one user id; there is
/// no expiry beyond the browser session and no refresh.
#[derive(Clone, Debug)]
pub struct AuthSession {
    session: Session,
}

impl AuthSession {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    /// Logs `user_id` in under a freshly issued session token.
    pub async fn start(&self, user_id: &str) -> AppResult<()> {
        self.session.cycle_id().await?;
        self.session.insert(USER_ID_KEY, user_id).await?;
        Ok(())
    }

    /// The logged-in user, or `None` for an anonymous session.
    pub async fn resolve(&self) -> AppResult<Option<UserId>> {
        Ok(self.session.get::<UserId>(USER_ID_KEY).await?)
    }

    pub async fn end(&self) -> AppResult<()> {
        self.session.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthSession
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Session::from_request_parts(parts, state).await.map(Self::new)
    }
}
