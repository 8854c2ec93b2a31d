use super::claims::{ANONYMOUS_NAME, Claims, decode_claims};
use super::provider::IdentityProvider;
use crate::error::{ClientError, ClientResult, DecodeError};
use crate::token_store::TokenStore;
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub token: String,
    pub claims: Claims,
}

impl Session {
    pub fn from_token(token: impl Into<String>) -> Result<Self, DecodeError> {
        let token = token.into();
        let claims = decode_claims(&token)?;
        Ok(Self { token, claims })
    }

    pub fn display_name(&self) -> String {
        self.claims.display_name()
    }

    pub fn is_reviewer(&self) -> bool {
        self.claims.is_reviewer
    }
}

/// Identity recorded as `reviewer_id` after a successful review.
///
/// Derived on the client from the session claims, not echoed by the server.
pub fn reviewer_identity(session: &Session) -> String {
    session
        .claims
        .user_id()
        .unwrap_or(ANONYMOUS_NAME)
        .to_string()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Surface {
    Login,
    Chat,
    Feedback,
}

/// Where a page load for `requested` must end up.
pub fn enforce_route(requested: Surface, authenticated: bool) -> Surface {
    match (requested, authenticated) {
        (_, false) => Surface::Login,
        (Surface::Login, true) => Surface::Chat,
        (other, true) => other,
    }
}

fn unix_now() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

/// Single entry point for login state. Everything it knows lives in the token store.
pub struct IdentityGateway {
    provider: Box<dyn IdentityProvider>,
    store: Box<dyn TokenStore>,
    clock: fn() -> i64,
}

impl IdentityGateway {
    pub fn new(provider: Box<dyn IdentityProvider>, store: Box<dyn TokenStore>) -> Self {
        Self {
            provider,
            store,
            clock: unix_now,
        }
    }

    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    /// On failure the previously stored token is left as it was. A token whose claims cannot be
    /// read is a failed login and is not persisted.
    pub async fn authenticate(&self, username: &str, password: &str) -> ClientResult<Session> {
        let token = self
            .provider
            .authenticate(username.trim(), password)
            .await
            .inspect_err(|err| tracing::warn!("authentication failed: {err}"))?;

        let session = Session::from_token(token).map_err(|err| {
            tracing::error!("issued token has unreadable claims: {err}");
            ClientError::from(err)
        })?;

        if let Err(err) = self.store.save(&session.token) {
            tracing::error!("failed to persist token: {err}");
        }
        tracing::info!("signed in as {}", session.display_name());
        Ok(session)
    }

    /// The persisted session, if there is one and it has not expired.
    pub fn current_session(&self) -> Option<Session> {
        let token = self.store.load()?;
        match Session::from_token(token) {
            Ok(session) if session.claims.is_expired_at((self.clock)()) => {
                tracing::debug!("stored token has expired");
                None
            }
            Ok(session) => Some(session),
            Err(err) => {
                tracing::warn!("stored token is unreadable: {err}");
                None
            }
        }
    }

    pub fn token(&self) -> Option<String> {
        self.store.load()
    }

    /// False without a valid session.
    pub fn is_reviewer(&self) -> bool {
        self.current_session()
            .is_some_and(|session| session.is_reviewer())
    }

    pub fn display_name(&self) -> String {
        self.current_session()
            .map(|session| session.display_name())
            .unwrap_or_else(|| ANONYMOUS_NAME.to_string())
    }

    pub async fn logout(&self) {
        self.provider.sign_out().await;
        if let Err(err) = self.store.clear() {
            tracing::error!("failed to clear token: {err}");
        }
        tracing::info!("signed out");
    }
}
