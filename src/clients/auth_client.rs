use crate::clients::api_client::ApiClient;
use crate::clients::AuthError;
use crate::gateway::{ApiRequest, Gateway, GatewayError};
use crate::model::{AuthUser, LoginForm, LogoutRequest, RegisterForm, TokenPayload};
use crate::session::SessionStore;
use crate::ui::{Navigator, NoticeLevel, REDIRECT_PARAM};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

pub const AUTH_BASE_PATH: &str = "/api/auth";

#[derive(Serialize)]
struct EmailQuery<'a> {
    email: &'a str,
}

/// Client for the authentication endpoints.
///
/// Owns the session lifecycle: a successful login creates it, logout destroys it. The
/// gateway destroys it on its own when a call fails authentication.
#[derive(Clone, Debug)]
pub struct AuthClient {
    gateway: Gateway,
}

#[async_trait::async_trait]
impl ApiClient for AuthClient {
    type Error = AuthError;

    fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    fn base_path(&self) -> &str {
        AUTH_BASE_PATH
    }

    fn map_error(e: GatewayError) -> Self::Error {
        AuthError::Gateway(e)
    }
}

impl AuthClient {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    fn session(&self) -> &Arc<SessionStore> {
        self.gateway.session()
    }

    /// Logs in, stores the token, caches the profile, then returns to the page that sent the
    /// user to login (or `/`).
    ///
    /// A new token ends any auth-failure suppression window. If the server rejects it right
    /// away when loading the profile, it is discarded.
    #[instrument(skip(self, form), fields(username = %form.username))]
    pub async fn login(&self, form: &LoginForm) -> Result<AuthUser, AuthError> {
        form.validate().map_err(AuthError::Validation)?;

        let payload: TokenPayload = self.submit("/login", form).await?;
        self.session().set_token(&payload.token)?;
        self.gateway.end_auth_suppression();

        let user = match self.current_user().await {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "Profile unavailable after login");
                if e.is_auth_rejection() {
                    self.session().clear();
                }
                return Err(e);
            }
        };
        self.session().set_user(user.clone())?;

        info!("Logged in");
        self.gateway.notify(NoticeLevel::Success, "Login successful");

        let navigator = self.gateway.navigator();
        let target = navigator
            .current_route()
            .query_param(REDIRECT_PARAM)
            .filter(|p| !p.is_empty())
            .unwrap_or("/")
            .to_owned();
        navigator.navigate(&target);
        Ok(user)
    }

    /// Ends the session. The server is told when possible; the local session is cleared
    /// either way.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        if let Some(token) = self.session().token() {
            if let Err(e) = self
                .submit::<(), _>("/logout", &LogoutRequest { token })
                .await
            {
                warn!(error = %e, "Server-side logout failed");
            }
        }
        self.session().clear();
        self.gateway.notify(NoticeLevel::Success, "Logged out");
    }

    /// Profile of the token holder, straight from the server.
    pub async fn current_user(&self) -> Result<AuthUser, AuthError> {
        self.fetch("/me").await
    }

    /// Loads and caches the profile when a token exists but no profile is cached.
    ///
    /// The session is cleared only when the server rejects the token. Connectivity and
    /// decode failures leave it for the next attempt.
    #[instrument(skip(self))]
    pub async fn fetch_user_info(&self) -> Result<Option<AuthUser>, AuthError> {
        let session = self.session();
        if !session.is_logged_in() {
            return Ok(None);
        }
        if let Some(user) = session.user() {
            debug!("Profile already cached");
            return Ok(Some(user));
        }

        match self.current_user().await {
            Ok(user) => {
                session.set_user(user.clone())?;
                Ok(Some(user))
            }
            Err(e) => {
                warn!(error = %e, "Failed to load profile");
                if e.is_auth_rejection() {
                    session.clear();
                }
                Err(e)
            }
        }
    }

    #[instrument(skip(self, form), fields(username = %form.username))]
    pub async fn register(&self, form: &RegisterForm) -> Result<(), AuthError> {
        form.validate().map_err(AuthError::Validation)?;
        self.submit::<(), _>("/register", form).await?;
        self.gateway
            .notify(NoticeLevel::Success, "Registration successful, please log in");
        Ok(())
    }

    /// Asks the server to email a registration code.
    #[instrument(skip(self))]
    pub async fn send_code(&self, email: &str) -> Result<(), AuthError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AuthError::Validation(
                "Please enter an email address first".to_owned(),
            ));
        }
        self.gateway
            .post_with::<(), _>(&self.path("/send-code"), &EmailQuery { email })
            .await?;
        self.gateway
            .notify(NoticeLevel::Success, "Verification code sent");
        Ok(())
    }

    /// Resolves a token to its user without touching the local session.
    #[instrument(skip(self, token))]
    pub async fn validate_token(&self, token: &str) -> Result<AuthUser, AuthError> {
        let request = ApiRequest::get(self.path(&format!("/validate/{token}")))
            .with_log_path(self.path("/validate/{token}"));
        Ok(self.gateway.dispatch(request).await?)
    }
}
