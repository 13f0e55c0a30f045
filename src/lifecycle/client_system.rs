use crate::clients::{AuthClient, AuthError, UserClient};
use crate::config::GatewayConfig;
use crate::gateway::{Gateway, TransportError};
use crate::model::{AuthUser, LoginForm};
use crate::session::{SessionStore, Storage};
use std::sync::Arc;
use tracing::{debug, error, info, warn, Instrument};

/// The application's single gateway context plus the clients that share it.
///
/// `ClientSystem` is responsible for:
/// - **Construction**: building exactly one [`Gateway`] per process, so the in-flight set,
///   the debounce state, and the session are shared by every client.
/// - **Dependency Wiring**: handing that gateway to each area client.
/// - **Session Bootstrap**: restoring the persisted session and its profile at startup.
///
/// # Example
///
/// ```ignore
/// let storage = Arc::new(FileStorage::new(".judge-session.json"));
/// let system = ClientSystem::connect(GatewayConfig::from_env()?, storage)?;
///
/// system.start().await?;
/// let user = system.auth_client.login(&LoginForm::new("alice", "secret1")).await?;
///
/// system.shutdown();
/// ```
#[derive(Debug, Clone)]
pub struct ClientSystem {
    /// The shared gateway context
    pub gateway: Gateway,

    /// Client for login, registration and the session
    pub auth_client: AuthClient,

    /// Client for back-office user management
    pub user_client: UserClient,
}

impl ClientSystem {
    /// Wires the clients onto an already built gateway.
    pub fn new(gateway: Gateway) -> Self {
        Self {
            auth_client: AuthClient::new(gateway.clone()),
            user_client: UserClient::new(gateway.clone()),
            gateway,
        }
    }

    /// Builds a reqwest-backed gateway over the session persisted in `storage`.
    pub fn connect(config: GatewayConfig, storage: Arc<dyn Storage>) -> Result<Self, TransportError> {
        info!(base_url = %config.base_url, dedupe = config.deduplicate, "Connecting gateway");
        let session = Arc::new(SessionStore::restore(storage));
        let gateway = Gateway::builder(config).session(session).build()?;
        Ok(Self::new(gateway))
    }

    /// Loads the profile for a restored token, if the profile isn't cached already.
    ///
    /// Returns `Ok(None)` when there is no saved session.
    pub async fn start(&self) -> Result<Option<AuthUser>, AuthError> {
        let user = self.auth_client.fetch_user_info().await?;
        match &user {
            Some(user) => info!(username = ?user.username, "Session resumed"),
            None => info!("No saved session"),
        }
        Ok(user)
    }

    /// Resumes the saved session, or logs in with `credentials` when there is none.
    ///
    /// Failures are logged and turn into `None`. Duplicate or suppressed rejections are
    /// flow control and only show up at debug level.
    pub async fn resume_or_login(&self, credentials: Option<LoginForm>) -> Option<AuthUser> {
        let resumed = match self.start().await {
            Ok(user) => user,
            Err(e) if e.is_flow_control() => {
                debug!(error = %e, "Session resume skipped");
                None
            }
            Err(e) => {
                warn!(error = %e, "Saved session could not be resumed");
                None
            }
        };
        if resumed.is_some() {
            return resumed;
        }

        let form = credentials?;
        let span = tracing::info_span!("login", username = %form.username);
        async {
            info!("Logging in");
            match self.auth_client.login(&form).await {
                Ok(user) => Some(user),
                Err(e) if e.is_flow_control() => {
                    debug!(error = %e, "Login skipped");
                    None
                }
                Err(e) => {
                    error!(error = %e, "Login failed");
                    None
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Drops the clients and the gateway context.
    pub fn shutdown(self) {
        let in_flight = self.gateway.pending().len();
        if in_flight > 0 {
            warn!(in_flight, "Shutting down with requests still in flight");
        }
        info!("Client system shut down");
    }
}
