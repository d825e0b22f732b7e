// ── Authentication ──
//
// Sign-in flows store the returned bearer token in the shared session, so
// every later call made with `use_session` carries it. The current player
// is kept as the `Arc` published on `auth.signed_in`, which keeps that
// payload replayable to late subscribers until sign-out.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use playvault_api::{MessageResponse, Payload, RequestExecutor};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::error::CoreError;
use crate::events::{SignedIn, topics};
use crate::manager::require_text;

/// Wire shape of every sign-in endpoint.
#[derive(Deserialize)]
struct AuthSession {
    token: String,
    player_id: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    guest: bool,
}

impl Payload for AuthSession {}

/// The signed-in player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Player {
    pub player_id: String,
    pub display_name: Option<String>,
    pub guest: bool,
}

impl From<&SignedIn> for Player {
    fn from(event: &SignedIn) -> Self {
        Self {
            player_id: event.player_id.clone(),
            display_name: event.display_name.clone(),
            guest: event.guest,
        }
    }
}

pub struct AuthManager {
    executor: Arc<RequestExecutor>,
    current: ArcSwapOption<SignedIn>,
}

impl AuthManager {
    pub const NAME: &'static str = "auth";

    pub fn new(executor: Arc<RequestExecutor>) -> Self {
        Self {
            executor,
            current: ArcSwapOption::empty(),
        }
    }

    pub async fn login(&self, email: &str, password: &SecretString) -> Result<Player, CoreError> {
        require_text("email", email)?;
        require_text("password", password.expose_secret())?;
        let body = json!({ "email": email, "password": password.expose_secret() });
        self.sign_in("/auth/login", &body).await
    }

    pub async fn register(
        &self,
        email: &str,
        password: &SecretString,
        display_name: &str,
    ) -> Result<Player, CoreError> {
        require_text("email", email)?;
        require_text("password", password.expose_secret())?;
        require_text("display name", display_name)?;
        let body = json!({
            "email": email,
            "password": password.expose_secret(),
            "display_name": display_name,
        });
        self.sign_in("/auth/register", &body).await
    }

    /// Anonymous sign-in bound to a device identifier.
    pub async fn guest_login(&self, device_id: &str) -> Result<Player, CoreError> {
        require_text("device id", device_id)?;
        self.sign_in("/auth/guest", &json!({ "device_id": device_id }))
            .await
    }

    /// End the session on the backend, then locally.
    ///
    /// The local session is cleared even if the backend call fails; the
    /// failure is only logged.
    pub async fn logout(&self) -> Result<(), CoreError> {
        let session = self.executor.context().session();
        if !session.has_session_token() {
            return Ok(());
        }

        let resp = self
            .executor
            .post::<MessageResponse, _>("/auth/logout", &json!({}), true)
            .await;
        if let Err(e) = resp.into_result() {
            warn!(error = %e, "backend logout failed, clearing local session anyway");
        }

        session.clear_session_token();
        self.current.store(None);
        self.executor
            .context()
            .bus()
            .publish_signal(topics::AUTH_SIGNED_OUT);
        info!("signed out");
        Ok(())
    }

    /// Drop the current player without contacting the backend.
    pub(crate) fn forget_player(&self) {
        self.current.store(None);
    }

    pub fn current_player(&self) -> Option<Player> {
        self.current.load().as_deref().map(Player::from)
    }

    pub fn is_signed_in(&self) -> bool {
        self.executor.context().session().has_session_token()
    }

    async fn sign_in(&self, path: &str, body: &serde_json::Value) -> Result<Player, CoreError> {
        let auth = self
            .executor
            .post::<AuthSession, _>(path, body, false)
            .await
            .into_result()?;

        if auth.token.is_empty() {
            return Err(CoreError::Unauthorized {
                message: "backend returned an empty session token".into(),
            });
        }

        let context = self.executor.context();
        context
            .session()
            .set_session_token(SecretString::from(auth.token));

        let event = Arc::new(SignedIn {
            player_id: auth.player_id,
            display_name: auth.display_name,
            guest: auth.guest,
        });
        self.current.store(Some(Arc::clone(&event)));
        context.bus().publish(topics::AUTH_SIGNED_IN, &event);
        info!(player_id = %event.player_id, guest = event.guest, "signed in");

        Ok(Player::from(&*event))
    }
}
