//! Demo entry point: resume or create a session, then show who is logged in.
//!
//! Reads the gateway settings from the environment (see
//! [`GatewayConfig::from_env`](judge_gateway::config::GatewayConfig::from_env)), plus
//! `JUDGE_SESSION_FILE`, `JUDGE_USERNAME` and `JUDGE_PASSWORD`.

use judge_gateway::config::GatewayConfig;
use judge_gateway::lifecycle::tracing::setup_tracing;
use judge_gateway::lifecycle::ClientSystem;
use judge_gateway::model::LoginForm;
use judge_gateway::session::FileStorage;
use std::env;
use std::sync::Arc;
use tracing::info;

const DEFAULT_SESSION_FILE: &str = ".judge-session.json";

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = GatewayConfig::from_env().map_err(|e| e.to_string())?;
    let session_file =
        env::var("JUDGE_SESSION_FILE").unwrap_or_else(|_| DEFAULT_SESSION_FILE.to_owned());
    let storage = Arc::new(FileStorage::new(session_file));

    let system = ClientSystem::connect(config, storage).map_err(|e| e.to_string())?;

    let credentials = match (env::var("JUDGE_USERNAME"), env::var("JUDGE_PASSWORD")) {
        (Ok(username), Ok(password)) => Some(LoginForm::new(username, password)),
        _ => None,
    };
    let user = system.resume_or_login(credentials).await;

    match &user {
        Some(user) => info!(
            username = ?user.username,
            role = ?user.role_name(),
            admin = user.is_admin(),
            "Logged in user"
        ),
        None => info!("Not logged in; set JUDGE_USERNAME and JUDGE_PASSWORD to log in"),
    }

    system.shutdown();
    Ok(())
}
