use users_api::{app, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "users_api=debug,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = match AppState::init().await {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = ?e, "startup failed");
            return Err(e);
        }
    };

    let addr = app_state.config.bind_addr();
    let app = app::build_app(app_state);
    app::serve(app, &addr).await
}
