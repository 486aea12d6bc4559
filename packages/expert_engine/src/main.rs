use std::path::PathBuf;
use std::sync::Arc;

use axum::routing::{delete, get, post, put};
use clap::Parser;
use expert_engine::application::api::AppState;
use expert_engine::application::controllers::{
    admin_controller, auth_controller, fact_controller, health_controller, history_controller,
    inference_controller, rule_controller,
};
use expert_engine::domain::services::{DataStorage, SessionStore};
use tower::ServiceBuilder;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "expert_engine", about = "Production-rule expert system server")]
struct Args {
    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Directory holding rules.json, users.json and inference_history.json
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Hours before an idle session token expires
    #[arg(long, default_value_t = 24)]
    session_ttl_hours: i64,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Build tokio runtime explicitly
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    rt.block_on(async_main(args))
}

async fn async_main(args: Args) -> anyhow::Result<()> {
    let storage = Arc::new(DataStorage::new(&args.data_dir));
    // Seed the data files up front so the first request never races the
    // default-rule and default-admin bootstrap.
    let rules = storage.load_rules();
    storage.load_users();
    info!(
        rules = rules.len(),
        data_dir = %args.data_dir.display(),
        "data layer ready"
    );

    let sessions = Arc::new(SessionStore::new(chrono::Duration::hours(
        args.session_ttl_hours,
    )));
    let state = AppState { storage, sessions };

    let auth_routes = axum::Router::new()
        .route("/login", post(auth_controller::login))
        .route("/register", post(auth_controller::register))
        .route("/logout", post(auth_controller::logout))
        .route("/me", get(auth_controller::me));

    let rule_routes = axum::Router::new()
        .route(
            "/",
            get(rule_controller::list_rules).post(rule_controller::add_rule),
        )
        .route("/batch", post(rule_controller::batch_add_rules))
        .route("/reset", post(rule_controller::reset_rules))
        .route(
            "/{id}",
            put(rule_controller::update_rule).delete(rule_controller::delete_rule),
        );

    let fact_routes = axum::Router::new()
        .route("/atoms", get(fact_controller::get_atoms))
        .route("/conclusions", get(fact_controller::get_conclusions))
        .route(
            "/known",
            get(fact_controller::get_known_facts).post(fact_controller::set_known_facts),
        )
        .route(
            "/false",
            get(fact_controller::get_false_facts).post(fact_controller::set_false_facts),
        )
        .route("/clear", post(fact_controller::clear_facts));

    let inference_routes = axum::Router::new()
        .route("/forward", post(inference_controller::forward_inference))
        .route("/backward/start", post(inference_controller::start_backward))
        .route(
            "/backward/continue",
            post(inference_controller::continue_backward),
        );

    let history_routes = axum::Router::new()
        .route("/", get(history_controller::get_history))
        .route("/clear", post(history_controller::clear_history))
        .route("/{id}", delete(history_controller::delete_history));

    let admin_routes = axum::Router::new()
        .route("/users", get(admin_controller::list_users))
        .route(
            "/users/{username}/role",
            put(admin_controller::update_user_role),
        )
        .route("/users/{username}", delete(admin_controller::delete_user));

    let api_routes = axum::Router::new()
        .nest("/auth", auth_routes)
        .nest("/rules", rule_routes)
        .nest("/facts", fact_routes)
        .nest("/inference", inference_routes)
        .nest("/history", history_routes)
        .nest("/admin", admin_routes);

    // Permissive CORS for the browser frontend
    let cors_layer = ServiceBuilder::new().layer(
        tower_http::cors::CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(tower_http::cors::Any)
            .allow_headers(tower_http::cors::Any),
    );

    let app = axum::Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health_controller::health_handler))
        .route("/", get(health_controller::root_handler))
        .layer(cors_layer)
        .with_state(state);

    let bind_address = format!("{}:{}", args.host, args.port);
    let tcp_listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!(address = %bind_address, "expert system server listening");

    axum::serve(tcp_listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;

    Ok(())
}
