use axum::{middleware, routing::get, Router};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use dhiselink_api::handlers::{protected, public};
use dhiselink_api::middleware::jwt_auth_middleware;

#[derive(Parser)]
#[command(name = "dhiselink-api", about = "Dhiselink backend API server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (the default when no command is given).
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dhiselink_api=info,tower_http=info".into()),
        )
        .init();

    let config = dhiselink_api::config::config();
    tracing::info!("Starting Dhiselink API in {:?} mode", config.environment);

    let cli = Cli::parse();
    let port_arg = match cli.command {
        Some(Command::Serve { port }) => port,
        None => None,
    };

    // Allow tests or deployments to override port via env
    let port = port_arg
        .or_else(|| {
            std::env::var("DHISELINK_API_PORT")
                .ok()
                .or_else(|| std::env::var("PORT").ok())
                .and_then(|s| s.parse::<u16>().ok())
        })
        .unwrap_or(8000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Dhiselink API listening on http://{}", bind_addr);

    axum::serve(listener, app()).await.expect("server");
}

fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_public_routes())
        .merge(directory_routes())
        // Protected API behind the JWT middleware
        .merge(protected_routes())
        // Global middleware
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

fn auth_public_routes() -> Router {
    use axum::routing::post;

    Router::new()
        .route("/auth/register", post(public::auth::register))
        .route("/auth/login", post(public::auth::login))
}

fn directory_routes() -> Router {
    Router::new()
        .route("/directory/profiles", get(public::directory::list_profiles))
        .route(
            "/directory/profiles/:slug",
            get(public::directory::profile_by_slug),
        )
        .route(
            "/directory/content/:label",
            get(public::directory::list_content),
        )
        .route(
            "/directory/content/:label/:key",
            get(public::directory::content_detail),
        )
}

fn protected_routes() -> Router {
    use axum::routing::{post, put};

    Router::new()
        // Session and profile
        .route("/api/auth/whoami", get(protected::profile::whoami))
        .route(
            "/api/profile/onboarding/individual",
            post(protected::profile::onboard_individual),
        )
        .route(
            "/api/profile/onboarding/organization",
            post(protected::profile::onboard_organization),
        )
        .route(
            "/api/profile/settings",
            put(protected::profile::update_settings),
        )
        // Content submission and management
        .route("/api/content", post(protected::content::create))
        .route(
            "/api/content/:label/:id",
            put(protected::content::update).delete(protected::content::delete),
        )
        // Dashboard
        .route("/api/dashboard/content", get(protected::dashboard::my_content))
        .route(
            "/api/dashboard/creatable-types",
            get(protected::dashboard::creatable),
        )
        // Uploads
        .route("/api/uploads", post(protected::uploads::upload))
        .layer(middleware::from_fn(jwt_auth_middleware))
}

fn cors_layer() -> CorsLayer {
    let origins: Vec<axum::http::HeaderValue> = dhiselink_api::config::config()
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    if origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Dhiselink API",
            "version": version,
            "description": "Regional professional network and opportunity marketplace",
            "endpoints": {
                "home": "/ (public)",
                "auth": "/auth/register, /auth/login (public)",
                "directory": "/directory/profiles[/:slug], /directory/content/:label[/:key] (public)",
                "profile": "/api/auth/whoami, /api/profile/* (protected)",
                "content": "/api/content[/:label/:id] (protected)",
                "dashboard": "/api/dashboard/* (protected)",
                "uploads": "/api/uploads (protected)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match dhiselink_api::database::manager::DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
