use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, Method, StatusCode};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gifforge_api::config::{MediaConfig, PipelineConfig, ProvidersConfig, ServerConfig};
use gifforge_api::{routes, state};
use gifforge_core::overlay;
use gifforge_pipeline::{
    AnimationTaskController, FfmpegGifEncoder, GifGenerator, ImageSynthesizer, MediaTranscoder,
    PgRecorder, PgSubscriptionStore, PromptEnhancer,
};
use gifforge_providers::enhance::TextCompletionClient;
use gifforge_providers::fetch::HttpMediaFetcher;
use gifforge_providers::image::ImageSynthesisClient;
use gifforge_providers::video::AnimationClient;

use state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gifforge_api=debug,gifforge_pipeline=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = gifforge_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    gifforge_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    gifforge_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- CORS ---
    let cors = build_cors_layer(&config);

    // --- Generation pipeline ---
    let generator = Arc::new(build_generator(&pool));
    tracing::info!("Generation pipeline ready");

    // --- App state ---
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        generator,
    };

    // --- Request ID header name ---
    let request_id_header = HeaderName::from_static("x-request-id");

    // --- Router ---
    let app = Router::new()
        // Health check at root level (not under /api/v1).
        .merge(routes::health::router())
        // API v1 routes.
        .nest("/api/v1", routes::api_routes())
        // -- Middleware stack (applied bottom-up) --
        // Panic recovery: catch panics and return 500 JSON.
        .layer(CatchPanicLayer::new())
        // Request timeout.
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        // Propagate request ID to response.
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        // Structured request/response tracing.
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Set request ID on incoming requests.
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        // CORS.
        .layer(cors)
        // Shared state.
        .with_state(state);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wire the generation pipeline from environment configuration.
///
/// All provider clients share one `reqwest::Client` for connection
/// pooling and receive explicit config structs.
fn build_generator(pool: &gifforge_db::DbPool) -> GifGenerator {
    let providers = ProvidersConfig::from_env();
    let media = MediaConfig::from_env();
    let pipeline = PipelineConfig::from_env();

    let http = reqwest::Client::new();

    let enhancer = match providers.enhance {
        Some(cfg) => PromptEnhancer::new(Arc::new(TextCompletionClient::with_client(
            http.clone(),
            cfg,
        ))),
        None => {
            tracing::warn!("ENHANCE_API_URL/ENHANCE_API_KEY not set; prompt enhancement disabled");
            PromptEnhancer::disabled()
        }
    };

    let font = overlay::load_caption_font(media.font_path.as_deref());

    let synthesizer = ImageSynthesizer::new(
        Arc::new(ImageSynthesisClient::with_client(
            http.clone(),
            providers.image,
        )),
        font,
    );

    let animator = AnimationTaskController::new(
        Arc::new(AnimationClient::with_client(http.clone(), providers.video)),
        pipeline.poll_policy(),
    );

    let transcoder = MediaTranscoder::new(
        Arc::new(HttpMediaFetcher::with_client(http)),
        Arc::new(FfmpegGifEncoder {
            max_width: pipeline.gif_max_width,
            fps: pipeline.gif_fps,
        }),
        media.media_root,
        media.public_base,
    );

    GifGenerator::new(
        Arc::new(PgSubscriptionStore::new(pool.clone())),
        enhancer,
        synthesizer,
        animator,
        transcoder,
        Arc::new(PgRecorder::new(pool.clone())),
    )
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker, Kubernetes).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}

/// Build the CORS middleware layer from server configuration.
///
/// Panics at startup if any configured origin is invalid, which is the
/// desired behaviour -- we want misconfiguration to fail fast.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<_> = config
        .cors_origins
        .iter()
        .map(|o| {
            o.parse()
                .unwrap_or_else(|e| panic!("Invalid CORS origin '{o}': {e}"))
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
