use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::controllers::{
    health, recording::RecordingController, rehearsal::RehearsalController,
    scene::SceneController, settings::SettingsController,
};
use crate::domain::{
    recording::RecordingService,
    rehearsal::{ClientPlaybackDriver, RehearsalService},
    scene::{SceneService, SceneStore},
    script::ScriptParser,
    settings::SettingsService,
};
use crate::infrastructure::config::Config;
use crate::infrastructure::db::DbPool;
use crate::infrastructure::middleware::request_id_middleware;
use crate::infrastructure::repositories::{
    AppStateRepository, AudioRepository, ScriptModelRepository, SqliteAudioRepository,
};

/// Wire repositories, services and controllers into the application router.
///
/// The text-understanding service is injected so tests can swap it out.
pub async fn build_app(
    pool: Arc<DbPool>,
    config: Arc<Config>,
    model_repo: Arc<dyn ScriptModelRepository>,
) -> Router {
    // 1. Repositories
    tracing::info!("Instantiating repositories...");
    let state_repo = Arc::new(AppStateRepository::new(pool.clone()));
    let audio_repo: Arc<dyn AudioRepository> = Arc::new(SqliteAudioRepository::new(pool.clone()));

    // 2. Services
    tracing::info!("Instantiating services...");
    let scene_store = Arc::new(SceneStore::load(state_repo.clone()).await);
    let parser = Arc::new(ScriptParser::new(model_repo, config.max_script_chars));
    let playback_driver = Arc::new(ClientPlaybackDriver::new(Duration::from_secs(
        config.playback_report_timeout_secs,
    )));
    let rehearsal_service = Arc::new(RehearsalService::new(
        scene_store.clone(),
        playback_driver.clone(),
        Duration::from_millis(config.auto_advance_delay_ms),
    ));
    let scene_service = Arc::new(SceneService::new(
        scene_store.clone(),
        parser,
        audio_repo.clone(),
        rehearsal_service.clone(),
    ));
    let recording_service = Arc::new(RecordingService::new(
        scene_store,
        audio_repo,
        config.max_upload_bytes,
    ));
    let settings_service = Arc::new(SettingsService::load(state_repo).await);

    // 3. Controllers
    tracing::info!("Instantiating controllers...");
    let scene_controller = Arc::new(SceneController::new(scene_service));
    let recording_controller = Arc::new(RecordingController::new(recording_service));
    let rehearsal_controller = Arc::new(RehearsalController::new(
        rehearsal_service,
        playback_driver,
    ));
    let settings_controller = Arc::new(SettingsController::new(settings_service));

    // Scene and line editing
    let scene_routes = Router::new()
        .route(
            "/api/scenes",
            get(SceneController::list_scenes).post(SceneController::create_scene),
        )
        .route("/api/scenes/import", post(SceneController::import_scene))
        .route("/api/documents/extract", post(SceneController::extract_document))
        .route(
            "/api/scenes/:sceneId",
            get(SceneController::get_scene).delete(SceneController::delete_scene),
        )
        .route(
            "/api/scenes/:sceneId/lines/:lineId",
            patch(SceneController::update_line),
        )
        .route(
            "/api/scenes/:sceneId/lines/:lineId/role/toggle",
            post(SceneController::toggle_role),
        )
        .with_state(scene_controller);

    // Recording and stored audio
    let recording_routes = Router::new()
        .route(
            "/api/scenes/:sceneId/lines/:lineId/recordings",
            post(RecordingController::start_recording),
        )
        .route(
            "/api/recordings/:sessionId",
            axum::routing::delete(RecordingController::cancel_recording),
        )
        .route(
            "/api/recordings/:sessionId/chunks",
            post(RecordingController::append_chunk),
        )
        .route(
            "/api/recordings/:sessionId/stop",
            post(RecordingController::stop_recording),
        )
        .route("/api/audio/:key", get(RecordingController::get_audio))
        .with_state(recording_controller);

    // Rehearsal mode
    let rehearsal_routes = Router::new()
        .route(
            "/api/rehearsal",
            get(RehearsalController::current)
                .post(RehearsalController::start)
                .delete(RehearsalController::finish),
        )
        .route("/api/rehearsal/next", post(RehearsalController::next))
        .route("/api/rehearsal/previous", post(RehearsalController::previous))
        .route("/api/rehearsal/reveal", post(RehearsalController::reveal))
        .route("/api/rehearsal/jump", post(RehearsalController::jump))
        .route(
            "/api/rehearsal/playback",
            post(RehearsalController::report_playback),
        )
        .with_state(rehearsal_controller);

    let settings_routes = Router::new()
        .route(
            "/api/settings",
            get(SettingsController::get_settings).patch(SettingsController::update_settings),
        )
        .with_state(settings_controller);

    let cors = if config.is_development() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
    };

    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .with_state(pool)
        .merge(scene_routes)
        .merge(recording_routes)
        .merge(rehearsal_routes)
        .merge(settings_routes)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server on the configured address
pub async fn start_http_server(
    app: Router,
    config: Arc<Config>,
) -> Result<(), Box<dyn std::error::Error>> {
    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
