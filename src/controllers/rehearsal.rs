use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::{
    domain::rehearsal::{
        ClientPlaybackDriver, JumpRequest, PlaybackReport, PlaybackReportResponse,
        RehearsalServiceApi, RehearsalView, StartRehearsalRequest,
    },
    error::AppResult,
};

pub struct RehearsalController {
    rehearsal_service: Arc<dyn RehearsalServiceApi>,
    playback_driver: Arc<ClientPlaybackDriver>,
}

impl RehearsalController {
    pub fn new(
        rehearsal_service: Arc<dyn RehearsalServiceApi>,
        playback_driver: Arc<ClientPlaybackDriver>,
    ) -> Self {
        Self {
            rehearsal_service,
            playback_driver,
        }
    }

    /// POST /api/rehearsal - Start rehearsing a scene
    pub async fn start(
        State(controller): State<Arc<RehearsalController>>,
        Json(request): Json<StartRehearsalRequest>,
    ) -> AppResult<Json<RehearsalView>> {
        let view = controller.rehearsal_service.start(request.scene_id).await?;
        Ok(Json(view))
    }

    /// GET /api/rehearsal - Current rehearsal state
    pub async fn current(
        State(controller): State<Arc<RehearsalController>>,
    ) -> AppResult<Json<RehearsalView>> {
        Ok(Json(controller.rehearsal_service.current().await?))
    }

    /// POST /api/rehearsal/next
    pub async fn next(
        State(controller): State<Arc<RehearsalController>>,
    ) -> AppResult<Json<RehearsalView>> {
        Ok(Json(controller.rehearsal_service.next().await?))
    }

    /// POST /api/rehearsal/previous
    pub async fn previous(
        State(controller): State<Arc<RehearsalController>>,
    ) -> AppResult<Json<RehearsalView>> {
        Ok(Json(controller.rehearsal_service.previous().await?))
    }

    /// POST /api/rehearsal/reveal
    pub async fn reveal(
        State(controller): State<Arc<RehearsalController>>,
    ) -> AppResult<Json<RehearsalView>> {
        Ok(Json(controller.rehearsal_service.reveal().await?))
    }

    /// POST /api/rehearsal/jump
    pub async fn jump(
        State(controller): State<Arc<RehearsalController>>,
        Json(request): Json<JumpRequest>,
    ) -> AppResult<Json<RehearsalView>> {
        Ok(Json(controller.rehearsal_service.jump(request.position).await?))
    }

    /// POST /api/rehearsal/playback - Client reports the end of a playback
    pub async fn report_playback(
        State(controller): State<Arc<RehearsalController>>,
        Json(report): Json<PlaybackReport>,
    ) -> (StatusCode, Json<PlaybackReportResponse>) {
        let accepted = controller
            .playback_driver
            .report(report.generation, report.outcome);

        (StatusCode::ACCEPTED, Json(PlaybackReportResponse { accepted }))
    }

    /// DELETE /api/rehearsal - Leave rehearsal
    pub async fn finish(State(controller): State<Arc<RehearsalController>>) -> StatusCode {
        controller.rehearsal_service.finish().await;
        StatusCode::NO_CONTENT
    }
}
