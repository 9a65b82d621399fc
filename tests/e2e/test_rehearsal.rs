use crate::e2e::helpers;

use helpers::{wait_for_position, TestContext};
use hyper::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use test_context::test_context;

async fn start(ctx: &TestContext, scene: &Value) -> Value {
    let response = ctx
        .client
        .post("/api/rehearsal", &json!({ "scene_id": scene["id"] }))
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);
    response.body.clone().unwrap()
}

async fn report(ctx: &TestContext, generation: &Value, outcome: &str) -> bool {
    let response = ctx
        .client
        .post(
            "/api/rehearsal/playback",
            &json!({ "generation": generation, "outcome": outcome }),
        )
        .await
        .unwrap();
    response.assert_status(StatusCode::ACCEPTED);
    response.field("accepted").as_bool().unwrap()
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_404_when_not_rehearsing(ctx: &TestContext) {
    let response = ctx.client.get("/api/rehearsal").await.unwrap();
    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_error_message("No active rehearsal");

    ctx.client
        .post_empty("/api/rehearsal/next")
        .await
        .unwrap()
        .assert_status(StatusCode::NOT_FOUND);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_start_at_the_first_line(ctx: &TestContext) {
    let scene = ctx.create_scene("Act 3").await;

    let view = start(ctx, &scene).await;

    assert_eq!(view["scene_id"], scene["id"]);
    assert_eq!(view["scene_title"], "Act 3");
    assert_eq!(view["position"], 0);
    assert_eq!(view["total"], 3);
    assert_eq!(view["line"], scene["lines"][0]);
    assert_eq!(view["obscured"], true);
    assert_eq!(view["can_previous"], false);
    assert_eq!(view["can_next"], true);
    assert_eq!(view["is_playing_audio"], false);
    assert!(view.get("playback").is_none());

    let current = ctx.client.get("/api/rehearsal").await.unwrap();
    assert_eq!(current.body.unwrap(), view);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_unknown_or_empty_scenes(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/rehearsal", &json!({ "scene_id": uuid::Uuid::new_v4() }))
        .await
        .unwrap();
    response.assert_status(StatusCode::NOT_FOUND);

    ctx.model.reply_with(json!({ "lines": [] }));
    let empty = ctx.create_scene("Empty").await;

    let response = ctx
        .client
        .post("/api/rehearsal", &json!({ "scene_id": empty["id"] }))
        .await
        .unwrap();
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_stay_within_scene_bounds(ctx: &TestContext) {
    let scene = ctx.create_scene("Act 3").await;
    start(ctx, &scene).await;

    let view = ctx.client.post_empty("/api/rehearsal/previous").await.unwrap();
    assert_eq!(view.field("position"), 0);

    for expected in [1, 2, 2] {
        let view = ctx.client.post_empty("/api/rehearsal/next").await.unwrap();
        view.assert_status(StatusCode::OK);
        assert_eq!(view.field("position"), expected);
    }

    let view = ctx.client.get("/api/rehearsal").await.unwrap();
    assert_eq!(view.field("can_next"), false);
    assert_eq!(view.field("can_previous"), true);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_jump_and_reveal(ctx: &TestContext) {
    let scene = ctx.create_scene("Act 3").await;
    start(ctx, &scene).await;

    let view = ctx
        .client
        .post("/api/rehearsal/jump", &json!({ "position": 2 }))
        .await
        .unwrap();
    view.assert_status(StatusCode::OK);
    assert_eq!(view.field("position"), 2);
    assert_eq!(view.field("obscured"), true);

    let view = ctx.client.post_empty("/api/rehearsal/reveal").await.unwrap();
    assert_eq!(view.field("obscured"), false);

    let response = ctx
        .client
        .post("/api/rehearsal/jump", &json!({ "position": 3 }))
        .await
        .unwrap();
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_never_obscure_my_lines(ctx: &TestContext) {
    let scene = ctx.create_scene("Act 3").await;
    ctx.client
        .post_empty(&format!(
            "/api/scenes/{}/lines/{}/role/toggle",
            scene["id"].as_str().unwrap(),
            scene["lines"][0]["id"].as_str().unwrap()
        ))
        .await
        .unwrap()
        .assert_status(StatusCode::OK);

    let view = start(ctx, &scene).await;

    assert_eq!(view["line"]["role"], "ME");
    assert_eq!(view["obscured"], false);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_play_partner_audio_and_auto_advance_once(ctx: &TestContext) {
    let scene = ctx.create_scene("Act 3").await;
    let scene_id = scene["id"].as_str().unwrap();
    let line_id = scene["lines"][0]["id"].as_str().unwrap();
    ctx.record(scene_id, line_id, b"to-be").await;

    let view = start(ctx, &scene).await;
    assert_eq!(view["is_playing_audio"], true);
    assert_eq!(view["obscured"], false);
    let playback = view["playback"].clone();
    assert_eq!(playback["line_id"], scene["lines"][0]["id"]);
    assert_eq!(playback["audio_reference"], json!(format!("audio_{}", line_id)));

    let audio = ctx
        .client
        .get(&format!("/api/audio/{}", playback["audio_reference"].as_str().unwrap()))
        .await
        .unwrap();
    assert_eq!(audio.body_bytes, b"to-be".to_vec());

    assert!(report(ctx, &playback["generation"], "finished").await);
    assert!(!report(ctx, &playback["generation"], "finished").await);

    let view = wait_for_position(&ctx.client, 1).await;
    assert_eq!(view["is_playing_audio"], false);

    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    let view = ctx.client.get("/api/rehearsal").await.unwrap();
    assert_eq!(view.field("position"), 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_not_advance_after_failed_playback(ctx: &TestContext) {
    let scene = ctx.create_scene("Act 3").await;
    ctx.record(
        scene["id"].as_str().unwrap(),
        scene["lines"][0]["id"].as_str().unwrap(),
        b"to-be",
    )
    .await;

    let view = start(ctx, &scene).await;
    assert!(report(ctx, &view["playback"]["generation"], "failed").await);

    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    let view = ctx.client.get("/api/rehearsal").await.unwrap();
    assert_eq!(view.field("position"), 0);
    assert_eq!(view.field("is_playing_audio"), false);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_drop_reports_for_abandoned_playback(ctx: &TestContext) {
    let scene = ctx.create_scene("Act 3").await;
    ctx.record(
        scene["id"].as_str().unwrap(),
        scene["lines"][0]["id"].as_str().unwrap(),
        b"to-be",
    )
    .await;

    let view = start(ctx, &scene).await;
    let generation = view["playback"]["generation"].clone();

    let moved = ctx
        .client
        .post("/api/rehearsal/jump", &json!({ "position": 2 }))
        .await
        .unwrap();
    assert_eq!(moved.field("position"), 2);

    report(ctx, &generation, "finished").await;

    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    let view = ctx.client.get("/api/rehearsal").await.unwrap();
    assert_eq!(view.field("position"), 2);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_finish_and_cancel_playback(ctx: &TestContext) {
    let scene = ctx.create_scene("Act 3").await;
    ctx.record(
        scene["id"].as_str().unwrap(),
        scene["lines"][0]["id"].as_str().unwrap(),
        b"to-be",
    )
    .await;
    let view = start(ctx, &scene).await;

    ctx.client
        .delete("/api/rehearsal")
        .await
        .unwrap()
        .assert_status(StatusCode::NO_CONTENT);

    report(ctx, &view["playback"]["generation"], "finished").await;

    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    ctx.client
        .get("/api/rehearsal")
        .await
        .unwrap()
        .assert_status(StatusCode::NOT_FOUND);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_end_rehearsal_when_its_scene_is_deleted(ctx: &TestContext) {
    let scene = ctx.create_scene("Act 3").await;
    start(ctx, &scene).await;

    ctx.client
        .delete(&format!("/api/scenes/{}?confirm=true", scene["id"].as_str().unwrap()))
        .await
        .unwrap()
        .assert_status(StatusCode::NO_CONTENT);

    ctx.client
        .get("/api/rehearsal")
        .await
        .unwrap()
        .assert_status(StatusCode::NOT_FOUND);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_keep_rehearsing_when_another_scene_is_deleted(ctx: &TestContext) {
    let rehearsed = ctx.create_scene("Act 3").await;
    let other = ctx.create_scene("Act 4").await;
    start(ctx, &rehearsed).await;

    ctx.client
        .delete(&format!("/api/scenes/{}?confirm=true", other["id"].as_str().unwrap()))
        .await
        .unwrap()
        .assert_status(StatusCode::NO_CONTENT);

    let view = ctx.client.get("/api/rehearsal").await.unwrap();
    view.assert_status(StatusCode::OK);
    assert_eq!(view.field("scene_id"), &rehearsed["id"]);
}
