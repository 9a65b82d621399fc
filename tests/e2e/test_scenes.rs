use crate::e2e::helpers;

use helpers::{TestContext, HAMLET_TEXT};
use hyper::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_context::test_context;

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_create_a_scene_from_text(ctx: &TestContext) {
    let response = ctx
        .client
        .post(
            "/api/scenes",
            &json!({ "title": "Hamlet 3.1", "raw_text": HAMLET_TEXT }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::CREATED);

    assert_eq!(response.field("title"), "Hamlet 3.1");
    assert_eq!(response.field("raw_text"), HAMLET_TEXT);
    assert!(response.field("id").as_str().is_some());
    assert!(response.field("created_at").as_str().is_some());

    let lines = response.field("lines").as_array().unwrap();
    let summary: Vec<(&str, &str, Option<&str>, &str)> = lines
        .iter()
        .map(|l| {
            (
                l["character"].as_str().unwrap(),
                l["text"].as_str().unwrap(),
                l.get("direction").and_then(|d| d.as_str()),
                l["role"].as_str().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            ("HAMLET", "To be, or not to be.", None, "PARTNER"),
            ("STAGE", "", Some("(pause)"), "PARTNER"),
            ("OPHELIA", "My lord?", None, "PARTNER"),
        ]
    );
    assert_eq!(ctx.model.calls(), 1);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_number_untitled_scenes(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/scenes", &json!({ "raw_text": HAMLET_TEXT }))
        .await
        .unwrap();

    response.assert_status(StatusCode::CREATED);
    assert_eq!(response.field("title"), "Scene 1");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_list_scenes_newest_first(ctx: &TestContext) {
    let older = ctx.create_scene("Older").await;
    let newer = ctx.create_scene("Newer").await;

    let response = ctx.client.get("/api/scenes").await.unwrap();
    response.assert_status(StatusCode::OK);

    let scenes = response.body.as_ref().unwrap().as_array().unwrap().clone();
    let ids: Vec<_> = scenes.iter().map(|s| s["id"].clone()).collect();
    assert_eq!(ids, vec![newer["id"].clone(), older["id"].clone()]);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_get_a_scene_by_id(ctx: &TestContext) {
    let scene = ctx.create_scene("Act 1").await;

    let response = ctx
        .client
        .get(&format!("/api/scenes/{}", scene["id"].as_str().unwrap()))
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);
    assert_eq!(response.body.as_ref().unwrap(), &scene);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_404_for_unknown_scene(ctx: &TestContext) {
    let response = ctx
        .client
        .get(&format!("/api/scenes/{}", uuid::Uuid::new_v4()))
        .await
        .unwrap();

    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_error_message("Scene not found");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_blank_script_without_calling_the_model(ctx: &TestContext) {
    let response = ctx
        .client
        .post("/api/scenes", &json!({ "raw_text": "   \n" }))
        .await
        .unwrap();

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(ctx.model.calls(), 0);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_not_create_a_scene_when_the_model_fails(ctx: &TestContext) {
    ctx.model.fail_with("upstream timeout");

    let response = ctx
        .client
        .post("/api/scenes", &json!({ "raw_text": HAMLET_TEXT }))
        .await
        .unwrap();

    response.assert_status(StatusCode::BAD_GATEWAY);
    response.assert_error_message("Script parsing failed");

    let list = ctx.client.get("/api/scenes").await.unwrap();
    assert_eq!(list.body.unwrap(), json!([]));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_malformed_model_output(ctx: &TestContext) {
    for reply in [
        json!({ "lines": [{ "character": "hamlet", "text": "lower case", "direction": null }] }),
        json!({ "lines": [{ "character": "HAMLET", "direction": null }] }),
        json!({ "lines": [{ "character": "HAMLET", "text": "hi", "direction": null, "mood": "sad" }] }),
        json!({ "character": "HAMLET", "text": "not an array" }),
    ] {
        ctx.model.reply_with(reply);

        let response = ctx
            .client
            .post("/api/scenes", &json!({ "raw_text": HAMLET_TEXT }))
            .await
            .unwrap();

        response.assert_status(StatusCode::BAD_GATEWAY);
    }

    ctx.model.reply_raw("this is not json");
    let response = ctx
        .client
        .post("/api/scenes", &json!({ "raw_text": HAMLET_TEXT }))
        .await
        .unwrap();
    response.assert_status(StatusCode::BAD_GATEWAY);

    let list = ctx.client.get("/api/scenes").await.unwrap();
    assert_eq!(list.body.unwrap(), json!([]));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_accept_an_empty_parse(ctx: &TestContext) {
    ctx.model.reply_with(json!({ "lines": [] }));

    let response = ctx
        .client
        .post("/api/scenes", &json!({ "raw_text": "Some notes without dialogue" }))
        .await
        .unwrap();

    response.assert_status(StatusCode::CREATED);
    assert_eq!(response.field("lines"), &json!([]));
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_require_confirmation_to_delete(ctx: &TestContext) {
    let scene = ctx.create_scene("Act 1").await;
    let path = format!("/api/scenes/{}", scene["id"].as_str().unwrap());

    let response = ctx.client.delete(&path).await.unwrap();
    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_error_message("confirmed");

    ctx.client.get(&path).await.unwrap().assert_status(StatusCode::OK);

    let response = ctx
        .client
        .delete(&format!("{}?confirm=true", path))
        .await
        .unwrap();
    response.assert_status(StatusCode::NO_CONTENT);

    ctx.client.get(&path).await.unwrap().assert_status(StatusCode::NOT_FOUND);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_change_only_the_role(ctx: &TestContext) {
    let scene = ctx.create_scene("Act 1").await;
    let line = scene["lines"][0].clone();

    let response = ctx
        .client
        .patch(
            &format!(
                "/api/scenes/{}/lines/{}",
                scene["id"].as_str().unwrap(),
                line["id"].as_str().unwrap()
            ),
            &json!({ "role": "ME" }),
        )
        .await
        .unwrap();

    response.assert_status(StatusCode::OK);

    let mut expected = line.clone();
    expected["role"] = json!("ME");
    assert_eq!(response.body.unwrap(), expected);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_edit_text_fields_of_a_line(ctx: &TestContext) {
    let scene = ctx.create_scene("Act 1").await;
    let scene_id = scene["id"].as_str().unwrap();
    let line_id = scene["lines"][2]["id"].as_str().unwrap();
    let path = format!("/api/scenes/{}/lines/{}", scene_id, line_id);

    let response = ctx
        .client
        .patch(
            &path,
            &json!({ "character": "ophelia", "text": "My lord, I have remembrances of yours.", "direction": "(offering letters)" }),
        )
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);
    assert_eq!(response.field("character"), "OPHELIA");
    assert_eq!(response.field("direction"), "(offering letters)");

    let response = ctx
        .client
        .patch(&path, &json!({ "direction": null }))
        .await
        .unwrap();
    response.assert_status(StatusCode::OK);
    assert!(response.body.as_ref().unwrap().get("direction").is_none());
    assert_eq!(response.field("text"), "My lord, I have remembrances of yours.");

    let stored = ctx
        .client
        .get(&format!("/api/scenes/{}", scene_id))
        .await
        .unwrap();
    assert_eq!(stored.field("lines")[2], response.body.unwrap());
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_reject_invalid_line_patches(ctx: &TestContext) {
    let scene = ctx.create_scene("Act 1").await;
    let path = format!(
        "/api/scenes/{}/lines/{}",
        scene["id"].as_str().unwrap(),
        scene["lines"][0]["id"].as_str().unwrap()
    );

    for patch in [
        json!({ "id": uuid::Uuid::new_v4() }),
        json!({ "role": "DIRECTOR" }),
        json!({}),
        json!({ "character": " " }),
        json!({ "text": "" }),
    ] {
        let response = ctx.client.patch(&path, &patch).await.unwrap();
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    let stored = ctx
        .client
        .get(&format!("/api/scenes/{}", scene["id"].as_str().unwrap()))
        .await
        .unwrap();
    assert_eq!(stored.body.unwrap(), scene);
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_return_404_when_patching_unknown_ids(ctx: &TestContext) {
    let scene = ctx.create_scene("Act 1").await;
    let scene_id = scene["id"].as_str().unwrap();
    let line_id = scene["lines"][0]["id"].as_str().unwrap();

    let response = ctx
        .client
        .patch(
            &format!("/api/scenes/{}/lines/{}", uuid::Uuid::new_v4(), line_id),
            &json!({ "role": "ME" }),
        )
        .await
        .unwrap();
    response.assert_status(StatusCode::NOT_FOUND);

    let response = ctx
        .client
        .patch(
            &format!("/api/scenes/{}/lines/{}", scene_id, uuid::Uuid::new_v4()),
            &json!({ "role": "ME" }),
        )
        .await
        .unwrap();
    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_error_message("Line not found");
}

#[test_context(TestContext)]
#[tokio::test]
async fn it_should_toggle_a_line_role(ctx: &TestContext) {
    let scene = ctx.create_scene("Act 1").await;
    let path = format!(
        "/api/scenes/{}/lines/{}/role/toggle",
        scene["id"].as_str().unwrap(),
        scene["lines"][0]["id"].as_str().unwrap()
    );

    let response = ctx.client.post_empty(&path).await.unwrap();
    response.assert_status(StatusCode::OK);
    assert_eq!(response.field("role"), "ME");

    let response = ctx.client.post_empty(&path).await.unwrap();
    assert_eq!(response.field("role"), "PARTNER");
}
