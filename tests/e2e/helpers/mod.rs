use async_trait::async_trait;
use parking_lot::Mutex;
use scene_partner_backend::infrastructure::config::{Config, Environment, LogFormat};
use scene_partner_backend::infrastructure::db::{create_pool, run_migrations};
use scene_partner_backend::infrastructure::http::build_app;
use scene_partner_backend::infrastructure::repositories::{ScriptModelRepository, StructuredRequest};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use test_context::AsyncTestContext;
use tokio::net::TcpListener;
use uuid::Uuid;


use api_client::TestClient;

/// Stands in for the language model. Replies with whatever the test queued,
/// defaulting to the HAMLET/OPHELIA exchange.
pub struct FakeScriptModel {
    reply: Mutex<Result<Option<String>, String>>,
    prompts: Mutex<Vec<String>>,
}

impl FakeScriptModel {
    fn new() -> Self {
        Self {
            reply: Mutex::new(Ok(Some(hamlet_response().to_string()))),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn reply_with(&self, body: Value) {
        *self.reply.lock() = Ok(Some(body.to_string()));
    }

    pub fn reply_raw(&self, body: &str) {
        *self.reply.lock() = Ok(Some(body.to_string()));
    }

    pub fn fail_with(&self, message: &str) {
        *self.reply.lock() = Err(message.to_string());
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().len()
    }
}

#[async_trait]
impl ScriptModelRepository for FakeScriptModel {
    async fn complete_structured(
        &self,
        request: &StructuredRequest,
    ) -> Result<Option<String>, String> {
        self.prompts.lock().push(request.prompt.clone());
        self.reply.lock().clone()
    }
}

/// The parse of:
///
/// ```text
/// HAMLET: To be, or not to be.
/// (pause)
/// OPHELIA: My lord?
/// ```
pub fn hamlet_response() -> Value {
    json!({
        "lines": [
            { "character": "HAMLET", "text": "To be, or not to be.", "direction": null },
            { "character": "STAGE", "text": "", "direction": "(pause)" },
            { "character": "OPHELIA", "text": "My lord?", "direction": null }
        ]
    })
}

pub const HAMLET_TEXT: &str = "HAMLET: To be, or not to be.\n(pause)\nOPHELIA: My lord?";

pub struct TestContext {
    pub client: TestClient,
    pub model: Arc<FakeScriptModel>,
    #[allow(dead_code)]
    pub config: Arc<Config>,
    db_path: PathBuf,
}

impl TestContext {
    /// Create a scene through the API and return its JSON
    pub async fn create_scene(&self, title: &str) -> Value {
        let response = self
            .client
            .post("/api/scenes", &json!({ "title": title, "raw_text": HAMLET_TEXT }))
            .await
            .unwrap();
        response.assert_status(hyper::StatusCode::CREATED);
        response.body.clone().unwrap()
    }

    /// Record `bytes` onto a line and return the updated line
    pub async fn record(&self, scene_id: &str, line_id: &str, bytes: &[u8]) -> Value {
        let session = self
            .client
            .post(
                &format!("/api/scenes/{}/lines/{}/recordings", scene_id, line_id),
                &json!({}),
            )
            .await
            .unwrap();
        session.assert_status(hyper::StatusCode::CREATED);
        let session_id = session.field("session_id").as_str().unwrap().to_string();

        self.client
            .post_bytes(
                &format!("/api/recordings/{}/chunks", session_id),
                bytes,
                Some("application/octet-stream"),
            )
            .await
            .unwrap()
            .assert_status(hyper::StatusCode::NO_CONTENT);

        let stopped = self
            .client
            .post_empty(&format!("/api/recordings/{}/stop", session_id))
            .await
            .unwrap();
        stopped.assert_status(hyper::StatusCode::OK);
        stopped.body.clone().unwrap()
    }
}

impl AsyncTestContext for TestContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        async {
            let db_path = std::env::temp_dir().join(format!("scene_partner_test_{}.db", Uuid::new_v4()));

            let config = Arc::new(Config {
                database_url: format!("sqlite://{}", db_path.display()),
                host: "127.0.0.1".to_string(),
                port: 0, // Will be assigned by the OS
                environment: Environment::Development,
                log_format: LogFormat::Pretty,
                openai_api_key: "test-key".to_string(),
                openai_api_base: None,
                parser_model: "test-model".to_string(),
                max_script_chars: 10_000,
                max_upload_bytes: 1024 * 1024,
                auto_advance_delay_ms: 20,
                playback_report_timeout_secs: 5,
            });

            let pool = create_pool(&config.database_url)
                .await
                .expect("Failed to open test database");
            run_migrations(&pool).await.expect("Failed to run migrations");

            let model = Arc::new(FakeScriptModel::new());
            let app = build_app(Arc::new(pool), config.clone(), model.clone()).await;

            // Start server
            let listener = TcpListener::bind("127.0.0.1:0")
                .await
                .expect("Failed to bind listener");
            let addr = listener.local_addr().expect("Failed to get local addr");
            let base_url = format!("http://{}", addr);

            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            Self {
                client: TestClient::new(&base_url),
                model,
                config,
                db_path,
            }
        }
    }

    fn teardown(self) -> impl std::future::Future<Output = ()> + Send {
        async move {
            for suffix in ["", "-wal", "-shm"] {
                let mut path = self.db_path.clone().into_os_string();
                path.push(suffix);
                let _ = std::fs::remove_file(path);
            }
        }
    }
}

/// Poll the rehearsal until it reaches `position`
pub async fn wait_for_position(client: &TestClient, position: u64) -> Value {
    for _ in 0..200 {
        let response = client.get("/api/rehearsal").await.unwrap();
        if response.status == hyper::StatusCode::OK
            && response.field("position").as_u64() == Some(position)
        {
            return response.body.clone().unwrap();
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    panic!("rehearsal never reached position {}", position);
}
