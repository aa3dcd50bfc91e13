#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tempfile::TempDir;

use elible_api::app::app;
use elible_api::config::AppConfig;
use elible_api::database::MemoryStore;
use elible_api::services::NewAdmin;
use elible_api::state::AppState;

pub const ADMIN_USERNAME: &str = "root";
pub const ADMIN_PASSWORD: &str = "correct horse";

/// The router served on a free port over an in-memory store.
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub state: AppState,
    pub client: reqwest::Client,
    _image_dir: TempDir,
}

impl TestServer {
    pub async fn start() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let image_dir = tempfile::tempdir()?;
        let image_path = image_dir.path().to_string_lossy().into_owned();
        let domain = base_url.clone();
        let config = AppConfig::from_lookup(|key| match key {
            "APP_ENV" => Some("development".into()),
            "DATABASE_BACKEND" => Some("memory".into()),
            "JWT_SECRET" => Some("integration-secret".into()),
            "BCRYPT_COST" => Some("4".into()),
            "PORT" => Some(port.to_string()),
            "IMAGE_DIR" => Some(image_path.clone()),
            "WEB_DOMAIN" => Some(domain.clone()),
            _ => None,
        })?;

        let state = AppState::new(config, Arc::new(MemoryStore::new()));
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
        let router = app(state.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        let server = Self {
            port,
            base_url,
            state,
            client: reqwest::Client::new(),
            _image_dir: image_dir,
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Create the bootstrap admin directly and log in over HTTP.
    pub async fn admin_token(&self) -> Result<String> {
        self.state
            .admins
            .register(NewAdmin {
                username: ADMIN_USERNAME.into(),
                password: ADMIN_PASSWORD.into(),
                email: "root@example.com".into(),
                full_name: "Root Admin".into(),
            })
            .await?;

        let (status, body) = self
            .post(
                "/admin/login",
                None,
                json!({"username": ADMIN_USERNAME, "password": ADMIN_PASSWORD}),
            )
            .await?;
        anyhow::ensure!(status == StatusCode::OK, "login failed: {}", body);

        body["data"]["results"]["token"]
            .as_str()
            .map(str::to_string)
            .context("login response has no token")
    }

    /// POST a JSON body, returning the status and the decoded envelope.
    pub async fn post(&self, path: &str, token: Option<&str>, body: Value) -> Result<(StatusCode, Value)> {
        let mut req = self.client.post(self.url(path)).json(&body);
        if let Some(token) = token {
            req = req.bearer_auth(token);
        }
        let res = req.send().await?;
        let status = res.status();
        let body = res.json::<Value>().await?;
        Ok((status, body))
    }

    pub async fn post_multipart(
        &self,
        path: &str,
        token: &str,
        form: reqwest::multipart::Form,
    ) -> Result<(StatusCode, Value)> {
        let res = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;
        let status = res.status();
        let body = res.json::<Value>().await?;
        Ok((status, body))
    }
}

/// `data.results` of a success envelope.
pub fn results(body: &Value) -> &Value {
    &body["data"]["results"]
}

/// `data.status.pesan` of any envelope.
pub fn message(body: &Value) -> &str {
    body["data"]["status"]["pesan"].as_str().unwrap_or_default()
}
