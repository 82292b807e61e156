#![allow(dead_code)]

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

use catalog_api::config::AppConfig;
use catalog_api::server;

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub client: reqwest::Client,
    pub config: AppConfig,
}

impl TestServer {
    /// Start the router on a free port with the in-memory store.
    ///
    /// Each test gets its own server because every `#[tokio::test]` runs on
    /// its own runtime and the server task dies with it.
    async fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut config = AppConfig::development();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = port;
        config.api.enable_request_logging = false;

        let state = server::build_state(&config).await?;
        let app = server::app(state, &config);
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("failed to bind port {}", port))?;

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("test server on port {} stopped: {}", port, e);
            }
        });

        Ok(Self {
            port,
            base_url,
            client: reqwest::Client::new(),
            config,
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
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

    /// Register `username` and return a bearer token for it
    pub async fn token_for(&self, username: &str) -> Result<String> {
        let creds = json!({ "username": username, "password": "correct horse" });

        let res = self.client.post(self.url("/auth/register")).json(&creds).send().await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "register failed: {}", res.status());

        let res = self.client.post(self.url("/auth/login")).json(&creds).send().await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "login failed: {}", res.status());

        let body = res.json::<Value>().await?;
        body.get("token")
            .and_then(Value::as_str)
            .map(str::to_string)
            .context("login response has no token")
    }

    /// Create a product and return its JSON representation
    pub async fn create_product(&self, token: &str, product: Value) -> Result<Value> {
        let res = self
            .client
            .post(self.url("/products"))
            .bearer_auth(token)
            .json(&product)
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create failed: {}", res.status());
        Ok(res.json::<Value>().await?)
    }
}

pub async fn spawn_server() -> Result<TestServer> {
    let server = TestServer::spawn().await?;
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

pub fn message(body: &Value) -> &str {
    body.get("message").and_then(Value::as_str).unwrap_or_default()
}
