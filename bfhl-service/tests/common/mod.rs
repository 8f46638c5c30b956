#![allow(dead_code)]

use bfhl_service::config::{AiConfig, AiProvider, BfhlConfig, IdentityConfig};
use bfhl_service::services::providers::TextProvider;
use bfhl_service::startup::Application;
use service_core::config::Config as CoreConfig;
use std::sync::Arc;
use std::time::Duration;

pub const TEST_EMAIL: &str = "tester@chitkara.edu.in";

pub struct TestApp {
    pub http_address: String,
    pub http_port: u16,
    pub client: reqwest::Client,
}

/// Config for a test instance on a random port, AI served by the mock provider.
pub fn test_config() -> BfhlConfig {
    BfhlConfig {
        common: CoreConfig {
            port: 0,
            ..CoreConfig::default()
        },
        identity: IdentityConfig::new(TEST_EMAIL),
        ai: AiConfig {
            provider: AiProvider::Mock,
            timeout: Duration::from_secs(2),
            ..AiConfig::default()
        },
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(test_config()).await
    }

    pub async fn spawn_with(config: BfhlConfig) -> Self {
        let app = Application::build(config)
            .await
            .expect("Failed to build test application");
        Self::start(app).await
    }

    pub async fn spawn_with_provider(config: BfhlConfig, provider: Arc<dyn TextProvider>) -> Self {
        let app = Application::build_with_provider(config, provider)
            .await
            .expect("Failed to build test application");
        Self::start(app).await
    }

    async fn start(app: Application) -> Self {
        let http_port = app.http_port();
        let http_address = format!("http://127.0.0.1:{}", http_port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling the router
        let client = reqwest::Client::new();
        for _ in 0..50 {
            if client
                .get(format!("{}/metrics", http_address))
                .send()
                .await
                .is_ok()
            {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        Self {
            http_address,
            http_port,
            client,
        }
    }

    pub async fn post_bfhl(&self, body: &serde_json::Value) -> reqwest::Response {
        self.client
            .post(format!("{}/bfhl", self.http_address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_raw(&self, body: impl Into<reqwest::Body>) -> reqwest::Response {
        self.client
            .post(format!("{}/bfhl", self.http_address))
            .header("content-type", "application/json")
            .body(body)
            .send()
            .await
            .expect("Failed to execute request")
    }
}

/// Assert the failure envelope shape and return the error message.
pub async fn error_message(response: reqwest::Response, expected_status: u16) -> String {
    assert_eq!(response.status().as_u16(), expected_status);
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["is_success"], false);
    assert!(body.get("data").is_none(), "error envelope carried data: {}", body);
    let error = body["error"].as_str().expect("error must be a string").to_string();
    assert!(!error.is_empty());
    error
}
