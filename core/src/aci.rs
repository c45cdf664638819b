//! HTTP client for the ACI function registry and execution service.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::Settings;
use crate::error::{OrchestratorError, Result};
use crate::registry::{CapabilityDescriptor, CapabilityRegistry};
use crate::runtime::{CapabilityExecutor, LinkedAccount};

const API_KEY_HEADER: &str = "X-API-KEY";

#[derive(Serialize)]
struct ExecuteBody<'a> {
    function_input: Value,
    linked_account_owner_id: &'a str,
}

#[derive(Clone)]
pub struct AciClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl AciClient {
    pub fn new(settings: &Settings) -> Self {
        Self::with_base_url(&settings.aci_base_url, settings.aci_api_key.clone())
    }

    pub fn with_base_url(base_url: &str, api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn function_url(&self, name: &str, action: &str) -> String {
        format!("{}/functions/{}/{}", self.base_url, name, action)
    }

    async fn read_body(response: reqwest::Response, name: &str) -> Result<Value> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OrchestratorError::Execution(format!(
                "ACI returned {status} for {name}: {body}"
            )));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl CapabilityRegistry for AciClient {
    async fn get_definition(&self, name: &str) -> Result<CapabilityDescriptor> {
        info!("Getting function definition for {}", name);
        let response = self
            .http
            .get(self.function_url(name, "definition"))
            .query(&[("format", "openai")])
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        // Only a missing definition means the capability is unknown; a 404 on
        // execute is some other resource (e.g. the linked account).
        if response.status() == StatusCode::NOT_FOUND {
            return Err(OrchestratorError::CapabilityNotFound(name.to_string()));
        }
        let definition = Self::read_body(response, name).await?;
        CapabilityDescriptor::from_definition(definition)
    }
}

#[async_trait]
impl CapabilityExecutor for AciClient {
    async fn execute(&self, name: &str, arguments: Value, account: &LinkedAccount) -> Result<Value> {
        let body = ExecuteBody {
            function_input: arguments,
            linked_account_owner_id: account.as_str(),
        };
        let response = self
            .http
            .post(self.function_url(name, "execute"))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body)
            .send()
            .await?;

        let result = Self::read_body(response, name).await?;
        debug!("Function {} returned success={}", name, result["success"]);
        Ok(result)
    }
}
