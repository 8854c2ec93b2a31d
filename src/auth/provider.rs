use crate::config::CognitoConfig;
use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

const AMZ_JSON: &str = "application/x-amz-json-1.1";
const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";

/// The managed identity service. Issues the id token that is later sent as bearer token.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait IdentityProvider: Send + Sync {
    /// Returns the id token on success.
    async fn authenticate(&self, username: &str, password: &str) -> ClientResult<String>;

    /// Ends the provider-side session. Best effort.
    async fn sign_out(&self);
}

/// Cognito user pool client using the `USER_PASSWORD_AUTH` flow.
pub struct CognitoProvider {
    client: reqwest::Client,
    endpoint: String,
    client_id: String,
    access_token: Mutex<Option<String>>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthRequest<'a> {
    auth_flow: &'a str,
    client_id: &'a str,
    auth_parameters: AuthParameters<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "UPPERCASE")]
struct AuthParameters<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthResponse {
    #[serde(default)]
    authentication_result: Option<AuthenticationResult>,
    #[serde(default)]
    challenge_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
    id_token: String,
    #[serde(default)]
    access_token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct GlobalSignOutRequest<'a> {
    access_token: &'a str,
}

#[derive(Deserialize)]
struct CognitoErrorBody {
    #[serde(rename = "__type", default)]
    kind: String,
}

impl CognitoProvider {
    pub fn new(config: &CognitoConfig) -> Self {
        Self::with_endpoint(config.endpoint(), config.client_id.clone())
    }

    pub fn with_endpoint(endpoint: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            client_id: client_id.into(),
            access_token: Mutex::new(None),
        }
    }

    async fn call<T: Serialize>(&self, action: &str, body: &T) -> ClientResult<(bool, String)> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, AMZ_JSON)
            .header("X-Amz-Target", format!("{TARGET_PREFIX}.{action}"))
            .body(serde_json::to_vec(body)?)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;
        Ok((status.is_success(), text))
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl IdentityProvider for CognitoProvider {
    async fn authenticate(&self, username: &str, password: &str) -> ClientResult<String> {
        let request = InitiateAuthRequest {
            auth_flow: "USER_PASSWORD_AUTH",
            client_id: &self.client_id,
            auth_parameters: AuthParameters { username, password },
        };
        let (ok, body) = self.call("InitiateAuth", &request).await?;
        if !ok {
            let kind = serde_json::from_str::<CognitoErrorBody>(&body)
                .map(|e| e.kind)
                .unwrap_or_default();
            return Err(ClientError::Auth(format!("Cognito rejected login: {kind}")));
        }

        let parsed: InitiateAuthResponse = serde_json::from_str(&body)?;
        match parsed.authentication_result {
            Some(result) => {
                if let Ok(mut slot) = self.access_token.lock() {
                    *slot = result.access_token;
                }
                Ok(result.id_token)
            }
            None => Err(ClientError::Auth(format!(
                "unsupported challenge: {}",
                parsed.challenge_name.unwrap_or_else(|| "unknown".to_string())
            ))),
        }
    }

    async fn sign_out(&self) {
        let token = self.access_token.lock().ok().and_then(|mut slot| slot.take());
        let Some(token) = token else {
            return;
        };
        let request = GlobalSignOutRequest {
            access_token: &token,
        };
        match self.call("GlobalSignOut", &request).await {
            Ok((true, _)) => tracing::debug!("provider session ended"),
            Ok((false, body)) => tracing::warn!("GlobalSignOut rejected: {body}"),
            Err(err) => tracing::warn!("GlobalSignOut failed: {err}"),
        }
    }
}
