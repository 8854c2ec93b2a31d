use anyhow::{Context, Result, anyhow};
use std::collections::HashMap;

/// Bundled config for builds without a `.env` (wasm, mobile)
const BUNDLED_CONFIG: &str = include_str!("../assets/config.env");

pub const CONVERSATION_PATH: &str = "/conversation";
pub const SUBMIT_FEEDBACK_PATH: &str = "/submit-feedback";
pub const FEEDBACK_DATA_PATH: &str = "/feedback-data";
pub const REVIEW_FEEDBACK_PATH: &str = "/review-feedback";

#[derive(Clone, Debug, PartialEq)]
pub struct Endpoints {
    pub conversation: String,
    pub submit_feedback: String,
    pub feedback_data: String,
    pub review_feedback: String,
}

impl Endpoints {
    pub fn from_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            conversation: format!("{base}{CONVERSATION_PATH}"),
            submit_feedback: format!("{base}{SUBMIT_FEEDBACK_PATH}"),
            feedback_data: format!("{base}{FEEDBACK_DATA_PATH}"),
            review_feedback: format!("{base}{REVIEW_FEEDBACK_PATH}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CognitoConfig {
    pub user_pool_id: String,
    pub client_id: String,
    pub region: String,
}

impl CognitoConfig {
    pub fn endpoint(&self) -> String {
        format!("https://cognito-idp.{}.amazonaws.com/", self.region)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub endpoints: Endpoints,
    pub cognito: CognitoConfig,
}

impl AppConfig {
    /// Process environment first, bundled `assets/config.env` second.
    pub fn from_env() -> Result<Self> {
        let bundled = parse_env_file(BUNDLED_CONFIG);
        Self::from_lookup(|key| {
            non_empty(std::env::var(key).ok()).or_else(|| non_empty(bundled.get(key).cloned()))
        })
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base = lookup("CHATDESK_API_BASE");
        let endpoint = |key: &str, path: &str| -> Result<String> {
            if let Some(url) = lookup(key) {
                return Ok(url);
            }
            base.as_deref()
                .map(|b| format!("{}{}", b.trim_end_matches('/'), path))
                .ok_or_else(|| anyhow!("neither {key} nor CHATDESK_API_BASE is set"))
        };

        let endpoints = Endpoints {
            conversation: endpoint("CHATDESK_CONVERSATION_URL", CONVERSATION_PATH)?,
            submit_feedback: endpoint("CHATDESK_SUBMIT_FEEDBACK_URL", SUBMIT_FEEDBACK_PATH)?,
            feedback_data: endpoint("CHATDESK_FEEDBACK_DATA_URL", FEEDBACK_DATA_PATH)?,
            review_feedback: endpoint("CHATDESK_REVIEW_FEEDBACK_URL", REVIEW_FEEDBACK_PATH)?,
        };

        let user_pool_id = lookup("COGNITO_USER_POOL_ID").context("COGNITO_USER_POOL_ID is not set")?;
        let client_id = lookup("COGNITO_CLIENT_ID").context("COGNITO_CLIENT_ID is not set")?;
        let region = match lookup("COGNITO_REGION") {
            Some(region) => region,
            None => region_from_pool_id(&user_pool_id).with_context(|| {
                format!("cannot derive region from user pool id '{user_pool_id}'; set COGNITO_REGION")
            })?,
        };

        Ok(Self {
            endpoints,
            cognito: CognitoConfig {
                user_pool_id,
                client_id,
                region,
            },
        })
    }
}

/// `us-east-1_AbCdEf` -> `us-east-1`
pub fn region_from_pool_id(pool_id: &str) -> Option<String> {
    let (region, rest) = pool_id.split_once('_')?;
    if region.is_empty() || rest.is_empty() {
        return None;
    }
    Some(region.to_string())
}

/// Parse `KEY=VALUE` lines, skipping blanks and `#` comments.
pub fn parse_env_file(contents: &str) -> HashMap<String, String> {
    let mut values = HashMap::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            values.insert(key.trim().to_string(), value.to_string());
        }
    }
    values
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn builds_endpoints_from_base() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("CHATDESK_API_BASE", "https://api.example.com/prod/"),
            ("COGNITO_USER_POOL_ID", "us-east-1_L24JDh1uQ"),
            ("COGNITO_CLIENT_ID", "client"),
        ]))
        .unwrap();
        assert_eq!(
            config.endpoints.feedback_data,
            "https://api.example.com/prod/feedback-data"
        );
        assert_eq!(config.cognito.region, "us-east-1");
        assert_eq!(
            config.cognito.endpoint(),
            "https://cognito-idp.us-east-1.amazonaws.com/"
        );
    }

    #[test]
    fn individual_endpoint_overrides_base() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("CHATDESK_API_BASE", "https://api.example.com/prod"),
            ("CHATDESK_CONVERSATION_URL", "http://localhost:9000/chat"),
            ("COGNITO_USER_POOL_ID", "eu-west-1_abc"),
            ("COGNITO_CLIENT_ID", "client"),
        ]))
        .unwrap();
        assert_eq!(config.endpoints.conversation, "http://localhost:9000/chat");
        assert_eq!(
            config.endpoints.review_feedback,
            "https://api.example.com/prod/review-feedback"
        );
    }

    #[test]
    fn missing_pool_is_an_error() {
        let err = AppConfig::from_lookup(lookup_from(&[(
            "CHATDESK_API_BASE",
            "https://api.example.com",
        )]))
        .unwrap_err();
        assert!(err.to_string().contains("COGNITO_USER_POOL_ID"));
    }

    #[test]
    fn parses_env_lines() {
        let parsed = parse_env_file("# comment\n\nA=1\n B = \"two\" \nbroken line\n");
        assert_eq!(parsed.get("A").map(String::as_str), Some("1"));
        assert_eq!(parsed.get("B").map(String::as_str), Some("two"));
        assert_eq!(parsed.len(), 2);
    }

    #[test]
    fn region_requires_underscore() {
        assert_eq!(region_from_pool_id("ap-south-1_x"), Some("ap-south-1".into()));
        assert_eq!(region_from_pool_id("nounderscore"), None);
    }
}
