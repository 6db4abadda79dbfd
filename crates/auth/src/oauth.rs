//! Identity-provider client: authorize-URL construction and
//! authorization-code exchange.

use chrono::Utc;
use serde::Deserialize;

use gradebook_core::{ApiError, AppConfig};

use crate::claims::validate_and_get_claims;

const SCOPE: &str = "openid profile email";

/// Confidential client for the external identity provider.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    http: reqwest::Client,
    authorize_endpoint: String,
    token_endpoint: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl OAuthClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            authorize_endpoint: config.authorize_endpoint(),
            token_endpoint: config.token_endpoint(),
            client_id: config.oauth_client_id.clone(),
            client_secret: config.oauth_client_secret.clone(),
            redirect_uri: config.oauth_redirect_uri.clone(),
        }
    }

    /// Build the provider authorize URL the browser is redirected to.
    pub fn authorize_url(&self, state: &str) -> Result<String, ApiError> {
        let url = reqwest::Url::parse_with_params(
            &self.authorize_endpoint,
            &[
                ("client_id", self.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("response_mode", "query"),
                ("scope", SCOPE),
                ("state", state),
                ("prompt", "select_account"),
            ],
        )
        .map_err(|e| ApiError::internal(format!("bad authorize endpoint: {e}")))?;
        Ok(url.into())
    }

    /// Exchange an authorization code for an access token.
    ///
    /// The returned token has already had its claims validated; a provider
    /// that hands back an unusable token surfaces as an internal error, not
    /// a client one.
    pub async fn exchange_code(&self, code: &str) -> Result<String, ApiError> {
        let form = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("scope", SCOPE),
        ];

        let res = self
            .http
            .post(&self.token_endpoint)
            .form(&form)
            .send()
            .await
            .map_err(|e| ApiError::internal(format!("token endpoint unreachable: {e}")))?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(ApiError::internal(format!(
                "token exchange failed ({status}): {body}"
            )));
        }

        let token: TokenResponse = res
            .json()
            .await
            .map_err(|e| ApiError::internal(format!("malformed token response: {e}")))?;

        validate_and_get_claims(&token.access_token, Utc::now())
            .map_err(|e| ApiError::internal(format!("invalid token received from provider: {e}")))?;

        Ok(token.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> OAuthClient {
        let mut cfg = AppConfig::from_env();
        cfg.oauth_authority = "https://idp.example.com/tenant".to_string();
        cfg.oauth_client_id = "client-123".to_string();
        cfg.oauth_redirect_uri = "http://localhost:8080/auth/loginCallback".to_string();
        OAuthClient::new(&cfg)
    }

    #[test]
    fn authorize_url_carries_client_and_state() {
        let url = test_client().authorize_url("state-xyz").unwrap();
        assert!(url.starts_with("https://idp.example.com/tenant/oauth2/v2.0/authorize?"));
        assert!(url.contains("client_id=client-123"));
        assert!(url.contains("state=state-xyz"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("prompt=select_account"));
    }

    #[test]
    fn authorize_url_percent_encodes_scope() {
        let url = test_client().authorize_url("s").unwrap();
        assert!(url.contains("scope=openid+profile+email") || url.contains("scope=openid%20profile%20email"));
    }
}
