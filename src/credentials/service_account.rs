//! Service-account token exchange
//!
//! Signs an RS256 JWT assertion with the service account's private key and
//! trades it at the key's `token_uri` for an access token (OAuth 2.0
//! JWT-bearer grant).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use super::CredentialProvider;
use crate::errors::{SyncError, SyncResult};
use crate::observability::{log_event_with_fields, Event};
use crate::transport::{HttpRequest, Method, Transport};

/// Scope required by the remote config API
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const ASSERTION_TTL_SECS: i64 = 3600;

/// Fields read from a service-account JSON key file
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type", default)]
    pub key_type: String,
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Debug, Serialize, Deserialize)]
struct AssertionClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: String,
}

/// Exchanges a service-account key for bearer tokens
pub struct ServiceAccount {
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    scopes: Vec<String>,
}

impl ServiceAccount {
    /// Parses a JSON key blob. The private key is validated up front.
    pub fn from_json(blob: &str) -> SyncResult<Self> {
        let key: ServiceAccountKey = serde_json::from_str(blob)
            .map_err(|e| SyncError::credential(format!("malformed service account key: {}", e)))?;

        if !key.key_type.is_empty() && key.key_type != "service_account" {
            return Err(SyncError::credential(format!(
                "unsupported credential type '{}'",
                key.key_type
            )));
        }
        if key.client_email.is_empty() {
            return Err(SyncError::credential("service account key has no client_email"));
        }

        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| SyncError::credential(format!("unusable private key: {}", e)))?;

        Ok(Self {
            key,
            encoding_key,
            scopes: vec![CLOUD_PLATFORM_SCOPE.to_string()],
        })
    }

    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    pub fn token_uri(&self) -> &str {
        &self.key.token_uri
    }

    /// Signed JWT assertion valid for one hour from `now`
    pub fn assertion(&self, now: DateTime<Utc>) -> SyncResult<String> {
        let claims = AssertionClaims {
            iss: self.key.client_email.clone(),
            scope: self.scopes.join(" "),
            aud: self.key.token_uri.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ASSERTION_TTL_SECS)).timestamp(),
        };
        let header = Header {
            kid: self.key.private_key_id.clone(),
            ..Header::new(Algorithm::RS256)
        };

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| SyncError::credential(format!("failed to sign assertion: {}", e)))
    }
}

impl std::fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("client_email", &self.key.client_email)
            .field("token_uri", &self.key.token_uri)
            .field("scopes", &self.scopes)
            .finish()
    }
}

impl CredentialProvider for ServiceAccount {
    fn bearer_token(&self, transport: &dyn Transport) -> SyncResult<String> {
        let assertion = self.assertion(Utc::now())?;
        let body = form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", JWT_BEARER_GRANT)
            .append_pair("assertion", &assertion)
            .finish();

        let request = HttpRequest::new(Method::Post, self.key.token_uri.clone())
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body);

        log_event_with_fields(
            Event::CredentialExchange,
            &[("client_email", self.client_email()), ("token_uri", self.token_uri())],
        );

        // A transport failure here is still a credential failure for the operation.
        let response = transport
            .execute(&request)
            .map_err(|e| SyncError::credential(format!("token exchange failed: {}", e)))?;

        if !response.is_success() {
            return Err(SyncError::credential(format!(
                "token exchange rejected with status {}: {}",
                response.status, response.body
            )));
        }

        let token: TokenResponse = serde_json::from_str(&response.body)
            .map_err(|e| SyncError::credential(format!("unreadable token response: {}", e)))?;
        if token.access_token.is_empty() {
            return Err(SyncError::credential("token response has no access_token"));
        }
        Ok(token.access_token)
    }
}
