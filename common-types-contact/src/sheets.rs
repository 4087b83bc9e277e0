use ::std::time::{Duration, Instant};
use axum::async_trait;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::{
    Config::SheetsConfig,
    Constants,
};

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
// Refresh a little before Google expires the token
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);
// The cause is logged once at startup, requests only note the skip
const SKIPPED_NOTICE: &str = "Spreadsheet logging is disabled. Skipping spreadsheet integration";

#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("Invalid service account private key, {0}")]
    InvalidKey(jsonwebtoken::errors::Error),
    #[error("Failed to sign service account assertion, {0}")]
    Signing(jsonwebtoken::errors::Error),
    #[error("Request to Google failed, {0}")]
    Http(#[from] reqwest::Error),
    #[error("Google rejected the request (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AppendSummary {
    pub updated_range: Option<String>,
    pub updated_rows: Option<u32>,
}

#[derive(Debug, PartialEq)]
pub enum SheetOutcome {
    Appended(AppendSummary),
    /// No spreadsheet is configured, nothing was attempted.
    Skipped,
}

impl SheetOutcome {
    pub fn updated(&self) -> bool {
        matches!(self, SheetOutcome::Appended(_))
    }
}

#[async_trait]
pub trait SheetAppender: Send + Sync {
    async fn append_row(&self, row: &[String]) -> Result<AppendSummary, SheetsError>;
}

/// Appends `row` when a spreadsheet is configured.
pub async fn append_if_configured(sheets: Option<&dyn SheetAppender>, row: &[String]) -> Result<SheetOutcome, SheetsError> {
    let Some(sheets) = sheets else {
        tracing::warn!("{SKIPPED_NOTICE}");
        return Ok(SheetOutcome::Skipped);
    };
    let summary = sheets.append_row(row).await?;
    Ok(SheetOutcome::Appended(summary))
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Deserialize)]
struct AppendResponse {
    updates: Option<AppendSummary>,
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// Google Sheets v4 client authorised as a service account.
pub struct GoogleSheetsClient {
    http_client: reqwest::Client,
    config: SheetsConfig,
    encoding_key: EncodingKey,
    token: Mutex<Option<CachedToken>>,
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, SheetsError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(SheetsError::Rejected { status: status.as_u16(), body })
}

impl GoogleSheetsClient {
    pub fn new(http_client: reqwest::Client, config: SheetsConfig) -> Result<Self, SheetsError> {
        let encoding_key = EncodingKey::from_rsa_pem(config.service_account.private_key.as_bytes())
            .map_err(SheetsError::InvalidKey)?;
        Ok(GoogleSheetsClient {
            http_client,
            config,
            encoding_key,
            token: Mutex::new(None),
        })
    }

    fn cached_token(&self) -> Option<String> {
        let token = self.token.lock();
        let cached = token.as_ref()?;
        if cached.expires_at <= Instant::now() {
            return None;
        }
        Some(cached.access_token.clone())
    }

    async fn access_token(&self) -> Result<String, SheetsError> {
        if let Some(access_token) = self.cached_token() {
            return Ok(access_token);
        }

        let iat = Utc::now().timestamp();
        let claims = Claims {
            iss: &self.config.service_account.client_email,
            scope: Constants::SHEETS_SCOPE,
            aud: &self.config.token_uri,
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        };
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(SheetsError::Signing)?;

        let response = self.http_client
            .post(&self.config.token_uri)
            .form(&[
                ("grant_type", JWT_BEARER_GRANT),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;
        let token = ensure_success(response).await?.json::<TokenResponse>().await?;

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        *self.token.lock() = Some(CachedToken {
            access_token: token.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });
        Ok(token.access_token)
    }

    fn append_url(&self) -> String {
        format!(
            "{}/v4/spreadsheets/{}/values/{}:append",
            self.config.api_base.trim_end_matches('/'),
            urlencoding::encode(&self.config.spreadsheet_id),
            urlencoding::encode(&self.config.range),
        )
    }
}

#[async_trait]
impl SheetAppender for GoogleSheetsClient {
    #[tracing::instrument(skip(self, row), fields(spreadsheet_id = %self.config.spreadsheet_id))]
    async fn append_row(&self, row: &[String]) -> Result<AppendSummary, SheetsError> {
        let access_token = self.access_token().await?;
        let response = self.http_client
            .post(self.append_url())
            .query(&[("valueInputOption", "USER_ENTERED")])
            .bearer_auth(access_token)
            .json(&json!({ "values": [row] }))
            .send()
            .await?;
        let appended = ensure_success(response).await?.json::<AppendResponse>().await?;
        let summary = appended.updates.unwrap_or_default();
        tracing::info!(
            "Data appended to spreadsheet, range: {:?}, rows: {:?}",
            summary.updated_range,
            summary.updated_rows,
        );
        Ok(summary)
    }
}
