//! Google Fit client
//!
//! Pulls heart-rate and sleep data over the Google Fit REST API using a
//! stored OAuth2 token, refreshing the access token through the
//! `refresh_token` grant when it has expired. The desktop authorization
//! flow that mints the initial token is the host application's job; this
//! client only consumes and maintains the resulting token file.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::adapters::{GoogleFitAdapter, VitalsPayloadAdapter};
use crate::types::FetchedVitals;

use super::FetchError;

const API_BASE: &str = "https://www.googleapis.com/fitness/v1";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

const HEART_RATE_DATA_TYPE: &str = "com.google.heart_rate.bpm";
const HEART_RATE_DATA_SOURCE: &str =
    "raw:com.google.heart_rate.bpm:com.boAt.wristgear:GoogleFitSync - HR count";
const SLEEP_DATA_TYPE: &str = "com.google.sleep.segment";
const SLEEP_DATA_SOURCE: &str =
    "derived:com.google.sleep.segment:com.google.android.gms:merge_sleep_segments";

/// Aggregate over the trailing day, one bucket
const DAY_MILLIS: i64 = 86_400_000;

/// On-disk OAuth2 token, the desktop `token.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub token_uri: Option<String>,
    /// Access-token expiry; absent means unknown and treated as expired
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
}

impl StoredToken {
    /// Load a token from disk
    pub fn load(path: &Path) -> Result<Self, FetchError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Save the token back to disk
    pub fn save(&self, path: &Path) -> Result<(), FetchError> {
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw)?;
        Ok(())
    }

    /// Whether the access token needs a refresh at `now`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expiry {
            Some(expiry) => now >= expiry,
            None => true,
        }
    }

    fn token_uri(&self) -> &str {
        self.token_uri.as_deref().unwrap_or(DEFAULT_TOKEN_URI)
    }
}

#[derive(Deserialize)]
struct RefreshResponse {
    access_token: String,
    expires_in: Option<i64>,
}

/// Google Fit `dataset:aggregate` request body
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AggregateRequest {
    aggregate_by: Vec<AggregateBy>,
    bucket_by_time: BucketByTime,
    start_time_millis: i64,
    end_time_millis: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AggregateBy {
    data_type_name: &'static str,
    data_source_id: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BucketByTime {
    duration_millis: i64,
}

impl AggregateRequest {
    fn new(
        data_type_name: &'static str,
        data_source_id: &'static str,
        window_end: DateTime<Utc>,
    ) -> Self {
        let window_start = window_end - Duration::milliseconds(DAY_MILLIS);
        Self {
            aggregate_by: vec![AggregateBy {
                data_type_name,
                data_source_id,
            }],
            bucket_by_time: BucketByTime {
                duration_millis: DAY_MILLIS,
            },
            start_time_millis: window_start.timestamp_millis(),
            end_time_millis: window_end.timestamp_millis(),
        }
    }
}

/// Authenticated Google Fit client
pub struct GoogleFitClient {
    client: reqwest::Client,
    token: StoredToken,
    token_path: Option<PathBuf>,
}

impl GoogleFitClient {
    /// Create a client from an in-memory token
    pub fn new(token: StoredToken) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
            token_path: None,
        }
    }

    /// Create a client from a `token.json` file; refreshed tokens are
    /// written back to the same path
    pub fn from_token_file(path: &Path) -> Result<Self, FetchError> {
        let token = StoredToken::load(path)?;
        Ok(Self {
            client: reqwest::Client::new(),
            token,
            token_path: Some(path.to_path_buf()),
        })
    }

    /// Fetch heart-rate and sleep vitals over the trailing day.
    ///
    /// The heart-rate call must succeed; a sleep call rejected by the
    /// provider is downgraded to missing data, since sleep sources are
    /// frequently unreadable for accounts without a paired tracker.
    pub async fn fetch_vitals(&mut self) -> Result<FetchedVitals, FetchError> {
        self.ensure_fresh_token().await?;
        let window_end = Utc::now();

        let heart_rate_json = self
            .aggregate(AggregateRequest::new(
                HEART_RATE_DATA_TYPE,
                HEART_RATE_DATA_SOURCE,
                window_end,
            ))
            .await?;

        let sleep_json = match self
            .aggregate(AggregateRequest::new(
                SLEEP_DATA_TYPE,
                SLEEP_DATA_SOURCE,
                window_end,
            ))
            .await
        {
            Ok(raw) => Some(raw),
            Err(FetchError::Status { status, .. }) => {
                log::warn!("sleep data source unreadable (status {status}), continuing without");
                None
            }
            Err(e) => return Err(e),
        };

        let vitals =
            GoogleFitAdapter.parse(Some(&heart_rate_json), sleep_json.as_deref())?;

        log::info!(
            "fetched vitals: heart_rate={:?} bpm, sleep={:?} h",
            vitals.heart_rate_bpm,
            vitals.sleep_hours
        );

        Ok(vitals)
    }

    /// Refresh the access token through the `refresh_token` grant when it
    /// has expired, persisting the result when the token came from disk
    async fn ensure_fresh_token(&mut self) -> Result<(), FetchError> {
        if !self.token.is_expired(Utc::now()) {
            return Ok(());
        }

        let refresh_token = self
            .token
            .refresh_token
            .clone()
            .ok_or_else(|| FetchError::Auth("token expired and no refresh token stored".into()))?;

        let resp = self
            .client
            .post(self.token.token_uri())
            .form(&[
                ("client_id", self.token.client_id.as_str()),
                ("client_secret", self.token.client_secret.as_str()),
                ("refresh_token", refresh_token.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Auth(format!(
                "token refresh failed ({status}): {body}"
            )));
        }

        let refreshed: RefreshResponse = resp.json().await?;
        self.token.access_token = refreshed.access_token;
        self.token.expiry = refreshed
            .expires_in
            .map(|secs| Utc::now() + Duration::seconds(secs));

        if let Some(path) = &self.token_path {
            self.token.save(path)?;
        }

        log::info!("access token refreshed");
        Ok(())
    }

    /// POST one aggregate request and return the raw response body
    async fn aggregate(&self, request: AggregateRequest) -> Result<String, FetchError> {
        let resp = self
            .client
            .post(format!("{API_BASE}/users/me/dataset:aggregate"))
            .header(
                "Authorization",
                format!("Bearer {}", self.token.access_token),
            )
            .json(&request)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Status { status, body });
        }

        Ok(resp.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_token() -> StoredToken {
        StoredToken {
            access_token: "at-123".to_string(),
            refresh_token: Some("rt-456".to_string()),
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            token_uri: None,
            expiry: Some(Utc::now() + Duration::hours(1)),
        }
    }

    #[test]
    fn test_token_expiry() {
        let now = Utc::now();
        let mut token = sample_token();

        token.expiry = Some(now + Duration::minutes(5));
        assert!(!token.is_expired(now));

        token.expiry = Some(now - Duration::minutes(5));
        assert!(token.is_expired(now));

        // Unknown expiry forces a refresh
        token.expiry = None;
        assert!(token.is_expired(now));
    }

    #[test]
    fn test_token_file_round_trip() {
        let token = sample_token();
        let path = std::env::temp_dir().join(format!(
            "mindwell-token-{}.json",
            uuid::Uuid::new_v4()
        ));

        token.save(&path).unwrap();
        let loaded = StoredToken::load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded.access_token, token.access_token);
        assert_eq!(loaded.refresh_token, token.refresh_token);
        assert_eq!(loaded.expiry, token.expiry);
    }

    #[test]
    fn test_default_token_uri() {
        let mut token = sample_token();
        assert_eq!(token.token_uri(), DEFAULT_TOKEN_URI);

        token.token_uri = Some("https://example.test/token".to_string());
        assert_eq!(token.token_uri(), "https://example.test/token");
    }

    #[test]
    fn test_aggregate_request_shape() {
        let window_end = Utc::now();
        let request =
            AggregateRequest::new(HEART_RATE_DATA_TYPE, HEART_RATE_DATA_SOURCE, window_end);

        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&request).unwrap()).unwrap();

        assert_eq!(
            json["aggregateBy"][0]["dataTypeName"],
            HEART_RATE_DATA_TYPE
        );
        assert_eq!(json["bucketByTime"]["durationMillis"], DAY_MILLIS);

        let start = json["startTimeMillis"].as_i64().unwrap();
        let end = json["endTimeMillis"].as_i64().unwrap();
        assert_eq!(end - start, DAY_MILLIS);
    }
}
