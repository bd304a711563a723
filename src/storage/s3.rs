use crate::config::StorageConfig;
use crate::error::{AppError, Result};
use crate::storage::sigv4::{uri_encode, Credentials, SigV4Signer, EMPTY_PAYLOAD_SHA256};
use crate::storage::ModelSource;
use async_trait::async_trait;
use chrono::Utc;
use futures::StreamExt;
use reqwest::{Client, Url};
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Longest error body echoed into a load error
const MAX_ERROR_BODY: usize = 512;

/// Model artifact stored in an S3 bucket (or an S3-compatible endpoint)
pub struct S3ModelSource {
    client: Client,
    signer: SigV4Signer,
    bucket: String,
    key: String,
    region: String,
    endpoint: Option<Url>,
}

/// Resolved request target for the object
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectLocation {
    pub url: Url,
    pub host: String,
    pub canonical_uri: String,
}

impl S3ModelSource {
    /// Build a source, reading credentials from the configured env vars
    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        let credentials = Credentials::from_env(
            &config.access_key_id_env,
            &config.secret_access_key_env,
            config.session_token_env.as_deref(),
        )?;
        Self::new(config, credentials)
    }

    pub fn new(config: &StorageConfig, credentials: Credentials) -> Result<Self> {
        if config.bucket.trim().is_empty() {
            return Err(AppError::Configuration(
                "storage.bucket must be set for the s3 model source".to_string(),
            ));
        }
        if config.key.trim().is_empty() {
            return Err(AppError::Configuration(
                "storage.key must be set for the s3 model source".to_string(),
            ));
        }

        let endpoint = config
            .endpoint
            .as_deref()
            .map(|raw| {
                Url::parse(raw).map_err(|e| {
                    AppError::Configuration(format!("invalid storage.endpoint '{}': {}", raw, e))
                })
            })
            .transpose()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            signer: SigV4Signer::new(credentials, config.region.clone(), "s3"),
            bucket: config.bucket.clone(),
            key: config.key.clone(),
            region: config.region.clone(),
            endpoint,
        })
    }

    /// Virtual-hosted URL on AWS; path-style when a custom endpoint is set
    pub fn object_location(&self) -> Result<ObjectLocation> {
        let key = uri_encode(self.key.trim_start_matches('/'), false);

        match &self.endpoint {
            Some(endpoint) => {
                let base = endpoint.path().trim_end_matches('/');
                let canonical_uri = format!("{}/{}/{}", base, uri_encode(&self.bucket, true), key);

                let mut url = endpoint.clone();
                url.set_path(&canonical_uri);

                let host = url.host_str().ok_or_else(|| {
                    AppError::Configuration(format!("storage.endpoint '{}' has no host", endpoint))
                })?;
                let host = match url.port() {
                    Some(port) => format!("{}:{}", host, port),
                    None => host.to_string(),
                };

                Ok(ObjectLocation {
                    url,
                    host,
                    canonical_uri,
                })
            }
            None => {
                let host = format!("{}.s3.{}.amazonaws.com", self.bucket, self.region);
                let canonical_uri = format!("/{}", key);
                let url = Url::parse(&format!("https://{}{}", host, canonical_uri))
                    .map_err(|e| AppError::Configuration(format!("invalid object URL: {}", e)))?;

                Ok(ObjectLocation {
                    url,
                    host,
                    canonical_uri,
                })
            }
        }
    }
}

/// Shorten `text` to at most `max` bytes without splitting a character
fn truncate_at_char_boundary(text: &mut String, max: usize) {
    if text.len() <= max {
        return;
    }
    let cut = (0..=max).rev().find(|i| text.is_char_boundary(*i)).unwrap_or(0);
    text.truncate(cut);
}

#[async_trait]
impl ModelSource for S3ModelSource {
    fn describe(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.key)
    }

    async fn download(&self, dest: &Path) -> Result<u64> {
        let location = self.object_location()?;
        let signed = self.signer.sign(
            "GET",
            &location.host,
            &location.canonical_uri,
            &[],
            EMPTY_PAYLOAD_SHA256,
            Utc::now(),
        )?;

        debug!(url = %location.url, "Requesting model object");

        let mut request = self.client.get(location.url.clone());
        for (name, value) in signed.headers() {
            request = request.header(name, value);
        }

        let response = request.send().await.map_err(|e| {
            AppError::ModelLoad(format!("request for {} failed: {}", self.describe(), e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            truncate_at_char_boundary(&mut body, MAX_ERROR_BODY);
            return Err(AppError::ModelLoad(format!(
                "object store returned {} for {}: {}",
                status,
                self.describe(),
                body
            )));
        }

        let mut file = tokio::fs::File::create(dest).await.map_err(|e| {
            AppError::ModelLoad(format!("cannot open download file {}: {}", dest.display(), e))
        })?;

        let mut written = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| {
                AppError::ModelLoad(format!("download of {} interrupted: {}", self.describe(), e))
            })?;
            file.write_all(&chunk)
                .await
                .map_err(|e| AppError::ModelLoad(format!("cannot write download file: {}", e)))?;
            written += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|e| AppError::ModelLoad(format!("cannot write download file: {}", e)))?;

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(endpoint: Option<&str>) -> StorageConfig {
        StorageConfig {
            bucket: "moral-models".to_string(),
            key: "prod/model v2.json".to_string(),
            region: "eu-central-1".to_string(),
            endpoint: endpoint.map(str::to_string),
            ..StorageConfig::default()
        }
    }

    #[test]
    fn test_virtual_hosted_location() {
        let source = S3ModelSource::new(&storage(None), Credentials::new("a", "b")).unwrap();
        let location = source.object_location().unwrap();

        assert_eq!(location.host, "moral-models.s3.eu-central-1.amazonaws.com");
        assert_eq!(location.canonical_uri, "/prod/model%20v2.json");
        assert_eq!(
            location.url.as_str(),
            "https://moral-models.s3.eu-central-1.amazonaws.com/prod/model%20v2.json"
        );
        assert_eq!(source.describe(), "s3://moral-models/prod/model v2.json");
    }

    #[test]
    fn test_path_style_location_for_custom_endpoint() {
        let source = S3ModelSource::new(
            &storage(Some("http://127.0.0.1:9000")),
            Credentials::new("a", "b"),
        )
        .unwrap();
        let location = source.object_location().unwrap();

        assert_eq!(location.host, "127.0.0.1:9000");
        assert_eq!(location.canonical_uri, "/moral-models/prod/model%20v2.json");
        assert_eq!(
            location.url.as_str(),
            "http://127.0.0.1:9000/moral-models/prod/model%20v2.json"
        );
    }

    #[test]
    fn test_missing_bucket_rejected() {
        let mut config = storage(None);
        config.bucket = String::new();
        assert!(matches!(
            S3ModelSource::new(&config, Credentials::new("a", "b")),
            Err(AppError::Configuration(_))
        ));
    }

    #[test]
    fn test_error_body_truncates_on_char_boundary() {
        let mut body = "x".repeat(511) + "é tail";
        truncate_at_char_boundary(&mut body, 512);
        assert_eq!(body, "x".repeat(511));

        let mut short = "NoSuchKey".to_string();
        truncate_at_char_boundary(&mut short, 512);
        assert_eq!(short, "NoSuchKey");
    }
}
