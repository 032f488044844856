//! HTTP client with retry logic, conditional lookups and tarball download

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use nodelift_cache::{extract_tarball, ExtractOptions, ExtractSummary};
use nodelift_config::{decode_credentials, BuildSection, Credentials, EndpointSection};
use nodelift_core::error::LiftError;
use nodelift_core::types::{ManifestDist, PackageManifest};
use nodelift_core::utils::verify_shasum;
use reqwest::header::{ACCEPT, CONTENT_LENGTH, ETAG, IF_NONE_MATCH};
use reqwest::{Client, ClientBuilder, RequestBuilder, StatusCode};
use tracing::{debug, info};
use url::Url;

use crate::api::{CredentialCheck, LookupOutcome, PackageDocument};
use crate::cache::{CachedLookup, LookupCache};
use crate::RegistryResult;

/// Configuration for exponential backoff retry logic
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Initial delay before first retry
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}

/// npm registry client
#[derive(Debug, Clone)]
pub struct RegistryClient {
    /// Underlying HTTP client with connection pooling
    client: Client,
    /// Retry configuration
    retry_config: RetryConfig,
    /// Base registry URL, no trailing slash
    base_url: String,
    /// Basic auth credentials
    credentials: Option<Credentials>,
    /// ETag lookup cache
    cache: Option<Arc<LookupCache>>,
    /// Largest tarball accepted by `download`
    max_payload_bytes: u64,
}

impl RegistryClient {
    /// Create a client for the public npm registry
    pub fn new() -> RegistryResult<Self> {
        Self::with_base_url(nodelift_config::toml::DEFAULT_REGISTRY)
    }

    /// Create a client for a specific registry
    pub fn with_base_url(base_url: &str) -> RegistryResult<Self> {
        Url::parse(base_url).map_err(|e| LiftError::ConfigValidation {
            field: "endpoint.registry".to_string(),
            reason: format!("'{}' is not a valid URL: {}", base_url, e),
        })?;

        let client = ClientBuilder::new()
            .pool_max_idle_per_host(50)
            .pool_idle_timeout(Duration::from_secs(90))
            .timeout(Duration::from_secs(30))
            .gzip(true)
            .user_agent(concat!("nodelift/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LiftError::network("Failed to create HTTP client".to_string(), e))?;

        Ok(Self {
            client,
            retry_config: RetryConfig::default(),
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials: None,
            cache: None,
            max_payload_bytes: nodelift_config::toml::DEFAULT_MAX_PAYLOAD_BYTES,
        })
    }

    /// Create a client from endpoint configuration, with the lookup cache in `tmp_dir`
    pub fn from_config(endpoint: &EndpointSection, build: &BuildSection) -> RegistryResult<Self> {
        let mut client = Self::with_base_url(endpoint.registry())?
            .with_cache(Arc::new(LookupCache::new(endpoint.tmp_dir())))
            .with_max_payload_bytes(build.max_payload_bytes());

        if let Some(auth) = &endpoint.auth {
            client = client.with_credentials(decode_credentials(auth)?);
        }

        Ok(client)
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_cache(mut self, cache: Arc<LookupCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_retry_config(mut self, retry_config: RetryConfig) -> Self {
        self.retry_config = retry_config;
        self
    }

    pub fn with_max_payload_bytes(mut self, limit: u64) -> Self {
        self.max_payload_bytes = limit;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Execute HTTP request with exponential backoff retry logic
    async fn with_retry<F, Fut, T>(&self, operation: F) -> RegistryResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = RegistryResult<T>>,
    {
        let mut delay = self.retry_config.initial_delay;
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(error) => {
                    if attempt == self.retry_config.max_retries || !error.is_recoverable() {
                        return Err(error);
                    }

                    debug!("attempt {} failed, retrying in {:?}: {}", attempt + 1, delay, error);
                    tokio::time::sleep(delay).await;

                    delay = std::cmp::min(
                        Duration::from_millis(
                            (delay.as_millis() as f64 * self.retry_config.multiplier) as u64,
                        ),
                        self.retry_config.max_delay,
                    );
                    attempt += 1;
                },
            }
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Some(credentials) => {
                request.basic_auth(&credentials.username, Some(&credentials.password))
            },
            None => request,
        }
    }

    /// Look up the published versions of a package
    ///
    /// Sends `If-None-Match` with the cached ETag; a 304 answers from the
    /// cache. Responses carrying an ETag replace the cache entry.
    pub async fn lookup(&self, name: &str) -> RegistryResult<LookupOutcome> {
        let url = format!("{}/{}", self.base_url, encode_package_name(name));

        let cached = match &self.cache {
            Some(cache) => cache.get(name).await,
            None => None,
        };

        let (outcome, fresh) = self
            .with_retry(|| async {
                let mut request = self.authorized(self.client.get(&url));
                if let Some(cached) = &cached {
                    request = request.header(IF_NONE_MATCH, cached.e_tag.as_str());
                }

                let response = request.send().await.map_err(|e| {
                    LiftError::network(format!("Failed to look up {}", name), e)
                })?;

                match response.status() {
                    StatusCode::NOT_MODIFIED => match &cached {
                        Some(cached) => Ok((
                            LookupOutcome::Found {
                                versions: cached.versions.clone(),
                            },
                            None,
                        )),
                        None => Err(LiftError::Network {
                            message: format!("Unexpected 304 for {} without a cached lookup", name),
                            source: None,
                        }),
                    },
                    StatusCode::NOT_FOUND => Ok((LookupOutcome::NotFound, None)),
                    StatusCode::UNAUTHORIZED => Err(LiftError::AuthenticationFailed {
                        registry: self.base_url.clone(),
                    }),
                    StatusCode::OK => {
                        let e_tag = response
                            .headers()
                            .get(ETAG)
                            .and_then(|value| value.to_str().ok())
                            .map(str::to_string);

                        let document = response.json::<PackageDocument>().await.map_err(|e| {
                            LiftError::JsonParse {
                                message: format!("Unable to parse registry document for {}: {}", name, e),
                            }
                        })?;
                        let versions = document.into_versions();

                        let fresh = e_tag.map(|e_tag| CachedLookup {
                            e_tag,
                            versions: versions.clone(),
                        });
                        Ok((LookupOutcome::Found { versions }, fresh))
                    },
                    status => Err(LiftError::Network {
                        message: format!("Invalid status code {} looking up {}", status.as_u16(), name),
                        source: None,
                    }),
                }
            })
            .await?;

        if let (Some(cache), Some(fresh)) = (&self.cache, fresh) {
            cache.store(name, fresh).await?;
        }

        if let LookupOutcome::Found { versions } = &outcome {
            info!("{}: {} versions", name, versions.len());
        }
        Ok(outcome)
    }

    /// Validate a version's manifest against the hash recorded at lookup
    pub fn package_config(
        name: &str,
        version: &str,
        expected_hash: Option<&str>,
        meta: Option<&PackageManifest>,
    ) -> RegistryResult<PackageManifest> {
        let meta = meta.ok_or_else(|| LiftError::ManifestIntegrity {
            package: format!("{}@{}", name, version),
            reason: "package.json meta not provided in lookup".to_string(),
        })?;

        if let Some(expected) = expected_hash.filter(|hash| !hash.is_empty()) {
            if meta.shasum() != Some(expected) {
                return Err(LiftError::ManifestIntegrity {
                    package: format!("{}@{}", name, version),
                    reason: format!(
                        "package.json lookup hash mismatch: expected {}, found {}",
                        expected,
                        meta.shasum().unwrap_or("none")
                    ),
                });
            }
        }

        Ok(meta.clone())
    }

    /// Download a version's tarball, verify it and extract it into `out_dir`
    pub async fn download(
        &self,
        name: &str,
        dist: &ManifestDist,
        expected_hash: &str,
        out_dir: &Path,
    ) -> RegistryResult<ExtractSummary> {
        let tarball = dist.tarball.as_deref().ok_or_else(|| LiftError::ManifestIntegrity {
            package: name.to_string(),
            reason: "dist.tarball is missing".to_string(),
        })?;

        let bytes = self.with_retry(|| self.fetch_tarball(tarball)).await?;
        verify_shasum(name, &bytes, expected_hash)?;
        debug!("{}: {} bytes verified", name, bytes.len());

        let out_dir = out_dir.to_path_buf();
        tokio::task::spawn_blocking(move || {
            extract_tarball(std::io::Cursor::new(bytes), &out_dir, ExtractOptions::default())
        })
        .await
        .map_err(|e| LiftError::Io {
            message: format!("Extraction task failed: {}", e),
            source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
        })?
    }

    async fn fetch_tarball(&self, url: &str) -> RegistryResult<Vec<u8>> {
        let mut response = self
            .client
            .get(url)
            .header(ACCEPT, "application/octet-stream")
            .send()
            .await
            .map_err(|e| LiftError::network(format!("Failed to download {}", url), e))?;

        if response.status() != StatusCode::OK {
            return Err(LiftError::Network {
                message: format!("Bad response code {} downloading {}", response.status().as_u16(), url),
                source: None,
            });
        }

        let declared = response
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<u64>().ok());
        if let Some(size) = declared {
            if size > self.max_payload_bytes {
                return Err(LiftError::PayloadTooLarge {
                    size,
                    limit: self.max_payload_bytes,
                });
            }
        }

        let mut bytes = Vec::with_capacity(declared.unwrap_or(0) as usize);
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| LiftError::network(format!("Failed to read {}", url), e))?
        {
            bytes.extend_from_slice(&chunk);
            if bytes.len() as u64 > self.max_payload_bytes {
                return Err(LiftError::PayloadTooLarge {
                    size: bytes.len() as u64,
                    limit: self.max_payload_bytes,
                });
            }
        }

        Ok(bytes)
    }

    /// Check whether the configured credentials are accepted by the registry
    pub async fn test_credentials(&self) -> RegistryResult<CredentialCheck> {
        let response = self
            .authorized(self.client.get(&self.base_url))
            .send()
            .await
            .map_err(|e| LiftError::network(format!("Failed to reach {}", self.base_url), e))?;

        Ok(match response.status() {
            StatusCode::OK => CredentialCheck::Authorized,
            StatusCode::UNAUTHORIZED => CredentialCheck::Unauthorized,
            status => CredentialCheck::UnexpectedStatus(status.as_u16()),
        })
    }
}

/// Encode package name for URL (handle scoped packages)
pub fn encode_package_name(name: &str) -> String {
    if name.starts_with('@') {
        name.replace('/', "%2f")
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests;
