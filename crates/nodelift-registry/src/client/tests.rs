//! Unit tests for registry client

use super::*;

use nodelift_cache::pack_directory_bytes;
use sha1::{Digest, Sha1};
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(server: &MockServer) -> RegistryClient {
    RegistryClient::with_base_url(&server.uri())
        .unwrap()
        .with_retry_config(RetryConfig {
            max_retries: 0,
            ..RetryConfig::default()
        })
}

fn registry_document() -> serde_json::Value {
    serde_json::json!({
        "name": "test-package",
        "dist-tags": { "latest": "1.1.0" },
        "versions": {
            "1.0.0": {
                "name": "test-package",
                "version": "1.0.0",
                "dist": { "shasum": "aaa", "tarball": "https://example.com/a.tgz" }
            },
            "1.1.0": {
                "name": "test-package",
                "version": "1.1.0",
                "dist": { "shasum": "bbb", "tarball": "https://example.com/b.tgz" }
            },
            "1.2.0-unpublished": { "name": "test-package", "version": "1.2.0-unpublished" }
        }
    })
}

fn sample_tarball() -> (Vec<u8>, String) {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("package.json"), r#"{"name":"test-package"}"#).unwrap();
    std::fs::create_dir_all(dir.path().join("lib")).unwrap();
    std::fs::write(dir.path().join("lib/index.js"), "module.exports = 42;").unwrap();

    let bytes = pack_directory_bytes(dir.path()).unwrap();
    let hash = hex::encode(Sha1::digest(&bytes));
    (bytes, hash)
}

#[test]
fn test_registry_client_creation() {
    let client = RegistryClient::new().unwrap();
    assert_eq!(client.base_url(), "https://registry.npmjs.org");
    assert_eq!(client.retry_config.max_retries, 3);
    assert_eq!(client.max_payload_bytes, 50_000_000);
    assert!(RegistryClient::with_base_url("not a url").is_err());
}

#[test]
fn test_from_config_decodes_credentials() {
    let endpoint = EndpointSection {
        registry: Some("https://npm.example.com/".to_string()),
        auth: Some("YWxpY2U6c2VjcmV0".to_string()),
        tmp_dir: Some("/tmp/nodelift-test".into()),
        ..Default::default()
    };

    let client = RegistryClient::from_config(&endpoint, &BuildSection::default()).unwrap();
    assert_eq!(client.base_url(), "https://npm.example.com");
    assert_eq!(client.credentials, Some(Credentials::new("alice", "secret")));
    assert!(client.cache.is_some());
}

#[test]
fn test_encode_package_name() {
    assert_eq!(encode_package_name("lodash"), "lodash");
    assert_eq!(encode_package_name("@types/node"), "@types%2fnode");
}

#[test]
fn test_retry_config_default() {
    let config = RetryConfig::default();
    assert_eq!(config.max_retries, 3);
    assert_eq!(config.initial_delay, Duration::from_millis(100));
    assert_eq!(config.max_delay, Duration::from_secs(10));
    assert_eq!(config.multiplier, 2.0);
}

#[tokio::test]
async fn test_lookup_keeps_versions_with_shasum() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/test-package"))
        .respond_with(ResponseTemplate::new(200).set_body_json(registry_document()))
        .mount(&server)
        .await;

    let outcome = test_client(&server).lookup("test-package").await.unwrap();
    let versions = outcome.versions().unwrap();

    assert_eq!(versions.len(), 2);
    assert_eq!(versions["1.0.0"].hash, "aaa");
    assert_eq!(versions["1.1.0"].meta.shasum(), Some("bbb"));
}

#[tokio::test]
async fn test_lookup_revalidates_with_etag() {
    let server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();
    let cache = Arc::new(LookupCache::new(tmp.path()));

    Mock::given(method("GET"))
        .and(path("/test-package"))
        .and(header("If-None-Match", "\"v1\""))
        .respond_with(ResponseTemplate::new(304))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/test-package"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", "\"v1\"")
                .set_body_json(registry_document()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server).with_cache(Arc::clone(&cache));
    let first = client.lookup("test-package").await.unwrap();
    assert!(cache.path_for("test-package").exists());

    // Force the second lookup to come from the file written by the first
    cache.clear_memory();
    let second = client.lookup("test-package").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(second.versions().unwrap().len(), 2);
}

#[tokio::test]
async fn test_lookup_without_etag_is_not_cached() {
    let server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();
    let cache = Arc::new(LookupCache::new(tmp.path()));

    Mock::given(method("GET"))
        .and(path("/test-package"))
        .respond_with(ResponseTemplate::new(200).set_body_json(registry_document()))
        .mount(&server)
        .await;

    let client = test_client(&server).with_cache(Arc::clone(&cache));
    client.lookup("test-package").await.unwrap();

    assert!(!cache.path_for("test-package").exists());
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_lookup_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/nonexistent-package"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let outcome = test_client(&server).lookup("nonexistent-package").await.unwrap();
    assert_eq!(outcome, LookupOutcome::NotFound);
}

#[tokio::test]
async fn test_lookup_sends_basic_auth_and_reports_401() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/private"))
        .and(header("Authorization", "Basic YWxpY2U6c2VjcmV0"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server).with_credentials(Credentials::new("alice", "secret"));
    match client.lookup("private").await {
        Err(LiftError::AuthenticationFailed { registry }) => assert_eq!(registry, server.uri()),
        other => panic!("Expected AuthenticationFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_lookup_unexpected_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    match test_client(&server).lookup("test-package").await {
        Err(LiftError::Network { message, .. }) => assert!(message.contains("500")),
        other => panic!("Expected Network error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_lookup_retries_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let client = test_client(&server).with_retry_config(RetryConfig {
        max_retries: 2,
        initial_delay: Duration::from_millis(1),
        ..RetryConfig::default()
    });
    assert!(client.lookup("test-package").await.is_err());
}

#[test]
fn test_package_config_checks_hash() {
    let mut meta = PackageManifest::new("test-package", "1.0.0");
    meta.dist = Some(ManifestDist {
        shasum: Some("aaa".to_string()),
        ..Default::default()
    });

    let config =
        RegistryClient::package_config("test-package", "1.0.0", Some("aaa"), Some(&meta)).unwrap();
    assert_eq!(config, meta);

    assert!(RegistryClient::package_config("test-package", "1.0.0", None, Some(&meta)).is_ok());
    assert!(matches!(
        RegistryClient::package_config("test-package", "1.0.0", Some("bbb"), Some(&meta)),
        Err(LiftError::ManifestIntegrity { .. })
    ));
    assert!(matches!(
        RegistryClient::package_config("test-package", "1.0.0", Some("aaa"), None),
        Err(LiftError::ManifestIntegrity { .. })
    ));
}

#[tokio::test]
async fn test_download_extracts_verified_tarball() {
    let server = MockServer::start().await;
    let (bytes, hash) = sample_tarball();
    Mock::given(method("GET"))
        .and(path("/test-package/-/test-package-1.0.0.tgz"))
        .and(header("Accept", "application/octet-stream"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes))
        .mount(&server)
        .await;

    let dist = ManifestDist {
        tarball: Some(format!("{}/test-package/-/test-package-1.0.0.tgz", server.uri())),
        shasum: Some(hash.clone()),
        ..Default::default()
    };
    let out = TempDir::new().unwrap();

    let summary = test_client(&server)
        .download("test-package", &dist, &hash, out.path())
        .await
        .unwrap();

    assert_eq!(summary.files, 2);
    assert_eq!(
        std::fs::read_to_string(out.path().join("lib/index.js")).unwrap(),
        "module.exports = 42;"
    );
}

#[tokio::test]
async fn test_download_rejects_checksum_mismatch() {
    let server = MockServer::start().await;
    let (bytes, _) = sample_tarball();
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes))
        .mount(&server)
        .await;

    let dist = ManifestDist {
        tarball: Some(format!("{}/t.tgz", server.uri())),
        ..Default::default()
    };
    let out = TempDir::new().unwrap();

    let result = test_client(&server)
        .download("test-package", &dist, "0000000000000000000000000000000000000000", out.path())
        .await;
    assert!(matches!(result, Err(LiftError::IntegrityFailure { .. })));
    assert!(!out.path().join("package.json").exists());
}

#[tokio::test]
async fn test_download_rejects_large_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8; 2048]))
        .mount(&server)
        .await;

    let dist = ManifestDist {
        tarball: Some(format!("{}/t.tgz", server.uri())),
        ..Default::default()
    };
    let out = TempDir::new().unwrap();

    let result = test_client(&server)
        .with_max_payload_bytes(1024)
        .download("test-package", &dist, "abc", out.path())
        .await;
    match result {
        Err(LiftError::PayloadTooLarge { size, limit }) => {
            assert_eq!(limit, 1024);
            assert!(size > 1024);
        },
        other => panic!("Expected PayloadTooLarge, got {:?}", other),
    }
}

#[tokio::test]
async fn test_download_rejects_bad_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dist = ManifestDist {
        tarball: Some(format!("{}/missing.tgz", server.uri())),
        ..Default::default()
    };
    let out = TempDir::new().unwrap();

    let result = test_client(&server)
        .download("test-package", &dist, "abc", out.path())
        .await;
    assert!(matches!(result, Err(LiftError::Network { .. })));

    let no_tarball = ManifestDist::default();
    assert!(matches!(
        test_client(&server)
            .download("test-package", &no_tarball, "abc", out.path())
            .await,
        Err(LiftError::ManifestIntegrity { .. })
    ));
}

#[tokio::test]
async fn test_credentials_check() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("Authorization", "Basic YWxpY2U6c2VjcmV0"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let good = test_client(&server).with_credentials(Credentials::new("alice", "secret"));
    assert_eq!(good.test_credentials().await.unwrap(), CredentialCheck::Authorized);

    let bad = test_client(&server).with_credentials(Credentials::new("alice", "wrong"));
    assert_eq!(bad.test_credentials().await.unwrap(), CredentialCheck::Unauthorized);
}

#[tokio::test]
async fn test_credentials_unexpected_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(418))
        .mount(&server)
        .await;

    assert_eq!(
        test_client(&server).test_credentials().await.unwrap(),
        CredentialCheck::UnexpectedStatus(418)
    );
}
