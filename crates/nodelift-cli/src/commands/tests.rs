//! Unit tests for CLI commands.

use super::*;
use nodelift_config::json;
use nodelift_core::utils::sha1_hex;
use std::fs;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
    ctx: CommandContext,
}

fn workspace() -> Workspace {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
    let cwd = root.join("work");
    let home = root.join("home");
    fs::create_dir_all(&cwd).unwrap();
    fs::create_dir_all(&home).unwrap();

    let ctx = CommandContext {
        cwd,
        home: Some(home),
        output: OutputHandler::new(),
    };
    Workspace { _dir: dir, root, ctx }
}

fn write(path: &Utf8Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn write_project_config(ws: &Workspace, registry: &str) {
    write(
        &ws.ctx.cwd.join("nodelift.toml"),
        &format!(
            "[endpoint]\nregistry = \"{}\"\ntmp_dir = \"{}\"\n\n[build]\nconcurrency = 2\n",
            registry,
            ws.root.join("cache")
        ),
    );
}

#[test]
fn test_shim_config_from_sections() {
    let default = shim_config(&NodeliftToml::default());
    assert_eq!(default.namespace(), DEFAULT_NODELIBS);
    assert!(default.is_builtin("fs"));

    let mut config = NodeliftToml::default();
    config.shim.nodelibs = Some("github:me/shims@1.0.0".to_string());
    config.shim.builtins = Some(vec!["fs".to_string()]);
    let custom = shim_config(&config);
    assert_eq!(custom.namespace(), "github:me/shims@1.0.0");
    assert!(!custom.is_builtin("path"));
}

#[test]
fn test_parse_package_spec() {
    assert_eq!(import::parse_package_spec("left-pad@1.3.0").unwrap(), ("left-pad", "1.3.0"));
    assert_eq!(
        import::parse_package_spec("@scope/pkg@2.0.0").unwrap(),
        ("@scope/pkg", "2.0.0")
    );
    assert!(import::parse_package_spec("left-pad").is_err());
    assert!(import::parse_package_spec("@scope/pkg").is_err());
    assert!(import::parse_package_spec("left-pad@").is_err());
}

#[tokio::test]
async fn test_translate_command() {
    let ws = workspace();
    let ranges = vec![">=1.2.3 <2.0.0".to_string(), "1.x".to_string()];
    assert!(translate::execute(ranges, &ws.ctx).await.is_ok());
}

#[tokio::test]
async fn test_normalize_write() {
    let ws = workspace();
    let manifest = ws.ctx.cwd.join("package.json");
    write(
        &manifest,
        r#"{ "name": "demo", "version": "1.0.0", "dependencies": { "a": "1.x" }, "files": ["lib"] }"#,
    );

    normalize::execute(None, true, &ws.ctx).await.unwrap();

    let written = json::load_from_file(&manifest).await.unwrap();
    assert_eq!(written.dependencies["a"], "a@^1.0.0");
    assert_eq!(written.dependencies["nodelibs"], DEFAULT_NODELIBS);
    assert_eq!(written.format.as_deref(), Some("cjs"));
    assert_eq!(written.registry.as_deref(), Some("npm"));
    assert!(written.files.is_none());
}

#[tokio::test]
async fn test_build_rewrites_tree_but_not_manifest() {
    let ws = workspace();
    let pkg = ws.ctx.cwd.join("pkg");
    let manifest = r#"{ "name": "demo", "dependencies": { "a": "1.x" } }"#;
    write(&pkg.join("package.json"), manifest);
    write(&pkg.join("index.js"), "module.exports = require('path');\n");

    build::execute(Some("pkg".into()), &ws.ctx).await.unwrap();

    assert_eq!(
        fs::read_to_string(pkg.join("index.js")).unwrap(),
        format!("module.exports = require('{}/path');\n", DEFAULT_NODELIBS)
    );
    assert_eq!(fs::read_to_string(pkg.join("package.json")).unwrap(), manifest);
}

#[tokio::test]
async fn test_build_without_manifest_fails() {
    let ws = workspace();
    let result = build::execute(None, &ws.ctx).await;
    assert!(matches!(result, Err(LiftError::Io { .. })));
}

#[tokio::test]
async fn test_config_saves_tested_credentials() {
    let ws = workspace();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    config::execute(
        Some(server.uri()),
        Some(("alice".to_string(), "secret".to_string())),
        false,
        &ws.ctx,
    )
    .await
    .unwrap();

    let saved = nodelift_config::toml::load_from_file(&ws.ctx.cwd.join("nodelift.toml"))
        .await
        .unwrap();
    assert_eq!(saved.endpoint.registry.as_deref(), Some(server.uri().as_str()));
    let credentials = nodelift_config::decode_credentials(saved.endpoint.auth.as_deref().unwrap()).unwrap();
    assert_eq!(credentials.username, "alice");
}

#[tokio::test]
async fn test_config_rejects_bad_credentials() {
    let ws = workspace();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = config::execute(
        Some(server.uri()),
        Some(("alice".to_string(), "wrong".to_string())),
        false,
        &ws.ctx,
    )
    .await;

    assert!(matches!(result, Err(LiftError::AuthenticationFailed { .. })));
    assert!(!ws.ctx.cwd.join("nodelift.toml").exists());
}

#[tokio::test]
async fn test_lookup_unknown_package() {
    let ws = workspace();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    write_project_config(&ws, &server.uri());

    let result = lookup::execute("missing".to_string(), &ws.ctx).await;
    assert!(matches!(result, Err(LiftError::PackageNotFound { .. })));
}

#[tokio::test]
async fn test_import_end_to_end() {
    let ws = workspace();
    let server = MockServer::start().await;

    let source = ws.root.join("source");
    write(&source.join("package.json"), r#"{ "name": "demo", "version": "1.0.0" }"#);
    write(
        &source.join("lib/main.js"),
        "var fs = require('fs');\nmodule.exports = require('./util/');\n",
    );
    write(&source.join("lib/util/index.js"), "module.exports = Buffer.alloc(1);\n");

    let mut tarball = Vec::new();
    nodelift_cache::pack_directory(&mut tarball, source.as_std_path()).unwrap();
    let shasum = sha1_hex(&tarball);

    let document = serde_json::json!({
        "name": "demo",
        "versions": {
            "1.0.0": {
                "name": "demo",
                "version": "1.0.0",
                "main": "lib/main.js",
                "dependencies": { "dep": "1.x" },
                "dist": {
                    "shasum": shasum,
                    "tarball": format!("{}/demo/-/demo-1.0.0.tgz", server.uri())
                }
            }
        }
    });

    Mock::given(method("GET"))
        .and(path("/demo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(document))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/demo/-/demo-1.0.0.tgz"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(tarball))
        .mount(&server)
        .await;
    write_project_config(&ws, &server.uri());

    import::execute("demo@1.0.0".to_string(), "out".into(), &ws.ctx)
        .await
        .unwrap();

    let out = ws.ctx.cwd.join("out");
    assert_eq!(
        fs::read_to_string(out.join("lib/main.js")).unwrap(),
        format!(
            "var fs = require('{}/fs');\nmodule.exports = require('./util/index');\n",
            DEFAULT_NODELIBS
        )
    );
    assert_eq!(
        fs::read_to_string(out.join("lib/util.js")).unwrap(),
        "module.exports = require(\"./util/index\");\n"
    );
    assert!(fs::read_to_string(out.join("lib/util/index.js"))
        .unwrap()
        .starts_with("(function(Buffer) {"));

    let manifest = json::load_from_file(&out.join("package.json")).await.unwrap();
    assert_eq!(manifest.dependencies["dep"], "dep@^1.0.0");
    assert!(manifest.dependencies.contains_key("nodelibs"));
}

#[tokio::test]
async fn test_import_unknown_version() {
    let ws = workspace();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/demo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "versions": {} })))
        .mount(&server)
        .await;
    write_project_config(&ws, &server.uri());

    let result = import::execute("demo@9.9.9".to_string(), "out".into(), &ws.ctx).await;
    match result {
        Err(LiftError::PackageNotFound { name }) => assert_eq!(name, "demo@9.9.9"),
        other => panic!("Expected PackageNotFound, got {:?}", other),
    }
}
