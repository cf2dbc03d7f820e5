//! End-to-end integration tests — the full application on a real listener,
//! exercised over HTTP with `reqwest`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::task::JoinSet;
use workbench_protocol::{AutoOpenFolder, BuildConfig, DeploymentConfig};
use workbench_server::{AppState, build_app};
use workbench_services::{CallbackRelay, Downloader, FsExtensionScanner};
use workbench_transport::{TransportConfig, TransportServer};

struct TestHost {
    _dir: TempDir,
    server: TransportServer,
    base: String,
    client: reqwest::Client,
}

impl TestHost {
    async fn start() -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path().to_path_buf();
        write(&root, "static/favicon.ico", "icon");
        write(&root, "views/workbench.html", "<html data-settings=\"{{WORKBENCH_WEB_CONFIGURATION}}\"></html>");
        write(&root, "build/out/vs/code/browser/workbench/callback.html", "close me");
        write(&root, "exts/b-ext/package.json", "{}");
        write(&root, "exts/a-ext/package.json", "{}");
        write(&root, "work/notes.txt", "notes");

        let config = DeploymentConfig {
            build: BuildConfig::Static {
                location: root.join("build"),
            },
            extension_paths: vec![root.join("exts")],
            folder: Some(AutoOpenFolder::Mount(root.join("work"))),
            static_root: root.join("static"),
            template_path: root.join("views/workbench.html"),
            fs_provider_extension_path: root.join("fs-provider"),
            ..Default::default()
        };
        let state = Arc::new(AppState {
            config: Arc::new(config),
            relay: Arc::new(CallbackRelay::new()),
            source: FsExtensionScanner,
            downloader: Downloader::new(Duration::from_secs(1)).unwrap(),
        });

        let server = TransportServer::start(
            TransportConfig {
                port: 0,
                hostname: "127.0.0.1".into(),
                log_requests: false,
            },
            build_app(state),
        )
        .await
        .unwrap();
        let base = format!("http://127.0.0.1:{}", server.port());

        Self {
            _dir: dir,
            server,
            base,
            client: reqwest::Client::builder().no_proxy().build().unwrap(),
        }
    }

    async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{path}", self.base))
            .send()
            .await
            .unwrap()
    }
}

fn write(root: &std::path::Path, relative: &str, content: &str) {
    let path: PathBuf = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

#[tokio::test]
async fn health_reports_ok() {
    let mut host = TestHost::start().await;

    let response = host.get("/health").await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "status": "ok" }));

    host.server.stop().await;
}

#[tokio::test]
async fn callback_round_trip_over_http() {
    let mut host = TestHost::start().await;

    let response = host
        .get("/callback?vscode-requestId=abc&vscode-scheme=https&vscode-authority=login.example.com&vscode-fragment=done")
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "close me");

    let response = host.get("/fetch-callback?vscode-requestId=abc").await;
    assert_eq!(response.status(), 200);
    let target: Value = response.json().await.unwrap();
    assert_eq!(
        target,
        json!({ "scheme": "https", "authority": "login.example.com", "fragment": "done" })
    );

    let response = host.get("/fetch-callback?vscode-requestId=abc").await;
    assert_eq!(response.status(), 400);

    host.server.stop().await;
}

#[tokio::test]
async fn concurrent_callbacks_stay_separate() {
    let mut host = TestHost::start().await;
    let client = host.client.clone();

    let mut tasks = JoinSet::new();
    for i in 0..16 {
        let client = client.clone();
        let base = host.base.clone();
        tasks.spawn(async move {
            let stored = client
                .get(format!(
                    "{base}/callback?vscode-requestId=req-{i}&vscode-scheme=https&vscode-authority=host-{i}"
                ))
                .send()
                .await
                .unwrap();
            assert_eq!(stored.status(), 200);

            let fetched: Value = client
                .get(format!("{base}/fetch-callback?vscode-requestId=req-{i}"))
                .send()
                .await
                .unwrap()
                .json()
                .await
                .unwrap();
            assert_eq!(fetched["authority"], format!("host-{i}"));
        });
    }
    while let Some(result) = tasks.join_next().await {
        result.unwrap();
    }

    host.server.stop().await;
}

#[tokio::test]
async fn page_lists_extensions_in_name_order() {
    let mut host = TestHost::start().await;

    let response = host.get("/").await;
    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    let a = body.find("/static/extensions/0/a-ext").unwrap();
    let b = body.find("/static/extensions/0/b-ext").unwrap();
    let provider = body.find("/static/fsproviderextension").unwrap();
    assert!(a < b && b < provider);

    host.server.stop().await;
}

#[tokio::test]
async fn responses_allow_any_origin() {
    let mut host = TestHost::start().await;

    for path in [
        "/health",
        "/static/favicon.ico",
        "/fetch-callback",
        "/static/mount/notes.txt?stat",
    ] {
        let response = host.get(path).await;
        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .and_then(|v| v.to_str().ok()),
            Some("*"),
            "{path}"
        );
    }

    host.server.stop().await;
}

#[tokio::test]
async fn mounted_folder_is_served() {
    let mut host = TestHost::start().await;

    let response = host.get("/static/mount/notes.txt").await;
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "notes");

    let entries: Value = host.get("/static/mount?readdir").await.json().await.unwrap();
    assert_eq!(entries, json!([{ "name": "notes.txt", "type": 1 }]));

    host.server.stop().await;
}
