use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{routing::get, Router};

use reqwest::StatusCode as HttpStatusCode;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Notify};
use tokio::task::JoinHandle;
use uuid::Uuid;

use configs::DatabaseConfig;
use server::errors::StartupError;
use server::startup::{build_app, build_state, serve};

struct TestApp {
    base_url: String,
    stop: oneshot::Sender<()>,
    task: JoinHandle<Result<(), StartupError>>,
}

impl TestApp {
    async fn shutdown(self) -> Result<(), StartupError> {
        let _ = self.stop.send(());
        self.task.await?
    }
}

/// Database file in its own temp directory; the directory is removed on drop.
struct TestDb {
    dir: PathBuf,
    path: String,
}

impl TestDb {
    fn new() -> Self {
        let dir = std::env::temp_dir().join(format!("kvstore-e2e-{}", Uuid::new_v4()));
        let path = dir.join("kv.db").to_string_lossy().into_owned();
        Self { dir, path }
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

async fn start_server(db_path: &str) -> anyhow::Result<TestApp> {
    let cfg = DatabaseConfig { path: db_path.to_string(), ..DatabaseConfig::default() };
    let state = build_state(&cfg).await?;
    let app = build_app(state);

    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    let (stop, stop_rx) = oneshot::channel::<()>();
    let task = tokio::spawn(serve(
        listener,
        app,
        async move {
            let _ = stop_rx.await;
        },
        Duration::from_secs(5),
    ));
    Ok(TestApp { base_url, stop, task })
}

fn client() -> reqwest::Client {
    reqwest::Client::new()
}

#[tokio::test]
async fn e2e_item_lifecycle() -> anyhow::Result<()> {
    let db = TestDb::new();
    let app = start_server(&db.path).await?;
    let c = client();
    let url = format!("{}/items/a", app.base_url);

    let res = c.put(&url).json(&json!({"value": "1"})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);

    let res = c.get(&url).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<String>().await?, "1");

    let res = c.put(&url).json(&json!({"value": "1"})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::CONFLICT);

    let res = c.delete(&url).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NO_CONTENT);

    let res = c.get(&url).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);

    app.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn e2e_update_is_last_write_wins() -> anyhow::Result<()> {
    let db = TestDb::new();
    let app = start_server(&db.path).await?;
    let c = client();
    let url = format!("{}/items/k", app.base_url);

    let res = c.patch(&url).json(&json!({"value": "v0"})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);

    c.put(&url).json(&json!({"value": "v1"})).send().await?;
    let res = c.patch(&url).json(&json!({"value": "v2"})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NO_CONTENT);
    assert_eq!(c.get(&url).send().await?.json::<String>().await?, "v2");

    app.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn e2e_malformed_create_does_not_store() -> anyhow::Result<()> {
    let db = TestDb::new();
    let app = start_server(&db.path).await?;
    let c = client();
    let url = format!("{}/items/m", app.base_url);

    let res = c.put(&url).json(&json!({"val": "1"})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    let res = c.put(format!("{}/items/", app.base_url)).json(&json!({"value": "1"})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);

    let res = c.get(&url).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);

    app.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn e2e_records_survive_restart() -> anyhow::Result<()> {
    let db = TestDb::new();
    let c = client();

    let app = start_server(&db.path).await?;
    let res = c.put(format!("{}/items/durable", app.base_url)).json(&json!({"value": "yes"})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    app.shutdown().await?;

    let app = start_server(&db.path).await?;
    let res = c.get(format!("{}/items/durable", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<String>().await?, "yes");
    app.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn e2e_concurrent_creates_of_one_key() -> anyhow::Result<()> {
    let db = TestDb::new();
    let app = start_server(&db.path).await?;
    let c = client();
    let url = format!("{}/items/race", app.base_url);

    let mut handles = Vec::new();
    for i in 0..8 {
        let c = c.clone();
        let url = url.clone();
        handles.push(tokio::spawn(async move {
            c.put(&url).json(&json!({"value": i.to_string()})).send().await.map(|r| r.status())
        }));
    }
    let mut created = 0;
    for h in handles {
        match h.await?? {
            HttpStatusCode::CREATED => created += 1,
            HttpStatusCode::CONFLICT => {}
            other => panic!("unexpected status {other}"),
        }
    }
    assert_eq!(created, 1);

    app.shutdown().await?;
    Ok(())
}

#[tokio::test]
async fn bind_failure_is_reported() -> anyhow::Result<()> {
    let taken = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr = taken.local_addr()?.to_string();
    let err = server::startup::bind(&addr).await.err();
    assert!(matches!(err, Some(StartupError::Bind { .. })));
    Ok(())
}

#[tokio::test]
async fn temp_database_directory_is_removed() -> anyhow::Result<()> {
    let db = TestDb::new();
    let dir = db.dir.clone();
    let app = start_server(&db.path).await?;
    let res = client().put(format!("{}/items/t", app.base_url)).json(&json!({"value": "1"})).send().await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    app.shutdown().await?;
    assert!(dir.exists());

    drop(db);
    assert!(!dir.exists());
    Ok(())
}

#[tokio::test]
async fn serve_gives_up_after_grace_period() -> anyhow::Result<()> {
    let entered = Arc::new(Notify::new());
    let in_handler = entered.clone();
    let app = Router::new().route(
        "/slow",
        get(move || {
            let in_handler = in_handler.clone();
            async move {
                in_handler.notify_one();
                tokio::time::sleep(Duration::from_secs(30)).await;
                "done"
            }
        }),
    );

    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let url = format!("http://{}/slow", listener.local_addr()?);
    let (stop, stop_rx) = oneshot::channel::<()>();
    let task = tokio::spawn(serve(
        listener,
        app,
        async move {
            let _ = stop_rx.await;
        },
        Duration::from_millis(300),
    ));

    let request = tokio::spawn(async move { client().get(url).send().await });
    entered.notified().await;

    let started = Instant::now();
    let _ = stop.send(());
    let res = task.await?;
    let elapsed = started.elapsed();

    assert!(res.is_ok(), "serve returned {res:?}");
    assert!(elapsed >= Duration::from_millis(300), "returned before the grace period: {elapsed:?}");
    assert!(elapsed < Duration::from_secs(5), "waited on the slow handler: {elapsed:?}");
    request.abort();
    Ok(())
}
