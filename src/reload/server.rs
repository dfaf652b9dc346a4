//! Static file server with WebSocket live reload and a status endpoint.

use std::net::SocketAddr;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use axum::{
    Json, Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    middleware,
    response::IntoResponse,
    routing::get,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
};

use super::inject::inject_livereload;
use super::{ReloadError, Reloader};

/// WebSocket route the injected client connects to.
pub const RELOAD_ROUTE: &str = "/__pen/reload";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadOptions {
    /// Directory served over HTTP.
    pub root_dir: PathBuf,
    pub host: String,
    pub port: u16,
    /// Port of the JSON status endpoint.
    pub ui_port: u16,
}

struct ServerState {
    reload_tx: broadcast::Sender<String>,
    root_dir: PathBuf,
    url: String,
    reloads: AtomicU64,
    started_at: chrono::DateTime<chrono::Local>,
}

#[derive(Serialize)]
struct Status {
    root: String,
    url: String,
    clients: usize,
    reloads: u64,
    started_at: String,
}

/// Running reload server. Both listeners stop when this is dropped.
pub struct LiveReloadServer {
    state: Arc<ServerState>,
    addr: SocketAddr,
    ui_addr: SocketAddr,
    tasks: Vec<JoinHandle<()>>,
}

impl LiveReloadServer {
    /// Bind the site and status listeners and start serving.
    ///
    /// Port `0` picks a free port; see [`Self::local_addr`].
    pub async fn init(options: ReloadOptions) -> Result<Self, ReloadError> {
        let listener = bind(&options.host, options.port).await?;
        let ui_listener = bind(&options.host, options.ui_port).await?;
        let addr = local_addr(&listener, &options.host, options.port)?;
        let ui_addr = local_addr(&ui_listener, &options.host, options.ui_port)?;

        let (reload_tx, _) = broadcast::channel::<String>(16);
        let state = Arc::new(ServerState {
            reload_tx,
            root_dir: options.root_dir,
            url: format!("http://{addr}"),
            reloads: AtomicU64::new(0),
            started_at: chrono::Local::now(),
        });

        let site = site_router(state.clone());
        let ui = Router::new()
            .route("/", get(status_handler))
            .with_state(state.clone());

        let tasks = vec![
            tokio::spawn(async move {
                if let Err(e) = axum::serve(listener, site).await {
                    tracing::error!("[reload] site server stopped: {e}");
                }
            }),
            tokio::spawn(async move {
                if let Err(e) = axum::serve(ui_listener, ui).await {
                    tracing::error!("[reload] status server stopped: {e}");
                }
            }),
        ];

        crate::log_event!("reload", "serving", "{} at http://{addr}", state.root_dir.display());
        crate::debug_event!("reload", "status", "http://{ui_addr}");

        Ok(Self {
            state,
            addr,
            ui_addr,
            tasks,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn ui_addr(&self) -> SocketAddr {
        self.ui_addr
    }

    pub fn root_dir(&self) -> &Path {
        &self.state.root_dir
    }

    /// Receive the messages sent to browsers.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.state.reload_tx.subscribe()
    }
}

impl Reloader for LiveReloadServer {
    fn reload(&self, path: &Path) {
        let message = reload_message(&self.state.root_dir, path);
        self.state.reloads.fetch_add(1, Ordering::Relaxed);
        crate::debug_event!("reload", "broadcast", "{message} ({})", path.display());
        // No connected browser is not an error.
        let _ = self.state.reload_tx.send(message);
    }
}

impl Drop for LiveReloadServer {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

/// Browser message for a changed file: `css:<url path>` for stylesheets,
/// `reload` for everything else.
pub fn reload_message(root_dir: &Path, path: &Path) -> String {
    let is_css = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("css"));

    if !is_css {
        return "reload".to_string();
    }

    let relative = path.strip_prefix(root_dir).unwrap_or(path);
    let segments: Vec<_> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy()),
            _ => None,
        })
        .collect();
    format!("css:/{}", segments.join("/"))
}

async fn bind(host: &str, port: u16) -> Result<TcpListener, ReloadError> {
    TcpListener::bind((host, port))
        .await
        .map_err(|source| ReloadError::Bind {
            addr: format!("{host}:{port}"),
            source,
        })
}

fn local_addr(listener: &TcpListener, host: &str, port: u16) -> Result<SocketAddr, ReloadError> {
    listener.local_addr().map_err(|source| ReloadError::LocalAddr {
        addr: format!("{host}:{port}"),
        source,
    })
}

fn site_router(state: Arc<ServerState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let serve_dir = ServeDir::new(&state.root_dir).append_index_html_on_directories(true);

    Router::new()
        .route(RELOAD_ROUTE, get(ws_handler))
        .fallback_service(serve_dir)
        .layer(middleware::from_fn(inject_livereload))
        .layer(cors)
        .with_state(state)
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: Arc<ServerState>) {
    let mut rx = state.reload_tx.subscribe();
    crate::debug_event!("reload", "client connected");

    loop {
        tokio::select! {
            result = rx.recv() => {
                let message = match result {
                    Ok(message) => message,
                    // Missed messages collapse into one full reload.
                    Err(broadcast::error::RecvError::Lagged(_)) => "reload".to_string(),
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                if socket.send(Message::Text(message.into())).await.is_err() {
                    break;
                }
            }
            result = socket.recv() => {
                match result {
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    _ => {}
                }
            }
        }
    }

    crate::debug_event!("reload", "client disconnected");
}

async fn status_handler(State(state): State<Arc<ServerState>>) -> Json<Status> {
    Json(Status {
        root: state.root_dir.display().to_string(),
        url: state.url.clone(),
        clients: state.reload_tx.receiver_count(),
        reloads: state.reloads.load(Ordering::Relaxed),
        started_at: state.started_at.to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    fn options(root: &Path) -> ReloadOptions {
        ReloadOptions {
            root_dir: root.to_path_buf(),
            host: "127.0.0.1".to_string(),
            port: 0,
            ui_port: 0,
        }
    }

    async fn http_get(addr: SocketAddr, path: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[test]
    fn test_css_changes_use_url_path() {
        let root = Path::new("/proj/dist");
        assert_eq!(
            reload_message(root, Path::new("/proj/dist/css/site.css")),
            "css:/css/site.css"
        );
        assert_eq!(reload_message(root, Path::new("/proj/dist/index.html")), "reload");
        assert_eq!(reload_message(root, Path::new("/proj/dist/app.js")), "reload");
    }

    #[tokio::test]
    async fn test_reload_reaches_subscribers() {
        let dir = TempDir::new().unwrap();
        let server = LiveReloadServer::init(options(dir.path())).await.unwrap();
        let mut rx = server.subscribe();

        server.reload(&dir.path().join("style.css"));
        server.reload(&dir.path().join("index.html"));

        assert_eq!(rx.recv().await.unwrap(), "css:/style.css");
        assert_eq!(rx.recv().await.unwrap(), "reload");
    }

    #[tokio::test]
    async fn test_html_pages_get_reload_client() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("index.html"),
            "<html><body><h1>Home</h1></body></html>",
        )
        .unwrap();
        std::fs::write(dir.path().join("app.js"), "console.log(1);").unwrap();
        let server = LiveReloadServer::init(options(dir.path())).await.unwrap();

        let page = http_get(server.local_addr(), "/").await;
        assert!(page.starts_with("HTTP/1.1 200"));
        assert!(page.contains("<h1>Home</h1>"));
        assert!(page.contains(RELOAD_ROUTE));

        let script = http_get(server.local_addr(), "/app.js").await;
        assert!(script.contains("console.log(1);"));
        assert!(!script.contains(RELOAD_ROUTE));
    }

    #[tokio::test]
    async fn test_status_endpoint_reports_reloads() {
        let dir = TempDir::new().unwrap();
        let server = LiveReloadServer::init(options(dir.path())).await.unwrap();
        server.reload(&dir.path().join("index.html"));

        let response = http_get(server.ui_addr(), "/").await;
        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.contains("\"reloads\":1"));
    }

    #[tokio::test]
    async fn test_port_in_use_is_bind_error() {
        let dir = TempDir::new().unwrap();
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = taken.local_addr().unwrap().port();

        let result = LiveReloadServer::init(ReloadOptions {
            port,
            ..options(dir.path())
        })
        .await;
        assert!(matches!(result, Err(ReloadError::Bind { .. })));
    }
}
