//! Development server with live reload
//!
//! Pages are rendered on every request straight from the content files,
//! so edits show up without regenerating the site.

use anyhow::Result;
use axum::{
    body::Body,
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    http::{header, Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use notify_debouncer_mini::{new_debouncer, notify::RecursiveMode};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::content::{Category, ContentError};
use crate::generator::Generator;
use crate::helpers;
use crate::templates::SITE_CSS;
use crate::Site;

/// Live reload script injected into HTML pages
const LIVE_RELOAD_SCRIPT: &str = r#"
<script>
(function() {
    var ws = new WebSocket('ws://' + location.host + '/__livereload');
    ws.onmessage = function(msg) {
        if (msg.data === 'reload') {
            location.reload();
        }
    };
    ws.onclose = function() {
        console.log('Live reload disconnected. Attempting to reconnect...');
        setTimeout(function() { location.reload(); }, 1000);
    };
})();
</script>
</body>
"#;

/// Server state
struct ServerState {
    generator: Generator,
    static_dir: PathBuf,
    reload_tx: broadcast::Sender<()>,
    live_reload: bool,
}

/// Build the router for a site
pub fn router(site: &Site, live_reload: bool) -> Result<Router> {
    let (reload_tx, _) = broadcast::channel::<()>(16);
    router_with_reload(site, live_reload, reload_tx)
}

fn router_with_reload(
    site: &Site,
    live_reload: bool,
    reload_tx: broadcast::Sender<()>,
) -> Result<Router> {
    // Sites built with `Site::with_config` skip the check in `SiteConfig::load`
    site.config.validate()?;

    let state = Arc::new(ServerState {
        generator: Generator::new(site)?,
        static_dir: site.static_dir.clone(),
        reload_tx,
        live_reload,
    });

    let blog = helpers::section_dir(&site.config, Category::Posts);
    let pages = helpers::section_dir(&site.config, Category::Pages);

    let app = Router::new()
        .route("/", get(home_handler))
        .route(&format!("/{}", blog), get(blog_index_handler))
        .route(&format!("/{}/", blog), get(blog_index_handler))
        .route(&format!("/{}/:slug", blog), get(post_handler))
        .route(&format!("/{}/:slug/", blog), get(post_handler))
        .route(&format!("/{}/:slug", pages), get(page_handler))
        .route(&format!("/{}/:slug/", pages), get(page_handler))
        .route("/css/site.css", get(css_handler))
        .route("/__livereload", get(livereload_handler))
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let root = site.config.root.trim_end_matches('/');
    if root.is_empty() {
        Ok(app)
    } else {
        Ok(Router::new().nest(root, app))
    }
}

/// Start the development server
pub async fn start(site: &Site, ip: &str, port: u16, watch: bool) -> Result<()> {
    let (reload_tx, _) = broadcast::channel::<()>(16);
    let app = router_with_reload(site, watch, reload_tx.clone())?;

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!(
        "Server running at http://{}:{}{}",
        ip, port, site.config.root
    );
    if watch {
        println!("Live reload enabled. Watching for changes...");
    }
    println!("Press Ctrl+C to stop.");

    if watch {
        let site = site.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = watch_and_reload(site, reload_tx) {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Watch for file changes and tell connected pages to reload
fn watch_and_reload(site: Site, reload_tx: broadcast::Sender<()>) -> Result<()> {
    let (tx, rx) = std::sync::mpsc::channel();

    // Create debouncer to avoid multiple rapid reloads
    let mut debouncer = new_debouncer(Duration::from_millis(300), tx)?;

    for dir in [&site.content_dir, &site.static_dir] {
        if dir.exists() {
            debouncer.watcher().watch(dir, RecursiveMode::Recursive)?;
            tracing::debug!("Watching: {:?}", dir);
        }
    }

    let config_path = site.base_dir.join(crate::CONFIG_FILE);
    if config_path.exists() {
        debouncer
            .watcher()
            .watch(&config_path, RecursiveMode::NonRecursive)?;
        tracing::debug!("Watching: {:?}", config_path);
    }

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let relevant: Vec<_> = events
                    .iter()
                    .filter(|e| {
                        let path_str = e.path.to_string_lossy();
                        !path_str.contains(".DS_Store") && !path_str.ends_with('~')
                    })
                    .collect();

                if relevant.is_empty() {
                    continue;
                }

                for event in &relevant {
                    if event.path == config_path {
                        tracing::warn!("{} changed; restart the server to apply it", crate::CONFIG_FILE);
                    } else {
                        tracing::info!("File changed: {}", event.path.display());
                    }
                }

                // Nothing to rebuild: pages are resolved per request
                let _ = reload_tx.send(());
            }
            Ok(Err(e)) => {
                tracing::error!("Watch error: {:?}", e);
            }
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

async fn home_handler(State(state): State<Arc<ServerState>>) -> Response {
    render(state, |generator| generator.render_home()).await
}

async fn blog_index_handler(State(state): State<Arc<ServerState>>) -> Response {
    render(state, |generator| generator.render_blog_index()).await
}

async fn post_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
) -> Response {
    render(state, move |generator| {
        generator.render_entry(Category::Posts, &slug)
    })
    .await
}

async fn page_handler(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
) -> Response {
    render(state, move |generator| {
        generator.render_entry(Category::Pages, &slug)
    })
    .await
}

async fn css_handler() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], SITE_CSS)
}

/// Render off the async runtime; content resolution reads files synchronously
async fn render<F>(state: Arc<ServerState>, f: F) -> Response
where
    F: FnOnce(&Generator) -> Result<String> + Send + 'static,
{
    let worker_state = state.clone();
    let result = tokio::task::spawn_blocking(move || f(&worker_state.generator)).await;

    match result {
        Ok(Ok(html)) => html_response(&state, StatusCode::OK, html),
        Ok(Err(e)) if is_not_found(&e) => {
            tracing::debug!("{}", e);
            not_found(&state).await
        }
        Ok(Err(e)) => {
            tracing::error!("Render failed: {:#}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Render failed: {:#}", e)).into_response()
        }
        Err(e) => {
            tracing::error!("Render task failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
        }
    }
}

fn is_not_found(e: &anyhow::Error) -> bool {
    e.downcast_ref::<ContentError>()
        .map(ContentError::is_not_found)
        .unwrap_or(false)
}

async fn not_found(state: &Arc<ServerState>) -> Response {
    match state.generator.render_not_found() {
        Ok(html) => html_response(state, StatusCode::NOT_FOUND, html),
        Err(e) => {
            tracing::error!("Failed to render not-found page: {}", e);
            (StatusCode::NOT_FOUND, "Not found").into_response()
        }
    }
}

fn html_response(state: &ServerState, status: StatusCode, html: String) -> Response {
    let html = if state.live_reload {
        inject_live_reload(&html)
    } else {
        html
    };
    (status, Html(html)).into_response()
}

/// WebSocket handler for live reload
async fn livereload_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<ServerState>>,
) -> impl IntoResponse {
    let reload_rx = state.reload_tx.subscribe();
    ws.on_upgrade(move |socket| handle_livereload_socket(socket, reload_rx))
}

/// Handle WebSocket connection for live reload
async fn handle_livereload_socket(mut socket: WebSocket, mut reload_rx: broadcast::Receiver<()>) {
    tracing::debug!("Live reload client connected");

    loop {
        tokio::select! {
            result = reload_rx.recv() => {
                match result {
                    Ok(_) => {
                        if socket.send(Message::Text("reload".to_string())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
        }
    }

    tracing::debug!("Live reload client disconnected");
}

/// Static assets, then the not-found page
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> Response {
    let mut service = ServeDir::new(&state.static_dir);
    match service.try_call(request).await {
        Ok(response) if response.status() != StatusCode::NOT_FOUND => response.into_response(),
        Ok(_) => not_found(&state).await,
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
    }
}

/// Inject live reload script into HTML content
fn inject_live_reload(html: &str) -> String {
    if html.contains("</body>") {
        html.replace("</body>", LIVE_RELOAD_SCRIPT)
    } else {
        format!("{}{}", html, LIVE_RELOAD_SCRIPT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn site() -> (TempDir, Site) {
        let dir = TempDir::new().unwrap();
        let posts = dir.path().join("content/posts");
        fs::create_dir_all(&posts).unwrap();
        fs::write(posts.join("hello-world.md"), "---\ntitle: Hello\n---\n# Hi\n").unwrap();
        fs::create_dir_all(dir.path().join("static")).unwrap();
        fs::write(dir.path().join("static/robots.txt"), "User-agent: *\n").unwrap();
        let site = Site::new(dir.path()).unwrap();
        (dir, site)
    }

    async fn get_path(app: Router, path: &str) -> (StatusCode, String) {
        use tower::ServiceExt;

        let response = app
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    #[tokio::test]
    async fn test_post_is_rendered_per_request() {
        let (dir, site) = site();
        let app = router(&site, false).unwrap();

        let (status, body) = get_path(app.clone(), "/blog/hello-world/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Hello"));

        fs::write(
            dir.path().join("content/posts/hello-world.md"),
            "---\ntitle: Editado\n---\n",
        )
        .unwrap();
        let (_, body) = get_path(app, "/blog/hello-world").await;
        assert!(body.contains("Editado"));
    }

    #[tokio::test]
    async fn test_missing_entry_is_404_page() {
        let (_dir, site) = site();
        let app = router(&site, false).unwrap();

        let (status, body) = get_path(app.clone(), "/pages/nao-existe/").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("Página não encontrada"));

        let (status, _) = get_path(app, "/qualquer/coisa").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_static_assets_and_css() {
        let (_dir, site) = site();
        let app = router(&site, false).unwrap();

        let (status, body) = get_path(app.clone(), "/robots.txt").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("User-agent"));

        let (status, body) = get_path(app, "/css/site.css").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("html.dark"));
    }

    #[test]
    fn test_shared_section_dir_is_an_error() {
        let dir = TempDir::new().unwrap();
        let config = crate::config::SiteConfig {
            blog_dir: "conteudo".to_string(),
            pages_dir: "conteudo".to_string(),
            ..Default::default()
        };
        let site = Site::with_config(dir.path(), config);
        assert!(router(&site, false).is_err());
    }

    #[tokio::test]
    async fn test_live_reload_injection() {
        let (_dir, site) = site();
        let app = router(&site, true).unwrap();
        let (_, body) = get_path(app, "/").await;
        assert!(body.contains("__livereload"));
    }

    #[test]
    fn test_inject_live_reload() {
        let html = inject_live_reload("<html><body>x</body></html>");
        assert!(html.contains("__livereload"));
        assert!(html.ends_with("</html>"));
    }
}
