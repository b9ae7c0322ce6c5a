//! Static file server for a generated site.
//!
//! Every request goes through one fallback handler that maps the URL onto
//! the static root:
//!
//! | Request | File |
//! |---------|------|
//! | `/` | `index.html` |
//! | `/guide/` | `guide/index.html` |
//! | `/guide/setup` | `guide/setup.html` |
//! | `/guide/setup.html` | `guide/setup.html` |
//! | `/style%20x.css` | `style x.css` |
//! | `/../secret` | 403 |
//!
//! Missing files are 404. Existing ones are streamed by `tower-http`'s
//! [`ServeFile`], which also handles content types and conditional requests.

use axum::Router;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use percent_encoding::percent_decode_str;
use std::io;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("static root {0} does not exist")]
    MissingRoot(PathBuf),
    #[error("static root {0} is not a directory")]
    NotADirectory(PathBuf),
    #[error("failed to bind {addr}: {source}")]
    Bind { addr: SocketAddr, source: io::Error },
    #[error("server error: {0}")]
    Io(#[from] io::Error),
}

/// Map a request path to a file under `root`.
///
/// Returns `None` when the path climbs out of `root`. Segments are resolved
/// lexically after percent-decoding, so `%2e%2e` counts as `..`.
pub fn map_request_path(root: &Path, uri_path: &str) -> Option<PathBuf> {
    let decoded = percent_decode_str(uri_path).decode_utf8_lossy();
    let mut path = decoded.into_owned();
    if path.ends_with('/') {
        path.push_str("index");
    }

    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }

    let mut resolved = root.to_path_buf();
    let last = segments.pop()?;
    resolved.extend(segments);
    if Path::new(last).extension().is_some() {
        resolved.push(last);
    } else {
        resolved.push(format!("{last}.html"));
    }
    Some(resolved)
}

/// Router serving files from `root`, with request tracing.
pub fn router(root: PathBuf) -> Router {
    Router::new()
        .fallback(serve_path)
        .with_state(Arc::new(root))
        .layer(TraceLayer::new_for_http())
}

async fn serve_path(State(root): State<Arc<PathBuf>>, request: Request) -> Response {
    let Some(path) = map_request_path(&root, request.uri().path()) else {
        debug!(uri = %request.uri(), "path escapes static root");
        return (StatusCode::FORBIDDEN, "Forbidden").into_response();
    };

    let is_file = tokio::fs::metadata(&path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false);
    if !is_file {
        debug!(path = %path.display(), "not found");
        return (StatusCode::NOT_FOUND, "Not Found").into_response();
    }

    match ServeFile::new(&path).oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}

/// The static root must exist and be a directory.
pub fn validate_root(static_root: &Path) -> Result<PathBuf, ServeError> {
    let root = std::path::absolute(static_root)?;
    if !root.exists() {
        return Err(ServeError::MissingRoot(root));
    }
    if !root.is_dir() {
        return Err(ServeError::NotADirectory(root));
    }
    Ok(root)
}

/// Serve `static_root` on all interfaces until Ctrl-C.
pub async fn run(static_root: &Path, port: u16) -> Result<(), ServeError> {
    let root = validate_root(static_root)?;
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServeError::Bind { addr, source })?;

    info!(address = %addr, root = %root.display(), "starting server");
    axum::serve(listener, router(root))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No handler: run until the process is killed.
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received, stopping server");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::write_file;
    use axum::body::{Body, to_bytes};
    use tempfile::TempDir;

    fn map(uri: &str) -> Option<PathBuf> {
        map_request_path(Path::new("/srv"), uri)
    }

    // =========================================================================
    // Path mapping
    // =========================================================================

    #[test]
    fn root_maps_to_index() {
        assert_eq!(map("/"), Some(PathBuf::from("/srv/index.html")));
    }

    #[test]
    fn trailing_slash_maps_to_directory_index() {
        assert_eq!(map("/docs/"), Some(PathBuf::from("/srv/docs/index.html")));
    }

    #[test]
    fn extensionless_path_gets_html() {
        assert_eq!(map("/page"), Some(PathBuf::from("/srv/page.html")));
        assert_eq!(map("/docs"), Some(PathBuf::from("/srv/docs.html")));
    }

    #[test]
    fn existing_extension_kept() {
        assert_eq!(map("/a/page.html"), Some(PathBuf::from("/srv/a/page.html")));
        assert_eq!(map("/style.css"), Some(PathBuf::from("/srv/style.css")));
    }

    #[test]
    fn percent_encoding_decoded() {
        assert_eq!(
            map("/my%20notes/a%2Bb"),
            Some(PathBuf::from("/srv/my notes/a+b.html"))
        );
    }

    #[test]
    fn inner_parent_segments_resolved() {
        assert_eq!(map("/a/./b/../c"), Some(PathBuf::from("/srv/a/c.html")));
    }

    #[test]
    fn escaping_root_is_forbidden() {
        assert_eq!(map("/../x"), None);
        assert_eq!(map("/a/../../x"), None);
        assert_eq!(map("/%2e%2e/etc/passwd"), None);
        assert_eq!(map("/..%2fsecret"), None);
    }

    #[test]
    fn climbing_back_to_root_is_allowed() {
        assert_eq!(map("/a/../"), Some(PathBuf::from("/srv/index.html")));
    }

    #[test]
    fn validate_root_rejects_missing_and_files() {
        let tmp = TempDir::new().unwrap();
        let file = write_file(tmp.path(), "f.html", "x");

        assert!(validate_root(tmp.path()).is_ok());
        assert!(matches!(
            validate_root(&tmp.path().join("nope")),
            Err(ServeError::MissingRoot(_))
        ));
        assert!(matches!(
            validate_root(&file),
            Err(ServeError::NotADirectory(_))
        ));
    }

    // =========================================================================
    // Router
    // =========================================================================

    async fn get(root: &Path, uri: &str) -> (StatusCode, String) {
        let response = router(root.to_path_buf())
            .oneshot(
                axum::http::Request::builder()
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8_lossy(&body).into_owned())
    }

    #[tokio::test]
    async fn serves_existing_pages() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "index.html", "home");
        write_file(tmp.path(), "docs/index.html", "docs home");
        write_file(tmp.path(), "docs/page.html", "a page");

        assert_eq!(get(tmp.path(), "/").await, (StatusCode::OK, "home".into()));
        assert_eq!(
            get(tmp.path(), "/docs/").await,
            (StatusCode::OK, "docs home".into())
        );
        assert_eq!(
            get(tmp.path(), "/docs/page").await,
            (StatusCode::OK, "a page".into())
        );
        assert_eq!(
            get(tmp.path(), "/docs/page.html").await,
            (StatusCode::OK, "a page".into())
        );
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let (status, _) = get(tmp.path(), "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn directory_without_slash_is_not_found() {
        let tmp = TempDir::new().unwrap();
        write_file(tmp.path(), "docs/index.html", "docs home");
        let (status, _) = get(tmp.path(), "/docs").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn traversal_is_forbidden() {
        let tmp = TempDir::new().unwrap();
        let (status, _) = get(tmp.path(), "/%2e%2e/secret").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
