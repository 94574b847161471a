//! Static file serving module
//!
//! Resolves request paths against the base directory, refuses anything that
//! would escape it, and builds file responses with validators and ranges.

use hyper::body::Bytes;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;

use crate::config::AppState;
use crate::error::ServeError;
use crate::handler::router::RequestContext;
use crate::http::response::{self, FileHeaders, HttpResponse};
use crate::http::{cache, mime, parse_range_header, RangeOutcome};
use crate::logger;

/// A file read from under the base directory
#[derive(Debug, Clone)]
pub struct StaticFile {
    pub content: Bytes,
    pub content_type: &'static str,
    pub modified: Option<SystemTime>,
}

/// Serve the configured index file for `/`
pub async fn serve_index(
    ctx: &RequestContext,
    state: &AppState,
) -> Result<HttpResponse, ServeError> {
    match serve_file(ctx, state, &state.config.assets.index_file, None).await {
        Err(ServeError::NotFound) => Err(ServeError::IndexMissing),
        other => other,
    }
}

/// Serve a file under the base directory
///
/// `content_type` overrides the extension lookup.
pub async fn serve_file(
    ctx: &RequestContext,
    state: &AppState,
    relative_path: &str,
    content_type: Option<&'static str>,
) -> Result<HttpResponse, ServeError> {
    let mut file = load_file(state.base_dir(), relative_path).await?;
    if let Some(content_type) = content_type {
        file.content_type = content_type;
    }
    build_file_response(ctx, state, &file)
}

/// Load a file from under `base_dir`
///
/// Every failure (traversal attempt, missing file, directory, unreadable
/// file, missing base directory) is reported as `NotFound`.
pub async fn load_file(base_dir: &Path, request_path: &str) -> Result<StaticFile, ServeError> {
    let Some(relative) = sanitize_path(request_path) else {
        logger::log_warning(&format!("Rejected unsafe or empty path: {request_path:?}"));
        return Err(ServeError::NotFound);
    };

    let base = match fs::canonicalize(base_dir).await {
        Ok(p) => p,
        Err(e) => {
            logger::log_warning(&format!(
                "Base directory not found or inaccessible '{}': {e}",
                base_dir.display()
            ));
            return Err(ServeError::NotFound);
        }
    };

    // File not found is common (404), no need to log at warning level
    let Ok(resolved) = fs::canonicalize(base.join(&relative)).await else {
        logger::log_debug(&format!("No such file: {}", relative.display()));
        return Err(ServeError::NotFound);
    };
    if !resolved.starts_with(&base) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {request_path} -> {}",
            resolved.display()
        ));
        return Err(ServeError::NotFound);
    }

    let metadata = fs::metadata(&resolved).await.map_err(|_| ServeError::NotFound)?;
    if !metadata.is_file() {
        return Err(ServeError::NotFound);
    }

    let content = fs::read(&resolved).await.map_err(|e| {
        logger::log_warning(&format!("Failed to read '{}': {e}", resolved.display()));
        ServeError::NotFound
    })?;

    Ok(StaticFile {
        content: Bytes::from(content),
        content_type: mime::content_type_for(&relative),
        modified: metadata.modified().ok(),
    })
}

/// Turn a URL path into a relative filesystem path
///
/// Percent-decodes, drops empty and `.` segments, and returns `None` for
/// anything that could leave the base directory: `..` segments, backslashes,
/// drive or root prefixes, NUL bytes, or invalid UTF-8.
pub fn sanitize_path(request_path: &str) -> Option<PathBuf> {
    let decoded = percent_decode(request_path)?;
    if decoded.contains('\0') || decoded.contains('\\') {
        return None;
    }

    let mut relative = PathBuf::new();
    for segment in decoded.split('/').filter(|s| !s.is_empty() && *s != ".") {
        let mut components = Path::new(segment).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) => relative.push(name),
            _ => return None,
        }
    }

    if relative.as_os_str().is_empty() {
        None
    } else {
        Some(relative)
    }
}

fn percent_decode(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3)?;
            if !hex.iter().all(u8::is_ascii_hexdigit) {
                return None;
            }
            let hex = std::str::from_utf8(hex).ok()?;
            decoded.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(decoded).ok()
}

/// Build the 200/206/304/416 response for a loaded file
fn build_file_response(
    ctx: &RequestContext,
    state: &AppState,
    file: &StaticFile,
) -> Result<HttpResponse, ServeError> {
    let etag = cache::generate_etag(&file.content);
    let last_modified = file.modified.map(cache::format_http_date);
    let cache_control = state.cache_control();
    let headers = FileHeaders {
        content_type: file.content_type,
        etag: &etag,
        last_modified: last_modified.as_deref(),
        cache_control: &cache_control,
    };

    // If-None-Match takes precedence over If-Modified-Since
    let unchanged = if ctx.if_none_match.is_some() {
        cache::check_etag_match(ctx.if_none_match.as_deref(), &etag)
    } else {
        cache::not_modified_since(ctx.if_modified_since.as_deref(), file.modified)
    };
    if unchanged {
        return response::not_modified(&headers);
    }

    let total = file.content.len();
    match parse_range_header(ctx.range.as_deref(), total) {
        RangeOutcome::Full => response::file_response(file.content.clone(), &headers, ctx.is_head),
        RangeOutcome::Partial(range) => {
            response::partial_response(&file.content, range, &headers, ctx.is_head)
        }
        RangeOutcome::Unsatisfiable => Ok(response::range_not_satisfiable(total)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_sanitize_plain_paths() {
        assert_eq!(sanitize_path("app.js"), Some(PathBuf::from("app.js")));
        assert_eq!(sanitize_path("/js//lib/./x.js"), Some(PathBuf::from("js/lib/x.js")));
        assert_eq!(sanitize_path("my%20notes.md"), Some(PathBuf::from("my notes.md")));
    }

    #[test]
    fn test_sanitize_rejects_traversal() {
        for path in [
            "../../etc/passwd",
            "css/../../secret",
            "%2e%2e/%2e%2e/etc/passwd",
            "..%2fetc%2fpasswd",
            "..%5c..%5cwindows",
            "file%00.js",
            "bad%zz",
            "trunc%2",
            "%ff%fe",
        ] {
            assert_eq!(sanitize_path(path), None, "{path} should be rejected");
        }
    }

    #[test]
    fn test_sanitize_empty() {
        assert_eq!(sanitize_path(""), None);
        assert_eq!(sanitize_path("/./"), None);
    }

    #[tokio::test]
    async fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "script.js", "console.log(1)");
        write(dir.path(), "docs/README.md", "# Vault");

        let file = load_file(dir.path(), "script.js").await.unwrap();
        assert_eq!(file.content, Bytes::from_static(b"console.log(1)"));
        assert_eq!(file.content_type, "application/javascript");
        assert!(file.modified.is_some());

        let file = load_file(dir.path(), "docs/README.md").await.unwrap();
        assert_eq!(file.content_type, "text/markdown");
    }

    #[tokio::test]
    async fn test_load_missing_and_directories() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "docs/README.md", "# Vault");

        assert!(matches!(
            load_file(dir.path(), "missing.js").await,
            Err(ServeError::NotFound)
        ));
        assert!(matches!(
            load_file(dir.path(), "docs").await,
            Err(ServeError::NotFound)
        ));
        assert!(matches!(
            load_file(&dir.path().join("nope"), "docs/README.md").await,
            Err(ServeError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_load_rejects_escape() {
        let outer = tempfile::tempdir().unwrap();
        write(outer.path(), "secret.txt", "top secret");
        write(outer.path(), "public/index.html", "<html></html>");
        let base = outer.path().join("public");

        assert!(matches!(
            load_file(&base, "../secret.txt").await,
            Err(ServeError::NotFound)
        ));
        assert!(matches!(
            load_file(&base, "%2e%2e/secret.txt").await,
            Err(ServeError::NotFound)
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_load_rejects_symlink_escape() {
        let outer = tempfile::tempdir().unwrap();
        write(outer.path(), "secret.txt", "top secret");
        std::fs::create_dir(outer.path().join("public")).unwrap();
        let base = outer.path().join("public");
        std::os::unix::fs::symlink(outer.path().join("secret.txt"), base.join("link.txt"))
            .unwrap();

        assert!(matches!(
            load_file(&base, "link.txt").await,
            Err(ServeError::NotFound)
        ));
    }
}
