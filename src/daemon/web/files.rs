use std::path::{Component, Path, PathBuf};

use tokio::fs;

/// Requests under this prefix belong to the API and are never served from
/// disk.
const API_PREFIX: &str = "/api/";

const INDEX_FILE: &str = "index.html";

/// Maps request targets to files below a root directory.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
}

impl StaticFiles {
    /// Creates a new [`StaticFiles`] serving from `root`.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a request target to a regular file. Return `None` if the
    /// target must be answered with 404.
    pub async fn resolve(&self, target: &str) -> Option<PathBuf> {
        let path = match target.split_once(['?', '#']) {
            Some((path, _)) => path,
            None => target,
        };

        if path.starts_with(API_PREFIX) {
            tracing::debug!(path, "Rejected API path");
            return None;
        }

        // `.` segments are dropped; anything that could leave the root is not.
        let mut relative = PathBuf::new();
        for component in Path::new(path.trim_start_matches('/')).components() {
            match component {
                Component::Normal(part) => relative.push(part),
                Component::CurDir => {}
                _ => {
                    tracing::warn!(path, "Rejected path escaping root");
                    return None;
                }
            }
        }

        let file = self.root.join(relative);
        let metadata = match fs::metadata(&file).await {
            Ok(metadata) => metadata,
            Err(err) => {
                tracing::info!(path = %file.display(), %err, "File not found");
                return None;
            }
        };

        if metadata.is_file() {
            return Some(file);
        }

        let index = file.join(INDEX_FILE);
        match fs::metadata(&index).await {
            Ok(metadata) if metadata.is_file() => Some(index),
            _ => {
                tracing::info!(path = %index.display(), "File not found");
                None
            }
        }
    }
}

/// Guess a `Content-Type` from the file extension.
pub fn content_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "text/javascript; charset=utf-8",
        Some("json") => "application/json",
        Some("txt") => "text/plain; charset=utf-8",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("ico") => "image/x-icon",
        Some("wasm") => "application/wasm",
        Some("woff2") => "font/woff2",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use assert_fs::prelude::*;
    use assert_fs::TempDir;

    fn site() -> TempDir {
        let tmp = TempDir::new().expect("Test environment should support temporary directories");
        tmp.child("index.html").write_str("<h1>home</h1>").unwrap();
        tmp.child("app.js").write_str("main()").unwrap();
        tmp.child("docs/index.html").write_str("docs").unwrap();
        tmp.child("empty").create_dir_all().unwrap();
        tmp.child("api/catalog").write_str("[]").unwrap();
        tmp
    }

    #[tokio::test]
    async fn resolve_root_serves_index() {
        let tmp = site();
        let files = StaticFiles::new(tmp.path());
        assert_eq!(
            files.resolve("/").await,
            Some(tmp.path().join("index.html"))
        );
    }

    #[tokio::test]
    async fn resolve_joins_root() {
        let tmp = site();
        let files = StaticFiles::new(tmp.path());
        assert_eq!(
            files.resolve("/app.js").await,
            Some(tmp.path().join("app.js"))
        );
        assert_eq!(
            files.resolve("/app.js?cache=1").await,
            Some(tmp.path().join("app.js"))
        );
    }

    #[tokio::test]
    async fn resolve_api_prefix_not_found() {
        let tmp = site();
        let files = StaticFiles::new(tmp.path());
        assert_eq!(files.resolve("/api/catalog").await, None);
        assert_eq!(files.resolve("/api/").await, None);
    }

    #[tokio::test]
    async fn resolve_missing_not_found() {
        let tmp = site();
        let files = StaticFiles::new(tmp.path());
        assert_eq!(files.resolve("/missing.css").await, None);
    }

    #[tokio::test]
    async fn resolve_directory() {
        let tmp = site();
        let files = StaticFiles::new(tmp.path());
        assert_eq!(
            files.resolve("/docs").await,
            Some(tmp.path().join("docs").join("index.html"))
        );
        assert_eq!(files.resolve("/empty/").await, None);
    }

    #[tokio::test]
    async fn resolve_rejects_traversal() {
        let tmp = site();
        tmp.child("secret").write_str("hidden").unwrap();
        let files = StaticFiles::new(tmp.child("docs").path());
        assert_eq!(files.resolve("/../secret").await, None);
        assert_eq!(files.resolve("/docs/../../secret").await, None);
    }

    #[tokio::test]
    async fn resolve_drops_current_dir_segments() {
        let tmp = site();
        let expected = Some(tmp.path().join("docs").join("index.html"));
        let files = StaticFiles::new(tmp.path());
        assert_eq!(files.resolve("/./docs/index.html").await, expected);
        assert_eq!(files.resolve("/docs/./index.html").await, expected);
        assert_eq!(files.resolve("/docs/.").await, expected);
    }

    #[test]
    fn content_type_by_extension() {
        assert_eq!(
            content_type(Path::new("index.HTML")),
            "text/html; charset=utf-8"
        );
        assert_eq!(content_type(Path::new("logo.png")), "image/png");
        assert_eq!(
            content_type(Path::new("archive")),
            "application/octet-stream"
        );
    }
}
