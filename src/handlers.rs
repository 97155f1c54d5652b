use std::path::{Path, PathBuf};

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
};
use futures::TryStreamExt;
use tokio::fs;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::FileServerError;
use crate::listing::{self, DirectoryListing};
use crate::mime::mime_type_for;
use crate::resolve::{resolve, EntryKind};
use crate::AppState;

// ============================================================================
// Helper functions
// ============================================================================

/// Percent-decode the raw URI path.
fn decode_request_path(raw: &str) -> Result<String, FileServerError> {
    urlencoding::decode(raw)
        .map(|path| path.into_owned())
        .map_err(|_| {
            warn!("Request path is not valid UTF-8 after decoding: {}", raw);
            FileServerError::InvalidPath(raw.to_string())
        })
}

/// Collect the immediate children of `dir`.
///
/// Children whose metadata cannot be read (broken symlinks, races with
/// deletion, permission problems) are skipped.
fn read_listing(
    dir: &Path,
    url_path: &str,
    config: &Config,
) -> Result<DirectoryListing, FileServerError> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| FileServerError::Internal(format!("Error reading directory: {}", e)))?;

    let mut listing = DirectoryListing::new(url_path);

    for entry in entries {
        let Ok(entry) = entry else {
            continue;
        };
        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(raw) => {
                debug!("Skipping non UTF-8 name: {:?}", raw);
                continue;
            }
        };

        if config.is_hidden(&name) {
            continue;
        }

        // Follows symlinks so linked directories list as directories
        let metadata = match std::fs::metadata(entry.path()) {
            Ok(m) => m,
            Err(e) => {
                debug!("Skipping {}: {}", entry.path().display(), e);
                continue;
            }
        };

        listing.push(name, metadata.is_dir(), metadata.len(), metadata.modified().ok());
    }

    listing.sort();

    Ok(listing)
}

/// Build a Content-Disposition value that is always a valid header.
///
/// Quotes become `'` and control characters (legal in Unix file names) become `_`.
fn content_disposition(kind: &str, file_name: &str) -> String {
    let safe_filename: String = file_name
        .chars()
        .map(|c| match c {
            '"' => '\'',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    format!("{}; filename=\"{}\"", kind, safe_filename)
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /{path} - Serve a file or a directory listing
pub async fn serve(State(state): State<AppState>, uri: Uri) -> Result<Response, FileServerError> {
    let request_path = decode_request_path(uri.path())?;
    let entry = resolve(&state.root, &request_path).await?;

    match entry.kind {
        EntryKind::Directory => serve_directory(&state, entry.path, &request_path).await,
        EntryKind::File { .. } => serve_file(&state, &entry.path).await,
    }
}

/// Stream a file as the response body.
///
/// The handle is owned by the body stream and closed when the response
/// finishes or the client goes away.
pub async fn serve_file(state: &AppState, path: &Path) -> Result<Response, FileServerError> {
    let file = fs::File::open(path)
        .await
        .map_err(|e| FileServerError::Internal(format!("Error reading file: {}", e)))?;

    let metadata = file
        .metadata()
        .await
        .map_err(|e| FileServerError::Internal(format!("Error reading file: {}", e)))?;
    let file_size = metadata.len();

    debug!("Streaming file: {} ({} bytes)", path.display(), file_size);

    let shown = path.display().to_string();
    let stream = ReaderStream::new(file).inspect_err(move |e| {
        warn!(path = %shown, error = %e, "Error writing file");
    });
    let body = Body::from_stream(stream);

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime_type_for(path).to_string()),
            (header::CONTENT_LENGTH, file_size.to_string()),
            (
                header::CONTENT_DISPOSITION,
                content_disposition(state.config.disposition(), &file_name),
            ),
        ],
        body,
    )
        .into_response())
}

/// Render the HTML listing for a directory.
pub async fn serve_directory(
    state: &AppState,
    path: PathBuf,
    url_path: &str,
) -> Result<Response, FileServerError> {
    debug!("Listing directory: {}", path.display());

    let config = state.config.clone();
    let url_path = url_path.to_string();

    let listing = tokio::task::spawn_blocking(move || read_listing(&path, &url_path, &config))
        .await
        .map_err(|err| FileServerError::Internal(err.to_string()))??;

    let html = listing::render(&listing)
        .map_err(|e| FileServerError::Internal(format!("Error generating HTML: {}", e)))?;

    Ok((StatusCode::OK, Html(html)).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_decode_request_path() {
        assert_eq!(decode_request_path("/a%20b/c.txt").unwrap(), "/a b/c.txt");
        assert_eq!(decode_request_path("/plain").unwrap(), "/plain");
        assert_eq!(decode_request_path("/%2e%2e/etc").unwrap(), "/../etc");
        assert!(matches!(
            decode_request_path("/%ff%fe"),
            Err(FileServerError::InvalidPath(_))
        ));
    }

    #[test]
    fn test_content_disposition_sanitizes_name() {
        assert_eq!(
            content_disposition("attachment", "report.pdf"),
            "attachment; filename=\"report.pdf\""
        );
        assert_eq!(
            content_disposition("inline", "say \"hi\".txt"),
            "inline; filename=\"say 'hi'.txt\""
        );
        assert_eq!(
            content_disposition("attachment", "a\u{1}b\nc\u{7f}.txt"),
            "attachment; filename=\"a_b_c_.txt\""
        );
        assert_eq!(
            content_disposition("attachment", "caf\u{e9}.txt"),
            "attachment; filename=\"caf\u{e9}.txt\""
        );
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_read_listing_skips_non_utf8_names() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        std::fs::write(root.join("ok.txt"), "x").unwrap();
        std::fs::write(root.join(OsStr::from_bytes(b"bad\xff.txt")), "x").unwrap();

        let listing = read_listing(root, "", &Config::default()).unwrap();
        let names: Vec<_> = listing.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["ok.txt"]);
    }

    #[test]
    fn test_read_listing_immediate_children_only() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        std::fs::create_dir_all(root.join("sub/deeper")).unwrap();
        std::fs::write(root.join("sub/inner.txt"), "x").unwrap();
        std::fs::write(root.join("b.txt"), "bb").unwrap();
        std::fs::write(root.join("a.txt"), "a").unwrap();

        let listing = read_listing(root, "", &Config::default()).unwrap();
        let names: Vec<_> = listing.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["sub", "a.txt", "b.txt"]);
        assert_eq!(listing.entries[0].url, "/sub/");
        assert_eq!(listing.entries[2].size, 2);
    }

    #[test]
    fn test_read_listing_hides_dotfiles_when_configured() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        std::fs::write(root.join(".env"), "secret").unwrap();
        std::fs::write(root.join("visible.txt"), "x").unwrap();

        let listing = read_listing(root, "", &Config::default()).unwrap();
        assert_eq!(listing.entries.len(), 2);

        let config = Config {
            show_hidden: false,
            ..Config::default()
        };
        let listing = read_listing(root, "", &config).unwrap();
        assert_eq!(listing.entries.len(), 1);
        assert_eq!(listing.entries[0].name, "visible.txt");
    }

    #[cfg(unix)]
    #[test]
    fn test_read_listing_skips_broken_symlinks() {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        std::fs::write(root.join("ok.txt"), "x").unwrap();
        symlink(root.join("gone"), root.join("dangling")).unwrap();

        let listing = read_listing(root, "", &Config::default()).unwrap();
        let names: Vec<_> = listing.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["ok.txt"]);
    }

    #[test]
    fn test_read_listing_missing_directory_is_internal() {
        let temp_dir = TempDir::new().unwrap();
        let result = read_listing(&temp_dir.path().join("gone"), "gone", &Config::default());
        assert!(matches!(result, Err(FileServerError::Internal(_))));
    }
}
