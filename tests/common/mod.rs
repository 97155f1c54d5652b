//! Test utilities and common setup.

use axum::Router;
use dirserve::{routes, AppState, Config, ServeRoot};
use tempfile::TempDir;

/// Populate a temporary serve root with a small tree:
///
/// ```text
/// index.html
/// notes.TXT
/// data.bin          (3000 bytes)
/// docs/
///   guide.md
///   images/
///     logo.png
/// empty/
/// ```
pub fn fixture_dir() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();

    std::fs::create_dir_all(root.join("docs/images")).unwrap();
    std::fs::create_dir_all(root.join("empty")).unwrap();
    std::fs::write(root.join("index.html"), "<h1>hi</h1>").unwrap();
    std::fs::write(root.join("notes.TXT"), "some notes").unwrap();
    std::fs::write(root.join("data.bin"), vec![7u8; 3000]).unwrap();
    std::fs::write(root.join("docs/guide.md"), "# Guide\n").unwrap();
    std::fs::write(root.join("docs/images/logo.png"), [0x89, b'P', b'N', b'G']).unwrap();

    temp_dir
}

/// Create a test application serving `dir`.
pub fn test_app(dir: &std::path::Path) -> Router {
    test_app_with_config(dir, Config::default())
}

pub fn test_app_with_config(dir: &std::path::Path, config: Config) -> Router {
    let root = ServeRoot::open(dir).unwrap();
    routes::create_router(AppState::with_config(root, config))
}
