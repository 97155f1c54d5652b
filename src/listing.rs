//! Directory listing model and its HTML rendering.

use std::fmt::{self, Write};
use std::time::SystemTime;

use chrono::{DateTime, Local};

const KIB: u64 = 1024;
const MIB: u64 = 1024 * 1024;

/// One child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: String,
    pub is_dir: bool,
    /// Byte size; not meaningful for directories.
    pub size: u64,
    pub modified: Option<SystemTime>,
    /// Root-relative link, with a trailing `/` for directories.
    pub url: String,
}

/// A listed URL path and its children, directories first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryListing {
    /// Listed path without leading or trailing `/`; empty for the root.
    pub path: String,
    pub entries: Vec<DirectoryEntry>,
}

impl DirectoryListing {
    pub fn new(url_path: &str) -> Self {
        Self {
            path: url_path.trim_matches('/').to_string(),
            entries: Vec::new(),
        }
    }

    pub fn push(&mut self, name: String, is_dir: bool, size: u64, modified: Option<SystemTime>) {
        let url = entry_url(&self.path, &name, is_dir);
        self.entries.push(DirectoryEntry {
            name,
            is_dir,
            size,
            modified,
            url,
        });
    }

    /// Directories before files, each group ordered by name.
    pub fn sort(&mut self) {
        self.entries
            .sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));
    }

    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    /// Heading text, always starting with `/`.
    pub fn display_path(&self) -> String {
        format!("/{}", self.path)
    }

    /// Link to the enclosing directory, `None` when listing the root.
    pub fn parent_url(&self) -> Option<String> {
        if self.is_root() {
            return None;
        }
        match self.path.rsplit_once('/') {
            Some((parent, _)) => Some(format!("/{}/", encode_path(parent))),
            None => Some("/".to_string()),
        }
    }
}

/// Build the link for a child `name` of the listed `dir_path`.
pub fn entry_url(dir_path: &str, name: &str, is_dir: bool) -> String {
    let mut url = String::from("/");
    if !dir_path.is_empty() {
        url.push_str(&encode_path(dir_path));
        url.push('/');
    }
    url.push_str(&urlencoding::encode(name));
    if is_dir {
        url.push('/');
    }
    url
}

fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Human-readable size: whole bytes, then KB and MB with one decimal.
pub fn format_size(bytes: u64) -> String {
    if bytes < KIB {
        format!("{} B", bytes)
    } else if bytes < MIB {
        format!("{:.1} KB", bytes as f64 / KIB as f64)
    } else {
        format!("{:.1} MB", bytes as f64 / MIB as f64)
    }
}

/// Local modification time as `YYYY-MM-DD HH:MM`, or `-` when unknown.
pub fn format_modified(modified: Option<SystemTime>) -> String {
    match modified {
        Some(time) => DateTime::<Local>::from(time)
            .format("%Y-%m-%d %H:%M")
            .to_string(),
        None => "-".to_string(),
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

const STYLE: &str = r#"        body { font-family: Arial, sans-serif; margin: 20px; }
        h1 { color: #333; }
        table { border-collapse: collapse; width: 100%; }
        th, td { border: 1px solid #ddd; padding: 8px; text-align: left; }
        th { background-color: #f2f2f2; }
        a { text-decoration: none; color: #0066cc; }
        a:hover { text-decoration: underline; }
        .file-icon { color: #666; }
        .dir-icon { color: #ff6600; }
"#;

/// Render the listing as a complete HTML document.
///
/// Entries are written in their stored order; call [`DirectoryListing::sort`] first.
pub fn render(listing: &DirectoryListing) -> Result<String, fmt::Error> {
    let title = html_escape(&listing.display_path());
    let mut html = String::new();

    writeln!(html, "<!DOCTYPE html>")?;
    writeln!(html, "<html>")?;
    writeln!(html, "<head>")?;
    writeln!(html, "    <meta charset=\"utf-8\">")?;
    writeln!(html, "    <title>Directory listing for {}</title>", title)?;
    writeln!(html, "    <style>\n{}    </style>", STYLE)?;
    writeln!(html, "</head>")?;
    writeln!(html, "<body>")?;
    writeln!(html, "    <h1>Directory listing for {}</h1>", title)?;
    writeln!(html, "    <table>")?;
    writeln!(html, "        <thead>")?;
    writeln!(
        html,
        "            <tr><th>Name</th><th>Type</th><th>Size</th><th>Modified</th></tr>"
    )?;
    writeln!(html, "        </thead>")?;
    writeln!(html, "        <tbody>")?;

    if let Some(parent) = listing.parent_url() {
        writeln!(
            html,
            "            <tr class=\"parent\"><td><a href=\"{}\">\u{1F4C1} ..</a></td><td><span class=\"dir-icon\">\u{1F4C1}</span> Directory</td><td>-</td><td>-</td></tr>",
            parent
        )?;
    }

    for entry in &listing.entries {
        let (icon, kind, size) = if entry.is_dir {
            ("<span class=\"dir-icon\">\u{1F4C1}</span>", "Directory", "-".to_string())
        } else {
            ("<span class=\"file-icon\">\u{1F4C4}</span>", "File", format_size(entry.size))
        };
        writeln!(
            html,
            "            <tr class=\"entry\"><td><a href=\"{}\">{} {}</a></td><td>{}</td><td>{}</td><td>{}</td></tr>",
            entry.url,
            icon,
            html_escape(&entry.name),
            kind,
            size,
            format_modified(entry.modified)
        )?;
    }

    writeln!(html, "        </tbody>")?;
    writeln!(html, "    </table>")?;
    writeln!(html, "</body>")?;
    writeln!(html, "</html>")?;

    Ok(html)
}
