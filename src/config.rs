use std::path::Path;

use serde::Deserialize;

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// List dot-prefixed entries in directory listings
    #[serde(default = "default_show_hidden")]
    pub show_hidden: bool,

    /// Send files as attachments (download) rather than inline
    #[serde(default = "default_attachment")]
    pub attachment: bool,
}

fn default_show_hidden() -> bool {
    true
}

fn default_attachment() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            show_hidden: default_show_hidden(),
            attachment: default_attachment(),
        }
    }
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Check if a listing entry should be left out
    pub fn is_hidden(&self, name: &str) -> bool {
        !self.show_hidden && name.starts_with('.')
    }

    /// Disposition type for served files
    pub fn disposition(&self) -> &'static str {
        if self.attachment {
            "attachment"
        } else {
            "inline"
        }
    }
}
