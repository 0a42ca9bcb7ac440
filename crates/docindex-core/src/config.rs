//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge built-in defaults + `docindex.toml` +
//! `docindex.<env>.toml` + `DOCINDEX_*` env vars into [`Settings`].
//! Provides helpers to expand `~` and `${VAR}` and to resolve relative paths
//! against a known base directory.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::chunker::ChunkingConfig;
use crate::error::{Error, Result};
use crate::scanner::DEFAULT_EXTENSIONS;

pub const CONFIG_FILE: &str = "docindex.toml";
pub const ENV_PREFIX: &str = "DOCINDEX_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocsConfig {
    pub root: String,
    pub extensions: Vec<String>,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            root: "docs".to_string(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| (*e).to_string()).collect(),
        }
    }
}

/// Where the persisted artifacts live. Defaults to the documentation root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub dir: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub default_k: usize,
    pub max_k: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { default_k: 3, max_k: 20 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    pub page_chars: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self { page_chars: 1_000 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub docs: DocsConfig,
    pub index: IndexConfig,
    pub chunking: ChunkingConfig,
    pub search: SearchConfig,
    pub reader: ReaderConfig,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        self.chunking.validate()?;
        if self.search.default_k == 0 || self.search.default_k > self.search.max_k {
            return Err(Error::InvalidConfig(format!(
                "search.default_k must be in 1..={}, got {}",
                self.search.max_k, self.search.default_k
            )));
        }
        if self.docs.extensions.is_empty() {
            return Err(Error::InvalidConfig("docs.extensions must not be empty".into()));
        }
        if self.reader.page_chars == 0 {
            return Err(Error::InvalidConfig("reader.page_chars must be positive".into()));
        }
        Ok(())
    }

    pub fn docs_root(&self) -> PathBuf {
        expand_path(&self.docs.root)
    }

    pub fn index_dir(&self) -> PathBuf {
        match &self.index.dir {
            Some(dir) => resolve_with_base(&self.docs_root(), dir),
            None => self.docs_root(),
        }
    }
}

pub struct Config {
    figment: Figment,
    settings: Settings,
}

impl Config {
    /// Load `docindex.toml` from the working directory plus env overlays.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Like [`Config::load`] but with an explicit base config file.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        let base = path.map_or_else(|| PathBuf::from(CONFIG_FILE), Path::to_path_buf);

        let mut figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::file(&base));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file(env_overlay(&base, "dev"))),
            "prod" | "production" => figment = figment.merge(Toml::file(env_overlay(&base, "prod"))),
            "test" | "testing" => figment = figment.merge(Toml::file(env_overlay(&base, "test"))),
            _ => {}
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));
        Self::from_figment(figment)
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let settings: Settings = figment
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        settings.validate()?;
        tracing::debug!(root = %settings.docs.root, "configuration loaded");
        Ok(Self { figment, settings })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| Error::InvalidConfig(format!("Failed to get '{key}': {e}")))
    }
}

/// `docindex.toml` -> `docindex.dev.toml`, next to the base file.
fn env_overlay(base: &Path, env_name: &str) -> PathBuf {
    let stem = base.file_stem().and_then(|s| s.to_str()).unwrap_or("docindex");
    base.with_file_name(format!("{stem}.{env_name}.toml"))
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a `PathBuf` without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let s = Settings::default();
        assert_eq!(s.chunking.window, 400);
        assert_eq!(s.chunking.overlap, 40);
        assert_eq!(s.search.default_k, 3);
        assert_eq!(s.search.max_k, 20);
        assert_eq!(s.reader.page_chars, 1_000);
        assert_eq!(s.docs.extensions, vec!["md", "txt", "yml", "yaml"]);
        assert!(s.validate().is_ok());
    }

    #[test]
    fn toml_overrides_defaults() {
        let figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::string(
            "[docs]\nroot = \"/srv/docs\"\n[index]\ndir = \"idx\"\n[search]\ndefault_k = 5\n",
        ));
        let config = Config::from_figment(figment).expect("config");
        let s = config.settings();
        assert_eq!(s.search.default_k, 5);
        assert_eq!(s.chunking.window, 400);
        assert_eq!(s.index_dir(), PathBuf::from("/srv/docs/idx"));
        let k: usize = config.get("search.max_k").expect("max_k");
        assert_eq!(k, 20);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::string("[chunking]\nwindow = 40\noverlap = 40\n"));
        assert!(matches!(Config::from_figment(figment), Err(Error::InvalidConfig(_))));

        let figment = Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::string("[search]\ndefault_k = 0\n"));
        assert!(matches!(Config::from_figment(figment), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn index_dir_defaults_to_docs_root() {
        let s = Settings::default();
        assert_eq!(s.index_dir(), s.docs_root());
    }

    #[test]
    fn env_overlay_sits_next_to_base() {
        assert_eq!(env_overlay(Path::new("/etc/docindex.toml"), "prod"), PathBuf::from("/etc/docindex.prod.toml"));
    }
}
