//! Configuration management for trellis.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use trellis_compiler::CompileOptions;
use trellis_opcode::StaticResolver;

/// File name searched for in the working directory.
pub const CONFIG_FILE: &str = "trellis.toml";

/// Configuration for trellis.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Metadata attached to every precompiled template
    pub meta: Option<toml::Value>,

    /// Log level when `--verbose` is not given
    pub loglevel: String,

    /// Component naming
    pub components: ComponentsConfig,

    /// Names known to `trellis lower`
    pub resolver: ResolverConfig,
}

/// `[components]`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentsConfig {
    /// Static component tag renames
    pub rename: BTreeMap<String, String>,
}

/// `[resolver]`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Helper names; a helper's handle is its index
    pub helpers: Vec<String>,
    /// Modifier names
    pub modifiers: Vec<String>,
    /// Component and block names
    pub components: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            meta: None,
            loglevel: "warn".to_string(),
            components: ComponentsConfig::default(),
            resolver: ResolverConfig::default(),
        }
    }
}

impl Config {
    /// Loads `explicit`, or the first config file found, or the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_path(path);
        }
        for path in search_paths() {
            if path.exists() {
                return Self::from_path(&path);
            }
        }
        Ok(Self::default())
    }

    /// Parses a config file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid config {}", path.display()))
    }

    /// Parses config text.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Template metadata as JSON.
    pub fn meta_json(&self) -> Result<serde_json::Value> {
        match &self.meta {
            Some(meta) => Ok(serde_json::to_value(meta)?),
            None => Ok(serde_json::Value::Null),
        }
    }

    /// Compile options applying `[components] rename`.
    pub fn compile_options(&self) -> CompileOptions {
        if self.components.rename.is_empty() {
            return CompileOptions::default();
        }
        let rename = self.components.rename.clone();
        CompileOptions::with_component_names(move |tag| {
            rename.get(tag).cloned().unwrap_or_else(|| tag.to_string())
        })
    }

    /// The resolver described by `[resolver]`.
    pub fn resolver(&self) -> StaticResolver {
        StaticResolver::new()
            .helpers(self.resolver.helpers.iter().cloned())
            .modifiers(self.resolver.modifiers.iter().cloned())
            .components(self.resolver.components.iter().cloned())
    }
}

fn search_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(CONFIG_FILE)];
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("trellis").join("config.toml"));
    }
    paths
}
