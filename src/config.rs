use crate::cli::CliArgs;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const BUILTIN_TEMPLATE: &str = include_str!("../templates/visualiser.html");

const DEFAULT_NAMESPACE: &str = "kanister";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_BIND: &str = "0.0.0.0";
const DEFAULT_STATIC_DIR: &str = "static";
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

/// Effective settings after merging CLI flags, the config file and defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub source: Option<String>,
    pub namespace: String,
    pub port: u16,
    pub bind: String,
    pub context: Option<String>,
    pub static_dir: PathBuf,
    pub template: Option<PathBuf>,
    pub fetch_timeout: Duration,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct VisualiserConfigFile {
    namespace: Option<String>,
    port: Option<u16>,
    bind: Option<String>,
    context: Option<String>,
    static_dir: Option<PathBuf>,
    template: Option<PathBuf>,
    #[serde(alias = "fetch_timeout", alias = "timeout_secs")]
    fetch_timeout_secs: Option<u64>,
}

impl Settings {
    pub fn load(args: &CliArgs) -> Result<Self> {
        let file = match discover_config_path() {
            Some(path) => Some((read_config_file(&path)?, path)),
            None => None,
        };
        Ok(match file {
            Some((parsed, path)) => Self::merge(args, parsed, Some(path.display().to_string())),
            None => Self::merge(args, VisualiserConfigFile::default(), None),
        })
    }

    fn merge(args: &CliArgs, file: VisualiserConfigFile, source: Option<String>) -> Self {
        let fetch_timeout_secs = args
            .fetch_timeout_secs
            .or(file.fetch_timeout_secs)
            .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS)
            .max(1);

        Self {
            source,
            namespace: non_empty(args.namespace.clone())
                .or_else(|| non_empty(file.namespace))
                .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
            port: args.port.or(file.port).unwrap_or(DEFAULT_PORT),
            bind: non_empty(args.bind.clone())
                .or_else(|| non_empty(file.bind))
                .unwrap_or_else(|| DEFAULT_BIND.to_string()),
            context: non_empty(args.context.clone()).or_else(|| non_empty(file.context)),
            static_dir: args
                .static_dir
                .clone()
                .or(file.static_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR)),
            template: args.template.clone().or(file.template),
            fetch_timeout: Duration::from_secs(fetch_timeout_secs),
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    /// Returns the page template text, read once at startup.
    pub fn load_template(&self) -> Result<String> {
        let Some(path) = &self.template else {
            return Ok(BUILTIN_TEMPLATE.to_string());
        };
        fs::read_to_string(path)
            .with_context(|| format!("failed to read template {}", path.display()))
    }
}

fn read_config_file(path: &Path) -> Result<VisualiserConfigFile> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    parse_config(&raw).with_context(|| format!("failed to parse config {}", path.display()))
}

fn parse_config(raw: &str) -> Result<VisualiserConfigFile> {
    if raw.trim().is_empty() {
        return Ok(VisualiserConfigFile::default());
    }
    Ok(serde_yaml::from_str(raw)?)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn discover_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("VISUALISER_CONFIG")
        && !path.trim().is_empty()
    {
        return Some(PathBuf::from(path));
    }

    let cwd_candidates = [
        PathBuf::from("visualiser.yaml"),
        PathBuf::from("visualiser.yml"),
        PathBuf::from(".visualiser.yaml"),
    ];
    for candidate in cwd_candidates {
        if candidate.exists() {
            return Some(candidate);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let candidate = PathBuf::from(home).join(".config/kanister-visualiser/config.yaml");
        if candidate.exists() {
            return Some(candidate);
        }
    }

    None
}
