use anyhow::Result;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub system_config: SystemConfig,
    #[serde(default)]
    pub llm_config: LlmConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Upper bound on whitespace-separated words for translate / transliterate input.
    #[serde(default = "default_max_words")]
    pub max_words: usize,
    #[serde(default = "default_vocabulary_size")]
    pub default_vocabulary_size: u32,
    #[serde(default = "default_max_vocabulary_size")]
    pub max_vocabulary_size: u32,
    /// Limit on the decoded size of an uploaded image.
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: usize,
    /// Capability name -> replacement prompt template.
    #[serde(default)]
    pub prompt_overrides: HashMap<String, String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_words() -> usize {
    50
}

fn default_vocabulary_size() -> u32 {
    3
}

fn default_max_vocabulary_size() -> u32 {
    20
}

fn default_max_image_bytes() -> usize {
    5 * 1024 * 1024
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_words: default_max_words(),
            default_vocabulary_size: default_vocabulary_size(),
            max_vocabulary_size: default_max_vocabulary_size(),
            max_image_bytes: default_max_image_bytes(),
            prompt_overrides: HashMap::new(),
        }
    }
}

/// Which hosted model backs the gateway, plus per-provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_provider")]
    pub llm_provider: String,
    #[serde(default)]
    pub openai_compatible_llm: Option<ProviderConfig>,
    #[serde(default)]
    pub ollama_llm: Option<ProviderConfig>,
    #[serde(default)]
    pub gemini_llm: Option<ProviderConfig>,
    #[serde(default)]
    pub claude_llm: Option<ProviderConfig>,
}

fn default_llm_provider() -> String {
    "gemini_llm".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            llm_provider: default_llm_provider(),
            openai_compatible_llm: None,
            ollama_llm: None,
            gemini_llm: None,
            claude_llm: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub llm_api_key: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            anyhow::bail!("Configuration file not found: {}", path);
        }

        let content = load_text_file(path)?;
        let content = substitute_env_vars(&content, |name| std::env::var(name).ok());

        // Determine file type by extension
        let path_lower = path.to_lowercase();
        if path_lower.ends_with(".json") {
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(serde_yaml::from_str(&content)?)
        }
    }

    /// Candidate config locations, most specific first.
    pub fn search_paths() -> Vec<String> {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."));

        vec![
            std::env::var("CONFIG_PATH").ok(),
            Some("conf.yaml".to_string()),
            Some("conf.json".to_string()),
            exe_dir.join("conf.yaml").to_str().map(|s| s.to_string()),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Load the first config that parses. Returns the path it came from.
    pub fn discover() -> Option<(Self, String)> {
        for path in Self::search_paths() {
            match Self::load(&path) {
                Ok(cfg) => return Some((cfg, path)),
                Err(e) => {
                    debug!("Failed to load config from {}: {}", path, e);
                    continue;
                }
            }
        }
        None
    }
}

/// Replace `${VAR_NAME}` with values from `lookup`; unknown names stay as written.
pub fn substitute_env_vars<F>(content: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let pattern = env_var_pattern();
    pattern
        .replace_all(content, |caps: &Captures| {
            lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: std::sync::OnceLock<Regex> = std::sync::OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{(\w+)\}").expect("env var pattern is valid"))
}

/// Read a text file, stripping a UTF-8 BOM and decoding anything else lossily.
fn load_text_file(file_path: &str) -> Result<String> {
    let bytes = fs::read(file_path)?;
    let (cow, _, had_errors) = encoding_rs::UTF_8.decode(&bytes);
    if had_errors {
        debug!("{} is not valid UTF-8; replaced invalid sequences", file_path);
    }
    Ok(cow.into_owned())
}
