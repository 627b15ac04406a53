//! Runtime configuration read from the process environment.
//!
//! Everything a run needs is resolved here, once, before any network call.
//! A missing credential or repository owner is a [`ConfigError`] and stops
//! the process.

use std::time::Duration;

use tracing::debug;

use crate::domain::RepoRef;
use crate::error::ConfigError;

pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
/// Set by GitHub Actions as `owner/name`
pub const GITHUB_REPOSITORY_ENV: &str = "GITHUB_REPOSITORY";
pub const REPO_OWNER_ENV: &str = "CODEDAY_REPO_OWNER";
pub const REPO_NAME_ENV: &str = "CODEDAY_REPO_NAME";
pub const BRANCH_ENV: &str = "CODEDAY_BRANCH";
pub const TARGET_DIR_ENV: &str = "CODEDAY_TARGET_DIR";
pub const HISTORY_ENV: &str = "CODEDAY_HISTORY";
pub const HISTORY_PATH_ENV: &str = "CODEDAY_HISTORY_PATH";
pub const SKIP_PROBABILITY_ENV: &str = "CODEDAY_SKIP_PROBABILITY";
pub const FILE_NAMING_ENV: &str = "CODEDAY_FILE_NAMING";
pub const LANGUAGE_ENV: &str = "CODEDAY_LANGUAGE";
pub const FILE_EXTENSION_ENV: &str = "CODEDAY_FILE_EXTENSION";
pub const MODEL_ENV: &str = "CODEDAY_MODEL";
pub const MAX_TOKENS_ENV: &str = "CODEDAY_MAX_TOKENS";
pub const TEMPERATURE_ENV: &str = "CODEDAY_TEMPERATURE";
pub const OPENAI_BASE_URL_ENV: &str = "CODEDAY_OPENAI_BASE_URL";
pub const GITHUB_API_URL_ENV: &str = "CODEDAY_GITHUB_API_URL";
pub const HTTP_TIMEOUT_ENV: &str = "CODEDAY_HTTP_TIMEOUT_SECS";

pub const DEFAULT_REPO_NAME: &str = "AICodeOfTheDay";
pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_HISTORY_PATH: &str = "README.md";
pub const DEFAULT_SKIP_PROBABILITY: f64 = 0.3;
pub const DEFAULT_LANGUAGE: &str = "C#";
pub const DEFAULT_FILE_EXTENSION: &str = "cs";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_MAX_TOKENS: u32 = 800;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1/";
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com/";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

/// How the published artifact is named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileNaming {
    /// Use the name the model put in `[fileName]`, falling back to the date-stamped name
    #[default]
    FromResponse,
    /// Always `CodeOfTheDay_<yyyyMMdd>.<ext>`
    DateStamped,
}

/// Completion model settings.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub language: String,
    pub file_extension: String,
    pub file_naming: FileNaming,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            language: DEFAULT_LANGUAGE.to_string(),
            file_extension: DEFAULT_FILE_EXTENSION.to_string(),
            file_naming: FileNaming::FromResponse,
        }
    }
}

/// Validated configuration for one run.
#[derive(Clone)]
pub struct Config {
    pub github_token: String,
    pub openai_api_key: String,
    pub repo: RepoRef,
    pub branch: String,
    /// Directory for generated files, relative to the repository root
    pub target_dir: Option<String>,
    pub history_enabled: bool,
    pub history_path: String,
    /// Chance in `[0, 1]` that a run does nothing
    pub skip_probability: f64,
    pub generation: GenerationSettings,
    pub openai_base_url: String,
    pub github_api_url: String,
    pub http_timeout: Duration,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Blank values are treated the same as absent ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let github_token = get(GITHUB_TOKEN_ENV).ok_or(ConfigError::Missing(GITHUB_TOKEN_ENV))?;
        let openai_api_key =
            get(OPENAI_API_KEY_ENV).ok_or(ConfigError::Missing(OPENAI_API_KEY_ENV))?;

        let repo = resolve_repo(
            get(REPO_OWNER_ENV),
            get(REPO_NAME_ENV),
            get(GITHUB_REPOSITORY_ENV),
        )?;

        let target_dir = get(TARGET_DIR_ENV)
            .map(|dir| dir.trim_matches('/').to_string())
            .filter(|dir| !dir.is_empty());

        let history_enabled = match get(HISTORY_ENV) {
            Some(value) => parse_bool(HISTORY_ENV, &value)?,
            None => true,
        };

        let skip_probability = match get(SKIP_PROBABILITY_ENV) {
            Some(value) => parse_probability(SKIP_PROBABILITY_ENV, &value)?,
            None => DEFAULT_SKIP_PROBABILITY,
        };

        let file_naming = match get(FILE_NAMING_ENV).as_deref() {
            None | Some("response") => FileNaming::FromResponse,
            Some("date") => FileNaming::DateStamped,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: FILE_NAMING_ENV,
                    value: other.to_string(),
                    reason: "expected 'response' or 'date'".to_string(),
                })
            }
        };

        let generation = GenerationSettings {
            model: get(MODEL_ENV).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens: parse_or(get(MAX_TOKENS_ENV), MAX_TOKENS_ENV, DEFAULT_MAX_TOKENS)?,
            temperature: parse_or(get(TEMPERATURE_ENV), TEMPERATURE_ENV, DEFAULT_TEMPERATURE)?,
            language: get(LANGUAGE_ENV).unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
            file_extension: get(FILE_EXTENSION_ENV)
                .map(|ext| ext.trim_start_matches('.').to_string())
                .unwrap_or_else(|| DEFAULT_FILE_EXTENSION.to_string()),
            file_naming,
        };

        let config = Self {
            github_token,
            openai_api_key,
            repo,
            branch: get(BRANCH_ENV).unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
            target_dir,
            history_enabled,
            history_path: get(HISTORY_PATH_ENV)
                .unwrap_or_else(|| DEFAULT_HISTORY_PATH.to_string()),
            skip_probability,
            generation,
            openai_base_url: with_trailing_slash(
                get(OPENAI_BASE_URL_ENV).unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            ),
            github_api_url: with_trailing_slash(
                get(GITHUB_API_URL_ENV).unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string()),
            ),
            http_timeout: Duration::from_secs(parse_or(
                get(HTTP_TIMEOUT_ENV),
                HTTP_TIMEOUT_ENV,
                DEFAULT_HTTP_TIMEOUT_SECS,
            )?),
        };

        debug!("Loaded configuration: {:?}", config);
        Ok(config)
    }

    /// Repository path for a generated file, honoring the target directory.
    pub fn artifact_path(&self, file_name: &str) -> String {
        match &self.target_dir {
            Some(dir) => format!("{}/{}", dir, file_name),
            None => file_name.to_string(),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("github_token", &"[REDACTED]")
            .field("openai_api_key", &"[REDACTED]")
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("target_dir", &self.target_dir)
            .field("history_enabled", &self.history_enabled)
            .field("history_path", &self.history_path)
            .field("skip_probability", &self.skip_probability)
            .field("generation", &self.generation)
            .field("openai_base_url", &self.openai_base_url)
            .field("github_api_url", &self.github_api_url)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}

/// Explicit owner/name win over `GITHUB_REPOSITORY`; the name falls back to the default.
fn resolve_repo(
    owner: Option<String>,
    name: Option<String>,
    github_repository: Option<String>,
) -> Result<RepoRef, ConfigError> {
    let (ci_owner, ci_name) = match github_repository {
        Some(full) => match full.split_once('/') {
            Some((o, n)) if !o.is_empty() && !n.is_empty() && !n.contains('/') => {
                (Some(o.to_string()), Some(n.to_string()))
            }
            _ => {
                return Err(ConfigError::Invalid {
                    key: GITHUB_REPOSITORY_ENV,
                    value: full.clone(),
                    reason: "expected 'owner/name'".to_string(),
                })
            }
        },
        None => (None, None),
    };

    let owner = owner.or(ci_owner).ok_or(ConfigError::Missing(REPO_OWNER_ENV))?;
    let name = name
        .or(ci_name)
        .unwrap_or_else(|| DEFAULT_REPO_NAME.to_string());
    Ok(RepoRef::new(owner, name))
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: "expected a boolean".to_string(),
        }),
    }
}

fn parse_probability(key: &'static str, value: &str) -> Result<f64, ConfigError> {
    let p: f64 = value.parse().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
        reason: "expected a number".to_string(),
    })?;
    if !(0.0..=1.0).contains(&p) {
        return Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: "must be between 0 and 1".to_string(),
        });
    }
    Ok(p)
}

fn parse_or<T>(value: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(v) => v.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: v.clone(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn with_trailing_slash(mut url: String) -> String {
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}
