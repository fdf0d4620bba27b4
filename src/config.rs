use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use cross_xdg::BaseDirs;

const FILE_NAME: &str = "bf-machine.toml";

/// Resolved machine and runner settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub tape_size: usize,
    pub loop_max: usize,
    pub max_steps: Option<usize>,
    pub timeout_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tape_size: 0,
            loop_max: 0,
            max_steps: None,
            timeout_ms: 2_000,
        }
    }
}

/// One source of overrides (config file or environment). Unset keys are `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Layer {
    pub tape_size: Option<usize>,
    pub loop_max: Option<usize>,
    pub max_steps: Option<usize>,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid value for '{key}' on line {line}: {value:?} (expected a non-negative integer)")]
    InvalidValue { key: String, value: String, line: usize },
}

impl Settings {
    pub fn apply(mut self, layer: Layer) -> Self {
        if let Some(v) = layer.tape_size { self.tape_size = v; }
        if let Some(v) = layer.loop_max { self.loop_max = v; }
        if let Some(v) = layer.max_steps { self.max_steps = Some(v); }
        if let Some(v) = layer.timeout_ms { self.timeout_ms = v; }
        self
    }
}

/// Defaults, then the config file, then `BF_*` environment variables.
///
/// A missing config file is not an error; an unreadable or malformed one is.
pub fn load() -> Result<Settings, ConfigError> {
    let env = |key: &str| std::env::var(key).ok();

    let mut settings = Settings::default();
    if let Some(path) = config_path(&env) {
        if let Some(layer) = load_file(&path)? {
            tracing::debug!(path = %path.display(), "loaded config file");
            settings = settings.apply(layer);
        }
    }
    Ok(settings.apply(env_layer(&env)))
}

/// `BF_CONFIG` when set, otherwise `bf-machine.toml` in the XDG config home.
fn config_path(env: &dyn Fn(&str) -> Option<String>) -> Option<PathBuf> {
    if let Some(p) = env("BF_CONFIG") {
        return Some(PathBuf::from(p));
    }

    // On Linux: resolves to /home/<user>/.config
    // On Windows: resolves to C:\Users\<user>\.config
    // On macOS: resolves to /Users/<user>/.config
    let base_dirs = BaseDirs::new().ok()?;
    let mut path = PathBuf::from(base_dirs.config_home());
    path.push(FILE_NAME);
    Some(path)
}

fn load_file(path: &Path) -> Result<Option<Layer>, ConfigError> {
    match fs::read_to_string(path) {
        Ok(content) => parse(&content).map(Some),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(ConfigError::Io { path: path.to_path_buf(), source }),
    }
}

/// Read the `[machine]` section of a config file.
///
/// Only the handful of integer keys this crate uses are understood, so this is a
/// line parser rather than a full TOML reader. Comments start with `#`.
pub fn parse(content: &str) -> Result<Layer, ConfigError> {
    let mut in_machine = false;
    let mut layer = Layer::default();

    for (idx, raw) in content.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() { continue; }
        if line.starts_with('[') && line.ends_with(']') {
            in_machine = line[1..line.len() - 1].trim() == "machine";
            continue;
        }
        if !in_machine { continue; }
        let Some((key, val_raw)) = line.split_once('=') else { continue; };
        let key = key.trim();
        // Accept quoted or unquoted
        let val = val_raw.trim().trim_matches('"');

        let invalid = || ConfigError::InvalidValue {
            key: key.to_string(),
            value: val.to_string(),
            line: idx + 1,
        };
        let digits = val.replace('_', "");

        match key {
            "tape_size" => layer.tape_size = Some(digits.parse().map_err(|_| invalid())?),
            "loop_max" => layer.loop_max = Some(digits.parse().map_err(|_| invalid())?),
            "max_steps" => layer.max_steps = Some(digits.parse().map_err(|_| invalid())?),
            "timeout_ms" => layer.timeout_ms = Some(digits.parse().map_err(|_| invalid())?),
            _ => {}
        }
    }

    Ok(layer)
}

/// Environment overrides. Values that do not parse are logged and ignored.
fn env_layer(env: &dyn Fn(&str) -> Option<String>) -> Layer {
    Layer {
        tape_size: env_number(env, "BF_TAPE_SIZE"),
        loop_max: env_number(env, "BF_LOOP_MAX"),
        max_steps: env_number(env, "BF_MAX_STEPS"),
        timeout_ms: env_number(env, "BF_TIMEOUT_MS"),
    }
}

fn env_number<T: FromStr>(env: &dyn Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = env(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring invalid environment value (expected a non-negative integer)");
            None
        }
    }
}
