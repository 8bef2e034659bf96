//! Decoder configuration.
//!
//! Reads/writes `~/.squitter/config.yaml`: decode mode, CPR pair window,
//! local-decode reference age and the optional receiver location.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::cpr::MAX_PAIR_AGE;
use crate::error::{DecodeError, Result};
use crate::types::Position;

/// Default maximum age of a resolved position used as a local-decode reference.
pub const MAX_REFERENCE_AGE: f64 = 180.0;

/// How strictly a message must decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodeMode {
    /// Header-only messages are records; CPR failures are reported in the record.
    #[default]
    Lenient,
    /// Header-only messages and CPR failures are errors.
    Full,
}

impl fmt::Display for DecodeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeMode::Lenient => write!(f, "lenient"),
            DecodeMode::Full => write!(f, "full"),
        }
    }
}

impl FromStr for DecodeMode {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "lenient" => Ok(DecodeMode::Lenient),
            "full" => Ok(DecodeMode::Full),
            other => Err(DecodeError::Config(format!("unknown decode mode {other:?}"))),
        }
    }
}

/// Full configuration structure.
#[derive(Debug, Clone, PartialEq)]
pub struct DecoderConfig {
    pub mode: DecodeMode,
    /// Maximum seconds between the even and odd frame of a global-decode pair.
    pub pair_window_secs: f64,
    /// Maximum age in seconds of a track position used for local decode.
    pub reference_max_age_secs: f64,
    /// Receiver location, used as a local-decode reference of last resort.
    pub receiver: Option<Position>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        DecoderConfig {
            mode: DecodeMode::Lenient,
            pair_window_secs: MAX_PAIR_AGE,
            reference_max_age_secs: MAX_REFERENCE_AGE,
            receiver: None,
        }
    }
}

/// Get the config directory path (`~/.squitter/`).
pub fn config_dir() -> PathBuf {
    dirs_home().join(".squitter")
}

/// Get the config file path.
pub fn config_file() -> PathBuf {
    config_dir().join("config.yaml")
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Load config from `~/.squitter/config.yaml`.
pub fn load_config() -> Result<DecoderConfig> {
    load_config_from(&config_file())
}

/// Load config from `path`. Returns defaults if the file doesn't exist.
pub fn load_config_from(path: &Path) -> Result<DecoderConfig> {
    if !path.exists() {
        return Ok(DecoderConfig::default());
    }
    let text = std::fs::read_to_string(path)?;
    parse_config(&text)
}

/// Save config to `~/.squitter/config.yaml`.
pub fn save_config(config: &DecoderConfig) -> Result<PathBuf> {
    let path = config_file();
    save_config_to(config, &path)?;
    Ok(path)
}

pub fn save_config_to(config: &DecoderConfig, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(path, serialize_config(config))?;
    Ok(())
}

/// Parse simple YAML-like config text.
pub fn parse_config(text: &str) -> Result<DecoderConfig> {
    let mut config = DecoderConfig::default();
    let mut current_section: Option<String> = None;
    let mut receiver_lat = None;
    let mut receiver_lon = None;

    for line in text.lines() {
        let stripped = line.trim();
        if stripped.is_empty() || stripped.starts_with('#') {
            continue;
        }

        let is_indented = line.starts_with("  ") || line.starts_with('\t');

        let Some((key, val)) = stripped.split_once(':') else {
            return Err(DecodeError::Config(format!("malformed line: {stripped:?}")));
        };
        let key = key.trim();
        let val = val.trim();

        if !is_indented {
            current_section = Some(key.to_string());
            continue;
        }

        match (current_section.as_deref(), key) {
            (Some("decoder"), "mode") => {
                if let Some(v) = parse_string_value(val) {
                    config.mode = v.parse()?;
                }
            }
            (Some("decoder"), "pair_window") => {
                config.pair_window_secs = parse_positive(key, val)?;
            }
            (Some("decoder"), "reference_max_age") => {
                config.reference_max_age_secs = parse_positive(key, val)?;
            }
            (Some("receiver"), "lat") => receiver_lat = parse_float_value(key, val)?,
            (Some("receiver"), "lon") => receiver_lon = parse_float_value(key, val)?,
            _ => {}
        }
    }

    config.receiver = match (receiver_lat, receiver_lon) {
        (Some(lat), Some(lon)) => Some(validate_receiver(lat, lon)?),
        (None, None) => None,
        _ => {
            return Err(DecodeError::Config(
                "receiver needs both lat and lon".into(),
            ))
        }
    };

    Ok(config)
}

/// Check a receiver location is a real coordinate.
pub fn validate_receiver(lat: f64, lon: f64) -> Result<Position> {
    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
        return Err(DecodeError::Config(format!(
            "receiver position {lat}, {lon} out of range"
        )));
    }
    Ok(Position::new(lat, lon))
}

fn parse_string_value(val: &str) -> Option<String> {
    if val == "null" || val == "~" || val.is_empty() {
        return None;
    }
    // Strip quotes
    if val.len() >= 2
        && ((val.starts_with('"') && val.ends_with('"'))
            || (val.starts_with('\'') && val.ends_with('\'')))
    {
        return Some(val[1..val.len() - 1].to_string());
    }
    Some(val.to_string())
}

fn parse_float_value(key: &str, val: &str) -> Result<Option<f64>> {
    if val == "null" || val == "~" || val.is_empty() {
        return Ok(None);
    }
    val.parse()
        .map(Some)
        .map_err(|_| DecodeError::Config(format!("{key}: not a number: {val:?}")))
}

fn parse_positive(key: &str, val: &str) -> Result<f64> {
    match parse_float_value(key, val)? {
        Some(v) if v > 0.0 && v.is_finite() => Ok(v),
        _ => Err(DecodeError::Config(format!(
            "{key}: expected a positive number, got {val:?}"
        ))),
    }
}

/// Serialize config to YAML-like text.
fn serialize_config(config: &DecoderConfig) -> String {
    let mut lines = vec!["# squitter configuration".to_string(), String::new()];

    lines.push("decoder:".into());
    lines.push(format!("  mode: {}", config.mode));
    lines.push(format!("  pair_window: {}", config.pair_window_secs));
    lines.push(format!(
        "  reference_max_age: {}",
        config.reference_max_age_secs
    ));
    lines.push(String::new());

    lines.push("receiver:".into());
    match config.receiver {
        Some(pos) => {
            lines.push(format!("  lat: {}", pos.lat));
            lines.push(format!("  lon: {}", pos.lon));
        }
        None => {
            lines.push("  lat: null".into());
            lines.push("  lon: null".into());
        }
    }

    lines.join("\n") + "\n"
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DecoderConfig::default();
        assert_eq!(config.mode, DecodeMode::Lenient);
        assert_eq!(config.pair_window_secs, 10.0);
        assert_eq!(config.reference_max_age_secs, 180.0);
        assert!(config.receiver.is_none());
    }

    #[test]
    fn test_parse_config() {
        let text = r#"
decoder:
  mode: full
  pair_window: 5.5
  reference_max_age: 60

receiver:
  lat: 52.3
  lon: 4.76
"#;
        let config = parse_config(text).unwrap();
        assert_eq!(config.mode, DecodeMode::Full);
        assert_eq!(config.pair_window_secs, 5.5);
        assert_eq!(config.reference_max_age_secs, 60.0);
        assert_eq!(config.receiver, Some(Position::new(52.3, 4.76)));
    }

    #[test]
    fn test_parse_config_null_values() {
        let text = "receiver:\n  lat: null\n  lon: ~\n";
        let config = parse_config(text).unwrap();
        assert!(config.receiver.is_none());
    }

    #[test]
    fn test_parse_config_half_receiver() {
        let text = "receiver:\n  lat: 52.3\n";
        assert!(matches!(parse_config(text), Err(DecodeError::Config(_))));
    }

    #[test]
    fn test_parse_config_bad_values() {
        assert!(parse_config("decoder:\n  pair_window: soon\n").is_err());
        assert!(parse_config("decoder:\n  pair_window: -1\n").is_err());
        assert!(parse_config("decoder:\n  mode: strict\n").is_err());
        assert!(parse_config("receiver:\n  lat: 95\n  lon: 0\n").is_err());
        assert!(parse_config("just words\n").is_err());
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let config = parse_config("decoder:\n  colour: blue\nother: 1\n").unwrap();
        assert_eq!(config, DecoderConfig::default());
    }

    #[test]
    fn test_roundtrip() {
        let config = DecoderConfig {
            mode: DecodeMode::Full,
            pair_window_secs: 8.0,
            reference_max_age_secs: 120.0,
            receiver: Some(Position::new(35.5, -82.5)),
        };
        let parsed = parse_config(&serialize_config(&config)).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config, DecoderConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");
        let config = DecoderConfig {
            receiver: Some(Position::new(-33.9, 151.2)),
            ..DecoderConfig::default()
        };
        save_config_to(&config, &path).unwrap();
        assert_eq!(load_config_from(&path).unwrap(), config);
    }
}
