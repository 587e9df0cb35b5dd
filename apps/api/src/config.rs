use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::models::Template;
use crate::render::OverflowPolicy;

/// Application configuration loaded from environment variables.
/// Every variable has a default; only malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub export_dir: PathBuf,
    pub export_upscale: f32,
    pub export_overflow: OverflowPolicy,
    pub render_settle_timeout: Duration,
    pub allow_remote_images: bool,
    pub remote_image_timeout: Duration,
    pub font_sans_path: Option<PathBuf>,
    pub font_serif_path: Option<PathBuf>,
    pub initial_template: Template,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            export_dir: PathBuf::from("./exports"),
            export_upscale: 4.0,
            export_overflow: OverflowPolicy::Clip,
            render_settle_timeout: Duration::from_millis(5000),
            allow_remote_images: true,
            remote_image_timeout: Duration::from_millis(10_000),
            font_sans_path: None,
            font_serif_path: None,
            initial_template: Template::Modern,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup. `from_env` passes the process
    /// environment.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();

        let export_upscale = match lookup("EXPORT_UPSCALE") {
            Some(raw) => raw
                .parse::<f32>()
                .context("EXPORT_UPSCALE must be a number")?,
            None => defaults.export_upscale,
        };
        if !(export_upscale.is_finite() && export_upscale > 0.0) {
            return Err(anyhow!("EXPORT_UPSCALE must be positive, got {export_upscale}"));
        }

        Ok(Config {
            port: parse_or(&lookup, "PORT", defaults.port)
                .context("PORT must be a valid port number")?,
            rust_log: lookup("RUST_LOG").unwrap_or(defaults.rust_log),
            export_dir: lookup("EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.export_dir),
            export_upscale,
            export_overflow: parse_named(&lookup, "EXPORT_OVERFLOW", defaults.export_overflow)?,
            render_settle_timeout: millis_or(
                &lookup,
                "RENDER_SETTLE_TIMEOUT_MS",
                defaults.render_settle_timeout,
            )?,
            allow_remote_images: parse_or(&lookup, "ALLOW_REMOTE_IMAGES", true)
                .context("ALLOW_REMOTE_IMAGES must be true or false")?,
            remote_image_timeout: millis_or(
                &lookup,
                "REMOTE_IMAGE_TIMEOUT_MS",
                defaults.remote_image_timeout,
            )?,
            font_sans_path: lookup("FONT_SANS_PATH").map(PathBuf::from),
            font_serif_path: lookup("FONT_SERIF_PATH").map(PathBuf::from),
            initial_template: parse_named(&lookup, "INITIAL_TEMPLATE", defaults.initial_template)?,
        })
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => Ok(raw.trim().parse::<T>()?),
        None => Ok(default),
    }
}

/// For enums whose `FromStr` reports a plain message.
fn parse_named<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr<Err = String>,
{
    match lookup(key) {
        Some(raw) => raw.parse::<T>().map_err(|e| anyhow!("{key}: {e}")),
        None => Ok(default),
    }
}

fn millis_or(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: Duration,
) -> Result<Duration> {
    let ms = parse_or(lookup, key, default.as_millis() as u64)
        .with_context(|| format!("{key} must be a whole number of milliseconds"))?;
    Ok(Duration::from_millis(ms))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.export_upscale, 4.0);
        assert_eq!(config.export_overflow, OverflowPolicy::Clip);
        assert_eq!(config.render_settle_timeout, Duration::from_secs(5));
        assert!(config.allow_remote_images);
        assert_eq!(config.initial_template, Template::Modern);
        assert!(config.font_sans_path.is_none());
    }

    #[test]
    fn test_overrides_are_parsed() {
        let config = config_from(&[
            ("PORT", "9000"),
            ("EXPORT_DIR", "/tmp/out"),
            ("EXPORT_UPSCALE", "2"),
            ("EXPORT_OVERFLOW", "paginate"),
            ("RENDER_SETTLE_TIMEOUT_MS", "250"),
            ("ALLOW_REMOTE_IMAGES", "false"),
            ("FONT_SERIF_PATH", "/fonts/serif.ttf"),
            ("INITIAL_TEMPLATE", "minimal"),
        ])
        .unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.export_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.export_upscale, 2.0);
        assert_eq!(config.export_overflow, OverflowPolicy::Paginate);
        assert_eq!(config.render_settle_timeout, Duration::from_millis(250));
        assert!(!config.allow_remote_images);
        assert_eq!(config.font_serif_path, Some(PathBuf::from("/fonts/serif.ttf")));
        assert_eq!(config.initial_template, Template::Minimal);
    }

    #[test]
    fn test_malformed_values_fail() {
        assert!(config_from(&[("PORT", "eighty")]).is_err());
        assert!(config_from(&[("EXPORT_UPSCALE", "0")]).is_err());
        assert!(config_from(&[("EXPORT_OVERFLOW", "shrink")]).is_err());
        assert!(config_from(&[("INITIAL_TEMPLATE", "fancy")]).is_err());
        assert!(config_from(&[("RENDER_SETTLE_TIMEOUT_MS", "-5")]).is_err());
    }
}
