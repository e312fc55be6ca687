// Application configuration, loaded from environment variables and CLI flags.

use std::path::{Path, PathBuf};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_STATIC_DIR: &str = "static";

/// Application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Public URL learners reach this service at; launch URLs are built on it.
    pub base_url: String,
    /// Interface to bind the HTTP server to.
    pub host: String,
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Directory holding the landing page and static assets.
    /// When set, `/` serves `index.html` from it and `/static` serves the rest.
    /// Defaults to `./static` when that directory exists.
    pub static_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the process environment and arguments.
    ///
    /// Environment variables:
    /// - `BASE_URL` - public base URL (default: `http://127.0.0.1:8000`)
    /// - `HOST` - bind interface (default: `0.0.0.0`)
    /// - `PORT` - HTTP server port (default: 8000)
    /// - `STATIC_DIR` - directory with `index.html` and other static files
    ///   (default: `static`, if present)
    ///
    /// CLI flags:
    /// - `--port <PORT>` - Override the port
    /// - `--base-url <URL>` - Override the base URL
    pub fn load() -> Self {
        let args: Vec<String> = std::env::args().collect();
        Self::from_sources(&args, |key| std::env::var(key).ok())
    }

    /// Build a configuration from explicit arguments and an environment lookup.
    pub fn from_sources(args: &[String], env: impl Fn(&str) -> Option<String>) -> Self {
        // CLI flag takes precedence, then env var, then default
        let base_url = Self::parse_cli_value(args, "--base-url")
            .or_else(|| env("BASE_URL"))
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let host = env("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port = Self::parse_cli_value(args, "--port")
            .and_then(|v| v.parse().ok())
            .or_else(|| env("PORT").and_then(|v| v.parse().ok()))
            .unwrap_or(DEFAULT_PORT);

        let static_dir = resolve_static_dir(env("STATIC_DIR"), Path::new(DEFAULT_STATIC_DIR));

        Config {
            base_url,
            host,
            port,
            static_dir,
        }
    }

    /// Parse a CLI flag value like `--port 8080`.
    fn parse_cli_value(args: &[String], flag: &str) -> Option<String> {
        args.windows(2).find_map(|pair| {
            if pair[0] == flag {
                Some(pair[1].clone())
            } else {
                None
            }
        })
    }
}

/// An explicit directory always wins; otherwise the fallback is used only
/// if it exists.
pub fn resolve_static_dir(explicit: Option<String>, fallback: &Path) -> Option<PathBuf> {
    explicit
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .or_else(|| fallback.is_dir().then(|| fallback.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_sources(&args(&["provider"]), env_of(&[]));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn test_static_dir_falls_back_when_present() {
        let shipped = Path::new(env!("CARGO_MANIFEST_DIR")).join("static");
        assert_eq!(resolve_static_dir(None, &shipped), Some(shipped.clone()));
        assert_eq!(
            resolve_static_dir(Some("".into()), &shipped),
            Some(shipped.clone())
        );

        let missing = Path::new(env!("CARGO_MANIFEST_DIR")).join("no-such-dir");
        assert_eq!(resolve_static_dir(None, &missing), None);
        assert_eq!(
            resolve_static_dir(Some("assets".into()), &missing),
            Some(PathBuf::from("assets"))
        );
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::from_sources(
            &args(&["provider"]),
            env_of(&[
                ("BASE_URL", "https://activity-provider.example.com/"),
                ("PORT", "9000"),
                ("STATIC_DIR", "static"),
            ]),
        );
        assert_eq!(config.base_url, "https://activity-provider.example.com");
        assert_eq!(config.port, 9000);
        assert_eq!(config.static_dir, Some(PathBuf::from("static")));
    }

    #[test]
    fn test_cli_flags_win_over_env() {
        let config = Config::from_sources(
            &args(&["provider", "--port", "8081", "--base-url", "http://cli"]),
            env_of(&[("BASE_URL", "http://env"), ("PORT", "9000")]),
        );
        assert_eq!(config.port, 8081);
        assert_eq!(config.base_url, "http://cli");
    }

    #[test]
    fn test_unparseable_port_falls_back() {
        let config = Config::from_sources(&args(&["provider"]), env_of(&[("PORT", "eighty")]));
        assert_eq!(config.port, DEFAULT_PORT);
    }
}
