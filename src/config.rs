use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::client::ClientConfig;

pub(crate) const DEFAULT_URL: &str = "https://api.openstreetmap.org";
pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// One configuration source. Unset fields fall through to the next source.
#[derive(Debug, Default, PartialEq)]
struct Settings {
    url: Option<String>,
    user_agent: Option<String>,
    timeout: Option<Duration>,
    verify: Option<bool>,
}

impl Settings {
    fn or(self, fallback: Settings) -> Settings {
        Settings {
            url: self.url.or(fallback.url),
            user_agent: self.user_agent.or(fallback.user_agent),
            timeout: self.timeout.or(fallback.timeout),
            verify: self.verify.or(fallback.verify),
        }
    }

    fn finish(self) -> Result<ClientConfig> {
        let url = self.url.unwrap_or_else(|| DEFAULT_URL.to_string());
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            bail!("API url must start with http:// or https://, got {:?}", url);
        }

        Ok(ClientConfig {
            url,
            user_agent: self.user_agent.unwrap_or_else(default_user_agent),
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            verify: self.verify.unwrap_or(true),
        })
    }
}

pub(crate) fn default_user_agent() -> String {
    format!("osmchangesets-rs/{}", env!("CARGO_PKG_VERSION"))
}

pub(crate) fn load_config(url: Option<String>, user_agent: Option<String>) -> Result<ClientConfig> {
    let explicit = Settings {
        url,
        user_agent,
        ..Settings::default()
    };

    let env = Settings {
        url: env_value("OSM_API_URL"),
        user_agent: env_value("OSM_API_USER_AGENT"),
        timeout: match env_value("OSM_API_TIMEOUT") {
            Some(v) => Some(parse_timeout(&v).context("invalid OSM_API_TIMEOUT")?),
            None => None,
        },
        verify: None,
    };

    let rc = match rc_candidates().into_iter().find(|p| p.exists()) {
        Some(rc_path) => read_rc(&rc_path).with_context(|| {
            format!("failed to read configuration file {}", rc_path.display())
        })?,
        None => Settings::default(),
    };

    explicit.or(env).or(rc).finish()
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_timeout(value: &str) -> Result<Duration> {
    let secs: f64 = value
        .trim()
        .parse()
        .with_context(|| format!("timeout is not a number of seconds: {:?}", value))?;
    if !secs.is_finite() || secs <= 0.0 {
        bail!("timeout must be positive, got {}", secs);
    }
    Duration::try_from_secs_f64(secs)
        .with_context(|| format!("timeout of {} seconds is out of range", secs))
}

fn read_rc(path: &Path) -> Result<Settings> {
    let text = std::fs::read_to_string(path)?;
    parse_rc(&text)
}

fn parse_rc(text: &str) -> Result<Settings> {
    let mut cfg = Settings::default();

    for (lineno, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once(':') else {
            bail!("line {}: expected `key: value`", lineno + 1);
        };
        let k = k.trim();
        if k.is_empty() || !k.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            bail!("line {}: invalid key {:?}", lineno + 1, k);
        }
        let v = strip_quotes(v.trim());
        if v.is_empty() {
            continue;
        }
        match k {
            "url" => cfg.url = Some(v.to_string()),
            "user_agent" => cfg.user_agent = Some(v.to_string()),
            "timeout" => {
                cfg.timeout =
                    Some(parse_timeout(v).with_context(|| format!("line {}", lineno + 1))?)
            }
            "verify" => cfg.verify = Some(!matches!(v, "0" | "false" | "no")),
            _ => {}
        }
    }

    Ok(cfg)
}

fn strip_quotes(s: &str) -> &str {
    let s = s.trim();
    if (s.starts_with('"') && s.ends_with('"') && s.len() >= 2)
        || (s.starts_with('\'') && s.ends_with('\'') && s.len() >= 2)
    {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

fn rc_candidates() -> Vec<PathBuf> {
    // 1) OSM_API_RC (explicit)
    // 2) ./.osmchangesetsrc
    // 3) ~/.osmchangesetsrc
    if let Some(p) = env_value("OSM_API_RC") {
        return vec![PathBuf::from(p)];
    }

    let mut v = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        v.push(cwd.join(".osmchangesetsrc"));
    }
    if let Some(home) = dirs::home_dir() {
        v.push(home.join(".osmchangesetsrc"));
    }
    v
}
