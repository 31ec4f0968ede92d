use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::Client as HttpClient;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use std::time::Duration;
use tracing::{debug, warn};

use crate::changeset::Changeset;
use crate::config::load_config;
use crate::error::{Error, Result, status_error};
use crate::query::ChangesetQuery;
use crate::util::{append_query, api_url, truncate_for_log};

/// Largest page the changesets endpoint serves.
pub const MAX_LIMIT: usize = 100;
pub const DEFAULT_LIMIT: usize = MAX_LIMIT;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base API URL, typically `https://api.openstreetmap.org`.
    pub url: String,
    /// Sent as `User-Agent`; the OSM usage policy asks for an identifying one.
    pub user_agent: String,
    pub timeout: Duration,
    /// Whether to verify TLS certificates.
    pub verify: bool,
}

/// Blocking client for the changeset read endpoints.
///
/// Every call is a single request: no retries, no caching, no paging.
#[derive(Debug, Clone)]
pub struct Client {
    url: String,
    progress: bool,

    http: HttpClient,
}

impl Client {
    /// Creates a client using environment variables and/or `.osmchangesetsrc`.
    ///
    /// This is equivalent to `Client::new(None, None)`.
    pub fn from_env() -> Result<Self> {
        Self::new(None, None)
    }

    /// Creates a client using (in order of precedence):
    /// - explicit `url`/`user_agent` arguments
    /// - environment variables `OSM_API_URL` / `OSM_API_USER_AGENT` / `OSM_API_TIMEOUT`
    /// - config file from `OSM_API_RC` or `.osmchangesetsrc`
    /// - the public OSM API
    pub fn new(url: Option<String>, user_agent: Option<String>) -> Result<Self> {
        let cfg = load_config(url, user_agent)?;
        Self::with_config(cfg)
    }

    pub fn with_config(cfg: ClientConfig) -> Result<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&cfg.user_agent)
                .with_context(|| format!("invalid user agent {:?}", cfg.user_agent))?,
        );
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = HttpClient::builder()
            .default_headers(default_headers)
            .timeout(cfg.timeout);

        if !cfg.verify {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let http = builder.build().context("failed to build HTTP client")?;

        Ok(Self {
            url: cfg.url,
            progress: false,
            http,
        })
    }

    /// Shows a progress bar on stderr during [`Client::get_changesets`].
    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.url
    }

    /// Fetches one changeset: `GET /api/0.6/changeset/{id}.json`.
    pub fn get_changeset(&self, id: u64) -> Result<Changeset> {
        let url = api_url(&self.url, &format!("changeset/{}.json", id));
        let body = self.get_text(&url)?;
        Changeset::normalize(body.as_str())
    }

    /// Fetches changesets one after another, in the order given.
    ///
    /// The first failure abandons the batch and names the offending id;
    /// nothing fetched so far is returned.
    pub fn get_changesets(&self, ids: &[u64]) -> Result<Vec<Changeset>> {
        let pb = self.progress.then(|| batch_progress(ids.len() as u64));

        let mut out = Vec::with_capacity(ids.len());
        for &id in ids {
            match self.get_changeset(id) {
                Ok(changeset) => out.push(changeset),
                Err(e) => {
                    if let Some(pb) = &pb {
                        pb.abandon();
                    }
                    return Err(Error::Changeset {
                        id,
                        source: Box::new(e),
                    });
                }
            }
            if let Some(pb) = &pb {
                pb.inc(1);
            }
        }

        if let Some(pb) = &pb {
            pb.finish_and_clear();
        }
        Ok(out)
    }

    /// Queries `GET /api/0.6/changesets.json` with the given filters.
    ///
    /// Filter validation happens when the [`ChangesetQuery`] is built, so an
    /// invalid bounding box never reaches this call.
    pub fn query_changesets(&self, query: &ChangesetQuery) -> Result<Vec<Changeset>> {
        let url = append_query(&api_url(&self.url, "changesets.json"), &query.query_string());
        self.get_list(&url)
    }

    /// The `limit` most recent changesets, newest first.
    pub fn latest_changesets(&self, limit: usize) -> Result<Vec<Changeset>> {
        if limit == 0 || limit > MAX_LIMIT {
            return Err(Error::InvalidArgument(format!(
                "limit must be between 1 and {}, got {}",
                MAX_LIMIT, limit
            )));
        }
        let url = append_query(
            &api_url(&self.url, "changesets.json"),
            &format!("limit={}", limit),
        );
        self.get_list(&url)
    }

    fn get_list(&self, url: &str) -> Result<Vec<Changeset>> {
        let body = self.get_text(url)?;
        let changesets = Changeset::list_from_json(&body)?;
        debug!(url, count = changesets.len(), "parsed changeset list");
        Ok(changesets)
    }

    fn get_text(&self, url: &str) -> Result<String> {
        debug!(url, "GET");
        let resp = self.http.get(url).send().map_err(|source| Error::Transport {
            url: url.to_string(),
            source,
        })?;

        let status = resp.status();
        let headers = resp.headers().clone();
        let text = resp.text().map_err(|source| Error::Transport {
            url: url.to_string(),
            source,
        })?;

        if !status.is_success() {
            warn!(
                url,
                status = status.as_u16(),
                body = truncate_for_log(&text, 200),
                "request failed"
            );
            return Err(status_error(status, url, &headers, &text));
        }

        Ok(text)
    }
}

fn batch_progress(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    let style = ProgressStyle::with_template("{spinner:.green} changesets {pos}/{len} {wide_bar} {eta}")
        .map(|s| s.progress_chars("=>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}
