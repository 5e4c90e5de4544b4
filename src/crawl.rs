use std::sync::LazyLock;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use regex::Regex;
use serde::Deserialize;
use tracing::info;

use crate::config::ScrapeConfig;
use crate::scraper::FetchError;

const MAX_POLLS: u32 = 60;
const POLL_INTERVAL: Duration = Duration::from_secs(2);

static HOST_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://(?:www\.)?([^/]+)").unwrap());

/// Handle for an asynchronous multi-page crawl. The submission returns only
/// an identifier; completion is observed by polling.
#[derive(Debug, Deserialize)]
pub struct CrawlJob {
    #[serde(rename = "jobId")]
    pub job_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlStatus {
    #[serde(default)]
    pub success: bool,
    pub status: String,
    #[serde(default)]
    pub completed: u64,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub credits_used: u64,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl CrawlStatus {
    pub fn is_done(&self) -> bool {
        self.status == "completed"
    }
}

/// Submit a crawl job scoped to the URL's own domain.
pub async fn start_crawl(
    http: &reqwest::Client,
    config: &ScrapeConfig,
    url: &str,
    limit: u32,
) -> Result<CrawlJob, FetchError> {
    let key = require_key(config)?;

    let mut crawler_options = serde_json::json!({ "maxDepth": 2, "limit": limit });
    if let Some(host) = host_of(url) {
        crawler_options["allowedDomains"] = serde_json::json!([host]);
    }
    let body = serde_json::json!({
        "url": url,
        "crawlerOptions": crawler_options,
        "pageOptions": {
            "formats": ["markdown", "html"],
            "excludeTags": ["script", "style"],
            "waitFor": 0
        }
    });

    let response = http
        .post(format!("{}/v0/crawl", config.api_base))
        .bearer_auth(key)
        .json(&body)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(FetchError::Backend(format!(
            "Crawl request failed: {}",
            response.status()
        )));
    }

    let value: serde_json::Value = response.json().await?;
    if !value.get("success").and_then(|s| s.as_bool()).unwrap_or(false) {
        let message = value
            .get("error")
            .and_then(|e| e.as_str())
            .unwrap_or("Crawl rejected")
            .to_string();
        return Err(FetchError::Backend(message));
    }

    let job: CrawlJob = serde_json::from_value(value)
        .map_err(|e| FetchError::Backend(format!("Malformed crawl response: {}", e)))?;
    info!("Crawl job {} started for {}", job.job_id, url);
    Ok(job)
}

/// One status check; repeated invocation is the caller's job.
pub async fn check_status(
    http: &reqwest::Client,
    config: &ScrapeConfig,
    job_id: &str,
) -> Result<CrawlStatus, FetchError> {
    let key = require_key(config)?;

    let response = http
        .get(format!("{}/v0/crawl/status/{}", config.api_base, job_id))
        .bearer_auth(key)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(FetchError::Backend(format!(
            "Status check failed: {}",
            response.status()
        )));
    }

    let status: CrawlStatus = response
        .json()
        .await
        .map_err(FetchError::Network)?;
    Ok(status)
}

/// Poll a job until it completes, fails, or the attempt cap runs out,
/// driving a progress bar in the meantime.
pub async fn wait_for_completion(
    http: &reqwest::Client,
    config: &ScrapeConfig,
    job_id: &str,
) -> Result<CrawlStatus, FetchError> {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40} {pos}/{len} pages")
            .unwrap()
            .progress_chars("=> "),
    );

    for _ in 0..MAX_POLLS {
        let status = check_status(http, config, job_id).await?;
        if status.total > 0 {
            pb.set_length(status.total);
            pb.set_position(status.completed);
        }
        if status.is_done() {
            pb.finish_and_clear();
            return Ok(status);
        }
        if status.status == "failed" {
            pb.finish_and_clear();
            return Err(FetchError::Backend(format!("Crawl job {} failed", job_id)));
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }

    pb.finish_and_clear();
    Err(FetchError::Backend(format!(
        "Crawl job {} did not complete after {} checks",
        job_id, MAX_POLLS
    )))
}

fn require_key(config: &ScrapeConfig) -> Result<&str, FetchError> {
    config
        .api_key
        .as_deref()
        .filter(|k| !k.is_empty())
        .ok_or(FetchError::MissingCredential)
}

fn host_of(url: &str) -> Option<String> {
    HOST_RE.captures(url).map(|caps| caps[1].to_string())
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_extraction() {
        assert_eq!(host_of("https://www.example.com/a/b").as_deref(), Some("example.com"));
        assert_eq!(host_of("http://acme.test").as_deref(), Some("acme.test"));
        assert_eq!(host_of("not a url"), None);
    }

    #[test]
    fn status_payload_deserializes() {
        let payload = serde_json::json!({
            "success": true,
            "status": "completed",
            "completed": 15,
            "total": 15,
            "creditsUsed": 5,
            "data": [{ "url": "https://example.com", "content": "hi" }]
        });
        let status: CrawlStatus = serde_json::from_value(payload).unwrap();
        assert!(status.is_done());
        assert_eq!(status.completed, 15);
        assert_eq!(status.credits_used, 5);
        assert!(status.data.is_some());
    }

    #[test]
    fn partial_status_uses_defaults() {
        let status: CrawlStatus =
            serde_json::from_value(serde_json::json!({ "status": "scraping" })).unwrap();
        assert!(!status.is_done());
        assert_eq!(status.total, 0);
        assert!(status.data.is_none());
    }

    #[test]
    fn job_id_field_renamed() {
        let job: CrawlJob =
            serde_json::from_value(serde_json::json!({ "success": true, "jobId": "abc" })).unwrap();
        assert_eq!(job.job_id, "abc");
    }

    #[tokio::test]
    async fn missing_key_rejected_before_network() {
        let http = reqwest::Client::new();
        let config = ScrapeConfig::default();
        let err = start_crawl(&http, &config, "https://example.com", 10)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::MissingCredential));
    }
}
