use std::thread;
use std::time::Duration;

use anyhow::{Result, anyhow};
use tracing::{debug, info};

use crate::player::PlayerHost;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);
const READ_TIMEOUT: Duration = Duration::from_secs(5);
const REPORT_ATTEMPTS: usize = 3;
const RETRY_DELAY: Duration = Duration::from_millis(400);

fn should_retry_http_status(status: u16) -> bool {
    status == 408 || status == 429 || (500..=599).contains(&status)
}

pub(crate) fn post_json_with_retries(
    url: &str,
    body: &str,
    connect_timeout: Duration,
    read_timeout: Duration,
    attempts: usize,
    retry_delay: Duration,
) -> Result<String, String> {
    let attempts = attempts.max(1);

    for attempt in 1..=attempts {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(connect_timeout)
            .timeout_read(read_timeout)
            .timeout_write(read_timeout)
            .build();

        let request = agent
            .post(url)
            .set("Content-Type", "application/json")
            .set("Accept", "application/json");

        match request.send_string(body) {
            Ok(response) => match response.into_string() {
                Ok(body) => return Ok(body),
                Err(err) => {
                    return Err(format!("request failed: response decode failed: {err}"));
                }
            },
            Err(ureq::Error::Status(status, response)) => {
                let response_body = response.into_string().ok().unwrap_or_default();
                let body = response_body.trim();
                let status_error = if body.is_empty() {
                    format!("HTTP status {status}")
                } else {
                    let truncated = body.chars().take(240).collect::<String>();
                    format!("HTTP status {status} ({truncated})")
                };

                if should_retry_http_status(status) && attempt < attempts {
                    debug!(status, attempt, "retrying view report");
                    thread::sleep(retry_delay);
                    continue;
                }

                if should_retry_http_status(status) {
                    return Err(format!(
                        "request failed after {attempts} attempt(s): {status_error}"
                    ));
                }

                return Err(format!("request failed: {status_error}"));
            }
            Err(ureq::Error::Transport(err)) => {
                let transport_error = format!("transport error: {err}");
                if attempt < attempts {
                    debug!(attempt, error = %err, "retrying view report after transport error");
                    thread::sleep(retry_delay);
                    continue;
                }
                return Err(format!(
                    "request failed after {attempts} attempt(s): {transport_error}"
                ));
            }
        }
    }

    Err("request failed: exhausted attempts without a concrete error".to_string())
}

/// Builds `{base}/videos/{id}/view`, escaping the id as one path segment.
pub(crate) fn view_endpoint(base_url: &str, video_id: &str) -> String {
    format!(
        "{}/videos/{}/view",
        base_url.trim_end_matches('/'),
        urlencoding::encode(video_id)
    )
}

/// Sends counted views to the video backend.
#[derive(Debug, Clone)]
pub(crate) struct HttpViewReporter {
    base_url: String,
    attempts: usize,
    retry_delay: Duration,
}

impl HttpViewReporter {
    pub(crate) fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            attempts: REPORT_ATTEMPTS,
            retry_delay: RETRY_DELAY,
        }
    }

    #[cfg(test)]
    fn with_retry(mut self, attempts: usize, retry_delay: Duration) -> Self {
        self.attempts = attempts;
        self.retry_delay = retry_delay;
        self
    }

    pub(crate) fn report_view(&self, video_id: &str) -> Result<()> {
        let url = view_endpoint(&self.base_url, video_id);
        let body = serde_json::json!({ "video_id": video_id }).to_string();
        post_json_with_retries(
            &url,
            &body,
            CONNECT_TIMEOUT,
            READ_TIMEOUT,
            self.attempts,
            self.retry_delay,
        )
        .map_err(|err| anyhow!("view report for {video_id} failed: {err}"))?;
        info!(video_id, "view reported");
        Ok(())
    }
}

impl PlayerHost for HttpViewReporter {
    fn on_view(&mut self, video_id: &str) -> Result<()> {
        self.report_view(video_id)
    }
}
