use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ImageGenerator;
use crate::error::{GenerationError, GenerationResult};

#[derive(Serialize)]
struct ImageStyle<'a> {
    prompt: &'a str,
}

#[derive(Serialize)]
struct ImageJobRequest<'a> {
    name: &'a str,
    image_count: u32,
    orientation: &'a str,
    style: ImageStyle<'a>,
}

#[derive(Deserialize)]
struct ImageJobResponse {
    #[serde(default)]
    id: Option<String>,
}

#[derive(Deserialize)]
struct ImageDownload {
    url: String,
}

#[derive(Deserialize)]
struct ImageProjectResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    downloads: Vec<ImageDownload>,
}

/// Provider-side lifecycle of an image project
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Draft,
    Queued,
    Rendering,
    Complete,
    Error,
    Canceled,
    Other(String),
}

impl JobStatus {
    pub fn parse(raw: &str) -> Self {
        match raw.to_lowercase().as_str() {
            "draft" => JobStatus::Draft,
            "queued" => JobStatus::Queued,
            "rendering" => JobStatus::Rendering,
            "complete" => JobStatus::Complete,
            "error" => JobStatus::Error,
            "canceled" | "cancelled" => JobStatus::Canceled,
            _ => JobStatus::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Draft => "draft",
            JobStatus::Queued => "queued",
            JobStatus::Rendering => "rendering",
            JobStatus::Complete => "complete",
            JobStatus::Error => "error",
            JobStatus::Canceled => "canceled",
            JobStatus::Other(raw) => raw,
        }
    }

    /// The provider will never complete this job.
    pub fn is_failed(&self) -> bool {
        matches!(self, JobStatus::Error | JobStatus::Canceled)
    }
}

/// Snapshot of an image job as returned by one status fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationJob {
    pub id: String,
    pub status: JobStatus,
    pub download_urls: Vec<String>,
}

impl GenerationJob {
    /// First downloadable asset, once the job is complete.
    pub fn asset_url(&self) -> Option<&str> {
        if self.status == JobStatus::Complete {
            self.download_urls.first().map(String::as_str)
        } else {
            None
        }
    }
}

#[derive(Clone)]
pub struct MagicHourClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl MagicHourClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn job_from_response(job_id: &str, response: ImageProjectResponse) -> GenerationJob {
        GenerationJob {
            id: job_id.to_string(),
            status: response
                .status
                .as_deref()
                .map(JobStatus::parse)
                .unwrap_or_else(|| JobStatus::Other(String::new())),
            download_urls: response.downloads.into_iter().map(|d| d.url).collect(),
        }
    }
}

#[async_trait]
impl ImageGenerator for MagicHourClient {
    async fn submit_image_job(&self, prompt: &str) -> GenerationResult<String> {
        let url = format!("{}/ai-image-generator", self.base_url);

        let request = ImageJobRequest {
            name: "generated-image",
            image_count: 1,
            orientation: "square",
            style: ImageStyle { prompt },
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::Submission(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(GenerationError::Submission(format!(
                "image API error {}: {}",
                status, text
            )));
        }

        let job: ImageJobResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Submission(e.to_string()))?;

        match job.id.filter(|id| !id.is_empty()) {
            Some(id) => {
                debug!(job_id = %id, "image job submitted");
                Ok(id)
            }
            None => Err(GenerationError::Submission(
                "image ID not returned".to_string(),
            )),
        }
    }

    async fn fetch_job_status(&self, job_id: &str) -> GenerationResult<GenerationJob> {
        let url = format!("{}/image-projects/{}", self.base_url, job_id);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| GenerationError::Fetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GenerationError::Fetch(format!(
                "image API error {}",
                response.status()
            )));
        }

        let project: ImageProjectResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Fetch(e.to_string()))?;

        Ok(Self::job_from_response(job_id, project))
    }
}
