//! Bounded polling of image jobs
//!
//! Fixed interval, fixed attempt budget, no backoff. Time is taken from an
//! injected [`Clock`] so tests never sleep.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

use crate::ai::{ImageGenerator, JobStatus};
use crate::error::{GenerationError, GenerationResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl PollPolicy {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }

    /// Upper bound on time spent waiting between fetches.
    pub fn max_wait(&self) -> Duration {
        self.interval * self.max_attempts.saturating_sub(1)
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::new(Duration::from_secs(5), 10)
    }
}

#[async_trait]
pub trait Clock: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Real timers backed by the tokio runtime
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Fetch the job until it yields an asset URL, fails, or the attempt budget
/// runs out. `on_attempt` sees every fetched status, numbered from 1.
pub async fn poll_job<F>(
    images: &dyn ImageGenerator,
    job_id: &str,
    policy: &PollPolicy,
    clock: &dyn Clock,
    mut on_attempt: F,
) -> GenerationResult<String>
where
    F: FnMut(u32, &JobStatus) + Send,
{
    for attempt in 1..=policy.max_attempts {
        let job = images.fetch_job_status(job_id).await?;
        on_attempt(attempt, &job.status);

        if let Some(url) = job.asset_url() {
            debug!(job_id, attempt, "image job complete");
            return Ok(url.to_string());
        }

        if job.status.is_failed() {
            warn!(job_id, status = job.status.as_str(), "image job failed on provider");
            return Err(GenerationError::JobFailed {
                status: job.status.as_str().to_string(),
            });
        }

        debug!(job_id, attempt, status = job.status.as_str(), "image job not ready");

        if attempt < policy.max_attempts {
            clock.sleep(policy.interval).await;
        }
    }

    Err(GenerationError::Timeout {
        attempts: policy.max_attempts,
    })
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::ai::GenerationJob;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Records requested sleeps and returns immediately.
    #[derive(Default)]
    pub struct RecordingClock {
        pub sleeps: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl Clock for RecordingClock {
        async fn sleep(&self, duration: Duration) {
            self.sleeps.lock().unwrap().push(duration);
        }
    }

    /// Serves a scripted sequence of job snapshots.
    #[derive(Default)]
    pub struct ScriptedImages {
        pub submit_result: Mutex<Option<GenerationResult<String>>>,
        pub statuses: Mutex<VecDeque<GenerationResult<GenerationJob>>>,
        pub submits: AtomicUsize,
        pub fetches: AtomicUsize,
    }

    impl ScriptedImages {
        pub fn with_statuses(statuses: Vec<GenerationResult<GenerationJob>>) -> Self {
            Self {
                submit_result: Mutex::new(Some(Ok("job-1".to_string()))),
                statuses: Mutex::new(statuses.into()),
                ..Self::default()
            }
        }

        pub fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }

        pub fn submit_count(&self) -> usize {
            self.submits.load(Ordering::SeqCst)
        }
    }

    pub fn job(status: &str, urls: &[&str]) -> GenerationResult<GenerationJob> {
        Ok(GenerationJob {
            id: "job-1".to_string(),
            status: JobStatus::parse(status),
            download_urls: urls.iter().map(|u| u.to_string()).collect(),
        })
    }

    #[async_trait]
    impl ImageGenerator for ScriptedImages {
        async fn submit_image_job(&self, _prompt: &str) -> GenerationResult<String> {
            self.submits.fetch_add(1, Ordering::SeqCst);
            self.submit_result
                .lock()
                .unwrap()
                .take()
                .unwrap_or_else(|| Ok("job-1".to_string()))
        }

        async fn fetch_job_status(&self, _job_id: &str) -> GenerationResult<GenerationJob> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.statuses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| job("pending", &[]))
        }
    }
}
