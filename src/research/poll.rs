//! Poll a task until it reaches a terminal state.
//!
//! The service gives no completion callback, so the client re-fetches the
//! task on an exponentially widening interval until it stops moving.

use std::time::{Duration, Instant};

use anyhow::{Result, bail};

use super::{Research, Task, TaskStatus};

pub struct PollConfig {
    /// Delay before the second status check.
    pub initial_interval: Duration,
    /// Ceiling for the backoff.
    pub max_interval: Duration,
    /// Interval growth factor per attempt.
    pub multiplier: f64,
    /// Give up after this much wall-clock time.
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_secs(1),
            max_interval: Duration::from_secs(10),
            multiplier: 1.5,
            timeout: Duration::from_secs(15 * 60),
        }
    }
}

/// The interval to wait after `current`, capped at the configured maximum.
pub fn next_interval(current: Duration, config: &PollConfig) -> Duration {
    let scaled = current.as_secs_f64() * config.multiplier;
    Duration::from_secs_f64(scaled.min(config.max_interval.as_secs_f64()))
}

/// Poll until the task reaches a terminal state.
///
/// A task that ends up `failed` or `canceled` is still returned; the
/// status is the caller's information, not an error of the polling itself.
pub async fn poll_task(research: &dyn Research, id: &str, config: &PollConfig) -> Result<Task> {
    poll_task_with(research, id, config, |_, _| {}).await
}

/// Like [`poll_task`], invoking `on_status` after every fetch with the
/// current status and elapsed time. Used by the CLI to drive the spinner.
pub async fn poll_task_with<F>(
    research: &dyn Research,
    id: &str,
    config: &PollConfig,
    mut on_status: F,
) -> Result<Task>
where
    F: FnMut(&TaskStatus, Duration) + Send,
{
    let started = Instant::now();
    let mut interval = config.initial_interval;

    loop {
        let task = research.get_task(id).await?;
        on_status(&task.status, started.elapsed());

        if task.status.is_terminal() {
            return Ok(task);
        }

        if started.elapsed() + interval > config.timeout {
            bail!(
                "task {} still {} after {:.0?} timeout",
                id,
                task.status,
                config.timeout
            );
        }

        tokio::time::sleep(interval).await;
        interval = next_interval(interval, config);
    }
}
