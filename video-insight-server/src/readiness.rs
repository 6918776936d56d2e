//! Readiness polling for uploaded videos.
//!
//! Uploaded videos start out `PROCESSING`. They are refreshed at a fixed
//! interval, without backoff, until they leave that state or the attempt
//! budget runs out.

use std::time::Duration;
use tracing::{debug, info, warn};
use video_insight_common::error::Error;

use crate::files::{FileService, FileState, RemoteFile};

/// Delay between two status refreshes.
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Maximum number of status refreshes.
pub const MAX_POLL_ATTEMPTS: u32 = 30;

/// Fixed-interval polling policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Delay before each refresh
    pub interval: Duration,
    /// Maximum number of refreshes
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: POLL_INTERVAL,
            max_attempts: MAX_POLL_ATTEMPTS,
        }
    }
}

impl PollPolicy {
    /// Upper bound on the time spent sleeping.
    pub fn budget(&self) -> Duration {
        self.interval * self.max_attempts
    }
}

/// Wait until `file` is `ACTIVE`.
///
/// While the file is `PROCESSING` and attempts remain, sleeps for the policy
/// interval and refreshes it; `on_state` sees every refreshed state. Returns
/// the active file, or `Error::FileNotReady` carrying the final state. A
/// refresh that fails at the HTTP level aborts the wait with that error.
pub async fn wait_until_active<F>(
    files: &dyn FileService,
    mut file: RemoteFile,
    policy: PollPolicy,
    mut on_state: F,
) -> Result<RemoteFile, Error>
where
    F: FnMut(FileState) + Send,
{
    let mut attempts = 0;

    while file.state == FileState::Processing && attempts < policy.max_attempts {
        tokio::time::sleep(policy.interval).await;
        attempts += 1;

        file = files.get(&file.name).await?;
        debug!(file = %file.name, attempt = attempts, state = %file.state, "Polled file state");
        on_state(file.state);
    }

    if file.state != FileState::Active {
        warn!(file = %file.name, attempts, state = %file.state, "File did not become active");
        return Err(Error::file_not_ready(file.state.as_str()));
    }

    info!(file = %file.name, attempts, "File is active");
    Ok(file)
}
