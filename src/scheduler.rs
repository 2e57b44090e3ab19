//! Daily digest scheduler.
//!
//! A plain sleep loop: compute the next occurrence of the configured UTC
//! time, sleep until then, run the digest, repeat. Errors are logged and
//! the loop continues; a failed delivery never takes the server down.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveTime, Utc};
use tracing::{error, info};

use crate::config::DigestSettings;
use crate::digest::DigestJob;

/// Spawn the daily digest loop. Returns the task handle; the caller keeps
/// the server alive, so the handle is usually dropped.
pub fn spawn_daily(job: Arc<DigestJob>, settings: DigestSettings) -> tokio::task::JoinHandle<()> {
    info!(
        hour = settings.hour,
        minute = settings.minute,
        use_ai = settings.use_ai,
        "Digest scheduler started"
    );

    tokio::spawn(async move {
        loop {
            let wait = until_next(Utc::now(), settings.hour, settings.minute);
            info!(seconds = wait.as_secs(), "Next digest scheduled");
            tokio::time::sleep(wait).await;

            if let Err(e) = job.send_daily().await {
                error!(error = %format!("{:#}", e), "Daily digest failed");
            }
        }
    })
}

/// Duration from `now` until the next `hour:minute` UTC, always in the
/// future (tomorrow if today's slot already passed).
fn until_next(now: DateTime<Utc>, hour: u32, minute: u32) -> Duration {
    let target_time = NaiveTime::from_hms_opt(hour, minute, 0)
        .unwrap_or_else(|| NaiveTime::from_hms_opt(20, 0, 0).unwrap());

    let today_target = now.date_naive().and_time(target_time).and_utc();
    let next = if today_target > now {
        today_target
    } else {
        today_target + chrono::Duration::days(1)
    };

    (next - now).to_std().unwrap_or(Duration::from_secs(60))
}
