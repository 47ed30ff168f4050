use std::time::Duration;

use log::{debug, info};
use tokio::time::{sleep, Instant};

use crate::error::WakeupError;
use crate::util::traits::LightClient;

/// Timing of [`acquire_device`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquireTiming {
    /// Wait before the first lookup, so passive discovery can populate.
    pub settle: Duration,
    /// How long to keep polling after the settle period.
    pub timeout: Duration,
    /// Wait between a "not found" answer and the next lookup.
    pub backoff: Duration,
}

impl Default for AcquireTiming {
    fn default() -> Self {
        AcquireTiming {
            settle: Duration::from_secs(2),
            timeout: Duration::from_secs(10),
            backoff: Duration::from_secs(1),
        }
    }
}

/**
Resolves `light_id` to a live handle.

Lookups that come back empty are retried after [`AcquireTiming::backoff`] until
[`AcquireTiming::timeout`] has passed. Any lookup error aborts right away.
 */
pub async fn acquire_device<C>(
    client: &C,
    light_id: u64,
    timing: &AcquireTiming,
) -> Result<C::Handle, WakeupError>
where
    C: LightClient + ?Sized,
{
    debug!(
        "Waiting {:?} for light {:#x} to be discovered",
        timing.settle, light_id
    );
    sleep(timing.settle).await;

    let timeout_end = Instant::now() + timing.timeout;
    let mut attempt = 0;
    while Instant::now() < timeout_end {
        attempt += 1;
        match client.find_by_id(light_id).await {
            Ok(Some(light)) => {
                info!("Found light {:#x} after {} lookup(s)", light_id, attempt);
                return Ok(light);
            }
            Ok(None) => {
                debug!(
                    "Light {:#x} not found yet (lookup {}), retrying in {:?}",
                    light_id, attempt, timing.backoff
                );
                sleep(timing.backoff).await;
            }
            Err(source) => {
                debug!(
                    "Lookup {} of light {:#x} failed, giving up: {:#}",
                    attempt, light_id, source
                );
                return Err(WakeupError::UnexpectedProtocol { light_id, source });
            }
        }
    }

    debug!(
        "Light {:#x} not found after {} lookup(s) within {:?}",
        light_id, attempt, timing.timeout
    );
    Err(WakeupError::AcquisitionTimeout {
        light_id,
        timeout: timing.timeout,
    })
}
