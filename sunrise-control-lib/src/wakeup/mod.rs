//! The wake-up control loop: find the light, bring it to its baseline, then walk it through
//! the configured transitions.

use log::{debug, info};
use tokio::time::{sleep, Instant};

use crate::config::WakeupConfig;
use crate::error::WakeupError;
use crate::util::traits::LightClient;

pub mod acquire;
pub mod initialize;
#[cfg(test)]
pub(crate) mod mock;

pub use acquire::{acquire_device, AcquireTiming};
pub use initialize::initialize_light;

/// Runs one wake-up against `client` with the default acquisition timing.
pub async fn run_wakeup<C>(client: &C, config: &WakeupConfig) -> Result<(), WakeupError>
where
    C: LightClient + ?Sized,
{
    run_wakeup_with_timing(client, config, &AcquireTiming::default()).await
}

/**
Runs one wake-up against `client`.

The loop sleeps first and samples after, so the baseline colour stays on for the whole
first update interval. Every update fades over one interval, which makes consecutive
updates blend into a continuous ramp.
 */
pub async fn run_wakeup_with_timing<C>(
    client: &C,
    config: &WakeupConfig,
    timing: &AcquireTiming,
) -> Result<(), WakeupError>
where
    C: LightClient + ?Sized,
{
    let light = acquire_device(client, config.light_id, timing).await?;
    initialize_light(client, &light, config.initial_color).await?;

    let interval = config.update_interval();
    let start_time = Instant::now();
    let end_time = start_time + config.duration();
    info!(
        "Starting wake-up of {:?}, updating every {:?}",
        config.duration(),
        interval
    );

    while Instant::now() < end_time {
        sleep(interval).await;
        let offset = start_time.elapsed().as_secs();
        let color = config.color_at(offset);
        debug!("Offset {}s: {:?}", offset, color);
        client
            .set_color(&light, color, interval)
            .await
            .map_err(|source| WakeupError::DeviceCommandFailed {
                command: "set_color",
                source,
            })?;
    }

    // TODO: decide on a final "fully on" state once its target values are known
    info!("Wake-up window elapsed");
    Ok(())
}
