use std::time::Duration;

use log::debug;
use tokio::time::sleep;

use crate::error::WakeupError;
use crate::light::color::Color;
use crate::util::traits::LightClient;

/// Pause between setting the baseline colour and powering on, so the light does not flash
/// its previous colour.
pub const POWER_ON_DELAY: Duration = Duration::from_millis(500);

/// Puts the light into `baseline` and switches it on, both without fading.
///
/// Neither command is retried.
pub async fn initialize_light<C>(
    client: &C,
    light: &C::Handle,
    baseline: Color,
) -> Result<(), WakeupError>
where
    C: LightClient + ?Sized,
{
    debug!("Setting baseline colour {:?}", baseline);
    client
        .set_color(light, baseline, Duration::ZERO)
        .await
        .map_err(|source| WakeupError::DeviceCommandFailed {
            command: "set_color",
            source,
        })?;

    sleep(POWER_ON_DELAY).await;

    debug!("Switching light on");
    client
        .set_power(light, true, Duration::ZERO)
        .await
        .map_err(|source| WakeupError::DeviceCommandFailed {
            command: "set_power",
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wakeup::mock::{Call, MockClient};
    use tokio::time::Instant;

    const BASELINE: Color = Color::new(0, 65535, 0, 2500);

    #[tokio::test(start_paused = true)]
    async fn test_color_then_power() {
        let client = MockClient::found();
        let start = Instant::now();

        initialize_light(&client, &1, BASELINE).await.unwrap();

        let calls = client.calls();
        assert_eq!(
            calls,
            vec![
                Call::SetColor {
                    color: BASELINE,
                    fade: Duration::ZERO,
                    at: start,
                },
                Call::SetPower {
                    on: true,
                    fade: Duration::ZERO,
                    at: start + POWER_ON_DELAY,
                },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_color_failure_skips_power() {
        let client = MockClient {
            fail_set_color: true,
            ..MockClient::found()
        };

        let error = initialize_light(&client, &1, BASELINE).await.unwrap_err();

        assert!(matches!(
            error,
            WakeupError::DeviceCommandFailed {
                command: "set_color",
                ..
            }
        ));
        assert!(client.power_calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_power_failure() {
        let client = MockClient {
            fail_set_power: true,
            ..MockClient::found()
        };

        let error = initialize_light(&client, &1, BASELINE).await.unwrap_err();

        assert!(matches!(
            error,
            WakeupError::DeviceCommandFailed {
                command: "set_power",
                ..
            }
        ));
        assert_eq!(client.color_calls().len(), 1);
    }
}
