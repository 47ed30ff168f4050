use std::time::Duration;

use async_trait::async_trait;

use crate::light::color::Color;

/// The operations the wake-up engine needs from a light protocol client.
///
/// Implementations own the transport. The engine only ever drives one light through one
/// client at a time, so none of these methods are called concurrently.
#[async_trait]
pub trait LightClient: Send + Sync {
    /// A live, controllable light.
    type Handle: Send + Sync;

    /// Looks up a light by its protocol identifier.
    ///
    /// # Returns
    /// `Ok(None)` if the light has not been discovered (yet). Any `Err` is treated as
    /// non-recoverable by the caller.
    async fn find_by_id(&self, light_id: u64) -> anyhow::Result<Option<Self::Handle>>;

    /// Sets the colour of the light, fading over `fade`.
    async fn set_color(
        &self,
        light: &Self::Handle,
        color: Color,
        fade: Duration,
    ) -> anyhow::Result<()>;

    /// Switches the light on or off, fading over `fade`.
    async fn set_power(&self, light: &Self::Handle, on: bool, fade: Duration)
        -> anyhow::Result<()>;
}
