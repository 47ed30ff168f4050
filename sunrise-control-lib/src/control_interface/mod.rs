use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{anyhow, bail, Context};
use async_trait::async_trait;
use lifx_core::{BuildOptions, Message, RawMessage};
use log::debug;
use rand::Rng;
use tokio::net::UdpSocket;
use tokio::time::{timeout, Instant};

use crate::light::color::Color;
use crate::util::discovery::{DeviceIdentifier, Discovery, BROADCAST_ADDRESS};
use crate::util::traits::LightClient;

/// How long a lookup listens for service announcements.
const DISCOVERY_WINDOW: Duration = Duration::from_millis(500);
/// How long to wait for a light to acknowledge a command.
const ACK_TIMEOUT: Duration = Duration::from_secs(1);
/// How often a command is sent before giving up on an acknowledgement.
const ACK_ATTEMPTS: u32 = 3;

/// Power level of a light that is on.
const POWER_ON: u16 = u16::MAX;

/**
A [`LightClient`] talking the LIFX LAN protocol over UDP.

Every light that answers a discovery probe is remembered, so a light seen once stays
reachable even if it misses a later probe. Commands are sent with `ack_required` and
retransmitted until the light acknowledges them.
 */
pub struct LifxClient {
    socket: UdpSocket,
    source: u32,
    sequence: AtomicU8,
    ack_timeout: Duration,
    broadcast_address: SocketAddr,
    devices: Mutex<HashSet<DeviceIdentifier>>,
}

impl LifxClient {
    /// Binds a broadcast socket and starts discovery right away, so lights have a head start
    /// on answering before the first lookup.
    pub async fn connect() -> anyhow::Result<Self> {
        let client = Self::with_socket(Discovery::bind_broadcast_socket().await?);
        Discovery::send_probe(&client.socket, client.source, client.broadcast_address).await?;
        Ok(client)
    }

    /// Wraps an already bound socket. No probe is sent.
    pub fn with_socket(socket: UdpSocket) -> Self {
        LifxClient {
            socket,
            // 0 and 1 are reserved by the protocol
            source: rand::thread_rng().gen_range(2..=u32::MAX),
            sequence: AtomicU8::new(0),
            ack_timeout: ACK_TIMEOUT,
            broadcast_address: BROADCAST_ADDRESS,
            devices: Mutex::new(HashSet::new()),
        }
    }

    pub fn with_ack_timeout(mut self, ack_timeout: Duration) -> Self {
        self.ack_timeout = ack_timeout;
        self
    }

    /// Sends discovery probes to `broadcast_address` instead of the LAN broadcast address.
    pub fn with_broadcast_address(mut self, broadcast_address: SocketAddr) -> Self {
        self.broadcast_address = broadcast_address;
        self
    }

    /// Lights discovered so far.
    pub fn known_devices(&self) -> HashSet<DeviceIdentifier> {
        self.devices
            .lock()
            .map(|devices| devices.clone())
            .unwrap_or_default()
    }

    fn remember(&self, found: HashSet<DeviceIdentifier>) -> anyhow::Result<()> {
        let mut devices = self
            .devices
            .lock()
            .map_err(|_| anyhow!("Device registry is poisoned"))?;
        for device in found {
            devices.replace(device);
        }
        Ok(())
    }

    /**
    Sends `message` to `light` and waits for its acknowledgement.

    The same packet is retransmitted under a fresh sequence number up to [`ACK_ATTEMPTS`]
    times.
     */
    async fn send_acknowledged(
        &self,
        light: &DeviceIdentifier,
        message: Message,
    ) -> anyhow::Result<()> {
        let options = BuildOptions {
            target: Some(light.light_id),
            ack_required: true,
            source: self.source,
            ..Default::default()
        };
        let mut raw = RawMessage::build(&options, message)
            .map_err(|e| anyhow!("Failed to encode command: {}", e))?;

        for attempt in 1..=ACK_ATTEMPTS {
            let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);
            raw.frame_addr.sequence = sequence;
            let packet = raw
                .pack()
                .map_err(|e| anyhow!("Failed to encode command: {}", e))?;
            self.socket
                .send_to(&packet, light.address)
                .await
                .with_context(|| format!("Failed to send command to {}", light.address))?;

            if self.await_ack(sequence).await? {
                return Ok(());
            }
            debug!(
                "Light {:#x} did not acknowledge sequence {} (attempt {}/{})",
                light.light_id, sequence, attempt, ACK_ATTEMPTS
            );
        }
        bail!(
            "Light {:#x} did not acknowledge after {} attempts",
            light.light_id,
            ACK_ATTEMPTS
        )
    }

    /// Waits for an acknowledgement of `sequence`, returning `false` on timeout.
    async fn await_ack(&self, sequence: u8) -> anyhow::Result<bool> {
        let mut buffer = [0; 1024];
        let timeout_end = Instant::now() + self.ack_timeout;

        loop {
            let now = Instant::now();
            if now >= timeout_end {
                return Ok(false);
            }

            match timeout(timeout_end - now, self.socket.recv_from(&mut buffer)).await {
                Ok(Ok((number_of_bytes, _sender))) => {
                    let Ok(raw) = RawMessage::unpack(&buffer[..number_of_bytes]) else {
                        continue;
                    };
                    if raw.frame.source != self.source {
                        continue;
                    }
                    if let Ok(Message::Acknowledgement { seq }) = Message::from_raw(&raw) {
                        if seq == sequence {
                            return Ok(true);
                        }
                    }
                }
                Ok(Err(e)) => return Err(e).context("Failed to receive acknowledgement"),
                Err(_) => return Ok(false),
            }
        }
    }
}

fn fade_millis(fade: Duration) -> u32 {
    u32::try_from(fade.as_millis()).unwrap_or(u32::MAX)
}

#[async_trait]
impl LightClient for LifxClient {
    type Handle = DeviceIdentifier;

    async fn find_by_id(&self, light_id: u64) -> anyhow::Result<Option<DeviceIdentifier>> {
        Discovery::send_probe(&self.socket, self.source, self.broadcast_address).await?;
        let mut found = HashSet::new();
        Discovery::collect_responses(&self.socket, DISCOVERY_WINDOW, &mut found).await?;
        self.remember(found)?;

        Ok(self
            .known_devices()
            .into_iter()
            .find(|device| device.light_id == light_id))
    }

    async fn set_color(
        &self,
        light: &DeviceIdentifier,
        color: Color,
        fade: Duration,
    ) -> anyhow::Result<()> {
        self.send_acknowledged(
            light,
            Message::LightSetColor {
                reserved: 0,
                color: color.into(),
                duration: fade_millis(fade),
            },
        )
        .await
    }

    async fn set_power(
        &self,
        light: &DeviceIdentifier,
        on: bool,
        fade: Duration,
    ) -> anyhow::Result<()> {
        self.send_acknowledged(
            light,
            Message::LightSetPower {
                level: if on { POWER_ON } else { 0 },
                duration: fade_millis(fade),
            },
        )
        .await
    }
}
