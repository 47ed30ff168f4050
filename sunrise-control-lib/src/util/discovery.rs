use std::collections::HashSet;
use std::fmt::{Display, Formatter};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

use anyhow::{anyhow, Context};
use derivative::Derivative;
use lifx_core::{BuildOptions, Message, RawMessage, Service};
use log::{debug, info};
use serde::Serialize;
use tokio::net::UdpSocket;
use tokio::time::{timeout, Instant};

/// UDP port LIFX lights listen on.
pub const LIFX_PORT: u16 = 56700;
/// Where discovery requests go unless a client is pointed elsewhere.
pub const BROADCAST_ADDRESS: SocketAddr =
    SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::BROADCAST, LIFX_PORT));

/// A light that answered a discovery probe.
///
/// Lights are identified by their target id alone; the address is only where the light
/// was last heard from.
#[derive(Derivative)]
#[derivative(Hash, PartialEq, Eq)]
#[derive(Debug, Clone, Serialize)]
pub struct DeviceIdentifier {
    /// The LIFX target, i.e. the light's MAC address as a little-endian integer.
    pub light_id: u64,
    #[derivative(Hash = "ignore", PartialEq = "ignore")]
    pub address: SocketAddr,
}

impl DeviceIdentifier {
    pub fn new(light_id: u64, address: SocketAddr) -> Self {
        DeviceIdentifier { light_id, address }
    }

    /// The MAC address in the usual colon-separated notation.
    pub fn mac_address(&self) -> String {
        self.light_id.to_le_bytes()[..6]
            .iter()
            .map(|byte| format!("{:02x}", byte))
            .collect::<Vec<_>>()
            .join(":")
    }
}

impl Display for DeviceIdentifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Light ID: {}, MAC: {}, Address: {}",
            self.light_id,
            self.mac_address(),
            self.address
        )
    }
}

pub struct Discovery;

impl Discovery {
    /// Binds a socket that may send to the broadcast address.
    pub async fn bind_broadcast_socket() -> anyhow::Result<UdpSocket> {
        let socket = UdpSocket::bind("0.0.0.0:0")
            .await
            .context("Failed to bind discovery socket")?;
        socket.set_broadcast(true)?;
        Ok(socket)
    }

    /// Sends a `GetService` probe to `destination`. Every light that receives it answers.
    pub async fn send_probe(
        socket: &UdpSocket,
        source: u32,
        destination: SocketAddr,
    ) -> anyhow::Result<()> {
        let options = BuildOptions {
            source,
            ..Default::default()
        };
        let packet = RawMessage::build(&options, Message::GetService)
            .and_then(|raw| raw.pack())
            .map_err(|e| anyhow!("Failed to encode discovery probe: {}", e))?;
        socket
            .send_to(&packet, destination)
            .await
            .with_context(|| format!("Failed to send discovery probe to {}", destination))?;
        Ok(())
    }

    /// Decodes a `StateService` answer received from `sender`.
    ///
    /// Returns `None` for anything that is not a UDP service announcement.
    pub fn decode_discovery_response(data: &[u8], sender: SocketAddr) -> Option<DeviceIdentifier> {
        let raw = RawMessage::unpack(data).ok()?;
        match Message::from_raw(&raw).ok()? {
            Message::StateService { service, port } if matches!(service, Service::UDP) => {
                let port = u16::try_from(port).ok().filter(|port| *port != 0)?;
                Some(DeviceIdentifier::new(
                    raw.frame_addr.target,
                    SocketAddr::new(sender.ip(), port),
                ))
            }
            _ => None,
        }
    }

    /**
    Listens on `socket` for `window` and records every light that announces itself.

    Lights already in `devices` get their address refreshed.
     */
    pub async fn collect_responses(
        socket: &UdpSocket,
        window: Duration,
        devices: &mut HashSet<DeviceIdentifier>,
    ) -> anyhow::Result<()> {
        let mut buffer = [0; 1024];
        let timeout_end = Instant::now() + window;

        loop {
            let now = Instant::now();
            if now >= timeout_end {
                break;
            }

            match timeout(timeout_end - now, socket.recv_from(&mut buffer)).await {
                Ok(Ok((number_of_bytes, sender))) => {
                    if let Some(device) =
                        Self::decode_discovery_response(&buffer[..number_of_bytes], sender)
                    {
                        debug!("Light {:#x} answered from {}", device.light_id, sender);
                        devices.replace(device);
                    }
                }
                Ok(Err(e)) => return Err(e).context("Failed to receive discovery response"),
                Err(_) => break,
            }
        }
        Ok(())
    }

    /// Finds all lights on the local network that answer within `given_timeout`.
    pub async fn find_devices(given_timeout: Duration) -> anyhow::Result<HashSet<DeviceIdentifier>> {
        let socket = Self::bind_broadcast_socket().await?;
        Self::send_probe(&socket, rand::random::<u32>().max(2), BROADCAST_ADDRESS).await?;

        let mut devices = HashSet::new();
        Self::collect_responses(&socket, given_timeout, &mut devices).await?;
        info!("Discovery found {} light(s)", devices.len());
        Ok(devices)
    }

    pub fn pretty_print_devices(devices: &HashSet<DeviceIdentifier>) {
        let max_address_width = devices
            .iter()
            .map(|d| d.address.to_string().len())
            .max()
            .unwrap_or(0)
            .max("Address".len());
        let max_id_width = devices
            .iter()
            .map(|d| d.light_id.to_string().len())
            .max()
            .unwrap_or(0)
            .max("Light ID".len());
        let mac_width = "00:00:00:00:00:00".len();

        println!(
            "{:<id_width$} {:<mac_width$} {:<address_width$}",
            "Light ID",
            "MAC Address",
            "Address",
            id_width = max_id_width + 2,
            mac_width = mac_width + 2,
            address_width = max_address_width + 2,
        );
        println!(
            "{:<id_width$} {:<mac_width$} {:<address_width$}",
            "-".repeat(max_id_width),
            "-".repeat(mac_width),
            "-".repeat(max_address_width),
            id_width = max_id_width + 2,
            mac_width = mac_width + 2,
            address_width = max_address_width + 2,
        );
        for device in devices {
            println!(
                "{:<id_width$} {:<mac_width$} {:<address_width$}",
                device.light_id,
                device.mac_address(),
                device.address,
                id_width = max_id_width + 2,
                mac_width = mac_width + 2,
                address_width = max_address_width + 2,
            );
        }
    }
}
