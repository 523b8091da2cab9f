pub mod driver;
pub mod results;
pub mod scan;

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use pnet::util::MacAddr;
use tokio::runtime::Handle;
use tracing::warn;
use wlbridge_common::config::Config;
use wlbridge_common::network::bss::ScanResultEntry;
use wlbridge_common::network::ssid::Ssid;
use wlbridge_core::deadline::TokioDeadlines;
use wlbridge_core::events::TracingEventSink;
use wlbridge_core::mock::{MockDevice, MockLink};
use wlbridge_core::{Collaborators, Session};

pub const DEFAULT_CAPACITY: usize = 32;

#[derive(Parser)]
#[command(name = "wlbridge")]
#[command(about = "Driver bridge for TI wireless chipsets.")]
pub struct CommandLine {
    /// Wireless interface to manage
    #[arg(short, long, default_value = "wlan0")]
    pub interface: String,
    /// Drive the in-memory device instead of a real interface
    #[arg(long)]
    pub mock: bool,
    /// Number of channels swept per scan, starting at channel 1
    #[arg(long)]
    pub channels: Option<u8>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send a driver command (start, stop, macaddr, scan-channels 11, rxfilter-add 1, ...)
    #[command(alias = "d")]
    Driver {
        #[arg(required = true, num_args = 1..)]
        words: Vec<String>,
    },
    /// Request a scan, optionally directed at one network
    #[command(alias = "s")]
    Scan { ssid: Option<String> },
    /// Print the merged scan results
    #[command(alias = "r")]
    Results {
        #[arg(short, long, default_value_t = DEFAULT_CAPACITY)]
        capacity: usize,
    },
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn config(&self) -> Config {
        let mut cfg = Config::from_env();
        if let Some(channels) = self.channels {
            cfg.scan_channels = channels;
        }
        cfg
    }
}

/// Opens a session on the selected interface, or on the mock device.
pub fn open_session(cli: &CommandLine, cfg: &Config) -> anyhow::Result<Session> {
    let collaborators = if cli.mock {
        mock_collaborators()
    } else {
        device_collaborators(&cli.interface)?
    };

    Session::init(&cli.interface, collaborators, cfg)
        .with_context(|| format!("Failed to initialise session on {}", cli.interface))
}

fn scheduler() -> Arc<TokioDeadlines> {
    Arc::new(TokioDeadlines::new(Handle::current(), |session| {
        warn!("{session}: scan did not complete in time");
    }))
}

fn mock_collaborators() -> Collaborators {
    let link = MockLink::new().with_association(
        MacAddr::new(0x00, 0x1b, 0x63, 0x84, 0x45, 0xe6),
        Ssid::try_from("CorpNet").unwrap_or_default(),
    );
    link.set_batch(sample_batch());

    Collaborators {
        primitive: Box::new(MockDevice::new()),
        link: Box::new(link.clone()),
        scan_source: Box::new(link),
        events: Arc::new(TracingEventSink),
        scheduler: scheduler(),
    }
}

fn sample_batch() -> Vec<ScanResultEntry> {
    // RSN element advertising CCMP with PSK key management.
    const RSN_PSK: [u8; 22] = [
        0x30, 0x14, 0x01, 0x00, 0x00, 0x0f, 0xac, 0x04, 0x01, 0x00, 0x00, 0x0f, 0xac, 0x04,
        0x01, 0x00, 0x00, 0x0f, 0xac, 0x02, 0x00, 0x00,
    ];

    let networks: [(MacAddr, &str, i32, u8, bool); 4] = [
        (MacAddr::new(0x00, 0x1b, 0x63, 0x84, 0x45, 0xe6), "CorpNet", -48, 6, true),
        (MacAddr::new(0x00, 0x14, 0xbf, 0x1a, 0x2b, 0x3c), "Guest", -67, 1, false),
        (MacAddr::new(0xf0, 0x9f, 0xc2, 0x10, 0x20, 0x30), "", -72, 11, true),
        (MacAddr::new(0x00, 0x0c, 0x41, 0xaa, 0xbb, 0xcc), "Lab-2.4", -81, 6, true),
    ];

    networks
        .into_iter()
        .map(|(bssid, name, level, channel, protected)| {
            let entry = ScanResultEntry::new(bssid, level)
                .with_ssid(Ssid::try_from(name).unwrap_or_default())
                .with_channel(channel);
            if protected {
                entry.with_security(RSN_PSK.to_vec())
            } else {
                entry
            }
        })
        .collect()
}

#[cfg(target_os = "linux")]
fn device_collaborators(ifname: &str) -> anyhow::Result<Collaborators> {
    use wlbridge_core::network::wext::{WextControl, WextLink};

    if !is_root::is_root() {
        warn!("Private driver commands usually need root privileges");
    }

    let primitive = WextControl::open(ifname)
        .with_context(|| format!("Failed to open control socket for {ifname}"))?;
    let link = WextLink::open(ifname)
        .with_context(|| format!("Failed to open link socket for {ifname}"))?;
    let scan_source = WextLink::open(ifname)
        .with_context(|| format!("Failed to open scan socket for {ifname}"))?;

    Ok(Collaborators {
        primitive: Box::new(primitive),
        link: Box::new(link),
        scan_source: Box::new(scan_source),
        events: Arc::new(TracingEventSink),
        scheduler: scheduler(),
    })
}

#[cfg(not(target_os = "linux"))]
fn device_collaborators(ifname: &str) -> anyhow::Result<Collaborators> {
    anyhow::bail!("Real interfaces are only supported on Linux ({ifname}); use --mock")
}
