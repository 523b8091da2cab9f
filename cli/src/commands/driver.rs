//! `DRIVER <cmd>` text as the supplicant writes it.
//!
//! Keywords are case-insensitive. Numeric arguments may follow the keyword
//! directly or after whitespace, in decimal or `0x` hex.

use anyhow::{Context, anyhow, bail};
use wlbridge_core::{DriverCommand, Session};

use crate::terminal::print;

const PREFIXED: [&str; 5] = [
    "scan-channels",
    "powermode",
    "btcoexmode",
    "rxfilter-add",
    "rxfilter-remove",
];

pub fn driver(session: &mut Session, words: &[String]) -> anyhow::Result<()> {
    let command = parse_command(&words.join(" "))?;

    let reply = session
        .execute(command)
        .with_context(|| format!("Driver command '{command}' failed"))?;

    if reply.is_empty() {
        print::print_status("OK");
    } else {
        for line in reply.lines() {
            print::print_status(line);
        }
    }
    Ok(())
}

pub fn parse_command(raw: &str) -> anyhow::Result<DriverCommand> {
    let line = raw.trim().to_ascii_lowercase();

    let command = match line.as_str() {
        "start" => DriverCommand::Start,
        "stop" => DriverCommand::Stop,
        "reload" => DriverCommand::Reload,
        "macaddr" => DriverCommand::MacAddr,
        "scan-passive" => DriverCommand::ScanPassive,
        "scan-active" => DriverCommand::ScanActive,
        "scan-mode" => DriverCommand::ScanMode,
        "linkspeed" => DriverCommand::LinkSpeed,
        "scan-channels" => DriverCommand::ScanChannels(None),
        "rssi" | "rssi-approx" => DriverCommand::Rssi,
        "getpower" => DriverCommand::GetPower,
        "btcoexstat" => DriverCommand::BtCoexStatus,
        "rxfilter-start" => DriverCommand::RxFilterStart,
        "rxfilter-stop" => DriverCommand::RxFilterStop,
        "rxfilter-statistics" => DriverCommand::RxFilterStatistics,
        _ => {
            let (keyword, arg) = PREFIXED
                .iter()
                .find_map(|keyword| line.strip_prefix(keyword).map(|arg| (*keyword, arg)))
                .ok_or_else(|| anyhow!("Unsupported driver command '{}'", raw.trim()))?;
            let value = parse_number(arg)?;

            match keyword {
                "scan-channels" => {
                    let count = u8::try_from(value)
                        .map_err(|_| anyhow!("Channel count {value} out of range"))?;
                    DriverCommand::ScanChannels(Some(count))
                }
                "powermode" => DriverCommand::PowerMode(value),
                "btcoexmode" => DriverCommand::BtCoexMode(value),
                "rxfilter-add" => DriverCommand::RxFilterAdd(value),
                _ => DriverCommand::RxFilterRemove(value),
            }
        }
    };
    Ok(command)
}

fn parse_number(raw: &str) -> anyhow::Result<u32> {
    let raw = raw.trim();
    if raw.is_empty() {
        bail!("Missing numeric argument");
    }
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => raw.parse::<u32>(),
    };
    parsed.with_context(|| format!("Invalid numeric argument '{raw}'"))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
