use anyhow::Context;
use colored::*;
use wlbridge_common::network::bss::ScanResultEntry;
use wlbridge_common::network::mac;
use wlbridge_core::Session;

use crate::terminal::{colors, print};

type Detail = (String, ColoredString);

const STRONG_SIGNAL_DBM: i32 = -60;

pub fn results(session: &mut Session, capacity: usize) -> anyhow::Result<()> {
    let entries = session
        .get_scan_results(capacity)
        .context("Failed to read scan results")?;

    if entries.is_empty() {
        print::no_results();
        return Ok(());
    }

    for (idx, entry) in entries.iter().enumerate() {
        print_entry_tree(entry, idx);
    }
    print::end_of_program();
    Ok(())
}

fn print_entry_tree(entry: &ScanResultEntry, idx: usize) {
    let name = if entry.ssid.is_empty() {
        "<hidden>".to_string()
    } else {
        entry.ssid.to_string()
    };
    print::tree_head(idx, &name);

    let mut details: Vec<Detail> = vec![(
        "BSSID".to_string(),
        entry.bssid.to_string().color(colors::MAC_ADDR),
    )];

    if let Some(vendor) = mac::get_vendor(entry.bssid) {
        details.push(("Vendor".to_string(), vendor.normal()));
    }

    let signal_color = if entry.level >= STRONG_SIGNAL_DBM {
        colors::SIGNAL_STRONG
    } else {
        colors::SIGNAL_WEAK
    };
    details.push((
        "Signal".to_string(),
        format!("{} dBm", entry.level).color(signal_color),
    ));

    if entry.channel != 0 {
        details.push(("Channel".to_string(), entry.channel.to_string().normal()));
    }

    let privacy = if entry.security.is_empty() {
        "open".yellow()
    } else {
        "protected".normal()
    };
    details.push(("Privacy".to_string(), privacy));

    print::as_tree_one_level(details);
}
