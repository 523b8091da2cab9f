use anyhow::Context;
use wlbridge_common::network::ssid::Ssid;
use wlbridge_core::Session;

use crate::terminal::print;

pub fn scan(session: &mut Session, ssid: Option<String>) -> anyhow::Result<()> {
    let target = ssid
        .as_deref()
        .map(Ssid::try_from)
        .transpose()
        .context("Invalid network name")?;

    session
        .request_scan(target.as_ref())
        .context("Scan request rejected")?;

    print::aligned_line("Mode", format!("{:?}", session.scan_preference()));
    print::aligned_line("Channels", session.channel_count());
    if let Some(ssid) = target {
        print::aligned_line("Target", ssid);
    }
    print::print_status("Scan started");
    Ok(())
}
