use std::sync::OnceLock;

use mac_oui::Oui;
use pnet::util::MacAddr;

/// Length of a hardware address and therefore of a BSSID.
pub const ETH_ALEN: usize = 6;

static OUI_DB: OnceLock<Option<Oui>> = OnceLock::new();

/// Retrieves or initializes the **Organizationally unique identifier** database.
///
/// Used for naming the manufacturer behind a BSSID.
fn get_oui_db() -> Option<&'static Oui> {
    OUI_DB
        .get_or_init(|| match Oui::default() {
            Ok(db) => Some(db),
            Err(e) => {
                tracing::warn!("OUI database unavailable: {e}");
                None
            }
        })
        .as_ref()
}

/// Identify the vendor of an access point from its BSSID.
pub fn get_vendor(mac: MacAddr) -> Option<String> {
    let db = get_oui_db()?;
    let mac_str = mac.to_string();
    match db.lookup_by_mac(&mac_str) {
        Ok(Some(entry)) => Some(entry.company_name.clone()),
        _ => None,
    }
}

pub fn from_bytes(bytes: &[u8]) -> Option<MacAddr> {
    let octets: [u8; ETH_ALEN] = bytes.get(..ETH_ALEN)?.try_into().ok()?;
    Some(MacAddr::from(octets))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_bytes_takes_first_six_octets() {
        let mac = from_bytes(&[0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66]).unwrap();
        assert_eq!(mac, MacAddr(0x00, 0x11, 0x22, 0x33, 0x44, 0x55));
    }

    #[test]
    fn from_bytes_rejects_short_input() {
        assert!(from_bytes(&[0xff; 5]).is_none());
    }
}
