//! Maps a filter kind to the hardware-address prefix the device matches on.

use pnet::util::MacAddr;
use wlbridge_common::device::FilterKind;
use wlbridge_protocols::filter::FilterDescriptor;

use crate::error::{BuildError, TransportError};

const IPV4_MULTICAST_PREFIX: [u8; 3] = [0x01, 0x00, 0x5e];
const IPV6_MULTICAST_PREFIX: [u8; 2] = [0x33, 0x33];

/// Builds the descriptor for `kind`. `own_addr` is only consulted for
/// [`FilterKind::Own`].
pub fn build<F>(kind: FilterKind, own_addr: F) -> Result<FilterDescriptor, BuildError>
where
    F: FnOnce() -> Result<MacAddr, TransportError>,
{
    let descriptor = match kind {
        FilterKind::Own => {
            let mac = own_addr().map_err(BuildError::AddressUnavailable)?;
            FilterDescriptor::new(&mac.octets())?
        }
        FilterKind::Broadcast => FilterDescriptor::new(&MacAddr::broadcast().octets())?,
        FilterKind::Ipv4Multicast => FilterDescriptor::new(&IPV4_MULTICAST_PREFIX)?,
        FilterKind::Ipv6Multicast => FilterDescriptor::new(&IPV6_MULTICAST_PREFIX)?,
    };
    Ok(descriptor)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
