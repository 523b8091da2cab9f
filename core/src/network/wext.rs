//! # Wireless Extensions
//!
//! Real-device adapters over an `AF_INET` datagram socket. Private commands go
//! through the first private wireless-extensions ioctl with a small request
//! block pointing at the caller's buffers. Link control uses the standard
//! wireless-extensions requests for the operations this bridge needs to forward.

use std::ffi::c_void;
use std::io;
use std::mem;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};

use libc::{c_char, c_short, c_ulong};
use pnet::util::MacAddr;
use tracing::debug;
use wlbridge_common::control::{ControlPrimitive, PrimitiveError};
use wlbridge_common::link::{
    KeyParams, LinkControl, LinkError, MlmeOp, PMKID_LEN, PmksaOp, ScanSource,
};
use wlbridge_common::network::bss::ScanResultEntry;
use wlbridge_common::network::mac::{self, ETH_ALEN};
use wlbridge_common::network::ssid::{MAX_SSID_LEN, Ssid};

const IFNAMSIZ: usize = 16;
const ARPHRD_ETHER: u16 = 1;

const SIOCSIWAP: c_ulong = 0x8B14;
const SIOCGIWAP: c_ulong = 0x8B15;
const SIOCSIWMLME: c_ulong = 0x8B16;
const SIOCSIWESSID: c_ulong = 0x8B1A;
const SIOCGIWRATE: c_ulong = 0x8B21;
const SIOCGIWESSID: c_ulong = 0x8B1B;
const SIOCSIWPMKSA: c_ulong = 0x8B36;
const SIOCIWFIRSTPRIV: c_ulong = 0x8BE0;

const IW_PMKSA_ADD: u32 = 1;
const IW_PMKSA_REMOVE: u32 = 2;
const IW_PMKSA_FLUSH: u32 = 3;
const IW_MLME_DEAUTH: u16 = 0;
const IW_MLME_DISASSOC: u16 = 1;

#[repr(C)]
struct PrivateCmd {
    cmd: u32,
    flags: u32,
    in_buffer: *const c_void,
    in_buffer_len: u32,
    out_buffer: *mut c_void,
    out_buffer_len: u32,
}

#[repr(C)]
#[derive(Clone, Copy)]
struct IwPoint {
    pointer: *mut c_void,
    length: u16,
    flags: u16,
}

#[repr(C)]
#[derive(Clone, Copy)]
struct IwParam {
    value: i32,
    fixed: u8,
    disabled: u8,
    flags: u16,
}

#[repr(C)]
#[derive(Clone, Copy)]
union IwReqData {
    data: IwPoint,
    ap_addr: libc::sockaddr,
    bitrate: IwParam,
}

#[repr(C)]
struct IwReq {
    ifr_name: [c_char; IFNAMSIZ],
    u: IwReqData,
}

#[repr(C)]
struct IfReqFlags {
    ifr_name: [c_char; IFNAMSIZ],
    ifr_flags: c_short,
    _pad: [u8; 22],
}

#[repr(C)]
struct IwPmksa {
    cmd: u32,
    bssid: libc::sockaddr,
    pmkid: [u8; PMKID_LEN],
}

#[repr(C)]
struct IwMlme {
    cmd: u16,
    reason_code: u16,
    addr: libc::sockaddr,
}

fn hw_sockaddr(mac: MacAddr) -> libc::sockaddr {
    // SAFETY: sockaddr is plain old data; all-zero is a valid value.
    let mut addr: libc::sockaddr = unsafe { mem::zeroed() };
    addr.sa_family = ARPHRD_ETHER as libc::sa_family_t;
    for (slot, octet) in addr.sa_data.iter_mut().zip(mac.octets()) {
        *slot = octet as c_char;
    }
    addr
}

/// Wireless extensions report rates in bit/s.
fn rate_mbps(bitrate: i32) -> u32 {
    u32::try_from(bitrate).unwrap_or(0) / 1_000_000
}

fn sockaddr_mac(addr: &libc::sockaddr) -> MacAddr {
    let octets: Vec<u8> = addr.sa_data[..ETH_ALEN].iter().map(|b| *b as u8).collect();
    mac::from_bytes(&octets).unwrap_or_else(MacAddr::zero)
}

/// Datagram socket bound to one interface name.
struct WextSocket {
    ifname: [c_char; IFNAMSIZ],
    fd: OwnedFd,
}

impl WextSocket {
    fn open(ifname: &str) -> io::Result<Self> {
        let name = encode_ifname(ifname)?;

        // SAFETY: plain socket(2) call; the descriptor is owned right away.
        let raw = unsafe { libc::socket(libc::AF_INET, libc::SOCK_DGRAM, 0) };
        if raw < 0 {
            return Err(io::Error::last_os_error());
        }
        // SAFETY: `raw` is a freshly created descriptor nobody else owns.
        let fd = unsafe { OwnedFd::from_raw_fd(raw) };

        debug!("Opened control socket for {ifname}");
        Ok(Self { ifname: name, fd })
    }

    fn request(&self) -> IwReq {
        IwReq {
            ifr_name: self.ifname,
            u: IwReqData {
                data: IwPoint {
                    pointer: std::ptr::null_mut(),
                    length: 0,
                    flags: 0,
                },
            },
        }
    }

    fn ioctl<T>(&self, request: c_ulong, arg: &mut T) -> io::Result<()> {
        // SAFETY: `arg` is a live, correctly laid out request block for `request`.
        let rc = unsafe { libc::ioctl(self.fd.as_raw_fd(), request as _, arg as *mut T) };
        if rc < 0 {
            Err(io::Error::last_os_error())
        } else {
            Ok(())
        }
    }

    fn point_ioctl<T>(&self, request: c_ulong, block: &mut T, flags: u16) -> io::Result<IwPoint> {
        let mut req = self.request();
        req.u.data = IwPoint {
            pointer: block as *mut T as *mut c_void,
            length: mem::size_of::<T>() as u16,
            flags,
        };
        self.ioctl(request, &mut req)?;
        // SAFETY: point requests leave `data` as the active union member.
        Ok(unsafe { req.u.data })
    }
}

fn encode_ifname(ifname: &str) -> io::Result<[c_char; IFNAMSIZ]> {
    if ifname.is_empty() || ifname.len() >= IFNAMSIZ || ifname.contains('\0') {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid interface name '{ifname}'"),
        ));
    }
    let mut name = [0 as c_char; IFNAMSIZ];
    for (slot, byte) in name.iter_mut().zip(ifname.bytes()) {
        *slot = byte as c_char;
    }
    Ok(name)
}

/// Private-command primitive of a real interface.
pub struct WextControl {
    socket: WextSocket,
}

impl WextControl {
    pub fn open(ifname: &str) -> io::Result<Self> {
        Ok(Self {
            socket: WextSocket::open(ifname)?,
        })
    }
}

impl ControlPrimitive for WextControl {
    fn transact(
        &mut self,
        opcode: u32,
        flags: u32,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<(), PrimitiveError> {
        let mut cmd = PrivateCmd {
            cmd: opcode,
            flags,
            in_buffer: if input.is_empty() {
                std::ptr::null()
            } else {
                input.as_ptr().cast()
            },
            in_buffer_len: input.len() as u32,
            out_buffer: if output.is_empty() {
                std::ptr::null_mut()
            } else {
                output.as_mut_ptr().cast()
            },
            out_buffer_len: output.len() as u32,
        };

        self.socket
            .point_ioctl(SIOCIWFIRSTPRIV, &mut cmd, 0)
            .map(|_| ())
            .map_err(PrimitiveError::from)
    }
}

/// Link control of a real interface.
///
/// Key installation, generic IEs and operstate belong to the generic
/// wireless-extensions layer and are reported as unsupported here, as is the
/// scan source.
pub struct WextLink {
    socket: WextSocket,
}

impl WextLink {
    pub fn open(ifname: &str) -> io::Result<Self> {
        Ok(Self {
            socket: WextSocket::open(ifname)?,
        })
    }
}

impl LinkControl for WextLink {
    fn bssid(&self) -> Result<MacAddr, LinkError> {
        let mut req = self.socket.request();
        self.socket.ioctl(SIOCGIWAP, &mut req)?;
        // SAFETY: SIOCGIWAP fills `ap_addr`.
        Ok(sockaddr_mac(unsafe { &req.u.ap_addr }))
    }

    fn link_speed(&self) -> Result<u32, LinkError> {
        let mut req = self.socket.request();
        self.socket.ioctl(SIOCGIWRATE, &mut req)?;
        // SAFETY: SIOCGIWRATE fills `bitrate`.
        Ok(rate_mbps(unsafe { req.u.bitrate.value }))
    }

    fn set_bssid(&mut self, bssid: MacAddr) -> Result<(), LinkError> {
        let mut req = self.socket.request();
        req.u.ap_addr = hw_sockaddr(bssid);
        Ok(self.socket.ioctl(SIOCSIWAP, &mut req)?)
    }

    fn ssid(&self) -> Result<Ssid, LinkError> {
        let mut buffer = [0u8; MAX_SSID_LEN + 1];
        let point = self.socket.point_ioctl(SIOCGIWESSID, &mut buffer, 0)?;
        let len = (point.length as usize).min(MAX_SSID_LEN);
        Ssid::new(&buffer[..len])
            .map_err(|err| LinkError::Io(io::Error::new(io::ErrorKind::InvalidData, err)))
    }

    fn set_ssid(&mut self, ssid: &Ssid) -> Result<(), LinkError> {
        let mut buffer = [0u8; MAX_SSID_LEN];
        buffer[..ssid.len()].copy_from_slice(ssid.as_bytes());

        let mut req = self.socket.request();
        req.u.data = IwPoint {
            pointer: buffer.as_mut_ptr().cast(),
            length: ssid.len() as u16,
            flags: u16::from(!ssid.is_empty()),
        };
        Ok(self.socket.ioctl(SIOCSIWESSID, &mut req)?)
    }

    fn if_flags(&self) -> Result<u32, LinkError> {
        let mut ifr = IfReqFlags {
            ifr_name: self.socket.ifname,
            ifr_flags: 0,
            _pad: [0; 22],
        };
        self.socket.ioctl(libc::SIOCGIFFLAGS as c_ulong, &mut ifr)?;
        Ok(ifr.ifr_flags as u16 as u32)
    }

    fn set_if_flags(&mut self, flags: u32) -> Result<(), LinkError> {
        let mut ifr = IfReqFlags {
            ifr_name: self.socket.ifname,
            ifr_flags: flags as u16 as c_short,
            _pad: [0; 22],
        };
        Ok(self.socket.ioctl(libc::SIOCSIFFLAGS as c_ulong, &mut ifr)?)
    }

    fn set_key(&mut self, _key: &KeyParams) -> Result<(), LinkError> {
        Err(LinkError::Unsupported("key installation"))
    }

    fn set_gen_ie(&mut self, _ie: &[u8]) -> Result<(), LinkError> {
        Err(LinkError::Unsupported("generic information elements"))
    }

    fn pmksa(&mut self, op: PmksaOp) -> Result<(), LinkError> {
        let (cmd, bssid, pmkid) = match op {
            PmksaOp::Add { bssid, pmkid } => (IW_PMKSA_ADD, bssid, pmkid),
            PmksaOp::Remove { bssid, pmkid } => (IW_PMKSA_REMOVE, bssid, pmkid),
            PmksaOp::Flush => (IW_PMKSA_FLUSH, MacAddr::zero(), [0; PMKID_LEN]),
        };
        let mut block = IwPmksa {
            cmd,
            bssid: hw_sockaddr(bssid),
            pmkid,
        };
        self.socket.point_ioctl(SIOCSIWPMKSA, &mut block, 0)?;
        Ok(())
    }

    fn mlme(&mut self, op: MlmeOp, addr: MacAddr, reason: u16) -> Result<(), LinkError> {
        let cmd = match op {
            MlmeOp::Deauthenticate => IW_MLME_DEAUTH,
            MlmeOp::Disassociate => IW_MLME_DISASSOC,
        };
        let mut block = IwMlme {
            cmd,
            reason_code: reason,
            addr: hw_sockaddr(addr),
        };
        self.socket.point_ioctl(SIOCSIWMLME, &mut block, 0)?;
        Ok(())
    }

    fn set_operstate(&mut self, _up: bool) -> Result<(), LinkError> {
        Err(LinkError::Unsupported("operstate"))
    }
}

impl ScanSource for WextLink {
    fn scan_results(&mut self, _max: usize) -> Result<Vec<ScanResultEntry>, LinkError> {
        Err(LinkError::Unsupported("scan results"))
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
