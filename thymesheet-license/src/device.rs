//! Hardware fingerprinting for license binding.
//!
//! The fingerprint is `sha256_hex("{mac}-{platform}-{hostname}")` where `mac`
//! is the first active, non-internal interface with a non-zero hardware
//! address, or the empty string if there is none. An interface is active when
//! it is up, running and has a protocol address assigned. Interfaces are
//! ordered by their first protocol address. Issued licenses store this value,
//! so the selection rules and string layout must not change.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::env;
use std::fmt;

/// All-zero hardware address reported by virtual and loopback adapters.
const ZERO_MAC: &str = "00:00:00:00:00:00";

/// Bytes of a hardware address that go into the fingerprint.
#[cfg_attr(not(any(target_os = "linux", target_os = "macos")), allow(dead_code))]
const MAC_LEN: usize = 6;

// Interface flags from <net/if.h>; identical on Linux and BSD.
const IFF_UP: u32 = 0x1;
const IFF_LOOPBACK: u32 = 0x8;
const IFF_RUNNING: u32 = 0x40;

/// A SHA-256 hex digest identifying one machine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HardwareId(String);

impl HardwareId {
    /// Hashes a machine profile into a hardware id.
    #[must_use]
    pub fn from_profile(profile: &MachineProfile) -> Self {
        let combined = format!(
            "{}-{}-{}",
            profile.mac_address.as_deref().unwrap_or(""),
            profile.platform,
            profile.hostname
        );

        let mut hasher = Sha256::new();
        hasher.update(combined.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    /// Wraps a stored hardware id.
    #[must_use]
    pub fn from_raw(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the hex digest.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HardwareId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The machine attributes that feed the fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineProfile {
    /// First usable hardware address, lowercase and colon-separated.
    pub mac_address: Option<String>,
    /// Platform name (`linux`, `darwin`, `win32`, ...).
    pub platform: String,
    /// Host name.
    pub hostname: String,
}

impl MachineProfile {
    /// Collects the profile of the current machine.
    #[must_use]
    pub fn collect() -> Self {
        Self {
            mac_address: first_hardware_address(list_interfaces()),
            platform: platform_name().to_string(),
            hostname: get_hostname(),
        }
    }
}

/// One network interface as seen during enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceEntry {
    /// Interface name (`en0`, `eth0`, ...).
    pub name: String,
    /// Hardware address, lowercase and colon-separated.
    pub mac: String,
    /// True for loopback or otherwise internal interfaces.
    pub internal: bool,
    /// Up, running and holding at least one protocol address.
    pub active: bool,
}

/// Picks the first active interface that is not internal and has a non-zero
/// hardware address. Enumeration order decides ties.
pub fn first_hardware_address<I>(interfaces: I) -> Option<String>
where
    I: IntoIterator<Item = InterfaceEntry>,
{
    interfaces
        .into_iter()
        .find(|iface| {
            iface.active && !iface.internal && !iface.mac.is_empty() && iface.mac != ZERO_MAC
        })
        .map(|iface| iface.mac)
}

/// Source of the current machine's hardware id.
pub trait FingerprintSource: Send + Sync {
    /// Computes the hardware id. Not cached between calls.
    fn hardware_id(&self) -> HardwareId;
}

/// Fingerprints the machine the process is running on.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemFingerprint;

impl FingerprintSource for SystemFingerprint {
    fn hardware_id(&self) -> HardwareId {
        HardwareId::from_profile(&MachineProfile::collect())
    }
}

/// A fixed profile, for hosts that collect machine attributes themselves.
impl FingerprintSource for MachineProfile {
    fn hardware_id(&self) -> HardwareId {
        HardwareId::from_profile(self)
    }
}

/// Platform names as issued licenses recorded them.
fn platform_name() -> &'static str {
    match env::consts::OS {
        "macos" => "darwin",
        "windows" => "win32",
        other => other,
    }
}

/// Gets the machine hostname.
fn get_hostname() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .unwrap_or_default()
}

/// Enumerates network interfaces in platform order.
fn list_interfaces() -> Vec<InterfaceEntry> {
    #[cfg(any(target_os = "linux", target_os = "macos"))]
    {
        group_interfaces(read_ifaddrs())
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("getmac")
            .args(["/fo", "csv", "/nh"])
            .output()
            .ok()
            .and_then(|o| String::from_utf8(o.stdout).ok())
            .map(|output| parse_getmac(&output))
            .unwrap_or_default()
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
    {
        Vec::new()
    }
}

/// One `getifaddrs` node, reduced to what the fingerprint needs.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(not(any(target_os = "linux", target_os = "macos")), allow(dead_code))]
struct AddressRecord {
    name: String,
    flags: u32,
    /// Hardware address of a link-layer node; `None` for protocol addresses.
    link_mac: Option<String>,
}

/// Folds address nodes into interfaces, ordered by each interface's first
/// protocol address. Interfaces without one are left out.
#[cfg_attr(not(any(target_os = "linux", target_os = "macos")), allow(dead_code))]
fn group_interfaces(records: Vec<AddressRecord>) -> Vec<InterfaceEntry> {
    let mut macs: HashMap<&str, &str> = HashMap::new();
    for record in &records {
        if let Some(mac) = &record.link_mac {
            macs.entry(record.name.as_str()).or_insert(mac.as_str());
        }
    }

    let mut entries: Vec<InterfaceEntry> = Vec::new();
    for record in records.iter().filter(|r| r.link_mac.is_none()) {
        if entries.iter().any(|e| e.name == record.name) {
            continue;
        }
        entries.push(InterfaceEntry {
            name: record.name.clone(),
            mac: macs.get(record.name.as_str()).copied().unwrap_or(ZERO_MAC).to_string(),
            internal: record.flags & IFF_LOOPBACK != 0,
            active: record.flags & IFF_UP != 0 && record.flags & IFF_RUNNING != 0,
        });
    }
    entries
}

#[cfg(target_os = "linux")]
const LINK_FAMILY: i32 = libc::AF_PACKET;
#[cfg(target_os = "macos")]
const LINK_FAMILY: i32 = libc::AF_LINK;

/// Walks the `getifaddrs` list.
#[cfg(any(target_os = "linux", target_os = "macos"))]
fn read_ifaddrs() -> Vec<AddressRecord> {
    use std::ffi::CStr;

    let mut head: *mut libc::ifaddrs = std::ptr::null_mut();
    if unsafe { libc::getifaddrs(&mut head) } != 0 {
        tracing::warn!(
            error = %std::io::Error::last_os_error(),
            "Failed to enumerate network interfaces"
        );
        return Vec::new();
    }

    let mut records = Vec::new();
    let mut cursor = head;
    while !cursor.is_null() {
        // Nodes stay valid until freeifaddrs.
        let ifa = unsafe { &*cursor };
        cursor = ifa.ifa_next;
        if ifa.ifa_name.is_null() || ifa.ifa_addr.is_null() {
            continue;
        }

        let name = unsafe { CStr::from_ptr(ifa.ifa_name) }
            .to_string_lossy()
            .into_owned();
        let family = i32::from(unsafe { (*ifa.ifa_addr).sa_family });
        let link_mac = (family == LINK_FAMILY).then(|| unsafe { link_address(ifa.ifa_addr) });

        records.push(AddressRecord {
            name,
            flags: ifa.ifa_flags,
            link_mac,
        });
    }

    unsafe { libc::freeifaddrs(head) };
    records
}

/// Reads the hardware address of a link-layer node.
///
/// # Safety
///
/// `addr` must point to a live `sockaddr_ll` from `getifaddrs`.
#[cfg(target_os = "linux")]
unsafe fn link_address(addr: *const libc::sockaddr) -> String {
    let ll = unsafe { &*addr.cast::<libc::sockaddr_ll>() };
    format_mac(&ll.sll_addr[..MAC_LEN])
}

/// Reads the hardware address of a link-layer node.
///
/// # Safety
///
/// `addr` must point to a live `sockaddr_dl` from `getifaddrs`.
#[cfg(target_os = "macos")]
unsafe fn link_address(addr: *const libc::sockaddr) -> String {
    let dl = addr.cast::<libc::sockaddr_dl>();
    let (name_len, addr_len) =
        unsafe { (usize::from((*dl).sdl_nlen), usize::from((*dl).sdl_alen)) };
    if addr_len < MAC_LEN {
        return ZERO_MAC.to_string();
    }
    // The link address follows the interface name inside sdl_data.
    let bytes = unsafe {
        let data = std::ptr::addr_of!((*dl).sdl_data).cast::<u8>();
        std::slice::from_raw_parts(data.add(name_len), MAC_LEN)
    };
    format_mac(bytes)
}

/// Formats bytes as a lowercase colon-separated hardware address.
#[cfg_attr(not(any(target_os = "linux", target_os = "macos")), allow(dead_code))]
fn format_mac(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}

/// Parses `getmac /fo csv /nh` output into interface entries. Disconnected
/// adapters report `N/A` and are dropped.
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
fn parse_getmac(output: &str) -> Vec<InterfaceEntry> {
    output
        .lines()
        .filter_map(|line| {
            let mut cols = line.split(',').map(|c| c.trim().trim_matches('"'));
            let mac = cols.next()?;
            let name = cols.next().unwrap_or_default();
            if mac.len() != 17 {
                return None;
            }
            Some(InterfaceEntry {
                name: name.to_string(),
                mac: mac.replace('-', ":").to_ascii_lowercase(),
                internal: false,
                active: true,
            })
        })
        .collect()
}
