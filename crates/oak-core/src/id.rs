//! Device identity
//!
//! Devices are identified by a 96-bit hardware id, rendered as 24
//! lowercase hex characters.

use std::fmt;
use std::str::FromStr;

use crate::CloudError;

/// Length of a device id in bytes
pub const DEVICE_ID_LEN: usize = 12;

/// Length of a device id in hex characters
pub const DEVICE_ID_HEX_LEN: usize = DEVICE_ID_LEN * 2;

/// Hardware device identity
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DeviceId(pub [u8; DEVICE_ID_LEN]);

impl DeviceId {
    pub const ZERO: DeviceId = DeviceId([0; DEVICE_ID_LEN]);

    #[inline]
    pub fn new(bytes: [u8; DEVICE_ID_LEN]) -> Self {
        DeviceId(bytes)
    }

    #[inline]
    pub fn to_bytes(self) -> [u8; DEVICE_ID_LEN] {
        self.0
    }

    /// Parse a 24 character hex string, either case
    pub fn from_hex(s: &str) -> Result<Self, CloudError> {
        let raw = s.as_bytes();
        if raw.len() != DEVICE_ID_HEX_LEN {
            return Err(CloudError::InvalidDeviceId(s.to_string()));
        }

        let mut bytes = [0u8; DEVICE_ID_LEN];
        for (i, pair) in raw.chunks_exact(2).enumerate() {
            let hi = hex_digit(pair[0]).ok_or_else(|| CloudError::InvalidDeviceId(s.to_string()))?;
            let lo = hex_digit(pair[1]).ok_or_else(|| CloudError::InvalidDeviceId(s.to_string()))?;
            bytes[i] = (hi << 4) | lo;
        }
        Ok(DeviceId(bytes))
    }

    /// Lowercase hex rendering without heap allocation
    pub fn to_hex(self) -> heapless::String<DEVICE_ID_HEX_LEN> {
        const DIGITS: &[u8; 16] = b"0123456789abcdef";
        let mut out = heapless::String::new();
        for b in self.0 {
            // Capacity is exactly two digits per byte.
            let _ = out.push(DIGITS[(b >> 4) as usize] as char);
            let _ = out.push(DIGITS[(b & 0x0F) as usize] as char);
        }
        out
    }
}

fn hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl FromStr for DeviceId {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeviceId::from_hex(s)
    }
}

impl fmt::Debug for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Device({})", self.to_hex())
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
