//! Card status information reported by the select flow

use std::fmt;

use derive_more::Display;

/// Applet version (major.minor)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[display("{}.{}", major, minor)]
pub struct Version {
    /// Major version
    pub major: u8,
    /// Minor version
    pub minor: u8,
}

/// Capability flags for the card applet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Secure channel support
    SecureChannel = 0x01,
    /// Key management support
    KeyManagement = 0x02,
    /// Credentials management support
    CredentialsManagement = 0x04,
    /// NDEF support
    Ndef = 0x08,
}

/// Capabilities flags container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities(u8);

impl Capabilities {
    /// Build a flag set from individual capabilities
    pub fn new(capabilities: &[Capability]) -> Self {
        Self(capabilities.iter().fold(0, |flags, &cap| flags | cap as u8))
    }

    /// Whether the given capability is present
    pub const fn has_capability(&self, capability: Capability) -> bool {
        self.0 & capability as u8 != 0
    }
}

impl From<u8> for Capabilities {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

impl fmt::Display for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut capabilities = Vec::new();
        if self.has_capability(Capability::SecureChannel) {
            capabilities.push("Secure Channel");
        }
        if self.has_capability(Capability::KeyManagement) {
            capabilities.push("Key Management");
        }
        if self.has_capability(Capability::CredentialsManagement) {
            capabilities.push("Credentials Management");
        }
        if self.has_capability(Capability::Ndef) {
            capabilities.push("NDEF");
        }
        write!(f, "{}", capabilities.join(", "))
    }
}

/// Status fields reported after selecting the card applet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardInfo {
    /// Whether the card has been initialized
    pub initialized: bool,
    /// Instance UID (16 bytes)
    pub instance_uid: [u8; 16],
    /// Applet firmware version
    pub version: Version,
    /// Number of free pairing slots
    pub free_pairing_slots: u8,
    /// Supported capabilities
    pub capabilities: Capabilities,
    /// Secure channel public key (65-byte uncompressed SEC1), if any
    pub public_key: Option<Vec<u8>>,
}

impl fmt::Display for CardInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Card Status:")?;
        writeln!(f, "  Initialized: {}", self.initialized)?;
        writeln!(f, "  Instance UID: {}", hex::encode(self.instance_uid))?;
        writeln!(f, "  Firmware version: {}", self.version)?;
        writeln!(f, "  Free pairing slots: {}", self.free_pairing_slots)?;
        writeln!(f, "  Capabilities: {}", self.capabilities)?;
        write!(f, "  Secure channel public key: ")?;
        match &self.public_key {
            Some(public_key) => write!(f, "0x{}", hex::encode(public_key)),
            None => write!(f, "None"),
        }
    }
}
