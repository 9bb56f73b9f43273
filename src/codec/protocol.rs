//! # Protocol Constants and Types
//!
//! Header layout, name tables and enumerations shared by both directions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CodecError, Result};

/// LoRaWAN port used when the caller does not supply one
pub const DEFAULT_PORT: u8 = 15;

/// Header length in bytes
pub const HEADER_LENGTH: usize = 1;

/// Boot message length, header included
pub const BOOT_MESSAGE_LENGTH: usize = 23;

/// Application event message length, header included
pub const APPLICATION_EVENT_MESSAGE_LENGTH: usize = 9;

/// Device status message length, header included
pub const DEVICE_STATUS_MESSAGE_LENGTH: usize = 18;

/// Reboot info payload length
pub const REBOOT_INFO_LENGTH: usize = 8;

/// Number of event slots in the application configuration
pub const APPLICATION_EVENT_SLOTS: usize = 4;

/// Number of LoRaWAN frequency sub-band mask words
pub const FSB_MASK_WORDS: usize = 5;

/// Supported protocol revisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ProtocolVersion {
    V2,
    V3,
}

impl ProtocolVersion {
    pub fn as_u8(self) -> u8 {
        match self {
            ProtocolVersion::V2 => 2,
            ProtocolVersion::V3 => 3,
        }
    }
}

impl TryFrom<u8> for ProtocolVersion {
    type Error = CodecError;

    fn try_from(version: u8) -> Result<Self> {
        match version {
            2 => Ok(ProtocolVersion::V2),
            3 => Ok(ProtocolVersion::V3),
            other => Err(CodecError::UnsupportedProtocolVersion(other)),
        }
    }
}

impl From<ProtocolVersion> for u8 {
    fn from(version: ProtocolVersion) -> Self {
        version.as_u8()
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// Message kinds carried in the low header nibble
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Boot,
    Activated,
    Deactivated,
    ApplicationEvent,
    DeviceStatus,
    DeviceConfiguration,
    ApplicationConfiguration,
}

/// Message type names indexed by type id
const MESSAGE_TYPE_NAMES: [&str; 7] = [
    "boot",
    "activated",
    "deactivated",
    "application_event",
    "device_status",
    "device_configuration",
    "application_configuration",
];

impl MessageType {
    /// Look up a message type by its header id
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(MessageType::Boot),
            1 => Some(MessageType::Activated),
            2 => Some(MessageType::Deactivated),
            3 => Some(MessageType::ApplicationEvent),
            4 => Some(MessageType::DeviceStatus),
            5 => Some(MessageType::DeviceConfiguration),
            6 => Some(MessageType::ApplicationConfiguration),
            _ => None,
        }
    }

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        MESSAGE_TYPE_NAMES[self as usize]
    }

    /// Name for a raw type id, `"unknown"` when out of range
    pub fn name_of(id: u8) -> &'static str {
        MESSAGE_TYPE_NAMES
            .get(id as usize)
            .copied()
            .unwrap_or("unknown")
    }
}

impl FromStr for MessageType {
    type Err = CodecError;

    fn from_str(name: &str) -> Result<Self> {
        MESSAGE_TYPE_NAMES
            .iter()
            .position(|&candidate| candidate == name)
            .and_then(|id| MessageType::from_id(id as u8))
            .ok_or_else(|| CodecError::UnsupportedMessageType(name.to_string()))
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// First byte of every message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Header {
    pub protocol_version: ProtocolVersion,
    pub message_type: MessageType,
}

impl Header {
    pub fn new(protocol_version: ProtocolVersion, message_type: MessageType) -> Self {
        Self {
            protocol_version,
            message_type,
        }
    }

    /// Parse a header byte: version in the high nibble, type in the low nibble
    ///
    /// # Errors
    ///
    /// Returns error if the version is not 2 or 3, or the type id is
    /// not assigned.
    pub fn from_byte(byte: u8) -> Result<Self> {
        let protocol_version = ProtocolVersion::try_from(byte >> 4)?;
        let type_id = byte & 0x0F;
        let message_type = MessageType::from_id(type_id).ok_or_else(|| {
            CodecError::UnsupportedMessageType(format!(
                "{} ({})",
                MessageType::name_of(type_id),
                type_id
            ))
        })?;

        Ok(Self::new(protocol_version, message_type))
    }

    pub fn to_byte(self) -> u8 {
        (self.protocol_version.as_u8() << 4) | (self.message_type.id() & 0x0F)
    }
}

/// Device families reported in boot messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum DeviceType {
    Reserved,
    Ts,
    VsQt,
    VsMt,
    Tt,
    Unknown(u8),
}

impl DeviceType {
    pub fn from_id(id: u8) -> Self {
        match id {
            0 => DeviceType::Reserved,
            1 => DeviceType::Ts,
            2 => DeviceType::VsQt,
            3 => DeviceType::VsMt,
            4 => DeviceType::Tt,
            other => DeviceType::Unknown(other),
        }
    }

    /// Wire id, `None` for the reserved and unknown codes
    pub fn id(self) -> Option<u8> {
        match self {
            DeviceType::Ts => Some(1),
            DeviceType::VsQt => Some(2),
            DeviceType::VsMt => Some(3),
            DeviceType::Tt => Some(4),
            DeviceType::Reserved | DeviceType::Unknown(_) => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            DeviceType::Reserved => "",
            DeviceType::Ts => "ts",
            DeviceType::VsQt => "vs-qt",
            DeviceType::VsMt => "vs-mt",
            DeviceType::Tt => "tt",
            DeviceType::Unknown(_) => "unknown",
        }
    }
}

impl FromStr for DeviceType {
    type Err = CodecError;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "ts" => Ok(DeviceType::Ts),
            "vs-qt" => Ok(DeviceType::VsQt),
            "vs-mt" => Ok(DeviceType::VsMt),
            "tt" => Ok(DeviceType::Tt),
            other => Err(CodecError::invalid_field("device_type", other)),
        }
    }
}

impl TryFrom<String> for DeviceType {
    type Error = CodecError;

    fn try_from(name: String) -> Result<Self> {
        name.parse()
    }
}

impl From<DeviceType> for String {
    fn from(device_type: DeviceType) -> Self {
        device_type.name().to_string()
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Temperature probe fitted to a protocol version 3 device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum SensorType {
    Pt100,
    J,
    K,
    T,
    N,
    E,
    B,
    R,
    S,
}

impl SensorType {
    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            SensorType::Pt100 => "PT100",
            SensorType::J => "J",
            SensorType::K => "K",
            SensorType::T => "T",
            SensorType::N => "N",
            SensorType::E => "E",
            SensorType::B => "B",
            SensorType::R => "R",
            SensorType::S => "S",
        }
    }
}

impl FromStr for SensorType {
    type Err = CodecError;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "PT100" => Ok(SensorType::Pt100),
            "J" => Ok(SensorType::J),
            "K" => Ok(SensorType::K),
            "T" => Ok(SensorType::T),
            "N" => Ok(SensorType::N),
            "E" => Ok(SensorType::E),
            "B" => Ok(SensorType::B),
            "R" => Ok(SensorType::R),
            "S" => Ok(SensorType::S),
            other => Err(CodecError::invalid_field("sensor_type", other)),
        }
    }
}

impl TryFrom<String> for SensorType {
    type Error = CodecError;

    fn try_from(name: String) -> Result<Self> {
        name.parse()
    }
}

impl From<SensorType> for String {
    fn from(sensor_type: SensorType) -> Self {
        sensor_type.name().to_string()
    }
}

/// What caused an application event message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum Trigger {
    Timer,
    Condition0,
    Condition1,
    Condition2,
    Condition3,
    Unknown(u8),
}

impl Trigger {
    pub fn from_id(id: u8) -> Self {
        match id {
            0 => Trigger::Timer,
            1 => Trigger::Condition0,
            2 => Trigger::Condition1,
            3 => Trigger::Condition2,
            4 => Trigger::Condition3,
            other => Trigger::Unknown(other),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Trigger::Timer => "timer",
            Trigger::Condition0 => "condition_0",
            Trigger::Condition1 => "condition_1",
            Trigger::Condition2 => "condition_2",
            Trigger::Condition3 => "condition_3",
            Trigger::Unknown(_) => "unknown",
        }
    }
}

impl From<Trigger> for String {
    fn from(trigger: Trigger) -> Self {
        trigger.name().to_string()
    }
}

/// Threshold behaviour of one application event slot
///
/// Unrecognized names fall back to `Off`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum EventMode {
    #[default]
    Off,
    Above,
    Below,
    Increasing,
    Decreasing,
}

impl EventMode {
    pub fn id(self) -> u8 {
        self as u8
    }
}

impl From<String> for EventMode {
    fn from(name: String) -> Self {
        match name.as_str() {
            "above" => EventMode::Above,
            "below" => EventMode::Below,
            "increasing" => EventMode::Increasing,
            "decreasing" => EventMode::Decreasing,
            _ => EventMode::Off,
        }
    }
}
