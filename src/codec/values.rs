//! # Domain Value Decoders
//!
//! Composite values embedded in uplink messages: reboot info and the
//! application temperature triple.

use std::fmt;

use serde::{Serialize, Serializer};

use super::primitives::ByteReader;
use super::protocol::{ProtocolVersion, REBOOT_INFO_LENGTH};
use crate::error::Result;

/// Reason for the last device restart, as reported in the boot message
///
/// Holds the raw tag and payload. [`fmt::Display`] renders the
/// human-readable description used in serialized records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RebootInfo {
    /// Reboot type tag (0-5 are assigned)
    pub reboot_type: u8,

    /// Raw payload in storage order
    pub payload: [u8; REBOOT_INFO_LENGTH],
}

/// Interpretation of a reboot type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebootKind {
    None,
    PowerCycle,
    Watchdog,
    Assert,
    Application,
    SystemError,
    Unknown(u8),
}

impl RebootInfo {
    pub fn new(reboot_type: u8, payload: [u8; REBOOT_INFO_LENGTH]) -> Self {
        Self {
            reboot_type,
            payload,
        }
    }

    pub fn kind(&self) -> RebootKind {
        match self.reboot_type {
            0 => RebootKind::None,
            1 => RebootKind::PowerCycle,
            2 => RebootKind::Watchdog,
            3 => RebootKind::Assert,
            4 => RebootKind::Application,
            5 => RebootKind::SystemError,
            other => RebootKind::Unknown(other),
        }
    }

    /// Little-endian word at `offset` (0 or 4)
    fn word(&self, offset: usize) -> u32 {
        let mut word = [0u8; 4];
        word.copy_from_slice(&self.payload[offset..offset + 4]);
        u32::from_le_bytes(word)
    }

    /// Watchdog task tag with non-printable characters removed
    pub fn watchdog_tag(&self) -> String {
        self.payload[..4]
            .iter()
            .filter(|b| (0x20..=0x7E).contains(*b))
            .map(|&b| b as char)
            .collect()
    }

    /// Caller address of an assert or system error
    pub fn caller(&self) -> u32 {
        match self.kind() {
            RebootKind::SystemError => self.word(4),
            _ => self.word(0),
        }
    }

    /// Asserted value, error code or application reason
    pub fn value(&self) -> i32 {
        match self.kind() {
            RebootKind::Assert => self.word(4) as i32,
            _ => self.word(0) as i32,
        }
    }
}

impl fmt::Display for RebootInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            RebootKind::None => f.write_str("none"),
            RebootKind::PowerCycle => f.write_str("power cycle"),
            RebootKind::Watchdog => write!(f, "swdog ({})", self.watchdog_tag()),
            RebootKind::Assert => write!(
                f,
                "assert (caller: 0x{:08X}; value: {})",
                self.word(0),
                self.word(4) as i32
            ),
            RebootKind::Application => write!(f, "application (0x{:08X})", self.word(0)),
            RebootKind::SystemError => write!(
                f,
                "system (error: 0x{:08X}; caller: 0x{:08X})",
                self.word(0),
                self.word(4)
            ),
            RebootKind::Unknown(_) => {
                f.write_str("unknown (")?;
                for (i, byte) in self.payload.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "0x{:02X}", byte)?;
                }
                f.write_str(")")
            }
        }
    }
}

impl Serialize for RebootInfo {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Read the reboot payload that follows a reboot type tag
///
/// Always consumes eight bytes, whatever the tag.
pub fn decode_reboot_info(reboot_type: u8, reader: &mut ByteReader<'_>) -> Result<RebootInfo> {
    let payload = reader.read_array::<REBOOT_INFO_LENGTH>()?;
    Ok(RebootInfo::new(reboot_type, payload))
}

/// Raw tenths value signalling a PT100 lower bound error
pub const PT100_LOWER_ERROR_CODE: i16 = -30000;
/// Raw tenths value signalling a PT100 upper bound error
pub const PT100_UPPER_ERROR_CODE: i16 = -30010;
/// Raw tenths value signalling a voltage lower bound error
pub const VBOUND_LOWER_ERROR_CODE: i16 = -30020;
/// Raw tenths value signalling a voltage upper bound error
pub const VBOUND_UPPER_ERROR_CODE: i16 = -30030;
/// Raw tenths value signalling an unrecognized sensor
pub const UNKNOWN_SENSOR_ERROR_CODE: i16 = -30040;

/// Measurement status reported by protocol version 3 devices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TemperatureStatus {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "PT100 bound Lower Error")]
    Pt100LowerError,
    #[serde(rename = "PT100 bound Upper Error")]
    Pt100UpperError,
    #[serde(rename = "V bound Lower Error")]
    VboundLowerError,
    #[serde(rename = "V bound Upper Error")]
    VboundUpperError,
    #[serde(rename = "Unrecognized sensor type")]
    UnrecognizedSensor,
}

/// Sentinels in precedence order
const TEMPERATURE_SENTINELS: [(i16, TemperatureStatus); 5] = [
    (PT100_LOWER_ERROR_CODE, TemperatureStatus::Pt100LowerError),
    (PT100_UPPER_ERROR_CODE, TemperatureStatus::Pt100UpperError),
    (VBOUND_LOWER_ERROR_CODE, TemperatureStatus::VboundLowerError),
    (VBOUND_UPPER_ERROR_CODE, TemperatureStatus::VboundUpperError),
    (UNKNOWN_SENSOR_ERROR_CODE, TemperatureStatus::UnrecognizedSensor),
];

impl fmt::Display for TemperatureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TemperatureStatus::Ok => "OK",
            TemperatureStatus::Pt100LowerError => "PT100 bound Lower Error",
            TemperatureStatus::Pt100UpperError => "PT100 bound Upper Error",
            TemperatureStatus::VboundLowerError => "V bound Lower Error",
            TemperatureStatus::VboundUpperError => "V bound Upper Error",
            TemperatureStatus::UnrecognizedSensor => "Unrecognized sensor type",
        };
        f.write_str(text)
    }
}

/// Min / max / average over the last measurement window, in °C
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TemperatureReading {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

/// Application temperature block of an application event
///
/// Protocol version 2 always carries a reading and no status. Version 3
/// always carries a status; the reading is dropped when a sensor error
/// is reported.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ApplicationTemperature {
    #[serde(flatten)]
    pub reading: Option<TemperatureReading>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TemperatureStatus>,
}

/// Read the min, max and avg application temperatures
pub fn decode_application_temperature(
    reader: &mut ByteReader<'_>,
    version: ProtocolVersion,
) -> Result<ApplicationTemperature> {
    let min = reader.read_i16()?;
    let max = reader.read_i16()?;
    let avg = reader.read_i16()?;

    let reading = TemperatureReading {
        min: min as f64 / 10.0,
        max: max as f64 / 10.0,
        avg: avg as f64 / 10.0,
    };

    let temperature = match version {
        ProtocolVersion::V2 => ApplicationTemperature {
            reading: Some(reading),
            status: None,
        },
        ProtocolVersion::V3 => {
            let error = TEMPERATURE_SENTINELS
                .iter()
                .find(|(code, _)| min == *code || avg == *code || max == *code)
                .map(|&(_, status)| status);

            match error {
                Some(status) => ApplicationTemperature {
                    reading: None,
                    status: Some(status),
                },
                None => ApplicationTemperature {
                    reading: Some(reading),
                    status: Some(TemperatureStatus::Ok),
                },
            }
        }
    };

    Ok(temperature)
}
