//! # Uplink Records
//!
//! Structured forms of the messages a device sends. Serialized records
//! follow the network-server object shape: `{"header": {..}, "boot": {..}}`.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use super::protocol::{DeviceType, Header, Trigger};
use super::values::{ApplicationTemperature, RebootInfo};

fn hex_u8<S: Serializer>(value: &u8, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&format_args!("0x{:02X}", value))
}

fn hex_u16<S: Serializer>(value: &u16, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&format_args!("0x{:04X}", value))
}

fn hex_u32<S: Serializer>(value: &u32, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&format_args!("0x{:08X}", value))
}

fn flag<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*value))
}

/// Sent once after every (re)start
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BootMessage {
    pub device_type: DeviceType,

    /// Firmware version hash
    #[serde(serialize_with = "hex_u32")]
    pub version_hash: u32,

    #[serde(serialize_with = "hex_u16")]
    pub device_config_crc: u16,

    #[serde(serialize_with = "hex_u16")]
    pub application_config_crc: u16,

    #[serde(serialize_with = "hex_u8")]
    pub reset_flags: u8,

    pub reboot_counter: u8,

    pub reboot_info: RebootInfo,

    pub last_device_state: u8,

    /// Built-in self test result
    #[serde(serialize_with = "hex_u8")]
    pub bist: u8,
}

/// Temperature event from the application
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationEvent {
    pub trigger: Trigger,

    pub temperature: ApplicationTemperature,

    #[serde(serialize_with = "flag")]
    pub condition_0: bool,

    #[serde(serialize_with = "flag")]
    pub condition_1: bool,

    #[serde(serialize_with = "flag")]
    pub condition_2: bool,

    #[serde(serialize_with = "flag")]
    pub condition_3: bool,
}

/// Battery voltages in volts
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BatteryVoltage {
    pub low: f64,
    pub high: f64,
    pub settle: f64,
}

/// Internal device temperature in °C
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeviceTemperature {
    pub min: i8,
    pub max: i8,
    pub avg: i8,
}

/// Periodic health report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceStatus {
    #[serde(serialize_with = "hex_u16")]
    pub device_config_crc: u16,

    #[serde(serialize_with = "hex_u16")]
    pub application_config_crc: u16,

    pub event_counter: u8,

    pub battery_voltage: BatteryVoltage,

    pub temperature: DeviceTemperature,

    pub tx_counter: u8,

    /// Average RSSI in dBm
    pub avg_rssi: i16,

    /// Average SNR in dB
    pub avg_snr: i8,
}

/// Message body selected by the header
#[derive(Debug, Clone, PartialEq)]
pub enum UplinkBody {
    Boot(BootMessage),
    Activated,
    Deactivated,
    ApplicationEvent(ApplicationEvent),
    DeviceStatus(DeviceStatus),
}

/// A decoded uplink
#[derive(Debug, Clone, PartialEq)]
pub struct UplinkMessage {
    pub header: Header,
    pub body: UplinkBody,
}

impl Serialize for UplinkMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("header", &self.header)?;
        match &self.body {
            UplinkBody::Boot(boot) => map.serialize_entry("boot", boot)?,
            UplinkBody::ApplicationEvent(event) => map.serialize_entry("application_event", event)?,
            UplinkBody::DeviceStatus(status) => map.serialize_entry("device_status", status)?,
            UplinkBody::Activated | UplinkBody::Deactivated => {}
        }
        map.end()
    }
}
