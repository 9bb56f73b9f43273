//! # Downlink Records
//!
//! Configuration messages sent to a device, with the range checks applied
//! before encoding.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::protocol::*;
use crate::error::{CodecError, Result};

/// Device configuration switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SwitchMask {
    #[serde(default)]
    pub enable_confirmed_event_message: bool,
}

/// Base (LoRaWAN and housekeeping) configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfiguration {
    #[serde(default)]
    pub switch_mask: SwitchMask,

    pub communication_max_retries: u32,

    #[serde(default)]
    pub number_of_unconfirmed_messages: Option<u32>,

    /// Older documents use this name; `number_of_unconfirmed_messages` wins
    /// when both are present
    #[serde(default, skip_serializing)]
    pub unconfirmed_repeat: Option<u32>,

    pub periodic_message_random_delay_seconds: u8,

    pub status_message_interval_seconds: u32,

    pub status_message_confirmed_interval: u8,

    pub lora_failure_holdoff_count: u32,

    pub lora_system_recover_count: u32,

    pub lorawan_fsb_mask: [u16; FSB_MASK_WORDS],
}

impl DeviceConfiguration {
    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns error if any value is outside the range the firmware
    /// accepts, or if the unconfirmed message count is missing.
    pub fn validate(&self) -> Result<()> {
        let unconfirmed = self.unconfirmed_messages()?;
        if !(1..=5).contains(&unconfirmed) {
            return Err(CodecError::invalid_field("number_of_unconfirmed_messages", unconfirmed));
        }

        if !(1..=255).contains(&self.communication_max_retries) {
            return Err(CodecError::invalid_field(
                "communication_max_retries",
                self.communication_max_retries,
            ));
        }

        if !(60..=604_800).contains(&self.status_message_interval_seconds) {
            return Err(CodecError::invalid_field(
                "status_message_interval_seconds",
                self.status_message_interval_seconds,
            ));
        }

        if self.lora_failure_holdoff_count > 255 {
            return Err(CodecError::invalid_field(
                "lora_failure_holdoff_count",
                self.lora_failure_holdoff_count,
            ));
        }

        if self.lora_system_recover_count > 255 {
            return Err(CodecError::invalid_field(
                "lora_system_recover_count",
                self.lora_system_recover_count,
            ));
        }

        Ok(())
    }

    /// Unconfirmed message count, which has no default
    pub fn unconfirmed_messages(&self) -> Result<u32> {
        self.number_of_unconfirmed_messages
            .or(self.unconfirmed_repeat)
            .ok_or(CodecError::MissingRequiredField("number_of_unconfirmed_messages"))
    }

    /// Status interval as sent on the wire, in whole minutes
    pub fn status_message_interval_minutes(&self) -> u16 {
        (self.status_message_interval_seconds / 60) as u16
    }
}

/// One of the four threshold event slots
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventConfiguration {
    #[serde(default)]
    pub mode: EventMode,

    /// Threshold in °C, sent with 0.1 °C resolution
    pub threshold_temperature: f64,

    pub measurement_window: u8,
}

impl EventConfiguration {
    /// Threshold in tenths of a degree
    ///
    /// The scaled value is rounded to the nearest tenth, so `2.3` is sent as
    /// 23. Encoders that truncate send 22 for the same document, which gives
    /// a different frame and CRC.
    ///
    /// # Errors
    ///
    /// Returns error if the scaled threshold does not fit in 16 bits.
    pub fn threshold_tenths(&self) -> Result<i16> {
        let tenths = (self.threshold_temperature * 10.0).round();
        if !tenths.is_finite() || tenths < i16::MIN as f64 || tenths > i16::MAX as f64 {
            return Err(CodecError::invalid_field(
                "threshold_temperature",
                self.threshold_temperature,
            ));
        }
        Ok(tenths as i16)
    }
}

/// Temperature transmitter application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationConfiguration {
    pub device_type: DeviceType,

    /// Protocol version 2 only
    #[serde(default)]
    pub enable_rtd: bool,

    /// Protocol version 3 only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor_type: Option<SensorType>,

    pub temperature_measurement_interval_seconds: u16,

    pub periodic_event_message_interval: u16,

    pub events: [EventConfiguration; APPLICATION_EVENT_SLOTS],
}

impl ApplicationConfiguration {
    /// Validate configuration values for a protocol version
    ///
    /// # Errors
    ///
    /// Returns error if the device type is not `tt`, a version 3 sensor
    /// type is missing, or a threshold is out of range.
    pub fn validate(&self, version: ProtocolVersion) -> Result<()> {
        if self.device_type != DeviceType::Tt {
            return Err(CodecError::invalid_field("device_type", self.device_type));
        }

        if version == ProtocolVersion::V3 && self.sensor_type.is_none() {
            return Err(CodecError::MissingRequiredField("sensor_type"));
        }

        for event in &self.events {
            event.threshold_tenths()?;
        }

        Ok(())
    }
}

/// Configuration carried by a downlink
#[derive(Debug, Clone, PartialEq)]
pub enum Configuration {
    Device(DeviceConfiguration),
    Application(ApplicationConfiguration),
}

/// A downlink ready to be encoded
#[derive(Debug, Clone, PartialEq)]
pub struct DownlinkMessage {
    pub protocol_version: ProtocolVersion,
    pub configuration: Configuration,
}

impl DownlinkMessage {
    pub fn device(protocol_version: ProtocolVersion, configuration: DeviceConfiguration) -> Self {
        Self {
            protocol_version,
            configuration: Configuration::Device(configuration),
        }
    }

    pub fn application(
        protocol_version: ProtocolVersion,
        configuration: ApplicationConfiguration,
    ) -> Self {
        Self {
            protocol_version,
            configuration: Configuration::Application(configuration),
        }
    }

    pub fn message_type(&self) -> MessageType {
        match self.configuration {
            Configuration::Device(_) => MessageType::DeviceConfiguration,
            Configuration::Application(_) => MessageType::ApplicationConfiguration,
        }
    }

    pub fn header(&self) -> Header {
        Header::new(self.protocol_version, self.message_type())
    }
}

// Document fields are read wide and narrowed afterwards, so out-of-range
// numbers and unknown names come back as `InvalidFieldValue`.

#[derive(Debug, Deserialize)]
struct DeviceConfigurationFields {
    #[serde(default)]
    switch_mask: SwitchMask,
    communication_max_retries: i64,
    #[serde(default)]
    number_of_unconfirmed_messages: Option<i64>,
    #[serde(default)]
    unconfirmed_repeat: Option<i64>,
    periodic_message_random_delay_seconds: i64,
    status_message_interval_seconds: i64,
    status_message_confirmed_interval: i64,
    lora_failure_holdoff_count: i64,
    lora_system_recover_count: i64,
    lorawan_fsb_mask: [i64; FSB_MASK_WORDS],
}

#[derive(Debug, Deserialize)]
struct EventConfigurationFields {
    #[serde(default)]
    mode: EventMode,
    threshold_temperature: f64,
    measurement_window: i64,
}

#[derive(Debug, Deserialize)]
struct ApplicationConfigurationFields {
    device_type: String,
    #[serde(default)]
    enable_rtd: bool,
    #[serde(default)]
    sensor_type: Option<String>,
    temperature_measurement_interval_seconds: i64,
    periodic_event_message_interval: i64,
    events: [EventConfigurationFields; APPLICATION_EVENT_SLOTS],
}

fn narrow<T: TryFrom<i64>>(field: &'static str, value: i64) -> Result<T> {
    T::try_from(value).map_err(|_| CodecError::invalid_field(field, value))
}

impl TryFrom<DeviceConfigurationFields> for DeviceConfiguration {
    type Error = CodecError;

    fn try_from(fields: DeviceConfigurationFields) -> Result<Self> {
        let mut lorawan_fsb_mask = [0u16; FSB_MASK_WORDS];
        for (word, value) in lorawan_fsb_mask.iter_mut().zip(fields.lorawan_fsb_mask) {
            *word = narrow("lorawan_fsb_mask", value)?;
        }

        Ok(DeviceConfiguration {
            switch_mask: fields.switch_mask,
            communication_max_retries: narrow(
                "communication_max_retries",
                fields.communication_max_retries,
            )?,
            number_of_unconfirmed_messages: fields
                .number_of_unconfirmed_messages
                .map(|value| narrow("number_of_unconfirmed_messages", value))
                .transpose()?,
            unconfirmed_repeat: fields
                .unconfirmed_repeat
                .map(|value| narrow("unconfirmed_repeat", value))
                .transpose()?,
            periodic_message_random_delay_seconds: narrow(
                "periodic_message_random_delay_seconds",
                fields.periodic_message_random_delay_seconds,
            )?,
            status_message_interval_seconds: narrow(
                "status_message_interval_seconds",
                fields.status_message_interval_seconds,
            )?,
            status_message_confirmed_interval: narrow(
                "status_message_confirmed_interval",
                fields.status_message_confirmed_interval,
            )?,
            lora_failure_holdoff_count: narrow(
                "lora_failure_holdoff_count",
                fields.lora_failure_holdoff_count,
            )?,
            lora_system_recover_count: narrow(
                "lora_system_recover_count",
                fields.lora_system_recover_count,
            )?,
            lorawan_fsb_mask,
        })
    }
}

impl TryFrom<ApplicationConfigurationFields> for ApplicationConfiguration {
    type Error = CodecError;

    fn try_from(fields: ApplicationConfigurationFields) -> Result<Self> {
        let mut events = [EventConfiguration {
            mode: EventMode::Off,
            threshold_temperature: 0.0,
            measurement_window: 0,
        }; APPLICATION_EVENT_SLOTS];
        for (event, slot) in events.iter_mut().zip(fields.events) {
            *event = EventConfiguration {
                mode: slot.mode,
                threshold_temperature: slot.threshold_temperature,
                measurement_window: narrow("measurement_window", slot.measurement_window)?,
            };
        }

        Ok(ApplicationConfiguration {
            device_type: fields.device_type.parse()?,
            enable_rtd: fields.enable_rtd,
            sensor_type: fields.sensor_type.map(|name| name.parse()).transpose()?,
            temperature_measurement_interval_seconds: narrow(
                "temperature_measurement_interval_seconds",
                fields.temperature_measurement_interval_seconds,
            )?,
            periodic_event_message_interval: narrow(
                "periodic_event_message_interval",
                fields.periodic_event_message_interval,
            )?,
            events,
        })
    }
}

/// Header as written in configuration documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentHeader {
    pub protocol_version: u8,
    pub message_type: String,
}

/// Downlink in network-server document form
///
/// ```text
/// { "header": { "protocol_version": 3, "message_type": "device_configuration" },
///   "communication_max_retries": 3, ... }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownlinkDocument {
    pub header: DocumentHeader,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl TryFrom<DownlinkDocument> for DownlinkMessage {
    type Error = CodecError;

    fn try_from(document: DownlinkDocument) -> Result<Self> {
        let protocol_version = ProtocolVersion::try_from(document.header.protocol_version)?;
        let message_type: MessageType = document.header.message_type.parse()?;
        let fields = Value::Object(document.fields);

        match message_type {
            MessageType::DeviceConfiguration => {
                let fields: DeviceConfigurationFields = serde_json::from_value(fields)?;
                Ok(DownlinkMessage::device(protocol_version, fields.try_into()?))
            }
            MessageType::ApplicationConfiguration => {
                let fields: ApplicationConfigurationFields = serde_json::from_value(fields)?;
                Ok(DownlinkMessage::application(protocol_version, fields.try_into()?))
            }
            other => Err(CodecError::UnsupportedMessageType(other.name().to_string())),
        }
    }
}
