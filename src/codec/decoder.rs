//! # Uplink Decoder
//!
//! Decodes boot, activated, deactivated, application event and device
//! status messages.

use tracing::{debug, trace};

use super::primitives::ByteReader;
use super::protocol::*;
use super::uplink::*;
use super::values::{decode_application_temperature, decode_reboot_info};
use crate::error::{CodecError, Result};

/// Decode an uplink payload
///
/// # Arguments
///
/// * `port` - LoRaWAN port the payload arrived on
/// * `bytes` - Complete payload, header byte first
///
/// # Returns
///
/// * `Result<UplinkMessage>` - Decoded message, or error if invalid
///
/// # Errors
///
/// Returns error if:
/// - Payload is empty or its length does not match the message layout
/// - Protocol version is not 2 or 3
/// - Message type is not an uplink type
///
/// # Examples
///
/// ```
/// use tt_codec::codec::decoder::decode;
/// use tt_codec::codec::protocol::MessageType;
///
/// let message = decode(15, &[0x31]).unwrap();
/// assert_eq!(message.header.message_type, MessageType::Activated);
/// ```
pub fn decode(port: u8, bytes: &[u8]) -> Result<UplinkMessage> {
    let &header_byte = bytes.first().ok_or(CodecError::InvalidMessageLength {
        message: "header",
        expected: HEADER_LENGTH,
        actual: 0,
    })?;

    let header = Header::from_byte(header_byte)?;
    trace!(
        "Decoding {} (protocol version {}) from {} bytes on port {}",
        header.message_type,
        header.protocol_version,
        bytes.len(),
        port
    );

    let mut reader = ByteReader::at(bytes, HEADER_LENGTH);

    let body = match header.message_type {
        MessageType::Boot => UplinkBody::Boot(decode_boot_message(bytes, &mut reader)?),
        MessageType::Activated => UplinkBody::Activated,
        MessageType::Deactivated => UplinkBody::Deactivated,
        MessageType::ApplicationEvent => UplinkBody::ApplicationEvent(
            decode_application_event(bytes, &mut reader, header.protocol_version)?,
        ),
        MessageType::DeviceStatus => {
            UplinkBody::DeviceStatus(decode_device_status(bytes, &mut reader)?)
        }
        other @ (MessageType::DeviceConfiguration | MessageType::ApplicationConfiguration) => {
            return Err(CodecError::UnsupportedMessageType(other.name().to_string()));
        }
    };

    debug!("Decoded {} message", header.message_type);

    Ok(UplinkMessage { header, body })
}

/// Decode an uplink given as a hex string, on the default port
///
/// # Errors
///
/// Returns error if the string has odd length or non-hex characters, or
/// if the payload itself is invalid.
pub fn decode_hex(hex_string: &str) -> Result<UplinkMessage> {
    let bytes = hex::decode(hex_string)?;
    decode(DEFAULT_PORT, &bytes)
}

fn check_length(message: &'static str, bytes: &[u8], expected: usize) -> Result<()> {
    if bytes.len() != expected {
        return Err(CodecError::InvalidMessageLength {
            message,
            expected,
            actual: bytes.len(),
        });
    }
    Ok(())
}

/// Decode a boot message body (bytes 1..23)
pub fn decode_boot_message(bytes: &[u8], reader: &mut ByteReader<'_>) -> Result<BootMessage> {
    check_length("boot", bytes, BOOT_MESSAGE_LENGTH)?;

    let device_type = DeviceType::from_id(reader.read_u8()?);
    let version_hash = reader.read_u32()?;
    let device_config_crc = reader.read_u16()?;
    let application_config_crc = reader.read_u16()?;
    let reset_flags = reader.read_u8()?;
    let reboot_counter = reader.read_u8()?;
    let reboot_type = reader.read_u8()?;
    let reboot_info = decode_reboot_info(reboot_type, reader)?;
    let last_device_state = reader.read_u8()?;
    let bist = reader.read_u8()?;

    Ok(BootMessage {
        device_type,
        version_hash,
        device_config_crc,
        application_config_crc,
        reset_flags,
        reboot_counter,
        reboot_info,
        last_device_state,
        bist,
    })
}

/// Decode an application event body (bytes 1..9)
pub fn decode_application_event(
    bytes: &[u8],
    reader: &mut ByteReader<'_>,
    version: ProtocolVersion,
) -> Result<ApplicationEvent> {
    check_length("application_event", bytes, APPLICATION_EVENT_MESSAGE_LENGTH)?;

    let trigger = Trigger::from_id(reader.read_u8()?);
    let temperature = decode_application_temperature(reader, version)?;
    let conditions = reader.read_u8()?;

    Ok(ApplicationEvent {
        trigger,
        temperature,
        condition_0: conditions & 0x01 != 0,
        condition_1: conditions & 0x02 != 0,
        condition_2: conditions & 0x04 != 0,
        condition_3: conditions & 0x08 != 0,
    })
}

/// Decode a device status body (bytes 1..18)
pub fn decode_device_status(bytes: &[u8], reader: &mut ByteReader<'_>) -> Result<DeviceStatus> {
    check_length("device_status", bytes, DEVICE_STATUS_MESSAGE_LENGTH)?;

    let device_config_crc = reader.read_u16()?;
    let application_config_crc = reader.read_u16()?;
    let event_counter = reader.read_u8()?;

    // Millivolts
    let battery_voltage = BatteryVoltage {
        low: reader.read_u16()? as f64 / 1000.0,
        high: reader.read_u16()? as f64 / 1000.0,
        settle: reader.read_u16()? as f64 / 1000.0,
    };

    let temperature = DeviceTemperature {
        min: reader.read_i8()?,
        max: reader.read_i8()?,
        avg: reader.read_i8()?,
    };

    let tx_counter = reader.read_u8()?;
    let avg_rssi = -(reader.read_u8()? as i16);
    let avg_snr = reader.read_i8()?;

    Ok(DeviceStatus {
        device_config_crc,
        application_config_crc,
        event_counter,
        battery_voltage,
        temperature,
        tx_counter,
        avg_rssi,
        avg_snr,
    })
}
