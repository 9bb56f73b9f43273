//! # Downlink Encoder
//!
//! Encodes device and application configuration messages. Every frame is
//! header byte, body, then a CRC-16 over the body.

use tracing::{debug, trace};

use super::crc::crc16;
use super::downlink::*;
use super::primitives::ByteWriter;
use super::protocol::*;
use crate::error::{CodecError, Result};

/// Encoded downlink and the port to send it on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedDownlink {
    pub bytes: Vec<u8>,
    pub port: u8,
}

/// Encode a downlink message into a complete frame
///
/// # Arguments
///
/// * `port` - LoRaWAN port, echoed back with the frame
/// * `message` - Configuration to send
///
/// # Returns
///
/// * `Result<EncodedDownlink>` - Header + body + CRC (2 bytes, low byte first)
///
/// # Errors
///
/// Returns error if a configuration value is out of range, a required
/// field is missing, or an application configuration is not for a `tt`
/// device.
pub fn encode(port: u8, message: &DownlinkMessage) -> Result<EncodedDownlink> {
    let header = message.header();
    trace!(
        "Encoding {} (protocol version {}) for port {}",
        header.message_type,
        header.protocol_version,
        port
    );

    let mut writer = ByteWriter::with_capacity(32);
    writer.write_u8(header.to_byte());

    match &message.configuration {
        Configuration::Device(config) => encode_device_configuration(&mut writer, config)?,
        Configuration::Application(config) => {
            encode_application_configuration(&mut writer, message.protocol_version, config)?
        }
    }

    let crc = crc16(&writer.as_slice()[HEADER_LENGTH..]);
    writer.write_u16(crc);

    debug!("Encoded {} frame of {} bytes", header.message_type, writer.len());

    Ok(EncodedDownlink {
        bytes: writer.into_vec(),
        port,
    })
}

/// Device configuration body without header or CRC
pub fn encode_device_configuration_body(config: &DeviceConfiguration) -> Result<Vec<u8>> {
    let mut writer = ByteWriter::new();
    encode_device_configuration(&mut writer, config)?;
    Ok(writer.into_vec())
}

/// Application configuration body without header or CRC
pub fn encode_application_configuration_body(
    version: ProtocolVersion,
    config: &ApplicationConfiguration,
) -> Result<Vec<u8>> {
    let mut writer = ByteWriter::new();
    encode_application_configuration(&mut writer, version, config)?;
    Ok(writer.into_vec())
}

fn encode_device_configuration(writer: &mut ByteWriter, config: &DeviceConfiguration) -> Result<()> {
    config.validate()?;

    encode_switch_mask(writer, &config.switch_mask);
    writer.write_u8(config.communication_max_retries as u8);
    writer.write_u8(config.unconfirmed_messages()? as u8);
    writer.write_u8(config.periodic_message_random_delay_seconds); // s
    writer.write_u16(config.status_message_interval_minutes()); // min
    writer.write_u8(config.status_message_confirmed_interval);
    writer.write_u8(config.lora_failure_holdoff_count as u8);
    writer.write_u8(config.lora_system_recover_count as u8);
    for word in config.lorawan_fsb_mask {
        writer.write_u16(word);
    }

    Ok(())
}

fn encode_switch_mask(writer: &mut ByteWriter, mask: &SwitchMask) {
    let mut value = 0u8;
    if mask.enable_confirmed_event_message {
        value |= 1 << 0;
    }
    writer.write_u8(value);
}

fn encode_application_configuration(
    writer: &mut ByteWriter,
    version: ProtocolVersion,
    config: &ApplicationConfiguration,
) -> Result<()> {
    config.validate(version)?;

    let device_type = config
        .device_type
        .id()
        .ok_or_else(|| CodecError::invalid_field("device_type", config.device_type))?;

    match version {
        ProtocolVersion::V2 => {
            let rtd = if config.enable_rtd { 1 << 7 } else { 0 };
            writer.write_u8(device_type | rtd);
        }
        ProtocolVersion::V3 => {
            let sensor_type = config
                .sensor_type
                .ok_or(CodecError::MissingRequiredField("sensor_type"))?;
            writer.write_u8(device_type);
            writer.write_u8(sensor_type.id());
        }
    }

    writer.write_u16(config.temperature_measurement_interval_seconds); // s
    writer.write_u16(config.periodic_event_message_interval);

    for event in &config.events {
        writer.write_u8(event.mode.id());
        writer.write_i16(event.threshold_tenths()?); // 0.1 °C
        writer.write_u8(event.measurement_window);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::primitives::ByteReader;

    fn device_configuration() -> DeviceConfiguration {
        DeviceConfiguration {
            switch_mask: SwitchMask {
                enable_confirmed_event_message: true,
            },
            communication_max_retries: 3,
            number_of_unconfirmed_messages: Some(2),
            unconfirmed_repeat: None,
            periodic_message_random_delay_seconds: 60,
            status_message_interval_seconds: 86_400,
            status_message_confirmed_interval: 1,
            lora_failure_holdoff_count: 5,
            lora_system_recover_count: 10,
            lorawan_fsb_mask: [0x00FF, 0x0001, 0x0000, 0xFF00, 0x1234],
        }
    }

    fn application_configuration() -> ApplicationConfiguration {
        ApplicationConfiguration {
            device_type: DeviceType::Tt,
            enable_rtd: true,
            sensor_type: Some(SensorType::K),
            temperature_measurement_interval_seconds: 300,
            periodic_event_message_interval: 12,
            events: [
                EventConfiguration {
                    mode: EventMode::Above,
                    threshold_temperature: 25.5,
                    measurement_window: 1,
                },
                EventConfiguration {
                    mode: EventMode::Below,
                    threshold_temperature: -12.3,
                    measurement_window: 2,
                },
                EventConfiguration {
                    mode: EventMode::Increasing,
                    threshold_temperature: 2.0,
                    measurement_window: 3,
                },
                EventConfiguration {
                    mode: EventMode::Off,
                    threshold_temperature: 0.0,
                    measurement_window: 0,
                },
            ],
        }
    }

    #[test]
    fn test_encode_device_configuration_frame() {
        let message = DownlinkMessage::device(ProtocolVersion::V2, device_configuration());
        let encoded = encode(DEFAULT_PORT, &message).unwrap();

        assert_eq!(encoded.port, DEFAULT_PORT);
        assert_eq!(encoded.bytes.len(), 22);
        assert_eq!(encoded.bytes[0], 0x25);

        let body = &encoded.bytes[1..20];
        assert_eq!(
            body,
            &[
                0x01, // switch mask
                0x03, // retries
                0x02, // unconfirmed messages
                0x3C, // random delay
                0xA0, 0x05, // 1440 minutes
                0x01, // confirmed interval
                0x05, // holdoff
                0x0A, // recover
                0xFF, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0xFF, 0x34, 0x12,
            ]
        );

        let crc = crc16(body);
        assert_eq!(encoded.bytes[20], (crc & 0xFF) as u8);
        assert_eq!(encoded.bytes[21], (crc >> 8) as u8);
    }

    #[test]
    fn test_encode_port_is_echoed() {
        let message = DownlinkMessage::device(ProtocolVersion::V3, device_configuration());
        let encoded = encode(42, &message).unwrap();

        assert_eq!(encoded.port, 42);
        assert_eq!(encoded.bytes[0], 0x35);
    }

    #[test]
    fn test_device_configuration_field_symmetry() {
        let config = device_configuration();
        let body = encode_device_configuration_body(&config).unwrap();
        assert_eq!(body.len(), 19);

        let mut reader = ByteReader::new(&body);
        assert_eq!(reader.read_u8().unwrap() & 0x01 != 0, config.switch_mask.enable_confirmed_event_message);
        assert_eq!(reader.read_u8().unwrap() as u32, config.communication_max_retries);
        assert_eq!(reader.read_u8().unwrap() as u32, config.number_of_unconfirmed_messages.unwrap());
        assert_eq!(reader.read_u8().unwrap(), config.periodic_message_random_delay_seconds);
        assert_eq!(reader.read_u16().unwrap() as u32 * 60, config.status_message_interval_seconds);
        assert_eq!(reader.read_u8().unwrap(), config.status_message_confirmed_interval);
        assert_eq!(reader.read_u8().unwrap() as u32, config.lora_failure_holdoff_count);
        assert_eq!(reader.read_u8().unwrap() as u32, config.lora_system_recover_count);
        for word in config.lorawan_fsb_mask {
            assert_eq!(reader.read_u16().unwrap(), word);
        }
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_encode_rejects_unconfirmed_out_of_range() {
        for count in [0, 6] {
            let mut config = device_configuration();
            config.number_of_unconfirmed_messages = Some(count);

            let message = DownlinkMessage::device(ProtocolVersion::V3, config);
            assert!(matches!(
                encode(DEFAULT_PORT, &message),
                Err(CodecError::InvalidFieldValue { .. })
            ));
        }

        for count in [1, 5] {
            let mut config = device_configuration();
            config.number_of_unconfirmed_messages = Some(count);

            let message = DownlinkMessage::device(ProtocolVersion::V3, config);
            let encoded = encode(DEFAULT_PORT, &message).unwrap();
            assert_eq!(encoded.bytes[3], count as u8);
        }
    }

    #[test]
    fn test_encode_rejects_missing_unconfirmed() {
        let mut config = device_configuration();
        config.number_of_unconfirmed_messages = None;

        assert!(matches!(
            encode_device_configuration_body(&config),
            Err(CodecError::MissingRequiredField(_))
        ));
    }

    #[test]
    fn test_encode_status_interval_truncates_to_minutes() {
        let mut config = device_configuration();
        config.status_message_interval_seconds = 119;

        let body = encode_device_configuration_body(&config).unwrap();
        assert_eq!(&body[4..6], &[0x01, 0x00]);
    }

    #[test]
    fn test_encode_application_configuration_v2() {
        let message = DownlinkMessage::application(ProtocolVersion::V2, application_configuration());
        let encoded = encode(DEFAULT_PORT, &message).unwrap();

        assert_eq!(encoded.bytes.len(), 24);
        assert_eq!(encoded.bytes[0], 0x26);
        // tt with RTD enabled, no sensor type byte
        assert_eq!(encoded.bytes[1], 0x84);
        assert_eq!(&encoded.bytes[2..4], &[0x2C, 0x01]);
        assert_eq!(&encoded.bytes[4..6], &[0x0C, 0x00]);
        assert_eq!(&encoded.bytes[6..10], &[0x01, 0xFF, 0x00, 0x01]);
        assert_eq!(&encoded.bytes[10..14], &[0x02, 0x85, 0xFF, 0x02]);
        assert_eq!(&encoded.bytes[14..18], &[0x03, 0x14, 0x00, 0x03]);
        assert_eq!(&encoded.bytes[18..22], &[0x00, 0x00, 0x00, 0x00]);

        let crc = crc16(&encoded.bytes[1..22]);
        assert_eq!(&encoded.bytes[22..], &crc.to_le_bytes());
    }

    #[test]
    fn test_encode_application_configuration_v3() {
        let message = DownlinkMessage::application(ProtocolVersion::V3, application_configuration());
        let encoded = encode(DEFAULT_PORT, &message).unwrap();

        assert_eq!(encoded.bytes.len(), 25);
        assert_eq!(encoded.bytes[0], 0x36);
        // RTD flag is not part of version 3
        assert_eq!(encoded.bytes[1], 0x04);
        assert_eq!(encoded.bytes[2], SensorType::K.id());
        assert_eq!(&encoded.bytes[3..5], &[0x2C, 0x01]);

        let crc = crc16(&encoded.bytes[1..23]);
        assert_eq!(&encoded.bytes[23..], &crc.to_le_bytes());
    }

    #[test]
    fn test_application_configuration_field_symmetry() {
        let config = application_configuration();
        let body = encode_application_configuration_body(ProtocolVersion::V3, &config).unwrap();

        let mut reader = ByteReader::new(&body);
        assert_eq!(reader.read_u8().unwrap(), 4);
        assert_eq!(reader.read_u8().unwrap(), config.sensor_type.unwrap().id());
        assert_eq!(reader.read_u16().unwrap(), config.temperature_measurement_interval_seconds);
        assert_eq!(reader.read_u16().unwrap(), config.periodic_event_message_interval);
        for event in &config.events {
            assert_eq!(reader.read_u8().unwrap(), event.mode.id());
            assert_eq!(reader.read_i16().unwrap() as f64 / 10.0, event.threshold_temperature);
            assert_eq!(reader.read_u8().unwrap(), event.measurement_window);
        }
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_encode_application_configuration_v3_requires_sensor_type() {
        let mut config = application_configuration();
        config.sensor_type = None;

        assert!(matches!(
            encode_application_configuration_body(ProtocolVersion::V3, &config),
            Err(CodecError::MissingRequiredField("sensor_type"))
        ));
        // Version 2 has no sensor type byte
        assert!(encode_application_configuration_body(ProtocolVersion::V2, &config).is_ok());
    }

    #[test]
    fn test_encode_application_configuration_rejects_other_devices() {
        let mut config = application_configuration();
        config.device_type = DeviceType::VsQt;

        let message = DownlinkMessage::application(ProtocolVersion::V2, config);
        assert!(matches!(
            encode(DEFAULT_PORT, &message),
            Err(CodecError::InvalidFieldValue { field: "device_type", .. })
        ));
    }

    #[test]
    fn test_encode_crc_tracks_body() {
        let mut other = device_configuration();
        other.communication_max_retries = 4;

        let frame1 = encode(DEFAULT_PORT, &DownlinkMessage::device(ProtocolVersion::V2, device_configuration())).unwrap();
        let frame2 = encode(DEFAULT_PORT, &DownlinkMessage::device(ProtocolVersion::V2, other)).unwrap();

        assert_ne!(frame1.bytes, frame2.bytes);
        for frame in [&frame1, &frame2] {
            let crc = crc16(&frame.bytes[1..20]);
            assert_eq!(&frame.bytes[20..], &crc.to_le_bytes());
        }
    }
}
