//! # DS-TT Payload Codec
//!
//! Binary codec for the temperature transmitter's LoRaWAN messages,
//! protocol versions 2 and 3.
//!
//! This module handles:
//! - Uplink decoding (boot, activated, deactivated, application event, device status)
//! - Downlink encoding (device and application configuration)
//! - Little-endian field readers and writers
//! - CRC-16 for configuration frames

pub mod protocol;
pub mod primitives;
pub mod values;
pub mod uplink;
pub mod downlink;
pub mod decoder;
pub mod encoder;
pub mod crc;
