//! # TT Codec Library
//!
//! Decode uplinks from and encode configuration downlinks for DS-TT
//! LoRaWAN temperature transmitters.
//!
//! Network-server integrations hand in a port and a byte payload and get a
//! structured record back, or hand in a configuration record and get the
//! frame to transmit.

pub mod config;
pub mod error;
pub mod codec;

pub use codec::decoder::{decode, decode_hex};
pub use codec::encoder::{encode, EncodedDownlink};
pub use error::{CodecError, Result};
