//! # TT Codec
//!
//! Command line front end for the DS-TT payload codec.
//!
//! Decodes uplink payloads given as hex strings into JSON, and encodes
//! configuration documents into downlink frames.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use tt_codec::codec::downlink::Configuration;
use tt_codec::codec::encoder::{
    encode_application_configuration_body, encode_device_configuration_body,
};
use tt_codec::codec::protocol::DEFAULT_PORT;
use tt_codec::config::load_downlink;
use tt_codec::{decode, encode, CodecError};

/// DS-TT uplink decoder and downlink encoder
#[derive(Parser, Debug)]
#[command(name = "tt-codec", author, version, about)]
#[command(propagate_version = true)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "warn")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode an uplink payload given as a hex string
    Decode {
        /// Payload, e.g. 2004785634123412...
        payload: String,

        /// LoRaWAN port the payload arrived on
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u8,
    },

    /// Encode a configuration document (TOML or JSON) into a downlink frame
    Encode {
        /// Path to the configuration document
        file: PathBuf,

        /// LoRaWAN port to send the downlink on
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u8,

        /// Print only the body, without header and CRC
        #[arg(long)]
        body_only: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(cli.log_level.into()),
        )
        .init();

    debug!("TT codec v{} starting...", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Decode { payload, port } => {
            let bytes = hex::decode(payload.trim()).map_err(CodecError::from)?;
            let message = decode(port, &bytes)?;
            println!("{}", serde_json::to_string_pretty(&message)?);
        }

        Commands::Encode {
            file,
            port,
            body_only,
        } => {
            let message = load_downlink(&file)
                .with_context(|| format!("failed to load {}", file.display()))?;

            if body_only {
                let body = match &message.configuration {
                    Configuration::Device(config) => encode_device_configuration_body(config)?,
                    Configuration::Application(config) => {
                        encode_application_configuration_body(message.protocol_version, config)?
                    }
                };
                println!("{}", hex::encode_upper(body));
            } else {
                let encoded = encode(port, &message)?;
                info!(
                    "Encoded {} for port {} ({} bytes)",
                    message.message_type(),
                    encoded.port,
                    encoded.bytes.len()
                );
                println!("{} {}", encoded.port, hex::encode_upper(&encoded.bytes));
            }
        }
    }

    Ok(())
}
