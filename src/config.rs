//! # Configuration Documents
//!
//! Loads downlink configuration documents from TOML (or JSON) files.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::codec::downlink::{Configuration, DownlinkDocument, DownlinkMessage};
use crate::error::Result;

/// Load a downlink configuration document
///
/// The document has the network-server shape: a `header` table with
/// `protocol_version` and `message_type`, and the configuration fields at
/// the top level. Files ending in `.json` are parsed as JSON, anything
/// else as TOML.
///
/// # Arguments
///
/// * `path` - Path to the document
///
/// # Returns
///
/// * `Result<DownlinkMessage>` - Loaded and validated message
///
/// # Errors
///
/// Returns error if:
/// - File cannot be read
/// - TOML/JSON parsing fails
/// - Header names an unsupported version or message type
/// - Validation fails
///
/// # Examples
///
/// ```no_run
/// use tt_codec::config::load_downlink;
///
/// let message = load_downlink("config/device.toml")?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn load_downlink<P: AsRef<Path>>(path: P) -> Result<DownlinkMessage> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let document: DownlinkDocument = if is_json {
        serde_json::from_str(&contents)?
    } else {
        toml::from_str(&contents)?
    };
    debug!(
        "Loaded {} document from {}",
        document.header.message_type,
        path.display()
    );

    let message = DownlinkMessage::try_from(document)?;
    validate(&message)?;
    Ok(message)
}

/// Validate configuration values
///
/// # Errors
///
/// Returns error if any configuration value is out of valid range
fn validate(message: &DownlinkMessage) -> Result<()> {
    match &message.configuration {
        Configuration::Device(config) => config.validate(),
        Configuration::Application(config) => config.validate(message.protocol_version),
    }
}
