//! Radio profiles.
//!
//! A profile describes one target radio/CPS combination: the channel CSV
//! columns it expects (with their defaults), the value spellings the CPS uses
//! for each enumeration, and the numeric limits of the firmware.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::{CodeplugError, Result};

#[derive(Debug, Clone, Deserialize)]
struct RadioFile {
    radio: BTreeMap<String, RadioEntry>,
}

#[derive(Debug, Clone, Deserialize)]
struct RadioEntry {
    #[serde(default)]
    name: Option<String>,
    configuration: RadioConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RadioConfig {
    pub max_channels_per_scanlist: usize,
    pub max_channel_per_zone: usize,
    pub max_channel_name_characters: usize,
    pub max_zone_name_characters: usize,
    pub max_scanlist_name_characters: usize,
    pub min_frequency: f64,
    pub max_frequency: f64,
    pub color_code_min: u8,
    pub color_code_max: u8,
    pub ctcss_min: f64,
    pub ctcss_max: f64,
    /// Joins multi-valued cells such as zone members.
    pub list_separator: String,
    pub values: ValueNames,
    /// Output columns of the channel table, in order.
    pub channel_fields: Vec<FieldDefault>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FieldDefault {
    pub name: String,
    #[serde(default)]
    pub default: String,
    /// The channel derivation must supply a value for this column.
    #[serde(default)]
    pub required: bool,
}

/// How the CPS spells each enumerated value.
#[derive(Debug, Clone, Deserialize)]
pub struct ValueNames {
    pub channel_type: ChannelTypeNames,
    pub time_slot_none: String,
    pub tx_permit: TxPermitNames,
    pub call_type: CallTypeNames,
    pub squelch_mode_ctcss_dcs: String,
    pub dmr_mode: DmrModeNames,
    pub power_levels: Vec<String>,
    pub bandwidths: Vec<String>,
    pub timeslots: Vec<String>,
    pub on_off: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChannelTypeNames {
    pub analog: String,
    pub digital: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TxPermitNames {
    pub channel_free: String,
    pub same_color_code: String,
    pub different_color_code: String,
    pub always: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallTypeNames {
    pub group_call: String,
    pub private_call: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DmrModeNames {
    pub simplex: String,
    pub repeater: String,
}

/// Whether the firmware stores separate RX and TX colour codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorCodeSupport {
    /// Single "Color Code" column; RX and TX must match.
    Shared,
    /// "RX Color Code" column, optionally with a "TxCC" column.
    Independent,
}

/// Channel columns resolved to positions once, up front.
#[derive(Debug, Clone)]
pub struct ChannelLayout {
    pub number: usize,
    pub name: usize,
    pub rx_freq: usize,
    pub tx_freq: usize,
    pub channel_type: usize,
    pub power: usize,
    pub bandwidth: usize,
    pub ctcss_decode: usize,
    pub ctcss_encode: usize,
    pub contact: usize,
    pub call_type: usize,
    pub talkgroup_id: usize,
    pub tx_permit: usize,
    pub squelch_mode: usize,
    pub slot: usize,
    pub scan_list: usize,
    pub rx_color_code: usize,
    pub tx_color_code: Option<usize>,
    pub ptt_prohibit: Option<usize>,
    pub dmr_mode: Option<usize>,
    pub color_codes: ColorCodeSupport,
}

impl ChannelLayout {
    pub fn resolve(fields: &[FieldDefault]) -> Result<Self> {
        let find = |name: &str| fields.iter().position(|f| f.name == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| {
                CodeplugError::Config(format!("channel field '{name}' is missing from channel_fields"))
            })
        };

        let (rx_color_code, tx_color_code, color_codes) = if let Some(rx) = find("RX Color Code") {
            (rx, find("TxCC"), ColorCodeSupport::Independent)
        } else if let Some(cc) = find("Color Code") {
            (cc, None, ColorCodeSupport::Shared)
        } else {
            return Err(CodeplugError::Config(
                "no color code field found in channel_fields".into(),
            ));
        };

        Ok(ChannelLayout {
            number: require("No.")?,
            name: require("Channel Name")?,
            rx_freq: require("Receive Frequency")?,
            tx_freq: require("Transmit Frequency")?,
            channel_type: require("Channel Type")?,
            power: require("Transmit Power")?,
            bandwidth: require("Band Width")?,
            ctcss_decode: require("CTCSS/DCS Decode")?,
            ctcss_encode: require("CTCSS/DCS Encode")?,
            contact: require("Contact")?,
            call_type: require("Contact Call Type")?,
            talkgroup_id: require("Contact TG/DMR ID")?,
            tx_permit: require("Busy Lock/TX Permit")?,
            squelch_mode: require("Squelch Mode")?,
            slot: require("Slot")?,
            scan_list: require("Scan List")?,
            rx_color_code,
            tx_color_code,
            ptt_prohibit: find("PTT Prohibit"),
            dmr_mode: find("DMR MODE"),
            color_codes,
        })
    }
}

/// A validated radio configuration plus its resolved channel layout.
#[derive(Debug, Clone)]
pub struct RadioProfile {
    pub name: Option<String>,
    pub config: RadioConfig,
    pub layout: ChannelLayout,
}

impl RadioProfile {
    pub fn from_toml_str(text: &str, radio_id: u32) -> Result<Self> {
        let mut file: RadioFile = toml::from_str(text)?;
        let entry = file
            .radio
            .remove(&radio_id.to_string())
            .ok_or_else(|| CodeplugError::Config(format!("Radio ID {radio_id} not found")))?;
        Self::from_config(entry.name, entry.configuration)
    }

    pub fn load(path: &Path, radio_id: u32) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text, radio_id).map_err(|err| match err {
            CodeplugError::Config(msg) => CodeplugError::Config(format!("{msg} in {}", path.display())),
            other => other,
        })
    }

    pub fn from_config(name: Option<String>, config: RadioConfig) -> Result<Self> {
        if config.max_channels_per_scanlist == 0 {
            return Err(CodeplugError::Config(
                "max_channels_per_scanlist must be at least 1".into(),
            ));
        }
        if config.min_frequency > config.max_frequency {
            return Err(CodeplugError::Config(
                "min_frequency is above max_frequency".into(),
            ));
        }
        let layout = ChannelLayout::resolve(&config.channel_fields)?;
        Ok(RadioProfile {
            name,
            config,
            layout,
        })
    }

    pub fn channel_header(&self) -> Vec<String> {
        self.config
            .channel_fields
            .iter()
            .map(|f| f.name.clone())
            .collect()
    }
}
