use crate::config::{ChannelLayout, ColorCodeSupport, RadioProfile, ValueNames};
use crate::error::{CodeplugError, Result, SourceLocation};

/// The input table a channel was derived from.
///
/// Doubles as the zone "type" tag used by the zone ordering modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SourceKind {
    Analog,
    DigitalOthers,
    DigitalRepeaters,
}

impl SourceKind {
    pub fn label(self) -> &'static str {
        match self {
            SourceKind::Analog => "Analog",
            SourceKind::DigitalOthers => "Digital-Others",
            SourceKind::DigitalRepeaters => "Digital-Repeaters",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMode {
    Analog,
    Digital,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallType {
    Group,
    Private,
}

impl CallType {
    pub fn name(self, values: &ValueNames) -> &str {
        match self {
            CallType::Group => &values.call_type.group_call,
            CallType::Private => &values.call_type.private_call,
        }
    }

    pub fn from_name(name: &str, values: &ValueNames) -> Option<Self> {
        if name == values.call_type.group_call {
            Some(CallType::Group)
        } else if name == values.call_type.private_call {
            Some(CallType::Private)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxPermit {
    ChannelFree,
    SameColorCode,
    DifferentColorCode,
    Always,
}

impl TxPermit {
    pub fn name(self, values: &ValueNames) -> &str {
        match self {
            TxPermit::ChannelFree => &values.tx_permit.channel_free,
            TxPermit::SameColorCode => &values.tx_permit.same_color_code,
            TxPermit::DifferentColorCode => &values.tx_permit.different_color_code,
            TxPermit::Always => &values.tx_permit.always,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplexMode {
    Simplex,
    Repeater,
}

/// TX permit policy for hotspot (rx == tx) channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HotspotTxPermit {
    Always,
    #[default]
    SameColorCode,
}

/// One channel of the output codeplug.
///
/// Fields left as `None` fall back to the profile's column default when the
/// channel row is assembled.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelRecord {
    pub name: String,
    /// Frequencies are kept as entered; they are compared and written verbatim.
    pub rx_freq: String,
    pub tx_freq: String,
    pub mode: ChannelMode,
    pub power: String,
    pub bandwidth: Option<String>,
    pub ctcss_decode: Option<String>,
    pub ctcss_encode: Option<String>,
    pub ptt_prohibit: Option<String>,
    pub contact: Option<String>,
    pub talkgroup_id: Option<String>,
    pub call_type: Option<CallType>,
    pub timeslot: Option<String>,
    pub rx_color_code: Option<u8>,
    pub tx_color_code: Option<u8>,
    pub tx_permit: Option<TxPermit>,
    pub zone: String,
    /// Resolved scanlist; empty until the channel is grouped.
    pub scanlist: String,
}

impl ChannelRecord {
    pub fn new(mode: ChannelMode, zone: impl Into<String>, name: impl Into<String>) -> Self {
        ChannelRecord {
            name: name.into(),
            rx_freq: String::new(),
            tx_freq: String::new(),
            mode,
            power: String::new(),
            bandwidth: None,
            ctcss_decode: None,
            ctcss_encode: None,
            ptt_prohibit: None,
            contact: None,
            talkgroup_id: None,
            call_type: None,
            timeslot: None,
            rx_color_code: None,
            tx_color_code: None,
            tx_permit: None,
            zone: zone.into(),
            scanlist: String::new(),
        }
    }

    pub fn is_digital(&self) -> bool {
        self.mode == ChannelMode::Digital
    }

    pub fn duplex_mode(&self) -> DuplexMode {
        if self.rx_freq != self.tx_freq {
            DuplexMode::Repeater
        } else {
            DuplexMode::Simplex
        }
    }

    /// Tone squelch applies only when a decode tone is configured.
    pub fn uses_tone_squelch(&self) -> bool {
        matches!(self.ctcss_decode.as_deref(), Some(tone) if tone != "Off")
    }

    /// Sets RX and TX colour codes, with TX following RX when not given.
    pub fn set_color_codes(
        &mut self,
        rx: u8,
        tx: Option<u8>,
        support: ColorCodeSupport,
        location: &SourceLocation,
    ) -> Result<()> {
        let tx = tx.unwrap_or(rx);
        if support == ColorCodeSupport::Shared && rx != tx {
            return Err(CodeplugError::ColorCodeMismatch {
                rx,
                tx,
                location: location.clone(),
            });
        }
        self.rx_color_code = Some(rx);
        self.tx_color_code = Some(tx);
        Ok(())
    }

    /// Must run after frequencies and colour codes are final.
    pub fn derive_tx_permit(&mut self, policy: HotspotTxPermit, layout: &ChannelLayout) {
        self.tx_permit = Some(tx_permit(self, policy, layout));
    }

    /// Builds the output row: profile defaults overlaid with derived values.
    pub fn to_row(&self, number: u32, profile: &RadioProfile, location: &SourceLocation) -> Result<Vec<String>> {
        let layout = &profile.layout;
        let values = &profile.config.values;
        let mut derived: Vec<Option<String>> = vec![None; profile.config.channel_fields.len()];

        derived[layout.number] = Some(number.to_string());
        derived[layout.name] = Some(self.name.clone());
        derived[layout.rx_freq] = Some(self.rx_freq.clone());
        derived[layout.tx_freq] = Some(self.tx_freq.clone());
        derived[layout.channel_type] = Some(match self.mode {
            ChannelMode::Analog => values.channel_type.analog.clone(),
            ChannelMode::Digital => values.channel_type.digital.clone(),
        });
        derived[layout.power] = Some(self.power.clone());
        derived[layout.bandwidth] = self.bandwidth.clone();
        derived[layout.ctcss_decode] = self.ctcss_decode.clone();
        derived[layout.ctcss_encode] = self.ctcss_encode.clone();
        derived[layout.contact] = self.contact.clone();
        derived[layout.call_type] = self.call_type.map(|c| c.name(values).to_string());
        derived[layout.talkgroup_id] = self.talkgroup_id.clone();
        derived[layout.tx_permit] = self.tx_permit.map(|p| p.name(values).to_string());
        if self.uses_tone_squelch() {
            derived[layout.squelch_mode] = Some(values.squelch_mode_ctcss_dcs.clone());
        }
        derived[layout.slot] = self.timeslot.clone();
        derived[layout.scan_list] = Some(self.scanlist.clone());
        derived[layout.rx_color_code] = self.rx_color_code.map(|cc| cc.to_string());
        if let Some(index) = layout.tx_color_code {
            derived[index] = self.tx_color_code.map(|cc| cc.to_string());
        }
        if let Some(index) = layout.ptt_prohibit {
            derived[index] = self.ptt_prohibit.clone();
        }
        if let (Some(index), true) = (layout.dmr_mode, self.is_digital()) {
            derived[index] = Some(match self.duplex_mode() {
                DuplexMode::Simplex => values.dmr_mode.simplex.clone(),
                DuplexMode::Repeater => values.dmr_mode.repeater.clone(),
            });
        }

        profile
            .config
            .channel_fields
            .iter()
            .zip(derived)
            .map(|(field, value)| match value {
                Some(value) => Ok(value),
                None if field.required => Err(CodeplugError::MissingRequired {
                    field: field.name.clone(),
                    channel: self.name.clone(),
                    location: location.clone(),
                }),
                None => Ok(field.default.clone()),
            })
            .collect()
    }
}

fn tx_permit(channel: &ChannelRecord, policy: HotspotTxPermit, layout: &ChannelLayout) -> TxPermit {
    if policy == HotspotTxPermit::Always && channel.rx_freq == channel.tx_freq {
        TxPermit::Always
    } else if layout.tx_color_code.is_some() && channel.rx_color_code != channel.tx_color_code {
        TxPermit::DifferentColorCode
    } else {
        TxPermit::SameColorCode
    }
}
