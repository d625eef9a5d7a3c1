use crate::channel::{ChannelMode, ChannelRecord, SourceKind};
use crate::talkgroup::TalkgroupDirectory;

/// Index given to analog channels and unknown talkgroups so they trail.
pub const TRAILING_INDEX: usize = 9999;

/// Global zone sort mode. Also selects how channels are ordered inside zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZoneSortMode {
    #[default]
    Alpha,
    RepeatersFirst,
    AnalogFirst,
    AnalogAndOthersFirst,
}

/// Position of a channel within its zone.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ChannelOrderKey {
    pub talkgroup_index: usize,
    pub analog_index: usize,
    pub name: String,
}

impl ChannelOrderKey {
    /// `analog_index` is the number of analog channels committed before this one.
    pub fn for_channel(
        mode: ZoneSortMode,
        channel: &ChannelRecord,
        talkgroups: &TalkgroupDirectory,
        analog_index: usize,
    ) -> Self {
        let mut key = ChannelOrderKey {
            talkgroup_index: TRAILING_INDEX,
            analog_index: 0,
            name: channel.name.to_lowercase(),
        };
        if mode == ZoneSortMode::Alpha {
            return key;
        }
        match channel.mode {
            ChannelMode::Digital => {
                if let Some(index) = channel.contact.as_deref().and_then(|c| talkgroups.input_index(c)) {
                    key.talkgroup_index = index;
                }
            }
            ChannelMode::Analog => key.analog_index = analog_index,
        }
        key
    }
}

/// Position of a zone in the zone table.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ZoneOrderKey {
    pub tier: u8,
    pub name: String,
    pub first_seen: usize,
}

impl ZoneOrderKey {
    pub fn new(mode: ZoneSortMode, name: &str, kind: SourceKind, first_seen: usize) -> Self {
        let preferred = match mode {
            ZoneSortMode::Alpha => true,
            ZoneSortMode::RepeatersFirst => kind == SourceKind::DigitalRepeaters,
            ZoneSortMode::AnalogFirst => kind == SourceKind::Analog,
            ZoneSortMode::AnalogAndOthersFirst => {
                matches!(kind, SourceKind::Analog | SourceKind::DigitalOthers)
            }
        };
        ZoneOrderKey {
            tier: if preferred { 0 } else { 1 },
            name: name.to_lowercase(),
            first_seen,
        }
    }
}

/// Scanlists, and the channels inside them, are always ordered by name
/// ignoring case.
pub fn scanlist_order_key(name: &str) -> String {
    name.to_lowercase()
}
