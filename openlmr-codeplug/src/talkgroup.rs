use std::collections::HashMap;

use crate::channel::{CallType, ChannelRecord};
use crate::config::ValueNames;
use crate::error::{CodeplugError, Result, SourceLocation};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Talkgroup {
    /// The ID cell as entered, trimmed.
    pub radio_id: String,
    /// Numeric value of `radio_id`, used for sorting.
    pub id: u32,
    pub name: String,
    pub call_type: String,
    pub call_alert: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TalkgroupSort {
    #[default]
    Input,
    Id,
    Name,
}

/// The talkgroup directory. Built once before any channel is processed.
#[derive(Debug, Clone, Default)]
pub struct TalkgroupDirectory {
    entries: Vec<Talkgroup>,
    by_name: HashMap<String, usize>,
}

impl TalkgroupDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, talkgroup: Talkgroup, location: &SourceLocation) -> Result<()> {
        if self.by_name.contains_key(&talkgroup.name) {
            return Err(CodeplugError::DuplicateTalkgroup {
                name: talkgroup.name,
                location: location.clone(),
            });
        }
        self.by_name.insert(talkgroup.name.clone(), self.entries.len());
        self.entries.push(talkgroup);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Talkgroup> {
        self.by_name.get(name).map(|&i| &self.entries[i])
    }

    pub fn radio_id(&self, name: &str) -> Option<&str> {
        self.get(name).map(|tg| tg.radio_id.as_str())
    }

    /// 1-based position of the talkgroup in the directory.
    pub fn input_index(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).map(|&i| i + 1)
    }

    /// Looks up a referenced talkgroup, failing with a dangling-reference error.
    pub fn resolve(&self, name: &str, location: &SourceLocation) -> Result<&str> {
        self.radio_id(name).ok_or_else(|| CodeplugError::UnknownTalkgroup {
            name: name.to_string(),
            location: location.clone(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn sorted(&self, mode: TalkgroupSort) -> Vec<&Talkgroup> {
        let mut talkgroups: Vec<&Talkgroup> = self.entries.iter().collect();
        match mode {
            TalkgroupSort::Input => {}
            TalkgroupSort::Id => talkgroups.sort_by_key(|tg| tg.id),
            TalkgroupSort::Name => talkgroups.sort_by_key(|tg| tg.name.to_lowercase()),
        }
        talkgroups
    }
}

/// Tracks the call type each talkgroup has been used with so far.
///
/// The CPS stores one call type per contact, so a talkgroup seen once as a
/// group call and once as a private call can't be represented.
#[derive(Debug, Clone, Default)]
pub struct CallTypeBindings {
    bound: HashMap<String, CallType>,
}

impl CallTypeBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, talkgroup: &str) -> Option<CallType> {
        self.bound.get(talkgroup).copied()
    }

    /// Binds the channel's talkgroup to its call type. Channels without a
    /// contact are ignored.
    pub fn bind(&mut self, channel: &ChannelRecord, values: &ValueNames, location: &SourceLocation) -> Result<()> {
        let (Some(talkgroup), Some(call_type)) = (channel.contact.as_ref(), channel.call_type) else {
            return Ok(());
        };
        match self.bound.get(talkgroup) {
            Some(&bound) if bound != call_type => Err(CodeplugError::CallTypeConflict {
                talkgroup: talkgroup.clone(),
                bound: bound.name(values).to_string(),
                attempted: call_type.name(values).to_string(),
                channel: channel.name.clone(),
                zone: channel.zone.clone(),
                rx_freq: channel.rx_freq.clone(),
                tx_freq: channel.tx_freq.clone(),
                location: location.clone(),
            }),
            Some(_) => Ok(()),
            None => {
                self.bound.insert(talkgroup.clone(), call_type);
                Ok(())
            }
        }
    }
}
