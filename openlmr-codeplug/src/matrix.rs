//! Repeater matrix expansion.
//!
//! Every column after the fixed repeater columns names a talkgroup. A cell
//! holds `timeslot[;P]`: the timeslot the talkgroup is carried on at that
//! repeater and an optional `P` for a private call. Each cell with a real
//! timeslot becomes one channel.

use crate::channel::{CallType, ChannelRecord};
use crate::config::RadioProfile;
use crate::error::{CodeplugError, Result, SourceLocation};
use crate::naming::{split_nickname, synthesize_name, NicknameMode};
use crate::source::RepeaterBase;
use crate::talkgroup::TalkgroupDirectory;
use crate::validate;

/// A talkgroup column header, `Name` or `Name;Nick`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixColumn {
    pub contact: String,
    pub nickname: Option<String>,
}

impl MatrixColumn {
    pub fn from_header(cell: &str) -> Self {
        let (contact, nickname) = split_nickname(cell);
        MatrixColumn {
            contact: contact.to_string(),
            nickname: nickname.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixCell<'a> {
    pub timeslot: &'a str,
    pub call_type: CallType,
}

impl<'a> MatrixCell<'a> {
    pub fn parse(value: &'a str) -> Self {
        let mut parts = value.split(';');
        let timeslot = parts.next().unwrap_or_default().trim();
        let call_type = if parts.any(|marker| marker.trim() == "P") {
            CallType::Private
        } else {
            CallType::Group
        };
        MatrixCell { timeslot, call_type }
    }
}

/// Settings shared by every cell of a matrix table.
pub struct Expansion<'a> {
    pub profile: &'a RadioProfile,
    pub talkgroups: &'a TalkgroupDirectory,
    pub nickname_mode: NicknameMode,
    pub columns: &'a [MatrixColumn],
}

impl Expansion<'_> {
    /// Expands one repeater row, left to right. Cells beyond the header
    /// are rejected.
    pub fn expand(&self, base: &RepeaterBase, cells: &[String], location: &SourceLocation) -> Result<Vec<ChannelRecord>> {
        if cells.len() > self.columns.len() {
            return Err(CodeplugError::TooManyColumns {
                file: location.file.clone(),
                expected: self.columns.len(),
                found: cells.len(),
                location: location.clone(),
            });
        }
        let mut channels = Vec::new();
        for (column, value) in self.columns.iter().zip(cells) {
            if let Some(channel) = self.expand_cell(base, column, value, location)? {
                channels.push(channel);
            }
        }
        Ok(channels)
    }

    fn expand_cell(
        &self,
        base: &RepeaterBase,
        column: &MatrixColumn,
        value: &str,
        location: &SourceLocation,
    ) -> Result<Option<ChannelRecord>> {
        let config = &self.profile.config;
        let cell = MatrixCell::parse(value);
        if cell.timeslot.is_empty() {
            return Ok(None);
        }
        let timeslot = validate::timeslot(config, cell.timeslot, location)?;
        if timeslot == config.values.time_slot_none {
            return Ok(None);
        }

        let name = synthesize_name(
            self.nickname_mode,
            &base.zone_nick,
            &column.contact,
            column.nickname.as_deref(),
            config.max_channel_name_characters,
        )
        .map_err(|source| CodeplugError::UnfittableName {
            source,
            location: location.clone(),
        })?;

        let mut channel = base.channel.clone();
        channel.contact = Some(validate::contact(config, &column.contact, location)?);
        channel.talkgroup_id = Some(self.talkgroups.resolve(&column.contact, location)?.to_string());
        channel.timeslot = Some(timeslot);
        channel.name = validate::channel_name(config, &name, location)?;
        channel.call_type = Some(cell.call_type);
        Ok(Some(channel))
    }
}
