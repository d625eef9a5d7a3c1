//! The conversion run.
//!
//! [`ConversionContext`] owns every piece of state that accumulates while
//! channels are derived: channel numbering, zone and scanlist buckets and the
//! talkgroup call type bindings. One context serves exactly one run.

use tracing::{debug, info};

use crate::channel::{ChannelRecord, HotspotTxPermit, SourceKind};
use crate::config::RadioProfile;
use crate::error::{CodeplugError, Result, SourceLocation};
use crate::grouping::{Member, ScanlistTable, ZoneTable, MAX_OVERFLOW_SUFFIX};
use crate::matrix::{Expansion, MatrixColumn};
use crate::naming::NicknameMode;
use crate::ordering::{scanlist_order_key, ChannelOrderKey, ZoneSortMode};
use crate::source::{self, SourceTable};
use crate::talkgroup::{CallTypeBindings, TalkgroupDirectory, TalkgroupSort};
use crate::validate;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub sort_mode: ZoneSortMode,
    pub hotspot_tx_permit: HotspotTxPermit,
    pub nickname_mode: NicknameMode,
    pub talkgroup_sort: TalkgroupSort,
}

/// The four input tables of a run.
#[derive(Debug, Clone)]
pub struct Inputs {
    pub talkgroups: SourceTable,
    pub digital_others: SourceTable,
    pub digital_repeaters: SourceTable,
    pub analog: SourceTable,
}

#[derive(Debug, Clone)]
pub struct CommittedChannel {
    pub number: u32,
    pub record: ChannelRecord,
    /// The assembled channel table row.
    pub row: Vec<String>,
}

/// Everything a successful run produced, ready to be serialized.
#[derive(Debug, Clone)]
pub struct Codeplug {
    pub options: RunOptions,
    pub talkgroups: TalkgroupDirectory,
    pub channels: Vec<CommittedChannel>,
    pub zones: ZoneTable,
    pub scanlists: ScanlistTable,
}

pub struct ConversionContext<'a> {
    profile: &'a RadioProfile,
    options: RunOptions,
    talkgroups: TalkgroupDirectory,
    bindings: CallTypeBindings,
    zones: ZoneTable,
    scanlists: ScanlistTable,
    channels: Vec<CommittedChannel>,
    analog_count: usize,
}

impl<'a> ConversionContext<'a> {
    pub fn new(profile: &'a RadioProfile, options: RunOptions, talkgroups: TalkgroupDirectory) -> Self {
        ConversionContext {
            profile,
            options,
            talkgroups,
            bindings: CallTypeBindings::new(),
            zones: ZoneTable::default(),
            scanlists: ScanlistTable::new(profile.config.max_channels_per_scanlist),
            channels: Vec::new(),
            analog_count: 0,
        }
    }

    pub fn talkgroups(&self) -> &TalkgroupDirectory {
        &self.talkgroups
    }

    /// Number of channels committed so far.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Numbers the channel, checks its talkgroup binding and files it into
    /// its zone and (possibly overflowed) scanlist.
    pub fn commit(
        &mut self,
        kind: SourceKind,
        mut channel: ChannelRecord,
        scanlist_base: &str,
        location: &SourceLocation,
    ) -> Result<u32> {
        let number = self.channels.len() as u32 + 1;
        channel.derive_tx_permit(self.options.hotspot_tx_permit, &self.profile.layout);
        if channel.is_digital() {
            self.bindings.bind(&channel, &self.profile.config.values, location)?;
        }

        let scanlist = self
            .scanlists
            .resolve(scanlist_base)
            .map_err(|exhausted| CodeplugError::OverflowExhausted {
                base: exhausted.base,
                limit: exhausted.limit,
                max_suffix: MAX_OVERFLOW_SUFFIX,
                location: location.clone(),
            })?;
        channel.scanlist = validate::scanlist_name(&self.profile.config, &scanlist, location)?;
        self.scanlists
            .push(&channel.scanlist, Member::new(scanlist_order_key(&channel.name), &channel));

        let key = ChannelOrderKey::for_channel(self.options.sort_mode, &channel, &self.talkgroups, self.analog_count);
        self.zones.add(&channel.zone, kind, Member::new(key, &channel));
        if !channel.is_digital() {
            self.analog_count += 1;
        }

        let row = channel.to_row(number, self.profile, location)?;
        debug!(
            number,
            name = %channel.name,
            zone = %channel.zone,
            scanlist = %channel.scanlist,
            "committed channel"
        );
        self.channels.push(CommittedChannel {
            number,
            record: channel,
            row,
        });
        Ok(number)
    }

    /// Derives and commits every channel of one input table.
    pub fn process(&mut self, kind: SourceKind, table: &SourceTable) -> Result<()> {
        if table.is_empty() {
            info!(file = %table.label, "input table is empty");
            return Ok(());
        }
        table.check_header(kind.header())?;
        let before = self.channels.len();
        let profile = self.profile;

        match kind {
            SourceKind::Analog => {
                for row in &table.rows {
                    let channel = source::analog_channel(row, profile)?;
                    let base = channel.zone.clone();
                    self.commit(kind, channel, &base, &row.location)?;
                }
            }
            SourceKind::DigitalOthers => {
                for row in &table.rows {
                    let channel = source::digital_others_channel(row, profile, &self.talkgroups)?;
                    let base = channel.zone.clone();
                    self.commit(kind, channel, &base, &row.location)?;
                }
            }
            SourceKind::DigitalRepeaters => {
                let fixed = kind.header().len();
                let columns: Vec<MatrixColumn> = table.header_cells()[fixed..]
                    .iter()
                    .map(|h| MatrixColumn::from_header(h))
                    .collect();
                for row in &table.rows {
                    let base = source::repeater_base(row, profile)?;
                    let channels = Expansion {
                        profile,
                        talkgroups: &self.talkgroups,
                        nickname_mode: self.options.nickname_mode,
                        columns: &columns,
                    }
                    .expand(&base, &row.cells[fixed..], &row.location)?;
                    for channel in channels {
                        let contact = channel.contact.clone().unwrap_or_default();
                        self.commit(kind, channel, &contact, &row.location)?;
                    }
                }
            }
        }

        info!(
            file = %table.label,
            rows = table.rows.len(),
            channels = self.channels.len() - before,
            "processed input table"
        );
        Ok(())
    }

    pub fn finish(self) -> Codeplug {
        Codeplug {
            options: self.options,
            talkgroups: self.talkgroups,
            channels: self.channels,
            zones: self.zones,
            scanlists: self.scanlists,
        }
    }
}

/// Runs a whole conversion. Input order is fixed: talkgroups, then
/// Digital-Others, Digital-Repeaters and Analog.
pub fn convert(profile: &RadioProfile, options: RunOptions, inputs: &Inputs) -> Result<Codeplug> {
    let talkgroups = source::read_talkgroups(&inputs.talkgroups, profile)?;
    info!(talkgroups = talkgroups.len(), "read talkgroup directory");

    let mut context = ConversionContext::new(profile, options, talkgroups);
    context.process(SourceKind::DigitalOthers, &inputs.digital_others)?;
    context.process(SourceKind::DigitalRepeaters, &inputs.digital_repeaters)?;
    context.process(SourceKind::Analog, &inputs.analog)?;
    Ok(context.finish())
}
