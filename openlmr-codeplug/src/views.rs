//! Flattening a finished [`Codeplug`] into CPS import tables.
//!
//! Zones over the zone limit are truncated here with a warning; this is the
//! only recoverable condition of a run.

use core::fmt;
use std::io;

use tracing::warn;

use crate::config::RadioProfile;
use crate::context::Codeplug;
use crate::error::{CodeplugError, Result};
use crate::grouping::Member;
use crate::ordering::{scanlist_order_key, ZoneOrderKey};

pub const ZONE_HEADER: [&str; 11] = [
    "No.",
    "Zone Name",
    "Zone Channel Member",
    "Zone Channel Member RX Frequency",
    "Zone Channel Member TX Frequency",
    "A Channel",
    "A Channel RX Frequency",
    "A Channel TX Frequency",
    "B Channel",
    "B Channel RX Frequency",
    "B Channel TX Frequency",
];

pub const SCANLIST_HEADER: [&str; 18] = [
    "No.",
    "Scan List Name",
    "Scan Channel Member",
    "Scan Channel Member RX Frequency",
    "Scan Channel Member TX Frequency",
    "Scan Mode",
    "Priority Channel Select",
    "Priority Channel 1",
    "Priority Channel 1 RX Frequency",
    "Priority Channel 1 TX Frequency",
    "Priority Channel 2",
    "Priority Channel 2 RX Frequency",
    "Priority Channel 2 TX Frequency",
    "Revert Channel",
    "Look Back Time A[s]",
    "Look Back Time B[s]",
    "Dropout Delay Time[s]",
    "Dwell Time[s]",
];

/// Fixed scan settings following the member columns of every scanlist row.
const SCANLIST_DEFAULTS: [&str; 13] = [
    "Off", "Off", "", "", "", "", "", "", "Selected", "0.5", "0.5", "0.1", "0.1",
];

pub const TALKGROUP_OUTPUT_HEADER: [&str; 7] =
    ["No.", "Radio ID", "Name", "Country", "Remarks", "Call Type", "Call Alert"];

pub const RADIO_ID_HEADER: [&str; 3] = ["No.", "Radio ID", "Name"];

const RADIO_ID_NAME: &str = "DMR ID";

/// A zone or scanlist had more members than the radio accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Truncation {
    pub table: &'static str,
    pub name: String,
    pub members: usize,
    pub limit: usize,
}

impl fmt::Display for Truncation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} '{}' has more than {} channels. Truncated to first {}.",
            self.table, self.name, self.limit, self.limit
        )
    }
}

/// Something that accepts output rows one at a time.
pub trait RowSink {
    type Error;

    fn write_row(&mut self, row: &[String]) -> core::result::Result<(), Self::Error>;
}

impl<W: io::Write> RowSink for csv::Writer<W> {
    type Error = csv::Error;

    fn write_row(&mut self, row: &[String]) -> core::result::Result<(), Self::Error> {
        self.write_record(row)
    }
}

impl RowSink for Vec<Vec<String>> {
    type Error = core::convert::Infallible;

    fn write_row(&mut self, row: &[String]) -> core::result::Result<(), Self::Error> {
        self.push(row.to_vec());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    fn new(header: &[&str]) -> Self {
        Table {
            header: header.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn write_to<S: RowSink>(&self, sink: &mut S) -> core::result::Result<(), S::Error> {
        sink.write_row(&self.header)?;
        for row in &self.rows {
            sink.write_row(row)?;
        }
        Ok(())
    }
}

/// All tables of one run.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub channels: Table,
    pub zones: Table,
    pub scanlists: Table,
    pub talkgroups: Table,
    pub radio_ids: Option<Table>,
    pub warnings: Vec<Truncation>,
}

/// Name, member lists and first member of one zone/scanlist row.
fn member_columns<K>(
    table: &'static str,
    number: usize,
    name: &str,
    members: &[&Member<K>],
    limit: usize,
    separator: &str,
    warnings: &mut Vec<Truncation>,
) -> (Vec<String>, [String; 3]) {
    let kept = if limit > 0 && members.len() > limit {
        let truncation = Truncation {
            table,
            name: name.to_string(),
            members: members.len(),
            limit,
        };
        warn!("{truncation}");
        warnings.push(truncation);
        &members[..limit]
    } else {
        members
    };

    let mut names = Vec::with_capacity(kept.len());
    let mut rx = Vec::with_capacity(kept.len());
    let mut tx = Vec::with_capacity(kept.len());
    for member in kept {
        names.push(member.name.as_str());
        rx.push(member.rx_freq.as_str());
        tx.push(member.tx_freq.as_str());
    }
    let row = vec![
        number.to_string(),
        name.to_string(),
        names.join(separator),
        rx.join(separator),
        tx.join(separator),
    ];
    let first = kept.first().map_or_else(
        || [String::new(), String::new(), String::new()],
        |m| [m.name.clone(), m.rx_freq.clone(), m.tx_freq.clone()],
    );
    (row, first)
}

impl Codeplug {
    pub fn channel_table(&self, profile: &RadioProfile) -> Table {
        Table {
            header: profile.channel_header(),
            rows: self.channels.iter().map(|c| c.row.clone()).collect(),
        }
    }

    pub fn zone_table(&self, profile: &RadioProfile, warnings: &mut Vec<Truncation>) -> Table {
        let mut zones: Vec<_> = self.zones.iter().collect();
        zones.sort_by_cached_key(|z| ZoneOrderKey::new(self.options.sort_mode, &z.name, z.kind, z.first_seen));

        let mut table = Table::new(&ZONE_HEADER);
        for (i, zone) in zones.iter().enumerate() {
            let (mut row, first) = member_columns(
                "Zone",
                i + 1,
                &zone.name,
                &zone.members(),
                profile.config.max_channel_per_zone,
                &profile.config.list_separator,
                warnings,
            );
            // The first member fills both the A and B channel slots.
            row.extend(first.iter().cloned());
            row.extend(first);
            table.rows.push(row);
        }
        table
    }

    pub fn scanlist_table(&self, profile: &RadioProfile, warnings: &mut Vec<Truncation>) -> Table {
        let mut lists: Vec<_> = self.scanlists.iter().collect();
        lists.sort_by_cached_key(|l| scanlist_order_key(&l.name));

        let mut table = Table::new(&SCANLIST_HEADER);
        for (i, list) in lists.iter().enumerate() {
            let (mut row, _) = member_columns(
                "Scanlist",
                i + 1,
                &list.name,
                &list.members(),
                self.scanlists.limit(),
                &profile.config.list_separator,
                warnings,
            );
            row.extend(SCANLIST_DEFAULTS.iter().map(|v| v.to_string()));
            table.rows.push(row);
        }
        table
    }

    pub fn talkgroup_table(&self) -> Table {
        let mut table = Table::new(&TALKGROUP_OUTPUT_HEADER);
        for (i, tg) in self.talkgroups.sorted(self.options.talkgroup_sort).iter().enumerate() {
            table.rows.push(vec![
                (i + 1).to_string(),
                tg.radio_id.clone(),
                tg.name.clone(),
                String::new(),
                String::new(),
                tg.call_type.clone(),
                tg.call_alert.clone(),
            ]);
        }
        table
    }

    /// Renders every output table. Fails only on an invalid `dmr_id`.
    pub fn render(&self, profile: &RadioProfile, dmr_id: Option<&str>) -> Result<Rendered> {
        let radio_ids = dmr_id.map(|id| radio_id_table(id, profile)).transpose()?;
        let mut warnings = Vec::new();
        Ok(Rendered {
            channels: self.channel_table(profile),
            zones: self.zone_table(profile, &mut warnings),
            scanlists: self.scanlist_table(profile, &mut warnings),
            talkgroups: self.talkgroup_table(),
            radio_ids,
            warnings,
        })
    }
}

/// The operator's own radio ID as a one-row table.
pub fn radio_id_table(dmr_id: &str, profile: &RadioProfile) -> Result<Table> {
    match dmr_id.trim().parse::<u32>() {
        Ok(id) if id > 0 => {}
        _ => return Err(CodeplugError::InvalidDmrId(dmr_id.to_string())),
    }
    if RADIO_ID_NAME.len() > profile.config.max_channel_name_characters {
        return Err(CodeplugError::Config(format!(
            "radio ID name '{RADIO_ID_NAME}' is more than {} characters",
            profile.config.max_channel_name_characters
        )));
    }
    let mut table = Table::new(&RADIO_ID_HEADER);
    table.rows.push(vec![
        "1".to_string(),
        dmr_id.trim().to_string(),
        RADIO_ID_NAME.to_string(),
    ]);
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{ChannelMode, ChannelRecord, SourceKind};
    use crate::config::tests::test_profile;
    use crate::context::{ConversionContext, RunOptions};
    use crate::error::SourceLocation;
    use crate::source::{read_talkgroups, SourceTable};
    use crate::talkgroup::TalkgroupSort;

    fn analog(zone: &str, name: &str, rx: &str) -> ChannelRecord {
        let mut channel = ChannelRecord::new(ChannelMode::Analog, zone, name);
        channel.rx_freq = rx.into();
        channel.tx_freq = rx.into();
        channel.power = "High".into();
        channel
    }

    fn codeplug(profile: &RadioProfile, options: RunOptions, channels: &[(&str, &str, &str)]) -> Codeplug {
        let table = SourceTable::from_reader("TalkGroups", "h\n100,Bravo\n20,Alpha\n".as_bytes()).unwrap();
        let talkgroups = read_talkgroups(&table, profile).unwrap();
        let mut ctx = ConversionContext::new(profile, options, talkgroups);
        for (i, (zone, name, rx)) in channels.iter().enumerate() {
            ctx.commit(
                SourceKind::Analog,
                analog(zone, name, rx),
                zone,
                &SourceLocation::new("Analog", i as u64 + 2),
            )
            .unwrap();
        }
        ctx.finish()
    }

    #[test]
    fn zone_rows_list_members_and_first_channel_twice() {
        let profile = test_profile();
        let cp = codeplug(
            &profile,
            RunOptions::default(),
            &[("Calling", "b-two", "146.52"), ("Calling", "A-one", "144.2"), ("NOAA", "NOAA1", "162.4")],
        );
        let mut warnings = Vec::new();
        let zones = cp.zone_table(&profile, &mut warnings);
        assert!(warnings.is_empty());
        assert_eq!(zones.header.len(), 11);
        assert_eq!(
            zones.rows[0],
            [
                "1", "Calling", "A-one|b-two", "144.2|146.52", "144.2|146.52", "A-one", "144.2", "144.2", "A-one",
                "144.2", "144.2"
            ]
        );
        assert_eq!(zones.rows[1][1], "NOAA");
    }

    #[test]
    fn over_capacity_zone_truncates_with_one_warning() {
        let mut profile = test_profile();
        profile.config.max_channel_per_zone = 2;
        let cp = codeplug(
            &profile,
            RunOptions::default(),
            &[("Big", "C", "146.1"), ("Big", "A", "146.2"), ("Big", "B", "146.3")],
        );
        let rendered = cp.render(&profile, None).unwrap();
        assert_eq!(rendered.zones.rows[0][2], "A|B");
        let zone_warnings: Vec<_> = rendered.warnings.iter().filter(|w| w.table == "Zone").collect();
        assert_eq!(zone_warnings.len(), 1);
        assert_eq!(
            zone_warnings[0].to_string(),
            "Zone 'Big' has more than 2 channels. Truncated to first 2."
        );
    }

    #[test]
    fn scanlist_rows_carry_fixed_defaults() {
        let profile = test_profile();
        let cp = codeplug(&profile, RunOptions::default(), &[("beta", "X", "146.1"), ("Alpha", "Y", "146.2")]);
        let mut warnings = Vec::new();
        let lists = cp.scanlist_table(&profile, &mut warnings);
        assert_eq!(lists.rows[0][1], "Alpha");
        assert_eq!(lists.rows[1][1], "beta");
        assert_eq!(lists.rows[0].len(), SCANLIST_HEADER.len());
        assert_eq!(&lists.rows[0][5..], SCANLIST_DEFAULTS);
    }

    #[test]
    fn talkgroups_sorted_by_id() {
        let profile = test_profile();
        let options = RunOptions {
            talkgroup_sort: TalkgroupSort::Id,
            ..RunOptions::default()
        };
        let cp = codeplug(&profile, options, &[]);
        let table = cp.talkgroup_table();
        assert_eq!(table.rows[0], ["1", "20", "Alpha", "", "", "Group Call", "None"]);
        assert_eq!(table.rows[1], ["2", "100", "Bravo", "", "", "Group Call", "None"]);
    }

    #[test]
    fn radio_id_row() {
        let profile = test_profile();
        let table = radio_id_table("3151234", &profile).unwrap();
        assert_eq!(table.rows, [["1", "3151234", "DMR ID"]]);
        assert!(matches!(radio_id_table("-5", &profile), Err(CodeplugError::InvalidDmrId(_))));
        assert!(matches!(radio_id_table("abc", &profile), Err(CodeplugError::InvalidDmrId(_))));
    }

    #[test]
    fn tables_write_header_first() {
        let profile = test_profile();
        let cp = codeplug(&profile, RunOptions::default(), &[("Z", "A", "146.1")]);
        let mut rows: Vec<Vec<String>> = Vec::new();
        cp.channel_table(&profile).write_to(&mut rows).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][0], "No.");
        assert_eq!(rows[1][0], "1");
    }
}
