//! Input tables and per-row field extraction.

use std::io::Read;

use crate::channel::{CallType, ChannelMode, ChannelRecord, SourceKind};
use crate::config::RadioProfile;
use crate::error::{CodeplugError, Result, SourceLocation};
use crate::naming::split_nickname;
use crate::talkgroup::{Talkgroup, TalkgroupDirectory};
use crate::validate;

pub const TALKGROUP_HEADER: [&str; 4] = ["Radio ID", "Name", "Call Type", "Call Alert"];

pub const ANALOG_HEADER: [&str; 9] = [
    "Zone",
    "Channel Name",
    "Bandwidth",
    "Power",
    "RX Freq",
    "TX Freq",
    "CTCSS Decode",
    "CTCSS Encode",
    "TX Prohibit",
];

pub const DIGITAL_OTHERS_HEADER: [&str; 11] = [
    "Zone",
    "Channel Name",
    "Power",
    "RX Freq",
    "TX Freq",
    "RX Color Code",
    "TX Color Code",
    "Talk Group",
    "TimeSlot",
    "Call Type",
    "TX Permit",
];

/// Leading fixed columns; every further column is a talkgroup.
pub const DIGITAL_REPEATERS_HEADER: [&str; 6] =
    ["Zone Name", "Comment", "Power", "RX Freq", "TX Freq", "Color Code"];

impl SourceKind {
    pub fn header(self) -> &'static [&'static str] {
        match self {
            SourceKind::Analog => &ANALOG_HEADER,
            SourceKind::DigitalOthers => &DIGITAL_OTHERS_HEADER,
            SourceKind::DigitalRepeaters => &DIGITAL_REPEATERS_HEADER,
        }
    }

    /// Columns a row must have; later ones may be left off.
    fn mandatory_columns(self) -> usize {
        match self {
            SourceKind::Analog => 8,
            SourceKind::DigitalOthers => 8,
            SourceKind::DigitalRepeaters => 6,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRow {
    pub location: SourceLocation,
    pub cells: Vec<String>,
}

impl SourceRow {
    fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map_or("", String::as_str)
    }

    /// An optional trailing cell, `None` when absent or blank.
    fn optional(&self, index: usize) -> Option<&str> {
        self.cells.get(index).map(String::as_str).filter(|c| !c.trim().is_empty())
    }

    fn require_columns(&self, expected: usize) -> Result<()> {
        if self.cells.len() < expected {
            return Err(CodeplugError::TooFewColumns {
                file: self.location.file.clone(),
                expected,
                found: self.cells.len(),
                location: self.location.clone(),
            });
        }
        Ok(())
    }
}

/// One input CSV: its header row and its data rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceTable {
    pub label: String,
    pub header: Option<SourceRow>,
    pub rows: Vec<SourceRow>,
}

impl SourceTable {
    pub fn from_reader<R: Read>(label: &str, reader: R) -> Result<Self> {
        let mut csv = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut rows = Vec::new();
        for record in csv.records() {
            let record = record.map_err(|source| CodeplugError::Csv {
                file: label.to_string(),
                source,
            })?;
            let line = record.position().map_or(rows.len() as u64 + 1, |p| p.line());
            let mut cells: Vec<String> = record.iter().map(str::to_string).collect();
            if rows.is_empty() {
                if let Some(first) = cells.first_mut() {
                    *first = first.trim_start_matches('\u{feff}').to_string();
                }
            }
            rows.push(SourceRow {
                location: SourceLocation::new(label, line),
                cells,
            });
        }

        let mut rows = rows.into_iter();
        Ok(SourceTable {
            label: label.to_string(),
            header: rows.next(),
            rows: rows.collect(),
        })
    }

    pub fn header_cells(&self) -> &[String] {
        self.header.as_ref().map_or(&[][..], |h| h.cells.as_slice())
    }

    /// A file without even a header row holds no channels.
    pub fn is_empty(&self) -> bool {
        self.header.is_none()
    }

    /// The header must start with `expected`, position by position. An empty
    /// table has nothing to check.
    pub fn check_header(&self, expected: &[&str]) -> Result<()> {
        let Some(header) = &self.header else {
            return Ok(());
        };
        let location = header.location.clone();
        let found = header.cells.as_slice();
        for (i, want) in expected.iter().enumerate() {
            let got = found.get(i).map_or("", String::as_str);
            if got != *want {
                return Err(CodeplugError::HeaderMismatch {
                    file: self.label.clone(),
                    found: got.to_string(),
                    expected: want.to_string(),
                    location,
                });
            }
        }
        Ok(())
    }
}

/// Builds the talkgroup directory from its table.
pub fn read_talkgroups(table: &SourceTable, profile: &RadioProfile) -> Result<TalkgroupDirectory> {
    let mut directory = TalkgroupDirectory::new();
    for row in &table.rows {
        row.require_columns(2)?;
        let id = row.cell(0).trim();
        let name = row.cell(1).trim();
        if id.is_empty() || name.is_empty() {
            return Err(CodeplugError::InvalidValue {
                field: "Talkgroup",
                value: format!("{id},{name}"),
                reason: "needs both a Name and a Radio ID".into(),
                location: row.location.clone(),
            });
        }
        let talkgroup = Talkgroup {
            id: validate::radio_id(id, &row.location)?,
            radio_id: id.to_string(),
            name: name.to_string(),
            call_type: row
                .optional(2)
                .map_or_else(|| profile.config.values.call_type.group_call.clone(), |c| c.trim().to_string()),
            call_alert: row.optional(3).map_or_else(|| "None".to_string(), |c| c.trim().to_string()),
        };
        directory.insert(talkgroup, &row.location)?;
    }
    Ok(directory)
}

/// Rejects rows wider than the header for tables without a matrix part.
fn reject_extra_columns(row: &SourceRow, kind: SourceKind) -> Result<()> {
    let expected = kind.header().len();
    if row.cells.len() > expected {
        return Err(CodeplugError::TooManyColumns {
            file: row.location.file.clone(),
            expected,
            found: row.cells.len(),
            location: row.location.clone(),
        });
    }
    Ok(())
}

pub fn analog_channel(row: &SourceRow, profile: &RadioProfile) -> Result<ChannelRecord> {
    let kind = SourceKind::Analog;
    row.require_columns(kind.mandatory_columns())?;
    reject_extra_columns(row, kind)?;
    let config = &profile.config;
    let at = &row.location;

    let mut channel = ChannelRecord::new(
        ChannelMode::Analog,
        validate::zone(config, row.cell(0), at)?,
        validate::channel_name(config, row.cell(1), at)?,
    );
    channel.bandwidth = Some(validate::bandwidth(config, row.cell(2), at)?);
    channel.power = validate::power(config, row.cell(3), at)?;
    channel.rx_freq = validate::frequency(config, row.cell(4), at)?;
    channel.tx_freq = validate::frequency(config, row.cell(5), at)?;
    channel.ctcss_decode = Some(validate::ctcss(config, row.cell(6), at)?);
    channel.ctcss_encode = Some(validate::ctcss(config, row.cell(7), at)?);
    channel.ptt_prohibit = Some(validate::on_off(config, row.optional(8).unwrap_or("Off"), at)?);
    Ok(channel)
}

pub fn digital_others_channel(
    row: &SourceRow,
    profile: &RadioProfile,
    talkgroups: &TalkgroupDirectory,
) -> Result<ChannelRecord> {
    let kind = SourceKind::DigitalOthers;
    row.require_columns(kind.mandatory_columns())?;
    reject_extra_columns(row, kind)?;
    let config = &profile.config;
    let at = &row.location;

    let talkgroup = row.cell(7);
    let talkgroup_id = talkgroups.resolve(talkgroup, at)?.to_string();

    let mut channel = ChannelRecord::new(
        ChannelMode::Digital,
        validate::zone(config, row.cell(0), at)?,
        validate::channel_name(config, row.cell(1), at)?,
    );
    channel.power = validate::power(config, row.cell(2), at)?;
    channel.rx_freq = validate::frequency(config, row.cell(3), at)?;
    channel.tx_freq = validate::frequency(config, row.cell(4), at)?;
    let rx_cc = validate::color_code(config, row.cell(5), at)?;
    let tx_cc = row
        .optional(6)
        .map(|cc| validate::color_code(config, cc, at))
        .transpose()?;
    channel.set_color_codes(rx_cc, tx_cc, profile.layout.color_codes, at)?;
    channel.contact = Some(validate::contact(config, talkgroup, at)?);
    channel.talkgroup_id = Some(talkgroup_id);
    channel.timeslot = Some(validate::timeslot(
        config,
        row.optional(8).unwrap_or(config.values.time_slot_none.as_str()),
        at,
    )?);
    channel.call_type = Some(match row.optional(9) {
        Some(call_type) => validate::call_type(config, call_type, at)?,
        None => CallType::Group,
    });
    if let Some(permit) = row.optional(10) {
        validate::tx_permit(config, permit, at)?;
    }
    Ok(channel)
}

/// The shared part of a repeater row, before matrix expansion.
#[derive(Debug, Clone, PartialEq)]
pub struct RepeaterBase {
    pub channel: ChannelRecord,
    pub zone_nick: String,
}

pub fn repeater_base(row: &SourceRow, profile: &RadioProfile) -> Result<RepeaterBase> {
    row.require_columns(SourceKind::DigitalRepeaters.mandatory_columns())?;
    let config = &profile.config;
    let at = &row.location;

    let (zone, zone_nick) = split_nickname(row.cell(0));
    let mut channel = ChannelRecord::new(ChannelMode::Digital, validate::zone(config, zone, at)?, "");
    let zone_nick = validate::zone(config, zone_nick.unwrap_or_default(), at)?;
    channel.power = validate::power(config, row.cell(2), at)?;
    channel.rx_freq = validate::frequency(config, row.cell(3), at)?;
    channel.tx_freq = validate::frequency(config, row.cell(4), at)?;
    let cc = validate::color_code(config, row.cell(5), at)?;
    channel.set_color_codes(cc, None, profile.layout.color_codes, at)?;
    Ok(RepeaterBase { channel, zone_nick })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::test_profile;

    fn table(label: &str, text: &str) -> SourceTable {
        SourceTable::from_reader(label, text.as_bytes()).unwrap()
    }

    #[test]
    fn reads_rows_with_line_numbers() {
        let t = table("Analog", "\u{feff}Zone,Channel Name\nA,B\n\nC,D\n");
        assert_eq!(t.header_cells(), ["Zone", "Channel Name"]);
        assert_eq!(t.rows.len(), 2);
        assert_eq!(t.rows[0].location, SourceLocation::new("Analog", 2));
        assert_eq!(t.rows[1].location, SourceLocation::new("Analog", 4));
    }

    #[test]
    fn header_mismatch_names_both_values() {
        let t = table("Analog", "Zone,Name\n");
        let err = t.check_header(&ANALOG_HEADER).unwrap_err();
        assert_eq!(
            err.to_string(),
            "CSV header does not match expected for Analog file (found 'Name' expected 'Channel Name') \
             [On line 1 of Analog file.]"
        );
    }

    #[test]
    fn empty_file_has_no_rows() {
        let t = table("Analog", "");
        assert!(t.is_empty());
        assert!(t.rows.is_empty());
        assert!(t.check_header(&ANALOG_HEADER).is_ok());
    }

    #[test]
    fn talkgroups_default_call_type_and_alert() {
        let profile = test_profile();
        let t = table(
            "TalkGroups",
            "Radio ID,Name,Call Type,Call Alert\n9990,Parrot,Private Call,None\n 3100 , Bridge 2 \n",
        );
        let dir = read_talkgroups(&t, &profile).unwrap();
        assert_eq!(dir.len(), 2);
        let bridge = dir.get("Bridge 2").unwrap();
        assert_eq!(bridge.radio_id, "3100");
        assert_eq!(bridge.id, 3100);
        assert_eq!(bridge.call_type, "Group Call");
        assert_eq!(bridge.call_alert, "None");
        assert_eq!(dir.get("Parrot").unwrap().call_type, "Private Call");
    }

    #[test]
    fn talkgroup_needs_name_and_id() {
        let profile = test_profile();
        let t = table("TalkGroups", "Radio ID,Name\n,Parrot\n");
        assert!(read_talkgroups(&t, &profile).is_err());
        let t = table("TalkGroups", "Radio ID,Name\n9990\n");
        assert!(matches!(
            read_talkgroups(&t, &profile),
            Err(CodeplugError::TooFewColumns { .. })
        ));
    }

    #[test]
    fn analog_row() {
        let profile = test_profile();
        let t = table(
            "Analog",
            "Zone,Channel Name,Bandwidth,Power,RX Freq,TX Freq,CTCSS Decode,CTCSS Encode\n\
             Local,W6ABC,25K,High,146.94,146.34,100.0,100.0\n",
        );
        let channel = analog_channel(&t.rows[0], &profile).unwrap();
        assert_eq!(channel.zone, "Local");
        assert_eq!(channel.mode, ChannelMode::Analog);
        assert_eq!(channel.ptt_prohibit.as_deref(), Some("Off"));
        assert!(channel.uses_tone_squelch());
    }

    #[test]
    fn analog_row_too_wide() {
        let profile = test_profile();
        let t = table(
            "Analog",
            "h\nLocal,W6ABC,25K,High,146.94,146.34,Off,Off,Off,extra\n",
        );
        let err = analog_channel(&t.rows[0], &profile).unwrap_err();
        assert!(err.to_string().starts_with("There are too many columns in 'Analog' file"));
    }

    #[test]
    fn digital_others_defaults() {
        let profile = test_profile();
        let dir = read_talkgroups(&table("TalkGroups", "h\n9990,Parrot\n"), &profile).unwrap();
        let t = table("Digital-Others", "h\nPiStar,Parrot,Low,440.35,440.35,1,,Parrot\n");
        let channel = digital_others_channel(&t.rows[0], &profile, &dir).unwrap();
        assert_eq!(channel.tx_color_code, Some(1));
        assert_eq!(channel.timeslot.as_deref(), Some("-"));
        assert_eq!(channel.call_type, Some(CallType::Group));
        assert_eq!(channel.talkgroup_id.as_deref(), Some("9990"));
    }

    #[test]
    fn digital_others_unknown_talkgroup() {
        let profile = test_profile();
        let dir = read_talkgroups(&table("TalkGroups", "h\n9990,Parrot\n"), &profile).unwrap();
        let t = table("Digital-Others", "h\nPiStar,Ghosty,Low,440.35,440.35,1,1,Ghost,1\n");
        let err = digital_others_channel(&t.rows[0], &profile, &dir).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Talkgroup 'Ghost' is referenced but not defined in the talkgroup directory \
             [On line 2 of Digital-Others file.]"
        );
    }

    #[test]
    fn repeater_zone_nickname() {
        let profile = test_profile();
        let t = table("Digital-Repeaters", "h\nSalem/MT;SMT,,High,435.875,440.875,3,1,-\n");
        let base = repeater_base(&t.rows[0], &profile).unwrap();
        assert_eq!(base.channel.zone, "Salem/MT");
        assert_eq!(base.zone_nick, "SMT");
        assert_eq!(base.channel.rx_color_code, Some(3));
        assert_eq!(base.channel.tx_color_code, Some(3));
    }
}
