//! Sample input files, written by `--generate-templates`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use openlmr_codeplug::source::{ANALOG_HEADER, DIGITAL_OTHERS_HEADER, TALKGROUP_HEADER};

struct Template {
    file: &'static str,
    rows: &'static [&'static [&'static str]],
}

const ANALOG: Template = Template {
    file: "Analog_template.csv",
    rows: &[
        &ANALOG_HEADER,
        &["NOAA", "NOAA1", "25K", "High", "162.4", "440", "Off", "Off", "On"],
        &["NOAA", "NOAA2", "25K", "High", "162.425", "440", "Off", "Off", "On"],
        &["NOAA", "NOAA3", "25K", "High", "162.45", "440", "Off", "Off", "On"],
        &["NOAA", "NOAA4", "25K", "High", "162.475", "440", "Off", "Off", "On"],
        &["NOAA", "NOAA5", "25K", "High", "162.5", "440", "Off", "Off", "On"],
        &["NOAA", "NOAA6", "25K", "High", "162.525", "440", "Off", "Off", "On"],
        &["NOAA", "NOAA7", "25K", "High", "162.55", "440", "Off", "Off", "On"],
        &["Calling", "Calling 2m", "25K", "High", "144.2", "144.2", "Off", "Off", "Off"],
        &["Calling", "Simplex 2m Call", "25K", "Low", "146.52", "146.52", "Off", "Off", "Off"],
        &["Calling", "70CM Calling", "25K", "High", "432.1", "432.1", "Off", "Off", "Off"],
        &["Calling", "70CM Calling1", "25K", "High", "446", "446", "Off", "Off", "Off"],
    ],
};

const DIGITAL_OTHERS: Template = Template {
    file: "Digital-Others_template.csv",
    rows: &[
        &DIGITAL_OTHERS_HEADER,
        &["PiStar", "PiBM/Bridge 2", "Low", "440.35", "445.35", "1", "1", "Bridge 2", "1", "Group Call", "Same Color Code"],
        &["PiStar", "PiBM/DMRAnarchy", "Low", "440.35", "445.35", "1", "1", "DMR Anarchy", "2", "Group Call", "Same Color Code"],
        &["PiStar", "PiBM/Parrot", "Low", "440.35", "445.35", "1", "1", "Parrot", "1", "Private Call", "Same Color Code"],
    ],
};

const DIGITAL_REPEATERS: Template = Template {
    file: "Digital-Repeaters_template.csv",
    rows: &[
        &["Zone Name", "Comment", "Power", "RX Freq", "TX Freq", "Color Code", "DMR Anarchy", "Bridge 2", "N America"],
        &["Salem/MT;SMT", "", "High", "435.875", "440.875", "3", "1", "1", "2"],
        &["Oakland/Cherry;OAC", "", "High", "434.500", "439.500", "7", "2", "-", "-"],
        &["Oakland/Valley;OAV", "", "High", "436.500", "441.500", "1", "2", "2", "2"],
    ],
};

const TALKGROUPS: Template = Template {
    file: "TalkGroups_template.csv",
    rows: &[
        &TALKGROUP_HEADER,
        &["9990", "Parrot", "Private Call", "None"],
        &["3100", "Bridge 2", "Group Call", "None"],
        &["93", "N America", "Group Call", "None"],
        &["31666", "DMR Anarchy", "Group Call", "None"],
    ],
};

/// Writes the four sample inputs into `dir` and returns their paths.
pub fn generate(dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("could not create template directory {}", dir.display()))?;

    let mut written = Vec::new();
    for template in [&ANALOG, &DIGITAL_OTHERS, &DIGITAL_REPEATERS, &TALKGROUPS] {
        let path = dir.join(template.file);
        let mut writer =
            csv::Writer::from_path(&path).with_context(|| format!("could not create {}", path.display()))?;
        for row in template.rows {
            writer
                .write_record(*row)
                .with_context(|| format!("could not write {}", path.display()))?;
        }
        writer
            .flush()
            .with_context(|| format!("could not flush {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use std::fs::File;

    use openlmr_codeplug::{convert, Inputs, RadioProfile, RunOptions, SourceTable};

    use super::*;

    fn read(dir: &Path, file: &str, label: &str) -> SourceTable {
        SourceTable::from_reader(label, File::open(dir.join(file)).unwrap()).unwrap()
    }

    #[test]
    fn writes_four_templates() {
        let dir = tempfile::tempdir().unwrap();
        let written = generate(dir.path()).unwrap();
        assert_eq!(written.len(), 4);
        let text = fs::read_to_string(dir.path().join("TalkGroups_template.csv")).unwrap();
        assert!(text.starts_with("Radio ID,Name,Call Type,Call Alert"));
    }

    #[test]
    fn templates_convert_with_bundled_profiles() {
        let dir = tempfile::tempdir().unwrap();
        generate(dir.path()).unwrap();
        let inputs = Inputs {
            talkgroups: read(dir.path(), TALKGROUPS.file, "TalkGroups"),
            digital_others: read(dir.path(), DIGITAL_OTHERS.file, "Digital-Others"),
            digital_repeaters: read(dir.path(), DIGITAL_REPEATERS.file, "Digital-Repeaters"),
            analog: read(dir.path(), ANALOG.file, "Analog"),
        };
        let config = Path::new(env!("CARGO_MANIFEST_DIR")).join("../config/radio.toml");
        for radio_id in [1, 2] {
            let profile = RadioProfile::load(&config, radio_id).unwrap();
            let codeplug = convert(&profile, RunOptions::default(), &inputs).unwrap();
            // 3 hotspot channels, 7 repeater cells, 11 analog channels.
            assert_eq!(codeplug.channels.len(), 21);
            assert_eq!(codeplug.zones.len(), 6);
            let rendered = codeplug.render(&profile, None).unwrap();
            assert!(rendered.warnings.is_empty());
        }
    }
}
