use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use openlmr_codeplug::{
    convert, Codeplug, HotspotTxPermit, Inputs, NicknameMode, RadioProfile, RunOptions, SourceKind, SourceTable,
    TalkgroupSort, ZoneSortMode,
};
use tracing::info;

mod output;
mod templates;

const TEMPLATES_DIR: &str = "Templates";

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum SortingArg {
    /// Zones by name.
    #[default]
    Alpha,
    /// Repeater zones first, digital channels in talkgroup order.
    RepeatersFirst,
    /// Analog zones first, analog channels in file order.
    AnalogFirst,
    /// Analog and hotspot/simplex zones before repeater zones.
    #[value(name = "analog_and_others_first")]
    AnalogAndOthersFirst,
}

impl From<SortingArg> for ZoneSortMode {
    fn from(arg: SortingArg) -> Self {
        match arg {
            SortingArg::Alpha => ZoneSortMode::Alpha,
            SortingArg::RepeatersFirst => ZoneSortMode::RepeatersFirst,
            SortingArg::AnalogFirst => ZoneSortMode::AnalogFirst,
            SortingArg::AnalogAndOthersFirst => ZoneSortMode::AnalogAndOthersFirst,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum HotspotTxPermitArg {
    Always,
    #[default]
    SameColorCode,
}

impl From<HotspotTxPermitArg> for HotspotTxPermit {
    fn from(arg: HotspotTxPermitArg) -> Self {
        match arg {
            HotspotTxPermitArg::Always => HotspotTxPermit::Always,
            HotspotTxPermitArg::SameColorCode => HotspotTxPermit::SameColorCode,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum NicknameArg {
    #[default]
    Off,
    Prefix,
    Suffix,
    PrefixForced,
    SuffixForced,
}

impl From<NicknameArg> for NicknameMode {
    fn from(arg: NicknameArg) -> Self {
        match arg {
            NicknameArg::Off => NicknameMode::Off,
            NicknameArg::Prefix => NicknameMode::Prefix,
            NicknameArg::Suffix => NicknameMode::Suffix,
            NicknameArg::PrefixForced => NicknameMode::PrefixForced,
            NicknameArg::SuffixForced => NicknameMode::SuffixForced,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum TalkgroupSortArg {
    #[default]
    Input,
    Id,
    Name,
}

impl From<TalkgroupSortArg> for TalkgroupSort {
    fn from(arg: TalkgroupSortArg) -> Self {
        match arg {
            TalkgroupSortArg::Input => TalkgroupSort::Input,
            TalkgroupSortArg::Id => TalkgroupSort::Id,
            TalkgroupSortArg::Name => TalkgroupSort::Name,
        }
    }
}

/// Convert simplified channel lists into AnyTone CPS import files.
#[derive(Debug, Clone, Parser)]
#[command(name = "openlmr-cps", version)]
struct Args {
    /// Analog channels.
    #[arg(long, required_unless_present_any = ["generate_templates", "verify_defaults"])]
    analog_csv: Option<PathBuf>,

    /// DMR simplex and hotspot channels.
    #[arg(long, required_unless_present_any = ["generate_templates", "verify_defaults"])]
    digital_others_csv: Option<PathBuf>,

    /// DMR repeaters with one column per talkgroup.
    #[arg(long, required_unless_present_any = ["generate_templates", "verify_defaults"])]
    digital_repeaters_csv: Option<PathBuf>,

    /// Talkgroup names and IDs.
    #[arg(long, required_unless_present_any = ["generate_templates", "verify_defaults"])]
    talkgroups_csv: Option<PathBuf>,

    #[arg(long, default_value = "./Output")]
    output_directory: PathBuf,

    /// Directory containing radio.toml.
    #[arg(long, default_value = "config")]
    config: PathBuf,

    /// Radio profile file. Defaults to <config>/radio.toml.
    #[arg(long)]
    radio_config: Option<PathBuf>,

    #[arg(long, default_value_t = 1)]
    radio_id: u32,

    /// Check the radio profile, print its channel defaults and exit.
    #[arg(long)]
    verify_defaults: bool,

    #[arg(long, value_enum, default_value_t)]
    sorting: SortingArg,

    #[arg(long, value_enum, default_value_t)]
    hotspot_tx_permit: HotspotTxPermitArg,

    #[arg(long, value_enum, default_value_t)]
    nicknames: NicknameArg,

    #[arg(long, value_enum, default_value_t)]
    talkgroup_sort: TalkgroupSortArg,

    /// Write sample input files into ./Templates and exit.
    #[arg(long)]
    generate_templates: bool,

    /// Your DMR ID, written to radio_id_list.csv.
    #[arg(long)]
    dmr_id: Option<String>,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn run_options(&self) -> RunOptions {
        RunOptions {
            sort_mode: self.sorting.into(),
            hotspot_tx_permit: self.hotspot_tx_permit.into(),
            nickname_mode: self.nicknames.into(),
            talkgroup_sort: self.talkgroup_sort.into(),
        }
    }

    fn radio_config_path(&self) -> PathBuf {
        self.radio_config
            .clone()
            .unwrap_or_else(|| self.config.join("radio.toml"))
    }
}

fn read_table(path: Option<&Path>, label: &str) -> Result<SourceTable> {
    let path = path.with_context(|| format!("no {label} file given"))?;
    let file = File::open(path).with_context(|| format!("could not open {label} file {}", path.display()))?;
    SourceTable::from_reader(label, file).with_context(|| format!("could not read {}", path.display()))
}

fn read_inputs(args: &Args) -> Result<Inputs> {
    Ok(Inputs {
        talkgroups: read_table(args.talkgroups_csv.as_deref(), "TalkGroups")?,
        digital_others: read_table(args.digital_others_csv.as_deref(), SourceKind::DigitalOthers.label())?,
        digital_repeaters: read_table(args.digital_repeaters_csv.as_deref(), SourceKind::DigitalRepeaters.label())?,
        analog: read_table(args.analog_csv.as_deref(), SourceKind::Analog.label())?,
    })
}

fn verify_defaults(path: &Path, profile: &RadioProfile) {
    println!("Radio configuration file: {}", path.display());
    if let Some(name) = &profile.name {
        println!("Radio: {name}");
    }
    println!("Channel defaults:");
    for field in &profile.config.channel_fields {
        let required = if field.required { " (required)" } else { "" };
        println!("  {}: {}{required}", field.name, field.default);
    }
    println!("Radio configuration file '{}' is valid.", path.display());
}

fn print_summary(dir: &Path, codeplug: &Codeplug) {
    println!("Output files generated in: {}", dir.display());
    println!("Summary:");
    println!("Generated {} channels", codeplug.channels.len());
    println!("{} zones", codeplug.zones.len());
    println!("{} scanlists", codeplug.scanlists.len());
    println!("{} talkgroups", codeplug.talkgroups.len());
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    if args.generate_templates {
        let dir = Path::new(TEMPLATES_DIR);
        templates::generate(dir)?;
        println!("Templates generated in: {}", dir.display());
        return Ok(());
    }

    let radio_config = args.radio_config_path();
    let profile = RadioProfile::load(&radio_config, args.radio_id)
        .with_context(|| format!("could not load radio profile {}", radio_config.display()))?;
    info!(radio_id = args.radio_id, name = ?profile.name, "loaded radio profile");

    if args.verify_defaults {
        verify_defaults(&radio_config, &profile);
        return Ok(());
    }

    let inputs = read_inputs(&args)?;
    let codeplug = convert(&profile, args.run_options(), &inputs)?;
    let rendered = codeplug.render(&profile, args.dmr_id.as_deref())?;

    let written = output::write_all(&args.output_directory, &rendered)?;
    info!(files = written.len(), "wrote output files");
    print_summary(&args.output_directory, &codeplug);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn bundled_config() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../config")
    }

    fn args_for(dir: &Path, out: &Path, extra: &[&str]) -> Args {
        templates::generate(dir).unwrap();
        let mut argv: Vec<String> = vec!["openlmr-cps".into()];
        for (flag, file) in [
            ("--analog-csv", "Analog_template.csv"),
            ("--digital-others-csv", "Digital-Others_template.csv"),
            ("--digital-repeaters-csv", "Digital-Repeaters_template.csv"),
            ("--talkgroups-csv", "TalkGroups_template.csv"),
        ] {
            argv.push(flag.into());
            argv.push(dir.join(file).display().to_string());
        }
        argv.push("--output-directory".into());
        argv.push(out.display().to_string());
        argv.push("--config".into());
        argv.push(bundled_config().display().to_string());
        argv.extend(extra.iter().map(|s| s.to_string()));
        Args::try_parse_from(argv).unwrap()
    }

    fn run(args: &Args) -> Result<()> {
        let profile = RadioProfile::load(&args.radio_config_path(), args.radio_id)?;
        let inputs = read_inputs(args)?;
        let codeplug = convert(&profile, args.run_options(), &inputs)?;
        let rendered = codeplug.render(&profile, args.dmr_id.as_deref())?;
        output::write_all(&args.output_directory, &rendered)?;
        Ok(())
    }

    #[test]
    fn inputs_required_without_templates_flag() {
        assert!(Args::try_parse_from(["openlmr-cps"]).is_err());
        assert!(Args::try_parse_from(["openlmr-cps", "--generate-templates"]).is_ok());
        assert!(Args::try_parse_from(["openlmr-cps", "--verify-defaults"]).is_ok());
    }

    #[test]
    fn parses_option_spellings() {
        let args = Args::try_parse_from([
            "openlmr-cps",
            "--verify-defaults",
            "--sorting",
            "analog_and_others_first",
            "--hotspot-tx-permit",
            "always",
            "--nicknames",
            "prefix-forced",
            "--talkgroup-sort",
            "id",
            "-vv",
        ])
        .unwrap();
        let options = args.run_options();
        assert_eq!(options.sort_mode, ZoneSortMode::AnalogAndOthersFirst);
        assert_eq!(options.hotspot_tx_permit, HotspotTxPermit::Always);
        assert_eq!(options.nickname_mode, NicknameMode::PrefixForced);
        assert_eq!(options.talkgroup_sort, TalkgroupSort::Id);
        assert_eq!(args.verbose, 2);
        assert_eq!(args.radio_config_path(), PathBuf::from("config/radio.toml"));
    }

    #[test]
    fn writes_all_outputs() {
        let inputs = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let out = out.path().join("Output");
        let args = args_for(inputs.path(), &out, &["--dmr-id", "3151234"]);
        run(&args).unwrap();

        for file in ["channels.csv", "zones.csv", "scanlists.csv", "talkgroups.csv", "radio_id_list.csv"] {
            assert!(out.join(file).exists(), "{file} missing");
        }
        let zones = fs::read_to_string(out.join("zones.csv")).unwrap();
        assert!(zones.starts_with("\"No.\",\"Zone Name\""));
        assert!(zones.contains("\r\n"));
        let channels = fs::read_to_string(out.join("channels.csv")).unwrap();
        // Header plus 21 channels.
        assert_eq!(channels.lines().count(), 22);
    }

    #[test]
    fn failed_run_writes_nothing() {
        let inputs = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let out = out.path().join("Output");
        let args = args_for(inputs.path(), &out, &[]);
        fs::write(
            inputs.path().join("Digital-Others_template.csv"),
            "Zone,Channel Name,Power,RX Freq,TX Freq,RX Color Code,TX Color Code,Talk Group,TimeSlot,Call Type,TX Permit\n\
             PiStar,PiBM/Bridge 2,Low,440.35,445.35,1,1,Bridge 2,1,Private Call,Same Color Code\n",
        )
        .unwrap();

        let err = run(&args).unwrap_err();
        assert!(err.to_string().contains("Bridge 2"));
        assert!(!out.exists());
    }

    #[test]
    fn bad_dmr_id_writes_nothing() {
        let inputs = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let out = out.path().join("Output");
        let args = args_for(inputs.path(), &out, &["--dmr-id", "0"]);
        assert!(run(&args).is_err());
        assert!(!out.exists());
    }
}
