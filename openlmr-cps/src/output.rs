use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use openlmr_codeplug::{Rendered, Table};
use tempfile::NamedTempFile;
use tracing::debug;

const RADIO_ID_FILE: &str = "radio_id_list.csv";

/// Writes one table the way the CPS import expects: every field quoted,
/// CRLF line endings.
pub fn write_table<W: Write>(out: W, table: &Table) -> csv::Result<()> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::CRLF)
        .from_writer(out);
    table.write_to(&mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Writes every rendered table into `dir`, creating it if needed.
///
/// Tables are staged in temporary files next to their targets and renamed
/// only once all of them were written. A `radio_id_list.csv` left by an
/// earlier run is removed when this run has none.
pub fn write_all(dir: &Path, rendered: &Rendered) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("could not create output directory {}", dir.display()))?;

    let mut files = vec![
        ("channels.csv", &rendered.channels),
        ("zones.csv", &rendered.zones),
        ("scanlists.csv", &rendered.scanlists),
        ("talkgroups.csv", &rendered.talkgroups),
    ];
    if let Some(radio_ids) = &rendered.radio_ids {
        files.push((RADIO_ID_FILE, radio_ids));
    }

    let mut staged = Vec::with_capacity(files.len());
    for (name, table) in files {
        let path = dir.join(name);
        let mut temp = NamedTempFile::new_in(dir)
            .with_context(|| format!("could not create a temporary file in {}", dir.display()))?;
        write_table(temp.as_file_mut(), table).with_context(|| format!("could not write {}", path.display()))?;
        staged.push((temp, path));
    }

    if rendered.radio_ids.is_none() {
        let stale = dir.join(RADIO_ID_FILE);
        match fs::remove_file(&stale) {
            Ok(()) => debug!(path = %stale.display(), "removed stale radio ID list"),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => return Err(err).with_context(|| format!("could not remove {}", stale.display())),
        }
    }

    let mut written = Vec::with_capacity(staged.len());
    for (temp, path) in staged {
        temp.persist(&path)
            .with_context(|| format!("could not replace {}", path.display()))?;
        written.push(path);
    }
    Ok(written)
}
