use core::fmt;

use thiserror::Error;

use crate::naming::UnfittableName;

pub type Result<T, E = CodeplugError> = core::result::Result<T, E>;

/// Where an input row came from. Only used to make error messages actionable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Short label of the input table, e.g. "Digital-Others".
    pub file: String,
    /// 1-based line number inside that table.
    pub line: u64,
}

impl SourceLocation {
    pub fn new(file: impl Into<String>, line: u64) -> Self {
        SourceLocation {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[On line {} of {} file.]", self.line, self.file)
    }
}

/// Every way a conversion run can fail. All of them abort the run.
#[derive(Debug, Error)]
pub enum CodeplugError {
    #[error("CSV header does not match expected for {file} file (found '{found}' expected '{expected}') {location}")]
    HeaderMismatch {
        file: String,
        found: String,
        expected: String,
        location: SourceLocation,
    },

    #[error("Invalid {field}: '{value}' {reason} {location}")]
    InvalidValue {
        field: &'static str,
        value: String,
        reason: String,
        location: SourceLocation,
    },

    #[error("Talkgroup '{name}' is referenced but not defined in the talkgroup directory {location}")]
    UnknownTalkgroup {
        name: String,
        location: SourceLocation,
    },

    #[error("Talkgroup '{name}' is defined more than once in the talkgroup directory {location}")]
    DuplicateTalkgroup {
        name: String,
        location: SourceLocation,
    },

    #[error(
        "Talkgroup '{talkgroup}' was previously identified as a '{bound}', but is now trying to be used as a \
         '{attempted}' on channel '{channel}' (Zone: '{zone}', RX: {rx_freq}, TX: {tx_freq}). The CPS won't allow \
         this to be imported. To fix this, create a second entry in your talkgroups input file for this talkgroup \
         with a different name. {location}"
    )]
    CallTypeConflict {
        talkgroup: String,
        bound: String,
        attempted: String,
        channel: String,
        zone: String,
        rx_freq: String,
        tx_freq: String,
        location: SourceLocation,
    },

    #[error("{source} {location}")]
    UnfittableName {
        source: UnfittableName,
        location: SourceLocation,
    },

    #[error("Runaway scanlist overflow for '{base}': no bucket below {limit} channels within {max_suffix} overflow lists {location}")]
    OverflowExhausted {
        base: String,
        limit: usize,
        max_suffix: usize,
        location: SourceLocation,
    },

    #[error("There are too many columns in '{file}' file (expected at most {expected}, found {found}) {location}")]
    TooManyColumns {
        file: String,
        expected: usize,
        found: usize,
        location: SourceLocation,
    },

    #[error("There are too few columns in '{file}' file (expected at least {expected}, found {found}) {location}")]
    TooFewColumns {
        file: String,
        expected: usize,
        found: usize,
        location: SourceLocation,
    },

    #[error("Missing required value for '{field}' in channel '{channel}' {location}")]
    MissingRequired {
        field: String,
        channel: String,
        location: SourceLocation,
    },

    #[error("Different RX and TX color codes ({rx} and {tx}) not supported in older firmware versions {location}")]
    ColorCodeMismatch {
        rx: u8,
        tx: u8,
        location: SourceLocation,
    },

    #[error("Invalid DMR ID: '{0}' must be a positive integer")]
    InvalidDmrId(String),

    #[error("Radio configuration error: {0}")]
    Config(String),

    #[error("Failed to parse radio configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to read {file} file: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
