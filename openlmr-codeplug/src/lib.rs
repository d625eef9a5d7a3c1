//! Channel derivation for AnyTone CPS imports.
//!
//! Simplified channel tables (analog channels, DMR hotspot/simplex channels,
//! DMR repeater matrices and a talkgroup directory) are turned into the
//! channel, zone, scanlist and talkgroup tables the CPS expects.

pub mod channel;
pub mod config;
pub mod context;
pub mod error;
pub mod grouping;
pub mod matrix;
pub mod naming;
pub mod ordering;
pub mod source;
pub mod talkgroup;
pub mod validate;
pub mod views;

pub use channel::{CallType, ChannelMode, ChannelRecord, HotspotTxPermit, SourceKind, TxPermit};
pub use config::{ColorCodeSupport, RadioConfig, RadioProfile};
pub use context::{convert, Codeplug, ConversionContext, Inputs, RunOptions};
pub use error::{CodeplugError, Result, SourceLocation};
pub use naming::NicknameMode;
pub use ordering::ZoneSortMode;
pub use source::SourceTable;
pub use talkgroup::TalkgroupSort;
pub use views::{radio_id_table, Rendered, RowSink, Table, Truncation};
