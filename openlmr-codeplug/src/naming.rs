//! Compact channel names built from a zone nickname and a contact name.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NicknameMode {
    #[default]
    Off,
    Prefix,
    Suffix,
    PrefixForced,
    SuffixForced,
}

impl NicknameMode {
    fn is_forced(self) -> bool {
        matches!(self, NicknameMode::PrefixForced | NicknameMode::SuffixForced)
    }

    fn is_prefix(self) -> bool {
        matches!(self, NicknameMode::Prefix | NicknameMode::PrefixForced)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Can't make a channel name fit into {max} characters for '{zone_nick}' and '{contact_nick}'")]
pub struct UnfittableName {
    pub zone_nick: String,
    pub contact_nick: String,
    pub max: usize,
}

/// Splits a `Full;Nick` cell. The nickname is `None` when absent or empty.
pub fn split_nickname(cell: &str) -> (&str, Option<&str>) {
    let mut parts = cell.split(';');
    let full = parts.next().unwrap_or_default();
    let nick = parts.next().filter(|nick| !nick.is_empty());
    (full, nick)
}

/// Builds a channel name of at most `max_len` characters.
///
/// With `Off`, or without a zone nickname, the contact name is returned as is
/// and the length is left for the caller to check.
pub fn synthesize_name(
    mode: NicknameMode,
    zone_nick: &str,
    contact: &str,
    contact_nick: Option<&str>,
    max_len: usize,
) -> Result<String, UnfittableName> {
    if mode == NicknameMode::Off || zone_nick.is_empty() {
        return Ok(contact.to_string());
    }
    let nick = contact_nick.unwrap_or(contact);
    let full = if mode.is_forced() { nick } else { contact };

    let zone_len = zone_nick.chars().count();
    let fits = |name: &str, sep: usize| zone_len + name.chars().count() + sep <= max_len;
    let (name, mut sep) = if fits(full, 1) {
        (full, " ")
    } else if fits(nick, 1) {
        (nick, " ")
    } else if fits(nick, 0) {
        (nick, "")
    } else {
        return Err(UnfittableName {
            zone_nick: zone_nick.to_string(),
            contact_nick: nick.to_string(),
            max: max_len,
        });
    };

    // Leading punctuation glues straight onto the name.
    if !zone_nick.starts_with(|c: char| c.is_ascii_alphanumeric()) {
        sep = "";
    }

    Ok(if mode.is_prefix() {
        format!("{zone_nick}{sep}{name}")
    } else {
        format!("{name}{sep}{zone_nick}")
    })
}
