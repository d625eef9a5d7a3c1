//! Zone and scanlist buckets.
//!
//! Zones grow without bound and are truncated only when serialized. Scanlists
//! never exceed the configured limit: once `<base>` is full, channels go to
//! `<base>_OF2`, `<base>_OF3` and so on.

use std::collections::BTreeMap;

use crate::channel::{ChannelRecord, SourceKind};
use crate::ordering::ChannelOrderKey;

/// Upper bound on overflow suffixes before giving up.
pub const MAX_OVERFLOW_SUFFIX: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member<K> {
    pub key: K,
    pub name: String,
    pub rx_freq: String,
    pub tx_freq: String,
}

impl<K> Member<K> {
    pub fn new(key: K, channel: &ChannelRecord) -> Self {
        Member {
            key,
            name: channel.name.clone(),
            rx_freq: channel.rx_freq.clone(),
            tx_freq: channel.tx_freq.clone(),
        }
    }
}

fn sorted<K: Ord>(members: &[Member<K>]) -> Vec<&Member<K>> {
    let mut sorted: Vec<&Member<K>> = members.iter().collect();
    sorted.sort_by(|a, b| a.key.cmp(&b.key));
    sorted
}

#[derive(Debug, Clone)]
pub struct ZoneBucket {
    pub name: String,
    /// Source table that first populated this zone.
    pub kind: SourceKind,
    pub first_seen: usize,
    members: Vec<Member<ChannelOrderKey>>,
}

impl ZoneBucket {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> Vec<&Member<ChannelOrderKey>> {
        sorted(&self.members)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ZoneTable {
    zones: BTreeMap<String, ZoneBucket>,
}

impl ZoneTable {
    pub fn add(&mut self, zone: &str, kind: SourceKind, member: Member<ChannelOrderKey>) {
        let next = self.zones.len() + 1;
        self.zones
            .entry(zone.to_string())
            .or_insert_with(|| ZoneBucket {
                name: zone.to_string(),
                kind,
                first_seen: next,
                members: Vec::new(),
            })
            .members
            .push(member);
    }

    pub fn get(&self, zone: &str) -> Option<&ZoneBucket> {
        self.zones.get(zone)
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ZoneBucket> {
        self.zones.values()
    }
}

#[derive(Debug, Clone)]
pub struct ScanlistBucket {
    pub name: String,
    members: Vec<Member<String>>,
}

impl ScanlistBucket {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn members(&self) -> Vec<&Member<String>> {
        sorted(&self.members)
    }
}

/// The resolved bucket name could not be found below the suffix bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverflowExhausted {
    pub base: String,
    pub limit: usize,
}

#[derive(Debug, Clone)]
pub struct ScanlistTable {
    limit: usize,
    lists: BTreeMap<String, ScanlistBucket>,
}

impl ScanlistTable {
    pub fn new(limit: usize) -> Self {
        ScanlistTable {
            limit,
            lists: BTreeMap::new(),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn count(&self, name: &str) -> usize {
        self.lists.get(name).map_or(0, ScanlistBucket::len)
    }

    /// First of `base`, `base_OF2`, `base_OF3`, ... with room for one more channel.
    pub fn resolve(&self, base: &str) -> Result<String, OverflowExhausted> {
        for n in 1..=MAX_OVERFLOW_SUFFIX {
            let name = if n == 1 {
                base.to_string()
            } else {
                format!("{base}_OF{n}")
            };
            if self.count(&name) < self.limit {
                return Ok(name);
            }
        }
        Err(OverflowExhausted {
            base: base.to_string(),
            limit: self.limit,
        })
    }

    /// Adds the member to the bucket returned by [`Self::resolve`].
    pub fn assign(&mut self, base: &str, member: Member<String>) -> Result<String, OverflowExhausted> {
        let name = self.resolve(base)?;
        self.push(&name, member);
        Ok(name)
    }

    /// Adds the member to `name` as resolved earlier.
    pub fn push(&mut self, name: &str, member: Member<String>) {
        self.lists
            .entry(name.to_string())
            .or_insert_with(|| ScanlistBucket {
                name: name.to_string(),
                members: Vec::new(),
            })
            .members
            .push(member);
    }

    pub fn get(&self, name: &str) -> Option<&ScanlistBucket> {
        self.lists.get(name)
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ScanlistBucket> {
        self.lists.values()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::channel::ChannelMode;
    use crate::ordering::{scanlist_order_key, ChannelOrderKey, ZoneSortMode};
    use crate::talkgroup::TalkgroupDirectory;

    fn member(name: &str) -> Member<String> {
        let channel = ChannelRecord::new(ChannelMode::Digital, "Z", name);
        Member::new(scanlist_order_key(name), &channel)
    }

    #[test]
    fn overflow_into_numbered_lists() {
        let mut table = ScanlistTable::new(2);
        assert_eq!(table.assign("REPEATER1", member("A")).unwrap(), "REPEATER1");
        assert_eq!(table.assign("REPEATER1", member("B")).unwrap(), "REPEATER1");
        assert_eq!(table.assign("REPEATER1", member("C")).unwrap(), "REPEATER1_OF2");
        assert_eq!(table.count("REPEATER1"), 2);
        assert_eq!(table.count("REPEATER1_OF2"), 1);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn overflow_guard() {
        let mut table = ScanlistTable::new(1);
        for i in 0..MAX_OVERFLOW_SUFFIX {
            table.assign("X", member(&i.to_string())).unwrap();
        }
        assert_eq!(
            table.resolve("X"),
            Err(OverflowExhausted {
                base: "X".into(),
                limit: 1
            })
        );
    }

    #[test]
    fn scanlist_members_sorted_case_insensitively() {
        let mut table = ScanlistTable::new(10);
        for name in ["bravo", "Charlie", "alpha"] {
            table.assign("L", member(name)).unwrap();
        }
        let names: Vec<_> = table.get("L").unwrap().members().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["alpha", "bravo", "Charlie"]);
    }

    #[test]
    fn zone_keeps_first_kind_and_is_uncapped() {
        let dir = TalkgroupDirectory::new();
        let mut zones = ZoneTable::default();
        for i in 0..300 {
            let channel = ChannelRecord::new(ChannelMode::Analog, "Big", format!("CH{i}"));
            let key = ChannelOrderKey::for_channel(ZoneSortMode::Alpha, &channel, &dir, i);
            let kind = if i == 0 { SourceKind::DigitalOthers } else { SourceKind::Analog };
            zones.add("Big", kind, Member::new(key, &channel));
        }
        let zone = zones.get("Big").unwrap();
        assert_eq!(zone.len(), 300);
        assert_eq!(zone.kind, SourceKind::DigitalOthers);
        assert_eq!(zone.first_seen, 1);
    }

    proptest! {
        #[test]
        fn scanlists_never_exceed_limit(limit in 1usize..8, bases in proptest::collection::vec(0u8..4, 0..120)) {
            let mut table = ScanlistTable::new(limit);
            for (i, base) in bases.iter().enumerate() {
                table.assign(&format!("L{base}"), member(&format!("ch{i}"))).unwrap();
            }
            let mut total = 0;
            for list in table.iter() {
                prop_assert!(list.len() <= limit);
                total += list.len();
            }
            prop_assert_eq!(total, bases.len());
            for base in 0u8..4 {
                let expected = bases.iter().filter(|b| **b == base).count();
                let found: usize = table
                    .iter()
                    .filter(|l| l.name == format!("L{base}") || l.name.starts_with(&format!("L{base}_OF")))
                    .map(ScanlistBucket::len)
                    .sum();
                prop_assert_eq!(found, expected);
            }
        }
    }
}
