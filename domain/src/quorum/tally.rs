//! Running count of agreeing answers

use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::net::IpAddr;

/// Count of successful outcomes per reported address
///
/// Counts only ever increase. Insertion order is remembered so that ties
/// are broken in favour of the address seen first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tally {
    counts: HashMap<IpAddr, usize>,
    order: Vec<IpAddr>,
}

impl Tally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one more vote for `address`, returning its new count
    pub fn record(&mut self, address: IpAddr) -> usize {
        if !self.counts.contains_key(&address) {
            self.order.push(address);
        }
        let count = self.counts.entry(address).or_insert(0);
        *count += 1;
        *count
    }

    pub fn count(&self, address: &IpAddr) -> usize {
        self.counts.get(address).copied().unwrap_or(0)
    }

    /// Number of distinct addresses seen
    pub fn distinct(&self) -> usize {
        self.order.len()
    }

    /// Total number of votes recorded
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Address with the most votes (first seen wins a tie)
    pub fn leader(&self) -> Option<(IpAddr, usize)> {
        self.iter().next()
    }

    /// Addresses with their counts, highest count first
    pub fn iter(&self) -> impl Iterator<Item = (IpAddr, usize)> + '_ {
        let mut entries: Vec<(IpAddr, usize)> =
            self.order.iter().map(|a| (*a, self.counts[a])).collect();
        // Stable sort keeps first-seen order among equal counts
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries.into_iter()
    }
}

impl FromIterator<IpAddr> for Tally {
    fn from_iter<T: IntoIterator<Item = IpAddr>>(iter: T) -> Self {
        let mut tally = Tally::new();
        for address in iter {
            tally.record(address);
        }
        tally
    }
}

impl Serialize for Tally {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.distinct()))?;
        for (address, count) in self.iter() {
            map.serialize_entry(&address.to_string(), &count)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_record_counts_up() {
        let mut tally = Tally::new();
        assert_eq!(tally.record(ip("1.2.3.4")), 1);
        assert_eq!(tally.record(ip("5.6.7.8")), 1);
        assert_eq!(tally.record(ip("1.2.3.4")), 2);
        assert_eq!(tally.count(&ip("1.2.3.4")), 2);
        assert_eq!(tally.count(&ip("9.9.9.9")), 0);
        assert_eq!(tally.distinct(), 2);
        assert_eq!(tally.total(), 3);
    }

    #[test]
    fn test_leader_tie_prefers_first_seen() {
        let tally: Tally = [ip("5.6.7.8"), ip("1.2.3.4")].into_iter().collect();
        assert_eq!(tally.leader(), Some((ip("5.6.7.8"), 1)));
    }

    #[test]
    fn test_iter_sorted_by_count() {
        let tally: Tally = [ip("1.1.1.1"), ip("2.2.2.2"), ip("2.2.2.2")]
            .into_iter()
            .collect();
        let entries: Vec<_> = tally.iter().collect();
        assert_eq!(entries, vec![(ip("2.2.2.2"), 2), (ip("1.1.1.1"), 1)]);
    }

    #[test]
    fn test_ipv6_equality_is_canonical() {
        let mut tally = Tally::new();
        tally.record(ip("2001:db8::1"));
        assert_eq!(tally.record(ip("2001:0db8:0:0:0:0:0:1")), 2);
    }

    #[test]
    fn test_serialize_as_map() {
        let tally: Tally = [ip("1.2.3.4"), ip("1.2.3.4")].into_iter().collect();
        let json = serde_json::to_value(&tally).unwrap();
        assert_eq!(json["1.2.3.4"], 2);
    }
}
