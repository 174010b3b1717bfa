use std::net::Ipv4Addr;

/// Placeholder written for addresses without a resolved name
pub const FAILURE_MARKER: &str = ".";

/// Outcome of one reverse lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Resolved(String),
    Failed,
}

/// Hostname slot of an [`AddressRecord`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Hostname {
    #[default]
    Unset,
    Resolved(String),
    Failed,
}

impl Hostname {
    /// Text shown in output: the name, or [`FAILURE_MARKER`]
    pub fn display(&self) -> &str {
        self.name().unwrap_or(FAILURE_MARKER)
    }

    /// The resolved name, if there is one
    pub fn name(&self) -> Option<&str> {
        match self {
            Hostname::Resolved(name) => Some(name),
            Hostname::Unset | Hostname::Failed => None,
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            Hostname::Unset => "unresolved",
            Hostname::Resolved(_) => "resolved",
            Hostname::Failed => "failed",
        }
    }

    pub fn is_set(&self) -> bool {
        !matches!(self, Hostname::Unset)
    }
}

impl From<LookupOutcome> for Hostname {
    fn from(outcome: LookupOutcome) -> Self {
        match outcome {
            LookupOutcome::Resolved(name) => Hostname::Resolved(name),
            LookupOutcome::Failed => Hostname::Failed,
        }
    }
}

/// A single address to resolve and its result
#[derive(Debug, Clone)]
pub struct AddressRecord {
    addr: Ipv4Addr,
    text: String,
    hostname: Hostname,
}

impl AddressRecord {
    fn new(addr: Ipv4Addr) -> Self {
        Self {
            addr,
            text: addr.to_string(),
            hostname: Hostname::Unset,
        }
    }

    pub fn addr(&self) -> Ipv4Addr {
        self.addr
    }

    /// Dotted-decimal form
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn hostname(&self) -> &Hostname {
        &self.hostname
    }

    /// Store the lookup outcome. Returns `false` and leaves the record
    /// untouched if it was already settled.
    pub fn settle(&mut self, outcome: LookupOutcome) -> bool {
        if self.hostname.is_set() {
            return false;
        }
        self.hostname = outcome.into();
        true
    }
}

/// Every address of a range, ascending, fixed length
#[derive(Debug, Clone)]
pub struct AddressList {
    records: Vec<AddressRecord>,
}

impl AddressList {
    /// Build one record per address in `start..=end`.
    ///
    /// # Panics
    ///
    /// Panics if `end < start`; callers derive both bounds from a [`Subnet`](super::Subnet).
    pub fn build(start: u32, end: u32) -> Self {
        assert!(
            end >= start,
            "malformed range: end {} precedes start {}",
            Ipv4Addr::from(end),
            Ipv4Addr::from(start)
        );

        let records = (start..=end)
            .map(|ip| AddressRecord::new(Ipv4Addr::from(ip)))
            .collect();

        Self { records }
    }

    pub fn get(&self, index: usize) -> Option<&AddressRecord> {
        self.records.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut AddressRecord> {
        self.records.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AddressRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a AddressList {
    type Item = &'a AddressRecord;
    type IntoIter = std::slice::Iter<'a, AddressRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_ascending() {
        let start = u32::from(Ipv4Addr::new(192, 168, 1, 0));
        let list = AddressList::build(start, start + 3);

        assert_eq!(list.len(), 4);
        let texts: Vec<&str> = list.iter().map(|r| r.as_str()).collect();
        assert_eq!(
            texts,
            ["192.168.1.0", "192.168.1.1", "192.168.1.2", "192.168.1.3"]
        );
        assert!(list.iter().all(|r| *r.hostname() == Hostname::Unset));
    }

    #[test]
    fn test_build_single() {
        let ip = u32::from(Ipv4Addr::new(1, 1, 1, 1));
        let list = AddressList::build(ip, ip);
        assert_eq!(list.len(), 1);
        assert_eq!(list.get(0).unwrap().addr(), Ipv4Addr::new(1, 1, 1, 1));
    }

    #[test]
    fn test_build_top_of_space() {
        let start = u32::from(Ipv4Addr::new(255, 255, 255, 252));
        let list = AddressList::build(start, u32::MAX);
        assert_eq!(list.len(), 4);
        assert_eq!(list.get(3).unwrap().addr(), Ipv4Addr::BROADCAST);
    }

    #[test]
    #[should_panic(expected = "malformed range")]
    fn test_build_rejects_inverted_range() {
        AddressList::build(10, 9);
    }

    #[test]
    fn test_settle_only_once() {
        let mut list = AddressList::build(0, 0);
        let record = list.get_mut(0).unwrap();

        assert!(record.settle(LookupOutcome::Resolved("one.example".to_string())));
        assert!(!record.settle(LookupOutcome::Failed));
        assert_eq!(
            *record.hostname(),
            Hostname::Resolved("one.example".to_string())
        );
    }

    #[test]
    fn test_display_marker() {
        assert_eq!(Hostname::Unset.display(), FAILURE_MARKER);
        assert_eq!(Hostname::Failed.display(), FAILURE_MARKER);
        assert_eq!(Hostname::Resolved("a.b".into()).display(), "a.b");
    }
}
