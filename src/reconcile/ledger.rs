use std::collections::HashSet;
use std::fmt;

/// Number of content characters that take part in a fingerprint.
pub const FINGERPRINT_PREFIX_CHARS: usize = 100;

/// Content key of one utterance: speaker name plus a bounded content prefix,
/// optionally salted with the event's message count.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    #[must_use]
    pub fn new(name: &str, content: &str) -> Self {
        Self(format!("{name}::{}", content_prefix(content)))
    }

    #[must_use]
    pub fn salted(name: &str, content: &str, message_count: u64) -> Self {
        Self(format!("{name}::{}:{message_count}", content_prefix(content)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn content_prefix(content: &str) -> &str {
    match content.char_indices().nth(FINGERPRINT_PREFIX_CHARS) {
        Some((end, _)) => &content[..end],
        None => content,
    }
}

/// Per-session dedup bookkeeping for human-side transcript lines.
///
/// Owned by one session and passed explicitly to the reconciliation
/// handlers; two sessions never share a ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DedupLedger {
    acknowledged: u64,
    seen: HashSet<Fingerprint>,
}

impl DedupLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Candidate keys for one wire message. The salted key is only derived
    /// when the event carries a non-zero message count; the unsalted key
    /// always is, so an optimistic echo without a count still matches.
    #[must_use]
    pub fn candidates(name: &str, content: &str, message_count: Option<u64>) -> Vec<Fingerprint> {
        let base = Fingerprint::new(name, content);
        match message_count.filter(|count| *count > 0) {
            Some(count) => vec![Fingerprint::salted(name, content, count), base],
            None => vec![base],
        }
    }

    /// Records `candidates` unless any of them was already seen.
    ///
    /// Returns true when the message is new and should be shown.
    pub fn admit(&mut self, candidates: &[Fingerprint]) -> bool {
        if self.contains_any(candidates) {
            return false;
        }

        self.seen.extend(candidates.iter().cloned());
        true
    }

    /// Pre-records fingerprints of a line this client is about to echo.
    pub fn seed<I>(&mut self, fingerprints: I)
    where
        I: IntoIterator<Item = Fingerprint>,
    {
        self.seen.extend(fingerprints);
    }

    #[must_use]
    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.seen.contains(fingerprint)
    }

    #[must_use]
    pub fn contains_any(&self, candidates: &[Fingerprint]) -> bool {
        candidates.iter().any(|candidate| self.seen.contains(candidate))
    }

    /// Moves the acknowledged count forward. Never moves it back.
    pub fn advance_to(&mut self, message_count: u64) {
        self.acknowledged = self.acknowledged.max(message_count);
    }

    #[must_use]
    pub fn acknowledged(&self) -> u64 {
        self.acknowledged
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn clear(&mut self) {
        self.acknowledged = 0;
        self.seen.clear();
    }
}
