/// Comparison status of a key or zone.
///
/// Three independent facts, each recorded during verification:
/// - `known`: a local key exists for the zone
/// - `published`: a non-deleted key is listed at the registrar
/// - `data_matching`: the full canonical representations are identical
///
/// Composite states are derived, never stored. A freshly ingested remote
/// key starts as [`KeyStatus::newly_published`]; a fresh zone starts as
/// [`KeyStatus::NOT_CHECKED`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyStatus {
    pub known: bool,
    pub published: bool,
    pub data_matching: bool,
}

impl KeyStatus {
    /// Nothing verified yet
    pub const NOT_CHECKED: KeyStatus = KeyStatus {
        known: false,
        published: false,
        data_matching: false,
    };

    /// Initial status of every remote key that survives ingestion
    pub fn newly_published() -> Self {
        KeyStatus {
            known: false,
            published: true,
            data_matching: false,
        }
    }

    /// Fold another status in; the zone aggregate is the union of the
    /// statuses of its constituent keys.
    pub fn merge(&mut self, other: KeyStatus) {
        self.known |= other.known;
        self.published |= other.published;
        self.data_matching |= other.data_matching;
    }

    /// Fully synced: known locally, published remotely, data identical
    pub fn is_ok(&self) -> bool {
        self.known && self.published && self.data_matching
    }

    /// Known locally but no confirmed full match at the registrar. Covers
    /// "no remote key", "orphan present" and "corrupt present" alike; the
    /// key must be (re)published in every one of those cases.
    pub fn is_unpublished(&self) -> bool {
        self.known && !self.data_matching
    }

    /// Same public key as the local one, but accessory data (digest,
    /// cipher, ...) diverges. Exactly known-and-published, nothing more.
    pub fn is_corrupted(&self) -> bool {
        self.known && self.published && !self.data_matching
    }

    /// Published, but its public key matches no local key of the zone.
    /// Exactly published, nothing more.
    pub fn is_orphaned(&self) -> bool {
        self.published && !self.known && !self.data_matching
    }
}
