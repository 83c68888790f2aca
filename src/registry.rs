use crate::error::{Result, SyncError};
use crate::keys::{KeyStatus, LocalKey, RemoteKey, RemoteKeyData};
use std::collections::BTreeMap;
use tracing::debug;

/// One DNS zone under reconciliation, keyed by its origin. Holds at most
/// one local key (the control plane exports a single KSK per zone) and any
/// number of remote keys (the registrar retains historical entries).
#[derive(Debug, Clone)]
pub struct Zone {
    origin: String,
    local: Option<LocalKey>,
    remote: Vec<RemoteKey>,
    status: KeyStatus,
}

impl Zone {
    fn new(origin: String) -> Self {
        Zone {
            origin,
            local: None,
            remote: Vec::new(),
            status: KeyStatus::NOT_CHECKED,
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn local_key(&self) -> Option<&LocalKey> {
        self.local.as_ref()
    }

    pub fn remote_keys(&self) -> &[RemoteKey] {
        &self.remote
    }

    /// Aggregate status, the union of the per-key outcomes
    pub fn status(&self) -> KeyStatus {
        self.status
    }

    pub fn has_local(&self) -> bool {
        self.local.is_some()
    }

    pub fn has_remote(&self) -> bool {
        !self.remote.is_empty()
    }

    /// First remote key whose data fully matches the local key. Zones can
    /// hold several keys with mixed outcomes; the report's status column
    /// deliberately surfaces the first full match only, the corrupt and
    /// orphan counts cover the rest.
    pub fn live_key(&self) -> Option<&RemoteKey> {
        self.remote.iter().find(|key| key.status().is_ok())
    }

    pub fn corrupt_keys(&self) -> impl Iterator<Item = &RemoteKey> {
        self.remote.iter().filter(|key| key.status().is_corrupted())
    }

    pub fn orphaned_keys(&self) -> impl Iterator<Item = &RemoteKey> {
        self.remote.iter().filter(|key| key.status().is_orphaned())
    }

    /// Compute this zone's status from its keys. Only a zone seen on both
    /// sides gets its remote keys matched; each key's outcome is folded
    /// into the aggregate.
    fn verify(&mut self) {
        if self.local.is_some() {
            self.status.known = true;
        }
        if !self.remote.is_empty() {
            self.status.published = true;
        }
        let Some(local) = &self.local else {
            return;
        };
        if !self.status.published {
            return;
        }
        for key in &mut self.remote {
            key.match_local(local);
            self.status.merge(key.status());
        }
    }
}

/// In-memory registry of every zone seen during one run. Rebuilt from
/// scratch each invocation; ingestion is append-only, `verify` runs once
/// after ingestion, the queries are read-only.
#[derive(Debug, Default)]
pub struct ZoneRegistry {
    zones: BTreeMap<String, Zone>,
}

impl ZoneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn zone_entry(&mut self, origin: &str) -> &mut Zone {
        self.zones
            .entry(origin.to_string())
            .or_insert_with(|| Zone::new(origin.to_string()))
    }

    /// Attach (or replace) the local key of a zone, creating the zone on
    /// first sight
    pub fn add_local(&mut self, origin: &str, key: LocalKey) {
        self.zone_entry(origin).local = Some(key);
    }

    /// Ingest one listed registrar key. Entries in a deleted lifecycle
    /// state are discarded here and never create or mutate a zone.
    pub fn add_remote(&mut self, data: RemoteKeyData) {
        if data.is_removed() {
            debug!(
                "Skipping {} key {} for {}",
                data.status, data.id, data.owner_name
            );
            return;
        }
        let key = RemoteKey::new(data);
        let origin = key.origin();
        self.zone_entry(&origin).remote.push(key);
    }

    /// Run the matching pass over every zone. Call exactly once, after all
    /// ingestion is complete.
    pub fn verify(&mut self) {
        for zone in self.zones.values_mut() {
            zone.verify();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn zones(&self) -> impl Iterator<Item = &Zone> {
        self.zones.values()
    }

    pub fn zone(&self, origin: &str) -> Result<&Zone> {
        self.zones
            .get(origin)
            .ok_or_else(|| SyncError::UnknownZone(origin.to_string()))
    }

    /// Zones fully synced on both sides
    pub fn live_zones(&self) -> Vec<&Zone> {
        self.zones
            .values()
            .filter(|zone| zone.status().is_ok())
            .collect()
    }

    /// Zones with a local key and no confirmed full match at the registrar.
    /// Whether the registrar has no key, an orphan or a corrupt entry, the
    /// local key must be (re)published either way.
    pub fn unpublished_zones(&self) -> Vec<&Zone> {
        self.zones
            .values()
            .filter(|zone| zone.status().is_unpublished())
            .collect()
    }

    /// Zones the control plane knows (signed locally)
    pub fn zones_with_local(&self) -> Vec<&Zone> {
        self.zones.values().filter(|zone| zone.has_local()).collect()
    }

    /// Zones the registrar lists at least one active key for
    pub fn zones_with_remote(&self) -> Vec<&Zone> {
        self.zones.values().filter(|zone| zone.has_remote()).collect()
    }

    /// Remote keys whose public key matches the local one while the rest of
    /// the record diverges, optionally scoped to one origin
    pub fn corrupted_keys(&self, origin: Option<&str>) -> Result<Vec<&RemoteKey>> {
        match origin {
            Some(origin) => Ok(self.zone(origin)?.corrupt_keys().collect()),
            None => Ok(self
                .zones
                .values()
                .flat_map(|zone| zone.corrupt_keys())
                .collect()),
        }
    }

    /// Remote keys no local key accounts for, optionally scoped to one origin
    pub fn orphaned_keys(&self, origin: Option<&str>) -> Result<Vec<&RemoteKey>> {
        match origin {
            Some(origin) => Ok(self.zone(origin)?.orphaned_keys().collect()),
            None => Ok(self
                .zones
                .values()
                .flat_map(|zone| zone.orphaned_keys())
                .collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{DnskeyData, DsData};

    fn local_key(origin: &str, public_key: &str, digest: &str) -> LocalKey {
        LocalKey {
            dnskey: DnskeyData {
                origin: origin.to_string(),
                key_type: "257".to_string(),
                protocol: "3".to_string(),
                cipher: "13".to_string(),
                key: public_key.to_string(),
            },
            ds: DsData {
                origin: origin.to_string(),
                id: "111".to_string(),
                cipher: "13".to_string(),
                hashtype: "2".to_string(),
                hash: digest.to_string(),
            },
        }
    }

    fn remote_key(owner: &str, id: &str, public_key: &str, digest: &str) -> RemoteKeyData {
        RemoteKeyData {
            id: id.to_string(),
            owner_name: owner.to_string(),
            flag_id: "257".to_string(),
            algorithm_id: "13".to_string(),
            public_key: public_key.to_string(),
            digest_type_id: "2".to_string(),
            digest: digest.to_string(),
            key_tag: "111".to_string(),
            status: "OK".to_string(),
        }
    }

    #[test]
    fn local_only_zone_is_unpublished_not_live() {
        let mut registry = ZoneRegistry::new();
        registry.add_local("example.com.", local_key("example.com.", "K1", "H1"));
        registry.verify();

        let zone = registry.zone("example.com.").unwrap();
        assert!(zone.status().known);
        assert!(!zone.status().published);
        assert_eq!(registry.unpublished_zones().len(), 1);
        assert!(registry.live_zones().is_empty());
    }

    #[test]
    fn matching_zone_is_live_and_in_no_repair_set() {
        let mut registry = ZoneRegistry::new();
        registry.add_local("example.com.", local_key("example.com.", "K1", "H1"));
        registry.add_remote(remote_key("example.com", "9", "K1", "H1"));
        registry.verify();

        assert_eq!(registry.live_zones().len(), 1);
        assert!(registry.unpublished_zones().is_empty());
        assert!(registry.orphaned_keys(None).unwrap().is_empty());
        assert!(registry.corrupted_keys(None).unwrap().is_empty());
    }

    #[test]
    fn digest_mismatch_is_corrupt_never_orphaned() {
        let mut registry = ZoneRegistry::new();
        registry.add_local("example.com.", local_key("example.com.", "K1", "H1"));
        registry.add_remote(remote_key("example.com", "9", "K1", "H2"));
        registry.verify();

        let corrupt = registry.corrupted_keys(None).unwrap();
        assert_eq!(corrupt.len(), 1);
        assert_eq!(corrupt[0].key_id(), "9");
        assert!(registry.orphaned_keys(None).unwrap().is_empty());
        // No full match anywhere, so the zone still needs a republish
        assert_eq!(registry.unpublished_zones().len(), 1);
    }

    #[test]
    fn foreign_key_is_orphaned_never_corrupt() {
        let mut registry = ZoneRegistry::new();
        registry.add_local("example.com.", local_key("example.com.", "K1", "H1"));
        registry.add_remote(remote_key("example.com", "7", "K9", "H9"));
        registry.verify();

        let orphaned = registry.orphaned_keys(None).unwrap();
        assert_eq!(orphaned.len(), 1);
        assert_eq!(orphaned[0].key_id(), "7");
        assert!(registry.corrupted_keys(None).unwrap().is_empty());
    }

    #[test]
    fn deleted_lifecycle_keys_never_touch_the_registry() {
        let mut registry = ZoneRegistry::new();
        for status in ["DELETED", "DELETE"] {
            let mut data = remote_key("gone.example.", "3", "K1", "H1");
            data.status = status.to_string();
            registry.add_remote(data);
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn reingesting_an_identical_key_keeps_the_classification() {
        let mut registry = ZoneRegistry::new();
        registry.add_local("example.com.", local_key("example.com.", "K1", "H1"));
        registry.add_remote(remote_key("example.com", "9", "K1", "H1"));
        registry.add_remote(remote_key("example.com", "9", "K1", "H1"));
        registry.verify();

        assert_eq!(registry.live_zones().len(), 1);
        assert!(registry.unpublished_zones().is_empty());
        assert!(registry.corrupted_keys(None).unwrap().is_empty());
        assert!(registry.orphaned_keys(None).unwrap().is_empty());
    }

    #[test]
    fn mixed_outcomes_coexist_under_one_zone() {
        let mut registry = ZoneRegistry::new();
        registry.add_local("example.com.", local_key("example.com.", "K1", "H1"));
        registry.add_remote(remote_key("example.com", "1", "K1", "H1")); // live
        registry.add_remote(remote_key("example.com", "2", "K1", "H2")); // corrupt
        registry.add_remote(remote_key("example.com", "3", "K9", "H9")); // orphan
        registry.verify();

        let zone = registry.zone("example.com.").unwrap();
        assert!(zone.status().is_ok());
        assert_eq!(zone.live_key().unwrap().key_id(), "1");
        assert_eq!(registry.corrupted_keys(None).unwrap().len(), 1);
        assert_eq!(registry.orphaned_keys(None).unwrap().len(), 1);
        // The zone holds a full match, so it is not a publish target
        assert!(registry.unpublished_zones().is_empty());
    }

    #[test]
    fn origin_scoping_hits_only_the_named_zone() {
        let mut registry = ZoneRegistry::new();
        registry.add_local("example.com.", local_key("example.com.", "K1", "H1"));
        registry.add_remote(remote_key("example.com", "9", "K1", "H2"));
        registry.add_remote(remote_key("other.com", "4", "KX", "HX"));
        registry.verify();

        assert_eq!(
            registry.corrupted_keys(Some("example.com.")).unwrap().len(),
            1
        );
        assert!(
            registry
                .orphaned_keys(Some("example.com."))
                .unwrap()
                .is_empty()
        );
        assert_eq!(registry.orphaned_keys(Some("other.com.")).unwrap().len(), 1);
        assert!(matches!(
            registry.orphaned_keys(Some("missing.example.")),
            Err(SyncError::UnknownZone(_))
        ));
    }

    #[test]
    fn orphan_elsewhere_leaves_unpublished_set_alone() {
        let mut registry = ZoneRegistry::new();
        registry.add_local("example.com.", local_key("example.com.", "K1", "H1"));
        registry.add_remote(remote_key("example.com", "9", "K1", "H1"));
        registry.add_remote(remote_key("other.com", "4", "KX", "HX"));
        registry.verify();

        assert!(registry.unpublished_zones().is_empty());
        assert_eq!(registry.orphaned_keys(None).unwrap().len(), 1);
    }
}
