use super::{KeyStatus, LocalKey, canonical_string, constants, string_or_number};
use serde::Deserialize;

/// One key entry as reported by the registrar's bulk listing. The
/// registrar keeps historical entries too; lifecycle status tells them
/// apart.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteKeyData {
    /// Provider-assigned identifier, used for delete requests
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Zone name without trailing dot
    pub owner_name: String,
    /// Key role flags: 256 (ZSK) or 257 (KSK)
    #[serde(deserialize_with = "string_or_number")]
    pub flag_id: String,
    /// Signing algorithm number
    #[serde(deserialize_with = "string_or_number")]
    pub algorithm_id: String,
    pub public_key: String,
    #[serde(deserialize_with = "string_or_number")]
    pub digest_type_id: String,
    pub digest: String,
    #[serde(deserialize_with = "string_or_number")]
    pub key_tag: String,
    /// Lifecycle status on the provider side, free text
    /// (CREATE/DELAYED/OK/DELETE/DELETED)
    pub status: String,
}

impl RemoteKeyData {
    /// Entries in these lifecycle states are discarded before ingestion;
    /// they never create or mutate a zone.
    pub fn is_removed(&self) -> bool {
        self.status == "DELETED" || self.status == "DELETE"
    }
}

/// A published key attached to a zone, carrying its comparison status
#[derive(Debug, Clone)]
pub struct RemoteKey {
    data: RemoteKeyData,
    status: KeyStatus,
}

impl RemoteKey {
    pub fn new(data: RemoteKeyData) -> Self {
        RemoteKey {
            data,
            status: KeyStatus::newly_published(),
        }
    }

    /// Zone name with trailing dot, derived from the owner name
    pub fn origin(&self) -> String {
        format!("{}.", self.data.owner_name)
    }

    /// Provider-assigned identifier for manipulation requests
    pub fn key_id(&self) -> &str {
        &self.data.id
    }

    pub fn public_key(&self) -> &str {
        &self.data.public_key
    }

    /// Lifecycle status on the provider side, for reports
    pub fn publish_status(&self) -> &str {
        &self.data.status
    }

    pub fn status(&self) -> KeyStatus {
        self.status
    }

    /// Canonical representation of every comparison-relevant field. The
    /// listing carries no protocol field; it is 3 for every DNSSEC key.
    pub fn canonical_representation(&self) -> String {
        canonical_string(
            &self.origin(),
            &self.data.flag_id,
            constants::PROTOCOL_DNSSEC,
            &self.data.algorithm_id,
            &self.data.public_key,
            &self.data.key_tag,
            &self.data.algorithm_id,
            &self.data.digest_type_id,
            &self.data.digest,
        )
    }

    /// Compare this key against the zone's local key and record the outcome.
    ///
    /// Public-key equality alone marks the key as known (it is explained by
    /// the local key, so it is no orphan); only full canonical equality
    /// marks the data as matching.
    pub fn match_local(&mut self, local: &LocalKey) {
        if local.public_key() == self.data.public_key {
            self.status.known = true;
        }
        if local.canonical_representation() == self.canonical_representation() {
            self.status.data_matching = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{DnskeyData, DsData};

    fn local() -> LocalKey {
        LocalKey {
            dnskey: DnskeyData {
                origin: "example.com.".to_string(),
                key_type: "257".to_string(),
                protocol: "3".to_string(),
                cipher: "13".to_string(),
                key: "K1".to_string(),
            },
            ds: DsData {
                origin: "example.com.".to_string(),
                id: "111".to_string(),
                cipher: "13".to_string(),
                hashtype: "2".to_string(),
                hash: "H1".to_string(),
            },
        }
    }

    fn remote(public_key: &str, digest: &str) -> RemoteKey {
        RemoteKey::new(RemoteKeyData {
            id: "9".to_string(),
            owner_name: "example.com".to_string(),
            flag_id: "257".to_string(),
            algorithm_id: "13".to_string(),
            public_key: public_key.to_string(),
            digest_type_id: "2".to_string(),
            digest: digest.to_string(),
            key_tag: "111".to_string(),
            status: "OK".to_string(),
        })
    }

    #[test]
    fn full_match_sets_known_and_data_matching() {
        let mut key = remote("K1", "H1");
        key.match_local(&local());
        assert!(key.status().is_ok());
        assert!(!key.status().is_corrupted());
        assert!(!key.status().is_orphaned());
    }

    #[test]
    fn same_key_different_digest_is_corrupted() {
        let mut key = remote("K1", "H2");
        key.match_local(&local());
        assert!(key.status().is_corrupted());
        assert!(!key.status().is_orphaned());
    }

    #[test]
    fn foreign_key_stays_orphaned() {
        let mut key = remote("K9", "H9");
        key.match_local(&local());
        assert!(key.status().is_orphaned());
        assert!(!key.status().is_corrupted());
    }

    #[test]
    fn canonical_representations_line_up_across_sides() {
        assert_eq!(
            remote("K1", "H1").canonical_representation(),
            local().canonical_representation()
        );
    }

    #[test]
    fn removed_lifecycle_states_are_flagged() {
        for status in ["DELETE", "DELETED"] {
            let mut data = remote("K1", "H1").data;
            data.status = status.to_string();
            assert!(data.is_removed());
        }
        assert!(!remote("K1", "H1").data.is_removed());
    }
}
