use super::{canonical_string, string_or_number};
use serde::{Deserialize, Serialize};

/// DNSKEY record data of a locally managed key, as parsed from the
/// control plane's DNSSEC info block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnskeyData {
    /// Zone name with trailing dot
    pub origin: String,
    /// Key role: 256 (ZSK) or 257 (KSK)
    #[serde(rename = "type", deserialize_with = "string_or_number")]
    pub key_type: String,
    /// Always 3 for DNSSEC
    #[serde(deserialize_with = "string_or_number")]
    pub protocol: String,
    /// Signing algorithm number
    #[serde(deserialize_with = "string_or_number")]
    pub cipher: String,
    /// Public key, whitespace stripped
    pub key: String,
}

/// DS record data belonging to a local key-signing key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DsData {
    /// Zone name with trailing dot
    pub origin: String,
    /// Key tag
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Signing algorithm number of the referenced DNSKEY
    #[serde(deserialize_with = "string_or_number")]
    pub cipher: String,
    /// Digest algorithm; anything below 2 is obsolete and never exported
    #[serde(deserialize_with = "string_or_number")]
    pub hashtype: String,
    /// Digest of the key-signing key, whitespace stripped
    pub hash: String,
}

/// The one key the control plane knows for a zone: the key-signing key
/// plus its DS record. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalKey {
    #[serde(rename = "DNSKEY")]
    pub dnskey: DnskeyData,
    #[serde(rename = "DS")]
    pub ds: DsData,
}

impl LocalKey {
    /// Zone name with trailing dot
    pub fn origin(&self) -> &str {
        &self.dnskey.origin
    }

    /// Zone name without the trailing dot, as registrar requests want it
    pub fn fqdn(&self) -> &str {
        self.dnskey.origin.trim_end_matches('.')
    }

    pub fn public_key(&self) -> &str {
        &self.dnskey.key
    }

    /// Canonical representation of every comparison-relevant field
    pub fn canonical_representation(&self) -> String {
        canonical_string(
            &self.dnskey.origin,
            &self.dnskey.key_type,
            &self.dnskey.protocol,
            &self.dnskey.cipher,
            &self.dnskey.key,
            &self.ds.id,
            &self.ds.cipher,
            &self.ds.hashtype,
            &self.ds.hash,
        )
    }

    /// DNSKEY record text for registrar submission
    pub fn dnskey_record(&self) -> String {
        format!(
            "{} IN DNSKEY {} {} {} {}",
            self.dnskey.origin,
            self.dnskey.key_type,
            self.dnskey.protocol,
            self.dnskey.cipher,
            self.dnskey.key
        )
    }

    /// DS record text for registrar submission
    pub fn ds_record(&self) -> String {
        format!(
            "{} IN DS {} {} {} {}",
            self.ds.origin, self.ds.id, self.ds.cipher, self.ds.hashtype, self.ds.hash
        )
    }
}
