pub mod local;
pub mod remote;
pub mod status;

pub use local::{DnskeyData, DsData, LocalKey};
pub use remote::{RemoteKey, RemoteKeyData};
pub use status::KeyStatus;

use serde::{Deserialize, Deserializer};

/// Key role constants from the DNSKEY flags field
pub mod constants {
    /// Zone-signing key
    pub const FLAG_ZSK: &str = "256";

    /// Key-signing key; the role submitted to the registrar
    pub const FLAG_KSK: &str = "257";

    /// DNSKEY protocol field, always 3 for DNSSEC (RFC 4034)
    pub const PROTOCOL_DNSSEC: &str = "3";
}

/// The canonical representation shared by local and remote records.
///
/// This single format is both the equality oracle of the key matcher and
/// the detail block printed for a key, so both sides must emit their fields
/// through this one function for comparison to be meaningful.
#[allow(clippy::too_many_arguments)]
pub(crate) fn canonical_string(
    origin: &str,
    key_type: &str,
    protocol: &str,
    cipher: &str,
    public_key: &str,
    key_tag: &str,
    ds_cipher: &str,
    hash_type: &str,
    digest: &str,
) -> String {
    format!(
        "ZONE   {origin}\nDNSKEY {key_type} {protocol} {cipher} {public_key}\nDS     {key_tag} {ds_cipher} {hash_type} {digest}"
    )
}

/// Both APIs are loose about numeric fields (sometimes JSON numbers,
/// sometimes strings). Comparison is textual, so everything lands as String.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Uint(u64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Int(n) => n.to_string(),
        Raw::Uint(n) => n.to_string(),
    })
}
