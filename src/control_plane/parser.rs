use crate::keys::constants::{FLAG_KSK, FLAG_ZSK};
use crate::keys::{DnskeyData, DsData};
use tracing::{debug, warn};

/// The structured records carried by one zone's DNSSEC info block. Only
/// the key-signing key and the DS record travel to the registrar; the
/// zone-signing key is parsed for completeness and not every control
/// plane prints one.
#[derive(Debug, Clone)]
pub struct SignedZoneKeys {
    pub ds: DsData,
    pub ksk: DnskeyData,
    pub zsk: Option<DnskeyData>,
}

/// Parse the free-text DNSSEC info block of a zone into its DS,
/// DNSKEY(257) and DNSKEY(256) records.
///
/// Policy for zones presumed signed but missing a usable DS or KSK line:
/// the zone is skipped (treated as unsigned) with a warning instead of
/// failing the whole run. When a block carries several records of one
/// kind, the first is taken and the extras are reported.
pub fn parse_dnssec_info(origin: &str, info: &str) -> Option<SignedZoneKeys> {
    let mut ds_records = Vec::new();
    let mut ksk_records = Vec::new();
    let mut zsk_records = Vec::new();

    for line in info.lines() {
        match parse_line(line) {
            Some(InfoLine::Ds(ds)) => ds_records.push(ds),
            Some(InfoLine::Dnskey(key)) if key.key_type == FLAG_KSK => ksk_records.push(key),
            Some(InfoLine::Dnskey(key)) if key.key_type == FLAG_ZSK => zsk_records.push(key),
            Some(InfoLine::Dnskey(key)) => {
                debug!("{}: ignoring DNSKEY with flags {}", origin, key.key_type)
            }
            None => {}
        }
    }

    if ds_records.len() > 1 {
        warn!(
            "{}: {} DS records in info block, taking the first",
            origin,
            ds_records.len()
        );
    }
    if ksk_records.len() > 1 {
        warn!(
            "{}: {} key-signing keys in info block, taking the first",
            origin,
            ksk_records.len()
        );
    }

    let (Some(ds), Some(ksk)) = (ds_records.into_iter().next(), ksk_records.into_iter().next())
    else {
        warn!(
            "{}: DNSSEC info block has no usable DS/DNSKEY(257) pair, treating zone as unsigned",
            origin
        );
        return None;
    };

    Some(SignedZoneKeys {
        ds,
        ksk,
        zsk: zsk_records.into_iter().next(),
    })
}

enum InfoLine {
    Ds(DsData),
    Dnskey(DnskeyData),
}

/// Tokenize one line of the info block. Expected shapes:
/// `origin IN DS <keytag> <cipher> <hashtype> <digest...>` and
/// `origin IN DNSKEY <flags> <protocol> <cipher> <key...>`, where the
/// digest/key may span several whitespace-separated chunks that belong
/// together.
fn parse_line(line: &str) -> Option<InfoLine> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let in_pos = tokens.iter().position(|t| *t == "IN")?;
    if in_pos == 0 || tokens.len() < in_pos + 2 {
        return None;
    }
    let origin = tokens[in_pos - 1].to_string();

    match tokens[in_pos + 1] {
        "DS" => {
            let rest = &tokens[in_pos + 2..];
            if rest.len() < 4 {
                return None;
            }
            // Digest hash types below 2 are obsolete and never exported
            match rest[2].parse::<u8>() {
                Ok(hash_type) if hash_type >= 2 => {}
                Ok(_) => {
                    debug!("{}: skipping DS with insecure hash type {}", origin, rest[2]);
                    return None;
                }
                Err(_) => return None,
            }
            Some(InfoLine::Ds(DsData {
                origin,
                id: rest[0].to_string(),
                cipher: rest[1].to_string(),
                hashtype: rest[2].to_string(),
                hash: rest[3..].concat(),
            }))
        }
        "DNSKEY" => {
            let rest = &tokens[in_pos + 2..];
            if rest.len() < 4 {
                return None;
            }
            Some(InfoLine::Dnskey(DnskeyData {
                origin,
                key_type: rest[0].to_string(),
                protocol: rest[1].to_string(),
                cipher: rest[2].to_string(),
                key: rest[3..].concat(),
            }))
        }
        _ => None,
    }
}
