pub mod client;
pub mod parser;

pub use client::{ControlPlaneClient, ZoneDetail};
pub use parser::{SignedZoneKeys, parse_dnssec_info};
