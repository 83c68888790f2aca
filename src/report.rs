use crate::error::Result;
use crate::registry::ZoneRegistry;
use tracing::warn;

/// Report output goes straight to stdout; the tables and lists are the
/// product of the read-only actions, not diagnostics.

pub fn print_header(title: &str) {
    println!("{:=>80}", format!(" {} =====", title));
}

pub fn print_subheader(subtitle: &str) {
    println!("{:->80}", format!(" {} -----", subtitle));
}

/// Detailed per-zone status table
pub fn print_report(registry: &ZoneRegistry) {
    print_header("ZONE STATUS REPORT");
    println!(
        "{:<8} {:<8} {:<8} {:<8} {:<2} {:<2} {}",
        "Result", "Local", "Remote", "Status", "Co", "Or", "Domain"
    );
    for zone in registry.zones() {
        let status = zone.status();
        // The status column shows the first fully matching key; corrupt
        // and orphan counts account for every other key of the zone.
        let live_status = zone.live_key().map(|key| key.publish_status()).unwrap_or("");
        let corrupt = count_column(zone.corrupt_keys().count());
        let orphaned = count_column(zone.orphaned_keys().count());
        println!(
            "{:<8} {:<8} {:<8} {:<8} {:<2} {:<2} {}",
            marker(status.is_ok()),
            marker(status.known),
            marker(status.published),
            live_status,
            corrupt,
            orphaned,
            zone.origin()
        );
    }
    println!();
}

/// Aggregate counts over the whole registry
pub fn print_summary(registry: &ZoneRegistry) {
    let live_zones = registry.live_zones();
    let live_and_ok = live_zones
        .iter()
        .filter(|zone| {
            zone.live_key()
                .is_some_and(|key| key.publish_status() == "OK")
        })
        .count();

    print_header("DNSSEC ZONE SUMMARY");
    println!(
        "{:<8} corresponding keys on control plane and registrar",
        live_zones.len()
    );
    println!("{:<8} corresponding keys live and working", live_and_ok);
    println!(
        "{:<8} signed zones on the control plane",
        registry.zones_with_local().len()
    );
    println!(
        "{:<8} local keys not published",
        registry.unpublished_zones().len()
    );
    println!(
        "{:<8} zones published at the registrar",
        registry.zones_with_remote().len()
    );
    println!(
        "{:<8} keys with corrupt data at the registrar",
        registry.corrupted_keys(None).map(|k| k.len()).unwrap_or(0)
    );
    println!(
        "{:<8} possible orphan keys at the registrar",
        registry.orphaned_keys(None).map(|k| k.len()).unwrap_or(0)
    );
    println!();
}

/// Zones known on each side, as two bullet lists
pub fn print_zone_list(registry: &ZoneRegistry) {
    print_header("ZONE OVERVIEW");

    let local_zones = registry.zones_with_local();
    print_subheader(&format!(
        "{} DNSSEC zones exported from the control plane",
        local_zones.len()
    ));
    for zone in local_zones {
        println!("     - {}", zone.origin());
    }

    let remote_zones = registry.zones_with_remote();
    print_subheader(&format!(
        "{} DNSSEC zones published at the registrar",
        remote_zones.len()
    ));
    for zone in remote_zones {
        println!("     - {}", zone.origin());
    }
    println!();
}

/// Canonical key detail of one zone, both sides
pub fn print_zone_keys(registry: &ZoneRegistry, origin: &str) -> Result<()> {
    let zone = registry.zone(origin)?;
    print_header(&format!("{} ZONE KEYS", origin));

    print_subheader("Control plane key");
    match zone.local_key() {
        Some(key) => println!("{}", key.canonical_representation()),
        None => warn!("No key exported from the control plane for {}", origin),
    }

    print_subheader("Registrar keys");
    if zone.has_remote() {
        for key in zone.remote_keys() {
            println!("{}", key.canonical_representation());
        }
    } else {
        warn!("No key published at the registrar for {}", origin);
    }
    Ok(())
}

fn marker(set: bool) -> &'static str {
    if set { "x" } else { "-" }
}

fn count_column(count: usize) -> String {
    if count == 0 {
        String::new()
    } else {
        count.to_string()
    }
}
