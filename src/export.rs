use crate::error::{Result, SyncError};
use crate::keys::LocalKey;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::info;

/// The on-disk export artifact: a JSON object keyed by origin (trailing
/// dot included), each value holding the zone's key-signing DNSKEY and DS
/// data. Written by the `export` command and read back as the local data
/// source of every registrar action, which decouples the control-plane
/// fetch from the reconciliation run.
pub type ExportedKeys = BTreeMap<String, LocalKey>;

/// Write the export artifact, replacing any previous one
pub fn write_export(path: &Path, keys: &ExportedKeys) -> Result<()> {
    let json = serde_json::to_string(keys)
        .map_err(|e| SyncError::Io(format!("Failed to encode export data: {}", e)))?;
    fs::write(path, json)
        .map_err(|e| SyncError::Io(format!("Failed to write {}: {}", path.display(), e)))?;
    info!("Exported {} signed zones to {}", keys.len(), path.display());
    Ok(())
}

/// Read the export artifact back. A missing or undecodable file is fatal
/// for every operation depending on local data.
pub fn read_export(path: &Path) -> Result<ExportedKeys> {
    let contents = fs::read_to_string(path)
        .map_err(|e| SyncError::MalformedExport(format!("{}: {}", path.display(), e)))?;
    serde_json::from_str(&contents)
        .map_err(|e| SyncError::MalformedExport(format!("{}: {}", path.display(), e)))
}
