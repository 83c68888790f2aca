use crate::error::{Result, SyncError};
use crate::export;
use crate::keys::RemoteKey;
use crate::registrar::{PublishRequest, RegistrarApi};
use crate::registry::ZoneRegistry;
use crate::report;
use std::path::Path;
use tracing::{info, warn};

/// The reconciliation driver: owns the zone registry and the registrar
/// handle, constructed once per run and passed explicitly to every
/// operation. Pipeline: load both data sources, verify, then query and
/// act.
pub struct Reconciler<R> {
    registry: ZoneRegistry,
    registrar: R,
}

impl<R: RegistrarApi> Reconciler<R> {
    pub fn new(registrar: R) -> Self {
        Reconciler {
            registry: ZoneRegistry::new(),
            registrar,
        }
    }

    pub fn registry(&self) -> &ZoneRegistry {
        &self.registry
    }

    pub fn registrar_mut(&mut self) -> &mut R {
        &mut self.registrar
    }

    /// Ingest the local export artifact and the registrar's key listing,
    /// then run the matching pass. Must complete before any query or
    /// mutating action; a failure here aborts the run before anything is
    /// touched.
    pub async fn load(&mut self, export_path: &Path) -> Result<()> {
        info!(
            "Loading signing information from export file {}",
            export_path.display()
        );
        let local = export::read_export(export_path)?;
        for (origin, key) in local {
            self.registry.add_local(&origin, key);
        }

        let listed = self.registrar.list_keys().await?;
        info!("{} keys listed at the registrar", listed.len());
        for data in listed {
            self.registry.add_remote(data);
        }

        self.registry.verify();
        Ok(())
    }

    /// Publish the local key of every zone without a confirmed full match.
    /// One request per zone; the registrar treats a re-publish of an
    /// already-known key as a no-op.
    pub async fn publish_unpublished(&mut self) -> Result<()> {
        report::print_header("PUBLISHING ALL UNPUBLISHED KEYS");
        let requests: Vec<(String, PublishRequest)> = self
            .registry
            .unpublished_zones()
            .into_iter()
            .filter_map(|zone| {
                zone.local_key()
                    .map(|key| (zone.origin().to_string(), PublishRequest::for_key(key)))
            })
            .collect();
        for (origin, request) in requests {
            let outcome = self.registrar.add_key(&request).await;
            report_key_operation(&origin, outcome)?;
        }
        println!();
        Ok(())
    }

    /// Delete every published key no local key accounts for, optionally
    /// scoped to one origin
    pub async fn clean_orphaned(&mut self, origin: Option<&str>) -> Result<()> {
        report::print_header("REMOVING ALL ORPHANED KEYS");
        let targets = collect_targets(self.registry.orphaned_keys(origin)?);
        self.delete_keys(targets).await
    }

    /// Delete every key whose record data diverges from the local key,
    /// optionally scoped to one origin
    pub async fn clean_corrupted(&mut self, origin: Option<&str>) -> Result<()> {
        report::print_header("REMOVING ALL ENTRIES WITH CORRUPTED KEY DATA");
        let targets = collect_targets(self.registry.corrupted_keys(origin)?);
        self.delete_keys(targets).await
    }

    /// Close the registrar session and hand back the action outcome. Every
    /// run ends here, success or failure, so the session never outlives
    /// the process; a failed logout is reported but never masks the
    /// outcome of the actions themselves.
    pub async fn finish(&mut self, outcome: Result<()>) -> Result<()> {
        if let Err(e) = self.registrar.logout().await {
            warn!("Registrar logout failed: {}", e);
        }
        outcome
    }

    async fn delete_keys(&mut self, targets: Vec<(String, String)>) -> Result<()> {
        for (origin, key_id) in targets {
            let outcome = self.registrar.delete_key(&key_id).await;
            report_key_operation(&origin, outcome)?;
        }
        println!();
        Ok(())
    }
}

fn collect_targets(keys: Vec<&RemoteKey>) -> Vec<(String, String)> {
    keys.into_iter()
        .map(|key| (key.origin(), key.key_id().to_string()))
        .collect()
}

/// Report one add/delete outcome. Provider rejections are printed against
/// the item and swallowed so the batch continues; anything else is fatal
/// and propagates.
fn report_key_operation(origin: &str, outcome: Result<()>) -> Result<()> {
    match outcome {
        Ok(()) => {
            println!("{:<8} {}", "OK", origin);
            Ok(())
        }
        Err(SyncError::Provider { code, message }) => {
            println!("{:<8} {}", "ERROR", origin);
            println!("{:<8} [{}] {}", "", code, message);
            Ok(())
        }
        Err(fatal) => Err(fatal),
    }
}
