//! Shared fixtures for dnssec-sync integration tests

#![allow(dead_code)] // Not every test file uses every helper

use async_trait::async_trait;
use dnssec_sync::error::{Result, SyncError};
use dnssec_sync::keys::{DnskeyData, DsData, LocalKey, RemoteKeyData};
use dnssec_sync::registrar::{PublishRequest, RegistrarApi};
use std::collections::HashSet;

pub fn local_key(origin: &str, public_key: &str, digest: &str) -> LocalKey {
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

pub fn remote_key(owner: &str, id: &str, public_key: &str, digest: &str) -> RemoteKeyData {
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

/// Registrar test double: serves a canned key listing, records every
/// add/delete, and can be told to reject specific items.
#[derive(Default)]
pub struct MockRegistrar {
    pub listing: Vec<RemoteKeyData>,
    pub reject_domains: HashSet<String>,
    pub reject_key_ids: HashSet<String>,
    pub fail_connection: bool,
    pub added: Vec<PublishRequest>,
    pub deleted: Vec<String>,
    pub logged_out: bool,
}

impl MockRegistrar {
    pub fn with_listing(listing: Vec<RemoteKeyData>) -> Self {
        MockRegistrar {
            listing,
            ..Default::default()
        }
    }
}

#[async_trait]
impl RegistrarApi for MockRegistrar {
    async fn list_keys(&mut self) -> Result<Vec<RemoteKeyData>> {
        Ok(self.listing.clone())
    }

    async fn add_key(&mut self, request: &PublishRequest) -> Result<()> {
        if self.fail_connection {
            return Err(SyncError::Connection("registrar unreachable".to_string()));
        }
        if self.reject_domains.contains(&request.domain) {
            return Err(SyncError::Provider {
                code: 2400,
                message: "Command failed".to_string(),
            });
        }
        self.added.push(request.clone());
        Ok(())
    }

    async fn delete_key(&mut self, key_id: &str) -> Result<()> {
        if self.fail_connection {
            return Err(SyncError::Connection("registrar unreachable".to_string()));
        }
        if self.reject_key_ids.contains(key_id) {
            return Err(SyncError::Provider {
                code: 2303,
                message: "Object does not exist".to_string(),
            });
        }
        self.deleted.push(key_id.to_string());
        Ok(())
    }

    async fn logout(&mut self) -> Result<()> {
        self.logged_out = true;
        Ok(())
    }
}
