use crate::config::Config;
use crate::error::{Result, SyncError};
use crate::keys::{LocalKey, RemoteKeyData};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info};

/// Success sentinel of the registrar's JSON-RPC API
pub const RESULT_SUCCESS: i64 = 1000;

/// One add-key request: the domain plus the DNSKEY and DS record text of
/// the zone's local key-signing key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    pub domain: String,
    pub dnskey: String,
    pub ds: String,
}

impl PublishRequest {
    pub fn for_key(key: &LocalKey) -> Self {
        PublishRequest {
            domain: key.fqdn().to_string(),
            dnskey: key.dnskey_record(),
            ds: key.ds_record(),
        }
    }
}

/// The registrar operations the reconciliation driver depends on. A trait
/// so the driver's batch behavior can be exercised against a test double.
#[async_trait]
pub trait RegistrarApi {
    /// Bulk listing of every key the registrar knows, historical entries
    /// included. A failure here is a connection failure and fatal.
    async fn list_keys(&mut self) -> Result<Vec<RemoteKeyData>>;

    /// Publish one key. A non-success response surfaces as
    /// [`SyncError::Provider`] and must not unwind the caller's batch.
    async fn add_key(&mut self, request: &PublishRequest) -> Result<()>;

    /// Delete one key by its provider-assigned identifier. Error contract
    /// as for [`RegistrarApi::add_key`].
    async fn delete_key(&mut self, key_id: &str) -> Result<()>;

    /// Close the session. Safe to call when none was ever opened.
    async fn logout(&mut self) -> Result<()>;
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    code: i64,
    #[serde(default)]
    msg: String,
    #[serde(default, rename = "resData")]
    res_data: Value,
}

/// JSON-RPC client for the registrar API. The session rides on a cookie
/// handed out at login; it is opened lazily before the first call and
/// closed by the driver on every exit path.
pub struct RegistrarClient {
    http: reqwest::Client,
    endpoint: String,
    username: String,
    password: String,
    logged_in: bool,
}

impl RegistrarClient {
    pub fn new(config: &Config) -> Result<Self> {
        let (user, pass) = config.registrar_credentials()?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("dnssec-sync/", env!("CARGO_PKG_VERSION")))
            .cookie_store(true)
            .build()?;
        Ok(Self {
            http,
            endpoint: config.registrar_url.clone(),
            username: user.to_string(),
            password: pass.to_string(),
            logged_in: false,
        })
    }

    async fn call(&self, method: &str, params: Value) -> Result<RpcResponse> {
        debug!("Registrar call: {}", method);
        let response: RpcResponse = self
            .http
            .post(&self.endpoint)
            .json(&json!({"method": method, "params": params}))
            .send()
            .await?
            .json()
            .await?;
        Ok(response)
    }

    async fn ensure_session(&mut self) -> Result<()> {
        if self.logged_in {
            return Ok(());
        }
        info!("Connecting to registrar API at {}", self.endpoint);
        let response = self
            .call(
                "account.login",
                json!({"user": self.username, "pass": self.password, "lang": "en"}),
            )
            .await?;
        if response.code != RESULT_SUCCESS {
            return Err(SyncError::Connection(format!(
                "Registrar login failed: {} {}",
                response.code, response.msg
            )));
        }
        self.logged_in = true;
        info!("Registrar API connected");
        Ok(())
    }
}

#[async_trait]
impl RegistrarApi for RegistrarClient {
    async fn list_keys(&mut self) -> Result<Vec<RemoteKeyData>> {
        self.ensure_session().await?;
        let response = self.call("dnssec.listkeys", json!({})).await?;
        if response.code != RESULT_SUCCESS {
            return Err(SyncError::Connection(format!(
                "Registrar key listing failed: {} {}",
                response.code, response.msg
            )));
        }
        if response.res_data.is_null() {
            return Ok(Vec::new());
        }
        serde_json::from_value(response.res_data)
            .map_err(|e| SyncError::Connection(format!("Unexpected registrar key listing: {}", e)))
    }

    async fn add_key(&mut self, request: &PublishRequest) -> Result<()> {
        self.ensure_session().await?;
        let response = self
            .call(
                "dnssec.adddnskey",
                json!({
                    "domainName": request.domain,
                    "dnskey": request.dnskey,
                    "ds": request.ds,
                    "calculateDigest": false,
                }),
            )
            .await?;
        if response.code != RESULT_SUCCESS {
            return Err(SyncError::Provider {
                code: response.code,
                message: response.msg,
            });
        }
        Ok(())
    }

    async fn delete_key(&mut self, key_id: &str) -> Result<()> {
        self.ensure_session().await?;
        let response = self.call("dnssec.deletednskey", json!({"key": key_id})).await?;
        if response.code != RESULT_SUCCESS {
            return Err(SyncError::Provider {
                code: response.code,
                message: response.msg,
            });
        }
        Ok(())
    }

    async fn logout(&mut self) -> Result<()> {
        if !self.logged_in {
            return Ok(());
        }
        self.call("account.logout", json!({})).await?;
        self.logged_in = false;
        info!("Registrar API disconnected");
        Ok(())
    }
}
