use super::parser::parse_dnssec_info;
use crate::config::Config;
use crate::error::{Result, SyncError};
use crate::export::ExportedKeys;
use crate::keys::{LocalKey, string_or_number};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

/// Client for the DNS hosting control plane's remote JSON API. The source
/// of truth for which zones are signed and what their intended keys are.
///
/// The session is opened lazily before the first call and must be closed
/// via [`ControlPlaneClient::logout`] on every exit path; a failed login is
/// fatal for the whole run.
pub struct ControlPlaneClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
    session: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiEnvelope {
    code: String,
    #[serde(default)]
    message: String,
    #[serde(default)]
    response: Value,
}

#[derive(Debug, Deserialize)]
struct ServerRecord {
    #[serde(deserialize_with = "string_or_number")]
    server_id: String,
}

#[derive(Debug, Deserialize)]
struct ServerFunctions {
    #[serde(default, deserialize_with = "string_or_number")]
    dns_server: String,
}

#[derive(Debug, Deserialize)]
struct ClientRecord {
    #[serde(deserialize_with = "string_or_number")]
    client_id: String,
}

#[derive(Debug, Deserialize)]
struct ZoneRef {
    #[serde(deserialize_with = "string_or_number")]
    id: String,
}

/// Detail record of one DNS zone as the control plane reports it
#[derive(Debug, Deserialize)]
pub struct ZoneDetail {
    pub origin: String,
    /// "Y" once the control plane has generated signing keys
    #[serde(default)]
    pub dnssec_initialized: String,
    /// Free-text block carrying the DS and DNSKEY records
    #[serde(default)]
    pub dnssec_info: String,
}

impl ControlPlaneClient {
    pub fn new(config: &Config) -> Result<Self> {
        let (url, user, pass) = config.control_plane_credentials()?;
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("dnssec-sync/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url: url.trim_end_matches('/').to_string(),
            username: user.to_string(),
            password: pass.to_string(),
            session: None,
        })
    }

    /// One remote call; the method name travels in the query string, the
    /// parameters (session id included) in the JSON body.
    async fn call(&self, method: &str, mut params: Value) -> Result<Value> {
        if let (Some(session), Some(map)) = (&self.session, params.as_object_mut()) {
            map.insert("session_id".to_string(), json!(session));
        }
        let url = format!("{}/json.php?{}", self.base_url, method);
        let envelope: ApiEnvelope = self
            .http
            .post(&url)
            .json(&params)
            .send()
            .await?
            .json()
            .await?;
        if envelope.code != "ok" {
            return Err(SyncError::Connection(format!(
                "Control plane call {} failed: {} {}",
                method, envelope.code, envelope.message
            )));
        }
        Ok(envelope.response)
    }

    async fn ensure_session(&mut self) -> Result<()> {
        if self.session.is_some() {
            return Ok(());
        }
        info!("Connecting to control plane at {}", self.base_url);
        let response = self
            .call(
                "login",
                json!({"username": self.username, "password": self.password}),
            )
            .await?;
        let session = response
            .as_str()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| SyncError::Connection("Control plane login rejected".to_string()))?;
        self.session = Some(session.to_string());
        info!("Control plane connected");
        Ok(())
    }

    /// Close the session. Safe to call when no session was ever opened.
    pub async fn logout(&mut self) -> Result<()> {
        if self.session.is_none() {
            return Ok(());
        }
        self.call("logout", json!({})).await?;
        self.session = None;
        info!("Control plane disconnected");
        Ok(())
    }

    /// IDs of every server that runs the DNS role
    async fn dns_server_ids(&mut self) -> Result<Vec<String>> {
        self.ensure_session().await?;
        let servers: Vec<ServerRecord> = decode(self.call("server_get_all", json!({})).await?)?;
        let mut ids = Vec::new();
        for server in servers {
            let functions: ServerFunctions = decode(
                self.call(
                    "server_get_functions",
                    json!({"server_id": server.server_id}),
                )
                .await?,
            )?;
            if functions.dns_server == "1" {
                ids.push(server.server_id);
            }
        }
        Ok(ids)
    }

    async fn client_ids(&mut self) -> Result<Vec<String>> {
        self.ensure_session().await?;
        let clients: Vec<ClientRecord> = decode(self.call("client_get_all", json!({})).await?)?;
        Ok(clients.into_iter().map(|c| c.client_id).collect())
    }

    async fn zones_by_user(&mut self, client_id: &str, server_id: &str) -> Result<Vec<String>> {
        self.ensure_session().await?;
        let zones: Vec<ZoneRef> = decode(
            self.call(
                "dns_zone_get_by_user",
                json!({"client_id": client_id, "server_id": server_id}),
            )
            .await?,
        )?;
        Ok(zones.into_iter().map(|z| z.id).collect())
    }

    async fn zone_detail(&mut self, zone_id: &str) -> Result<ZoneDetail> {
        self.ensure_session().await?;
        decode(
            self.call("dns_zone_get", json!({"primary_id": zone_id}))
                .await?,
        )
    }

    /// Walk every DNS server and client, fetch each zone's detail and parse
    /// its DNSSEC info block. Zones that are not signed (or whose block has
    /// no usable records) are reported and left out.
    pub async fn collect_signed_zones(&mut self) -> Result<ExportedKeys> {
        let servers = self.dns_server_ids().await?;
        let clients = self.client_ids().await?;
        info!(
            "Scanning {} DNS servers for zones of {} clients",
            servers.len(),
            clients.len()
        );

        let mut exported = ExportedKeys::new();
        let mut unsigned = 0usize;
        for client_id in &clients {
            for server_id in &servers {
                for zone_id in self.zones_by_user(client_id, server_id).await? {
                    let zone = self.zone_detail(&zone_id).await?;
                    if zone.dnssec_initialized != "Y" {
                        warn!("UNSIGNED: {}", zone.origin);
                        unsigned += 1;
                        continue;
                    }
                    match parse_dnssec_info(&zone.origin, &zone.dnssec_info) {
                        Some(keys) => {
                            exported.insert(
                                zone.origin.clone(),
                                LocalKey {
                                    dnskey: keys.ksk,
                                    ds: keys.ds,
                                },
                            );
                        }
                        None => unsigned += 1,
                    }
                }
            }
        }
        if unsigned > 0 {
            warn!("{} zones without exportable DNSSEC data", unsigned);
        }
        info!("{} signed zones loaded", exported.len());
        Ok(exported)
    }
}

fn decode<T: serde::de::DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| SyncError::Connection(format!("Unexpected control plane response: {}", e)))
}
