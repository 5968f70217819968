use crate::config::EffectiveConfig;
use crate::resource::{
    AdRoute, ArpEntry, Bgp, Bridge, DhcpSubnet, Dto, Port, Route, Router,
};
use crate::topology::Topology;
use anyhow::{Context, Result, anyhow};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, HeaderValue, USER_AGENT};
use reqwest::{Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::cell::RefCell;
use std::time::Duration;
use tracing::debug;

const AUTH_HEADER: &str = "X-Auth-Token";
const UA: &str = "midodebug/0.1";

/// Vendor media types understood by the MidoNet API.
pub mod media {
    pub const APPLICATION: &str = "application/vnd.org.midonet.Application-v5+json";
    pub const ROUTER_COLLECTION: &str = "application/vnd.org.midonet.collection.Router-v3+json";
    pub const BRIDGE_COLLECTION: &str = "application/vnd.org.midonet.collection.Bridge-v3+json";
    pub const PORT_COLLECTION: &str = "application/vnd.org.midonet.collection.Port-v2+json";
    pub const ROUTE_COLLECTION: &str = "application/vnd.org.midonet.collection.Route-v1+json";
    pub const BGP_COLLECTION: &str = "application/vnd.org.midonet.collection.Bgp-v1+json";
    pub const AD_ROUTE_COLLECTION: &str = "application/vnd.org.midonet.collection.AdRoute-v1+json";
    pub const DHCP_SUBNET_COLLECTION: &str =
        "application/vnd.org.midonet.collection.DhcpSubnet-v2+json";
    /// The ARP table endpoint has no vendor type of its own.
    pub const PLAIN_JSON: &str = "application/json";
}

#[derive(Debug)]
pub struct MidonetClient {
    base_url: Url,
    http: Client,
    username: Option<String>,
    password: Option<String>,
    tenant_id: Option<String>,
    token: RefCell<Option<String>>,
    root: RefCell<Option<Dto>>,
}

impl MidonetClient {
    pub fn new(config: &EffectiveConfig) -> Result<Self> {
        // Url::join replaces the last segment unless the base ends with '/'.
        let mut raw = config.base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        let base_url = Url::parse(&raw).context("parsing MidoNet API URL")?;
        let http = Client::builder()
            .user_agent(HeaderValue::from_static(UA))
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .context("building HTTP client")?;

        Ok(Self {
            base_url,
            http,
            username: config.username.clone(),
            password: config.password.clone(),
            tenant_id: config.tenant_id.clone(),
            token: RefCell::new(None),
            root: RefCell::new(None),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Fetches the API root document, logging in first when credentials are set.
    pub fn application(&self) -> Result<Dto> {
        if let Some(root) = self.root.borrow().as_ref() {
            return Ok(root.clone());
        }
        let value = self.get_json(self.base_url.as_str(), media::APPLICATION, &[])?;
        let root = match value {
            Value::Object(map) => map,
            other => return Err(anyhow!("unexpected API root document: {}", other)),
        };
        *self.root.borrow_mut() = Some(root.clone());
        Ok(root)
    }

    pub fn get_json(&self, uri: &str, media_type: &str, query: &[(&str, String)]) -> Result<Value> {
        self.ensure_login()?;
        let url = Url::parse(uri).with_context(|| format!("parsing resource URI `{uri}`"))?;
        debug!(%url, media_type, "GET");

        let mut response = self.send(self.get_request(&url, media_type, query))?;
        if response.status() == StatusCode::UNAUTHORIZED && self.username.is_some() {
            debug!(%url, "token rejected, logging in again");
            self.force_relogin()?;
            response = self.send(self.get_request(&url, media_type, query))?;
        }

        let status = response.status();
        let text = response.text().context("reading response body")?;
        if !status.is_success() {
            return Err(anyhow!(format_error_message(&Method::GET, &url, status, &text)));
        }
        serde_json::from_str(&text).with_context(|| format!("parsing JSON from {url}"))
    }

    fn get_list<R: DeserializeOwned>(
        &self,
        uri: Option<&str>,
        media_type: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<R>> {
        let Some(uri) = uri else {
            return Ok(Vec::new());
        };
        match self.get_json(uri, media_type, query)? {
            Value::Array(items) => items
                .into_iter()
                .map(|item| serde_json::from_value(item).context("decoding resource"))
                .collect(),
            Value::Null => Ok(Vec::new()),
            other => Err(anyhow!("expected a collection at {uri}, got {}", other)),
        }
    }

    /// URI of a top-level collection, as advertised by the root document.
    fn collection_uri(&self, key: &str) -> Result<String> {
        let root = self.application()?;
        if let Some(uri) = root.get(key).and_then(Value::as_str) {
            return Ok(uri.to_string());
        }
        let url = self
            .base_url
            .join(key)
            .with_context(|| format!("joining `{key}` to the API URL"))?;
        Ok(url.to_string())
    }

    fn tenant_query(&self) -> Vec<(&'static str, String)> {
        self.tenant_id
            .iter()
            .map(|tenant| ("tenant_id", tenant.clone()))
            .collect()
    }

    fn get_request(&self, url: &Url, media_type: &str, query: &[(&str, String)]) -> RequestBuilder {
        let mut request = self
            .http
            .request(Method::GET, url.clone())
            .header(ACCEPT, media_type)
            .header(USER_AGENT, HeaderValue::from_static(UA));
        if let Some(token) = self.token.borrow().as_ref() {
            request = request.header(AUTH_HEADER, token);
        }
        if !query.is_empty() {
            request = request.query(query);
        }
        request
    }

    fn send(&self, request: RequestBuilder) -> Result<Response> {
        request.send().context("sending request")
    }

    fn ensure_login(&self) -> Result<()> {
        if self.username.is_none() || self.token.borrow().is_some() {
            return Ok(());
        }
        self.login()
    }

    fn force_relogin(&self) -> Result<()> {
        *self.token.borrow_mut() = None;
        self.login()
    }

    fn login(&self) -> Result<()> {
        let username = self.username.as_deref().unwrap_or_default();
        let url = self
            .base_url
            .join("login")
            .context("building login URL")?;
        debug!(%url, username, "logging in");

        let response = self
            .http
            .request(Method::POST, url.clone())
            .basic_auth(username, self.password.as_deref())
            .header(ACCEPT, HeaderValue::from_static(media::PLAIN_JSON))
            .send()
            .with_context(|| format!("login request to {url}"))?;

        let status = response.status();
        let header_token = response
            .headers()
            .get(AUTH_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let text = response.text().context("reading login response")?;
        if !status.is_success() {
            return Err(anyhow!(format_error_message(&Method::POST, &url, status, &text)));
        }

        let token = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|v| v.get("key").and_then(Value::as_str).map(str::to_string))
            .or(header_token)
            .ok_or_else(|| anyhow!("login at {url} returned no token"))?;
        *self.token.borrow_mut() = Some(token);
        Ok(())
    }
}

impl Topology for MidonetClient {
    fn routers(&self) -> Result<Vec<Router>> {
        let uri = self.collection_uri("routers")?;
        self.get_list(Some(uri.as_str()), media::ROUTER_COLLECTION, &self.tenant_query())
    }

    fn bridges(&self) -> Result<Vec<Bridge>> {
        let uri = self.collection_uri("bridges")?;
        self.get_list(Some(uri.as_str()), media::BRIDGE_COLLECTION, &self.tenant_query())
    }

    fn routes(&self, router: &Router) -> Result<Vec<Route>> {
        self.get_list(router.routes_uri(), media::ROUTE_COLLECTION, &[])
    }

    fn router_ports(&self, router: &Router) -> Result<Vec<Port>> {
        self.get_list(router.ports_uri(), media::PORT_COLLECTION, &[])
    }

    fn bridge_ports(&self, bridge: &Bridge) -> Result<Vec<Port>> {
        self.get_list(bridge.ports_uri(), media::PORT_COLLECTION, &[])
    }

    fn bgps(&self, port: &Port) -> Result<Vec<Bgp>> {
        self.get_list(port.bgps_uri(), media::BGP_COLLECTION, &[])
    }

    fn ad_routes(&self, bgp: &Bgp) -> Result<Vec<AdRoute>> {
        self.get_list(bgp.ad_routes_uri(), media::AD_ROUTE_COLLECTION, &[])
    }

    fn arp_table(&self, bridge: &Bridge) -> Result<Vec<ArpEntry>> {
        self.get_list(bridge.arp_table_uri(), media::PLAIN_JSON, &[])
    }

    fn dhcp_subnets(&self, bridge: &Bridge) -> Result<Vec<DhcpSubnet>> {
        self.get_list(bridge.dhcp_subnets_uri(), media::DHCP_SUBNET_COLLECTION, &[])
    }
}

fn format_error_message(method: &Method, url: &Url, status: StatusCode, body: &str) -> String {
    let excerpt: String = body.trim().chars().take(200).collect();
    if excerpt.is_empty() {
        format!("{method} {url} failed with {status}")
    } else {
        format!("{method} {url} failed with {status}: {excerpt}")
    }
}
