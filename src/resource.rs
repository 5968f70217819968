// midodebug - troubleshooting CLI for MidoNet virtual topologies
// Copyright (C) 2024 Mathias Uhl <mathiasuhl@gmx.de>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Typed views over the JSON objects returned by the MidoNet API.
//!
//! Every resource keeps the DTO exactly as the controller sent it. Typed
//! accessors cover the fields the tables need, while [`Resource::attribute`]
//! gives generic by-name access for filtering. Attribute names may be given
//! in the API's camelCase (`tenantId`) or in snake_case (`tenant_id`).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

pub type Dto = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Router,
    Route,
    Bridge,
    Port,
    Bgp,
    AdRoute,
    ArpEntry,
    DhcpSubnet,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Router => "router",
            ResourceKind::Route => "route",
            ResourceKind::Bridge => "bridge",
            ResourceKind::Port => "port",
            ResourceKind::Bgp => "bgp",
            ResourceKind::AdRoute => "ad-route",
            ResourceKind::ArpEntry => "arp-entry",
            ResourceKind::DhcpSubnet => "dhcp-subnet",
        };
        f.write_str(name)
    }
}

pub trait Resource {
    fn kind(&self) -> ResourceKind;

    fn dto(&self) -> &Dto;

    /// Looks up an attribute by name, `None` when the resource does not carry it.
    fn attribute(&self, name: &str) -> Option<&Value> {
        lookup(self.dto(), name)
    }

    fn id(&self) -> Option<&str> {
        self.text("id")
    }

    fn name(&self) -> Option<&str> {
        self.text("name")
    }

    fn text(&self, name: &str) -> Option<&str> {
        self.attribute(name).and_then(Value::as_str)
    }

    fn number(&self, name: &str) -> Option<u64> {
        self.attribute(name).and_then(Value::as_u64)
    }

    fn flag(&self, name: &str) -> Option<bool> {
        self.attribute(name).and_then(Value::as_bool)
    }

    /// Short human label used in error messages.
    fn label(&self) -> String {
        match (self.name(), self.id()) {
            (Some(name), Some(id)) => format!("{} {name} ({id})", self.kind()),
            (None, Some(id)) => format!("{} {id}", self.kind()),
            (Some(name), None) => format!("{} {name}", self.kind()),
            (None, None) => self.kind().to_string(),
        }
    }
}

/// String form of an attribute value as seen by match predicates.
pub fn value_to_str(value: &Value) -> String {
    match value {
        Value::Null => "None".into(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

fn lookup<'a>(dto: &'a Dto, name: &str) -> Option<&'a Value> {
    if let Some(value) = dto.get(name) {
        return Some(value);
    }
    let wanted = normalize(name);
    dto.iter()
        .find(|(key, _)| normalize(key) == wanted)
        .map(|(_, value)| value)
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_' && *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

macro_rules! resource {
    ($(#[$meta:meta])* $name:ident => $kind:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name {
            dto: Dto,
        }

        #[cfg(test)]
        impl $name {
            pub fn from_dto(dto: Dto) -> Self {
                Self { dto }
            }
        }

        impl Resource for $name {
            fn kind(&self) -> ResourceKind {
                ResourceKind::$kind
            }

            fn dto(&self) -> &Dto {
                &self.dto
            }
        }
    };
}

resource!(
    /// A virtual router.
    Router => Router
);
resource!(Route => Route);
resource!(
    /// A virtual L2 bridge.
    Bridge => Bridge
);
resource!(
    /// A router or bridge port, exterior or interior.
    Port => Port
);
resource!(
    /// A BGP session configured on a router port.
    Bgp => Bgp
);
resource!(
    /// A prefix advertised by a BGP session.
    AdRoute => AdRoute
);
resource!(ArpEntry => ArpEntry);
resource!(DhcpSubnet => DhcpSubnet);

impl Router {
    pub fn tenant_id(&self) -> Option<&str> {
        self.text("tenantId")
    }

    pub fn admin_state_up(&self) -> Option<bool> {
        self.flag("adminStateUp")
    }

    pub fn inbound_filter_id(&self) -> Option<&str> {
        self.text("inboundFilterId")
    }

    pub fn outbound_filter_id(&self) -> Option<&str> {
        self.text("outboundFilterId")
    }

    pub fn routes_uri(&self) -> Option<&str> {
        self.text("routes")
    }

    pub fn ports_uri(&self) -> Option<&str> {
        self.text("ports")
    }
}

impl Route {
    pub fn dst_network(&self) -> String {
        network(self.text("dstNetworkAddr"), self.number("dstNetworkLength"))
    }

    pub fn src_network(&self) -> String {
        network(self.text("srcNetworkAddr"), self.number("srcNetworkLength"))
    }

    pub fn next_hop_gateway(&self) -> Option<&str> {
        self.text("nextHopGateway")
    }

    pub fn next_hop_port(&self) -> Option<&str> {
        self.text("nextHopPort")
    }

    pub fn weight(&self) -> Option<u64> {
        self.number("weight")
    }
}

impl Bridge {
    pub fn tenant_id(&self) -> Option<&str> {
        self.text("tenantId")
    }

    pub fn vxlan_port(&self) -> Option<&str> {
        self.text("vxLanPortId")
    }

    pub fn ports_uri(&self) -> Option<&str> {
        self.text("ports")
    }

    pub fn arp_table_uri(&self) -> Option<&str> {
        self.text("arpTable")
    }

    pub fn dhcp_subnets_uri(&self) -> Option<&str> {
        self.text("dhcpSubnets")
    }
}

impl Port {
    pub fn admin_state_up(&self) -> Option<bool> {
        self.flag("adminStateUp")
    }

    pub fn port_address(&self) -> Option<&str> {
        self.text("portAddress")
    }

    pub fn network(&self) -> String {
        network(self.text("networkAddress"), self.number("networkLength"))
    }

    pub fn port_mac(&self) -> Option<&str> {
        self.text("portMac")
    }

    pub fn port_type(&self) -> Option<&str> {
        self.text("type")
    }

    pub fn peer_id(&self) -> Option<&str> {
        self.text("peerId")
    }

    /// Link to the port's BGP sessions; only router ports carry one.
    pub fn bgps_uri(&self) -> Option<&str> {
        self.text("bgps")
    }
}

impl Bgp {
    pub fn port_id(&self) -> Option<&str> {
        self.text("portId")
    }

    pub fn peer_addr(&self) -> Option<&str> {
        self.text("peerAddr")
    }

    pub fn local_as(&self) -> Option<u64> {
        self.number("localAS")
    }

    pub fn peer_as(&self) -> Option<u64> {
        self.number("peerAS")
    }

    pub fn ad_routes_uri(&self) -> Option<&str> {
        self.text("adRoutes")
    }
}

impl AdRoute {
    pub fn prefix(&self) -> String {
        network(self.text("nwPrefix"), self.number("prefixLength"))
    }
}

impl ArpEntry {
    pub fn ip(&self) -> Option<&str> {
        self.text("ip")
    }

    pub fn mac(&self) -> Option<&str> {
        self.text("mac")
    }

    pub fn mac_addr(&self) -> Option<&str> {
        self.text("macAddr")
    }
}

impl DhcpSubnet {
    pub fn subnet(&self) -> String {
        network(self.text("subnetPrefix"), self.number("subnetLength"))
    }

    pub fn server_addr(&self) -> Option<&str> {
        self.text("serverAddr")
    }

    pub fn default_gateway(&self) -> Option<&str> {
        self.text("defaultGateway")
    }

    pub fn dns_server_addrs(&self) -> Vec<String> {
        match self.attribute("dnsServerAddrs") {
            Some(Value::Array(addrs)) => addrs.iter().map(value_to_str).collect(),
            _ => Vec::new(),
        }
    }

    pub fn enabled(&self) -> Option<bool> {
        self.flag("enabled")
    }
}

fn network(addr: Option<&str>, len: Option<u64>) -> String {
    let addr = addr.unwrap_or("None");
    match len {
        Some(len) => format!("{addr}/{len}"),
        None => format!("{addr}/None"),
    }
}
