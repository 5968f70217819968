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

//! Text tables for the debug views. Absent values print as `None`.

use crate::resource::{AdRoute, ArpEntry, Bgp, Bridge, DhcpSubnet, Port, Resource, Route, Router};
use std::fmt::Display;
use tabled::builder::Builder;
use tabled::settings::{Alignment, Style};

pub const INDENT: &str = "    ";

pub const ROUTER_HEADERS: [&str; 6] = [
    "Name",
    "AdminState",
    "ID",
    "InboundChain",
    "OutboundChain",
    "T-ID",
];
pub const ROUTE_HEADERS: [&str; 6] = ["Destination", "Source", "nexthopGW", "nexthop", "weight", "ID"];
pub const PORT_HEADERS: [&str; 8] = [
    "UP", "PORT ID", "BGPS", "IPADDR", "NETWORK", "MAC", "TYPE", "PEER ID",
];
pub const BGP_HEADERS: [&str; 6] = [
    "PORT ID",
    "BGP ID",
    "PEER ADDR",
    "LOCAL AS",
    "PEER AS",
    "AD ROUTES",
];
pub const BRIDGE_HEADERS: [&str; 4] = ["BRIDGE NAME", "ID", "TENANT", "Vx LAN PORT"];
pub const ARP_HEADERS: [&str; 3] = ["IP", "MAC", "MAC ADDR"];
pub const DHCP_HEADERS: [&str; 5] = ["SUBNET", "SERVER ADDR", "DefaultGW", "DNS SERVERS", "STATE"];

/// Renders a header row plus `rows` as an ASCII grid.
pub fn table<R>(headers: &[&str], rows: R) -> String
where
    R: IntoIterator<Item = Vec<String>>,
{
    let mut builder = Builder::default();
    builder.push_record(headers.iter().map(|h| h.to_string()));
    for row in rows {
        builder.push_record(row);
    }
    let mut table = builder.build();
    table.with(Style::ascii());
    table.to_string()
}

/// A single-column, left-aligned box around pre-rendered text.
pub fn boxed(title: &str, body: &str) -> String {
    let mut builder = Builder::default();
    builder.push_record([title.to_string()]);
    builder.push_record([body.trim_end().to_string()]);
    let mut table = builder.build();
    table.with(Style::ascii()).with(Alignment::left());
    table.to_string()
}

pub fn indent(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for line in text.lines() {
        out.push_str(INDENT);
        out.push_str(line);
        out.push('\n');
    }
    out
}

pub fn opt<T: Display>(value: Option<T>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => "None".to_string(),
    }
}

pub fn router_row(router: &Router) -> Vec<String> {
    vec![
        opt(router.name()),
        opt(router.admin_state_up()),
        opt(router.id()),
        opt(router.inbound_filter_id()),
        opt(router.outbound_filter_id()),
        opt(router.tenant_id()),
    ]
}

pub fn route_row(route: &Route) -> Vec<String> {
    vec![
        route.dst_network(),
        route.src_network(),
        opt(route.next_hop_gateway()),
        opt(route.next_hop_port()),
        opt(route.weight()),
        opt(route.id()),
    ]
}

/// `bgps` is the peer count, or `ERROR` when it could not be fetched.
pub fn port_row(port: &Port, bgps: &str) -> Vec<String> {
    vec![
        opt(port.admin_state_up()),
        opt(port.id()),
        bgps.to_string(),
        opt(port.port_address()),
        port.network(),
        opt(port.port_mac()),
        opt(port.port_type()),
        opt(port.peer_id()),
    ]
}

pub fn bgp_row(bgp: &Bgp, ad_routes: &[AdRoute]) -> Vec<String> {
    vec![
        bgp.port_id().unwrap_or_default().to_string(),
        opt(bgp.id()),
        opt(bgp.peer_addr()),
        opt(bgp.local_as()),
        opt(bgp.peer_as()),
        format_ad_routes(ad_routes),
    ]
}

pub fn format_ad_routes(ad_routes: &[AdRoute]) -> String {
    let prefixes: Vec<String> = ad_routes.iter().map(AdRoute::prefix).collect();
    format!("[{}]", prefixes.join(", "))
}

pub fn bridge_row(bridge: &Bridge) -> Vec<String> {
    vec![
        opt(bridge.name()),
        opt(bridge.id()),
        opt(bridge.tenant_id()),
        opt(bridge.vxlan_port()),
    ]
}

pub fn arp_row(entry: &ArpEntry) -> Vec<String> {
    vec![opt(entry.ip()), opt(entry.mac()), opt(entry.mac_addr())]
}

pub fn dhcp_row(subnet: &DhcpSubnet) -> Vec<String> {
    vec![
        subnet.subnet(),
        opt(subnet.server_addr()),
        opt(subnet.default_gateway()),
        subnet.dns_server_addrs().join(","),
        opt(subnet.enabled()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn table_has_header_and_rows_inside_a_grid() {
        let rendered = table(
            &["IP", "MAC"],
            vec![vec!["10.0.0.1".to_string(), "ac:ca:ba:00:00:01".to_string()]],
        );
        let lines: Vec<&str> = rendered.lines().collect();
        assert!(lines.first().unwrap().starts_with('+'));
        assert!(lines.last().unwrap().starts_with('+'));
        assert!(lines.iter().any(|l| l.contains("IP") && l.contains("MAC")));
        assert!(lines.iter().any(|l| l.contains("10.0.0.1")));
    }

    #[test]
    fn empty_table_still_shows_headers() {
        let rendered = table(&ARP_HEADERS, Vec::<Vec<String>>::new());
        assert!(rendered.contains("MAC ADDR"));
    }

    #[test]
    fn indent_prefixes_every_line() {
        assert_eq!(indent("a\nb\n"), "    a\n    b\n");
        assert_eq!(indent(""), "");
    }

    #[test]
    fn boxed_keeps_multiline_body() {
        let rendered = boxed("BRIDGE SUMMARY:\"b\"", "line one\nline two\n");
        assert!(rendered.contains("BRIDGE SUMMARY:\"b\""));
        assert!(rendered.contains("line one"));
        assert!(rendered.contains("line two"));
    }

    #[test]
    fn rows_fill_missing_values_with_none() {
        let router = Router::from_dto(
            json!({"id": "r-1", "name": "vpc-1", "adminStateUp": true})
                .as_object()
                .cloned()
                .unwrap(),
        );
        assert_eq!(
            router_row(&router),
            vec!["vpc-1", "true", "r-1", "None", "None", "None"]
        );

        let ad = |prefix: &str, len: u64| {
            AdRoute::from_dto(
                json!({"nwPrefix": prefix, "prefixLength": len})
                    .as_object()
                    .cloned()
                    .unwrap(),
            )
        };
        assert_eq!(
            format_ad_routes(&[ad("10.0.0.0", 16), ad("192.168.0.0", 24)]),
            "[10.0.0.0/16, 192.168.0.0/24]"
        );
        assert_eq!(format_ad_routes(&[]), "[]");
    }

    #[test]
    fn dhcp_row_joins_dns_servers() {
        let subnet = DhcpSubnet::from_dto(
            json!({
                "subnetPrefix": "10.1.0.0",
                "subnetLength": 24,
                "serverAddr": "10.1.0.2",
                "defaultGateway": "10.1.0.1",
                "dnsServerAddrs": ["8.8.8.8", "1.1.1.1"],
                "enabled": true,
            })
            .as_object()
            .cloned()
            .unwrap(),
        );
        assert_eq!(
            dhcp_row(&subnet),
            vec!["10.1.0.0/24", "10.1.0.2", "10.1.0.1", "8.8.8.8,1.1.1.1", "true"]
        );
    }
}
