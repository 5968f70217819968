//! Troubleshooting views over a MidoNet topology.
//!
//! [`MidoDebug`] holds the collaborators explicitly: a [`Topology`] to read
//! resources from and, for instance-driven lookups, an [`InstanceLookup`].
//! The `show_*` methods return rendered text and leave printing to callers.

use crate::filter::{Criteria, Exact, MatchPredicate, MissingAttribute, filter_with};
use crate::instance::{Instance, InstanceLookup};
use crate::render::{self, INDENT};
use crate::resource::{Bgp, Bridge, Port, Resource, ResourceKind, Route, Router};
use crate::topology::Topology;
use anyhow::{Result, anyhow};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("could not find {kind} `{key}`")]
    NotFound { kind: String, key: String },
    #[error(
        "expected to find 1 matching {kind} for {context}, found {}: [{}]",
        .matches.len(),
        .matches.join(", ")
    )]
    Consistency {
        kind: String,
        context: String,
        matches: Vec<String>,
    },
}

#[derive(Clone, Copy)]
pub struct MidoDebug<'a> {
    topology: &'a dyn Topology,
    instances: Option<&'a dyn InstanceLookup>,
    missing: MissingAttribute,
}

impl<'a> MidoDebug<'a> {
    pub fn new(topology: &'a dyn Topology) -> Self {
        Self {
            topology,
            instances: None,
            missing: MissingAttribute::default(),
        }
    }

    pub fn with_instances(mut self, instances: &'a dyn InstanceLookup) -> Self {
        self.instances = Some(instances);
        self
    }

    pub fn with_missing_attribute(mut self, missing: MissingAttribute) -> Self {
        self.missing = missing;
        self
    }

    /// All routers whose attributes match `criteria`.
    pub fn get_all_routers(
        &self,
        criteria: &Criteria,
        predicate: &dyn MatchPredicate,
    ) -> Result<Vec<Router>> {
        let routers = self.topology.routers()?;
        if criteria.is_empty() {
            return Ok(routers);
        }
        let selected = filter_with(&routers, criteria, predicate, self.missing)?;
        debug!(total = routers.len(), selected = selected.len(), "filtered routers");
        Ok(selected.into_iter().cloned().collect())
    }

    pub fn get_all_bridges(
        &self,
        criteria: &Criteria,
        predicate: &dyn MatchPredicate,
    ) -> Result<Vec<Bridge>> {
        let bridges = self.topology.bridges()?;
        let selected = filter_with(&bridges, criteria, predicate, self.missing)?;
        debug!(total = bridges.len(), selected = selected.len(), "filtered bridges");
        Ok(selected.into_iter().cloned().collect())
    }

    pub fn get_instance(&self, instance_id: &str) -> Result<Instance> {
        // A blank id would select the whole inventory.
        if instance_id.trim().is_empty() {
            return Err(LookupError::NotFound {
                kind: "instance".into(),
                key: instance_id.to_string(),
            }
            .into());
        }
        let lookup = self
            .instances
            .ok_or_else(|| anyhow!("no instance inventory available to look up {instance_id}"))?;
        let mut found = lookup.get_instances(instance_id)?;
        match found.len() {
            0 => Err(LookupError::NotFound {
                kind: "instance".into(),
                key: instance_id.to_string(),
            }
            .into()),
            1 => Ok(found.remove(0)),
            _ => Err(LookupError::Consistency {
                kind: "instance".into(),
                context: format!("id {instance_id}"),
                matches: found.into_iter().map(|i| i.id).collect(),
            }
            .into()),
        }
    }

    /// The router backing an instance's VPC; routers are named after the VPC id.
    pub fn get_router_for_instance(&self, instance_id: &str) -> Result<Router> {
        let instance = self.get_instance(instance_id)?;
        let vpc_id = instance.vpc_id.as_deref().ok_or_else(|| LookupError::NotFound {
            kind: "vpc".into(),
            key: format!("of instance {}", instance.id),
        })?;
        debug!(
            instance = %instance.id,
            vpc = vpc_id,
            private_ip = ?instance.private_ip,
            state = ?instance.state,
            "getting router for instance"
        );

        let mut routers = self.get_all_routers(&Criteria::new().with("name", vpc_id), &Exact)?;
        if routers.len() != 1 {
            return Err(LookupError::Consistency {
                kind: ResourceKind::Router.to_string(),
                context: format!("instance {}", instance.id),
                matches: routers.iter().map(Resource::label).collect(),
            }
            .into());
        }
        let router = routers.remove(0);
        debug!(router = ?router.name(), instance = %instance.id, "found router for instance");
        Ok(router)
    }

    /// Looks a router up by id, falling back to its name.
    pub fn find_router(&self, key: &str) -> Result<Router> {
        find_one(self.topology.routers()?, ResourceKind::Router, key)
    }

    pub fn find_bridge(&self, key: &str) -> Result<Bridge> {
        find_one(self.topology.bridges()?, ResourceKind::Bridge, key)
    }

    /// Ports of whichever router or bridge `key` names.
    pub fn find_device_ports(&self, key: &str) -> Result<Vec<Port>> {
        match self.find_router(key) {
            Ok(router) => self.topology.router_ports(&router),
            Err(err) if is_not_found(&err) => {
                let bridge = self.find_bridge(key)?;
                self.topology.bridge_ports(&bridge)
            }
            Err(err) => Err(err),
        }
    }

    pub fn routes(&self, router: &Router) -> Result<Vec<Route>> {
        self.topology.routes(router)
    }

    pub fn show_routers_brief(&self, routers: &[Router]) -> String {
        render::table(&render::ROUTER_HEADERS, routers.iter().map(render::router_row))
    }

    pub fn show_routes(&self, routes: &[Route]) -> String {
        render::table(&render::ROUTE_HEADERS, routes.iter().map(render::route_row))
    }

    /// Port table. A port with BGP sessions closes the current table after
    /// its row; its BGP table follows indented, then the border line again.
    pub fn show_ports(&self, ports: &[Port]) -> Result<String> {
        let mut buf = String::new();
        let mut rows = Vec::new();

        for port in ports {
            let (count, bgps) = match self.port_bgps(port) {
                Ok(bgps) => (bgps.len().to_string(), bgps),
                Err(err) => {
                    warn!(port = ?port.id(), error = %err, "error fetching bgps from port");
                    ("ERROR".to_string(), Vec::new())
                }
            };
            rows.push(render::port_row(port, &count));

            if !bgps.is_empty() {
                let section = render::table(&render::PORT_HEADERS, rows.drain(..));
                let footer = section.lines().last().unwrap_or_default().to_string();
                buf.push_str(&section);
                buf.push('\n');
                buf.push_str(&render::indent(&self.show_bgps(&bgps)?));
                buf.push_str(&footer);
                buf.push('\n');
            }
        }

        if !rows.is_empty() || ports.is_empty() {
            buf.push_str(&render::table(&render::PORT_HEADERS, rows));
            buf.push('\n');
        }
        Ok(buf)
    }

    fn port_bgps(&self, port: &Port) -> Result<Vec<Bgp>> {
        if port.bgps_uri().is_none() {
            return Ok(Vec::new());
        }
        self.topology.bgps(port)
    }

    pub fn show_bgps(&self, bgps: &[Bgp]) -> Result<String> {
        let mut rows = Vec::with_capacity(bgps.len());
        for bgp in bgps {
            let ad_routes = self.topology.ad_routes(bgp)?;
            rows.push(render::bgp_row(bgp, &ad_routes));
        }
        Ok(render::table(&render::BGP_HEADERS, rows))
    }

    pub fn show_router_summary(&self, router: &Router) -> Result<String> {
        let brief = render::indent(&self.show_routers_brief(std::slice::from_ref(router)));
        let routes = render::indent(&self.show_routes(&self.topology.routes(router)?));
        let ports = render::indent(&self.show_ports(&self.topology.router_ports(router)?)?);
        Ok(format!(
            "\nROUTER: \"{}\"\n{brief}\n{INDENT}ROUTES:\n{routes}\n{INDENT}PORTS:\n{ports}\n\n",
            render::opt(router.name()),
        ))
    }

    pub fn show_routers(&self, routers: &[Router]) -> Result<String> {
        let mut buf = String::new();
        for router in routers {
            buf.push_str(&self.show_router_summary(router)?);
        }
        Ok(buf)
    }

    pub fn show_bridges(&self, bridges: &[Bridge]) -> Result<String> {
        let mut out = String::new();
        for bridge in bridges {
            let mut buf = render::indent(&render::table(
                &render::BRIDGE_HEADERS,
                [render::bridge_row(bridge)],
            ));
            buf.push_str(INDENT);
            buf.push_str("BRIDGE PORTS:\n");
            buf.push_str(&render::indent(
                &self.show_ports(&self.topology.bridge_ports(bridge)?)?,
            ));
            buf.push_str(INDENT);
            buf.push_str("BRIDGE ARP TABLE:\n");
            buf.push_str(&render::indent(&self.show_bridge_arp_table(bridge)?));
            buf.push_str(INDENT);
            buf.push_str("DHCP SUBNETS:\n");
            buf.push_str(&render::indent(&self.show_bridge_dhcp_subnets(bridge)?));

            let title = format!("BRIDGE SUMMARY:\"{}\"", render::opt(bridge.name()));
            out.push_str(&render::boxed(&title, &buf));
            out.push('\n');
        }
        Ok(out)
    }

    pub fn show_bridge_arp_table(&self, bridge: &Bridge) -> Result<String> {
        let table = self.topology.arp_table(bridge)?;
        Ok(render::table(
            &render::ARP_HEADERS,
            table.iter().map(render::arp_row),
        ))
    }

    pub fn show_bridge_dhcp_subnets(&self, bridge: &Bridge) -> Result<String> {
        let subnets = self.topology.dhcp_subnets(bridge)?;
        Ok(render::table(
            &render::DHCP_HEADERS,
            subnets.iter().map(render::dhcp_row),
        ))
    }
}

fn find_one<R: Resource>(mut items: Vec<R>, kind: ResourceKind, key: &str) -> Result<R> {
    let by_id: Vec<usize> = positions(&items, |r| r.id() == Some(key));
    let hits = if by_id.is_empty() {
        positions(&items, |r| r.name() == Some(key))
    } else {
        by_id
    };

    match hits.as_slice() {
        [] => Err(LookupError::NotFound {
            kind: kind.to_string(),
            key: key.to_string(),
        }
        .into()),
        [only] => Ok(items.swap_remove(*only)),
        many => Err(LookupError::Consistency {
            kind: kind.to_string(),
            context: format!("`{key}`"),
            matches: many.iter().map(|i| items[*i].label()).collect(),
        }
        .into()),
    }
}

fn positions<R>(items: &[R], pred: impl Fn(&R) -> bool) -> Vec<usize> {
    items
        .iter()
        .enumerate()
        .filter(|(_, r)| pred(r))
        .map(|(i, _)| i)
        .collect()
}

fn is_not_found(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<LookupError>(),
        Some(LookupError::NotFound { .. })
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterError, RegexSearch, Substring};
    use crate::instance::Inventory;
    use crate::resource::{AdRoute, ArpEntry, DhcpSubnet, Dto};
    use serde_json::{Value, json};
    use std::collections::HashMap;

    fn dto(value: Value) -> Dto {
        value.as_object().cloned().unwrap()
    }

    #[derive(Default)]
    struct FakeTopology {
        routers: Vec<Router>,
        bridges: Vec<Bridge>,
        routes: HashMap<String, Vec<Route>>,
        ports: HashMap<String, Vec<Port>>,
        bgps: HashMap<String, Vec<Bgp>>,
        ad_routes: HashMap<String, Vec<AdRoute>>,
        arp: HashMap<String, Vec<ArpEntry>>,
        dhcp: HashMap<String, Vec<DhcpSubnet>>,
    }

    fn children<T: Clone>(map: &HashMap<String, Vec<T>>, id: Option<&str>) -> Vec<T> {
        id.and_then(|id| map.get(id)).cloned().unwrap_or_default()
    }

    impl Topology for FakeTopology {
        fn routers(&self) -> Result<Vec<Router>> {
            Ok(self.routers.clone())
        }

        fn bridges(&self) -> Result<Vec<Bridge>> {
            Ok(self.bridges.clone())
        }

        fn routes(&self, router: &Router) -> Result<Vec<Route>> {
            Ok(children(&self.routes, router.id()))
        }

        fn router_ports(&self, router: &Router) -> Result<Vec<Port>> {
            Ok(children(&self.ports, router.id()))
        }

        fn bridge_ports(&self, bridge: &Bridge) -> Result<Vec<Port>> {
            Ok(children(&self.ports, bridge.id()))
        }

        fn bgps(&self, port: &Port) -> Result<Vec<Bgp>> {
            if port.id() == Some("p-broken") {
                return Err(anyhow!("connection reset"));
            }
            Ok(children(&self.bgps, port.id()))
        }

        fn ad_routes(&self, bgp: &Bgp) -> Result<Vec<AdRoute>> {
            Ok(children(&self.ad_routes, bgp.id()))
        }

        fn arp_table(&self, bridge: &Bridge) -> Result<Vec<ArpEntry>> {
            Ok(children(&self.arp, bridge.id()))
        }

        fn dhcp_subnets(&self, bridge: &Bridge) -> Result<Vec<DhcpSubnet>> {
            Ok(children(&self.dhcp, bridge.id()))
        }
    }

    fn topology() -> FakeTopology {
        let mut topo = FakeTopology {
            routers: vec![
                Router::from_dto(dto(json!({"id": "r-1", "name": "vpc-123", "tenantId": "acct-1"}))),
                Router::from_dto(dto(json!({"id": "r-2", "name": "vpc-456", "tenantId": "acct-2"}))),
                Router::from_dto(dto(json!({"id": "r-3", "name": "vpc-123-test"}))),
            ],
            bridges: vec![Bridge::from_dto(dto(json!({
                "id": "b-1",
                "name": "subnet-a",
                "tenantId": "acct-1",
            })))],
            ..FakeTopology::default()
        };
        topo.routes.insert(
            "r-1".into(),
            vec![Route::from_dto(dto(json!({
                "id": "rt-1",
                "dstNetworkAddr": "0.0.0.0",
                "dstNetworkLength": 0,
                "srcNetworkAddr": "172.31.0.0",
                "srcNetworkLength": 16,
                "nextHopGateway": "10.116.0.1",
                "weight": 100,
            })))],
        );
        topo.ports.insert(
            "r-1".into(),
            vec![
                Port::from_dto(dto(json!({
                    "id": "p-uplink",
                    "adminStateUp": true,
                    "portAddress": "10.116.0.5",
                    "networkAddress": "10.116.0.0",
                    "networkLength": 24,
                    "type": "ExteriorRouter",
                    "bgps": "http://mido/ports/p-uplink/bgps",
                }))),
                Port::from_dto(dto(json!({
                    "id": "p-broken",
                    "bgps": "http://mido/ports/p-broken/bgps",
                }))),
                Port::from_dto(dto(json!({"id": "p-interior", "type": "InteriorRouter"}))),
            ],
        );
        topo.bgps.insert(
            "p-uplink".into(),
            vec![Bgp::from_dto(dto(json!({
                "id": "bgp-1",
                "portId": "p-uplink",
                "peerAddr": "10.116.0.1",
                "localAS": 64512,
                "peerAS": 65000,
            })))],
        );
        topo.ad_routes.insert(
            "bgp-1".into(),
            vec![AdRoute::from_dto(dto(json!({"nwPrefix": "172.31.0.0", "prefixLength": 16})))],
        );
        topo.ports.insert(
            "b-1".into(),
            vec![Port::from_dto(dto(json!({"id": "bp-1", "type": "ExteriorBridge"})))],
        );
        topo.arp.insert(
            "b-1".into(),
            vec![ArpEntry::from_dto(dto(json!({
                "ip": "172.31.0.12",
                "mac": "d0:0d:aa:bb:cc:dd",
                "macAddr": "d0:0d:aa:bb:cc:dd",
            })))],
        );
        topo.dhcp.insert(
            "b-1".into(),
            vec![DhcpSubnet::from_dto(dto(json!({
                "subnetPrefix": "172.31.0.0",
                "subnetLength": 20,
                "serverAddr": "172.31.0.2",
                "defaultGateway": "172.31.0.1",
                "dnsServerAddrs": ["172.31.0.2"],
                "enabled": true,
            })))],
        );
        topo
    }

    fn inventory() -> Inventory {
        Inventory::parse(
            "- id: i-aaa\n  vpc_id: vpc-456\n\
             - id: i-bbb\n  vpc_id: vpc-999\n\
             - id: i-ccc\n",
        )
        .unwrap()
    }

    fn lookup_error(err: &anyhow::Error) -> &LookupError {
        err.downcast_ref::<LookupError>()
            .unwrap_or_else(|| panic!("not a lookup error: {err:#}"))
    }

    #[test]
    fn get_all_routers_filters_by_attribute() {
        let topo = topology();
        let debug = MidoDebug::new(&topo);
        let routers = debug
            .get_all_routers(&Criteria::new().with("name", "vpc-123"), &Substring)
            .unwrap();
        let names: Vec<_> = routers.iter().map(|r| r.name().unwrap()).collect();
        assert_eq!(names, vec!["vpc-123", "vpc-123-test"]);

        let all = debug.get_all_routers(&Criteria::new(), &RegexSearch).unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn strict_mode_drops_routers_without_the_attribute() {
        let topo = topology();
        let criteria = Criteria::new().with("tenant_id", "acct");
        let lenient = MidoDebug::new(&topo)
            .get_all_routers(&criteria, &RegexSearch)
            .unwrap();
        assert_eq!(lenient.len(), 3);

        let strict = MidoDebug::new(&topo)
            .with_missing_attribute(MissingAttribute::Exclude)
            .get_all_routers(&criteria, &RegexSearch)
            .unwrap();
        assert_eq!(strict.len(), 2);
    }

    #[test]
    fn invalid_pattern_surfaces_as_filter_error() {
        let topo = topology();
        let err = MidoDebug::new(&topo)
            .get_all_routers(&Criteria::new().with("name", "(unclosed"), &RegexSearch)
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FilterError>(),
            Some(FilterError::Predicate { .. })
        ));
    }

    #[test]
    fn router_for_instance_uses_vpc_name() {
        let topo = topology();
        let inv = inventory();
        let debug = MidoDebug::new(&topo).with_instances(&inv);

        let router = debug.get_router_for_instance("i-aaa").unwrap();
        assert_eq!(router.id(), Some("r-2"));
    }

    #[test]
    fn router_for_instance_reports_lookup_failures() {
        let topo = topology();
        let inv = inventory();
        let debug = MidoDebug::new(&topo).with_instances(&inv);

        let missing = debug.get_router_for_instance("i-zzz").unwrap_err();
        assert!(matches!(lookup_error(&missing), LookupError::NotFound { .. }));

        let no_vpc = debug.get_router_for_instance("i-ccc").unwrap_err();
        assert!(matches!(lookup_error(&no_vpc), LookupError::NotFound { .. }));

        let no_router = debug.get_router_for_instance("i-bbb").unwrap_err();
        match lookup_error(&no_router) {
            LookupError::Consistency { matches, .. } => assert!(matches.is_empty()),
            other => panic!("unexpected {other}"),
        }

        assert!(MidoDebug::new(&topo).get_instance("i-aaa").is_err());
    }

    #[test]
    fn blank_instance_id_is_not_found() {
        let topo = topology();
        let single = Inventory::parse("- id: i-aaa\n  vpc_id: vpc-456\n").unwrap();
        let debug = MidoDebug::new(&topo).with_instances(&single);

        for blank in ["", "  "] {
            let err = debug.get_router_for_instance(blank).unwrap_err();
            assert!(
                matches!(lookup_error(&err), LookupError::NotFound { kind, .. } if kind == "instance"),
                "{err:#}"
            );
        }
        assert_eq!(debug.get_instance("i-aaa").unwrap().id, "i-aaa");
    }

    #[test]
    fn duplicate_router_names_are_a_consistency_error() {
        let mut topo = topology();
        topo.routers.push(Router::from_dto(dto(json!({"id": "r-9", "name": "vpc-456"}))));
        let inv = inventory();
        let err = MidoDebug::new(&topo)
            .with_instances(&inv)
            .get_router_for_instance("i-aaa")
            .unwrap_err();
        match lookup_error(&err) {
            LookupError::Consistency { matches, .. } => {
                assert_eq!(matches, &vec![
                    "router vpc-456 (r-2)".to_string(),
                    "router vpc-456 (r-9)".to_string(),
                ]);
            }
            other => panic!("unexpected {other}"),
        }
        assert!(err.to_string().contains("found 2"));
    }

    #[test]
    fn find_router_prefers_id_then_name() {
        let topo = topology();
        let debug = MidoDebug::new(&topo);
        assert_eq!(debug.find_router("r-3").unwrap().name(), Some("vpc-123-test"));
        assert_eq!(debug.find_router("vpc-123").unwrap().id(), Some("r-1"));
        let err = debug.find_router("vpc-000").unwrap_err();
        assert!(matches!(lookup_error(&err), LookupError::NotFound { .. }));
    }

    #[test]
    fn device_ports_fall_back_to_bridges() {
        let topo = topology();
        let debug = MidoDebug::new(&topo);
        assert_eq!(debug.find_device_ports("vpc-123").unwrap().len(), 3);
        let bridge_ports = debug.find_device_ports("subnet-a").unwrap();
        assert_eq!(bridge_ports[0].id(), Some("bp-1"));
        assert!(debug.find_device_ports("nothing").is_err());
    }

    #[test]
    fn ports_table_interleaves_bgp_sessions() {
        let topo = topology();
        let debug = MidoDebug::new(&topo);
        let router = debug.find_router("r-1").unwrap();
        let ports = topo.router_ports(&router).unwrap();
        let out = debug.show_ports(&ports).unwrap();

        let lines: Vec<&str> = out.lines().collect();
        let uplink = lines.iter().position(|l| l.contains("p-uplink") && l.contains(" 1 ")).unwrap();
        let bgp_header = lines.iter().position(|l| l.contains("PEER ADDR")).unwrap();
        let broken = lines.iter().position(|l| l.contains("p-broken")).unwrap();
        assert!(uplink < bgp_header && bgp_header < broken);
        assert!(lines[bgp_header].starts_with(INDENT));
        assert!(out.contains("172.31.0.0/16"));
        assert!(out.contains("64512"));
        assert!(lines[broken].contains("ERROR"));
        assert!(out.contains("p-interior"));

        // The border closing the uplink section sits right after the BGP table.
        let bgp_end = lines[bgp_header..]
            .iter()
            .position(|l| !l.starts_with(INDENT))
            .map(|i| i + bgp_header)
            .unwrap();
        assert!(lines[bgp_end].starts_with('+'));
    }

    #[test]
    fn empty_port_list_renders_headers_only() {
        let topo = topology();
        let out = MidoDebug::new(&topo).show_ports(&[]).unwrap();
        assert!(out.contains("PORT ID"));
        assert!(!out.contains("None"));
    }

    #[test]
    fn router_summary_nests_routes_and_ports() {
        let topo = topology();
        let debug = MidoDebug::new(&topo);
        let router = debug.find_router("vpc-123").unwrap();
        let out = debug.show_router_summary(&router).unwrap();

        assert!(out.contains("ROUTER: \"vpc-123\""));
        assert!(out.contains(&format!("{INDENT}ROUTES:")));
        assert!(out.contains(&format!("{INDENT}PORTS:")));
        assert!(out.contains("0.0.0.0/0"));
        assert!(out.contains("10.116.0.1"));
        let route_line = out.lines().find(|l| l.contains("rt-1")).unwrap();
        assert!(route_line.starts_with(INDENT));

        let all = debug.show_routers(&topo.routers).unwrap();
        assert_eq!(all.matches("ROUTER: ").count(), 3);
    }

    #[test]
    fn bridges_are_boxed_with_nested_tables() {
        let topo = topology();
        let debug = MidoDebug::new(&topo);
        let out = debug.show_bridges(&topo.bridges).unwrap();

        assert!(out.contains("BRIDGE SUMMARY:\"subnet-a\""));
        for section in ["BRIDGE PORTS:", "BRIDGE ARP TABLE:", "DHCP SUBNETS:"] {
            assert!(out.contains(section), "missing {section}");
        }
        assert!(out.contains("bp-1"));
        assert!(out.contains("d0:0d:aa:bb:cc:dd"));
        assert!(out.contains("172.31.0.0/20"));
    }

    #[test]
    fn brief_table_lists_each_router() {
        let topo = topology();
        let out = MidoDebug::new(&topo).show_routers_brief(&topo.routers);
        for id in ["r-1", "r-2", "r-3"] {
            assert!(out.contains(id));
        }
        assert!(out.contains("InboundChain"));
    }
}
