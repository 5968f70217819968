//! Read access to the virtual topology, independent of how it is fetched.

use crate::resource::{AdRoute, ArpEntry, Bgp, Bridge, DhcpSubnet, Port, Route, Router};
use anyhow::Result;

/// Everything the debug views need from the controller. Child collections
/// are reached from their parent resource; a parent without the
/// corresponding link yields an empty list.
pub trait Topology {
    fn routers(&self) -> Result<Vec<Router>>;

    fn bridges(&self) -> Result<Vec<Bridge>>;

    fn routes(&self, router: &Router) -> Result<Vec<Route>>;

    fn router_ports(&self, router: &Router) -> Result<Vec<Port>>;

    fn bridge_ports(&self, bridge: &Bridge) -> Result<Vec<Port>>;

    fn bgps(&self, port: &Port) -> Result<Vec<Bgp>>;

    fn ad_routes(&self, bgp: &Bgp) -> Result<Vec<AdRoute>>;

    fn arp_table(&self, bridge: &Bridge) -> Result<Vec<ArpEntry>>;

    fn dhcp_subnets(&self, bridge: &Bridge) -> Result<Vec<DhcpSubnet>>;
}
