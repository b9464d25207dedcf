//! Dynamic and static routing of edges
//!
//! The same payloads serve ESGs and DLRs; only the set of accepted fields
//! differs and that is left to the manager.

pub mod bgp;
pub mod global;
pub mod ospf;
pub mod redistribution;
pub mod static_routes;

pub use bgp::{add_bgp_neighbour, del_bgp_neighbour, update_bgp};
pub use global::{add_routing_prefix, del_routing_prefix, update_routing_global};
pub use ospf::{
    add_ospf_area, add_ospf_interface, del_ospf_area, del_ospf_interface, update_ospf,
};
pub use redistribution::{add_routing_rule, del_routing_rule, RoutingProtocol};
pub use static_routes::{
    add_static_route, clear_default_gateway, del_static_route, set_default_gateway,
};

#[cfg(test)]
mod tests;
