//! Edge gateways and their per-edge services

pub mod firewall;
pub mod gateway;
pub mod interfaces;
pub mod nat;

pub use firewall::esg_fw_default_set;
pub use gateway::{create_edge, delete_edge, find_edge_by_name, EdgeKind};
pub use interfaces::{dlr_add_interface, dlr_del_interface, esg_cfg_interface, esg_clear_interface};
pub use nat::{add_nat_rule, delete_nat_rule};

#[cfg(test)]
mod tests;
