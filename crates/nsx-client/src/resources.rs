//! NSX resource table

use regex::Regex;
use reqwest::Method;
use std::sync::OnceLock;

use nsx_core::{NsxError, NsxResult, UriParameters};

/// Session operation on a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Read => write!(f, "read"),
            Operation::Create => write!(f, "create"),
            Operation::Update => write!(f, "update"),
            Operation::Delete => write!(f, "delete"),
        }
    }
}

/// One addressable NSX resource type
#[derive(Debug)]
pub struct Resource {
    pub name: &'static str,
    pub template: &'static str,
    pub operations: &'static [Operation],
    /// Some collections take members with PUT instead of POST
    pub create_with_put: bool,
}

use Operation::{Create, Delete, Read, Update};

const fn res(
    name: &'static str,
    template: &'static str,
    operations: &'static [Operation],
) -> Resource {
    Resource {
        name,
        template,
        operations,
        create_with_put: false,
    }
}

pub static RESOURCES: &[Resource] = &[
    res("nsxEdges", "/api/4.0/edges", &[Read, Create]),
    res("nsxEdge", "/api/4.0/edges/{edgeId}", &[Read, Update, Delete]),
    res(
        "routingConfig",
        "/api/4.0/edges/{edgeId}/routing/config",
        &[Read, Update, Delete],
    ),
    res(
        "routingGlobalConfig",
        "/api/4.0/edges/{edgeId}/routing/config/global",
        &[Read, Update],
    ),
    res(
        "routingBGP",
        "/api/4.0/edges/{edgeId}/routing/config/bgp",
        &[Read, Update, Delete],
    ),
    res(
        "routingOSPF",
        "/api/4.0/edges/{edgeId}/routing/config/ospf",
        &[Read, Update, Delete],
    ),
    res(
        "routingConfigStatic",
        "/api/4.0/edges/{edgeId}/routing/config/static",
        &[Read, Update, Delete],
    ),
    res(
        "nat",
        "/api/4.0/edges/{edgeId}/nat/config",
        &[Read, Update, Delete],
    ),
    res("natRules", "/api/4.0/edges/{edgeId}/nat/config/rules", &[Create]),
    res(
        "natRule",
        "/api/4.0/edges/{edgeId}/nat/config/rules/{ruleID}",
        &[Update, Delete],
    ),
    res(
        "firewallConfig",
        "/api/4.0/edges/{edgeId}/firewall/config",
        &[Read, Update, Delete],
    ),
    res(
        "defaultFirewallPolicy",
        "/api/4.0/edges/{edgeId}/firewall/config/defaultpolicy",
        &[Read, Update],
    ),
    res(
        "vnic",
        "/api/4.0/edges/{edgeId}/vnics/{index}",
        &[Read, Update, Delete],
    ),
    res(
        "interfaces",
        "/api/4.0/edges/{edgeId}/interfaces",
        &[Read, Create],
    ),
    res(
        "interface",
        "/api/4.0/edges/{edgeId}/interfaces/{index}",
        &[Read, Update, Delete],
    ),
    res(
        "logicalSwitches",
        "/api/2.0/vdn/scopes/{scopeId}/virtualwires",
        &[Read, Create],
    ),
    res(
        "logicalSwitch",
        "/api/2.0/vdn/virtualwires/{virtualWireID}",
        &[Read, Update, Delete],
    ),
    res(
        "secGroupScope",
        "/api/2.0/services/securitygroup/scope/{scopeId}",
        &[Read],
    ),
    res(
        "secGroupBulk",
        "/api/2.0/services/securitygroup/bulk/{scopeId}",
        &[Create],
    ),
    res(
        "secGroupObject",
        "/api/2.0/services/securitygroup/{objectId}",
        &[Read, Update, Delete],
    ),
    Resource {
        name: "secGroupMember",
        template: "/api/2.0/services/securitygroup/{objectId}/members/{memberMoref}",
        operations: &[Create, Delete],
        create_with_put: true,
    },
    res(
        "securityPolicy",
        "/api/2.0/services/policy/securitypolicy",
        &[Create],
    ),
    res(
        "securityPolicyAll",
        "/api/2.0/services/policy/securitypolicy/all",
        &[Read],
    ),
    res(
        "securityPolicyID",
        "/api/2.0/services/policy/securitypolicy/{ID}",
        &[Read, Update, Delete],
    ),
    res(
        "securityTag",
        "/api/2.0/services/securitytags/tag",
        &[Read, Create],
    ),
    res(
        "securityTagID",
        "/api/2.0/services/securitytags/tag/{tagId}",
        &[Delete],
    ),
    Resource {
        name: "securityTagVM",
        template: "/api/2.0/services/securitytags/tag/{tagId}/vm/{vmMoid}",
        operations: &[Create, Delete],
        create_with_put: true,
    },
    res(
        "securityTagVMsList",
        "/api/2.0/services/securitytags/tag/{tagId}/vm",
        &[Read],
    ),
];

/// Look up a resource type
pub fn resource(name: &str) -> NsxResult<&'static Resource> {
    RESOURCES
        .iter()
        .find(|r| r.name == name)
        .ok_or_else(|| NsxError::UnknownResource(name.to_string()))
}

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{(\w+)\}").expect("valid placeholder pattern"))
}

impl Resource {
    pub fn supports(&self, operation: Operation) -> bool {
        self.operations.contains(&operation)
    }

    pub fn method(&self, operation: Operation) -> Method {
        match operation {
            Operation::Read => Method::GET,
            Operation::Create if self.create_with_put => Method::PUT,
            Operation::Create => Method::POST,
            Operation::Update => Method::PUT,
            Operation::Delete => Method::DELETE,
        }
    }

    /// Path and query of a call
    ///
    /// Template placeholders are filled from the URI parameters; parameters
    /// the template does not name become query arguments (`force`,
    /// `action`, ...).
    pub fn path(&self, uri_parameters: &UriParameters) -> NsxResult<String> {
        let mut used = Vec::new();
        let mut path = String::with_capacity(self.template.len());
        let mut last = 0;

        for captures in placeholder().captures_iter(self.template) {
            let (Some(whole), Some(key)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            let value = uri_parameters.get(key.as_str()).ok_or_else(|| {
                NsxError::MissingUriParameter {
                    resource_type: self.name.to_string(),
                    parameter: key.as_str().to_string(),
                }
            })?;
            path.push_str(&self.template[last..whole.start()]);
            path.push_str(&urlencoding::encode(value));
            last = whole.end();
            used.push(key.as_str());
        }
        path.push_str(&self.template[last..]);

        let query: Vec<String> = uri_parameters
            .iter()
            .filter(|(key, _)| !used.contains(&key.as_str()))
            .map(|(key, value)| {
                format!("{}={}", urlencoding::encode(key), urlencoding::encode(value))
            })
            .collect();

        if !query.is_empty() {
            path.push('?');
            path.push_str(&query.join("&"));
        }

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_lookup() {
        assert_eq!(resource("routingBGP").unwrap().name, "routingBGP");
        assert!(matches!(
            resource("routingRIP"),
            Err(NsxError::UnknownResource(ref name)) if name == "routingRIP"
        ));
    }

    #[test]
    fn test_path_with_placeholders_and_query() {
        let nat_rule = resource("natRule").unwrap();
        let uri = UriParameters::edge("edge-5").with("ruleID", "196609");
        assert_eq!(
            nat_rule.path(&uri).unwrap(),
            "/api/4.0/edges/edge-5/nat/config/rules/196609"
        );

        let group = resource("secGroupObject").unwrap();
        let uri = UriParameters::new()
            .with("objectId", "securitygroup-10")
            .with("force", "true");
        assert_eq!(
            group.path(&uri).unwrap(),
            "/api/2.0/services/securitygroup/securitygroup-10?force=true"
        );
    }

    #[test]
    fn test_missing_parameter() {
        let bgp = resource("routingBGP").unwrap();
        assert!(matches!(
            bgp.path(&UriParameters::new()),
            Err(NsxError::MissingUriParameter { ref parameter, .. }) if parameter == "edgeId"
        ));
    }

    #[test]
    fn test_methods() {
        assert_eq!(resource("natRules").unwrap().method(Operation::Create), Method::POST);
        assert_eq!(
            resource("securityTagVM").unwrap().method(Operation::Create),
            Method::PUT
        );
        assert!(!resource("securityTagID").unwrap().supports(Operation::Read));
    }
}
