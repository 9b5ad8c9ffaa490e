// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

//! Gateway API resources come from the `gateway-api` crate. This module adds the condition
//! vocabulary and a kind-independent view of parent and ancestor references.

pub use gateway_api::apis::{
    experimental::{
        backendtlspolicies::{
            BackendTLSPolicy, BackendTLSPolicySpec, BackendTLSPolicyStatus, BackendTLSPolicyStatusAncestors, BackendTLSPolicyStatusAncestorsAncestorRef,
        },
        tcproutes::{TCPRoute, TCPRouteSpec, TCPRouteStatus, TCPRouteStatusParents, TCPRouteStatusParentsParentRef},
        tlsroutes::{TLSRoute, TLSRouteSpec, TLSRouteStatus, TLSRouteStatusParents, TLSRouteStatusParentsParentRef},
    },
    standard::{
        gatewayclasses::{GatewayClass, GatewayClassSpec, GatewayClassStatus},
        gateways::{Gateway, GatewaySpec, GatewayStatus, GatewayStatusListeners, GatewayStatusListenersSupportedKinds},
        grpcroutes::{GRPCRoute, GRPCRouteSpec, GRPCRouteStatus, GRPCRouteStatusParents, GRPCRouteStatusParentsParentRef},
        httproutes::{HTTPRoute, HTTPRouteSpec, HTTPRouteStatus, HTTPRouteStatusParents, HTTPRouteStatusParentsParentRef},
    },
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::Condition;

use crate::common::NamespacedName;

pub const GATEWAY_API_GROUP: &str = "gateway.networking.k8s.io";
pub const GATEWAY_KIND: &str = "Gateway";

string_enum!(GatewayConditionType {
    Accepted => "Accepted",
    Programmed => "Programmed",
});

string_enum!(GatewayConditionReason {
    Accepted => "Accepted",
    Programmed => "Programmed",
    Invalid => "Invalid",
    NotReconciled => "NotReconciled",
    ListenersNotValid => "ListenersNotValid",
    AddressNotAssigned => "AddressNotAssigned",
    Pending => "Pending",
});

string_enum!(GatewayClassConditionType {
    Accepted => "Accepted",
    SupportedVersion => "SupportedVersion",
});

string_enum!(GatewayClassConditionReason {
    Accepted => "Accepted",
    InvalidParameters => "InvalidParameters",
    SupportedVersion => "SupportedVersion",
    UnsupportedVersion => "UnsupportedVersion",
});

string_enum!(ListenerConditionType {
    Accepted => "Accepted",
    Programmed => "Programmed",
    ResolvedRefs => "ResolvedRefs",
    Conflicted => "Conflicted",
});

string_enum!(ListenerConditionReason {
    Accepted => "Accepted",
    Programmed => "Programmed",
    Invalid => "Invalid",
    ResolvedRefs => "ResolvedRefs",
    InvalidCertificateRef => "InvalidCertificateRef",
    InvalidRouteKinds => "InvalidRouteKinds",
    RefNotPermitted => "RefNotPermitted",
    UnsupportedProtocol => "UnsupportedProtocol",
    HostnameConflict => "HostnameConflict",
    ProtocolConflict => "ProtocolConflict",
    NoConflicts => "NoConflicts",
    PortUnavailable => "PortUnavailable",
});

string_enum!(RouteConditionType {
    Accepted => "Accepted",
    ResolvedRefs => "ResolvedRefs",
    PartiallyInvalid => "PartiallyInvalid",
});

string_enum!(RouteConditionReason {
    Accepted => "Accepted",
    ResolvedRefs => "ResolvedRefs",
    NotAllowedByListeners => "NotAllowedByListeners",
    NoMatchingListenerHostname => "NoMatchingListenerHostname",
    NoMatchingParent => "NoMatchingParent",
    UnsupportedValue => "UnsupportedValue",
    RefNotPermitted => "RefNotPermitted",
    InvalidKind => "InvalidKind",
    BackendNotFound => "BackendNotFound",
    UnsupportedProtocol => "UnsupportedProtocol",
    Degraded => "Degraded",
});

string_enum!(PolicyConditionType {
    Accepted => "Accepted",
});

string_enum!(PolicyConditionReason {
    Accepted => "Accepted",
    Conflicted => "Conflicted",
    Invalid => "Invalid",
    TargetNotFound => "TargetNotFound",
});

/// Reference from a route (or an ancestor entry of a policy) to its parent, independent of the
/// route kind it was read from.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParentReference {
    pub group: Option<String>,
    pub kind: Option<String>,
    pub namespace: Option<String>,
    pub name: String,
    pub section_name: Option<String>,
    pub port: Option<i32>,
}

impl ParentReference {
    pub fn gateway(namespace: &str, name: &str) -> Self {
        Self {
            group: Some(GATEWAY_API_GROUP.to_owned()),
            kind: Some(GATEWAY_KIND.to_owned()),
            namespace: Some(namespace.to_owned()),
            name: name.to_owned(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_section_name(mut self, section_name: &str) -> Self {
        self.section_name = Some(section_name.to_owned());
        self
    }

    /// An unset group or kind means the Gateway API defaults. An unset namespace means
    /// `local_namespace`, the namespace of the object holding the reference.
    pub fn is_ref_to_gateway(&self, gateway: &NamespacedName, local_namespace: &str) -> bool {
        self.group.as_deref().map_or(true, |group| group == GATEWAY_API_GROUP)
            && self.kind.as_deref().map_or(true, |kind| kind == GATEWAY_KIND)
            && self.namespace.as_deref().unwrap_or(local_namespace) == gateway.namespace
            && self.name == gateway.name
    }
}

macro_rules! parent_reference {
    ($($generated:ty),+ $(,)?) => {
        $(
            impl From<$generated> for ParentReference {
                fn from(r: $generated) -> Self {
                    Self { group: r.group, kind: r.kind, namespace: r.namespace, name: r.name, section_name: r.section_name, port: r.port }
                }
            }

            impl From<ParentReference> for $generated {
                fn from(r: ParentReference) -> Self {
                    Self { group: r.group, kind: r.kind, namespace: r.namespace, name: r.name, section_name: r.section_name, port: r.port }
                }
            }
        )+
    };
}

parent_reference!(
    HTTPRouteStatusParentsParentRef,
    GRPCRouteStatusParentsParentRef,
    TLSRouteStatusParentsParentRef,
    TCPRouteStatusParentsParentRef,
    BackendTLSPolicyStatusAncestorsAncestorRef,
);

/// A status entry keyed by a parent reference: a route's `parents` item or a policy's
/// `ancestors` item.
pub trait ParentStatusEntry: Clone {
    fn new(parent_ref: ParentReference, controller_name: String, conditions: Vec<Condition>) -> Self;

    fn parent_ref(&self) -> ParentReference;

    fn conditions(&self) -> &[Condition];
}

macro_rules! route_parent_status {
    ($($entry:ident),+ $(,)?) => {
        $(
            impl ParentStatusEntry for $entry {
                fn new(parent_ref: ParentReference, controller_name: String, conditions: Vec<Condition>) -> Self {
                    Self { parent_ref: parent_ref.into(), controller_name, conditions: Some(conditions) }
                }

                fn parent_ref(&self) -> ParentReference {
                    self.parent_ref.clone().into()
                }

                fn conditions(&self) -> &[Condition] {
                    self.conditions.as_deref().unwrap_or_default()
                }
            }
        )+
    };
}

route_parent_status!(HTTPRouteStatusParents, GRPCRouteStatusParents, TLSRouteStatusParents, TCPRouteStatusParents);

impl ParentStatusEntry for BackendTLSPolicyStatusAncestors {
    fn new(ancestor_ref: ParentReference, controller_name: String, conditions: Vec<Condition>) -> Self {
        Self { ancestor_ref: ancestor_ref.into(), controller_name, conditions: Some(conditions) }
    }

    fn parent_ref(&self) -> ParentReference {
        self.ancestor_ref.clone().into()
    }

    fn conditions(&self) -> &[Condition] {
        self.conditions.as_deref().unwrap_or_default()
    }
}

/// A supported route kind in the Gateway API group, as listed on a listener.
pub fn route_group_kind(kind: &str) -> GatewayStatusListenersSupportedKinds {
    GatewayStatusListenersSupportedKinds { group: Some(GATEWAY_API_GROUP.to_owned()), kind: kind.to_owned() }
}
