// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use std::fmt::Display;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::{Condition, Time};

use super::{
    conditions::{resolve_conditions, upsert_condition},
    update::{unexpected_object, StatusMutator},
};
use crate::{
    apis::{
        gateway::{
            GRPCRouteStatus, GRPCRouteStatusParents, HTTPRouteStatusParents, RouteConditionReason, RouteConditionType, TCPRouteStatus, TCPRouteStatusParents, TLSRouteStatus,
            TLSRouteStatusParents,
        },
        ConditionStatus, GRPCRoute, HTTPRoute, HTTPRouteStatus, ParentReference, ParentStatusEntry, TCPRoute, TLSRoute,
    },
    common::{NamespacedName, ObjectKind, StatusObject, StatusTarget},
};

/// Route kinds that carry a parent status list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RouteKind {
    Http,
    Tls,
    Grpc,
    Tcp,
}

impl RouteKind {
    pub fn object_kind(self) -> ObjectKind {
        match self {
            Self::Http => ObjectKind::HttpRoute,
            Self::Tls => ObjectKind::TlsRoute,
            Self::Grpc => ObjectKind::GrpcRoute,
            Self::Tcp => ObjectKind::TcpRoute,
        }
    }
}

impl Display for RouteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.object_kind().fmt(f)
    }
}

/// Resources whose status is a route parent list.
pub trait RouteResource: StatusTarget {
    const ROUTE_KIND: RouteKind;

    type Parent: ParentStatusEntry;

    fn take_parents(&mut self) -> Vec<Self::Parent>;

    fn set_parents(&mut self, parents: Vec<Self::Parent>);
}

macro_rules! route_resource {
    ($route:ty, $kind:ident, $status:ident, $parent:ty) => {
        impl RouteResource for $route {
            const ROUTE_KIND: RouteKind = RouteKind::$kind;

            type Parent = $parent;

            fn take_parents(&mut self) -> Vec<Self::Parent> {
                self.status.take().map(|status| status.parents).unwrap_or_default()
            }

            fn set_parents(&mut self, parents: Vec<Self::Parent>) {
                self.status = Some($status { parents });
            }
        }
    };
}

route_resource!(HTTPRoute, Http, HTTPRouteStatus, HTTPRouteStatusParents);
route_resource!(TLSRoute, Tls, TLSRouteStatus, TLSRouteStatusParents);
route_resource!(GRPCRoute, Grpc, GRPCRouteStatus, GRPCRouteStatusParents);
route_resource!(TCPRoute, Tcp, TCPRouteStatus, TCPRouteStatusParents);

/// Conditions this controller computed for one parent of a route.
#[derive(Clone, Debug, PartialEq)]
pub struct RouteParentStatus {
    pub parent_ref: ParentReference,
    pub controller_name: String,
    pub conditions: Vec<Condition>,
}

/// Parent conditions computed for one route during a pass.
#[derive(Clone, Debug, PartialEq)]
pub struct RouteStatusUpdate {
    pub fullname: NamespacedName,
    pub kind: RouteKind,
    pub generation: i64,
    pub transition_time: Time,
    gateway_ref: Option<NamespacedName>,
    gateway_controller: String,
    parents: Vec<RouteParentStatus>,
}

impl RouteStatusUpdate {
    pub fn new(fullname: NamespacedName, kind: RouteKind, generation: i64, transition_time: Time, gateway_ref: Option<NamespacedName>, gateway_controller: &str) -> Self {
        Self { fullname, kind, generation, transition_time, gateway_ref, gateway_controller: gateway_controller.to_owned(), parents: vec![] }
    }

    /// Selects the parent entry that subsequent conditions are written to.
    pub fn status_update_for(&mut self, parent_ref: ParentReference) -> RouteParentStatusUpdate<'_> {
        RouteParentStatusUpdate { update: self, parent_ref }
    }

    pub fn conditions_for_parent_ref(&self, parent_ref: &ParentReference) -> &[Condition] {
        self.parents.iter().find(|p| p.parent_ref == *parent_ref).map(|p| p.conditions.as_slice()).unwrap_or_default()
    }

    pub fn route_parent_statuses(&self) -> &[RouteParentStatus] {
        &self.parents
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Entries for our gateway, or for a parent this pass wrote, are ours to replace.
    fn owns(&self, parent_ref: &ParentReference) -> bool {
        self.gateway_ref.as_ref().is_some_and(|gateway| parent_ref.is_ref_to_gateway(gateway, &self.fullname.namespace))
            || self.parents.iter().any(|p| p.parent_ref == *parent_ref)
    }

    fn merge_parents<P: ParentStatusEntry>(&self, live: Vec<P>) -> Vec<P> {
        let mut parents: Vec<P> = self
            .parents
            .iter()
            .map(|parent| {
                let existing = live.iter().filter(|p| p.parent_ref() == parent.parent_ref).flat_map(ParentStatusEntry::conditions);
                let conditions = resolve_conditions(parent.conditions.iter().cloned(), self.generation, &self.transition_time, existing);
                P::new(parent.parent_ref.clone(), parent.controller_name.clone(), conditions)
            })
            .collect();

        parents.extend(live.into_iter().filter(|p| !self.owns(&p.parent_ref())));
        parents
    }

    fn mutate_route<R: RouteResource>(&self, mut route: R) -> StatusObject {
        let live = route.take_parents();
        route.set_parents(self.merge_parents(live));
        route.into_object()
    }
}

/// Writes conditions for one parent of a [`RouteStatusUpdate`].
pub struct RouteParentStatusUpdate<'a> {
    update: &'a mut RouteStatusUpdate,
    parent_ref: ParentReference,
}

impl RouteParentStatusUpdate<'_> {
    pub fn add_condition(&mut self, condition_type: RouteConditionType, status: ConditionStatus, reason: RouteConditionReason, message: &str) -> Condition {
        let RouteStatusUpdate { generation, transition_time, gateway_controller, parents, .. } = &mut *self.update;
        let index = match parents.iter().position(|p| p.parent_ref == self.parent_ref) {
            Some(index) => index,
            None => {
                parents.push(RouteParentStatus { parent_ref: self.parent_ref.clone(), controller_name: gateway_controller.clone(), conditions: vec![] });
                parents.len() - 1
            },
        };
        upsert_condition(&mut parents[index].conditions, condition_type.as_str(), status, reason.as_str(), message, *generation, transition_time)
    }

    pub fn parent_ref(&self) -> &ParentReference {
        &self.parent_ref
    }

    pub fn conditions(&self) -> &[Condition] {
        self.update.conditions_for_parent_ref(&self.parent_ref)
    }
}

impl StatusMutator for RouteStatusUpdate {
    fn mutate(&self, object: StatusObject) -> StatusObject {
        match object {
            StatusObject::HttpRoute(route) if self.kind == RouteKind::Http => self.mutate_route(route),
            StatusObject::TlsRoute(route) if self.kind == RouteKind::Tls => self.mutate_route(route),
            StatusObject::GrpcRoute(route) if self.kind == RouteKind::Grpc => self.mutate_route(route),
            StatusObject::TcpRoute(route) if self.kind == RouteKind::Tcp => self.mutate_route(route),
            other => unexpected_object(&self.kind.to_string(), &other),
        }
    }
}
