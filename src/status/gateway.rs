// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::{Condition, Time};

use super::{
    conditions::{resolve_conditions, upsert_condition},
    update::{unexpected_object, StatusMutator},
};
use crate::{
    apis::{
        gateway::{GatewayConditionReason, GatewayConditionType, ListenerConditionReason, ListenerConditionType},
        ConditionStatus, GatewayStatusListeners, GatewayStatusListenersSupportedKinds,
    },
    common::{NamespacedName, StatusObject},
};

/// Gateway and listener conditions computed during a pass.
#[derive(Clone, Debug, PartialEq)]
pub struct GatewayStatusUpdate {
    pub fullname: NamespacedName,
    pub generation: i64,
    pub transition_time: Time,
    /// Conditions present on the Gateway when the pass started.
    pub existing_conditions: Vec<Condition>,
    conditions: Vec<Condition>,
    listeners: BTreeMap<String, GatewayStatusListeners>,
}

impl GatewayStatusUpdate {
    pub fn new(fullname: NamespacedName, generation: i64, existing_conditions: Vec<Condition>, transition_time: Time) -> Self {
        Self { fullname, generation, transition_time, existing_conditions, conditions: vec![], listeners: BTreeMap::new() }
    }

    pub fn add_condition(&mut self, condition_type: GatewayConditionType, status: ConditionStatus, reason: GatewayConditionReason, message: &str) -> Condition {
        upsert_condition(&mut self.conditions, condition_type.as_str(), status, reason.as_str(), message, self.generation, &self.transition_time)
    }

    pub fn set_listener_supported_kinds(&mut self, listener_name: &str, kinds: Vec<GatewayStatusListenersSupportedKinds>) {
        self.listener(listener_name).supported_kinds = kinds;
    }

    pub fn set_listener_attached_routes(&mut self, listener_name: &str, attached_routes: i32) {
        self.listener(listener_name).attached_routes = attached_routes;
    }

    pub fn add_listener_condition(
        &mut self,
        listener_name: &str,
        condition_type: ListenerConditionType,
        status: ConditionStatus,
        reason: ListenerConditionReason,
        message: &str,
    ) -> Condition {
        let generation = self.generation;
        let transition_time = self.transition_time.clone();
        let listener = self.listener(listener_name);
        upsert_condition(&mut listener.conditions, condition_type.as_str(), status, reason.as_str(), message, generation, &transition_time)
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn listener_status(&self, listener_name: &str) -> Option<&GatewayStatusListeners> {
        self.listeners.get(listener_name)
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty() && self.listeners.is_empty()
    }

    fn listener(&mut self, listener_name: &str) -> &mut GatewayStatusListeners {
        self.listeners.entry(listener_name.to_owned()).or_insert_with(|| GatewayStatusListeners { name: listener_name.to_owned(), ..Default::default() })
    }
}

impl StatusMutator for GatewayStatusUpdate {
    fn mutate(&self, object: StatusObject) -> StatusObject {
        let mut gateway = match object {
            StatusObject::Gateway(gateway) => gateway,
            other => unexpected_object("Gateway", &other),
        };

        let mut status = gateway.status.take().unwrap_or_default();
        let existing = status.conditions.iter().flatten().chain(self.existing_conditions.iter());
        let conditions = resolve_conditions(self.conditions.iter().cloned(), self.generation, &self.transition_time, existing);
        status.conditions = Some(conditions);

        // listener status is rewritten in full
        let listeners = self
            .listeners
            .values()
            .cloned()
            .map(|mut listener| {
                for condition in &mut listener.conditions {
                    condition.observed_generation = Some(self.generation);
                    condition.last_transition_time = self.transition_time.clone();
                }
                listener
            })
            .collect();
        status.listeners = Some(listeners);

        gateway.status = Some(status);
        StatusObject::Gateway(gateway)
    }
}

#[cfg(test)]
mod tests {
    use k8s_openapi::chrono::DateTime;

    use super::*;
    use crate::apis::{route_group_kind, Gateway, GatewayStatus};

    fn time(seconds: i64) -> Time {
        Time(DateTime::from_timestamp(seconds, 0).unwrap())
    }

    fn mutate(update: &GatewayStatusUpdate, gateway: Gateway) -> GatewayStatus {
        match update.mutate(StatusObject::Gateway(gateway)) {
            StatusObject::Gateway(gateway) => gateway.status.unwrap(),
            other => panic!("unexpected {}", other.kind()),
        }
    }

    fn live_gateway() -> Gateway {
        serde_yaml::from_str(
            r"
apiVersion: gateway.networking.k8s.io/v1
kind: Gateway
metadata:
  name: contour
  namespace: projectcontour
  generation: 2
spec:
  gatewayClassName: contour
  listeners:
  - name: https
    port: 443
    protocol: HTTPS
  - name: http
    port: 80
    protocol: HTTP
status:
  addresses:
  - type: IPAddress
    value: 10.0.0.1
  conditions:
  - type: Accepted
    status: 'True'
    reason: Accepted
    message: Gateway is accepted
    observedGeneration: 1
    lastTransitionTime: '2024-01-01T00:00:00Z'
  listeners:
  - name: stale
    attachedRoutes: 4
    supportedKinds: []
    conditions: []
",
        )
        .unwrap()
    }

    #[test]
    fn empty_until_something_is_recorded() {
        let mut update = GatewayStatusUpdate::new(NamespacedName::new("projectcontour", "contour"), 2, vec![], time(100));
        assert!(update.is_empty());
        update.set_listener_attached_routes("http", 0);
        assert!(!update.is_empty());
    }

    #[test]
    fn listeners_are_rewritten_and_sorted() {
        let mut update = GatewayStatusUpdate::new(NamespacedName::new("projectcontour", "contour"), 2, vec![], time(100));
        update.add_condition(GatewayConditionType::Accepted, ConditionStatus::True, GatewayConditionReason::Accepted, "Gateway is accepted");
        update.set_listener_supported_kinds("https", vec![route_group_kind("HTTPRoute"), route_group_kind("GRPCRoute")]);
        update.set_listener_attached_routes("https", 3);
        update.add_listener_condition("http", ListenerConditionType::Programmed, ConditionStatus::True, ListenerConditionReason::Programmed, "Valid listener");
        update.add_listener_condition("http", ListenerConditionType::ResolvedRefs, ConditionStatus::False, ListenerConditionReason::InvalidRouteKinds, "kind TCPRoute is not supported");
        let condition =
            update.add_listener_condition("http", ListenerConditionType::ResolvedRefs, ConditionStatus::False, ListenerConditionReason::InvalidRouteKinds, "kind UDPRoute is not supported");
        assert_eq!(condition.message, "kind TCPRoute is not supported, kind UDPRoute is not supported");

        let status = mutate(&update, live_gateway());
        let listeners = status.listeners.unwrap();
        let names: Vec<_> = listeners.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["http", "https"]);
        assert_eq!(listeners[0].conditions.len(), 2);
        assert_eq!(listeners[1].attached_routes, 3);
        assert_eq!(listeners[1].supported_kinds.len(), 2);
        assert_eq!(status.addresses.map(|a| a.len()), Some(1));
        let conditions = status.conditions.unwrap();
        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions[0].observed_generation, Some(2));
        assert_eq!(conditions[0].last_transition_time, time(100));
    }

    #[test]
    fn newer_existing_condition_is_kept() {
        let mut existing = vec![];
        upsert_condition(&mut existing, "Programmed", ConditionStatus::False, "AddressNotAssigned", "written by a newer pass", 3, &time(50));

        let mut update = GatewayStatusUpdate::new(NamespacedName::new("projectcontour", "contour"), 2, existing.clone(), time(100));
        update.add_condition(GatewayConditionType::Programmed, ConditionStatus::True, GatewayConditionReason::Programmed, "Gateway is programmed");
        update.add_condition(GatewayConditionType::Accepted, ConditionStatus::True, GatewayConditionReason::Accepted, "Gateway is accepted");

        let conditions = mutate(&update, live_gateway()).conditions.unwrap();
        assert_eq!(conditions[0], existing[0]);
        assert_eq!(conditions[1].message, "Gateway is accepted");
        assert_eq!(conditions[1].observed_generation, Some(2));
    }
}
