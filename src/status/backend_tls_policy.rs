// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use k8s_openapi::apimachinery::pkg::apis::meta::v1::{Condition, Time};

use super::{
    conditions::{resolve_conditions, upsert_condition},
    update::{unexpected_object, StatusMutator},
};
use crate::{
    apis::{
        gateway::{BackendTLSPolicyStatusAncestors, PolicyConditionReason, PolicyConditionType},
        BackendTLSPolicyStatus, ConditionStatus, ParentReference, ParentStatusEntry,
    },
    common::{NamespacedName, StatusObject},
};

/// Conditions this controller computed for one ancestor of a policy.
#[derive(Clone, Debug, PartialEq)]
pub struct PolicyAncestorStatus {
    pub ancestor_ref: ParentReference,
    pub controller_name: String,
    pub conditions: Vec<Condition>,
}

/// Ancestor conditions computed for one BackendTLSPolicy during a pass.
#[derive(Clone, Debug, PartialEq)]
pub struct BackendTlsPolicyStatusUpdate {
    pub fullname: NamespacedName,
    pub generation: i64,
    pub transition_time: Time,
    gateway_ref: Option<NamespacedName>,
    gateway_controller: String,
    ancestors: Vec<PolicyAncestorStatus>,
}

impl BackendTlsPolicyStatusUpdate {
    pub fn new(fullname: NamespacedName, generation: i64, transition_time: Time, gateway_ref: Option<NamespacedName>, gateway_controller: &str) -> Self {
        Self { fullname, generation, transition_time, gateway_ref, gateway_controller: gateway_controller.to_owned(), ancestors: vec![] }
    }

    pub fn status_update_for(&mut self, ancestor_ref: ParentReference) -> BackendTlsPolicyAncestorStatusUpdate<'_> {
        BackendTlsPolicyAncestorStatusUpdate { update: self, ancestor_ref }
    }

    pub fn conditions_for_ancestor_ref(&self, ancestor_ref: &ParentReference) -> &[Condition] {
        self.ancestors.iter().find(|a| a.ancestor_ref == *ancestor_ref).map(|a| a.conditions.as_slice()).unwrap_or_default()
    }

    pub fn policy_ancestor_statuses(&self) -> &[PolicyAncestorStatus] {
        &self.ancestors
    }

    pub fn is_empty(&self) -> bool {
        self.ancestors.is_empty()
    }

    fn owns(&self, ancestor_ref: &ParentReference) -> bool {
        self.gateway_ref.as_ref().is_some_and(|gateway| ancestor_ref.is_ref_to_gateway(gateway, &self.fullname.namespace))
            || self.ancestors.iter().any(|a| a.ancestor_ref == *ancestor_ref)
    }
}

pub struct BackendTlsPolicyAncestorStatusUpdate<'a> {
    update: &'a mut BackendTlsPolicyStatusUpdate,
    ancestor_ref: ParentReference,
}

impl BackendTlsPolicyAncestorStatusUpdate<'_> {
    pub fn add_condition(&mut self, condition_type: PolicyConditionType, status: ConditionStatus, reason: PolicyConditionReason, message: &str) -> Condition {
        let BackendTlsPolicyStatusUpdate { generation, transition_time, gateway_controller, ancestors, .. } = &mut *self.update;
        let index = if let Some(index) = ancestors.iter().position(|a| a.ancestor_ref == self.ancestor_ref) {
            index
        } else {
            ancestors.push(PolicyAncestorStatus { ancestor_ref: self.ancestor_ref.clone(), controller_name: gateway_controller.clone(), conditions: vec![] });
            ancestors.len() - 1
        };
        upsert_condition(&mut ancestors[index].conditions, condition_type.as_str(), status, reason.as_str(), message, *generation, transition_time)
    }

    pub fn conditions(&self) -> &[Condition] {
        self.update.conditions_for_ancestor_ref(&self.ancestor_ref)
    }
}

impl StatusMutator for BackendTlsPolicyStatusUpdate {
    fn mutate(&self, object: StatusObject) -> StatusObject {
        let mut policy = match object {
            StatusObject::BackendTlsPolicy(policy) => policy,
            other => unexpected_object("BackendTLSPolicy", &other),
        };

        let live = policy.status.take().map(|status| status.ancestors).unwrap_or_default();
        let mut ancestors: Vec<BackendTLSPolicyStatusAncestors> = self
            .ancestors
            .iter()
            .map(|ancestor| {
                let existing = live.iter().filter(|a| a.parent_ref() == ancestor.ancestor_ref).flat_map(ParentStatusEntry::conditions);
                let conditions = resolve_conditions(ancestor.conditions.iter().cloned(), self.generation, &self.transition_time, existing);
                BackendTLSPolicyStatusAncestors::new(ancestor.ancestor_ref.clone(), ancestor.controller_name.clone(), conditions)
            })
            .collect();
        ancestors.extend(live.into_iter().filter(|a| !self.owns(&a.parent_ref())));

        policy.status = Some(BackendTLSPolicyStatus { ancestors });
        StatusObject::BackendTlsPolicy(policy)
    }
}

#[cfg(test)]
mod tests {
    use k8s_openapi::chrono::DateTime;

    use super::*;
    use crate::apis::BackendTLSPolicy;

    fn live_policy() -> BackendTLSPolicy {
        serde_yaml::from_str(
            r"
apiVersion: gateway.networking.k8s.io/v1alpha3
kind: BackendTLSPolicy
metadata:
  name: backend-tls
  namespace: default
  generation: 4
spec:
  targetRefs:
  - group: ''
    kind: Service
    name: echo
  validation:
    hostname: echo.example.com
    wellKnownCACertificates: System
status:
  ancestors:
  - ancestorRef:
      name: contour
      namespace: projectcontour
    controllerName: projectcontour.io/gateway-controller
    conditions:
    - type: Accepted
      status: 'True'
      reason: Accepted
      message: written by a newer pass
      observedGeneration: 5
      lastTransitionTime: '2024-01-01T00:00:00Z'
  - ancestorRef:
      name: internal
      namespace: other
    controllerName: example.com/other-controller
    conditions: []
  - ancestorRef:
      name: contour
    controllerName: example.com/other-controller
    conditions: []
",
        )
        .unwrap()
    }

    fn update() -> BackendTlsPolicyStatusUpdate {
        BackendTlsPolicyStatusUpdate::new(
            NamespacedName::new("default", "backend-tls"),
            4,
            Time(DateTime::from_timestamp(3_000, 0).unwrap()),
            Some(NamespacedName::new("projectcontour", "contour")),
            "projectcontour.io/gateway-controller",
        )
    }

    fn mutate(update: &BackendTlsPolicyStatusUpdate, policy: BackendTLSPolicy) -> BackendTLSPolicyStatus {
        match update.mutate(StatusObject::BackendTlsPolicy(policy)) {
            StatusObject::BackendTlsPolicy(policy) => policy.status.unwrap(),
            other => panic!("unexpected {}", other.kind()),
        }
    }

    #[test]
    fn stale_ancestor_conditions_are_not_written() {
        let ancestor = ParentReference { name: "contour".to_owned(), namespace: Some("projectcontour".to_owned()), ..Default::default() };
        let mut update = update();
        let mut ancestor_update = update.status_update_for(ancestor.clone());
        ancestor_update.add_condition(PolicyConditionType::Accepted, ConditionStatus::False, PolicyConditionReason::Invalid, "invalid CACertificateRef");
        assert_eq!(ancestor_update.conditions().len(), 1);
        assert_eq!(update.conditions_for_ancestor_ref(&ancestor)[0].reason, "Invalid");

        let status = mutate(&update, live_policy());
        assert_eq!(status.ancestors.len(), 3);
        assert_eq!(status.ancestors[0].conditions()[0].message, "written by a newer pass");
        assert_eq!(status.ancestors[0].conditions()[0].observed_generation, Some(5));
        assert_eq!(status.ancestors[1].ancestor_ref.name, "internal");
    }

    #[test]
    fn ancestor_without_namespace_is_resolved_in_policy_namespace() {
        let mut update = update();
        update
            .status_update_for(ParentReference::gateway("projectcontour", "contour"))
            .add_condition(PolicyConditionType::Accepted, ConditionStatus::True, PolicyConditionReason::Accepted, "Accepted");

        let status = mutate(&update, live_policy());
        let ancestors: Vec<_> = status.ancestors.iter().map(|a| (a.ancestor_ref.namespace.as_deref(), a.ancestor_ref.name.as_str())).collect();
        assert_eq!(ancestors, [(Some("projectcontour"), "contour"), (Some("other"), "internal"), (None, "contour")]);
        assert_eq!(status.ancestors[2].controller_name, "example.com/other-controller");
    }
}
