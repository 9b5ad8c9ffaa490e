// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use itertools::Itertools;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{Condition, Time};
use kube::ResourceExt;

use super::update::{unexpected_object, StatusMutator, StatusUpdate};
use crate::{
    apis::{
        gateway::{GatewayClassConditionReason, GatewayClassConditionType},
        ConditionStatus, GatewayClass, GatewayClassStatus,
    },
    common::{NamespacedName, StatusObject, StatusTarget},
};

const ACCEPTED_MESSAGE: &str = "GatewayClass has been accepted by the controller";
const INVALID_PARAMETERS_MESSAGE: &str = "Invalid ParametersRef, must be a reference to an existing namespaced projectcontour.io/ContourDeployment resource";

fn condition_changed(current: &Condition, update: &Condition) -> bool {
    current.status != update.status || current.reason != update.reason || current.message != update.message || current.observed_generation != update.observed_generation
}

/// Merges `updates` into `current` by type. The transition time of an existing condition only moves
/// when its status flips; unknown types are appended in order.
pub fn merge_conditions(mut current: Vec<Condition>, updates: impl IntoIterator<Item = Condition>) -> Vec<Condition> {
    let mut additions = vec![];
    for update in updates {
        if let Some(existing) = current.iter_mut().find(|c| c.type_ == update.type_) {
            if condition_changed(existing, &update) {
                if existing.status != update.status {
                    existing.last_transition_time = update.last_transition_time;
                }
                existing.status = update.status;
                existing.reason = update.reason;
                existing.message = update.message;
                existing.observed_generation = update.observed_generation;
            }
        } else {
            additions.push(update);
        }
    }
    current.extend(additions);
    current
}

/// Structural equality of two condition lists, ignoring order but not transition times.
pub fn conditions_equal(a: &[Condition], b: &[Condition]) -> bool {
    a.len() == b.len() && a.iter().sorted_by(|x, y| x.type_.cmp(&y.type_)).eq(b.iter().sorted_by(|x, y| x.type_.cmp(&y.type_)))
}

pub fn gateway_class_status_equal(a: Option<&GatewayClassStatus>, b: Option<&GatewayClassStatus>) -> bool {
    let conditions = |status: Option<&GatewayClassStatus>| status.and_then(|s| s.conditions.clone()).unwrap_or_default();
    conditions_equal(&conditions(a), &conditions(b))
}

pub fn compute_gateway_class_accepted_condition(gateway_class: &GatewayClass, accepted: bool, transition_time: Time) -> Condition {
    let (status, reason, message) = if accepted {
        (ConditionStatus::True, GatewayClassConditionReason::Accepted, ACCEPTED_MESSAGE)
    } else {
        (ConditionStatus::False, GatewayClassConditionReason::InvalidParameters, INVALID_PARAMETERS_MESSAGE)
    };
    Condition {
        type_: GatewayClassConditionType::Accepted.to_string(),
        status: status.to_string(),
        reason: reason.to_string(),
        message: message.to_owned(),
        observed_generation: gateway_class.metadata.generation,
        last_transition_time: transition_time,
    }
}

/// Returns a copy of the GatewayClass with its Accepted condition merged in.
#[must_use]
pub fn set_gateway_class_accepted(gateway_class: &GatewayClass, accepted: bool, transition_time: Time) -> GatewayClass {
    let condition = compute_gateway_class_accepted_condition(gateway_class, accepted, transition_time);
    accept(gateway_class.clone(), &condition)
}

fn accept(mut gateway_class: GatewayClass, condition: &Condition) -> GatewayClass {
    let mut status = gateway_class.status.take().unwrap_or_default();
    status.conditions = Some(merge_conditions(status.conditions.take().unwrap_or_default(), [condition.clone()]));
    gateway_class.status = Some(status);
    gateway_class
}

#[derive(Clone, Debug, PartialEq)]
struct GatewayClassAccepted {
    condition: Condition,
}

impl StatusMutator for GatewayClassAccepted {
    fn mutate(&self, object: StatusObject) -> StatusObject {
        match object {
            StatusObject::GatewayClass(gateway_class) => StatusObject::GatewayClass(accept(gateway_class, &self.condition)),
            other => unexpected_object("GatewayClass", &other),
        }
    }
}

/// A status update writing the Accepted condition of a GatewayClass.
pub fn gateway_class_accepted_update(gateway_class: &GatewayClass, accepted: bool, transition_time: Time) -> StatusUpdate {
    let condition = compute_gateway_class_accepted_condition(gateway_class, accepted, transition_time);
    StatusUpdate::new(NamespacedName::cluster(&gateway_class.name_any()), GatewayClass::KIND, GatewayClassAccepted { condition })
}
