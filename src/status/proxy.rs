// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use std::fmt::Display;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;

use super::{
    conditions::{resolve_conditions, ConditionCache},
    update::{unexpected_object, StatusMutator},
};
use crate::{
    apis::{
        contour::{ORPHANED_ERROR, VALID_CONDITION},
        ConditionStatus, DetailedCondition,
    },
    common::{NamespacedName, StatusObject},
};

/// Legacy summary written to `currentStatus`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProxyStatus {
    Valid,
    Invalid,
    Orphaned,
}

impl ProxyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Invalid => "invalid",
            Self::Orphaned => "orphaned",
        }
    }
}

impl Display for ProxyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conditions computed for one HTTPProxy during a pass.
#[derive(Clone, Debug, PartialEq)]
pub struct ProxyUpdate {
    pub fullname: NamespacedName,
    pub generation: i64,
    pub transition_time: Time,
    pub vhost: Option<String>,
    conditions: ConditionCache,
}

impl ProxyUpdate {
    pub fn new(fullname: NamespacedName, generation: i64, transition_time: Time) -> Self {
        Self { fullname, generation, transition_time, vhost: None, conditions: ConditionCache::new("HTTPProxy", generation) }
    }

    pub fn condition_for(&mut self, condition_type: &str) -> &mut DetailedCondition {
        self.conditions.condition_for(condition_type)
    }

    pub fn add_condition(&mut self, condition_type: &str, status: ConditionStatus, reason: &str, message: &str) -> DetailedCondition {
        self.conditions.add_condition(condition_type, status, reason, message);
        let condition = self.conditions.condition_for(condition_type);
        condition.last_transition_time = self.transition_time.clone();
        condition.clone()
    }

    pub fn set_vhost(&mut self, fqdn: &str) {
        self.vhost = Some(fqdn.to_owned());
    }

    pub fn get_condition(&self, condition_type: &str) -> Option<&DetailedCondition> {
        self.conditions.get(condition_type)
    }

    pub fn conditions(&self) -> impl Iterator<Item = &DetailedCondition> {
        self.conditions.conditions()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Status and description derived from the Valid condition, if there is one.
    pub fn proxy_status(&self) -> Option<(ProxyStatus, String)> {
        self.get_condition(VALID_CONDITION).map(summarize)
    }
}

fn summarize(valid: &DetailedCondition) -> (ProxyStatus, String) {
    if valid.is_status(ConditionStatus::True) {
        (ProxyStatus::Valid, valid.message.clone())
    } else if let Some(orphaned) = valid.get_error(ORPHANED_ERROR) {
        (ProxyStatus::Orphaned, orphaned.message.clone())
    } else {
        (ProxyStatus::Invalid, valid.message.clone())
    }
}

impl StatusMutator for ProxyUpdate {
    fn mutate(&self, object: StatusObject) -> StatusObject {
        let mut proxy = match object {
            StatusObject::HttpProxy(proxy) => proxy,
            other => unexpected_object("HTTPProxy", &other),
        };

        let mut status = proxy.status.take().unwrap_or_default();
        let conditions = resolve_conditions(self.conditions().cloned(), self.generation, &self.transition_time, status.conditions.iter());
        status.conditions = conditions;
        if let Some((current_status, description)) = status.condition_for(VALID_CONDITION).map(summarize) {
            status.current_status = Some(current_status.to_string());
            status.description = Some(description);
        }
        proxy.status = Some(status);
        StatusObject::HttpProxy(proxy)
    }
}
