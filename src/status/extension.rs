// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;

use super::{
    conditions::{resolve_conditions, ConditionCache},
    update::{unexpected_object, StatusMutator},
};
use crate::{
    apis::{contour::ExtensionServiceStatus, ConditionStatus, DetailedCondition},
    common::{NamespacedName, ObjectKind, StatusObject},
};

/// Conditions computed for one ExtensionService during a pass.
#[derive(Clone, Debug, PartialEq)]
pub struct ExtensionCacheEntry {
    pub fullname: NamespacedName,
    pub transition_time: Time,
    conditions: ConditionCache,
}

impl ExtensionCacheEntry {
    pub fn new(fullname: NamespacedName, generation: i64, transition_time: Time) -> Self {
        Self { fullname, transition_time, conditions: ConditionCache::new("ExtensionService", generation) }
    }

    pub fn generation(&self) -> i64 {
        self.conditions.generation()
    }

    pub fn condition_for(&mut self, condition_type: &str) -> &mut DetailedCondition {
        self.conditions.condition_for(condition_type)
    }

    pub fn add_condition(&mut self, condition_type: &str, status: ConditionStatus, reason: &str, message: &str) -> DetailedCondition {
        self.conditions.add_condition(condition_type, status, reason, message)
    }

    pub fn get_condition(&self, condition_type: &str) -> Option<&DetailedCondition> {
        self.conditions.get(condition_type)
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

impl StatusMutator for ExtensionCacheEntry {
    fn mutate(&self, object: StatusObject) -> StatusObject {
        let mut extension = match object {
            StatusObject::ExtensionService(extension) => extension,
            other => unexpected_object("ExtensionService", &other),
        };

        let live = extension.status.take().unwrap_or_default();
        let conditions = resolve_conditions(self.conditions.conditions().cloned(), self.generation(), &self.transition_time, live.conditions.iter());
        extension.status = Some(ExtensionServiceStatus { conditions });
        StatusObject::ExtensionService(extension)
    }
}

/// Entries for kinds without a dedicated map in the cache.
#[derive(Clone, Debug, PartialEq)]
pub enum CacheEntry {
    Extension(ExtensionCacheEntry),
}

impl CacheEntry {
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Extension(_) => ObjectKind::ExtensionService,
        }
    }

    pub fn fullname(&self) -> &NamespacedName {
        match self {
            Self::Extension(entry) => &entry.fullname,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Extension(entry) => entry.is_empty(),
        }
    }
}

impl From<ExtensionCacheEntry> for CacheEntry {
    fn from(entry: ExtensionCacheEntry) -> Self {
        Self::Extension(entry)
    }
}

impl StatusMutator for CacheEntry {
    fn mutate(&self, object: StatusObject) -> StatusObject {
        match self {
            Self::Extension(entry) => entry.mutate(object),
        }
    }
}
