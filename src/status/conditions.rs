// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use std::collections::{BTreeMap, BTreeSet};

use k8s_openapi::apimachinery::pkg::apis::meta::v1::{Condition, Time};

use crate::apis::{contour::VALID_CONDITION, ConditionStatus, DetailedCondition};

/// Detailed conditions for one object, created on first use.
#[derive(Clone, Debug, PartialEq)]
pub struct ConditionCache {
    kind: &'static str,
    generation: i64,
    conditions: BTreeMap<String, DetailedCondition>,
    added: BTreeSet<String>,
}

impl ConditionCache {
    pub fn new(kind: &'static str, generation: i64) -> Self {
        Self { kind, generation, conditions: BTreeMap::new(), added: BTreeSet::new() }
    }

    /// Returns the condition of the given type, creating the default one if it does not exist yet.
    /// `Valid` defaults to True, everything else to Unknown.
    pub fn condition_for(&mut self, condition_type: &str) -> &mut DetailedCondition {
        let kind = self.kind;
        let generation = self.generation;
        self.conditions.entry(condition_type.to_owned()).or_insert_with(|| {
            if condition_type == VALID_CONDITION {
                DetailedCondition {
                    type_: condition_type.to_owned(),
                    status: ConditionStatus::True.to_string(),
                    observed_generation: Some(generation),
                    reason: VALID_CONDITION.to_owned(),
                    message: format!("Valid {kind}"),
                    ..Default::default()
                }
            } else {
                DetailedCondition {
                    type_: condition_type.to_owned(),
                    status: ConditionStatus::Unknown.to_string(),
                    observed_generation: Some(generation),
                    ..Default::default()
                }
            }
        })
    }

    /// Overwrites status and reason; a second call for the same type in this pass appends its message.
    pub fn add_condition(&mut self, condition_type: &str, status: ConditionStatus, reason: &str, message: &str) -> DetailedCondition {
        let concatenate = !self.added.insert(condition_type.to_owned());
        let condition = self.condition_for(condition_type);
        condition.status = status.to_string();
        reason.clone_into(&mut condition.reason);
        if concatenate {
            condition.message = format!("{}, {message}", condition.message);
        } else {
            message.clone_into(&mut condition.message);
        }
        condition.clone()
    }

    pub fn get(&self, condition_type: &str) -> Option<&DetailedCondition> {
        self.conditions.get(condition_type)
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn generation(&self) -> i64 {
        self.generation
    }

    pub fn conditions(&self) -> impl Iterator<Item = &DetailedCondition> {
        self.conditions.values()
    }
}

/// A condition stamped with the generation it was computed for.
pub(crate) trait ObservedCondition: Clone {
    fn condition_type(&self) -> &str;

    fn generation(&self) -> i64;

    fn observe(&mut self, generation: i64, transition_time: &Time);
}

impl ObservedCondition for Condition {
    fn condition_type(&self) -> &str {
        &self.type_
    }

    fn generation(&self) -> i64 {
        self.observed_generation.unwrap_or_default()
    }

    fn observe(&mut self, generation: i64, transition_time: &Time) {
        self.observed_generation = Some(generation);
        self.last_transition_time = transition_time.clone();
    }
}

impl ObservedCondition for DetailedCondition {
    fn condition_type(&self) -> &str {
        &self.type_
    }

    fn generation(&self) -> i64 {
        self.observed_generation.unwrap_or_default()
    }

    fn observe(&mut self, generation: i64, transition_time: &Time) {
        self.observed_generation = Some(generation);
        self.last_transition_time = transition_time.clone();
    }
}

/// Stamps every computed condition with the pass generation and time. When one of the `existing`
/// conditions of the same type was observed for a newer generation it is written instead.
pub(crate) fn resolve_conditions<'a, C>(computed: impl IntoIterator<Item = C>, generation: i64, transition_time: &Time, existing: impl IntoIterator<Item = &'a C> + Clone) -> Vec<C>
where
    C: ObservedCondition + 'a,
{
    computed
        .into_iter()
        .map(|mut condition| {
            let newer = existing
                .clone()
                .into_iter()
                .filter(|e| e.condition_type() == condition.condition_type())
                .max_by_key(|e| e.generation())
                .filter(|e| e.generation() > generation);
            if let Some(newer) = newer {
                newer.clone()
            } else {
                condition.observe(generation, transition_time);
                condition
            }
        })
        .collect()
}

/// Upserts a condition by type. An existing condition of the same type keeps its position and has
/// the new message appended to its own.
pub(crate) fn upsert_condition(
    conditions: &mut Vec<Condition>,
    condition_type: &str,
    status: ConditionStatus,
    reason: &str,
    message: &str,
    generation: i64,
    transition_time: &Time,
) -> Condition {
    let position = conditions.iter().position(|c| c.type_ == condition_type);
    let message = match position {
        Some(index) => format!("{}, {message}", conditions[index].message),
        None => message.to_owned(),
    };
    let condition = Condition {
        type_: condition_type.to_owned(),
        status: status.to_string(),
        reason: reason.to_owned(),
        message,
        observed_generation: Some(generation),
        last_transition_time: transition_time.clone(),
    };
    match position {
        Some(index) => conditions[index] = condition.clone(),
        None => conditions.push(condition.clone()),
    }
    condition
}

#[cfg(test)]
mod tests {
    use k8s_openapi::chrono::DateTime;

    use super::*;

    fn time(seconds: i64) -> Time {
        Time(DateTime::from_timestamp(seconds, 0).unwrap())
    }

    #[test]
    fn valid_condition_defaults_to_true() {
        let mut cache = ConditionCache::new("HTTPProxy", 4);
        let valid = cache.condition_for(VALID_CONDITION);
        assert!(valid.is_status(ConditionStatus::True));
        assert_eq!(valid.reason, "Valid");
        assert_eq!(valid.message, "Valid HTTPProxy");
        assert_eq!(valid.observed_generation, Some(4));

        let other = cache.condition_for("Ready");
        assert!(other.is_status(ConditionStatus::Unknown));
        assert!(other.reason.is_empty());
    }

    #[test]
    fn repeated_detailed_conditions_concatenate() {
        let mut cache = ConditionCache::new("ExtensionService", 1);
        cache.condition_for(VALID_CONDITION);
        cache.add_condition(VALID_CONDITION, ConditionStatus::False, "ServiceUnresolvedReference", "service one not found");
        let valid = cache.add_condition(VALID_CONDITION, ConditionStatus::False, "ServiceUnresolvedReference", "service two not found");
        assert_eq!(valid.message, "service one not found, service two not found");
        assert_eq!(cache.get(VALID_CONDITION), Some(&valid));
    }

    #[test]
    fn upsert_keeps_last_status_and_joins_messages() {
        let mut conditions = vec![];
        upsert_condition(&mut conditions, "Accepted", ConditionStatus::True, "Accepted", "first", 2, &time(10));
        upsert_condition(&mut conditions, "ResolvedRefs", ConditionStatus::True, "ResolvedRefs", "refs", 2, &time(10));
        let accepted = upsert_condition(&mut conditions, "Accepted", ConditionStatus::False, "NotAllowedByListeners", "second", 2, &time(10));

        assert_eq!(conditions.len(), 2);
        assert_eq!(conditions[0], accepted);
        assert_eq!(accepted.message, "first, second");
        assert_eq!(accepted.status, "False");
        assert_eq!(accepted.reason, "NotAllowedByListeners");
    }

    #[test]
    fn newer_existing_condition_wins() {
        let mut computed = vec![];
        upsert_condition(&mut computed, "Accepted", ConditionStatus::True, "Accepted", "computed", 0, &time(0));
        upsert_condition(&mut computed, "Programmed", ConditionStatus::True, "Programmed", "computed", 0, &time(0));

        let mut existing = vec![];
        upsert_condition(&mut existing, "Accepted", ConditionStatus::False, "Invalid", "newer", 6, &time(5));
        upsert_condition(&mut existing, "Programmed", ConditionStatus::False, "Invalid", "older", 4, &time(5));

        let resolved = resolve_conditions(computed, 5, &time(20), existing.iter());
        assert_eq!(resolved[0], existing[0]);
        assert_eq!(resolved[1].message, "computed");
        assert_eq!(resolved[1].observed_generation, Some(5));
        assert_eq!(resolved[1].last_transition_time, time(20));
    }
}
