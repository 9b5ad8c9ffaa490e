// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

//! projectcontour.io resources.

use k8s_openapi::{api::core::v1::LoadBalancerStatus, apimachinery::pkg::apis::meta::v1::Time};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::ConditionStatus;

pub const CONTOUR_API_GROUP: &str = "projectcontour.io";

pub const VALID_CONDITION: &str = "Valid";
pub const ORPHANED_ERROR: &str = "Orphaned";

const ERROR_PRESENT_REASON: &str = "ErrorPresent";
const ERROR_PRESENT_MESSAGE: &str = "At least one error present, see Errors for details";
const WARNING_PRESENT_REASON: &str = "WarningPresent";
const WARNING_PRESENT_MESSAGE: &str = "At least one warning present, see Warnings for details";

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SubCondition {
    #[serde(rename = "type")]
    pub type_: String,
    pub status: String,
    pub reason: String,
    pub message: String,
}

/// A condition carrying the individual errors and warnings that produced it.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DetailedCondition {
    #[serde(rename = "type")]
    pub type_: String,
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
    pub last_transition_time: Time,
    pub reason: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<SubCondition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<SubCondition>,
}

impl DetailedCondition {
    pub fn is_status(&self, status: ConditionStatus) -> bool {
        self.status == status.as_str()
    }

    /// Flips the condition to False and records the error. Errors of the same type accumulate their messages.
    pub fn add_error(&mut self, error_type: &str, reason: &str, message: &str) {
        self.status = ConditionStatus::False.to_string();
        ERROR_PRESENT_REASON.clone_into(&mut self.reason);
        ERROR_PRESENT_MESSAGE.clone_into(&mut self.message);
        upsert_sub_condition(&mut self.errors, error_type, reason, message);
    }

    pub fn add_warning(&mut self, warning_type: &str, reason: &str, message: &str) {
        if self.errors.is_empty() {
            WARNING_PRESENT_REASON.clone_into(&mut self.reason);
            WARNING_PRESENT_MESSAGE.clone_into(&mut self.message);
        }
        upsert_sub_condition(&mut self.warnings, warning_type, reason, message);
    }

    pub fn get_error(&self, error_type: &str) -> Option<&SubCondition> {
        self.errors.iter().find(|e| e.type_ == error_type)
    }

    pub fn get_warning(&self, warning_type: &str) -> Option<&SubCondition> {
        self.warnings.iter().find(|w| w.type_ == warning_type)
    }
}

fn upsert_sub_condition(sub_conditions: &mut Vec<SubCondition>, type_: &str, reason: &str, message: &str) {
    if let Some(existing) = sub_conditions.iter_mut().find(|s| s.type_ == type_) {
        existing.message = format!("{}, {message}", existing.message);
        reason.clone_into(&mut existing.reason);
    } else {
        sub_conditions.push(SubCondition {
            type_: type_.to_owned(),
            status: ConditionStatus::True.to_string(),
            reason: reason.to_owned(),
            message: message.to_owned(),
        });
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VirtualHost {
    pub fqdn: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Include {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HTTPProxyStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_balancer: Option<LoadBalancerStatus>,
    #[serde(default)]
    pub conditions: Vec<DetailedCondition>,
}

impl HTTPProxyStatus {
    pub fn condition_for(&self, type_: &str) -> Option<&DetailedCondition> {
        self.conditions.iter().find(|c| c.type_ == type_)
    }
}

#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "projectcontour.io",
    version = "v1",
    kind = "HTTPProxy",
    plural = "httpproxies",
    namespaced,
    status = "HTTPProxyStatus",
    derive = "PartialEq"
)]
#[serde(rename_all = "camelCase")]
pub struct HTTPProxySpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virtualhost: Option<VirtualHost>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub includes: Vec<Include>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionServiceTarget {
    pub name: String,
    pub port: i32,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionServiceStatus {
    #[serde(default)]
    pub conditions: Vec<DetailedCondition>,
}

#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "projectcontour.io",
    version = "v1alpha1",
    kind = "ExtensionService",
    plural = "extensionservices",
    namespaced,
    status = "ExtensionServiceStatus",
    derive = "PartialEq"
)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionServiceSpec {
    #[serde(default)]
    pub services: Vec<ExtensionServiceTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}
