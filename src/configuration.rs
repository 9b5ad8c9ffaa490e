// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use std::sync::Arc;

use kube::Client;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::mpsc;
use typed_builder::TypedBuilder;

use crate::{
    common::NamespacedName,
    patchers::StatusPatcherService,
    status::{Cache, Clock, StatusUpdate},
    Result,
};

const DEFAULT_FIELD_MANAGER: &str = "contour";

fn default_field_manager() -> String {
    DEFAULT_FIELD_MANAGER.to_owned()
}

fn default_patch_buffer() -> usize {
    16
}

fn default_max_conflict_retries() -> usize {
    5
}

#[derive(Debug, TypedBuilder, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    #[builder(setter(into))]
    pub controller_name: String,
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub gateway_ref: Option<NamespacedName>,
    #[builder(default = default_field_manager(), setter(into))]
    #[serde(default = "default_field_manager")]
    pub field_manager: String,
    #[builder(default = default_patch_buffer())]
    #[serde(default = "default_patch_buffer")]
    pub patch_buffer: usize,
    #[builder(default = default_max_conflict_retries())]
    #[serde(default = "default_max_conflict_retries")]
    pub max_conflict_retries: usize,
}

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("controller name must be not empty")]
    ControllerName,
    #[error("gateway reference must have a namespace and a name")]
    GatewayRef,
    #[error("field manager must be not empty")]
    FieldManager,
    #[error("patch buffer must be greater than zero")]
    PatchBuffer,
}

impl Configuration {
    pub fn validate(&self) -> Result<()> {
        if self.controller_name.is_empty() {
            return Err(ConfigurationError::ControllerName.into());
        }
        if let Some(gateway_ref) = &self.gateway_ref {
            if gateway_ref.namespace.is_empty() || gateway_ref.name.is_empty() {
                return Err(ConfigurationError::GatewayRef.into());
            }
        }
        if self.field_manager.is_empty() {
            return Err(ConfigurationError::FieldManager.into());
        }
        if self.patch_buffer == 0 {
            return Err(ConfigurationError::PatchBuffer.into());
        }
        Ok(())
    }

    /// A fresh cache for one reconciliation pass.
    pub fn cache(&self, clock: Arc<dyn Clock>) -> Cache {
        Cache::new(self.gateway_ref.clone(), &self.controller_name, clock)
    }

    pub fn status_patcher(&self, client: Client) -> (StatusPatcherService, mpsc::Sender<Vec<StatusUpdate>>) {
        let (service, sender) = StatusPatcherService::new(client, &self.field_manager, self.patch_buffer);
        (service.with_max_conflict_retries(self.max_conflict_retries), sender)
    }
}
