// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

//! Status condition cache and merge engine for Contour style ingress controllers.
//!
//! A [`status::Cache`] collects the conditions computed for HTTPProxies, Gateways, routes,
//! BackendTLSPolicies and ExtensionServices during one reconciliation pass. At the end of the
//! pass it is flattened into [`status::StatusUpdate`]s which the
//! [`patchers::StatusPatcherService`] applies to the live objects.

pub mod apis;
pub mod common;
pub mod configuration;
pub mod patchers;
pub mod status;

pub use configuration::{Configuration, ConfigurationError};

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Result<T> = std::result::Result<T, Error>;
