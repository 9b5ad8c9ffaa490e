// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

mod backend_tls_policy;
mod cache;
mod clock;
mod conditions;
mod extension;
mod gateway;
mod gateway_class;
mod proxy;
mod route;
mod update;

pub use backend_tls_policy::{BackendTlsPolicyAncestorStatusUpdate, BackendTlsPolicyStatusUpdate, PolicyAncestorStatus};
pub use cache::{Accessor, Cache, Commit};
pub use clock::{Clock, FixedClock, SystemClock};
pub use conditions::ConditionCache;
pub use extension::{CacheEntry, ExtensionCacheEntry};
pub use gateway::GatewayStatusUpdate;
pub use gateway_class::{compute_gateway_class_accepted_condition, conditions_equal, gateway_class_accepted_update, gateway_class_status_equal, merge_conditions, set_gateway_class_accepted};
pub use proxy::{ProxyStatus, ProxyUpdate};
pub use route::{RouteKind, RouteParentStatus, RouteParentStatusUpdate, RouteResource, RouteStatusUpdate};
pub use update::{StatusMutator, StatusUpdate};
