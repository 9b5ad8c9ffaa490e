// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $value:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $value),+
                }
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub mod contour;
pub mod gateway;

pub use contour::{DetailedCondition, ExtensionService, ExtensionServiceSpec, HTTPProxy, HTTPProxySpec, HTTPProxyStatus, SubCondition};
pub use gateway::{
    route_group_kind, BackendTLSPolicy, BackendTLSPolicySpec, BackendTLSPolicyStatus, GRPCRoute, GRPCRouteSpec, Gateway, GatewayClass, GatewayClassSpec, GatewayClassStatus,
    GatewaySpec, GatewayStatus, GatewayStatusListeners, GatewayStatusListenersSupportedKinds, HTTPRoute, HTTPRouteSpec, HTTPRouteStatus, ParentReference, ParentStatusEntry,
    TCPRoute, TCPRouteSpec, TLSRoute, TLSRouteSpec,
};

string_enum!(
    /// Value of the `status` field of a condition.
    ConditionStatus {
        True => "True",
        False => "False",
        Unknown => "Unknown",
    }
);
