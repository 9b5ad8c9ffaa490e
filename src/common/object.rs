// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use std::fmt::Display;

use kube::Resource;

use super::NamespacedName;
use crate::apis::{BackendTLSPolicy, ExtensionService, GRPCRoute, Gateway, GatewayClass, HTTPProxy, HTTPRoute, TCPRoute, TLSRoute};

/// Discriminator for every kind whose status this crate writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectKind {
    HttpProxy,
    ExtensionService,
    GatewayClass,
    Gateway,
    HttpRoute,
    TlsRoute,
    GrpcRoute,
    TcpRoute,
    BackendTlsPolicy,
}

impl Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::HttpProxy => "HTTPProxy",
            Self::ExtensionService => "ExtensionService",
            Self::GatewayClass => "GatewayClass",
            Self::Gateway => "Gateway",
            Self::HttpRoute => "HTTPRoute",
            Self::TlsRoute => "TLSRoute",
            Self::GrpcRoute => "GRPCRoute",
            Self::TcpRoute => "TCPRoute",
            Self::BackendTlsPolicy => "BackendTLSPolicy",
        })
    }
}

/// A live object handed to a status mutator.
#[derive(Clone, Debug, PartialEq)]
pub enum StatusObject {
    HttpProxy(HTTPProxy),
    ExtensionService(ExtensionService),
    GatewayClass(GatewayClass),
    Gateway(Gateway),
    HttpRoute(HTTPRoute),
    TlsRoute(TLSRoute),
    GrpcRoute(GRPCRoute),
    TcpRoute(TCPRoute),
    BackendTlsPolicy(BackendTLSPolicy),
}

impl StatusObject {
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::HttpProxy(_) => ObjectKind::HttpProxy,
            Self::ExtensionService(_) => ObjectKind::ExtensionService,
            Self::GatewayClass(_) => ObjectKind::GatewayClass,
            Self::Gateway(_) => ObjectKind::Gateway,
            Self::HttpRoute(_) => ObjectKind::HttpRoute,
            Self::TlsRoute(_) => ObjectKind::TlsRoute,
            Self::GrpcRoute(_) => ObjectKind::GrpcRoute,
            Self::TcpRoute(_) => ObjectKind::TcpRoute,
            Self::BackendTlsPolicy(_) => ObjectKind::BackendTlsPolicy,
        }
    }

    pub fn namespaced_name(&self) -> NamespacedName {
        match self {
            Self::HttpProxy(o) => NamespacedName::of(o),
            Self::ExtensionService(o) => NamespacedName::of(o),
            Self::GatewayClass(o) => NamespacedName::of(o),
            Self::Gateway(o) => NamespacedName::of(o),
            Self::HttpRoute(o) => NamespacedName::of(o),
            Self::TlsRoute(o) => NamespacedName::of(o),
            Self::GrpcRoute(o) => NamespacedName::of(o),
            Self::TcpRoute(o) => NamespacedName::of(o),
            Self::BackendTlsPolicy(o) => NamespacedName::of(o),
        }
    }
}

/// Ties a concrete resource type to its [`ObjectKind`] and [`StatusObject`] variant.
pub trait StatusTarget: Resource<DynamicType = ()> + Clone + Sized {
    const KIND: ObjectKind;

    fn into_object(self) -> StatusObject;

    fn from_object(object: StatusObject) -> Option<Self>;
}

macro_rules! status_target {
    ($resource:ty, $variant:ident) => {
        impl StatusTarget for $resource {
            const KIND: ObjectKind = ObjectKind::$variant;

            fn into_object(self) -> StatusObject {
                StatusObject::$variant(self)
            }

            fn from_object(object: StatusObject) -> Option<Self> {
                match object {
                    StatusObject::$variant(resource) => Some(resource),
                    _ => None,
                }
            }
        }

        impl From<$resource> for StatusObject {
            fn from(resource: $resource) -> Self {
                StatusObject::$variant(resource)
            }
        }
    };
}

status_target!(HTTPProxy, HttpProxy);
status_target!(ExtensionService, ExtensionService);
status_target!(GatewayClass, GatewayClass);
status_target!(Gateway, Gateway);
status_target!(HTTPRoute, HttpRoute);
status_target!(TLSRoute, TlsRoute);
status_target!(GRPCRoute, GrpcRoute);
status_target!(TCPRoute, TcpRoute);
status_target!(BackendTLSPolicy, BackendTlsPolicy);
