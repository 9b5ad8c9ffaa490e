// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use std::{
    cell::RefCell,
    collections::BTreeMap,
    ops::{Deref, DerefMut},
    sync::Arc,
};

use kube::Resource;
use tracing::debug;
use typed_builder::TypedBuilder;

use super::{
    backend_tls_policy::BackendTlsPolicyStatusUpdate,
    clock::{Clock, SystemClock},
    extension::{CacheEntry, ExtensionCacheEntry},
    gateway::GatewayStatusUpdate,
    proxy::ProxyUpdate,
    route::{RouteKind, RouteResource, RouteStatusUpdate},
    update::StatusUpdate,
};
use crate::{
    apis::{contour::VALID_CONDITION, BackendTLSPolicy, ConditionStatus, ExtensionService, Gateway, HTTPProxy},
    common::{NamespacedName, ObjectKind, StatusTarget},
};

/// Status accumulated over one reconciliation pass.
///
/// Accessors hand out an [`Accessor`] for one object. Changes made through it reach the cache only
/// when [`Accessor::commit`] is called; dropping it discards them. Accessors may be held while
/// others are taken, but the cache must not be shared across threads.
#[derive(TypedBuilder)]
pub struct Cache {
    #[builder(default, setter(strip_option))]
    gateway_ref: Option<NamespacedName>,
    #[builder(setter(into))]
    gateway_controller: String,
    #[builder(default = Arc::new(SystemClock) as Arc<dyn Clock>)]
    clock: Arc<dyn Clock>,

    #[builder(default, setter(skip))]
    proxy_updates: RefCell<BTreeMap<NamespacedName, ProxyUpdate>>,
    #[builder(default, setter(skip))]
    gateway_updates: RefCell<BTreeMap<NamespacedName, GatewayStatusUpdate>>,
    #[builder(default, setter(skip))]
    route_updates: RefCell<BTreeMap<(RouteKind, NamespacedName), RouteStatusUpdate>>,
    #[builder(default, setter(skip))]
    backend_tls_policy_updates: RefCell<BTreeMap<NamespacedName, BackendTlsPolicyStatusUpdate>>,
    #[builder(default, setter(skip))]
    entries: RefCell<BTreeMap<ObjectKind, BTreeMap<NamespacedName, CacheEntry>>>,
}

impl Cache {
    pub fn new(gateway_ref: Option<NamespacedName>, gateway_controller: &str, clock: Arc<dyn Clock>) -> Self {
        Self {
            gateway_ref,
            gateway_controller: gateway_controller.to_owned(),
            clock,
            proxy_updates: RefCell::default(),
            gateway_updates: RefCell::default(),
            route_updates: RefCell::default(),
            backend_tls_policy_updates: RefCell::default(),
            entries: RefCell::default(),
        }
    }

    pub fn gateway_ref(&self) -> Option<&NamespacedName> {
        self.gateway_ref.as_ref()
    }

    pub fn gateway_controller(&self) -> &str {
        &self.gateway_controller
    }

    pub fn proxy_accessor(&self, proxy: &HTTPProxy) -> Accessor<'_, ProxyUpdate> {
        let update = ProxyUpdate::new(NamespacedName::of(proxy), generation(proxy), self.clock.now());
        Accessor { cache: self, update }
    }

    pub fn gateway_status_accessor(&self, gateway: &Gateway) -> Accessor<'_, GatewayStatusUpdate> {
        let existing_conditions = gateway.status.as_ref().and_then(|status| status.conditions.clone()).unwrap_or_default();
        let update = GatewayStatusUpdate::new(NamespacedName::of(gateway), generation(gateway), existing_conditions, self.clock.now());
        Accessor { cache: self, update }
    }

    pub fn route_conditions_accessor<R: RouteResource>(&self, route: &R) -> Accessor<'_, RouteStatusUpdate> {
        let update =
            RouteStatusUpdate::new(NamespacedName::of(route), R::ROUTE_KIND, generation(route), self.clock.now(), self.gateway_ref.clone(), &self.gateway_controller);
        Accessor { cache: self, update }
    }

    pub fn backend_tls_policy_conditions_accessor(&self, policy: &BackendTLSPolicy) -> Accessor<'_, BackendTlsPolicyStatusUpdate> {
        let update = BackendTlsPolicyStatusUpdate::new(NamespacedName::of(policy), generation(policy), self.clock.now(), self.gateway_ref.clone(), &self.gateway_controller);
        Accessor { cache: self, update }
    }

    /// Starts from the entry already committed for this ExtensionService in this pass, if any.
    pub fn extension_accessor(&self, extension: &ExtensionService) -> Accessor<'_, ExtensionCacheEntry> {
        let update = match self.get(extension) {
            Some(CacheEntry::Extension(entry)) => entry,
            None => ExtensionCacheEntry::new(NamespacedName::of(extension), generation(extension), self.clock.now()),
        };
        Accessor { cache: self, update }
    }

    pub fn get<R: StatusTarget>(&self, object: &R) -> Option<CacheEntry> {
        self.entries.borrow().get(&R::KIND).and_then(|entries| entries.get(&NamespacedName::of(object))).cloned()
    }

    /// Stores a generic entry. The entry must belong to the kind of `object`.
    pub fn put<R: StatusTarget>(&self, object: &R, entry: CacheEntry) {
        assert!(entry.kind() == R::KIND, "cannot store a {} entry for {} {}", entry.kind(), R::KIND, NamespacedName::of(object));
        self.entries.borrow_mut().entry(R::KIND).or_default().insert(NamespacedName::of(object), entry);
    }

    /// Everything committed during this pass, one record per object.
    pub fn get_status_updates(&self) -> Vec<StatusUpdate> {
        let proxies = self.proxy_updates.borrow().values().map(|u| StatusUpdate::new(u.fullname.clone(), ObjectKind::HttpProxy, u.clone())).collect::<Vec<_>>();
        let gateways = self.gateway_updates.borrow().values().map(|u| StatusUpdate::new(u.fullname.clone(), ObjectKind::Gateway, u.clone())).collect::<Vec<_>>();
        let routes = self.route_updates.borrow().values().map(|u| StatusUpdate::new(u.fullname.clone(), u.kind.object_kind(), u.clone())).collect::<Vec<_>>();
        let policies =
            self.backend_tls_policy_updates.borrow().values().map(|u| StatusUpdate::new(u.fullname.clone(), ObjectKind::BackendTlsPolicy, u.clone())).collect::<Vec<_>>();
        let entries = self
            .entries
            .borrow()
            .iter()
            .flat_map(|(kind, entries)| entries.iter().map(|(name, entry)| StatusUpdate::new(name.clone(), *kind, entry.clone())))
            .collect::<Vec<_>>();

        proxies.into_iter().chain(gateways).chain(routes).chain(policies).chain(entries).collect()
    }

    pub fn get_proxy_updates(&self) -> Vec<ProxyUpdate> {
        self.proxy_updates.borrow().values().cloned().collect()
    }

    pub fn get_gateway_updates(&self) -> Vec<GatewayStatusUpdate> {
        self.gateway_updates.borrow().values().cloned().collect()
    }

    pub fn get_route_updates(&self) -> Vec<RouteStatusUpdate> {
        self.route_updates.borrow().values().cloned().collect()
    }

    pub fn get_backend_tls_policy_updates(&self) -> Vec<BackendTlsPolicyStatusUpdate> {
        self.backend_tls_policy_updates.borrow().values().cloned().collect()
    }
}

fn generation<R: Resource>(resource: &R) -> i64 {
    resource.meta().generation.unwrap_or_default()
}

/// How a finished status update is stored.
pub trait Commit: Sized {
    fn commit(self, cache: &Cache);
}

impl Commit for ProxyUpdate {
    fn commit(self, cache: &Cache) {
        if self.is_empty() {
            debug!("HTTPProxy {} nothing to commit", self.fullname);
            return;
        }

        let mut updates = cache.proxy_updates.borrow_mut();
        // an ancestor revisited later in a delegation chain must not clear an error found earlier
        let invalid = updates.get(&self.fullname).and_then(|u| u.get_condition(VALID_CONDITION)).is_some_and(|c| c.is_status(ConditionStatus::False));
        let valid = self.get_condition(VALID_CONDITION).is_some_and(|c| c.is_status(ConditionStatus::True));
        if invalid && valid {
            debug!("HTTPProxy {} already invalid in this pass, ignoring Valid=True", self.fullname);
            return;
        }
        updates.insert(self.fullname.clone(), self);
    }
}

impl Commit for GatewayStatusUpdate {
    fn commit(self, cache: &Cache) {
        if self.is_empty() {
            debug!("Gateway {} nothing to commit", self.fullname);
            return;
        }
        cache.gateway_updates.borrow_mut().insert(self.fullname.clone(), self);
    }
}

impl Commit for RouteStatusUpdate {
    fn commit(self, cache: &Cache) {
        if self.is_empty() {
            debug!("{} {} nothing to commit", self.kind, self.fullname);
            return;
        }
        cache.route_updates.borrow_mut().insert((self.kind, self.fullname.clone()), self);
    }
}

impl Commit for BackendTlsPolicyStatusUpdate {
    fn commit(self, cache: &Cache) {
        if self.is_empty() {
            debug!("BackendTLSPolicy {} nothing to commit", self.fullname);
            return;
        }
        cache.backend_tls_policy_updates.borrow_mut().insert(self.fullname.clone(), self);
    }
}

impl Commit for ExtensionCacheEntry {
    fn commit(self, cache: &Cache) {
        if self.is_empty() {
            debug!("ExtensionService {} nothing to commit", self.fullname);
            return;
        }
        cache.entries.borrow_mut().entry(ObjectKind::ExtensionService).or_default().insert(self.fullname.clone(), CacheEntry::Extension(self));
    }
}

/// A status update for one object, tied to the cache it will be committed to.
pub struct Accessor<'c, U: Commit> {
    cache: &'c Cache,
    update: U,
}

impl<U: Commit> Accessor<'_, U> {
    pub fn commit(self) {
        self.update.commit(self.cache);
    }
}

impl<U: Commit> Deref for Accessor<'_, U> {
    type Target = U;

    fn deref(&self) -> &U {
        &self.update
    }
}

impl<U: Commit> DerefMut for Accessor<'_, U> {
    fn deref_mut(&mut self) -> &mut U {
        &mut self.update
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        apis::{
            gateway::{PolicyConditionReason, PolicyConditionType, RouteConditionReason, RouteConditionType},
            BackendTLSPolicySpec, ExtensionServiceSpec, HTTPProxySpec, HTTPRoute, HTTPRouteSpec, ParentReference, TLSRoute, TLSRouteSpec,
        },
        status::clock::FixedClock,
    };

    fn cache() -> Cache {
        Cache::builder()
            .gateway_ref(NamespacedName::new("projectcontour", "contour"))
            .gateway_controller("projectcontour.io/gateway-controller")
            .clock(Arc::new(FixedClock::from_timestamp(1_700_000_000)))
            .build()
    }

    fn namespaced<R: Resource>(mut resource: R, namespace: &str) -> R {
        resource.meta_mut().namespace = Some(namespace.to_owned());
        resource
    }

    #[test]
    fn uncommitted_accessors_leave_no_trace() {
        let cache = cache();
        let proxy = namespaced(HTTPProxy::new("foo", HTTPProxySpec::default()), "ns");
        let mut accessor = cache.proxy_accessor(&proxy);
        accessor.condition_for(VALID_CONDITION);
        drop(accessor);

        let empty = cache.proxy_accessor(&proxy);
        empty.commit();
        assert!(cache.get_status_updates().is_empty());
    }

    #[test]
    fn accessors_can_nest() {
        let cache = cache();
        let root = namespaced(HTTPProxy::new("root", HTTPProxySpec::default()), "ns");
        let child = namespaced(HTTPProxy::new("child", HTTPProxySpec::default()), "ns");

        let mut outer = cache.proxy_accessor(&root);
        let mut inner = cache.proxy_accessor(&child);
        inner.condition_for(VALID_CONDITION);
        inner.commit();
        outer.condition_for(VALID_CONDITION);
        outer.commit();

        let names: Vec<_> = cache.get_proxy_updates().into_iter().map(|u| u.fullname.name).collect();
        assert_eq!(names, ["child", "root"]);
    }

    #[test]
    fn routes_of_different_kinds_do_not_collide() {
        let cache = cache();
        let parent_ref = ParentReference::gateway("projectcontour", "contour");
        let http = namespaced(HTTPRoute::new("echo", HTTPRouteSpec::default()), "default");
        let tls = namespaced(TLSRoute::new("echo", TLSRouteSpec::default()), "default");

        let mut accessor = cache.route_conditions_accessor(&http);
        accessor.status_update_for(parent_ref.clone()).add_condition(RouteConditionType::Accepted, ConditionStatus::True, RouteConditionReason::Accepted, "Accepted HTTPRoute");
        accessor.commit();
        let mut accessor = cache.route_conditions_accessor(&tls);
        accessor.status_update_for(parent_ref).add_condition(RouteConditionType::Accepted, ConditionStatus::True, RouteConditionReason::Accepted, "Accepted TLSRoute");
        accessor.commit();

        let kinds: Vec<_> = cache.get_status_updates().into_iter().map(|u| u.resource).collect();
        assert_eq!(kinds, [ObjectKind::HttpRoute, ObjectKind::TlsRoute]);
        assert_eq!(cache.get_route_updates()[0].generation, 0);
    }

    #[test]
    fn route_accessor_starts_fresh() {
        let cache = cache();
        let parent_ref = ParentReference::gateway("projectcontour", "contour");
        let http = namespaced(HTTPRoute::new("echo", HTTPRouteSpec::default()), "default");

        for message in ["first", "second"] {
            let mut accessor = cache.route_conditions_accessor(&http);
            assert!(accessor.route_parent_statuses().is_empty());
            accessor.status_update_for(parent_ref.clone()).add_condition(RouteConditionType::Accepted, ConditionStatus::True, RouteConditionReason::Accepted, message);
            accessor.commit();
        }
        assert_eq!(cache.get_route_updates()[0].conditions_for_parent_ref(&parent_ref)[0].message, "second");
    }

    #[test]
    fn backend_tls_policy_entries() {
        let cache = cache();
        let policy = namespaced(BackendTLSPolicy::new("backend-tls", BackendTLSPolicySpec::default()), "default");
        let mut accessor = cache.backend_tls_policy_conditions_accessor(&policy);
        accessor
            .status_update_for(ParentReference::gateway("projectcontour", "contour"))
            .add_condition(PolicyConditionType::Accepted, ConditionStatus::True, PolicyConditionReason::Accepted, "Accepted BackendTLSPolicy");
        accessor.commit();

        let updates = cache.get_status_updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].resource, ObjectKind::BackendTlsPolicy);
        assert_eq!(cache.get_backend_tls_policy_updates().len(), 1);
    }

    #[test]
    fn extension_accessor_reuses_committed_entry() {
        let cache = cache();
        let extension = namespaced(ExtensionService::new("ratelimit", ExtensionServiceSpec::default()), "projectcontour");

        let mut accessor = cache.extension_accessor(&extension);
        accessor.add_condition(VALID_CONDITION, ConditionStatus::False, "ServiceError", "first");
        accessor.commit();
        let mut accessor = cache.extension_accessor(&extension);
        accessor.add_condition(VALID_CONDITION, ConditionStatus::False, "ServiceError", "second");
        accessor.commit();

        let Some(CacheEntry::Extension(entry)) = cache.get(&extension) else {
            panic!("expected an extension entry");
        };
        assert_eq!(entry.get_condition(VALID_CONDITION).unwrap().message, "first, second");
        assert_eq!(cache.get_status_updates()[0].resource, ObjectKind::ExtensionService);
    }

    #[test]
    #[should_panic(expected = "cannot store a ExtensionService entry for HTTPProxy")]
    fn put_rejects_mismatched_kind() {
        let cache = cache();
        let proxy = HTTPProxy::new("foo", HTTPProxySpec::default());
        let entry = ExtensionCacheEntry::new(NamespacedName::new("ns", "ext"), 1, cache.clock.now());
        cache.put(&proxy, entry.into());
    }
}
