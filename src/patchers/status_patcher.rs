// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use std::fmt::Debug;

use futures::future::join_all;
use k8s_openapi::NamespaceResourceScope;
use kube::{
    api::{Patch, PatchParams},
    Api, Client, ResourceExt,
};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, span, warn, Instrument, Level};

use crate::{
    apis::{BackendTLSPolicy, ExtensionService, GRPCRoute, Gateway, GatewayClass, HTTPProxy, HTTPRoute, TCPRoute, TLSRoute},
    common::{NamespacedName, ObjectKind, StatusTarget},
    status::StatusUpdate,
};

const CONFLICT: u16 = 409;
const DEFAULT_CONFLICT_RETRIES: usize = 5;

#[derive(Error, Debug)]
pub enum PatchError {
    #[error("kube error {0}")]
    Kube(#[from] kube::Error),
    #[error("unable to serialize status {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("mutator for {expected} returned {actual}")]
    UnexpectedKind { expected: ObjectKind, actual: ObjectKind },
    #[error("still conflicting after {0} attempts")]
    Conflict(usize),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatchOutcome {
    Patched,
    Unchanged,
}

pub struct LogContext<'a> {
    pub field_manager: &'a str,
    pub resource: ObjectKind,
    pub resource_id: &'a NamespacedName,
    pub version: Option<String>,
}

impl std::fmt::Display for LogContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} resource_id: {},  version: {:?}", self.field_manager, self.resource, self.resource_id, self.version)
    }
}

/// Writes the status updates of each finished pass.
pub struct StatusPatcherService {
    client: Client,
    field_manager: String,
    max_conflict_retries: usize,
    receiver: mpsc::Receiver<Vec<StatusUpdate>>,
}

impl StatusPatcherService {
    pub fn new(client: Client, field_manager: &str, buffer: usize) -> (Self, mpsc::Sender<Vec<StatusUpdate>>) {
        let (sender, receiver) = mpsc::channel(buffer);
        (Self { client, field_manager: field_manager.to_owned(), max_conflict_retries: DEFAULT_CONFLICT_RETRIES, receiver }, sender)
    }

    #[must_use]
    pub fn with_max_conflict_retries(mut self, max_conflict_retries: usize) -> Self {
        self.max_conflict_retries = max_conflict_retries;
        self
    }

    pub async fn start(mut self) -> crate::Result<()> {
        while let Some(updates) = self.receiver.recv().await {
            let span = span!(Level::INFO, "StatusPatcherService", updates = updates.len());
            let results = join_all(updates.iter().map(|update| self.apply(update))).instrument(span.clone()).await;
            span.in_scope(|| {
                for (update, result) in updates.iter().zip(results) {
                    let log_context = LogContext { field_manager: &self.field_manager, resource: update.resource, resource_id: &update.namespaced_name, version: None };
                    match result {
                        Ok(PatchOutcome::Patched) => info!("{log_context} patch status result ok"),
                        Ok(PatchOutcome::Unchanged) => debug!("{log_context} status unchanged"),
                        Err(e) => warn!("{log_context} patch status failed {e}"),
                    }
                }
            });
        }
        Ok(())
    }

    pub async fn apply(&self, update: &StatusUpdate) -> Result<PatchOutcome, PatchError> {
        let namespace = &update.namespaced_name.namespace;
        match update.resource {
            ObjectKind::HttpProxy => self.apply_to(self.api::<HTTPProxy>(namespace), update).await,
            ObjectKind::ExtensionService => self.apply_to(self.api::<ExtensionService>(namespace), update).await,
            ObjectKind::GatewayClass => self.apply_to(Api::<GatewayClass>::all(self.client.clone()), update).await,
            ObjectKind::Gateway => self.apply_to(self.api::<Gateway>(namespace), update).await,
            ObjectKind::HttpRoute => self.apply_to(self.api::<HTTPRoute>(namespace), update).await,
            ObjectKind::TlsRoute => self.apply_to(self.api::<TLSRoute>(namespace), update).await,
            ObjectKind::GrpcRoute => self.apply_to(self.api::<GRPCRoute>(namespace), update).await,
            ObjectKind::TcpRoute => self.apply_to(self.api::<TCPRoute>(namespace), update).await,
            ObjectKind::BackendTlsPolicy => self.apply_to(self.api::<BackendTLSPolicy>(namespace), update).await,
        }
    }

    fn api<R>(&self, namespace: &str) -> Api<R>
    where
        R: StatusTarget<Scope = NamespaceResourceScope>,
    {
        Api::namespaced(self.client.clone(), namespace)
    }

    /// Fetches, mutates and writes until the write is accepted. A version conflict means the
    /// object moved on since it was read, so the mutator is applied again to the newer copy.
    async fn apply_to<R>(&self, api: Api<R>, update: &StatusUpdate) -> Result<PatchOutcome, PatchError>
    where
        R: StatusTarget + PartialEq + Serialize + DeserializeOwned + Debug,
    {
        let name = &update.namespaced_name.name;
        let patch_params = PatchParams { field_manager: Some(self.field_manager.clone()), ..Default::default() };

        for attempt in 0..=self.max_conflict_retries {
            let live = api.get_status(name).await?;
            let log_context = LogContext { field_manager: &self.field_manager, resource: R::KIND, resource_id: &update.namespaced_name, version: live.resource_version() };

            let mutated = update.mutate(live.clone().into_object());
            let actual = mutated.kind();
            let mutated = R::from_object(mutated).ok_or(PatchError::UnexpectedKind { expected: R::KIND, actual })?;
            if mutated == live {
                return Ok(PatchOutcome::Unchanged);
            }

            let status = serde_json::to_value(&mutated)?.get("status").cloned().unwrap_or_default();
            let patch = serde_json::json!({
                "metadata": { "resourceVersion": live.resource_version() },
                "status": status,
            });
            match api.patch_status(name, &patch_params, &Patch::Merge(&patch)).await {
                Ok(_) => return Ok(PatchOutcome::Patched),
                Err(kube::Error::Api(response)) if response.code == CONFLICT => {
                    debug!("{log_context} conflict on attempt {attempt}, retrying");
                },
                Err(e) => return Err(e.into()),
            }
        }
        Err(PatchError::Conflict(self.max_conflict_retries + 1))
    }
}

#[cfg(test)]
mod tests {
    use http::{Method, Request, Response, StatusCode};
    use k8s_openapi::{apimachinery::pkg::apis::meta::v1::Time, chrono::DateTime};
    use kube::client::Body;
    use tower_test::mock;

    use super::*;
    use crate::{
        apis::{contour::VALID_CONDITION, ConditionStatus, HTTPProxySpec},
        common::StatusObject,
        status::ProxyUpdate,
    };

    const STATUS_PATH: &str = "/apis/projectcontour.io/v1/namespaces/default/httpproxies/kuard/status";

    type Handle = mock::Handle<Request<Body>, Response<Body>>;

    fn proxy(resource_version: &str) -> HTTPProxy {
        let mut proxy = HTTPProxy::new("kuard", HTTPProxySpec::default());
        proxy.metadata.namespace = Some("default".to_owned());
        proxy.metadata.generation = Some(1);
        proxy.metadata.resource_version = Some(resource_version.to_owned());
        proxy
    }

    fn invalid_proxy_update() -> StatusUpdate {
        let mut update = ProxyUpdate::new(NamespacedName::new("default", "kuard"), 1, Time(DateTime::from_timestamp(1_000, 0).unwrap()));
        update.add_condition(VALID_CONDITION, ConditionStatus::False, "ErrorPresent", "At least one error present, see Errors for details");
        StatusUpdate::new(update.fullname.clone(), ObjectKind::HttpProxy, update)
    }

    fn json_response(status: StatusCode, body: &impl Serialize) -> Response<Body> {
        Response::builder().status(status).body(Body::from(serde_json::to_vec(body).unwrap())).unwrap()
    }

    fn conflict() -> Response<Body> {
        json_response(
            StatusCode::CONFLICT,
            &serde_json::json!({
                "kind": "Status",
                "apiVersion": "v1",
                "metadata": {},
                "status": "Failure",
                "message": "the object has been modified; please apply your changes to the latest version and try again",
                "reason": "Conflict",
                "code": 409
            }),
        )
    }

    async fn serve_get(handle: &mut Handle, proxy: &HTTPProxy) {
        let (request, send) = handle.next_request().await.expect("service not called");
        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.uri().path(), STATUS_PATH);
        send.send_response(json_response(StatusCode::OK, proxy));
    }

    async fn next_patch(handle: &mut Handle) -> (serde_json::Value, mock::SendResponse<Response<Body>>) {
        let (request, send) = handle.next_request().await.expect("service not called");
        assert_eq!(request.method(), Method::PATCH);
        assert_eq!(request.uri().path(), STATUS_PATH);
        assert!(request.uri().query().is_some_and(|query| query.contains("fieldManager=contour")));
        let body = request.into_body().collect_bytes().await.unwrap();
        (serde_json::from_slice(&body).unwrap(), send)
    }

    #[tokio::test]
    async fn conflict_is_retried_against_the_newer_object() {
        let (mock_service, mut handle) = mock::pair::<Request<Body>, Response<Body>>();
        let (patcher, _sender) = StatusPatcherService::new(Client::new(mock_service, "default"), "contour", 1);

        let server = tokio::spawn(async move {
            serve_get(&mut handle, &proxy("1")).await;
            let (patch, send) = next_patch(&mut handle).await;
            assert_eq!(patch["metadata"]["resourceVersion"], "1");
            send.send_response(conflict());

            serve_get(&mut handle, &proxy("2")).await;
            let (patch, send) = next_patch(&mut handle).await;
            assert_eq!(patch["metadata"]["resourceVersion"], "2");
            assert_eq!(patch["status"]["currentStatus"], "invalid");
            assert_eq!(patch["status"]["conditions"][0]["reason"], "ErrorPresent");
            send.send_response(json_response(StatusCode::OK, &proxy("3")));
        });

        assert_eq!(patcher.apply(&invalid_proxy_update()).await.unwrap(), PatchOutcome::Patched);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn conflicts_are_bounded() {
        let (mock_service, mut handle) = mock::pair::<Request<Body>, Response<Body>>();
        let (patcher, _sender) = StatusPatcherService::new(Client::new(mock_service, "default"), "contour", 1);
        let patcher = patcher.with_max_conflict_retries(1);

        let server = tokio::spawn(async move {
            for version in ["1", "2"] {
                serve_get(&mut handle, &proxy(version)).await;
                let (_, send) = next_patch(&mut handle).await;
                send.send_response(conflict());
            }
        });

        let error = patcher.apply(&invalid_proxy_update()).await.unwrap_err();
        assert!(matches!(error, PatchError::Conflict(2)), "{error}");
        server.await.unwrap();
    }

    #[tokio::test]
    async fn unchanged_status_is_not_written() {
        let update = invalid_proxy_update();
        let StatusObject::HttpProxy(current) = update.mutate(StatusObject::HttpProxy(proxy("7"))) else {
            panic!("expected an HTTPProxy");
        };

        let (mock_service, mut handle) = mock::pair::<Request<Body>, Response<Body>>();
        let (patcher, _sender) = StatusPatcherService::new(Client::new(mock_service, "default"), "contour", 1);

        let server = tokio::spawn(async move {
            serve_get(&mut handle, &current).await;
        });

        assert_eq!(patcher.apply(&update).await.unwrap(), PatchOutcome::Unchanged);
        server.await.unwrap();
    }

    #[test]
    fn log_context_display() {
        let resource_id = NamespacedName::new("default", "echo");
        let log_context = LogContext { field_manager: "contour", resource: ObjectKind::HttpRoute, resource_id: &resource_id, version: Some("42".to_owned()) };
        assert_eq!(log_context.to_string(), "contour: HTTPRoute resource_id: default/echo,  version: Some(\"42\")");
    }

    #[test]
    fn errors_render() {
        let error = PatchError::UnexpectedKind { expected: ObjectKind::Gateway, actual: ObjectKind::GatewayClass };
        assert_eq!(error.to_string(), "mutator for Gateway returned GatewayClass");
        assert_eq!(PatchError::Conflict(6).to_string(), "still conflicting after 6 attempts");
    }
}
