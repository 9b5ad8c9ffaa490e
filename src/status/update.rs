// SPDX-FileCopyrightText: © 2026 Kubvernor authors
// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2026 Kubvernor authors.
//         This program is free software: you can redistribute it and/or modify it under the terms of the GNU General Public License as published by the Free Software Foundation, version 3.
//         This program is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//         You should have received a copy of the GNU General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
//
//

use std::{fmt::Debug, sync::Arc};

use crate::common::{NamespacedName, ObjectKind, StatusObject};

/// Applies accumulated status onto a freshly fetched object.
///
/// Implementations panic when handed an object of a kind they were not built for.
pub trait StatusMutator: Debug + Send + Sync {
    fn mutate(&self, object: StatusObject) -> StatusObject;
}

/// One object whose status must be written, and how.
#[derive(Clone, Debug)]
pub struct StatusUpdate {
    pub namespaced_name: NamespacedName,
    pub resource: ObjectKind,
    pub mutator: Arc<dyn StatusMutator>,
}

impl StatusUpdate {
    pub fn new(namespaced_name: NamespacedName, resource: ObjectKind, mutator: impl StatusMutator + 'static) -> Self {
        Self { namespaced_name, resource, mutator: Arc::new(mutator) }
    }

    pub fn mutate(&self, object: StatusObject) -> StatusObject {
        self.mutator.mutate(object)
    }
}

#[track_caller]
pub(crate) fn unexpected_object(expected: &str, object: &StatusObject) -> ! {
    panic!("{expected} status mutator applied to {} {}", object.kind(), object.namespaced_name())
}
