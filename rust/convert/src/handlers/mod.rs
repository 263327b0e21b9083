// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-kind element handlers.
//!
//! Each handler turns one raw element into kernel calls: it resolves
//! references through the registry, applies the unit transforms, and
//! registers the created object back so later elements can find it.
//! Handlers return an error to fail their own element only; the
//! orchestrator catches it and moves on.

pub(crate) mod camera;
pub(crate) mod furniture;
pub(crate) mod level;
pub(crate) mod light;
pub(crate) mod opening;
pub(crate) mod room;
pub(crate) mod wall;

use crate::config::ImportConfig;
use crate::kernel::HostKernel;
use crate::registry::Registry;

use sh3d_lite_core::Result as CoreResult;

/// Access to the mesh entries of the archive being imported.
pub trait ModelSource {
    fn model_bytes(&mut self, entry: &str) -> CoreResult<Vec<u8>>;
}

impl<R: std::io::Read + std::io::Seek> ModelSource for sh3d_lite_core::SceneArchive<R> {
    fn model_bytes(&mut self, entry: &str) -> CoreResult<Vec<u8>> {
        sh3d_lite_core::SceneArchive::model_bytes(self, entry)
    }
}

/// Everything a handler needs for one import operation.
pub(crate) struct Context<'a, K: HostKernel> {
    pub kernel: &'a mut K,
    pub registry: &'a mut Registry,
    pub config: &'a ImportConfig,
    pub models: &'a mut dyn ModelSource,
}
