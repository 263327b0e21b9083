// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Progress reporting.
//!
//! The orchestrator notifies an observer between phases and between
//! elements. Observers are read-only bystanders; nothing they do feeds
//! back into the pipeline.

use sh3d_lite_core::ElementKind;

/// Receives progress notifications during an import.
pub trait ProgressSink {
    /// A new phase starts: `step` of `total_steps`, processing `count`
    /// elements of the given kind.
    fn phase_started(&mut self, kind: ElementKind, step: usize, total_steps: usize, count: usize);

    /// One element was processed (successfully or not).
    fn element_processed(&mut self, processed: usize, expected: usize);
}

/// Discards all notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn phase_started(&mut self, _: ElementKind, _: usize, _: usize, _: usize) {}

    fn element_processed(&mut self, _: usize, _: usize) {}
}
