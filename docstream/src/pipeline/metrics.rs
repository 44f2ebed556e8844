// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Counters and stage timings of pipeline runs.
//!
//! All fields are atomics so a [`PipelineMetrics`] can be shared between concurrent runs
//! and read while they progress.

use log::info;
use serde::Serialize;
use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

/// Timing of one pipeline stage.
#[derive(Debug)]
pub struct StageTimer {
    count: AtomicU64,
    total_nanos: AtomicU64,
    min_nanos: AtomicU64,
    max_nanos: AtomicU64,
}

impl Default for StageTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl StageTimer {
    pub const fn new() -> Self {
        Self {
            count: AtomicU64::new(0),
            total_nanos: AtomicU64::new(0),
            min_nanos: AtomicU64::new(u64::MAX),
            max_nanos: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn record(&self, elapsed: Duration) {
        let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        self.count.fetch_add(1, Ordering::Relaxed);
        self.total_nanos.fetch_add(nanos, Ordering::Relaxed);
        self.min_nanos.fetch_min(nanos, Ordering::Relaxed);
        self.max_nanos.fetch_max(nanos, Ordering::Relaxed);
    }

    fn absorb(&self, stats: &StageStats) {
        if stats.count == 0 {
            return;
        }
        self.count.fetch_add(stats.count, Ordering::Relaxed);
        self.total_nanos
            .fetch_add(nanos(stats.total), Ordering::Relaxed);
        self.min_nanos.fetch_min(nanos(stats.min), Ordering::Relaxed);
        self.max_nanos.fetch_max(nanos(stats.max), Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StageStats {
        let count = self.count.load(Ordering::Relaxed);
        let min = if count == 0 {
            0
        } else {
            self.min_nanos.load(Ordering::Relaxed)
        };
        StageStats {
            count,
            total: Duration::from_nanos(self.total_nanos.load(Ordering::Relaxed)),
            min: Duration::from_nanos(min),
            max: Duration::from_nanos(self.max_nanos.load(Ordering::Relaxed)),
        }
    }
}

fn nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

/// Point-in-time view of a [`StageTimer`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StageStats {
    pub count: u64,
    pub total: Duration,
    pub min: Duration,
    pub max: Duration,
}

impl StageStats {
    pub fn average(&self) -> Duration {
        if self.count == 0 {
            Duration::ZERO
        } else {
            Duration::from_nanos(nanos(self.total) / self.count)
        }
    }
}

/// Metrics of one or more pipeline runs.
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    /// Records decoded on ingest or encoded on export
    pub records: AtomicU64,
    /// Batches flushed to a sink or fetched from a source
    pub batches: AtomicU64,
    /// Bytes read from the input or written to the output
    pub bytes: AtomicU64,
    /// Time in the binary codec: decoding on ingest, encoding on export
    pub codec: StageTimer,
    /// Time mapping between Avro values and documents
    pub mapping: StageTimer,
    /// Time waiting on the sink, or on the output stream during export
    pub writing: StageTimer,
}

impl PipelineMetrics {
    pub const fn new() -> Self {
        Self {
            records: AtomicU64::new(0),
            batches: AtomicU64::new(0),
            bytes: AtomicU64::new(0),
            codec: StageTimer::new(),
            mapping: StageTimer::new(),
            writing: StageTimer::new(),
        }
    }

    #[inline]
    pub(crate) fn add_records(&self, n: u64) {
        self.records.fetch_add(n, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_batch(&self) {
        self.batches.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_bytes(&self, n: u64) {
        self.bytes.fetch_add(n, Ordering::Relaxed);
    }

    /// Take a snapshot of current values
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            records: self.records.load(Ordering::Relaxed),
            batches: self.batches.load(Ordering::Relaxed),
            bytes: self.bytes.load(Ordering::Relaxed),
            codec: self.codec.snapshot(),
            mapping: self.mapping.snapshot(),
            writing: self.writing.snapshot(),
        }
    }

    /// Adds the figures of a finished run to these metrics.
    pub fn absorb(&self, run: &MetricsSnapshot) {
        self.add_records(run.records);
        self.batches.fetch_add(run.batches, Ordering::Relaxed);
        self.add_bytes(run.bytes);
        self.codec.absorb(&run.codec);
        self.mapping.absorb(&run.mapping);
        self.writing.absorb(&run.writing);
    }
}

/// Point-in-time snapshot of pipeline metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub records: u64,
    pub batches: u64,
    pub bytes: u64,
    pub codec: StageStats,
    pub mapping: StageStats,
    pub writing: StageStats,
}

impl MetricsSnapshot {
    /// Logs one summary line at `info` level.
    pub fn log_summary(&self, run: &str) {
        info!(
            "{run}: {} records, {} batches, {} bytes; codec {}; mapping {}; writing {}",
            self.records,
            self.batches,
            self.bytes,
            format_stage(&self.codec),
            format_stage(&self.mapping),
            format_stage(&self.writing),
        );
    }
}

fn format_stage(stats: &StageStats) -> String {
    format!(
        "n={} avg={:?} min={:?} max={:?} total={:?}",
        stats.count,
        stats.average(),
        stats.min,
        stats.max,
        stats.total
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_stage_reports_zeroes() {
        let timer = StageTimer::new();
        assert_eq!(timer.snapshot(), StageStats::default());
        assert_eq!(timer.snapshot().average(), Duration::ZERO);
    }

    #[test]
    fn stage_tracks_min_max_and_average() {
        let timer = StageTimer::new();
        timer.record(Duration::from_micros(10));
        timer.record(Duration::from_micros(30));

        let stats = timer.snapshot();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.min, Duration::from_micros(10));
        assert_eq!(stats.max, Duration::from_micros(30));
        assert_eq!(stats.average(), Duration::from_micros(20));
    }

    #[test]
    fn absorb_aggregates_runs() {
        let run = PipelineMetrics::new();
        run.add_records(3);
        run.add_batch();
        run.add_bytes(42);
        run.writing.record(Duration::from_millis(5));

        let total = PipelineMetrics::new();
        total.absorb(&run.snapshot());
        total.absorb(&run.snapshot());

        let snapshot = total.snapshot();
        assert_eq!(snapshot.records, 6);
        assert_eq!(snapshot.batches, 2);
        assert_eq!(snapshot.bytes, 84);
        assert_eq!(snapshot.writing.count, 2);
        assert_eq!(snapshot.writing.min, Duration::from_millis(5));
        assert_eq!(snapshot.codec, StageStats::default());
    }
}
