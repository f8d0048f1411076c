//! Progress sinks receive per-point and per-task notifications from a run.
//!
//! Delivery is fire-and-forget: the engine never waits for a sink and never
//! learns whether an event was consumed. Point events arrive concurrently
//! from every worker, so a sink that needs serial processing should forward
//! events through [`ChannelSink`] to a single consumer.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;

use tracing::{error, info};

use crate::aggregate::RunningEstimate;
use crate::error::SimulationError;

pub trait ProgressSink: Send + Sync {
    fn on_point_classified(&self, x: f64, y: f64, inside: bool);

    fn on_progress(&self, estimate: &RunningEstimate);

    fn on_failure(&self, _error: &SimulationError) {}
}

/// Sink event as delivered through a channel or recorded for inspection.
#[derive(Debug, Clone, PartialEq)]
pub enum SinkEvent {
    Point { x: f64, y: f64, inside: bool },
    Progress(RunningEstimate),
    Failed(String),
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl ProgressSink for NoopSink {
    fn on_point_classified(&self, _x: f64, _y: f64, _inside: bool) {}

    fn on_progress(&self, _estimate: &RunningEstimate) {}
}

/// Forwards every notification onto an unbounded channel.
///
/// Sends never block. Once the receiver is gone events are silently dropped.
#[derive(Debug)]
pub struct ChannelSink {
    tx: Sender<SinkEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, Receiver<SinkEvent>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }
}

impl ProgressSink for ChannelSink {
    fn on_point_classified(&self, x: f64, y: f64, inside: bool) {
        let _ = self.tx.send(SinkEvent::Point { x, y, inside });
    }

    fn on_progress(&self, estimate: &RunningEstimate) {
        let _ = self.tx.send(SinkEvent::Progress(*estimate));
    }

    fn on_failure(&self, error: &SimulationError) {
        let _ = self.tx.send(SinkEvent::Failed(error.to_string()));
    }
}

/// Reports running estimates through the log. Points are ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ProgressSink for LogSink {
    fn on_point_classified(&self, _x: f64, _y: f64, _inside: bool) {}

    fn on_progress(&self, estimate: &RunningEstimate) {
        info!(
            tasks = estimate.tasks_resolved,
            inside = estimate.cumulative_inside,
            processed = estimate.cumulative_processed,
            "{}",
            estimate
        );
    }

    fn on_failure(&self, err: &SimulationError) {
        error!(error = %err, "simulation failed");
    }
}

/// Keeps every event in arrival order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SinkEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SinkEvent> {
        self.lock().clone()
    }

    pub fn progress(&self) -> Vec<RunningEstimate> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                SinkEvent::Progress(estimate) => Some(*estimate),
                _ => None,
            })
            .collect()
    }

    pub fn point_count(&self) -> usize {
        self.lock()
            .iter()
            .filter(|event| matches!(event, SinkEvent::Point { .. }))
            .count()
    }

    pub fn failures(&self) -> Vec<String> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                SinkEvent::Failed(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: SinkEvent) {
        self.lock().push(event);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<SinkEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ProgressSink for RecordingSink {
    fn on_point_classified(&self, x: f64, y: f64, inside: bool) {
        self.push(SinkEvent::Point { x, y, inside });
    }

    fn on_progress(&self, estimate: &RunningEstimate) {
        self.push(SinkEvent::Progress(*estimate));
    }

    fn on_failure(&self, error: &SimulationError) {
        self.push(SinkEvent::Failed(error.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimate(inside: u64, processed: u64) -> RunningEstimate {
        RunningEstimate {
            cumulative_inside: inside,
            cumulative_processed: processed,
            tasks_resolved: 1,
        }
    }

    #[test]
    fn channel_sink_forwards_in_send_order() {
        let (sink, rx) = ChannelSink::new();
        sink.on_point_classified(0.25, 0.5, true);
        sink.on_progress(&estimate(3, 4));
        sink.on_failure(&SimulationError::Interrupted { task_id: 2 });
        drop(sink);

        let events: Vec<_> = rx.iter().collect();
        assert_eq!(
            events,
            vec![
                SinkEvent::Point {
                    x: 0.25,
                    y: 0.5,
                    inside: true
                },
                SinkEvent::Progress(estimate(3, 4)),
                SinkEvent::Failed("interrupted while waiting for task 2".into()),
            ]
        );
    }

    #[test]
    fn channel_sink_ignores_dropped_receiver() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        sink.on_point_classified(0.1, 0.1, true);
        sink.on_progress(&estimate(1, 1));
    }

    #[test]
    fn recording_sink_splits_event_kinds() {
        let sink = RecordingSink::new();
        sink.on_point_classified(0.9, 0.9, false);
        sink.on_point_classified(0.1, 0.2, true);
        sink.on_progress(&estimate(1, 2));

        assert_eq!(sink.point_count(), 2);
        assert_eq!(sink.progress(), vec![estimate(1, 2)]);
        assert!(sink.failures().is_empty());
        assert_eq!(sink.events().len(), 3);
    }
}
