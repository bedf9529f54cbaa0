//! Moves [PackedReport]s from the scanner's core to the USB core.
//!
//! The [Relay] is the only thing the two cores share. It holds a single report, and the scanner
//! waits on it rather than dropping anything, so chords can't be reordered. The USB side empties
//! it straight into its own [OutputQueue], which absorbs bursts until the next poll tick.

use crate::report::PackedReport;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;
use heapless::Deque;

/// Single-slot handoff between execution contexts
pub struct Relay<M: RawMutex> {
    slot: Channel<M, PackedReport, 1>,
}

impl<M: RawMutex> Relay<M> {
    pub const fn new() -> Self {
        Relay { slot: Channel::new() }
    }

    /// Waits until the slot is free, then fills it.
    pub async fn push(&self, report: PackedReport) {
        self.slot.send(report).await
    }

    /// Fills the slot if it's free, otherwise hands the report back.
    #[cfg(test)]
    pub fn try_push(&self, report: PackedReport) -> Result<(), PackedReport> {
        self.slot.try_send(report).map_err(|e| match e {
            embassy_sync::channel::TrySendError::Full(report) => report,
        })
    }

    /// Whether a report is waiting to be collected
    pub fn is_ready(&self) -> bool {
        !self.slot.is_empty()
    }

    pub fn try_pop(&self) -> Option<PackedReport> {
        self.slot.try_receive().ok()
    }

    /// Waits for a report to arrive.
    pub async fn pop(&self) -> PackedReport {
        self.slot.receive().await
    }
}

impl<M: RawMutex> Default for Relay<M> {
    fn default() -> Self {
        Self::new()
    }
}

pub const OUTPUT_QUEUE_CAPACITY: usize = 8;

/// Fixed-size FIFO of reports waiting to be sent. Lossy: reports arriving while it's full are
/// dropped.
#[derive(Default)]
pub struct OutputQueue {
    reports: Deque<PackedReport, OUTPUT_QUEUE_CAPACITY>,
}

impl OutputQueue {
    pub const fn new() -> Self {
        OutputQueue { reports: Deque::new() }
    }

    /// Queues a report. Returns `false` if the queue was full and the report was dropped.
    pub fn push(&mut self, report: PackedReport) -> bool {
        match self.reports.push_back(report) {
            Ok(()) => true,
            Err(dropped) => {
                warn!("output queue full, dropping {}", dropped);
                false
            }
        }
    }

    /// Takes the oldest report, or [PackedReport::EMPTY] if there is none.
    pub fn pop(&mut self) -> PackedReport {
        self.reports.pop_front().unwrap_or(PackedReport::EMPTY)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Whether anything is waiting to go out, here or still in the relay. Used to decide whether a
    /// suspended host needs waking.
    pub fn has_waiting<M: RawMutex>(&self, relay: &Relay<M>) -> bool {
        !self.is_empty() || relay.is_ready()
    }

    /// Moves whatever is waiting in the relay into the queue.
    pub fn drain_from<M: RawMutex>(&mut self, relay: &Relay<M>) {
        while let Some(report) = relay.try_pop() {
            self.push(report);
        }
    }
}
