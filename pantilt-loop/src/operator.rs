//! Operator seam: frame display and command input

use crate::state::OperatorEvent;
use crate::status::LoopStatus;
use pantilt_eye::Frame;
use std::collections::VecDeque;
use tracing::info;

/// Shown every processed frame; may answer with one command.
pub trait Operator {
    fn present(&mut self, frame: &Frame, status: &LoopStatus) -> Option<OperatorEvent>;
}

impl<O: Operator + ?Sized> Operator for Box<O> {
    fn present(&mut self, frame: &Frame, status: &LoopStatus) -> Option<OperatorEvent> {
        (**self).present(frame, status)
    }
}

/// No display and no input; logs the status periodically
#[derive(Debug, Clone)]
pub struct HeadlessOperator {
    log_every: u64,
}

impl Default for HeadlessOperator {
    fn default() -> Self {
        Self { log_every: 30 }
    }
}

impl HeadlessOperator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log every `n` cycles; 0 disables logging.
    pub fn log_every(mut self, n: u64) -> Self {
        self.log_every = n;
        self
    }
}

impl Operator for HeadlessOperator {
    fn present(&mut self, _frame: &Frame, status: &LoopStatus) -> Option<OperatorEvent> {
        if self.log_every > 0 && status.cycles % self.log_every == 0 {
            info!("{}", status);
        }
        None
    }
}

/// Replays a fixed script, one entry per cycle
#[derive(Debug, Clone, Default)]
pub struct ScriptedOperator {
    script: VecDeque<Option<OperatorEvent>>,
    seen: Vec<LoopStatus>,
}

impl ScriptedOperator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit `event` on the next unscripted cycle.
    pub fn then(mut self, event: OperatorEvent) -> Self {
        self.script.push_back(Some(event));
        self
    }

    /// Stay silent for `cycles` cycles.
    pub fn idle(mut self, cycles: usize) -> Self {
        self.script.extend(std::iter::repeat(None).take(cycles));
        self
    }

    /// Every status presented so far.
    pub fn seen(&self) -> &[LoopStatus] {
        &self.seen
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl Operator for ScriptedOperator {
    fn present(&mut self, _frame: &Frame, status: &LoopStatus) -> Option<OperatorEvent> {
        self.seen.push(*status);
        self.script.pop_front().flatten()
    }
}
