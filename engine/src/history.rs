/// Snapshot-based undo/redo stacks.
///
/// The undo stack holds states recorded before each mutation, with the
/// oldest entry being the initial state. No two consecutive entries are
/// equal. Only recording evicts, so the stack may sit one entry over the
/// limit while its top is the state an undo or redo just left.
#[derive(Clone, Debug)]
pub struct History {
    undo_stack: Vec<String>,
    redo_stack: Vec<String>,
    limit: usize,
}

impl History {
    pub fn new(limit: usize) -> Self {
        History { undo_stack: Vec::new(), redo_stack: Vec::new(), limit: limit.max(1) }
    }

    /// Forgets everything and starts over from `initial`.
    pub fn reset(&mut self, initial: String) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.undo_stack.push(initial);
    }

    /// Pushes `state` unless it repeats the top entry. Any recording is a new
    /// user action, so the redo stack is discarded either way.
    pub fn record(&mut self, state: String) -> bool {
        self.redo_stack.clear();
        let pushed = self.push(state);
        let excess = self.undo_stack.len().saturating_sub(self.limit);
        self.undo_stack.drain(..excess);
        pushed
    }

    fn push(&mut self, state: String) -> bool {
        if self.undo_stack.last() == Some(&state) {
            return false;
        }
        self.undo_stack.push(state);
        true
    }

    /// Steps back from `current`, returning the state to restore. `current`
    /// is kept first if it has not been recorded yet, so the mutation that
    /// produced it can be redone.
    pub fn undo(&mut self, current: String) -> Option<String> {
        self.push(current);
        if self.undo_stack.len() <= 1 {
            return None;
        }
        let undone = self.undo_stack.pop()?;
        self.redo_stack.push(undone);
        self.undo_stack.last().cloned()
    }

    pub fn redo(&mut self) -> Option<String> {
        let state = self.redo_stack.pop()?;
        self.push(state.clone());
        Some(state)
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Whether `undo(current)` would step back.
    pub fn can_undo(&self, current: &str) -> bool {
        self.undo_stack.len() > 1 || self.undo_stack.last().map(|top| top != current).unwrap_or(false)
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }
}
