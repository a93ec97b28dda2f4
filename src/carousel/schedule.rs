//! Deferred task queue for timed carousel transitions.
//!
//! Every scheduled task gets a [`TaskToken`]. Cancelling a token removes the
//! task, so a commit that was pending when the viewer closed can never fire.

use std::time::Instant;

/// Identifier handed out for each scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskToken(pub u64);

#[derive(Debug)]
struct Deferred<T> {
    token: TaskToken,
    due: Instant,
    payload: T,
}

/// One-shot deferred tasks, fired from the UI loop via [`DeferredQueue::take_due`].
#[derive(Debug)]
pub struct DeferredQueue<T> {
    tasks: Vec<Deferred<T>>,
    next_id: u64,
}

impl<T> DeferredQueue<T> {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            next_id: 1,
        }
    }

    /// Schedule `payload` to become due at `due`.
    pub fn schedule(&mut self, due: Instant, payload: T) -> TaskToken {
        let token = TaskToken(self.next_id);
        self.next_id += 1;
        self.tasks.push(Deferred { token, due, payload });
        token
    }

    /// Cancel a pending task. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, token: TaskToken) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.token != token);
        self.tasks.len() != before
    }

    /// Remove and return every task due at or before `now`, earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<T> {
        let mut due = Vec::new();
        let mut i = 0;
        while i < self.tasks.len() {
            if self.tasks[i].due <= now {
                due.push(self.tasks.remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by_key(|t| t.due);
        due.into_iter().map(|t| t.payload).collect()
    }

    pub fn is_pending(&self, token: TaskToken) -> bool {
        self.tasks.iter().any(|t| t.token == token)
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Earliest due time among pending tasks
    pub fn next_due(&self) -> Option<Instant> {
        self.tasks.iter().map(|t| t.due).min()
    }
}

impl<T> Default for DeferredQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
