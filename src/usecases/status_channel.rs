use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Loading,
    Success,
    Error,
}

impl StatusKind {
    pub fn css_class(&self) -> &'static str {
        match self {
            StatusKind::Loading => "msg-loading",
            StatusKind::Success => "msg-success",
            StatusKind::Error => "msg-error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub kind: StatusKind,
    pub shown_at: DateTime<Local>,
}

/// The single message slot. `generation` bumps on every `show`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSlot {
    pub generation: u64,
    pub message: Option<StatusMessage>,
}

/// Holds at most one transient operator message.
///
/// Success messages clear themselves after `clear_after`; a newer message
/// cancels the pending clear, and a clear only ever removes the message
/// that scheduled it.
#[derive(Debug)]
pub struct StatusChannel {
    slot: Arc<watch::Sender<StatusSlot>>,
    pending_clear: Mutex<Option<JoinHandle<()>>>,
    clear_after: Duration,
}

impl StatusChannel {
    pub fn new(clear_after: Duration) -> Self {
        let (slot, _) = watch::channel(StatusSlot::default());
        Self {
            slot: Arc::new(slot),
            pending_clear: Mutex::new(None),
            clear_after,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<StatusSlot> {
        self.slot.subscribe()
    }

    pub fn current(&self) -> Option<StatusMessage> {
        self.slot.borrow().message.clone()
    }

    #[cfg(test)]
    fn has_pending_clear(&self) -> bool {
        self.pending_clear
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Replaces the current message unconditionally. Must run inside a tokio runtime.
    pub fn show(&self, text: impl Into<String>, kind: StatusKind) {
        let text = text.into();
        let mut pending = self
            .pending_clear
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(handle) = pending.take() {
            handle.abort();
        }

        debug!("Status [{:?}]: {}", kind, text);

        let mut generation = 0;
        self.slot.send_modify(|slot| {
            slot.generation += 1;
            generation = slot.generation;
            slot.message = Some(StatusMessage {
                text,
                kind,
                shown_at: Local::now(),
            });
        });

        if kind == StatusKind::Success {
            *pending = Some(self.schedule_clear(generation));
        }
    }

    fn schedule_clear(&self, generation: u64) -> JoinHandle<()> {
        let slot = Arc::clone(&self.slot);
        let delay = self.clear_after;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            slot.send_if_modified(|slot| {
                if slot.generation != generation || slot.message.is_none() {
                    return false;
                }
                slot.message = None;
                true
            });
        })
    }
}

impl Drop for StatusChannel {
    fn drop(&mut self) {
        if let Some(handle) = self
            .pending_clear
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }
}
