// src/services/listener.rs
//
// Listener side of the resolution protocol.
//
// A listener is an id plus the sending half of an unbounded channel. The
// receiving half (`ListenerInbox`) belongs to exactly one controller, which
// drains it on its own scheduling context; events therefore reach the UI in
// the order the worker produced them, regardless of which thread sent them.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::domain::resolution::ResolutionSummary;

/// Identity of one attached controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListenerId(Uuid);

impl ListenerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ListenerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a resolution task tells its listener
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionEvent {
    Progress { task_id: Uuid, message: String },
    Complete(ResolutionSummary),
}

#[derive(Debug, Clone)]
pub struct ResolutionListener {
    id: ListenerId,
    sender: mpsc::UnboundedSender<ResolutionEvent>,
}

/// Receiving half of a listener
#[derive(Debug)]
pub struct ListenerInbox {
    receiver: mpsc::UnboundedReceiver<ResolutionEvent>,
}

impl ResolutionListener {
    /// A fresh listener and the inbox its events land in.
    pub fn channel() -> (ResolutionListener, ListenerInbox) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            ResolutionListener {
                id: ListenerId::new(),
                sender,
            },
            ListenerInbox { receiver },
        )
    }

    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Fails once the inbox has been dropped.
    pub(crate) fn send(&self, event: ResolutionEvent) -> Result<(), ResolutionEvent> {
        self.sender.send(event).map_err(|e| e.0)
    }
}

impl ListenerInbox {
    /// Wait for the next event. `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<ResolutionEvent> {
        self.receiver.recv().await
    }

    /// Next already-queued event, without waiting.
    pub fn try_recv(&mut self) -> Option<ResolutionEvent> {
        self.receiver.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_arrive_in_send_order() {
        let (listener, mut inbox) = ResolutionListener::channel();
        let task_id = Uuid::new_v4();

        for n in 1..=3 {
            listener
                .send(ResolutionEvent::Progress {
                    task_id,
                    message: format!("step {}", n),
                })
                .unwrap();
        }

        let messages: Vec<String> = std::iter::from_fn(|| inbox.try_recv())
            .map(|event| match event {
                ResolutionEvent::Progress { message, .. } => message,
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_eq!(messages, vec!["step 1", "step 2", "step 3"]);
    }

    #[test]
    fn test_send_fails_after_inbox_dropped() {
        let (listener, inbox) = ResolutionListener::channel();
        drop(inbox);

        let result = listener.send(ResolutionEvent::Progress {
            task_id: Uuid::new_v4(),
            message: "lost".to_string(),
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_listener_ids_are_distinct() {
        let (a, _ia) = ResolutionListener::channel();
        let (b, _ib) = ResolutionListener::channel();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.clone().id(), a.id());
    }
}
