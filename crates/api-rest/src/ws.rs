//! Role-scoped WebSocket notifications.
//!
//! Clients connect to `/ws` and join a role room with
//! `{"type": "join", "role": "checkerDoctor"}`. Events produced by the
//! workflow engine are fanned out over a broadcast channel and each
//! socket forwards the ones addressed to its room as
//! `{"event": "...", "data": ...}` frames.

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::broadcast;

use hcms_core::domain::Role;
use hcms_core::{NotificationEvent, Notifier};

use crate::state::AppState;

/// An event addressed to every socket joined to `audience`.
#[derive(Debug, Clone)]
pub struct RoleEvent {
    pub audience: Role,
    pub kind: &'static str,
    pub payload: Value,
}

/// Bridges engine notifications onto the broadcast channel.
pub struct ChannelNotifier {
    sender: broadcast::Sender<RoleEvent>,
}

impl ChannelNotifier {
    pub fn new(sender: broadcast::Sender<RoleEvent>) -> Self {
        Self { sender }
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, audience: Role, event: NotificationEvent) {
        let role_event = RoleEvent {
            audience,
            kind: event.kind(),
            payload: event.payload(),
        };
        // send fails only when no socket is subscribed.
        if self.sender.send(role_event).is_err() {
            tracing::debug!("No websocket subscribers for {audience} events");
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum ClientMessage {
    Join { role: String },
}

/// Upgrade the connection and hand it to the socket loop.
pub(crate) async fn ws_handler(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: AppState) {
    let mut events = state.events.subscribe();
    let mut joined: Option<Role> = None;

    loop {
        tokio::select! {
            incoming = socket.recv() => {
                let Some(Ok(message)) = incoming else { break };
                let Message::Text(text) = message else { continue };
                let reply = match serde_json::from_str::<ClientMessage>(&text) {
                    Ok(ClientMessage::Join { role }) => match Role::parse(&role) {
                        Some(role) => {
                            joined = Some(role);
                            json!({ "event": "joined", "role": role })
                        }
                        None => json!({
                            "event": "error",
                            "message": format!("Unknown role: {role}"),
                        }),
                    },
                    Err(_) => json!({
                        "event": "error",
                        "message": "Expected a join message",
                    }),
                };
                if socket.send(Message::Text(reply.to_string())).await.is_err() {
                    break;
                }
            }
            event = events.recv() => {
                match event {
                    Ok(event) => {
                        if joined != Some(event.audience) {
                            continue;
                        }
                        let frame = json!({ "event": event.kind, "data": event.payload });
                        if socket.send(Message::Text(frame.to_string())).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("Websocket subscriber lagged, dropped {skipped} events");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_message_parses() {
        let message: ClientMessage =
            serde_json::from_str(r#"{"type":"join","role":"labTech"}"#)
                .expect("Failed to parse");
        let ClientMessage::Join { role } = message;
        assert_eq!(role, "labTech");
    }

    #[test]
    fn unknown_message_type_is_rejected() {
        let parsed = serde_json::from_str::<ClientMessage>(r#"{"type":"leave"}"#);
        assert!(parsed.is_err());
    }

    #[tokio::test]
    async fn notifier_publishes_to_subscribers() {
        let (sender, mut receiver) = broadcast::channel(8);
        let notifier = ChannelNotifier::new(sender);
        let visit = hcms_core::domain::Visit::new(
            uuid::Uuid::new_v4(),
            "fever".to_string(),
            None,
        );
        let notice = hcms_core::VisitNotice::from_visit(&visit, "Asha Rahman".to_string());
        notifier.notify(Role::CheckerDoctor, NotificationEvent::NewVisit(notice));

        let event = receiver.recv().await.expect("Expected an event");
        assert_eq!(event.audience, Role::CheckerDoctor);
        assert_eq!(event.kind, "new-visit");
        assert_eq!(event.payload["patientName"], "Asha Rahman");
    }

    #[test]
    fn dropped_receiver_does_not_panic_the_notifier() {
        let (sender, receiver) = broadcast::channel(8);
        drop(receiver);
        let notifier = ChannelNotifier::new(sender);
        let visit = hcms_core::domain::Visit::new(
            uuid::Uuid::new_v4(),
            "cough".to_string(),
            None,
        );
        let notice = hcms_core::VisitNotice::from_visit(&visit, "Omar Ali".to_string());
        notifier.notify(Role::CheckerDoctor, NotificationEvent::NewVisit(notice));
    }
}
