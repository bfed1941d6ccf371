use crate::{
    chatbot::{self, FALLBACK_RESPONSE, WELCOME_MESSAGE},
    server::SharedState,
    telemetry::Metrics,
};
use axum::{
    extract::{
        ws::{Message, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures::{Sink, SinkExt, Stream, StreamExt};
use std::fmt::Display;

pub async fn chat_socket(ws: WebSocketUpgrade, State(state): State<SharedState>) -> Response {
    state.metrics.record_request("/ws");
    ws.on_upgrade(move |socket| async move {
        let (sender, receiver) = socket.split();
        run_chat_session(sender, receiver, &state.metrics).await;
    })
}

/// Sends the welcome message, then answers every text frame with exactly one
/// text frame until the client leaves or the transport fails.
pub async fn run_chat_session<Tx, Rx, E>(mut sender: Tx, mut receiver: Rx, metrics: &Metrics)
where
    Tx: Sink<Message> + Unpin,
    Tx::Error: Display,
    Rx: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    tracing::info!("Chat client connected");

    if let Err(e) = sender.send(Message::Text(WELCOME_MESSAGE.into())).await {
        tracing::warn!("Failed to send welcome message: {}", e);
        return;
    }

    while let Some(frame) = receiver.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                tracing::debug!("Received message: {}", text.as_str());

                let rule = chatbot::classify(text.as_str());
                let response = rule.map(|r| r.response).unwrap_or(FALLBACK_RESPONSE);
                metrics.record_chat_message(rule.map(|r| r.topic.as_str()).unwrap_or("fallback"));

                if let Err(e) = sender.send(Message::Text(response.into())).await {
                    tracing::info!("Chat connection closed while sending: {}", e);
                    break;
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(Message::Binary(data)) => {
                tracing::debug!("Ignoring binary frame of {} bytes", data.len());
            }
            Ok(_) => {}
            Err(e) => {
                tracing::info!("Chat connection closed: {}", e);
                break;
            }
        }
    }

    tracing::info!("Chat session ended");
}
