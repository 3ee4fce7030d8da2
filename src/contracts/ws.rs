use std::sync::Arc;

use axum::{
    debug_handler,
    extract::{
        Path, Query, State, WebSocketUpgrade,
        ws::{CloseFrame, Message, Utf8Bytes, WebSocket, close_code},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use sqlx::SqlitePool;
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::{
    auth::token::{self, JwtKeys},
    hub::{ChatEvent, ChatHub},
};

#[derive(Deserialize)]
pub(crate) struct WsQuery {
    token: String,
}

#[debug_handler(state = crate::AppState)]
pub(crate) async fn contract_chat(
    Path(contract_id): Path<String>,
    Query(WsQuery { token }): Query<WsQuery>,
    State(db_pool): State<SqlitePool>,
    State(keys): State<JwtKeys>,
    State(hub): State<Arc<ChatHub>>,
    ws: WebSocketUpgrade,
) -> Response {
    ws.on_upgrade(move |socket| session(socket, db_pool, keys, hub, contract_id, token))
}

/// Runs one connection through its whole lifecycle: authenticate, authorize,
/// join, relay, leave. Until the join succeeds the room is never touched, and
/// the socket is closed exactly once on every exit path.
async fn session(
    socket: WebSocket,
    db_pool: SqlitePool,
    keys: JwtKeys,
    hub: Arc<ChatHub>,
    contract_id: String,
    token: String,
) {
    // A malformed join target is rejected with the same close code as a bad
    // credential.
    let Ok(contract_id) = contract_id.parse::<i64>() else {
        return close_policy(socket).await;
    };

    let identity = match token::verify(&keys, &token) {
        Ok(identity) => identity,
        Err(err) => {
            debug!(%err, contract_id, "rejected chat credential");
            return close_policy(socket).await;
        }
    };

    match super::is_party(&db_pool, contract_id, identity.user_id).await {
        Ok(true) => {}
        Ok(false) => {
            debug!(contract_id, user_id = identity.user_id, "chat join refused");
            return close_policy(socket).await;
        }
        Err(err) => {
            error!(%err, contract_id, "membership lookup failed");
            return close_policy(socket).await;
        }
    }

    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<Utf8Bytes>();

    // Sole writer for this socket; broadcasts and inline error replies both
    // go through the channel, and the close frame goes out once it drains.
    let writer = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if sink.send(Message::Text(payload)).await.is_err() {
                break;
            }
        }
        let _ = sink.send(Message::Close(None)).await;
    });

    let member = hub.connect(identity.user_id, tx.clone());
    let conn_id = member.conn_id;
    hub.join(contract_id, member);
    hub.broadcast(
        contract_id,
        &ChatEvent::UserJoined {
            user_id: identity.user_id,
        },
    );

    while let Some(Ok(message)) = stream.next().await {
        match message {
            Message::Text(text) => match chat_text(text.as_str()) {
                Some(body) => hub.broadcast(
                    contract_id,
                    &ChatEvent::Chat {
                        from: identity.user_id,
                        message: body,
                    },
                ),
                // Protocol violation: reply to the sender alone, keep the
                // session alive.
                None => {
                    let _ = tx.send(Utf8Bytes::from_static(r#"{"error": "message is required"}"#));
                }
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    // leave() is idempotent against a concurrent failed-send eviction.
    hub.leave(contract_id, conn_id);
    hub.broadcast(
        contract_id,
        &ChatEvent::UserLeft {
            user_id: identity.user_id,
        },
    );
    drop(tx);
    let _ = writer.await;
}

/// The required `message` field of an inbound frame; `None` for frames that
/// are not JSON, lack the field, or carry an empty string.
fn chat_text(raw: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(raw).ok()?;
    value
        .get("message")?
        .as_str()
        .filter(|message| !message.is_empty())
        .map(str::to_owned)
}

async fn close_policy(mut socket: WebSocket) {
    let _ = socket
        .send(Message::Close(Some(CloseFrame {
            code: close_code::POLICY,
            reason: Utf8Bytes::from_static("policy violation"),
        })))
        .await;
}
