use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::{
    dto::sse::ServerEvent, error::ServiceError, session::SessionContext, state::SharedState,
};

/// Subscribe the calling session to its room's channel.
///
/// The session must resolve to a live player row; presence is announced as a
/// side effect of the subscription.
pub async fn subscribe_room(
    state: &SharedState,
    ctx: SessionContext,
) -> Result<broadcast::Receiver<ServerEvent>, ServiceError> {
    let store = state.require_room_store().await?;
    let player = store
        .find_player(ctx.room_id, ctx.player_id)
        .await?
        .ok_or_else(|| {
            ServiceError::Unauthenticated("session does not resolve to a room member".into())
        })?;

    Ok(state.bus().subscribe(ctx.room_id, player.id, player.name))
}

/// Convert a broadcast receiver into an SSE response, forwarding events and
/// announcing the member's departure once the client disconnects.
pub fn to_sse_stream(
    mut receiver: broadcast::Receiver<ServerEvent>,
    state: SharedState,
    ctx: SessionContext,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    // forwarder task: reads from broadcast and pushes into mpsc
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(payload) => {
                            let mut event = Event::default().data(payload.data);
                            if let Some(name) = payload.event {
                                event = event.event(name);
                            }

                            if tx.send(Ok(event)).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(_)) => {
                            // Skip lagged messages but keep the stream alive;
                            // the client resyncs from a snapshot if it cares.
                            continue;
                        }
                    }
                }
            }
        }

        // Own the shared state inside the task so the departure is announced
        // even when the request context has already dropped.
        state.bus().disconnect(ctx.room_id, ctx.player_id);
        tracing::info!(room_id = %ctx.room_id, player_id = %ctx.player_id, "room SSE stream disconnected");
    });

    // response stream reads from mpsc; when client disconnects axum drops this stream
    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
