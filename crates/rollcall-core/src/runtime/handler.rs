//! Channel Message Handler
//!
//! Consumes the inbound message stream and dispatches every event to a
//! per-user worker task. Workers process their user's events strictly in
//! arrival order; different users' events interleave freely. A handler
//! failure is logged and never terminates the loop.

use anyhow::Result;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_stream::StreamExt;
use tracing::{debug, error, info, warn};

use crate::channel::{Channel, InboundMessage};

use super::BotContext;
use super::commands::{handle_command, handle_text};

#[cfg(test)]
const STREAM_RECONNECT_DELAY: Duration = Duration::from_millis(20);
#[cfg(not(test))]
const STREAM_RECONNECT_DELAY: Duration = Duration::from_secs(2);

// One entry and one idle task per unique sender, kept for the life of the
// process; the map is never swept. An entry whose worker has stopped is
// replaced on the next send to that sender.
type WorkerMap = DashMap<String, mpsc::UnboundedSender<InboundMessage>>;

/// Start the message handler loop
///
/// Spawns a background task that listens for inbound messages and feeds
/// them to per-user workers. Returns immediately; the loop reconnects to
/// the stream whenever it ends.
pub fn start_message_handler(channel: Arc<dyn Channel>, ctx: Arc<BotContext>) {
    let workers: Arc<WorkerMap> = Arc::new(DashMap::new());

    tokio::spawn(async move {
        info!("Starting channel message handler");

        loop {
            let Some(mut stream) = channel.start_receiving() else {
                warn!(
                    "Failed to start message stream, retrying in {:?}",
                    STREAM_RECONNECT_DELAY
                );
                sleep(STREAM_RECONNECT_DELAY).await;
                continue;
            };

            loop {
                let message = match stream.next().await {
                    Some(msg) => msg,
                    None => {
                        warn!(
                            "Message stream ended, restarting in {:?}",
                            STREAM_RECONNECT_DELAY
                        );
                        break;
                    }
                };

                debug!(
                    "Handler received message {} from {}",
                    message.id, message.sender_id
                );

                dispatch_to_worker(&workers, &channel, &ctx, message);
            }

            sleep(STREAM_RECONNECT_DELAY).await;
        }
    });
}

/// Deliver a message to its sender's worker, creating the worker on first
/// contact. Dispatch happens in stream order, and each worker drains its
/// queue sequentially, so events for one user are handled in arrival order.
fn dispatch_to_worker(
    workers: &Arc<WorkerMap>,
    channel: &Arc<dyn Channel>,
    ctx: &Arc<BotContext>,
    message: InboundMessage,
) {
    if let Some(tx) = workers.get(&message.sender_id) {
        if tx.send(message.clone()).is_ok() {
            return;
        }
        // Stale worker whose receiver is gone; fall through and respawn.
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    let sender_id = message.sender_id.clone();
    if tx.send(message).is_err() {
        return;
    }
    workers.insert(sender_id.clone(), tx);

    let channel = channel.clone();
    let ctx = ctx.clone();
    tokio::spawn(async move {
        debug!("Spawned worker for user {}", sender_id);
        while let Some(message) = rx.recv().await {
            if let Err(e) = handle_message(channel.as_ref(), &ctx, &message).await {
                error!(
                    "Error handling message {} from {}: {}",
                    message.id, message.sender_id, e
                );
            }
            // Continue processing next message regardless of error
        }
        debug!("Worker for user {} stopped", sender_id);
    });
}

/// Process a single inbound message
async fn handle_message(
    channel: &dyn Channel,
    ctx: &BotContext,
    message: &InboundMessage,
) -> Result<()> {
    if message.content.trim_start().starts_with('/') {
        handle_command(channel, ctx, message).await
    } else {
        handle_text(channel, ctx, message).await
    }
}
