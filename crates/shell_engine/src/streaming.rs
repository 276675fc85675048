use serde_json::Value;
use shell_core::{StreamEvent, StreamSequence};
use shell_logging::{shell_debug, shell_warn};
use tokio::sync::mpsc;

use crate::{CommandEndpoint, CommandError, EventSender};

#[derive(Debug)]
pub struct StreamReport {
    /// The command's own completion value, independent of `Finished`.
    pub result: Result<Value, CommandError>,
    pub delivered: usize,
    /// Events refused for breaking `Started? Progress* Finished?`.
    pub dropped: usize,
    pub finished: bool,
}

/// Runs one streaming command, handing each lifecycle event to `on_event`
/// sequentially and in the order the host emitted it.
///
/// The host call and the event loop run together; the loop ends once the
/// host has dropped its sender, which at the latest is when the call returns.
pub async fn invoke_streaming<F>(
    endpoint: &dyn CommandEndpoint,
    command: &str,
    args: Value,
    mut on_event: F,
) -> StreamReport
where
    F: FnMut(StreamEvent),
{
    let (tx, mut rx) = mpsc::unbounded_channel();
    let call = endpoint.call_streaming(command, args, EventSender::new(tx));
    let drain = async {
        let mut sequence = StreamSequence::new();
        let mut dropped = 0;
        while let Some(event) = rx.recv().await {
            match sequence.accept(&event) {
                Ok(()) => on_event(event),
                Err(violation) => {
                    shell_warn!("Dropping {:?} from {}: {}", event, command, violation);
                    dropped += 1;
                }
            }
        }
        (sequence, dropped)
    };

    let (result, (sequence, dropped)) = tokio::join!(call, drain);
    if let Err(err) = &result {
        shell_warn!("Streaming command {} failed: {}", command, err);
    } else {
        shell_debug!(
            "Streaming command {} completed after {} events",
            command,
            sequence.delivered()
        );
    }

    StreamReport {
        result,
        delivered: sequence.delivered(),
        dropped,
        finished: sequence.is_finished(),
    }
}
