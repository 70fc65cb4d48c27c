use std::io::Write;
use std::time::Duration;
use tiny_http::Request;

use crate::state::{SharedState, TrainingStatus};

/// `GET /train/events` — Server-Sent Events handler.
///
/// This handler consumes `request` (takes ownership so we can call
/// `into_writer`) and drives a long-lived loop that:
/// 1. Tries to receive an `EpochStats` from the training channel with a
///    500 ms timeout.
/// 2. On success — serializes the stats and writes an `event: epoch` frame.
/// 3. On timeout — writes a keep-alive `: ping` comment.
/// 4. On channel disconnect (training finished) — writes a `done` or
///    `failed` event, then closes.
///
/// Client reconnection is handled natively by `EventSource`.
pub fn handle(request: Request, state: SharedState) {
    // tiny_http's `into_writer()` gives us the raw TCP stream so we can
    // write the HTTP response and then stream SSE frames directly.
    let mut writer = request.into_writer();

    let header = "HTTP/1.1 200 OK\r\n\
                  Content-Type: text/event-stream\r\n\
                  Cache-Control: no-cache\r\n\
                  Connection: keep-alive\r\n\
                  X-Accel-Buffering: no\r\n\
                  \r\n";
    if write_all(&mut writer, header.as_bytes()).is_err() {
        return;
    }

    // Extract the receiver Arc from state (clone it out so we don't hold
    // the lock while blocking on the channel).
    let epoch_rx = {
        let st = state.lock().unwrap();
        match &st.training {
            TrainingStatus::Running { epoch_rx, .. } => Some(epoch_rx.clone()),
            _ => None,
        }
    };

    let rx_arc = match epoch_rx {
        Some(r) => r,
        None => {
            let _ = write_all(&mut writer, final_event(&state).as_bytes());
            return;
        }
    };

    // Replay history collected so far (e.g. after a page reload mid-run).
    {
        let st = state.lock().unwrap();
        for stats in &st.epoch_history {
            if let Ok(json) = serde_json::to_string(stats) {
                let msg = format!("event: epoch\ndata: {}\n\n", json);
                if write_all(&mut writer, msg.as_bytes()).is_err() {
                    return;
                }
            }
        }
    }

    // Main receive loop.
    loop {
        let result = {
            let rx = rx_arc.lock().unwrap();
            rx.recv_timeout(Duration::from_millis(500))
        };

        match result {
            Ok(stats) => {
                {
                    let mut st = state.lock().unwrap();
                    st.epoch_history.push(stats.clone());
                }
                match serde_json::to_string(&stats) {
                    Ok(json) => {
                        let msg = format!("event: epoch\ndata: {}\n\n", json);
                        if write_all(&mut writer, msg.as_bytes()).is_err() {
                            return;
                        }
                    }
                    Err(_) => continue,
                }
            }
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => {
                if write_all(&mut writer, b": ping\n\n").is_err() {
                    return;
                }
            }
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => {
                // Training thread closed the sender — report final status.
                let _ = write_all(&mut writer, final_event(&state).as_bytes());
                return;
            }
        }
    }
}

/// Builds the closing SSE frame from the current training status.
fn final_event(state: &SharedState) -> String {
    let st = state.lock().unwrap();
    match &st.training {
        TrainingStatus::Done { model_path, elapsed_total_ms, was_stopped, accuracy } => {
            format!(
                "event: done\ndata: {{\"model_path\":\"{}\",\"elapsed_total_ms\":{},\
                 \"epochs_completed\":{},\"was_stopped\":{},\"accuracy\":{}}}\n\n",
                model_path,
                elapsed_total_ms,
                st.epoch_history.len(),
                was_stopped,
                accuracy
            )
        }
        TrainingStatus::Failed { reason } => {
            let json = serde_json::to_string(reason).unwrap_or_else(|_| "\"error\"".into());
            format!("event: failed\ndata: {{\"reason\":{}}}\n\n", json)
        }
        _ => "event: done\ndata: {}\n\n".to_owned(),
    }
}

/// Writes all bytes to the writer, returning `Err` on any I/O failure.
fn write_all<W: Write>(w: &mut W, data: &[u8]) -> std::io::Result<()> {
    w.write_all(data)?;
    w.flush()
}
