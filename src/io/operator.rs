//! Operator console on stdin
//!
//! Line commands for the headless daemon. Every state change funnels
//! through the capture event channel, so the controller task remains the
//! single thread of control; the console only reads the watch snapshot.

use crate::domain::types::{CaptureEvent, SessionView};
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

const HELP: &str = "commands: store <code> | date [YYYY-MM-DD] | add [barcode] | scan <text> | rows | export | share | help | quit";

/// Read operator commands from stdin until quit, EOF or shutdown
pub async fn run_operator_console(
    event_tx: mpsc::Sender<CaptureEvent>,
    view_rx: watch::Receiver<SessionView>,
    shutdown_tx: watch::Sender<bool>,
) {
    let mut shutdown_rx = shutdown_tx.subscribe();
    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    println!("{HELP}");

    loop {
        tokio::select! {
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    break;
                }
            }
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break, // EOF
                    Err(e) => {
                        warn!(error = %e, "operator_stdin_failed");
                        break;
                    }
                };

                if !handle_line(line.trim(), &event_tx, &view_rx).await {
                    info!("operator_quit");
                    let _ = shutdown_tx.send(true);
                    break;
                }
            }
        }
    }
}

/// Apply one console line; returns false when the operator quits
async fn handle_line(
    line: &str,
    event_tx: &mpsc::Sender<CaptureEvent>,
    view_rx: &watch::Receiver<SessionView>,
) -> bool {
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (cmd, rest.trim()),
        None => (line, ""),
    };

    let event = match command {
        "" => return true,
        "quit" | "exit" => return false,
        "help" => {
            println!("{HELP}");
            return true;
        }
        "rows" => {
            let view = view_rx.borrow().clone();
            if view.rows.is_empty() {
                println!("no rows captured yet");
            } else {
                println!("{}", view.listing());
            }
            println!("Total rows: {}", view.count());
            return true;
        }
        "store" => CaptureEvent::SetStoreCode(rest.to_string()),
        "date" => {
            let date = if rest.is_empty() { None } else { Some(rest.to_string()) };
            CaptureEvent::SetDate(date)
        }
        "add" => {
            let barcode = if rest.is_empty() { None } else { Some(rest.to_string()) };
            CaptureEvent::ManualAdd { barcode }
        }
        "scan" if !rest.is_empty() => {
            CaptureEvent::Decode { text: rest.to_string(), received_at: Instant::now() }
        }
        "export" => CaptureEvent::Export,
        "share" => CaptureEvent::ShareLatest,
        _ => {
            println!("unknown command; {HELP}");
            return true;
        }
    };

    // Mark the current snapshot seen before sending, so changed() below
    // waits for the refresh this event produces
    let mut outcome_rx = view_rx.clone();
    outcome_rx.borrow_and_update();

    if event_tx.send(event).await.is_err() {
        warn!("capture_channel_closed");
        return false;
    }

    // Show the outcome once the controller has applied the event
    if outcome_rx.changed().await.is_ok() {
        let status = outcome_rx.borrow().status.clone();
        if !status.is_empty() {
            println!("{status}");
        }
    }
    true
}
