//! Event dispatch: drives the wizard state machine.
//!
//! ## Flow
//! ```text
//! [no session] --kind button--> AwaitingFile --upload--> AwaitingStartDate
//!   --start date--> AwaitingEndDate --end date or `none`--> report sent,
//!   session removed
//! ```
//!
//! ## Policy
//! - A file outside `AwaitingFile`, or text outside the two date steps, is
//!   ignored silently while a session exists; with no session at all the
//!   user is told to start over.
//! - An invalid date re-prompts and leaves the session untouched; a
//!   malformed (or oversized) upload clears it.
//! - A new kind selection overwrites whatever session existed before.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use tracing::{info, warn};

use series_analyzer::analysis::{AnalysisKind, analyze};
use series_analyzer::ingest::parse_candles;
use series_analyzer::models::range::DateRange;

use crate::config::WizardConfig;
use crate::session::{Session, SessionStore};
use crate::transport::{ChatTransport, InboundEvent, MenuOption, TransportError, UserId};

const WELCOME: &str = "Welcome to the Financial Analysis Bot!\nPlease choose an analysis type:";

const SEND_FILE: &str = "Please send me your CSV file containing the columns: time, high, low";

const NO_SESSION: &str = "Please start over with /start";

const ASK_END: &str =
    "Enter the end date in format YYYY-MM-DD (or type 'none' to analyze until the end):";

const BAD_DATE: &str = "Please enter a valid date in format YYYY-MM-DD";

const HELP: &str = "Available commands:\n\
/start - Start the analysis process\n\
/help - Show this help message\n\
\n\
How to use:\n\
1. Click /start\n\
2. Choose analysis type\n\
3. Send your CSV file\n\
4. Enter start date (YYYY-MM-DD)\n\
5. Enter end date (YYYY-MM-DD or 'none')\n\
\n\
Your CSV file should have columns:\n\
- time (in YYYY-MM-DD format)\n\
- high\n\
- low";

/// Free text that failed strict `YYYY-MM-DD` validation. The user may retry
/// the same step.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("not a valid date (expected YYYY-MM-DD): '{input}'")]
pub struct DateParseError {
    pub input: String,
}

/// Strict `YYYY-MM-DD` -> midnight UTC.
pub fn parse_bound_date(text: &str) -> Result<DateTime<Utc>, DateParseError> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| DateParseError {
            input: text.to_string(),
        })
}

/// The initial analysis-type menu, in presentation order.
fn kind_menu() -> Vec<MenuOption> {
    vec![
        MenuOption::new("Weekly Averages", "weekly"),
        MenuOption::new("Daily Candle Averages", "daily"),
    ]
}

/// Routes one inbound event through the wizard.
///
/// The platform adapter delivers events serially, so this function is never
/// re-entered for the same store; per-user steps cannot interleave.
pub async fn handle_event<T: ChatTransport + ?Sized>(
    store: &mut SessionStore,
    transport: &T,
    config: &WizardConfig,
    event: InboundEvent,
) -> Result<(), TransportError> {
    match event {
        InboundEvent::Command { user, name } => handle_command(transport, user, &name).await,
        InboundEvent::ButtonClick { user, payload } => {
            handle_button(store, transport, user, &payload).await
        }
        InboundEvent::FileUpload { user, bytes } => {
            handle_file(store, transport, config, user, bytes).await
        }
        InboundEvent::Text { user, text } => handle_text(store, transport, user, &text).await,
    }
}

async fn handle_command<T: ChatTransport + ?Sized>(
    transport: &T,
    user: UserId,
    name: &str,
) -> Result<(), TransportError> {
    match name {
        "start" => transport.send_menu(user, WELCOME, &kind_menu()).await,
        "help" => transport.send_text(user, HELP).await,
        other => {
            warn!(%user, command = other, "ignoring unrecognized command");
            Ok(())
        }
    }
}

async fn handle_button<T: ChatTransport + ?Sized>(
    store: &mut SessionStore,
    transport: &T,
    user: UserId,
    payload: &str,
) -> Result<(), TransportError> {
    let Ok(kind) = AnalysisKind::from_str(payload) else {
        warn!(%user, payload, "ignoring unknown button payload");
        return Ok(());
    };

    store.begin(user, kind);
    info!(%user, ?kind, "wizard started");
    transport.send_text(user, SEND_FILE).await
}

async fn handle_file<T: ChatTransport + ?Sized>(
    store: &mut SessionStore,
    transport: &T,
    config: &WizardConfig,
    user: UserId,
    bytes: Vec<u8>,
) -> Result<(), TransportError> {
    let Some(session) = store.clear(user) else {
        return transport.send_text(user, NO_SESSION).await;
    };
    let Session::AwaitingFile { kind } = session else {
        // Not waiting for a file: put the session back untouched.
        store.advance(user, session);
        return Ok(());
    };

    if bytes.len() > config.max_upload_bytes {
        warn!(%user, size = bytes.len(), cap = config.max_upload_bytes, "upload over size cap");
        let text = format!(
            "Error processing file: file exceeds the {} byte limit",
            config.max_upload_bytes
        );
        return transport.send_text(user, &text).await;
    }

    match parse_candles(&bytes) {
        Ok(series) => {
            let prompt = match (series.min_timestamp(), series.max_timestamp()) {
                (Some(min), Some(max)) => format!(
                    "File received! Available date range: {} to {}\n\
                     Please enter the start date in format YYYY-MM-DD:",
                    min.format("%Y-%m-%d"),
                    max.format("%Y-%m-%d"),
                ),
                // Header-only upload: nothing to echo, but the wizard
                // continues and the analysis step reports the empty range.
                _ => "File received! The file contains no data rows.\n\
                      Please enter the start date in format YYYY-MM-DD:"
                    .to_string(),
            };
            info!(%user, rows = series.len(), "upload parsed");
            store.advance(user, Session::AwaitingStartDate { kind, series });
            transport.send_text(user, &prompt).await
        }
        Err(err) => {
            warn!(%user, %err, "upload rejected");
            transport
                .send_text(user, &format!("Error processing file: {err}"))
                .await
        }
    }
}

async fn handle_text<T: ChatTransport + ?Sized>(
    store: &mut SessionStore,
    transport: &T,
    user: UserId,
    text: &str,
) -> Result<(), TransportError> {
    let Some(session) = store.clear(user) else {
        return transport.send_text(user, NO_SESSION).await;
    };
    let text = text.trim();

    match session {
        Session::AwaitingFile { .. } => {
            // Text is not meaningful while waiting for an upload.
            store.advance(user, session);
            Ok(())
        }
        Session::AwaitingStartDate { kind, series } => match parse_bound_date(text) {
            Ok(start) => {
                info!(%user, %start, "start date accepted");
                store.advance(user, Session::AwaitingEndDate { kind, series, start });
                transport.send_text(user, ASK_END).await
            }
            Err(err) => {
                warn!(%user, %err, "start date rejected");
                store.advance(user, Session::AwaitingStartDate { kind, series });
                transport.send_text(user, BAD_DATE).await
            }
        },
        Session::AwaitingEndDate { kind, series, start } => {
            let end = if text.eq_ignore_ascii_case("none") {
                None
            } else {
                match parse_bound_date(text) {
                    Ok(end) => Some(end),
                    Err(err) => {
                        warn!(%user, %err, "end date rejected");
                        store.advance(user, Session::AwaitingEndDate { kind, series, start });
                        return transport.send_text(user, BAD_DATE).await;
                    }
                }
            };

            let range = DateRange::new(start, end);
            match analyze(&series, kind, &range) {
                Ok(report) => {
                    info!(%user, periods = report.periods, "analysis complete");
                    transport.send_text(user, &report.to_string()).await
                }
                Err(err) => {
                    warn!(%user, %err, "analysis failed");
                    transport
                        .send_text(user, &format!("Analysis error: {err}"))
                        .await
                }
            }
        }
    }
}
