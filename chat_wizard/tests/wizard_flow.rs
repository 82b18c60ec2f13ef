//! End-to-end wizard flow: inbound events in, outbound messages out,
//! exercised against a recording transport.

use std::sync::Mutex;

use async_trait::async_trait;

use chat_wizard::config::WizardConfig;
use chat_wizard::dispatch::handle_event;
use chat_wizard::session::SessionStore;
use chat_wizard::transport::{ChatTransport, InboundEvent, MenuOption, TransportError, UserId};

const USER: UserId = UserId(42);

const CSV_10_DAYS: &[u8] = b"time,high,low\n\
2024-01-01,10,5\n\
2024-01-02,10,5\n\
2024-01-03,10,5\n\
2024-01-04,10,5\n\
2024-01-05,10,5\n\
2024-01-06,10,5\n\
2024-01-07,10,5\n\
2024-01-08,10,5\n\
2024-01-09,10,5\n\
2024-01-10,10,5\n";

/// Records every outbound message instead of delivering it.
#[derive(Default)]
struct RecordingTransport {
    texts: Mutex<Vec<(UserId, String)>>,
    menus: Mutex<Vec<(UserId, String, Vec<MenuOption>)>>,
}

impl RecordingTransport {
    fn texts(&self) -> Vec<String> {
        self.texts
            .lock()
            .unwrap()
            .iter()
            .map(|(_, text)| text.clone())
            .collect()
    }

    fn last_text(&self) -> String {
        self.texts().last().cloned().unwrap_or_default()
    }

    fn text_count(&self) -> usize {
        self.texts.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatTransport for RecordingTransport {
    async fn send_text(&self, user: UserId, text: &str) -> Result<(), TransportError> {
        self.texts.lock().unwrap().push((user, text.to_string()));
        Ok(())
    }

    async fn send_menu(
        &self,
        user: UserId,
        text: &str,
        options: &[MenuOption],
    ) -> Result<(), TransportError> {
        self.menus
            .lock()
            .unwrap()
            .push((user, text.to_string(), options.to_vec()));
        Ok(())
    }
}

async fn drive(
    store: &mut SessionStore,
    transport: &RecordingTransport,
    events: Vec<InboundEvent>,
) {
    let config = WizardConfig::default();
    for event in events {
        handle_event(store, transport, &config, event)
            .await
            .unwrap();
    }
}

fn command(name: &str) -> InboundEvent {
    InboundEvent::Command {
        user: USER,
        name: name.to_string(),
    }
}

fn click(payload: &str) -> InboundEvent {
    InboundEvent::ButtonClick {
        user: USER,
        payload: payload.to_string(),
    }
}

fn upload(bytes: &[u8]) -> InboundEvent {
    InboundEvent::FileUpload {
        user: USER,
        bytes: bytes.to_vec(),
    }
}

fn text(text: &str) -> InboundEvent {
    InboundEvent::Text {
        user: USER,
        text: text.to_string(),
    }
}

#[tokio::test]
async fn start_command_sends_the_kind_menu() {
    let mut store = SessionStore::new();
    let transport = RecordingTransport::default();

    drive(&mut store, &transport, vec![command("start")]).await;

    let menus = transport.menus.lock().unwrap();
    assert_eq!(menus.len(), 1);
    let (user, text, options) = &menus[0];
    assert_eq!(*user, USER);
    assert!(text.contains("choose an analysis type"));
    assert_eq!(options[0].payload, "weekly");
    assert_eq!(options[1].payload, "daily");
    // The menu alone does not open a session.
    assert!(store.get(USER).is_none());
}

#[tokio::test]
async fn weekly_happy_path_produces_the_report_and_ends_the_session() {
    let mut store = SessionStore::new();
    let transport = RecordingTransport::default();

    drive(
        &mut store,
        &transport,
        vec![
            command("start"),
            click("weekly"),
            upload(CSV_10_DAYS),
            text("2024-01-01"),
            text("none"),
        ],
    )
    .await;

    let texts = transport.texts();
    assert!(texts[0].contains("CSV file"));
    assert!(texts[1].contains("Available date range: 2024-01-01 to 2024-01-10"));
    assert!(texts[2].contains("end date"));

    let report = &texts[3];
    assert!(report.starts_with("Weekly Averages Analysis:"));
    assert!(report.contains("Date Range: 2024-01-01 to 2024-01-10"));
    assert!(report.contains("Total Average: 7.5000"));
    assert!(report.contains("Number of periods analyzed: 10"));

    assert!(store.is_empty());
}

#[tokio::test]
async fn daily_happy_path_reports_the_range_statistic() {
    let mut store = SessionStore::new();
    let transport = RecordingTransport::default();

    drive(
        &mut store,
        &transport,
        vec![
            click("daily"),
            upload(CSV_10_DAYS),
            text("2024-01-01"),
            text("2024-01-10"),
        ],
    )
    .await;

    let report = transport.last_text();
    assert!(report.starts_with("Daily Candle Range Analysis:"));
    assert!(report.contains("Average Daily Range: 5.0000"));
    assert!(report.contains("Maximum daily range: 5.0000"));
    assert!(store.is_empty());
}

#[tokio::test]
async fn invalid_start_date_reprompts_and_keeps_the_step() {
    let mut store = SessionStore::new();
    let transport = RecordingTransport::default();

    drive(
        &mut store,
        &transport,
        vec![click("weekly"), upload(CSV_10_DAYS), text("2024-13-01")],
    )
    .await;

    assert_eq!(
        transport.last_text(),
        "Please enter a valid date in format YYYY-MM-DD"
    );

    // The session survived at the same step: a valid date still works.
    drive(&mut store, &transport, vec![text("2024-01-01"), text("none")]).await;
    assert!(transport.last_text().contains("Total Average: 7.5000"));
    assert!(store.is_empty());
}

#[tokio::test]
async fn missing_column_clears_the_session() {
    let mut store = SessionStore::new();
    let transport = RecordingTransport::default();

    drive(
        &mut store,
        &transport,
        vec![
            click("weekly"),
            upload(b"time,high\n2024-01-01,10\n"),
        ],
    )
    .await;

    let error = transport.last_text();
    assert!(error.starts_with("Error processing file:"));
    assert!(error.contains("low"));
    assert!(store.is_empty());

    // Out of sequence now: the user must restart.
    drive(&mut store, &transport, vec![text("2024-01-01")]).await;
    assert_eq!(transport.last_text(), "Please start over with /start");
}

#[tokio::test]
async fn oversized_upload_is_rejected_and_clears_the_session() {
    let mut store = SessionStore::new();
    let transport = RecordingTransport::default();
    let config = WizardConfig {
        max_upload_bytes: 16,
    };

    handle_event(&mut store, &transport, &config, click("daily"))
        .await
        .unwrap();
    handle_event(&mut store, &transport, &config, upload(CSV_10_DAYS))
        .await
        .unwrap();

    assert!(transport.last_text().contains("byte limit"));
    assert!(store.is_empty());
}

#[tokio::test]
async fn file_outside_the_upload_step_is_ignored_silently() {
    let mut store = SessionStore::new();
    let transport = RecordingTransport::default();

    drive(
        &mut store,
        &transport,
        vec![click("weekly"), upload(CSV_10_DAYS)],
    )
    .await;
    let before = transport.text_count();

    // Session is at AwaitingStartDate; a second upload must do nothing.
    drive(&mut store, &transport, vec![upload(CSV_10_DAYS)]).await;
    assert_eq!(transport.text_count(), before);

    // And the wizard still works afterwards.
    drive(&mut store, &transport, vec![text("2024-01-01"), text("none")]).await;
    assert!(transport.last_text().contains("Total Average: 7.5000"));
}

#[tokio::test]
async fn text_while_awaiting_file_is_ignored_silently() {
    let mut store = SessionStore::new();
    let transport = RecordingTransport::default();

    drive(&mut store, &transport, vec![click("weekly")]).await;
    let before = transport.text_count();

    drive(&mut store, &transport, vec![text("2024-01-01")]).await;
    assert_eq!(transport.text_count(), before);
    assert!(store.get(USER).is_some());
}

#[tokio::test]
async fn text_without_a_session_asks_to_start_over() {
    let mut store = SessionStore::new();
    let transport = RecordingTransport::default();

    drive(&mut store, &transport, vec![text("hello")]).await;
    assert_eq!(transport.last_text(), "Please start over with /start");

    drive(&mut store, &transport, vec![upload(CSV_10_DAYS)]).await;
    assert_eq!(transport.last_text(), "Please start over with /start");
}

#[tokio::test]
async fn start_after_the_data_reports_the_empty_range() {
    let mut store = SessionStore::new();
    let transport = RecordingTransport::default();

    drive(
        &mut store,
        &transport,
        vec![
            click("weekly"),
            upload(CSV_10_DAYS),
            text("2024-02-01"),
            text("none"),
        ],
    )
    .await;

    assert_eq!(
        transport.last_text(),
        "Analysis error: no data in the requested range"
    );
    assert!(store.is_empty());
}

#[tokio::test]
async fn backwards_range_reports_the_empty_range() {
    let mut store = SessionStore::new();
    let transport = RecordingTransport::default();

    drive(
        &mut store,
        &transport,
        vec![
            click("daily"),
            upload(CSV_10_DAYS),
            text("2024-01-09"),
            text("2024-01-02"),
        ],
    )
    .await;

    assert!(transport.last_text().contains("no data in the requested range"));
    assert!(store.is_empty());
}

#[tokio::test]
async fn invalid_end_date_reprompts_then_open_end_echoes_last_row() {
    let mut store = SessionStore::new();
    let transport = RecordingTransport::default();

    drive(
        &mut store,
        &transport,
        vec![
            click("weekly"),
            upload(CSV_10_DAYS),
            text("2024-01-03"),
            text("next friday"),
        ],
    )
    .await;
    assert_eq!(
        transport.last_text(),
        "Please enter a valid date in format YYYY-MM-DD"
    );

    // Retry with the open-ended marker; the echoed end is the last row.
    drive(&mut store, &transport, vec![text("NONE")]).await;
    let report = transport.last_text();
    assert!(report.contains("Date Range: 2024-01-03 to 2024-01-10"));
    assert!(report.contains("Number of periods analyzed: 8"));
}

#[tokio::test]
async fn reselecting_a_kind_overwrites_the_previous_session() {
    let mut store = SessionStore::new();
    let transport = RecordingTransport::default();

    drive(
        &mut store,
        &transport,
        vec![
            click("weekly"),
            upload(CSV_10_DAYS),
            // Changed their mind mid-wizard.
            click("daily"),
            upload(CSV_10_DAYS),
            text("2024-01-01"),
            text("none"),
        ],
    )
    .await;

    assert!(transport.last_text().starts_with("Daily Candle Range Analysis:"));
}

#[tokio::test]
async fn help_and_unknown_inputs() {
    let mut store = SessionStore::new();
    let transport = RecordingTransport::default();

    drive(&mut store, &transport, vec![command("help")]).await;
    assert!(transport.last_text().contains("/start - Start the analysis process"));

    let before = transport.text_count();
    drive(
        &mut store,
        &transport,
        vec![command("settings"), click("hourly")],
    )
    .await;
    // Unrecognized commands and payloads are ignored outright.
    assert_eq!(transport.text_count(), before);
    assert!(store.is_empty());
}

#[tokio::test]
async fn users_do_not_share_wizard_state() {
    let mut store = SessionStore::new();
    let transport = RecordingTransport::default();
    let config = WizardConfig::default();
    let other = UserId(7);

    handle_event(&mut store, &transport, &config, click("weekly"))
        .await
        .unwrap();
    handle_event(
        &mut store,
        &transport,
        &config,
        InboundEvent::Text {
            user: other,
            text: "2024-01-01".to_string(),
        },
    )
    .await
    .unwrap();

    // The other user has no session and is told to restart; USER's wizard
    // is still waiting for its file.
    let texts = transport.texts.lock().unwrap();
    let (to, message) = texts.last().unwrap();
    assert_eq!(*to, other);
    assert_eq!(message, "Please start over with /start");
    drop(texts);
    assert!(store.get(USER).is_some());
}
