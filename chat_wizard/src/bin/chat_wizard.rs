//! Console driver: runs the wizard loop against stdin/stdout.
//!
//! This is not a chat platform; it exists to exercise the real dispatch
//! loop end to end. Input lines map to inbound events:
//! - `/start`, `/help`     -> commands
//! - `click <payload>`     -> button click (`weekly` or `daily`)
//! - `upload <path>`       -> file upload (reads the file's bytes)
//! - anything else         -> free text (dates, `none`)

use anyhow::Result;
use async_trait::async_trait;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use chat_wizard::config::{WizardConfig, load_config_path};
use chat_wizard::dispatch::handle_event;
use chat_wizard::session::SessionStore;
use chat_wizard::transport::{ChatTransport, InboundEvent, MenuOption, TransportError, UserId};

#[derive(Parser)]
#[command(version, about = "Console driver for the analysis wizard")]
struct Cli {
    /// Path to a TOML config file.
    #[arg(long, value_name = "FILE")]
    config: Option<String>,

    /// User id to tag events with.
    #[arg(long, default_value_t = 1)]
    user: u64,
}

/// Prints outbound messages instead of delivering them to a platform.
struct ConsoleTransport;

#[async_trait]
impl ChatTransport for ConsoleTransport {
    async fn send_text(&self, user: UserId, text: &str) -> Result<(), TransportError> {
        println!("[to {user}] {text}");
        Ok(())
    }

    async fn send_menu(
        &self,
        user: UserId,
        text: &str,
        options: &[MenuOption],
    ) -> Result<(), TransportError> {
        println!("[to {user}] {text}");
        for opt in options {
            println!("[to {user}]   ({}) {}", opt.payload, opt.label);
        }
        Ok(())
    }
}

fn read_event(user: UserId, line: &str) -> Option<InboundEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if let Some(name) = line.strip_prefix('/') {
        return Some(InboundEvent::Command {
            user,
            name: name.trim().to_string(),
        });
    }
    if let Some(payload) = line.strip_prefix("click ") {
        return Some(InboundEvent::ButtonClick {
            user,
            payload: payload.trim().to_string(),
        });
    }
    if let Some(path) = line.strip_prefix("upload ") {
        let path = path.trim();
        return match std::fs::read(path) {
            Ok(bytes) => Some(InboundEvent::FileUpload { user, bytes }),
            Err(err) => {
                eprintln!("cannot read {path}: {err}");
                None
            }
        };
    }
    Some(InboundEvent::Text {
        user,
        text: line.to_string(),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => load_config_path(path)?,
        None => WizardConfig::default(),
    };

    let user = UserId(cli.user);
    let transport = ConsoleTransport;
    let mut store = SessionStore::new();

    println!("chat-wizard console. Type /start to begin, Ctrl-D to quit.");
    for line in std::io::stdin().lines() {
        let line = line?;
        if let Some(event) = read_event(user, &line) {
            handle_event(&mut store, &transport, &config, event).await?;
        }
    }

    Ok(())
}
