//! Line-oriented operator front end for the dashboard.
//!
//! Every command runs as its own task, so overlapping actions and refreshes
//! interleave exactly as they would behind a page with several buttons.

use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::repositories::container_registry::ContainerRegistry;
use crate::usecases::dashboard::{DashboardController, DashboardView};
use crate::usecases::render::{ContainerRow, PortCell, StatusBadge};
use crate::usecases::status_channel::{StatusKind, StatusMessage, StatusSlot};

pub const HELP: &str = "\
Commands:
  create <name>             create and start a new container
  start|stop|delete <row>   act on a row (row number or id prefix)
  refresh                   reload the container list
  help                      show this text
  quit                      leave the console";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Create(String),
    Action { action: String, selector: String },
    /// An action verb typed without a row.
    MissingRow(String),
    Refresh,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl ConsoleCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        match verb {
            "" => ConsoleCommand::Empty,
            "create" => ConsoleCommand::Create(rest.to_string()),
            "refresh" => ConsoleCommand::Refresh,
            "help" | "?" => ConsoleCommand::Help,
            "quit" | "exit" => ConsoleCommand::Quit,
            "start" | "stop" | "delete" if rest.is_empty() => {
                ConsoleCommand::MissingRow(verb.to_string())
            }
            _ if rest.is_empty() => ConsoleCommand::Unknown(verb.to_string()),
            action => ConsoleCommand::Action {
                action: action.to_string(),
                selector: rest.to_string(),
            },
        }
    }

    pub async fn execute<R>(self, controller: &DashboardController<R>)
    where
        R: ContainerRegistry + 'static,
    {
        match self {
            ConsoleCommand::Create(name) => controller.create(&name).await,
            ConsoleCommand::Action { action, selector } => {
                controller.request_action(&selector, &action).await
            }
            ConsoleCommand::Refresh => controller.refresh().await,
            ConsoleCommand::MissingRow(verb) => controller
                .status()
                .show(usage_hint(&verb), StatusKind::Error),
            ConsoleCommand::Unknown(verb) => controller.status().show(
                format!("Unknown command '{}'. Type 'help'.", verb),
                StatusKind::Error,
            ),
            ConsoleCommand::Help | ConsoleCommand::Quit | ConsoleCommand::Empty => {}
        }
    }
}

fn usage_hint(verb: &str) -> String {
    format!("Usage: {} <row>  (row number or id prefix)", verb)
}

pub fn render_table(rows: &[ContainerRow]) -> String {
    let mut out = format!(
        "{:<3} {:<28} {:<12} {:<20} {:<32} {}\n",
        "#", "NAME (ID)", "STATUS", "IMAGE", "PORT", "ACTIONS"
    );

    if rows.is_empty() {
        out.push_str("    no containers\n");
        return out;
    }

    for (index, row) in rows.iter().enumerate() {
        let badge = match row.badge {
            StatusBadge::Running => "●",
            StatusBadge::NotRunning => "○",
        };
        let port = match &row.port {
            PortCell::None => row.port.label(),
            PortCell::Link { url, .. } => {
                format!("{} -> {}", row.port.label(), url)
            }
        };
        let actions: Vec<&str> = row.actions.iter().map(|a| a.label()).collect();

        out.push_str(&format!(
            "{:<3} {:<28} {:<12} {:<20} {:<32} {}\n",
            index + 1,
            format!("{} ({})", row.name, row.short_id),
            format!("{} {}", badge, row.status),
            row.image,
            port,
            actions.join(" | ")
        ));
    }

    out
}

pub fn render_status(message: Option<&StatusMessage>) -> String {
    match message {
        Some(message) => {
            let marker = match message.kind {
                StatusKind::Loading => "…",
                StatusKind::Success => "✔",
                StatusKind::Error => "✖",
            };
            format!(
                "[{}] {} {}",
                message.shown_at.format("%H:%M:%S"),
                marker,
                message.text
            )
        }
        None => String::new(),
    }
}

/// What a repaint shows. Refresh-cycle flips alone do not trigger one.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Frame {
    rows: Vec<ContainerRow>,
    status: Option<StatusMessage>,
}

async fn paint(mut view: watch::Receiver<DashboardView>, mut status: watch::Receiver<StatusSlot>) {
    let mut last: Option<Frame> = None;

    loop {
        let frame = Frame {
            rows: view.borrow_and_update().rows.clone(),
            status: status.borrow_and_update().message.clone(),
        };

        if last.as_ref() != Some(&frame) {
            println!();
            print!("{}", render_table(&frame.rows));
            let line = render_status(frame.status.as_ref());
            if !line.is_empty() {
                println!("{}", line);
            }
            last = Some(frame);
        }

        tokio::select! {
            changed = view.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    debug!("Dashboard painter stopped");
}

pub struct Console<R>
where
    R: ContainerRegistry + 'static,
{
    controller: Arc<DashboardController<R>>,
}

impl<R> Console<R>
where
    R: ContainerRegistry + 'static,
{
    pub fn new(controller: Arc<DashboardController<R>>) -> Self {
        Self { controller }
    }

    pub async fn run(self) -> Result<()> {
        let controller = self.controller;
        let painter = tokio::spawn(paint(
            controller.subscribe_view(),
            controller.subscribe_status(),
        ));

        info!("Dashboard started, loading containers");
        let initial = Arc::clone(&controller);
        tokio::spawn(async move { initial.refresh().await });

        println!("{}", HELP);
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        while let Some(line) = lines.next_line().await? {
            match ConsoleCommand::parse(&line) {
                ConsoleCommand::Quit => break,
                ConsoleCommand::Help => println!("{}", HELP),
                ConsoleCommand::Empty => {}
                command => {
                    let controller = Arc::clone(&controller);
                    tokio::spawn(async move { command.execute(&controller).await });
                }
            }
        }

        painter.abort();
        Ok(())
    }
}
