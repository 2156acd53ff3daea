//! services/client/src/bin/client.rs

use client_lib::{
    adapters::{HttpApiAdapter, JsonFileStore, SystemClock},
    app::{
        leaderboard::LeaderboardView,
        notify::{Notification, NotificationLevel},
        AppController, AppState,
    },
    config::Config,
    error::ClientError,
    messages::Locale,
};
use finance_empire_core::domain::GameData;
use std::sync::Arc;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const HELP: &str = "commands: login <user> <password> | register <user> <password> [email] | \
leaderboard | show | set <json> | save | logout | quit";

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. API at {}", config.api_base_url);

    // --- 2. Initialize Adapters ---
    let api = Arc::new(HttpApiAdapter::new(config.api_base_url.clone())?);
    let store = Arc::new(JsonFileStore::open(config.storage_path.clone()));
    info!("Using storage file {}", store.path().display());

    // --- 3. Build the Controller ---
    let (controller, notifications) = AppController::new(AppState {
        api,
        store,
        clock: Arc::new(SystemClock),
        config: config.clone(),
    });
    let locale = controller.locale();
    tokio::spawn(print_notifications(notifications));

    let mut indicator = controller.start_probe();
    tokio::spawn(async move {
        while indicator.changed().await.is_ok() {
            let current = *indicator.borrow_and_update();
            if let Some(label) = current.label(locale) {
                println!("[{}]", label);
            }
        }
    });

    if let Some(user) = controller.init().await {
        println!("Welcome back, {}.", user.username);
    }
    println!("{}", HELP);

    // --- 4. Run the Console Loop ---
    let mut lines = BufReader::new(io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };
        if !run_command(&controller, line.trim()).await {
            break;
        }
    }

    // --- 5. Leave ---
    if controller.page_exit().await {
        info!("Final save completed.");
    }
    controller.shutdown();
    Ok(())
}

/// One line of console input.
#[derive(Debug, PartialEq)]
enum Command<'a> {
    Empty,
    Login {
        username: &'a str,
        password: &'a str,
    },
    Register {
        username: &'a str,
        password: &'a str,
        email: Option<&'a str>,
    },
    Leaderboard,
    Show,
    Set(&'a str),
    Save,
    Logout,
    Quit,
}

/// Parses a trimmed input line. Wrong argument counts are rejected.
fn parse_command(line: &str) -> Option<Command<'_>> {
    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    let args: Vec<&str> = rest.split_whitespace().collect();

    let parsed = match (command, args.as_slice()) {
        ("", _) => Command::Empty,
        ("login", &[username, password]) => Command::Login { username, password },
        ("register", &[username, password]) => Command::Register {
            username,
            password,
            email: None,
        },
        ("register", &[username, password, email]) => Command::Register {
            username,
            password,
            email: Some(email),
        },
        ("leaderboard", []) => Command::Leaderboard,
        ("show", []) => Command::Show,
        ("set", _) => Command::Set(rest),
        ("save", []) => Command::Save,
        ("logout", []) => Command::Logout,
        ("quit", []) | ("exit", []) => Command::Quit,
        _ => return None,
    };
    Some(parsed)
}

/// Executes one console command. Returns false when the user asked to quit.
async fn run_command(controller: &AppController, line: &str) -> bool {
    let Some(command) = parse_command(line) else {
        warn!("Unrecognized command: {}", line);
        println!("{}", HELP);
        return true;
    };

    match command {
        Command::Empty => {}
        Command::Login { username, password } => {
            if let Ok(user) = controller.login(username, password).await {
                println!("Logged in as {}.", user.username);
            }
        }
        Command::Register {
            username,
            password,
            email,
        } => {
            if let Ok(user) = controller.register(username, password, email).await {
                println!("Registered as {}.", user.username);
            }
        }
        Command::Leaderboard => {
            if let Some(view) = controller.open_leaderboard().await {
                print_leaderboard(&view, controller.locale());
            }
        }
        Command::Show => match controller.game_state() {
            Some(game_data) => println!("{}", game_data.as_value()),
            None => println!("No game loaded."),
        },
        Command::Set(json) => match serde_json::from_str(json) {
            Ok(value) => controller.set_game_state(GameData::new(value)),
            Err(e) => println!("Invalid JSON: {}", e),
        },
        Command::Save => {
            if !controller.page_exit().await {
                println!("Nothing saved.");
            }
        }
        Command::Logout => controller.logout(),
        Command::Quit => return false,
    }
    true
}

async fn print_notifications(mut notifications: UnboundedReceiver<Notification>) {
    while let Some(notification) = notifications.recv().await {
        let marker = match notification.level {
            NotificationLevel::Info => "i",
            NotificationLevel::Success => "+",
            NotificationLevel::Error => "!",
        };
        println!("[{}] {}", marker, notification.message);
    }
}

fn print_leaderboard(view: &LeaderboardView, locale: Locale) {
    for row in &view.rows {
        let marker = if row.is_current_user { ">" } else { " " };
        println!(
            "{} {:>3}. {:<20} prestige {:>3} ({:.0} pts)  {:.0}",
            marker,
            row.rank,
            row.entry.username,
            row.entry.prestige_level,
            row.entry.prestige_points,
            row.entry.total_money,
        );
    }
    if let Some(standing) = &view.own_standing {
        println!("{}", standing.describe(locale));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_takes_an_optional_email() {
        assert_eq!(
            parse_command("register alice pw"),
            Some(Command::Register {
                username: "alice",
                password: "pw",
                email: None,
            })
        );
        assert_eq!(
            parse_command("register alice pw a@x.io"),
            Some(Command::Register {
                username: "alice",
                password: "pw",
                email: Some("a@x.io"),
            })
        );
    }

    #[test]
    fn extra_arguments_are_rejected() {
        assert_eq!(parse_command("register alice pw a@x.io extra"), None);
        assert_eq!(parse_command("login alice"), None);
        assert_eq!(parse_command("login alice pw extra"), None);
        assert_eq!(parse_command("quit now"), None);
    }

    #[test]
    fn set_keeps_the_raw_json() {
        assert_eq!(
            parse_command(r#"set {"money": 5}"#),
            Some(Command::Set(r#"{"money": 5}"#))
        );
        assert_eq!(parse_command(""), Some(Command::Empty));
    }
}
