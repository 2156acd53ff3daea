//! services/client/src/messages.rs
//!
//! Localized user-facing strings. Russian is the game's primary language.

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Locale {
    #[default]
    Ru,
    En,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ru" => Ok(Locale::Ru),
            "en" => Ok(Locale::En),
            other => Err(format!("'{}' is not a supported locale (ru, en)", other)),
        }
    }
}

/// Every message the client shows to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    RegistrationFailed,
    LoginFailed,
    ServerUnreachable,
    SessionSuperseded,
    LoadingData,
    RegistrationSucceeded,
    LeaderboardFailed,
    Online,
    Offline,
    PositionUnknown,
}

impl Locale {
    pub fn text(self, message: Message) -> &'static str {
        use Message::*;
        match (self, message) {
            (Locale::Ru, RegistrationFailed) => "Ошибка регистрации",
            (Locale::Ru, LoginFailed) => "Ошибка входа",
            (Locale::Ru, ServerUnreachable) => "Ошибка подключения к серверу",
            (Locale::Ru, SessionSuperseded) => "Сессия была завершена",
            (Locale::Ru, LoadingData) => "Загрузка данных...",
            (Locale::Ru, RegistrationSucceeded) => {
                "Регистрация успешна! Добро пожаловать в Finance Empire!"
            }
            (Locale::Ru, LeaderboardFailed) => "Ошибка загрузки лидерборда",
            (Locale::Ru, Online) => "✓ Онлайн",
            (Locale::Ru, Offline) => "✗ Офлайн",
            (Locale::Ru, PositionUnknown) => "Позиция неизвестна",

            (Locale::En, RegistrationFailed) => "Registration failed",
            (Locale::En, LoginFailed) => "Login failed",
            (Locale::En, ServerUnreachable) => "Could not connect to the server",
            (Locale::En, SessionSuperseded) => "The session was ended",
            (Locale::En, LoadingData) => "Loading data...",
            (Locale::En, RegistrationSucceeded) => {
                "Registration successful! Welcome to Finance Empire!"
            }
            (Locale::En, LeaderboardFailed) => "Failed to load the leaderboard",
            (Locale::En, Online) => "✓ Online",
            (Locale::En, Offline) => "✗ Offline",
            (Locale::En, PositionUnknown) => "Position unknown",
        }
    }

    /// "Your position in the overall ranking: X of Y".
    pub fn position(self, position: u64, total: u64) -> String {
        match self {
            Locale::Ru => format!("Ваша позиция в общем рейтинге: {} из {}", position, total),
            Locale::En => format!("Your position in the overall ranking: {} of {}", position, total),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Locale::Ru => "ru",
            Locale::En => "en",
        })
    }
}
