//! services/api/src/bot/mod.rs
//!
//! Telegram bot front-end: the inbound update types and the command
//! dispatch shared by webhook delivery. Commands map 1:1 either to static
//! informational replies or to the same core services the REST surface
//! uses.

use chrono::Utc;
use serde::Deserialize;

use crate::error::ApiError;
use crate::web::state::AppState;
use timetrack_core::ports::WebAppButton;

//=========================================================================================
// Inbound Update Types
//=========================================================================================

/// A Telegram `Update` object, reduced to the fields the bot reacts to.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<Sender>,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Sender {
    pub id: i64,
    pub first_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

//=========================================================================================
// Reply Texts
//=========================================================================================

const HELP_TEXT: &str = "🤖 *Time Tracker Bot - Help*\n\n\
*Commands:*\n\
/start - Start the bot\n\
/help - Show this help message\n\
/stats - View your time statistics\n\
/active - Show active time entries\n\
/stop - Stop current time tracking\n\n\
*Features:*\n\
• Track time for tasks and projects\n\
• Create and manage projects\n\
• View detailed statistics";

const OPEN_APP_PROMPT: &str =
    "📊 Open the app to see detailed statistics about your time tracking, tasks, and projects.";

/// `3665` → `"1h 1m"`.
fn format_duration(seconds: i64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

//=========================================================================================
// Command Dispatch
//=========================================================================================

/// Handles one inbound update. Non-command messages and unknown commands
/// are ignored; reply failures propagate so the webhook can report them.
pub async fn handle_update(state: &AppState, update: Update) -> Result<(), ApiError> {
    let Some(message) = update.message else {
        return Ok(());
    };
    let Some(text) = message.text.as_deref() else {
        return Ok(());
    };
    if !text.starts_with('/') {
        return Ok(());
    }

    // "/stats@my_bot arg" -> "/stats"
    let command = text
        .split_whitespace()
        .next()
        .unwrap_or(text)
        .split('@')
        .next()
        .unwrap_or(text);

    let chat_id = message.chat.id;
    let open_app = [WebAppButton {
        label: "📊 Open App".to_string(),
        url: state.config.webapp_url.clone(),
    }];

    match command {
        "/start" => {
            let first_name = message
                .from
                .as_ref()
                .map_or("there", |s| s.first_name.as_str());
            let text = format!(
                "👋 Welcome to Time Tracker Bot, {first_name}!\n\n\
                 Track your time, manage tasks, and boost productivity.\n\n\
                 Click the button below to open the app:"
            );
            let button = [WebAppButton {
                label: "🚀 Open Time Tracker".to_string(),
                url: state.config.webapp_url.clone(),
            }];
            state.bot.send_message(chat_id, &text, &button).await?;
        }
        "/help" => {
            state.bot.send_message(chat_id, HELP_TEXT, &[]).await?;
        }
        "/stats" => {
            let text = match known_user(state, &message).await? {
                Some(user_id) => {
                    let stats = state.stats.time_stats(user_id).await?;
                    format!(
                        "📊 *Your Time Statistics*\n\n\
                         Today: {}\nThis week: {}\nThis month: {}\n\n\
                         Tasks: {} ({} done) · Active projects: {}",
                        format_duration(stats.today),
                        format_duration(stats.this_week),
                        format_duration(stats.this_month),
                        stats.total_tasks,
                        stats.completed_tasks,
                        stats.active_projects,
                    )
                }
                None => OPEN_APP_PROMPT.to_string(),
            };
            state.bot.send_message(chat_id, &text, &open_app).await?;
        }
        "/active" => {
            let text = match known_user(state, &message).await? {
                Some(user_id) => match state.timer.active_timer(user_id).await? {
                    Some(entry) => {
                        let elapsed = (Utc::now() - entry.start_time).num_seconds().max(0);
                        format!(
                            "⏱️ Timer running for {}{}",
                            format_duration(elapsed),
                            entry
                                .description
                                .as_deref()
                                .map(|d| format!(": {d}"))
                                .unwrap_or_default()
                        )
                    }
                    None => "⏱️ No active timer.".to_string(),
                },
                None => OPEN_APP_PROMPT.to_string(),
            };
            state.bot.send_message(chat_id, &text, &open_app).await?;
        }
        "/stop" => {
            let text = match known_user(state, &message).await? {
                Some(user_id) => match state.timer.active_timer(user_id).await? {
                    Some(entry) => {
                        let stopped = state.timer.stop_timer(user_id, entry.id).await?;
                        format!(
                            "⏸️ Timer stopped. Recorded {}.",
                            format_duration(stopped.duration.unwrap_or(0))
                        )
                    }
                    None => "⏱️ No active timer to stop.".to_string(),
                },
                None => OPEN_APP_PROMPT.to_string(),
            };
            state.bot.send_message(chat_id, &text, &open_app).await?;
        }
        _ => {}
    }

    Ok(())
}

/// Maps the Telegram sender onto a stored user, if they have authenticated
/// through the mini-app before.
async fn known_user(
    state: &AppState,
    message: &Message,
) -> Result<Option<uuid::Uuid>, ApiError> {
    let Some(sender) = &message.from else {
        return Ok(None);
    };
    let user = state.store.find_user_by_telegram_id(sender.id).await?;
    Ok(user.map(|u| u.id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_render_hours_and_minutes() {
        assert_eq!(format_duration(0), "0m");
        assert_eq!(format_duration(59), "0m");
        assert_eq!(format_duration(60), "1m");
        assert_eq!(format_duration(3665), "1h 1m");
        assert_eq!(format_duration(7 * 3600 + 5 * 60), "7h 5m");
    }

    #[test]
    fn updates_deserialize_from_telegram_payloads() {
        let update: Update = serde_json::from_str(
            r#"{
                "update_id": 1,
                "message": {
                    "message_id": 10,
                    "from": {"id": 7, "first_name": "Ada", "is_bot": false},
                    "chat": {"id": 7, "type": "private"},
                    "text": "/start"
                }
            }"#,
        )
        .unwrap();
        let message = update.message.unwrap();
        assert_eq!(message.chat.id, 7);
        assert_eq!(message.text.as_deref(), Some("/start"));
    }
}
