// Telegram command handlers: parse, call the service, reply.

use common::commands;
use common::config::Settings;
use common::replies;
use common::service::LectureService;
use std::sync::Arc;
use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    #[command(description = "начать работу с ботом")]
    Start,
    #[command(description = "справка по командам")]
    Help,
    #[command(description = "добавить лекцию: /add ДЕНЬ ЧЧ:ММ [ЧЕТ/НЕЧЕТ/ВСЕ] Название")]
    Add(String),
    #[command(description = "удалить лекцию по номеру из /schedule")]
    Remove(String),
    #[command(description = "показать расписание")]
    Schedule,
}

pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    service: Arc<LectureService>,
    settings: Arc<Settings>,
) -> ResponseResult<()> {
    let chat_id = msg.chat.id.0;
    let timezone = settings.bot.timezone.to_string();

    let reply = match cmd {
        Command::Start => replies::start_text(service.lead_minutes()),
        Command::Help => replies::help_text(service.lead_minutes(), &timezone),
        Command::Add(args) => match commands::parse_add(&args) {
            Ok(request) => {
                let added = service.add_lecture(chat_id, request).await;
                replies::added_text(&added.lecture, added.reminder_time)
            }
            Err(e) => replies::error_text(&e),
        },
        Command::Remove(args) => {
            let outcome = match commands::parse_remove(&args) {
                Ok(position) => service.remove_lecture(chat_id, position).await,
                Err(e) => Err(e),
            };
            match outcome {
                Ok(removed) => replies::removed_text(&removed),
                Err(e) => replies::error_text(&e),
            }
        }
        Command::Schedule => {
            let rows = service.list_schedule(chat_id).await;
            replies::schedule_text(&rows, &timezone)
        }
    };

    bot.send_message(msg.chat.id, reply)
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}
