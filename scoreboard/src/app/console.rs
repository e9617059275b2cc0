use super::message::Message;
use crate::{
    input::{KeyPress, TouchTarget},
    match_controller::Notification,
};
use beach_common::{
    match_snapshot::MatchSnapshot,
    settings::{FinishCondition, SettingsPatch},
    team::TeamName,
};
use std::fmt::Write;

pub const HELP: &str = "\
Comandos:
  a | b                     ponto para Equipe A | Equipe B
  u | undo                  desfazer o último ponto
  r | redo                  refazer o último ponto desfeito
  ^z                        atalho Ctrl+Z
  touch <undo|surface|other>
  sets <n>                  número de sets para vencer
  duration <s>              duração de cada ponto em segundos
  finish <time|sets>        condição de finalização
  show | help | quit";

/// Turns one line of console input into a message. Blank lines produce nothing.
pub fn parse_command(line: &str) -> Option<Message> {
    let line = line.trim();
    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };
    if command.is_empty() {
        return None;
    }

    let unknown = || Message::Unknown(line.to_string());

    let message = match (command.to_lowercase().as_str(), rest) {
        ("a", "") => Message::AddPoint(TeamName::A),
        ("b", "") => Message::AddPoint(TeamName::B),
        ("u" | "undo", "") => Message::Undo,
        ("r" | "redo", "") => Message::Redo,
        ("touch", "undo") => Message::Touch(TouchTarget::UndoControl),
        ("touch", "surface") => Message::Touch(TouchTarget::Surface),
        ("touch", "other") => Message::Touch(TouchTarget::OtherControl),
        ("sets", value) if !value.is_empty() => {
            Message::EditSettings(SettingsPatch::number_of_sets(value))
        }
        ("duration", value) if !value.is_empty() => {
            Message::EditSettings(SettingsPatch::duration(value))
        }
        ("finish", "time") => Message::EditSettings(SettingsPatch::finish_conditions(
            FinishCondition::TimeExpired.label(),
        )),
        ("finish", "sets") => Message::EditSettings(SettingsPatch::finish_conditions(
            FinishCondition::SetCount.label(),
        )),
        ("finish", value) if !value.is_empty() => {
            Message::EditSettings(SettingsPatch::finish_conditions(value))
        }
        ("show", "") => Message::Show,
        ("help" | "?", "") => Message::Help,
        ("q" | "quit" | "exit", "") => Message::Quit,
        (_, "") => parse_key_press(command).map_or_else(unknown, Message::KeyPress),
        _ => unknown(),
    };
    Some(message)
}

fn parse_key_press(command: &str) -> Option<KeyPress> {
    let key = command
        .strip_prefix('^')
        .or_else(|| command.strip_prefix("ctrl+"))?;
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(key), None) => Some(KeyPress::ctrl(key)),
        _ => None,
    }
}

pub fn render_notification(notification: &Notification) -> String {
    format!("*** {notification} ***")
}

pub fn render(snapshot: &MatchSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Placar de Beach Tennis ===");
    let _ = writeln!(
        out,
        "  {}: {}    {}: {}",
        snapshot.teams.a.name,
        snapshot.teams.a.score,
        snapshot.teams.b.name,
        snapshot.teams.b.score
    );
    if let Some(pending) = snapshot.pending_point {
        let _ = writeln!(out, "  Próximo ponto automático: {pending}");
    }
    if let Some(winner) = snapshot.winner {
        let _ = writeln!(out, "  Vencedor: {winner}");
    }
    let _ = writeln!(
        out,
        "  Desfazer (Ctrl+Z): {}    Refazer: {}",
        availability(snapshot.can_undo),
        availability(snapshot.can_redo)
    );
    let _ = writeln!(
        out,
        "  Configurações: {} sets, {} s, {}",
        snapshot.settings.number_of_sets,
        snapshot.settings.duration,
        snapshot.settings.finish_conditions
    );
    if snapshot.last_five_games.is_empty() {
        let _ = write!(out, "  Últimos 5 Jogos: -");
    } else {
        let games: Vec<_> = snapshot.last_five_games.iter().collect();
        let _ = write!(out, "  Últimos 5 Jogos: {}", games.join(", "));
    }
    out
}

fn availability(available: bool) -> &'static str {
    if available { "sim" } else { "não" }
}
