use crate::{
    input::{Action, Bindings},
    match_controller::MatchController,
};
use log::*;
use std::{
    io::BufRead,
    sync::{Arc, Mutex, PoisonError},
    thread,
};
use tokio::{
    sync::{mpsc, watch},
    task,
    time::{Instant, timeout_at},
};

pub mod console;

mod message;
pub use message::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    /// Keep running, printing these lines
    Continue(Vec<String>),
    Quit,
}

pub struct ScoreboardApp {
    tm: Arc<Mutex<MatchController>>,
    bindings: Bindings,
    msg_tx: mpsc::UnboundedSender<Message>,
    msg_rx: mpsc::UnboundedReceiver<Message>,
}

impl ScoreboardApp {
    pub fn new(tm: MatchController, bindings: Bindings) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        Self {
            tm: Arc::new(Mutex::new(tm)),
            bindings,
            msg_tx,
            msg_rx,
        }
    }

    pub fn update(&mut self, message: Message) -> Flow {
        trace!("Handling message {message:?}");
        let now = Instant::now();
        let mut tm = self.tm.lock().unwrap_or_else(PoisonError::into_inner);
        let mut lines = Vec::new();

        match message {
            Message::Init | Message::Show => {}
            Message::AddPoint(team) => {
                tm.add_point(team, now);
            }
            Message::Undo => apply_action(&mut tm, Action::Undo, &mut lines),
            Message::Redo => {
                if !tm.redo(now) {
                    lines.push("Nada para refazer".to_string());
                }
            }
            Message::EditSettings(patch) => {
                if let Err(e) = tm.update_settings(&patch) {
                    lines.push(e.to_string());
                }
            }
            Message::KeyPress(press) => match self.bindings.key_action(press) {
                Some(action) => apply_action(&mut tm, action, &mut lines),
                None => return Flow::Continue(lines),
            },
            Message::Touch(target) => match self.bindings.touch_action(target) {
                Some(action) => apply_action(&mut tm, action, &mut lines),
                None => return Flow::Continue(lines),
            },
            Message::PointTimeout {
                snapshot,
                notifications,
            } => {
                lines.extend(notifications.iter().map(console::render_notification));
                lines.push(console::render(&snapshot));
                return Flow::Continue(lines);
            }
            Message::Help => return Flow::Continue(vec![console::HELP.to_string()]),
            Message::Unknown(command) => {
                warn!("Unknown command {command:?}");
                lines.push(format!("Comando desconhecido: {command}"));
                lines.push(console::HELP.to_string());
                return Flow::Continue(lines);
            }
            Message::Quit => {
                info!("Quitting");
                return Flow::Quit;
            }
        }

        lines.extend(
            tm.take_notifications()
                .iter()
                .map(console::render_notification),
        );
        lines.push(console::render(&tm.generate_snapshot(now)));
        Flow::Continue(lines)
    }

    /// Drives the scoreboard from stdin until the user quits or input ends
    pub async fn run(mut self) {
        let updater = TimeUpdater {
            tm: self.tm.clone(),
            next_point_rx: self
                .tm
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .get_next_point_rx(),
            msg_tx: self.msg_tx.clone(),
        };
        let updater = task::spawn(updater.run());

        // Stdin blocks, so it gets its own thread rather than a runtime worker
        let input_tx = self.msg_tx.clone();
        thread::spawn(move || read_commands(input_tx));

        let mut next = Some(Message::Init);
        while let Some(message) = next {
            match self.update(message) {
                Flow::Continue(lines) => {
                    for line in lines {
                        println!("{line}");
                    }
                }
                Flow::Quit => break,
            }
            next = self.msg_rx.recv().await;
        }

        updater.abort();
    }
}

fn apply_action(tm: &mut MatchController, action: Action, lines: &mut Vec<String>) {
    match action {
        Action::Undo => {
            if !tm.undo() {
                lines.push("Nada para desfazer".to_string());
            }
        }
    }
}

fn read_commands(msg_tx: mpsc::UnboundedSender<Message>) {
    println!("{}", console::HELP);
    for line in std::io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to read input: {e}");
                break;
            }
        };
        if let Some(message) = console::parse_command(&line) {
            if msg_tx.send(message).is_err() {
                return;
            }
        }
    }
    debug!("Input closed");
    let _ = msg_tx.send(Message::Quit);
}

/// Awards automatic points when they come due, independently of user input
struct TimeUpdater {
    tm: Arc<Mutex<MatchController>>,
    next_point_rx: watch::Receiver<Option<Instant>>,
    msg_tx: mpsc::UnboundedSender<Message>,
}

impl TimeUpdater {
    async fn run(mut self) {
        debug!("Updater started");

        loop {
            let next_point = *self.next_point_rx.borrow_and_update();
            match next_point {
                Some(due) => match timeout_at(due, self.next_point_rx.changed()).await {
                    Err(_) => {}
                    Ok(Err(_)) => break,
                    Ok(Ok(())) => continue,
                },
                None => {
                    debug!("Awaiting a new automatic point");
                    if self.next_point_rx.changed().await.is_err() {
                        break;
                    }
                    continue;
                }
            }

            let message = {
                let mut tm = self.tm.lock().unwrap_or_else(PoisonError::into_inner);
                let now = Instant::now();
                if !tm.update(now) {
                    continue;
                }
                Message::PointTimeout {
                    snapshot: tm.generate_snapshot(now),
                    notifications: tm.take_notifications(),
                }
            };

            if self.msg_tx.send(message).is_err() {
                break;
            }
        }

        debug!("Updater stopped");
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        config::TouchUndo,
        input::{KeyPress, TouchTarget},
        store::MemoryStore,
    };
    use beach_common::{
        bundles::TeamBundle,
        settings::{FinishCondition, GameSettings, SettingsPatch},
        team::TeamName,
    };
    use tokio::time::Duration;

    fn new_app(settings: GameSettings, touch_undo: TouchUndo) -> ScoreboardApp {
        let tm = MatchController::new(Box::new(MemoryStore::new()), settings);
        ScoreboardApp::new(tm, Bindings::new(touch_undo))
    }

    fn set_count_rules() -> GameSettings {
        GameSettings {
            finish_conditions: FinishCondition::SetCount,
            ..Default::default()
        }
    }

    fn scores(app: &ScoreboardApp) -> TeamBundle<u32> {
        app.tm.lock().unwrap().scores()
    }

    fn lines(flow: Flow) -> Vec<String> {
        match flow {
            Flow::Continue(lines) => lines,
            Flow::Quit => panic!("Unexpected quit"),
        }
    }

    #[test]
    fn test_scoring_messages() {
        let mut app = new_app(set_count_rules(), TouchUndo::default());

        let out = lines(app.update(Message::AddPoint(TeamName::A)));
        assert_eq!(out.len(), 1);
        assert!(out[0].contains("Equipe A: 1"));

        app.update(Message::AddPoint(TeamName::B));
        app.update(Message::Undo);
        assert_eq!(scores(&app), TeamBundle::new(1, 0));
        app.update(Message::Redo);
        assert_eq!(scores(&app), TeamBundle::new(1, 1));

        let out = lines(app.update(Message::Redo));
        assert_eq!(out[0], "Nada para refazer");
    }

    #[test]
    fn test_win_message() {
        let mut app = new_app(set_count_rules(), TouchUndo::default());

        app.update(Message::AddPoint(TeamName::B));
        app.update(Message::AddPoint(TeamName::B));
        let out = lines(app.update(Message::AddPoint(TeamName::B)));
        assert_eq!(out[0], "*** A equipe Equipe B venceu! (0 x 3) ***");
        assert!(out[1].contains("Últimos 5 Jogos: 0 x 3"));
    }

    #[test]
    fn test_key_and_touch() {
        let mut app = new_app(set_count_rules(), TouchUndo::UndoControl);

        app.update(Message::AddPoint(TeamName::A));
        app.update(Message::AddPoint(TeamName::A));

        assert_eq!(
            app.update(Message::Touch(TouchTarget::Surface)),
            Flow::Continue(vec![])
        );
        assert_eq!(scores(&app), TeamBundle::new(2, 0));

        app.update(Message::KeyPress(KeyPress::ctrl('z')));
        assert_eq!(scores(&app), TeamBundle::new(1, 0));

        app.update(Message::Touch(TouchTarget::UndoControl));
        assert_eq!(scores(&app), TeamBundle::new(0, 0));

        let out = lines(app.update(Message::KeyPress(KeyPress::ctrl('z'))));
        assert_eq!(out[0], "Nada para desfazer");
    }

    #[test]
    fn test_whole_surface_touch() {
        let mut app = new_app(set_count_rules(), TouchUndo::WholeSurface);

        app.update(Message::AddPoint(TeamName::B));
        app.update(Message::Touch(TouchTarget::Surface));
        assert_eq!(scores(&app), TeamBundle::new(0, 0));
    }

    #[test]
    fn test_settings_messages() {
        let mut app = new_app(GameSettings::default(), TouchUndo::default());

        let out = lines(app.update(Message::EditSettings(SettingsPatch::number_of_sets("0"))));
        assert_eq!(
            out[0],
            "Settings rejected: Número de Sets must be greater than zero, got 0"
        );

        let out = lines(app.update(Message::EditSettings(SettingsPatch::number_of_sets("4"))));
        assert_eq!(out.len(), 1);
        assert!(out[0].contains("Configurações: 4 sets, 90 s, Tempo Esgotado"));
    }

    #[test]
    fn test_quit_and_unknown() {
        let mut app = new_app(GameSettings::default(), TouchUndo::default());

        let out = lines(app.update(Message::Unknown("xyz".to_string())));
        assert_eq!(out[0], "Comando desconhecido: xyz");
        assert_eq!(app.update(Message::Quit), Flow::Quit);
    }

    #[tokio::test(start_paused = true)]
    async fn test_time_updater() {
        let tm = MatchController::new(Box::new(MemoryStore::new()), GameSettings::default());
        let tm = Arc::new(Mutex::new(tm));
        let (msg_tx, mut msg_rx) = mpsc::unbounded_channel();
        let updater = TimeUpdater {
            tm: tm.clone(),
            next_point_rx: tm.lock().unwrap().get_next_point_rx(),
            msg_tx,
        };
        let handle = task::spawn(updater.run());

        let start = Instant::now();
        tm.lock().unwrap().add_point(TeamName::A, start);

        let message = msg_rx.recv().await.unwrap();
        assert!(Instant::now() >= start + Duration::from_secs(90));
        match message {
            Message::PointTimeout {
                snapshot,
                notifications,
            } => {
                assert_eq!(snapshot.scores(), TeamBundle::new(2, 0));
                assert!(notifications.is_empty());
            }
            other => panic!("Unexpected message {other:?}"),
        }

        // An undo cancels the pending point, so nothing more arrives
        tm.lock().unwrap().undo();
        tokio::time::sleep(Duration::from_secs(600)).await;
        assert!(msg_rx.try_recv().is_err());
        assert_eq!(tm.lock().unwrap().scores(), TeamBundle::new(1, 0));

        handle.abort();
    }
}
