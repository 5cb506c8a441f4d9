use crate::model::{Phase, Shape};
use crate::sim::{Action, Command};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::time::Duration;

const NAME_MAX: usize = 18;

#[derive(Clone, Debug)]
pub(crate) struct InputEvent {
    pub(crate) key: KeyCode,
    pub(crate) mods: KeyModifiers,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum UiAction {
    NameChar(char),
    NameBackspace,
    ShapeCycle(i32),
    Submit,
    HelpToggle,
    Quit,
    Game(Command),
}

/// Front-end state that is not part of the game: the setup form and the
/// help overlay.
#[derive(Clone, Debug)]
pub(crate) struct UiState {
    pub(crate) name_edit: String,
    pub(crate) shape: Shape,
    pub(crate) help: bool,
}

impl UiState {
    pub(crate) fn new(name: &str, shape: Shape) -> Self {
        Self {
            name_edit: name.chars().take(NAME_MAX).collect(),
            shape,
            help: false,
        }
    }

    /// Applies form edits and returns the game command, if any, to dispatch.
    pub(crate) fn apply(&mut self, action: UiAction) -> Option<Command> {
        match action {
            UiAction::NameChar(ch) => {
                if self.name_edit.chars().count() < NAME_MAX {
                    self.name_edit.push(ch);
                }
                None
            }
            UiAction::NameBackspace => {
                self.name_edit.pop();
                None
            }
            UiAction::ShapeCycle(step) => {
                self.shape = self.shape.cycle(step);
                None
            }
            UiAction::Submit => Some(Command::StartGame {
                name: self.name_edit.clone(),
                shape: Some(self.shape),
            }),
            UiAction::HelpToggle => {
                self.help = !self.help;
                None
            }
            UiAction::Quit => None,
            UiAction::Game(Command::NewGame) => {
                self.help = false;
                Some(Command::NewGame)
            }
            UiAction::Game(cmd) => Some(cmd),
        }
    }
}

pub(crate) fn collect_input_nonblocking(max_frame_time: Duration) -> anyhow::Result<Vec<InputEvent>> {
    let mut out = Vec::new();

    // poll with a tiny timeout so we stay responsive
    let timeout = std::cmp::min(Duration::from_millis(1), max_frame_time);
    while event::poll(timeout)? {
        if let Event::Key(k) = event::read()? {
            if k.kind == KeyEventKind::Press || k.kind == KeyEventKind::Repeat {
                out.push(InputEvent {
                    key: k.code,
                    mods: k.modifiers,
                });
                if out.len() >= 32 {
                    break;
                }
            }
        }
    }
    Ok(out)
}

pub(crate) fn map_event_to_action(phase: Phase, ui: &UiState, ev: InputEvent) -> Option<UiAction> {
    if matches!(ev.key, KeyCode::Char('c') | KeyCode::Char('C'))
        && ev.mods.contains(KeyModifiers::CONTROL)
    {
        return Some(UiAction::Quit);
    }

    if phase == Phase::Setup {
        return match ev.key {
            KeyCode::Enter => Some(UiAction::Submit),
            KeyCode::Esc => Some(UiAction::Quit),
            KeyCode::Backspace => Some(UiAction::NameBackspace),
            KeyCode::Left | KeyCode::Up => Some(UiAction::ShapeCycle(-1)),
            KeyCode::Right | KeyCode::Down | KeyCode::Tab => Some(UiAction::ShapeCycle(1)),
            KeyCode::Char(ch) => {
                if (ch.is_ascii() && !ch.is_ascii_control()) || ch == ' ' {
                    Some(UiAction::NameChar(ch))
                } else {
                    None
                }
            }
            _ => None,
        };
    }

    if ui.help {
        return match ev.key {
            KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('H') => Some(UiAction::HelpToggle),
            KeyCode::Char('n') | KeyCode::Char('N') => Some(UiAction::Game(Command::NewGame)),
            KeyCode::Char('q') | KeyCode::Char('Q') => Some(UiAction::Quit),
            _ => None,
        };
    }

    match ev.key {
        KeyCode::Char('t') | KeyCode::Char('T') => Some(UiAction::Game(Command::Act(Action::Treat))),
        KeyCode::Char('f') | KeyCode::Char('F') => Some(UiAction::Game(Command::Act(Action::Feed))),
        KeyCode::Char('e') | KeyCode::Char('E') => {
            Some(UiAction::Game(Command::Act(Action::Exercise)))
        }
        KeyCode::Char('p') | KeyCode::Char('P') => Some(UiAction::Game(Command::Act(Action::Play))),
        KeyCode::Char('n') | KeyCode::Char('N') => Some(UiAction::Game(Command::NewGame)),
        KeyCode::Char('h') | KeyCode::Char('H') => Some(UiAction::HelpToggle),
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Some(UiAction::Quit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> InputEvent {
        InputEvent {
            key: code,
            mods: KeyModifiers::NONE,
        }
    }

    #[test]
    fn setup_keys_edit_the_form() {
        let ui = UiState::new("", Shape::Circle);
        assert_eq!(
            map_event_to_action(Phase::Setup, &ui, key(KeyCode::Char('f'))),
            Some(UiAction::NameChar('f'))
        );
        assert_eq!(
            map_event_to_action(Phase::Setup, &ui, key(KeyCode::Right)),
            Some(UiAction::ShapeCycle(1))
        );
        assert_eq!(
            map_event_to_action(Phase::Setup, &ui, key(KeyCode::Enter)),
            Some(UiAction::Submit)
        );
    }

    #[test]
    fn playing_keys_map_to_actions() {
        let ui = UiState::new("Rex", Shape::Square);
        let cases = [
            ('t', Action::Treat),
            ('f', Action::Feed),
            ('e', Action::Exercise),
            ('p', Action::Play),
        ];
        for (ch, action) in cases {
            assert_eq!(
                map_event_to_action(Phase::Playing, &ui, key(KeyCode::Char(ch))),
                Some(UiAction::Game(Command::Act(action)))
            );
        }
        assert_eq!(
            map_event_to_action(Phase::Playing, &ui, key(KeyCode::Char('n'))),
            Some(UiAction::Game(Command::NewGame))
        );
    }

    #[test]
    fn help_overlay_swallows_action_keys() {
        let mut ui = UiState::new("Rex", Shape::Square);
        ui.help = true;
        assert_eq!(map_event_to_action(Phase::Playing, &ui, key(KeyCode::Char('t'))), None);
        assert_eq!(
            map_event_to_action(Phase::Playing, &ui, key(KeyCode::Esc)),
            Some(UiAction::HelpToggle)
        );
    }

    #[test]
    fn new_game_stays_reachable_from_help() {
        let mut ui = UiState::new("Rex", Shape::Square);
        ui.help = true;
        let action = map_event_to_action(Phase::Playing, &ui, key(KeyCode::Char('N')));
        assert_eq!(action, Some(UiAction::Game(Command::NewGame)));
        assert_eq!(ui.apply(UiAction::Game(Command::NewGame)), Some(Command::NewGame));
        assert!(!ui.help);
    }

    #[test]
    fn ctrl_c_quits_everywhere() {
        let ui = UiState::new("", Shape::Circle);
        let ev = InputEvent {
            key: KeyCode::Char('c'),
            mods: KeyModifiers::CONTROL,
        };
        assert_eq!(map_event_to_action(Phase::Setup, &ui, ev.clone()), Some(UiAction::Quit));
        assert_eq!(map_event_to_action(Phase::Playing, &ui, ev), Some(UiAction::Quit));
    }

    #[test]
    fn form_submits_name_and_shape() {
        let mut ui = UiState::new("", Shape::Circle);
        for ch in "Rex".chars() {
            ui.apply(UiAction::NameChar(ch));
        }
        ui.apply(UiAction::ShapeCycle(-1));
        assert_eq!(
            ui.apply(UiAction::Submit),
            Some(Command::StartGame {
                name: "Rex".to_string(),
                shape: Some(Shape::Triangle),
            })
        );
    }

    #[test]
    fn name_is_capped() {
        let mut ui = UiState::new("", Shape::Circle);
        for _ in 0..40 {
            ui.apply(UiAction::NameChar('a'));
        }
        assert_eq!(ui.name_edit.len(), NAME_MAX);
        ui.apply(UiAction::NameBackspace);
        assert_eq!(ui.name_edit.len(), NAME_MAX - 1);
    }
}
