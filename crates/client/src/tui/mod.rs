mod screens;

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use nimmt::{ClickTarget, Error, Scene};

use crate::play::{Board, Frontend};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Hand,
    Stacks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    Click(ClickTarget),
}

/// Cursor state, independent of the terminal so it can be driven in tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Controls {
    pub focus: Focus,
    pub cursor: usize,
}

impl Default for Controls {
    fn default() -> Self {
        Self {
            focus: Focus::Hand,
            cursor: 0,
        }
    }
}

impl Controls {
    fn len(&self, scene: &Scene) -> usize {
        match self.focus {
            Focus::Hand => scene.own.as_ref().map_or(0, |own| own.hand.len()),
            Focus::Stacks => scene.stacks.len(),
        }
    }

    /// Keeps the cursor on an existing element after the scene changed.
    pub fn clamp(&mut self, scene: &Scene) {
        self.cursor = self.cursor.min(self.len(scene).saturating_sub(1));
    }

    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers, scene: &Scene) -> Action {
        if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
            return Action::Quit;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Hand => Focus::Stacks,
                    Focus::Stacks => Focus::Hand,
                };
                self.clamp(scene);
                Action::None
            }
            KeyCode::Left | KeyCode::Up | KeyCode::Char('h') | KeyCode::Char('k') => {
                self.cursor = self.cursor.saturating_sub(1);
                Action::None
            }
            KeyCode::Right | KeyCode::Down | KeyCode::Char('l') | KeyCode::Char('j') => {
                self.cursor += 1;
                self.clamp(scene);
                Action::None
            }
            KeyCode::Enter if self.len(scene) > 0 => Action::Click(match self.focus {
                Focus::Hand => ClickTarget::HandCard(self.cursor),
                Focus::Stacks => ClickTarget::Stack(self.cursor),
            }),
            KeyCode::Char(c @ '1'..='9') => {
                let row = c as usize - '1' as usize;
                self.focus = Focus::Stacks;
                self.cursor = row;
                self.clamp(scene);
                Action::Click(ClickTarget::Stack(row))
            }
            _ => Action::None,
        }
    }
}

pub struct Tui {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    controls: Controls,
    notice: Option<String>,
}

impl Tui {
    pub fn new() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            controls: Controls::default(),
            notice: None,
        })
    }

    fn click(&mut self, target: ClickTarget, board: &Board<'_>) {
        let Some(intent) = board.scene.click(target) else {
            return;
        };
        self.notice = match board.gate.submit(intent) {
            Ok(()) => None,
            Err(Error::InvalidLocalAction(rejection)) => {
                log::trace!("Click on {:?} rejected: {}", target, rejection);
                Some(rejection.to_string())
            }
            Err(e) => {
                log::debug!("Click on {:?} not sent: {}", target, e);
                Some(String::from("not connected"))
            }
        };
    }

    pub fn restore_terminal(&mut self) -> io::Result<()> {
        terminal::disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            cursor::Show
        )?;
        Ok(())
    }
}

impl Frontend for Tui {
    fn frame(&mut self, board: &Board<'_>) -> anyhow::Result<bool> {
        self.controls.clamp(board.scene);

        let controls = self.controls;
        let notice = self.notice.as_deref();
        self.terminal.draw(|frame| {
            screens::render(frame, board, controls, notice);
        })?;

        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match self.controls.handle_key(key.code, key.modifiers, board.scene) {
                        Action::None => {}
                        Action::Quit => return Ok(false),
                        Action::Click(target) => self.click(target, board),
                    }
                }
            }
        }

        Ok(true)
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = self.restore_terminal();
    }
}
