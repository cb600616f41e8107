#[cfg(test)]
#[path = "app_state_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::sync::oneshot;
use tui_textarea::Input;
use tui_textarea::Key;

use crate::domain::models::Action;
use crate::domain::models::ActionRegistry;
use crate::domain::models::Assignment;
use crate::domain::models::AssignmentClock;
use crate::domain::models::ChannelMode;
use crate::domain::models::ChannelStatus;
use crate::domain::models::ConfirmPrompt;
use crate::domain::models::ControlAction;
use crate::domain::models::ControlRequest;
use crate::domain::models::Event;
use crate::domain::models::Indicator;
use crate::domain::models::Notice;
use crate::domain::models::OutputRegion;
use crate::domain::models::PageSnapshot;
use crate::domain::models::Session;
use crate::domain::models::SessionView;
use crate::domain::models::TextArea;

const MAX_NOTICES: usize = 20;

pub enum Modal<'a> {
    Confirm(ConfirmPrompt, Option<oneshot::Sender<bool>>),
    Prompt(ControlAction, tui_textarea::TextArea<'a>),
}

/// Everything the terminal shows. Only the UI loop mutates it.
pub struct AppState<'a> {
    pub mode: ChannelMode,
    pub registry: ActionRegistry,
    pub status: ChannelStatus,
    pub session: Session,
    pub assignments: Vec<Assignment>,
    pub clock: Option<AssignmentClock>,
    pub regions: Vec<OutputRegion>,
    pub notices: Vec<Notice>,
    /// Nothing is selected until the user moves through the list.
    pub selected: Option<usize>,
    /// Set once the submission is final. Cleared by the next reload.
    pub locked: bool,
    pub modal: Option<Modal<'a>>,
}

impl<'a> AppState<'a> {
    pub fn new(mode: ChannelMode, registry: ActionRegistry, snapshot: PageSnapshot) -> AppState<'a> {
        let mut app_state = AppState {
            mode,
            registry,
            status: ChannelStatus::Connecting,
            session: Session::default(),
            assignments: vec![],
            clock: None,
            regions: vec![],
            notices: vec![],
            selected: None,
            locked: false,
            modal: None,
        };

        app_state.reset(snapshot);
        return app_state;
    }

    /// Rebuilds session state from a freshly loaded snapshot.
    pub fn reset(&mut self, snapshot: PageSnapshot) {
        self.clock = snapshot.initial_clock();
        self.session = snapshot.session;
        self.assignments = snapshot.assignments;
        self.regions = vec![OutputRegion::new(OutputRegion::COMPILE)];
        self.regions
            .extend(snapshot.tests.iter().map(|e| return OutputRegion::new(e)));
        self.modal = None;
        self.selected = None;
        self.locked = false;
    }

    fn list_len(&self) -> usize {
        match self.mode {
            ChannelMode::Control => return self.assignments.len(),
            ChannelMode::Feedback => return self.regions.len(),
        }
    }

    pub fn select_next(&mut self) {
        let len = self.list_len();
        if len == 0 {
            return;
        }

        self.selected = match self.selected {
            Some(idx) => Some((idx + 1).min(len - 1)),
            None => Some(0),
        };
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.map(|e| return e.saturating_sub(1));
    }

    pub fn selected_assignment(&self) -> Option<&Assignment> {
        if self.mode != ChannelMode::Control {
            return None;
        }

        return self.selected.and_then(|e| return self.assignments.get(e));
    }

    pub fn session_view(&self) -> SessionView {
        return SessionView {
            session: self.session.clone(),
            selected: self.selected_assignment().cloned(),
        };
    }

    pub fn checked_tests(&self) -> Vec<String> {
        return self
            .regions
            .iter()
            .filter(|e| return e.is_test() && e.checked)
            .map(|e| return e.id.to_string())
            .collect();
    }

    fn toggle_selected_test(&mut self) {
        if self.mode != ChannelMode::Feedback {
            return;
        }

        let region = self.selected.and_then(|e| return self.regions.get_mut(e));
        if let Some(region) = region {
            if region.is_test() {
                region.checked = !region.checked;
            }
        }
    }

    pub fn add_notice(&mut self, notice: Notice) {
        self.notices.push(notice);
        if self.notices.len() > MAX_NOTICES {
            self.notices.remove(0);
        }
    }

    pub fn tick(&mut self, elapsed: Duration) {
        if let Some(clock) = self.clock.as_mut() {
            clock.tick(elapsed);
        }
    }

    fn sync_running_assignment(&mut self, remaining: i64, total: i64) {
        if !self.session.running {
            return;
        }

        let active = match self.session.active_assignment_id.as_deref() {
            Some(active) => active.to_string(),
            None => return,
        };

        if let Some(assignment) = self
            .assignments
            .iter_mut()
            .find(|e| return e.identity() == active)
        {
            assignment.remaining_time_seconds = remaining.max(0) as u64;
            assignment.total_time_seconds = total.max(0) as u64;
        }
    }

    fn region_mut(&mut self, id: &str) -> &mut OutputRegion {
        let idx = match self.regions.iter().position(|e| return e.id == id) {
            Some(idx) => idx,
            None => {
                self.regions.push(OutputRegion::new(id));
                self.regions.len() - 1
            }
        };

        return &mut self.regions[idx];
    }

    /// Applies a service event. Keyboard, tick and reload events belong to
    /// the UI loop and are ignored here.
    pub fn apply(&mut self, event: Event) {
        match event {
            Event::ChannelStatus(status) => self.status = status,
            Event::ClockPrime(total) => match self.clock.as_mut() {
                Some(clock) => clock.prime(total),
                None => self.clock = Some(AssignmentClock::new(total, total)),
            },
            Event::ClockStop() => {
                if let Some(clock) = self.clock.as_mut() {
                    clock.stop();
                }
            }
            Event::ClockSync(remaining, total) => {
                if let Some(clock) = self.clock.as_mut() {
                    clock.sync(remaining, total);
                    self.sync_running_assignment(remaining, total);
                }
            }
            Event::ConfirmRequested(prompt, answer) => {
                self.modal = Some(Modal::Confirm(prompt, Some(answer)));
            }
            Event::EditorsLocked() => self.locked = true,
            Event::Feedback(id, text, success) => {
                let region = self.region_mut(&id);
                region.text = text;
                region.indicator = Indicator::from_success(success);
            }
            Event::IndicatorsReset() => {
                for region in self.regions.iter_mut() {
                    region.indicator = Indicator::Neutral;
                }
            }
            Event::Notice(notice) => self.add_notice(notice),
            Event::OutputsCleared() => {
                for region in self.regions.iter_mut() {
                    region.text = "".to_string();
                    region.indicator = Indicator::Neutral;
                }
            }
            Event::KeyboardCTRLC()
            | Event::KeyboardInput(_)
            | Event::Reload()
            | Event::UITick() => {}
        }
    }

    fn request(&self, action: ControlAction, argument: Option<String>) -> Action {
        let mut request = ControlRequest::new(action, self.session_view());
        request.argument = argument;
        request.tests = self.checked_tests();
        return Action::Control(request);
    }

    fn answer_confirm(&mut self, accept: bool) {
        if let Some(Modal::Confirm(_, answer)) = self.modal.as_mut() {
            if let Some(answer) = answer.take() {
                let _ = answer.send(accept);
            }
        }
        self.modal = None;
    }

    fn handle_modal_input(&mut self, input: Input, tx: &mpsc::UnboundedSender<Action>) -> Result<()> {
        match self.modal.as_mut() {
            Some(Modal::Confirm(..)) => match input.key {
                Key::Char('y') | Key::Enter => self.answer_confirm(true),
                Key::Char('n') | Key::Esc => self.answer_confirm(false),
                _ => {}
            },
            Some(Modal::Prompt(action, textarea)) => match input.key {
                Key::Enter => {
                    let action = *action;
                    let argument = textarea.lines().join("");
                    self.modal = None;
                    tx.send(self.request(action, Some(argument)))?;
                }
                Key::Esc => self.modal = None,
                _ => {
                    textarea.input(input);
                }
            },
            None => {}
        }

        return Ok(());
    }

    /// Keys either drive the open modal, move the selection, or trigger the
    /// action bound to them.
    pub fn handle_input(&mut self, input: Input, tx: &mpsc::UnboundedSender<Action>) -> Result<()> {
        if self.modal.is_some() {
            return self.handle_modal_input(input, tx);
        }

        match input {
            Input { key: Key::Down, .. } => self.select_next(),
            Input { key: Key::Up, .. } => self.select_previous(),
            Input {
                key: Key::Char(' '),
                ..
            } => self.toggle_selected_test(),
            Input {
                key: Key::Char(c),
                ctrl: false,
                alt: false,
            } => {
                if let Some(action) = self.registry.resolve(c) {
                    if action.needs_argument() {
                        self.modal = Some(Modal::Prompt(action, TextArea::for_action(action)));
                    } else {
                        tx.send(self.request(action, None))?;
                    }
                }
            }
            _ => {}
        }

        return Ok(());
    }
}
