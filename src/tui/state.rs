use crate::model::{ActiveView, AnalysisResult, SubmitEvent, SubmitState, TriggerLabel, ViewState};
use crate::orchestrator::SubmissionForm;
use crate::render::{DashboardUpdate, DashboardView, RankingRow};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Form field with keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Document,
    Foundation,
    Competency,
    Density,
}

impl Field {
    pub const ALL: [Field; 4] = [
        Field::Document,
        Field::Foundation,
        Field::Competency,
        Field::Density,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Field::Document => "Transcript (PDF)",
            Field::Foundation => "Foundation weight (wF)",
            Field::Competency => "Competency weight (wC)",
            Field::Density => "Density weight (wD)",
        }
    }

    fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// What the UI loop should do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    None,
    Submit(SubmissionForm),
    NewCycle,
    CopySummary,
    Quit,
}

pub struct UiState {
    pub submit_state: SubmitState,
    pub view: ViewState,
    pub focus: Field,
    pub document: String,
    pub w_foundation: String,
    pub w_competency: String,
    pub w_density: String,
    pub dashboard: DashboardView,
    /// Ranking row whose explanation is shown in the detail pane.
    pub selected_row: usize,
    pub last_result: Option<AnalysisResult>,
    pub completed_at: Option<String>,
    pub info: String,
    pub show_help: bool,
    pub endpoint: String,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            submit_state: SubmitState::Idle,
            view: ViewState::default(),
            focus: Field::Document,
            document: String::new(),
            w_foundation: String::new(),
            w_competency: String::new(),
            w_density: String::new(),
            dashboard: DashboardView::default(),
            selected_row: 0,
            last_result: None,
            completed_at: None,
            info: String::new(),
            show_help: false,
            endpoint: String::new(),
        }
    }
}

impl UiState {
    pub fn with_form(form: &SubmissionForm) -> Self {
        Self {
            document: form
                .document
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            w_foundation: form.w_foundation.clone(),
            w_competency: form.w_competency.clone(),
            w_density: form.w_density.clone(),
            ..Default::default()
        }
    }

    pub fn field_value(&self, field: Field) -> &str {
        match field {
            Field::Document => &self.document,
            Field::Foundation => &self.w_foundation,
            Field::Competency => &self.w_competency,
            Field::Density => &self.w_density,
        }
    }

    fn field_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Document => &mut self.document,
            Field::Foundation => &mut self.w_foundation,
            Field::Competency => &mut self.w_competency,
            Field::Density => &mut self.w_density,
        }
    }

    /// Snapshot of the form as it is right now.
    pub fn current_form(&self) -> SubmissionForm {
        let doc = self.document.trim();
        SubmissionForm {
            document: (!doc.is_empty()).then(|| doc.into()),
            w_foundation: self.w_foundation.clone(),
            w_competency: self.w_competency.clone(),
            w_density: self.w_density.clone(),
        }
    }

    pub fn selected(&self) -> Option<&RankingRow> {
        self.dashboard.rows.get(self.selected_row)
    }

    pub fn total_credits(&self) -> Option<u32> {
        self.last_result.as_ref().and_then(|r| r.total_credits)
    }

    /// Fire the trigger if it is usable, locking it immediately so a second press
    /// cannot slip in before the controller reports `Submitting`.
    pub fn fire_trigger(&mut self) -> KeyAction {
        if !self.view.trigger_enabled {
            return KeyAction::None;
        }
        self.view.trigger_enabled = false;
        self.view.trigger_label = TriggerLabel::Busy;
        self.view.error = None;
        KeyAction::Submit(self.current_form())
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> KeyAction {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return KeyAction::Quit;
        }
        if key.code == KeyCode::F(1) {
            self.show_help = !self.show_help;
            return KeyAction::None;
        }
        if self.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                self.show_help = false;
            }
            return KeyAction::None;
        }

        match self.view.active_view {
            ActiveView::Submission => self.handle_form_key(key),
            ActiveView::Results => self.handle_results_key(key),
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> KeyAction {
        match key.code {
            KeyCode::Esc => KeyAction::Quit,
            KeyCode::Enter => self.fire_trigger(),
            KeyCode::Tab | KeyCode::Down => {
                self.focus = self.focus.next();
                KeyAction::None
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = self.focus.prev();
                KeyAction::None
            }
            KeyCode::Backspace => {
                self.field_mut(self.focus).pop();
                KeyAction::None
            }
            KeyCode::Char(c) => {
                self.field_mut(self.focus).push(c);
                KeyAction::None
            }
            _ => KeyAction::None,
        }
    }

    fn handle_results_key(&mut self, key: KeyEvent) -> KeyAction {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => KeyAction::Quit,
            KeyCode::Char('?') => {
                self.show_help = true;
                KeyAction::None
            }
            KeyCode::Char('c') => KeyAction::CopySummary,
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected_row + 1 < self.dashboard.rows.len() {
                    self.selected_row += 1;
                }
                KeyAction::None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected_row = self.selected_row.saturating_sub(1);
                KeyAction::None
            }
            KeyCode::Char('n') => {
                self.view.active_view = ActiveView::Submission;
                KeyAction::NewCycle
            }
            _ => KeyAction::None,
        }
    }

    pub fn apply_event(&mut self, ev: SubmitEvent) {
        match ev {
            SubmitEvent::StateChanged { state, view } => {
                self.submit_state = state;
                self.view = view;
                match state {
                    SubmitState::Submitting => self.info = "Parsing PDF and running analysis…".into(),
                    SubmitState::Failed => self.info = "Analysis failed".into(),
                    SubmitState::Idle | SubmitState::Success => {}
                }
            }
            SubmitEvent::Dashboard(update) => {
                if matches!(update, DashboardUpdate::Ranking(_)) {
                    self.selected_row = 0;
                }
                self.dashboard.apply_update(update);
            }
            SubmitEvent::Completed {
                result,
                completed_at,
            } => {
                self.info = format!("Analysis complete: {completed_at}");
                self.last_result = Some(*result);
                self.completed_at = Some(completed_at);
            }
            SubmitEvent::Info(msg) => self.info = msg,
        }
    }
}
