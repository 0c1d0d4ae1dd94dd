use std::time::Instant;

use tokio::sync::mpsc;
use tracing::debug;

use crate::api::ApiError;
use crate::board::BoardView;
use crate::coordinator::{confirm_transition, Coordinator, PendingTransition};
use crate::event::KeyAction;
use crate::model::issue::Issue;
use crate::model::status::{DropRequest, Status};

const FLASH_SECS: u64 = 3;

#[derive(Debug, Clone)]
pub enum Action {
    Key(KeyAction),
    Tick,
    /// Backend answer for a status change started from the board.
    TransitionSettled(PendingTransition, Result<Option<Issue>, ApiError>),
    Quit,
}

pub struct Flash {
    pub message: String,
    pub is_error: bool,
    pub at: Instant,
}

pub struct App {
    pub coordinator: Coordinator,
    pub project_id: Option<String>,
    pub selected_column: usize,
    pub selected_row: usize,
    pub show_detail: bool,
    pub confirm_delete: bool,
    pub flash: Option<Flash>,
    pub should_quit: bool,
    action_tx: mpsc::UnboundedSender<Action>,
}

impl App {
    pub fn new(
        coordinator: Coordinator,
        project_id: Option<String>,
        action_tx: mpsc::UnboundedSender<Action>,
    ) -> Self {
        Self {
            coordinator,
            project_id,
            selected_column: 0,
            selected_row: 0,
            show_detail: false,
            confirm_delete: false,
            flash: None,
            should_quit: false,
            action_tx,
        }
    }

    pub fn board(&self) -> BoardView<'_> {
        BoardView::project(self.coordinator.store())
    }

    pub fn selected_status(&self) -> Status {
        Status::from_index(self.selected_column).unwrap_or_default()
    }

    pub fn selected_issue(&self) -> Option<&Issue> {
        BoardView::project(self.coordinator.store())
            .issue_at(self.selected_status(), self.selected_row)
    }

    pub async fn update(&mut self, action: Action) {
        match action {
            Action::Key(key) => self.handle_key(key).await,
            Action::Tick => {
                if self
                    .flash
                    .as_ref()
                    .is_some_and(|f| f.at.elapsed().as_secs() >= FLASH_SECS)
                {
                    self.flash = None;
                }
            }
            Action::TransitionSettled(pending, result) => {
                let _ = self.coordinator.finish_transition(pending, result);
            }
            Action::Quit => {
                self.should_quit = true;
            }
        }
        self.clamp_selection();
        self.show_notifications();
    }

    async fn handle_key(&mut self, key: KeyAction) {
        if self.confirm_delete {
            self.confirm_delete = false;
            if key == KeyAction::Confirm {
                self.delete_selected().await;
            }
            return;
        }

        match key {
            KeyAction::Up => {
                self.selected_row = self.selected_row.saturating_sub(1);
            }
            KeyAction::Down => {
                self.selected_row += 1;
            }
            KeyAction::Left => {
                self.selected_column = self.selected_column.saturating_sub(1);
            }
            KeyAction::Right => {
                if self.selected_column + 1 < Status::ALL.len() {
                    self.selected_column += 1;
                }
            }
            KeyAction::MoveLeft => {
                if let Some(target) = self.selected_status().previous() {
                    self.drop_selected(target);
                }
            }
            KeyAction::MoveRight => {
                if let Some(target) = self.selected_status().next() {
                    self.drop_selected(target);
                }
            }
            KeyAction::DropOn(index) => {
                if let Some(target) = Status::from_index(index) {
                    self.drop_selected(target);
                }
            }
            KeyAction::Select => {
                if let Some(id) = self.selected_issue().map(|i| i.id.clone()) {
                    if self.coordinator.fetch_issue(&id).await.is_ok() {
                        self.show_detail = true;
                    }
                }
            }
            KeyAction::Escape => {
                self.show_detail = false;
                self.coordinator.clear_current();
                self.coordinator.clear_error();
            }
            KeyAction::Refresh => self.refresh().await,
            KeyAction::Delete => {
                if let Some(issue) = self.selected_issue() {
                    let message = format!("Delete {}? y to confirm", issue.title);
                    self.confirm_delete = true;
                    self.set_flash(message, false);
                }
            }
            KeyAction::Confirm => {}
        }
    }

    /// Move the selected card, then confirm with the backend in the background.
    fn drop_selected(&mut self, target: Status) {
        let Some(issue) = self.selected_issue() else {
            return;
        };
        let drop = DropRequest {
            issue_id: issue.id.clone(),
            source: issue.status,
            target,
        };
        let Ok(Some(pending)) = self.coordinator.begin_drop(&drop) else {
            return;
        };

        // Keep the moved card selected.
        if let Some((status, row)) = self.board().locate(&drop.issue_id) {
            self.selected_column = status.index();
            self.selected_row = row;
        }

        let api = self.coordinator.api();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let result = confirm_transition(api.as_ref(), &pending).await;
            if tx.send(Action::TransitionSettled(pending, result)).is_err() {
                debug!("board closed before status change settled");
            }
        });
    }

    async fn delete_selected(&mut self) {
        if let Some(id) = self.selected_issue().map(|i| i.id.clone()) {
            let _ = self.coordinator.delete(&id).await;
        }
    }

    pub async fn refresh(&mut self) {
        match self.project_id.clone() {
            Some(project_id) => {
                let _ = self.coordinator.fetch_project(&project_id).await;
            }
            None => self.set_flash(
                "No project selected. Run nexus <project-id> or set project_id in config".into(),
                true,
            ),
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.board().column(self.selected_status()).issues.len();
        self.selected_row = self.selected_row.min(len.saturating_sub(1));
    }

    fn show_notifications(&mut self) {
        if let Some(latest) = self.coordinator.take_notifications().pop() {
            self.set_flash(latest.message().to_string(), latest.is_error());
        }
    }

    fn set_flash(&mut self, message: String, is_error: bool) {
        self.flash = Some(Flash {
            message,
            is_error,
            at: Instant::now(),
        });
    }
}
