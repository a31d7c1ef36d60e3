use crate::card::{CardAction, TaskCard};
use crate::kanban_board::{BoardEvent, Command, KanbanBoard};
use crate::task::{Bucket, Task, TaskId};
use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::{Position, Rect};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing(Field),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Description,
}

impl Field {
    fn other(self) -> Self {
        match self {
            Field::Title => Field::Description,
            Field::Description => Field::Title,
        }
    }
}

/// A card in flight. `task` is the drag payload, `target` the column the
/// card would be dropped on right now.
#[derive(Debug, Clone, PartialEq)]
pub struct Drag {
    pub task: Task,
    pub origin: Bucket,
    pub target: Bucket,
    moved: bool,
}

/// Screen regions from the last frame, used to resolve mouse positions.
#[derive(Debug, Default)]
pub struct Hitboxes {
    pub columns: Vec<(Bucket, Rect)>,
    pub cards: Vec<(TaskId, Rect)>,
    pub fields: Vec<(Field, Rect)>,
    pub add_button: Rect,
}

impl Hitboxes {
    pub fn clear(&mut self) {
        self.columns.clear();
        self.cards.clear();
        self.fields.clear();
        self.add_button = Rect::default();
    }

    fn column_at(&self, pos: Position) -> Option<Bucket> {
        self.columns
            .iter()
            .find(|(_, area)| area.contains(pos))
            .map(|(bucket, _)| *bucket)
    }

    fn card_at(&self, pos: Position) -> Option<(&TaskId, Rect)> {
        self.cards
            .iter()
            .find(|(_, area)| area.contains(pos))
            .map(|(id, area)| (id, *area))
    }

    fn field_at(&self, pos: Position) -> Option<Field> {
        self.fields
            .iter()
            .find(|(_, area)| area.contains(pos))
            .map(|(field, _)| *field)
    }
}

pub struct App {
    pub board: KanbanBoard,
    pub input_mode: InputMode,
    pub selected_bucket: Bucket,
    pub selected_task: usize,
    pub drag: Option<Drag>,
    pub alert: Option<String>,
    pub pending: usize,
    pub is_running: bool,
    pub hitboxes: Hitboxes,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> App {
        App {
            board: KanbanBoard::new(),
            input_mode: InputMode::Normal,
            selected_bucket: Bucket::Todo,
            selected_task: 0,
            drag: None,
            alert: None,
            pending: 0,
            is_running: true,
            hitboxes: Hitboxes::default(),
        }
    }

    /// Translates one terminal event into at most one remote call.
    pub fn handle_event(&mut self, event: &Event) -> Option<Command> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(*key),
            Event::Mouse(mouse) => self.handle_mouse(*mouse),
            _ => None,
        }
    }

    pub fn on_completion(&mut self, event: BoardEvent) {
        self.pending = self.pending.saturating_sub(1);
        self.board.apply(event);
        if let Some(drag) = &self.drag {
            if self.board.find(&drag.task.id).is_none() {
                debug!(id = %drag.task.id, "dragged task vanished, cancelling drag");
                self.drag = None;
            }
        }
        self.clamp_selection();
    }

    pub fn selected(&self) -> Option<&Task> {
        self.board
            .bucket(self.selected_bucket)
            .get(self.selected_task)
            .copied()
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Command> {
        if self.alert.take().is_some() {
            return None;
        }
        match self.input_mode {
            InputMode::Normal if self.drag.is_some() => self.drag_key(key),
            InputMode::Normal => self.normal_key(key),
            InputMode::Editing(field) => self.editing_key(field, key),
        }
    }

    fn normal_key(&mut self, key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Char('q') => self.is_running = false,
            KeyCode::Char('a') => self.input_mode = InputMode::Editing(Field::Title),
            KeyCode::Left => {
                self.selected_bucket = self.selected_bucket.prev();
                self.clamp_selection();
            }
            KeyCode::Right => {
                self.selected_bucket = self.selected_bucket.next();
                self.clamp_selection();
            }
            KeyCode::Up => self.selected_task = self.selected_task.saturating_sub(1),
            KeyCode::Down => {
                let max_tasks = self.board.bucket(self.selected_bucket).len();
                if self.selected_task + 1 < max_tasks {
                    self.selected_task += 1;
                }
            }
            KeyCode::Char(' ') => {
                if let Some(task) = self.selected().cloned() {
                    self.start_drag(task);
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                let id = self.selected()?.id.clone();
                return Some(self.board.delete(&id));
            }
            _ => {}
        }
        None
    }

    fn drag_key(&mut self, key: KeyEvent) -> Option<Command> {
        let drag = self.drag.as_mut()?;
        match key.code {
            KeyCode::Left => drag.target = drag.target.prev(),
            KeyCode::Right => drag.target = drag.target.next(),
            KeyCode::Char(' ') | KeyCode::Enter => {
                let drag = self.drag.take()?;
                return Some(self.drop_on(&drag.task, drag.target));
            }
            KeyCode::Esc => self.drag = None,
            _ => {}
        }
        None
    }

    fn editing_key(&mut self, field: Field, key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Esc => self.input_mode = InputMode::Normal,
            KeyCode::Tab | KeyCode::BackTab => self.input_mode = InputMode::Editing(field.other()),
            KeyCode::Enter => return self.submit(),
            KeyCode::Backspace => {
                self.field_mut(field).pop();
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.field_mut(field).push(c);
            }
            _ => {}
        }
        None
    }

    fn field_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Title => &mut self.board.draft.title,
            Field::Description => &mut self.board.draft.description,
        }
    }

    /// The "Add Task" action. A rejected draft raises the alert instead.
    pub fn submit(&mut self) -> Option<Command> {
        match self.board.create() {
            Ok(command) => {
                self.input_mode = InputMode::Normal;
                Some(command)
            }
            Err(err) => {
                self.alert = Some(err.to_string());
                None
            }
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> Option<Command> {
        let pos = Position::new(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if self.alert.take().is_some() {
                    return None;
                }
                self.press(pos)
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                let target = self.hitboxes.column_at(pos);
                if let Some(drag) = self.drag.as_mut() {
                    drag.moved = true;
                    if let Some(target) = target {
                        drag.target = target;
                    }
                }
                None
            }
            MouseEventKind::Up(MouseButton::Left) => {
                let drag = self.drag.take()?;
                if !drag.moved {
                    return None;
                }
                let target = self.hitboxes.column_at(pos)?;
                Some(self.drop_on(&drag.task, target))
            }
            _ => None,
        }
    }

    fn press(&mut self, pos: Position) -> Option<Command> {
        if self.hitboxes.add_button.contains(pos) {
            return self.submit();
        }
        if let Some(field) = self.hitboxes.field_at(pos) {
            self.input_mode = InputMode::Editing(field);
            return None;
        }
        self.input_mode = InputMode::Normal;
        let (id, area) = self.hitboxes.card_at(pos)?;
        let task = self.board.find(id)?;
        let action = TaskCard::new(task).hit(area, pos)?;
        match action {
            CardAction::Delete(id) => Some(self.board.delete(&id)),
            CardAction::Drag(task) => {
                self.select(&task);
                self.start_drag(task);
                None
            }
        }
    }

    fn start_drag(&mut self, task: Task) {
        let Some(origin) = task.bucket() else {
            return;
        };
        debug!(id = %task.id, from = origin.key(), "drag started");
        self.drag = Some(Drag {
            task,
            origin,
            target: origin,
            moved: false,
        });
    }

    fn drop_on(&mut self, task: &Task, target: Bucket) -> Command {
        debug!(id = %task.id, to = target.key(), "dropped");
        self.selected_bucket = target;
        self.board.drop_on(task, target)
    }

    fn select(&mut self, task: &Task) {
        let Some(bucket) = task.bucket() else {
            return;
        };
        self.selected_bucket = bucket;
        self.selected_task = self
            .board
            .bucket(bucket)
            .iter()
            .position(|t| t.id == task.id)
            .unwrap_or(0);
    }

    fn clamp_selection(&mut self) {
        let len = self.board.bucket(self.selected_bucket).len();
        self.selected_task = self.selected_task.min(len.saturating_sub(1));
    }
}
