use crate::task::{Task, TaskId};
use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};

const DELETE_LABEL: &str = "[Delete]";

/// What a pointer press on a card asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum CardAction {
    Delete(TaskId),
    /// Start dragging; the payload is the whole task.
    Drag(Task),
}

pub struct TaskCard<'a> {
    task: &'a Task,
    selected: bool,
    dragging: bool,
}

impl<'a> TaskCard<'a> {
    pub const HEIGHT: u16 = 6;

    pub fn new(task: &'a Task) -> Self {
        Self {
            task,
            selected: false,
            dragging: false,
        }
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    pub fn dragging(mut self, dragging: bool) -> Self {
        self.dragging = dragging;
        self
    }

    /// Where the delete control sits when the card is drawn at `area`.
    pub fn delete_area(area: Rect) -> Rect {
        let inner = Block::bordered().inner(area);
        Rect {
            x: inner.x,
            y: inner.y + 3,
            width: (DELETE_LABEL.len() as u16).min(inner.width),
            height: 1,
        }
        .intersection(inner)
    }

    pub fn hit(&self, area: Rect, pos: Position) -> Option<CardAction> {
        if !area.contains(pos) {
            return None;
        }
        if Self::delete_area(area).contains(pos) {
            Some(CardAction::Delete(self.task.id.clone()))
        } else {
            Some(CardAction::Drag(self.task.clone()))
        }
    }
}

impl Widget for TaskCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.selected {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Green)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border_style);

        let lines = vec![
            Line::from(Span::styled(
                self.task.title.as_str(),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )),
            Line::from(self.task.description.as_str()),
            Line::from(Span::styled(
                format!("Status: {}", self.task.status),
                Style::default().fg(Color::Green),
            )),
            Line::from(Span::styled(DELETE_LABEL, Style::default().fg(Color::Red))),
        ];

        let mut card = Paragraph::new(lines).block(block);
        if self.dragging {
            card = card.style(Style::default().add_modifier(Modifier::DIM));
        }
        card.render(area, buf);
    }
}
