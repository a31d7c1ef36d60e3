use crate::app::{App, Field, InputMode};
use crate::card::TaskCard;
use crate::task::Bucket;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Position, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

pub fn draw(f: &mut Frame, app: &mut App) {
    app.hitboxes.clear();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_header(f, rows[0]);
    draw_form(f, app, rows[1]);
    draw_columns(f, app, rows[2]);
    draw_status_bar(f, app, rows[3]);

    if let Some(message) = &app.alert {
        draw_alert(f, message);
    }
}

fn draw_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(Span::styled(
        "Task Management System",
        Style::default().add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(header, area);
}

fn draw_form(f: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![
            Constraint::Percentage(40),
            Constraint::Percentage(40),
            Constraint::Percentage(20),
        ])
        .split(area);

    let fields = [
        (Field::Title, "Task Title", app.board.draft.title.as_str(), chunks[0]),
        (
            Field::Description,
            "Description",
            app.board.draft.description.as_str(),
            chunks[1],
        ),
    ];
    for (field, label, value, field_area) in fields {
        let focused = app.input_mode == InputMode::Editing(field);
        let input = Paragraph::new(value).block(
            Block::default()
                .title(label)
                .borders(Borders::ALL)
                .border_style(if focused {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default()
                }),
        );
        f.render_widget(input, field_area);
        if focused {
            let width = value.chars().count() as u16;
            let x = (field_area.x + 1 + width).min(field_area.right().saturating_sub(2));
            f.set_cursor_position(Position::new(x, field_area.y + 1));
        }
        app.hitboxes.fields.push((field, field_area));
    }

    let button = Paragraph::new("Add Task")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(button, chunks[2]);
    app.hitboxes.add_button = chunks[2];
}

fn draw_columns(f: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![
            Constraint::Percentage(33),
            Constraint::Percentage(33),
            Constraint::Percentage(34),
        ])
        .split(area);

    for bucket in Bucket::ALL {
        let column_area = chunks[bucket.index()];
        let tasks = app.board.bucket(bucket);
        let is_target = app.drag.as_ref().is_some_and(|d| d.target == bucket);
        let is_selected = app.selected_bucket == bucket;

        let block = Block::default()
            .title(format!(" {} ({}) ", bucket.label(), tasks.len()))
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_style(if is_target {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else if is_selected {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default()
            });
        let inner = block.inner(column_area);
        f.render_widget(block, column_area);

        let capacity = (inner.height / TaskCard::HEIGHT).max(1) as usize;
        let offset = if is_selected && app.selected_task >= capacity {
            app.selected_task + 1 - capacity
        } else {
            0
        };

        let mut cards = Vec::new();
        for (i, task) in tasks.iter().enumerate().skip(offset).take(capacity) {
            let y = inner.y + ((i - offset) as u16) * TaskCard::HEIGHT;
            let card_area = Rect {
                x: inner.x,
                y,
                width: inner.width,
                height: TaskCard::HEIGHT,
            }
            .intersection(inner);
            if card_area.is_empty() {
                break;
            }
            let dragging = app.drag.as_ref().is_some_and(|d| d.task.id == task.id);
            let card = TaskCard::new(task)
                .selected(is_selected && app.selected_task == i)
                .dragging(dragging);
            f.render_widget(card, card_area);
            cards.push((task.id.clone(), card_area));
        }

        app.hitboxes.cards.extend(cards);
        app.hitboxes.columns.push((bucket, column_area));
    }
}

fn draw_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let hint = match (&app.input_mode, &app.drag) {
        (InputMode::Editing(_), _) => "tab: switch field  enter: add task  esc: done".to_string(),
        (InputMode::Normal, Some(drag)) => format!(
            "moving \"{}\" to {}  ←/→: column  space: drop  esc: cancel",
            drag.task.title,
            drag.target.label()
        ),
        (InputMode::Normal, None) => {
            "q: quit  a: add  ←/→/↑/↓: select  space: move  d: delete".to_string()
        }
    };

    let mut spans = vec![Span::raw(hint)];
    if app.pending > 0 {
        spans.push(Span::styled(
            format!("  [{} pending]", app.pending),
            Style::default().fg(Color::Yellow),
        ));
    }
    if let Some(synced) = app.board.last_synced() {
        spans.push(Span::styled(
            format!("  synced {}", synced.format("%H:%M:%S")),
            Style::default().fg(Color::DarkGray),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_alert(f: &mut Frame, message: &str) {
    let area = centered_rect(50, 5, f.area());
    let alert = Paragraph::new(vec![
        Line::from(message),
        Line::from(Span::styled(
            "press any key",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .title("Alert")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red)),
    );
    f.render_widget(Clear, area);
    f.render_widget(alert, area);
}

fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let width = (u32::from(area.width) * u32::from(percent_x) / 100) as u16;
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kanban_board::{BoardEvent, Command};
    use crate::task::{Task, TaskId};
    use crossterm::event::{KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
    use serde_json::json;

    fn task(id: i64, title: &str, status: &str) -> Task {
        serde_json::from_value(json!({
            "id": id,
            "title": title,
            "description": "y",
            "status": status,
        }))
        .unwrap()
    }

    fn render(app: &mut App) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        terminal.backend().buffer().clone()
    }

    fn text(buf: &Buffer) -> String {
        let mut out = String::new();
        for y in 0..buf.area.height {
            for x in 0..buf.area.width {
                out.push_str(buf[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn loaded() -> App {
        let mut app = App::new();
        app.on_completion(BoardEvent::Fetched(Ok(vec![
            task(1, "Buy milk", "To Do"),
            task(2, "Fix bike", "In Progress"),
            task(3, "Mystery", "Blocked"),
        ])));
        app
    }

    #[test]
    fn board_shows_columns_and_cards() {
        let mut app = loaded();
        let screen = text(&render(&mut app));
        assert!(screen.contains("Task Management System"));
        assert!(screen.contains("To Do (1)"));
        assert!(screen.contains("In Progress (1)"));
        assert!(screen.contains("Done (0)"));
        assert!(screen.contains("Buy milk"));
        assert!(screen.contains("Fix bike"));
        assert!(!screen.contains("Mystery"));
        assert_eq!(app.hitboxes.columns.len(), 3);
        assert_eq!(app.hitboxes.cards.len(), 2);
    }

    #[test]
    fn alert_is_drawn_over_the_board() {
        let mut app = loaded();
        app.alert = Some("Title and description are required.".into());
        let screen = text(&render(&mut app));
        assert!(screen.contains("Title and description are required."));
    }

    #[test]
    fn rendered_hitboxes_drive_a_mouse_drop() {
        let mut app = loaded();
        render(&mut app);
        let (_, card) = app
            .hitboxes
            .cards
            .iter()
            .find(|(id, _)| *id == TaskId::Number(2))
            .cloned()
            .unwrap();
        let (_, done) = app.hitboxes.columns[Bucket::Done.index()];

        let event = |kind, column, row| MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        };
        app.handle_mouse(event(MouseEventKind::Down(MouseButton::Left), card.x + 2, card.y + 1));
        app.handle_mouse(event(MouseEventKind::Drag(MouseButton::Left), done.x + 3, done.y + 3));
        let screen = text(&render(&mut app));
        assert!(screen.contains("moving \"Fix bike\" to Done"));

        let command =
            app.handle_mouse(event(MouseEventKind::Up(MouseButton::Left), done.x + 3, done.y + 3));
        assert_eq!(command, Some(Command::Update(task(2, "Fix bike", "Done"))));
    }

    #[test]
    fn clicking_form_field_starts_editing() {
        let mut app = loaded();
        render(&mut app);
        let (_, area) = app.hitboxes.fields[1];
        app.handle_mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: area.x + 1,
            row: area.y + 1,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(app.input_mode, InputMode::Editing(Field::Description));
    }

    #[test]
    fn centered_rect_fits_inside_area() {
        let area = Rect::new(0, 0, 100, 3);
        let popup = centered_rect(50, 5, area);
        assert_eq!(popup, Rect::new(25, 0, 50, 3));
    }

    #[test]
    fn centered_rect_handles_very_wide_terminals() {
        let area = Rect::new(0, 0, 2000, 40);
        let popup = centered_rect(50, 5, area);
        assert_eq!(popup, Rect::new(500, 17, 1000, 5));
    }
}
