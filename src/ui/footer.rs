use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = if app.confirm_delete {
        vec![hint("y", "delete"), hint("any", "cancel")]
    } else if app.show_detail {
        vec![
            hint("esc", "close"),
            hint("[ ]", "move"),
            hint("1-4", "drop"),
            hint("q", "quit"),
        ]
    } else {
        vec![
            hint("←→↑↓", "navigate"),
            hint("[ ]", "move"),
            hint("1-4", "drop"),
            hint("enter", "details"),
            hint("x", "delete"),
            hint("r", "refresh"),
            hint("q", "quit"),
        ]
    };

    let counts = app.coordinator.store().counts(chrono::Utc::now());
    spans.push(Span::styled(
        format!("  {} issues", counts.total),
        Style::default().fg(Color::Gray),
    ));
    if counts.overdue > 0 {
        spans.push(Span::styled(
            format!(", {} overdue", counts.overdue),
            Style::default().fg(Color::Red),
        ));
    }

    if let Some(flash) = &app.flash {
        let color = if flash.is_error {
            Color::Red
        } else {
            Color::Yellow
        };
        spans.push(Span::raw("  "));
        spans.push(Span::styled(flash.message.clone(), Style::default().fg(color)));
    } else if let Some(err) = app.coordinator.last_error() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(err.to_string(), Style::default().fg(Color::Red)));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn hint(key: &str, desc: &str) -> Span<'static> {
    Span::styled(
        format!(" {key}:{desc} "),
        Style::default().fg(Color::DarkGray),
    )
}
