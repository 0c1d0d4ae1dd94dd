use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::ui::theme::{label_color, priority_color, status_color};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Details ");

    let Some(issue) = app.coordinator.store().current() else {
        f.render_widget(block, area);
        return;
    };

    let gray = Style::default().fg(Color::Gray);
    let mut lines: Vec<Line> = vec![
        Line::styled(issue.title.clone(), Style::default().fg(Color::White)),
        Line::raw(""),
        Line::from(vec![
            Span::styled("Status: ", gray),
            Span::styled(
                issue.status.to_string(),
                Style::default().fg(status_color(issue.status)),
            ),
        ]),
        Line::from(vec![
            Span::styled("Priority: ", gray),
            Span::styled(
                issue.priority.to_string(),
                Style::default().fg(priority_color(issue.priority)),
            ),
        ]),
    ];

    if let Some(assignee) = &issue.assignee {
        let email = assignee
            .email
            .as_deref()
            .map(|e| format!(" <{e}>"))
            .unwrap_or_default();
        lines.push(Line::from(vec![
            Span::styled("Assignee: ", gray),
            Span::raw(format!("{}{email}", assignee.name)),
        ]));
    }

    if let Some(due) = issue.due_date {
        let overdue = issue.is_overdue(chrono::Utc::now());
        let style = if overdue {
            Style::default().fg(Color::Red)
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::styled("Due: ", gray),
            Span::styled(due.format("%Y-%m-%d").to_string(), style),
        ]));
    }

    if !issue.labels.is_empty() {
        let mut spans = vec![Span::styled("Labels: ", gray)];
        for label in &issue.labels {
            spans.push(Span::styled(
                format!("{label} "),
                Style::default().fg(label_color(label)),
            ));
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(vec![
        Span::styled("Updated: ", gray),
        Span::raw(issue.updated_at.format("%Y-%m-%d %H:%M").to_string()),
    ]));

    if !issue.description.is_empty() {
        lines.push(Line::raw(""));
        let truncated: String = issue.description.chars().take(600).collect();
        lines.push(Line::raw(truncated));
    }

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}
