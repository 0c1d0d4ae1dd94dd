use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

use crate::app::App;
use crate::ui::theme::{priority_color, status_color};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let board = app.board();
    let areas = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    for (column, &col_area) in board.columns().iter().zip(areas.iter()) {
        let focused = column.status == app.selected_status();
        let max_title = col_area.width.saturating_sub(6) as usize;

        let items: Vec<ListItem> = column
            .issues
            .iter()
            .enumerate()
            .map(|(row, issue)| {
                let selected = focused && row == app.selected_row;
                // Cards awaiting backend confirmation get a marker.
                let marker = if app.coordinator.is_pending(&issue.id) {
                    Span::styled("\u{27F3} ", Style::default().fg(Color::Yellow))
                } else {
                    Span::raw("  ")
                };
                let title: String = issue.title.chars().take(max_title).collect();
                let title_style = if selected {
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD | Modifier::REVERSED)
                } else {
                    Style::default()
                };
                let priority = Span::styled(
                    format!("  {}", issue.priority),
                    Style::default().fg(priority_color(issue.priority)),
                );
                let mut lines = vec![Line::from(vec![marker, Span::styled(title, title_style)])];
                let mut meta = vec![priority];
                if let Some(assignee) = &issue.assignee {
                    meta.push(Span::styled(
                        format!(" @{}", assignee.name),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
                lines.push(Line::from(meta));
                ListItem::new(lines)
            })
            .collect();

        let border = if focused {
            Style::default().fg(status_color(column.status))
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let title = if app.coordinator.is_loading() {
            format!(" {} (loading...) ", column.status)
        } else {
            format!(" {} ({}) ", column.status, column.issues.len())
        };

        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(title),
        );
        f.render_widget(list, col_area);
    }
}
