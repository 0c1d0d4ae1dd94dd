pub mod board;
pub mod detail_panel;
pub mod footer;
pub mod theme;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::app::App;

pub fn render(f: &mut Frame, app: &App) {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(1)])
        .split(f.area());

    let main_area = vertical[0];
    let bottom_area = vertical[1];

    if app.show_detail && app.coordinator.store().current().is_some() {
        // Board (70%) + Detail (30%)
        let horizontal = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(main_area);
        board::render(f, horizontal[0], app);
        detail_panel::render(f, horizontal[1], app);
    } else {
        board::render(f, main_area, app);
    }

    footer::render(f, bottom_area, app);
}
