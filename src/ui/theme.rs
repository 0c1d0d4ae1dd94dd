use ratatui::style::Color;

use crate::model::status::{Priority, Status};

pub fn status_color(status: Status) -> Color {
    match status {
        Status::ToDo => Color::Gray,
        Status::InProgress => Color::Cyan,
        Status::InReview => Color::Yellow,
        Status::Done => Color::Green,
    }
}

pub fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::Critical => Color::Red,
        Priority::High => Color::Yellow,
        Priority::Medium => Color::Blue,
        Priority::Low => Color::Gray,
    }
}

pub fn label_color(label: &str) -> Color {
    const PALETTE: [Color; 5] = [
        Color::Blue,
        Color::Magenta,
        Color::LightRed,
        Color::LightBlue,
        Color::Cyan,
    ];
    PALETTE[label.len() % PALETTE.len()]
}
