/*
 * This file is part of tscal.
 *
 * Copyright (C) 2025 tscal contributors
 *
 * tscal is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * tscal is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with tscal. If not, see <https://www.gnu.org/licenses/>.
 */

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Paragraph, Wrap};
use tc_core::constants::calibration::NUM_POINTS;
use tc_core::{CalibrationSession, CalibrationState, ScreenPoint};

const CROSSHAIR: [(i32, i32, &str); 5] = [
    (-1, 0, "─"),
    (0, 0, "┼"),
    (1, 0, "─"),
    (0, -1, "│"),
    (0, 1, "│"),
];

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Map a screen pixel onto the terminal cell covering it
pub fn pixel_to_cell(point: ScreenPoint, width: u32, height: u32, area: Rect) -> (u16, u16) {
    let scale = |v: i32, span: u32, cells: u16| -> u16 {
        let v = v.max(0) as u64;
        let cell = v * cells as u64 / span.max(1) as u64;
        cell.min(cells.saturating_sub(1) as u64) as u16
    };
    (
        area.x + scale(point.x, width, area.width),
        area.y + scale(point.y, height, area.height),
    )
}

fn draw_crosshair(f: &mut Frame, col: u16, row: u16, area: Rect) {
    let style = Style::default().fg(Color::Black).bg(Color::White);
    for (dx, dy, glyph) in CROSSHAIR {
        let x = col as i32 + dx;
        let y = row as i32 + dy;
        if x < area.left() as i32 || x >= area.right() as i32 || y < area.top() as i32 || y >= area.bottom() as i32 {
            continue;
        }
        f.render_widget(Paragraph::new(glyph).style(style), Rect::new(x as u16, y as u16, 1, 1));
    }
}

fn status_line(session: &CalibrationSession) -> String {
    match session.state() {
        CalibrationState::Calibrating { point } => format!("Point {} of {}  |  Esc to abort", point + 1, NUM_POINTS),
        CalibrationState::AwaitingTouchscreen => "Exiting shortly".to_string(),
        _ => "Esc to quit".to_string(),
    }
}

pub fn ui(f: &mut Frame, session: &CalibrationSession) {
    let size = f.area();
    let style = Style::default().fg(Color::Black).bg(Color::White);
    f.render_widget(Block::default().style(style), size);

    let text_area = centered_rect(80, 30, size);
    let message = Paragraph::new(session.message())
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(style);
    f.render_widget(message, text_area);

    if size.height > 2 {
        let footer = Rect::new(size.x, size.bottom() - 1, size.width, 1);
        let help = Paragraph::new(status_line(session))
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::DarkGray).bg(Color::White));
        f.render_widget(help, footer);
    }

    if let Some(target) = session.current_target() {
        let layout = &session.config().layout;
        let (col, row) = pixel_to_cell(target, layout.width, layout.height, size);
        draw_crosshair(f, col, row, size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use tc_core::constants::messages;
    use tc_core::{OutputForm, SessionConfig, TargetLayout};

    fn render(session: &CalibrationSession) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| ui(f, session)).unwrap();
        terminal.backend().buffer().clone()
    }

    fn symbol_at(buf: &Buffer, x: u16, y: u16) -> String {
        buf.content[(y * buf.area.width + x) as usize].symbol().to_string()
    }

    fn text(buf: &Buffer) -> String {
        buf.content.iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_pixel_to_cell() {
        let area = Rect::new(0, 0, 80, 24);
        assert_eq!(pixel_to_cell(ScreenPoint::new(20, 20), 800, 480, area), (2, 1));
        assert_eq!(pixel_to_cell(ScreenPoint::new(780, 460), 800, 480, area), (78, 23));
        assert_eq!(pixel_to_cell(ScreenPoint::new(800, 480), 800, 480, area), (79, 23));
        assert_eq!(pixel_to_cell(ScreenPoint::new(-5, 0), 800, 480, area), (0, 0));
    }

    #[test]
    fn test_first_crosshair_drawn_top_left() {
        let config = SessionConfig::new(TargetLayout::for_screen(800, 480, 20), OutputForm::Matrix);
        let session = CalibrationSession::new(config, true);
        let buf = render(&session);
        assert_eq!(symbol_at(&buf, 2, 1), "┼");
        assert_eq!(symbol_at(&buf, 1, 1), "─");
        assert_eq!(symbol_at(&buf, 2, 0), "│");
        assert!(text(&buf).contains("Point 1 of 4"));
    }

    #[test]
    fn test_no_crosshair_without_device() {
        let config = SessionConfig::new(TargetLayout::for_screen(800, 480, 20), OutputForm::Matrix);
        let session = CalibrationSession::new(config, false);
        let buf = render(&session);
        let all = text(&buf);
        assert!(!all.contains('┼'));
        assert!(all.contains(messages::NO_TOUCHSCREEN));
    }
}
