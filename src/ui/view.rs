use ratatui::layout::{Constraint, Flex, Layout, Position, Rect};
use ratatui::style::{Color, Stylize};
use ratatui::text::Line;
use ratatui::widgets::{Block, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::stats::Summary;
use crate::ui::DashboardView;

const HELP: &str = "Enter: submit  F1..: select dataset  Tab/Shift-Tab: next/previous  Esc: quit";
const PLACEHOLDER: &str = "Enter Number";

/// Renders the whole dashboard.
pub fn draw(frame: &mut Frame, view: &DashboardView<'_>) {
    let [stats_area, status_area, input_area, selector_area, help_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Length(3),
        Constraint::Min(1),
    ])
    .areas(frame.area());

    draw_statistics(frame, stats_area, view.summary);
    draw_status(frame, status_area, view.len, view.loading);
    draw_input(frame, input_area, view.input, view.alert.is_none());
    draw_selectors(frame, selector_area, view.selected, view.dataset_count);
    frame.render_widget(Paragraph::new(HELP).dim(), help_area);

    if let Some(message) = view.alert {
        draw_alert(frame, message);
    }
}

fn draw_statistics(frame: &mut Frame, area: Rect, summary: &Summary) {
    let cards = summary.labelled();
    let areas = Layout::horizontal([Constraint::Ratio(1, cards.len() as u32); 4]).split(area);
    for ((label, value), area) in cards.iter().zip(areas.iter()) {
        let card = Paragraph::new(value.to_string())
            .bold()
            .centered()
            .block(Block::bordered().title(*label));
        frame.render_widget(card, *area);
    }
}

fn draw_input(frame: &mut Frame, area: Rect, input: &str, focused: bool) {
    let block = Block::bordered()
        .title("Number")
        .title_bottom(Line::from(" Enter: Submit ").right_aligned());
    let text = if input.is_empty() {
        Paragraph::new(PLACEHOLDER).dim()
    } else {
        Paragraph::new(input)
    };
    frame.render_widget(text.block(block), area);

    if focused {
        let typed = u16::try_from(input.chars().count()).unwrap_or(u16::MAX);
        let x = area
            .x
            .saturating_add(1)
            .saturating_add(typed)
            .min(area.right().saturating_sub(2));
        frame.set_cursor_position(Position::new(x, area.y + 1));
    }
}

fn draw_selectors(frame: &mut Frame, area: Rect, selected: usize, count: usize) {
    let areas = Layout::horizontal(vec![Constraint::Ratio(1, count as u32); count]).split(area);
    for (index, area) in areas.iter().enumerate() {
        let label = format!("F{} Dataset {}", index + 1, index + 1);
        let button = Paragraph::new(label).centered().block(Block::bordered());
        let button = if index == selected {
            button.reversed().bold()
        } else {
            button
        };
        frame.render_widget(button, *area);
    }
}

fn draw_status(frame: &mut Frame, area: Rect, len: usize, loading: bool) {
    let [len_area, loading_area] =
        Layout::horizontal([Constraint::Fill(1), Constraint::Length(12)]).areas(area);
    frame.render_widget(
        Paragraph::new(format!("{} values in dataset", len)).dim(),
        len_area,
    );
    if loading {
        frame.render_widget(
            Paragraph::new("Loading...").yellow().bold().right_aligned(),
            loading_area,
        );
    }
}

fn draw_alert(frame: &mut Frame, message: &str) {
    let area = popup_area(frame.area(), 60, 6);
    let block = Block::bordered()
        .title(" Error ")
        .title_bottom(Line::from(" Enter/Esc: dismiss ").right_aligned())
        .fg(Color::Red);
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(message).wrap(Wrap { trim: true }).block(block),
        area,
    );
}

// Centered rectangle of at most `width` x `height`.
fn popup_area(area: Rect, width: u16, height: u16) -> Rect {
    let [area] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(area);
    area
}
