use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, BorderType, Borders, Cell, Clear, Padding, Paragraph, Row, Table, TableState, Wrap,
};

use crate::db::VideoRecord;
use crate::player::ViewPolicy;

use super::super::format::{
    format_cooldown_remaining, format_epoch_ms_tui, format_position,
    format_timestamp_display_tui, truncate,
};
use super::PendingForget;

pub(super) fn draw_tui(
    frame: &mut Frame,
    items: &[VideoRecord],
    table_state: &mut TableState,
    status: &str,
    pending_forget: Option<&PendingForget>,
    policy: &ViewPolicy,
    now_ms: i64,
) {
    let bg = Block::default().style(Style::default().bg(Color::Black));
    frame.render_widget(bg, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let with_resume = items
        .iter()
        .filter(|item| item.position_secs.is_some())
        .count();
    let with_views = items
        .iter()
        .filter(|item| item.last_viewed_ms.is_some())
        .count();
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            "PLAYWATCH",
            Style::default()
                .fg(Color::Rgb(110, 170, 255))
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("   ", Style::default()),
        Span::styled(
            format!("{} videos", items.len()),
            Style::default().fg(Color::Rgb(185, 195, 210)),
        ),
        Span::styled("   ", Style::default()),
        Span::styled(
            format!("{with_resume} resumable"),
            Style::default().fg(Color::Rgb(185, 195, 210)),
        ),
        Span::styled("   ", Style::default()),
        Span::styled(format!("{with_views} viewed"), Style::default().fg(Color::Yellow)),
    ]))
    .alignment(Alignment::Center)
    .block(panel_block("Dashboard"));
    frame.render_widget(header, chunks[0]);

    let body_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(64), Constraint::Percentage(36)])
        .split(chunks[1]);

    let rows: Vec<Row> = items
        .iter()
        .map(|item| {
            Row::new(vec![
                Cell::from(truncate(&item.video_id, 36)),
                Cell::from(optional_text(item.position_secs.map(format_position))),
                Cell::from(optional_text(
                    item.position_updated_at
                        .as_deref()
                        .map(format_timestamp_display_tui),
                )),
                Cell::from(optional_text(item.last_viewed_ms.map(format_epoch_ms_tui))),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(40),
            Constraint::Length(10),
            Constraint::Length(18),
            Constraint::Length(18),
        ],
    )
    .header(
        Row::new(vec!["Video", "Resume", "Updated", "Last View"]).style(
            Style::default()
                .fg(Color::Rgb(110, 170, 255))
                .add_modifier(Modifier::BOLD),
        ),
    )
    .block(panel_block("Stored Videos"))
    .row_highlight_style(
        Style::default()
            .bg(Color::Rgb(110, 170, 255))
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("▸ ");
    frame.render_stateful_widget(table, body_chunks[0], table_state);

    let selection_text = match table_state.selected().and_then(|idx| items.get(idx)) {
        Some(item) => {
            let cooldown = item
                .last_viewed_ms
                .map(|viewed| format_cooldown_remaining(viewed, now_ms, policy.cooldown_ms()));
            format!(
                "Video\n{}\n\nResume At\n{}\n\nUpdated\n{}\n\nLast View\n{}\n\nNext View Counts\n{}",
                truncate(&item.video_id, 40),
                optional_text(item.position_secs.map(format_position)),
                optional_text(
                    item.position_updated_at
                        .as_deref()
                        .map(format_timestamp_display_tui)
                ),
                optional_text(item.last_viewed_ms.map(format_epoch_ms_tui)),
                cooldown.unwrap_or_else(|| "ready".to_string()),
            )
        }
        None => "No stored videos yet.\n\nReplay a trace to record resume positions and views."
            .to_string(),
    };
    let selection = Paragraph::new(selection_text)
        .style(Style::default().fg(Color::Rgb(230, 230, 230)))
        .block(panel_block("Selected"))
        .alignment(Alignment::Left);
    frame.render_widget(selection, body_chunks[1]);

    let controls = Paragraph::new(Line::from(Span::styled(
        "↑/↓ move  d forget  r reload  q quit",
        Style::default().fg(Color::Rgb(185, 195, 210)),
    )))
    .alignment(Alignment::Center)
    .block(panel_block("Controls"));
    frame.render_widget(controls, chunks[2]);

    let status_widget = Paragraph::new(status.to_string())
        .style(status_style(status))
        .block(panel_block("Status"));
    frame.render_widget(status_widget, chunks[3]);

    if let Some(confirm) = pending_forget {
        let popup_text = format!(
            "Forget stored state?\n\n{}\n\nResume position and view mark are deleted.\n\n[y / Enter] Forget   [n / Esc] Cancel",
            truncate(&confirm.video_id, 56)
        );
        let popup_area = popup_rect_for_text(frame.area(), &popup_text);
        render_popup_shadow(frame, popup_area);
        frame.render_widget(Clear, popup_area);
        let popup = Paragraph::new(popup_text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(modal_block("Confirm Forget"));
        frame.render_widget(popup, popup_area);
    }
}

fn optional_text(value: Option<String>) -> String {
    value.unwrap_or_else(|| "-".to_string())
}

fn panel_block(title: &'static str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Rgb(125, 135, 150)))
        .title(title)
}

fn modal_block(title: &'static str) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(
            Style::default()
                .fg(Color::Rgb(160, 190, 235))
                .add_modifier(Modifier::BOLD),
        )
        .title(title)
        .padding(Padding::new(2, 2, 1, 1))
}

fn status_style(status: &str) -> Style {
    if status.starts_with("ERROR:") {
        Style::default()
            .fg(Color::Rgb(255, 145, 120))
            .add_modifier(Modifier::BOLD)
    } else if status.starts_with("INFO:") {
        Style::default().fg(Color::Rgb(205, 165, 255))
    } else {
        Style::default().fg(Color::Rgb(230, 235, 242))
    }
}

fn centered_fixed_rect(width: u16, height: u16, area: Rect) -> Rect {
    let clamped_width = width.min(area.width.max(1));
    let clamped_height = height.min(area.height.max(1));
    let x = area.x + area.width.saturating_sub(clamped_width) / 2;
    let y = area.y + area.height.saturating_sub(clamped_height) / 2;
    Rect::new(x, y, clamped_width, clamped_height)
}

fn render_popup_shadow(frame: &mut Frame, popup_area: Rect) {
    let area = frame.area();
    let shadow = Rect::new(
        (popup_area.x + 1).min(area.x + area.width.saturating_sub(1)),
        (popup_area.y + 1).min(area.y + area.height.saturating_sub(1)),
        popup_area.width.saturating_sub(1),
        popup_area.height.saturating_sub(1),
    );
    if shadow.width == 0 || shadow.height == 0 {
        return;
    }
    let shadow_block = Block::default().style(Style::default().bg(Color::Rgb(14, 16, 24)));
    frame.render_widget(shadow_block, shadow);
}

fn popup_rect_for_text(area: Rect, text: &str) -> Rect {
    let max_line_width = text
        .lines()
        .map(|line| line.chars().count() as u16)
        .max()
        .unwrap_or(0);
    let line_count = text.lines().count() as u16;

    let available_width = area.width.saturating_sub(2).max(1);
    let min_width = 48.min(available_width);
    let max_width = 72.min(available_width);
    let width = max_line_width.saturating_add(12).clamp(min_width, max_width);

    let available_height = area.height.saturating_sub(2).max(1);
    let min_height = 10.min(available_height);
    let max_height = 18.min(available_height);
    let height = line_count.saturating_add(6).clamp(min_height, max_height);

    centered_fixed_rect(width, height, area)
}
