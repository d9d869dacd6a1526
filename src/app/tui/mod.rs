mod render;
mod session;

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Utc;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::widgets::TableState;

use crate::db::{Database, VideoRecord};
use crate::player::ViewPolicy;

use self::render::draw_tui;
use self::session::TuiSession;

#[derive(Debug, Clone)]
pub(super) struct PendingForget {
    pub(super) video_id: String,
}

fn status_info(msg: &str) -> String {
    format!("INFO: {msg}")
}

fn status_error(msg: &str) -> String {
    format!("ERROR: {msg}")
}

pub(crate) fn run_tui(db: &Database, policy: &ViewPolicy) -> Result<()> {
    let mut session = TuiSession::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))
        .context("failed to initialize terminal backend")?;
    terminal.clear()?;

    let mut items = db.list_videos()?;
    let mut table_state = TableState::default();
    table_state.select((!items.is_empty()).then_some(0));
    let mut pending_forget = None::<PendingForget>;
    let mut status = if items.is_empty() {
        status_info("No stored videos yet. Run `playwatch replay <TRACE>` to record some.")
    } else {
        status_info("Ready.")
    };

    loop {
        let now_ms = Utc::now().timestamp_millis();
        terminal.draw(|frame| {
            draw_tui(
                frame,
                &items,
                &mut table_state,
                &status,
                pending_forget.as_ref(),
                policy,
                now_ms,
            )
        })?;

        if !event::poll(Duration::from_millis(200))? {
            continue;
        }

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        if let Some(dialog) = pending_forget.as_ref() {
            match key.code {
                KeyCode::Char('y') | KeyCode::Enter => {
                    let forgetting_id = dialog.video_id.clone();
                    pending_forget = None;
                    match db.forget(&forgetting_id) {
                        Ok(true) => {
                            status = status_info(&format!("Forgot stored state: {forgetting_id}"));
                        }
                        Ok(false) => {
                            status = status_error("Forget failed: video no longer stored.");
                        }
                        Err(err) => status = status_error(&format!("Forget failed: {err}")),
                    }
                    refresh_items(db, &mut items, &mut table_state, None)?;
                }
                KeyCode::Esc | KeyCode::Char('n') => {
                    pending_forget = None;
                    status = status_info("Forget canceled.");
                }
                _ => {}
            }
            continue;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => break,
            KeyCode::Char('r') => {
                let selected_id = table_state
                    .selected()
                    .and_then(|idx| items.get(idx))
                    .map(|item| item.video_id.clone());
                refresh_items(db, &mut items, &mut table_state, selected_id.as_deref())?;
                status = status_info(&format!("Reloaded {} stored video(s).", items.len()));
            }
            KeyCode::Up => {
                if let Some(selected) = table_state.selected() {
                    table_state.select(Some(selected.saturating_sub(1)));
                }
            }
            KeyCode::Down => {
                if let Some(selected) = table_state.selected()
                    && !items.is_empty()
                {
                    let next = (selected + 1).min(items.len().saturating_sub(1));
                    table_state.select(Some(next));
                }
            }
            KeyCode::Char('d') => {
                let Some(selected) = table_state.selected() else {
                    status = status_error("Forget failed: no video selected.");
                    continue;
                };
                let Some(selected_item) = items.get(selected) else {
                    status = status_error("Forget failed: invalid selection.");
                    continue;
                };
                pending_forget = Some(PendingForget {
                    video_id: selected_item.video_id.clone(),
                });
                status = status_info("Confirm forget: y/Enter to delete, n/Esc to cancel.");
            }
            _ => {}
        }
    }

    terminal.show_cursor()?;
    session.leave()?;
    Ok(())
}

fn refresh_items(
    db: &Database,
    items: &mut Vec<VideoRecord>,
    table_state: &mut TableState,
    keep_selected: Option<&str>,
) -> Result<()> {
    let previous = table_state.selected().unwrap_or(0);
    *items = db.list_videos()?;
    let selected = keep_selected
        .and_then(|video_id| items.iter().position(|item| item.video_id == video_id))
        .or_else(|| (!items.is_empty()).then(|| previous.min(items.len() - 1)));
    table_state.select(selected);
    Ok(())
}
