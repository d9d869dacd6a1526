mod format;
mod replay;
mod trace;
mod tui;


use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;

use crate::cli::{Cli, Command};
use crate::config::{self, Config, DB_ENV, VIEW_URL_ENV, env_value};
use crate::db::Database;
use crate::http::HttpViewReporter;
use crate::player::{MemoryStore, PlaybackStore, ViewPolicy, is_view_eligible};

use self::format::{
    format_cooldown_remaining, format_epoch_ms, format_position, format_timestamp_display,
    truncate,
};
use self::replay::replay_trace;
use self::trace::parse_trace;

pub fn run(cli: Cli) -> Result<()> {
    let config = config::load(cli.config.as_deref())?;

    match cli.command {
        Some(Command::Replay {
            trace,
            dry_run,
            report_url,
        }) => {
            let view_url = config::resolve_view_url(report_url, env_value(VIEW_URL_ENV), &config);
            if dry_run {
                let mut store = MemoryStore::new();
                run_replay(&trace, &config, &mut store, view_url)?;
            } else {
                let mut db = open_db(cli.db, &config)?;
                run_replay(&trace, &config, &mut db, view_url)?;
            }
        }
        Some(Command::Positions) => run_positions(&open_db(cli.db, &config)?)?,
        Some(Command::Views) => run_views(&open_db(cli.db, &config)?, &config.policy.view)?,
        Some(Command::Forget { video_id }) => run_forget(&open_db(cli.db, &config)?, &video_id)?,
        Some(Command::Check { duration, watched }) => {
            println!("{}", check_message(duration, watched, &config.policy.view));
        }
        Some(Command::Tui) | None => {
            let db = open_db(cli.db, &config)?;
            tui::run_tui(&db, &config.policy.view)?;
        }
    }

    Ok(())
}

fn run_replay(
    trace_path: &Path,
    config: &Config,
    store: &mut dyn PlaybackStore,
    view_url: Option<String>,
) -> Result<()> {
    let raw = std::fs::read_to_string(trace_path)
        .with_context(|| format!("failed to read trace {}", trace_path.display()))?;
    let trace = parse_trace(&raw)
        .with_context(|| format!("failed to parse trace {}", trace_path.display()))?;
    if trace.skipped > 0 {
        println!("Warning: skipped {} malformed step(s).", trace.skipped);
    }

    let reporter = view_url.map(HttpViewReporter::new);
    let outcome = replay_trace(
        &trace,
        config.policy.clone(),
        store,
        reporter.as_ref(),
        Utc::now().timestamp_millis(),
    );
    for line in &outcome.lines {
        println!("{line}");
    }
    match outcome.views.len() {
        0 => println!("No views counted."),
        count => println!("Views counted: {count} ({})", outcome.views.join(", ")),
    }
    Ok(())
}

fn run_positions(db: &Database) -> Result<()> {
    let items = db
        .list_videos()?
        .into_iter()
        .filter(|item| item.position_secs.is_some())
        .collect::<Vec<_>>();
    if items.is_empty() {
        println!("No stored resume positions yet. Run `playwatch replay <TRACE>` first.");
        return Ok(());
    }

    println!("{:<32} {:<10} {:<28}", "VIDEO ID", "POSITION", "UPDATED");
    for item in items {
        println!(
            "{:<32} {:<10} {:<28}",
            truncate(&item.video_id, 32),
            item.position_secs
                .map(format_position)
                .unwrap_or_else(|| "-".to_string()),
            item.position_updated_at
                .as_deref()
                .map(format_timestamp_display)
                .unwrap_or_else(|| "-".to_string())
        );
    }
    Ok(())
}

fn run_views(db: &Database, policy: &ViewPolicy) -> Result<()> {
    let items = db
        .list_videos()?
        .into_iter()
        .filter_map(|item| item.last_viewed_ms.map(|viewed| (item.video_id, viewed)))
        .collect::<Vec<_>>();
    if items.is_empty() {
        println!("No counted views yet.");
        return Ok(());
    }

    let now_ms = Utc::now().timestamp_millis();
    println!("{:<32} {:<28} {:<12}", "VIDEO ID", "LAST VIEW", "COOLDOWN");
    for (video_id, viewed_ms) in items {
        println!(
            "{:<32} {:<28} {:<12}",
            truncate(&video_id, 32),
            format_epoch_ms(viewed_ms),
            format_cooldown_remaining(viewed_ms, now_ms, policy.cooldown_ms())
        );
    }
    Ok(())
}

fn run_forget(db: &Database, video_id: &str) -> Result<()> {
    if db.forget(video_id)? {
        println!("Forgot stored state for {video_id}.");
    } else {
        println!("Nothing stored for {video_id}.");
    }
    Ok(())
}

pub(crate) fn check_message(duration: f64, watched: f64, policy: &ViewPolicy) -> String {
    let eligible = is_view_eligible(duration, watched, policy);
    let rule = if !(duration > 0.0) {
        "unknown duration never counts".to_string()
    } else if duration <= policy.short_video_max_secs {
        format!(
            "short video: needs {}s watched or {:.0}% of it",
            policy.short_min_watched_secs,
            policy.short_min_ratio * 100.0
        )
    } else {
        format!(
            "long video: needs {}s watched or {:.0}% of it",
            policy.long_min_watched_secs,
            policy.long_min_ratio * 100.0
        )
    };
    format!(
        "{} ({rule}; watched {watched}s of {duration}s)",
        if eligible { "eligible" } else { "not eligible" }
    )
}

fn open_db(flag: Option<PathBuf>, config: &Config) -> Result<Database> {
    let db_path = config::resolve_database_path(flag, env_value(DB_ENV), config)?;
    let db = Database::open(&db_path)?;
    db.migrate()?;
    Ok(db)
}
