use std::collections::BTreeMap;

use anyhow::{Context, Result, bail};
use serde_json::Value;

use crate::player::{BufferedRanges, MediaEvent, PlayRejection, PlayerCommand, PlayerProps};

/// A scripted playback session: initial props plus timed inputs.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Trace {
    pub(crate) props: PlayerProps,
    pub(crate) gesture: bool,
    pub(crate) visible: bool,
    pub(crate) fullscreen_denied: bool,
    pub(crate) steps: Vec<TraceStep>,
    /// Timers due up to this offset still fire after the last step.
    pub(crate) until_ms: Option<i64>,
    pub(crate) skipped: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TraceStep {
    pub(crate) at_ms: i64,
    pub(crate) action: TraceAction,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TraceAction {
    Event(MediaEvent),
    Command(PlayerCommand),
    Key(String),
    Props(PlayerProps),
    Visible(bool),
}

impl TraceAction {
    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Event(event) => format!("event {}", describe_event(event)),
            Self::Command(command) => format!("command {command:?}"),
            Self::Key(key) => format!("key {key:?}"),
            Self::Props(props) => format!("props video={}", props.video_id),
            Self::Visible(true) => "page visible".to_string(),
            Self::Visible(false) => "page hidden".to_string(),
        }
    }
}

fn describe_event(event: &MediaEvent) -> String {
    match event {
        MediaEvent::LoadedMetadata { duration } | MediaEvent::DurationChange { duration } => {
            format!("{} duration={duration}", event.name())
        }
        MediaEvent::Seeking { target } => format!("{} target={target}", event.name()),
        MediaEvent::Seeked { time } | MediaEvent::TimeUpdate { time } => {
            format!("{} time={time}", event.name())
        }
        MediaEvent::Progress { buffered } => {
            format!("{} buffered={:?}", event.name(), buffered.ranges())
        }
        MediaEvent::PlayRejected(reason) => format!("{} reason={reason:?}", event.name()),
        _ => event.name().to_string(),
    }
}

pub(crate) fn parse_trace(raw: &str) -> Result<Trace> {
    let parsed: Value = serde_json::from_str(raw).context("trace is not valid JSON")?;
    let Some(props_value) = parsed.get("props") else {
        bail!("trace has no `props` object");
    };
    let props = parse_props(props_value).context("trace `props` is invalid")?;

    let mut steps = Vec::new();
    let mut skipped = 0;
    if let Some(raw_steps) = parsed.get("steps").and_then(Value::as_array) {
        for raw_step in raw_steps {
            match parse_step(raw_step) {
                Some(step) => steps.push(step),
                None => skipped += 1,
            }
        }
    }

    Ok(Trace {
        props,
        gesture: parsed.get("gesture").and_then(Value::as_bool).unwrap_or(false),
        visible: parsed.get("visible").and_then(Value::as_bool).unwrap_or(true),
        fullscreen_denied: flag(&parsed, "fullscreen_denied"),
        steps,
        until_ms: parsed.get("until_ms").and_then(Value::as_i64),
        skipped,
    })
}

fn parse_props(value: &Value) -> Result<PlayerProps> {
    let Some(video_id) = value.get("video_id").and_then(Value::as_str) else {
        bail!("missing string `video_id`");
    };

    let mut sources = BTreeMap::new();
    if let Some(raw_sources) = value.get("sources").and_then(Value::as_object) {
        for (label, url) in raw_sources {
            if let Some(url) = url.as_str() {
                sources.insert(label.clone(), url.to_string());
            }
        }
    }

    let available_qualities = value
        .get("available_qualities")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(quality_value).collect::<Vec<_>>());

    Ok(PlayerProps {
        video_id: video_id.to_string(),
        sources,
        poster: value
            .get("poster")
            .and_then(Value::as_str)
            .map(str::to_string),
        available_qualities,
        initial_quality: value.get("initial_quality").and_then(quality_value),
        has_next: flag(value, "has_next"),
        has_prev: flag(value, "has_prev"),
        is_mini: flag(value, "is_mini"),
    })
}

fn flag(value: &Value, key: &str) -> bool {
    value.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn quality_value(value: &Value) -> Option<u32> {
    let number = match value {
        Value::Number(number) => number.as_u64()?,
        Value::String(text) => text.trim().trim_end_matches(['p', 'P']).parse::<u64>().ok()?,
        _ => return None,
    };
    u32::try_from(number).ok().filter(|quality| *quality > 0)
}

fn parse_step(value: &Value) -> Option<TraceStep> {
    let at_ms = value.get("at_ms")?.as_i64()?;
    if at_ms < 0 {
        return None;
    }
    let action = if let Some(event) = value.get("event") {
        TraceAction::Event(parse_event(event)?)
    } else if let Some(command) = value.get("command") {
        TraceAction::Command(parse_command(command)?)
    } else if let Some(key) = value.get("key") {
        TraceAction::Key(key.as_str()?.to_string())
    } else if let Some(props) = value.get("props") {
        TraceAction::Props(parse_props(props).ok()?)
    } else if let Some(visible) = value.get("visible") {
        TraceAction::Visible(visible.as_bool()?)
    } else {
        return None;
    };
    Some(TraceStep { at_ms, action })
}

fn number(value: &Value, key: &str) -> Option<f64> {
    value.get(key)?.as_f64()
}

/// `"name"` or `{ "type": "name", ...fields }`.
fn type_name(value: &Value) -> Option<&str> {
    match value {
        Value::String(name) => Some(name.as_str()),
        Value::Object(_) => value.get("type")?.as_str(),
        _ => None,
    }
}

fn parse_event(value: &Value) -> Option<MediaEvent> {
    let event = match type_name(value)? {
        "loadedmetadata" => MediaEvent::LoadedMetadata {
            duration: number(value, "duration")?,
        },
        "durationchange" => MediaEvent::DurationChange {
            duration: number(value, "duration")?,
        },
        "canplay" => MediaEvent::CanPlay,
        "playing" => MediaEvent::Playing,
        "pause" => MediaEvent::Paused,
        "waiting" => MediaEvent::Waiting,
        "stalled" => MediaEvent::Stalled,
        "seeking" => MediaEvent::Seeking {
            target: number(value, "target")?,
        },
        "seeked" => MediaEvent::Seeked {
            time: number(value, "time")?,
        },
        "timeupdate" => MediaEvent::TimeUpdate {
            time: number(value, "time")?,
        },
        "progress" => {
            let ranges = value
                .get("buffered")?
                .as_array()?
                .iter()
                .map(|range| {
                    let pair = range.as_array()?;
                    Some((pair.first()?.as_f64()?, pair.get(1)?.as_f64()?))
                })
                .collect::<Option<Vec<_>>>()?;
            MediaEvent::Progress {
                buffered: BufferedRanges::new(ranges),
            }
        }
        "ended" => MediaEvent::Ended,
        "play-rejected" => {
            let reason = match value.get("reason").and_then(Value::as_str) {
                Some("NotAllowedError") | Some("not-allowed") | None => PlayRejection::NotAllowed,
                Some("AbortError") | Some("aborted") => PlayRejection::Aborted,
                Some(other) => PlayRejection::Other(other.to_string()),
            };
            MediaEvent::PlayRejected(reason)
        }
        _ => return None,
    };
    Some(event)
}

fn parse_command(value: &Value) -> Option<PlayerCommand> {
    let command = match type_name(value)? {
        "toggle-play" => PlayerCommand::TogglePlay,
        "play" => PlayerCommand::Play,
        "pause" => PlayerCommand::Pause,
        "seek-to" => PlayerCommand::SeekTo(number(value, "time")?),
        "seek-by" => PlayerCommand::SeekBy(number(value, "delta")?),
        "set-volume" => PlayerCommand::SetVolume(number(value, "volume")?),
        "volume-up" => PlayerCommand::VolumeUp,
        "volume-down" => PlayerCommand::VolumeDown,
        "toggle-mute" => PlayerCommand::ToggleMute,
        "unmute" => PlayerCommand::Unmute,
        "set-quality" => PlayerCommand::SetQuality(value.get("quality").and_then(quality_value)?),
        "toggle-fullscreen" => PlayerCommand::ToggleFullscreen,
        "next" => PlayerCommand::Next,
        "prev" => PlayerCommand::Prev,
        "return" => PlayerCommand::Return,
        "close" => PlayerCommand::Close,
        "pointer" => PlayerCommand::PointerActivity,
        _ => return None,
    };
    Some(command)
}
