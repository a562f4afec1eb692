//! Line-oriented control input for the headless tracker: route toggles,
//! zoom, resize, pan and the stop selector, typed one per line on stdin.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::warn;

use crate::display::session::SessionEvent;
use crate::display::viewport::Viewport;
use crate::location::LatLng;

pub const HELP: &str = "commands: a | b | zoom <level> | resize <width> <height> | pan <lat> <lng> | focus <station>";

pub fn parse_command(line: &str) -> Result<SessionEvent, String> {
    let line = line.trim();
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    match verb.to_ascii_lowercase().as_str() {
        "a" | "b" => Ok(SessionEvent::ToggleRoute(verb.parse()?)),
        "toggle" => Ok(SessionEvent::ToggleRoute(rest.parse()?)),
        "zoom" => Ok(SessionEvent::Zoom(parse_number(rest)?)),
        "resize" => {
            let (w, h) = two_args(rest)?;
            let width = w.parse::<u32>().map_err(|_| format!("bad width '{w}'"))?;
            let height = h.parse::<u32>().map_err(|_| format!("bad height '{h}'"))?;
            Ok(SessionEvent::Resize(Viewport::new(width, height)))
        }
        "pan" => {
            let (lat, lng) = two_args(rest)?;
            Ok(SessionEvent::Pan(LatLng::new(parse_number(lat)?, parse_number(lng)?)))
        }
        "focus" if !rest.is_empty() => Ok(SessionEvent::Focus(rest.to_string())),
        _ => Err(HELP.to_string()),
    }
}

fn two_args(rest: &str) -> Result<(&str, &str), String> {
    let mut parts = rest.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(a), Some(b), None) => Ok((a, b)),
        _ => Err(format!("expected two values, got '{rest}'")),
    }
}

fn parse_number(s: &str) -> Result<f64, String> {
    s.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("'{s}' is not a number"))
}

/// Forward parsed commands into the session queue until input ends or the
/// session goes away. Bad lines are reported and skipped.
pub async fn forward_commands<R>(input: R, events: mpsc::Sender<SessionEvent>)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, "Failed to read command input");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match parse_command(&line) {
            Ok(event) => {
                if events.send(event).await.is_err() {
                    break;
                }
            }
            Err(msg) => warn!(input = %line, "{msg}"),
        }
    }
}
