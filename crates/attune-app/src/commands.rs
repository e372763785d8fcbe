//! Stdin control loop - the demo's stand-in for form controls.

use std::ops::ControlFlow;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use attune_core::led::{Color, LedMode};
use attune_sim::SimHeadset;

use crate::console::ConsoleSink;

/// Read stdin lines onto a channel the main loop can select on.
pub fn spawn_stdin_loop() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if tx.send(line).await.is_err() {
                break;
            }
        }
    });
    rx
}

/// Handle one command line. `Break` ends the demo.
pub fn dispatch(
    line: &str,
    console: &Arc<ConsoleSink>,
    sim: &Arc<SimHeadset>,
) -> ControlFlow<()> {
    let mut parts = line.split_whitespace();
    match parts.next() {
        None => {}
        Some("quit" | "exit") => return ControlFlow::Break(()),
        Some("help") => print_help(),
        Some("status") => console.print_status(),
        Some("pair") => match console.pairing_handler() {
            Some(handler) => handler(),
            None => println!("pairing is not required on this transport"),
        },
        Some("press") => sim.press_three_dot(),
        Some("detach") => sim.detach(),
        Some("attach") => sim.attach(),
        Some("sidetone") => handle_sidetone(parts.next(), console),
        Some("color") => handle_color(parts.next(), parts.next(), console),
        Some(other) => println!("unknown command: {other} (try 'help')"),
    }
    ControlFlow::Continue(())
}

fn print_help() {
    println!("commands:");
    println!("  status                    show current field values");
    println!("  sidetone on|off           change the sidetone setting");
    println!("  color <name|R,G,B> [mode] set the three-dot LED (mode: on, slow, fast, off)");
    println!("  press                     simulate a three-dot button press");
    println!("  pair                      run the pairing flow (gated transports)");
    println!("  attach / detach           plug or unplug the simulated headset");
    println!("  quit                      exit");
}

fn handle_sidetone(arg: Option<&str>, console: &Arc<ConsoleSink>) {
    let Some(enabled) = arg.and_then(parse_switch) else {
        println!("usage: sidetone on|off");
        return;
    };
    match console.sidetone_handler() {
        Some(handler) => handler(enabled),
        None => println!("sidetone control is not available yet"),
    }
}

fn handle_color(color: Option<&str>, mode: Option<&str>, console: &Arc<ConsoleSink>) {
    let Some(color) = color.and_then(parse_color) else {
        println!("usage: color <name|R,G,B> [on|slow|fast|off]");
        return;
    };
    let mode = match mode {
        Some(raw) => match raw.parse::<LedMode>() {
            Ok(mode) => mode,
            Err(_) => {
                println!("unknown mode: {raw} (on, slow, fast, off)");
                return;
            }
        },
        None => LedMode::On,
    };
    match console.button_handler() {
        Some(handler) => handler(color, mode),
        None => println!("button controls are not available yet"),
    }
}

fn parse_switch(raw: &str) -> Option<bool> {
    match raw {
        "on" | "true" => Some(true),
        "off" | "false" => Some(false),
        _ => None,
    }
}

/// Parse a named color or a comma-separated RGB triple. Missing or garbled
/// channels fall back to 0; out-of-range channels are clamped.
fn parse_color(raw: &str) -> Option<Color> {
    if raw.contains(',') {
        let mut channels = raw.split(',').map(|part| part.trim().parse::<i32>().unwrap_or(0));
        let r = channels.next().unwrap_or(0);
        let g = channels.next().unwrap_or(0);
        let b = channels.next().unwrap_or(0);
        return Some(Color::custom(r, g, b));
    }
    raw.parse().ok().map(Color::Named)
}

#[cfg(test)]
mod tests {
    use super::*;
    use attune_core::led::NamedColor;

    #[test]
    fn test_parse_named_color() {
        assert_eq!(parse_color("blue"), Some(Color::Named(NamedColor::Blue)));
        assert_eq!(parse_color("chartreuse"), None);
    }

    #[test]
    fn test_parse_custom_color_clamps() {
        assert_eq!(parse_color("-10,300,128"), Some(Color::custom(0, 255, 128)));
        assert_eq!(parse_color("-10,300,128").unwrap().rgb(), (0, 255, 128));
    }

    #[test]
    fn test_parse_custom_color_defaults_missing_channels() {
        assert_eq!(parse_color("12,34"), Some(Color::custom(12, 34, 0)));
        assert_eq!(parse_color("12,oops,56"), Some(Color::custom(12, 0, 56)));
    }

    #[test]
    fn test_parse_switch_forms() {
        assert_eq!(parse_switch("on"), Some(true));
        assert_eq!(parse_switch("false"), Some(false));
        assert_eq!(parse_switch("maybe"), None);
    }
}
