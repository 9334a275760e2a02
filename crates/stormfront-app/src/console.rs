//! Operator console: one admin command per line on stdin.
//!
//! ```text
//! start [class|random] [seconds]
//! next <seconds>
//! end
//! reload
//! quit
//! ```

use std::path::Path;

use stormfront_core::commands::AdminCommand;
use stormfront_core::config::StormConfig;

use crate::state::GameLoopCommand;

/// Parse one console line. `reload` re-reads `config_path`.
pub fn parse_line(line: &str, config_path: Option<&Path>) -> Result<GameLoopCommand, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Err("empty command".into());
    };
    let args: Vec<&str> = words.collect();

    let command = match (verb.to_ascii_lowercase().as_str(), args.as_slice()) {
        ("start", rest) if rest.len() <= 2 => {
            let class = rest
                .first()
                .filter(|c| !c.eq_ignore_ascii_case("random"))
                .map(|c| c.to_string());
            let duration_secs = rest.get(1).map(|s| parse_secs(s)).transpose()?;
            AdminCommand::ForceStart {
                class,
                duration_secs,
            }
        }
        ("next", [secs]) => AdminCommand::ForceNext {
            seconds: parse_secs(secs)?,
        },
        ("end", []) => AdminCommand::EndNow,
        ("reload", []) => {
            let path = config_path.ok_or("no config file was given")?;
            AdminCommand::ReloadConfig {
                config: Box::new(StormConfig::load(path)),
            }
        }
        ("quit" | "exit" | "stop", []) => return Ok(GameLoopCommand::Shutdown),
        _ => return Err(format!("unrecognized command '{}'", line.trim())),
    };
    Ok(GameLoopCommand::Admin(command))
}

fn parse_secs(s: &str) -> Result<i64, String> {
    s.parse::<i64>()
        .map_err(|_| format!("'{s}' is not a number of seconds"))
}
