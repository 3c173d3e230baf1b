use std::time::Duration;

use tokio::sync::watch;

use super::{Command, CommandError, State};
use crate::aggregator;

/// `agg <interval>`: run the polling engine until interrupted.
///
/// Ctrl-C flips the shutdown token the scheduler races against every
/// suspension point, so an in-flight fetch or store call is interrupted
/// rather than awaited to completion.
pub async fn run(state: &mut State, cmd: Command) -> Result<(), CommandError> {
    let arg = cmd
        .args
        .first()
        .ok_or_else(|| CommandError::Usage("agg <interval> (e.g. 30s, 5m, 1h)".to_string()))?;
    let secs = parse_interval(arg).map_err(CommandError::Usage)?;
    let interval = Duration::from_secs(secs);

    println!("Collecting feeds every {}", format_interval(secs));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, shutting down");
            let _ = shutdown_tx.send(true);
        }
    });

    aggregator::run(state.db.clone(), state.http.clone(), interval, shutdown_rx).await;
    Ok(())
}

/// Parse an interval string like "30s", "5m", "1h", "1d", or raw seconds.
fn parse_interval(s: &str) -> Result<u64, String> {
    let s = s.trim().to_lowercase();

    let (digits, unit) = match s.strip_suffix(['s', 'm', 'h', 'd']) {
        Some(digits) => (digits, s.as_bytes()[s.len() - 1]),
        None => (s.as_str(), b's'),
    };
    let value: u64 = digits
        .parse()
        .map_err(|_| format!("invalid interval {s}; use a form like 30s, 5m, or 1h"))?;
    if value == 0 {
        return Err("interval must be positive".to_string());
    }

    Ok(match unit {
        b'm' => value * 60,
        b'h' => value * 3600,
        b'd' => value * 86400,
        _ => value,
    })
}

/// Format a second count back into the shortest whole unit.
fn format_interval(secs: u64) -> String {
    if secs >= 86400 && secs % 86400 == 0 {
        format!("{}d", secs / 86400)
    } else if secs >= 3600 && secs % 3600 == 0 {
        format!("{}h", secs / 3600)
    } else if secs >= 60 && secs % 60 == 0 {
        format!("{}m", secs / 60)
    } else {
        format!("{}s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_interval_units() {
        assert_eq!(parse_interval("30s").unwrap(), 30);
        assert_eq!(parse_interval("5m").unwrap(), 300);
        assert_eq!(parse_interval("1h").unwrap(), 3600);
        assert_eq!(parse_interval("2d").unwrap(), 172800);
        // Raw seconds
        assert_eq!(parse_interval("90").unwrap(), 90);
    }

    #[test]
    fn test_parse_interval_rejects_garbage() {
        assert!(parse_interval("soon").is_err());
        assert!(parse_interval("").is_err());
        assert!(parse_interval("0s").is_err());
        assert!(parse_interval("-5m").is_err());
    }

    #[test]
    fn test_format_interval_round_trip() {
        assert_eq!(format_interval(30), "30s");
        assert_eq!(format_interval(300), "5m");
        assert_eq!(format_interval(3600), "1h");
        assert_eq!(format_interval(90), "90s");
    }
}
