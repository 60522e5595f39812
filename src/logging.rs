use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

/// Workspace crates whose events reach the terminal.
const CRATE_TARGETS: &[&str] = &[
    "diagon",
    "diagon_calendar",
    "diagon_grid",
    "diagon_index",
    "diagon_io",
    "diagon_seasonal",
    "diagon_stats",
];

/// Filter level for a `-v` count.
fn level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// `EnvFilter` directives used when `RUST_LOG` is unset: the chosen level
/// for every diagon crate.
fn default_filter(verbosity: u8) -> String {
    let level = level(verbosity);
    CRATE_TARGETS
        .iter()
        .map(|t| format!("{t}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Set up the global subscriber for a `-v` count.
///
/// Events go to stderr. From `-vv` on, every event carries its target and
/// the `amo`, `cycle` and `dataset` spans report their elapsed time on
/// close. `RUST_LOG` replaces the default directives when set.
pub fn init(verbosity: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));
    let detailed = verbosity >= 2;
    let span_events = if detailed {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(detailed)
        .with_span_events(span_events)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(level(0), "warn");
        assert_eq!(level(1), "info");
        assert_eq!(level(2), "debug");
        assert_eq!(level(7), "trace");
    }

    #[test]
    fn default_filter_covers_every_crate() {
        let filter = default_filter(1);
        assert!(filter.starts_with("diagon=info,diagon_calendar=info"));
        assert_eq!(filter.split(',').count(), CRATE_TARGETS.len());
        assert!(filter.split(',').all(|d| d.ends_with("=info")));
        assert!(!default_filter(0).contains("info"));
    }

    #[test]
    fn default_filter_parses() {
        for verbosity in 0..4 {
            assert!(EnvFilter::try_new(default_filter(verbosity)).is_ok());
        }
    }
}
