//! Environment defaults for the command-line tool.

/// Default sampling stride for image analysis.
const DEFAULT_STATS_STRIDE: usize = 4;

/// Settings read from the environment; command-line flags override them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Worker threads (`0` lets rayon decide).
    pub threads: usize,
    /// Analyze every Nth pixel.
    pub stats_stride: usize,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            threads: env_usize("FILMGRADE_THREADS").unwrap_or(0),
            stats_stride: env_usize("FILMGRADE_STATS_STRIDE")
                .filter(|&s| s > 0)
                .unwrap_or(DEFAULT_STATS_STRIDE),
        }
    }
}

fn env_usize(name: &str) -> Option<usize> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(name, value = %raw, "ignoring non-numeric environment value");
            None
        }
    }
}
