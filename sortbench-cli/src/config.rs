//! Configuration loading from sortbench.toml
//!
//! Sortbench configuration can be specified in a `sortbench.toml` file in the
//! project root. The configuration is automatically discovered by walking up
//! from the current directory. CLI flags override the file.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Sortbench configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SortbenchConfig {
    /// Runner configuration
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Array size configuration
    #[serde(default)]
    pub sizes: SizesConfig,
    /// Ranking configuration
    #[serde(default)]
    pub ranking: RankingConfig,
    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

/// Isolation mode for candidate execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum IsolationMode {
    /// Run units in persistent worker processes that are killed on timeout (default)
    #[default]
    Process,
    /// Run units directly on the scheduler thread (no hard timeout, debugging only)
    InProcess,
    /// Run units on dedicated threads that are abandoned on timeout
    Thread,
}

impl IsolationMode {
    /// Whether this mode can forcibly terminate a runaway candidate
    pub fn is_isolated(self) -> bool {
        matches!(self, IsolationMode::Process)
    }

    /// Name as written in the config file
    pub fn as_str(self) -> &'static str {
        match self {
            IsolationMode::Process => "process",
            IsolationMode::InProcess => "in-process",
            IsolationMode::Thread => "thread",
        }
    }
}

impl std::str::FromStr for IsolationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "process" => Ok(IsolationMode::Process),
            "in-process" | "inprocess" => Ok(IsolationMode::InProcess),
            "thread" => Ok(IsolationMode::Thread),
            other => Err(format!("Unknown isolation mode: {}", other)),
        }
    }
}

/// Runner configuration for benchmark execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Iterations per (algorithm, size)
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Soft ceiling on a size's mean before the algorithm is skipped (e.g., "300s")
    #[serde(default = "default_threshold")]
    pub threshold: String,
    /// Kill individual runs that exceed the timeout
    #[serde(default)]
    pub timeout_enabled: bool,
    /// Hard per-run deadline; defaults to `threshold`
    #[serde(default)]
    pub timeout: Option<String>,
    /// Isolation mode: "process", "in-process", or "thread"
    #[serde(default)]
    pub isolation: IsolationMode,
    /// Use every available CPU (otherwise run sequentially)
    #[serde(default = "default_use_all_cpus")]
    pub use_all_cpus: bool,
    /// Explicit number of parallel workers
    #[serde(default)]
    pub jobs: Option<usize>,
    /// Workload seed (random when absent)
    #[serde(default)]
    pub seed: Option<u64>,
    /// Disqualify an algorithm on its first errored iteration
    #[serde(default)]
    pub skip_on_error: bool,
    /// Skip an algorithm once this share of a size's iterations fail; 0 disables
    #[serde(default = "default_max_failure_ratio")]
    pub max_failure_ratio: f64,
    /// Smallest generated value
    #[serde(default = "default_min_value")]
    pub min_value: i64,
    /// Largest generated value
    #[serde(default = "default_max_value")]
    pub max_value: i64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            threshold: default_threshold(),
            timeout_enabled: false,
            timeout: None,
            isolation: IsolationMode::default(),
            use_all_cpus: default_use_all_cpus(),
            jobs: None,
            seed: None,
            skip_on_error: false,
            max_failure_ratio: default_max_failure_ratio(),
            min_value: default_min_value(),
            max_value: default_max_value(),
        }
    }
}

fn default_max_failure_ratio() -> f64 {
    crate::executor::DEFAULT_MAX_FAILURE_RATIO
}
fn default_iterations() -> u32 {
    500
}
fn default_threshold() -> String {
    "300s".to_string()
}
fn default_use_all_cpus() -> bool {
    true
}
fn default_min_value() -> i64 {
    sortbench_core::DEFAULT_MIN_VALUE
}
fn default_max_value() -> i64 {
    sortbench_core::DEFAULT_MAX_VALUE
}

/// Array size configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SizesConfig {
    /// Explicit ascending sizes (overrides the default ladder)
    #[serde(default)]
    pub list: Option<Vec<usize>>,
    /// Largest size of the default ladder
    #[serde(default = "default_max_size")]
    pub max_size: usize,
}

impl Default for SizesConfig {
    fn default() -> Self {
        Self {
            list: None,
            max_size: default_max_size(),
        }
    }
}

fn default_max_size() -> usize {
    1_000_000
}

/// Ranking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Means within one band of this width share a per-size rank
    #[serde(default = "default_tie_resolution")]
    pub tie_resolution: String,
    /// Band width for the overall ranking
    #[serde(default = "default_overall_resolution")]
    pub overall_resolution: String,
    /// Length of the overall table
    #[serde(default = "default_top")]
    pub top: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            tie_resolution: default_tie_resolution(),
            overall_resolution: default_overall_resolution(),
            top: default_top(),
        }
    }
}

fn default_tie_resolution() -> String {
    "1ms".to_string()
}
fn default_overall_resolution() -> String {
    "1us".to_string()
}
fn default_top() -> usize {
    sortbench_logic::DEFAULT_TOP_N
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format: "human", "json", "markdown"
    #[serde(default = "default_format")]
    pub format: String,
    /// Output directory for reports and journals
    #[serde(default = "default_output_dir")]
    pub directory: String,
    /// Write per-size CSV journals and resume from them
    #[serde(default)]
    pub journal: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            directory: default_output_dir(),
            journal: false,
        }
    }
}

fn default_format() -> String {
    "human".to_string()
}
fn default_output_dir() -> String {
    "target/sortbench".to_string()
}

impl SortbenchConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<Self> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join("sortbench.toml");
            if config_path.exists() {
                return match Self::load(&config_path) {
                    Ok(config) => Some(config),
                    Err(e) => {
                        tracing::warn!("Ignoring {}: {}", config_path.display(), e);
                        None
                    }
                };
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# Sortbench Configuration

[runner]
# Iterations per algorithm and array size
iterations = 500
# An algorithm whose mean at a size exceeds this is not run on larger sizes
threshold = "300s"
# Kill individual runs that take longer than `timeout`
timeout_enabled = false
# Per-run deadline (defaults to threshold; uncomment to override)
# timeout = "60s"
# Isolation mode: "process", "in-process", or "thread"
isolation = "process"
# Use all CPUs; false runs one unit at a time
use_all_cpus = true
# Explicit worker count (uncomment to enable)
# jobs = 4
# Workload seed (uncomment for reproducible inputs)
# seed = 42
# Stop scheduling an algorithm after its first error
skip_on_error = false
# Stop scheduling an algorithm once this share of a size's runs fail (0 disables)
max_failure_ratio = 0.5
# Range of generated values
min_value = -1000000
max_value = 1000000

[sizes]
# Largest size of the default ladder
max_size = 1000000
# Explicit sizes (uncomment to replace the ladder)
# list = [5, 7, 9, 12, 100, 1000]

[ranking]
# Means within the same band share a rank
tie_resolution = "1ms"
overall_resolution = "1us"
# Length of the overall ranking
top = 20

[output]
# Default output format: human, json, markdown
format = "human"
# Output directory for reports and journals
directory = "target/sortbench"
# Write results_{size}.csv journals and resume from them
journal = false
"#
        .to_string()
    }

    /// Parse duration string (e.g., "3s", "500ms", "2m") to nanoseconds
    pub fn parse_duration(s: &str) -> anyhow::Result<u64> {
        let s = s.trim();
        if s.is_empty() {
            return Err(anyhow::anyhow!("Empty duration string"));
        }

        let (num_part, unit_part) = s
            .char_indices()
            .find(|(_, c)| c.is_alphabetic())
            .map(|(i, _)| s.split_at(i))
            .unwrap_or((s, "s"));

        let value: f64 = num_part
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid duration number: {}", num_part))?;
        if !value.is_finite() || value < 0.0 {
            return Err(anyhow::anyhow!("Duration must be non-negative: {}", s));
        }

        let multiplier: u64 = match unit_part.to_lowercase().as_str() {
            "ns" => 1,
            "us" | "µs" => 1_000,
            "ms" => 1_000_000,
            "s" | "" => 1_000_000_000,
            "m" | "min" => 60_000_000_000,
            "h" | "hr" => 3_600_000_000_000,
            _ => return Err(anyhow::anyhow!("Unknown duration unit: {}", unit_part)),
        };

        Ok((value * multiplier as f64) as u64)
    }
}
