//! Configuration for evaluation, vision adapters and benchmark runs.

use crate::extractors::Method;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// How rows shorter than the longest row are treated when comparing
/// table structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RaggedRowPolicy {
    /// Short rows are implicitly padded with empty cells (default).
    #[default]
    PadWithEmpty,
    /// A grid with rows of differing length cannot match structurally.
    Mismatch,
}

impl std::str::FromStr for RaggedRowPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pad" | "pad-with-empty" | "padded" => Ok(Self::PadWithEmpty),
            "mismatch" | "strict" => Ok(Self::Mismatch),
            other => Err(format!("unknown ragged-row policy '{}' (expected pad or mismatch)", other)),
        }
    }
}

/// Evaluation engine configuration.
#[derive(Debug, Clone, Default)]
pub struct EvaluationConfig {
    /// Ragged-row handling for structural accuracy.
    pub ragged_rows: RaggedRowPolicy,
}

impl EvaluationConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ragged-row policy.
    pub fn with_ragged_rows(mut self, policy: RaggedRowPolicy) -> Self {
        self.ragged_rows = policy;
        self
    }
}

/// Settings shared by the hosted vision-LLM adapters.
#[derive(Debug, Clone)]
pub struct VisionConfig {
    /// Rasterization resolution.
    pub dpi: u32,
    /// 1-indexed pages sent to the model.
    pub pages: Vec<u32>,
    /// Response token limit.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// HTTP timeout per request.
    pub timeout: Duration,
    /// Model overrides per vision method; unset methods use their provider's default.
    pub models: HashMap<Method, String>,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl VisionConfig {
    /// Create new configuration with defaults (first page, 200 dpi).
    pub fn new() -> Self {
        Self {
            dpi: 200,
            pages: vec![1],
            max_tokens: 4096,
            temperature: 0.0,
            timeout: Duration::from_secs(120),
            models: HashMap::new(),
        }
    }

    /// Set rasterization resolution.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Set the pages to send.
    pub fn with_pages(mut self, pages: Vec<u32>) -> Self {
        self.pages = pages;
        self
    }

    /// Set the response token limit.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the default model of one vision method.
    pub fn with_model(mut self, method: Method, model: impl Into<String>) -> Self {
        self.models.insert(method, model.into());
        self
    }

    /// Model override for a method, if any.
    pub fn model_for(&self, method: Method) -> Option<&str> {
        self.models.get(&method).map(String::as_str)
    }
}

/// Benchmark driver configuration.
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Directory receiving per-method and combined results.
    pub output_dir: PathBuf,
    /// Maximum number of samples (None = all).
    pub sample_limit: Option<usize>,
    /// Evaluation settings.
    pub evaluation: EvaluationConfig,
    /// Print each report to stdout as it completes.
    pub print_reports: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl BenchmarkConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            output_dir: PathBuf::from("results"),
            sample_limit: Some(10),
            evaluation: EvaluationConfig::default(),
            print_reports: true,
        }
    }

    /// Set the output directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Limit the number of samples; `None` runs all of them.
    pub fn with_sample_limit(mut self, limit: Option<usize>) -> Self {
        self.sample_limit = limit;
        self
    }

    /// Set evaluation settings.
    pub fn with_evaluation(mut self, evaluation: EvaluationConfig) -> Self {
        self.evaluation = evaluation;
        self
    }

    /// Enable or disable report printing.
    pub fn with_print_reports(mut self, enable: bool) -> Self {
        self.print_reports = enable;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vision_defaults() {
        let config = VisionConfig::default();
        assert_eq!(config.dpi, 200);
        assert_eq!(config.pages, vec![1]);
        assert_eq!(config.max_tokens, 4096);
        assert!(config.models.is_empty());
    }

    #[test]
    fn test_model_override_per_method() {
        let config = VisionConfig::new()
            .with_model(Method::ClaudeVision, "claude-3-opus-20240229")
            .with_model(Method::Gpt4Vision, "gpt-4o-mini");
        assert_eq!(config.model_for(Method::ClaudeVision), Some("claude-3-opus-20240229"));
        assert_eq!(config.model_for(Method::Gpt4Vision), Some("gpt-4o-mini"));
        assert_eq!(config.model_for(Method::GeminiVision), None);
    }

    #[test]
    fn test_ragged_policy_parse() {
        assert_eq!("pad".parse::<RaggedRowPolicy>(), Ok(RaggedRowPolicy::PadWithEmpty));
        assert_eq!("Mismatch".parse::<RaggedRowPolicy>(), Ok(RaggedRowPolicy::Mismatch));
        assert!("sideways".parse::<RaggedRowPolicy>().is_err());
    }

    #[test]
    fn test_benchmark_builder() {
        let config = BenchmarkConfig::new()
            .with_output_dir("out")
            .with_sample_limit(None)
            .with_print_reports(false);
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert!(config.sample_limit.is_none());
        assert!(!config.print_reports);
    }
}
