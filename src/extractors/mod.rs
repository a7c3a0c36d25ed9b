//! Table extraction methods.
//!
//! Every method is a [`TableExtractor`] producing [`Table`] records. Methods
//! fall into two groups:
//!
//! - **Live**: the hosted vision-LLM methods, run from Rust through
//!   [`vision::VisionExtractor`]
//! - **Replayed**: methods implemented by external tools (rule-based PDF
//!   parsers, the table-transformer model, docling, the hybrid layout
//!   pipeline), whose saved output is loaded by [`ReplayExtractor`]
//!
//! Which methods can run is decided once, from explicit [`Capabilities`],
//! when the [`ExtractorRegistry`] is built.

pub mod replay;
pub mod vision;

pub use replay::ReplayExtractor;

use crate::config::VisionConfig;
use crate::error::{Error, Result};
use crate::table::{ExtractionOutput, Table};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use vision::{AnthropicClient, GeminiClient, OpenAiClient, PageRasterizer, VisionExtractor};

/// Environment variable holding the OpenAI key.
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
/// Environment variable holding the Anthropic key.
pub const ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
/// Environment variable holding the Google AI key.
pub const GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";

/// Broad family of an extraction method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodFamily {
    /// Rule-based PDF parsers
    Traditional,
    /// Trained detection/structure models
    DeepLearning,
    /// Hosted vision LLMs
    Llm,
    /// Layout detection followed by an LLM
    Hybrid,
}

/// Extraction methods known to the harness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// pdfplumber
    Pdfplumber,
    /// Camelot (lattice/stream)
    Camelot,
    /// Tabula
    Tabula,
    /// Table Transformer detection model
    TableTransformer,
    /// Docling document converter
    Docling,
    /// GPT-4o vision
    Gpt4Vision,
    /// Claude vision
    ClaudeVision,
    /// Gemini vision
    GeminiVision,
    /// Layout detection + GPT-4o on cropped regions
    HybridLayoutGpt4,
}

impl Method {
    /// Every method, in reporting order.
    pub const ALL: [Method; 9] = [
        Method::Pdfplumber,
        Method::Camelot,
        Method::Tabula,
        Method::TableTransformer,
        Method::Docling,
        Method::Gpt4Vision,
        Method::ClaudeVision,
        Method::GeminiVision,
        Method::HybridLayoutGpt4,
    ];

    /// Stable method name used in file names and reports.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Pdfplumber => "pdfplumber",
            Self::Camelot => "camelot",
            Self::Tabula => "tabula",
            Self::TableTransformer => "table_transformer",
            Self::Docling => "docling",
            Self::Gpt4Vision => "gpt4_vision",
            Self::ClaudeVision => "claude_vision",
            Self::GeminiVision => "gemini_vision",
            Self::HybridLayoutGpt4 => "hybrid_layout_gpt4",
        }
    }

    /// Method family.
    pub const fn family(&self) -> MethodFamily {
        match self {
            Self::Pdfplumber | Self::Camelot | Self::Tabula => MethodFamily::Traditional,
            Self::TableTransformer | Self::Docling => MethodFamily::DeepLearning,
            Self::Gpt4Vision | Self::ClaudeVision | Self::GeminiVision => MethodFamily::Llm,
            Self::HybridLayoutGpt4 => MethodFamily::Hybrid,
        }
    }

    /// Whether the method runs from Rust rather than from saved output.
    pub const fn is_live(&self) -> bool {
        matches!(self.family(), MethodFamily::Llm)
    }

    /// API key the method needs when run live.
    pub const fn credential(&self) -> Option<&'static str> {
        match self {
            Self::Gpt4Vision | Self::HybridLayoutGpt4 => Some(OPENAI_API_KEY),
            Self::ClaudeVision => Some(ANTHROPIC_API_KEY),
            Self::GeminiVision => Some(GOOGLE_API_KEY),
            _ => None,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Method::ALL
            .into_iter()
            .find(|m| m.name() == wanted)
            .ok_or_else(|| Error::UnknownMethod(s.to_string()))
    }
}

/// A table extraction method.
pub trait TableExtractor {
    /// Which method this is.
    fn method(&self) -> Method;

    /// Extract every table the method finds in a PDF.
    fn extract_tables(&mut self, pdf_path: &Path) -> Result<Vec<Table>>;

    /// Wall-clock time of the last [`extract_tables`](Self::extract_tables) call.
    fn extraction_time(&self) -> Duration;

    /// Cost in USD accumulated across calls (0 for free methods).
    fn total_cost(&self) -> f64 {
        0.0
    }

    /// Model identifier, for LLM-based methods.
    fn model(&self) -> Option<&str> {
        None
    }
}

/// What the running environment provides to extraction methods.
///
/// Built once at startup and handed to the [`ExtractorRegistry`]; tests
/// construct it directly.
#[derive(Debug, Clone, Default)]
pub struct Capabilities {
    /// OpenAI key
    pub openai_api_key: Option<String>,
    /// Anthropic key
    pub anthropic_api_key: Option<String>,
    /// Google AI key
    pub google_api_key: Option<String>,
    /// Page rasterizer (`pdftoppm`) location
    pub rasterizer: Option<PathBuf>,
    /// Directory holding saved extraction outputs
    pub replay_dir: Option<PathBuf>,
}

impl Capabilities {
    /// Detect credentials from the environment and `pdftoppm` from `PATH`.
    pub fn detect(replay_dir: Option<PathBuf>) -> Self {
        let key = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        let capabilities = Self {
            openai_api_key: key(OPENAI_API_KEY),
            anthropic_api_key: key(ANTHROPIC_API_KEY),
            google_api_key: key(GOOGLE_API_KEY),
            rasterizer: PageRasterizer::locate(),
            replay_dir,
        };
        log::debug!("Detected capabilities: {}", capabilities.description());
        capabilities
    }

    /// API key for an environment variable name, if configured.
    pub fn api_key(&self, env_var: &str) -> Option<&str> {
        match env_var {
            OPENAI_API_KEY => self.openai_api_key.as_deref(),
            ANTHROPIC_API_KEY => self.anthropic_api_key.as_deref(),
            GOOGLE_API_KEY => self.google_api_key.as_deref(),
            _ => None,
        }
    }

    /// Human-readable summary without secrets.
    pub fn description(&self) -> String {
        let flag = |set: bool| if set { "yes" } else { "no" };
        format!(
            "openai={} anthropic={} google={} pdftoppm={} replay_dir={}",
            flag(self.openai_api_key.is_some()),
            flag(self.anthropic_api_key.is_some()),
            flag(self.google_api_key.is_some()),
            flag(self.rasterizer.is_some()),
            self.replay_dir
                .as_ref()
                .map_or_else(|| "none".to_string(), |d| d.display().to_string()),
        )
    }
}

/// Whether a method can run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Availability {
    /// Ready to create
    Available,
    /// Missing something; the reason says what
    Unavailable(String),
}

impl Availability {
    /// Whether the method can run.
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }
}

/// Creates extractors for the methods the environment supports.
#[derive(Debug, Clone)]
pub struct ExtractorRegistry {
    capabilities: Capabilities,
    vision: VisionConfig,
}

impl ExtractorRegistry {
    /// Build a registry from detected capabilities.
    pub fn new(capabilities: Capabilities, vision: VisionConfig) -> Self {
        Self {
            capabilities,
            vision,
        }
    }

    /// Capabilities the registry was built with.
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    /// Check whether a method can run.
    pub fn availability(&self, method: Method) -> Availability {
        if method.is_live() {
            if let Some(env_var) = method.credential() {
                if self.capabilities.api_key(env_var).is_none() {
                    return Availability::Unavailable(format!("API key not configured (set {})", env_var));
                }
            }
            if self.capabilities.rasterizer.is_none() {
                return Availability::Unavailable("pdftoppm not found (install poppler-utils)".to_string());
            }
            Availability::Available
        } else if self.capabilities.replay_dir.is_some() {
            Availability::Available
        } else {
            Availability::Unavailable("no replay directory with saved outputs".to_string())
        }
    }

    /// Methods that can run, in reporting order.
    pub fn available_methods(&self) -> Vec<Method> {
        Method::ALL
            .into_iter()
            .filter(|m| self.availability(*m).is_available())
            .collect()
    }

    /// Create an extractor for a method.
    pub fn create(&self, method: Method) -> Result<Box<dyn TableExtractor>> {
        if let Availability::Unavailable(reason) = self.availability(method) {
            return Err(Error::Unavailable {
                method: method.to_string(),
                reason,
            });
        }

        if !method.is_live() {
            let dir = self.capabilities.replay_dir.clone().unwrap_or_default();
            return Ok(Box::new(ReplayExtractor::new(method, dir)));
        }

        let rasterizer = PageRasterizer::new(
            self.capabilities.rasterizer.clone().unwrap_or_default(),
            self.vision.dpi,
        );
        let env_var = method.credential().unwrap_or(OPENAI_API_KEY);
        let key = self
            .capabilities
            .api_key(env_var)
            .ok_or_else(|| Error::MissingCredential {
                method: method.to_string(),
                env_var,
            })?
            .to_string();

        let extractor: Box<dyn TableExtractor> = match method {
            Method::ClaudeVision => Box::new(VisionExtractor::new(
                method,
                AnthropicClient::new(key, &self.vision)?,
                rasterizer,
                self.vision.pages.clone(),
            )),
            Method::GeminiVision => Box::new(VisionExtractor::new(
                method,
                GeminiClient::new(key, &self.vision)?,
                rasterizer,
                self.vision.pages.clone(),
            )),
            _ => Box::new(VisionExtractor::new(
                method,
                OpenAiClient::new(key, &self.vision)?,
                rasterizer,
                self.vision.pages.clone(),
            )),
        };
        Ok(extractor)
    }
}

/// Run an extractor and save its output as JSON.
pub fn extract_to_file(
    extractor: &mut dyn TableExtractor,
    pdf_path: &Path,
    output_path: &Path,
) -> Result<ExtractionOutput> {
    let tables = extractor.extract_tables(pdf_path)?;
    let mut output = ExtractionOutput::new(tables, extractor.extraction_time().as_secs_f64())
        .with_method(extractor.method().name())
        .with_cost(extractor.total_cost());
    if let Some(model) = extractor.model() {
        output = output.with_model(model);
    }
    output.save(output_path)?;
    log::info!("Saved to {}", output_path.display());
    Ok(output)
}
