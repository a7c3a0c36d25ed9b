//! Hosted vision-LLM extraction.
//!
//! A page is rendered to PNG, sent to the model together with
//! [`TABLE_PROMPT`], and the JSON the model answers with is turned into
//! table records. Providers differ only in their HTTP shape, which each
//! [`VisionClient`] hides.
//!
//! ## Cost Information
//!
//! | Model | Input (per 1M tokens) | Output (per 1M tokens) |
//! |-------|----------------------|------------------------|
//! | claude-3-5-sonnet | $3.00 | $15.00 |
//! | gpt-4o | $2.50 | $10.00 |
//! | gemini-1.5-flash | $0.075 | $0.30 |
//!
//! When a provider reports no usage, a flat per-image estimate
//! ([`FLAT_IMAGE_ESTIMATE`], $0.0005) is charged.
//!
//! Gemini always reports `usageMetadata`, so its requests are priced by
//! tokens. Totals differ from tools that charge Gemini a flat $0.0005 per
//! image regardless of usage.

mod anthropic;
mod gemini;
mod openai;
mod rasterize;

pub use anthropic::AnthropicClient;
pub use gemini::GeminiClient;
pub use openai::OpenAiClient;
pub use rasterize::PageRasterizer;

use super::{Method, TableExtractor};
use crate::config::VisionConfig;
use crate::error::{Error, Result};
use crate::table::{CellValue, Table, TableMetadata, TokenUsage};
use serde::Deserialize;
use std::path::Path;
use std::time::{Duration, Instant};

/// Instruction sent with every page image.
pub const TABLE_PROMPT: &str = r#"Extract all tables from this image in JSON format.

For each table, provide:
1. The table data as a 2D array (rows and columns)
2. Identify headers if present

Return ONLY valid JSON in this format:
{
  "tables": [
    {
      "data": [
        ["Header1", "Header2", "Header3"],
        ["Row1Col1", "Row1Col2", "Row1Col3"],
        ...
      ]
    }
  ]
}

Be precise with numbers and text. Preserve formatting exactly."#;

/// Per-image charge used when the provider reports no token usage.
pub const FLAT_IMAGE_ESTIMATE: f64 = 0.0005;

/// Token prices for a model, in USD per million tokens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pricing {
    /// Input (prompt + image) price
    pub input_per_million: f64,
    /// Output price
    pub output_per_million: f64,
}

impl Pricing {
    /// Create a price pair.
    pub const fn new(input_per_million: f64, output_per_million: f64) -> Self {
        Self {
            input_per_million,
            output_per_million,
        }
    }

    /// Cost of one request.
    pub fn cost(&self, usage: Option<TokenUsage>) -> f64 {
        match usage {
            Some(usage) => {
                (usage.input as f64 * self.input_per_million / 1_000_000.0)
                    + (usage.output as f64 * self.output_per_million / 1_000_000.0)
            },
            None => FLAT_IMAGE_ESTIMATE,
        }
    }
}

/// Text answer of a vision model.
#[derive(Debug, Clone, PartialEq)]
pub struct VisionReply {
    /// Model output text
    pub text: String,
    /// Token usage, when the provider reports it
    pub usage: Option<TokenUsage>,
}

/// A hosted vision model.
pub trait VisionClient {
    /// Provider name for logs and errors.
    fn provider(&self) -> &'static str;

    /// Model identifier.
    fn model(&self) -> &str;

    /// Token prices of the model.
    fn pricing(&self) -> Pricing;

    /// Send one PNG page with a prompt and return the model's text.
    fn send(&self, png: &[u8], prompt: &str) -> Result<VisionReply>;
}

/// Pull the JSON out of a model answer wrapped in markdown fences.
///
/// A ```` ```json ```` fence wins over a bare ```` ``` ```` fence; the block
/// runs to the next fence. Unfenced text is returned trimmed.
pub fn extract_json_block(content: &str) -> &str {
    let fenced = content
        .split_once("```json")
        .or_else(|| content.split_once("```"))
        .map(|(_, rest)| rest.split_once("```").map_or(rest, |(block, _)| block));
    fenced.unwrap_or(content).trim()
}

#[derive(Debug, Deserialize)]
struct TablesPayload {
    #[serde(default)]
    tables: Vec<TablePayload>,
}

#[derive(Debug, Deserialize)]
struct TablePayload {
    #[serde(default)]
    data: Vec<Vec<CellValue>>,
}

/// Parse the grids out of a model answer.
///
/// Missing `tables` or `data` keys yield no tables / empty grids.
pub fn parse_tables_response(content: &str) -> Result<Vec<Vec<Vec<CellValue>>>> {
    let block = extract_json_block(content);
    let payload: TablesPayload = serde_json::from_str(block).map_err(|e| {
        let preview: String = block.chars().take(80).collect();
        Error::ResponseFormat(format!("{} (response starts with {:?})", e, preview))
    })?;
    Ok(payload.tables.into_iter().map(|t| t.data).collect())
}

/// Blocking HTTP client shared by the providers.
pub(crate) fn http_client(config: &VisionConfig) -> Result<reqwest::blocking::Client> {
    Ok(reqwest::blocking::Client::builder()
        .timeout(config.timeout)
        .build()?)
}

/// Turn a non-success response into [`Error::Api`].
pub(crate) fn check_status(
    provider: &'static str,
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().unwrap_or_default();
    Err(Error::Api {
        provider,
        status: status.as_u16(),
        message,
    })
}

/// Extraction method backed by a vision model.
#[derive(Debug)]
pub struct VisionExtractor<C> {
    method: Method,
    client: C,
    rasterizer: PageRasterizer,
    pages: Vec<u32>,
    extraction_time: Duration,
    total_cost: f64,
}

impl<C: VisionClient> VisionExtractor<C> {
    /// Create an extractor sending `pages` (1-indexed) to `client`.
    pub fn new(method: Method, client: C, rasterizer: PageRasterizer, pages: Vec<u32>) -> Self {
        Self {
            method,
            client,
            rasterizer,
            pages,
            extraction_time: Duration::ZERO,
            total_cost: 0.0,
        }
    }

    /// Model client.
    pub fn client(&self) -> &C {
        &self.client
    }

    fn extract_page(&mut self, pdf_path: &Path, page_num: u32) -> Result<Vec<Table>> {
        log::info!("  Converting page {} to image...", page_num);
        let png = self.rasterizer.render_page(pdf_path, page_num)?;

        log::info!("  Sending request to {}...", self.client.model());
        let reply = self.client.send(&png, TABLE_PROMPT)?;
        let grids = parse_tables_response(&reply.text)?;

        let cost = self.client.pricing().cost(reply.usage);
        self.total_cost += cost;
        match reply.usage {
            Some(usage) => log::info!(
                "  Tokens: {} input, {} output; cost ${:.4}",
                usage.input,
                usage.output,
                cost
            ),
            None => log::info!("  Cost: ${:.4} (estimated)", cost),
        }

        let tables = grids
            .into_iter()
            .enumerate()
            .map(|(idx, data)| {
                Table::new(Some(page_num), idx, data).with_metadata(TableMetadata {
                    model: Some(self.client.model().to_string()),
                    ..Default::default()
                })
            })
            .collect::<Vec<_>>();
        for table in &tables {
            log::info!("  Table {}: {}", table.table_index(), table.dimensions());
        }
        Ok(tables)
    }
}

impl<C: VisionClient> TableExtractor for VisionExtractor<C> {
    fn method(&self) -> Method {
        self.method
    }

    fn extract_tables(&mut self, pdf_path: &Path) -> Result<Vec<Table>> {
        let start = Instant::now();
        log::info!(
            "Processing {} with {} ({})",
            pdf_path.display(),
            self.client.provider(),
            self.client.model()
        );

        let mut tables = Vec::new();
        for page_num in self.pages.clone() {
            tables.extend(self.extract_page(pdf_path, page_num)?);
        }

        self.extraction_time = start.elapsed();
        log::info!(
            "Extracted {} tables in {:.2}s (total cost ${:.4})",
            tables.len(),
            self.extraction_time.as_secs_f64(),
            self.total_cost
        );
        Ok(tables)
    }

    fn extraction_time(&self) -> Duration {
        self.extraction_time
    }

    fn total_cost(&self) -> f64 {
        self.total_cost
    }

    fn model(&self) -> Option<&str> {
        Some(self.client.model())
    }
}
