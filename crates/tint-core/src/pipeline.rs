//! Restyle pipeline: parse → assemble → label → emit.
//!
//! One entry point for callers that hold document text rather than a parsed
//! `Document` (the CLI, exporters).

use crate::emitter::emit_document;
use crate::error::Result;
use crate::model::StyleMap;
use crate::parser::parse_document;
use crate::transform::{LabelSpec, LayerSelector, assemble_with, inject_label};

// ─── Config ───────────────────────────────────────────────────────────────

/// Configuration for `restyle_document`.
#[derive(Debug, Clone, Default)]
pub struct RestyleConfig {
    /// Which element gets rebuilt. Default: the first `<g>`.
    pub selector: LayerSelector,
    /// Marker text added after assembly. Default: none.
    pub label: Option<LabelSpec>,
}

impl RestyleConfig {
    /// Default config plus a `Theme: <name>` label.
    pub fn with_theme_label(theme_name: &str) -> Self {
        Self {
            label: Some(LabelSpec::new(format!("Theme: {theme_name}"))),
            ..Self::default()
        }
    }
}

// ─── Pipeline ─────────────────────────────────────────────────────────────

/// Parse `text`, rebuild its layer container from `styles`, optionally
/// label it, and emit the result with an XML declaration.
///
/// # Errors
/// Any parse or assembly error; see `transform::assemble_with`.
pub fn restyle_document(text: &str, styles: &StyleMap, config: &RestyleConfig) -> Result<String> {
    let mut doc = parse_document(text)?;
    let report = assemble_with(&mut doc, styles, &config.selector)?;
    log::debug!(
        "restyled {}: {} appended, {} dropped, {} skipped",
        report.container,
        report.appended.len(),
        report.dropped.len(),
        report.skipped.len()
    );

    if let Some(label) = &config.label {
        inject_label(&mut doc, label);
    }

    Ok(emit_document(&doc))
}

// ─── Tests ────────────────────────────────────────────────────────────────
