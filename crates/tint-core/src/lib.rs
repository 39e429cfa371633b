pub mod emitter;
pub mod error;
pub mod groups;
pub mod lint;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod rewrite;
pub mod theme;
pub mod transform;

pub use emitter::{emit_document, emit_element, to_bytes};
pub use error::{Result, TintError};
pub use groups::{GroupSet, LocatedGroup, locate_groups, second_level_groups};
pub use lint::{LintDiagnostic, LintSeverity, lint_style_map};
pub use model::*;
pub use parser::{parse_document, parse_fragment};
pub use pipeline::{RestyleConfig, restyle_document};
pub use rewrite::rewrite_fragment;
pub use theme::Theme;
pub use transform::{AssembleReport, LabelSpec, LayerSelector, assemble, assemble_with, inject_label};
