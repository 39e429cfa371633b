//! Lint diagnostics for a document + style map pair.
//!
//! Reports what `assemble` is about to do that is easy to miss, without
//! modifying the document. Nothing here blocks assembly; colors are never
//! validated by the engine itself.

use crate::groups::{locate_groups, second_level_groups};
use crate::model::{Document, StyleMap, StyleSpec};
use crate::rewrite::{Form, Property, RewriteRule, matching_rules, rule_matches};
use regex::Regex;
use std::sync::LazyLock;

// ─── Diagnostic types ────────────────────────────────────────────────────

/// Severity of a lint finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LintSeverity {
    /// Probably not what the author wants.
    Warning,
    /// Informational.
    Info,
}

/// A single lint diagnostic about one group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintDiagnostic {
    /// Group identifier (explicit or synthetic) or style map key.
    pub group: String,
    /// Human-readable message.
    pub message: String,
    pub severity: LintSeverity,
    /// Short rule identifier (e.g. "dropped-group", "forced-px").
    pub rule: &'static str,
}

// ─── Public API ───────────────────────────────────────────────────────────

/// Run all lint rules over `doc` as it would be assembled with `styles`.
#[must_use]
pub fn lint_style_map(doc: &Document, styles: &StyleMap) -> Vec<LintDiagnostic> {
    let mut diags = Vec::new();
    lint_synthetic_ids(doc, &mut diags);
    lint_coverage(doc, styles, &mut diags);
    lint_directives(doc, styles, &mut diags);
    diags
}

// ─── Rules ────────────────────────────────────────────────────────────────

/// Warn on groups addressed only by a synthetic `(no-id)#N` key.
fn lint_synthetic_ids(doc: &Document, diags: &mut Vec<LintDiagnostic>) {
    for group in locate_groups(doc).into_iter().filter(|g| !g.explicit_id) {
        diags.push(LintDiagnostic {
            message: format!(
                "Group `{}` has no id; its key depends on document order.",
                group.key
            ),
            group: group.key,
            severity: LintSeverity::Warning,
            rule: "synthetic-id",
        });
    }
}

/// Located groups missing from the map, and map keys with no group.
fn lint_coverage(doc: &Document, styles: &StyleMap, diags: &mut Vec<LintDiagnostic>) {
    let groups = second_level_groups(doc);
    for id in groups.keys().filter(|id| !styles.contains_key(id.as_str())) {
        diags.push(LintDiagnostic {
            group: id.clone(),
            message: format!("Group `{id}` has no style entry and will be dropped."),
            severity: LintSeverity::Warning,
            rule: "dropped-group",
        });
    }
    for id in styles.keys().filter(|id| !groups.contains_key(id.as_str())) {
        diags.push(LintDiagnostic {
            group: id.clone(),
            message: format!("Style entry `{id}` matches no group and is ignored."),
            severity: LintSeverity::Info,
            rule: "unknown-group",
        });
    }
}

const WIDTH_RULE: RewriteRule = RewriteRule {
    property: Property::StrokeWidth,
    form: Form::AttrLength,
};

/// Per-field checks on the entries that will actually be applied.
fn lint_directives(doc: &Document, styles: &StyleMap, diags: &mut Vec<LintDiagnostic>) {
    let groups = second_level_groups(doc);
    for (id, spec) in styles {
        let Some(fragment) = groups.get(id) else {
            continue;
        };
        let matched = matching_rules(fragment);

        for property in [Property::Stroke, Property::Fill, Property::StrokeWidth] {
            let value = field(spec, property);
            let present = matched.iter().any(|r| r.property == property);
            if value.is_empty() && present {
                diags.push(LintDiagnostic {
                    group: id.clone(),
                    message: format!(
                        "Empty `{}` for `{id}` will blank the existing value.",
                        property.name()
                    ),
                    severity: LintSeverity::Info,
                    rule: "empty-directive",
                });
            }
            if property != Property::StrokeWidth && !value.is_empty() && !is_color_token(value) {
                diags.push(LintDiagnostic {
                    group: id.clone(),
                    message: format!(
                        "`{}: {value}` for `{id}` is not #RRGGBB, rgb(r,g,b) or none; written as-is.",
                        property.name()
                    ),
                    severity: LintSeverity::Info,
                    rule: "unrecognized-color",
                });
            }
        }

        let mm_width = rule_matches(fragment, WIDTH_RULE)
            .iter()
            .any(|m| m.to_ascii_lowercase().ends_with("mm\""));
        if mm_width {
            diags.push(LintDiagnostic {
                group: id.clone(),
                message: format!(
                    "`{id}` has a millimetre stroke-width; the new value is written in px without conversion."
                ),
                severity: LintSeverity::Info,
                rule: "forced-px",
            });
        }
    }
}

fn field(spec: &StyleSpec, property: Property) -> &str {
    match property {
        Property::Stroke => &spec.stroke,
        Property::Fill => &spec.fill,
        Property::StrokeWidth => &spec.stroke_width,
    }
}

/// `#RRGGBB`, `rgb(r,g,b)` with 0–255 components, or `none`.
pub fn is_color_token(value: &str) -> bool {
    static RGB: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?i)^rgb\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*\)$")
            .expect("valid regex")
    });

    if value.eq_ignore_ascii_case("none") {
        return true;
    }
    if let Some(hex) = value.strip_prefix('#') {
        return hex.len() == 6 && hex.bytes().all(|b| b.is_ascii_hexdigit());
    }
    RGB.captures(value).is_some_and(|caps| {
        (1..=3).all(|i| caps[i].parse::<u16>().is_ok_and(|c| c <= 255))
    })
}

// ─── Tests ────────────────────────────────────────────────────────────────
