//! Property rewriter: text substitutions over a serialized group fragment.
//!
//! Thirteen case-insensitive rules run in a fixed order: six `stroke` forms,
//! six `fill` forms, then `stroke-width`. They act on raw text, not on a
//! parsed attribute model, so a matching substring anywhere in the fragment
//! (a comment, a text label) is rewritten too.
//!
//! `stroke-width` is always relabelled `px`, whatever unit it had; the
//! numeric value is replaced, never converted.

use crate::model::StyleSpec;
use regex::{NoExpand, Regex};
use std::sync::LazyLock;

// ─── Rule table ──────────────────────────────────────────────────────────

/// The presentation property a rule rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    Stroke,
    Fill,
    StrokeWidth,
}

impl Property {
    pub fn name(self) -> &'static str {
        match self {
            Property::Stroke => "stroke",
            Property::Fill => "fill",
            Property::StrokeWidth => "stroke-width",
        }
    }

    fn value(self, spec: &StyleSpec) -> &str {
        match self {
            Property::Stroke => &spec.stroke,
            Property::Fill => &spec.fill,
            Property::StrokeWidth => &spec.stroke_width,
        }
    }
}

/// The syntactic form a rule matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Form {
    /// `name="#RRGGBB"`
    AttrHex,
    /// `name="rgb(r,g,b)"`
    AttrRgb,
    /// `name="none"`
    AttrNone,
    /// `name:#RRGGBB`
    InlineHex,
    /// `name:rgb(r,g,b)`
    InlineRgb,
    /// `name:none`
    InlineNone,
    /// `name="<number>mm"` or `name="<number>px"`
    AttrLength,
}

/// One substitution: which property, in which form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewriteRule {
    pub property: Property,
    pub form: Form,
}

impl RewriteRule {
    const fn new(property: Property, form: Form) -> Self {
        Self { property, form }
    }

    fn pattern(&self) -> String {
        const HEX: &str = "#[0-9a-f]{6}";
        const RGB: &str = r#"rgb\([^(),"']*,[^(),"']*,[^(),"']*\)"#;
        const LENGTH: &str = r"[+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:mm|px)";

        let name = regex::escape(self.property.name());
        let body = match self.form {
            Form::AttrHex => format!(r#"{name}="{HEX}""#),
            Form::AttrRgb => format!(r#"{name}="{RGB}""#),
            Form::AttrNone => format!(r#"{name}="none""#),
            Form::InlineHex => format!("{name}:{HEX}"),
            Form::InlineRgb => format!("{name}:{RGB}"),
            Form::InlineNone => format!("{name}:none"),
            Form::AttrLength => format!(r#"{name}="{LENGTH}""#),
        };
        format!("(?i){body}")
    }

    fn replacement(&self, spec: &StyleSpec) -> String {
        let name = self.property.name();
        let value = self.property.value(spec);
        match self.form {
            Form::AttrHex | Form::AttrRgb | Form::AttrNone => format!(r#"{name}="{value}""#),
            Form::InlineHex | Form::InlineRgb | Form::InlineNone => format!("{name}:{value}"),
            Form::AttrLength => format!(r#"{name}="{value}px""#),
        }
    }
}

/// All rules, in application order.
pub const RULES: [RewriteRule; 13] = [
    RewriteRule::new(Property::Stroke, Form::AttrHex),
    RewriteRule::new(Property::Stroke, Form::AttrRgb),
    RewriteRule::new(Property::Stroke, Form::AttrNone),
    RewriteRule::new(Property::Stroke, Form::InlineHex),
    RewriteRule::new(Property::Stroke, Form::InlineRgb),
    RewriteRule::new(Property::Stroke, Form::InlineNone),
    RewriteRule::new(Property::Fill, Form::AttrHex),
    RewriteRule::new(Property::Fill, Form::AttrRgb),
    RewriteRule::new(Property::Fill, Form::AttrNone),
    RewriteRule::new(Property::Fill, Form::InlineHex),
    RewriteRule::new(Property::Fill, Form::InlineRgb),
    RewriteRule::new(Property::Fill, Form::InlineNone),
    RewriteRule::new(Property::StrokeWidth, Form::AttrLength),
];

static COMPILED: LazyLock<Vec<(RewriteRule, Regex)>> = LazyLock::new(|| {
    RULES
        .iter()
        .map(|rule| {
            let re = Regex::new(&rule.pattern()).expect("rewrite rule must compile");
            (*rule, re)
        })
        .collect()
});

// ─── Public API ───────────────────────────────────────────────────────────

/// Apply every rule, in order, to `fragment`.
///
/// Replacement values are inserted literally and never validated; an empty
/// value yields an empty attribute or property.
#[must_use]
pub fn rewrite_fragment(fragment: &str, spec: &StyleSpec) -> String {
    let mut out = fragment.to_string();
    for (rule, re) in COMPILED.iter() {
        let hits = re.find_iter(&out).count();
        if hits == 0 {
            continue;
        }
        let replacement = rule.replacement(spec);
        log::trace!(
            "rewrite {:?}/{:?}: {hits} match(es) -> {replacement}",
            rule.property,
            rule.form
        );
        out = re.replace_all(&out, NoExpand(&replacement)).into_owned();
    }
    out
}

/// Rules that would match somewhere in `fragment`, in application order.
///
/// Each rule is tested against the original text, so rules that only match
/// text introduced by an earlier replacement are not reported.
#[must_use]
pub fn matching_rules(fragment: &str) -> Vec<RewriteRule> {
    COMPILED
        .iter()
        .filter(|(_, re)| re.is_match(fragment))
        .map(|(rule, _)| *rule)
        .collect()
}

/// Substrings of `fragment` that `rule` matches, in order.
pub fn rule_matches(fragment: &str, rule: RewriteRule) -> Vec<&str> {
    COMPILED
        .iter()
        .filter(|(r, _)| *r == rule)
        .flat_map(|(_, re)| re.find_iter(fragment).map(|m| m.as_str()))
        .collect()
}
