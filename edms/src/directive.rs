//! Reserved `_suggested_*` directives and the per-call write plan.

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use tracing::debug;

use crate::document::MetadataMap;
use crate::error::{DecorateError, Result};

/// Kinds of reserved directive, in the order they are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectiveKind {
    Filename,
    DocType,
    Tags,
    Cabinets,
}

impl DirectiveKind {
    pub const ALL: [DirectiveKind; 4] = [
        DirectiveKind::Filename,
        DirectiveKind::DocType,
        DirectiveKind::Tags,
        DirectiveKind::Cabinets,
    ];

    /// Metadata key carrying this directive.
    pub fn key(&self) -> &'static str {
        match self {
            DirectiveKind::Filename => "_suggested_filename",
            DirectiveKind::DocType => "_suggested_doctype",
            DirectiveKind::Tags => "_suggested_tags",
            DirectiveKind::Cabinets => "_suggested_cabinets",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.key() == key)
    }
}

impl fmt::Display for DirectiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// How a metadata key is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataKey<'a> {
    /// Written as a metadata entry
    Ordinary(&'a str),
    /// Handled by a dedicated write
    Directive(DirectiveKind),
    /// Neither; skipped
    Ignored(&'a str),
}

impl<'a> MetadataKey<'a> {
    pub fn classify(key: &'a str) -> Self {
        if key.starts_with(|c: char| c.is_ascii_alphanumeric()) {
            return MetadataKey::Ordinary(key);
        }
        match DirectiveKind::from_key(key) {
            Some(kind) => MetadataKey::Directive(kind),
            None => MetadataKey::Ignored(key),
        }
    }
}

/// A parsed directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Filename(String),
    DocType(u64),
    Tags(Vec<u64>),
    Cabinets(Vec<u64>),
}

impl Directive {
    pub fn kind(&self) -> DirectiveKind {
        match self {
            Directive::Filename(_) => DirectiveKind::Filename,
            Directive::DocType(_) => DirectiveKind::DocType,
            Directive::Tags(_) => DirectiveKind::Tags,
            Directive::Cabinets(_) => DirectiveKind::Cabinets,
        }
    }

    /// Parse the value of a reserved key. `null` means the directive is absent.
    pub fn parse(kind: DirectiveKind, value: &Value) -> Result<Option<Self>> {
        if value.is_null() {
            return Ok(None);
        }
        let directive = match kind {
            DirectiveKind::Filename => match value {
                Value::String(name) => Directive::Filename(name.clone()),
                other => return Err(invalid(kind, format!("expected a string, got {}", other))),
            },
            DirectiveKind::DocType => Directive::DocType(parse_id(kind, value)?),
            DirectiveKind::Tags => Directive::Tags(parse_ids(kind, value)?),
            DirectiveKind::Cabinets => Directive::Cabinets(parse_ids(kind, value)?),
        };
        Ok(Some(directive))
    }
}

fn invalid(kind: DirectiveKind, reason: String) -> DecorateError {
    DecorateError::InvalidDirective {
        key: kind.key().to_string(),
        reason,
    }
}

fn parse_id(kind: DirectiveKind, value: &Value) -> Result<u64> {
    let id = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    id.ok_or_else(|| invalid(kind, format!("not an id: {}", value)))
}

fn parse_ids(kind: DirectiveKind, value: &Value) -> Result<Vec<u64>> {
    match value {
        Value::Array(items) => items.iter().map(|item| parse_id(kind, item)).collect(),
        single => Ok(vec![parse_id(kind, single)?]),
    }
}

/// What one reconciliation call will write, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncPlan {
    /// Ordinary key/value pairs in the caller's order
    pub ordinary: Vec<(String, Value)>,
    /// Directives ordered filename, doctype, tags, cabinets
    pub directives: Vec<Directive>,
}

impl SyncPlan {
    /// Partition `metadata`, validating every directive before anything is written.
    pub fn from_metadata(metadata: &MetadataMap) -> Result<Self> {
        let mut plan = SyncPlan::default();
        for (key, value) in metadata {
            match MetadataKey::classify(key) {
                MetadataKey::Ordinary(name) => plan.ordinary.push((name.to_string(), value.clone())),
                MetadataKey::Directive(kind) => {
                    if let Some(directive) = Directive::parse(kind, value)? {
                        plan.directives.push(directive);
                    }
                }
                MetadataKey::Ignored(name) => debug!(key = name, "skipping unrecognized metadata key"),
            }
        }
        plan.directives.sort_by_key(Directive::kind);
        Ok(plan)
    }

    pub fn is_empty(&self) -> bool {
        self.ordinary.is_empty() && self.directives.is_empty()
    }
}
