//! Manifest template - `{{ field }}` substitution over a multi-document YAML file.
//!
//! The template is parsed once at startup into literal and placeholder
//! segments. Rendering is pure text substitution: the output is not
//! validated here, the manifest decoder does that.

use minislot_common::{DeploymentRequest, ResourceTier};
use regex::Regex;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("failed to read template {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("template {template} line {line}: {message}")]
    Parse {
        template: String,
        line: usize,
        message: String,
    },

    #[error("template field '{field}' (line {line}) {reason}")]
    UnresolvedField {
        field: String,
        line: usize,
        reason: &'static str,
    },

    #[error("failed to build render context: {0}")]
    Context(#[from] serde_json::Error),
}

/// Values a template may reference. Field names are what the template sees.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderContext {
    pub id: String,
    pub namespace: String,
    pub version: String,
    pub seed: i64,
    pub chain_id: i64,
    pub block_time: i64,
    pub tier: String,
    pub storage_class: String,
    pub storage: String,
    pub resources: ResourceQuantities,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResourceQuantities {
    pub requests: Quantities,
    pub limits: Quantities,
}

#[derive(Debug, Clone, Serialize)]
pub struct Quantities {
    pub memory: String,
    pub cpu: String,
}

impl RenderContext {
    /// Context for a validated request, its effective namespace and resolved tier
    pub fn new(request: &DeploymentRequest, namespace: &str, tier: &ResourceTier) -> Self {
        Self {
            id: request.id.clone(),
            namespace: namespace.to_string(),
            version: request.version.clone(),
            seed: request.seed,
            chain_id: request.chain_id,
            block_time: request.block_time,
            tier: request.tier.clone(),
            storage_class: request.storage_class.clone(),
            storage: tier.storage.clone(),
            resources: ResourceQuantities {
                requests: Quantities {
                    memory: tier.memory_request.clone(),
                    cpu: tier.cpu_request.clone(),
                },
                limits: Quantities {
                    memory: tier.memory_limit.clone(),
                    cpu: tier.cpu_limit.clone(),
                },
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    Field { path: Vec<String>, line: usize },
}

/// A parsed manifest template
#[derive(Debug, Clone)]
pub struct ManifestTemplate {
    name: String,
    segments: Vec<Segment>,
}

fn field_regex() -> &'static Regex {
    static FIELD_RE: OnceLock<Regex> = OnceLock::new();
    FIELD_RE.get_or_init(|| {
        Regex::new(r"^\s*\.?([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*)\s*$")
            .expect("placeholder regex is valid")
    })
}

fn line_at(source: &str, offset: usize) -> usize {
    source[..offset].matches('\n').count() + 1
}

impl ManifestTemplate {
    /// Read and parse a template file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TemplateError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| TemplateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::parse(&name, &source)
    }

    /// Parse template source into segments
    pub fn parse(name: &str, source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut pos = 0;

        while let Some(found) = source[pos..].find("{{") {
            let open = pos + found;
            if open > pos {
                segments.push(Segment::Literal(source[pos..open].to_string()));
            }

            let line = line_at(source, open);
            let expr_start = open + 2;
            let close = source[expr_start..]
                .find("}}")
                .map(|i| expr_start + i)
                .ok_or_else(|| TemplateError::Parse {
                    template: name.to_string(),
                    line,
                    message: "unterminated placeholder, missing '}}'".to_string(),
                })?;

            let expr = &source[expr_start..close];
            let caps = field_regex()
                .captures(expr)
                .ok_or_else(|| TemplateError::Parse {
                    template: name.to_string(),
                    line,
                    message: format!("invalid placeholder '{{{{{}}}}}'", expr),
                })?;
            let path = caps[1].split('.').map(str::to_string).collect();
            segments.push(Segment::Field { path, line });

            pos = close + 2;
        }

        if pos < source.len() {
            segments.push(Segment::Literal(source[pos..].to_string()));
        }

        Ok(Self {
            name: name.to_string(),
            segments,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dotted paths of every placeholder, in template order
    pub fn fields(&self) -> Vec<String> {
        self.segments
            .iter()
            .filter_map(|s| match s {
                Segment::Field { path, .. } => Some(path.join(".")),
                Segment::Literal(_) => None,
            })
            .collect()
    }

    /// Substitute every placeholder from the context
    pub fn render<C: Serialize>(&self, context: &C) -> Result<String, TemplateError> {
        let root = serde_json::to_value(context)?;
        let mut out = String::new();

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field { path, line } => {
                    let unresolved = |reason| TemplateError::UnresolvedField {
                        field: path.join("."),
                        line: *line,
                        reason,
                    };
                    let value = path
                        .iter()
                        .try_fold(&root, |value, key| value.get(key.as_str()))
                        .ok_or_else(|| unresolved("does not exist"))?;

                    match value {
                        serde_json::Value::String(s) => out.push_str(s),
                        serde_json::Value::Number(n) => out.push_str(&n.to_string()),
                        serde_json::Value::Bool(b) => out.push_str(&b.to_string()),
                        serde_json::Value::Null => return Err(unresolved("has no value")),
                        serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                            return Err(unresolved("is not a scalar"))
                        }
                    }
                }
            }
        }

        Ok(out)
    }
}
