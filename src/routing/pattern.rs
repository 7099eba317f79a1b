//! Route pattern compilation.
//!
//! # Responsibilities
//! - Turn a relative route-file path into a matchable pattern
//! - Strip known source extensions
//! - Extract the optional trailing HTTP-method suffix
//! - Classify segments as static, named parameter, or catch-all
//!
//! # Design Decisions
//! - Method suffixes are matched case-insensitively against a fixed set
//! - A file with no method suffix matches every method
//! - `index` as the final segment maps to the enclosing directory's path
//! - Compilation happens once at build time; no parsing in the hot path

use axum::http::Method;
use thiserror::Error;

/// Extensions stripped from route filenames when no explicit set is
/// configured.
pub const DEFAULT_SOURCE_EXTENSIONS: &[&str] = &["ts", "js", "mjs", "cjs"];

/// One segment of a compiled route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentSpec {
    /// Matches the literal segment exactly (case-sensitive).
    Static(String),
    /// Matches any single segment and binds it under the parameter name.
    Named(String),
    /// Matches any number of trailing segments, including zero.
    CatchAll,
}

/// A malformed route filename. Fatal at build time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid route pattern `{path}`: {reason}")]
pub struct InvalidPattern {
    pub path: String,
    pub reason: String,
}

impl InvalidPattern {
    fn new(path: &str, reason: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result of compiling one route filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledRoute {
    pub segments: Vec<SegmentSpec>,
    pub method: Option<Method>,
}

/// Compile a relative route-file path (e.g. `hello/[name].get.ts`) into
/// pattern segments plus the optional method restriction.
pub fn compile_route(
    source_path: &str,
    extensions: &[String],
) -> Result<CompiledRoute, InvalidPattern> {
    let stem = strip_known_extension(source_path, extensions);
    let (stem, method) = split_method_suffix(stem);

    let mut parts: Vec<&str> = stem.split('/').filter(|s| !s.is_empty()).collect();
    if parts.is_empty() {
        return Err(InvalidPattern::new(
            source_path,
            "filename yields an empty route path",
        ));
    }
    // `routes/index.ts` serves the directory root.
    if parts.last() == Some(&"index") {
        parts.pop();
    }

    let last = parts.len().saturating_sub(1);
    let mut segments = Vec::with_capacity(parts.len());
    for (i, part) in parts.iter().enumerate() {
        let segment = parse_segment(source_path, part)?;
        if segment == SegmentSpec::CatchAll && i != last {
            return Err(InvalidPattern::new(
                source_path,
                "catch-all segment must be the final segment",
            ));
        }
        segments.push(segment);
    }

    Ok(CompiledRoute { segments, method })
}

fn parse_segment(source_path: &str, part: &str) -> Result<SegmentSpec, InvalidPattern> {
    if part == "[...]" {
        return Ok(SegmentSpec::CatchAll);
    }
    if let Some(name) = part
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
    {
        if name.is_empty() {
            return Err(InvalidPattern::new(source_path, "empty parameter name"));
        }
        if name.starts_with("...") {
            return Err(InvalidPattern::new(
                source_path,
                "catch-all segments take no name; use `[...]`",
            ));
        }
        return Ok(SegmentSpec::Named(name.to_string()));
    }
    Ok(SegmentSpec::Static(part.to_string()))
}

/// Strip a trailing `.ext` when `ext` is in the configured extension set.
/// Only the final path component is considered.
fn strip_known_extension<'a>(path: &'a str, extensions: &[String]) -> &'a str {
    if let Some(pos) = path.rfind('.') {
        let ext = &path[pos + 1..];
        if !ext.contains('/') && extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)) {
            return &path[..pos];
        }
    }
    path
}

/// Split a trailing `.method` token, if present, into a `Method`.
fn split_method_suffix(stem: &str) -> (&str, Option<Method>) {
    if let Some(pos) = stem.rfind('.') {
        let suffix = &stem[pos + 1..];
        if !suffix.contains('/') {
            if let Some(method) = method_for_suffix(suffix) {
                return (&stem[..pos], Some(method));
            }
        }
    }
    (stem, None)
}

fn method_for_suffix(suffix: &str) -> Option<Method> {
    match suffix.to_ascii_lowercase().as_str() {
        "get" => Some(Method::GET),
        "post" => Some(Method::POST),
        "put" => Some(Method::PUT),
        "delete" => Some(Method::DELETE),
        "patch" => Some(Method::PATCH),
        "head" => Some(Method::HEAD),
        "options" => Some(Method::OPTIONS),
        _ => None,
    }
}
