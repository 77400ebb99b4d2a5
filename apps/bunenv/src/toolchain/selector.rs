//! Version selector parsing and expansion.
//!
//! A selector is what users write in `BUNENV_VERSION`, `.bun-version`,
//! `engines.bun` or the global marker. It is one of:
//!
//! - an exact version, optionally prefixed with `v` (`1.1.0`, `v1.1.0`)
//! - the alias `latest`
//! - an npm-style range (`^1.0.0`, `>=1.1 <2`, `1.x`, `1.0.0 - 1.2.0`,
//!   `1.0 || 2.x`)
//!
//! Ranges are translated to [`semver::VersionReq`] and only ever matched
//! against installed versions.

use semver::{Version, VersionReq};

/// Alias selecting the highest installed version.
pub const LATEST_ALIAS: &str = "latest";

const OPERATORS: [&str; 7] = [">=", "<=", ">", "<", "=", "^", "~"];

/// Strips a single leading `v` from a version string.
#[must_use]
pub fn normalize_version(version: &str) -> &str {
    version.strip_prefix('v').unwrap_or(version)
}

/// Returns whether `version` looks like `[v]MAJOR.MINOR.PATCH[-anything]`.
///
/// This is the syntax accepted by commands that take a concrete version.
#[must_use]
pub fn is_valid_version_format(version: &str) -> bool {
    let version = normalize_version(version);
    let core = version.split_once('-').map_or(version, |(core, _)| core);

    let parts: Vec<&str> = core.split('.').collect();
    parts.len() == 3
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
}

/// Expands a selector against the installed versions.
///
/// - A selector naming an installed version is returned as-is.
/// - `latest` becomes the highest installed version, or stays `latest` when
///   nothing is installed.
/// - An exact version is returned with any `v` prefix removed, installed or
///   not.
/// - A range becomes the highest installed version it matches. Unmatched
///   and unparseable selectors are returned unchanged so callers can report
///   exactly what was asked for.
#[must_use]
pub fn resolve_selector(selector: &str, installed: &[String]) -> String {
    let selector = selector.trim();

    if installed.iter().any(|v| v == selector) {
        return selector.to_string();
    }

    if selector == LATEST_ALIAS {
        return highest_matching(installed, |_| true).unwrap_or_else(|| selector.to_string());
    }

    let normalized = normalize_version(selector);
    if Version::parse(normalized).is_ok() {
        return normalized.to_string();
    }

    match parse_range(selector) {
        Some(reqs) => highest_matching(installed, |v| reqs.iter().any(|req| req.matches(v)))
            .unwrap_or_else(|| selector.to_string()),
        None => selector.to_string(),
    }
}

/// Parses an npm-style range into alternative requirements.
///
/// Returns `None` if any alternative cannot be translated.
#[must_use]
pub fn parse_range(selector: &str) -> Option<Vec<VersionReq>> {
    selector
        .split("||")
        .map(|alternative| {
            let translated = translate_alternative(alternative)?;
            VersionReq::parse(&translated).ok()
        })
        .collect()
}

fn highest_matching(installed: &[String], predicate: impl Fn(&Version) -> bool) -> Option<String> {
    installed
        .iter()
        .filter_map(|name| Version::parse(name).ok().map(|v| (v, name)))
        .filter(|(v, _)| predicate(v))
        .max_by(|a, b| a.0.cmp(&b.0))
        .map(|(_, name)| name.clone())
}

/// One translated comparator.
enum Comparator {
    /// Matches every version (`*`, `x`, `>=*`).
    Any,
    /// A comparator in `semver` syntax.
    Req(String),
}

/// Translates the space-separated comparators of one `||` alternative into
/// a comma-separated `semver` requirement.
fn translate_alternative(alternative: &str) -> Option<String> {
    let tokens = tokenize(alternative);
    let mut comparators = Vec::new();

    let mut i = 0;
    while i < tokens.len() {
        if tokens.get(i + 1).map(String::as_str) == Some("-") {
            let upper = tokens.get(i + 2)?;
            comparators.push(translate_comparator(&format!(">={}", tokens[i]))?);
            comparators.push(translate_comparator(&format!("<={upper}"))?);
            i += 3;
        } else {
            comparators.push(translate_comparator(&tokens[i])?);
            i += 1;
        }
    }

    let reqs: Vec<String> = comparators
        .into_iter()
        .filter_map(|c| match c {
            Comparator::Any => None,
            Comparator::Req(req) => Some(req),
        })
        .collect();

    if reqs.is_empty() {
        Some("*".to_string())
    } else {
        Some(reqs.join(", "))
    }
}

/// Splits on whitespace, gluing a detached operator to the version after it
/// (`>= 1.2.0` becomes `>=1.2.0`).
fn tokenize(alternative: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut pending_op: Option<&str> = None;

    for word in alternative.split_whitespace() {
        if OPERATORS.contains(&word) {
            pending_op = Some(word);
            continue;
        }
        match pending_op.take() {
            Some(op) => tokens.push(format!("{op}{word}")),
            None => tokens.push(word.to_string()),
        }
    }
    if let Some(op) = pending_op {
        tokens.push(op.to_string());
    }

    tokens
}

/// Translates a single comparator such as `^1.2`, `1.x` or `>=v1.0.0`.
///
/// Bare versions get an explicit `=` so that `1.2.3` stays exact and `1.2`
/// means `1.2.x`, as in npm. Wildcard segments are dropped since a partial
/// version already matches the whole segment.
fn translate_comparator(token: &str) -> Option<Comparator> {
    let op = OPERATORS
        .iter()
        .find(|op| token.starts_with(*op))
        .copied()
        .unwrap_or("");
    let rest = &token[op.len()..];
    let rest = rest
        .strip_prefix('v')
        .or_else(|| rest.strip_prefix('V'))
        .unwrap_or(rest);

    let (core, prerelease) = match rest.split_once('-') {
        Some((core, pre)) if !pre.is_empty() => (core, Some(pre)),
        Some(_) => return None,
        None => (rest, None),
    };

    let mut segments = Vec::new();
    let mut saw_wildcard = false;
    for segment in core.split('.') {
        if matches!(segment, "x" | "X" | "*") {
            saw_wildcard = true;
            continue;
        }
        if saw_wildcard || segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        segments.push(segment);
    }

    if segments.is_empty() {
        return if prerelease.is_none() && saw_wildcard {
            Some(Comparator::Any)
        } else {
            None
        };
    }
    if saw_wildcard && prerelease.is_some() {
        return None;
    }

    let op = if op.is_empty() { "=" } else { op };
    let mut req = format!("{op}{}", segments.join("."));
    if let Some(pre) = prerelease {
        if segments.len() != 3 {
            return None;
        }
        req.push('-');
        req.push_str(pre);
    }
    Some(Comparator::Req(req))
}
