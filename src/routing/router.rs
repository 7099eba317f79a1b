//! Route resolution.
//!
//! # Responsibilities
//! - Resolve an incoming method + path against the compiled table
//! - Bind named parameters and the catch-all remainder
//! - Distinguish "no such path" from "path exists under another method"
//!
//! # Design Decisions
//! - Pure function over the immutable table; no side effects
//! - Priority: static with explicit method, then method-agnostic static,
//!   then named parameters (more static segments wins, position-sensitive),
//!   then catch-all with the longest fixed prefix
//! - Remaining ties go to the first-registered route; resolution is
//!   deterministic for any table
//! - Paths are compared segment-wise, so duplicate and trailing slashes
//!   are insignificant

use std::collections::HashMap;

use axum::http::Method;

use crate::routing::pattern::SegmentSpec;
use crate::routing::table::{RouteDescriptor, RouteTable};

/// Parameter key the catch-all remainder is bound under.
pub const CATCH_ALL_PARAM: &str = "_";

/// Result of resolving one request against the table.
#[derive(Debug)]
pub enum MatchResult<'a> {
    /// A route matched; params hold named bindings plus the catch-all
    /// remainder when applicable.
    Matched {
        route: &'a RouteDescriptor,
        params: HashMap<String, String>,
    },
    /// The path exists but only under a different method, and no
    /// catch-all applies. Renders 404; never delegates further.
    MethodMismatch,
    /// Nothing matched the path.
    NoMatch,
}

/// Relative priority of a matched candidate.
#[derive(Debug, PartialEq, Eq)]
enum Rank {
    /// Exact static match with a matching explicit method suffix.
    StaticExplicit,
    /// Exact static match on a method-agnostic route.
    StaticAny,
    /// Named-parameter match. `spec` holds 0 for static and 1 for named
    /// per position; fewer named segments (and named segments later in the
    /// path) rank higher.
    Named { named: usize, spec: Vec<u8> },
    /// Catch-all match; a longer fixed prefix ranks higher.
    CatchAll { fixed: usize },
}

impl Rank {
    fn class(&self) -> u8 {
        match self {
            Rank::StaticExplicit => 0,
            Rank::StaticAny => 1,
            Rank::Named { .. } => 2,
            Rank::CatchAll { .. } => 3,
        }
    }

    /// Whether `self` outranks `other`. Strict: equal ranks favour the
    /// earlier registration, enforced by the caller keeping the first.
    fn beats(&self, other: &Rank) -> bool {
        if self.class() != other.class() {
            return self.class() < other.class();
        }
        match (self, other) {
            (
                Rank::Named { named: a, spec: sa },
                Rank::Named { named: b, spec: sb },
            ) => a < b || (a == b && sa < sb),
            (Rank::CatchAll { fixed: a }, Rank::CatchAll { fixed: b }) => a > b,
            _ => false,
        }
    }
}

/// Resolve `method` + `path` to the best-matching route.
pub fn resolve<'a>(table: &'a RouteTable, method: &Method, path: &str) -> MatchResult<'a> {
    let request_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let mut best: Option<(Rank, &RouteDescriptor, HashMap<String, String>)> = None;
    let mut wrong_method_path_exists = false;

    for route in table.routes() {
        let Some(params) = match_segments(route, &request_segments) else {
            continue;
        };

        if !method_allows(route, method) {
            if !is_catch_all(route) {
                wrong_method_path_exists = true;
            }
            continue;
        }

        let rank = rank_route(route);
        let replace = match &best {
            Some((current, _, _)) => rank.beats(current),
            None => true,
        };
        if replace {
            best = Some((rank, route, params));
        }
    }

    match best {
        Some((_, route, params)) => MatchResult::Matched { route, params },
        None if wrong_method_path_exists => MatchResult::MethodMismatch,
        None => MatchResult::NoMatch,
    }
}

fn method_allows(route: &RouteDescriptor, method: &Method) -> bool {
    match &route.method {
        Some(required) => required == method,
        None => true,
    }
}

fn is_catch_all(route: &RouteDescriptor) -> bool {
    route.segments.last() == Some(&SegmentSpec::CatchAll)
}

fn rank_route(route: &RouteDescriptor) -> Rank {
    if is_catch_all(route) {
        return Rank::CatchAll {
            fixed: prefix_segments(route).len() + route.segments.len() - 1,
        };
    }
    let named = route
        .segments
        .iter()
        .filter(|s| matches!(s, SegmentSpec::Named(_)))
        .count();
    if named == 0 {
        return if route.method.is_some() {
            Rank::StaticExplicit
        } else {
            Rank::StaticAny
        };
    }
    let spec = route
        .segments
        .iter()
        .map(|s| match s {
            SegmentSpec::Static(_) => 0,
            _ => 1,
        })
        .collect();
    Rank::Named { named, spec }
}

fn prefix_segments(route: &RouteDescriptor) -> Vec<&str> {
    route
        .prefix
        .as_deref()
        .map(|p| p.split('/').filter(|s| !s.is_empty()).collect())
        .unwrap_or_default()
}

/// Match request segments against one route, binding parameters. Returns
/// `None` when the path shape does not fit, regardless of method.
fn match_segments(
    route: &RouteDescriptor,
    request_segments: &[&str],
) -> Option<HashMap<String, String>> {
    let prefix = prefix_segments(route);
    if request_segments.len() < prefix.len() {
        return None;
    }
    for (expected, actual) in prefix.iter().zip(request_segments) {
        if expected != actual {
            return None;
        }
    }
    let rest = &request_segments[prefix.len()..];

    let catch_all = is_catch_all(route);
    let fixed_len = if catch_all {
        route.segments.len() - 1
    } else {
        route.segments.len()
    };

    if catch_all {
        if rest.len() < fixed_len {
            return None;
        }
    } else if rest.len() != fixed_len {
        return None;
    }

    let mut params = HashMap::new();
    for (spec, actual) in route.segments[..fixed_len].iter().zip(rest) {
        match spec {
            SegmentSpec::Static(literal) => {
                if literal != actual {
                    return None;
                }
            }
            SegmentSpec::Named(name) => {
                params.insert(name.clone(), (*actual).to_string());
            }
            SegmentSpec::CatchAll => unreachable!("catch-all is always final"),
        }
    }

    if catch_all {
        params.insert(CATCH_ALL_PARAM.to_string(), rest[fixed_len..].join("/"));
    }

    Some(params)
}
