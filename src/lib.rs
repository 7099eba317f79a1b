//! File-system-convention HTTP route registry.
//!
//! Routes are declared by filenames (`hello/[name].get.ts`), compiled once
//! into an immutable table, and served through a dispatcher that runs
//! discovery-ordered middleware before every handler.

pub mod config;
pub mod discovery;
pub mod dispatch;
pub mod http;
pub mod lifecycle;
pub mod middleware;
pub mod observability;
pub mod routing;

pub use config::RouterConfig;
pub use discovery::{build_table, HandlerRegistry, HandlerResolver};
pub use dispatch::{Dispatcher, Handler, HandlerError, HandlerRef, Outcome, RequestContext};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{MatchResult, RouteTable, SharedRouteTable};
