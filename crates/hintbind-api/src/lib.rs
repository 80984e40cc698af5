//! hintbind-api: typed request parameter binding
//!
//! Handlers declare their parameters with type hints; the binder pulls each
//! parameter's raw value from the right request location and validates it
//! with validators derived from the hint:
//! - `settings`: source markers (`query()`, `path()`, `header()`, `body()`,
//!   `current_user()`)
//! - `binder`: classification, extraction and aggregated validation
//! - `view` / `handler`: typed views and actions, and the async handler seam

pub mod binder;
pub mod config;
pub mod error;
pub mod handler;
pub mod logging;
pub mod principal;
pub mod request;
pub mod response;
pub mod settings;
pub mod view;

// Re-exports
pub use binder::{Arg, Binder, BoundParameter};
pub use config::BindingConfig;
pub use error::{ApiError, ApiResult, ParamErrors};
pub use handler::{ActionHandler, Handler};
pub use principal::{MembershipCheck, Principal, User};
pub use request::Request;
pub use response::{Response, ResponseBody};
pub use settings::{ParamSettings, Source, SourceKind};
pub use view::{
    CallArg, ParamDecl, ParamDefault, ParamKind, TypedAction, TypedView, ViewAttributes, ViewDecl,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
