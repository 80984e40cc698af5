//! Typed views and actions
//!
//! A handler declares its parameters once with `ViewDecl`; wrapping it in a
//! `TypedView` (plain function) or `TypedAction` (method with a receiver)
//! checks the declaration and, on each call, binds the request into the
//! handler's argument list.
//!
//! # Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use hintbind_api::{settings::path, CallArg, ParamDecl, Request, Response, TypedView, ViewDecl};
//! use hintbind_validation::{TypeHint, Value};
//!
//! let decl = ViewDecl::new("get_item")
//!     .param(ParamDecl::new("id").annotated(TypeHint::Int).settings(path().source("pk")))
//!     .param(ParamDecl::new("verbose").annotated(TypeHint::Bool).default_value(false));
//!
//! let view = TypedView::new(decl, |args| {
//!     let id = args[0].as_value().cloned().unwrap_or(Value::Null);
//!     Ok(Response::value(id))
//! })
//! .unwrap();
//!
//! let request = Request::get("/items/9");
//! let path_args = HashMap::from([("pk".to_string(), "9".to_string())]);
//! let response = view.call(vec![CallArg::Request(request)], &path_args).unwrap();
//! assert_eq!(response.body_json(), Some(&serde_json::json!(9)));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use http::Method;
use hintbind_validation::{TypeHint, Value};
use tracing::{debug, warn};

use crate::binder::{Arg, Binder};
use crate::config::BindingConfig;
use crate::error::{ApiError, ApiResult};
use crate::request::Request;
use crate::response::Response;
use crate::settings::ParamSettings;

/// Receiver parameter name for actions
pub const SELF_PARAM: &str = "self";

// ============================================================================
// Declarations
// ============================================================================

/// What a parameter declares as its default
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ParamDefault {
    /// No default
    #[default]
    Empty,
    /// Plain default value (`Value::Null` is a real `None` default)
    Value(Value),
    /// Source marker
    Settings(ParamSettings),
}

/// Parameter arity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamKind {
    /// Regular named parameter
    #[default]
    Positional,
    /// `*args`
    VarPositional,
    /// `**kwargs`
    VarKeyword,
}

/// One declared handler parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ParamDecl {
    pub name: String,
    pub annotation: Option<TypeHint>,
    pub default: ParamDefault,
    pub kind: ParamKind,
}

impl ParamDecl {
    /// Unannotated positional parameter without a default
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotation: None,
            default: ParamDefault::Empty,
            kind: ParamKind::Positional,
        }
    }

    /// Variable-length positional parameter
    pub fn var_positional(name: impl Into<String>) -> Self {
        Self {
            kind: ParamKind::VarPositional,
            ..Self::new(name)
        }
    }

    /// Variable-length keyword parameter
    pub fn var_keyword(name: impl Into<String>) -> Self {
        Self {
            kind: ParamKind::VarKeyword,
            ..Self::new(name)
        }
    }

    /// Set the type annotation
    pub fn annotated(mut self, hint: TypeHint) -> Self {
        self.annotation = Some(hint);
        self
    }

    /// Parse and set a textual annotation
    pub fn annotated_str(self, hint: &str) -> Self {
        self.annotated(TypeHint::parse(hint))
    }

    /// Set a plain default value
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = ParamDefault::Value(value.into());
        self
    }

    /// Use a source marker as the default
    pub fn settings(mut self, settings: ParamSettings) -> Self {
        self.default = ParamDefault::Settings(settings);
        self
    }

    pub fn is_variadic(&self) -> bool {
        self.kind != ParamKind::Positional
    }
}

/// Framework attributes carried by a view
///
/// Empty lists mean "framework default".
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewAttributes {
    pub methods: Vec<Method>,
    pub renderer_classes: Vec<String>,
    pub parser_classes: Vec<String>,
    pub authentication_classes: Vec<String>,
    pub throttle_classes: Vec<String>,
    pub permission_classes: Vec<String>,
    /// Actions only: detail route
    pub detail: Option<bool>,
}

impl ViewAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allowed methods
    pub fn methods(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
        self.methods = methods.into_iter().collect();
        self
    }

    pub fn renderers(mut self, classes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.renderer_classes = classes.into_iter().map(Into::into).collect();
        self
    }

    pub fn parsers(mut self, classes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.parser_classes = classes.into_iter().map(Into::into).collect();
        self
    }

    pub fn authentication(mut self, classes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.authentication_classes = classes.into_iter().map(Into::into).collect();
        self
    }

    pub fn throttles(mut self, classes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.throttle_classes = classes.into_iter().map(Into::into).collect();
        self
    }

    pub fn permissions(mut self, classes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.permission_classes = classes.into_iter().map(Into::into).collect();
        self
    }

    pub fn detail(mut self, detail: bool) -> Self {
        self.detail = Some(detail);
        self
    }
}

/// A handler's declared signature and attributes
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewDecl {
    pub name: String,
    pub params: Vec<ParamDecl>,
    pub attributes: ViewAttributes,
}

impl ViewDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Append a parameter
    pub fn param(mut self, param: ParamDecl) -> Self {
        self.params.push(param);
        self
    }

    pub fn attributes(mut self, attributes: ViewAttributes) -> Self {
        self.attributes = attributes;
        self
    }

    /// Reject declarations that cannot be bound
    ///
    /// Variadic parameters are never allowed; methods must take an
    /// unannotated `self` first.
    pub fn prevalidate(&self, for_method: bool) -> ApiResult<()> {
        if self.params.iter().any(ParamDecl::is_variadic) {
            return Err(self.reject(format!(
                "{}: variable-length argument lists and dictionaries cannot be used with typed views",
                self.name
            )));
        }

        if for_method {
            let valid_receiver = matches!(
                self.params.first(),
                Some(first) if first.name == SELF_PARAM && first.annotation.is_none()
            );
            if !valid_receiver {
                return Err(self.reject(format!(
                    "{}: for typed methods, 'self' must be passed as the first arg with no annotation",
                    self.name
                )));
            }
        }

        Ok(())
    }

    fn reject(&self, message: String) -> ApiError {
        warn!(view = %self.name, "{}", message);
        ApiError::Declaration(message)
    }

    /// Parameters the binder fills
    ///
    /// Methods skip their leading receiver, already checked by
    /// `prevalidate`; functions bind every parameter.
    fn bindable_params(&self, for_method: bool) -> Vec<ParamDecl> {
        let skip = usize::from(for_method);
        self.params.iter().skip(skip).cloned().collect()
    }
}

// ============================================================================
// Call arguments
// ============================================================================

/// A positional argument handed to a wrapped view by the framework
#[derive(Debug, Clone)]
pub enum CallArg {
    Request(Request),
    Value(Value),
}

/// The request among the call arguments
pub fn find_request(args: &[CallArg]) -> ApiResult<&Request> {
    args.iter()
        .find_map(|arg| match arg {
            CallArg::Request(request) => Some(request),
            CallArg::Value(_) => None,
        })
        .ok_or(ApiError::RequestNotFound)
}

// ============================================================================
// Typed views
// ============================================================================

type ViewFn = dyn Fn(Vec<Arg>) -> ApiResult<Response> + Send + Sync;
type ActionFn<R> = dyn Fn(&R, Vec<Arg>) -> ApiResult<Response> + Send + Sync;

/// A function-style handler with bound parameters
#[derive(Clone)]
pub struct TypedView {
    decl: ViewDecl,
    params: Vec<ParamDecl>,
    binder: Binder,
    func: Arc<ViewFn>,
}

impl TypedView {
    /// Wrap `func`, rejecting invalid declarations
    pub fn new<F>(decl: ViewDecl, func: F) -> ApiResult<Self>
    where
        F: Fn(Vec<Arg>) -> ApiResult<Response> + Send + Sync + 'static,
    {
        Self::with_config(decl, BindingConfig::default(), func)
    }

    /// Wrap `func` with a custom binding config
    pub fn with_config<F>(decl: ViewDecl, config: BindingConfig, func: F) -> ApiResult<Self>
    where
        F: Fn(Vec<Arg>) -> ApiResult<Response> + Send + Sync + 'static,
    {
        decl.prevalidate(false)?;
        debug!(view = %decl.name, params = decl.params.len(), "registered typed view");
        Ok(Self {
            params: decl.bindable_params(false),
            decl,
            binder: Binder::new(config),
            func: Arc::new(func),
        })
    }

    pub fn name(&self) -> &str {
        &self.decl.name
    }

    /// Attributes copied from the declaration
    pub fn attributes(&self) -> &ViewAttributes {
        &self.decl.attributes
    }

    pub fn decl(&self) -> &ViewDecl {
        &self.decl
    }

    /// Locate the request, bind, then invoke the handler
    pub fn call(&self, args: Vec<CallArg>, path_args: &HashMap<String, String>) -> ApiResult<Response> {
        let request = find_request(&args)?;
        let bound = self.binder.bind(&self.params, request, path_args)?;
        (self.func)(bound)
    }
}

impl fmt::Debug for TypedView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedView")
            .field("decl", &self.decl)
            .field("binder", &self.binder)
            .finish()
    }
}

/// A method-style handler; the receiver is passed through unbound
pub struct TypedAction<R> {
    decl: ViewDecl,
    params: Vec<ParamDecl>,
    binder: Binder,
    func: Arc<ActionFn<R>>,
}

impl<R> TypedAction<R> {
    /// Wrap `func`, rejecting invalid declarations
    pub fn new<F>(decl: ViewDecl, func: F) -> ApiResult<Self>
    where
        F: Fn(&R, Vec<Arg>) -> ApiResult<Response> + Send + Sync + 'static,
    {
        Self::with_config(decl, BindingConfig::default(), func)
    }

    /// Wrap `func` with a custom binding config
    pub fn with_config<F>(decl: ViewDecl, config: BindingConfig, func: F) -> ApiResult<Self>
    where
        F: Fn(&R, Vec<Arg>) -> ApiResult<Response> + Send + Sync + 'static,
    {
        decl.prevalidate(true)?;
        debug!(action = %decl.name, params = decl.params.len(), "registered typed action");
        Ok(Self {
            params: decl.bindable_params(true),
            decl,
            binder: Binder::new(config),
            func: Arc::new(func),
        })
    }

    pub fn name(&self) -> &str {
        &self.decl.name
    }

    /// Attributes copied from the declaration
    pub fn attributes(&self) -> &ViewAttributes {
        &self.decl.attributes
    }

    /// Locate the request, bind, then invoke the handler on `receiver`
    pub fn call(
        &self,
        receiver: &R,
        args: Vec<CallArg>,
        path_args: &HashMap<String, String>,
    ) -> ApiResult<Response> {
        let request = find_request(&args)?;
        let bound = self.binder.bind(&self.params, request, path_args)?;
        (self.func)(receiver, bound)
    }
}

impl<R> Clone for TypedAction<R> {
    fn clone(&self) -> Self {
        Self {
            decl: self.decl.clone(),
            params: self.params.clone(),
            binder: self.binder.clone(),
            func: Arc::clone(&self.func),
        }
    }
}

impl<R> fmt::Debug for TypedAction<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedAction")
            .field("decl", &self.decl)
            .field("binder", &self.binder)
            .finish()
    }
}
