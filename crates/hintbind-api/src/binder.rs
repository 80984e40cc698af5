//! Parameter binding
//!
//! Turns a handler's declared parameters plus an inbound request into the
//! ordered argument list the handler is called with.
//!
//! # Classification
//!
//! Each parameter is classified on its own, first match wins:
//! 1. default is a `ParamSettings` value: explicit source
//! 2. annotation is `Request`: the request itself
//! 3. name matches a path-captured argument: implicit path parameter
//! 4. annotation resolves to a nested schema or model: implicit body
//! 5. unannotated parameter named `request`: the request itself
//! 6. anything else: implicit query parameter
//!
//! Every parameter is attempted; failures are collected into one
//! `ApiError::Validation` keyed by effective parameter name.

use std::collections::HashMap;

use hintbind_validation::{
    build, resolve, NestedType, SchemaInstance, Shape, TypeDescriptor, TypeHint,
    ValidationErrors, ValidationResult, ValidatorContext, Value,
};
use tracing::{debug, warn};

use crate::config::BindingConfig;
use crate::error::{ApiError, ApiResult, ParamErrors};
use crate::principal::attribute_path;
use crate::request::Request;
use crate::settings::{ParamSettings, Source, SourceKind};
use crate::view::{ParamDecl, ParamDefault};

// ============================================================================
// Bound arguments
// ============================================================================

/// One bound handler argument
#[derive(Debug, Clone)]
pub enum Arg {
    /// Validated value
    Value(Value),
    /// Validated nested schema instance
    Schema(SchemaInstance),
    /// The request, passed through unvalidated
    Request(Request),
}

impl Arg {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Arg::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_schema(&self) -> Option<&SchemaInstance> {
        match self {
            Arg::Schema(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn as_request(&self) -> Option<&Request> {
        match self {
            Arg::Request(request) => Some(request),
            _ => None,
        }
    }

    /// The argument as plain data
    ///
    /// Schema instances yield their validated mapping; the request yields
    /// `Value::Null`.
    pub fn into_value(self) -> Value {
        match self {
            Arg::Value(value) => value,
            Arg::Schema(instance) => instance.as_dict().cloned().unwrap_or(Value::Null),
            Arg::Request(_) => Value::Null,
        }
    }
}

// ============================================================================
// Bound parameter
// ============================================================================

/// A parameter being bound for one request
///
/// Created, extracted, validated and dropped within a single `bind` call.
#[derive(Debug)]
pub struct BoundParameter<'a> {
    decl: &'a ParamDecl,
    settings: ParamSettings,
    descriptor: TypeDescriptor,
    raw: Option<Value>,
}

impl<'a> BoundParameter<'a> {
    fn new(decl: &'a ParamDecl, mut settings: ParamSettings, config: &BindingConfig) -> Self {
        settings.source = settings
            .source
            .map(|source| source.resolve(&config.wildcard));
        let descriptor = resolve(decl.annotation.as_ref().unwrap_or(&TypeHint::Any));
        Self {
            decl,
            settings,
            descriptor,
            raw: None,
        }
    }

    /// Code-level parameter name
    pub fn name(&self) -> &str {
        &self.decl.name
    }

    /// Key the parameter's errors are reported under
    pub fn error_key(&self) -> &str {
        self.settings.effective_name(&self.decl.name)
    }

    pub fn settings(&self) -> &ParamSettings {
        &self.settings
    }

    pub fn descriptor(&self) -> &TypeDescriptor {
        &self.descriptor
    }

    /// Raw value extracted from the request (`None` is missing)
    pub fn raw(&self) -> Option<&Value> {
        self.raw.as_ref()
    }

    /// Pull the raw value out of the request
    fn extract(&mut self, request: &Request, path_args: &HashMap<String, String>) {
        let whole = self.settings.is_whole();
        let key = self.error_key().to_string();

        self.raw = match &self.settings.kind {
            SourceKind::Path => path_args.get(&key).map(Value::str),
            SourceKind::Query { delimiter } => {
                if whole {
                    Some(request.query_dict())
                } else {
                    match request.query_param(&key) {
                        None | Some("") => None,
                        Some(raw) if self.descriptor.is_list() => Some(Value::List(
                            raw.split(delimiter.as_str()).map(Value::str).collect(),
                        )),
                        Some(raw) => Some(Value::str(raw)),
                    }
                }
            }
            SourceKind::Header => {
                if whole {
                    Some(request.header_dict())
                } else {
                    let header_key = match self.settings.source.as_ref().and_then(Source::key) {
                        Some(source) => source.to_lowercase(),
                        None => self.decl.name.replace('_', "-").to_lowercase(),
                    };
                    request.header(&header_key).map(Value::str)
                }
            }
            SourceKind::Body => match self.settings.source.as_ref().and_then(Source::key) {
                Some(path) if !whole => request.body().and_then(|body| body.get_path(path)).cloned(),
                _ => request.body().cloned(),
            },
            SourceKind::CurrentUser { .. } => {
                let user = request.user();
                match self.settings.source.as_ref().and_then(Source::key) {
                    Some(path) if !whole => {
                        Some(user.map(|u| attribute_path(u, path)).unwrap_or(Value::Null))
                    }
                    _ => Some(user.map(|u| u.to_value()).unwrap_or(Value::Null)),
                }
            }
        };
    }

    /// Validate the extracted raw value
    ///
    /// Current-user parameters also run their membership check; its
    /// failure joins the value's own errors.
    fn validate(&self, request: &Request, ctx: &ValidatorContext) -> ValidationResult<Arg> {
        let value = self.validate_value(ctx);
        let membership = match self.settings.membership() {
            Some(check) => check.check(request.user()),
            None => Ok(()),
        };

        match (value, membership) {
            (Ok(arg), Ok(())) => Ok(arg),
            (Ok(_), Err(errors)) | (Err(errors), Ok(())) => Err(errors),
            (Err(mut errors), Err(denied)) => {
                errors.merge(denied);
                Err(errors)
            }
        }
    }

    fn validate_value(&self, ctx: &ValidatorContext) -> ValidationResult<Arg> {
        match (self.descriptor.shape(), self.raw.clone()) {
            (Shape::Nested(NestedType::Schema(schema)), Some(raw)) if !raw.is_null() => {
                let mut instance = match raw {
                    Value::List(_) => schema.many(raw),
                    other => schema.instance(other),
                }
                .with_context(ctx.clone());
                if instance.is_valid() {
                    Ok(Arg::Schema(instance))
                } else {
                    Err(instance.errors().clone())
                }
            }
            (_, raw) => {
                let validator = build(&self.descriptor, &self.settings.options);
                validator.run_validation(raw, ctx).map(Arg::Value)
            }
        }
    }
}

// ============================================================================
// Binder
// ============================================================================

/// How a parameter receives its value
enum Binding {
    Settings(ParamSettings),
    Request,
}

/// Parameter binder
#[derive(Debug, Clone, Default)]
pub struct Binder {
    config: BindingConfig,
}

impl Binder {
    pub fn new(config: BindingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BindingConfig {
        &self.config
    }

    /// Bind every parameter, in declaration order
    ///
    /// `path_args` are the router-captured arguments; the request's own
    /// path parameters are not consulted.
    pub fn bind(
        &self,
        params: &[ParamDecl],
        request: &Request,
        path_args: &HashMap<String, String>,
    ) -> ApiResult<Vec<Arg>> {
        let mut args = Vec::with_capacity(params.len());
        let mut errors = ParamErrors::new();

        for decl in params {
            match self.classify(decl, path_args) {
                Binding::Request => {
                    debug!(param = %decl.name, "passing request through");
                    args.push(Arg::Request(request.clone()));
                }
                Binding::Settings(settings) => {
                    match self.bind_one(decl, settings, request, path_args) {
                        Ok(arg) => args.push(arg),
                        Err((key, param_errors)) => errors.add(key, param_errors),
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(args)
        } else {
            warn!(
                path = request.path(),
                invalid = errors.len(),
                params = %errors,
                "request binding failed"
            );
            Err(ApiError::Validation(errors))
        }
    }

    fn bind_one(
        &self,
        decl: &ParamDecl,
        settings: ParamSettings,
        request: &Request,
        path_args: &HashMap<String, String>,
    ) -> Result<Arg, (String, ValidationErrors)> {
        let mut param = BoundParameter::new(decl, settings, &self.config);
        param.extract(request, path_args);

        let location = param.settings.kind.location();
        debug!(
            param = param.name(),
            source = param.settings.kind.as_str(),
            key = param.error_key(),
            kind = param.descriptor.base_kind.as_str(),
            missing = param.raw.is_none(),
            "binding parameter"
        );

        let ctx = ValidatorContext::with_location(location)
            .with_metadata("method", Value::str(request.method().as_str()))
            .with_metadata("path", Value::str(request.path()));

        param
            .validate(request, &ctx)
            .map_err(|errors| (param.error_key().to_string(), errors.at_location(location)))
    }

    fn classify(&self, decl: &ParamDecl, path_args: &HashMap<String, String>) -> Binding {
        if let ParamDefault::Settings(settings) = &decl.default {
            return Binding::Settings(settings.clone());
        }

        if matches!(decl.annotation, Some(TypeHint::Request)) {
            return Binding::Request;
        }

        let implicit = |kind: SourceKind| {
            let mut settings = ParamSettings::new(kind);
            if let ParamDefault::Value(default) = &decl.default {
                settings.options.default = Some(default.clone());
            }
            Binding::Settings(settings)
        };

        if path_args.contains_key(&decl.name) {
            return implicit(SourceKind::Path);
        }

        if let Some(hint) = &decl.annotation {
            if let Some(nested) = resolve(hint).nested_type {
                let is_model = matches!(nested, NestedType::Model(_));
                if !is_model || self.config.model_bodies {
                    return implicit(SourceKind::Body);
                }
            }
        }

        if decl.annotation.is_none() && decl.name == self.config.request_param_name {
            return Binding::Request;
        }

        implicit(SourceKind::Query {
            delimiter: self.config.query_delimiter.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::principal::User;
    use crate::settings::{body, current_user, header, path, query};
    use hintbind_validation::{FieldOptions, Schema};

    fn bind(params: &[ParamDecl], request: &Request) -> ApiResult<Vec<Arg>> {
        Binder::default().bind(params, request, request.path_params())
    }

    fn value(arg: &Arg) -> &Value {
        arg.as_value().unwrap()
    }

    fn detail(result: ApiResult<Vec<Arg>>) -> serde_json::Value {
        match result {
            Err(error) => error.to_detail(),
            Ok(args) => panic!("expected binding failure, got {:?}", args),
        }
    }

    #[test]
    fn test_explicit_settings_beat_path_name() {
        let params = [ParamDecl::new("id")
            .annotated(TypeHint::Int)
            .settings(path().source("pk"))];
        let request = Request::get("/items/9")
            .with_path_param("id", "1")
            .with_path_param("pk", "9");

        let args = bind(&params, &request).unwrap();
        assert_eq!(value(&args[0]), &Value::Int(9));
    }

    #[test]
    fn test_implicit_path_parameter() {
        let params = [ParamDecl::new("id").annotated(TypeHint::Int)];
        let request = Request::get("/items/3").with_path_param("id", "3");
        assert_eq!(value(&bind(&params, &request).unwrap()[0]), &Value::Int(3));
    }

    #[test]
    fn test_missing_required_query_is_aggregated() {
        let params = [
            ParamDecl::new("q").annotated(TypeHint::Str),
            ParamDecl::new("page").annotated(TypeHint::Int),
        ];
        let request = Request::get("/search").with_query_param("page", "two");

        assert_eq!(
            detail(bind(&params, &request)),
            serde_json::json!({
                "q": ["This field is required."],
                "page": ["A valid integer is required."],
            })
        );
    }

    #[test]
    fn test_empty_query_value_is_missing() {
        let params = [ParamDecl::new("q")
            .annotated(TypeHint::Str)
            .default_value(Value::str("all"))];
        let request = Request::get("/search").with_query_param("q", "");
        assert_eq!(value(&bind(&params, &request).unwrap()[0]), &Value::str("all"));
    }

    #[test]
    fn test_list_query_is_split() {
        let params = [
            ParamDecl::new("numbers").annotated(TypeHint::list_of(TypeHint::Int)),
            ParamDecl::new("tags")
                .annotated(TypeHint::list_of(TypeHint::Str))
                .settings(query().delimiter("|")),
        ];
        let request = Request::get("/")
            .with_query_param("numbers", "1,2,3")
            .with_query_param("tags", "a|b");

        let args = bind(&params, &request).unwrap();
        assert_eq!(value(&args[0]), &Value::from(vec![1i64, 2, 3]));
        assert_eq!(value(&args[1]), &Value::from(vec!["a", "b"]));
    }

    #[test]
    fn test_wildcard_query() {
        let params = [ParamDecl::new("filters")
            .annotated(TypeHint::Dict)
            .settings(query().source("*"))];
        let request = Request::get("/").with_query_param("a", "1");
        assert_eq!(
            value(&bind(&params, &request).unwrap()[0]),
            &Value::object([("a", Value::str("1"))])
        );
    }

    #[test]
    fn test_wildcard_header() {
        let params = [ParamDecl::new("headers")
            .annotated(TypeHint::Dict)
            .settings(header().source("*"))];
        let request = Request::get("/")
            .with_header("X-Request-ID", "abc")
            .with_header("Accept", "application/json");
        assert_eq!(
            value(&bind(&params, &request).unwrap()[0]),
            &Value::object([
                ("x-request-id", Value::str("abc")),
                ("accept", Value::str("application/json")),
            ])
        );
    }

    #[test]
    fn test_wildcard_body() {
        let params = [ParamDecl::new("payload")
            .annotated(TypeHint::Dict)
            .settings(body().source("*"))];
        let request = Request::post("/").with_json(serde_json::json!({"title": "Dune", "pages": 412}));
        let args = bind(&params, &request).unwrap();
        assert_eq!(value(&args[0]).get("title"), Some(&Value::str("Dune")));
        assert_eq!(value(&args[0]).get("pages"), Some(&Value::Int(412)));

        assert_eq!(
            detail(bind(&params, &Request::post("/"))),
            serde_json::json!({"payload": ["This field is required."]})
        );
    }

    #[test]
    fn test_custom_wildcard_token() {
        let binder = Binder::new(BindingConfig::new().wildcard("__all__"));
        let params = [
            ParamDecl::new("filters")
                .annotated(TypeHint::Dict)
                .settings(query().source("__all__")),
            ParamDecl::new("star")
                .annotated(TypeHint::Str)
                .settings(query().source("*")),
        ];
        let request = Request::get("/").with_query_param("a", "1");

        assert_eq!(
            detail(binder.bind(&params, &request, request.path_params())),
            serde_json::json!({"*": ["This field is required."]})
        );

        let request = request.with_query_param("*", "literal");
        let args = binder.bind(&params, &request, request.path_params()).unwrap();
        assert_eq!(
            value(&args[0]),
            &Value::object([("a", Value::str("1")), ("*", Value::str("literal"))])
        );
        assert_eq!(value(&args[1]), &Value::str("literal"));
    }

    #[test]
    fn test_header_name_is_derived() {
        let params = [
            ParamDecl::new("x_request_id")
                .annotated(TypeHint::Str)
                .settings(header()),
            ParamDecl::new("token")
                .annotated(TypeHint::Str)
                .settings(header().source("Authorization")),
        ];
        let request = Request::get("/")
            .with_header("X-Request-ID", "abc")
            .with_header("authorization", "Bearer t");

        let args = bind(&params, &request).unwrap();
        assert_eq!(value(&args[0]), &Value::str("abc"));
        assert_eq!(value(&args[1]), &Value::str("Bearer t"));
    }

    #[test]
    fn test_missing_header_is_required() {
        let params = [ParamDecl::new("x_api_key")
            .annotated(TypeHint::Str)
            .settings(header())];
        assert_eq!(
            detail(bind(&params, &Request::get("/"))),
            serde_json::json!({"x_api_key": ["This field is required."]})
        );
    }

    #[test]
    fn test_body_dotted_source() {
        let params = [
            ParamDecl::new("city")
                .annotated(TypeHint::Str)
                .settings(body().source("address.city")),
            ParamDecl::new("zip")
                .annotated(TypeHint::Str)
                .settings(body().source("address.zip").default_none()),
        ];
        let request = Request::post("/")
            .with_json(serde_json::json!({"address": {"city": "Oslo"}}));

        let args = bind(&params, &request).unwrap();
        assert_eq!(value(&args[0]), &Value::str("Oslo"));
        assert_eq!(value(&args[1]), &Value::Null);
    }

    #[test]
    fn test_current_user_dotted_path_collapses_to_null() {
        let params = [ParamDecl::new("email")
            .annotated(TypeHint::optional(TypeHint::Str))
            .settings(current_user().source("profile.email"))];
        let request = Request::get("/").with_user(User::new([("username", Value::str("bob"))]));

        let args = bind(&params, &request).unwrap();
        assert_eq!(value(&args[0]), &Value::Null);
    }

    #[test]
    fn test_current_user_membership_failure_uses_param_key() {
        let params = [ParamDecl::new("username")
            .annotated(TypeHint::Str)
            .settings(current_user().source("username").member_of(["admins"]))];
        let request = Request::get("/").with_user(
            User::new([("username", Value::str("bob"))]).with_group("staff"),
        );

        let detail = detail(bind(&params, &request));
        assert!(detail.get("username").is_some());
    }

    #[test]
    fn test_nested_schema_binds_from_body() {
        let author = Schema::builder("BinderAuthor").annotate("name", TypeHint::Str).build();
        let params = [ParamDecl::new("author").annotated(author.hint())];
        let request = Request::post("/authors").with_json(serde_json::json!({"name": "JK Rowling"}));

        let args = bind(&params, &request).unwrap();
        let instance = args[0].as_schema().unwrap();
        assert_eq!(instance.get("name").unwrap(), &Value::str("JK Rowling"));
    }

    #[test]
    fn test_nested_schema_errors_are_keyed_by_field() {
        let author = Schema::builder("BinderAuthorErrors")
            .annotate("name", TypeHint::Str)
            .build();
        let params = [ParamDecl::new("author").annotated(author.hint())];
        let request = Request::post("/authors").with_json(serde_json::json!({}));

        assert_eq!(
            detail(bind(&params, &request)),
            serde_json::json!({"author": {"name": ["This field is required."]}})
        );
    }

    #[test]
    fn test_request_passthrough() {
        let params = [
            ParamDecl::new("request"),
            ParamDecl::new("req").annotated(TypeHint::Request),
        ];
        let request = Request::get("/ping");
        let args = bind(&params, &request).unwrap();
        assert_eq!(args[0].as_request().unwrap().path(), "/ping");
        assert_eq!(args[1].as_request().unwrap().path(), "/ping");
    }

    #[test]
    fn test_annotated_request_name_is_a_query_param() {
        let params = [ParamDecl::new("request").annotated(TypeHint::Str)];
        let request = Request::get("/").with_query_param("request", "x");
        assert_eq!(value(&bind(&params, &request).unwrap()[0]), &Value::str("x"));
    }

    #[test]
    fn test_options_flow_to_validator() {
        let params = [ParamDecl::new("page")
            .annotated(TypeHint::Int)
            .settings(query().options(FieldOptions::new().min_value(1)))];
        let request = Request::get("/").with_query_param("page", "0");
        let detail = detail(bind(&params, &request));
        assert_eq!(
            detail["page"],
            serde_json::json!(["Ensure this value is greater than or equal to 1."])
        );
    }
}
