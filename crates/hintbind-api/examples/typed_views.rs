//! Typed views example
//!
//! Declares a few handlers with typed parameters and dispatches requests
//! through them, printing the bound arguments or the aggregated errors.
//!
//! Run with:
//! ```bash
//! cargo run -p hintbind-api --example typed_views
//! ```

use std::sync::Arc;

use hintbind_api::handler::respond;
use hintbind_api::logging::{init_logging, LoggingConfig};
use hintbind_api::settings::{current_user, header, path, query};
use hintbind_api::{
    ActionHandler, Arg, ParamDecl, Request, Response, TypedAction, TypedView, User, ViewDecl,
};
use hintbind_validation::{Schema, TypeHint, Value};

fn echo(args: Vec<Arg>) -> hintbind_api::ApiResult<Response> {
    let values: Vec<Value> = args.into_iter().map(Arg::into_value).collect();
    Ok(Response::value(Value::List(values)))
}

fn print_response(label: &str, response: &Response) {
    let body = response
        .body_json()
        .map(|json| json.to_string())
        .unwrap_or_default();
    println!("  {:<28} {} {}", label, response.status.as_u16(), body);
}

// ============================================================================
// Query and path parameters
// ============================================================================

async fn search_view() {
    println!("--- Example 1: Query and Path Parameters ---");

    let decl = ViewDecl::new("search")
        .param(ParamDecl::new("shelf").annotated(TypeHint::Int).settings(path().source("pk")))
        .param(ParamDecl::new("q").annotated(TypeHint::Str))
        .param(ParamDecl::new("ids").annotated_str("List[int]"))
        .param(
            ParamDecl::new("limit")
                .annotated(TypeHint::Int)
                .settings(query().min_value(1).max_value(100).default_value(20i64)),
        );
    let view = TypedView::new(decl, echo).expect("valid declaration");

    let ok = Request::get("/shelves/3/search")
        .with_path_param("pk", "3")
        .with_query_string("q=dune&ids=1,2,3");
    print_response("valid request", &respond(&view, ok).await);

    let bad = Request::get("/shelves/x/search")
        .with_path_param("pk", "x")
        .with_query_string("ids=1,two&limit=500");
    print_response("invalid request", &respond(&view, bad).await);
}

// ============================================================================
// Body and headers
// ============================================================================

async fn create_view() {
    println!("--- Example 2: Body and Headers ---");

    let author = Schema::builder("ExampleAuthor")
        .annotate("name", TypeHint::Str)
        .annotate_with_default("born", TypeHint::optional(TypeHint::Date), Value::Null)
        .build();

    let decl = ViewDecl::new("create_author")
        .param(ParamDecl::new("author").annotated(author.hint()))
        .param(ParamDecl::new("x_request_id").annotated(TypeHint::Uuid).settings(header()));
    let view = TypedView::new(decl, echo).expect("valid declaration");

    let ok = Request::post("/authors")
        .with_header("X-Request-Id", "de305d54-75b4-431b-adb2-eb6b9e546013")
        .with_json(serde_json::json!({"name": "Frank Herbert", "born": "1920-10-08"}));
    print_response("valid payload", &respond(&view, ok).await);

    let bad = Request::post("/authors").with_json(serde_json::json!({"born": "soon"}));
    print_response("invalid payload", &respond(&view, bad).await);
}

// ============================================================================
// Current user in an action
// ============================================================================

struct Library;

async fn archive_action() {
    println!("--- Example 3: Current User ---");

    let decl = ViewDecl::new("archive")
        .param(ParamDecl::new("self"))
        .param(ParamDecl::new("id").annotated(TypeHint::Int))
        .param(
            ParamDecl::new("email")
                .annotated(TypeHint::optional(TypeHint::Str))
                .settings(current_user().source("profile.email").member_of(["librarians"])),
        );
    let action = TypedAction::new(decl, |_: &Library, args: Vec<Arg>| echo(args))
        .expect("valid declaration");
    let handler = ActionHandler::new(Arc::new(Library), action);

    let librarian = User::new([(
        "profile",
        Value::object([("email", Value::str("ada@example.com"))]),
    )])
    .with_group("librarians");
    let ok = Request::post("/books/4/archive")
        .with_path_param("id", "4")
        .with_user(librarian);
    print_response("librarian", &respond(&handler, ok).await);

    let anonymous = Request::post("/books/4/archive")
        .with_path_param("id", "4")
        .with_user(User::anonymous());
    print_response("anonymous", &respond(&handler, anonymous).await);
}

#[tokio::main]
async fn main() {
    let _ = init_logging(LoggingConfig::default().default_filter("hintbind_api=debug"));

    println!("=== hintbind-api: Typed Views ===\n");
    search_view().await;
    println!();
    create_view().await;
    println!();
    archive_action().await;
}
