//! Handler trait
//!
//! Handlers are the units the request pipeline dispatches to. Typed views
//! and actions implement it by passing the request as the single call
//! argument and its path parameters as the captured route arguments.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::error;

use crate::error::ApiResult;
use crate::request::Request;
use crate::response::Response;
use crate::view::{CallArg, TypedAction, TypedView};

/// Handler trait for processing requests
#[async_trait]
pub trait Handler: Send + Sync {
    /// Process a request and return a response
    async fn handle(&self, req: Request) -> ApiResult<Response>;
}

#[async_trait]
impl Handler for TypedView {
    async fn handle(&self, req: Request) -> ApiResult<Response> {
        let path_args = req.path_params().clone();
        self.call(vec![CallArg::Request(req)], &path_args)
    }
}

/// A typed action bound to its receiver
pub struct ActionHandler<R> {
    receiver: Arc<R>,
    action: TypedAction<R>,
}

impl<R> ActionHandler<R> {
    pub fn new(receiver: Arc<R>, action: TypedAction<R>) -> Self {
        Self { receiver, action }
    }

    pub fn receiver(&self) -> &Arc<R> {
        &self.receiver
    }

    pub fn action(&self) -> &TypedAction<R> {
        &self.action
    }
}

#[async_trait]
impl<R: Send + Sync + 'static> Handler for ActionHandler<R> {
    async fn handle(&self, req: Request) -> ApiResult<Response> {
        let path_args = req.path_params().clone();
        self.action
            .call(&self.receiver, vec![CallArg::Request(req)], &path_args)
    }
}

/// Run a handler, turning any error into its error response
pub async fn respond(handler: &dyn Handler, req: Request) -> Response {
    match handler.handle(req).await {
        Ok(response) => response,
        Err(err) => {
            if !err.is_validation() {
                error!(error = %err, "handler failed");
            }
            err.into_response()
        }
    }
}
