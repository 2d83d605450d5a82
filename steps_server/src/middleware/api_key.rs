//! API key middleware for the steps server.
//!
//! Only the chat front end talks to this server. It identifies itself with a shared secret in the `X-Api-Key` header;
//! requests without it, or with the wrong value, are refused with 401 Unauthorized before reaching a handler.
//! An unset key refuses everything.

use std::{pin::Pin, rc::Rc};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
};
use futures::{
    future::{ok, Ready},
    Future,
};
use log::*;
use steps_common::Secret;

use crate::errors::ServerError;

pub const API_KEY_HEADER: &str = "X-Api-Key";

pub struct ApiKeyMiddlewareFactory {
    api_key: Secret<String>,
}

impl ApiKeyMiddlewareFactory {
    pub fn new(api_key: Secret<String>) -> Self {
        if api_key.is_empty() {
            warn!("🔐️ No API key is configured. Every request under /api will be refused.");
        }
        ApiKeyMiddlewareFactory { api_key }
    }
}

impl<S, B> Transform<S, ServiceRequest> for ApiKeyMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = ApiKeyMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(ApiKeyMiddlewareService { api_key: self.api_key.clone(), service: Rc::new(service) })
    }
}

pub struct ApiKeyMiddlewareService<S> {
    api_key: Secret<String>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for ApiKeyMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let authorised = is_authorised(&self.api_key, req.headers().get(API_KEY_HEADER).and_then(|v| v.to_str().ok()));
        Box::pin(async move {
            if authorised {
                service.call(req).await
            } else {
                debug!("🔐️ Refusing {} {}: missing or invalid API key", req.method(), req.path());
                Err(ServerError::Unauthorized.into())
            }
        })
    }
}

fn is_authorised(api_key: &Secret<String>, presented: Option<&str>) -> bool {
    match presented {
        Some(key) => !api_key.is_empty() && key == api_key.reveal().as_str(),
        None => false,
    }
}
