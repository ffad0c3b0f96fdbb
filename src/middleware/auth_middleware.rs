//! JWT Authentication middleware for protected routes.

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error, HttpMessage,
};
use futures::future::{ok, LocalBoxFuture, Ready};
use log::debug;
use std::rc::Rc;
use std::sync::Arc;

use crate::constants::{ERR_INVALID_AUTH_HEADER, ERR_INVALID_TOKEN};
use crate::errors::ApiError;
use crate::services::auth_service::decode_token;

/// JWT Authentication middleware.
///
/// Validates the bearer token from the Authorization header and adds the
/// decoded claims to the request extensions.
#[derive(Clone)]
pub struct AuthMiddleware {
    secret: Arc<str>,
}

impl AuthMiddleware {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AuthMiddlewareService {
            service: Rc::new(service),
            secret: Arc::clone(&self.secret),
        })
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    secret: Arc<str>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let secret = Arc::clone(&self.secret);

        Box::pin(async move {
            let token = req
                .headers()
                .get(AUTHORIZATION)
                .and_then(|h| h.to_str().ok())
                .and_then(|h| h.strip_prefix("Bearer "))
                .map(str::to_owned)
                .ok_or_else(|| ApiError::Unauthorized(ERR_INVALID_AUTH_HEADER.to_string()))?;

            let claims = decode_token(&token, &secret).map_err(|err| {
                debug!("Rejected token: {}", err);
                ApiError::Unauthorized(ERR_INVALID_TOKEN.to_string())
            })?;

            req.extensions_mut().insert(claims);

            service.call(req).await
        })
    }
}
