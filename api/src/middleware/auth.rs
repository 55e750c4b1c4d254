//! Bearer token authentication middleware for protecting API endpoints.
//!
//! Runs the [`AuthorizationGate`](tw_core::AuthorizationGate) from the
//! application state on every request, optionally requiring a role, and
//! injects an [`AuthContext`] into the request extensions.

use actix_web::{
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    http::header::{HeaderMap, AUTHORIZATION},
    web, Error, FromRequest, HttpMessage, HttpRequest, HttpResponse,
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{ready, Ready},
    rc::Rc,
    task::{Context, Poll},
};

use tw_core::domain::entities::token::{Principal, Role};
use tw_core::errors::{AuthError, DomainError};
use tw_shared::errors::{error_codes, ErrorResponse};

use crate::config::ErrorConfig;
use crate::handlers::{handle_domain_error, ApiError};
use crate::routes::AppState;

/// Authenticated caller injected into requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    /// Subject the token was issued for
    pub subject_id: i64,
    /// Role carried by the token
    pub role: Role,
}

impl From<Principal> for AuthContext {
    fn from(principal: Principal) -> Self {
        Self {
            subject_id: principal.subject_id,
            role: principal.role,
        }
    }
}

/// Authentication middleware factory
#[derive(Debug, Clone, Copy, Default)]
pub struct JwtAuth {
    required_role: Option<Role>,
}

impl JwtAuth {
    /// Any valid access token is accepted
    pub fn new() -> Self {
        Self::default()
    }

    /// Only tokens carrying `role` are accepted
    pub fn require_role(role: Role) -> Self {
        Self {
            required_role: Some(role),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtAuthMiddleware {
            service: Rc::new(service),
            required_role: self.required_role,
        }))
    }
}

/// Authentication middleware service
///
/// Rejections are answered here with the shared error body instead of
/// being propagated as service errors.
pub struct JwtAuthMiddleware<S> {
    service: Rc<S>,
    required_role: Option<Role>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let required_role = self.required_role;

        Box::pin(async move {
            let Some(state) = req.app_data::<web::Data<AppState>>().cloned() else {
                let body = ErrorResponse::new(
                    error_codes::INTERNAL_ERROR,
                    "application state not configured",
                );
                let response = HttpResponse::InternalServerError().json(body);
                return Ok(req.into_response(response).map_into_right_body());
            };

            let outcome = match authorization_header(req.headers()) {
                Ok(header) => state.gate.authorize(header, required_role).await,
                Err(error) => Err(error),
            };

            match outcome {
                Ok(principal) => {
                    req.extensions_mut().insert(AuthContext::from(principal));
                    service
                        .call(req)
                        .await
                        .map(ServiceResponse::map_into_left_body)
                }
                Err(error) => {
                    let response = handle_domain_error(&error, state.errors);
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}

/// `Authorization` header value; a non-UTF-8 value is a malformed header
pub fn authorization_header(headers: &HeaderMap) -> Result<Option<&str>, DomainError> {
    headers
        .get(AUTHORIZATION)
        .map(|value| {
            value
                .to_str()
                .map_err(|_| DomainError::from(AuthError::InvalidAuthorizationHeader))
        })
        .transpose()
}

/// Extractor for required authentication
impl FromRequest for AuthContext {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let errors = req
            .app_data::<web::Data<AppState>>()
            .map(|state| state.errors)
            .unwrap_or_else(ErrorConfig::default);

        let result = req
            .extensions()
            .get::<AuthContext>()
            .copied()
            .ok_or_else(|| ApiError::new(AuthError::MissingCredential.into(), errors).into());

        ready(result)
    }
}
