use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;

use crate::config::Config;
use crate::database::MongoDB;
use crate::services::auth_service;
use crate::utils::error::AppError;

/// Authentication gate. Pulls a bearer token from the `Authorization`
/// header (falling back to the `token` cookie), verifies it, loads the user
/// it names and attaches the identity to the request for downstream
/// extractors (`web::ReqData<AuthUser>`).
///
/// Status codes follow the original contract: a missing token is 401, a
/// present but invalid/expired token is 403, a token whose subject no
/// longer resolves to a user is 401 again.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
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

        Box::pin(async move {
            let token = extract_token(&req).ok_or_else(|| {
                AppError::Unauthorized("Unauthorized: No token provided".to_string())
            })?;

            let config = req
                .app_data::<web::Data<Config>>()
                .cloned()
                .ok_or_else(|| AppError::Database("Config not registered".to_string()))?;
            let db = req
                .app_data::<web::Data<MongoDB>>()
                .cloned()
                .ok_or_else(|| AppError::Database("MongoDB not registered".to_string()))?;

            let claims = auth_service::verify_token(&config, &token)?;

            let user = auth_service::find_auth_user(&db, &claims.sub)
                .await?
                .ok_or_else(|| AppError::Unauthorized("Unauthorized: Invalid user".to_string()))?;

            req.extensions_mut().insert(user);

            service.call(req).await
        })
    }
}

/// Bearer header first, `token` cookie second.
fn extract_token(req: &ServiceRequest) -> Option<String> {
    if let Some(header_value) = req.headers().get("Authorization") {
        if let Ok(header_str) = header_value.to_str() {
            if let Some(token) = header_str.strip_prefix("Bearer ") {
                return Some(token.to_string());
            }
        }
    }

    req.cookie("token").map(|c| c.value().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::cookie::Cookie;
    use actix_web::test::TestRequest;

    #[test]
    fn bearer_header_wins() {
        let req = TestRequest::default()
            .insert_header(("Authorization", "Bearer abc.def.ghi"))
            .cookie(Cookie::new("token", "from-cookie"))
            .to_srv_request();
        assert_eq!(extract_token(&req).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn falls_back_to_cookie() {
        let req = TestRequest::default()
            .cookie(Cookie::new("token", "from-cookie"))
            .to_srv_request();
        assert_eq!(extract_token(&req).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn malformed_header_without_cookie_yields_none() {
        let req = TestRequest::default()
            .insert_header(("Authorization", "Token abc"))
            .to_srv_request();
        assert_eq!(extract_token(&req), None);
    }

    #[test]
    fn no_transport_yields_none() {
        let req = TestRequest::default().to_srv_request();
        assert_eq!(extract_token(&req), None);
    }
}
