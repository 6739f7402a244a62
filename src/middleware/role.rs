use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpMessage,
};
use futures::future::LocalBoxFuture;
use std::future::{ready, Ready};

use crate::models::user::{AuthUser, Role};
use crate::utils::error::AppError;

/// Role gate middleware factory. Requires `AuthMiddleware` to have run
/// first; without an attached identity the request is rejected with 401,
/// with an identity outside the allowed set with 403.
pub struct RequireRole {
    allowed: &'static [Role],
}

impl RequireRole {
    pub fn admin() -> Self {
        Self {
            allowed: &[Role::Admin],
        }
    }

    pub fn manager_or_admin() -> Self {
        Self {
            allowed: &[Role::Manager, Role::Admin],
        }
    }
}

/// Pure membership check shared by the middleware and its tests.
pub fn check_role(identity: Option<&AuthUser>, allowed: &[Role]) -> Result<(), AppError> {
    match identity {
        None => Err(AppError::Unauthorized("Unauthorized".to_string())),
        Some(user) if !allowed.contains(&user.role) => {
            Err(AppError::Forbidden("Forbidden: Access denied".to_string()))
        }
        Some(_) => Ok(()),
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireRole
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequireRoleService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireRoleService {
            service,
            allowed: self.allowed,
        }))
    }
}

pub struct RequireRoleService<S> {
    service: S,
    allowed: &'static [Role],
}

impl<S, B> Service<ServiceRequest> for RequireRoleService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let verdict = {
            let extensions = req.extensions();
            check_role(extensions.get::<AuthUser>(), self.allowed)
        };

        match verdict {
            Ok(()) => {
                let fut = self.service.call(req);
                Box::pin(async move { fut.await })
            }
            Err(e) => Box::pin(ready(Err(e.into()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;

    fn identity(role: Role) -> AuthUser {
        AuthUser {
            id: ObjectId::new(),
            name: "Asha".to_string(),
            email: "asha@example.com".to_string(),
            role,
            phone: "9876543210".to_string(),
        }
    }

    #[test]
    fn missing_identity_is_unauthorized() {
        let err = check_role(None, &[Role::Admin]).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn employee_cannot_pass_admin_gate() {
        let user = identity(Role::Employee);
        let err = check_role(Some(&user), &[Role::Admin]).unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn admin_passes_admin_gate() {
        let user = identity(Role::Admin);
        assert!(check_role(Some(&user), &[Role::Admin]).is_ok());
    }

    #[test]
    fn manager_passes_manager_or_admin_gate() {
        let user = identity(Role::Manager);
        assert!(check_role(Some(&user), &[Role::Manager, Role::Admin]).is_ok());
    }
}
