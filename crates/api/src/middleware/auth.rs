//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use chairbook_core::booking::Actor;
use chairbook_core::error::CoreError;
use chairbook_core::types::DbId;

use crate::auth::jwt::{validate_token, PrincipalKind};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Authenticated caller extracted from a JWT Bearer token in the `Authorization` header.
///
/// ```ignore
/// async fn my_handler(auth: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(subject = auth.id, tenant_id = auth.tenant_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// User or customer id (from `claims.sub`), depending on `kind`.
    pub id: DbId,
    pub kind: PrincipalKind,
    /// Staff role name. `None` for customers.
    pub role: Option<String>,
    pub tenant_id: DbId,
}

impl AuthUser {
    /// The actor recorded on status logs for writes made by this caller.
    pub fn actor(&self) -> Actor {
        match self.kind {
            PrincipalKind::User => Actor::User(self.id),
            PrincipalKind::Customer => Actor::Customer(self.id),
        }
    }

    pub fn is_staff(&self) -> bool {
        self.kind == PrincipalKind::User
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.role.as_deref() == Some(role)
    }

    /// The customer id when the caller is a customer.
    pub fn customer_id(&self) -> Option<DbId> {
        match self.kind {
            PrincipalKind::Customer => Some(self.id),
            PrincipalKind::User => None,
        }
    }

    /// Staff act for any customer of their tenant; customers only for themselves.
    pub fn may_act_for_customer(&self, customer_id: DbId) -> bool {
        self.is_staff() || self.customer_id() == Some(customer_id)
    }

    /// Resolve an optional tenant filter against the caller's tenant.
    ///
    /// Absent means the caller's own tenant; any other tenant is forbidden.
    pub fn scope_tenant(&self, requested: Option<DbId>) -> AppResult<DbId> {
        match requested {
            None => Ok(self.tenant_id),
            Some(id) if id == self.tenant_id => Ok(id),
            Some(_) => Err(AppError::Core(CoreError::Forbidden(
                "Cannot access another tenant".into(),
            ))),
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        Ok(AuthUser {
            id: claims.sub,
            kind: claims.kind,
            role: claims.role,
            tenant_id: claims.tenant_id,
        })
    }
}
