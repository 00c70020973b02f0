use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::model::role::Role;
use actix_web::{
    FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorForbidden,
    error::ErrorUnauthorized, web::Data,
};
use futures::future::{Ready, ready};

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub username: String,
    pub role: Role,

    /// Present only if this user is linked to an employee record
    pub employee_id: Option<String>,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // set by auth_middleware on protected scopes
        if let Some(user) = req.extensions().get::<AuthUser>() {
            return ready(Ok(user.clone()));
        }

        let token = match req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
        {
            Some(t) => t,
            None => return ready(Err(ErrorUnauthorized("Missing token"))),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => {
                return ready(Err(
                    actix_web::error::ErrorInternalServerError("Config missing"),
                ))
            }
        };

        let claims = match verify_token(token, &config.jwt_secret) {
            Ok(c) => c,
            Err(_) => return ready(Err(ErrorUnauthorized("Invalid token"))),
        };

        ready(AuthUser::from_claims(claims.sub, &claims.role, claims.employee_id))
    }
}

impl AuthUser {
    pub fn from_claims(
        username: String,
        role: &str,
        employee_id: Option<String>,
    ) -> actix_web::Result<Self> {
        let role = Role::from_claim(role).ok_or_else(|| ErrorUnauthorized("Invalid role"))?;

        Ok(AuthUser {
            username,
            role,
            employee_id,
        })
    }

    pub fn require_manager_or_admin(&self) -> actix_web::Result<()> {
        if matches!(self.role, Role::Admin | Role::Manager) {
            Ok(())
        } else {
            Err(ErrorForbidden("Manager/Admin only"))
        }
    }

    /// Returns true if the user is an employee
    pub fn is_employee(&self) -> bool {
        self.role == Role::Employee
    }

    /// Employees may only act on their own attendance
    pub fn require_access_to(&self, employee_id: &str) -> actix_web::Result<()> {
        if !self.is_employee() {
            return Ok(());
        }

        match self.employee_id.as_deref() {
            Some(own) if own == employee_id => Ok(()),
            Some(_) => Err(ErrorForbidden("Employees can only access their own attendance")),
            None => Err(ErrorForbidden("No employee profile")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role, employee_id: Option<&str>) -> AuthUser {
        AuthUser {
            username: "jane".into(),
            role,
            employee_id: employee_id.map(str::to_string),
        }
    }

    #[test]
    fn employees_are_limited_to_their_own_id() {
        let employee = user(Role::Employee, Some("E1"));
        assert!(employee.require_access_to("E1").is_ok());
        assert!(employee.require_access_to("E2").is_err());
        assert!(user(Role::Employee, None).require_access_to("E1").is_err());
    }

    #[test]
    fn staff_roles_can_act_for_anyone() {
        assert!(user(Role::Cashier, None).require_access_to("E2").is_ok());
        assert!(user(Role::Manager, Some("E1")).require_access_to("E2").is_ok());
    }

    #[test]
    fn listing_everything_needs_manager_or_admin() {
        assert!(user(Role::Admin, None).require_manager_or_admin().is_ok());
        assert!(user(Role::Manager, None).require_manager_or_admin().is_ok());
        assert!(user(Role::Cashier, None).require_manager_or_admin().is_err());
    }

    #[actix_web::test]
    async fn extractor_returns_user_set_by_middleware() {
        let req = actix_web::test::TestRequest::default().to_http_request();
        req.extensions_mut().insert(user(Role::Cashier, Some("E7")));

        let extracted = AuthUser::extract(&req).await.unwrap();
        assert_eq!(extracted.role, Role::Cashier);
        assert_eq!(extracted.employee_id.as_deref(), Some("E7"));
    }

    #[actix_web::test]
    async fn extractor_without_user_or_token_is_unauthorized() {
        let req = actix_web::test::TestRequest::default().to_http_request();

        let err = AuthUser::extract(&req).await.unwrap_err();
        assert_eq!(
            err.as_response_error().status_code(),
            actix_web::http::StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn unknown_role_claim_is_unauthorized() {
        assert!(AuthUser::from_claims("jane".into(), "auditor", None).is_err());
    }
}
