use chrono::{NaiveDate, NaiveDateTime, Utc};
use rand::Rng;
use rand::distr::Alphanumeric;
use serde::Serialize;

use crate::error::AppError;
use crate::models::ContractRenewal;

use super::{Permission, Role};

#[derive(Debug, Serialize, Clone)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub current_belt_id: String,
    pub start_date: Option<NaiveDate>,
    pub contract_start_date: Option<NaiveDate>,
    pub contract_renewal: Option<ContractRenewal>,
    pub sensei_notes: Option<String>,
    pub address: Option<String>,
    pub signed_contract: Option<String>,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbUser {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub current_belt_id: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub contract_start_date: Option<NaiveDate>,
    pub contract_renewal: Option<String>,
    pub sensei_notes: Option<String>,
    pub address: Option<String>,
    pub signed_contract: Option<String>,
}

impl From<DbUser> for User {
    fn from(user: DbUser) -> Self {
        Self {
            id: user.id.unwrap_or_default(),
            name: user.name.unwrap_or_default(),
            email: user.email.unwrap_or_default(),
            role: user
                .role
                .as_deref()
                .and_then(|role| Role::from_str(role).ok())
                .unwrap_or(Role::Student),
            current_belt_id: user.current_belt_id.unwrap_or_default(),
            start_date: user.start_date,
            contract_start_date: user.contract_start_date,
            contract_renewal: user
                .contract_renewal
                .as_deref()
                .and_then(ContractRenewal::parse),
            sensei_notes: user.sensei_notes,
            address: user.address,
            signed_contract: user.signed_contract,
        }
    }
}

impl User {
    /// The single authorization check every mutating operation goes through.
    pub fn require_permission(&self, permission: Permission) -> Result<(), AppError> {
        if self.role.has_permission(permission) {
            Ok(())
        } else {
            tracing::warn!(
                user_id = %self.id,
                role = %self.role.as_str(),
                permission = ?permission,
                "Permission denied"
            );
            Err(AppError::Authorization(format!(
                "{} may not perform {:?}",
                self.role, permission
            )))
        }
    }

    /// Passes when acting on one's own record with `own`, or on anyone's with `any`.
    pub fn require_self_or(
        &self,
        target_user_id: i64,
        own: Permission,
        any: Permission,
    ) -> Result<(), AppError> {
        if self.id == target_user_id {
            self.require_permission(own)
        } else {
            self.require_permission(any)
        }
    }
}

#[derive(Debug, Clone)]
pub struct UserSession {
    pub user_id: i64,
    pub token: String,
    pub expires_at: NaiveDateTime,
}

#[derive(sqlx::FromRow)]
pub struct DbUserSession {
    pub user_id: Option<i64>,
    pub token: Option<String>,
    pub expires_at: Option<NaiveDateTime>,
}

impl From<DbUserSession> for UserSession {
    fn from(session: DbUserSession) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            user_id: session.user_id.unwrap_or_default(),
            token: session.token.unwrap_or_default(),
            expires_at: session.expires_at.unwrap_or(now),
        }
    }
}

impl UserSession {
    pub fn generate_token() -> String {
        rand::rng()
            .sample_iter(&Alphanumeric)
            .take(64)
            .map(char::from)
            .collect()
    }

    pub fn is_valid(&self) -> bool {
        self.expires_at > Utc::now().naive_utc()
    }
}
