use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;

/// The logged-in user on whose behalf a service call is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Actor {
    pub(crate) user_id: i64,
    pub(crate) username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RegisterRequest {
    pub(crate) username: String,
    pub(crate) password: String,
    pub(crate) password_confirm: String,
}

impl RegisterRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let username = normalize_username(&self.username)?;
        let password_len = self.password.chars().count();
        if !(8..=128).contains(&password_len) {
            return Err(DomainError::validation("password", "Длина от 8 до 128 символов."));
        }
        if self.password != self.password_confirm {
            return Err(DomainError::validation(
                "password_confirm",
                "Пароли не совпадают.",
            ));
        }
        Ok(Self {
            username,
            password: self.password,
            password_confirm: self.password_confirm,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct LoginRequest {
    pub(crate) username: String,
    pub(crate) password: String,
}

impl LoginRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let username = self.username.trim();
        if username.is_empty() || username.len() > 64 {
            return Err(DomainError::validation("username", "Длина от 1 до 64 символов."));
        }

        if self.password.is_empty() {
            return Err(DomainError::validation("password", "Обязательное поле."));
        }
        Ok(Self {
            username: username.to_string(),
            password: self.password,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct User {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) created_at: DateTime<Utc>,
}

impl User {
    pub(crate) fn new(
        id: i64,
        username: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if id <= 0 {
            return Err(DomainError::validation("id", "Значение должно быть больше нуля."));
        }
        let username = normalize_username(&username.into())?;

        Ok(Self {
            id,
            username,
            created_at,
        })
    }

    pub(crate) fn as_actor(&self) -> Actor {
        Actor {
            user_id: self.id,
            username: self.username.clone(),
        }
    }
}

pub(crate) fn normalize_username(username: &str) -> Result<String, DomainError> {
    let username = username.trim();
    let len = username.chars().count();
    if !(3..=64).contains(&len) {
        return Err(DomainError::validation("username", "Длина от 3 до 64 символов."));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        return Err(DomainError::validation(
            "username",
            "Допустимы только латинские буквы, цифры и символы @/./+/-/_.",
        ));
    }
    Ok(username.to_string())
}
