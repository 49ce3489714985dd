use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::Deserialize;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostInput};
use crate::domain::user::{LoginRequest, RegisterRequest};

/// Field-level messages shown next to the inputs of a re-displayed form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FormErrors {
    fields: BTreeMap<String, Vec<String>>,
    non_field: Vec<String>,
}

impl FormErrors {
    pub(crate) fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub(crate) fn add_non_field(&mut self, message: impl Into<String>) {
        self.non_field.push(message.into());
    }

    pub(crate) fn field(&self, name: &str) -> &[String] {
        self.fields.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    pub(crate) fn non_field(&self) -> &[String] {
        &self.non_field
    }

    /// Domain errors a user can fix by editing the form; anything else is `None`.
    pub(crate) fn from_domain(err: &DomainError) -> Option<Self> {
        let mut errors = Self::default();
        match err {
            DomainError::Validation { field, message } => errors.add(field, *message),
            DomainError::AlreadyExists(field) => errors.add(field, already_taken_message(field)),
            DomainError::InvalidCredentials => {
                errors.add_non_field("Введите правильные имя пользователя и пароль.")
            }
            _ => return None,
        }
        Some(errors)
    }
}

impl From<&ValidationErrors> for FormErrors {
    fn from(errors: &ValidationErrors) -> Self {
        let mut form_errors = Self::default();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map(|message| message.to_string())
                    .unwrap_or_else(|| format!("Некорректное значение ({}).", error.code));
                form_errors.add(&field, message);
            }
        }
        form_errors
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub(crate) struct PostForm {
    #[serde(default)]
    #[validate(custom(function = "validate_not_blank"))]
    pub(crate) text: String,
    #[serde(default)]
    #[validate(custom(function = "validate_group_choice"))]
    pub(crate) group: String,
}

impl PostForm {
    pub(crate) fn from_post(post: &Post) -> Self {
        Self {
            text: post.text.clone(),
            group: post
                .group_id()
                .map(|id| id.to_string())
                .unwrap_or_default(),
        }
    }

    pub(crate) fn to_input(&self) -> PostInput {
        PostInput {
            text: self.text.clone(),
            group_id: parse_group_choice(&self.group).ok().flatten(),
        }
    }

    pub(crate) fn is_selected(&self, group_id: &i64) -> bool {
        self.group.trim() == group_id.to_string()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub(crate) struct LoginForm {
    #[serde(default)]
    #[validate(length(min = 1, max = 64, message = "Обязательное поле."))]
    pub(crate) username: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Обязательное поле."))]
    pub(crate) password: String,
    #[serde(default)]
    pub(crate) next: Option<String>,
}

impl LoginForm {
    pub(crate) fn to_request(&self) -> LoginRequest {
        LoginRequest {
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub(crate) struct SignupForm {
    #[serde(default)]
    #[validate(length(min = 3, max = 64, message = "Длина от 3 до 64 символов."))]
    pub(crate) username: String,
    #[serde(default)]
    #[validate(length(min = 8, max = 128, message = "Длина от 8 до 128 символов."))]
    pub(crate) password: String,
    #[serde(default)]
    pub(crate) password_confirm: String,
}

impl SignupForm {
    pub(crate) fn to_request(&self) -> RegisterRequest {
        RegisterRequest {
            username: self.username.clone(),
            password: self.password.clone(),
            password_confirm: self.password_confirm.clone(),
        }
    }
}

fn already_taken_message(field: &str) -> &'static str {
    match field {
        "username" => "Пользователь с таким именем уже существует.",
        "slug" => "Группа с таким адресом уже существует.",
        _ => "Такое значение уже занято.",
    }
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required").with_message(Cow::Borrowed("Обязательное поле.")));
    }
    Ok(())
}

fn validate_group_choice(value: &str) -> Result<(), ValidationError> {
    parse_group_choice(value).map(|_| ())
}

/// Empty means "no group"; anything else must be a group id.
fn parse_group_choice(value: &str) -> Result<Option<i64>, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    match value.parse::<i64>() {
        Ok(id) if id > 0 => Ok(Some(id)),
        _ => Err(ValidationError::new("invalid_choice").with_message(Cow::Borrowed("Выберите корректную группу."))),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use validator::Validate;

    use super::{FormErrors, LoginForm, PostForm, SignupForm};
    use crate::domain::error::DomainError;
    use crate::domain::group::GroupRef;
    use crate::domain::post::{Author, Post};

    fn form(text: &str, group: &str) -> PostForm {
        PostForm {
            text: text.to_string(),
            group: group.to_string(),
        }
    }

    #[test]
    fn blank_text_is_a_field_error() {
        let errors = form("  ", "").validate().expect_err("must be invalid");
        let errors = FormErrors::from(&errors);

        assert_eq!(errors.field("text"), ["Обязательное поле.".to_string()]);
        assert!(errors.field("group").is_empty());
    }

    #[test]
    fn non_numeric_group_is_a_field_error() {
        let errors = form("text", "abc").validate().expect_err("must be invalid");
        let errors = FormErrors::from(&errors);

        assert_eq!(errors.field("group"), ["Выберите корректную группу.".to_string()]);
    }

    #[test]
    fn auth_form_errors_are_localized() {
        let signup = SignupForm {
            username: "ab".to_string(),
            password: "short".to_string(),
            password_confirm: "short".to_string(),
        };
        let errors = FormErrors::from(&signup.validate().expect_err("must be invalid"));
        assert_eq!(errors.field("username"), ["Длина от 3 до 64 символов.".to_string()]);
        assert_eq!(errors.field("password"), ["Длина от 8 до 128 символов.".to_string()]);

        let errors = FormErrors::from(&LoginForm::default().validate().expect_err("must be invalid"));
        assert_eq!(errors.field("username"), ["Обязательное поле.".to_string()]);
        assert_eq!(errors.field("password"), ["Обязательное поле.".to_string()]);
    }

    #[test]
    fn valid_form_binds_to_input() {
        let valid = form("  Новый пост ", " 3 ");
        valid.validate().expect("must be valid");

        let input = valid.to_input();
        assert_eq!(input.group_id, Some(3));
        assert!(valid.is_selected(&3));

        let no_group = form("text", "");
        assert_eq!(no_group.to_input().group_id, None);
    }

    #[test]
    fn form_prefills_from_post() {
        let post = Post::new(
            1,
            "Тестовый пост",
            Utc::now(),
            Author {
                id: 1,
                username: "auth".to_string(),
            },
            Some(GroupRef {
                id: 5,
                slug: "test-slug".to_string(),
                title: "Тестовая группа".to_string(),
            }),
        )
        .expect("valid post");

        let form = PostForm::from_post(&post);
        assert_eq!(form.text, "Тестовый пост");
        assert_eq!(form.group, "5");
    }

    #[test]
    fn domain_errors_map_to_fields() {
        let errors = FormErrors::from_domain(&DomainError::validation("group", "Выберите корректную группу."))
            .expect("validation is user-fixable");
        assert_eq!(errors.field("group"), ["Выберите корректную группу.".to_string()]);

        let errors = FormErrors::from_domain(&DomainError::AlreadyExists("username"))
            .expect("duplicates are user-fixable");
        assert_eq!(
            errors.field("username"),
            ["Пользователь с таким именем уже существует.".to_string()]
        );

        let errors =
            FormErrors::from_domain(&DomainError::InvalidCredentials).expect("credentials are user-fixable");
        assert_eq!(
            errors.non_field(),
            ["Введите правильные имя пользователя и пароль.".to_string()]
        );

        assert!(FormErrors::from_domain(&DomainError::Forbidden).is_none());
    }
}
