use crate::portal::TicketCategory;
use crate::portal::TicketPriority;
use nutype::nutype;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde::Serialize;
use std::str::FromStr;

static EMAIL: Lazy<Regex> = Lazy::new(|| compile(r"^[\w\-\.]+@([\w-]+\.)+[\w-]{2,}$"));
static PHONE: Lazy<Regex> = Lazy::new(|| compile(r"^\+?[1-9]\d{0,15}$"));
static NAME: Lazy<Regex> = Lazy::new(|| compile(r"^[a-zA-Z\s]+$"));

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("validation pattern should compile")
}

#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_min = 3),
    derive(Debug, Clone, PartialEq, Display, AsRef)
)]
pub struct Username(String);

#[nutype(
    sanitize(trim),
    validate(len_char_min = 5, len_char_max = 100),
    derive(Debug, Clone, PartialEq, Display, AsRef)
)]
pub struct TicketTitle(String);

#[derive(Deserialize, Default, Clone)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub next: Option<String>,
}

pub fn validate_login(form: &LoginForm) -> Result<Username, Vec<String>> {
    let mut errors = Vec::new();

    let username = match Username::try_new(form.username.as_str()) {
        Ok(u) => Some(u),
        Err(_) if form.username.trim().is_empty() => {
            errors.push("Username is required".to_string());
            None
        }
        Err(UsernameError::NotEmptyViolated) => {
            errors.push("Username is required".to_string());
            None
        }
        Err(UsernameError::LenCharMinViolated) => {
            errors.push("Username must be at least 3 characters".to_string());
            None
        }
    };

    if form.password.is_empty() {
        errors.push("Password is required".to_string());
    }

    match username {
        Some(u) if errors.is_empty() => Ok(u),
        _ => Err(errors),
    }
}

#[derive(Deserialize, Default, Clone)]
pub struct TicketForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub priority: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TicketDraft {
    pub title: TicketTitle,
    pub category: TicketCategory,
    pub priority: TicketPriority,
    pub description: String,
}

pub fn validate_ticket(form: &TicketForm) -> Result<TicketDraft, Vec<String>> {
    let required = [
        &form.title,
        &form.category,
        &form.priority,
        &form.description,
    ];
    if required.iter().any(|field| field.trim().is_empty()) {
        return Err(vec!["Please fill in all required fields".to_string()]);
    }

    let mut errors = Vec::new();

    let title = match TicketTitle::try_new(form.title.as_str()) {
        Ok(t) => Some(t),
        Err(TicketTitleError::LenCharMinViolated) => {
            errors.push("Title must be at least 5 characters".to_string());
            None
        }
        Err(TicketTitleError::LenCharMaxViolated) => {
            errors.push("Title must not exceed 100 characters".to_string());
            None
        }
    };

    let description = form.description.trim();
    let description_len = description.chars().count();
    if description_len < 10 {
        errors.push("Description must be at least 10 characters".to_string());
    } else if description_len > 1000 {
        errors.push("Description must not exceed 1000 characters".to_string());
    }

    let priority = TicketPriority::from_str(&form.priority).ok();
    if priority.is_none() {
        errors.push("Priority is required".to_string());
    }

    let category = TicketCategory::from_str(&form.category).ok();
    if category.is_none() {
        errors.push("Category is required".to_string());
    }

    match (title, category, priority) {
        (Some(title), Some(category), Some(priority)) if errors.is_empty() => Ok(TicketDraft {
            title,
            category,
            priority,
            description: description.to_string(),
        }),
        _ => Err(errors),
    }
}

fn check_name(name: &str, errors: &mut Vec<String>) {
    let len = name.chars().count();
    if len < 2 {
        errors.push("Name must be at least 2 characters".to_string());
    } else if len > 50 {
        errors.push("Name must not exceed 50 characters".to_string());
    } else if !NAME.is_match(name) {
        errors.push("Name can only contain letters and spaces".to_string());
    }
}

fn check_email(email: &str, errors: &mut Vec<String>) {
    if email.is_empty() {
        errors.push("Email is required".to_string());
    } else if !EMAIL.is_match(email) {
        errors.push("Please enter a valid email address".to_string());
    }
}

fn check_bounded(
    value: &str,
    field: &str,
    min: usize,
    max: usize,
    errors: &mut Vec<String>,
) {
    let len = value.chars().count();
    if len < min {
        errors.push(format!("{} must be at least {} characters", field, min));
    } else if len > max {
        errors.push(format!("{} must not exceed {} characters", field, max));
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct ProfileForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub position: String,
}

/// Phone numbers are optional; formatting characters are ignored.
pub fn validate_profile(form: &ProfileForm) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    check_name(&form.name, &mut errors);
    check_email(&form.email, &mut errors);

    let digits: String = form
        .phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();
    if !digits.is_empty() && !PHONE.is_match(&digits) {
        errors.push("Please enter a valid phone number".to_string());
    }

    if form.department.trim().is_empty() {
        errors.push("Department is required".to_string());
    }
    if form.position.trim().is_empty() {
        errors.push("Position is required".to_string());
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

pub fn validate_contact(form: &ContactForm) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    check_name(&form.name, &mut errors);
    check_email(&form.email, &mut errors);
    check_bounded(form.subject.trim(), "Subject", 5, 100, &mut errors);
    check_bounded(form.message.trim(), "Message", 10, 500, &mut errors);

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(title: &str, category: &str, priority: &str, description: &str) -> TicketForm {
        TicketForm {
            title: title.into(),
            category: category.into(),
            priority: priority.into(),
            description: description.into(),
        }
    }

    #[test]
    fn test_login_validation() {
        let ok = LoginForm {
            username: " manager ".into(),
            password: "manager".into(),
            next: None,
        };
        assert_eq!(
            validate_login(&ok).map(|u| u.to_string()),
            Ok("manager".to_string())
        );

        let empty = LoginForm::default();
        assert_eq!(
            validate_login(&empty),
            Err(vec![
                "Username is required".to_string(),
                "Password is required".to_string()
            ])
        );

        let short = LoginForm {
            username: "ab".into(),
            password: "x".into(),
            next: None,
        };
        assert_eq!(
            validate_login(&short),
            Err(vec!["Username must be at least 3 characters".to_string()])
        );
    }

    #[test]
    fn test_ticket_requires_every_field() {
        for form in [
            ticket("", "safety", "high", "Loose railing on the mezzanine"),
            ticket("Loose railing", "", "high", "Loose railing on the mezzanine"),
            ticket("Loose railing", "safety", "", "Loose railing on the mezzanine"),
            ticket("Loose railing", "safety", "high", "   "),
        ] {
            assert_eq!(
                validate_ticket(&form),
                Err(vec!["Please fill in all required fields".to_string()])
            );
        }
    }

    #[test]
    fn test_ticket_field_rules() {
        let errors = validate_ticket(&ticket("Hi", "cafeteria", "whenever", "too short"))
            .expect_err("every field is invalid");
        assert_eq!(
            errors,
            vec![
                "Title must be at least 5 characters".to_string(),
                "Description must be at least 10 characters".to_string(),
                "Priority is required".to_string(),
                "Category is required".to_string(),
            ]
        );

        let long_title = "x".repeat(101);
        let errors = validate_ticket(&ticket(&long_title, "safety", "low", "A long enough text"))
            .expect_err("title is too long");
        assert_eq!(errors, vec!["Title must not exceed 100 characters".to_string()]);
    }

    #[test]
    fn test_valid_ticket() {
        let draft = validate_ticket(&ticket(
            "  Loose railing  ",
            "safety",
            "urgent",
            "The railing on the mezzanine moves when leaned on.",
        ))
        .expect("ticket should be valid");

        assert_eq!(draft.title.as_ref(), "Loose railing");
        assert_eq!(draft.category, TicketCategory::Safety);
        assert_eq!(draft.priority, TicketPriority::Urgent);
    }

    #[test]
    fn test_profile_validation() {
        let mut form = ProfileForm {
            name: "John Smith".into(),
            email: "john.smith@company.com".into(),
            phone: "+1 (555) 987-6543".into(),
            department: "Manufacturing".into(),
            position: "Senior Technician".into(),
        };
        assert_eq!(validate_profile(&form), Ok(()));

        form.phone = String::new();
        assert_eq!(validate_profile(&form), Ok(()));

        form.name = "J0hn".into();
        form.email = "john@company".into();
        form.phone = "0123".into();
        form.position = " ".into();
        assert_eq!(
            validate_profile(&form),
            Err(vec![
                "Name can only contain letters and spaces".to_string(),
                "Please enter a valid email address".to_string(),
                "Please enter a valid phone number".to_string(),
                "Position is required".to_string(),
            ])
        );
    }

    #[test]
    fn test_contact_validation() {
        let form = ContactForm {
            name: "Jane Doe".into(),
            email: "jane@tee1104.org".into(),
            subject: "Shift swap".into(),
            message: "Can I swap my Friday shift?".into(),
        };
        assert_eq!(validate_contact(&form), Ok(()));

        let form = ContactForm {
            name: "J".into(),
            email: String::new(),
            subject: "Hi".into(),
            message: "x".repeat(501),
        };
        assert_eq!(
            validate_contact(&form),
            Err(vec![
                "Name must be at least 2 characters".to_string(),
                "Email is required".to_string(),
                "Subject must be at least 5 characters".to_string(),
                "Message must not exceed 500 characters".to_string(),
            ])
        );
    }
}
