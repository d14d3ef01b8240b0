use rust_decimal::Decimal;
use validator::ValidateEmail;

use crate::{
    constants::{
        MAX_EMAIL_CHARS, MAX_NAME_CHARS, MIN_PASSWORD_CHARS, PRICE_DECIMAL_PLACES,
        PRICE_MAX_DIGITS,
    },
    error::{Error, ErrorKind},
    schema::{RecipeDraft, RecipePatch},
};

/// Validate user email input
pub fn validate_email_field(email: &str) -> Result<(), Error> {
    let trimmed = email.trim();
    if trimmed.is_empty() {
        return Err(ErrorKind::Validation.new("Email is required"));
    }
    if trimmed.chars().count() > MAX_EMAIL_CHARS {
        return Err(ErrorKind::Validation.new(&format!(
            "Email must be at most {} characters",
            MAX_EMAIL_CHARS
        )));
    }
    if !trimmed.validate_email() {
        return Err(ErrorKind::Validation.new("Email format is invalid"));
    }
    Ok(())
}

/// Lower-cases the domain part, leaves the local part as typed.
pub fn normalize_email(email: &str) -> String {
    let trimmed = email.trim();
    match trimmed.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => trimmed.to_string(),
    }
}

pub fn validate_password_field(password: &str) -> Result<(), Error> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(ErrorKind::Validation.new(&format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_CHARS
        )));
    }
    Ok(())
}

/// Names, titles and links: at most 255 characters, non-blank when required.
pub fn validate_text_field(label: &str, value: &str, required: bool) -> Result<(), Error> {
    if required && value.trim().is_empty() {
        return Err(ErrorKind::Validation.new(&format!("{} may not be blank", label)));
    }
    if value.chars().count() > MAX_NAME_CHARS {
        return Err(ErrorKind::Validation.new(&format!(
            "{} must be at most {} characters",
            label, MAX_NAME_CHARS
        )));
    }
    Ok(())
}

pub fn validate_time_minutes(time_minutes: i32) -> Result<(), Error> {
    if time_minutes < 0 {
        return Err(ErrorKind::Validation.new("Time must not be negative"));
    }
    Ok(())
}

pub fn validate_price(price: Decimal) -> Result<(), Error> {
    if price.is_sign_negative() {
        return Err(ErrorKind::Validation.new("Price must not be negative"));
    }
    if price.scale() > PRICE_DECIMAL_PLACES {
        return Err(ErrorKind::Validation.new(&format!(
            "Price must have no more than {} decimal places",
            PRICE_DECIMAL_PLACES
        )));
    }
    let limit = Decimal::from(10i64.pow(PRICE_MAX_DIGITS - PRICE_DECIMAL_PLACES));
    if price >= limit {
        return Err(ErrorKind::Validation.new(&format!(
            "Price must have no more than {} digits",
            PRICE_MAX_DIGITS
        )));
    }
    Ok(())
}

fn validate_names(label: &str, names: &[String]) -> Result<(), Error> {
    names
        .iter()
        .try_for_each(|name| validate_text_field(label, name, true))
}

pub fn validate_recipe_draft(draft: &RecipeDraft) -> Result<(), Error> {
    validate_text_field("Title", &draft.title, true)?;
    validate_time_minutes(draft.time_minutes)?;
    validate_price(draft.price)?;
    validate_text_field("Link", &draft.link, false)?;
    validate_names("Tag name", &draft.tags)?;
    validate_names("Ingredient name", &draft.ingredients)
}

pub fn validate_recipe_patch(patch: &RecipePatch) -> Result<(), Error> {
    if let Some(title) = &patch.title {
        validate_text_field("Title", title, true)?;
    }
    if let Some(time_minutes) = patch.time_minutes {
        validate_time_minutes(time_minutes)?;
    }
    if let Some(price) = patch.price {
        validate_price(price)?;
    }
    if let Some(link) = &patch.link {
        validate_text_field("Link", link, false)?;
    }
    if let Some(tags) = &patch.tags {
        validate_names("Tag name", tags)?;
    }
    if let Some(ingredients) = &patch.ingredients {
        validate_names("Ingredient name", ingredients)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_email() {
        assert!(validate_email_field("user@example.com").is_ok());
    }

    #[test]
    fn rejects_malformed_email() {
        let err = validate_email_field("not-an-email").expect_err("format");
        assert_eq!(err.info, "Email format is invalid");

        let err = validate_email_field("   ").expect_err("blank");
        assert_eq!(err.info, "Email is required");
    }

    #[test]
    fn normalizes_domain_only() {
        assert_eq!(normalize_email(" Test@EXAMPLE.com "), "Test@example.com");
    }

    #[test]
    fn rejects_short_password() {
        assert!(validate_password_field("pw").is_err());
        assert!(validate_password_field("testpass123").is_ok());
    }

    #[test]
    fn price_limits() {
        assert!(validate_price(Decimal::new(250, 2)).is_ok());
        assert!(validate_price(Decimal::new(99999, 2)).is_ok());
        assert!(validate_price(Decimal::new(100000, 2)).is_err());
        assert!(validate_price(Decimal::new(2505, 3)).is_err());
        assert!(validate_price(Decimal::new(-1, 0)).is_err());
    }

    #[test]
    fn blank_names_are_rejected() {
        assert!(validate_text_field("Name", "", true).is_err());
        assert!(validate_text_field("Link", "", false).is_ok());
        assert!(validate_text_field("Name", &"x".repeat(256), true).is_err());
    }

    #[test]
    fn patch_only_checks_present_fields() {
        assert!(validate_recipe_patch(&RecipePatch::default()).is_ok());

        let patch = RecipePatch {
            time_minutes: Some(-1),
            ..Default::default()
        };
        assert!(validate_recipe_patch(&patch).is_err());
    }
}
