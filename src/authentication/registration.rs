use crate::{
    authentication::cryptography::hash_password,
    error::{Error, ErrorKind},
    schema::{NewUser, User},
    store::ResourceStore,
    validation::{normalize_email, validate_email_field, validate_password_field, validate_text_field},
};

/// Validates and stores a new account. The password is hashed before it
/// reaches the store.
pub async fn create_user(
    store: &dyn ResourceStore,
    email: &str,
    password: &str,
    name: &str,
) -> Result<User, Error> {
    validate_email_field(email)?;
    validate_password_field(password)?;
    validate_text_field("Name", name, false)?;

    let email = normalize_email(email);
    if store.get_user_by_email(&email).await?.is_some() {
        return Err(ErrorKind::Validation.new("user with this email already exists."));
    }

    let password = hash_password(password).map_err(|e| {
        log::error!("Password hashing failed: {e}");
        ErrorKind::Internal.default()
    })?;

    let user = store
        .create_user(NewUser {
            email,
            name: name.trim().to_string(),
            password,
        })
        .await?;

    log::info!("Registered user {}", user.id);
    Ok(user)
}
