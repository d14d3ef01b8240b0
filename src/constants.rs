pub const MAX_EMAIL_CHARS: usize = 255;
pub const MAX_NAME_CHARS: usize = 255;
pub const MIN_PASSWORD_CHARS: usize = 5;

/// Prices are NUMERIC(5, 2): at most 999.99.
pub const PRICE_DECIMAL_PLACES: u32 = 2;
pub const PRICE_MAX_DIGITS: u32 = 5;

pub const MAX_BODY_BYTES: u64 = 64 * 1024;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:8000";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_SESSION_LIFETIME_MINUTES: i64 = 60;
/// One year.
pub const MAX_SESSION_LIFETIME_MINUTES: i64 = 60 * 24 * 365;
pub const GENERATED_SECRET_CHARS: usize = 48;
