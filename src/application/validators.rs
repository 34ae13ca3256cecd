use validator::ValidateEmail;

/// Validates that the input looks like a valid email address
pub fn is_valid_email(email: &str) -> bool {
    let email = email.trim();
    !email.is_empty() && email.validate_email()
}

/// Validates a shop slug used in public booking URLs.
/// Rules:
/// - 3-50 characters
/// - Only lowercase ASCII letters, numbers and hyphens
/// - Must start and end with a letter or number
pub fn is_valid_shop_slug(slug: &str) -> bool {
    if slug.len() < 3 || slug.len() > 50 {
        return false;
    }

    let is_edge_ok = |c: Option<char>| matches!(c, Some(c) if c.is_ascii_lowercase() || c.is_ascii_digit());
    if !is_edge_ok(slug.chars().next()) || !is_edge_ok(slug.chars().last()) {
        return false;
    }

    slug.chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Phone numbers may contain digits, spaces, dashes, parentheses and a
/// leading plus, and must carry at least 10 digits.
pub fn is_valid_phone(phone: &str) -> bool {
    let phone = phone.trim();
    let allowed = phone
        .chars()
        .enumerate()
        .all(|(i, c)| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')') || (i == 0 && c == '+'));
    allowed && phone.chars().filter(|c| c.is_ascii_digit()).count() >= 10
}

/// Shop and person names need at least 3 visible characters.
pub fn is_valid_name(name: &str) -> bool {
    name.trim().chars().count() >= 3
}
