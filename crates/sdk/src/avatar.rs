use url::Url;

use crate::model::User;

/// Placeholder avatar service.
pub const AVATAR_BASE_URL: &str = "https://ui-avatars.com/api/";

/// Avatar used when there is no name to derive initials from.
pub const PLACEHOLDER_AVATAR_URL: &str = "https://ui-avatars.com/api/?background=random";

/// Get the avatar URI of a user: the profile picture when present, otherwise
/// a placeholder derived from the name.
pub fn avatar_url(user: &User) -> String {
    match user.profile_pic() {
        Some(pic) => pic.to_string(),
        None => initials_url(&user.name),
    }
}

/// Deterministic initials avatar for a name.
pub fn initials_url(name: &str) -> String {
    if name.is_empty() {
        return PLACEHOLDER_AVATAR_URL.to_string();
    }
    match Url::parse_with_params(AVATAR_BASE_URL, [("name", name), ("background", "random")]) {
        Ok(url) => url.into(),
        Err(_) => PLACEHOLDER_AVATAR_URL.to_string(),
    }
}
