//! Id shape validation shared by every primitive that introduces a new id.

/// Entity/schema/constraint ids must be non-empty, snake_case-ish (ascii
/// alphanumeric plus underscore), and must not collide with the reserved
/// `"root"` name.
pub fn valid_id(id: &str) -> bool {
    !id.is_empty()
        && id != "root"
        && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && id.chars().next().is_some_and(|c| !c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_snake_case() {
        assert!(valid_id("player_mike"));
        assert!(valid_id("a"));
    }

    #[test]
    fn rejects_reserved_and_malformed() {
        assert!(!valid_id("root"));
        assert!(!valid_id(""));
        assert!(!valid_id("has space"));
        assert!(!valid_id("1leading_digit"));
        assert!(!valid_id("dotted.name"));
    }
}
