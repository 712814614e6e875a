use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref CANNOT_FIND_NAME: Regex =
        Regex::new(r#"Cannot find name ['"](.*?)['"]\."#).expect("diagnostic pattern is valid");
}

/// Identifier named by a TypeScript "Cannot find name" diagnostic.
pub fn missing_name(message: &str) -> Option<&str> {
    CANNOT_FIND_NAME
        .captures(message)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|name| !name.is_empty())
}
