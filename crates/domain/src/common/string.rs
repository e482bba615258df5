//! String conversion utilities.

/// Trims `value` and converts an empty result to `None`.
///
/// Filter inputs and optional backend fields both arrive as possibly blank
/// strings; this gives them one representation.
///
/// # Examples
///
/// ```
/// use spellbook_domain::common::none_if_blank;
///
/// assert_eq!(none_if_blank(" fire "), Some("fire"));
/// assert_eq!(none_if_blank(""), None);
/// assert_eq!(none_if_blank("   "), None);
/// ```
pub fn none_if_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// Owned version of [`none_if_blank`].
///
/// # Examples
///
/// ```
/// use spellbook_domain::common::some_if_not_blank;
///
/// assert_eq!(some_if_not_blank(" bat guano ".to_string()), Some("bat guano".to_string()));
/// assert_eq!(some_if_not_blank(String::new()), None);
/// ```
pub fn some_if_not_blank(value: String) -> Option<String> {
    none_if_blank(&value).map(str::to_string)
}

/// Extension trait for strings providing `into_option` as a method.
pub trait StringExt {
    /// Converts this string to `None` if blank, otherwise the trimmed value.
    fn into_option(self) -> Option<String>;
}

impl StringExt for String {
    fn into_option(self) -> Option<String> {
        some_if_not_blank(self)
    }
}

impl StringExt for Option<String> {
    fn into_option(self) -> Option<String> {
        self.and_then(some_if_not_blank)
    }
}
