//! String utility functions.

use rand::Rng;

/// Lowercase ascii letters and digits.
pub const RANDOM_STRING_CHARS: &str = "abcdefghijklmnopqrstuvwxyz0123456789";

/// Truncates a string to at most `n` characters.
///
/// If the string is longer than `n`, it is truncated and an ellipsis (`…`)
/// is appended so that the result is exactly `n` characters long.
///
/// # Examples
///
/// ```
/// use plugform_core::utils::text::truncate_chars;
///
/// assert_eq!(truncate_chars("Hello, World!", 5), "Hell…");
/// assert_eq!(truncate_chars("Hi", 10), "Hi");
/// ```
pub fn truncate_chars(s: &str, n: usize) -> String {
    if s.chars().count() <= n {
        return s.to_string();
    }
    if n == 0 {
        return String::new();
    }
    let mut result: String = s.chars().take(n - 1).collect();
    result.push('…');
    result
}

/// Returns a random string of `length` characters drawn from `allowed_chars`.
///
/// # Panics
///
/// Panics if `allowed_chars` is empty.
///
/// ```
/// use plugform_core::utils::text::{get_random_string, RANDOM_STRING_CHARS};
///
/// let token = get_random_string(10, RANDOM_STRING_CHARS);
/// assert_eq!(token.len(), 10);
/// ```
pub fn get_random_string(length: usize, allowed_chars: &str) -> String {
    let chars: Vec<char> = allowed_chars.chars().collect();
    assert!(!chars.is_empty(), "allowed_chars must not be empty");
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| chars[rng.gen_range(0..chars.len())])
        .collect()
}
