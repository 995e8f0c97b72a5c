//! Sensitive data marker for automatic redaction
//!
//! Developer-site passwords and API tokens travel through config structs,
//! client state and error paths. Wrapping them in `Sensitive<T>` keeps them
//! out of `Debug`/`Display` output, and therefore out of logs.

use std::fmt;

/// Wrapper for sensitive data that redacts itself in Debug and Display
///
/// # Example
///
/// ```
/// use clandiff_core_types::Sensitive;
///
/// let password = Sensitive::new("hunter2");
/// assert_eq!(format!("{:?}", password), "***REDACTED***");
/// assert_eq!(format!("{}", password), "***REDACTED***");
///
/// // Access the actual value when needed
/// assert_eq!(password.expose(), &"hunter2");
/// ```
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    /// Wrap a sensitive value
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Expose the underlying sensitive value
    ///
    /// Only call this at the point the secret is put on the wire.
    pub fn expose(&self) -> &T {
        &self.0
    }

    /// Consume the wrapper and return the inner value
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***REDACTED***")
    }
}

impl<T> fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***REDACTED***")
    }
}

impl<T: Clone> Clone for Sensitive<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: PartialEq> PartialEq for Sensitive<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensitive_debug_redaction() {
        let secret = Sensitive::new("dev-site-password");
        let debug_str = format!("{:?}", secret);
        assert_eq!(debug_str, "***REDACTED***");
        assert!(!debug_str.contains("dev-site-password"));
    }

    #[test]
    fn test_sensitive_display_redaction() {
        let token = Sensitive::new("eyJ0eXAiOiJKV1Qi.api-token");
        let display_str = format!("{}", token);
        assert_eq!(display_str, "***REDACTED***");
        assert!(!display_str.contains("api-token"));
    }

    #[test]
    fn test_sensitive_expose_and_into_inner() {
        let secret = Sensitive::new(String::from("pw"));
        assert_eq!(secret.expose(), "pw");
        assert_eq!(secret.into_inner(), "pw");
    }

    #[test]
    fn test_sensitive_equality_compares_inner() {
        assert_eq!(Sensitive::new("a"), Sensitive::new("a"));
        assert_ne!(Sensitive::new("a"), Sensitive::new("b"));
    }

    #[test]
    fn test_sensitive_inside_credentials_struct() {
        #[derive(Debug)]
        #[allow(dead_code)]
        struct Credentials {
            email: String,
            password: Sensitive<String>,
        }

        let creds = Credentials {
            email: "chief@example.com".to_string(),
            password: Sensitive::new("secret123".to_string()),
        };

        let debug_str = format!("{:?}", creds);
        assert!(debug_str.contains("chief@example.com"));
        assert!(debug_str.contains("***REDACTED***"));
        assert!(!debug_str.contains("secret123"));
    }
}
