//! The SQL value union and backend escaping.
//!
//! A [`Value`] is either a literal (subject to masking), a raw SQL
//! expression (emitted verbatim, caller-trusted) or NULL. Raw passthrough
//! is strictly opt-in: a literal string that happens to read `"NOW()"` is
//! escaped like any other literal.

/// A value heading into a rendered statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A literal, masked according to the target column's metadata.
    Literal(String),
    /// A raw SQL expression, emitted unescaped. The caller is responsible
    /// for its safety.
    Raw(String),
    /// SQL NULL.
    Null,
}

impl Value {
    /// Creates a raw SQL expression value.
    #[must_use]
    pub fn raw(expression: impl Into<String>) -> Self {
        Self::Raw(expression.into())
    }

    /// The current-timestamp marker, emitted as `NOW()`.
    #[must_use]
    pub fn now() -> Self {
        Self::Raw(String::from("NOW()"))
    }

    /// Returns whether this is the raw variant.
    #[must_use]
    pub const fn is_raw(&self) -> bool {
        matches!(self, Self::Raw(_))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Literal(String::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Literal(v)
    }
}

macro_rules! value_from_display {
    ($($t:ty),+) => {
        $(impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Self::Literal(v.to_string())
            }
        })+
    };
}

value_from_display!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(inner) => inner.into(),
            None => Self::Null,
        }
    }
}

/// Escapes a string for inclusion in backend SQL text.
///
/// Matches the backend's `real_escape_string`: backslash escapes for NUL,
/// quotes, backslash, line breaks and Ctrl-Z.
#[must_use]
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '\0' => out.push_str("\\0"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\u{1a}' => out.push_str("\\Z"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        assert_eq!(Value::from("abc"), Value::Literal(String::from("abc")));
        assert_eq!(Value::from(42_i64), Value::Literal(String::from("42")));
        assert_eq!(Value::from(2.5_f64), Value::Literal(String::from("2.5")));
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::Literal(String::from("x")));
    }

    #[test]
    fn test_now_is_raw() {
        assert_eq!(Value::now(), Value::Raw(String::from("NOW()")));
        assert!(Value::now().is_raw());
        // A literal spelled the same way stays a literal.
        assert!(!Value::from("NOW()").is_raw());
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape("O'Brien"), "O\\'Brien");
        assert_eq!(escape("a\\b"), "a\\\\b");
        assert_eq!(escape("line\nbreak"), "line\\nbreak");
        assert_eq!(escape("say \"hi\""), "say \\\"hi\\\"");
    }

    #[test]
    fn test_escape_defuses_injection() {
        let malicious = "'; DROP TABLE users; --";
        assert_eq!(escape(malicious), "\\'; DROP TABLE users; --");
    }
}
