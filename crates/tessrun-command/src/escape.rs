//! Data-level quoting of command-line tokens.
//!
//! The engine is always launched with a discrete argv, so nothing here guards
//! a shell. Quoting only shapes the diagnostic command line carried in error
//! messages and `--dry-run` output, which must read back to the exact tokens.

/// Quoting dialect for rendered command lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// `cmd.exe`-style: backslash is a path separator and stays literal
    Windows,
    /// POSIX shells: backslash itself must be escaped inside double quotes
    Posix,
}

impl Platform {
    /// Dialect of the platform this binary was compiled for.
    #[must_use]
    pub const fn host() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Posix
        }
    }

    const fn escaped_chars(self) -> &'static [char] {
        match self {
            Self::Windows => &['$', '"', '`'],
            Self::Posix => &['$', '"', '\\', '`'],
        }
    }
}

/// Quote `token` for the host platform.
#[must_use]
pub fn escape(token: &str) -> String {
    escape_for(Platform::host(), token)
}

/// Wrap `token` in double quotes, backslash-escaping the characters that stay
/// special inside double quotes on `platform`.
///
/// ```rust
/// use tessrun_command::escape::{escape_for, Platform};
///
/// assert_eq!(escape_for(Platform::Posix, r#"my "scan" $1.png"#), r#""my \"scan\" \$1.png""#);
/// assert_eq!(escape_for(Platform::Windows, r"C:\scans\a.png"), r#""C:\scans\a.png""#);
/// ```
#[must_use]
pub fn escape_for(platform: Platform, token: &str) -> String {
    let specials = platform.escaped_chars();
    let mut quoted = String::with_capacity(token.len() + 2);
    quoted.push('"');
    for ch in token.chars() {
        if specials.contains(&ch) {
            quoted.push('\\');
        }
        quoted.push(ch);
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_escape_plain_path() {
        assert_eq!(escape_for(Platform::Posix, "/tmp/x.png"), "\"/tmp/x.png\"");
    }

    #[test]
    fn test_escape_posix_specials() {
        assert_eq!(
            escape_for(Platform::Posix, "a$b\"c\\d`e"),
            "\"a\\$b\\\"c\\\\d\\`e\""
        );
    }

    #[test]
    fn test_escape_windows_keeps_backslash() {
        assert_eq!(
            escape_for(Platform::Windows, "C:\\Program Files\\Tesseract-OCR\\tesseract.exe"),
            "\"C:\\Program Files\\Tesseract-OCR\\tesseract.exe\""
        );
        assert_eq!(escape_for(Platform::Windows, "$\"`"), "\"\\$\\\"\\`\"");
    }

    #[test]
    fn test_escape_empty() {
        assert_eq!(escape_for(Platform::Posix, ""), "\"\"");
    }

    #[test]
    fn test_escape_non_ascii_untouched() {
        assert_eq!(escape_for(Platform::Posix, "könyv ñ 文字.png"), "\"könyv ñ 文字.png\"");
    }

    proptest! {
        #[test]
        fn prop_posix_escape_parses_back(token in "\\PC*") {
            let parsed = shell_words::split(&escape_for(Platform::Posix, &token)).unwrap();
            prop_assert_eq!(parsed, vec![token]);
        }

        #[test]
        fn prop_escape_always_quoted(token in ".*") {
            let quoted = escape_for(Platform::Windows, &token);
            prop_assert!(quoted.starts_with('"'));
            prop_assert!(quoted.ends_with('"'));
            prop_assert!(quoted.len() >= token.len() + 2);
        }
    }
}
