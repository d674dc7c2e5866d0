//! Engine options and their version-dependent rendering.
//!
//! A [`TesseractOption`] records what the caller asked for. It only becomes
//! argv tokens once the installed engine version is known, through
//! [`TesseractOption::resolve`].

use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::Regex;
use strum::{AsRefStr, EnumString, VariantNames};

use crate::error::CommandError;
use crate::escape::escape;
use crate::version::EngineVersion;

/// Option names accepted by [`TesseractOption::from_name`].
///
/// Both the engine's flag spelling and the camel-case spelling are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr, VariantNames)]
#[strum(serialize_all = "kebab-case")]
pub enum OptionKind {
    Psm,
    Oem,
    #[strum(to_string = "user-words", serialize = "userWords")]
    UserWords,
    #[strum(to_string = "user-patterns", serialize = "userPatterns")]
    UserPatterns,
    #[strum(to_string = "tessdata-dir", serialize = "tessdataDir")]
    TessdataDir,
    Lang,
}

/// One configuration fragment of an engine invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TesseractOption {
    /// Page segmentation mode (0-13)
    Psm(u8),
    /// OCR engine mode (0-3)
    Oem(u8),
    UserWords(PathBuf),
    UserPatterns(PathBuf),
    TessdataDir(PathBuf),
    /// Languages, joined with `+`
    Lang(Vec<String>),
    /// Engine variable, passed as `-c key=value`
    Config { key: String, value: String },
    /// Single token passed through untouched
    Raw(String),
}

impl TesseractOption {
    #[must_use]
    pub fn lang<I, S>(languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Lang(languages.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn config(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Config {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Build an option from its name and a textual value.
    ///
    /// `lang` accepts several languages separated by `+` or `,`.
    pub fn from_name(name: &str, value: &str) -> Result<Self, CommandError> {
        let kind: OptionKind = name.parse().map_err(|_| CommandError::UnknownOption {
            name: name.to_string(),
        })?;

        let option = match kind {
            OptionKind::Psm => Self::Psm(parse_mode(kind, value)?),
            OptionKind::Oem => Self::Oem(parse_mode(kind, value)?),
            OptionKind::UserWords => Self::UserWords(PathBuf::from(value)),
            OptionKind::UserPatterns => Self::UserPatterns(PathBuf::from(value)),
            OptionKind::TessdataDir => Self::TessdataDir(PathBuf::from(value)),
            OptionKind::Lang => Self::lang(
                value
                    .split(['+', ','])
                    .map(str::trim)
                    .filter(|lang| !lang.is_empty()),
            ),
        };
        Ok(option)
    }

    /// Name used in diagnostics and version errors.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Psm(_) => "psm",
            Self::Oem(_) => "oem",
            Self::UserWords(_) => "user-words",
            Self::UserPatterns(_) => "user-patterns",
            Self::TessdataDir(_) => "tessdata-dir",
            Self::Lang(_) => "lang",
            Self::Config { .. } => "config",
            Self::Raw(_) => "raw",
        }
    }

    /// Oldest engine version that understands this option.
    #[must_use]
    pub fn minimum_version(&self) -> Option<&'static str> {
        match self {
            Self::Oem(_) => Some("3.05"),
            Self::UserWords(_) | Self::UserPatterns(_) => Some("3.04"),
            _ => None,
        }
    }

    /// Render this option for the engine at `version`.
    pub fn resolve(&self, version: &EngineVersion) -> Result<Fragment, CommandError> {
        if let Some(minimum) = self.minimum_version() {
            let required = EngineVersion::parse(minimum)?;
            if !version.at_least(&required) {
                return Err(CommandError::FeatureNotAvailable {
                    option: self.name().to_string(),
                    required: required.to_string(),
                    actual: version.to_string(),
                });
            }
        }

        let fragment = match self {
            // 4.0 renamed the single-dash flag
            Self::Psm(mode) => {
                let flag = if version.major() >= 4 { "--psm" } else { "-psm" };
                Fragment::bare([flag.to_string(), mode.to_string()])
            }
            Self::Oem(mode) => Fragment::bare(["--oem".to_string(), mode.to_string()]),
            Self::UserWords(path) => Fragment::flag_with_path("--user-words", path),
            Self::UserPatterns(path) => Fragment::flag_with_path("--user-patterns", path),
            Self::TessdataDir(path) => Fragment::flag_with_path("--tessdata-dir", path),
            Self::Lang(languages) => Fragment::bare(["-l".to_string(), languages.join("+")]),
            Self::Config { key, value } => Fragment {
                tokens: vec![
                    ArgToken::Bare("-c".into()),
                    ArgToken::Quoted(format!("{}={value}", to_snake_case(key)).into()),
                ],
            },
            Self::Raw(arg) => Fragment::bare([arg.clone()]),
        };
        Ok(fragment)
    }
}

fn parse_mode(kind: OptionKind, value: &str) -> Result<u8, CommandError> {
    value
        .trim()
        .parse()
        .map_err(|e| CommandError::InvalidOptionValue {
            option: kind.as_ref().to_string(),
            value: value.to_string(),
            reason: format!("{e}"),
        })
}

static UPPERCASE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z]+").expect("valid regex"));

/// Rewrite a mixed-case engine variable name to lower snake case.
///
/// Each run of capitals starts a new word: `tesseditCharWhitelist` becomes
/// `tessedit_char_whitelist` and `loadSystemDAWG` becomes `load_system_dawg`.
/// Names already in snake case come back unchanged.
#[must_use]
pub fn to_snake_case(name: &str) -> String {
    let snake = UPPERCASE_RUN.replace_all(name, |caps: &regex::Captures<'_>| {
        format!("_{}", caps[0].to_lowercase())
    });
    match snake.strip_prefix('_') {
        Some(rest) if !name.starts_with('_') => rest.to_string(),
        _ => snake.into_owned(),
    }
}

/// One argv element contributed by an option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgToken {
    /// Shown verbatim in the diagnostic command line
    Bare(OsString),
    /// Shown quoted in the diagnostic command line
    Quoted(OsString),
}

impl ArgToken {
    #[must_use]
    pub fn as_os_str(&self) -> &std::ffi::OsStr {
        match self {
            Self::Bare(token) | Self::Quoted(token) => token,
        }
    }

    #[must_use]
    pub fn into_os_string(self) -> OsString {
        match self {
            Self::Bare(token) | Self::Quoted(token) => token,
        }
    }
}

impl fmt::Display for ArgToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bare(token) => f.write_str(&token.to_string_lossy()),
            Self::Quoted(token) => f.write_str(&escape(&token.to_string_lossy())),
        }
    }
}

/// The argv tokens one option resolves to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    pub tokens: Vec<ArgToken>,
}

impl Fragment {
    fn bare<const N: usize>(tokens: [String; N]) -> Self {
        Self {
            tokens: tokens.into_iter().map(|t| ArgToken::Bare(t.into())).collect(),
        }
    }

    fn flag_with_path(flag: &str, path: &std::path::Path) -> Self {
        Self {
            tokens: vec![
                ArgToken::Bare(flag.into()),
                ArgToken::Quoted(path.as_os_str().to_owned()),
            ],
        }
    }

    /// The raw argv elements, without any quoting.
    #[must_use]
    pub fn args(&self) -> Vec<OsString> {
        self.tokens.iter().map(|t| t.as_os_str().to_owned()).collect()
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{token}")?;
        }
        Ok(())
    }
}
