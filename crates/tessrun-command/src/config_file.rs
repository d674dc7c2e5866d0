use std::fmt;

use strum::EnumString;

/// Engine config file appended as the last command-line token.
///
/// The built-in names ship with every Tesseract install. `hocr`, `tsv` and
/// `pdf` also change the extension of the file the engine writes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumString)]
pub enum ConfigFile {
    #[strum(serialize = "digits")]
    Digits,
    #[strum(serialize = "hocr")]
    Hocr,
    #[strum(serialize = "pdf")]
    Pdf,
    #[strum(serialize = "quiet")]
    Quiet,
    #[strum(serialize = "tsv")]
    Tsv,
    #[strum(serialize = "txt")]
    Txt,
    /// A config file from the engine's `configs` directory or a path to one
    #[strum(default)]
    Custom(String),
}

impl ConfigFile {
    /// Names recognised as built-in config files.
    pub const BUILTIN: [&'static str; 6] = ["digits", "hocr", "pdf", "quiet", "tsv", "txt"];

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Digits => "digits",
            Self::Hocr => "hocr",
            Self::Pdf => "pdf",
            Self::Quiet => "quiet",
            Self::Tsv => "tsv",
            Self::Txt => "txt",
            Self::Custom(name) => name,
        }
    }

    #[must_use]
    pub fn is_builtin(&self) -> bool {
        !matches!(self, Self::Custom(_))
    }

    /// Extension of the output file the engine produces with this config.
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Hocr => "hocr",
            Self::Tsv => "tsv",
            Self::Pdf => "pdf",
            _ => "txt",
        }
    }
}

impl fmt::Display for ConfigFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ConfigFile {
    #[allow(clippy::should_implement_trait)]
    #[must_use]
    pub fn from(name: &str) -> Self {
        match name.parse() {
            Ok(config) => config,
            Err(_) => Self::Custom(name.to_string()),
        }
    }
}
