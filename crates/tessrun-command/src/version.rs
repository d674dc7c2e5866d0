//! Engine version parsing and ordering.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::CommandError;

/// Rank of an alphabetic version component.
///
/// Pre-release tags sort below every number, patch-level tags above.
fn tag_rank(tag: &str) -> u8 {
    match tag.to_ascii_lowercase().as_str() {
        "dev" => 1,
        "alpha" | "a" => 2,
        "beta" | "b" => 3,
        "rc" => 4,
        "pl" | "p" => 6,
        _ => 0,
    }
}

const NUMBER_RANK: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Component {
    Number(u64),
    Tag(String),
}

impl Component {
    fn rank(&self) -> u8 {
        match self {
            Self::Number(_) => NUMBER_RANK,
            Self::Tag(tag) => tag_rank(tag),
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// A Tesseract version as reported by `tesseract --version`.
///
/// Comparison is component-wise and numeric: `3.5` equals `3.05`, missing
/// trailing numbers count as zero, and pre-release tags order before the
/// release they precede (`3.03-rc1 < 3.03 < 3.03.1`).
///
/// ```rust
/// use tessrun_command::EngineVersion;
///
/// let installed: EngineVersion = "v4.1.1".parse().unwrap();
/// assert_eq!(installed.to_string(), "4.1.1");
/// assert!(installed >= "3.05".parse().unwrap());
/// assert!("3.03-rc1".parse::<EngineVersion>().unwrap() < "3.03".parse().unwrap());
/// ```
#[derive(Debug, Clone)]
pub struct EngineVersion {
    text: String,
    components: Vec<Component>,
}

impl EngineVersion {
    /// Parse a version string, tolerating a leading `v`.
    pub fn parse(raw: &str) -> Result<Self, CommandError> {
        let text = raw.trim();
        let text = text
            .strip_prefix('v')
            .or_else(|| text.strip_prefix('V'))
            .unwrap_or(text);

        let components = split_components(text);
        match components.first() {
            Some(Component::Number(_)) => Ok(Self {
                text: text.to_string(),
                components,
            }),
            _ => Err(CommandError::VersionUnparseable {
                output: raw.to_string(),
            }),
        }
    }

    /// Version text with any `v` prefix removed.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Major version number.
    #[must_use]
    pub fn major(&self) -> u64 {
        match self.components.first() {
            Some(Component::Number(n)) => *n,
            _ => 0,
        }
    }

    /// Whether this version is at least `minimum`.
    #[must_use]
    pub fn at_least(&self, minimum: &Self) -> bool {
        self >= minimum
    }
}

/// Split on `.`, `-`, `_`, `+` and on every digit/letter boundary.
fn split_components(text: &str) -> Vec<Component> {
    let mut components = Vec::new();
    let mut current = String::new();

    let flush = |current: &mut String, components: &mut Vec<Component>| {
        if current.is_empty() {
            return;
        }
        let part = std::mem::take(current);
        let component = if part.bytes().all(|b| b.is_ascii_digit()) {
            Component::Number(part.parse().unwrap_or(u64::MAX))
        } else {
            Component::Tag(part)
        };
        components.push(component);
    };

    for ch in text.chars() {
        if matches!(ch, '.' | '-' | '_' | '+') || ch.is_whitespace() {
            flush(&mut current, &mut components);
            continue;
        }
        let boundary = current
            .chars()
            .last()
            .is_some_and(|prev| prev.is_ascii_digit() != ch.is_ascii_digit());
        if boundary {
            flush(&mut current, &mut components);
        }
        current.push(ch);
    }
    flush(&mut current, &mut components);

    components
}

impl Ord for EngineVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let padding = Component::Number(0);
        let len = self.components.len().max(other.components.len());
        for i in 0..len {
            let ours = self.components.get(i).unwrap_or(&padding);
            let theirs = other.components.get(i).unwrap_or(&padding);
            match ours.compare(theirs) {
                Ordering::Equal => {}
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for EngineVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for EngineVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for EngineVersion {}

impl FromStr for EngineVersion {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for EngineVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Extract the version from `tesseract --version` output.
///
/// The banner is the first line of stdout. Engines before 4.0 print it to
/// stderr instead, so stderr is used when stdout is blank. The version is the
/// second whitespace-separated token (`tesseract 4.1.1`).
pub fn parse_version_banner(stdout: &str, stderr: &str) -> Result<EngineVersion, CommandError> {
    let source = if stdout.trim().is_empty() { stderr } else { stdout };
    let first_line = source.lines().next().unwrap_or_default();

    match first_line.split_whitespace().nth(1) {
        Some(token) => EngineVersion::parse(token).map_err(|_| CommandError::VersionUnparseable {
            output: first_line.to_string(),
        }),
        None => Err(CommandError::VersionUnparseable {
            output: first_line.to_string(),
        }),
    }
}
