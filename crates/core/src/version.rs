//! Dotted-numeric version comparison.
//!
//! Adventure packages declare a content version ("game version") and a
//! builder compatibility version. Resubmissions by the owning author must
//! carry a strictly higher game version than the currently approved record,
//! so ordering has to be well-defined and malformed strings have to surface
//! as a validation error rather than a panic.

use std::cmp::Ordering;

/// Error returned when a version string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    #[error("invalid version format: '{0}'")]
    InvalidFormat(String),
}

/// One dot-separated component: a numeric part plus an optional
/// alphanumeric suffix ("1", "0", "3rc1").
#[derive(Debug, Clone, PartialEq, Eq)]
struct Component {
    numeric: u64,
    suffix: String,
}

/// A parsed version identifier.
///
/// Components compare numerically first, then lexically on the suffix.
/// Missing trailing components count as zero, so "1.0" == "1.0.0".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Version {
    components: Vec<Component>,
}

impl Version {
    /// Parse a dotted version string.
    ///
    /// Every component must be non-empty and start with an ASCII digit;
    /// anything after the leading digits is kept as a lexical suffix.
    pub fn parse(raw: &str) -> Result<Self, VersionError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(VersionError::InvalidFormat(raw.to_string()));
        }

        let mut components = Vec::new();
        for part in trimmed.split('.') {
            let digits: String = part.chars().take_while(|c| c.is_ascii_digit()).collect();
            if digits.is_empty() {
                return Err(VersionError::InvalidFormat(raw.to_string()));
            }
            let numeric: u64 = digits
                .parse()
                .map_err(|_| VersionError::InvalidFormat(raw.to_string()))?;
            let suffix = part[digits.len()..].to_string();
            components.push(Component { numeric, suffix });
        }

        Ok(Version { components })
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        let zero = Component {
            numeric: 0,
            suffix: String::new(),
        };
        for i in 0..len {
            let a = self.components.get(i).unwrap_or(&zero);
            let b = other.components.get(i).unwrap_or(&zero);
            match a.numeric.cmp(&b.numeric).then_with(|| a.suffix.cmp(&b.suffix)) {
                Ordering::Equal => continue,
                non_eq => return non_eq,
            }
        }
        Ordering::Equal
    }
}

/// Compare two version strings, failing if either is malformed.
pub fn compare_versions(a: &str, b: &str) -> Result<Ordering, VersionError> {
    Ok(Version::parse(a)?.cmp(&Version::parse(b)?))
}

/// Whether `candidate` is strictly greater than `current`.
pub fn is_strictly_greater(candidate: &str, current: &str) -> Result<bool, VersionError> {
    Ok(compare_versions(candidate, current)? == Ordering::Greater)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn higher_major_wins() {
        assert_eq!(compare_versions("2.0.0", "1.9.9").unwrap(), Ordering::Greater);
    }

    #[test]
    fn trailing_zero_components_are_equal() {
        assert_eq!(compare_versions("1.0", "1.0.0").unwrap(), Ordering::Equal);
    }

    #[test]
    fn non_numeric_leading_component_is_invalid() {
        assert_matches!(
            compare_versions("abc", "1.0"),
            Err(VersionError::InvalidFormat(_))
        );
    }

    #[test]
    fn empty_string_is_invalid() {
        assert_matches!(Version::parse(""), Err(VersionError::InvalidFormat(_)));
        assert_matches!(Version::parse("   "), Err(VersionError::InvalidFormat(_)));
    }

    #[test]
    fn empty_component_is_invalid() {
        assert_matches!(Version::parse("1..0"), Err(VersionError::InvalidFormat(_)));
        assert_matches!(Version::parse("1.0."), Err(VersionError::InvalidFormat(_)));
    }

    #[test]
    fn numeric_compare_beats_lexical() {
        // "10" > "9" numerically even though "10" < "9" lexically.
        assert_eq!(compare_versions("1.10", "1.9").unwrap(), Ordering::Greater);
    }

    #[test]
    fn suffix_breaks_numeric_ties_lexically() {
        assert_eq!(compare_versions("1.0a", "1.0b").unwrap(), Ordering::Less);
        assert_eq!(compare_versions("1.0rc1", "1.0rc1").unwrap(), Ordering::Equal);
        // A bare component sorts before one with a suffix.
        assert_eq!(compare_versions("1.0", "1.0a").unwrap(), Ordering::Less);
    }

    #[test]
    fn strictly_greater_helper() {
        assert!(is_strictly_greater("2.0.0", "1.0.0").unwrap());
        assert!(!is_strictly_greater("1.0.0", "1.0.0").unwrap());
        assert!(!is_strictly_greater("0.9", "1.0").unwrap());
    }

    #[test]
    fn whitespace_is_tolerated() {
        assert_eq!(compare_versions(" 1.2.3 ", "1.2.3").unwrap(), Ordering::Equal);
    }
}
