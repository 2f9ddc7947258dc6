use std::cmp::Ordering;
use std::fmt;

/// A structured semantic version.
///
/// `label` carries pre-release/build metadata (`12.0.0-trunk`); a labelled
/// version is treated as unreleased and sorts below the equivalent release.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SemVer {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub label: Option<String>,
}

impl SemVer {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            label: None,
        }
    }

    pub fn is_release(&self) -> bool {
        self.label.is_none()
    }

    /// Next patch release: upper bound of the half-open range
    /// `[v, v.bump_patch())` used for "this version or a later patch" lookups.
    pub fn bump_patch(&self) -> SemVer {
        SemVer {
            major: self.major,
            minor: self.minor,
            patch: self.patch + 1,
            label: None,
        }
    }
}

impl Ord for SemVer {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.major, self.minor, self.patch)
            .cmp(&(other.major, other.minor, other.patch))
            .then_with(|| match (&self.label, &other.label) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Greater,
                (Some(_), None) => Ordering::Less,
                (Some(a), Some(b)) => a.cmp(b),
            })
    }
}

impl PartialOrd for SemVer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SemVer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(label) = &self.label {
            write!(f, "-{label}")?;
        }
        Ok(())
    }
}

/// A version string as reported by the remote service.
///
/// Parsing never fails: anything that is not structurally a semantic version
/// is retained verbatim as `Opaque` and supports equality comparison only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Version {
    Semantic(SemVer),
    Opaque(String),
}

impl Version {
    pub fn parse(text: &str) -> Version {
        match parse_semver(text.trim()) {
            Some(v) => Version::Semantic(v),
            None => Version::Opaque(text.to_string()),
        }
    }

    pub fn semantic(&self) -> Option<&SemVer> {
        match self {
            Version::Semantic(v) => Some(v),
            Version::Opaque(_) => None,
        }
    }
}

impl PartialOrd for Version {
    /// Ordering is defined for two structured versions only. An opaque version
    /// compares equal to itself and is otherwise not comparable: mixed
    /// comparisons fail closed rather than inventing an ordering.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Version::Semantic(a), Version::Semantic(b)) => Some(a.cmp(b)),
            (Version::Opaque(a), Version::Opaque(b)) if a == b => Some(Ordering::Equal),
            _ => None,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Version::Semantic(v) => fmt::Display::fmt(v, f),
            Version::Opaque(s) => f.write_str(s),
        }
    }
}

/// Minor and patch are optional (`"12"` and `"12.1"` are accepted); anything
/// after the first `-` or `+` becomes the label.
fn parse_semver(text: &str) -> Option<SemVer> {
    if text.is_empty() {
        return None;
    }

    let (numeric, label) = match text.find(|c| c == '-' || c == '+') {
        Some(pos) => {
            let label = &text[pos + 1..];
            if label.is_empty() {
                return None;
            }
            (&text[..pos], Some(label.to_string()))
        }
        None => (text, None),
    };

    let mut parts = numeric.split('.');
    let major = parse_component(parts.next()?)?;
    let minor = match parts.next() {
        Some(p) => parse_component(p)?,
        None => 0,
    };
    let patch = match parts.next() {
        Some(p) => parse_component(p)?,
        None => 0,
    };
    if parts.next().is_some() {
        return None;
    }

    Some(SemVer {
        major,
        minor,
        patch,
        label,
    })
}

fn parse_component(part: &str) -> Option<u64> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_and_partial_versions() {
        assert_eq!(
            Version::parse("11.2.0"),
            Version::Semantic(SemVer::new(11, 2, 0))
        );
        assert_eq!(
            Version::parse("12.1"),
            Version::Semantic(SemVer::new(12, 1, 0))
        );
        assert_eq!(Version::parse("12"), Version::Semantic(SemVer::new(12, 0, 0)));
    }

    #[test]
    fn keeps_label() {
        let v = Version::parse("12.0.0-trunk");
        let Version::Semantic(v) = v else {
            panic!("expected semantic version");
        };
        assert_eq!(v.label.as_deref(), Some("trunk"));
        assert!(!v.is_release());
    }

    #[test]
    fn falls_back_to_opaque() {
        assert_eq!(
            Version::parse("(latest)"),
            Version::Opaque("(latest)".to_string())
        );
        assert_eq!(
            Version::parse("1.2.3.4"),
            Version::Opaque("1.2.3.4".to_string())
        );
        assert_eq!(Version::parse(""), Version::Opaque(String::new()));
    }

    #[test]
    fn orders_by_numeric_tuple() {
        assert!(Version::parse("10.3.0") < Version::parse("11.2.0"));
        assert!(Version::parse("11.2.0") < Version::parse("11.10.0"));
    }

    #[test]
    fn prerelease_sorts_below_release() {
        assert!(Version::parse("12.0.0-trunk") < Version::parse("12.0.0"));
        // A higher-numbered pre-release still sorts above a lower release.
        assert!(Version::parse("12.0.0-trunk") > Version::parse("11.2.0"));
    }

    #[test]
    fn mixed_comparison_fails_closed() {
        let semantic = Version::parse("11.2.0");
        let opaque = Version::parse("(latest)");
        assert_eq!(semantic.partial_cmp(&opaque), None);
        assert_eq!(opaque.partial_cmp(&semantic), None);
        assert_eq!(
            opaque.partial_cmp(&Version::parse("(trunk)")),
            None
        );
        assert_eq!(
            opaque.partial_cmp(&Version::parse("(latest)")),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn bump_patch_clears_label() {
        let v = Version::parse("11.2.0").semantic().unwrap().bump_patch();
        assert_eq!(v, SemVer::new(11, 2, 1));
        let pre = Version::parse("12.0.0-trunk").semantic().unwrap().bump_patch();
        assert_eq!(pre, SemVer::new(12, 0, 1));
    }
}
