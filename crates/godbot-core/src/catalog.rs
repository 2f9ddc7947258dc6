//! Compiler catalog: descriptors for the remote compiler list plus derived
//! command aliases ("latest" per toolchain, trimmed-version shortcuts).
//!
//! Built once at startup and shared read-only afterwards; lookups never
//! mutate it.

use regex::Regex;
use tracing::debug;

use crate::errors::{Error, Result};
use crate::explorer::types::CompilerListing;
use crate::version::{SemVer, Version};

/// Compiler family, derived from the remote identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Toolchain {
    Gcc,
    Clang,
}

impl Toolchain {
    pub const ALL: [Toolchain; 2] = [Toolchain::Gcc, Toolchain::Clang];

    pub fn as_str(&self) -> &'static str {
        match self {
            Toolchain::Gcc => "gcc",
            Toolchain::Clang => "clang",
        }
    }

    /// Parse a user-typed toolchain token.
    pub fn parse(s: &str) -> Option<Toolchain> {
        match s {
            "gcc" => Some(Toolchain::Gcc),
            "clang" => Some(Toolchain::Clang),
            _ => None,
        }
    }

    /// Identifiers like `g112` belong to gcc, `clang1600` to clang. Anything
    /// else has no toolchain and takes no part in alias derivation.
    pub fn from_compiler_id(id: &str) -> Option<Toolchain> {
        let digit_follows =
            |rest: &str| rest.chars().next().map_or(false, |c| c.is_ascii_digit());
        if let Some(rest) = id.strip_prefix("clang") {
            if digit_follows(rest) {
                return Some(Toolchain::Clang);
            }
        }
        if let Some(rest) = id.strip_prefix('g') {
            if digit_follows(rest) {
                return Some(Toolchain::Gcc);
            }
        }
        None
    }
}

/// One selectable remote compiler build.
///
/// `command` is the sanitized token a user types to pick it; `synthetic`
/// marks derived aliases (they point at a primary descriptor's `id`).
#[derive(Clone, Debug)]
pub struct CompilerDescriptor {
    pub id: String,
    pub toolchain: Option<Toolchain>,
    pub title: String,
    pub version: Version,
    pub command: String,
    pub synthetic: bool,
}

impl CompilerDescriptor {
    fn primary(listing: &CompilerListing) -> Self {
        Self {
            id: listing.id.clone(),
            toolchain: Toolchain::from_compiler_id(&listing.id),
            title: listing.title.clone(),
            version: Version::parse(&listing.semver),
            command: clean_command(&listing.id),
            synthetic: false,
        }
    }
}

/// Replace anything outside `[A-Za-z0-9_]` with `_` and collapse runs.
fn clean_command(command: &str) -> String {
    let non_word = Regex::new(r"[^A-Za-z0-9_]").expect("valid regex");
    let repeats = Regex::new(r"_{2,}").expect("valid regex");
    let cleaned = non_word.replace_all(command, "_");
    repeats.replace_all(&cleaned, "_").into_owned()
}

#[derive(Clone, Debug, Default)]
pub struct CompilerCatalog {
    compilers: Vec<CompilerDescriptor>,
}

impl CompilerCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the remote list: keep only compilers for the target language and
    /// instruction set, then derive the alias descriptors.
    ///
    /// Repeated calls append rather than replace; the catalog is intended to
    /// be loaded exactly once at startup.
    pub fn load(&mut self, listings: &[CompilerListing], language: &str, instruction_set: &str) {
        for listing in listings {
            if listing.lang != language || listing.instruction_set != instruction_set {
                continue;
            }
            self.compilers.push(CompilerDescriptor::primary(listing));
        }

        for toolchain in Toolchain::ALL {
            self.add_latest_alias(toolchain);
        }
        self.add_trimmed_aliases();

        debug!(
            compilers = self.compilers.len(),
            language, instruction_set, "compiler catalog loaded"
        );
    }

    /// Append a `gcc` / `clang` alias for the highest released version of the
    /// toolchain. Pre-release builds never become "latest".
    fn add_latest_alias(&mut self, toolchain: Toolchain) {
        let mut best: Option<usize> = None;
        for (idx, c) in self.compilers.iter().enumerate() {
            if c.synthetic || c.toolchain != Some(toolchain) {
                continue;
            }
            let Version::Semantic(v) = &c.version else {
                continue;
            };
            if !v.is_release() {
                continue;
            }
            let better = match best {
                None => true,
                Some(b) => match &self.compilers[b].version {
                    Version::Semantic(bv) => v > bv,
                    Version::Opaque(_) => true,
                },
            };
            if better {
                best = Some(idx);
            }
        }

        let Some(idx) = best else {
            return;
        };
        let src = self.compilers[idx].clone();
        self.compilers.push(CompilerDescriptor {
            id: src.id,
            toolchain: Some(toolchain),
            title: src.title,
            version: Version::Opaque("(latest)".to_string()),
            command: toolchain.as_str().to_string(),
            synthetic: true,
        });
    }

    /// Append short command tokens like `gcc_11_2`: version components from
    /// major down, stopping just before the first zero. Versions carrying
    /// pre-release/build metadata get no shortcut, nor do zero majors.
    fn add_trimmed_aliases(&mut self) {
        let mut aliases = Vec::new();
        for c in &self.compilers {
            if c.synthetic {
                continue;
            }
            let Some(toolchain) = c.toolchain else {
                continue;
            };
            let Version::Semantic(v) = &c.version else {
                continue;
            };
            if !v.is_release() {
                continue;
            }

            let mut parts = Vec::new();
            for component in [v.major, v.minor, v.patch] {
                if component == 0 {
                    break;
                }
                parts.push(component.to_string());
            }
            if parts.is_empty() {
                continue;
            }

            aliases.push(CompilerDescriptor {
                id: c.id.clone(),
                toolchain: Some(toolchain),
                title: c.title.clone(),
                version: c.version.clone(),
                command: clean_command(&format!("{}-{}", toolchain.as_str(), parts.join("_"))),
                synthetic: true,
            });
        }
        self.compilers.extend(aliases);
    }

    pub fn len(&self) -> usize {
        self.compilers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compilers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompilerDescriptor> {
        self.compilers.iter()
    }

    /// Linear scan, first match wins. Colliding aliases are possible; the
    /// earliest insertion is the defined tie-break.
    pub fn by_command(&self, command: &str) -> Result<&CompilerDescriptor> {
        self.compilers
            .iter()
            .find(|c| c.command == command)
            .ok_or_else(|| Error::CompilerNotFound(command.to_string()))
    }

    /// Resolve `toolchain` at `query`, accepting any later patch within the
    /// same minor: structured queries match the half-open range
    /// `[q, q.bump_patch())` over primary descriptors and pick the maximum;
    /// opaque queries fall back to exact equality.
    pub fn by_range(&self, toolchain: Toolchain, query: &str) -> Result<&CompilerDescriptor> {
        let version = Version::parse(query);
        let Version::Semantic(lo) = &version else {
            return self.by_exact(toolchain, &version);
        };
        let hi = lo.bump_patch();

        let mut best: Option<&CompilerDescriptor> = None;
        for c in &self.compilers {
            if c.synthetic || c.toolchain != Some(toolchain) {
                continue;
            }
            let Version::Semantic(v) = &c.version else {
                continue;
            };
            if v < lo || *v >= hi {
                continue;
            }
            let better = match best {
                None => true,
                Some(b) => match &b.version {
                    Version::Semantic(bv) => v > bv,
                    Version::Opaque(_) => true,
                },
            };
            if better {
                best = Some(c);
            }
        }

        best.ok_or_else(|| Error::CompilerNotFound(format!("{}-{}", toolchain.as_str(), query)))
    }

    /// First descriptor whose toolchain and version compare equal.
    pub fn by_exact(&self, toolchain: Toolchain, version: &Version) -> Result<&CompilerDescriptor> {
        self.compilers
            .iter()
            .find(|c| c.toolchain == Some(toolchain) && &c.version == version)
            .ok_or_else(|| {
                Error::CompilerNotFound(format!("{}-{}", toolchain.as_str(), version))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(id: &str, semver: &str, title: &str) -> CompilerListing {
        CompilerListing {
            id: id.to_string(),
            semver: semver.to_string(),
            title: title.to_string(),
            lang: "c++".to_string(),
            instruction_set: "amd64".to_string(),
        }
    }

    fn sample() -> Vec<CompilerListing> {
        vec![
            listing("g103", "10.3.0", "x86-64 gcc 10.3"),
            listing("g112", "11.2.0", "x86-64 gcc 11.2"),
            listing("gsnapshot", "12.0.0-trunk", "x86-64 gcc (trunk)"),
            listing("clang1200", "12.0.1", "x86-64 clang 12.0.1"),
            listing("vcpp_v19_latest", "19.32", "x64 msvc v19.latest"),
            CompilerListing {
                id: "arm-g103".to_string(),
                semver: "10.3.0".to_string(),
                title: "ARM gcc 10.3".to_string(),
                lang: "c++".to_string(),
                instruction_set: "arm32".to_string(),
            },
            CompilerListing {
                id: "python310".to_string(),
                semver: "3.10".to_string(),
                title: "Python 3.10".to_string(),
                lang: "python".to_string(),
                instruction_set: "amd64".to_string(),
            },
        ]
    }

    fn loaded() -> CompilerCatalog {
        let mut catalog = CompilerCatalog::new();
        catalog.load(&sample(), "c++", "amd64");
        catalog
    }

    #[test]
    fn filters_by_language_and_instruction_set() {
        let catalog = loaded();
        assert!(catalog.iter().all(|c| c.synthetic || c.id != "arm-g103"));
        assert!(catalog.iter().all(|c| c.id != "python310"));
        // Primary list: g103, g112, gsnapshot, clang1200, vcpp_v19_latest.
        assert_eq!(catalog.iter().filter(|c| !c.synthetic).count(), 5);
    }

    #[test]
    fn derives_toolchains_from_identifiers() {
        let catalog = loaded();
        let by_id = |id: &str| {
            catalog
                .iter()
                .find(|c| !c.synthetic && c.id == id)
                .unwrap()
                .toolchain
        };
        assert_eq!(by_id("g112"), Some(Toolchain::Gcc));
        assert_eq!(by_id("clang1200"), Some(Toolchain::Clang));
        assert_eq!(by_id("gsnapshot"), None);
        assert_eq!(by_id("vcpp_v19_latest"), None);
    }

    #[test]
    fn latest_alias_points_at_highest_release() {
        let catalog = loaded();
        let latest = catalog.by_command("gcc").unwrap();
        assert_eq!(latest.id, "g112");
        assert!(latest.synthetic);

        let latest_clang = catalog.by_command("clang").unwrap();
        assert_eq!(latest_clang.id, "clang1200");
    }

    #[test]
    fn prerelease_is_never_latest() {
        let mut catalog = CompilerCatalog::new();
        catalog.load(
            &[
                listing("g103", "10.3.0", "gcc 10.3"),
                listing("g112", "11.2.0", "gcc 11.2"),
                listing("g130", "12.0.0-trunk", "gcc (trunk)"),
            ],
            "c++",
            "amd64",
        );
        assert_eq!(catalog.by_command("gcc").unwrap().id, "g112");
        // And it gets no trimmed shortcut either.
        assert!(catalog.by_command("gcc_12").is_err());
    }

    #[test]
    fn trimmed_aliases_stop_before_zero_component() {
        let catalog = loaded();
        assert_eq!(catalog.by_command("gcc_10_3").unwrap().id, "g103");
        assert_eq!(catalog.by_command("gcc_11_2").unwrap().id, "g112");
        // 12.0.1: trimming stops before the zero minor.
        assert_eq!(catalog.by_command("clang_12").unwrap().id, "clang1200");
        // The pre-release version gets no shortcut.
        assert!(catalog.by_command("gcc_12").is_err());
    }

    #[test]
    fn zero_major_gets_no_alias() {
        let mut catalog = CompilerCatalog::new();
        catalog.load(&[listing("g099", "0.9.0", "gcc 0.9")], "c++", "amd64");
        assert!(catalog.by_command("gcc_0_9").is_err());
        assert!(catalog.by_command("gcc_").is_err());
    }

    #[test]
    fn command_tokens_are_sanitized() {
        let mut catalog = CompilerCatalog::new();
        catalog.load(
            &[listing("clang-trunk.1", "(trunk)", "clang (trunk)")],
            "c++",
            "amd64",
        );
        assert!(catalog.by_command("clang_trunk_1").is_ok());
    }

    #[test]
    fn unknown_command_is_not_found() {
        let err = loaded().by_command("tcc").unwrap_err();
        assert!(matches!(err, Error::CompilerNotFound(_)));
    }

    #[test]
    fn first_match_wins_on_collisions() {
        let mut catalog = CompilerCatalog::new();
        catalog.load(
            &[
                listing("g112", "11.2.0", "gcc 11.2 first"),
                listing("g112", "11.2.0", "gcc 11.2 second"),
            ],
            "c++",
            "amd64",
        );
        assert_eq!(catalog.by_command("g112").unwrap().title, "gcc 11.2 first");
    }

    #[test]
    fn range_lookup_picks_maximum_patch() {
        let mut catalog = CompilerCatalog::new();
        catalog.load(
            &[
                listing("g1120", "11.2.0", "gcc 11.2.0"),
                listing("g1121", "11.2.1", "gcc 11.2.1"),
                listing("g1130", "11.3.0", "gcc 11.3.0"),
            ],
            "c++",
            "amd64",
        );
        // [11.2.0, 11.2.1): only 11.2.0 qualifies.
        assert_eq!(catalog.by_range(Toolchain::Gcc, "11.2.0").unwrap().id, "g1120");
        assert!(catalog.by_range(Toolchain::Gcc, "11.4.0").is_err());
    }

    #[test]
    fn opaque_range_query_falls_back_to_exact() {
        let catalog = loaded();
        let hit = catalog.by_range(Toolchain::Gcc, "(latest)").unwrap();
        assert_eq!(hit.id, "g112");
        assert!(catalog.by_range(Toolchain::Gcc, "(trunk)").is_err());
    }

    #[test]
    fn exact_lookup_matches_toolchain_and_version() {
        let catalog = loaded();
        let v = Version::parse("10.3.0");
        assert_eq!(catalog.by_exact(Toolchain::Gcc, &v).unwrap().id, "g103");
        assert!(catalog.by_exact(Toolchain::Clang, &v).is_err());
    }
}
