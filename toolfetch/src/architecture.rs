//! Architecture profiles.
//!
//! Each supported architecture names the manifest section holding its tools,
//! an optional banner printed before provisioning, and whether the
//! post-pass relocation of flashing utilities applies.

/// The architecture provisioned when none is given.
pub const DEFAULT_ARCHITECTURE: &str = "esp8266";

/// Provisioning settings for one architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchitectureProfile {
    /// Architecture name as given on the command line.
    pub name: &'static str,
    /// Manifest section (package `name`) holding the tools.
    pub section: &'static str,
    /// Human-readable label used in the provisioning banner.
    pub banner: Option<&'static str>,
    /// Whether utilities are relocated into the binaries directory afterwards.
    pub relocate: bool,
}

impl ArchitectureProfile {
    /// Return the banner line, if this profile prints one.
    #[must_use]
    pub fn banner_line(&self) -> Option<String> {
        self.banner
            .map(|label| format!("Generate the toolchain of the {label}..."))
    }
}

/// Known architecture profiles. The first entry is the default.
pub const PROFILES: &[ArchitectureProfile] = &[
    ArchitectureProfile {
        name: DEFAULT_ARCHITECTURE,
        section: "esp8266",
        banner: None,
        relocate: true,
    },
    ArchitectureProfile {
        name: "esp32",
        section: "esp8266",
        banner: None,
        relocate: true,
    },
    ArchitectureProfile {
        name: "opencpu",
        section: "opencpu",
        banner: Some("OpenCPU"),
        relocate: false,
    },
    ArchitectureProfile {
        name: "avr",
        section: "avr",
        banner: Some("AVR"),
        relocate: false,
    },
    ArchitectureProfile {
        name: "efm32",
        section: "efm32",
        banner: Some("EFM32"),
        relocate: false,
    },
];

/// Look up a profile by exact architecture name.
#[must_use]
pub fn find_profile(name: &str) -> Option<&'static ArchitectureProfile> {
    PROFILES.iter().find(|profile| profile.name == name)
}

/// Resolve the profile for an architecture, falling back to the default.
///
/// Unrecognized names are provisioned with the default profile's section and
/// relocation, matching the behaviour for the default architecture.
///
/// # Examples
///
/// ```
/// use toolfetch::architecture::resolve_profile;
///
/// assert_eq!(resolve_profile("avr").section, "avr");
/// assert_eq!(resolve_profile("riscv").section, "esp8266");
/// ```
#[must_use]
pub fn resolve_profile(name: &str) -> ArchitectureProfile {
    if let Some(profile) = find_profile(name) {
        return *profile;
    }
    log::warn!("unrecognized architecture {name}; using the {DEFAULT_ARCHITECTURE} section");
    default_profile()
}

/// Return the default architecture profile.
#[must_use]
pub const fn default_profile() -> ArchitectureProfile {
    ArchitectureProfile {
        name: DEFAULT_ARCHITECTURE,
        section: "esp8266",
        banner: None,
        relocate: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::esp8266("esp8266", "esp8266", true)]
    #[case::esp32("esp32", "esp8266", true)]
    #[case::opencpu("opencpu", "opencpu", false)]
    #[case::avr("avr", "avr", false)]
    #[case::efm32("efm32", "efm32", false)]
    #[case::unknown("stm8", "esp8266", true)]
    fn resolves_sections(#[case] arch: &str, #[case] section: &str, #[case] relocate: bool) {
        let profile = resolve_profile(arch);
        assert_eq!(profile.section, section);
        assert_eq!(profile.relocate, relocate);
    }

    #[test]
    fn first_profile_is_default() {
        assert_eq!(PROFILES.first().copied(), Some(default_profile()));
    }

    #[test]
    fn banner_names_the_architecture() {
        let profile = resolve_profile("avr");
        assert_eq!(
            profile.banner_line().as_deref(),
            Some("Generate the toolchain of the AVR...")
        );
        assert!(resolve_profile("esp8266").banner_line().is_none());
    }
}
