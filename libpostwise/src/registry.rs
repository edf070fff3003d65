//! Platform constraint registry
//!
//! Static per-platform metadata: character limits and canonical best-time
//! posting windows. Built once at startup and passed by `Arc` to the
//! services that need it; any change ships as a new deployment.

use std::collections::HashMap;

use chrono::NaiveTime;

use crate::error::RegistryError;
use crate::types::Platform;

/// Read-only constraints for a single platform.
#[derive(Debug, Clone)]
pub struct PlatformProfile {
    pub name: &'static str,
    pub max_chars: usize,
    /// Canonical posting windows, platform-local time-of-day, in the order
    /// the platform guidance ranks them.
    pub best_time_windows: Vec<NaiveTime>,
}

#[derive(Debug, Clone)]
pub struct PlatformRegistry {
    profiles: HashMap<Platform, PlatformProfile>,
}

fn hm(hour: u32, min: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, min, 0).expect("static time-of-day constant")
}

impl PlatformRegistry {
    /// The full builtin table covering every platform in the closed set.
    pub fn builtin() -> Self {
        let mut profiles = HashMap::new();
        profiles.insert(
            Platform::Instagram,
            PlatformProfile {
                name: "instagram",
                max_chars: 2200,
                best_time_windows: vec![hm(10, 0), hm(14, 0), hm(19, 0)],
            },
        );
        profiles.insert(
            Platform::Linkedin,
            PlatformProfile {
                name: "linkedin",
                max_chars: 3000,
                best_time_windows: vec![hm(8, 0), hm(12, 0), hm(17, 0)],
            },
        );
        profiles.insert(
            Platform::Twitter,
            PlatformProfile {
                name: "twitter",
                max_chars: 280,
                best_time_windows: vec![hm(9, 0), hm(13, 0), hm(18, 0)],
            },
        );
        profiles.insert(
            Platform::Facebook,
            PlatformProfile {
                name: "facebook",
                max_chars: 63_206,
                best_time_windows: vec![hm(10, 0), hm(15, 0), hm(20, 0)],
            },
        );
        Self { profiles }
    }

    /// Build a registry from an explicit profile map.
    pub fn with_profiles(profiles: HashMap<Platform, PlatformProfile>) -> Self {
        Self { profiles }
    }

    /// Look up a platform's profile.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::UnknownPlatform` if the registry carries no
    /// entry for the platform.
    pub fn profile(&self, platform: Platform) -> Result<&PlatformProfile, RegistryError> {
        self.profiles
            .get(&platform)
            .ok_or_else(|| RegistryError::UnknownPlatform(platform.to_string()))
    }
}

impl Default for PlatformRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_covers_all_platforms() {
        let registry = PlatformRegistry::builtin();
        for platform in Platform::ALL {
            assert!(registry.profile(platform).is_ok(), "{} missing", platform);
        }
    }

    #[test]
    fn test_builtin_twitter_limit() {
        let registry = PlatformRegistry::builtin();
        assert_eq!(registry.profile(Platform::Twitter).unwrap().max_chars, 280);
    }

    #[test]
    fn test_builtin_windows_ordered() {
        let registry = PlatformRegistry::builtin();
        let windows = &registry
            .profile(Platform::Linkedin)
            .unwrap()
            .best_time_windows;

        assert_eq!(windows[0], hm(8, 0));
        assert_eq!(windows.len(), 3);
    }

    #[test]
    fn test_unknown_platform_error() {
        let registry = PlatformRegistry::with_profiles(HashMap::new());
        let result = registry.profile(Platform::Twitter);

        match result {
            Err(RegistryError::UnknownPlatform(name)) => assert_eq!(name, "twitter"),
            _ => panic!("Expected UnknownPlatform"),
        }
    }
}
