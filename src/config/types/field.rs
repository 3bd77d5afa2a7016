//! Type-safe config field path.

use owo_colors::OwoColorize;
use std::fmt;

/// A type-safe wrapper for config field paths.
///
/// Used with `config_fields!` to generate compile-time checked
/// field path accessors.
///
/// # Example
///
/// ```ignore
/// config_fields!(StorageConfig => StorageFields, "storage" { bucket });
///
/// // Usage:
/// diag.error(StorageConfig::FIELDS.bucket, "required");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPath(pub &'static str);

impl FieldPath {
    #[inline]
    pub const fn new(path: &'static str) -> Self {
        Self(path)
    }

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_args!("`{}`", self.0).bright_blue())
    }
}

impl AsRef<str> for FieldPath {
    fn as_ref(&self) -> &str {
        self.0
    }
}

/// Generate a `FIELDS` constant of [`FieldPath`]s for a config section.
///
/// ```ignore
/// config_fields!(GzipConfig => GzipFields, "gzip" { enable, prefix });
/// assert_eq!(GzipConfig::FIELDS.prefix.as_str(), "gzip.prefix");
/// ```
#[macro_export]
macro_rules! config_fields {
    ($config:ident => $fields:ident, $section:literal { $($field:ident),* $(,)? }) => {
        #[derive(Debug, Clone, Copy)]
        pub struct $fields {
            $(pub $field: $crate::config::FieldPath,)*
        }

        impl $config {
            pub const FIELDS: $fields = $fields {
                $($field: $crate::config::FieldPath::new(
                    concat!($section, ".", stringify!($field))
                ),)*
            };
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Demo;
    config_fields!(Demo => DemoFields, "demo.section" { alpha, beta });

    #[test]
    fn test_generated_field_paths() {
        assert_eq!(Demo::FIELDS.alpha.as_str(), "demo.section.alpha");
        assert_eq!(Demo::FIELDS.beta, FieldPath::new("demo.section.beta"));
    }
}
