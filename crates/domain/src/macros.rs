//! Macro for implementing Display and FromStr for wire-named enums
//!
//! Several domain enums (reset reasons, priority classes) travel through logs
//! and configuration files as short snake_case names. This macro provides a
//! single implementation of both `Display` and `FromStr` so the two
//! directions can never drift apart.
//!
//! # Example
//!
//! ```rust
//! use retrygate_domain::impl_wire_name_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Tier {
//!     Default,
//!     High,
//! }
//!
//! impl_wire_name_conversions!(Tier {
//!     Default => "default",
//!     High => "high",
//! });
//!
//! assert_eq!(Tier::High.to_string(), "high");
//! assert_eq!("DEFAULT".parse::<Tier>().unwrap(), Tier::Default);
//! ```

/// Implements Display and FromStr traits for wire-named enums
///
/// This macro generates:
/// - Display trait: writes the variant's wire name
/// - FromStr trait: parses case-insensitive wire names to enum variants
///
/// # Arguments
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their wire names
#[macro_export]
macro_rules! impl_wire_name_conversions {
    ($enum_name:ident { $($variant:ident => $str:literal),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_ascii_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Signal {
        Reset,
        Refused,
        Overflow,
    }

    impl_wire_name_conversions!(Signal {
        Reset => "reset",
        Refused => "refused_stream",
        Overflow => "overflow",
    });

    #[test]
    fn test_display_conversion() {
        assert_eq!(Signal::Reset.to_string(), "reset");
        assert_eq!(Signal::Refused.to_string(), "refused_stream");
        assert_eq!(Signal::Overflow.to_string(), "overflow");
    }

    #[test]
    fn test_fromstr_mixed_case() {
        assert_eq!(Signal::from_str("Refused_Stream").unwrap(), Signal::Refused);
        assert_eq!(Signal::from_str("OVERFLOW").unwrap(), Signal::Overflow);
    }

    #[test]
    fn test_fromstr_invalid() {
        let result = Signal::from_str("refused-stream");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Invalid Signal: refused-stream"));
    }

    #[test]
    fn test_fromstr_empty() {
        assert!(Signal::from_str("").is_err());
    }
}
