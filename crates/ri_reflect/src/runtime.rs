use core::fmt;
use core::str::FromStr;

use thiserror::Error;

/// The flavor of managed runtime hosting the inspected application.
///
/// Under [`RuntimeFlavor::Il2Cpp`] managed member handles are generated
/// wrappers over native calls, and the inspector additionally resolves the
/// native pointers backing them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RuntimeFlavor {
    #[default]
    Mono,
    Il2Cpp,
}

impl RuntimeFlavor {
    /// Returns the canonical name, as accepted by [`FromStr`].
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mono => "Mono",
            Self::Il2Cpp => "IL2CPP",
        }
    }
}

impl fmt::Display for RuntimeFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Error returned when parsing an unknown [`RuntimeFlavor`] name.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown runtime flavor `{0}`")]
pub struct ParseRuntimeError(pub String);

impl FromStr for RuntimeFlavor {
    type Err = ParseRuntimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("mono") {
            Ok(Self::Mono)
        } else if s.eq_ignore_ascii_case("il2cpp") {
            Ok(Self::Il2Cpp)
        } else {
            Err(ParseRuntimeError(s.into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RuntimeFlavor;

    #[test]
    fn parse_case_insensitive() {
        assert_eq!("IL2CPP".parse::<RuntimeFlavor>(), Ok(RuntimeFlavor::Il2Cpp));
        assert_eq!("mono".parse::<RuntimeFlavor>(), Ok(RuntimeFlavor::Mono));
        assert!("coreclr".parse::<RuntimeFlavor>().is_err());
    }
}
