use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The two OSGeo4W installer flavours.
/// Each variant selects the installer executable and the install-root suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Architecture {
    #[serde(rename = "x86_64", alias = "64")]
    X86_64, // 64-bit, osgeo4w-setup-x86_64.exe
    #[serde(rename = "x86", alias = "32")]
    X86, // 32-bit, osgeo4w-setup-x86.exe
}

impl Architecture {
    /// Suffix appended to `root_base` to name the install root ("64" or "32").
    pub fn root_suffix(self) -> &'static str {
        match self {
            Architecture::X86_64 => "64",
            Architecture::X86 => "32",
        }
    }

    /// Filename of the vendor installer for this architecture.
    pub fn setup_filename(self) -> &'static str {
        match self {
            Architecture::X86_64 => "osgeo4w-setup-x86_64.exe",
            Architecture::X86 => "osgeo4w-setup-x86.exe",
        }
    }
}

/// Parses CLI values such as `--arch x86_64` or `--arch 32`.
impl FromStr for Architecture {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "x86_64" | "64" | "amd64" => Ok(Architecture::X86_64),
            "x86" | "32" | "i686" => Ok(Architecture::X86),
            _ => Err(format!(
                "Invalid architecture '{s}'. Must be one of: x86_64 (64), x86 (32)"
            )),
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Architecture::X86_64 => write!(f, "x86_64"),
            Architecture::X86 => write!(f, "x86"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_bit_widths() {
        assert_eq!("x86_64".parse::<Architecture>(), Ok(Architecture::X86_64));
        assert_eq!("64".parse::<Architecture>(), Ok(Architecture::X86_64));
        assert_eq!("X86".parse::<Architecture>(), Ok(Architecture::X86));
        assert_eq!("32".parse::<Architecture>(), Ok(Architecture::X86));
        assert!("arm64".parse::<Architecture>().is_err());
    }

    #[test]
    fn installer_names_follow_vendor_convention() {
        assert_eq!(Architecture::X86_64.setup_filename(), "osgeo4w-setup-x86_64.exe");
        assert_eq!(Architecture::X86.setup_filename(), "osgeo4w-setup-x86.exe");
        assert_eq!(Architecture::X86.root_suffix(), "32");
    }

    #[test]
    fn yaml_accepts_aliases() {
        let archs: Vec<Architecture> = serde_yaml::from_str("[x86_64, \"32\"]").unwrap();
        assert_eq!(archs, vec![Architecture::X86_64, Architecture::X86]);
    }
}
