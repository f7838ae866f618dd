/// CPU architecture a cask source is built for.
///
/// Casks target both Apple Silicon (ARM64) and Intel (`x86_64`) Macs. The
/// enumeration is closed: a source either names one of these or applies to
/// any architecture, which is modelled as `Option<Arch>::None` on the source.
///
/// # Example
///
/// ```
/// use cask_schema::Arch;
///
/// let current = Arch::current();
/// println!("Running on: {}", current);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
    Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Arch {
    /// ARM64 architecture (Apple Silicon: M1, M2, M3, etc.)
    #[default]
    Arm64,
    /// `x86_64` architecture (Intel Macs)
    X86_64,
}

impl Arch {
    /// All supported architectures, in a stable order.
    pub const ALL: [Arch; 2] = [Arch::Arm64, Arch::X86_64];

    /// Get the current architecture
    pub fn current() -> Self {
        #[cfg(target_arch = "aarch64")]
        {
            Self::Arm64
        }
        #[cfg(not(target_arch = "aarch64"))]
        {
            Self::X86_64
        }
    }

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Arm64 => "arm64",
            Self::X86_64 => "x86_64",
        }
    }

    /// Name of the manifest block that scopes stanzas to this architecture.
    pub fn block_name(&self) -> &'static str {
        match self {
            Self::Arm64 => "on_arm",
            Self::X86_64 => "on_intel",
        }
    }

    /// Inverse of [`block_name()`](Self::block_name).
    pub fn from_block_name(name: &str) -> Option<Self> {
        match name {
            "on_arm" => Some(Self::Arm64),
            "on_intel" => Some(Self::X86_64),
            _ => None,
        }
    }
}

impl std::fmt::Display for Arch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Arch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "arm64" | "aarch64" | "arm" => Ok(Self::Arm64),
            "x86_64" | "amd64" | "intel" => Ok(Self::X86_64),
            _ => Err(format!("Unknown architecture: {s}")),
        }
    }
}
