// Matcher configuration.
//
// Selects how window hashes of the new version are looked up against the
// signature, and whether weak hash hits are confirmed with a strong digest.

/// How candidate positions are found for each signature block.
///
/// Both strategies visit candidates in the same order (old index ascending,
/// then new position ascending) and therefore produce identical deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchStrategy {
    /// Nested scan over every new-version position for every signature block.
    Scan,
    /// Hash-to-positions index built once over the new version.
    #[default]
    Indexed,
}

impl MatchStrategy {
    /// Name for display purposes.
    pub fn name(self) -> &'static str {
        match self {
            Self::Scan => "scan",
            Self::Indexed => "indexed",
        }
    }
}

/// Options for delta construction.
#[derive(Debug, Clone, Default)]
pub struct DeltaOptions {
    /// Candidate lookup strategy.
    pub strategy: MatchStrategy,
    /// Confirm weak hash hits with SHA-256 block digests.
    ///
    /// Only honored with the `verify` feature; otherwise hits are always
    /// accepted on the weak hash alone.
    pub verify: bool,
}

impl DeltaOptions {
    /// Options with the given strategy and no verification.
    pub fn with_strategy(strategy: MatchStrategy) -> Self {
        Self {
            strategy,
            ..Default::default()
        }
    }
}
