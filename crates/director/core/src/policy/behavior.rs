use strum::EnumCount;

/// Shared tactics mode applied to every live hostile agent at once.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::EnumCount,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GroupBehavior {
    /// Direct pursuit of the player. Also the fallback when no policy applies.
    #[default]
    Aggressive,
    /// Surround the player from several angles.
    Encircle,
    /// Hold back and punish player advances.
    CounterOffense,
    /// Spread out to avoid area damage.
    Scatter,
    /// Gather around the densest pocket of agents.
    Cluster,
}

impl GroupBehavior {
    pub const ALL: [Self; Self::COUNT] = [
        Self::Aggressive,
        Self::Encircle,
        Self::CounterOffense,
        Self::Scatter,
        Self::Cluster,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }
}
