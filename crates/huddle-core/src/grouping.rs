// Grouping engine: shuffle the roster and cut it into fixed-size teams.

use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{generate_unique_id, Group, Participant};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupingError {
    #[error("the roster is empty")]
    EmptyRoster,
}

/// Target members per group, never below one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "usize", into = "usize")]
pub struct GroupSize(usize);

impl GroupSize {
    pub fn new(size: usize) -> Self {
        GroupSize(size.max(1))
    }

    pub fn get(self) -> usize {
        self.0
    }

    pub fn increment(self) -> Self {
        GroupSize(self.0.saturating_add(1))
    }

    pub fn decrement(self) -> Self {
        GroupSize::new(self.0.saturating_sub(1))
    }
}

impl Default for GroupSize {
    fn default() -> Self {
        GroupSize(3)
    }
}

impl From<usize> for GroupSize {
    fn from(size: usize) -> Self {
        GroupSize::new(size)
    }
}

impl From<GroupSize> for usize {
    fn from(size: GroupSize) -> Self {
        size.0
    }
}

// ---------------------------------------------------------------------------
// Themes
// ---------------------------------------------------------------------------

/// Naming style handed to the text generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Professional,
    Superheroes,
    Animals,
    OuterSpace,
    Food,
}

impl Theme {
    pub const ALL: [Theme; 5] = [
        Theme::Professional,
        Theme::Superheroes,
        Theme::Animals,
        Theme::OuterSpace,
        Theme::Food,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Theme::Professional => "Professional",
            Theme::Superheroes => "Superheroes",
            Theme::Animals => "Animals",
            Theme::OuterSpace => "Outer Space",
            Theme::Food => "Food",
        }
    }

    /// Display label used in prompts and on screen.
    pub fn local_label(self) -> &'static str {
        match self {
            Theme::Professional => "專業職場",
            Theme::Superheroes => "超級英雄",
            Theme::Animals => "叢林猛獸",
            Theme::OuterSpace => "宇宙探索",
            Theme::Food => "美味珍饈",
        }
    }

    /// The theme after this one, wrapping around.
    pub fn next(self) -> Theme {
        let idx = Theme::ALL.iter().position(|t| *t == self).unwrap_or(0);
        Theme::ALL[(idx + 1) % Theme::ALL.len()]
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.local_label(), self.label())
    }
}

// ---------------------------------------------------------------------------
// Partition and naming
// ---------------------------------------------------------------------------

/// Deterministic name for the group in slot `index` (0-based).
pub fn fallback_name(index: usize) -> String {
    format!("Team {}", index + 1)
}

/// Fallback names for `count` groups.
pub fn fallback_names(count: usize) -> Vec<String> {
    (0..count).map(fallback_name).collect()
}

/// Number of groups `participants` people split into at `size`.
pub fn group_count(participants: usize, size: GroupSize) -> usize {
    participants.div_ceil(size.get())
}

/// Shuffle `roster` and cut it into contiguous groups of `size`; the last
/// group holds the remainder. Every group gets its fallback name.
pub fn partition<R: Rng + ?Sized>(
    roster: &[Participant],
    size: GroupSize,
    rng: &mut R,
) -> Result<Vec<Group>, GroupingError> {
    if roster.is_empty() {
        return Err(GroupingError::EmptyRoster);
    }

    let mut shuffled = roster.to_vec();
    shuffled.shuffle(rng);

    let mut taken = Default::default();
    Ok(shuffled
        .chunks(size.get())
        .enumerate()
        .map(|(i, members)| Group {
            id: generate_unique_id(rng, &mut taken),
            name: fallback_name(i),
            members: members.to_vec(),
        })
        .collect())
}

/// Rename groups from `names` by position. A missing or blank entry keeps the
/// slot's fallback name; surplus names are ignored.
pub fn apply_names(groups: &mut [Group], names: &[String]) {
    for (i, group) in groups.iter_mut().enumerate() {
        group.name = match names.get(i).map(|n| n.trim()) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => fallback_name(i),
        };
    }
}
