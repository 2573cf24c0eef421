// Participant, winner and group records shared by every engine.

use std::collections::HashSet;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Length of generated record identifiers.
pub const ID_LEN: usize = 9;

/// Prize label recorded when the operator leaves the prize field blank.
pub const DEFAULT_PRIZE: &str = "Lucky Prize";

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// A single person on the roster.
///
/// `id` is assigned once at ingestion and never changes. `name` may collide
/// with other records; duplicates are detected, never rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    pub name: String,
}

impl Participant {
    /// Build a participant with a freshly generated id.
    pub fn new<R: Rng + ?Sized>(name: impl Into<String>, rng: &mut R) -> Self {
        Participant {
            id: generate_id(rng),
            name: name.into(),
        }
    }
}

/// A participant snapshot taken at the moment a draw settles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Winner {
    pub id: String,
    pub name: String,
    pub prize: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

impl Winner {
    /// Snapshot `participant` as a winner of `prize`. A blank prize label is
    /// replaced with [`DEFAULT_PRIZE`].
    pub fn from_participant(participant: &Participant, prize: &str, timestamp: i64) -> Self {
        let prize = prize.trim();
        Winner {
            id: participant.id.clone(),
            name: participant.name.clone(),
            prize: if prize.is_empty() {
                DEFAULT_PRIZE.to_string()
            } else {
                prize.to_string()
            },
            timestamp,
        }
    }
}

/// One team produced by a grouping run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub members: Vec<Participant>,
}

/// Generate an opaque lowercase base-36 identifier.
pub fn generate_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..ID_LEN)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

/// Generate an identifier that is not already in `taken`, and record it there.
pub fn generate_unique_id<R: Rng + ?Sized>(rng: &mut R, taken: &mut HashSet<String>) -> String {
    loop {
        let id = generate_id(rng);
        if taken.insert(id.clone()) {
            return id;
        }
    }
}
