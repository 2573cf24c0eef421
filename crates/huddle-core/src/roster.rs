// Roster store: the ordered list of participants for the current session.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use rand::Rng;
use tracing::warn;

use crate::ingest::{self, IngestError};
use crate::model::{generate_unique_id, Participant};

/// Ordered participant list.
///
/// Every mutation keeps participant ids unique. Order is insertion order:
/// ingestion appends and never reorders existing entries.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    participants: Vec<Participant>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a roster from previously stored records.
    pub fn from_participants<R: Rng + ?Sized>(list: Vec<Participant>, rng: &mut R) -> Self {
        let mut roster = Roster::new();
        roster.replace(list, rng);
        roster
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    /// Swap the entire roster contents.
    ///
    /// A record whose id repeats an earlier one (or is blank) is re-keyed with
    /// a fresh id so the uniqueness invariant survives hand-edited or
    /// corrupted input.
    pub fn replace<R: Rng + ?Sized>(&mut self, list: Vec<Participant>, rng: &mut R) {
        let mut seen: HashSet<String> = HashSet::with_capacity(list.len());
        let mut rekey = Vec::new();

        for (idx, p) in list.iter().enumerate() {
            if p.id.is_empty() || !seen.insert(p.id.clone()) {
                rekey.push(idx);
            }
        }

        let mut list = list;
        for idx in rekey {
            let id = generate_unique_id(rng, &mut seen);
            warn!(
                "Re-keyed participant '{}' (duplicate id '{}' -> '{}')",
                list[idx].name, list[idx].id, id
            );
            list[idx].id = id;
        }

        self.participants = list;
    }

    /// Append one participant per name, each with a fresh unique id.
    /// Returns the newly created records.
    pub fn add_names<R: Rng + ?Sized>(&mut self, names: Vec<String>, rng: &mut R) -> Vec<Participant> {
        let mut taken: HashSet<String> = self.participants.iter().map(|p| p.id.clone()).collect();
        let added: Vec<Participant> = names
            .into_iter()
            .map(|name| Participant {
                id: generate_unique_id(rng, &mut taken),
                name,
            })
            .collect();
        self.participants.extend(added.iter().cloned());
        added
    }

    /// Parse `text` and append the resulting participants. No deduplication
    /// happens here.
    pub fn ingest<R: Rng + ?Sized>(&mut self, text: &str, rng: &mut R) -> Vec<Participant> {
        self.add_names(ingest::parse_names(text), rng)
    }

    /// Read names from a `.txt`/`.csv` file and append them. On a read or
    /// decode error nothing is appended.
    pub fn ingest_file<R: Rng + ?Sized>(
        &mut self,
        path: &Path,
        rng: &mut R,
    ) -> Result<Vec<Participant>, IngestError> {
        let names = ingest::read_names_file(path)?;
        Ok(self.add_names(names, rng))
    }

    /// Remove the record with `id`. Returns whether anything was removed.
    pub fn remove_by_id(&mut self, id: &str) -> bool {
        let before = self.participants.len();
        self.participants.retain(|p| p.id != id);
        self.participants.len() != before
    }

    /// Empty the roster. Interactive callers confirm before invoking this.
    pub fn clear_all(&mut self) {
        self.participants.clear();
    }

    /// Occurrence count per name.
    pub fn name_frequency(&self) -> HashMap<String, usize> {
        let mut freq = HashMap::new();
        for p in &self.participants {
            *freq.entry(p.name.clone()).or_insert(0) += 1;
        }
        freq
    }

    /// Whether any name occurs more than once.
    pub fn has_duplicates(&self) -> bool {
        let mut seen = HashSet::new();
        self.participants.iter().any(|p| !seen.insert(p.name.as_str()))
    }

    /// Keep the first record per distinct name and drop the rest.
    /// Returns the number of records removed.
    pub fn deduplicate_by_name(&mut self) -> usize {
        let before = self.participants.len();
        let mut seen = HashSet::new();
        self.participants.retain(|p| seen.insert(p.name.clone()));
        before - self.participants.len()
    }
}
