//! The user's mapping set: an immutable default table plus per-command key
//! overrides.
//!
//! Uses Vec for deterministic iteration order and HashMap for O(1) lookup by
//! description. Resetting discards the overrides; the defaults are never
//! mutated.

use std::collections::HashMap;

use tracing::{debug, info};

use super::defaults::default_mappings;
use super::mapping::{InputMapping, MappingType};
use super::types::Shortcut;
use crate::error::HotkeyError;

/// Two enabled mappings sharing one chord. The winner is the one earlier in
/// table order, which is the one the dispatcher runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChordConflict {
    pub chord: String,
    pub winner: String,
    pub loser: String,
}

/// Ordered mapping set with user key overrides.
#[derive(Clone, Debug)]
pub struct MarkdownHotkeysConfig {
    defaults: Vec<InputMapping>,
    description_to_index: HashMap<String, usize>,
    /// description -> chord in canonical form, empty when disabled
    overrides: HashMap<String, String>,
    effective: Vec<InputMapping>,
}

impl Default for MarkdownHotkeysConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownHotkeysConfig {
    /// Mapping set built from the built-in command table.
    pub fn new() -> Self {
        Self::with_defaults(default_mappings())
    }

    /// Mapping set built from a custom default table.
    pub fn with_defaults(defaults: Vec<InputMapping>) -> Self {
        let description_to_index = defaults
            .iter()
            .enumerate()
            .map(|(index, mapping)| (mapping.description.clone(), index))
            .collect();
        Self {
            effective: defaults.clone(),
            defaults,
            description_to_index,
            overrides: HashMap::new(),
        }
    }

    /// All mappings in table order, overrides applied.
    pub fn mappings(&self) -> &[InputMapping] {
        &self.effective
    }

    pub fn by_type(&self, kind: MappingType) -> impl Iterator<Item = &InputMapping> {
        self.effective.iter().filter(move |m| m.kind == kind)
    }

    pub fn by_description(&self, description: &str) -> Option<&InputMapping> {
        self.description_to_index
            .get(description)
            .and_then(|&i| self.effective.get(i))
    }

    pub fn default_for(&self, description: &str) -> Option<&InputMapping> {
        self.description_to_index
            .get(description)
            .and_then(|&i| self.defaults.get(i))
    }

    pub fn overrides(&self) -> &HashMap<String, String> {
        &self.overrides
    }

    pub fn is_overridden(&self, description: &str) -> bool {
        self.overrides.contains_key(description)
    }

    /// Rebind one command. An empty chord disables it.
    ///
    /// Rejects a chord another enabled command already uses.
    pub fn set_key(&mut self, description: &str, chord: &str) -> Result<(), HotkeyError> {
        let index = self.index_of(description)?;
        let (canonical, shortcut) = canonical_chord(chord)?;

        if let Some(shortcut) = shortcut {
            let existing = self.effective.iter().enumerate().find(|(i, m)| {
                *i != index && Shortcut::parse(&m.key).is_ok_and(|s| s == shortcut)
            });
            if let Some((_, existing)) = existing {
                return Err(HotkeyError::ChordConflict {
                    chord: canonical,
                    existing: existing.description.clone(),
                });
            }
        }

        self.store_override(index, canonical);
        info!(
            description,
            key = %self.effective[index].key,
            "Hotkey rebound"
        );
        Ok(())
    }

    /// Apply a previously saved key without the conflict check. Duplicates
    /// that come in this way are reported by [`Self::find_conflicts`].
    pub(crate) fn restore_key(&mut self, description: &str, chord: &str) -> Result<(), HotkeyError> {
        let index = self.index_of(description)?;
        let (canonical, _) = canonical_chord(chord)?;
        self.store_override(index, canonical);
        Ok(())
    }

    /// Drop every override.
    pub fn reset(&mut self) {
        self.overrides.clear();
        self.effective = self.defaults.clone();
        info!(mappings = self.effective.len(), "Hotkeys reset to defaults");
    }

    /// Enabled mappings whose chords collide, in table order.
    pub fn find_conflicts(&self) -> Vec<ChordConflict> {
        let mut first_owner: HashMap<String, &str> = HashMap::new();
        let mut conflicts = Vec::new();

        for mapping in &self.effective {
            let Ok(shortcut) = Shortcut::parse(&mapping.key) else {
                continue;
            };
            let chord = shortcut.to_canonical_string();
            match first_owner.get(&chord) {
                Some(winner) => conflicts.push(ChordConflict {
                    chord,
                    winner: winner.to_string(),
                    loser: mapping.description.clone(),
                }),
                None => {
                    first_owner.insert(chord, &mapping.description);
                }
            }
        }

        conflicts
    }

    fn index_of(&self, description: &str) -> Result<usize, HotkeyError> {
        self.description_to_index
            .get(description)
            .copied()
            .ok_or_else(|| HotkeyError::UnknownCommand(description.to_string()))
    }

    fn store_override(&mut self, index: usize, canonical: String) {
        let default = &self.defaults[index];
        let description = default.description.clone();
        let default_canonical = Shortcut::parse(&default.key)
            .map(|s| s.to_canonical_string())
            .unwrap_or_default();

        if canonical == default_canonical {
            self.overrides.remove(&description);
        } else {
            self.overrides.insert(description.clone(), canonical.clone());
        }
        self.effective[index].key = canonical;
        debug!(description = %description, overrides = self.overrides.len(), "Override stored");
    }
}

/// Canonical form of a chord plus its parsed shortcut; empty input means
/// "disabled".
fn canonical_chord(chord: &str) -> Result<(String, Option<Shortcut>), HotkeyError> {
    if chord.trim().is_empty() {
        return Ok((String::new(), None));
    }
    let shortcut = Shortcut::parse(chord).map_err(|source| HotkeyError::InvalidChord {
        chord: chord.to_string(),
        source,
    })?;
    Ok((shortcut.to_canonical_string(), Some(shortcut)))
}
