//! Saving and restoring the mapping set through the host key-value store.
//!
//! Stored under [`STORAGE_KEY`] as `{ "version": 1, "mappings": [...] }`.
//! Every edit writes the full mapping set; loading only takes the `key` of
//! each stored mapping and applies it to the built-in command with the same
//! description, so changes to the built-in table are never shadowed by stale
//! stored copies.

use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use super::mapping::InputMapping;
use super::registry::MarkdownHotkeysConfig;
use crate::error::HotkeyError;
use crate::storage::{KeyValueStore, StorageError};

pub const STORAGE_KEY: &str = "anilist-markdown.hotkeys";

/// Format version written by [`save_hotkeys`].
pub const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct HotkeysFileRef<'a> {
    version: u32,
    mappings: &'a [InputMapping],
}

/// Lenient view of a stored mapping set. Blobs written before versioning
/// have no `version` field and are read as version 0.
#[derive(Deserialize)]
struct StoredHotkeys {
    #[serde(default)]
    version: u32,
    #[serde(default)]
    mappings: Vec<StoredKey>,
}

#[derive(Deserialize)]
struct StoredKey {
    #[serde(default)]
    key: String,
    description: String,
}

/// What a load did with the stored entries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub applied: usize,
    pub ignored: usize,
}

/// Write the full mapping set.
#[instrument(skip_all)]
pub fn save_hotkeys(
    store: &mut dyn KeyValueStore,
    config: &MarkdownHotkeysConfig,
) -> Result<(), HotkeyError> {
    let json = serde_json::to_string(&HotkeysFileRef {
        version: FORMAT_VERSION,
        mappings: config.mappings(),
    })
    .map_err(|source| StorageError::Json {
        key: STORAGE_KEY.to_string(),
        source,
    })?;
    store.set(STORAGE_KEY, &json)?;
    info!(
        mappings = config.mappings().len(),
        overrides = config.overrides().len(),
        "Saved hotkeys"
    );
    Ok(())
}

/// Merge stored keys into `config`.
///
/// Unknown commands, invalid chords and blobs from a newer format are logged
/// and skipped. Only storage failures and unreadable JSON are errors.
#[instrument(skip_all)]
pub fn load_hotkeys(
    store: &dyn KeyValueStore,
    config: &mut MarkdownHotkeysConfig,
) -> Result<LoadReport, HotkeyError> {
    let Some(json) = store.get(STORAGE_KEY)? else {
        return Ok(LoadReport::default());
    };
    let stored: StoredHotkeys = serde_json::from_str(&json).map_err(|source| StorageError::Json {
        key: STORAGE_KEY.to_string(),
        source,
    })?;

    if stored.version > FORMAT_VERSION {
        warn!(
            version = stored.version,
            supported = FORMAT_VERSION,
            "Stored hotkeys come from a newer version, using defaults"
        );
        return Ok(LoadReport {
            applied: 0,
            ignored: stored.mappings.len(),
        });
    }

    let mut report = LoadReport::default();
    for entry in stored.mappings {
        match config.restore_key(&entry.description, &entry.key) {
            Ok(()) => report.applied += 1,
            Err(error) => {
                warn!(
                    description = %entry.description,
                    key = %entry.key,
                    error = %error,
                    "Ignoring stored hotkey"
                );
                report.ignored += 1;
            }
        }
    }

    for conflict in config.find_conflicts() {
        warn!(
            chord = %conflict.chord,
            winner = %conflict.winner,
            loser = %conflict.loser,
            "Stored hotkeys share a chord, the earlier command wins"
        );
    }

    info!(
        applied = report.applied,
        ignored = report.ignored,
        version = stored.version,
        "Loaded hotkeys"
    );
    Ok(report)
}

/// Forget the stored mapping set.
pub fn clear_hotkeys(store: &mut dyn KeyValueStore) -> Result<(), HotkeyError> {
    store.remove(STORAGE_KEY)?;
    Ok(())
}
