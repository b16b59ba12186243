//! Mapping set, dispatcher and storage kept in step.
//!
//! Backs the per-editor hotkey popover: every row is a command with its
//! current chord, capturing a chord rebinds and persists immediately, and
//! reset goes back to the built-in table. The dispatcher is rebuilt after
//! each change, never during a dispatch.

use tracing::{info, warn};

use super::dispatcher::{run_mapping, DispatchContext, HotkeyDispatcher};
use super::persistence::{load_hotkeys, save_hotkeys};
use super::registry::MarkdownHotkeysConfig;
use super::surface::EditSurface;
use super::types::{is_known_key, KeyEvent, Shortcut, ShortcutParseError};
use crate::error::{self, HotkeyError, ResultExt};
use crate::storage::KeyValueStore;

/// One line of the hotkey popover.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettingsRow {
    pub description: String,
    /// Canonical chord, empty when disabled.
    pub key: String,
    /// Platform display form, empty when disabled.
    pub display: String,
    pub customized: bool,
}

/// User hotkeys backed by a key-value store.
pub struct MarkdownHotkeys<S: KeyValueStore> {
    config: MarkdownHotkeysConfig,
    dispatcher: HotkeyDispatcher,
    store: S,
    enabled: bool,
}

impl<S: KeyValueStore> MarkdownHotkeys<S> {
    /// Built-in table with the stored overrides merged in. A stored set that
    /// cannot be read is logged and the defaults are used.
    pub fn load(store: S) -> Self {
        let mut config = MarkdownHotkeysConfig::new();
        load_hotkeys(&store, &mut config).warn_on_err();
        let dispatcher = HotkeyDispatcher::from_config(&config);
        Self {
            config,
            dispatcher,
            store,
            enabled: true,
        }
    }

    pub fn config(&self) -> &MarkdownHotkeysConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &HotkeyDispatcher {
        &self.dispatcher
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn rows(&self) -> Vec<SettingsRow> {
        self.config
            .mappings()
            .iter()
            .map(|mapping| SettingsRow {
                description: mapping.description.clone(),
                key: mapping.key.clone(),
                display: Shortcut::parse(&mapping.key)
                    .map(|s| s.display())
                    .unwrap_or_default(),
                customized: self.config.is_overridden(&mapping.description),
            })
            .collect()
    }

    /// Rebind `description` to `chord` (empty disables), persist, re-register.
    pub fn set_key(&mut self, description: &str, chord: &str) -> Result<(), HotkeyError> {
        self.config.set_key(description, chord)?;
        self.commit()
    }

    /// Rebind `description` to the chord the user just pressed.
    pub fn capture(&mut self, description: &str, event: &KeyEvent) -> Result<(), HotkeyError> {
        let shortcut = Shortcut::new(event.key.as_str(), event.modifiers);
        if !is_known_key(&shortcut.key) {
            return Err(HotkeyError::InvalidChord {
                chord: event.key.clone(),
                source: ShortcutParseError::UnknownKey(event.key.clone()),
            });
        }
        self.set_key(description, &shortcut.to_canonical_string())
    }

    /// Back to the built-in table.
    pub fn reset(&mut self) -> Result<(), HotkeyError> {
        self.config.reset();
        self.commit()
    }

    /// Handle a key press; see [`HotkeyDispatcher::dispatch`].
    pub fn dispatch(
        &self,
        event: &KeyEvent,
        surface: &mut dyn EditSurface,
        context: &DispatchContext,
    ) -> bool {
        self.enabled && self.dispatcher.dispatch(event, surface, context)
    }

    /// Run the command named `description` on `surface` without going
    /// through its chord, so a shadowed binding still runs its own command.
    ///
    /// Returns false when hotkeys are off, the command has no chord bound,
    /// or the surface is not a text area.
    pub fn run_command(
        &self,
        description: &str,
        surface: &mut dyn EditSurface,
        context: &DispatchContext,
    ) -> error::Result<bool> {
        let mapping = self
            .config
            .by_description(description)
            .ok_or_else(|| HotkeyError::UnknownCommand(description.to_string()))?;
        if !self.enabled || mapping.is_disabled() {
            return Ok(false);
        }
        Ok(run_mapping(mapping, surface, context))
    }

    fn commit(&mut self) -> Result<(), HotkeyError> {
        self.dispatcher.register(&self.config);
        if let Err(error) = save_hotkeys(&mut self.store, &self.config) {
            warn!(error = %error, "Hotkeys changed but could not be saved");
            return Err(error);
        }
        info!(
            bindings = self.dispatcher.len(),
            overrides = self.config.overrides().len(),
            "Hotkeys updated"
        );
        Ok(())
    }
}
