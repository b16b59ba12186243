//! Routes key presses on a text surface to editing operations.

use regex::Regex;
use tracing::{debug, warn};

use super::defaults::{IMAGE, LINK};
use super::mapping::{InputMapping, MappingType};
use super::registry::MarkdownHotkeysConfig;
use super::surface::{EditSurface, SurfaceKind};
use super::types::{KeyEvent, Shortcut};
use crate::debug_panic;
use crate::editing::{
    insert_at_every_line, line_start, wrap_image, wrap_link, wrap_selection, wrap_video_link,
    Delimiters, ImageWidth, TextBuffer,
};

/// Host state an operation may need besides the buffer.
#[derive(Clone, Debug, Default)]
pub struct DispatchContext {
    /// The user's visible selection, as the host reports it.
    pub selected_plain_text: String,
    /// Width written by the image command.
    pub image_width: ImageWidth,
}

#[derive(Clone, Debug)]
enum Action {
    Wrap {
        delimiters: Delimiters,
        special_remove: Option<Delimiters>,
    },
    LineStart {
        prefix: String,
        max_instances: usize,
    },
    EveryLineStart {
        prefix: String,
        max_instances: usize,
    },
    Video {
        delimiters: Delimiters,
        validation: Regex,
    },
    Link,
    Image,
}

impl Action {
    fn from_mapping(mapping: &InputMapping) -> Option<Self> {
        let characters = mapping.characters.clone();
        let action = match mapping.kind {
            MappingType::Wrap => Action::Wrap {
                delimiters: characters?,
                special_remove: mapping.special_remove.clone(),
            },
            MappingType::LineStart => Action::LineStart {
                prefix: characters?.open,
                max_instances: mapping.max_instances,
            },
            MappingType::EveryLineStart => Action::EveryLineStart {
                prefix: characters?.open,
                max_instances: mapping.max_instances,
            },
            MappingType::Video => {
                let pattern = mapping.regex.as_deref()?;
                let validation = match Regex::new(pattern) {
                    Ok(regex) => regex,
                    Err(error) => {
                        warn!(description = %mapping.description, error = %error, "Invalid video pattern");
                        return None;
                    }
                };
                Action::Video {
                    delimiters: characters?,
                    validation,
                }
            }
            MappingType::Link => Action::Link,
            MappingType::Image => Action::Image,
        };
        Some(action)
    }

    fn apply(&self, buffer: &TextBuffer, context: &DispatchContext) -> TextBuffer {
        match self {
            Action::Wrap {
                delimiters,
                special_remove,
            } => wrap_selection(buffer, delimiters, special_remove.as_ref(), true),
            Action::LineStart {
                prefix,
                max_instances,
            } => line_start(buffer, prefix, *max_instances),
            Action::EveryLineStart {
                prefix,
                max_instances,
            } => insert_at_every_line(buffer, prefix, *max_instances),
            Action::Video {
                delimiters,
                validation,
            } => wrap_video_link(buffer, delimiters, validation),
            Action::Link => wrap_link(buffer, &context.selected_plain_text),
            Action::Image => wrap_image(buffer, context.image_width),
        }
    }
}

#[derive(Clone, Debug)]
struct Binding {
    shortcut: Shortcut,
    description: String,
    action: Action,
}

/// Chord table built from a [`MarkdownHotkeysConfig`].
///
/// Dispatch borrows the table immutably, so it cannot be rebuilt while a key
/// press is being handled.
#[derive(Clone, Debug, Default)]
pub struct HotkeyDispatcher {
    bindings: Vec<Binding>,
}

impl HotkeyDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &MarkdownHotkeysConfig) -> Self {
        let mut dispatcher = Self::new();
        dispatcher.register(config);
        dispatcher
    }

    /// Rebuild the chord table. Disabled or invalid mappings are skipped, and
    /// a chord already taken by an earlier mapping keeps its first owner.
    pub fn register(&mut self, config: &MarkdownHotkeysConfig) {
        self.bindings.clear();

        for kind in [
            MappingType::Wrap,
            MappingType::LineStart,
            MappingType::EveryLineStart,
            MappingType::Video,
        ] {
            for mapping in config.by_type(kind) {
                self.bind(mapping);
            }
        }

        for description in [LINK, IMAGE] {
            match config.by_description(description) {
                Some(mapping) => self.bind_as(mapping, named_action(description)),
                None => debug_panic!("built-in command '{}' is missing", description),
            }
        }

        debug!(bindings = self.bindings.len(), "Hotkeys registered");
    }

    fn bind(&mut self, mapping: &InputMapping) {
        match Action::from_mapping(mapping) {
            Some(action) => self.bind_as(mapping, action),
            None => warn!(
                description = %mapping.description,
                "Hotkey mapping is incomplete, skipping"
            ),
        }
    }

    fn bind_as(&mut self, mapping: &InputMapping, action: Action) {
        if mapping.is_disabled() {
            return;
        }
        let shortcut = match Shortcut::parse(&mapping.key) {
            Ok(shortcut) => shortcut,
            Err(error) => {
                warn!(description = %mapping.description, key = %mapping.key, error = %error, "Invalid hotkey chord");
                return;
            }
        };
        if let Some(owner) = self.bindings.iter().find(|b| b.shortcut == shortcut) {
            warn!(
                chord = %shortcut.to_canonical_string(),
                winner = %owner.description,
                loser = %mapping.description,
                "Hotkey chord already bound"
            );
            return;
        }
        self.bindings.push(Binding {
            shortcut,
            description: mapping.description.clone(),
            action,
        });
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Description of the command `event` would run.
    pub fn command_for(&self, event: &KeyEvent) -> Option<&str> {
        self.bindings
            .iter()
            .find(|b| b.shortcut.matches(event))
            .map(|b| b.description.as_str())
    }

    /// Handle a key press on `surface`.
    ///
    /// Returns true when the press was consumed, in which case the host must
    /// suppress its default action. Only text areas are handled.
    pub fn dispatch(
        &self,
        event: &KeyEvent,
        surface: &mut dyn EditSurface,
        context: &DispatchContext,
    ) -> bool {
        if surface.kind() != SurfaceKind::TextArea {
            return false;
        }
        let Some(binding) = self.bindings.iter().find(|b| b.shortcut.matches(event)) else {
            return false;
        };
        apply_action(&binding.description, &binding.action, surface, context);
        true
    }
}

/// Run the command `mapping` describes on `surface`, whatever chord it is
/// bound to. Returns false for surfaces other than text areas and for
/// incomplete mappings.
pub fn run_mapping(
    mapping: &InputMapping,
    surface: &mut dyn EditSurface,
    context: &DispatchContext,
) -> bool {
    if surface.kind() != SurfaceKind::TextArea {
        return false;
    }
    let Some(action) = Action::from_mapping(mapping) else {
        warn!(description = %mapping.description, "Hotkey mapping is incomplete");
        return false;
    };
    apply_action(&mapping.description, &action, surface, context);
    true
}

fn apply_action(
    description: &str,
    action: &Action,
    surface: &mut dyn EditSurface,
    context: &DispatchContext,
) {
    let before = surface.buffer();
    let after = action.apply(&before, context);
    debug!(
        command = %description,
        changed = before != after,
        start = after.selection().start,
        end = after.selection().end,
        "Hotkey dispatched"
    );
    surface.set_buffer(after);
}

/// Action for a command looked up by description.
fn named_action(description: &str) -> Action {
    if description == IMAGE {
        Action::Image
    } else {
        Action::Link
    }
}
