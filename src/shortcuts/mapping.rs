//! One hotkey binding and the operation it triggers.

use serde::{Deserialize, Serialize};

use crate::editing::Delimiters;

/// Which editing operation a mapping runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MappingType {
    Wrap,
    LineStart,
    EveryLineStart,
    Video,
    Link,
    Image,
}

fn default_max_instances() -> usize {
    1
}

fn is_one(n: &usize) -> bool {
    *n == 1
}

/// A chord bound to an editing operation.
///
/// `characters` holds the wrap markers for `Wrap` and `Video` mappings and
/// the line prefix (its opening side) for `LineStart` and `EveryLineStart`.
/// An empty `key` means the mapping is disabled.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputMapping {
    #[serde(default)]
    pub key: String,
    #[serde(rename = "type")]
    pub kind: MappingType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub characters: Option<Delimiters>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_remove: Option<Delimiters>,
    #[serde(default = "default_max_instances", skip_serializing_if = "is_one")]
    pub max_instances: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    pub description: String,
}

impl InputMapping {
    fn new(key: &str, kind: MappingType, description: &str) -> Self {
        Self {
            key: key.to_string(),
            kind,
            characters: None,
            special_remove: None,
            max_instances: 1,
            regex: None,
            description: description.to_string(),
        }
    }

    pub fn wrap(key: &str, description: &str, characters: Delimiters) -> Self {
        Self {
            characters: Some(characters),
            ..Self::new(key, MappingType::Wrap, description)
        }
    }

    pub fn line_start(key: &str, description: &str, prefix: &str, max_instances: usize) -> Self {
        Self {
            characters: Some(Delimiters::symmetric(prefix)),
            max_instances,
            ..Self::new(key, MappingType::LineStart, description)
        }
    }

    pub fn every_line_start(key: &str, description: &str, prefix: &str) -> Self {
        Self {
            characters: Some(Delimiters::symmetric(prefix)),
            ..Self::new(key, MappingType::EveryLineStart, description)
        }
    }

    pub fn video(key: &str, description: &str, characters: Delimiters, regex: &str) -> Self {
        Self {
            characters: Some(characters),
            regex: Some(regex.to_string()),
            ..Self::new(key, MappingType::Video, description)
        }
    }

    pub fn link(key: &str, description: &str) -> Self {
        Self::new(key, MappingType::Link, description)
    }

    pub fn image(key: &str, description: &str) -> Self {
        Self::new(key, MappingType::Image, description)
    }

    pub fn with_special_remove(mut self, special_remove: Delimiters) -> Self {
        self.special_remove = Some(special_remove);
        self
    }

    /// Line prefix for `LineStart`/`EveryLineStart` mappings.
    pub fn prefix(&self) -> Option<&str> {
        self.characters.as_ref().map(|c| c.open.as_str())
    }

    pub fn is_disabled(&self) -> bool {
        self.key.trim().is_empty()
    }
}
