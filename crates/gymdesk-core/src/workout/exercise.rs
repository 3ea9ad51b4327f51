use serde::{Deserialize, Serialize};

/// A named movement with its demonstration video. Keyed by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Exercise {
    pub name: String,
    /// Resolved, playable video reference (URL or local path).
    pub video: String,
}

impl Exercise {
    pub fn new(name: impl Into<String>, video: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            video: video.into(),
        }
    }
}

/// Display name for a blob file such as `jumping_jacks.mp4` -> `Jumping Jacks`.
pub fn name_from_file(file: &str) -> String {
    let stem = file
        .rsplit('/')
        .next()
        .unwrap_or(file)
        .split('.')
        .next()
        .unwrap_or_default();

    stem.split(['_', '-', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
