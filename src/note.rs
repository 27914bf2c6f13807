//! Free-text notes

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::record::{now_timestamp, RecordId};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Note {
    id: RecordId,
    #[serde(deserialize_with = "crate::record::lenient")]
    title: String,
    #[serde(deserialize_with = "crate::record::lenient")]
    content: String,
    #[serde(deserialize_with = "crate::record::lenient")]
    category: String,
    /// Comma-separated, e.g. `urgente,mercado`
    #[serde(deserialize_with = "crate::record::lenient")]
    tags: String,
    /// A colour name, e.g. `azul`
    #[serde(deserialize_with = "crate::record::lenient")]
    color: String,
    /// Pinned notes are shown first
    #[serde(deserialize_with = "crate::record::lenient")]
    is_pinned: bool,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "crate::record::lenient")]
    created_at: Option<String>,
    /// Changed whenever the text of the note changes. Pinning does not count
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "crate::record::lenient")]
    updated_at: Option<String>,

    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl_record!(Note, "notes");

impl Note {
    pub fn new(title: String, content: String, category: String) -> Self {
        let now = now_timestamp();
        Self {
            title,
            content,
            category,
            created_at: Some(now.clone()),
            updated_at: Some(now),
            ..Self::default()
        }
    }

    pub fn id(&self) -> &RecordId   { &self.id        }
    pub fn title(&self) -> &str     { &self.title     }
    pub fn content(&self) -> &str   { &self.content   }
    pub fn category(&self) -> &str  { &self.category  }
    pub fn tags(&self) -> &str      { &self.tags      }
    pub fn color(&self) -> &str     { &self.color     }
    pub fn is_pinned(&self) -> bool { self.is_pinned  }
    pub fn created_at(&self) -> Option<&str> { self.created_at.as_deref() }
    pub fn updated_at(&self) -> Option<&str> { self.updated_at.as_deref() }

    /// The tags, trimmed, without the empty ones
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags.split(',')
            .map(str::trim)
            .filter(|tag| tag.is_empty() == false)
            .collect()
    }

    pub fn set_title(&mut self, new_title: String) {
        self.title = new_title;
        self.touch();
    }

    pub fn set_content(&mut self, new_content: String) {
        self.content = new_content;
        self.touch();
    }

    pub fn set_category(&mut self, new_category: String) {
        self.category = new_category;
        self.touch();
    }

    pub fn set_tags(&mut self, new_tags: String) {
        self.tags = new_tags;
        self.touch();
    }

    pub fn set_color(&mut self, new_color: String) {
        self.color = new_color;
        self.touch();
    }

    pub fn set_pinned(&mut self, pinned: bool) {
        self.is_pinned = pinned;
    }

    pub fn toggle_pinned(&mut self) {
        self.is_pinned = !self.is_pinned;
    }

    fn touch(&mut self) {
        self.updated_at = Some(now_timestamp());
    }

    /// Whether the title, the content or the tags contain `query` (case-insensitive).
    /// An empty query matches every note
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.title.to_lowercase().contains(&query)
            || self.content.to_lowercase().contains(&query)
            || self.tags.to_lowercase().contains(&query)
    }
}

/// Filter `notes` with [`Note::matches`], pinned notes first. The order is kept otherwise
pub fn search<'a>(notes: &'a [Note], query: &str) -> Vec<&'a Note> {
    let (mut pinned, regular): (Vec<&Note>, Vec<&Note>) = notes.iter()
        .filter(|note| note.matches(query))
        .partition(|note| note.is_pinned());
    pinned.extend(regular);
    pinned
}
