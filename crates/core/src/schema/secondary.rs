#![forbid(unsafe_code)]

use crate::equivalence::{Secondary, fill_if_empty, merge_lists};
use crate::ids::Handle;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteRef(pub Handle);

impl Secondary for NoteRef {
    fn same_identity(&self, other: &Self) -> bool {
        self.0 == other.0
    }

    fn absorb(&mut self, _other: Self) {}
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    VeryLow,
    Low,
    #[default]
    Normal,
    High,
    VeryHigh,
}

/// Citation of a Source. `page` is the qualifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub source: Handle,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub page: String,
    #[serde(default)]
    pub confidence: Confidence,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub notes: Vec<NoteRef>,
}

impl SourceRef {
    pub fn new(source: Handle) -> Self {
        Self {
            source,
            private: false,
            page: String::new(),
            confidence: Confidence::default(),
            date: String::new(),
            notes: Vec::new(),
        }
    }

    pub fn with_page(mut self, page: impl Into<String>) -> Self {
        self.page = page.into();
        self
    }

    pub fn with_note(mut self, note: Handle) -> Self {
        self.notes.push(NoteRef(note));
        self
    }
}

impl Secondary for SourceRef {
    fn same_identity(&self, other: &Self) -> bool {
        self.source == other.source
    }

    fn absorb(&mut self, other: Self) {
        self.private |= other.private;
        fill_if_empty(&mut self.page, other.page);
        fill_if_empty(&mut self.date, other.date);
        merge_lists(&mut self.notes, &other.notes);
    }
}

/// Holding of a Source in a Repository. `call_number` is the qualifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRef {
    pub repository: Handle,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub call_number: String,
    #[serde(default)]
    pub media_type: String,
    #[serde(default)]
    pub notes: Vec<NoteRef>,
}

impl RepoRef {
    pub fn new(repository: Handle) -> Self {
        Self {
            repository,
            private: false,
            call_number: String::new(),
            media_type: String::new(),
            notes: Vec::new(),
        }
    }

    pub fn with_call_number(mut self, call_number: impl Into<String>) -> Self {
        self.call_number = call_number.into();
        self
    }
}

impl Secondary for RepoRef {
    fn same_identity(&self, other: &Self) -> bool {
        self.repository == other.repository
    }

    fn absorb(&mut self, other: Self) {
        self.private |= other.private;
        fill_if_empty(&mut self.call_number, other.call_number);
        fill_if_empty(&mut self.media_type, other.media_type);
        merge_lists(&mut self.notes, &other.notes);
    }
}

/// Rectangle of an image in percent, `(x1, y1)` top-left to `(x2, y2)` bottom-right.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Region {
    pub x1: u8,
    pub y1: u8,
    pub x2: u8,
    pub y2: u8,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    pub media: Handle,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub region: Option<Region>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    #[serde(default)]
    pub source_refs: Vec<SourceRef>,
    #[serde(default)]
    pub notes: Vec<NoteRef>,
}

impl MediaRef {
    pub fn new(media: Handle) -> Self {
        Self {
            media,
            private: false,
            region: None,
            attributes: Vec::new(),
            source_refs: Vec::new(),
            notes: Vec::new(),
        }
    }

    pub fn with_region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }
}

impl Secondary for MediaRef {
    fn same_identity(&self, other: &Self) -> bool {
        self.media == other.media && self.region == other.region
    }

    fn absorb(&mut self, other: Self) {
        self.private |= other.private;
        merge_lists(&mut self.attributes, &other.attributes);
        merge_lists(&mut self.source_refs, &other.source_refs);
        merge_lists(&mut self.notes, &other.notes);
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub kind: String,
    pub value: String,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub source_refs: Vec<SourceRef>,
    #[serde(default)]
    pub notes: Vec<NoteRef>,
}

impl Attribute {
    pub fn new(kind: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            value: value.into(),
            ..Self::default()
        }
    }
}

impl Secondary for Attribute {
    fn same_identity(&self, other: &Self) -> bool {
        self.kind == other.kind && self.value == other.value
    }

    fn absorb(&mut self, other: Self) {
        self.private |= other.private;
        merge_lists(&mut self.source_refs, &other.source_refs);
        merge_lists(&mut self.notes, &other.notes);
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub postal: String,
    pub phone: String,
    pub date: String,
    pub private: bool,
    pub source_refs: Vec<SourceRef>,
    pub notes: Vec<NoteRef>,
}

impl Address {
    fn location(&self) -> [&str; 7] {
        [
            self.street.as_str(),
            self.city.as_str(),
            self.state.as_str(),
            self.country.as_str(),
            self.postal.as_str(),
            self.phone.as_str(),
            self.date.as_str(),
        ]
    }
}

impl Secondary for Address {
    fn same_identity(&self, other: &Self) -> bool {
        self.location() == other.location()
    }

    fn absorb(&mut self, other: Self) {
        self.private |= other.private;
        merge_lists(&mut self.source_refs, &other.source_refs);
        merge_lists(&mut self.notes, &other.notes);
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Url {
    pub path: String,
    pub description: String,
    pub kind: String,
    pub private: bool,
}

impl Url {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

impl Secondary for Url {
    fn same_identity(&self, other: &Self) -> bool {
        self.path == other.path && self.description == other.description && self.kind == other.kind
    }

    fn absorb(&mut self, other: Self) {
        self.private |= other.private;
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Name {
    pub first_name: String,
    pub surname: String,
    pub suffix: String,
    pub title: String,
    pub private: bool,
    pub source_refs: Vec<SourceRef>,
    pub notes: Vec<NoteRef>,
}

impl Name {
    pub fn new(first_name: impl Into<String>, surname: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            surname: surname.into(),
            ..Self::default()
        }
    }
}

impl Secondary for Name {
    fn same_identity(&self, other: &Self) -> bool {
        self.first_name == other.first_name
            && self.surname == other.surname
            && self.suffix == other.suffix
            && self.title == other.title
    }

    fn absorb(&mut self, other: Self) {
        self.private |= other.private;
        merge_lists(&mut self.source_refs, &other.source_refs);
        merge_lists(&mut self.notes, &other.notes);
    }
}
