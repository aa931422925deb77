#![forbid(unsafe_code)]

use super::Header;
use super::secondary::*;
use crate::ids::Handle;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Female,
    Male,
    #[default]
    Unknown,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Person {
    #[serde(flatten)]
    pub header: Header,
    pub names: Vec<Name>,
    pub gender: Gender,
    pub addresses: Vec<Address>,
    pub attributes: Vec<Attribute>,
    pub urls: Vec<Url>,
    pub media_refs: Vec<MediaRef>,
    pub source_refs: Vec<SourceRef>,
    pub notes: Vec<NoteRef>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Family {
    #[serde(flatten)]
    pub header: Header,
    pub relationship: String,
    pub attributes: Vec<Attribute>,
    pub media_refs: Vec<MediaRef>,
    pub source_refs: Vec<SourceRef>,
    pub notes: Vec<NoteRef>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Event {
    #[serde(flatten)]
    pub header: Header,
    #[serde(rename = "event_type")]
    pub kind: String,
    pub date: String,
    pub description: String,
    pub attributes: Vec<Attribute>,
    pub media_refs: Vec<MediaRef>,
    pub source_refs: Vec<SourceRef>,
    pub notes: Vec<NoteRef>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Place {
    #[serde(flatten)]
    pub header: Header,
    pub title: String,
    pub latitude: String,
    pub longitude: String,
    pub urls: Vec<Url>,
    pub media_refs: Vec<MediaRef>,
    pub source_refs: Vec<SourceRef>,
    pub notes: Vec<NoteRef>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Source {
    #[serde(flatten)]
    pub header: Header,
    pub title: String,
    pub author: String,
    pub pubinfo: String,
    pub abbrev: String,
    /// Free-form key/value data attached to the source.
    pub data: BTreeMap<String, String>,
    pub repo_refs: Vec<RepoRef>,
    pub notes: Vec<NoteRef>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Repository {
    #[serde(flatten)]
    pub header: Header,
    pub name: String,
    #[serde(rename = "repository_type")]
    pub kind: String,
    pub addresses: Vec<Address>,
    pub urls: Vec<Url>,
    pub source_refs: Vec<SourceRef>,
    pub notes: Vec<NoteRef>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Media {
    #[serde(flatten)]
    pub header: Header,
    pub path: String,
    pub mime: String,
    pub description: String,
    pub date: String,
    pub attributes: Vec<Attribute>,
    pub source_refs: Vec<SourceRef>,
    pub notes: Vec<NoteRef>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Note {
    #[serde(flatten)]
    pub header: Header,
    pub text: String,
    #[serde(rename = "note_type")]
    pub kind: String,
}

macro_rules! impl_with_handle {
    ($($ty:ident),* $(,)?) => {
        $(
            impl $ty {
                pub fn with_handle(mut self, handle: Handle) -> Self {
                    self.header.handle = handle;
                    self
                }

                pub fn handle(&self) -> &Handle {
                    &self.header.handle
                }
            }
        )*
    };
}

impl_with_handle!(Person, Family, Event, Place, Source, Repository, Media, Note);

impl Source {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

impl Repository {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Media {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }
}

impl Note {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

impl Person {
    pub fn named(first_name: impl Into<String>, surname: impl Into<String>) -> Self {
        Self {
            names: vec![Name::new(first_name, surname)],
            ..Self::default()
        }
    }
}
