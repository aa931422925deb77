#![forbid(unsafe_code)]

use crate::equivalence::merge_lists;
use crate::ids::RecordKind;
use crate::schema::{Header, Media, Note, Record, Repository, Source};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A scalar field whose winner the caller picks when two records are merged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeField {
    GrampsId,
    Privacy,
    Title,
    Author,
    PubInfo,
    Abbrev,
    Name,
    RepositoryKind,
    Path,
    Mime,
    Description,
    Date,
    Text,
    NoteKind,
}

impl MergeField {
    pub const ALL: [MergeField; 14] = [
        MergeField::GrampsId,
        MergeField::Privacy,
        MergeField::Title,
        MergeField::Author,
        MergeField::PubInfo,
        MergeField::Abbrev,
        MergeField::Name,
        MergeField::RepositoryKind,
        MergeField::Path,
        MergeField::Mime,
        MergeField::Description,
        MergeField::Date,
        MergeField::Text,
        MergeField::NoteKind,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MergeField::GrampsId => "gramps_id",
            MergeField::Privacy => "privacy",
            MergeField::Title => "title",
            MergeField::Author => "author",
            MergeField::PubInfo => "pubinfo",
            MergeField::Abbrev => "abbrev",
            MergeField::Name => "name",
            MergeField::RepositoryKind => "repository_kind",
            MergeField::Path => "path",
            MergeField::Mime => "mime",
            MergeField::Description => "description",
            MergeField::Date => "date",
            MergeField::Text => "text",
            MergeField::NoteKind => "note_kind",
        }
    }

    pub fn applies_to(self, kind: RecordKind) -> bool {
        use MergeField::*;
        match self {
            GrampsId | Privacy => kind.is_referenceable(),
            Title | Author | PubInfo | Abbrev => kind == RecordKind::Source,
            Name | RepositoryKind => kind == RecordKind::Repository,
            Path | Mime | Description | Date => kind == RecordKind::Media,
            Text | NoteKind => kind == RecordKind::Note,
        }
    }
}

impl fmt::Display for MergeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergeField {
    type Err = MergeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        MergeField::ALL
            .into_iter()
            .find(|field| field.as_str() == lowered)
            .ok_or_else(|| MergeError::UnknownField(s.to_string()))
    }
}

/// Fields for which the donor's value wins. Every other scalar keeps the
/// survivor's value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldPicks(BTreeSet<MergeField>);

impl FieldPicks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(mut self, field: MergeField) -> Self {
        self.0.insert(field);
        self
    }

    pub fn donor_wins(&self, field: MergeField) -> bool {
        self.0.contains(&field)
    }

    pub fn fields(&self) -> impl Iterator<Item = MergeField> + '_ {
        self.0.iter().copied()
    }

    pub fn validate(&self, kind: RecordKind) -> Result<(), MergeError> {
        match self.fields().find(|field| !field.applies_to(kind)) {
            Some(field) => Err(MergeError::FieldNotApplicable { field, kind }),
            None => Ok(()),
        }
    }
}

impl FromIterator<MergeField> for FieldPicks {
    fn from_iter<I: IntoIterator<Item = MergeField>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MergeError {
    KindMismatch {
        survivor: RecordKind,
        donor: RecordKind,
    },
    NotMergeable(RecordKind),
    FieldNotApplicable {
        field: MergeField,
        kind: RecordKind,
    },
    UnknownField(String),
}

impl fmt::Display for MergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KindMismatch { survivor, donor } => {
                write!(f, "cannot merge a {donor} into a {survivor}")
            }
            Self::NotMergeable(kind) => write!(f, "{kind} records cannot be merged"),
            Self::FieldNotApplicable { field, kind } => {
                write!(f, "field {field} does not apply to {kind} records")
            }
            Self::UnknownField(raw) => write!(f, "unknown merge field: {raw}"),
        }
    }
}

impl std::error::Error for MergeError {}

fn pick<T: Clone>(picks: &FieldPicks, field: MergeField, survivor: &mut T, donor: &T) {
    if picks.donor_wins(field) {
        *survivor = donor.clone();
    }
}

fn merge_header(picks: &FieldPicks, survivor: &mut Header, donor: &Header) {
    pick(picks, MergeField::GrampsId, &mut survivor.gramps_id, &donor.gramps_id);
    pick(picks, MergeField::Privacy, &mut survivor.private, &donor.private);
}

pub fn merge_sources(survivor: &mut Source, donor: &Source, picks: &FieldPicks) {
    merge_header(picks, &mut survivor.header, &donor.header);
    pick(picks, MergeField::Title, &mut survivor.title, &donor.title);
    pick(picks, MergeField::Author, &mut survivor.author, &donor.author);
    pick(picks, MergeField::PubInfo, &mut survivor.pubinfo, &donor.pubinfo);
    pick(picks, MergeField::Abbrev, &mut survivor.abbrev, &donor.abbrev);
    for (key, value) in &donor.data {
        survivor
            .data
            .entry(key.clone())
            .or_insert_with(|| value.clone());
    }
    merge_lists(&mut survivor.repo_refs, &donor.repo_refs);
    merge_lists(&mut survivor.notes, &donor.notes);
}

pub fn merge_repositories(survivor: &mut Repository, donor: &Repository, picks: &FieldPicks) {
    merge_header(picks, &mut survivor.header, &donor.header);
    pick(picks, MergeField::Name, &mut survivor.name, &donor.name);
    pick(picks, MergeField::RepositoryKind, &mut survivor.kind, &donor.kind);
    merge_lists(&mut survivor.addresses, &donor.addresses);
    merge_lists(&mut survivor.urls, &donor.urls);
    merge_lists(&mut survivor.source_refs, &donor.source_refs);
    merge_lists(&mut survivor.notes, &donor.notes);
}

pub fn merge_media(survivor: &mut Media, donor: &Media, picks: &FieldPicks) {
    merge_header(picks, &mut survivor.header, &donor.header);
    pick(picks, MergeField::Path, &mut survivor.path, &donor.path);
    pick(picks, MergeField::Mime, &mut survivor.mime, &donor.mime);
    pick(picks, MergeField::Description, &mut survivor.description, &donor.description);
    pick(picks, MergeField::Date, &mut survivor.date, &donor.date);
    merge_lists(&mut survivor.attributes, &donor.attributes);
    merge_lists(&mut survivor.source_refs, &donor.source_refs);
    merge_lists(&mut survivor.notes, &donor.notes);
}

pub fn merge_notes(survivor: &mut Note, donor: &Note, picks: &FieldPicks) {
    merge_header(picks, &mut survivor.header, &donor.header);
    pick(picks, MergeField::Text, &mut survivor.text, &donor.text);
    pick(picks, MergeField::NoteKind, &mut survivor.kind, &donor.kind);
}

/// Merges `donor` into `survivor` in place. The donor is not touched; removing
/// it and rewriting its referrers is the caller's job. Whether the two handles
/// differ is not checked here.
pub fn merge_records(
    survivor: &mut Record,
    donor: &Record,
    picks: &FieldPicks,
) -> Result<(), MergeError> {
    let kind = survivor.kind();
    if kind != donor.kind() {
        return Err(MergeError::KindMismatch {
            survivor: kind,
            donor: donor.kind(),
        });
    }
    if !kind.is_referenceable() {
        return Err(MergeError::NotMergeable(kind));
    }
    picks.validate(kind)?;
    match (survivor, donor) {
        (Record::Source(s), Record::Source(d)) => merge_sources(s, d, picks),
        (Record::Repository(s), Record::Repository(d)) => merge_repositories(s, d, picks),
        (Record::Media(s), Record::Media(d)) => merge_media(s, d, picks),
        (Record::Note(s), Record::Note(d)) => merge_notes(s, d, picks),
        _ => return Err(MergeError::NotMergeable(kind)),
    }
    Ok(())
}
