#![forbid(unsafe_code)]

use crate::equivalence::{Reference, collapse_where};
use crate::ids::{Handle, RecordKind};
use crate::schema::*;
use std::collections::BTreeSet;

/// An object holding an ordered list of references of one kind, plus nested
/// owned objects that may hold more of them.
///
/// Nested owners are owned values, so the child graph is a tree and every
/// recursive operation terminates. Target handles are never validated here: a
/// reference to a missing record is carried along like any other.
pub trait ReferenceOwner<R: Reference> {
    fn references(&self) -> &[R];

    fn references_mut(&mut self) -> &mut Vec<R>;

    fn for_each_child(&self, _visit: &mut dyn FnMut(&dyn ReferenceOwner<R>)) {}

    fn for_each_child_mut(&mut self, _visit: &mut dyn FnMut(&mut dyn ReferenceOwner<R>)) {}

    /// Appends without any duplicate check.
    fn add_reference(&mut self, reference: R) {
        self.references_mut().push(reference);
    }

    fn set_references(&mut self, references: Vec<R>) {
        *self.references_mut() = references;
    }

    fn has_reference_to(&self, handle: &Handle) -> bool {
        if self.references().iter().any(|r| r.target() == handle) {
            return true;
        }
        let mut found = false;
        self.for_each_child(&mut |child| {
            if !found && child.has_reference_to(handle) {
                found = true;
            }
        });
        found
    }

    fn remove_references_to(&mut self, handles: &BTreeSet<Handle>) {
        self.references_mut()
            .retain(|r| !handles.contains(r.target()));
        self.for_each_child_mut(&mut |child| child.remove_references_to(handles));
    }

    /// Retargets every reference to `old` at `new`, then collapses the
    /// references to `new` in each list (first occurrence wins).
    fn replace_reference(&mut self, old: &Handle, new: &Handle) {
        let list = self.references_mut();
        for reference in list.iter_mut() {
            if reference.target() == old {
                reference.set_target(new.clone());
            }
        }
        collapse_where(list, |r| r.target() == new);
        self.for_each_child_mut(&mut |child| child.replace_reference(old, new));
    }

    /// Every target handle reachable from this owner, first-seen order, no repeats.
    fn referenced_handles(&self) -> Vec<Handle> {
        let mut out = Vec::new();
        collect_handles(self, &mut out);
        out
    }
}

fn collect_handles<R: Reference, O: ReferenceOwner<R> + ?Sized>(owner: &O, out: &mut Vec<Handle>) {
    for reference in owner.references() {
        if !out.contains(reference.target()) {
            out.push(reference.target().clone());
        }
    }
    owner.for_each_child(&mut |child| collect_handles(child, out));
}

macro_rules! owns {
    ($owner:ty => $reference:ty, $field:ident) => {
        impl ReferenceOwner<$reference> for $owner {
            fn references(&self) -> &[$reference] {
                &self.$field
            }

            fn references_mut(&mut self) -> &mut Vec<$reference> {
                &mut self.$field
            }
        }
    };
    ($owner:ty => $reference:ty, $field:ident, [$($child:ident),+ $(,)?]) => {
        impl ReferenceOwner<$reference> for $owner {
            fn references(&self) -> &[$reference] {
                &self.$field
            }

            fn references_mut(&mut self) -> &mut Vec<$reference> {
                &mut self.$field
            }

            fn for_each_child(&self, visit: &mut dyn FnMut(&dyn ReferenceOwner<$reference>)) {
                $(
                    for child in &self.$child {
                        visit(child);
                    }
                )+
            }

            fn for_each_child_mut(
                &mut self,
                visit: &mut dyn FnMut(&mut dyn ReferenceOwner<$reference>),
            ) {
                $(
                    for child in &mut self.$child {
                        visit(child);
                    }
                )+
            }
        }
    };
}

// Source citations.
owns!(Person => SourceRef, source_refs, [names, addresses, attributes, media_refs]);
owns!(Family => SourceRef, source_refs, [attributes, media_refs]);
owns!(Event => SourceRef, source_refs, [attributes, media_refs]);
owns!(Place => SourceRef, source_refs, [media_refs]);
owns!(Repository => SourceRef, source_refs, [addresses]);
owns!(Media => SourceRef, source_refs, [attributes]);
owns!(MediaRef => SourceRef, source_refs, [attributes]);
owns!(Name => SourceRef, source_refs);
owns!(Address => SourceRef, source_refs);
owns!(Attribute => SourceRef, source_refs);

// Repository holdings.
owns!(Source => RepoRef, repo_refs);

// Media links.
owns!(Person => MediaRef, media_refs);
owns!(Family => MediaRef, media_refs);
owns!(Event => MediaRef, media_refs);
owns!(Place => MediaRef, media_refs);

// Notes.
owns!(Person => NoteRef, notes, [names, addresses, attributes, source_refs, media_refs]);
owns!(Family => NoteRef, notes, [attributes, source_refs, media_refs]);
owns!(Event => NoteRef, notes, [attributes, source_refs, media_refs]);
owns!(Place => NoteRef, notes, [source_refs, media_refs]);
owns!(Source => NoteRef, notes, [repo_refs]);
owns!(Repository => NoteRef, notes, [addresses, source_refs]);
owns!(Media => NoteRef, notes, [attributes, source_refs]);
owns!(MediaRef => NoteRef, notes, [attributes, source_refs]);
owns!(Attribute => NoteRef, notes, [source_refs]);
owns!(Address => NoteRef, notes, [source_refs]);
owns!(Name => NoteRef, notes, [source_refs]);
owns!(SourceRef => NoteRef, notes);
owns!(RepoRef => NoteRef, notes);

macro_rules! dispatch_owner {
    ($record:expr => $as:ty; $($variant:ident),+) => {
        match $record {
            $(Record::$variant(inner) => Some(inner as $as),)+
            #[allow(unreachable_patterns)]
            _ => None,
        }
    };
}

impl Reference for SourceRef {
    const TARGET: RecordKind = RecordKind::Source;

    fn target(&self) -> &Handle {
        &self.source
    }

    fn set_target(&mut self, handle: Handle) {
        self.source = handle;
    }

    fn owner(record: &Record) -> Option<&dyn ReferenceOwner<Self>> {
        dispatch_owner!(record => &dyn ReferenceOwner<Self>; Person, Family, Event, Place, Repository, Media)
    }

    fn owner_mut(record: &mut Record) -> Option<&mut dyn ReferenceOwner<Self>> {
        dispatch_owner!(record => &mut dyn ReferenceOwner<Self>; Person, Family, Event, Place, Repository, Media)
    }
}

impl Reference for RepoRef {
    const TARGET: RecordKind = RecordKind::Repository;

    fn target(&self) -> &Handle {
        &self.repository
    }

    fn set_target(&mut self, handle: Handle) {
        self.repository = handle;
    }

    fn owner(record: &Record) -> Option<&dyn ReferenceOwner<Self>> {
        dispatch_owner!(record => &dyn ReferenceOwner<Self>; Source)
    }

    fn owner_mut(record: &mut Record) -> Option<&mut dyn ReferenceOwner<Self>> {
        dispatch_owner!(record => &mut dyn ReferenceOwner<Self>; Source)
    }
}

impl Reference for MediaRef {
    const TARGET: RecordKind = RecordKind::Media;

    fn target(&self) -> &Handle {
        &self.media
    }

    fn set_target(&mut self, handle: Handle) {
        self.media = handle;
    }

    fn owner(record: &Record) -> Option<&dyn ReferenceOwner<Self>> {
        dispatch_owner!(record => &dyn ReferenceOwner<Self>; Person, Family, Event, Place)
    }

    fn owner_mut(record: &mut Record) -> Option<&mut dyn ReferenceOwner<Self>> {
        dispatch_owner!(record => &mut dyn ReferenceOwner<Self>; Person, Family, Event, Place)
    }
}

impl Reference for NoteRef {
    const TARGET: RecordKind = RecordKind::Note;

    fn target(&self) -> &Handle {
        &self.0
    }

    fn set_target(&mut self, handle: Handle) {
        self.0 = handle;
    }

    fn owner(record: &Record) -> Option<&dyn ReferenceOwner<Self>> {
        dispatch_owner!(record => &dyn ReferenceOwner<Self>; Person, Family, Event, Place, Source, Repository, Media)
    }

    fn owner_mut(record: &mut Record) -> Option<&mut dyn ReferenceOwner<Self>> {
        dispatch_owner!(record => &mut dyn ReferenceOwner<Self>; Person, Family, Event, Place, Source, Repository, Media)
    }
}

/// Runs `$body` with `$r` bound to the reference type targeting `$kind`, or
/// evaluates `$none` for kinds nothing can reference.
macro_rules! with_reference_type {
    ($kind:expr, $r:ident => $body:expr, $none:expr) => {
        match $kind {
            RecordKind::Source => {
                type $r = SourceRef;
                $body
            }
            RecordKind::Repository => {
                type $r = RepoRef;
                $body
            }
            RecordKind::Media => {
                type $r = MediaRef;
                $body
            }
            RecordKind::Note => {
                type $r = NoteRef;
                $body
            }
            RecordKind::Person | RecordKind::Family | RecordKind::Event | RecordKind::Place => $none,
        }
    };
}

/// Drops exact duplicates from every owned secondary list, deepest lists first.
trait DropIdentical {
    fn drop_identical(&mut self);
}

macro_rules! drops_identical {
    ($($owner:ty => [$($list:ident),* $(,)?];)+) => {
        $(
            impl DropIdentical for $owner {
                fn drop_identical(&mut self) {
                    $(
                        for item in &mut self.$list {
                            item.drop_identical();
                        }
                        collapse_where(&mut self.$list, |_| false);
                    )*
                }
            }
        )+
    };
}

drops_identical! {
    NoteRef => [];
    Url => [];
    SourceRef => [notes];
    RepoRef => [notes];
    Attribute => [source_refs, notes];
    Address => [source_refs, notes];
    Name => [source_refs, notes];
    MediaRef => [attributes, source_refs, notes];
    Person => [names, addresses, attributes, urls, media_refs, source_refs, notes];
    Family => [attributes, media_refs, source_refs, notes];
    Event => [attributes, media_refs, source_refs, notes];
    Place => [urls, media_refs, source_refs, notes];
    Source => [repo_refs, notes];
    Repository => [addresses, urls, source_refs, notes];
    Media => [attributes, source_refs, notes];
    Note => [];
}

impl DropIdentical for Record {
    fn drop_identical(&mut self) {
        match self {
            Record::Person(inner) => inner.drop_identical(),
            Record::Family(inner) => inner.drop_identical(),
            Record::Event(inner) => inner.drop_identical(),
            Record::Place(inner) => inner.drop_identical(),
            Record::Source(inner) => inner.drop_identical(),
            Record::Repository(inner) => inner.drop_identical(),
            Record::Media(inner) => inner.drop_identical(),
            Record::Note(inner) => inner.drop_identical(),
        }
    }
}

impl Record {
    /// True when this record (or anything it owns) references the record of
    /// kind `target` with `handle`.
    pub fn references(&self, target: RecordKind, handle: &Handle) -> bool {
        with_reference_type!(
            target,
            R => R::owner(self).is_some_and(|owner| owner.has_reference_to(handle)),
            false
        )
    }

    /// Retargets every `target`-kind reference to `old` at `new`. Afterwards no
    /// secondary list of the record holds two identical entries, including
    /// parents whose nested references were the only difference.
    pub fn replace_reference(&mut self, target: RecordKind, old: &Handle, new: &Handle) {
        with_reference_type!(
            target,
            R => {
                if let Some(owner) = R::owner_mut(self) {
                    owner.replace_reference(old, new);
                }
            },
            ()
        );
        self.drop_identical();
    }

    pub fn remove_references_to(&mut self, target: RecordKind, handles: &BTreeSet<Handle>) {
        with_reference_type!(
            target,
            R => {
                if let Some(owner) = R::owner_mut(self) {
                    owner.remove_references_to(handles);
                }
            },
            ()
        )
    }

    /// Handles of every `target`-kind record this record references.
    pub fn referenced_handles(&self, target: RecordKind) -> Vec<Handle> {
        with_reference_type!(
            target,
            R => R::owner(self)
                .map(|owner| owner.referenced_handles())
                .unwrap_or_default(),
            Vec::new()
        )
    }
}

#[cfg(test)]
mod tests;
