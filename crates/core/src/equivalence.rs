#![forbid(unsafe_code)]

use crate::ids::{Handle, RecordKind};
use crate::owner::ReferenceOwner;
use crate::schema::Record;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Equivalence {
    Different,
    Equal,
    Identical,
}

impl Equivalence {
    /// True for the two outcomes that collapse into one entry.
    pub fn is_duplicate(self) -> bool {
        !matches!(self, Equivalence::Different)
    }
}

/// An owned secondary object that takes part in duplicate detection.
///
/// `same_identity` compares only the discriminating key (target handle and
/// structural key for references, descriptive fields for plain secondaries).
/// `PartialEq` is the full field-by-field comparison.
pub trait Secondary: Clone + PartialEq {
    fn same_identity(&self, other: &Self) -> bool;

    /// Folds an EQUAL twin into `self`. Empty sub-fields are filled from
    /// `other`, conflicting ones keep `self`'s value.
    fn absorb(&mut self, other: Self);
}

/// A secondary object pointing at a primary record of kind `TARGET`.
pub trait Reference: Secondary + 'static {
    const TARGET: RecordKind;

    fn target(&self) -> &Handle;

    fn set_target(&mut self, handle: Handle);

    fn owner(record: &Record) -> Option<&dyn ReferenceOwner<Self>>;

    fn owner_mut(record: &mut Record) -> Option<&mut dyn ReferenceOwner<Self>>;
}

pub fn classify<T: Secondary>(a: &T, b: &T) -> Equivalence {
    if !a.same_identity(b) {
        return Equivalence::Different;
    }
    if a == b {
        Equivalence::Identical
    } else {
        Equivalence::Equal
    }
}

/// Collapses duplicates in place: the first occurrence of an identity wins,
/// later EQUAL entries are absorbed into it in list order and later IDENTICAL
/// entries are dropped. Relative order of the kept entries is preserved.
pub fn collapse<T: Secondary>(list: &mut Vec<T>) {
    collapse_where(list, |_| true);
}

/// Like [`collapse`], restricted to entries matching `eligible`. Ineligible
/// entries are left alone, except that exact duplicates are always dropped.
pub fn collapse_where<T, F>(list: &mut Vec<T>, eligible: F)
where
    T: Secondary,
    F: Fn(&T) -> bool,
{
    let mut kept: Vec<T> = Vec::with_capacity(list.len());
    for item in list.drain(..) {
        let mergeable = eligible(&item);
        let twin = kept.iter_mut().find(|existing| match classify(&**existing, &item) {
            Equivalence::Identical => true,
            Equivalence::Equal => mergeable && eligible(&**existing),
            Equivalence::Different => false,
        });
        match twin {
            Some(existing) => {
                if *existing != item {
                    existing.absorb(item);
                }
            }
            None => kept.push(item),
        }
    }
    *list = kept;
}

/// Concatenates `donor` after `survivor` and collapses the result.
pub fn merge_lists<T: Secondary>(survivor: &mut Vec<T>, donor: &[T]) {
    survivor.extend(donor.iter().cloned());
    collapse(survivor);
}

pub(crate) fn fill_if_empty(slot: &mut String, other: String) {
    if slot.trim().is_empty() && !other.trim().is_empty() {
        *slot = other;
    }
}
