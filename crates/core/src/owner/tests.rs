use super::*;
use crate::equivalence::{Equivalence, Secondary, classify};

fn h(raw: &str) -> Handle {
    Handle::try_new(raw).expect("handle")
}

fn person_with_nested_citations() -> Person {
    let mut person = Person::named("Anna", "Berg").with_handle(h("p1"));
    person.source_refs.push(SourceRef::new(h("s1")).with_page("4"));
    person.names[0]
        .source_refs
        .push(SourceRef::new(h("s2")).with_page("baptism"));
    let mut attribute = Attribute::new("Occupation", "Miller");
    attribute.source_refs.push(SourceRef::new(h("s3")));
    let mut media_ref = MediaRef::new(h("m1"));
    media_ref.attributes.push(attribute);
    person.media_refs.push(media_ref);
    person
}

fn source_pairs(list: &[SourceRef]) -> Vec<(String, String)> {
    list.iter()
        .map(|r| (r.source.to_string(), r.page.clone()))
        .collect()
}

#[test]
fn add_is_loose_and_keeps_insertion_order() {
    let mut person = Person::default();
    ReferenceOwner::<SourceRef>::add_reference(&mut person, SourceRef::new(h("s2")));
    ReferenceOwner::<SourceRef>::add_reference(&mut person, SourceRef::new(h("s1")));
    ReferenceOwner::<SourceRef>::add_reference(&mut person, SourceRef::new(h("s2")));

    let targets: Vec<&str> = ReferenceOwner::<SourceRef>::references(&person)
        .iter()
        .map(|r| r.source.as_str())
        .collect();
    assert_eq!(targets, vec!["s2", "s1", "s2"]);
}

#[test]
fn has_reference_to_walks_nested_children() {
    let person = person_with_nested_citations();
    for target in ["s1", "s2", "s3"] {
        assert!(
            ReferenceOwner::<SourceRef>::has_reference_to(&person, &h(target)),
            "missing {target}"
        );
    }
    assert!(!ReferenceOwner::<SourceRef>::has_reference_to(
        &person,
        &h("s9")
    ));
    assert!(ReferenceOwner::<MediaRef>::has_reference_to(&person, &h("m1")));
}

#[test]
fn remove_references_to_prunes_every_level() {
    let mut person = person_with_nested_citations();
    ReferenceOwner::<SourceRef>::add_reference(&mut person, SourceRef::new(h("s4")));
    let doomed: BTreeSet<Handle> = [h("s1"), h("s3")].into_iter().collect();
    ReferenceOwner::<SourceRef>::remove_references_to(&mut person, &doomed);

    assert_eq!(
        source_pairs(&person.source_refs),
        vec![("s4".to_string(), String::new())]
    );
    assert_eq!(person.names[0].source_refs.len(), 1);
    assert!(person.media_refs[0].attributes[0].source_refs.is_empty());
}

#[test]
fn replace_reference_collapses_unified_targets() {
    let mut person = Person::default();
    person.source_refs = vec![
        SourceRef::new(h("s1")).with_page("12"),
        SourceRef::new(h("s9")),
        SourceRef::new(h("s2")).with_note(h("n1")),
    ];
    ReferenceOwner::<SourceRef>::replace_reference(&mut person, &h("s2"), &h("s1"));

    assert_eq!(person.source_refs.len(), 2);
    assert_eq!(person.source_refs[0].source, h("s1"));
    assert_eq!(person.source_refs[0].page, "12");
    assert_eq!(person.source_refs[0].notes, vec![NoteRef(h("n1"))]);
    assert_eq!(person.source_refs[1].source, h("s9"));
}

#[test]
fn replace_reference_rewrites_nested_lists() {
    let mut person = person_with_nested_citations();
    ReferenceOwner::<SourceRef>::replace_reference(&mut person, &h("s3"), &h("s1"));

    let nested = &person.media_refs[0].attributes[0].source_refs;
    assert_eq!(nested.len(), 1);
    assert_eq!(nested[0].source, h("s1"));
    assert!(!ReferenceOwner::<SourceRef>::has_reference_to(
        &person,
        &h("s3")
    ));
}

#[test]
fn replace_reference_leaves_no_identical_pairs() {
    let mut person = Person::default();
    person.source_refs = vec![
        SourceRef::new(h("s1")),
        SourceRef::new(h("s2")),
        SourceRef::new(h("s5")),
        SourceRef::new(h("s5")),
        SourceRef::new(h("s1")),
    ];
    ReferenceOwner::<SourceRef>::replace_reference(&mut person, &h("s2"), &h("s1"));

    let list = &person.source_refs;
    for (i, a) in list.iter().enumerate() {
        for b in &list[i + 1..] {
            assert_ne!(classify(a, b), Equivalence::Identical, "{a:?} vs {b:?}");
        }
    }
    assert_eq!(
        source_pairs(list),
        vec![
            ("s1".to_string(), String::new()),
            ("s5".to_string(), String::new())
        ]
    );
}

#[test]
fn replace_reference_with_missing_target_is_tolerated() {
    let mut source = Source::new("Census 1851");
    source.repo_refs.push(RepoRef::new(h("ghost")).with_call_number("A-1"));
    ReferenceOwner::<RepoRef>::replace_reference(&mut source, &h("ghost"), &h("r1"));
    assert_eq!(source.repo_refs[0].repository, h("r1"));
    assert_eq!(source.repo_refs[0].call_number, "A-1");
}

#[test]
fn note_references_reach_into_citations() {
    let mut place = Place::default();
    place
        .source_refs
        .push(SourceRef::new(h("s1")).with_note(h("n7")));
    assert!(ReferenceOwner::<NoteRef>::has_reference_to(&place, &h("n7")));

    ReferenceOwner::<NoteRef>::replace_reference(&mut place, &h("n7"), &h("n8"));
    assert_eq!(place.source_refs[0].notes, vec![NoteRef(h("n8"))]);
}

#[test]
fn record_dispatch_uses_target_kind() {
    let person: Record = person_with_nested_citations().into();
    assert!(person.references(RecordKind::Source, &h("s2")));
    assert!(person.references(RecordKind::Media, &h("m1")));
    assert!(!person.references(RecordKind::Repository, &h("s2")));
    assert!(!person.references(RecordKind::Person, &h("p1")));
    assert_eq!(
        person.referenced_handles(RecordKind::Source),
        vec![h("s1"), h("s2"), h("s3")]
    );

    let note: Record = Note::new("loose").into();
    assert!(!note.references(RecordKind::Note, &h("n1")));
}

#[test]
fn record_replace_and_remove_dispatch() {
    let mut record: Record = person_with_nested_citations().into();
    record.replace_reference(RecordKind::Source, &h("s2"), &h("s1"));
    assert!(!record.references(RecordKind::Source, &h("s2")));

    let doomed: BTreeSet<Handle> = [h("s1")].into_iter().collect();
    record.remove_references_to(RecordKind::Source, &doomed);
    assert_eq!(record.referenced_handles(RecordKind::Source), vec![h("s3")]);
}

fn assert_no_identical_pairs<T: Secondary + std::fmt::Debug>(list: &[T]) {
    for (i, a) in list.iter().enumerate() {
        for b in &list[i + 1..] {
            assert_ne!(classify(a, b), Equivalence::Identical, "{a:?} vs {b:?}");
        }
    }
}

#[test]
fn record_replace_drops_parents_that_become_identical() {
    let mut person = Person::default().with_handle(h("p1"));
    let mut first = MediaRef::new(h("m1"));
    first.source_refs.push(SourceRef::new(h("s1")));
    let mut second = MediaRef::new(h("m1"));
    second.source_refs.push(SourceRef::new(h("s2")));
    person.media_refs = vec![first, second, MediaRef::new(h("m2"))];

    let mut miller = Attribute::new("Occupation", "Miller");
    miller.source_refs.push(SourceRef::new(h("s1")));
    let mut miller_again = Attribute::new("Occupation", "Miller");
    miller_again.source_refs.push(SourceRef::new(h("s2")));
    person.attributes = vec![miller, miller_again];

    let mut record: Record = person.into();
    record.replace_reference(RecordKind::Source, &h("s2"), &h("s1"));

    let Record::Person(person) = record else {
        panic!("kind changed");
    };
    assert_no_identical_pairs(&person.media_refs);
    let media: Vec<&str> = person.media_refs.iter().map(|r| r.media.as_str()).collect();
    assert_eq!(media, vec!["m1", "m2"]);
    assert_eq!(person.media_refs[0].source_refs, vec![SourceRef::new(h("s1"))]);
    assert_eq!(person.attributes.len(), 1);
    assert_eq!(person.attributes[0].source_refs, vec![SourceRef::new(h("s1"))]);
}

#[test]
fn note_rewrite_drops_citations_that_become_identical() {
    let mut source = Source::new("Census 1851");
    source.repo_refs = vec![
        RepoRef::new(h("r1")).with_call_number("A-1"),
        RepoRef::new(h("r1")).with_call_number("A-1"),
    ];
    source.repo_refs[0].notes.push(NoteRef(h("n1")));
    source.repo_refs[1].notes.push(NoteRef(h("n2")));
    let mut place = Place::default();
    place.source_refs = vec![
        SourceRef::new(h("s1")).with_note(h("n1")),
        SourceRef::new(h("s1")).with_note(h("n2")),
    ];

    let mut records: Vec<Record> = vec![source.into(), place.into()];
    for record in &mut records {
        record.replace_reference(RecordKind::Note, &h("n2"), &h("n1"));
    }

    match &records[0] {
        Record::Source(source) => {
            assert_eq!(source.repo_refs.len(), 1);
            assert_eq!(source.repo_refs[0].notes, vec![NoteRef(h("n1"))]);
        }
        other => panic!("unexpected record {other:?}"),
    }
    match &records[1] {
        Record::Place(place) => {
            assert_no_identical_pairs(&place.source_refs);
            assert_eq!(place.source_refs, vec![SourceRef::new(h("s1")).with_note(h("n1"))]);
        }
        other => panic!("unexpected record {other:?}"),
    }
}
