//! Integration tests for the fieldorder-core public API.
//!
//! These tests exercise the codec, the document splice, the order store and
//! the name-list transfer together, the way the command-line front end does.

use fieldorder_core::{
    export_names, import_names, parse, serialize,
    transfer::NameListDocument,
    CodecError, ConfigDocument, EntryList, FieldEntry, FlagSet, OrderStore,
};

/// Small deterministic generator so the round-trip test covers many shapes
/// without an external property-testing crate.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }
}

fn random_list(rng: &mut Lcg) -> EntryList {
    const ALPHABET: &[char] = &['A', 'b', '_', '"', '\\', ' ', 'µ', '(', ')', '7'];
    let len = (rng.next() % 12) as usize;
    let mut entries: Vec<FieldEntry> = Vec::with_capacity(len);
    for i in 0..len {
        let word_len = 1 + (rng.next() % 8) as usize;
        let mut name: String = (0..word_len)
            .map(|_| ALPHABET[(rng.next() % ALPHABET.len() as u64) as usize])
            .collect();
        // Suffix keeps names unique and non-blank.
        name.push_str(&format!("#{i}"));
        let bits = rng.next();
        entries.push(FieldEntry::new(name, FlagSet::new(bits & 1 == 1, bits & 2 == 2)));
    }
    EntryList::from_entries(entries).expect("generated names are unique")
}

fn list(entries: &[(&str, bool, bool)]) -> EntryList {
    EntryList::from_entries(
        entries
            .iter()
            .map(|(n, v, u)| FieldEntry::new(*n, FlagSet::new(*v, *u)))
            .collect(),
    )
    .unwrap()
}

#[test]
fn test_parse_of_serialize_is_identity_for_generated_lists() {
    let mut rng = Lcg(0x5EED);
    for _ in 0..500 {
        let original = random_list(&mut rng);
        let text = serialize(&original);
        let parsed = parse(&text).unwrap_or_else(|e| panic!("{text}: {e}"));
        assert_eq!(parsed, original, "round trip failed for {text}");
    }
}

#[test]
fn test_document_round_trip_for_generated_lists() {
    let mut rng = Lcg(42);
    let content = r#"{ "drawing": { "field_names": "(templatefields)", "x": 1 } }"#;
    let doc = ConfigDocument::from_content(content.to_string()).unwrap();
    for _ in 0..200 {
        let original = random_list(&mut rng);
        let updated = doc.with_entries(&original).unwrap();
        let reloaded = ConfigDocument::from_content(updated.content().to_string()).unwrap();
        assert_eq!(reloaded.entries().unwrap(), original);
        assert!(updated.content().ends_with(r#", "x": 1 } }"#));
    }
}

#[test]
fn test_kicad_style_file_edit_session() {
    // Arrange – a realistic eeschema.json excerpt
    let content = r#"{
  "drawing": {
    "dashed_lines_dash_length_ratio": 12.0,
    "field_names": "(templatefields (field (name \"MANUFACTURER\") visible) (field (name \"COMPONENT_LINK_URL\") url) (field (name \"ZZZ\") visible url))",
    "intersheets_ref_own_page": false
  },
  "system": { "first_run_shown": true }
}
"#;
    let doc = ConfigDocument::from_content(content.to_string()).unwrap();
    let mut store = OrderStore::new(doc.entries().unwrap());

    // Act – move ZZZ to the top, then back down one
    store.move_to(2, 0).unwrap();
    store.move_down(0).unwrap();
    let updated = doc.with_entries(store.current_order()).unwrap();

    // Assert
    assert!(store.is_dirty());
    let reloaded = ConfigDocument::from_content(updated.content().to_string())
        .unwrap()
        .entries()
        .unwrap();
    assert_eq!(
        reloaded,
        list(&[
            ("MANUFACTURER", true, false),
            ("ZZZ", true, true),
            ("COMPONENT_LINK_URL", false, true),
        ])
    );
    let before = &content[..doc.span().start];
    assert!(updated.content().starts_with(before));
    assert!(updated.content().ends_with(&content[doc.span().end..]));
}

#[test]
fn test_export_then_import_round_trip_keeps_flags() {
    let original = list(&[("A", true, false), ("B", false, true), ("C", false, false)]);

    let json = NameListDocument::from_list(&original).to_json().unwrap();
    let doc = NameListDocument::from_json(&json).unwrap();
    let imported = import_names(&doc.fields, &original).unwrap();

    assert_eq!(imported, original);
}

#[test]
fn test_import_reordered_names_through_store() {
    let original = list(&[("A", true, false), ("B", false, true)]);
    let mut store = OrderStore::new(original.clone());

    let imported = import_names(&["B".to_string(), "C".to_string()], &original).unwrap();
    store.replace(imported);

    assert!(store.is_dirty());
    assert_eq!(
        store.current_order(),
        &list(&[("B", false, true), ("C", true, false)])
    );
    assert_eq!(export_names(store.current_order()), vec!["B", "C"]);
}

#[test]
fn test_duplicate_detection_in_parse_and_import() {
    let parsed = parse(r#"(templatefields (field (name "X") visible) (field (name "X") url))"#);
    assert!(matches!(parsed, Err(CodecError::DuplicateName { .. })));

    let imported = import_names(&["X".to_string(), "X".to_string()], &EntryList::new());
    assert!(imported.is_err());
}
