//! Nestling Notes Demo
//!
//! This demo walks through the core nestling workflow:
//! - Declaring record types with relations
//! - Building a graph from a nested payload
//! - Reconciling a second payload into the same instances
//! - Observing change feeds
//! - Serializing and deep-cloning the graph
//!
//! Run with: cargo run -p notes
//!
//! Set RUST_LOG=debug to watch the resolver work.

use std::error::Error;

use nestling_core::{
    Attrs, CollectionEvent, Record, RecordEvent, RecordType, Relation, SetOptions, Value,
};
use serde_json::json;
use tracing_subscriber::EnvFilter;

fn payload(json: serde_json::Value) -> Value {
    Value::from(json)
}

fn main() -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    println!("Nestling Notes Demo");
    println!("===================\n");

    // Declare the schema: a notebook holds many notes and features one.
    let tag = RecordType::builder("Tag").build();
    let note = RecordType::builder("Note")
        .default_attr("body", "")
        .default_attr("pinned", false)
        .relation(Relation::many("tags", &tag))
        .build();
    let notebook = RecordType::builder("Notebook")
        .relation(Relation::many("notes", &note))
        .relation(Relation::one("featured", &note))
        .build();
    println!("[OK] Types declared: Notebook, Note, Tag");

    // Build the graph from a nested payload, as if freshly fetched.
    let book = Record::new(
        &notebook,
        Attrs::from(payload(json!({
            "name": "Field notes",
            "notes": [
                { "id": 1, "title": "Pack list", "tags": [{ "label": "travel" }] },
                { "id": 2, "title": "Reading queue" },
                { "title": "Unsaved scratchpad" }
            ],
            "featured": { "id": 1, "title": "Pack list" }
        }))),
    )?;

    let notes = book.get_collection("notes").expect("notes is a relation key");
    println!("[+] Built a notebook with {} notes", notes.len());
    for member in notes.records() {
        let title = member.get_value("title").unwrap_or(Value::Null);
        let marker = if member.is_new() { "draft" } else { "saved" };
        println!("    - [{marker}] {title:?}");
    }

    // Watch both the record and its notes collection.
    let book_rx = book.subscribe();
    let notes_rx = notes.subscribe();

    // A second fetch arrives: note 1 renamed, note 2 gone, note 3 new.
    // Reconciliation merges by id and keeps live instances.
    println!("\n[~] Applying a second payload...");
    let note_one = notes.at(0).expect("note 1 exists");
    book.set_many(Attrs::from(payload(json!({
        "notes": [
            { "id": 1, "title": "Pack list (updated)" },
            { "id": 3, "title": "Trip budget" }
        ]
    }))))?;

    assert!(notes.at(0).expect("still present").ptr_eq(&note_one));
    println!(
        "[OK] Note 1 is the same instance, now titled {:?}",
        note_one.get_value("title").unwrap_or(Value::Null)
    );

    for event in notes_rx.try_iter() {
        let kind = match &event {
            CollectionEvent::Added { .. } => "added",
            CollectionEvent::Updated { .. } => "updated",
            CollectionEvent::Removed { .. } => "removed",
        };
        let title = event.record().get_value("title").unwrap_or(Value::Null);
        println!("    collection event: {kind} {title:?}");
    }
    let keys: Vec<String> = book_rx
        .try_iter()
        .filter_map(|event| event.key().map(str::to_string))
        .collect();
    println!("    notebook keys changed: {keys:?}");

    // Setting a live instance on a one-relation slot with a matching id
    // merges it into the nested record instead of swapping instances.
    book.set("featured", note_one.clone())?;
    let featured = book.get_record("featured").expect("featured is set");
    println!(
        "\n[*] Featured note now titled {:?}",
        featured.get_value("title").unwrap_or(Value::Null)
    );

    // A lone payload on a many-relation appends instead of reconciling.
    book.set("notes", payload(json!({ "id": 4, "title": "Follow-ups" })))?;
    println!("[+] Appended one note; collection now has {}", notes.len());

    // Serialize the whole graph. Every record carries its cid.
    let snapshot = book.to_json();
    println!("\n[*] Serialized notebook:");
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::Value::from(snapshot.clone()))?
    );

    // Deep clone: same shape and cids, fully disjoint instances.
    let copy = book.deep_clone()?;
    copy.set("name", "Field notes (fork)")?;
    assert_eq!(copy.cid(), book.cid());
    println!(
        "[OK] Deep clone diverged: original {:?} vs copy {:?}",
        book.get_value("name").unwrap_or(Value::Null),
        copy.get_value("name").unwrap_or(Value::Null)
    );

    // Rebuilding from the snapshot restores identities.
    let rebuilt = Record::new(&notebook, Attrs::from(snapshot))?;
    assert_eq!(rebuilt.cid(), book.cid());
    assert_eq!(rebuilt.to_json(), book.to_json());
    println!("[OK] Snapshot rebuilt into an equal graph");

    // Change feeds go quiet when asked.
    let quiet_rx = book.subscribe();
    book.set_with(
        "name",
        "Field notes, silently renamed",
        SetOptions::new().silent(true),
    )?;
    let quiet: Vec<RecordEvent> = quiet_rx.try_iter().collect();
    println!("\n[#] Silent set produced {} events", quiet.len());

    Ok(())
}
