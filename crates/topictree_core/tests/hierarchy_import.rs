use rusqlite::Connection;
use topictree_core::db::open_db_in_memory;
use topictree_core::{
    AncestryResolver, HierarchyImporter, SqliteTopicStore, TopicImport, TopicLevel,
    TopicServiceError, TopicStore, ValidationError,
};

fn setup() -> Connection {
    open_db_in_memory().unwrap()
}

fn count_named(conn: &Connection, name: &str) -> i64 {
    conn.query_row(
        "SELECT COUNT(*) FROM topics WHERE name = ?1 AND is_deleted = 0;",
        [name],
        |row| row.get(0),
    )
    .unwrap()
}

#[test]
fn import_round_trip_resolves_root_first() {
    let conn = setup();
    let store = SqliteTopicStore::try_new(&conn).unwrap();
    let importer = HierarchyImporter::new(store);

    let payload = TopicImport::new("A").with_children(vec![TopicImport::new("B")]);
    let root_id = importer.import_hierarchy(&payload).unwrap();

    let b = store
        .find_topic("B", Some(TopicLevel::Hierarchical(1)), Some(root_id))
        .unwrap()
        .expect("child created under root");
    let chain = AncestryResolver::new(store).get_ancestors(b.id).unwrap();

    let names: Vec<&str> = chain.iter().map(|node| node.name.as_str()).collect();
    assert_eq!(names, vec!["A", "B"]);
    assert_eq!(chain[0].id, root_id);
    assert_eq!(chain[0].parent_id, None);
    assert_eq!(chain[0].level, Some(TopicLevel::Hierarchical(0)));
    assert_eq!(chain[1].level, Some(TopicLevel::Hierarchical(1)));
}

#[test]
fn nested_children_get_depth_levels() {
    let conn = setup();
    let store = SqliteTopicStore::try_new(&conn).unwrap();
    let payload = TopicImport::new("法学").with_children(vec![
        TopicImport::new("劳动法").with_children(vec![TopicImport::new("劳动合同")]),
        TopicImport::new("刑法"),
    ]);

    let root_id = HierarchyImporter::new(store)
        .import_hierarchy(&payload)
        .unwrap();

    let labor = store
        .find_topic("劳动法", Some(TopicLevel::Hierarchical(1)), Some(root_id))
        .unwrap()
        .unwrap();
    assert!(store
        .find_topic("劳动合同", Some(TopicLevel::Hierarchical(2)), Some(labor.id))
        .unwrap()
        .is_some());
    assert!(store
        .find_topic("刑法", Some(TopicLevel::Hierarchical(1)), Some(root_id))
        .unwrap()
        .is_some());
}

#[test]
fn repeated_import_never_dedups() {
    let conn = setup();
    let store = SqliteTopicStore::try_new(&conn).unwrap();
    let importer = HierarchyImporter::new(store);
    let payload = TopicImport::new("A").with_children(vec![TopicImport::new("B")]);

    let first = importer.import_hierarchy(&payload).unwrap();
    let second = importer.import_hierarchy(&payload).unwrap();

    assert_ne!(first, second);
    assert_eq!(count_named(&conn, "A"), 2);
    assert_eq!(count_named(&conn, "B"), 2);
}

#[test]
fn titles_are_cleaned_before_insert() {
    let conn = setup();
    let store = SqliteTopicStore::try_new(&conn).unwrap();
    let payload = TopicImport::new("  劳动<EOL>法  总论 ");

    let root_id = HierarchyImporter::new(store)
        .import_hierarchy(&payload)
        .unwrap();

    let root = store.get_topic(root_id).unwrap().unwrap();
    assert_eq!(root.name, "劳动法 总论");
}

#[test]
fn blank_title_is_rejected_before_writes() {
    let conn = setup();
    let store = SqliteTopicStore::try_new(&conn).unwrap();
    let payload = TopicImport::new("A").with_children(vec![TopicImport::new("<EOL>")]);

    let err = HierarchyImporter::new(store)
        .import_hierarchy(&payload)
        .unwrap_err();
    match err {
        TopicServiceError::Validation(ValidationError::BlankTitle { path }) => {
            assert_eq!(path, vec![0])
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(count_named(&conn, "A"), 0);
}

#[test]
fn storage_failure_rolls_back_partial_subtree() {
    let conn = setup();
    conn.execute_batch(
        "CREATE TRIGGER reject_poison BEFORE INSERT ON topics
         WHEN NEW.name = 'poison'
         BEGIN
             SELECT RAISE(ABORT, 'poisoned topic');
         END;",
    )
    .unwrap();
    let store = SqliteTopicStore::try_new(&conn).unwrap();
    let payload = TopicImport::new("A").with_children(vec![
        TopicImport::new("B"),
        TopicImport::new("C").with_children(vec![TopicImport::new("poison")]),
    ]);

    let err = HierarchyImporter::new(store)
        .import_hierarchy(&payload)
        .unwrap_err();
    assert!(matches!(err, TopicServiceError::Storage(_)));
    for name in ["A", "B", "C"] {
        assert_eq!(count_named(&conn, name), 0, "{name} should be rolled back");
    }
}

#[test]
fn loosely_formatted_json_imports() {
    let conn = setup();
    let store = SqliteTopicStore::try_new(&conn).unwrap();
    let raw = "{“title”：“法学”，“children”：【{“title”：“劳动法<EOL>”}，{“title”：“刑法”}】}";

    let root_id = HierarchyImporter::new(store).import_json(raw).unwrap();

    let root = store.get_topic(root_id).unwrap().unwrap();
    assert_eq!(root.name, "法学");
    assert_eq!(count_named(&conn, "劳动法"), 1);
    assert_eq!(count_named(&conn, "刑法"), 1);
}

#[test]
fn malformed_json_is_reported_without_writes() {
    let conn = setup();
    let store = SqliteTopicStore::try_new(&conn).unwrap();

    let err = HierarchyImporter::new(store)
        .import_json("{\"children\": []}")
        .unwrap_err();
    assert!(matches!(err, TopicServiceError::InvalidImportPayload(_)));
}
