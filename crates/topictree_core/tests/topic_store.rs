use topictree_core::db::open_db_in_memory;
use topictree_core::{
    LinkFilter, NewTopic, RepoError, SqliteTopicStore, TagKind, TopicLevel, TopicServiceError,
    TopicStore, ROOT_TOPIC_ID,
};
use uuid::Uuid;

fn setup() -> rusqlite::Connection {
    open_db_in_memory().unwrap()
}

#[test]
fn find_topic_matches_null_aware_triple() {
    let conn = setup();
    let store = SqliteTopicStore::try_new(&conn).unwrap();

    let root_level = NewTopic::hierarchical("民法", None, TopicLevel::Hierarchical(0));
    let root_id = store.insert_topic(&root_level).unwrap();
    let under_root = NewTopic::hierarchical("民法", Some(ROOT_TOPIC_ID), TopicLevel::Hierarchical(1));
    let child_id = store.insert_topic(&under_root).unwrap();

    let found = store
        .find_topic("民法", Some(TopicLevel::Hierarchical(0)), None)
        .unwrap()
        .expect("parentless node");
    assert_eq!(found.id, root_id);

    let found = store
        .find_topic("民法", Some(TopicLevel::Hierarchical(1)), Some(ROOT_TOPIC_ID))
        .unwrap()
        .expect("node under root");
    assert_eq!(found.id, child_id);

    assert!(store
        .find_topic("民法", Some(TopicLevel::Hierarchical(2)), Some(ROOT_TOPIC_ID))
        .unwrap()
        .is_none());
    assert!(store
        .find_topic("民法", Some(TopicLevel::Hierarchical(1)), None)
        .unwrap()
        .is_none());
}

#[test]
fn soft_deleted_topics_are_invisible() {
    let conn = setup();
    let store = SqliteTopicStore::try_new(&conn).unwrap();
    let id = store
        .insert_topic(&NewTopic::hierarchical("刑法", None, TopicLevel::Hierarchical(0)))
        .unwrap();

    assert!(store.soft_delete_topic(id).unwrap());
    assert!(!store.soft_delete_topic(id).unwrap());
    assert!(store.get_topic(id).unwrap().is_none());
    assert!(store.list_topics_by_ids(&[id]).unwrap().is_empty());
    assert!(store
        .find_topic("刑法", Some(TopicLevel::Hierarchical(0)), None)
        .unwrap()
        .is_none());
}

#[test]
fn linked_topic_ids_are_distinct_in_first_link_order() {
    let conn = setup();
    let store = SqliteTopicStore::try_new(&conn).unwrap();
    let entity = Uuid::new_v4();
    let a = store
        .insert_topic(&NewTopic::hierarchical("A", None, TopicLevel::Hierarchical(0)))
        .unwrap();
    let b = store
        .insert_topic(&NewTopic::hierarchical("B", None, TopicLevel::Hierarchical(0)))
        .unwrap();

    store.insert_link(entity, b).unwrap();
    store.insert_link(entity, a).unwrap();
    store.insert_link(entity, b).unwrap();

    assert_eq!(store.list_linked_topic_ids(entity).unwrap(), vec![b, a]);
    assert_eq!(store.list_links(entity).unwrap().len(), 3);

    let removed = store
        .delete_links(LinkFilter::EntityTopic(entity, b))
        .unwrap();
    assert_eq!(removed, 2);
    assert_eq!(store.list_linked_topic_ids(entity).unwrap(), vec![a]);
    assert!(!store.link_exists(entity, b).unwrap());
}

#[test]
fn tags_for_entity_use_level_threshold() {
    let conn = setup();
    let store = SqliteTopicStore::try_new(&conn).unwrap();
    let entity = Uuid::new_v4();
    let subject = store
        .insert_topic(&NewTopic::hierarchical("A", None, TopicLevel::Hierarchical(0)))
        .unwrap();
    let tag = store
        .insert_topic(&NewTopic {
            name: "教材".to_string(),
            parent_id: None,
            level: Some(TopicLevel::Tag(TagKind::DocumentType)),
            type_label: None,
        })
        .unwrap();
    store.insert_link(entity, subject).unwrap();
    store.insert_link(entity, tag).unwrap();

    let tags = store.list_tags_for_entity(entity, 100).unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0].id, tag);
    assert_eq!(store.list_tags_for_entity(entity, 0).unwrap().len(), 2);
}

#[test]
fn unknown_raw_level_is_invalid_data() {
    let conn = setup();
    let store = SqliteTopicStore::try_new(&conn).unwrap();
    let id = store
        .insert_topic(&NewTopic::hierarchical("A", None, TopicLevel::Hierarchical(0)))
        .unwrap();
    conn.execute(
        "UPDATE topics SET level = 150 WHERE id = ?1;",
        [id.to_string()],
    )
    .unwrap();

    assert!(matches!(
        store.get_topic(id),
        Err(RepoError::InvalidData(_))
    ));
}

#[test]
fn transaction_rolls_back_on_error() {
    let conn = setup();
    let store = SqliteTopicStore::try_new(&conn).unwrap();

    let result: Result<(), TopicServiceError> = store.with_transaction(|store| {
        store.insert_topic(&NewTopic::hierarchical("temp", None, TopicLevel::Hierarchical(0)))?;
        Err(TopicServiceError::TopicNotFound(Uuid::nil()))
    });
    assert!(result.is_err());
    assert!(store
        .find_topic("temp", Some(TopicLevel::Hierarchical(0)), None)
        .unwrap()
        .is_none());
}

#[test]
fn transaction_joins_caller_transaction() {
    let conn = setup();
    conn.execute_batch("BEGIN;").unwrap();
    let store = SqliteTopicStore::try_new(&conn).unwrap();

    let id = store
        .with_transaction(|store| {
            store.insert_topic(&NewTopic::hierarchical("outer", None, TopicLevel::Hierarchical(0)))
        })
        .unwrap();
    assert!(!conn.is_autocommit());

    conn.execute_batch("ROLLBACK;").unwrap();
    assert!(store.get_topic(id).unwrap().is_none());
}
