use notekeep_core::db::open_db_in_memory;
use notekeep_core::{
    CatalogService, NoteQuery, NoteScope, NoteService, NoteSortKey, SortDirection,
    SqliteCategoryRepository, SqliteNoteRepository, SqliteSubcategoryRepository,
};
use rusqlite::{params, Connection};

fn catalog(
    conn: &Connection,
) -> CatalogService<
    SqliteCategoryRepository<'_>,
    SqliteSubcategoryRepository<'_>,
    SqliteNoteRepository<'_>,
> {
    CatalogService::new(
        SqliteCategoryRepository::try_new(conn).unwrap(),
        SqliteSubcategoryRepository::try_new(conn).unwrap(),
        SqliteNoteRepository::try_new(conn).unwrap(),
    )
}

fn note_service(
    conn: &Connection,
) -> NoteService<SqliteNoteRepository<'_>, SqliteSubcategoryRepository<'_>> {
    NoteService::new(
        SqliteNoteRepository::try_new(conn).unwrap(),
        SqliteSubcategoryRepository::try_new(conn).unwrap(),
    )
}

#[test]
fn scope_filters_partition_the_note_collection() {
    let conn = open_db_in_memory().unwrap();
    let service = catalog(&conn);
    let notes = note_service(&conn);

    let category_a = service.create_category("A", None).unwrap();
    let category_b = service.create_category("B", None).unwrap();

    let a1 = notes.create_note("a1", "", Some(category_a.uuid), None).unwrap();
    let a2 = notes.create_note("a2", "", Some(category_a.uuid), None).unwrap();
    let b1 = notes.create_note("b1", "", Some(category_b.uuid), None).unwrap();
    let u1 = notes.create_note("u1", "", None, None).unwrap();

    let scoped_a = notes
        .list_notes(&NoteQuery::scoped(NoteScope::Category(category_a.uuid)))
        .unwrap();
    let mut scoped_a_ids: Vec<_> = scoped_a.iter().map(|note| note.uuid).collect();
    scoped_a_ids.sort();
    let mut expected = vec![a1.uuid, a2.uuid];
    expected.sort();
    assert_eq!(scoped_a_ids, expected);

    let unlisted = notes
        .list_notes(&NoteQuery::scoped(NoteScope::Unlisted))
        .unwrap();
    assert_eq!(unlisted.len(), 1);
    assert_eq!(unlisted[0].uuid, u1.uuid);

    let all = notes.list_notes(&NoteQuery::default()).unwrap();
    assert_eq!(all.len(), 4);
    assert!(all.iter().any(|note| note.uuid == b1.uuid));
}

#[test]
fn category_scope_excludes_notes_filed_under_subcategories() {
    let conn = open_db_in_memory().unwrap();
    let service = catalog(&conn);
    let notes = note_service(&conn);

    let category = service.create_category("Work", None).unwrap();
    let subcategory = service
        .create_subcategory(category.uuid, "Reports", None)
        .unwrap();

    let direct = notes
        .create_note("Direct", "", Some(category.uuid), None)
        .unwrap();
    let nested = notes
        .create_note("Nested", "", None, Some(subcategory.uuid))
        .unwrap();

    let direct_scope = notes
        .list_notes(&NoteQuery::scoped(NoteScope::Category(category.uuid)))
        .unwrap();
    assert_eq!(direct_scope.len(), 1);
    assert_eq!(direct_scope[0].uuid, direct.uuid);

    let nested_scope = notes
        .list_notes(&NoteQuery::scoped(NoteScope::Subcategory(subcategory.uuid)))
        .unwrap();
    assert_eq!(nested_scope.len(), 1);
    assert_eq!(nested_scope[0].uuid, nested.uuid);
}

#[test]
fn search_matches_title_or_content_case_insensitively() {
    let conn = open_db_in_memory().unwrap();
    let notes = note_service(&conn);

    let meeting = notes
        .create_note("Meeting Notes", "agenda for tomorrow", None, None)
        .unwrap();
    notes
        .create_note("Grocery List", "apples and milk", None, None)
        .unwrap();

    let by_title = notes
        .list_notes(&NoteQuery::default().with_search("meet"))
        .unwrap();
    assert_eq!(by_title.len(), 1);
    assert_eq!(by_title[0].uuid, meeting.uuid);

    let by_content = notes
        .list_notes(&NoteQuery::default().with_search("AGENDA"))
        .unwrap();
    assert_eq!(by_content.len(), 1);
    assert_eq!(by_content[0].uuid, meeting.uuid);

    let none = notes
        .list_notes(&NoteQuery::default().with_search("payroll"))
        .unwrap();
    assert!(none.is_empty());
}

#[test]
fn search_composes_with_scope_via_logical_and() {
    let conn = open_db_in_memory().unwrap();
    let service = catalog(&conn);
    let notes = note_service(&conn);

    let category = service.create_category("Work", None).unwrap();
    let in_scope = notes
        .create_note("Meeting Notes", "", Some(category.uuid), None)
        .unwrap();
    notes.create_note("Meeting Notes", "", None, None).unwrap();

    let mut query = NoteQuery::scoped(NoteScope::Category(category.uuid));
    query.search = Some("meeting".to_string());
    let hits = notes.list_notes(&query).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].uuid, in_scope.uuid);
}

#[test]
fn title_sort_orders_both_directions() {
    let conn = open_db_in_memory().unwrap();
    let notes = note_service(&conn);

    for title in ["Banana", "Apple", "Cherry"] {
        notes.create_note(title, "", None, None).unwrap();
    }

    let ascending = NoteQuery {
        sort_key: NoteSortKey::Title,
        direction: SortDirection::Ascending,
        ..NoteQuery::default()
    };
    let titles: Vec<_> = notes
        .list_notes(&ascending)
        .unwrap()
        .into_iter()
        .map(|note| note.title)
        .collect();
    assert_eq!(titles, ["Apple", "Banana", "Cherry"]);

    let descending = NoteQuery {
        sort_key: NoteSortKey::Title,
        direction: SortDirection::Descending,
        ..NoteQuery::default()
    };
    let titles: Vec<_> = notes
        .list_notes(&descending)
        .unwrap()
        .into_iter()
        .map(|note| note.title)
        .collect();
    assert_eq!(titles, ["Cherry", "Banana", "Apple"]);
}

#[test]
fn default_sort_is_most_recently_updated_first() {
    let conn = open_db_in_memory().unwrap();

    let (old_id, fresh_id) = {
        let notes = note_service(&conn);
        let old = notes.create_note("old", "", None, None).unwrap();
        let fresh = notes.create_note("fresh", "", None, None).unwrap();
        (old.uuid, fresh.uuid)
    };

    conn.execute(
        "UPDATE notes SET updated_at = 1000 WHERE uuid = ?1;",
        params![old_id.to_string()],
    )
    .unwrap();
    conn.execute(
        "UPDATE notes SET updated_at = 2000 WHERE uuid = ?1;",
        params![fresh_id.to_string()],
    )
    .unwrap();

    let notes = note_service(&conn);
    let listed = notes.list_notes(&NoteQuery::default()).unwrap();
    assert_eq!(listed[0].uuid, fresh_id);
    assert_eq!(listed[1].uuid, old_id);
}

#[test]
fn count_matches_list_for_the_same_query() {
    let conn = open_db_in_memory().unwrap();
    let service = catalog(&conn);
    let notes = note_service(&conn);

    let category = service.create_category("Work", None).unwrap();
    notes
        .create_note("one", "", Some(category.uuid), None)
        .unwrap();
    notes
        .create_note("two", "", Some(category.uuid), None)
        .unwrap();
    notes.create_note("three", "", None, None).unwrap();

    let query = NoteQuery::scoped(NoteScope::Category(category.uuid));
    assert_eq!(notes.count_notes(&query).unwrap(), 2);
    assert_eq!(
        notes.count_notes(&NoteQuery::default()).unwrap() as usize,
        notes.list_notes(&NoteQuery::default()).unwrap().len()
    );
}
