//! Frame store behavior: rows, indexes, cascade deletes, and the
//! transaction lifecycle, over both backends.

use framegraph::model::{Edge, EdgeKind, Frame, FrameKind};
use framegraph::store::{EdgeRecord, FrameRecord, FrameStore};
use framegraph::IndexError;

fn frame_record(name: &str, qualified: &str, file: &str, content: &str) -> FrameRecord {
    let mut frame = Frame::new(FrameKind::Callable, name, qualified);
    frame.file_path = Some(file.into());
    frame.content = content.to_string();
    frame.id = frame.compute_id();
    FrameRecord::from(&frame)
}

fn edge_record(subject: &str, object: &str, kind: EdgeKind) -> EdgeRecord {
    let edge = Edge::new(0, 0, 0, kind, 0.85);
    EdgeRecord::from_session(&edge, subject.to_string(), object.to_string())
}

#[test]
fn rows_are_indexed_by_file() {
    let mut store = FrameStore::in_memory();
    let a = frame_record("a", "app.a", "src/app.py", "def a(): pass");
    let b = frame_record("b", "app.b", "src/app.py", "def b(): pass");
    let c = frame_record("c", "lib.c", "src/lib.py", "def c(): pass");
    let (id_a, id_b) = (a.id.clone(), b.id.clone());

    store.put_frame(a).unwrap();
    store.put_frame(b).unwrap();
    store.put_frame(c).unwrap();

    let mut expected = vec![id_a, id_b];
    expected.sort();
    assert_eq!(store.frame_ids_for_file("src/app.py"), expected);
    assert_eq!(store.frame_ids_for_file("src/lib.py").len(), 1);
    assert!(store.frame_ids_for_file("src/other.py").is_empty());
}

#[test]
fn qualified_name_lookup_filters_by_kind() {
    let mut store = FrameStore::in_memory();
    let run = frame_record("run", "app.run", "src/app.py", "def run(): pass");
    let id = run.id.clone();
    store.put_frame(run).unwrap();

    let found = store
        .find_by_qualified_name(FrameKind::Callable, "app.run")
        .unwrap();
    assert_eq!(found.id, id);
    assert!(store
        .find_by_qualified_name(FrameKind::Class, "app.run")
        .is_none());
}

#[test]
fn deleting_a_frame_takes_its_edges_with_it() {
    let mut store = FrameStore::in_memory();
    let a = frame_record("a", "app.a", "src/app.py", "def a(): pass");
    let b = frame_record("b", "app.b", "src/app.py", "def b(): pass");
    let (id_a, id_b) = (a.id.clone(), b.id.clone());
    store.put_frame(a).unwrap();
    store.put_frame(b).unwrap();
    store
        .insert_edge(edge_record(&id_a, &id_b, EdgeKind::Calls))
        .unwrap();
    store
        .insert_edge(edge_record(&id_b, &id_a, EdgeKind::Calls))
        .unwrap();
    store
        .insert_edge(edge_record(&id_b, &id_b, EdgeKind::Uses))
        .unwrap();

    let removed = store.delete_frame(&id_a).unwrap();
    assert_eq!(removed, 2);
    assert_eq!(store.edge_count(), 1);
    assert!(store.get_frame(&id_a).is_none());
    assert_eq!(store.edges_for_frame(&id_b).len(), 1);
}

#[test]
fn commit_survives_reopen_on_disk() {
    #[cfg(feature = "rocksdb-backend")]
    {
        use tempfile::TempDir;
        let dir = TempDir::new().unwrap();
        let record = frame_record("run", "app.run", "src/app.py", "def run(): pass");
        let id = record.id.clone();

        {
            let mut store = FrameStore::open(dir.path()).unwrap();
            store.begin_transaction().unwrap();
            store.put_frame(record).unwrap();
            store
                .insert_edge(edge_record(&id, "elsewhere", EdgeKind::Calls))
                .unwrap();
            store.commit().unwrap();
            store.flush().unwrap();
        }

        let store = FrameStore::open(dir.path()).unwrap();
        assert_eq!(store.frame_count(), 1);
        assert_eq!(store.edge_count(), 1);
        assert_eq!(store.get_frame(&id).unwrap().qualified_name, "app.run");
        assert_eq!(store.frame_ids_for_file("src/app.py"), vec![id]);
    }
}

#[test]
fn rollback_undoes_mixed_mutations() {
    let mut store = FrameStore::in_memory();
    let keep = frame_record("keep", "app.keep", "src/app.py", "def keep(): pass");
    let keep_id = keep.id.clone();
    store.put_frame(keep).unwrap();
    store
        .insert_edge(edge_record(&keep_id, "x", EdgeKind::Calls))
        .unwrap();

    store.begin_transaction().unwrap();
    store.delete_frame(&keep_id).unwrap();
    store
        .put_frame(frame_record("new", "app.new", "src/app.py", "def new(): pass"))
        .unwrap();
    store
        .insert_edge(edge_record("p", "q", EdgeKind::Imports))
        .unwrap();
    store.rollback().unwrap();

    assert_eq!(store.frame_count(), 1);
    assert_eq!(store.edge_count(), 1);
    assert!(store.get_frame(&keep_id).is_some());
    assert_eq!(store.edges_for_frame(&keep_id).len(), 1);
}

#[test]
fn transaction_misuse_is_an_error() {
    let mut store = FrameStore::in_memory();
    assert!(matches!(
        store.rollback(),
        Err(IndexError::TransactionInactive { .. })
    ));
    assert!(matches!(
        store.commit(),
        Err(IndexError::TransactionInactive { .. })
    ));

    store.begin_transaction().unwrap();
    assert!(store.begin_transaction().is_err());
    store.rollback().unwrap();
}

#[test]
fn reindexed_frame_moves_between_file_buckets() {
    let mut store = FrameStore::in_memory();
    let mut record = frame_record("run", "app.run", "src/app.py", "def run(): pass");
    let id = record.id.clone();
    store.put_frame(record.clone()).unwrap();

    record.file_path = "src/moved.py".to_string();
    store.put_frame(record).unwrap();

    assert!(store.frame_ids_for_file("src/app.py").is_empty());
    assert_eq!(store.frame_ids_for_file("src/moved.py"), vec![id]);
    assert_eq!(store.frame_count(), 1);
}
