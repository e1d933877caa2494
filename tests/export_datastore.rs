use indexdump::datastore::{RawOccurrence, RawRecord, UnitDependency, UnitFile};
use indexdump::{
    CaseSensitivity, Error, Exporter, FsIndexStore, PathFilter, RunContext, SqliteStore, SymbolInfo, SymbolKind,
    SymbolLanguage, SymbolRole, SymbolSubKind,
};
use std::path::Path;
use tempfile::tempdir;

fn write_json<T: serde::Serialize>(path: &Path, value: &T) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, serde_json::to_vec_pretty(value).unwrap()).unwrap();
}

fn unit(deps: Vec<UnitDependency>) -> UnitFile {
    UnitFile {
        main_file: None,
        output_file: None,
        dependencies: deps,
    }
}

/// Two units sharing one header record, plus a system header outside the project
fn build_store(root: &Path) {
    let v5 = root.join("v5");
    let function = SymbolInfo::new(SymbolKind::Function, SymbolSubKind::None, SymbolLanguage::C);

    let mut header = RawRecord::new();
    let add = header.declare("c:@F@add", "add", function);
    header.add_occurrence(RawOccurrence::new(add, &[SymbolRole::Declaration], 1, 5));
    write_json(&v5.join("records/K1/util.h-AK1"), &header);

    let mut main = RawRecord::new();
    let add = main.declare("c:@F@add", "add", function);
    let entry = main.declare("c:@F@main", "main", function);
    main.add_occurrence(RawOccurrence::new(entry, &[SymbolRole::Definition, SymbolRole::Declaration], 3, 5));
    main.add_occurrence(
        RawOccurrence::new(add, &[SymbolRole::Reference, SymbolRole::Call], 4, 12)
            .with_relation(entry, &[SymbolRole::CalledBy, SymbolRole::ContainedBy]),
    );
    // Unbucketed record
    write_json(&v5.join("records/main.c-M2"), &main);

    let mut libc = RawRecord::new();
    libc.declare("c:@F@printf", "printf", function);
    write_json(&v5.join("records/L3/stdio.h-L3"), &libc);

    let util = UnitDependency::record("util.h-AK1", "/proj/include/util.h", false);
    write_json(
        &v5.join("units/main.o-AAA1"),
        &unit(vec![
            UnitDependency::record("main.c-M2", "/proj/src/main.c", false),
            util.clone(),
            UnitDependency::record("stdio.h-L3", "/usr/include/stdio.h", true),
            UnitDependency::file("/proj/include/config.h", false),
        ]),
    );
    write_json(&v5.join("units/util.o-BBB2"), &unit(vec![util]));
    std::fs::write(v5.join("units/garbage.o-CCC3"), b"{ not json").unwrap();
    std::fs::write(v5.join("units/.DS_Store"), b"").unwrap();
}

#[test]
fn test_export_from_directory_store() {
    let dir = tempdir().unwrap();
    let store_root = dir.path().join("index-store");
    build_store(&store_root);

    let db_path = dir.path().join("out/index.sqlite3");
    std::fs::create_dir_all(db_path.parent().unwrap()).unwrap();
    std::fs::write(&db_path, b"stale").unwrap();

    let reader = FsIndexStore::open(&store_root).unwrap();
    let mut store = SqliteStore::create(&db_path).unwrap();
    let filter = PathFilter::new("/proj", CaseSensitivity::Sensitive).unwrap();

    let summary = Exporter::new(&reader, &mut store, filter)
        .run(&RunContext::default())
        .unwrap();

    assert_eq!(summary.units_discovered, 3);
    assert_eq!(summary.units_processed, 2);
    assert_eq!(summary.units_failed, 1);
    assert_eq!(summary.records_decoded, 2);
    assert_eq!(summary.records_skipped_visited, 1);
    assert_eq!(summary.records_skipped_out_of_project, 1);
    assert!(summary.is_complete());

    let usrs: Vec<_> = store.symbol_rows().unwrap().into_iter().map(|s| s.usr).collect();
    assert_eq!(usrs, vec!["c:@F@add", "c:@F@main"]);

    let occurrences: Vec<_> = store
        .occurrence_rows()
        .unwrap()
        .into_iter()
        .map(|o| (o.id, o.role, o.path, o.line, o.column))
        .collect();
    assert_eq!(
        occurrences,
        vec![
            (0, "Declaration".to_string(), "src/main.c".to_string(), 3, 5),
            (0, "Definition".to_string(), "src/main.c".to_string(), 3, 5),
            (1, "Reference".to_string(), "src/main.c".to_string(), 4, 12),
            (1, "Call".to_string(), "src/main.c".to_string(), 4, 12),
            (2, "Declaration".to_string(), "include/util.h".to_string(), 1, 5),
        ]
    );

    let relations: Vec<_> = store
        .relation_rows()
        .unwrap()
        .into_iter()
        .map(|r| (r.occurrence_id, r.symbol_usr, r.role))
        .collect();
    assert_eq!(
        relations,
        vec![
            (1, "c:@F@main".to_string(), "CalledBy".to_string()),
            (1, "c:@F@main".to_string(), "ContainedBy".to_string()),
        ]
    );
    drop(store);

    // The written file is a real database another connection can read
    let conn = rusqlite::Connection::open(&db_path).unwrap();
    let printf: i64 = conn
        .query_row("SELECT COUNT(*) FROM symbol WHERE usr = 'c:@F@printf'", [], |row| row.get(0))
        .unwrap();
    assert_eq!(printf, 0);
}

#[test]
fn test_missing_store_is_fatal() {
    let dir = tempdir().unwrap();
    let err = FsIndexStore::open(&dir.path().join("nope")).err().unwrap();
    assert!(matches!(err, Error::StoreNotFound { .. }));
    assert!(err.is_fatal());
}
