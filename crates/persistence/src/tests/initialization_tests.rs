// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::Persistence;
use crate::tests::create_test_tour;

#[test]
fn test_in_memory_databases_are_isolated() {
    let first: Persistence = Persistence::new_in_memory().unwrap();
    let second: Persistence = Persistence::new_in_memory().unwrap();

    create_test_tour(&first, 20);

    assert_eq!(first.list_tours().unwrap().len(), 1);
    assert!(second.list_tours().unwrap().is_empty());
}

#[test]
fn test_foreign_keys_are_enforced() {
    let persistence: Persistence = Persistence::new_in_memory().unwrap();
    assert!(persistence.verify_foreign_key_enforcement().is_ok());
}

#[test]
fn test_file_database_survives_reopen() {
    let dir: tempfile::TempDir = tempfile::tempdir().unwrap();
    let path: std::path::PathBuf = dir.path().join("tourbook.db");

    let tour_id: i64 = {
        let persistence: Persistence = Persistence::new_with_file(&path, 2).unwrap();
        create_test_tour(&persistence, 12).tour_id
    };

    let reopened: Persistence = Persistence::new_with_file(&path, 2).unwrap();
    let tour = reopened.get_tour(tour_id).unwrap();
    assert_eq!(tour.max_group_size, 12);
    assert_eq!(tour.current_bookings, 0);
}
