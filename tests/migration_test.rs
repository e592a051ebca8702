mod helpers;

use larder::db;
use larder::db::migrations::{
    get_envelope_version, get_schema_version, run_migrations, CURRENT_SCHEMA_VERSION,
};
use larder::kv::ENVELOPE_VERSION;

#[test]
fn fresh_db_migrates_to_current_version() {
    let medium = helpers::test_medium();
    assert_eq!(get_schema_version(medium.conn()).unwrap(), CURRENT_SCHEMA_VERSION);
}

#[test]
fn migration_records_envelope_version() {
    let medium = helpers::test_medium();
    assert_eq!(
        get_envelope_version(medium.conn()).unwrap(),
        Some(ENVELOPE_VERSION)
    );
}

#[test]
fn manual_v1_db_upgrades_correctly() {
    // Simulate a v1 database that hasn't been migrated
    let mut conn = rusqlite::Connection::open_in_memory().unwrap();
    db::schema::init_schema(&conn).unwrap();

    assert_eq!(get_schema_version(&conn).unwrap(), 1);
    assert!(get_envelope_version(&conn).unwrap().is_none());

    run_migrations(&mut conn).unwrap();
    run_migrations(&mut conn).unwrap();

    assert_eq!(get_schema_version(&conn).unwrap(), CURRENT_SCHEMA_VERSION);
    assert!(get_envelope_version(&conn).unwrap().is_some());
}
