mod common;

use anyhow::Result;
use common::{coord, coord_schema, init_tracing};
use rust_sqlite_orm::{ConnectorConfig, Database, Error, Filter, SqlValue};
use tempfile::NamedTempFile;

// Helper function to create a temporary file-based database
fn create_temp_db() -> Result<(Database, NamedTempFile)> {
    init_tracing();
    let temp_file = NamedTempFile::new()?;
    let path = temp_file.path().to_string_lossy().into_owned();
    let db = Database::open(&ConnectorConfig::new(path).with_busy_timeout(500))?;
    Ok((db, temp_file))
}

#[tokio::test]
async fn test_rows_survive_reconnect() {
    test_rows_survive_reconnect_impl().unwrap();
}

fn test_rows_survive_reconnect_impl() -> Result<()> {
    let (db, temp_file) = create_temp_db()?;
    let schema = coord_schema(&db)?;

    let mut p1 = coord(&schema, "p1", 1, 2, 3)?;
    db.save(&mut p1)?;
    db.disconnect()?;

    let config = ConnectorConfig::new(temp_file.path().to_string_lossy().into_owned());
    db.connect(&config)?;
    assert!(db.table_exists("Coord3D")?);

    let loaded = db.objects("Coord3D", Filter::new().with_condition("name", "p1"))?;
    assert_eq!(loaded.count(), 1);
    assert_eq!(loaded.get(0)?, p1);

    // The next insert continues the engine's row ids.
    let mut p2 = coord(&schema, "p2", 4, 5, 6)?;
    db.save(&mut p2)?;
    assert_eq!(p2.id(), Some(2));
    Ok(())
}

#[tokio::test]
async fn test_identity_column_is_engine_rowid() {
    test_identity_column_is_engine_rowid_impl().unwrap();
}

fn test_identity_column_is_engine_rowid_impl() -> Result<()> {
    let (db, _temp_file) = create_temp_db()?;
    let schema = coord_schema(&db)?;

    for (i, name) in ["a", "b", "c"].iter().enumerate() {
        let mut p = coord(&schema, name, i as i64, 0, 0)?;
        db.save(&mut p)?;
        assert_eq!(p.id(), Some(i as i64 + 1));
    }

    let mut cursor = db.execute("SELECT rowid, * FROM Coord3D WHERE name='b'")?;
    let row = cursor.fetch_one().unwrap();
    assert_eq!(row.get(0), Some(&SqlValue::Integer(2)));
    assert_eq!(row.len(), 5);
    assert!(cursor.fetch_one().is_none());
    Ok(())
}

#[tokio::test]
async fn test_mismatched_stored_value_is_reported() {
    test_mismatched_stored_value_is_reported_impl().unwrap();
}

fn test_mismatched_stored_value_is_reported_impl() -> Result<()> {
    let (db, _temp_file) = create_temp_db()?;
    coord_schema(&db)?;
    db.ensure_table("Coord3D")?;

    // Written behind the mapper's back: NULL in an integer column.
    db.execute("INSERT INTO Coord3D VALUES (NULL, 1, 1, 'broken')")?;
    let qs = db.all("Coord3D")?;
    assert!(matches!(qs.get(0), Err(Error::TypeMismatch { .. })));
    Ok(())
}

#[tokio::test]
async fn test_duplicate_table_errors_propagate() {
    test_duplicate_table_errors_propagate_impl().unwrap();
}

fn test_duplicate_table_errors_propagate_impl() -> Result<()> {
    let (db, _temp_file) = create_temp_db()?;
    coord_schema(&db)?;
    db.ensure_table("Coord3D")?;

    let err = db
        .execute("CREATE TABLE Coord3D (x INTEGER)")
        .unwrap_err();
    assert!(err.is_storage());
    Ok(())
}
