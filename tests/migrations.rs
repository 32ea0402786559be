#[cfg(test)]
mod tests {
    use roster::db::db::Db;
    use roster::db::migrations::{get_db_version, needs_migration, MigrationManager};
    use std::path::PathBuf;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct MigrationTestContext {
        _temp_dir: TempDir,
        path: PathBuf,
    }

    impl TestContext for MigrationTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let path = temp_dir.path().join("roster.db");
            MigrationTestContext { _temp_dir: temp_dir, path }
        }
    }

    #[test_context(MigrationTestContext)]
    #[test]
    fn test_migrations_run_automatically(ctx: &mut MigrationTestContext) {
        let db = Db::open(&ctx.path, None).unwrap();

        let version = get_db_version(&db.conn).unwrap();
        assert_eq!(version, MigrationManager::new().latest_version());
        assert!(!needs_migration(&db.conn).unwrap());
    }

    #[test_context(MigrationTestContext)]
    #[test]
    fn test_fresh_connection_needs_migration(ctx: &mut MigrationTestContext) {
        let mut conn = Db::new_without_migrations(&ctx.path).unwrap();
        let manager = MigrationManager::new();

        manager.run_migrations(&mut conn).unwrap();
        assert!(manager.is_migration_applied(&conn, 1).unwrap());
        assert!(!manager.is_migration_applied(&conn, manager.latest_version() + 1).unwrap());
    }

    #[test_context(MigrationTestContext)]
    #[test]
    fn test_migration_history(ctx: &mut MigrationTestContext) {
        let mut conn = Db::new_without_migrations(&ctx.path).unwrap();
        let manager = MigrationManager::new();

        manager.run_migrations(&mut conn).unwrap();

        let history = manager.get_migration_history(&conn).unwrap();
        assert!(!history.is_empty());
        for (i, (version, name, _)) in history.iter().enumerate() {
            assert_eq!(*version as usize, i + 1);
            assert!(!name.is_empty());
        }
        assert_eq!(history[0].1, "create_students");
    }

    #[test_context(MigrationTestContext)]
    #[test]
    fn test_migration_idempotency(ctx: &mut MigrationTestContext) {
        let mut conn = Db::new_without_migrations(&ctx.path).unwrap();
        let manager = MigrationManager::new();

        manager.run_migrations(&mut conn).unwrap();
        let version1 = get_db_version(&conn).unwrap();

        manager.run_migrations(&mut conn).unwrap();
        let version2 = get_db_version(&conn).unwrap();

        assert_eq!(version1, version2);
        assert_eq!(manager.get_migration_history(&conn).unwrap().len() as u32, version2);
    }

    #[test_context(MigrationTestContext)]
    #[test]
    fn test_schema_rejects_out_of_range_rows(ctx: &mut MigrationTestContext) {
        let db = Db::open(&ctx.path, None).unwrap();

        let result = db.conn.execute(
            "INSERT INTO students (name, age, department, enrollment_date, gpa, is_active, created_date, modified_date)
             VALUES ('Ann', 12, 'CS', '2024-01-01 00:00:00', 3.0, 1, '2024-01-01 00:00:00', '2024-01-01 00:00:00')",
            [],
        );
        assert!(result.is_err());

        let result = db.conn.execute(
            "INSERT INTO students (name, age, department, enrollment_date, gpa, is_active, created_date, modified_date)
             VALUES ('Ann', 20, 'CS', '2024-01-01 00:00:00', 3.0, 1, '2024-02-01 00:00:00', '2024-01-01 00:00:00')",
            [],
        );
        assert!(result.is_err());
    }
    #[test_context(MigrationTestContext)]
    #[test]
    fn test_name_index_is_case_insensitive(ctx: &mut MigrationTestContext) {
        let db = Db::open(&ctx.path, None).unwrap();

        let mut stmt = db
            .conn
            .prepare("SELECT name, sql FROM sqlite_master WHERE type = 'index' AND tbl_name = 'students' AND sql IS NOT NULL")
            .unwrap();
        let indexes: Vec<(String, String)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap();

        assert!(!indexes.iter().any(|(name, _)| name == "idx_students_name"));
        let (_, sql) = indexes.iter().find(|(name, _)| name == "idx_students_name_nocase").unwrap();
        assert!(sql.contains("COLLATE NOCASE"));
    }
}
