#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use roster::db::students::Students;
    use roster::libs::error::{ErrorKind, RosterError};
    use roster::libs::student::Student;
    use rusqlite::Connection;
    use std::time::Duration;
    use tempfile::TempDir;
    use test_context::{test_context, TestContext};

    struct StudentTestContext {
        _temp_dir: TempDir,
        students: Students,
    }

    impl TestContext for StudentTestContext {
        fn setup() -> Self {
            let temp_dir = tempfile::tempdir().unwrap();
            let students = Students::new(temp_dir.path().join("roster.db"));
            StudentTestContext { _temp_dir: temp_dir, students }
        }
    }

    fn ann() -> Student {
        Student::new("Ann Smith", 20, "CS").with_email("ann@example.com").with_phone("555-0100").with_gpa(3.8)
    }

    #[test_context(StudentTestContext)]
    #[test]
    fn test_add_then_get(ctx: &mut StudentTestContext) {
        let student = ann();
        let id = ctx.students.add(&student).unwrap();
        assert!(id > 0);

        let stored = ctx.students.get_by_id(id).unwrap().unwrap();
        assert_eq!(stored.id, id);
        assert_eq!(stored.name, student.name);
        assert_eq!(stored.age, student.age);
        assert_eq!(stored.department, student.department);
        assert_eq!(stored.email.as_deref(), Some("ann@example.com"));
        assert_eq!(stored.phone_number.as_deref(), Some("555-0100"));
        assert_eq!(stored.gpa, 3.8);
        assert!(stored.is_active);
        assert_eq!(stored.modified_date, stored.created_date);

        let mut expected = student.clone();
        expected.id = id;
        assert_eq!(stored, expected);
    }

    #[test_context(StudentTestContext)]
    #[test]
    fn test_add_ignores_caller_timestamps_and_id(ctx: &mut StudentTestContext) {
        let old = NaiveDate::from_ymd_opt(2001, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let mut student = ann();
        student.id = 999;
        student.created_date = old;
        student.modified_date = old;

        let id = ctx.students.add(&student).unwrap();
        assert_ne!(id, 999);

        let stored = ctx.students.get_by_id(id).unwrap().unwrap();
        assert!(stored.created_date > old);
        assert_eq!(stored.modified_date, stored.created_date);
    }

    #[test_context(StudentTestContext)]
    #[test]
    fn test_add_trims_text_and_rounds_gpa(ctx: &mut StudentTestContext) {
        let student = Student::new("  Bo Lee  ", 17, " Math ").with_email("  ").with_gpa(2.456);
        let id = ctx.students.add(&student).unwrap();

        let stored = ctx.students.get_by_id(id).unwrap().unwrap();
        assert_eq!(stored.name, "Bo Lee");
        assert_eq!(stored.department, "Math");
        assert_eq!(stored.email, None);
        assert_eq!(stored.gpa, 2.46);
    }

    #[test_context(StudentTestContext)]
    #[test]
    fn test_add_invalid_record_is_rejected(ctx: &mut StudentTestContext) {
        let student = Student::new("A", 12, "CS").with_gpa(5.0);
        let err = ctx.students.add(&student).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let message = err.to_string();
        assert!(message.contains("name"));
        assert!(message.contains("age"));
        assert!(message.contains("gpa"));
        assert_eq!(ctx.students.count(true).unwrap(), 0);
    }

    #[test_context(StudentTestContext)]
    #[test]
    fn test_duplicate_email_is_a_conflict(ctx: &mut StudentTestContext) {
        let id = ctx.students.add(&ann()).unwrap();
        assert!(ctx.students.soft_delete(id).unwrap());

        // Inactive records still own their email.
        let twin = Student::new("Ann Other", 30, "Art").with_email("ann@example.com");
        let err = ctx.students.add(&twin).unwrap_err();
        assert!(matches!(err, RosterError::Conflict(_)));
        assert_eq!(ctx.students.count(true).unwrap(), 1);
    }

    #[test_context(StudentTestContext)]
    #[test]
    fn test_missing_emails_never_conflict(ctx: &mut StudentTestContext) {
        ctx.students.add(&Student::new("Ann", 20, "CS")).unwrap();
        ctx.students.add(&Student::new("Bo", 21, "CS").with_email("")).unwrap();
        ctx.students.add(&Student::new("Cy", 22, "CS")).unwrap();
        assert_eq!(ctx.students.count(true).unwrap(), 3);
    }

    #[test_context(StudentTestContext)]
    #[test]
    fn test_update(ctx: &mut StudentTestContext) {
        let id = ctx.students.add(&ann()).unwrap();
        let before = ctx.students.get_by_id(id).unwrap().unwrap();

        let mut changed = before.clone();
        changed.name = "Ann Jones".to_string();
        changed.gpa = 3.1;
        changed.email = None;
        changed.created_date = NaiveDate::from_ymd_opt(2001, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert!(ctx.students.update(&changed).unwrap());

        let after = ctx.students.get_by_id(id).unwrap().unwrap();
        assert_eq!(after.name, "Ann Jones");
        assert_eq!(after.gpa, 3.1);
        assert_eq!(after.email, None);
        assert_eq!(after.created_date, before.created_date);
        assert!(after.modified_date >= before.modified_date);
    }

    #[test_context(StudentTestContext)]
    #[test]
    fn test_update_sets_active_flag_explicitly(ctx: &mut StudentTestContext) {
        let id = ctx.students.add(&ann()).unwrap();
        let mut student = ctx.students.get_by_id(id).unwrap().unwrap();

        student.is_active = false;
        assert!(ctx.students.update(&student).unwrap());
        assert!(!ctx.students.get_by_id(id).unwrap().unwrap().is_active);

        student.is_active = true;
        assert!(ctx.students.update(&student).unwrap());
        assert!(ctx.students.get_by_id(id).unwrap().unwrap().is_active);
    }

    #[test_context(StudentTestContext)]
    #[test]
    fn test_update_missing_and_invalid_ids(ctx: &mut StudentTestContext) {
        let mut student = ann();
        student.id = 42;
        assert!(!ctx.students.update(&student).unwrap());

        student.id = 0;
        assert_eq!(ctx.students.update(&student).unwrap_err().kind(), ErrorKind::InvalidArgument);
    }

    #[test_context(StudentTestContext)]
    #[test]
    fn test_update_to_taken_email_is_a_conflict(ctx: &mut StudentTestContext) {
        ctx.students.add(&ann()).unwrap();
        let id = ctx.students.add(&Student::new("Bo", 17, "Math").with_email("bo@example.com")).unwrap();

        let mut bo = ctx.students.get_by_id(id).unwrap().unwrap();
        bo.email = Some("ann@example.com".to_string());
        assert_eq!(ctx.students.update(&bo).unwrap_err().kind(), ErrorKind::Conflict);
    }

    #[test_context(StudentTestContext)]
    #[test]
    fn test_soft_delete_is_idempotent(ctx: &mut StudentTestContext) {
        let id = ctx.students.add(&ann()).unwrap();

        assert!(ctx.students.soft_delete(id).unwrap());
        assert!(!ctx.students.soft_delete(id).unwrap());

        let stored = ctx.students.get_by_id(id).unwrap().unwrap();
        assert!(!stored.is_active);
        assert!(stored.modified_date >= stored.created_date);

        assert!(!ctx.students.soft_delete(id + 100).unwrap());
    }

    #[test_context(StudentTestContext)]
    #[test]
    fn test_delete_removes_active_and_inactive_rows(ctx: &mut StudentTestContext) {
        let active = ctx.students.add(&ann()).unwrap();
        let inactive = ctx.students.add(&Student::new("Bo", 17, "Math")).unwrap();
        ctx.students.soft_delete(inactive).unwrap();

        assert!(ctx.students.delete(active).unwrap());
        assert!(ctx.students.delete(inactive).unwrap());
        assert!(ctx.students.get_by_id(active).unwrap().is_none());
        assert!(ctx.students.get_by_id(inactive).unwrap().is_none());
        assert!(!ctx.students.delete(active).unwrap());
    }

    #[test_context(StudentTestContext)]
    #[test]
    fn test_ids_are_not_reused(ctx: &mut StudentTestContext) {
        let first = ctx.students.add(&ann()).unwrap();
        ctx.students.delete(first).unwrap();

        let second = ctx.students.add(&ann()).unwrap();
        assert!(second > first);
    }

    #[test_context(StudentTestContext)]
    #[test]
    fn test_non_positive_ids_are_rejected(ctx: &mut StudentTestContext) {
        for id in [0, -1] {
            assert_eq!(ctx.students.get_by_id(id).unwrap_err().kind(), ErrorKind::InvalidArgument);
            assert_eq!(ctx.students.soft_delete(id).unwrap_err().kind(), ErrorKind::InvalidArgument);
            assert_eq!(ctx.students.delete(id).unwrap_err().kind(), ErrorKind::InvalidArgument);
        }
        // Rejected before a connection was ever opened.
        assert!(!ctx.students.path().exists());
    }

    #[test_context(StudentTestContext)]
    #[test]
    fn test_check_connection(ctx: &mut StudentTestContext) {
        assert!(!ctx.students.check_connection());
        assert!(!ctx.students.path().exists());

        ctx.students.add(&ann()).unwrap();
        assert!(ctx.students.check_connection());
    }

    #[test_context(StudentTestContext)]
    #[test]
    fn test_expired_deadline_times_out(ctx: &mut StudentTestContext) {
        let impatient = ctx.students.clone().with_timeout(Duration::ZERO);

        let err = impatient.add(&ann()).unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert_eq!(ctx.students.count(true).unwrap(), 0);
    }

    #[test_context(StudentTestContext)]
    #[test]
    fn test_generous_deadline_succeeds(ctx: &mut StudentTestContext) {
        let patient = ctx.students.clone().with_timeout(Duration::from_secs(30));
        let id = patient.add(&ann()).unwrap();
        assert!(patient.get_by_id(id).unwrap().is_some());
    }
    #[test_context(StudentTestContext)]
    #[test]
    fn test_deadline_spent_waiting_for_write_lock(ctx: &mut StudentTestContext) {
        assert_eq!(ctx.students.count(true).unwrap(), 0);
        let writer = Connection::open(ctx.students.path()).unwrap();
        writer.execute_batch("BEGIN IMMEDIATE").unwrap();

        let impatient = ctx.students.clone().with_timeout(Duration::from_millis(300));
        let err = impatient.add(&ann()).unwrap_err();
        assert!(matches!(err, RosterError::Timeout));

        writer.execute_batch("ROLLBACK").unwrap();
        drop(writer);
        assert_eq!(ctx.students.count(true).unwrap(), 0);
    }
}
