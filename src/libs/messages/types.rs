#[derive(Debug, Clone)]
pub enum Message {
    // === STUDENT MESSAGES ===
    StudentAdded(i64),
    StudentUpdated(i64),
    StudentDeactivated(i64),
    StudentAlreadyInactive(i64),
    StudentDeleted(i64),
    StudentNotFound(i64),
    StudentsHeader,
    StudentsPage { page: i64, pages: i64, total: i64 },
    NoStudentsFound,
    SearchResultsHeader(usize),
    StudentDetailsHeader(i64),
    StudentValidationFailed(String),
    ConfirmDeleteStudent(String),
    DeleteCancelled,

    // === IMPORT MESSAGES ===
    ImportReading(String),
    ImportEmpty,
    ImportCompleted(usize),
    ImportRolledBack(usize),

    // === STATISTICS MESSAGES ===
    StatisticsHeader,
    DepartmentStatisticsHeader,
    NoDepartmentStatistics,

    // === CONNECTION MESSAGES ===
    ConnectionOk(String),
    ConnectionFailed(String),
    OperationTimedOut,

    // === CONFIGURATION MESSAGES ===
    ConfigSaved,
    ConfigInvalidEnv(String, String),
    ConfigInvalidValue(String, String),
    PromptDatabasePath,
    PromptPageSize,
    PromptEnableLogging,
    PromptTimeoutSecs,

    // === MIGRATION MESSAGES ===
    MigrationsFound(usize),
    RunningMigration(u32, String),
    MigrationCompleted(u32),
    MigrationFailed(u32, String),
    AllMigrationsCompleted,
    DatabaseUpToDate,
    DatabaseVersion(u32),
    MigrationHistory,
}
