use crate::db::db::Db;
use crate::db::migrations::{get_db_version, MigrationManager};
use crate::libs::config::Config;
use crate::libs::messages::Message;
use crate::libs::view::View;
use crate::msg_print;
use anyhow::Result;

pub async fn cmd(config: &Config) -> Result<()> {
    let path = config.database_path()?;

    let (version, history) = tokio::task::spawn_blocking(move || -> Result<_> {
        let db = Db::open(&path, None)?;
        let version = get_db_version(&db.conn)?;
        let history = MigrationManager::new().get_migration_history(&db.conn)?;
        Ok((version, history))
    })
    .await??;

    msg_print!(Message::DatabaseVersion(version));
    msg_print!(Message::MigrationHistory, true);
    View::migrations(&history);

    Ok(())
}
