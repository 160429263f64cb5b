use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PoolError};
use diesel::result::ConnectionError;
use diesel::{Connection, ConnectionResult, QueryResult, SqliteConnection};
use tracing::{debug, trace, trace_span};

use crate::config::DatabaseConfig;

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

pub const IN_MEMORY_URL: &str = ":memory:";

const CREATE_TABLES: &str = include_str!("create_tables.sql");

/// Per-connection settings. SQLite keeps both pragmas per connection, so every
/// fresh connection out of the pool gets them again.
#[derive(Debug, Clone, Copy)]
struct SqlitePragmas {
    busy_timeout: Duration,
}

impl SqlitePragmas {
    fn apply(&self, connection: &mut SqliteConnection) -> QueryResult<()> {
        connection.batch_execute(&format!(
            "PRAGMA foreign_keys = ON; PRAGMA busy_timeout = {};",
            self.busy_timeout.as_millis()
        ))
    }
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for SqlitePragmas {
    fn on_acquire(&self, connection: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        self.apply(connection)
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

pub fn establish_pooled_connection(config: &DatabaseConfig) -> Result<DbPool, PoolError> {
    let span = trace_span!("establishing pooled connection", url = %config.url);
    let _guard = span.enter();

    trace!("Creating manager");
    let manager = ConnectionManager::<SqliteConnection>::new(&config.url);

    trace!("Creating pool");
    let builder = DbPool::builder().connection_customizer(Box::new(SqlitePragmas {
        busy_timeout: config.busy_timeout,
    }));

    // Every connection to :memory: is its own database, the only one must never be replaced
    let builder = if config.url == IN_MEMORY_URL {
        debug!("in-memory database, pool limited to one permanent connection");
        builder.max_size(1).idle_timeout(None).max_lifetime(None)
    } else {
        builder.max_size(config.pool_size)
    };

    builder.build(manager)
}

/// A single-connection pool over a private in-memory database, with the
/// tables already created. The connection is never recycled, so the data
/// lives as long as the pool.
pub fn establish_in_memory_pool() -> crate::Result<DbPool> {
    let manager = ConnectionManager::<SqliteConnection>::new(IN_MEMORY_URL);

    let pool = Pool::builder()
        .max_size(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connection_customizer(Box::new(SqlitePragmas {
            busy_timeout: Duration::from_millis(0),
        }))
        .build(manager)?;

    let mut connection = pool.get()?;
    create_tables(&mut connection)?;

    Ok(pool)
}

pub fn establish_connection(url: &str, busy_timeout: Duration) -> ConnectionResult<SqliteConnection> {
    let mut connection = SqliteConnection::establish(url)?;

    SqlitePragmas { busy_timeout }
        .apply(&mut connection)
        .map_err(ConnectionError::CouldntSetupConfiguration)?;

    Ok(connection)
}

/// Creates the catalog tables if they are missing.
pub fn create_tables(connection: &mut SqliteConnection) -> QueryResult<()> {
    trace!("creating tables");
    connection.batch_execute(CREATE_TABLES)
}

#[cfg(test)]
mod tests {
    use diesel::prelude::*;
    use diesel::sql_types::Integer;

    use super::*;

    #[derive(QueryableByName)]
    struct Pragma {
        #[diesel(sql_type = Integer)]
        foreign_keys: i32,
    }

    #[test]
    fn create_tables_is_idempotent() {
        let pool = establish_in_memory_pool().unwrap();
        let mut connection = pool.get().unwrap();

        create_tables(&mut connection).unwrap();
        create_tables(&mut connection).unwrap();
    }

    #[test]
    fn pooled_connections_enforce_foreign_keys() {
        let pool = establish_in_memory_pool().unwrap();
        let mut connection = pool.get().unwrap();

        let pragma = diesel::sql_query("PRAGMA foreign_keys")
            .get_result::<Pragma>(&mut connection)
            .unwrap();
        assert_eq!(pragma.foreign_keys, 1);

        let orphan = diesel::sql_query(
            "INSERT INTO recipe_ingredient (recipe_id, ingredient_id) VALUES (42, 42)",
        )
        .execute(&mut connection);
        assert!(orphan.is_err());
    }

    #[test]
    fn single_connection_keeps_its_schema() {
        let config = DatabaseConfig {
            url: IN_MEMORY_URL.to_owned(),
            pool_size: 8,
            busy_timeout: Duration::from_millis(100),
        };

        let pool = establish_pooled_connection(&config).unwrap();
        assert_eq!(pool.max_size(), 1);

        let mut connection = pool.get().unwrap();
        create_tables(&mut connection).unwrap();
        drop(connection);

        let mut connection = pool.get().unwrap();
        let count: i64 = crate::database::schema::recipes::table
            .count()
            .get_result(&mut connection)
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn in_memory_connection_is_never_recycled() {
        let config = DatabaseConfig {
            url: IN_MEMORY_URL.to_owned(),
            pool_size: 4,
            busy_timeout: Duration::from_millis(100),
        };

        let pool = establish_pooled_connection(&config).unwrap();

        assert_eq!(pool.max_size(), 1);
        assert_eq!(pool.idle_timeout(), None);
        assert_eq!(pool.max_lifetime(), None);
    }

    #[test]
    fn file_pool_uses_configured_size() {
        let path = std::env::temp_dir().join(format!("recipe-book-pool-{}.db", std::process::id()));
        let config = DatabaseConfig {
            url: path.to_string_lossy().into_owned(),
            pool_size: 3,
            busy_timeout: Duration::from_millis(100),
        };

        let pool = establish_pooled_connection(&config).unwrap();
        assert_eq!(pool.max_size(), 3);
        assert!(pool.max_lifetime().is_some());

        drop(pool);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn standalone_connection_gets_pragmas() {
        let mut connection =
            establish_connection(IN_MEMORY_URL, Duration::from_millis(100)).unwrap();

        let pragma = diesel::sql_query("PRAGMA foreign_keys")
            .get_result::<Pragma>(&mut connection)
            .unwrap();
        assert_eq!(pragma.foreign_keys, 1);
    }
}
