// Copyright 2023 Remi Bernotavicius

use derive_more::{Display, Error, From};
use diesel::prelude::Connection as _;
use diesel::RunQueryDsl as _;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::path::{Path, PathBuf};

pub mod models;
pub mod query;
pub mod schema;

pub type Connection = diesel::sqlite::SqliteConnection;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

#[derive(Debug, Display, Error, From)]
pub enum DatabaseError {
    #[display("a recipe named {name:?} already exists")]
    DuplicateRecipe { name: String },
    #[display("recipe {id} does not exist")]
    UnknownRecipe { id: models::RecipeId },
    #[display("database path {path:?} is not valid UTF-8")]
    InvalidPath { path: PathBuf },
    #[display("database error: {_0}")]
    #[from]
    Query(diesel::result::Error),
    #[display("couldn't connect to database: {_0}")]
    #[from]
    Connection(diesel::ConnectionError),
}

fn connect(path: &Path) -> Result<Connection, DatabaseError> {
    let url = path.to_str().ok_or_else(|| DatabaseError::InvalidPath {
        path: path.to_owned(),
    })?;
    let mut connection = Connection::establish(url)?;
    diesel::sql_query("PRAGMA foreign_keys = ON").execute(&mut connection)?;
    Ok(connection)
}

/// Opens the database at the given path and brings its schema up to date.
pub fn establish_connection(path: impl AsRef<Path>) -> crate::Result<Connection> {
    let mut connection = connect(path.as_ref())?;
    connection.run_pending_migrations(MIGRATIONS)?;
    Ok(connection)
}

/// Handle to the on-disk database. Every logical operation acquires its own connection through
/// [`Database::connect`] and drops it when the operation is over.
#[derive(Clone, Debug)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    pub fn open(path: impl Into<PathBuf>) -> crate::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        log::info!("opening database at {}", path.display());
        establish_connection(&path)?;
        Ok(Self { path })
    }

    pub fn connect(&self) -> Result<Connection, DatabaseError> {
        log::debug!("connecting to {}", self.path.display());
        connect(&self.path)
    }
}

#[cfg(test)]
pub fn test_connection() -> Connection {
    establish_connection(":memory:").unwrap()
}

#[test]
fn migrations_round_trip() {
    let mut conn = test_connection();
    conn.revert_all_migrations(MIGRATIONS).unwrap();
    conn.run_pending_migrations(MIGRATIONS).unwrap();
}

#[test]
fn database_connections_share_file() {
    let dir = tempfile::tempdir().unwrap();
    let database = Database::open(dir.path().join("nested").join("data.sqlite")).unwrap();

    let mut first = database.connect().unwrap();
    query::insert_recipe(&mut first, &models::NewRecipe::named("Stoofvlees")).unwrap();
    drop(first);

    let mut second = database.connect().unwrap();
    let recipes = query::list_recipes(&mut second).unwrap();
    assert_eq!(recipes.len(), 1);
    assert_eq!(recipes[0].name, "Stoofvlees");
}
