// Copyright 2023 Remi Bernotavicius

use crate::database::models::{NewRecipe, RecipeHandle};
use crate::database::{self, query, DatabaseError};
use derive_more::{Display, Error, From};
use diesel::Connection as _;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

mod fifteen_gram;

pub const SUPPORTED_DOMAINS: [&str; 1] = ["15gram.be"];

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = concat!("CuisineCraft/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Display, Error, From)]
pub enum ImportError {
    #[display("enter a recipe URL first")]
    EmptyUrl,
    #[display("{url:?} is not a valid URL")]
    InvalidUrl { url: String },
    #[display("unsupported domain {domain:?}, supported: {}", SUPPORTED_DOMAINS.join(", "))]
    UnsupportedDomain { domain: String },
    #[display("couldn't fetch recipe: {_0}")]
    #[from]
    Http(reqwest::Error),
    #[display("couldn't fetch recipe: server answered {status}")]
    BadStatus { status: reqwest::StatusCode },
    #[display("couldn't store recipe text: {_0}")]
    #[from]
    Io(std::io::Error),
    #[display("{_0}")]
    #[from]
    Database(DatabaseError),
}

impl From<diesel::result::Error> for ImportError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Database(error.into())
    }
}

/// A recipe scraped from a web page, not yet stored.
#[derive(Clone, Debug, PartialEq)]
pub struct ImportedRecipe {
    pub name: String,
    pub persons: i32,
    pub cooking_time: i32,
    pub cuisine_origin: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
}

impl ImportedRecipe {
    /// The text saved next to the database as the recipe's file.
    pub fn content(&self) -> String {
        let mut out = String::from("Ingredients:\n");
        for ingredient in &self.ingredients {
            out += &format!("- {ingredient}\n");
        }
        out += "\nInstructions:\n";
        out += &self.instructions.join("\n");
        out
    }

    fn file_stem(&self) -> String {
        self.name
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
            .collect()
    }

    pub fn to_new_recipe(&self, url: &str, file_location: &Path) -> NewRecipe {
        NewRecipe {
            name: self.name.clone(),
            persons: self.persons,
            cooking_time: self.cooking_time,
            cuisine_origin: self.cuisine_origin.clone(),
            file_location: file_location.display().to_string(),
            url: url.into(),
            health_grade: None,
        }
    }
}

/// The host of `url` without a leading `www.`, if it is one we can import from.
pub fn supported_domain(url: &str) -> Result<String, ImportError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(ImportError::EmptyUrl);
    }
    let parsed = reqwest::Url::parse(url).map_err(|_| ImportError::InvalidUrl { url: url.into() })?;
    let host = parsed
        .host_str()
        .ok_or_else(|| ImportError::InvalidUrl { url: url.into() })?;
    let domain = host.strip_prefix("www.").unwrap_or(host).to_lowercase();

    if SUPPORTED_DOMAINS.contains(&domain.as_str()) {
        Ok(domain)
    } else {
        Err(ImportError::UnsupportedDomain { domain })
    }
}

fn fetch_page(url: &str) -> Result<String, ImportError> {
    log::info!("fetching {url}");
    let client = reqwest::blocking::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()?;
    let response = client.get(url).send()?;
    let status = response.status();
    if status != reqwest::StatusCode::OK {
        return Err(ImportError::BadStatus { status });
    }
    Ok(response.text()?)
}

/// Downloads and parses the recipe at `url` without storing anything.
pub fn fetch_recipe(url: &str) -> Result<ImportedRecipe, ImportError> {
    let domain = supported_domain(url)?;
    let html = fetch_page(url.trim())?;
    let recipe = match domain.as_str() {
        "15gram.be" => fifteen_gram::parse(&html),
        _ => return Err(ImportError::UnsupportedDomain { domain }),
    };
    log::info!(
        "parsed {:?} with {} ingredients from {domain}",
        recipe.name,
        recipe.ingredients.len()
    );
    Ok(recipe)
}

/// First `<stem>.txt`, `<stem>-2.txt`, ... under `dir` that doesn't exist yet.
fn unused_file_location(dir: &Path, file_stem: &str) -> PathBuf {
    let mut location = dir.join(format!("{file_stem}.txt"));
    let mut n = 2;
    while location.exists() {
        location = dir.join(format!("{file_stem}-{n}.txt"));
        n += 1;
    }
    location
}

/// Never replaces an existing file. A partly written file is removed again.
fn write_new_file(path: &Path, content: &str) -> std::io::Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)?;
    if let Err(error) = file.write_all(content.as_bytes()) {
        drop(file);
        if let Err(remove_error) = std::fs::remove_file(path) {
            log::warn!("couldn't remove {}: {remove_error}", path.display());
        }
        return Err(error);
    }
    Ok(())
}

/// Inserts the recipe and writes its text under `recipes_dir`. Either both happen or neither.
pub fn store_recipe(
    conn: &mut database::Connection,
    url: &str,
    recipe: &ImportedRecipe,
    recipes_dir: &Path,
) -> Result<RecipeHandle, ImportError> {
    std::fs::create_dir_all(recipes_dir)?;
    let file_location = unused_file_location(recipes_dir, &recipe.file_stem());

    conn.transaction(|conn| {
        let id = query::insert_recipe(conn, &recipe.to_new_recipe(url.trim(), &file_location))?;
        write_new_file(&file_location, &recipe.content())?;
        log::debug!("wrote recipe text to {}", file_location.display());
        Ok(RecipeHandle {
            id,
            name: recipe.name.clone(),
        })
    })
}

pub fn import_recipe_from_url(
    conn: &mut database::Connection,
    url: &str,
    recipes_dir: &Path,
) -> Result<RecipeHandle, ImportError> {
    let recipe = fetch_recipe(url)?;
    store_recipe(conn, url, &recipe, recipes_dir)
}
