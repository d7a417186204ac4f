// Copyright 2023 Remi Bernotavicius

use clap::Parser;
use clap::Subcommand;
use config::{Config, Settings};
use database::models::{Recipe, RecipeId};
use database::{query, Database};
use menu::WeekMenu;
use std::path::PathBuf;

mod config;
mod cooking_time;
mod database;
mod export;
mod forms;
mod import;
mod logging;
mod menu;
mod receipt;
mod ui;

type Error = Box<dyn std::error::Error + Send + Sync + 'static>;
type Result<T> = std::result::Result<T, Error>;

#[derive(Parser, Debug)]
#[command(version, about = "Recipes, week menus and shopping lists")]
struct Args {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    commands: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Start the graphical interface.
    Run,
    #[command(flatten)]
    Data(DataCommand),
}

/// Commands that work on the database without opening a window.
#[derive(Debug, Subcommand)]
enum DataCommand {
    /// List every recipe.
    List,
    /// Find recipes by name, cuisine or ingredient.
    Search {
        term: String,
        /// Only match on ingredient names.
        #[arg(long)]
        ingredient: bool,
    },
    AddRecipe {
        name: String,
        #[arg(long, default_value = "")]
        persons: String,
        /// Free text like "1 hour 30 min".
        #[arg(long, default_value = "")]
        cooking_time: String,
        #[arg(long, default_value = "")]
        cuisine: String,
        #[arg(long, default_value = "")]
        file: String,
        #[arg(long, default_value = "")]
        url: String,
        /// 1 to 3.
        #[arg(long, default_value = "")]
        health_grade: String,
    },
    /// Add one ingredient. Goes to the most recently added recipe unless `--recipe` is given.
    AddIngredient {
        amount: String,
        unit: String,
        name: String,
        #[arg(long)]
        recipe: Option<i32>,
        #[arg(long, default_value = "")]
        price: String,
        #[arg(long, default_value = "")]
        shop: String,
        /// YYYY-MM-DD
        #[arg(long, default_value = "")]
        price_date: String,
    },
    ImportUrl {
        url: String,
    },
    /// OCR a receipt photo and print the items found.
    ScanReceipt {
        image: PathBuf,
        /// Store the items as known prices.
        #[arg(long)]
        save: bool,
    },
    /// Pick seven random recipes for the week.
    GenerateMenu {
        #[arg(long)]
        save: bool,
    },
    ShowMenu,
    ClearMenu,
    ShoppingList,
    /// Export the saved week menu. `.csv` paths are written as CSV, anything else as text.
    Export {
        path: Option<PathBuf>,
    },
}

fn now() -> chrono::NaiveDateTime {
    chrono::Local::now().naive_local()
}

fn run(database: Database, settings: Settings) -> Result<()> {
    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("CuisineCraft")
            .with_inner_size([1100.0, 750.0]),
        ..Default::default()
    };
    eframe::run_native(
        "CuisineCraft",
        native_options,
        Box::new(|_cc| Ok(Box::new(ui::CuisineCraft::new(database, settings)))),
    )
    .map_err(|error| error.to_string())?;

    Ok(())
}

fn print_recipes(recipes: &[Recipe]) {
    for r in recipes {
        println!(
            "{:>4}  {}  ({} persons, {} min, {})",
            r.id.to_string(),
            r.name,
            r.persons,
            r.cooking_time,
            r.cuisine_origin
        );
    }
}

fn print_menu(menu: &WeekMenu) {
    if menu.is_empty() {
        println!("no week menu saved");
        return;
    }
    for (day, recipe) in menu.entries() {
        println!("{:<10} {}", day.to_string(), recipe.name);
    }
}

fn add_ingredient(
    conn: &mut database::Connection,
    recipe: Option<i32>,
    row: forms::IngredientRow,
) -> Result<()> {
    let recipe_id = match recipe {
        Some(raw) => RecipeId::from_raw(raw),
        None => query::latest_recipe_id(conn)?.ok_or(forms::FormError::MissingRecipe)?,
    };
    let recipe = query::get_recipe(conn, recipe_id)?;
    let form = forms::IngredientForm {
        recipe: Some(recipe.to_handle()),
        rows: vec![row],
    };
    let count = query::insert_ingredients(conn, &form.to_new_ingredients()?)?;
    println!("added {count} ingredient(s) to {}", recipe.name);
    Ok(())
}

fn scan_receipt(
    conn: &mut database::Connection,
    settings: &Settings,
    image: PathBuf,
    save: bool,
) -> Result<()> {
    let text = receipt::perform_ocr(&image, &settings.tesseract)?;
    let scan = receipt::parse_receipt(&text, chrono::Local::now().date_naive());
    println!("{} on {}", scan.shop, scan.date);
    for item in &scan.items {
        println!("  {:<30} {:>8.2}", item.name, item.price);
    }
    if save {
        let items = scan.to_new_items(&image.display().to_string());
        let count = query::insert_receipt_items(conn, &items)?;
        println!("saved {count} item(s)");
    }
    Ok(())
}

fn print_shopping_list(conn: &mut database::Connection) -> Result<()> {
    let menu = WeekMenu::load(conn)?;
    let items = menu::shopping_list(conn, &menu)?;
    for item in &items {
        let i = &item.ingredient;
        match (&item.price, &item.shop) {
            (Some(price), Some(shop)) => {
                println!("{} {} {}  €{price:.2} at {shop}", i.amount, i.unit, i.name)
            }
            _ => println!("{} {} {}", i.amount, i.unit, i.name),
        }
    }
    println!("estimated total: €{:.2}", menu::estimated_total(&items));
    Ok(())
}

fn run_command(command: DataCommand, database: &Database, settings: &Settings) -> Result<()> {
    let mut conn = database.connect()?;
    let conn = &mut conn;
    match command {
        DataCommand::List => print_recipes(&query::list_recipes(conn)?),
        DataCommand::Search { term, ingredient } => {
            if ingredient {
                for r in query::recipes_using_ingredient(conn, &term)? {
                    println!("{:>4}  {}", r.id.to_string(), r.name);
                }
            } else {
                print_recipes(&query::search_recipes(conn, &term)?);
            }
        }
        DataCommand::AddRecipe {
            name,
            persons,
            cooking_time,
            cuisine,
            file,
            url,
            health_grade,
        } => {
            let form = forms::RecipeForm {
                name,
                persons,
                cooking_time,
                cuisine_origin: cuisine,
                file_location: file,
                url,
                health_grade,
            };
            let recipe = form.to_new_recipe()?;
            let id = query::insert_recipe(conn, &recipe)?;
            println!("added recipe {id}: {}", recipe.name);
        }
        DataCommand::AddIngredient {
            amount,
            unit,
            name,
            recipe,
            price,
            shop,
            price_date,
        } => {
            let row = forms::IngredientRow {
                amount,
                unit,
                name,
                price,
                shop,
                price_date,
            };
            add_ingredient(conn, recipe, row)?;
        }
        DataCommand::ImportUrl { url } => {
            let recipe = import::import_recipe_from_url(conn, &url, &settings.recipes_dir)?;
            println!("imported recipe {}: {}", recipe.id, recipe.name);
        }
        DataCommand::ScanReceipt { image, save } => scan_receipt(conn, settings, image, save)?,
        DataCommand::GenerateMenu { save } => {
            let recipes = query::recipe_choices(conn)?;
            let menu = menu::generate_random(&recipes, &mut rand::rng())?;
            print_menu(&menu);
            if save {
                menu.save(conn, now())?;
            }
        }
        DataCommand::ShowMenu => print_menu(&WeekMenu::load(conn)?),
        DataCommand::ClearMenu => {
            let count = query::clear_week_menu(conn)?;
            println!("removed {count} meal(s)");
        }
        DataCommand::ShoppingList => print_shopping_list(conn)?,
        DataCommand::Export { path } => {
            let now = now();
            let path =
                path.unwrap_or_else(|| export::default_export_path(&settings.export_dir, now));
            let menu = WeekMenu::load(conn)?;
            export::export_menu(conn, &menu, &path, settings.csv_delimiter, now)?;
            println!("exported to {}", path.display());
        }
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    if let Err(error) = logging::init(args.config.log_level, args.config.log_file.as_deref()) {
        eprintln!("couldn't set up logging: {error}");
    }

    let result = Settings::from_config(&args.config)
        .map_err(Error::from)
        .and_then(|settings| {
            let database = Database::open(&settings.database_path)?;
            match args.commands {
                Commands::Run => run(database, settings),
                Commands::Data(command) => run_command(command, &database, &settings),
            }
        });
    if let Err(error) = result {
        log::error!("{error}");
        std::process::exit(1);
    }
}
