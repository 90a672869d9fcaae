//! Command-line front end for the notekeep core.
//!
//! # Responsibility
//! - Expose the core's user actions (new note, list/search, export,
//!   import) against one database file.
//! - Keep output deterministic for quick local sanity checks.

use notekeep_core::db::open_db;
use notekeep_core::transfer;
use notekeep_core::{
    CategoryRepository, NoteQuery, NoteScope, NoteService, NoteSortKey, SortDirection,
    SqliteCategoryRepository, SqliteNoteRepository, SqliteSubcategoryRepository,
    SubcategoryRepository,
};
use std::process::ExitCode;

const USAGE: &str = "usage: notekeep [--db <path>] <command>

commands:
  new <title> [content]   create an unlisted note
  list [options]          list notes
      --category <name>   direct notes of one category
      --subcategory <category>/<name>
      --unlisted          notes with no category
      --search <text>     title/content substring filter
      --sort <title|content|created|updated>
      --asc | --desc      sort direction (default: updated --desc)
  categories              list categories with note counts
  export [path]           write a JSON export (default: NotesExport_<stamp>.json)
  import <path>           import a JSON export";

fn main() -> ExitCode {
    if let Ok(log_dir) = std::env::var("NOTEKEEP_LOG_DIR") {
        if let Err(err) = notekeep_core::init_logging(notekeep_core::default_log_level(), &log_dir)
        {
            eprintln!("warning: {err}");
        }
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<(), String> {
    let mut args = args.iter().map(String::as_str).peekable();

    let mut db_path = "notekeep.db".to_string();
    if args.peek() == Some(&"--db") {
        args.next();
        db_path = args
            .next()
            .ok_or_else(|| "--db requires a path".to_string())?
            .to_string();
    }

    let command = args.next().ok_or_else(|| USAGE.to_string())?;
    let rest: Vec<&str> = args.collect();

    match command {
        "new" => cmd_new(&db_path, &rest),
        "list" => cmd_list(&db_path, &rest),
        "categories" => cmd_categories(&db_path),
        "export" => cmd_export(&db_path, &rest),
        "import" => cmd_import(&db_path, &rest),
        "help" | "--help" => {
            println!("{USAGE}");
            Ok(())
        }
        other => Err(format!("unknown command `{other}`\n{USAGE}")),
    }
}

fn cmd_new(db_path: &str, args: &[&str]) -> Result<(), String> {
    let title = args.first().ok_or("new requires a title")?;
    let content = args.get(1).copied().unwrap_or("");

    let conn = open_db(db_path).map_err(|err| err.to_string())?;
    let notes = SqliteNoteRepository::try_new(&conn).map_err(|err| err.to_string())?;
    let subcategories =
        SqliteSubcategoryRepository::try_new(&conn).map_err(|err| err.to_string())?;
    let service = NoteService::new(notes, subcategories);

    let note = service
        .create_note(*title, content, None, None)
        .map_err(|err| err.to_string())?;
    println!("created note {}", note.uuid);
    Ok(())
}

fn cmd_list(db_path: &str, args: &[&str]) -> Result<(), String> {
    let conn = open_db(db_path).map_err(|err| err.to_string())?;

    let mut query = NoteQuery::default();
    let mut iter = args.iter().copied();
    while let Some(flag) = iter.next() {
        match flag {
            "--category" => {
                let name = iter.next().ok_or("--category requires a name")?;
                let categories =
                    SqliteCategoryRepository::try_new(&conn).map_err(|err| err.to_string())?;
                let category = categories
                    .find_by_name(name)
                    .map_err(|err| err.to_string())?
                    .ok_or_else(|| format!("no category named `{name}`"))?;
                query.scope = NoteScope::Category(category.uuid);
            }
            "--subcategory" => {
                let spec = iter.next().ok_or("--subcategory requires <category>/<name>")?;
                let (category_name, subcategory_name) = spec
                    .split_once('/')
                    .ok_or("--subcategory expects <category>/<name>")?;
                let categories =
                    SqliteCategoryRepository::try_new(&conn).map_err(|err| err.to_string())?;
                let subcategories =
                    SqliteSubcategoryRepository::try_new(&conn).map_err(|err| err.to_string())?;
                let category = categories
                    .find_by_name(category_name)
                    .map_err(|err| err.to_string())?
                    .ok_or_else(|| format!("no category named `{category_name}`"))?;
                let subcategory = subcategories
                    .find_by_name_in_category(subcategory_name, category.uuid)
                    .map_err(|err| err.to_string())?
                    .ok_or_else(|| {
                        format!("no subcategory named `{subcategory_name}` in `{category_name}`")
                    })?;
                query.scope = NoteScope::Subcategory(subcategory.uuid);
            }
            "--unlisted" => query.scope = NoteScope::Unlisted,
            "--search" => {
                query.search = Some(
                    iter.next()
                        .ok_or("--search requires text")?
                        .to_string(),
                );
            }
            "--sort" => {
                query.sort_key = match iter.next().ok_or("--sort requires a key")? {
                    "title" => NoteSortKey::Title,
                    "content" => NoteSortKey::Content,
                    "created" => NoteSortKey::CreatedAt,
                    "updated" => NoteSortKey::UpdatedAt,
                    other => return Err(format!("unknown sort key `{other}`")),
                };
            }
            "--asc" => query.direction = SortDirection::Ascending,
            "--desc" => query.direction = SortDirection::Descending,
            other => return Err(format!("unknown list option `{other}`")),
        }
    }

    let notes = SqliteNoteRepository::try_new(&conn).map_err(|err| err.to_string())?;
    let subcategories =
        SqliteSubcategoryRepository::try_new(&conn).map_err(|err| err.to_string())?;
    let service = NoteService::new(notes, subcategories);
    let listed = service.list_notes(&query).map_err(|err| err.to_string())?;

    for note in &listed {
        println!("{}  {}", note.uuid, note.title);
    }
    println!("{} note(s)", listed.len());
    Ok(())
}

fn cmd_categories(db_path: &str) -> Result<(), String> {
    let conn = open_db(db_path).map_err(|err| err.to_string())?;
    let categories = SqliteCategoryRepository::try_new(&conn).map_err(|err| err.to_string())?;
    let subcategories =
        SqliteSubcategoryRepository::try_new(&conn).map_err(|err| err.to_string())?;
    let notes = SqliteNoteRepository::try_new(&conn).map_err(|err| err.to_string())?;
    let service = notekeep_core::CatalogService::new(categories, subcategories, notes);

    for summary in service
        .category_summaries()
        .map_err(|err| err.to_string())?
    {
        println!(
            "{}  {} ({} note(s), {} subcategor{})",
            summary.category.color().name(),
            summary.category.name,
            summary.total_note_count,
            summary.subcategory_count,
            if summary.subcategory_count == 1 { "y" } else { "ies" }
        );
    }
    Ok(())
}

fn cmd_export(db_path: &str, args: &[&str]) -> Result<(), String> {
    let conn = open_db(db_path).map_err(|err| err.to_string())?;
    let path = match args.first() {
        Some(path) => (*path).to_string(),
        None => transfer::default_export_filename(transfer::local_now()),
    };

    transfer::export_to_file(&conn, &path).map_err(|err| err.to_string())?;
    println!("exported to {path}");
    Ok(())
}

fn cmd_import(db_path: &str, args: &[&str]) -> Result<(), String> {
    let path = args.first().ok_or("import requires a file path")?;
    let mut conn = open_db(db_path).map_err(|err| err.to_string())?;

    let summary =
        transfer::import_from_file(&mut conn, *path, None).map_err(|err| err.to_string())?;
    println!(
        "imported: {} categor(ies) created, {} matched; {} subcategor(ies) created, {} matched; {} note(s) created, {} duplicate(s) skipped, {} record(s) skipped",
        summary.categories_created,
        summary.categories_matched,
        summary.subcategories_created,
        summary.subcategories_matched,
        summary.notes_created,
        summary.notes_skipped,
        summary.records_skipped,
    );
    Ok(())
}
