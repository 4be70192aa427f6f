//! # CLI Layer
//!
//! This module is **one possible UI client** for pensive, not the application
//! itself.
//!
//! The CLI layer is the **only** place in the codebase that:
//! - Knows about terminal I/O (stdout, stderr, prompts)
//! - Launches the editor and attachment openers
//! - Handles argument parsing
//! - Formats output for human consumption
//!
//! ## Structure
//!
//! - `run()`: Main dispatch logic (called by `main.rs`)
//! - `init_context()`: Builds `AppContext` with API, paths and configuration
//! - `handle_*()`: Per-command handlers that call the API and print results

use super::render::{
    print_backups, print_categories, print_hits, print_messages, print_sections, print_tags,
    print_warning, render_entry,
};
use super::setup::{CategoryCommands, Cli, Commands, TagCommands};
use clap::Parser;
use pensive::api::{CmdMessage, PensiveApi};
use pensive::attachment::{expand_home, tag_pattern, AttachmentKind};
use pensive::commands::EntryView;
use pensive::config::{data_dir, PensiveConfig, PensivePaths};
use pensive::editor;
use pensive::error::{PensiveError, Result};
use pensive::index::MoveTarget;
use pensive::launcher;
use pensive::model::Format;
use pensive::store::sqlite::SqliteStore;
use std::fs;
use std::io::{self, BufRead, Write};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

struct AppContext {
    api: PensiveApi<SqliteStore>,
    config: PensiveConfig,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut ctx = init_context(&cli)?;
    if ctx.api.initialized() && !matches!(cli.command, Commands::Init) {
        print_messages(&[CmdMessage::info(format!(
            "Initialized new store at {}",
            ctx.api.paths().database.display()
        ))]);
    }

    let outcome = match cli.command {
        Commands::Tag { action } => match action {
            TagCommands::Add { tags } => handle_tag_add(&mut ctx, tags),
            TagCommands::Rm { tags, yes } => handle_tag_rm(&mut ctx, tags, yes),
            TagCommands::Mv { old, new } => handle_tag_mv(&mut ctx, old, new),
            TagCommands::Ls { pattern } => handle_tag_ls(&ctx, pattern),
        },
        Commands::Show {
            tag,
            selector,
            no_open,
        } => handle_show(&ctx, tag, selector, no_open),
        Commands::Edit { tag, selector, yes } => handle_edit(&mut ctx, tag, selector, yes),
        Commands::Remove { tag, selector, yes } => handle_remove(&mut ctx, tag, selector, yes),
        Commands::Mv {
            tag,
            source,
            target,
            yes,
        } => handle_mv(&mut ctx, tag, source, target, yes),
        Commands::Search { pattern } => handle_search(&ctx, pattern),
        Commands::Category { action } => match action {
            CategoryCommands::Show => handle_category_show(&ctx),
            CategoryCommands::Add { name, format } => handle_category_add(&mut ctx, name, format),
            CategoryCommands::Rm { name, yes } => handle_category_rm(&mut ctx, name, yes),
            CategoryCommands::Mv { old, new } => handle_category_mv(&mut ctx, old, new),
        },
        Commands::Backup { name } => handle_backup(&ctx, name),
        Commands::Restore { index, yes } => handle_restore(&mut ctx, index, yes),
        Commands::Export => handle_export(&ctx),
        Commands::Init => handle_init(&ctx),
    };

    match outcome {
        // Collisions cancel the write and are reported, not fatal.
        Err(PensiveError::DuplicateEntry) => {
            print_warning(&PensiveError::DuplicateEntry.to_string());
            Ok(())
        }
        other => other,
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "pensive=debug" } else { "pensive=warn" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into());
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .try_init();
}

fn init_context(cli: &Cli) -> Result<AppContext> {
    let data_dir = data_dir(cli.data.clone())?;
    fs::create_dir_all(&data_dir)?;
    let config = PensiveConfig::load(&data_dir)?;
    let paths = PensivePaths::new(data_dir, &config);
    if let Some(parent) = paths.database.parent() {
        fs::create_dir_all(parent)?;
    }
    debug!(database = %paths.database.display(), "opening store");

    let store = SqliteStore::open(&paths.database)?;
    let api = PensiveApi::new(store, paths, config.highlight_tags)?;
    Ok(AppContext { api, config })
}

/// Asks a yes/no question on stdin. Anything but `y`/`yes` declines.
fn confirm(question: &str, assume_yes: bool) -> Result<bool> {
    if assume_yes {
        return Ok(true);
    }
    print!("{} [y/N] ", question);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

fn canceled() -> Result<()> {
    print_messages(&[CmdMessage::info("Canceled")]);
    Ok(())
}

// --- tags ---

fn handle_tag_add(ctx: &mut AppContext, tags: Vec<String>) -> Result<()> {
    let result = ctx.api.add_tags(&tags)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_tag_rm(ctx: &mut AppContext, tags: Vec<String>, yes: bool) -> Result<()> {
    for tag in tags {
        let question = format!("Remove tag '{}' and everything filed under it?", tag);
        if !confirm(&question, yes)? {
            canceled()?;
            continue;
        }
        let result = ctx.api.remove_tag(&tag)?;
        print_messages(&result.messages);
    }
    Ok(())
}

fn handle_tag_mv(ctx: &mut AppContext, old: String, new: String) -> Result<()> {
    let result = ctx.api.rename_tag(&old, &new)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_tag_ls(ctx: &AppContext, pattern: Option<String>) -> Result<()> {
    let result = ctx.api.list_tags(pattern.as_deref())?;
    print_tags(&result.tags);
    print_messages(&result.messages);
    Ok(())
}

// --- entries ---

fn handle_show(
    ctx: &AppContext,
    tag: String,
    selector: Option<String>,
    no_open: bool,
) -> Result<()> {
    let result = ctx.api.show(&tag, selector.as_deref())?;
    print_sections(&result.sections, ctx.config.attachment_layout);
    if let Some(view) = &result.entry {
        println!("{}", render_entry(view));
        if !no_open {
            open_attachment(ctx, view)?;
        }
    }
    print_messages(&result.messages);
    Ok(())
}

fn open_attachment(ctx: &AppContext, view: &EntryView) -> Result<()> {
    let (Some(status), Some(attachment)) = (&view.attachment, view.entry.attachment()) else {
        return Ok(());
    };
    match status.kind {
        AttachmentKind::Url => launcher::open_url(&ctx.config.browser, attachment),
        AttachmentKind::File => launcher::open_path(&expand_home(attachment)),
        AttachmentKind::Tag if !status.exists => {
            print_warning(&format!(
                "Tag '{}' is not defined yet. How about adding it with 'pensive tag add {}'?",
                attachment, attachment
            ));
            Ok(())
        }
        AttachmentKind::Tag => {
            let result = ctx.api.show(attachment, None)?;
            print_sections(&result.sections, ctx.config.attachment_layout);
            print_messages(&result.messages);
            Ok(())
        }
        AttachmentKind::TagPattern => {
            let result = ctx.api.list_tags(Some(&tag_pattern(attachment)))?;
            print_tags(&result.tags);
            print_messages(&result.messages);
            Ok(())
        }
    }
}

fn handle_edit(ctx: &mut AppContext, tag: String, selector: String, yes: bool) -> Result<()> {
    if !ctx.api.has_tag(&tag) {
        if !confirm(&format!("Tag '{}' is not defined. Add it?", tag.trim()), yes)? {
            return canceled();
        }
        let result = ctx.api.add_tags(&[&tag])?;
        print_messages(&result.messages);
    }

    let session = ctx.api.begin_edit(&tag, &selector)?;
    match editor::edit(&ctx.config.editor(), &session.buffer)? {
        Some(buffer) => {
            let result = ctx.api.finish_edit(&session, &buffer)?;
            print_messages(&result.messages);
        }
        None => print_messages(&[CmdMessage::info("No changes, nothing saved")]),
    }
    Ok(())
}

fn handle_remove(ctx: &mut AppContext, tag: String, selector: String, yes: bool) -> Result<()> {
    if !confirm(&format!("Remove {} of '{}'?", selector, tag), yes)? {
        return canceled();
    }
    let result = ctx.api.remove(&tag, &selector)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_mv(
    ctx: &mut AppContext,
    tag: String,
    source: String,
    target: String,
    yes: bool,
) -> Result<()> {
    let parsed: MoveTarget = target.parse()?;
    if let Some(target_tag) = &parsed.tag {
        if !ctx.api.has_tag(target_tag) {
            let question = format!("Tag '{}' is not defined. Add it?", target_tag);
            if !confirm(&question, yes)? {
                return canceled();
            }
        }
    }
    let result = ctx.api.move_entry(&tag, &source, &target)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_search(ctx: &AppContext, pattern: String) -> Result<()> {
    let result = ctx.api.search(&pattern)?;
    print_hits(&result.hits);
    print_messages(&result.messages);
    Ok(())
}

// --- categories ---

fn handle_category_show(ctx: &AppContext) -> Result<()> {
    let result = ctx.api.list_categories()?;
    print_categories(&result.categories);
    print_messages(&result.messages);
    Ok(())
}

fn handle_category_add(ctx: &mut AppContext, name: String, format: u8) -> Result<()> {
    let format = Format::from_id(i64::from(format))?;
    let result = ctx.api.add_category(&name, format)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_category_rm(ctx: &mut AppContext, name: String, yes: bool) -> Result<()> {
    let question = format!("Remove category '{}' and all its entries?", name);
    if !confirm(&question, yes)? {
        return canceled();
    }
    let result = ctx.api.remove_category(&name)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_category_mv(ctx: &mut AppContext, old: String, new: String) -> Result<()> {
    let result = ctx.api.rename_category(&old, &new)?;
    print_messages(&result.messages);
    Ok(())
}

// --- store files ---

fn handle_backup(ctx: &AppContext, name: Option<String>) -> Result<()> {
    let result = ctx.api.backup(name.as_deref())?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_restore(ctx: &mut AppContext, index: Option<usize>, yes: bool) -> Result<()> {
    let Some(index) = index else {
        let result = ctx.api.backups()?;
        print_backups(&result.backups);
        print_messages(&result.messages);
        return Ok(());
    };
    if !confirm("Restoring overwrites the current store. Continue?", yes)? {
        return canceled();
    }
    let result = ctx.api.restore(index)?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_export(ctx: &AppContext) -> Result<()> {
    let result = ctx.api.export()?;
    print_messages(&result.messages);
    Ok(())
}

fn handle_init(ctx: &AppContext) -> Result<()> {
    let database = ctx.api.paths().database.display();
    let message = if ctx.api.initialized() {
        CmdMessage::success(format!("Initialized new store at {}", database))
    } else {
        CmdMessage::info(format!("Store already initialized at {}", database))
    };
    print_messages(&[message]);
    Ok(())
}
