//! Day-editing commands for CLI.
//!
//! Each command reads a whole day of items as a JSON array, applies one
//! operation and prints the resulting day as JSON on stdout.

use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, Utc};
use clap::Subcommand;
use magnetline_core::error::Result;
use magnetline_core::timeline::{
    format_clock, minutes_since_midnight, parse_clock, validate_with_floor,
};
use magnetline_core::{
    create_default_timeline, split_item_at, Config, ReflowEngine, TimelineItem, ValidationError,
};
use uuid::Uuid;

#[derive(Subcommand)]
pub enum DayAction {
    /// Print a fresh default day (Sleep, Morning Routine, Work, Evening)
    Bootstrap {
        /// Owner of the new timeline
        #[arg(long)]
        owner: String,
        /// Day to anchor the items on (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Reflow a day so it covers 24 hours again
    Reflow {
        /// JSON file with the day's items ("-" for stdin)
        file: String,
    },
    /// Insert a new item and reflow
    Insert {
        /// JSON file with the day's items ("-" for stdin)
        file: String,
        /// Title of the new item
        #[arg(long)]
        title: String,
        /// Duration in minutes
        #[arg(long)]
        minutes: i64,
        /// Start time (HH:MM)
        #[arg(long)]
        at: String,
        /// Owner (defaults to the owner of the first item)
        #[arg(long)]
        owner: Option<String>,
        #[arg(long)]
        color: Option<String>,
        /// Template the item was created from
        #[arg(long)]
        template: Option<String>,
        /// Let reflow compress or expand the item
        #[arg(long)]
        flexible: bool,
        /// Pin the item in place
        #[arg(long)]
        locked: bool,
    },
    /// Move an item to a new start time and reflow
    Move {
        /// JSON file with the day's items ("-" for stdin)
        file: String,
        #[arg(long)]
        id: String,
        /// New start time (HH:MM)
        #[arg(long)]
        to: String,
    },
    /// Change an item's duration and reflow
    Resize {
        /// JSON file with the day's items ("-" for stdin)
        file: String,
        #[arg(long)]
        id: String,
        /// New duration in minutes
        #[arg(long)]
        minutes: i64,
    },
    /// Split an item in two (does not reflow)
    Split {
        /// JSON file with the day's items ("-" for stdin)
        file: String,
        #[arg(long)]
        id: String,
        /// Split point (HH:MM)
        #[arg(long)]
        at: String,
    },
    /// Remove an item and reflow
    Remove {
        /// JSON file with the day's items ("-" for stdin)
        file: String,
        #[arg(long)]
        id: String,
    },
    /// Check coverage; exits with status 2 when the day is not valid
    Check {
        /// JSON file with the day's items ("-" for stdin)
        file: String,
    },
    /// Print the day as a readable list
    Show {
        /// JSON file with the day's items ("-" for stdin)
        file: String,
    },
}

fn read_items(file: &str) -> Result<Vec<TimelineItem>> {
    let content = if file == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(Path::new(file))?
    };
    Ok(serde_json::from_str(&content)?)
}

fn print_items(items: &[TimelineItem]) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(items)?);
    Ok(())
}

pub fn run(action: DayAction) -> Result<()> {
    let config = Config::load_or_default();
    let engine = ReflowEngine::with_config(config.reflow.clone());

    match action {
        DayAction::Bootstrap { owner, date } => {
            let day = date.unwrap_or_else(|| Utc::now().date_naive());
            print_items(&create_default_timeline(&owner, day))?;
        }
        DayAction::Reflow { file } => {
            let items = read_items(&file)?;
            print_items(&engine.reflow(&items))?;
        }
        DayAction::Insert {
            file,
            title,
            minutes,
            at,
            owner,
            color,
            template,
            flexible,
            locked,
        } => {
            let items = read_items(&file)?;
            let target = parse_clock(&at)?;
            let owner = owner
                .or_else(|| items.first().map(|i| i.owner.clone()))
                .ok_or(ValidationError::MissingOwner)?;

            let mut item = TimelineItem::try_new(
                Uuid::new_v4().to_string(),
                owner,
                title,
                Utc::now(),
                minutes,
            )?;
            item.is_flexible = flexible;
            item.is_locked_time = locked;
            if let Some(color) = color {
                item = item.with_color(color);
            }
            if let Some(template) = template {
                item = item.with_template(template);
            }
            print_items(&engine.insert_item_at_position(&items, item, target)?)?;
        }
        DayAction::Move { file, id, to } => {
            let items = read_items(&file)?;
            let target = parse_clock(&to)?;
            print_items(&engine.move_item(&items, &id, target)?)?;
        }
        DayAction::Resize { file, id, minutes } => {
            let items = read_items(&file)?;
            print_items(&engine.resize_item(&items, &id, minutes)?)?;
        }
        DayAction::Split { file, id, at } => {
            let items = read_items(&file)?;
            let split = parse_clock(&at)?;
            print_items(&split_item_at(&items, &id, split))?;
        }
        DayAction::Remove { file, id } => {
            let items = read_items(&file)?;
            print_items(&engine.remove_item(&items, &id))?;
        }
        DayAction::Check { file } => {
            let items = read_items(&file)?;
            let report = validate_with_floor(&items, config.reflow.min_flexible_minutes);
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !report.is_valid() {
                std::process::exit(2);
            }
        }
        DayAction::Show { file } => {
            let mut items = read_items(&file)?;
            items.sort_by_key(|i| minutes_since_midnight(i.start_time));
            for item in &items {
                let start = minutes_since_midnight(item.start_time);
                let mut flags = Vec::new();
                if item.is_locked_time {
                    flags.push("locked");
                }
                if item.is_flexible {
                    flags.push("flexible");
                }
                if item.is_compressed() {
                    flags.push("compressed");
                }
                let flags = if flags.is_empty() {
                    String::new()
                } else {
                    format!("  [{}]", flags.join(", "))
                };
                println!(
                    "{}-{}  {}{flags}",
                    format_clock(start),
                    format_clock(start + item.duration_minutes),
                    item.title
                );
            }
        }
    }
    Ok(())
}
