//! Sheetgrid CLI - read and edit cells of XLSX files

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use sheetgrid::prelude::*;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sheetgrid")]
#[command(author, version, about = "Read and edit cells of XLSX spreadsheets")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all sheets in a workbook
    Sheets {
        /// Input spreadsheet file
        input: PathBuf,
    },

    /// Print the value of one cell
    Get {
        /// Input spreadsheet file
        input: PathBuf,

        /// Cell address, e.g. B7
        address: String,

        /// Sheet id or name (default: first sheet)
        #[arg(short, long)]
        sheet: Option<String>,

        /// Read the value as this kind (text, number, date, boolean)
        #[arg(short, long, value_parser = parse_kind)]
        kind: Option<ValueKind>,
    },

    /// Write one cell and save the file, creating it if needed
    Set {
        /// Spreadsheet file
        input: PathBuf,

        /// Cell address, e.g. B7
        address: String,

        /// Value to write
        value: String,

        /// Sheet id or name (default: first sheet, created if there is none)
        #[arg(short, long)]
        sheet: Option<String>,

        /// Store the value as this kind (text, shared, number, date, boolean)
        #[arg(short, long, value_parser = parse_kind, default_value = "shared")]
        kind: ValueKind,
    },

    /// Add a sheet and save the file, creating it if needed
    AddSheet {
        /// Spreadsheet file
        input: PathBuf,

        /// Sheet name (default: first free SheetN)
        #[arg(default_value = "")]
        name: String,
    },

    /// Rename a sheet and save the file
    Rename {
        /// Spreadsheet file
        input: PathBuf,

        /// Sheet id or current name
        sheet: String,

        /// New name
        name: String,
    },

    /// Print a sheet's materialized cells as delimited text
    Dump {
        /// Input spreadsheet file
        input: PathBuf,

        /// Sheet id or name (default: first sheet)
        #[arg(short, long)]
        sheet: Option<String>,

        /// Field delimiter (default: tab)
        #[arg(short, long, default_value = "\t")]
        delimiter: char,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Sheets { input } => list_sheets(&input),
        Commands::Get {
            input,
            address,
            sheet,
            kind,
        } => get_cell(&input, &address, sheet.as_deref(), kind),
        Commands::Set {
            input,
            address,
            value,
            sheet,
            kind,
        } => set_cell(&input, &address, &value, sheet.as_deref(), kind),
        Commands::AddSheet { input, name } => add_sheet(&input, &name),
        Commands::Rename { input, sheet, name } => rename_sheet(&input, &sheet, &name),
        Commands::Dump {
            input,
            sheet,
            delimiter,
        } => dump_sheet(&input, sheet.as_deref(), delimiter),
    }
}

fn parse_kind(s: &str) -> Result<ValueKind, String> {
    ValueKind::parse(s).ok_or_else(|| format!("unknown value kind '{}'", s))
}

/// Open an existing file without saving it on drop
fn open_read_only(input: &Path) -> Result<Document> {
    let options = OpenOptions {
        create_if_missing: false,
        save_on_close: false,
    };
    Document::open_with(input, options)
        .with_context(|| format!("Failed to open '{}'", input.display()))
}

/// Open a file for editing, creating it if it does not exist
fn open_for_edit(input: &Path) -> Result<Document> {
    let options = OpenOptions {
        create_if_missing: true,
        save_on_close: false,
    };
    Document::open_with(input, options)
        .with_context(|| format!("Failed to open '{}'", input.display()))
}

fn save(doc: &mut Document) -> Result<()> {
    doc.save().context("Failed to save")
}

/// Resolve a sheet given by id or name, defaulting to the first sheet
fn find_sheet(doc: &Document, sheet: Option<&str>) -> Result<u32> {
    let id = match sheet {
        None => doc.sheets().ids().next(),
        Some(key) => match key.parse::<u32>() {
            Ok(id) if doc.sheet(id).is_some() => Some(id),
            _ => doc.sheet_by_name(key).map(|s| s.id()),
        },
    };
    match (id, sheet) {
        (Some(id), _) => Ok(id),
        (None, Some(key)) => bail!("Sheet '{}' not found", key),
        (None, None) => bail!("Workbook has no sheets"),
    }
}

fn list_sheets(input: &Path) -> Result<()> {
    let doc = open_read_only(input)?;
    for sheet in doc.iter_sheets() {
        println!("{}\t{}\t{} rows", sheet.id(), sheet.name(), sheet.row_count());
    }
    Ok(())
}

fn get_cell(input: &Path, address: &str, sheet: Option<&str>, kind: Option<ValueKind>) -> Result<()> {
    let doc = open_read_only(input)?;
    let id = find_sheet(&doc, sheet)?;
    let sheet = doc
        .sheet(id)
        .with_context(|| format!("Sheet {} not found", id))?;
    let Some(cell) = sheet
        .cell(address)
        .with_context(|| format!("Invalid address '{}'", address))?
    else {
        return Ok(());
    };

    let text = match kind {
        None => cell.read()?.to_string(),
        Some(ValueKind::Text) | Some(ValueKind::SharedText) => cell.read_as_text()?,
        Some(ValueKind::Number) => cell.read_as_number()?.to_string(),
        Some(ValueKind::Boolean) => CellValue::Boolean(cell.read_as_boolean()?).to_string(),
        Some(ValueKind::Date) => CellValue::Date(cell.read_as_date()?).to_string(),
    };
    println!("{}", text);
    Ok(())
}

fn set_cell(
    input: &Path,
    address: &str,
    value: &str,
    sheet: Option<&str>,
    kind: ValueKind,
) -> Result<()> {
    let mut doc = open_for_edit(input)?;
    let id = match (sheet, doc.sheet_count()) {
        (None, 0) => doc.add_sheet("")?.id(),
        _ => find_sheet(&doc, sheet)?,
    };
    let mut sheet = doc
        .sheet_mut(id)
        .with_context(|| format!("Sheet {} not found", id))?;
    sheet
        .cell(address)
        .with_context(|| format!("Invalid address '{}'", address))?
        .write_as(value, kind)
        .with_context(|| format!("Cannot store '{}' as {}", value, kind))?;
    save(&mut doc)
}

fn add_sheet(input: &Path, name: &str) -> Result<()> {
    let mut doc = open_for_edit(input)?;
    let (id, name) = {
        let sheet = doc
            .add_sheet(name)
            .with_context(|| format!("Cannot add sheet '{}'", name))?;
        (sheet.id(), sheet.name().to_string())
    };
    save(&mut doc)?;
    eprintln!("Added sheet {} '{}'", id, name);
    Ok(())
}

fn rename_sheet(input: &Path, sheet: &str, name: &str) -> Result<()> {
    let mut doc = open_read_only(input)?;
    let id = find_sheet(&doc, Some(sheet))?;
    doc.rename_sheet(id, name)
        .with_context(|| format!("Cannot rename sheet to '{}'", name))?;
    save(&mut doc)
}

fn dump_sheet(input: &Path, sheet: Option<&str>, delimiter: char) -> Result<()> {
    let doc = open_read_only(input)?;
    let id = find_sheet(&doc, sheet)?;
    let sheet = doc
        .sheet(id)
        .with_context(|| format!("Sheet {} not found", id))?;

    let mut output = String::new();
    for row in sheet.rows() {
        let mut first = true;
        for cell in row.cells() {
            if !first {
                output.push(delimiter);
            }
            first = false;
            output.push_str(&cell.address().to_string());
            output.push('=');
            output.push_str(&quote(&cell.read()?.to_string(), delimiter));
        }
        output.push('\n');
    }

    io::stdout()
        .write_all(output.as_bytes())
        .context("Failed to write to stdout")?;
    Ok(())
}

/// Quote a field if it contains the delimiter, quotes or line breaks
fn quote(text: &str, delimiter: char) -> String {
    if text.contains(delimiter) || text.contains('"') || text.contains('\n') || text.contains('\r')
    {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}
