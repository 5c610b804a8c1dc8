//! Column and incognito commands - edit the persisted view settings

use super::TORRENTS_SCOPE;
use crate::{
    QuiError,
    cli::{ColumnsCommand, Toggle},
    output,
    settings::{Column, ColumnLayout, SettingsStore, ViewSettings},
};
use colored::Colorize;

type Result<T> = std::result::Result<T, QuiError>;

/// Apply a column command to a layout
///
/// Returns whether the layout changed.
///
/// # Errors
///
/// Returns `QuiError::SettingsError` for unknown columns or when hiding the
/// name column.
pub fn apply_to_layout(layout: &mut ColumnLayout, command: &ColumnsCommand) -> Result<bool> {
    let before = layout.clone();
    match command {
        ColumnsCommand::Show => {}
        ColumnsCommand::Hide { column } => layout.set_visible(Column::parse(column)?, false)?,
        ColumnsCommand::Unhide { column } => layout.set_visible(Column::parse(column)?, true)?,
        ColumnsCommand::Move { column, index } => layout.move_column(Column::parse(column)?, *index),
        ColumnsCommand::Resize { column, width } => layout.resize(Column::parse(column)?, *width),
        ColumnsCommand::Reset => *layout = ColumnLayout::default(),
    }
    Ok(*layout != before)
}

/// Execute a columns subcommand against the torrents scope
///
/// # Errors
///
/// Returns `QuiError` if the settings cannot be loaded or saved, or the
/// command is invalid.
pub fn execute<S: SettingsStore>(store: &S, command: &ColumnsCommand, quiet: bool) -> Result<()> {
    let mut settings = store.load(TORRENTS_SCOPE)?;
    let changed = apply_to_layout(&mut settings.columns, command)?;

    if changed {
        store.save(TORRENTS_SCOPE, &settings)?;
    }

    if !quiet {
        output::print_layout(&settings.columns);
    }
    Ok(())
}

/// Turn incognito mode on or off
///
/// # Errors
///
/// Returns `QuiError` if the settings cannot be loaded or saved.
pub fn incognito<S: SettingsStore>(store: &S, state: Toggle, quiet: bool) -> Result<()> {
    let mut settings: ViewSettings = store.load(TORRENTS_SCOPE)?;
    settings.incognito = state == Toggle::On;
    store.save(TORRENTS_SCOPE, &settings)?;

    if !quiet {
        let label = if settings.incognito {
            "on".green()
        } else {
            "off".yellow()
        };
        println!("Incognito mode {label}");
    }
    Ok(())
}
