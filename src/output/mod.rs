//! Output formatting for CLI display
//!
//! Pure formatting helpers return strings so they can be tested; the `print_*`
//! functions write to stdout with `colored`.

use crate::selection::{BulkActionRequest, HeaderTriState, SelectionCoordinator};
use crate::settings::{Column, ColumnLayout};
use crate::torrents::{Torrent, TorrentPage};
use crate::view::ActionOutcome;
use byte_unit::{Byte, UnitType};
use chrono::{DateTime, Duration, Utc};
use colored::Colorize;

/// Human readable size with binary units
#[must_use]
pub fn format_size(bytes: u64) -> String {
    let adjusted = Byte::from_u64(bytes).get_appropriate_unit(UnitType::Binary);
    format!("{adjusted:.1}")
}

/// Compact age: `45s`, `12m`, `5h`, `3d`, `2y`
#[must_use]
pub fn format_age(age: Duration) -> String {
    let secs = age.num_seconds().max(0);
    match secs {
        s if s < 60 => format!("{s}s"),
        s if s < 3_600 => format!("{}m", s / 60),
        s if s < 86_400 => format!("{}h", s / 3_600),
        s if s < 365 * 86_400 => format!("{}d", s / 86_400),
        s => format!("{}y", s / (365 * 86_400)),
    }
}

/// Name to show for a torrent
///
/// In incognito mode the name is replaced by a placeholder derived from the
/// hash, so the same torrent keeps the same placeholder between runs.
#[must_use]
pub fn display_name(torrent: &Torrent, incognito: bool) -> String {
    if incognito {
        let short: String = torrent.hash.chars().take(8).collect();
        format!("torrent-{short}")
    } else {
        torrent.name.clone()
    }
}

fn format_optional(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

/// Unpadded text of one cell
#[must_use]
pub fn cell_text(torrent: &Torrent, column: Column, now: DateTime<Utc>, incognito: bool) -> String {
    match column {
        Column::Name => display_name(torrent, incognito),
        Column::Size => format_size(torrent.size),
        Column::State => torrent.state.label().to_string(),
        Column::Seeds => torrent.num_seeds.to_string(),
        Column::Ratio => format!("{:.2}", torrent.ratio),
        Column::Age => format_age(torrent.age(now)),
        Column::EconomyScore => format_optional(torrent.economy_score),
        Column::Dedup => format_optional(torrent.deduplication_factor),
        Column::Category => torrent.category.clone(),
        Column::Tags => torrent.tags.join(", "),
        Column::Tracker => torrent.tracker_domain().unwrap_or("-").to_string(),
    }
}

/// Pad or truncate to exactly `width` characters
#[must_use]
pub fn fit(text: &str, width: u16) -> String {
    let width = usize::from(width);
    let len = text.chars().count();
    if len <= width {
        format!("{text:<width$}")
    } else if width == 0 {
        String::new()
    } else {
        let mut truncated: String = text.chars().take(width - 1).collect();
        truncated.push('…');
        truncated
    }
}

/// Header line with the select-all checkbox
#[must_use]
pub fn header_line(layout: &ColumnLayout, state: HeaderTriState) -> String {
    let titles: Vec<String> = layout
        .visible_columns()
        .into_iter()
        .map(|column| fit(column.title(), layout.width(column)))
        .collect();
    format!("{} {}", state.symbol(), titles.join(" "))
}

/// One table row, uncoloured
#[must_use]
pub fn row_line(
    torrent: &Torrent,
    layout: &ColumnLayout,
    selected: bool,
    now: DateTime<Utc>,
    incognito: bool,
) -> String {
    let marker = if selected { "[x]" } else { "[ ]" };
    let cells: Vec<String> = layout
        .visible_columns()
        .into_iter()
        .map(|column| fit(&cell_text(torrent, column, now, incognito), layout.width(column)))
        .collect();
    format!("{marker} {}", cells.join(" "))
}

/// One line describing the selection
#[must_use]
pub fn selection_summary(selection: &SelectionCoordinator, total_matching: usize) -> String {
    let count = selection.effective_count(total_matching);
    if selection.is_all_matching() {
        let excluded = selection.excluded_count();
        if excluded == 0 {
            format!("All {count} matching torrent(s) selected")
        } else {
            format!("{count} of {total_matching} matching torrent(s) selected ({excluded} excluded)")
        }
    } else if count == 0 {
        "No torrents selected".to_string()
    } else {
        format!("{count} of {total_matching} torrent(s) selected")
    }
}

/// Print a page of torrents as a table
pub fn print_page(
    page: &TorrentPage,
    page_index: usize,
    page_count: usize,
    layout: &ColumnLayout,
    selection: &SelectionCoordinator,
    incognito: bool,
    quiet: bool,
) {
    let now = Utc::now();
    let state = selection.header_tri_state(page.torrents.iter().map(|t| t.hash.as_str()));

    if !quiet {
        println!("{}", header_line(layout, state).bold());
    }

    for torrent in &page.torrents {
        let line = row_line(torrent, layout, selection.is_selected(&torrent.hash), now, incognito);
        let colored = if torrent.state.is_errored() {
            line.red()
        } else if torrent.state.is_paused() {
            line.yellow()
        } else if torrent.state.is_seeding() {
            line.green()
        } else if torrent.state.is_downloading() {
            line.cyan()
        } else {
            line.normal()
        };
        println!("{colored}");
    }

    if !quiet {
        println!(
            "\n{} {}",
            format!("Page {}/{}", page_index + 1, page_count.max(1)).dimmed(),
            format!("({} matching)", page.total).dimmed()
        );
        println!("{}", selection_summary(selection, page.total).cyan());
    }
}

/// Print the column layout, one column per line
pub fn print_layout(layout: &ColumnLayout) {
    println!("{}", "=== Columns ===".bold());
    for (index, column) in layout.ordered().into_iter().enumerate() {
        let visibility = if layout.is_visible(column) {
            "shown".green()
        } else {
            "hidden".yellow()
        };
        println!(
            "  {index:>2}. {:<10} width {:>3}  {visibility}",
            column.id(),
            layout.width(column)
        );
    }
}

/// Print a request as pretty JSON
///
/// # Errors
///
/// Returns `serde_json::Error` if the request cannot be serialised.
pub fn print_request(request: &BulkActionRequest) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(request)?);
    Ok(())
}

/// Print the result of a bulk action
pub fn print_outcome(outcome: &ActionOutcome, quiet: bool) {
    match outcome {
        ActionOutcome::Success {
            affected_count,
            details,
        } => {
            if quiet {
                println!("{affected_count}");
                return;
            }
            println!("\n{}", format!("=== {details} ===").bold());
            println!("  {} {affected_count}", "✓ Affected:".green());
        }
        ActionOutcome::NothingSelected => {
            if !quiet {
                println!("{}", "Nothing selected, no action sent.".yellow());
            }
        }
    }
}
