//! Plain-text rendering for rollup outputs.
//!
//! Renderers consume the read-only metrics structs and return strings;
//! nothing here computes. JSON output never passes through this module,
//! it serializes the metrics structs directly.

use crate::metrics::{DevGroupRollup, FilterOptions, GlobalMetrics};
use crate::store::UploadReceipt;
use crate::table::{EnrichedRow, GroupSummaryRow};
use mig_config::StageFlag;
use serde::{Deserialize, Serialize};

/// Shown whenever a filtered result set is empty.
pub const NO_DATA_MESSAGE: &str = "No data after filters.";

// ---------------------------------------------------------------------------
// KPI tiles
// ---------------------------------------------------------------------------

/// A labeled headline number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KpiTile {
    pub label: String,
    pub value: String,
}

/// The six headline tiles, with thousands-separated values.
pub fn kpi_tiles(global: &GlobalMetrics) -> Vec<KpiTile> {
    let tile = |label: &str, value: u64| KpiTile {
        label: label.to_string(),
        value: thousands(value),
    };
    vec![
        tile("Jobs for Conv.", global.total_rows),
        tile("Projects", global.distinct_projects),
        tile("Dev Groups", global.distinct_dev_groups),
        tile("Spec Done", global.flags.spec_done),
        tile("ETL Done", global.flags.etl_done),
        tile("QA Done/Ready for UAT", global.flags.qa_done),
    ]
}

/// Render tiles as aligned label/value lines.
pub fn render_tiles(tiles: &[KpiTile]) -> String {
    let width = tiles.iter().map(|t| t.label.len()).max().unwrap_or(0);
    tiles
        .iter()
        .map(|t| format!("{:<width$}  {:>10}", t.label, t.value, width = width))
        .collect::<Vec<_>>()
        .join("\n")
}

// ---------------------------------------------------------------------------
// Group summary table
// ---------------------------------------------------------------------------

/// Render the group summary table (display order expected from the caller).
pub fn render_group_table(groups: &[GroupSummaryRow]) -> String {
    if groups.is_empty() {
        return NO_DATA_MESSAGE.to_string();
    }

    let project_w = column_width("PROJECT", groups.iter().map(|g| key_display(&g.project)));
    let group_w = column_width(
        "DEV GROUP",
        groups.iter().map(|g| key_display(&g.dev_grp_name)),
    );

    let mut lines = Vec::with_capacity(groups.len() + 2);
    lines.push("ETLs By Project and Dev Group".to_string());
    lines.push(format!(
        "{:<project_w$}  {:<group_w$}  {:>6}  {:>5}  {:>5}  {:>5}  {:>5}  {:>5}  {:>4}",
        "PROJECT", "DEV GROUP", "TOTAL", "SPEC", "ETL", "QA", "ACC", "PROD", "QA%",
    ));
    for g in groups {
        lines.push(format!(
            "{:<project_w$}  {:<group_w$}  {:>6}  {:>5}  {:>5}  {:>5}  {:>5}  {:>5}  {:>3}%",
            key_display(&g.project),
            key_display(&g.dev_grp_name),
            g.total,
            g.counts.spec_done,
            g.counts.etl_done,
            g.counts.qa_done,
            g.counts.acc_done,
            g.counts.prod_done,
            g.percent_complete(),
        ));
    }
    lines.join("\n")
}

// ---------------------------------------------------------------------------
// Per-group progress cards
// ---------------------------------------------------------------------------

/// Render one progress card per group row.
pub fn render_group_cards(groups: &[GroupSummaryRow]) -> String {
    if groups.is_empty() {
        return NO_DATA_MESSAGE.to_string();
    }

    let mut lines = vec!["Progress by Dev Group".to_string()];
    for g in groups {
        let pct = g.percent_complete();
        lines.push(String::new());
        lines.push(format!(
            "{} ({})",
            key_display(&g.dev_grp_name),
            key_display(&g.project),
        ));
        lines.push(format!(
            "  rows {}  spec {}  etl {}  qa {}  acc {}  prod {}",
            g.total,
            g.counts.spec_done,
            g.counts.etl_done,
            g.counts.qa_done,
            g.counts.acc_done,
            g.counts.prod_done,
        ));
        lines.push("  Percent complete (QA Done / Total)".to_string());
        lines.push(format!("  {} {}%", progress_bar(pct, 20), pct));
    }
    lines.join("\n")
}

// ---------------------------------------------------------------------------
// Cross-project dev group rollup
// ---------------------------------------------------------------------------

/// Render the per-dev-group rollup (QA done against total).
pub fn render_dev_group_rollup(rollup: &[DevGroupRollup]) -> String {
    if rollup.is_empty() {
        return NO_DATA_MESSAGE.to_string();
    }

    let group_w = column_width(
        "DEV GROUP",
        rollup.iter().map(|r| key_display(&r.dev_grp_name)),
    );
    let mut lines = vec![
        "QA Done vs Total by Dev Group".to_string(),
        format!(
            "{:<group_w$}  {:>7}  {:>6}  {:>4}",
            "DEV GROUP", "QA DONE", "TOTAL", "PCT",
        ),
    ];
    for r in rollup {
        lines.push(format!(
            "{:<group_w$}  {:>7}  {:>6}  {:>3}%",
            key_display(&r.dev_grp_name),
            r.qa_done,
            r.total,
            r.percent_complete(),
        ));
    }
    lines.join("\n")
}

// ---------------------------------------------------------------------------
// Enriched rows
// ---------------------------------------------------------------------------

/// Render the filtered row set, one line per job.
///
/// A row carries at most one done flag, so flags render as a single
/// column naming the completed stage.
pub fn render_rows(rows: &[EnrichedRow]) -> String {
    if rows.is_empty() {
        return NO_DATA_MESSAGE.to_string();
    }

    let project_w = column_width("PROJECT", rows.iter().map(|r| key_display(&r.project)));
    let group_w = column_width(
        "DEV GROUP",
        rows.iter().map(|r| key_display(&r.dev_grp_name)),
    );
    let status_w = column_width("STATUS", rows.iter().map(|r| r.status.as_str()));

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(format!(
        "{:<project_w$}  {:<group_w$}  {:<status_w$}  {}",
        "PROJECT", "DEV GROUP", "STATUS", "DONE",
    ));
    for r in rows {
        let done = StageFlag::DONE
            .into_iter()
            .find(|f| r.flags.get(*f))
            .map(StageFlag::as_str)
            .unwrap_or("-");
        lines.push(format!(
            "{:<project_w$}  {:<group_w$}  {:<status_w$}  {}",
            key_display(&r.project),
            key_display(&r.dev_grp_name),
            r.status,
            done,
        ));
    }
    lines.join("\n")
}

// ---------------------------------------------------------------------------
// Filter options
// ---------------------------------------------------------------------------

/// Render the available filter options.
pub fn render_options(options: &FilterOptions) -> String {
    let mut lines = vec!["Projects:".to_string()];
    if options.projects.is_empty() {
        lines.push("  (none)".to_string());
    }
    for p in &options.projects {
        lines.push(format!("  {p}"));
    }
    lines.push("Dev Groups:".to_string());
    if options.dev_groups.is_empty() {
        lines.push("  (none)".to_string());
    }
    for g in &options.dev_groups {
        lines.push(format!("  {g}"));
    }
    lines.join("\n")
}

// ---------------------------------------------------------------------------
// Upload receipt
// ---------------------------------------------------------------------------

/// Render a dataset save receipt.
pub fn render_receipt(receipt: &UploadReceipt) -> String {
    let mut lines = vec![format!(
        "saved {} ({} bytes)",
        receipt.source_name,
        thousands(receipt.byte_len),
    )];
    lines.push(format!("  receipt   {}", receipt.receipt_id));
    lines.push(format!("  dataset   {}", receipt.dataset_id.short()));
    lines.push(format!(
        "  saved_at  {}",
        receipt.saved_at.format("%Y-%m-%dT%H:%M:%SZ"),
    ));
    lines.join("\n")
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn key_display(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("-")
}

fn column_width<'a>(header: &str, values: impl Iterator<Item = &'a str>) -> usize {
    values
        .map(str::len)
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(header.len())
}

fn progress_bar(pct: u32, width: usize) -> String {
    let filled = (pct.min(100) as usize * width) / 100;
    let mut bar = String::with_capacity(width + 2);
    bar.push('[');
    for i in 0..width {
        bar.push(if i < filled { '#' } else { '.' });
    }
    bar.push(']');
    bar
}

/// Format with thousands separators, the way the headline tiles show counts.
fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
