//! Plain-text renderings for the terminal, built with `comfy-table`.

use crate::{
    models::{
        AggregateFile,
        TrafficSnapshot,
    },
    report::{
        format_timestamp,
        sort_by_views_desc,
        summary_rows,
        Totals,
    },
};
use comfy_table::{
    presets,
    Attribute,
    Cell,
    CellAlignment,
    Color,
    ContentArrangement,
    Table,
};

/// How many referrers and paths the snapshot summary lists.
pub const TOP_ENTRIES: usize = 5;

fn table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn header(title: impl ToString) -> Vec<Cell> {
    vec![
        Cell::new(title).add_attribute(Attribute::Bold).fg(Color::Cyan),
        Cell::new(""),
    ]
}

fn number(value: u64) -> Cell {
    Cell::new(value).set_alignment(CellAlignment::Right)
}

/// Summary of one snapshot: views, clones, stars, top referrers and paths.
pub fn format_snapshot(snapshot: &TrafficSnapshot) -> String {
    let mut output = String::new();
    output.push_str(&format!("\n=== Traffic Summary for {} ===\n", snapshot.repository));
    output.push_str(&format!(
        "Data collected at: {}\n",
        format_timestamp(&snapshot.collected_at)
    ));

    let mut totals = table();
    totals.set_header(header("Last 14 days"));
    match &snapshot.views {
        Some(views) => {
            totals.add_row(vec![Cell::new("Total views"), number(views.count)]);
            totals.add_row(vec![Cell::new("Unique visitors"), number(views.uniques)]);
        }
        None => {
            totals.add_row(vec![Cell::new("Views"), Cell::new("unavailable").fg(Color::Red)]);
        }
    }
    match &snapshot.clones {
        Some(clones) => {
            totals.add_row(vec![Cell::new("Total clones"), number(clones.count)]);
            totals.add_row(vec![Cell::new("Unique cloners"), number(clones.uniques)]);
        }
        None => {
            totals.add_row(vec![Cell::new("Clones"), Cell::new("unavailable").fg(Color::Red)]);
        }
    }
    match snapshot.stars {
        Some(stars) => totals.add_row(vec![Cell::new("Stars"), number(stars)]),
        None => totals.add_row(vec![Cell::new("Stars"), Cell::new("unavailable").fg(Color::Red)]),
    };
    output.push_str(&format!("{totals}\n"));

    if let Some(referrers) = snapshot.referrers.as_ref().filter(|r| !r.is_empty()) {
        let mut table = table();
        table.set_header(header("Top Referrers"));
        for referrer in referrers.iter().take(TOP_ENTRIES) {
            table.add_row(vec![Cell::new(&referrer.referrer), number(referrer.count)]);
        }
        output.push_str(&format!("{table}\n"));
    }

    if let Some(paths) = snapshot.paths.as_ref().filter(|p| !p.is_empty()) {
        let mut table = table();
        table.set_header(header("Popular Paths"));
        for path in paths.iter().take(TOP_ENTRIES) {
            table.add_row(vec![Cell::new(&path.path), number(path.count)]);
        }
        output.push_str(&format!("{table}\n"));
    }

    output
}

/// Totals and per-repository table of an aggregate file, busiest first.
pub fn format_summary(file: &AggregateFile) -> String {
    let mut rows = summary_rows(&file.data);
    sort_by_views_desc(&mut rows);
    let totals = Totals::from_rows(&rows);

    let mut output = String::new();
    if let Some(last_updated) = &file.last_updated {
        output.push_str(&format!("Last updated: {}\n", format_timestamp(last_updated)));
    }

    let mut metrics = table();
    metrics.set_header(header("Summary"));
    metrics.add_row(vec![Cell::new("Repositories"), number(totals.repositories as u64)]);
    metrics.add_row(vec![Cell::new("Total views"), number(totals.views)]);
    metrics.add_row(vec![Cell::new("Unique visitors"), number(totals.unique_visitors)]);
    metrics.add_row(vec![Cell::new("Total stars"), number(totals.stars)]);
    output.push_str(&format!("{metrics}\n"));

    let mut table = table();
    table.set_header(
        ["Repository", "Views", "Unique visitors", "Clones", "Unique cloners", "Stars"]
            .into_iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
    );
    for row in &rows {
        table.add_row(vec![
            Cell::new(&row.repository),
            number(row.views),
            number(row.unique_visitors),
            number(row.clones),
            number(row.unique_cloners),
            number(row.stars),
        ]);
    }
    output.push_str(&format!("{table}\n"));

    output
}
