use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use tzfix_core::{Outcome, RunReport, Tally};

pub fn stats_table(tally: &Tally) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Status", "Count"]);

    let rows = [
        ("Updated (Fixed)", Outcome::Updated, Color::Green),
        ("Already correct", Outcome::AlreadyCorrect, Color::Blue),
        ("Skipped (No timestamp/GPS)", Outcome::Skipped, Color::Yellow),
        ("Errors", Outcome::Error, Color::Red),
    ];
    for (label, outcome, color) in rows {
        table.add_row(vec![
            Cell::new(label).fg(color),
            Cell::new(tally.count(outcome)).fg(color),
        ]);
    }
    table.add_row(vec![Cell::new("Total Processed"), Cell::new(tally.total())]);

    table
}

pub fn print(report: &RunReport) {
    let summary = &report.summary;

    if !summary.log.is_empty() {
        println!("Last {} entries:", summary.log.len());
        for entry in summary.log.iter() {
            println!("  {entry}");
        }
        println!();
    }

    if let Some(err) = &report.fetch_error {
        println!("Critical batch error: {err}");
    }
    if report.interpolated > 0 {
        println!(
            "Interpolated coordinates for {} assets from {} anchors.",
            report.interpolated, report.anchors
        );
    }

    println!("Final Statistics ({})", summary.mode);
    println!("{}", stats_table(&summary.tally));
    println!("Job complete! {} files processed.", summary.tally.total());
}
