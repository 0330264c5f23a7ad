//! Terminal output formatting with colors.

use colored::{ColoredString, Colorize};

use crate::report::Report;

/// Format a Report for human-readable terminal output.
///
/// One summary line in the classic "Processed ... in ... secs" shape, plus
/// a note when the run was stopped before its deadline.
pub fn format_report(report: &Report) -> String {
    render(report, true)
}

/// Format a Report without ANSI styling.
pub fn format_report_plain(report: &Report) -> String {
    render(report, false)
}

fn render(report: &Report, color: bool) -> String {
    let style = |s: ColoredString| if color { s } else { s.clear() };
    let (amount, label) = report.scaled();

    let mut output = format!(
        "  Processed {} {} in {} secs: {} {}/sec\n",
        style(format!("{:.2}", amount).bold()),
        label,
        style(format!("{:.2}", report.elapsed_secs).bold()),
        style(format!("{:.2}", report.rate()).green().bold()),
        label,
    );

    if !report.timed_out {
        output.push_str(&format!(
            "  {}\n",
            style("\u{26A0} Stopped before the deadline".yellow())
        ));
    }

    output
}
