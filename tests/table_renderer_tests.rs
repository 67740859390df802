use expense_tracker::cli::output::{set_preferences, OutputPreferences};
use expense_tracker::cli::table::{horizontal_rule, render_cell, Alignment, Table, TableColumn};

fn plain() {
    set_preferences(OutputPreferences {
        plain_mode: true,
        quiet_mode: false,
    });
}

#[test]
fn widths_follow_the_widest_cell() {
    let mut table = Table::new(vec![TableColumn::left("Date"), TableColumn::right("Amount")]);
    table.push_row(vec!["2024/01/05".into(), "-42.00".into()]);
    table.push_row(vec!["2024/01/06".into(), "1200.00".into()]);
    assert_eq!(table.compute_widths(), vec![10, 7]);
}

#[test]
fn render_cell_respects_alignment() {
    assert_eq!(render_cell("AB", 4, Alignment::Left, 1), " AB   ");
    assert_eq!(render_cell("AB", 4, Alignment::Right, 1), "   AB ");
}

#[test]
fn rendered_table_has_header_rule_and_rows() {
    plain();
    let mut table = Table::new(vec![TableColumn::right("Day"), TableColumn::right("Total")]);
    table.push_row(vec!["01".into(), "15.00".into()]);
    table.push_row(vec!["09".into(), "-4.00".into()]);

    let rendered = table.render();
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], " Day   Total");
    assert_eq!(lines[1], "-".repeat(13));
    assert_eq!(lines[2], "  01   15.00");
    assert_eq!(lines[3], "  09   -4.00");
}

#[test]
fn empty_widths_give_empty_rule() {
    plain();
    assert_eq!(horizontal_rule(&[], 1), "");
    assert_eq!(horizontal_rule(&[2, 3], 0), "------");
}
