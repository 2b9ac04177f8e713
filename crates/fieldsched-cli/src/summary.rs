use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{
    Attribute, Cell, CellAlignment, Color, ColumnConstraint, ContentArrangement, Table, Width,
};

use fieldsched_cli::detect::FileDetection;
use fieldsched_ingest::HeaderRow;
use fieldsched_match::{MappingPreview, ProfileScore};
use fieldsched_model::{CompanyProfile, Subscription, WorkflowResponse};

pub fn print_detections(detections: &[FileDetection], failures: &[(String, String)]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("File"),
        header_cell("Headers"),
        header_cell("Company"),
        header_cell("Name"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for detection in detections {
        let file = detection.path.display().to_string();
        let (code, name) = match &detection.matched {
            Some(profile) => (
                Cell::new(profile.code.as_str())
                    .fg(Color::Green)
                    .add_attribute(Attribute::Bold),
                Cell::new(&profile.name),
            ),
            None => (Cell::new("no match").fg(Color::Yellow), dim_cell("-")),
        };
        table.add_row(vec![
            Cell::new(file),
            Cell::new(detection.header_row.len()),
            code,
            name,
        ]);
    }
    for (file, _) in failures {
        table.add_row(vec![
            Cell::new(file),
            dim_cell("-"),
            Cell::new("error").fg(Color::Red).add_attribute(Attribute::Bold),
            dim_cell("-"),
        ]);
    }
    println!("{table}");
    if !failures.is_empty() {
        eprintln!("Errors:");
        for (file, error) in failures {
            eprintln!("- {file}: {error}");
        }
    }
}

/// Per-profile scores and the mapping preview for one detection.
pub fn print_explanation(detection: &FileDetection) {
    println!();
    println!("{}", detection.path.display());
    if detection.scores.is_empty() {
        println!("  no profiles with a fingerprint");
    } else {
        print_scores(&detection.scores);
    }
    if let Some(preview) = &detection.preview {
        print_mapping_preview(preview);
    }
}

fn print_scores(scores: &[ProfileScore]) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Company"),
        header_cell("Name"),
        header_cell("Matched"),
        header_cell("Ratio"),
        header_cell("Missing"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for score in scores {
        let ratio = Cell::new(format!("{:.0}%", score.ratio * 100.0));
        let ratio = if score.confident {
            ratio.fg(Color::Green).add_attribute(Attribute::Bold)
        } else {
            ratio
        };
        let missing = if score.missing.is_empty() {
            dim_cell("-")
        } else {
            Cell::new(score.missing.join(", "))
        };
        table.add_row(vec![
            Cell::new(&score.code),
            Cell::new(&score.name),
            Cell::new(format!("{}/{}", score.matched, score.expected)),
            ratio,
            missing,
        ]);
    }
    println!("{table}");
}

fn print_mapping_preview(preview: &MappingPreview) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Header"), header_cell("Field")]);
    apply_table_style(&mut table);
    for column in &preview.mapped {
        table.add_row(vec![Cell::new(&column.source), Cell::new(&column.field)]);
    }
    for header in &preview.unmapped {
        table.add_row(vec![Cell::new(header), dim_cell("unmapped")]);
    }
    for source in &preview.missing {
        table.add_row(vec![
            dim_cell(source),
            Cell::new("not in file").fg(Color::Yellow),
        ]);
    }
    println!("{table}");
}

pub fn print_headers(row: &HeaderRow) {
    match &row.sheet {
        Some(sheet) => println!("Sheet: {sheet}, row {}", row.row_index + 1),
        None => println!("Row {}", row.row_index + 1),
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("#"), header_cell("Header")]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for (index, header) in row.headers.iter().enumerate() {
        let cell = if header.is_empty() {
            dim_cell("(blank)")
        } else {
            Cell::new(header)
        };
        table.add_row(vec![Cell::new(index + 1), cell]);
    }
    println!("{table}");
}

pub fn print_profiles(profiles: &[CompanyProfile]) {
    if profiles.is_empty() {
        println!("No active profiles.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Code"),
        header_cell("Name"),
        header_cell("Fingerprint"),
        header_cell("Mappings"),
        header_cell("Std min"),
        header_cell("High-value min"),
        header_cell("Appointment"),
        header_cell("Updated"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 2..6 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for profile in profiles {
        let fingerprint = if profile.has_fingerprint() {
            Cell::new(profile.column_fingerprint.len())
        } else {
            Cell::new("none").fg(Color::Yellow)
        };
        let updated = match profile.updated_at.or(profile.created_at) {
            Some(at) => Cell::new(at.format("%Y-%m-%d %H:%M")),
            None => dim_cell("-"),
        };
        table.add_row(vec![
            Cell::new(profile.code.as_str()).add_attribute(Attribute::Bold),
            Cell::new(&profile.name),
            fingerprint,
            count_cell(profile.column_mappings.len()),
            Cell::new(profile.durations.standard_minutes),
            Cell::new(profile.durations.high_value_minutes),
            Cell::new(profile.appointment_type.label()),
            updated,
        ]);
    }
    println!("{table}");
}

pub fn print_profile(profile: &CompanyProfile) {
    println!("Saved {} ({})", profile.code, profile.name);
    let mut table = Table::new();
    table.set_header(vec![header_cell("Fingerprint header"), header_cell("Maps to")]);
    apply_table_style(&mut table);
    for header in &profile.column_fingerprint {
        let field = profile
            .column_mappings
            .get(header)
            .map_or_else(|| dim_cell("-"), Cell::new);
        table.add_row(vec![Cell::new(header), field]);
    }
    if table.row_count() > 0 {
        println!("{table}");
    }
}

pub fn print_workflow_response(response: &WorkflowResponse) {
    if let Some(message) = &response.message {
        println!("{message}");
    }
    if !response.data.is_null() {
        match serde_json::to_string_pretty(&response.data) {
            Ok(json) => println!("{json}"),
            Err(_) => println!("{}", response.data),
        }
    }
}

pub fn print_subscription(subscription: &Subscription) {
    let mut table = Table::new();
    apply_table_style(&mut table);
    let status = if subscription.active {
        Cell::new("active").fg(Color::Green).add_attribute(Attribute::Bold)
    } else {
        Cell::new("inactive").fg(Color::Yellow)
    };
    table.add_row(vec![header_cell("Plan"), Cell::new(subscription.tier_label())]);
    table.add_row(vec![header_cell("Status"), status]);
    let renews = match subscription.renews_at {
        Some(at) => Cell::new(at.format("%Y-%m-%d")),
        None => dim_cell("-"),
    };
    table.add_row(vec![header_cell("Renews"), renews]);
    println!("{table}");
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(140);
    if table.column_count() >= 8 {
        table.set_constraints(vec![
            ColumnConstraint::UpperBoundary(Width::Fixed(10)),
            ColumnConstraint::UpperBoundary(Width::Percentage(35)),
            ColumnConstraint::LowerBoundary(Width::Fixed(6)),
            ColumnConstraint::LowerBoundary(Width::Fixed(6)),
            ColumnConstraint::LowerBoundary(Width::Fixed(7)),
            ColumnConstraint::LowerBoundary(Width::Fixed(7)),
            ColumnConstraint::LowerBoundary(Width::Fixed(11)),
            ColumnConstraint::LowerBoundary(Width::Fixed(16)),
        ]);
    }
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize) -> Cell {
    if count > 0 {
        Cell::new(count)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
