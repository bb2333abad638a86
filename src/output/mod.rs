mod progress;
mod styling;
mod tables;

use std::fmt::Write;

use comfy_table::Cell;

use crate::jobs::JobCatalog;
use crate::reproduce::ReproductionPlan;

pub use progress::RequestSpinner;
pub use styling::{bright_yellow, cyan};
use styling::{bright, bright_green, dim, magenta_bold};
use tables::{category_cell, create_table, cyan_header, reproducible_cell};

/// Prints the clusterfuzz banner to stderr.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        magenta_bold("🐛 clusterfuzz"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("Crash test case reproduction tool")
    );
}

/// Prints a human-readable summary of a reproduction plan to stderr.
pub fn print_plan_summary(plan: &ReproductionPlan) {
    eprintln!("{}", render_plan_summary(plan));
}

pub fn print_job_types(catalog: &JobCatalog) {
    println!("{}", render_job_types(catalog));
}

fn render_plan_summary(plan: &ReproductionPlan) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "{} {}", bright("🔎"), bright("Testcase").underlined());

    let mut table = create_table();
    table.set_header(cyan_header(&["Field", "Value"]));
    table.add_row(vec![Cell::new("ID"), Cell::new(&plan.testcase.id)]);
    table.add_row(vec![Cell::new("Crash type"), Cell::new(&plan.testcase.crash_type)]);
    table.add_row(vec![
        Cell::new("Crash state"),
        Cell::new(plan.testcase.crash_state.join("\n")),
    ]);
    table.add_row(vec![Cell::new("Job type"), Cell::new(&plan.testcase.job_type)]);
    table.add_row(vec![
        Cell::new("Platform"),
        Cell::new(plan.testcase.platform.as_deref().unwrap_or("-")),
    ]);
    table.add_row(vec![
        Cell::new("Reproducible"),
        reproducible_cell(plan.testcase.reproducible),
    ]);
    table.add_row(vec![Cell::new("Identity"), Cell::new(&plan.identity)]);
    let _ = writeln!(output, "{table}\n");

    let _ = writeln!(output, "{} {}", bright("🛠️"), bright("Build").underlined());
    let mut table = create_table();
    table.set_header(cyan_header(&["Field", "Value"]));
    table.add_row(vec![Cell::new("Category"), category_cell(plan.definition.category)]);
    table.add_row(vec![Cell::new("Binary source"), Cell::new(plan.binary_source)]);
    table.add_row(vec![Cell::new("Binary"), Cell::new(&plan.definition.binary)]);
    table.add_row(vec![Cell::new("Sanitizer"), Cell::new(plan.definition.sanitizer)]);
    table.add_row(vec![Cell::new("Reproducer"), Cell::new(plan.definition.reproducer)]);
    table.add_row(vec![
        Cell::new("Source"),
        Cell::new(match &plan.source_dir {
            Some(dir) => dir.display().to_string(),
            None => format!("${}", plan.definition.source_var),
        }),
    ]);
    let _ = writeln!(output, "{table}");

    if plan.warnings.is_empty() {
        let _ = writeln!(output, "\n{}", bright_green("Ready to reproduce ✓"));
    } else {
        for warning in &plan.warnings {
            let _ = writeln!(output, "\n{} {}", bright_yellow("⚠"), warning);
        }
    }

    output
}

fn render_job_types(catalog: &JobCatalog) -> String {
    let mut table = create_table();
    table.set_header(cyan_header(&[
        "Job type",
        "Category",
        "Builder",
        "Binary",
        "Sanitizer",
        "Source",
    ]));

    for definition in catalog.iter() {
        table.add_row(vec![
            Cell::new(&definition.job_type),
            category_cell(definition.category),
            Cell::new(definition.builder),
            Cell::new(&definition.binary),
            Cell::new(definition.sanitizer),
            Cell::new(&definition.source_var),
        ]);
    }

    format!(
        "{table}\n{}",
        dim(format!("{} supported job types", catalog.len()))
    )
}
