use std::error::Error;
use std::path::PathBuf;

use rml_report::{context, ReportRenderer, ReportTemplate};

/// Renders `demos/templates/quarterly.rml` to `quarterly.pdf` in the working directory.
///
/// Fonts must be present under `assets/fonts` or in the directory named by
/// `RML_REPORT_FONTS_DIR` (family from `RML_REPORT_FONT_FAMILY`).  `RML_REPORT_SETTLE_MS`
/// and `RML_REPORT_TMPDIR` tune the intermediate file handling.
fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {}", err);
        print_error_sources(err.as_ref());
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("demos/templates/quarterly.rml");
    let template = ReportTemplate::from_path(&path)?;
    let renderer = ReportRenderer::new(template);

    let ctx = context! {
        company => "Harbour & Finch",
        quarter => "Q3 2026",
        recipient => "the board",
        currency => "EUR",
        regions => vec![
            context! { name => "North", revenue => "1,204,000", change => 4.2 },
            context! { name => "South", revenue => "980,500", change => -1.7 },
            context! { name => "East", revenue => "1,530,250", change => 9.0 },
        ],
        highlights => vec![
            "Two new distribution centres opened",
            "Customer churn down to 3%",
        ],
        appendix => vec!["Revenue excludes VAT.", "Change is quarter on quarter."],
    };

    let total = rml_report::RenderStep::expected_count(renderer.fragment_count(&ctx)?);
    let mut done = 0;
    let conversion = renderer.render_to_pdf_with_progress("quarterly.pdf", &ctx, |step| {
        done += 1;
        if !matches!(step, rml_report::RenderStep::FragmentWritten { .. }) {
            println!("[{done}/{total}] {step}");
        }
    })?;

    println!(
        "Generated {} ({} pages, {} bytes)",
        conversion.output.display(),
        conversion.pages,
        conversion.bytes
    );
    Ok(())
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
