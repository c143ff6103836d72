use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use rml_report::{
    context, Conversion, ConvertError, DocumentConverter, RenderOptions, RenderStep, ReportError,
    ReportRenderer, ReportTemplate,
};

/// Copies the intermediate markup to the output and remembers what it saw.
#[derive(Default)]
struct CopyConverter {
    seen: Mutex<Vec<(PathBuf, String)>>,
}

impl CopyConverter {
    fn seen(&self) -> Vec<(PathBuf, String)> {
        self.seen.lock().unwrap().clone()
    }
}

impl DocumentConverter for CopyConverter {
    fn convert(&self, source: &Path, output: &Path) -> Result<Conversion, ConvertError> {
        let markup = fs::read_to_string(source).map_err(|err| ConvertError::Read {
            path: source.to_path_buf(),
            source: err,
        })?;
        fs::write(output, &markup).map_err(|err| ConvertError::Write {
            path: output.to_path_buf(),
            source: err,
        })?;
        self.seen
            .lock()
            .unwrap()
            .push((source.to_path_buf(), markup.clone()));
        Ok(Conversion {
            output: output.to_path_buf(),
            pages: 1,
            bytes: markup.len() as u64,
        })
    }
}

/// Always fails, after recording the intermediate path it was given.
#[derive(Default)]
struct FailingConverter {
    source: Mutex<Option<PathBuf>>,
}

impl DocumentConverter for FailingConverter {
    fn convert(&self, source: &Path, _output: &Path) -> Result<Conversion, ConvertError> {
        *self.source.lock().unwrap() = Some(source.to_path_buf());
        Err(ConvertError::Other("converter crashed".into()))
    }
}

const INVOICE: &str = "<document>\n<story>\n<para>Customer: {{ customer }}</para>\n</story>\n</document>";

fn fast_options(temp_dir: &Path) -> RenderOptions {
    RenderOptions::new()
        .with_settle_delay(Duration::ZERO)
        .with_temp_dir(Some(temp_dir.to_path_buf()))
}

fn renderer<C: DocumentConverter>(converter: C, temp_dir: &Path) -> ReportRenderer<C> {
    let template = ReportTemplate::from_source("invoice.rml", INVOICE).unwrap();
    ReportRenderer::with_converter(template, converter).with_options(fast_options(temp_dir))
}

fn dir_is_empty(dir: &Path) -> bool {
    fs::read_dir(dir).unwrap().next().is_none()
}

#[test]
fn intermediate_markup_contains_substitution_once() {
    let scratch = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let renderer = renderer(CopyConverter::default(), scratch.path());

    renderer
        .render_to_pdf(out.path().join("a.pdf"), context! { customer => "Zanzibar Ltd" })
        .unwrap();

    let seen = renderer.converter().seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].1.matches("Zanzibar Ltd").count(), 1);
}

#[test]
fn dates_and_apostrophes_reach_the_markup_verbatim() {
    let scratch = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let renderer = renderer(CopyConverter::default(), scratch.path());

    for value in ["2026/10/19", "O'Brien", "https://example.com/q?a=1"] {
        renderer
            .render_to_pdf(out.path().join("v.pdf"), context! { customer => value })
            .unwrap();
    }

    let seen = renderer.converter().seen();
    assert_eq!(seen[0].1.matches("2026/10/19").count(), 1);
    assert_eq!(seen[1].1.matches("O'Brien").count(), 1);
    assert_eq!(seen[2].1.matches("https://example.com/q?a=1").count(), 1);
}

#[test]
fn xml_metacharacters_are_escaped_once() {
    let scratch = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let renderer = renderer(CopyConverter::default(), scratch.path());

    renderer
        .render_to_pdf(out.path().join("e.pdf"), context! { customer => "Smith & <Sons>" })
        .unwrap();

    let seen = renderer.converter().seen();
    assert_eq!(seen[0].1.matches("Smith &amp; &lt;Sons&gt;").count(), 1);
}

#[test]
fn returns_the_converter_result() {
    let scratch = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let output = out.path().join("result.pdf");
    let renderer = renderer(CopyConverter::default(), scratch.path());

    let conversion = renderer
        .render_to_pdf(&output, context! { customer => "Ada" })
        .unwrap();

    assert_eq!(conversion.output, output);
    assert_eq!(conversion.pages, 1);
    assert_eq!(conversion.bytes, fs::metadata(&output).unwrap().len());
}

#[test]
fn temporary_file_is_removed_after_success() {
    let scratch = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let renderer = renderer(CopyConverter::default(), scratch.path());

    renderer
        .render_to_pdf(out.path().join("a.pdf"), context! { customer => "Ada" })
        .unwrap();

    let seen = renderer.converter().seen();
    assert!(!seen[0].0.exists());
    assert!(seen[0].0.starts_with(scratch.path()));
    assert!(dir_is_empty(scratch.path()));
}

#[test]
fn converter_failure_propagates_and_cleans_up() {
    let scratch = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let output = out.path().join("never.pdf");
    let renderer = renderer(FailingConverter::default(), scratch.path());

    let err = renderer
        .render_to_pdf(&output, context! { customer => "Ada" })
        .unwrap_err();

    match err {
        ReportError::Conversion(ConvertError::Other(inner)) => {
            assert_eq!(inner.to_string(), "converter crashed")
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!output.exists());

    let source = renderer.converter().source.lock().unwrap().clone().unwrap();
    assert!(!source.exists());
    assert!(dir_is_empty(scratch.path()));
}

#[test]
fn template_failure_leaves_no_intermediate_file() {
    let scratch = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let renderer = renderer(CopyConverter::default(), scratch.path());

    let err = renderer
        .render_to_pdf(out.path().join("a.pdf"), context! {})
        .unwrap_err();

    assert!(matches!(err, ReportError::Template(_)));
    assert!(renderer.converter().seen().is_empty());
    assert!(dir_is_empty(scratch.path()));
}

#[test]
fn concurrent_renders_do_not_interfere() {
    let scratch = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let renderer = renderer(CopyConverter::default(), scratch.path()).with_options(
        RenderOptions::new()
            .with_settle_delay(Duration::from_millis(20))
            .with_temp_dir(Some(scratch.path().to_path_buf())),
    );
    let first = out.path().join("first.pdf");
    let second = out.path().join("second.pdf");

    std::thread::scope(|scope| {
        let a = scope.spawn(|| {
            renderer
                .render_to_pdf(&first, context! { customer => "Alpha Co" })
                .is_ok()
        });
        let b = scope.spawn(|| {
            renderer
                .render_to_pdf(&second, context! { customer => "Beta Co" })
                .is_ok()
        });
        assert!(a.join().unwrap());
        assert!(b.join().unwrap());
    });

    let first_text = fs::read_to_string(&first).unwrap();
    let second_text = fs::read_to_string(&second).unwrap();
    assert!(first_text.contains("Alpha Co") && !first_text.contains("Beta Co"));
    assert!(second_text.contains("Beta Co") && !second_text.contains("Alpha Co"));

    let seen = renderer.converter().seen();
    assert_eq!(seen.len(), 2);
    assert_ne!(seen[0].0, seen[1].0);
    assert!(dir_is_empty(scratch.path()));
}

#[test]
fn progress_steps_follow_fixed_order() {
    let scratch = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let renderer = renderer(CopyConverter::default(), scratch.path());
    let ctx = context! { customer => "Ada" };
    let fragments = renderer.fragment_count(&ctx).unwrap();
    assert_eq!(fragments, 5);

    let mut steps = Vec::new();
    renderer
        .render_to_pdf_with_progress(out.path().join("p.pdf"), &ctx, |step| steps.push(step))
        .unwrap();

    assert_eq!(steps.len(), RenderStep::expected_count(fragments));
    assert!(matches!(steps[0], RenderStep::TempFileReady { .. }));
    for (index, step) in steps[1..=fragments].iter().enumerate() {
        match step {
            RenderStep::FragmentWritten { index: i, bytes } => {
                assert_eq!(*i, index);
                assert!(*bytes > 0);
            }
            other => panic!("expected fragment step, got {other:?}"),
        }
    }
    assert_eq!(steps[fragments + 1], RenderStep::WriteComplete { fragments });
    assert_eq!(
        steps[fragments + 2],
        RenderStep::PreConversionPause {
            delay: Duration::ZERO
        }
    );
    assert!(matches!(
        steps[fragments + 3],
        RenderStep::ConversionComplete { pages: 1, .. }
    ));
    assert_eq!(steps[fragments + 4], RenderStep::CleanupComplete);
}

#[test]
fn intermediate_file_is_complete_when_conversion_starts() {
    let scratch = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let renderer = renderer(CopyConverter::default(), scratch.path());
    let ctx = context! { customer => "Ada" };

    let mut announced = None;
    renderer
        .render_to_pdf_with_progress(out.path().join("p.pdf"), &ctx, |step| {
            if let RenderStep::TempFileReady { path } = step {
                announced = Some(path);
            }
        })
        .unwrap();

    let expected = renderer.template().generate(&ctx).unwrap();
    let seen = renderer.converter().seen();
    assert_eq!(seen[0].1, expected.as_str());
    assert_eq!(announced.as_deref(), Some(seen[0].0.as_path()));
}

#[test]
fn settle_delay_is_observed() {
    let scratch = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let renderer = renderer(CopyConverter::default(), scratch.path()).with_options(
        RenderOptions::new()
            .with_settle_delay(Duration::from_millis(100))
            .with_temp_dir(Some(scratch.path().to_path_buf())),
    );

    let started = std::time::Instant::now();
    renderer
        .render_to_pdf(out.path().join("slow.pdf"), context! { customer => "Ada" })
        .unwrap();
    assert!(started.elapsed() >= Duration::from_millis(100));
}

#[test]
fn unwritable_temp_dir_is_a_temp_file_error() {
    let scratch = tempfile::tempdir().unwrap();
    let missing = scratch.path().join("does-not-exist");
    let renderer = renderer(CopyConverter::default(), &missing);

    let err = renderer
        .render_to_pdf(scratch.path().join("a.pdf"), context! { customer => "Ada" })
        .unwrap_err();

    match err {
        ReportError::TempFile(inner) => assert_eq!(inner.kind(), io::ErrorKind::NotFound),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn write_markup_to_file_with_close_flag() {
    let scratch = tempfile::tempdir().unwrap();
    let path = scratch.path().join("markup.rml");
    let renderer = renderer(CopyConverter::default(), scratch.path()).with_options(
        RenderOptions::new()
            .with_settle_delay(Duration::ZERO)
            .with_close_destination(true),
    );

    let file = fs::File::create(&path).unwrap();
    let fragments = renderer
        .write_markup(file, context! { customer => "Ada" })
        .unwrap();

    assert_eq!(fragments, 5);
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "<document>\n<story>\n<para>Customer: Ada</para>\n</story>\n</document>"
    );
}
