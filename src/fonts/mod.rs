//! Font discovery for the RML converter.
//!
//! `genpdf` embeds TrueType fonts, so a family of four files (`<Name>-Regular.ttf`,
//! `<Name>-Bold.ttf`, `<Name>-Italic.ttf` and `<Name>-BoldItalic.ttf`) must be available.  The
//! directory is resolved in this order: an explicit directory, the `RML_REPORT_FONTS_DIR`
//! environment variable, then `assets/fonts` inside the crate.  The family name follows the
//! same pattern with `RML_REPORT_FONT_FAMILY` and falls back to `Roboto`.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use genpdf::error::Error;
use genpdf::fonts::{self, FontData, FontFamily};

/// Name of the default font family.
pub const DEFAULT_FONT_FAMILY_NAME: &str = "Roboto";

/// Environment variable pointing at a directory with the font family files.
pub const FONTS_DIR_ENV: &str = "RML_REPORT_FONTS_DIR";

/// Environment variable naming the font family to load from the font directory.
pub const FONT_FAMILY_ENV: &str = "RML_REPORT_FONT_FAMILY";

const FONT_STYLES: &[&str] = &["Regular", "Bold", "Italic", "BoldItalic"];

fn bundled_font_directory() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts")
}

/// Returns the directory fonts are loaded from.
pub fn resolve_font_directory(explicit: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir.to_path_buf();
    }
    match env::var_os(FONTS_DIR_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => bundled_font_directory(),
    }
}

/// Returns the font family name used when none is configured explicitly.
pub fn resolve_font_family(explicit: Option<&str>) -> String {
    if let Some(family) = explicit {
        return family.to_owned();
    }
    match env::var(FONT_FAMILY_ENV) {
        Ok(family) if !family.trim().is_empty() => family.trim().to_owned(),
        _ => DEFAULT_FONT_FAMILY_NAME.to_owned(),
    }
}

fn font_files<'a>(directory: &'a Path, family: &str) -> impl Iterator<Item = PathBuf> + 'a {
    let family = family.to_owned();
    FONT_STYLES
        .iter()
        .map(move |style| directory.join(format!("{family}-{style}.ttf")))
}

fn ensure_required_fonts_present(directory: &Path, family: &str) -> Result<(), Error> {
    if !directory.exists() {
        return Err(Error::new(
            format!(
                "Font directory missing at {}. Set {} or see assets/fonts/README.md.",
                directory.display(),
                FONTS_DIR_ENV
            ),
            io::Error::new(io::ErrorKind::NotFound, "font directory not found"),
        ));
    }

    let missing: Vec<_> = font_files(directory, family)
        .filter(|candidate| !candidate.is_file())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        let display_list = missing
            .iter()
            .map(|path| path.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");

        Err(Error::new(
            format!(
                "Missing font files: {}. See assets/fonts/README.md for instructions.",
                display_list
            ),
            io::Error::new(io::ErrorKind::NotFound, "font files missing"),
        ))
    }
}

/// Loads the font family `family` from `directory`.
pub fn load_font_family(directory: &Path, family: &str) -> Result<FontFamily<FontData>, Error> {
    ensure_required_fonts_present(directory, family)?;

    fonts::from_files(directory, family, None).map_err(|err| {
        Error::new(
            format!(
                "Failed to load font family '{}' from {}: {}",
                family,
                directory.display(),
                err
            ),
            io::Error::new(io::ErrorKind::Other, err.to_string()),
        )
    })
}

/// Indicates whether all files of `family` are present in `directory`.
pub fn fonts_available(directory: &Path, family: &str) -> bool {
    directory.is_dir() && font_files(directory, family).all(|path| path.is_file())
}

/// Indicates whether the resolved family is present in the resolved directory.
pub fn default_fonts_available() -> bool {
    fonts_available(&resolve_font_directory(None), &resolve_font_family(None))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_directory_wins() {
        let dir = Path::new("/opt/fonts");
        assert_eq!(resolve_font_directory(Some(dir)), dir);
    }

    #[test]
    fn explicit_family_wins() {
        assert_eq!(resolve_font_family(Some("Lato")), "Lato");
    }

    #[test]
    fn family_file_names_follow_genpdf_convention() {
        let files: Vec<_> = font_files(Path::new("/f"), "Lato").collect();
        assert_eq!(
            files,
            vec![
                PathBuf::from("/f/Lato-Regular.ttf"),
                PathBuf::from("/f/Lato-Bold.ttf"),
                PathBuf::from("/f/Lato-Italic.ttf"),
                PathBuf::from("/f/Lato-BoldItalic.ttf"),
            ]
        );
    }

    #[test]
    fn missing_fonts_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!fonts_available(dir.path(), "Roboto"));
        let err = match load_font_family(dir.path(), "Roboto") {
            Ok(_) => panic!("fonts should be missing"),
            Err(err) => err,
        };
        assert!(err.to_string().contains("Roboto-Regular.ttf"));
    }
}
