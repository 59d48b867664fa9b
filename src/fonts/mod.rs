//! Font discovery for the report renderer and the chart rasterizer.
//!
//! The PDF needs a complete regular/bold/italic/bold-italic family. The bundled Roboto files are
//! preferred; when they are missing a system family (Arial on Windows, DejaVu Sans on Linux) is used.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use genpdf::error::{Error, ErrorKind};
use genpdf::fonts::{self, FontData, FontFamily};
use log::{debug, warn};

/// Name of the bundled font family.
pub const DEFAULT_FONT_FAMILY_NAME: &str = "Roboto";

/// Overrides the directory holding the bundled font files.
pub const FONTS_DIR_ENV: &str = "PRODUCT_REPORT_FONTS_DIR";

const FONT_FILES: &[&str] = &[
    "Roboto-Regular.ttf",
    "Roboto-Bold.ttf",
    "Roboto-Italic.ttf",
    "Roboto-BoldItalic.ttf",
];

/// A system font family used when the bundled fonts are unavailable.
struct SystemFamily {
    name: &'static str,
    /// Environment variable overriding the lookup directory.
    env_var: &'static str,
    default_dirs: &'static [&'static str],
    regular: &'static str,
    bold: &'static str,
    italic: &'static str,
    bold_italic: &'static str,
}

const SYSTEM_FAMILIES: &[SystemFamily] = &[
    SystemFamily {
        name: "Arial",
        env_var: "PRODUCT_REPORT_WINDOWS_FONTS_DIR",
        default_dirs: &[],
        regular: "arial.ttf",
        bold: "arialbd.ttf",
        italic: "ariali.ttf",
        bold_italic: "arialbi.ttf",
    },
    SystemFamily {
        name: "DejaVu Sans",
        env_var: "PRODUCT_REPORT_SYSTEM_FONTS_DIR",
        default_dirs: &[
            "/usr/share/fonts/truetype/dejavu",
            "/usr/share/fonts/dejavu",
            "/usr/share/fonts/TTF",
        ],
        regular: "DejaVuSans.ttf",
        bold: "DejaVuSans-Bold.ttf",
        italic: "DejaVuSans-Oblique.ttf",
        bold_italic: "DejaVuSans-BoldOblique.ttf",
    },
];

impl SystemFamily {
    fn files(&self) -> [(&'static str, &'static str); 4] {
        [
            (self.regular, "regular"),
            (self.bold, "bold"),
            (self.italic, "italic"),
            (self.bold_italic, "bold italic"),
        ]
    }

    fn candidate_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = Vec::new();
        if let Some(path) = env_path(self.env_var) {
            dirs.push(path);
        }

        #[cfg(windows)]
        {
            if self.default_dirs.is_empty() {
                for var in ["WINDIR", "SystemRoot"] {
                    if let Some(root) = env_path(var) {
                        dirs.push(root.join("Fonts"));
                    }
                }
            }
        }

        dirs.extend(self.default_dirs.iter().map(PathBuf::from));
        dirs
    }

    fn directory(&self) -> Option<PathBuf> {
        self.first_complete(self.candidate_dirs())
    }

    /// First directory of `dirs` holding all four files.
    fn first_complete(&self, dirs: Vec<PathBuf>) -> Option<PathBuf> {
        dirs.into_iter().find(|dir| {
            self.files()
                .iter()
                .all(|(file, _)| dir.join(file).is_file())
        })
    }

    fn load(&self) -> Result<FontFamily<FontData>, Error> {
        let directory = self.directory().ok_or_else(|| {
            Error::new(
                format!("No font directory with the '{}' family found", self.name),
                io::Error::new(io::ErrorKind::NotFound, "system fonts directory not found"),
            )
        })?;

        let [regular, bold, italic, bold_italic] = self.files();
        Ok(FontFamily {
            regular: load_font(&directory, regular)?,
            bold: load_font(&directory, bold)?,
            italic: load_font(&directory, italic)?,
            bold_italic: load_font(&directory, bold_italic)?,
        })
    }
}

fn env_path(var: &str) -> Option<PathBuf> {
    env::var_os(var).and_then(|value| {
        let path = PathBuf::from(value);
        if path.as_os_str().is_empty() {
            None
        } else {
            Some(path)
        }
    })
}

fn font_directory_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(path) = env_path(FONTS_DIR_ENV) {
        candidates.push(path);
    }

    if let Ok(current_exe) = env::current_exe() {
        if let Some(bin_dir) = current_exe.parent() {
            let candidate = bin_dir.join("assets/fonts");
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
    }

    let manifest_candidate = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts");
    if !candidates.contains(&manifest_candidate) {
        candidates.push(manifest_candidate);
    }

    candidates
}

fn missing_font_files(path: &Path) -> Vec<&'static str> {
    FONT_FILES
        .iter()
        .copied()
        .filter(|name| !path.join(name).is_file())
        .collect()
}

fn resolve_font_directory() -> Result<PathBuf, Error> {
    let mut attempts = Vec::new();

    for candidate in font_directory_candidates() {
        if !candidate.is_dir() {
            attempts.push(format!("{} (directory missing)", candidate.display()));
            continue;
        }
        let missing = missing_font_files(&candidate);
        if missing.is_empty() {
            return Ok(candidate);
        }
        attempts.push(format!(
            "{} (missing files [{}])",
            candidate.display(),
            missing.join(", ")
        ));
    }

    Err(Error::new(
        format!(
            "Unable to locate bundled font directory. Checked: {}. See assets/fonts/README.md or set {}.",
            attempts.join(", "),
            FONTS_DIR_ENV
        ),
        io::Error::new(io::ErrorKind::NotFound, "bundled fonts directory not found"),
    ))
}

fn load_bundled_font_family() -> Result<FontFamily<FontData>, Error> {
    let directory = resolve_font_directory()?;
    debug!("loading bundled fonts from {}", directory.display());

    fonts::from_files(&directory, DEFAULT_FONT_FAMILY_NAME, None).map_err(|err| {
        Error::new(
            format!(
                "Failed to load default font family '{}' from {}: {}",
                DEFAULT_FONT_FAMILY_NAME,
                directory.display(),
                err
            ),
            io::Error::new(io::ErrorKind::Other, err.to_string()),
        )
    })
}

fn load_font(directory: &Path, (file, style): (&str, &str)) -> Result<FontData, Error> {
    let path = directory.join(file);
    FontData::load(&path, None).map_err(|err| {
        Error::new(
            format!(
                "Failed to load fallback {} font at {}: {}",
                style,
                path.display(),
                err
            ),
            io::Error::new(io::ErrorKind::Other, err.to_string()),
        )
    })
}

fn fonts_missing(err: &Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::IoError(io_err)
            if io_err.kind() == io::ErrorKind::NotFound
                || io_err.kind() == io::ErrorKind::PermissionDenied
    )
}

fn system_font_family() -> Result<FontFamily<FontData>, Error> {
    let mut failures = Vec::new();
    for family in SYSTEM_FAMILIES {
        match family.load() {
            Ok(loaded) => {
                warn!(
                    "Bundled fonts unavailable; falling back to the system '{}' family.",
                    family.name
                );
                return Ok(loaded);
            }
            Err(err) => failures.push(err.to_string()),
        }
    }
    Err(Error::new(
        format!(
            "Bundled fonts unavailable and no system fallback could be loaded: {}",
            failures.join("; ")
        ),
        io::Error::new(io::ErrorKind::NotFound, "default fonts are not available"),
    ))
}

/// Returns the bundled Roboto family, or a system family when the bundled files are missing.
pub fn default_font_family() -> Result<FontFamily<FontData>, Error> {
    match load_bundled_font_family() {
        Ok(family) => Ok(family),
        Err(err) if fonts_missing(&err) => {
            debug!("{}", err);
            system_font_family()
        }
        Err(err) => Err(err),
    }
}

/// Indicates whether a complete font family can be found, bundled or from the system.
pub fn default_fonts_available() -> bool {
    resolve_font_directory().is_ok()
        || SYSTEM_FAMILIES
            .iter()
            .any(|family| family.directory().is_some())
}

/// Directories the chart rasterizer should load fonts from in addition to the system fonts.
pub fn font_search_directories() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = resolve_font_directory().into_iter().collect();
    dirs.extend(SYSTEM_FAMILIES.iter().filter_map(SystemFamily::directory));
    dirs
}
