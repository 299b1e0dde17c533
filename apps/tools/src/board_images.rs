//! Checks that every board member photo referenced by `about/board.html`
//! exists under the site root.

use std::{
    fmt::Write as _,
    fs, io,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use anyhow::Context;
use regex::Regex;
use tracing::{debug, warn};

static BOARD_IMG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<img\s+src="([^"]*board[^"]*)"\s+alt="([^"]*)""#)
        .expect("board image pattern is valid")
});

pub const BOARD_PAGE: &str = "about/board.html";
pub const BOARD_IMAGE_DIR: &str = "assets/images/board";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub src: String,
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCheck {
    pub image: ImageRef,
    pub path: PathBuf,
    /// `None` when the file does not exist.
    pub size_bytes: Option<u64>,
}

impl ImageCheck {
    pub fn exists(&self) -> bool {
        self.size_bytes.is_some()
    }

    pub fn size_kb(&self) -> Option<f64> {
        self.size_bytes.map(|bytes| bytes as f64 / 1024.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoardReport {
    pub checks: Vec<ImageCheck>,
    /// `.jpg` files in the board directory that the page never references.
    pub extra_files: Vec<String>,
}

impl BoardReport {
    pub fn found(&self) -> impl Iterator<Item = &ImageCheck> {
        self.checks.iter().filter(|check| check.exists())
    }

    pub fn missing(&self) -> impl Iterator<Item = &ImageCheck> {
        self.checks.iter().filter(|check| !check.exists())
    }

    pub fn has_missing(&self) -> bool {
        self.missing().next().is_some()
    }

    pub fn render(&self) -> String {
        let rule = "=".repeat(50);
        let mut out = String::new();
        let _ = writeln!(out, "Validating Board Member Images\n\n{rule}");
        let _ = writeln!(out, "\nFound {} board member images in HTML\n", self.checks.len());

        for (number, check) in self.checks.iter().enumerate() {
            let (mark, status) = if check.exists() {
                ("✓", "EXISTS")
            } else {
                ("✗", "MISSING")
            };
            let _ = writeln!(out, "{}. {mark} {}", number + 1, check.image.alt);
            let _ = writeln!(out, "   Path: {}", check.image.src);
            let _ = writeln!(out, "   Full path: {}", check.path.display());
            let _ = writeln!(out, "   Status: {status}");
            if let Some(kb) = check.size_kb() {
                let _ = writeln!(out, "   Size: {kb:.2} KB");
            }
            out.push('\n');
        }

        let _ = writeln!(out, "{rule}\n\nSUMMARY\n");
        let _ = writeln!(out, "✓ Found: {}", self.found().count());
        let _ = writeln!(out, "✗ Missing: {}", self.missing().count());

        if self.has_missing() {
            let _ = writeln!(out, "\nMissing images:");
            for check in self.missing() {
                let _ = writeln!(out, "   - {}: {}", check.image.alt, check.image.src);
            }
        } else {
            let _ = writeln!(out, "\nAll board member images are present!");
        }

        if !self.extra_files.is_empty() {
            let _ = writeln!(out, "\nExtra files in board directory (not referenced in HTML):");
            for file in &self.extra_files {
                let _ = writeln!(out, "   - {file}");
            }
        }

        let _ = write!(out, "\n{rule}");
        out
    }
}

pub fn extract_board_images(html: &str) -> Vec<ImageRef> {
    BOARD_IMG
        .captures_iter(html)
        .map(|caps| ImageRef {
            src: caps[1].to_string(),
            alt: caps[2].to_string(),
        })
        .collect()
}

/// Image sources resolve against the site root, with or without a leading `/`.
fn resolve(root: &Path, src: &str) -> PathBuf {
    root.join(src.trim_start_matches('/'))
}

fn file_name(src: &str) -> &str {
    src.rsplit('/').next().unwrap_or(src)
}

pub fn validate(root: &Path) -> anyhow::Result<BoardReport> {
    let page = root.join(BOARD_PAGE);
    let html = fs::read_to_string(&page)
        .with_context(|| format!("failed to read board page '{}'", page.display()))?;
    let images = extract_board_images(&html);
    debug!(count = images.len(), page = %page.display(), "board images referenced");

    let checks = images
        .into_iter()
        .map(|image| {
            let path = resolve(root, &image.src);
            let size_bytes = fs::metadata(&path)
                .ok()
                .filter(|meta| meta.is_file())
                .map(|meta| meta.len());
            ImageCheck {
                image,
                path,
                size_bytes,
            }
        })
        .collect::<Vec<_>>();

    let extra_files = unreferenced_jpgs(&root.join(BOARD_IMAGE_DIR), &checks)?;

    Ok(BoardReport {
        checks,
        extra_files,
    })
}

fn unreferenced_jpgs(dir: &Path, checks: &[ImageCheck]) -> anyhow::Result<Vec<String>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            warn!(dir = %dir.display(), "board image directory does not exist");
            return Ok(Vec::new());
        }
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to list board images in '{}'", dir.display()))
        }
    };

    let mut extra = Vec::new();
    for entry in entries {
        let name = entry
            .with_context(|| format!("failed to list board images in '{}'", dir.display()))?
            .file_name()
            .to_string_lossy()
            .into_owned();
        let referenced = checks
            .iter()
            .any(|check| file_name(&check.image.src) == name);
        if name.ends_with(".jpg") && !referenced {
            extra.push(name);
        }
    }
    extra.sort();
    Ok(extra)
}

#[cfg(test)]
#[path = "tests/board_images_tests.rs"]
mod tests;
