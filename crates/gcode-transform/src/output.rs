use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use atomicwrites::{AtomicFile, OverwriteBehavior};
use similar::TextDiff;

/// Where the program is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Stdin,
    File(PathBuf),
}

impl Input {
    /// `None` and `-` both mean stdin.
    pub fn from_arg(path: Option<&Path>) -> Self {
        match path {
            Some(p) if p != Path::new("-") => Input::File(p.to_path_buf()),
            _ => Input::Stdin,
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            Input::Stdin => "<stdin>".to_string(),
            Input::File(path) => path.display().to_string(),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Input::Stdin => None,
            Input::File(path) => Some(path),
        }
    }

    pub fn open(&self) -> Result<Box<dyn BufRead>> {
        let reader: Box<dyn BufRead> = match self {
            Input::Stdin => Box::new(io::stdin().lock()),
            Input::File(path) => {
                let file = File::open(path)
                    .with_context(|| format!("Failed to open input file '{}'", path.display()))?;
                Box::new(BufReader::new(file))
            }
        };
        Ok(reader)
    }

    /// Read the whole program as bytes; G-code comments are not always UTF-8.
    pub fn read_bytes(&self) -> Result<Vec<u8>> {
        let mut source = Vec::new();
        self.open()?
            .read_to_end(&mut source)
            .with_context(|| format!("Failed to read {}", self.display_name()))?;
        Ok(source)
    }
}

/// Where the program is written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Stdout,
    File(PathBuf),
}

impl Output {
    pub fn from_arg(path: Option<&Path>) -> Self {
        match path {
            Some(p) if p != Path::new("-") => Output::File(p.to_path_buf()),
            _ => Output::Stdout,
        }
    }

    pub fn open(&self) -> Result<Box<dyn Write>> {
        let writer: Box<dyn Write> = match self {
            Output::Stdout => Box::new(BufWriter::new(io::stdout().lock())),
            Output::File(path) => {
                let file = File::create(path)
                    .with_context(|| format!("Failed to create output file '{}'", path.display()))?;
                Box::new(BufWriter::new(file))
            }
        };
        Ok(writer)
    }
}

/// True when both paths name the same existing file.
pub fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Replace `path` with `contents` without ever leaving a half-written file.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    AtomicFile::new(path, OverwriteBehavior::AllowOverwrite)
        .write(|f| {
            f.write_all(contents)?;
            f.flush()
        })
        .map_err(|err| anyhow::anyhow!("Failed to write '{}': {err}", path.display()))
}

pub fn unified_diff(source: &str, transformed: &str, name: &str) -> String {
    let diff = TextDiff::from_lines(source, transformed);
    format!(
        "{}",
        diff.unified_diff()
            .context_radius(3)
            .header(&format!("old/{name}"), &format!("new/{name}"))
    )
}
