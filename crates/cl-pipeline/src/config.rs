use std::{fs, path::PathBuf};

use crate::error::{PipelineError, Result};

/// Fester Sprachstandard für den Programm‑Build
pub const DEFAULT_BUILD_OPTIONS: &str = "-cl-std=CL1.2";

/// Herkunft des Kernel‑Quelltexts
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KernelSource {
    File(PathBuf),
    Inline(String),
    /// per `include_str!` ins Binary eingebettet
    Embedded(&'static str),
}

impl KernelSource {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        KernelSource::File(path.into())
    }

    pub fn inline(src: impl Into<String>) -> Self {
        KernelSource::Inline(src.into())
    }

    /// liest den Quelltext; fehlende Datei → `SourceOpen`
    pub fn load(&self) -> Result<String> {
        match self {
            KernelSource::File(path) => fs::read_to_string(path).map_err(|source| {
                PipelineError::SourceOpen { path: path.clone(), source }
            }),
            KernelSource::Inline(src) => Ok(src.clone()),
            KernelSource::Embedded(src) => Ok((*src).to_string()),
        }
    }
}

/// Compiler‑Flags für `clBuildProgram`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildOptions(String);

impl BuildOptions {
    pub fn new(flags: impl Into<String>) -> Self {
        BuildOptions(flags.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions::new(DEFAULT_BUILD_OPTIONS)
    }
}
