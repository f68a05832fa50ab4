use std::{io, path::PathBuf};

/// `CL_PLATFORM_NOT_FOUND_KHR` – ICD-Loader ohne installierte Plattform
pub const PLATFORM_NOT_FOUND_KHR: i32 = -1001;
/// `CL_DEVICE_NOT_FOUND` – Plattform ohne passendes Gerät
pub const DEVICE_NOT_FOUND: i32 = -1;

// ─── Fehler‑Typ ───────────────────────────────────────────────────────
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    #[error("No OpenCL platforms found")]
    NoPlatforms,
    #[error("No OpenCL devices found")]
    NoDevices,
    #[error("Failed to open {}", .path.display())]
    SourceOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Build error:\n{log}")]
    Build { log: String },
    #[error("Kernel creation error: {0}")]
    KernelCreate(i32),
    #[error("Argument setting error: {code}")]
    SetArg { index: u32, code: i32 },
    #[error("WriteBuffer error: {0}")]
    Write(i32),
    #[error("Kernel execution error: {0}")]
    Enqueue(i32),
    #[error("Buffer read error: {0}")]
    Read(i32),
    #[error("OpenCL API error: {0}")]
    Api(i32),
    #[error("Invalid buffer size: {0}")]
    InvalidSize(usize),
    #[error("Job must bind exactly one output buffer, found {0}")]
    OutputCount(usize),
    #[error("Console write failed: {0}")]
    Console(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;

impl From<opencl3::error_codes::ClError> for PipelineError {
    #[inline]
    fn from(err: opencl3::error_codes::ClError) -> Self {
        PipelineError::Api(err.0)
    }
}

impl From<i32> for PipelineError {
    #[inline]
    fn from(code: i32) -> Self {
        PipelineError::Api(code)
    }
}

impl PipelineError {
    /// Prozess‑Exitcode; jeder gemeldete Fehler beendet den Lauf mit 1
    pub fn exit_code(&self) -> u8 {
        1
    }

    /// Konsolenzeile: Discovery/Ressourcen mit `ERROR: `, Stufenfehler tragen
    /// bereits ihr `... error: <code>` im Text
    pub fn report(&self) -> String {
        match self {
            PipelineError::Build { .. }
            | PipelineError::KernelCreate(_)
            | PipelineError::SetArg { .. }
            | PipelineError::Write(_)
            | PipelineError::Enqueue(_)
            | PipelineError::Read(_) => self.to_string(),
            _ => format!("ERROR: {self}"),
        }
    }

    /// Roher OpenCL‑Statuscode, falls vorhanden
    pub fn status(&self) -> Option<i32> {
        match *self {
            PipelineError::KernelCreate(c)
            | PipelineError::Write(c)
            | PipelineError::Enqueue(c)
            | PipelineError::Read(c)
            | PipelineError::Api(c) => Some(c),
            PipelineError::SetArg { code, .. } => Some(code),
            _ => None,
        }
    }
}
