//! Generische Pipeline: Discovery → Build → Buffer/Argumente → Launch →
//! Readback → Ausgabe. Jeder Fehler beendet den Lauf sofort.

use bytemuck::{Pod, cast_slice, cast_slice_mut};
use std::{fmt, io::Write};
use tracing::{debug, info_span, warn};

use crate::{
    buffer::{Access, GpuBuffer, Queued, Ready},
    config::{BuildOptions, KernelSource},
    discovery,
    error::{PipelineError, Result},
    session::ComputeSession,
};

#[cfg(feature = "memtrace")]
use crate::memtracer::{Dir, start as trace_start};

// ─── Job‑Beschreibung ────────────────────────────────────────────────

/// Positionsargument des Kernels; Index = Position in `Job::args`
#[derive(Clone, Debug, PartialEq)]
pub enum ArgSpec<T> {
    /// Host‑Daten, vor dem Launch blockierend geschrieben
    Input(Vec<T>),
    /// Ergebnis‑Buffer mit `count` Elementen
    Output { count: usize },
}

impl<T> ArgSpec<T> {
    pub fn access(&self) -> Access {
        match self {
            ArgSpec::Input(_) => Access::KernelRead,
            ArgSpec::Output { .. } => Access::KernelWrite,
        }
    }

    pub fn count(&self) -> usize {
        match self {
            ArgSpec::Input(data) => data.len(),
            ArgSpec::Output { count } => *count,
        }
    }

    pub fn byte_len(&self) -> usize {
        self.count() * std::mem::size_of::<T>()
    }
}

pub struct Job<T: Pod> {
    pub source: KernelSource,
    pub entry_point: String,
    pub args: Vec<ArgSpec<T>>,
    pub work_items: usize,
    pub options: BuildOptions,
    pub render: fn(&[T]) -> Vec<u8>,
}

impl<T: Pod> Job<T> {
    /// Index des einzigen Output‑Arguments
    pub fn output_index(&self) -> Result<usize> {
        let outputs: Vec<usize> = self
            .args
            .iter()
            .enumerate()
            .filter(|(_, a)| matches!(a, ArgSpec::Output { .. }))
            .map(|(i, _)| i)
            .collect();
        match outputs.as_slice() {
            [i] => Ok(*i),
            _ => Err(PipelineError::OutputCount(outputs.len())),
        }
    }

    /// Größen vorab prüfen, bevor irgendeine OpenCL‑Ressource angefasst wird
    pub fn validate(&self) -> Result<usize> {
        let output = self.output_index()?;
        if let Some(empty) = self.args.iter().find(|a| a.byte_len() == 0) {
            return Err(PipelineError::InvalidSize(empty.byte_len()));
        }
        if self.work_items == 0 {
            return Err(PipelineError::InvalidSize(0));
        }
        Ok(output)
    }
}

// ─── Zustandsautomat ─────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Start,
    PlatformsEnumerated,
    DeviceSelected,
    SourceLoaded,
    ProgramBuilt,
    BuffersAllocated,
    KernelBound,
    Enqueued,
    ResultsRead,
    Printed,
}

impl Stage {
    pub const ORDER: [Stage; 10] = [
        Stage::Start,
        Stage::PlatformsEnumerated,
        Stage::DeviceSelected,
        Stage::SourceLoaded,
        Stage::ProgramBuilt,
        Stage::BuffersAllocated,
        Stage::KernelBound,
        Stage::Enqueued,
        Stage::ResultsRead,
        Stage::Printed,
    ];

    pub fn next(self) -> Option<Stage> {
        let i = Self::ORDER.iter().position(|s| *s == self)?;
        Self::ORDER.get(i + 1).copied()
    }

    pub fn is_terminal(self) -> bool {
        self == Stage::Printed
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

fn advance(stage: &mut Stage, to: Stage) {
    debug_assert_eq!(stage.next(), Some(to), "stage skipped");
    debug!(from = %stage, to = %to, "stage");
    *stage = to;
}

// ─── Ausführung ──────────────────────────────────────────────────────

enum Slot<'a, T> {
    Input(GpuBuffer<Queued>, &'a [T]),
    Output(GpuBuffer<Queued>, usize),
}

/// führt `job` einmal aus und schreibt Inventar und Ergebnis nach `out`;
/// liefert die gelesenen Ergebniswerte zurück
pub fn run<T: Pod, W: Write>(job: &Job<T>, out: &mut W) -> Result<Vec<T>> {
    let span = info_span!("job", entry = %job.entry_point);
    let _enter = span.enter();

    let mut stage = Stage::Start;
    let res = execute(job, out, &mut stage);
    if let Err(e) = &res {
        warn!(stage = %stage, error = %e, "job failed");
    }
    res
}

fn execute<T: Pod, W: Write>(job: &Job<T>, out: &mut W, stage: &mut Stage) -> Result<Vec<T>> {
    job.validate()?;

    /* ---------- 1. Plattformen & Gerät ---------------------------- */
    let inventory = discovery::enumerate()?;
    advance(stage, Stage::PlatformsEnumerated);
    out.write_all(inventory.render().as_bytes())?;

    let device = inventory.select_first()?;
    writeln!(out, "Using device: {}", device.name)?;
    advance(stage, Stage::DeviceSelected);

    /* ---------- 2. Quelltext & Build ------------------------------ */
    let src = job.source.load()?;
    advance(stage, Stage::SourceLoaded);

    let session = ComputeSession::open(device)?;
    let program = session.build(&src, &job.options)?;
    let kernel = session.kernel(&program, &job.entry_point)?;
    advance(stage, Stage::ProgramBuilt);

    /* ---------- 3. Buffer anlegen & binden ------------------------ */
    let mut slots = Vec::with_capacity(job.args.len());
    for arg in &job.args {
        let buf = session.alloc(arg.byte_len(), arg.access())?;
        slots.push(match arg {
            ArgSpec::Input(data) => Slot::Input(buf, data.as_slice()),
            ArgSpec::Output { count } => Slot::Output(buf, *count),
        });
    }
    advance(stage, Stage::BuffersAllocated);

    for (index, slot) in slots.iter().enumerate() {
        let buf = match slot {
            Slot::Input(buf, _) | Slot::Output(buf, _) => buf,
        };
        session.bind(&kernel, index as u32, buf)?;
    }
    advance(stage, Stage::KernelBound);

    /* ---------- 4. Host → Device, dann Launch --------------------- */
    // Eingaben müssen bis nach dem Kernel leben
    let mut inputs: Vec<GpuBuffer<Ready>> = Vec::new();
    let mut output = None;
    for slot in slots {
        match slot {
            Slot::Input(buf, data) => inputs.push(buf.enqueue_write(session.queue(), cast_slice(data))?),
            Slot::Output(buf, count) => output = Some((buf.launch(), count)),
        }
    }
    let (in_flight, count) = output.ok_or(PipelineError::OutputCount(0))?;

    #[cfg(feature = "memtrace")]
    let tok = trace_start(Dir::Kernel, 0);

    let done = session.launch(&kernel, job.work_items)?.wait()?;

    #[cfg(feature = "memtrace")]
    tok.finish();

    let result = in_flight.into_ready(&done);
    advance(stage, Stage::Enqueued);
    debug!(inputs = inputs.len(), work_items = job.work_items, "kernel finished");

    /* ---------- 5. Device → Host & Ausgabe ------------------------ */
    let mut host = vec![T::zeroed(); count];
    result.enqueue_read(session.queue(), cast_slice_mut(&mut host))?;
    advance(stage, Stage::ResultsRead);

    out.write_all(&(job.render)(&host))?;
    out.flush()?;
    advance(stage, Stage::Printed);

    Ok(host)
}
