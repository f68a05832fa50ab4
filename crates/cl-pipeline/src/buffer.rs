//! Typ‑State GPU‑Buffer: `Queued → InFlight → Ready`, Eingaben direkt
//! `Queued → Ready` über einen blockierenden Write.

use opencl3::{
    command_queue::CommandQueue,
    context::Context,
    event::Event,
    memory::{
        Buffer, CL_MEM_HOST_READ_ONLY, CL_MEM_HOST_WRITE_ONLY, CL_MEM_READ_ONLY,
        CL_MEM_WRITE_ONLY,
    },
    types::{CL_BLOCKING, cl_mem_flags},
};
use std::{marker::PhantomData, ptr};

use crate::error::{PipelineError, Result};

#[cfg(feature = "metrics")]
use crate::metrics::{ALLOC_BYTES, ALLOCS, record};
#[cfg(feature = "metrics")]
use std::{sync::atomic::Ordering, time::Instant};

#[cfg(feature = "memtrace")]
use crate::memtracer::{Dir, start as trace_start};

// ─── Zugriffsrichtung ────────────────────────────────────────────────

/// Richtung aus Sicht des Kernels; der Host bekommt jeweils die Gegenrichtung
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    /// Kernel liest, Host schreibt (Operanden)
    KernelRead,
    /// Kernel schreibt, Host liest (Ergebnis)
    KernelWrite,
}

impl Access {
    pub fn flags(self) -> cl_mem_flags {
        match self {
            Access::KernelRead  => CL_MEM_READ_ONLY | CL_MEM_HOST_WRITE_ONLY,
            Access::KernelWrite => CL_MEM_WRITE_ONLY | CL_MEM_HOST_READ_ONLY,
        }
    }
}

// ─── Typ‑State‑Marker ────────────────────────────────────────────────
mod sealed {
    pub trait Sealed {}
}

pub trait State: sealed::Sealed {}

/// angelegt, Inhalt undefiniert
pub struct Queued;
impl sealed::Sealed for Queued {}
impl State for Queued {}

/// an einen gestarteten Kernel gebunden
pub struct InFlight;
impl sealed::Sealed for InFlight {}
impl State for InFlight {}

/// Inhalt gültig, Host darf lesen
pub struct Ready;
impl sealed::Sealed for Ready {}
impl State for Ready {}

// ─── GPU‑Buffer Wrapper ──────────────────────────────────────────────

pub struct GpuBuffer<S: State> {
    inner: GpuBufferInner,
    _state: PhantomData<S>,
}

struct GpuBufferInner {
    buf: Buffer<u8>,
    len: usize,
    access: Access,
}

#[cfg(feature = "metrics")]
impl Drop for GpuBufferInner {
    fn drop(&mut self) {
        ALLOCS.fetch_sub(1, Ordering::Relaxed);
        ALLOC_BYTES.fetch_sub(self.len, Ordering::Relaxed);
    }
}

impl<S: State> std::fmt::Debug for GpuBuffer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuBuffer")
            .field("len", &self.inner.len)
            .field("access", &self.inner.access)
            .field("state", &std::any::type_name::<S>())
            .finish()
    }
}

impl<S: State> GpuBuffer<S> {
    fn into_state<T: State>(self) -> GpuBuffer<T> {
        GpuBuffer { inner: self.inner, _state: PhantomData }
    }

    /// Zugriff auf die interne OpenCL Buffer-Referenz (Kernel‑Argument)
    pub fn raw(&self) -> &Buffer<u8> {
        &self.inner.buf
    }

    /// Länge des Buffers in Bytes
    pub fn len(&self) -> usize {
        self.inner.len
    }

    pub fn is_empty(&self) -> bool {
        self.inner.len == 0
    }

    pub fn access(&self) -> Access {
        self.inner.access
    }
}

// ── Queued ───────────────────────────────────────────────────────────
impl GpuBuffer<Queued> {
    /// legt ein neues GPU‑Buffer im Kontext `ctx` an
    pub fn new(ctx: &Context, len: usize, access: Access) -> Result<Self> {
        if len == 0 {
            return Err(PipelineError::InvalidSize(len));
        }

        #[cfg(feature = "metrics")]
        let t = Instant::now();

        let buf = Buffer::<u8>::create(ctx, access.flags(), len, ptr::null_mut())?;

        #[cfg(feature = "metrics")]
        {
            record("GpuBuffer::new", t);
            ALLOCS.fetch_add(1, Ordering::Relaxed);
            ALLOC_BYTES.fetch_add(len, Ordering::Relaxed);
        }

        Ok(Self { inner: GpuBufferInner { buf, len, access }, _state: PhantomData })
    }

    /// blockierender Host→Device‑Write; kehrt erst nach Abschluss zurück
    pub fn enqueue_write(mut self, queue: &CommandQueue, host: &[u8]) -> Result<GpuBuffer<Ready>> {
        if host.len() != self.inner.len {
            return Err(PipelineError::InvalidSize(host.len()));
        }

        #[cfg(feature = "metrics")]
        let t = Instant::now();
        #[cfg(feature = "memtrace")]
        let tok = trace_start(Dir::H2D, host.len());

        queue
            .enqueue_write_buffer(&mut self.inner.buf, CL_BLOCKING, 0, host, &[])
            .map_err(|e| PipelineError::Write(e.0))?;

        #[cfg(feature = "memtrace")]
        tok.finish();
        #[cfg(feature = "metrics")]
        record("enqueue_write", t);

        Ok(self.into_state())
    }

    /// Ausgabe‑Buffer geht mit dem Kernel‑Launch in den InFlight‑State
    pub fn launch(self) -> GpuBuffer<InFlight> {
        self.into_state()
    }
}

// ── InFlight ─────────────────────────────────────────────────────────
impl GpuBuffer<InFlight> {
    /// nur mit Nachweis der Kernel‑Fertigstellung erreichbar
    pub fn into_ready(self, _done: &Completion) -> GpuBuffer<Ready> {
        self.into_state()
    }
}

// ── Ready → Host (D2H) ───────────────────────────────────────────────
impl GpuBuffer<Ready> {
    /// blockierender Device→Host‑Read, `host_out` muss exakt passen
    pub fn enqueue_read(&self, queue: &CommandQueue, host_out: &mut [u8]) -> Result<()> {
        if host_out.len() != self.inner.len {
            return Err(PipelineError::InvalidSize(host_out.len()));
        }

        #[cfg(feature = "metrics")]
        let t = Instant::now();
        #[cfg(feature = "memtrace")]
        let tok = trace_start(Dir::D2H, host_out.len());

        queue
            .enqueue_read_buffer(&self.inner.buf, CL_BLOCKING, 0, host_out, &[])
            .map_err(|e| PipelineError::Read(e.0))?;

        #[cfg(feature = "memtrace")]
        tok.finish();
        #[cfg(feature = "metrics")]
        record("enqueue_read", t);

        Ok(())
    }
}

// ── Guard (wartet bei Drop auf Event) ────────────────────────────────

/// Nachweis, dass ein gestarteter Kernel fertig ist
#[derive(Debug)]
pub struct Completion {
    _priv: (),
}

pub struct GpuEventGuard {
    evt: Option<Event>,
}

impl GpuEventGuard {
    pub(crate) fn new(evt: Event) -> Self {
        Self { evt: Some(evt) }
    }

    /// explizites Wait; liefert den Completion‑Nachweis
    pub fn wait(mut self) -> Result<Completion> {
        if let Some(evt) = self.evt.take() {
            evt.wait().map_err(|e| PipelineError::Enqueue(e.0))?;
        }
        Ok(Completion { _priv: () })
    }
}

impl Drop for GpuEventGuard {
    fn drop(&mut self) {
        if let Some(evt) = self.evt.take() {
            let _ = evt.wait();
        }
    }
}
