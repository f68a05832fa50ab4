//! Context + CommandQueue eines Geräts; Freigabe erfolgt über Drop der
//! `opencl3`‑Typen auf jedem Ausgangspfad.

use opencl3::{
    command_queue::CommandQueue,
    context::Context,
    device::Device,
    kernel::Kernel,
    program::Program,
};
use std::ptr;
use tracing::debug;

use crate::{
    buffer::{Access, GpuBuffer, GpuEventGuard, Queued},
    config::BuildOptions,
    discovery::DeviceEntry,
    error::{PipelineError, Result},
};

#[cfg(feature = "metrics")]
use crate::metrics::record;
#[cfg(feature = "metrics")]
use std::time::Instant;

pub struct ComputeSession {
    device: Device,
    context: Context,
    queue: CommandQueue,
}

impl ComputeSession {
    /// Kontext und eine In‑Order‑Queue für genau dieses Gerät
    pub fn open(entry: &DeviceEntry) -> Result<Self> {
        let device = Device::new(entry.id);
        let context = Context::from_device(&device)?;
        let queue = CommandQueue::create(&context, device.id(), 0)?;
        debug!(device = %entry.name, "session opened");
        Ok(Self { device, context, queue })
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn queue(&self) -> &CommandQueue {
        &self.queue
    }

    /// kompiliert `src`; bei Fehlschlag wird das Build‑Log des Geräts geholt
    pub fn build(&self, src: &str, options: &BuildOptions) -> Result<Program> {
        #[cfg(feature = "metrics")]
        let t = Instant::now();

        let mut program = Program::create_from_source(&self.context, src)?;
        if let Err(e) = program.build(&[self.device.id()], options.as_str()) {
            let log = program
                .get_build_log(self.device.id())
                .unwrap_or_else(|_| format!("build failed with status {}", e.0));
            return Err(PipelineError::Build { log });
        }

        #[cfg(feature = "metrics")]
        record("build", t);

        Ok(program)
    }

    /// Einstiegspunkt `name` aus einem gebauten Programm
    pub fn kernel(&self, program: &Program, name: &str) -> Result<Kernel> {
        Kernel::create(program, name).map_err(|e| PipelineError::KernelCreate(e.0))
    }

    pub fn alloc(&self, len: usize, access: Access) -> Result<GpuBuffer<Queued>> {
        GpuBuffer::new(self.context(), len, access)
    }

    /// bindet `buf` an Position `index`
    pub fn bind<S: crate::buffer::State>(
        &self,
        kernel: &Kernel,
        index: u32,
        buf: &GpuBuffer<S>,
    ) -> Result<()> {
        kernel
            .set_arg(index, buf.raw())
            .map_err(|e| PipelineError::SetArg { index, code: e.0 })
    }

    /// 1‑D NDRange ohne Offset und ohne lokale Größe
    pub fn launch(&self, kernel: &Kernel, work_items: usize) -> Result<GpuEventGuard> {
        if work_items == 0 {
            return Err(PipelineError::InvalidSize(work_items));
        }

        #[cfg(feature = "metrics")]
        let t = Instant::now();

        let global = [work_items];
        let evt = self
            .queue
            .enqueue_nd_range_kernel(kernel.get(), 1, ptr::null(), global.as_ptr(), ptr::null(), &[])
            .map_err(|e| PipelineError::Enqueue(e.0))?;

        #[cfg(feature = "metrics")]
        record("launch", t);

        Ok(GpuEventGuard::new(evt))
    }
}
