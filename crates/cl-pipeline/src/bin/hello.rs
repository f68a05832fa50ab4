// String‑Kernel: Inventar, Build, Launch, Ergebnis auf stdout; Exitcode 0 oder 1.

use cl_pipeline::{KernelSource, logging, run, tasks};
use std::{io, process::ExitCode};

fn main() -> ExitCode {
    logging::init();

    let job = tasks::hello(KernelSource::Embedded(tasks::HELLO_CL));
    let code = match run(&job, &mut io::stdout().lock()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.report());
            ExitCode::from(e.exit_code())
        }
    };

    #[cfg(feature = "metrics")]
    print!("{}", cl_pipeline::summary());
    #[cfg(feature = "memtrace")]
    if let Err(e) = cl_pipeline::flush_csv("memtrace.csv") {
        eprintln!("memtrace: {e}");
    }

    code
}
