// Logic that needs no OpenCL device: selection, rendering, job shape, errors.

use cl_pipeline::{
    Access, ArgSpec, BuildOptions, DeviceEntry, Inventory, Job, KernelSource, PipelineError,
    PlatformEntry, Stage, tasks,
};
use std::ptr;

fn device(name: &str) -> DeviceEntry {
    DeviceEntry { id: ptr::null_mut(), name: name.to_string() }
}

fn platform(name: &str, devices: &[&str]) -> PlatformEntry {
    PlatformEntry { name: name.to_string(), devices: devices.iter().map(|d| device(d)).collect() }
}

#[test]
fn selects_first_device_of_first_non_empty_platform() {
    let inv = Inventory {
        platforms: vec![
            platform("Empty Runtime", &[]),
            platform("GPU Runtime", &["gpu0", "gpu1"]),
            platform("CPU Runtime", &["cpu0"]),
        ],
    };
    assert_eq!(inv.select_first().unwrap().name, "gpu0");
    assert_eq!(inv.device_count(), 3);
}

#[test]
fn no_devices_anywhere_is_an_error() {
    let inv = Inventory { platforms: vec![platform("A", &[]), platform("B", &[])] };
    let err = inv.select_first().unwrap_err();
    assert!(matches!(err, PipelineError::NoDevices));
    assert_eq!(err.report(), "ERROR: No OpenCL devices found");
}

#[test]
fn inventory_lists_every_platform_and_device() {
    let inv = Inventory {
        platforms: vec![platform("Empty", &[]), platform("Portable", &["cpu-a", "cpu-b"])],
    };
    assert_eq!(
        inv.render(),
        "Found 2 platform(s)\n\
         Platform: Empty\nDevices found: 0\n\
         Platform: Portable\nDevices found: 2\n\tdevice: cpu-a\n\tdevice: cpu-b\n"
    );
}

#[test]
fn hello_rendering_replaces_nul_bytes() {
    let mut raw = *b"Hello, World!";
    raw[5] = 0;
    raw[12] = 0;
    let line = tasks::render_hello(&raw);
    assert_eq!(line, b"Output: Hello  World \n");

    let shown = line.strip_prefix(b"Output: ").unwrap().strip_suffix(b"\n").unwrap();
    assert_eq!(shown.len(), tasks::HELLO_LEN);
    assert!(!shown.contains(&0));
}

#[test]
fn hello_rendering_keeps_non_ascii_bytes_raw() {
    let mut raw = *b"Hello, World!";
    raw[0] = 0xC8;
    let line = tasks::render_hello(&raw);

    let shown = line.strip_prefix(b"Output: ").unwrap().strip_suffix(b"\n").unwrap();
    assert_eq!(shown.len(), tasks::HELLO_LEN);
    assert_eq!(shown, &raw[..]);
}

#[test]
fn vector_rendering_prints_one_value_per_line() {
    let sums: Vec<f32> = tasks::vec_add_operand().iter().map(|x| x * 2.0).collect();
    let text = String::from_utf8(tasks::render_vec(&sums)).unwrap();

    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("Output: "));
    for i in 0..tasks::VEC_LEN {
        assert_eq!(lines.next().unwrap(), format!("{}, ", 2 * (i + 1)));
    }
    assert_eq!(lines.next(), Some(""));
    assert_eq!(lines.next(), None);
    assert!(text.ends_with(", \n\n"));
}

#[test]
fn hello_job_shape() {
    let job = tasks::hello(KernelSource::Embedded(tasks::HELLO_CL));
    assert_eq!(job.entry_point, "Hello");
    assert_eq!(job.work_items, 1);
    assert_eq!(job.args, vec![ArgSpec::Output { count: 13 }]);
    assert_eq!(job.args[0].byte_len(), 13);
    assert_eq!(job.args[0].access(), Access::KernelWrite);
    assert_eq!(job.validate().unwrap(), 0);
    assert_eq!(job.options.as_str(), "-cl-std=CL1.2");
}

#[test]
fn vec_add_job_shape() {
    let job = tasks::vec_add(KernelSource::Embedded(tasks::VEC_ADD_CL));
    assert_eq!(job.entry_point, "vector_add");
    assert_eq!(job.work_items, 13);
    assert_eq!(job.args.len(), 3);
    assert_eq!(job.output_index().unwrap(), 2);

    let expected: Vec<f32> = (1..=13).map(|i| i as f32).collect();
    assert_eq!(job.args[0], ArgSpec::Input(expected.clone()));
    assert_eq!(job.args[1], ArgSpec::Input(expected));
    for arg in &job.args {
        assert_eq!(arg.byte_len(), 52);
    }
    assert_eq!(job.args[0].access(), Access::KernelRead);
    assert_eq!(job.args[2].access(), Access::KernelWrite);
}

fn job_with(args: Vec<ArgSpec<f32>>, work_items: usize) -> Job<f32> {
    Job {
        source: KernelSource::inline(""),
        entry_point: "k".into(),
        args,
        work_items,
        options: BuildOptions::default(),
        render: tasks::render_vec,
    }
}

#[test]
fn job_requires_exactly_one_output() {
    let none = job_with(vec![ArgSpec::Input(vec![1.0])], 1);
    assert!(matches!(none.validate(), Err(PipelineError::OutputCount(0))));

    let two = job_with(vec![ArgSpec::Output { count: 1 }, ArgSpec::Output { count: 1 }], 1);
    assert!(matches!(two.validate(), Err(PipelineError::OutputCount(2))));
}

#[test]
fn job_rejects_empty_buffers_and_empty_range() {
    let empty_input = job_with(vec![ArgSpec::Input(vec![]), ArgSpec::Output { count: 1 }], 1);
    assert!(matches!(empty_input.validate(), Err(PipelineError::InvalidSize(0))));

    let no_items = job_with(vec![ArgSpec::Output { count: 4 }], 0);
    assert!(matches!(no_items.validate(), Err(PipelineError::InvalidSize(0))));
}

#[test]
fn missing_source_reports_failed_to_open() {
    let err = KernelSource::file("does/not/exist/hello.cl").load().unwrap_err();
    assert!(matches!(err, PipelineError::SourceOpen { .. }));
    let report = err.report();
    assert!(report.starts_with("ERROR: Failed to open"));
    assert!(report.contains("hello.cl"));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn embedded_sources_define_their_entry_points() {
    let hello = KernelSource::Embedded(tasks::HELLO_CL).load().unwrap();
    assert!(hello.contains("__kernel void Hello"));
    let vec_add = KernelSource::Embedded(tasks::VEC_ADD_CL).load().unwrap();
    assert!(vec_add.contains("__kernel void vector_add"));
}

#[test]
fn custom_build_options_pass_through() {
    let mut job = tasks::hello(KernelSource::Embedded(tasks::HELLO_CL));
    job.options = BuildOptions::new("-cl-std=CL2.0 -Werror");
    assert_eq!(job.options.as_str(), "-cl-std=CL2.0 -Werror");
    assert_eq!(BuildOptions::default(), BuildOptions::new("-cl-std=CL1.2"));
}

#[test]
fn inline_source_loads_verbatim() {
    let src = "__kernel void k() {}";
    assert_eq!(KernelSource::inline(src).load().unwrap(), src);
}

#[test]
fn error_reports_match_console_format() {
    let build = PipelineError::Build { log: "<kernel>:1:1: error: expected".into() };
    assert_eq!(build.report(), "Build error:\n<kernel>:1:1: error: expected");
    assert_eq!(build.status(), None);

    let bind = PipelineError::SetArg { index: 2, code: -48 };
    assert_eq!(bind.report(), "Argument setting error: -48");
    assert_eq!(bind.status(), Some(-48));

    assert_eq!(PipelineError::KernelCreate(-46).report(), "Kernel creation error: -46");
    assert_eq!(PipelineError::Write(-5).report(), "WriteBuffer error: -5");
    assert_eq!(PipelineError::Enqueue(-54).report(), "Kernel execution error: -54");
    assert_eq!(PipelineError::Read(-5).report(), "Buffer read error: -5");
    assert_eq!(PipelineError::NoPlatforms.report(), "ERROR: No OpenCL platforms found");
    assert_eq!(PipelineError::from(-30).report(), "ERROR: OpenCL API error: -30");

    for e in [PipelineError::NoPlatforms, PipelineError::Read(-5), PipelineError::OutputCount(0)] {
        assert_eq!(e.exit_code(), 1);
    }
}

#[test]
fn stages_advance_in_fixed_order() {
    let mut stage = Stage::Start;
    let mut seen = vec![stage];
    while let Some(next) = stage.next() {
        assert!(next > stage);
        stage = next;
        seen.push(stage);
    }
    assert_eq!(seen, Stage::ORDER);
    assert!(stage.is_terminal());
    assert_eq!(Stage::ProgramBuilt.to_string(), "ProgramBuilt");
}

#[test]
fn access_flags_split_kernel_and_host_direction() {
    use opencl3::memory::{
        CL_MEM_HOST_READ_ONLY, CL_MEM_HOST_WRITE_ONLY, CL_MEM_READ_ONLY, CL_MEM_WRITE_ONLY,
    };
    assert_eq!(Access::KernelRead.flags(), CL_MEM_READ_ONLY | CL_MEM_HOST_WRITE_ONLY);
    assert_eq!(Access::KernelWrite.flags(), CL_MEM_WRITE_ONLY | CL_MEM_HOST_READ_ONLY);
}
