// Feature-gated instrumentation; run with `--features metrics,memtrace`.

#[cfg(feature = "memtrace")]
#[test]
fn memtrace_rows_land_in_csv() {
    use cl_pipeline::{Dir, flush_csv, start, trace_count};

    let before = trace_count(Dir::H2D);
    start(Dir::H2D, 52).finish();
    start(Dir::Kernel, 0).finish();
    assert_eq!(trace_count(Dir::H2D), before + 1);

    let path = std::env::temp_dir().join(format!("memtrace-{}.csv", std::process::id()));
    flush_csv(&path).unwrap();
    let csv = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).ok();

    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("t_start_us,t_end_us,bytes,dir,idle_us"));
    assert!(lines.any(|l| l.contains(",52,H2D,")));
}

#[cfg(feature = "metrics")]
#[test]
fn metrics_summary_groups_by_name() {
    use cl_pipeline::{record, summary};
    use std::time::Instant;

    record("build", Instant::now());
    record("build", Instant::now());
    let text = summary();
    assert!(text.starts_with("── metrics summary ──"));
    assert!(text.contains("build"));
    assert!(text.contains("live GPU allocations"));
}
