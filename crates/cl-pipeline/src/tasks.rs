//! Die beiden Demo‑Jobs: String‑Kernel und Vektoraddition.

use std::fmt::Write as _;

use crate::{
    config::{BuildOptions, KernelSource},
    pipeline::{ArgSpec, Job},
};

/// Länge des vom `Hello`‑Kernel geschriebenen Strings
pub const HELLO_LEN: usize = 13;
/// Elemente je Operand und Ergebnis
pub const VEC_LEN: usize = 13;

pub const HELLO_ENTRY: &str = "Hello";
pub const VEC_ADD_ENTRY: &str = "vector_add";

pub const HELLO_CL: &str = include_str!("hello.cl");
pub const VEC_ADD_CL: &str = include_str!("vecAdd.cl");

pub fn hello(source: KernelSource) -> Job<u8> {
    Job {
        source,
        entry_point: HELLO_ENTRY.to_string(),
        args: vec![ArgSpec::Output { count: HELLO_LEN }],
        work_items: 1,
        options: BuildOptions::default(),
        render: render_hello,
    }
}

/// `a[i] = b[i] = i + 1`
pub fn vec_add_operand() -> Vec<f32> {
    (0..VEC_LEN).map(|i| i as f32 + 1.0).collect()
}

pub fn vec_add(source: KernelSource) -> Job<f32> {
    Job {
        source,
        entry_point: VEC_ADD_ENTRY.to_string(),
        args: vec![
            ArgSpec::Input(vec_add_operand()),
            ArgSpec::Input(vec_add_operand()),
            ArgSpec::Output { count: VEC_LEN },
        ],
        work_items: VEC_LEN,
        options: BuildOptions::default(),
        render: render_vec,
    }
}

/// NUL → Leerzeichen, alle anderen Bytes unverändert
pub fn render_hello(bytes: &[u8]) -> Vec<u8> {
    let mut out = b"Output: ".to_vec();
    out.extend(bytes.iter().map(|&b| if b == 0 { b' ' } else { b }));
    out.push(b'\n');
    out
}

/// eine Zeile `<wert>, ` je Element, danach eine Leerzeile
pub fn render_vec(values: &[f32]) -> Vec<u8> {
    let mut out = String::from("Output: \n");
    for v in values {
        let _ = writeln!(out, "{v}, ");
    }
    out.push('\n');
    out.into_bytes()
}
