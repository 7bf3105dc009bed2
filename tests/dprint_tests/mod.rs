use graph_dprint::{GraphObject, Printer, debug_print_to};

pub mod reuse;
pub mod symbolic;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Prints `root` with a fresh printer and returns what was written.
pub fn trace<'a>(root: impl Into<GraphObject<'a>>) -> String {
    init_logging();
    let mut printer = Printer::new(Vec::new());
    debug_print_to(root, &mut printer).unwrap();
    output(printer)
}

pub fn output(printer: Printer<Vec<u8>>) -> String {
    String::from_utf8(printer.into_inner()).unwrap()
}

/// Joins trace lines, terminating each with a newline.
pub fn lines(lines: &[&str]) -> String {
    lines.iter().map(|x| format!("{x}\n")).collect()
}
