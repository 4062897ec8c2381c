//! Host functions handed to `main`.

use std::rc::Rc;

use crate::value::{NativeFunction, Value};

/// Receives each line written by `log`.
pub type OutputSink = Rc<dyn Fn(&str)>;

pub fn stdout_sink() -> OutputSink {
    Rc::new(|line: &str| {
        use std::io::Write;
        println!("{}", line);
        std::io::stdout().flush().ok();
    })
}

/// `log(value)` writes the display form of its argument.
pub fn log(sink: OutputSink) -> NativeFunction {
    NativeFunction::new("log", "value", move |value| {
        sink(&value.to_string());
        Value::Undefined
    })
}

/// `rFS(path)` returns the file contents, or an error value. Also bound as
/// `readFile`.
pub fn read_file(name: &str) -> NativeFunction {
    let label = name.to_string();
    NativeFunction::new(name, "path", move |path| match &path {
        Value::String(path) => match std::fs::read_to_string(path.as_ref()) {
            Ok(contents) => Value::String(Rc::from(contents)),
            Err(e) => Value::error(format!("Cannot read '{}': {}", path, e), 0),
        },
        other => Value::error(format!("{} expects a string path, got {}", label, other.kind()), 0),
    })
}

pub fn standard_natives(sink: OutputSink) -> Vec<NativeFunction> {
    vec![read_file("rFS"), log(sink), read_file("readFile")]
}
