use std::io;

pub trait IntoIOErr {
    fn into_io_err(self) -> io::Error;
}

impl IntoIOErr for reqwest::Error {
    fn into_io_err(self) -> io::Error {
        io::Error::new(io::ErrorKind::Other, self)
    }
}

/// Writes one operator-facing line. A closed or broken output is not worth
/// aborting a download for, so write errors are dropped.
#[macro_export]
macro_rules! say {
    ($out: expr, $($arg: tt)*) => {{
        use std::io::Write as _;
        let _ = writeln!($out, $($arg)*);
    }};
}

/// Replaces path separators so `name` stays a single path component.
pub fn sanitize(name: &str) -> String {
    let s: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            c => c,
        })
        .collect();

    match s.as_str() {
        "" | "." | ".." => "_".into(),
        _ => s,
    }
}
