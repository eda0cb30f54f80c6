pub use anyhow::anyhow;
pub use std::io::Write;

// Fallible println!/eprintln! so io::ErrorKind::BrokenPipe (e.g. a closed
// pager) can be caught instead of panicking.
// Adapted from: https://github.com/rust-lang/rust/issues/46016#issuecomment-1242039016
#[macro_export]
macro_rules! println {
    () => (println!(""));
    ($fmt:expr) => ({
        writeln!(std::io::stdout(), $fmt).map_err(|e| anyhow!(e))
    });
    ($fmt:expr, $($arg:tt)*) => ({
        writeln!(std::io::stdout(), $fmt, $($arg)*).map_err(|e| anyhow!(e))
    })
}

#[macro_export]
macro_rules! eprintln {
    () => (eprintln!(""));
    ($fmt:expr) => ({
        writeln!(std::io::stderr(), $fmt).map_err(|e| anyhow!(e))
    });
    ($fmt:expr, $($arg:tt)*) => ({
        writeln!(std::io::stderr(), $fmt, $($arg)*).map_err(|e| anyhow!(e))
    })
}
