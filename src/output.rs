use std::io::{self, Write};

pub fn println(message: &str, writer: &mut Option<&mut dyn Write>) -> io::Result<()> {
    if let Err(e) = writeln!(io::stdout(), "{message}") {
        eprintln!("Failed to write to standard output: {e}");
    }

    if let Some(w) = writer {
        writeln!(w, "{message}")?;
    }

    Ok(())
}

/// Like [`println`] without the trailing newline. Standard output is flushed so
/// the text shows up before a slow step finishes.
pub fn print(message: &str, writer: &mut Option<&mut dyn Write>) -> io::Result<()> {
    let mut stdout = io::stdout();
    if let Err(e) = write!(stdout, "{message}").and_then(|_| stdout.flush()) {
        eprintln!("Failed to write to standard output: {e}");
    }

    if let Some(w) = writer {
        write!(w, "{message}")?;
    }

    Ok(())
}

/// Formats whole seconds as `1h 2m 5s`, dropping leading zero units only.
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m {secs}s")
    } else if minutes > 0 {
        format!("{minutes}m {secs}s")
    } else {
        format!("{secs}s")
    }
}

/// Cuts `text` to at most `max` characters without splitting a code point.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
