//! Output formats and the stdout plumbing shared by every command.

use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use std::io::{self, Write};

/// Available output formats.
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-friendly, colored
    #[default]
    Pretty,
    /// JSON output
    Json,
    /// CSV output
    Csv,
}

/// Whether `err` comes from writing to a reader that went away (`opr ... | head`).
pub fn is_broken_pipe(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause
            .downcast_ref::<io::Error>()
            .is_some_and(|e| e.kind() == io::ErrorKind::BrokenPipe)
    })
}

/// Write a payload byte for byte as the server returned it.
pub fn write_raw(out: &mut impl Write, body: &[u8]) -> io::Result<()> {
    out.write_all(body)?;
    out.flush()
}

/// Write a serializable value as pretty JSON followed by a newline.
pub fn write_json<T: Serialize + ?Sized>(out: &mut impl Write, value: &T) -> anyhow::Result<()> {
    let mut body = serde_json::to_vec_pretty(value)?;
    body.push(b'\n');
    write_raw(out, &body)?;
    Ok(())
}

/// `value`, or `-` when it is empty.
pub fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}

/// Write an indented `label` padded to `width` columns, then `lines`
/// aligned under the first one. An empty `lines` prints `-`.
pub fn write_block<S: AsRef<str>>(
    out: &mut impl Write,
    width: usize,
    label: &str,
    lines: &[S],
) -> io::Result<()> {
    let pad = " ".repeat(width.saturating_sub(label.chars().count()) + 1);
    let indent = " ".repeat(width + 1);
    let mut rest = lines.iter().map(AsRef::as_ref);

    writeln!(out, "    {}{pad}{}", label.bold(), rest.next().unwrap_or("-"))?;
    for line in rest {
        writeln!(out, "    {indent}{line}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_broken_pipe_through_context() {
        let err = anyhow::Error::new(io::Error::from(io::ErrorKind::BrokenPipe))
            .context("writing results");
        assert!(is_broken_pipe(&err));

        let other = anyhow::Error::new(io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(!is_broken_pipe(&other));
        assert!(!is_broken_pipe(&anyhow::anyhow!("API error: nope")));
    }

    #[test]
    fn raw_payload_is_untouched() {
        let mut out = Vec::new();
        write_raw(&mut out, b"a,b\n1,2").unwrap();
        assert_eq!(out, b"a,b\n1,2");
    }

    #[test]
    fn block_aligns_continuation_lines() {
        colored::control::set_override(false);
        let mut out = Vec::new();
        write_block(&mut out, 6, "NAME", &["first", "second"]).unwrap();
        write_block::<&str>(&mut out, 6, "EMPTY", &[]).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "    NAME   first\n           second\n    EMPTY  -\n"
        );
    }

    #[test]
    fn dash_for_blank() {
        assert_eq!(or_dash(""), "-");
        assert_eq!(or_dash("  "), "-");
        assert_eq!(or_dash("AS3"), "AS3");
    }
}
