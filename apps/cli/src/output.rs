//! # Output
//!
//! Prints command results either as plain text lines or as pretty JSON.

use anyhow::Context;
use serde::Serialize;

/// Plain-text rendering of a command result.
pub trait Render {
    fn render(&self) -> String;
}

/// A result shown one per line in lists.
pub trait Listed: Render {
    /// Line printed when the list is empty.
    const EMPTY: &'static str;
}

impl<T: Listed> Render for Vec<T> {
    fn render(&self) -> String {
        if self.is_empty() {
            return T::EMPTY.to_string();
        }
        self.iter().map(Render::render).collect::<Vec<_>>().join("\n")
    }
}

/// Writes `value` to stdout.
pub fn emit<T: Serialize + Render>(value: &T, json: bool) -> anyhow::Result<()> {
    println!("{}", format(value, json)?);
    Ok(())
}

/// Formats `value` the way [`emit`] prints it.
pub fn format<T: Serialize + Render>(value: &T, json: bool) -> anyhow::Result<String> {
    if json {
        serde_json::to_string_pretty(value).context("serializing output")
    } else {
        Ok(value.render())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Line(&'static str);

    impl Render for Line {
        fn render(&self) -> String {
            self.0.to_string()
        }
    }

    impl Listed for Line {
        const EMPTY: &'static str = "Nothing here.";
    }

    #[test]
    fn test_list_rendering() {
        let lines = vec![Line("a"), Line("b")];
        assert_eq!(format(&lines, false).unwrap(), "a\nb");
        assert_eq!(format(&Vec::<Line>::new(), false).unwrap(), "Nothing here.");
    }

    #[test]
    fn test_json_rendering() {
        assert_eq!(format(&vec![Line("a")], true).unwrap(), "[\n  \"a\"\n]");
    }
}
