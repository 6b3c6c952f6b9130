//! Colour tag expansion for rendered diffs.
//!
//! The engine emits text containing bracketed colour tags like `[green]`
//! and `[reset]`. This module expands them into ANSI styles for terminals,
//! or strips them for non-TTY output.

use lazy_static::lazy_static;
use owo_colors::{OwoColorize, Style};
use regex::Regex;

/// Expands or strips the colour tags recognised by the renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Colorize {
    /// Strip tags instead of expanding them.
    pub disable: bool,
}

impl Colorize {
    pub fn new(disable: bool) -> Self {
        Colorize { disable }
    }

    /// Expand (or strip) all recognised colour tags in `text`. Styles
    /// accumulate until the next `[reset]`, so `[bold][red]x[reset]`
    /// renders `x` bold and red.
    pub fn color(&self, text: &str) -> String {
        lazy_static! {
            static ref TAG: Regex =
                Regex::new(r"\[(bold|reset|red|green|yellow|cyan|dark_gray)\]").unwrap();
        }

        let mut out = String::with_capacity(text.len());
        let mut style: Option<Style> = None;
        let mut last = 0;
        for tag in TAG.find_iter(text) {
            self.push_styled(&mut out, &text[last..tag.start()], style);
            last = tag.end();

            let name = tag.as_str().trim_start_matches('[').trim_end_matches(']');
            let current = style.unwrap_or_else(Style::new);
            style = match name {
                "reset" => None,
                "bold" => Some(current.bold()),
                "red" => Some(current.red()),
                "green" => Some(current.green()),
                "yellow" => Some(current.yellow()),
                "cyan" => Some(current.cyan()),
                "dark_gray" => Some(current.bright_black()),
                _ => style,
            };
        }
        self.push_styled(&mut out, &text[last..], style);
        out
    }

    fn push_styled(&self, out: &mut String, segment: &str, style: Option<Style>) {
        if segment.is_empty() {
            return;
        }
        match style {
            Some(style) if !self.disable => out.push_str(&segment.style(style).to_string()),
            _ => out.push_str(segment),
        }
    }
}
