//! Console status output.
//!
//! Status lines go to stdout, failures to stderr. Both are written through
//! `anstream`, which strips the colour codes when the stream is not a
//! terminal.

pub use anstream::{eprintln as aeprintln, println as aprintln};

/// Tokyo Night color palette
pub mod colors {
    pub const RESET: &str = "\x1b[0m";

    pub const TKN_RED: &str = "\x1b[38;2;247;118;142m"; // #f7768e
    pub const TKN_GREEN: &str = "\x1b[38;2;158;206;106m"; // #9ece6a
    pub const TKN_YELLOW: &str = "\x1b[38;2;224;175;104m"; // #e0af68
    pub const TKN_BLUE: &str = "\x1b[38;2;122;162;247m"; // #7aa2f7
    pub const TKN_CYAN: &str = "\x1b[38;2;125;207;255m"; // #7dcfff
}

fn paint(color: &str, text: &str) -> String {
    format!("{}{}{}", color, text, colors::RESET)
}

pub fn p_g(text: &str) -> String {
    paint(colors::TKN_GREEN, text)
}

pub fn p_r(text: &str) -> String {
    paint(colors::TKN_RED, text)
}

pub fn p_y(text: &str) -> String {
    paint(colors::TKN_YELLOW, text)
}

pub fn p_b(text: &str) -> String {
    paint(colors::TKN_BLUE, text)
}

pub fn p_c(text: &str) -> String {
    paint(colors::TKN_CYAN, text)
}

/// Colors a plan line by its leading marker (`+`, `-`, `~`, `!`).
pub fn paint_plan_line(line: &str) -> String {
    if line.starts_with('+') {
        p_g(line)
    } else if line.starts_with('-') || line.starts_with('!') {
        p_r(line)
    } else if line.starts_with('~') {
        p_y(line)
    } else {
        line.to_string()
    }
}

const RULE: &str = "===========================================";

/// Human-readable status output for the walkthrough.
#[derive(Debug, Clone, Copy)]
pub struct Console {
    silent: bool,
}

impl Console {
    pub fn new(silent: bool) -> Self {
        Self { silent }
    }

    /// Prints a section banner.
    pub fn section(&self, title: &str) {
        if !self.silent {
            aprintln!("{}", RULE);
            aprintln!("{}", p_c(title));
        }
    }

    pub fn line(&self, text: &str) {
        if !self.silent {
            aprintln!("{}", text);
        }
    }

    /// Prints a `label value` pair with the label highlighted.
    pub fn field(&self, label: &str, value: impl std::fmt::Display) {
        if !self.silent {
            aprintln!("{} {}", p_b(label), value);
        }
    }

    pub fn success(&self, text: &str) {
        if !self.silent {
            aprintln!("{}", p_g(text));
        }
    }

    pub fn warn(&self, text: &str) {
        if !self.silent {
            aprintln!("{}", p_y(text));
        }
    }

    /// Failures are printed even when silent.
    pub fn failure(&self, text: &str) {
        aeprintln!("{}", p_r(text));
    }

    /// Prints indented, colored plan lines.
    pub fn plan(&self, lines: &[String]) {
        if !self.silent {
            for line in lines {
                aprintln!("  {}", paint_plan_line(line));
            }
        }
    }

    /// Prints lines as they are.
    pub fn block(&self, lines: &[String]) {
        if !self.silent {
            for line in lines {
                aprintln!("{}", line);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paint_wraps_with_reset() {
        assert_eq!(p_g("ok"), format!("{}ok{}", colors::TKN_GREEN, colors::RESET));
    }

    #[test]
    fn test_paint_plan_line_by_marker() {
        assert!(paint_plan_line("+ Create table: Person").starts_with(colors::TKN_GREEN));
        assert!(paint_plan_line("- Delete table: Person").starts_with(colors::TKN_RED));
        assert!(paint_plan_line("! Table 'Person' is keyed on x").starts_with(colors::TKN_RED));
        assert!(paint_plan_line("~ Update throughput").starts_with(colors::TKN_YELLOW));
        assert_eq!(paint_plan_line("= up to date"), "= up to date");
    }
}
