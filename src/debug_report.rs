use flexvars::{Error, FlexVars, Placeholder, RawArg};

mod ansi {
    const RESET: &str = "\x1b[0m";
    const DIM: &str = "\x1b[2m";
    const BOLD: &str = "\x1b[1m";

    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const RED: &str = "\x1b[31m";
    pub const GRAY: &str = "\x1b[90m";

    /// Wraps text in escape codes, or passes it through when color is off.
    pub struct Palette(bool);

    impl Palette {
        pub fn new(enabled: bool) -> Self {
            Palette(enabled)
        }

        pub fn paint(&self, s: impl AsRef<str>, code: &str) -> String {
            let s = s.as_ref();
            if self.0 { format!("{code}{s}{RESET}") } else { s.to_string() }
        }

        pub fn bold(&self, s: impl AsRef<str>) -> String {
            self.paint(s, BOLD)
        }

        pub fn dim(&self, s: impl AsRef<str>) -> String {
            self.paint(s, DIM)
        }
    }
}

pub fn print_run(
    template: &str,
    placeholders: &[Placeholder],
    vars: &FlexVars,
    result: &Result<String, Error>,
    color: bool,
) {
    let palette = ansi::Palette::new(color);
    println!("\n{}", palette.bold(palette.paint(format!("⚙  Template: \"{}\"", template), ansi::CYAN)));

    println!("\n{}", palette.paint("━━━ Placeholders ━━━", ansi::GRAY));
    if placeholders.is_empty() {
        println!("{}", palette.dim("  No placeholders found"));
        if template.contains('{') {
            println!("\n{}", palette.paint("Possible reasons:", ansi::YELLOW));
            println!("  • The brace is escaped with a backslash");
            println!("  • The text between braces is not a name or filter chain");
        }
    } else {
        print_placeholders(placeholders, vars, &palette);
    }

    println!("\n{}", palette.paint("━━━ Result ━━━", ansi::GRAY));
    match result {
        Ok(text) => println!("  {}", palette.bold(palette.paint(format!("\"{text}\""), ansi::GREEN))),
        Err(err) => {
            println!("  {}", palette.paint(format!("✗ {err}"), ansi::RED));
            if let Some(filter) = err.filter_name() {
                println!("      {} {}", palette.dim("filter:"), palette.paint(filter, ansi::BLUE));
            }
        }
    }
    println!();
}

fn print_placeholders(placeholders: &[Placeholder], vars: &FlexVars, palette: &ansi::Palette) {
    for (idx, p) in placeholders.iter().enumerate() {
        let name = if p.name.is_empty() { palette.dim("(positional)") } else { palette.paint(&p.name, ansi::GREEN) };
        println!(
            "  {} {} {} {}",
            palette.paint(format!("[{}]", idx), ansi::GRAY),
            palette.bold(name),
            palette.dim("│"),
            palette.paint(format!("span {}..{}", p.start, p.end), ansi::YELLOW),
        );
        if !p.prefix.is_empty() || !p.suffix.is_empty() {
            println!(
                "      {} {}  {} {}",
                palette.dim("prefix:"),
                palette.paint(format!("{:?}", p.prefix), ansi::CYAN),
                palette.dim("│ suffix:"),
                palette.paint(format!("{:?}", p.suffix), ansi::CYAN)
            );
        }
        for call in &p.chain {
            let status = if vars.has_filter(&call.name) {
                palette.paint("✓", ansi::GREEN)
            } else {
                palette.dim("✗ unknown, skipped")
            };
            println!(
                "      {} {}{} {}",
                palette.dim("|"),
                palette.paint(&call.name, ansi::BLUE),
                palette.dim(fmt_args(&call.args)),
                status
            );
        }
    }
}

fn fmt_args(args: &[RawArg]) -> String {
    if args.is_empty() {
        return String::new();
    }
    let slots: Vec<String> = args.iter().map(|slot| slot.as_ref().map(|v| v.to_string()).unwrap_or_default()).collect();
    format!("({})", slots.join(", "))
}
