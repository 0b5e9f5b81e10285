use nu_ansi_term::{Color, Style};
use protoshift_core::config::Config;
use protoshift_core::plan::{DiffLine, Engine};
use std::io::Write;
use std::path::Path;

pub fn run(config: Option<&Path>, exit_code: bool) -> protoshift_core::Result<i32> {
    let config = Config::load(config)?;
    let engine = Engine::new(config);
    let plan = engine.plan()?;
    let diffs = plan.diff()?;

    let mut stdout = std::io::stdout().lock();
    for file in &diffs {
        writeln!(stdout)?;
        writeln!(
            stdout,
            "{}",
            Style::new()
                .bold()
                .paint(format!("=== {} ===", file.path.display()))
        )?;
        for line in &file.lines {
            match line {
                DiffLine::Added(text) => {
                    writeln!(stdout, "{}", Color::Green.paint(format!("+{text}")))?;
                }
                DiffLine::Removed(text) => {
                    writeln!(stdout, "{}", Color::Red.paint(format!("-{text}")))?;
                }
                DiffLine::Context(text) => writeln!(stdout, " {text}")?,
            }
        }
    }

    if diffs.is_empty() {
        writeln!(stdout, "No differences found")?;
    }

    Ok(if exit_code && !diffs.is_empty() { 1 } else { 0 })
}
