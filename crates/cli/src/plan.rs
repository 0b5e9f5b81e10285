use protoshift_core::config::Config;
use protoshift_core::plan::Engine;
use std::path::Path;

pub fn run(config: Option<&Path>, json: bool) -> protoshift_core::Result<i32> {
    let config = Config::load(config)?;
    let engine = Engine::new(config);
    let plan = engine.plan()?;

    let mut stdout = std::io::stdout().lock();
    if json {
        plan.print_json(&mut stdout)?;
    } else {
        plan.print(&mut stdout)?;
    }
    Ok(0)
}
