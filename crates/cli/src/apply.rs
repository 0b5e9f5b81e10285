use protoshift_core::config::Config;
use protoshift_core::plan::Engine;
use protoshift_core::vendor::Vendorer;
use std::io::Write;
use std::path::Path;

pub fn run(config: Option<&Path>, vendor_deps: bool, dry_run: bool) -> protoshift_core::Result<i32> {
    let config = Config::load(config)?;
    let engine = Engine::new(config);
    let plan = engine.plan()?;

    let mut stdout = std::io::stdout().lock();
    if dry_run {
        writeln!(stdout, "Dry run mode - no changes will be made")?;
        plan.print(&mut stdout)?;
        return Ok(0);
    }

    if vendor_deps {
        Vendorer::new(&plan.target).vendor_external(&plan.graph)?;
    }

    engine.apply(plan)?;
    writeln!(stdout, "Changes applied successfully")?;
    Ok(0)
}
