use std::io::Write;

const SAMPLE_CONFIG: &str = r#"# protoshift.yaml
source: proto/oldpackage/v1
target: proto/newpackage/v1

excludes:
  - "*ignore*.proto"
  - "*private*.proto"

rules:
  - kind: package
    from: oldpackage.v1
    to: newpackage.v1

  - kind: service
    from: OldService
    to: NewService

  - kind: regexp
    pattern: "oldpackage\\.v1\\."
    replace: "newpackage.v1."
"#;

pub fn run() -> protoshift_core::Result<i32> {
    let mut stdout = std::io::stdout().lock();
    write!(stdout, "{SAMPLE_CONFIG}")?;
    Ok(0)
}
