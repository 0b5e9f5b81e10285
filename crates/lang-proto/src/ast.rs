/// Parsed declaration-level view of one schema file.
///
/// The declarations are retained in source order. Accessors below give the
/// per-kind iteration the migration engine consumes; the raw declaration
/// list stays available for anything else.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaAst {
    declarations: Vec<Declaration>,
}

/// One top-level declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    Package(String),
    Import {
        path: String,
        modifier: ImportModifier,
    },
    Service(String),
    Option {
        name: String,
        value: String,
    },
}

/// Modifier on an import statement (`import public "x";`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportModifier {
    None,
    Public,
    Weak,
}

impl SchemaAst {
    pub(crate) fn new(declarations: Vec<Declaration>) -> Self {
        Self { declarations }
    }

    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    /// Declared package names, in declaration order.
    pub fn packages(&self) -> impl Iterator<Item = &str> {
        self.declarations.iter().filter_map(|d| match d {
            Declaration::Package(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// Import paths as written, in declaration order.
    pub fn imports(&self) -> impl Iterator<Item = &str> {
        self.declarations.iter().filter_map(|d| match d {
            Declaration::Import { path, .. } => Some(path.as_str()),
            _ => None,
        })
    }

    /// Declared service names, in declaration order.
    pub fn services(&self) -> impl Iterator<Item = &str> {
        self.declarations.iter().filter_map(|d| match d {
            Declaration::Service(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// File-level options as (name, value) pairs.
    pub fn options(&self) -> impl Iterator<Item = (&str, &str)> {
        self.declarations.iter().filter_map(|d| match d {
            Declaration::Option { name, value } => Some((name.as_str(), value.as_str())),
            _ => None,
        })
    }
}
