//! Type model provider.
//!
//! A [`Project`] is built once from declaration files and answers read-only
//! queries afterwards. The compiler only sees it through [`TypeModel`].
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use indexmap::{IndexMap, IndexSet};

use crate::config::Options;
use crate::error::{Error, Result};
use crate::ir::{DeclKey, EnumMember, Property, Ty};
use crate::lower::{self, Scope};
use crate::source::{DeclKind, Declaration, SourceFile};

/// What the predicate compiler needs from a type graph.
pub trait TypeModel {
    /// Locate an interface or type alias by name within a source unit.
    fn resolve_declaration(&self, file: &Path, name: &str) -> Option<Ty>;
    /// The type of an interface or alias referenced by [`Ty::Named`].
    fn named(&self, key: &DeclKey) -> Option<&Ty>;
    /// Ordered members of an enum referenced by [`Ty::Enum`].
    fn enum_members(&self, key: &DeclKey) -> Option<&[EnumMember]>;
}

#[derive(Debug, Clone)]
enum Declared {
    Type(Ty),
    Enum(Vec<EnumMember>),
}

#[derive(Debug, Clone)]
struct SourceUnit {
    path: PathBuf,
    kinds: IndexMap<String, DeclKind>,
}

#[derive(Debug)]
pub struct Project {
    units: Vec<SourceUnit>,
    decls: HashMap<DeclKey, Declared>,
}

// ————————————————————————————————————————————————————————————————————————————
// CONSTRUCTION
// ————————————————————————————————————————————————————————————————————————————

impl Project {
    /// Load every source unit the options point at (config includes + `source_file_path`).
    pub fn from_options(options: &Options) -> Result<Self> {
        let patterns = options.source_patterns()?;
        let paths = resolve_file_path_patterns(&patterns)?;
        Self::load(paths)
    }

    /// Load the given declaration files.
    pub fn load<I>(paths: I) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: AsRef<Path>,
    {
        let mut sources = Vec::new();
        for path in paths {
            let path = path.as_ref();
            let file: SourceFile = crate::path_de::from_file_with_path(path)?;
            sources.push((path.to_path_buf(), file));
        }
        Self::build(sources)
    }

    /// Build from already-parsed source units.
    pub fn build(sources: Vec<(PathBuf, SourceFile)>) -> Result<Self> {
        let units: Vec<SourceUnit> = sources
            .iter()
            .map(|(path, file)| SourceUnit {
                path: path.clone(),
                kinds: file.declarations.iter().map(|(n, d)| (n.clone(), d.kind())).collect(),
            })
            .collect();

        let mut project = Project { units, decls: HashMap::new() };
        let mut decls = HashMap::new();
        for (unit, (path, file)) in sources.iter().enumerate() {
            let scope = UnitScope { project: &project, unit };
            for (name, decl) in &file.declarations {
                let key = DeclKey::new(unit, name.clone());
                let declared = match decl {
                    Declaration::Enum { members } => {
                        Declared::Enum(lower::resolve_enum_members(name, members)?)
                    }
                    Declaration::Alias { ty } => Declared::Type(lower::lower_type(ty, &scope)),
                    Declaration::Interface { .. } => {
                        let mut visiting = Vec::new();
                        let props = interface_properties(&project, &sources, &key, &mut visiting)
                            .map_err(|name| Error::InheritanceCycle { path: path.clone(), name })?;
                        Declared::Type(Ty::Object(props))
                    }
                };
                decls.insert(key, declared);
            }
        }
        project.decls = decls;

        tracing::info!(
            units = project.units.len(),
            declarations = project.decls.len(),
            "project loaded"
        );
        Ok(project)
    }
}

/// Inherited properties first (in `extends` order), own properties last; later names win in place.
/// On a cycle, returns the name of the interface that closed it.
fn interface_properties(
    project: &Project,
    sources: &[(PathBuf, SourceFile)],
    key: &DeclKey,
    visiting: &mut Vec<DeclKey>,
) -> Result<Vec<Property>, String> {
    if visiting.contains(key) {
        return Err(key.name.clone());
    }
    let Some(Declaration::Interface { extends, properties }) =
        sources[key.unit].1.declarations.get(&key.name)
    else {
        return Ok(Vec::new());
    };
    visiting.push(key.clone());

    let own_scope = UnitScope { project, unit: key.unit };
    let mut merged: IndexMap<String, Property> = IndexMap::new();
    for base in extends {
        let Some((base_key, _)) = own_scope.lookup(base) else {
            tracing::warn!(interface = %key, base = %base, "unresolved base interface; ignored");
            continue;
        };
        match inherited_properties(project, sources, &base_key, visiting)? {
            Some(props) => {
                for prop in props {
                    merged.insert(prop.name.clone(), prop);
                }
            }
            None => tracing::warn!(interface = %key, base = %base, "extends a non-object type; ignored"),
        }
    }
    for prop in lower::lower_properties(properties, &own_scope) {
        merged.insert(prop.name.clone(), prop);
    }

    visiting.pop();
    Ok(merged.into_values().collect())
}

/// Properties contributed by one `extends` entry. Aliases are followed until they reach an
/// object type or an interface; `None` when the base is not object-shaped.
fn inherited_properties(
    project: &Project,
    sources: &[(PathBuf, SourceFile)],
    base: &DeclKey,
    visiting: &mut Vec<DeclKey>,
) -> Result<Option<Vec<Property>>, String> {
    match sources[base.unit].1.declarations.get(&base.name) {
        Some(Declaration::Interface { .. }) => interface_properties(project, sources, base, visiting).map(Some),
        Some(Declaration::Alias { ty }) => {
            if visiting.contains(base) {
                return Err(base.name.clone());
            }
            let scope = UnitScope { project, unit: base.unit };
            match lower::lower_type(ty, &scope) {
                Ty::Object(props) => Ok(Some(props)),
                Ty::Named(target) => {
                    visiting.push(base.clone());
                    let props = inherited_properties(project, sources, &target, visiting);
                    visiting.pop();
                    props
                }
                _ => Ok(None),
            }
        }
        _ => Ok(None),
    }
}

struct UnitScope<'p> {
    project: &'p Project,
    unit: usize,
}

impl Scope for UnitScope<'_> {
    /// Same unit first, then a unique match across the project.
    fn lookup(&self, name: &str) -> Option<(DeclKey, DeclKind)> {
        if let Some(kind) = self.project.units[self.unit].kinds.get(name) {
            return Some((DeclKey::new(self.unit, name), *kind));
        }
        let mut found = self
            .project
            .units
            .iter()
            .enumerate()
            .filter_map(|(unit, u)| u.kinds.get(name).map(|kind| (DeclKey::new(unit, name), *kind)));
        let first = found.next()?;
        if found.next().is_some() {
            tracing::warn!(name, "name is declared in several source files; not resolved");
            return None;
        }
        Some(first)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// QUERIES
// ————————————————————————————————————————————————————————————————————————————

impl Project {
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn source_paths(&self) -> impl Iterator<Item = &Path> {
        self.units.iter().map(|u| u.path.as_path())
    }

    /// Find a source unit by exact path, or by matching trailing path components.
    /// A trailing-component match that fits several units resolves to nothing.
    pub fn find_unit(&self, file: &Path) -> Option<usize> {
        let file = file.strip_prefix(".").unwrap_or(file);
        if let Some(unit) = self.units.iter().position(|u| u.path == file) {
            return Some(unit);
        }
        let mut found = self.units.iter().enumerate().filter_map(|(unit, u)| {
            let own = u.path.strip_prefix(".").unwrap_or(&u.path);
            let matches = u.path.ends_with(file) || (file.is_absolute() && file.ends_with(own));
            matches.then_some(unit)
        });
        let first = found.next()?;
        if found.next().is_some() {
            tracing::warn!(file = %file.display(), "path matches several source files; not resolved");
            return None;
        }
        Some(first)
    }
}

impl TypeModel for Project {
    fn resolve_declaration(&self, file: &Path, name: &str) -> Option<Ty> {
        let unit = self.find_unit(file)?;
        match self.units[unit].kinds.get(name)? {
            DeclKind::Interface | DeclKind::Alias => Some(Ty::Named(DeclKey::new(unit, name))),
            DeclKind::Enum => None,
        }
    }

    fn named(&self, key: &DeclKey) -> Option<&Ty> {
        match self.decls.get(key)? {
            Declared::Type(ty) => Some(ty),
            Declared::Enum(_) => None,
        }
    }

    fn enum_members(&self, key: &DeclKey) -> Option<&[EnumMember]> {
        match self.decls.get(key)? {
            Declared::Enum(members) => Some(members),
            Declared::Type(_) => None,
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

/// Expand literal paths and glob patterns into a de-duplicated, ordered file list.
/// Patterns that match nothing are skipped with a warning.
pub fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = IndexSet::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let entries = glob::glob(pattern).map_err(|e| Error::Pattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })?;
            let before = out.len();
            for entry in entries {
                let path = entry.map_err(|e| Error::Pattern {
                    pattern: pattern.to_string(),
                    reason: e.to_string(),
                })?;
                out.insert(path);
            }
            if out.len() == before {
                tracing::warn!(pattern, "source pattern matched no files");
            }
        } else {
            let path = PathBuf::from(pattern);
            if path.is_file() {
                out.insert(path);
            } else {
                tracing::warn!(pattern, "source file does not exist");
            }
        }
    }

    Ok(out.into_iter().collect())
}
