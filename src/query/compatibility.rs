//! Interpreter and architecture compatibility of a wheel

use crate::parser::{Arch, ArtifactRecord};
use crate::query::environment::{EnvironmentContext, PythonVersion, Selection};

/// A record tagged for both python 2 and python 3 runs anywhere
pub fn is_universal(record: &ArtifactRecord) -> bool {
    record.interpreter_tags.contains("py2") && record.interpreter_tags.contains("py3")
}

/// True when the record runs on one of the requested interpreters
pub fn is_interpreter_compatible(
    record: &ArtifactRecord,
    pythons: &Selection<PythonVersion>,
) -> bool {
    if pythons.is_all() || is_universal(record) {
        return true;
    }
    pythons.values().iter().any(|python| {
        python
            .compatible_tags()
            .iter()
            .any(|tag| record.interpreter_tags.contains(tag))
    })
}

/// True when the record runs on one of the requested architectures.
///
/// `generic` wheels run everywhere.
pub fn is_arch_compatible(record: &ArtifactRecord, archs: &Selection<Arch>) -> bool {
    record.arch.is_generic() || archs.allows(&record.arch)
}

/// Applies both compatibility axes of an environment, each of which can be bypassed
#[derive(Debug, Clone)]
pub struct CompatibilityResolver<'a> {
    context: &'a EnvironmentContext,
}

impl<'a> CompatibilityResolver<'a> {
    pub fn new(context: &'a EnvironmentContext) -> Self {
        Self { context }
    }

    pub fn is_compatible(&self, record: &ArtifactRecord) -> bool {
        is_interpreter_compatible(record, &self.context.pythons)
            && is_arch_compatible(record, &self.context.archs)
    }
}
