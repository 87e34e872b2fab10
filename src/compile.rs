//! The compile pipeline: schema validation, semantic analysis, lowering.
//!
//! `compile` is repeatable and concurrency-safe: it takes everything it needs
//! as arguments, shares no mutable state between calls, and returns either a
//! compiled program or the complete diagnostic list.

use crate::analyze::analyze;
use crate::document::Document;
use crate::program::Program;
use crate::transform::lower;
use crate::validate::{validate_schema, CompileError, DocPath, SCHEMA_INVALID};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

/// Per-compilation configuration. Passed explicitly so independent
/// compilations never communicate through globals.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Names the host promises to bind as ambient locals at evaluation time
    /// (route parameters, imported values, adapter lookups). References to
    /// them resolve like outermost loop bindings.
    pub ambient_locals: Vec<String>,
}

/// Serializable result envelope for wire consumers (editor diagnostics, the
/// CLI validate/compile surfaces, the N-API bridge).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileOutcome {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<Program>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<CompileError>,
}

impl From<Result<Program, Vec<CompileError>>> for CompileOutcome {
    fn from(result: Result<Program, Vec<CompileError>>) -> Self {
        match result {
            Ok(program) => CompileOutcome {
                ok: true,
                program: Some(program),
                errors: Vec::new(),
            },
            Err(errors) => CompileOutcome {
                ok: false,
                program: None,
                errors,
            },
        }
    }
}

/// Compile a raw document into a program, or report every diagnostic found.
pub fn compile(raw: &Value, options: &CompileOptions) -> Result<Program, Vec<CompileError>> {
    let schema_errors = validate_schema(raw);
    if !schema_errors.is_empty() {
        debug!(errors = schema_errors.len(), "compile rejected by schema pass");
        return Err(schema_errors);
    }

    let doc: Document = match serde_json::from_value(raw.clone()) {
        Ok(doc) => doc,
        Err(err) => {
            // A deserialize failure after a clean schema pass means the
            // validator and the document model disagree.
            error!(%err, "validated document failed to deserialize");
            return Err(vec![CompileError::new(
                SCHEMA_INVALID,
                format!("document failed to deserialize after validation: {}", err),
                &DocPath::root(),
            )]);
        }
    };

    let semantic_errors = analyze(&doc, &options.ambient_locals);
    if !semantic_errors.is_empty() {
        debug!(
            errors = semantic_errors.len(),
            "compile rejected by analysis pass"
        );
        return Err(semantic_errors);
    }

    Ok(lower(doc))
}
