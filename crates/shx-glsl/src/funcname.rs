//! Function-name conversion pass.
//!
//! Runs after the main conversion (owner structs may have been renamed
//! by then). Member functions are qualified with their owner struct;
//! groups of equally named functions whose signatures coincide modulo
//! generic sub-types get numeric suffixes, because the target language
//! cannot tell e.g. `Texture2D<float>` from `Texture2D<float4>` apart
//! in an overload.

use std::collections::HashMap;

use shx_ast::{CompareFlags, FunctionDecl, Handle, Program, StmtKind, TypeDenoter};

use crate::NameMangling;

/// Rewrites function identifiers; see the module docs.
pub fn convert_function_names(program: &mut Program, mangling: &NameMangling) {
    qualify_member_functions(program, mangling);
    disambiguate_colliding_signatures(program);
}

fn qualify_member_functions(program: &mut Program, mangling: &NameMangling) {
    for handle in program.function_decls.handles().collect::<Vec<_>>() {
        let func = &program.function_decls[handle];
        if func.is_entry_point() {
            continue;
        }
        let Some(owner) = func.struct_ref else {
            continue;
        };
        let qualified = format!(
            "{}{}_{}",
            mangling.namespace_prefix, program.struct_decls[owner].ident, func.ident
        );
        program.function_decls[handle].ident = qualified;
    }
}

fn disambiguate_colliding_signatures(program: &mut Program) {
    let mut groups: HashMap<String, Vec<Handle<FunctionDecl>>> = HashMap::new();
    for (handle, func) in program.function_decls.iter() {
        if !func.is_entry_point() {
            groups.entry(func.ident.clone()).or_default().push(handle);
        }
    }

    for handles in groups.into_values() {
        if handles.len() < 2 {
            continue;
        }
        let collides = handles.iter().enumerate().any(|(i, &a)| {
            handles[i + 1..]
                .iter()
                .any(|&b| signatures_equal(program, a, b))
        });
        if !collides {
            continue;
        }
        for (index, &handle) in handles.iter().enumerate() {
            let suffixed = format!("{}_{}", program.function_decls[handle].ident, index);
            program.function_decls[handle].ident = suffixed;
        }
    }
}

/// Parameter-wise equality modulo generic sub-types. The synthesized
/// self parameter participates like any other.
fn signatures_equal(
    program: &Program,
    a: Handle<FunctionDecl>,
    b: Handle<FunctionDecl>,
) -> bool {
    let params_a = parameter_types(program, a);
    let params_b = parameter_types(program, b);
    if params_a.len() != params_b.len() {
        return false;
    }
    params_a
        .iter()
        .zip(&params_b)
        .all(|(ta, tb)| ta.equals(tb, CompareFlags::IGNORE_GENERIC_SUB_TYPE, program))
}

fn parameter_types(program: &Program, func: Handle<FunctionDecl>) -> Vec<TypeDenoter> {
    program.function_decls[func]
        .parameters
        .iter()
        .filter_map(|&param| match &program.stmts[param].kind {
            StmtKind::VarDeclStmt { specifier, .. } => Some(specifier.ty.clone()),
            _ => None,
        })
        .collect()
}
