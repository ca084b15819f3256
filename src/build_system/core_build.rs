// Translation pipeline shared by the CLI and library users
//
// - Every compilation unit is emitted in parallel, one unit per Java type
// - Array types referenced anywhere are emitted once afterwards
// - Output is sorted by path so repeated runs produce identical trees

use crate::backends::cpp::{EmittedUnit, TranslationContext, emit_array_unit, emit_type_declaration};
use crate::frontend_model::program::Program;
use crate::frontend_model::syntax::TypeDeclaration;
use crate::frontend_model::types::TypeId;
use crate::projects::file_output::write_units;
use crate::projects::settings::Settings;
use crate::timer_log;
use crate::translator_messages::translator_errors::TranslatorError;
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::time::Instant;

#[derive(Debug)]
pub struct TranslationOutput {
    pub units: Vec<EmittedUnit>,
}

impl TranslationOutput {
    pub fn file_count(&self) -> usize {
        self.units.len() * 2
    }
}

pub struct Translator {
    settings: Settings,
}

impl Translator {
    pub fn new(settings: Settings) -> Self {
        Translator { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Emits every type of the program and every array type they reference.
    ///
    /// Errors from independent compilation units are all collected before returning.
    pub fn translate(&self, program: &Program) -> Result<TranslationOutput, Vec<TranslatorError>> {
        let time = Instant::now();

        // Base arrays must exist before the table is shared between threads
        let mut types = program.types.clone();
        types.complete_array_types().map_err(|e| vec![e])?;

        for unit in &program.units {
            let Some(source_path) = &unit.source_path else {
                continue;
            };

            for declaration in &unit.types {
                let resolved = types.get_mut(declaration.binding).map_err(|e| vec![e])?;
                if resolved.source_path.is_none() {
                    resolved.source_path = Some(source_path.to_owned());
                }
            }
        }

        let ctx = TranslationContext::new(&types, &program.variables, &self.settings);

        let declarations: Vec<&TypeDeclaration> = program
            .units
            .iter()
            .flat_map(|unit| unit.types.iter())
            .collect();

        let results: Vec<Result<Vec<EmittedUnit>, TranslatorError>> = declarations
            .par_iter()
            .map(|declaration| emit_type_declaration(ctx, declaration))
            .collect();
        timer_log!(time, "Types emitted in: ");

        let mut units = Vec::with_capacity(results.len());
        let mut errors = Vec::new();
        for result in results {
            match result {
                Ok(emitted) => units.extend(emitted),
                Err(e) => errors.push(e),
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let time = Instant::now();
        let array_units = emit_referenced_arrays(ctx, &units).map_err(|e| vec![e])?;
        units.extend(array_units);
        timer_log!(time, "Array types emitted in: ");

        units.sort_by(|a, b| a.header_path.cmp(&b.header_path));
        Ok(TranslationOutput { units })
    }

    /// Translates and writes the result under the configured output directory
    pub fn translate_to_disk(&self, program: &Program) -> Result<TranslationOutput, Vec<TranslatorError>> {
        let output = self.translate(program)?;

        let time = Instant::now();
        write_units(&self.settings.output_dir, &output.units).map_err(|e| vec![e])?;
        timer_log!(time, "Files written in: ");

        Ok(output)
    }
}

// Worklist over the referenced arrays. Emitting an array can reference more
// arrays (its bases and its component), which are emitted in turn.
fn emit_referenced_arrays(
    ctx: TranslationContext,
    units: &[EmittedUnit],
) -> Result<Vec<EmittedUnit>, TranslatorError> {
    let mut pending: BTreeSet<TypeId> = units
        .iter()
        .flat_map(|unit| unit.referenced_arrays.iter().copied())
        .collect();
    let mut emitted = BTreeSet::new();
    let mut array_units = Vec::new();

    while let Some(array) = pending.pop_first() {
        if !emitted.insert(array) {
            continue;
        }

        let unit = emit_array_unit(ctx, array).map_err(|e| {
            let array_key = ctx
                .types
                .get(array)
                .map(|resolved| resolved.binding_key.to_owned())
                .unwrap_or_default();
            e.with_type_name(array_key)
        })?;

        for referenced in &unit.referenced_arrays {
            if !emitted.contains(referenced) {
                pending.insert(*referenced);
            }
        }
        array_units.push(unit);
    }

    Ok(array_units)
}
