//! Scoped guard objects standing in for `synchronized` and `finally`.
//!
//! The helper types are emitted once per implementation file, inside an anonymous
//! namespace, and only when the file uses them.

use crate::backends::cpp::CppEmitter;
use crate::backends::cpp::cpp_dependencies::UsageKind;
use crate::backends::cpp::cpp_names::{declaration, sanitize_identifier};
use crate::frontend_model::syntax::{Block, CatchClause, Expression, VariableDeclaration};
use crate::translator_messages::translator_errors::TranslatorError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct GuardUsage {
    pub finally: bool,
    pub synchronized: bool,
}

const FINALLY_GUARD: &str = r#"namespace
{
    template<typename F>
    struct finally_
    {
        finally_(F f) : f(f), moved(false) { }
        finally_(finally_ &&x) : f(x.f), moved(false) { x.moved = true; }
        ~finally_() noexcept(false) { if (!moved) f(); }

    private:
        finally_(const finally_ &);
        finally_ &operator=(const finally_ &);

        F f;
        bool moved;
    };

    template<typename F>
    finally_<F> finally(F f) { return finally_<F>(f); }
}"#;

const SYNCHRONIZED_GUARD: &str = r#"extern void lock(::java::lang::Object *);
extern void unlock(::java::lang::Object *);

namespace
{
    struct synchronized_
    {
        synchronized_(::java::lang::Object *o) : o(o) { ::lock(o); }
        ~synchronized_() { ::unlock(o); }

    private:
        synchronized_(const synchronized_ &);
        synchronized_ &operator=(const synchronized_ &);

        ::java::lang::Object *o;
    };
}"#;

impl GuardUsage {
    /// Helper definitions for the guards this file uses
    pub(crate) fn helper_definitions(&self) -> Vec<&'static str> {
        let mut helpers = Vec::new();
        if self.finally {
            helpers.push(FINALLY_GUARD);
        }
        if self.synchronized {
            helpers.push(SYNCHRONIZED_GUARD);
        }
        helpers
    }
}

impl<'a> CppEmitter<'a> {
    /// Holds the monitor for the rest of the enclosing block
    pub(crate) fn emit_synchronized_guard(&mut self, monitor: &str) {
        self.guards.synchronized = true;
        let guard = self.next_temp_identifier("synchronized");
        self.emit_line(&format!("synchronized_ {}({});", guard, monitor));
    }

    pub(crate) fn emit_synchronized(
        &mut self,
        monitor: &'a Expression,
        body: &'a Block,
    ) -> Result<(), TranslatorError> {
        self.deps
            .classify(self.ctx.types, monitor.ty, UsageKind::ImplicitConversion)?;
        let monitor = self.lower_expr(monitor)?;

        self.emit_line("{");
        self.with_indent(|emitter| {
            emitter.emit_synchronized_guard(&monitor);
            emitter.emit_block_statements(body)
        })?;
        self.emit_line("}");

        Ok(())
    }

    /// Runs `body` when the enclosing block is left, however it is left
    fn emit_finally_guard<F>(&mut self, body: F) -> Result<(), TranslatorError>
    where
        F: FnOnce(&mut Self) -> Result<(), TranslatorError>,
    {
        self.guards.finally = true;
        let guard = self.next_temp_identifier("finally");
        self.emit_line(&format!("auto {} = finally([&] {{", guard));
        self.with_indent(body)?;
        self.emit_line("});");
        Ok(())
    }

    pub(crate) fn emit_try(
        &mut self,
        resources: &'a [VariableDeclaration],
        body: &'a Block,
        catches: &'a [CatchClause],
        finally: Option<&'a Block>,
    ) -> Result<(), TranslatorError> {
        self.emit_line("{");
        self.with_indent(|emitter| {
            if let Some(finally) = finally {
                emitter.emit_finally_guard(|emitter| emitter.emit_block_statements(finally))?;
            }

            if catches.is_empty() {
                emitter.emit_line("{");
            } else {
                emitter.emit_line("try {");
            }

            emitter.with_indent(|emitter| {
                for resource in resources {
                    emitter.emit_resource(resource)?;
                }
                emitter.emit_block_statements(body)
            })?;

            if catches.is_empty() {
                emitter.emit_line("}");
                return Ok(());
            }

            for catch in catches {
                emitter.emit_catch(catch)?;
            }
            emitter.emit_line("}");

            Ok(())
        })?;
        self.emit_line("}");

        Ok(())
    }

    // A resource is closed by its own guard, in reverse declaration order
    fn emit_resource(&mut self, resource: &'a VariableDeclaration) -> Result<(), TranslatorError> {
        self.emit_variable_declaration(resource)?;

        for fragment in &resource.fragments {
            let binding = self.ctx.variable(fragment.variable)?;
            self.deps
                .classify(self.ctx.types, binding.ty, UsageKind::MemberAccess)?;

            let name = sanitize_identifier(&binding.name);
            self.emit_finally_guard(|emitter| {
                emitter.emit_line(&format!("if ({} != nullptr) {{", name));
                emitter.with_indent(|emitter| {
                    emitter.emit_line(&format!("{}->close();", name));
                    Ok(())
                })?;
                emitter.emit_line("}");
                Ok(())
            })?;
        }

        Ok(())
    }

    // Multi-catch becomes one handler per alternative
    fn emit_catch(&mut self, catch: &'a CatchClause) -> Result<(), TranslatorError> {
        let parameter = self.ctx.variable(catch.parameter)?;
        let alternatives = if catch.alternatives.is_empty() {
            vec![parameter.ty]
        } else {
            catch.alternatives.clone()
        };

        let name = sanitize_identifier(&parameter.name);
        for alternative in alternatives {
            self.deps
                .classify(self.ctx.types, alternative, UsageKind::MemberAccess)?;
            let parameter = declaration(self.ctx.types, alternative, self.type_id, &name)?;

            self.emit_line(&format!("}} catch ({}) {{", parameter));
            self.with_indent(|emitter| emitter.emit_block_statements(&catch.body))?;
        }

        Ok(())
    }
}
