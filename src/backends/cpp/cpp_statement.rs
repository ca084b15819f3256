use crate::backends::cpp::CppEmitter;
use crate::backends::cpp::cpp_dependencies::UsageKind;
use crate::backends::cpp::cpp_names::{declaration, sanitize_identifier, value_type};
use crate::frontend_model::syntax::{
    Block, Expression, ForInit, Statement, SwitchEntry, VariableDeclaration, VariableFragment,
};
use crate::frontend_model::types::TypeId;
use crate::frontend_model::variables::VarId;
use crate::translator_messages::translator_errors::TranslatorError;

const ITERATOR_KEY: &str = "java.util.Iterator";

impl<'a> CppEmitter<'a> {
    pub(crate) fn emit_block_statements(&mut self, block: &'a Block) -> Result<(), TranslatorError> {
        for statement in &block.statements {
            self.emit_statement(statement)?;
        }
        Ok(())
    }

    pub(crate) fn emit_statement(&mut self, statement: &'a Statement) -> Result<(), TranslatorError> {
        match statement {
            Statement::Block(block) => {
                self.emit_line("{");
                self.with_indent(|emitter| emitter.emit_block_statements(block))?;
                self.emit_line("}");
            }

            Statement::Empty => self.emit_line(";"),

            Statement::Expression(expression) => {
                let lowered = self.lower_expr(expression)?;
                self.emit_line(&format!("{};", lowered));
            }

            Statement::VariableDeclaration(variables) => self.emit_variable_declaration(variables)?,

            // Local classes get their own files, nothing is emitted in place
            Statement::LocalClass(declaration) => {
                self.emit_nested_type(declaration)?;
            }

            Statement::If {
                condition,
                then_branch,
                else_branch,
            } => self.emit_if(condition, then_branch, else_branch.as_deref())?,

            Statement::While { .. }
            | Statement::DoWhile { .. }
            | Statement::For { .. }
            | Statement::EnhancedFor { .. } => self.emit_loop(statement, None)?,

            Statement::Return(value) => match value {
                Some(value) => {
                    self.deps
                        .classify(self.ctx.types, value.ty, UsageKind::ImplicitConversion)?;
                    let lowered = self.lower_expr(value)?;
                    self.emit_line(&format!("return {};", lowered));
                }
                None => self.emit_line("return;"),
            },

            Statement::Break(label) => match label {
                Some(label) => {
                    self.emit_line(&format!("goto {}_break;", sanitize_identifier(label)))
                }
                None => self.emit_line("break;"),
            },

            Statement::Continue(label) => match label {
                Some(label) => {
                    self.emit_line(&format!("goto {}_continue;", sanitize_identifier(label)))
                }
                None => self.emit_line("continue;"),
            },

            Statement::Throw(exception) => {
                self.deps
                    .classify(self.ctx.types, exception.ty, UsageKind::ImplicitConversion)?;
                let lowered = self.lower_expr(exception)?;
                self.emit_line(&format!("throw {};", lowered));
            }

            Statement::Labeled { label, body } => self.emit_labeled(label, body)?,

            Statement::Switch { selector, entries } => self.emit_switch(selector, entries)?,

            Statement::Synchronized { monitor, body } => self.emit_synchronized(monitor, body)?,

            Statement::Try {
                resources,
                body,
                catches,
                finally,
            } => self.emit_try(resources, body, catches, finally.as_ref())?,

            // The delegated construct body runs the field initializers
            Statement::ConstructorCall {
                constructor,
                arguments,
            } => {
                let binding = self.ctx.types.method(*constructor)?;
                let arguments = self.lower_arguments(*constructor, binding, arguments)?;
                self.emit_line(&format!("_construct({});", arguments));
            }

            Statement::SuperConstructorCall { .. } => {
                return Err(TranslatorError::unsupported(
                    "super(...) anywhere but the first statement of a constructor",
                ));
            }
        }

        Ok(())
    }

    /// One line per declared variable
    pub(crate) fn emit_variable_declaration(
        &mut self,
        variables: &'a VariableDeclaration,
    ) -> Result<(), TranslatorError> {
        for fragment in &variables.fragments {
            let text = self.variable_fragment(fragment, true)?;
            self.emit_line(&format!("{};", text));
        }
        Ok(())
    }

    // `T *name = init`, or just `*name = init` after the first declarator of a list
    fn variable_fragment(
        &mut self,
        fragment: &'a VariableFragment,
        with_type: bool,
    ) -> Result<String, TranslatorError> {
        let binding = self.ctx.variable(fragment.variable)?;
        self.deps
            .classify_declared(self.ctx.types, binding.ty, UsageKind::ByValueParam)?;

        let name = sanitize_identifier(&binding.name);
        let declarator = if with_type {
            declaration(self.ctx.types, binding.ty, self.type_id, &name)?
        } else if self.ctx.ty(binding.ty)?.is_primitive() {
            name
        } else {
            format!("*{}", name)
        };

        match &fragment.initializer {
            Some(initializer) => {
                self.deps
                    .classify(self.ctx.types, initializer.ty, UsageKind::ImplicitConversion)?;
                Ok(format!("{} = {}", declarator, self.lower_expr(initializer)?))
            }
            None => Ok(declarator),
        }
    }

    // The body of a branch or loop, without doubling the braces of a block
    fn emit_branch(&mut self, body: &'a Statement) -> Result<(), TranslatorError> {
        match body {
            Statement::Block(block) => self.emit_block_statements(block),
            _ => self.emit_statement(body),
        }
    }

    fn emit_if(
        &mut self,
        condition: &'a Expression,
        then_branch: &'a Statement,
        else_branch: Option<&'a Statement>,
    ) -> Result<(), TranslatorError> {
        let lowered = self.lower_expr(condition)?;
        self.emit_line(&format!("if ({}) {{", lowered));
        self.with_indent(|emitter| emitter.emit_branch(then_branch))?;

        let mut remaining = else_branch;
        while let Some(branch) = remaining {
            match branch {
                Statement::If {
                    condition,
                    then_branch,
                    else_branch,
                } => {
                    let lowered = self.lower_expr(condition)?;
                    self.emit_line(&format!("}} else if ({}) {{", lowered));
                    self.with_indent(|emitter| emitter.emit_branch(then_branch))?;
                    remaining = else_branch.as_deref();
                }
                _ => {
                    self.emit_line("} else {");
                    self.with_indent(|emitter| emitter.emit_branch(branch))?;
                    remaining = None;
                }
            }
        }

        self.emit_line("}");
        Ok(())
    }

    fn emit_labeled(&mut self, label: &str, body: &'a Statement) -> Result<(), TranslatorError> {
        let (breaks, continues) = label_usage(body, label);
        let label = sanitize_identifier(label);

        match body {
            Statement::While { .. }
            | Statement::DoWhile { .. }
            | Statement::For { .. }
            | Statement::EnhancedFor { .. } => {
                let continue_label = continues.then_some(label.as_str());
                self.emit_loop(body, continue_label)?;
            }
            _ => self.emit_statement(body)?,
        }

        if breaks {
            self.emit_line(&format!("{}_break:;", label));
        }

        Ok(())
    }

    fn emit_loop(
        &mut self,
        statement: &'a Statement,
        continue_label: Option<&str>,
    ) -> Result<(), TranslatorError> {
        match statement {
            Statement::While { condition, body } => {
                let lowered = self.lower_expr(condition)?;
                self.emit_line(&format!("while ({}) {{", lowered));
                self.with_indent(|emitter| emitter.emit_loop_body(body, continue_label))?;
                self.emit_line("}");
            }

            Statement::DoWhile { body, condition } => {
                self.emit_line("do {");
                self.with_indent(|emitter| emitter.emit_loop_body(body, continue_label))?;
                let lowered = self.lower_expr(condition)?;
                self.emit_line(&format!("}} while ({});", lowered));
            }

            Statement::For {
                initializer,
                condition,
                updaters,
                body,
            } => {
                let initializer = match initializer {
                    Some(ForInit::Declaration(variables)) => self.for_declaration(variables)?,
                    Some(ForInit::Expressions(expressions)) => self.lower_expression_list(expressions)?,
                    None => String::new(),
                };
                let condition = match condition {
                    Some(condition) => self.lower_expr(condition)?,
                    None => String::new(),
                };
                let updaters = self.lower_expression_list(updaters)?;

                self.emit_line(&format!(
                    "for ({};{};{}) {{",
                    initializer,
                    spaced(&condition),
                    spaced(&updaters)
                ));
                self.with_indent(|emitter| emitter.emit_loop_body(body, continue_label))?;
                self.emit_line("}");
            }

            Statement::EnhancedFor {
                variable,
                iterable,
                body,
            } => self.emit_enhanced_for(*variable, iterable, body, continue_label)?,

            _ => {
                return Err(TranslatorError::compiler_error(
                    "Loop lowering reached a statement that is not a loop",
                ));
            }
        }

        Ok(())
    }

    // Labeled continues jump to the end of an inner block, so no declaration
    // of the body is still in scope at the label
    fn emit_loop_body(
        &mut self,
        body: &'a Statement,
        continue_label: Option<&str>,
    ) -> Result<(), TranslatorError> {
        let Some(label) = continue_label else {
            return self.emit_branch(body);
        };

        self.emit_line("{");
        self.with_indent(|emitter| emitter.emit_branch(body))?;
        self.emit_line("}");
        self.emit_line(&format!("{}_continue:;", label));
        Ok(())
    }

    fn for_declaration(&mut self, variables: &'a VariableDeclaration) -> Result<String, TranslatorError> {
        let mut declared_type: Option<TypeId> = None;
        let mut declarators = Vec::with_capacity(variables.fragments.len());

        for fragment in &variables.fragments {
            let ty = self.ctx.variable(fragment.variable)?.ty;
            match declared_type {
                Some(first) if first != ty => {
                    return Err(TranslatorError::unsupported(
                        "for-loop declarations of differently typed variables",
                    ));
                }
                _ => {}
            }

            declarators.push(self.variable_fragment(fragment, declared_type.is_none())?);
            declared_type = Some(ty);
        }

        Ok(declarators.join(", "))
    }

    fn lower_expression_list(&mut self, expressions: &'a [Expression]) -> Result<String, TranslatorError> {
        let mut lowered = Vec::with_capacity(expressions.len());
        for expression in expressions {
            lowered.push(self.lower_expr(expression)?);
        }
        Ok(lowered.join(", "))
    }

    /// Arrays are walked by index over a temporary, anything else through its iterator
    fn emit_enhanced_for(
        &mut self,
        variable: VarId,
        iterable: &'a Expression,
        body: &'a Statement,
        continue_label: Option<&str>,
    ) -> Result<(), TranslatorError> {
        let binding = self.ctx.variable(variable)?;
        let name = sanitize_identifier(&binding.name);
        let element = declaration(self.ctx.types, binding.ty, self.type_id, &name)?;

        self.deps
            .classify(self.ctx.types, iterable.ty, UsageKind::MemberAccess)?;
        let lowered = self.lower_expr(iterable)?;

        if self.ctx.ty(iterable.ty)?.is_array() {
            self.deps
                .classify_declared(self.ctx.types, binding.ty, UsageKind::ByValueParam)?;

            let array = self.next_temp_identifier("array");
            let index = self.next_temp_identifier("index");

            self.emit_line("{");
            self.with_indent(|emitter| {
                emitter.emit_line(&format!("auto {} = {};", array, lowered));
                emitter.emit_line(&format!(
                    "for (int32_t {index} = 0; {index} < {array}->length; {index}++) {{"
                ));
                emitter.with_indent(|emitter| {
                    emitter.emit_line(&format!("{} = (*{})[{}];", element, array, index));
                    emitter.emit_loop_body(body, continue_label)
                })?;
                emitter.emit_line("}");
                Ok(())
            })?;
            self.emit_line("}");

            return Ok(());
        }

        if self.ctx.ty(binding.ty)?.is_primitive() {
            return Err(TranslatorError::unsupported(
                "Unboxing loop variables over a collection",
            ));
        }

        if let Some(iterator) = self.ctx.types.lookup(ITERATOR_KEY) {
            self.deps
                .classify(self.ctx.types, iterator, UsageKind::MemberAccess)?;
        }
        self.deps
            .classify(self.ctx.types, binding.ty, UsageKind::MemberAccess)?;

        let iterator = self.next_temp_identifier("iterator");
        let element_type = value_type(self.ctx.types, binding.ty, self.type_id)?;

        self.emit_line(&format!(
            "for (auto {iterator} = {lowered}->iterator(); {iterator}->hasNext(); ) {{"
        ));
        self.with_indent(|emitter| {
            emitter.emit_line(&format!(
                "{} = dynamic_cast<{}>({}->next());",
                element, element_type, iterator
            ));
            emitter.emit_loop_body(body, continue_label)
        })?;
        self.emit_line("}");

        Ok(())
    }

    /// Enum and String switches switch over the position of the matching label.
    /// Declarations inside case arms move in front of the switch.
    fn emit_switch(
        &mut self,
        selector: &'a Expression,
        entries: &'a [SwitchEntry],
    ) -> Result<(), TranslatorError> {
        let selector_type = self.ctx.ty(selector.ty)?;
        let by_position = selector_type.is_enum() || self.is_string(selector.ty)?;

        let hoisted = entries
            .iter()
            .filter_map(|entry| match entry {
                SwitchEntry::Statement(Statement::VariableDeclaration(variables)) => Some(variables),
                _ => None,
            })
            .collect::<Vec<_>>();

        if hoisted.is_empty() && !by_position {
            return self.emit_switch_body(selector, entries, false);
        }

        self.emit_line("{");
        self.with_indent(|emitter| {
            for variables in hoisted {
                for fragment in &variables.fragments {
                    let binding = emitter.ctx.variable(fragment.variable)?;
                    emitter
                        .deps
                        .classify_declared(emitter.ctx.types, binding.ty, UsageKind::ByValueParam)?;
                    let name = sanitize_identifier(&binding.name);
                    let declared = declaration(emitter.ctx.types, binding.ty, emitter.type_id, &name)?;
                    emitter.emit_line(&format!("{};", declared));
                }
            }

            emitter.emit_switch_body(selector, entries, by_position)
        })?;
        self.emit_line("}");

        Ok(())
    }

    fn emit_switch_body(
        &mut self,
        selector: &'a Expression,
        entries: &'a [SwitchEntry],
        by_position: bool,
    ) -> Result<(), TranslatorError> {
        let lowered_selector = self.lower_expr(selector)?;

        let switched_on = if by_position {
            let is_string = self.is_string(selector.ty)?;
            self.deps
                .classify(self.ctx.types, selector.ty, UsageKind::MemberAccess)?;

            let value = self.next_temp_identifier("selector");
            let position = self.next_temp_identifier("position");
            self.emit_line(&format!("auto {} = {};", value, lowered_selector));
            self.emit_line(&format!("int32_t {} = -1;", position));

            let labels = entries.iter().filter_map(|entry| match entry {
                SwitchEntry::Case(Some(label)) => Some(label),
                _ => None,
            });

            for (index, label) in labels.enumerate() {
                let label = self.lower_expr(label)?;
                if is_string {
                    self.emit_line(&format!("if ({}->equals({})) {} = {};", value, label, position, index));
                } else {
                    self.emit_line(&format!("if ({} == {}) {} = {};", value, label, position, index));
                }
            }

            position
        } else {
            lowered_selector
        };

        self.emit_line(&format!("switch ({}) {{", switched_on));

        let mut position = 0;
        for entry in entries {
            match entry {
                SwitchEntry::Case(Some(label)) => {
                    if by_position {
                        self.emit_line(&format!("case {}:", position));
                        position += 1;
                    } else {
                        let label = self.lower_expr(label)?;
                        self.emit_line(&format!("case {}:", label));
                    }
                }

                SwitchEntry::Case(None) => self.emit_line("default:"),

                SwitchEntry::Statement(Statement::VariableDeclaration(variables)) => {
                    self.with_indent(|emitter| emitter.emit_hoisted_initializers(variables))?;
                }

                SwitchEntry::Statement(statement) => {
                    self.with_indent(|emitter| emitter.emit_statement(statement))?;
                }
            }
        }

        self.emit_line("}");
        Ok(())
    }

    // What stays in the case arm of a hoisted declaration
    fn emit_hoisted_initializers(&mut self, variables: &'a VariableDeclaration) -> Result<(), TranslatorError> {
        for fragment in &variables.fragments {
            let Some(initializer) = &fragment.initializer else {
                continue;
            };

            let name = sanitize_identifier(&self.ctx.variable(fragment.variable)?.name);
            self.deps
                .classify(self.ctx.types, initializer.ty, UsageKind::ImplicitConversion)?;
            let lowered = self.lower_expr(initializer)?;
            self.emit_line(&format!("{} = {};", name, lowered));
        }
        Ok(())
    }
}

fn spaced(part: &str) -> String {
    if part.is_empty() {
        String::new()
    } else {
        format!(" {}", part)
    }
}

/// Whether `break label` and `continue label` occur inside `statement`.
/// Bodies of local classes are separate functions and are not searched.
pub(crate) fn label_usage(statement: &Statement, label: &str) -> (bool, bool) {
    let mut usage = (false, false);
    visit_label_usage(statement, label, &mut usage);
    usage
}

fn visit_label_usage(statement: &Statement, label: &str, usage: &mut (bool, bool)) {
    let visit_block = |block: &Block, usage: &mut (bool, bool)| {
        for statement in &block.statements {
            visit_label_usage(statement, label, usage);
        }
    };

    match statement {
        Statement::Break(Some(target)) if target == label => usage.0 = true,
        Statement::Continue(Some(target)) if target == label => usage.1 = true,

        Statement::Block(block) => visit_block(block, usage),
        Statement::If {
            then_branch,
            else_branch,
            ..
        } => {
            visit_label_usage(then_branch, label, usage);
            if let Some(else_branch) = else_branch {
                visit_label_usage(else_branch, label, usage);
            }
        }
        Statement::While { body, .. }
        | Statement::DoWhile { body, .. }
        | Statement::For { body, .. }
        | Statement::EnhancedFor { body, .. } => visit_label_usage(body, label, usage),

        // An inner statement with the same label shadows this one
        Statement::Labeled { label: inner, body } if inner != label => {
            visit_label_usage(body, label, usage)
        }
        Statement::Switch { entries, .. } => {
            for entry in entries {
                if let SwitchEntry::Statement(statement) = entry {
                    visit_label_usage(statement, label, usage);
                }
            }
        }
        Statement::Synchronized { body, .. } => visit_block(body, usage),
        Statement::Try {
            body,
            catches,
            finally,
            ..
        } => {
            visit_block(body, usage);
            for catch in catches {
                visit_block(&catch.body, usage);
            }
            if let Some(finally) = finally {
                visit_block(finally, usage);
            }
        }

        _ => {}
    }
}
