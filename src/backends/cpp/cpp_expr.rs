use crate::backends::cpp::CppEmitter;
use crate::backends::cpp::cpp_dependencies::UsageKind;
use crate::backends::cpp::cpp_names::{
    field_name, outer_this_name, relative_name, sanitize_identifier, value_type,
};
use crate::frontend_model::syntax::{
    AssignmentOperator, Expression, ExpressionKind, InfixOperator, Literal, PrefixOperator,
    TypeDeclaration,
};
use crate::frontend_model::types::{MethodBinding, MethodRef, PrimitiveCode, TypeId, TypeKind};
use crate::frontend_model::variables::{ConstantValue, VarId, VariableOwner};
use crate::translator_messages::translator_errors::TranslatorError;

const STRING_KEY: &str = "java.lang.String";

impl<'a> CppEmitter<'a> {
    pub(crate) fn lower_expr(&mut self, expression: &'a Expression) -> Result<String, TranslatorError> {
        match &expression.kind {
            ExpressionKind::Literal(literal) => self.lower_literal(literal),

            ExpressionKind::Variable(variable) => {
                let lowered = self.lower_variable(*variable)?;
                let declared = self.ctx.variable(*variable)?.ty;
                self.erasure_cast(lowered, declared, expression.ty)
            }

            ExpressionKind::TypeName(type_name) => {
                self.deps
                    .classify(self.ctx.types, *type_name, UsageKind::MemberAccess)?;
                relative_name(self.ctx.types, *type_name, self.type_id)
            }

            ExpressionKind::FieldAccess { target, field } => {
                let lowered = self.lower_field_access(target, *field)?;
                let declared = self.ctx.variable(*field)?.ty;
                self.erasure_cast(lowered, declared, expression.ty)
            }

            ExpressionKind::SuperFieldAccess { qualifier, field } => {
                let name = field_name(&self.ctx.variable(*field)?.name);
                self.lower_super_member(*qualifier, &name)
            }

            ExpressionKind::This { qualifier } => match qualifier {
                Some(qualifier) if *qualifier != self.type_id => {
                    self.enclosing_instance_path(*qualifier, true)
                }
                _ => Ok(String::from("this")),
            },

            ExpressionKind::MethodCall {
                target,
                method,
                arguments,
                ..
            } => {
                let lowered = self.lower_method_call(target.as_deref(), *method, arguments)?;
                let declared = self.ctx.types.method(*method)?.return_type;
                self.erasure_cast(lowered, declared, expression.ty)
            }

            ExpressionKind::SuperMethodCall {
                qualifier,
                method,
                arguments,
            } => {
                let binding = self.ctx.types.method(*method)?;
                let arguments = self.lower_arguments(*method, binding, arguments)?;
                let call = format!("{}({})", sanitize_identifier(&binding.name), arguments);

                // `I.super.m()` names the interface directly
                if let Some(interface) = qualifier
                    && self.ctx.ty(*interface)?.is_interface()
                {
                    self.deps
                        .classify(self.ctx.types, *interface, UsageKind::MemberAccess)?;
                    let interface = relative_name(self.ctx.types, *interface, self.type_id)?;
                    return Ok(format!("{}::{}", interface, call));
                }

                self.lower_super_member(*qualifier, &call)
            }

            ExpressionKind::New {
                outer,
                class,
                constructor,
                arguments,
                anonymous,
                ..
            } => self.lower_new(
                outer.as_deref(),
                *class,
                *constructor,
                arguments,
                anonymous.as_deref(),
            ),

            ExpressionKind::ArrayCreation {
                array_type,
                dimensions,
                initializer,
            } => self.lower_array_creation(*array_type, dimensions, initializer.as_deref()),

            ExpressionKind::ArrayInitializer(values) => self.lower_array_values(expression.ty, values),

            ExpressionKind::ArrayAccess { array, index } => {
                self.deps
                    .classify(self.ctx.types, array.ty, UsageKind::MemberAccess)?;
                let array = self.lower_expr(array)?;
                let index = self.lower_expr(index)?;
                Ok(format!("(*{})[{}]", array, index))
            }

            ExpressionKind::Assignment {
                target,
                operator,
                value,
            } => self.lower_assignment(target, *operator, value),

            ExpressionKind::Infix {
                left,
                operator,
                right,
                extended,
            } => self.lower_infix(expression.ty, left, *operator, right, extended),

            ExpressionKind::Prefix { operator, operand } => {
                let operand = self.lower_expr(operand)?;
                let sign_clash = matches!(operator, PrefixOperator::Minus | PrefixOperator::Decrement)
                    && operand.starts_with('-')
                    || matches!(operator, PrefixOperator::Plus | PrefixOperator::Increment)
                        && operand.starts_with('+');

                if sign_clash {
                    Ok(format!("{} {}", operator.token(), operand))
                } else {
                    Ok(format!("{}{}", operator.token(), operand))
                }
            }

            ExpressionKind::Postfix { operator, operand } => {
                Ok(format!("{}{}", self.lower_expr(operand)?, operator.token()))
            }

            ExpressionKind::Cast { target, operand } => self.lower_cast(*target, operand),

            ExpressionKind::InstanceOf { operand, target } => {
                self.deps
                    .classify(self.ctx.types, *target, UsageKind::MemberAccess)?;
                self.deps
                    .classify(self.ctx.types, operand.ty, UsageKind::MemberAccess)?;
                let operand = self.lower_expr(operand)?;
                let target = value_type(self.ctx.types, *target, self.type_id)?;
                Ok(format!("(dynamic_cast<{}>({}) != nullptr)", target, operand))
            }

            ExpressionKind::Conditional {
                condition,
                then_value,
                else_value,
            } => {
                let condition = self.lower_expr(condition)?;
                let then_text = self.lower_branch_value(expression.ty, then_value)?;
                let else_text = self.lower_branch_value(expression.ty, else_value)?;
                Ok(format!("{} ? {} : {}", condition, then_text, else_text))
            }

            ExpressionKind::TypeLiteral(literal_type) => self.lower_type_literal(*literal_type),

            ExpressionKind::Parenthesized(inner) => Ok(format!("({})", self.lower_expr(inner)?)),
        }
    }

    fn lower_literal(&mut self, literal: &Literal) -> Result<String, TranslatorError> {
        Ok(match literal {
            Literal::Null => String::from("nullptr"),
            Literal::Boolean(value) => value.to_string(),
            Literal::Char(value) => char_literal(*value),
            Literal::Int(value) => int_literal(*value),
            Literal::Long(value) => long_literal(*value),
            Literal::Float(value) => float_literal(*value),
            Literal::Double(value) => double_literal(*value),
            Literal::String(value) => {
                self.classify_string()?;
                string_literal(value)
            }
        })
    }

    fn classify_string(&mut self) -> Result<(), TranslatorError> {
        if let Some(string) = self.ctx.types.lookup(STRING_KEY) {
            self.deps
                .classify(self.ctx.types, string, UsageKind::MemberAccess)?;
        }
        Ok(())
    }

    pub(crate) fn is_string(&self, id: TypeId) -> Result<bool, TranslatorError> {
        Ok(self.ctx.ty(id)?.binding_key == STRING_KEY)
    }

    fn lower_variable(&mut self, variable: VarId) -> Result<String, TranslatorError> {
        let binding = self.ctx.variable(variable)?;

        let VariableOwner::Field { declaring } = binding.owner else {
            return self.local_variable_name(variable);
        };

        let name = field_name(&binding.name);
        if binding.modifiers.is_static() {
            if self.ctx.types.is_subtype(self.type_id, declaring) {
                return Ok(name);
            }

            self.deps
                .classify(self.ctx.types, declaring, UsageKind::MemberAccess)?;
            let owner = relative_name(self.ctx.types, declaring, self.type_id)?;
            return Ok(format!("{}::{}", owner, name));
        }

        let path = self.enclosing_instance_path(declaring, false)?;
        if path == "this" {
            Ok(name)
        } else {
            Ok(format!("{}->{}", path, name))
        }
    }

    fn lower_field_access(
        &mut self,
        target: &'a Expression,
        field: VarId,
    ) -> Result<String, TranslatorError> {
        let binding = self.ctx.variable(field)?;
        let name = field_name(&binding.name);

        if let ExpressionKind::TypeName(owner) = target.kind {
            self.deps
                .classify(self.ctx.types, owner, UsageKind::MemberAccess)?;
            let owner = relative_name(self.ctx.types, owner, self.type_id)?;
            return Ok(format!("{}::{}", owner, name));
        }

        if self.ctx.ty(target.ty)?.is_array() && binding.name == "length" {
            self.deps
                .classify(self.ctx.types, target.ty, UsageKind::MemberAccess)?;
            return Ok(format!("{}->length", self.lower_expr(target)?));
        }

        if binding.modifiers.is_static() {
            let declaring = binding.declaring_type();
            self.deps
                .classify(self.ctx.types, declaring, UsageKind::MemberAccess)?;
            let owner = relative_name(self.ctx.types, declaring, self.type_id)?;
            return Ok(format!("{}::{}", owner, name));
        }

        self.deps
            .classify(self.ctx.types, target.ty, UsageKind::MemberAccess)?;
        Ok(format!("{}->{}", self.lower_expr(target)?, name))
    }

    /// `super::member`, reached through the enclosing instance for `Outer.super.member`
    fn lower_super_member(
        &mut self,
        qualifier: Option<TypeId>,
        member: &str,
    ) -> Result<String, TranslatorError> {
        match qualifier {
            Some(qualifier) if qualifier != self.type_id => {
                let path = self.enclosing_instance_path(qualifier, true)?;
                Ok(format!("{}->super::{}", path, member))
            }
            _ => Ok(format!("super::{}", member)),
        }
    }

    /// Pointer expression reaching an instance of `target` from the current type.
    ///
    /// `this` when the current type is (a subtype of) the target, otherwise a chain
    /// of outer-instance members. `exact` only accepts the target itself, as
    /// qualified `this` requires.
    pub(crate) fn enclosing_instance_path(
        &mut self,
        target: TypeId,
        exact: bool,
    ) -> Result<String, TranslatorError> {
        let reaches = |current: TypeId| {
            if exact {
                current == target
            } else {
                self.ctx.types.is_subtype(current, target)
            }
        };

        if reaches(self.type_id) {
            return Ok(String::from("this"));
        }

        let mut path = Vec::new();
        let mut current = self.type_id;

        loop {
            let resolved = self.ctx.ty(current)?;
            let declaring = match resolved.declaring_class {
                Some(declaring) if resolved.has_outer_instance() => declaring,
                _ => {
                    return Err(TranslatorError::binding_gap(format!(
                        "No enclosing instance of {} is reachable from {}",
                        self.ctx.ty(target)?.binding_key,
                        self.ctx.ty(self.type_id)?.binding_key
                    )));
                }
            };

            path.push(outer_this_name(self.ctx.types, current)?);
            if reaches(declaring) {
                break;
            }
            current = declaring;
        }

        for hop in self.enclosing_chain(path.len())? {
            self.deps
                .classify(self.ctx.types, hop, UsageKind::MemberAccess)?;
        }

        Ok(path.join("->"))
    }

    // The first `hops` declaring classes above the current type
    fn enclosing_chain(&self, hops: usize) -> Result<Vec<TypeId>, TranslatorError> {
        let mut chain = Vec::with_capacity(hops);
        let mut current = self.type_id;
        for _ in 0..hops {
            let Some(declaring) = self.ctx.ty(current)?.declaring_class else {
                break;
            };
            chain.push(declaring);
            current = declaring;
        }
        Ok(chain)
    }

    fn lower_method_call(
        &mut self,
        target: Option<&'a Expression>,
        method: MethodRef,
        arguments: &'a [Expression],
    ) -> Result<String, TranslatorError> {
        let binding = self.ctx.types.method(method)?;
        let arguments = self.lower_arguments(method, binding, arguments)?;
        let call = format!("{}({})", sanitize_identifier(&binding.name), arguments);
        let owner = method.owner;

        if let Some(target) = target {
            if let ExpressionKind::TypeName(type_name) = target.kind {
                self.deps
                    .classify(self.ctx.types, type_name, UsageKind::MemberAccess)?;
                let type_name = relative_name(self.ctx.types, type_name, self.type_id)?;
                return Ok(format!("{}::{}", type_name, call));
            }

            if binding.modifiers.is_static() {
                self.deps
                    .classify(self.ctx.types, owner, UsageKind::MemberAccess)?;
                let owner = relative_name(self.ctx.types, owner, self.type_id)?;
                return Ok(format!("{}::{}", owner, call));
            }

            self.deps
                .classify(self.ctx.types, target.ty, UsageKind::MemberAccess)?;
            let target = self.lower_expr(target)?;
            return Ok(format!("{}->{}", target, call));
        }

        if binding.modifiers.is_static() {
            if self.ctx.types.is_subtype(self.type_id, owner) {
                return Ok(call);
            }

            self.deps
                .classify(self.ctx.types, owner, UsageKind::MemberAccess)?;
            let owner = relative_name(self.ctx.types, owner, self.type_id)?;
            return Ok(format!("{}::{}", owner, call));
        }

        let path = self.enclosing_instance_path(owner, false)?;
        if path == "this" {
            Ok(call)
        } else {
            Ok(format!("{}->{}", path, call))
        }
    }

    /// Comma-separated call arguments. Trailing variable arguments are packed into an
    /// array, null arguments to overloaded methods get the parameter type.
    pub(crate) fn lower_arguments(
        &mut self,
        method: MethodRef,
        binding: &'a MethodBinding,
        arguments: &'a [Expression],
    ) -> Result<String, TranslatorError> {
        let parameters = &binding.parameters;

        let already_packed = arguments.len() == parameters.len()
            && arguments.last().is_some_and(|last| {
                self.ctx
                    .ty(last.ty)
                    .is_ok_and(|resolved| resolved.is_array() || resolved.is_null())
            });
        let pack_varargs = binding.is_varargs && !parameters.is_empty() && !already_packed;

        let fixed = if pack_varargs {
            parameters.len() - 1
        } else {
            arguments.len()
        };

        let overloaded = self.is_overloaded(method, binding)?;
        let mut lowered = Vec::with_capacity(fixed + 1);

        for (index, argument) in arguments.iter().take(fixed).enumerate() {
            self.deps
                .classify(self.ctx.types, argument.ty, UsageKind::ImplicitConversion)?;

            let parameter = parameters.get(index).copied();
            let is_null = matches!(argument.kind, ExpressionKind::Literal(Literal::Null));

            match parameter {
                Some(parameter) if is_null && overloaded => {
                    self.deps
                        .classify(self.ctx.types, parameter, UsageKind::PointerUse)?;
                    let parameter = value_type(self.ctx.types, parameter, self.type_id)?;
                    lowered.push(format!("static_cast<{}>(nullptr)", parameter));
                }
                _ => lowered.push(self.lower_expr(argument)?),
            }
        }

        if pack_varargs {
            let Some(array_type) = parameters.last().copied() else {
                return Err(TranslatorError::compiler_error(
                    "Variable-argument method without parameters",
                ));
            };
            lowered.push(self.lower_array_values(array_type, &arguments[fixed..])?);
        }

        Ok(lowered.join(", "))
    }

    // Another method of the same name and arity on the declaring type
    fn is_overloaded(&self, method: MethodRef, binding: &MethodBinding) -> Result<bool, TranslatorError> {
        let owner = self.ctx.ty(method.owner)?;
        Ok(owner.methods.iter().enumerate().any(|(index, other)| {
            index as u32 != method.index
                && other.name == binding.name
                && other.parameters.len() == binding.parameters.len()
        }))
    }

    fn lower_new(
        &mut self,
        outer: Option<&'a Expression>,
        class: TypeId,
        constructor: Option<MethodRef>,
        arguments: &'a [Expression],
        anonymous: Option<&'a TypeDeclaration>,
    ) -> Result<String, TranslatorError> {
        if anonymous.is_some() && outer.is_some() {
            return Err(TranslatorError::unsupported(
                "Anonymous classes created through an explicit outer instance",
            ));
        }

        let closures = match anonymous {
            Some(declaration) => Some(self.emit_nested_type(declaration)?),
            None if class == self.type_id => None,
            None => self.closures_of(class)?,
        };

        self.deps
            .classify(self.ctx.types, class, UsageKind::MemberAccess)?;
        let resolved = self.ctx.ty(class)?;

        let mut leading = Vec::new();
        if resolved.has_outer_instance() {
            let outer_instance = match outer {
                Some(outer) => self.lower_expr(outer)?,
                None => {
                    let Some(declaring) = resolved.declaring_class else {
                        return Err(TranslatorError::compiler_error(
                            "Outer instance required without an enclosing type",
                        ));
                    };
                    self.enclosing_instance_path(declaring, false)?
                }
            };
            leading.push(outer_instance);
        }

        let trailing = match constructor {
            Some(constructor) => {
                let binding = self.ctx.types.method(constructor)?;
                self.lower_arguments(constructor, binding, arguments)?
            }
            None => {
                let mut lowered = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    self.deps
                        .classify(self.ctx.types, argument.ty, UsageKind::ImplicitConversion)?;
                    lowered.push(self.lower_expr(argument)?);
                }
                lowered.join(", ")
            }
        };

        let class_name = relative_name(self.ctx.types, class, self.type_id)?;

        // A local type creating itself doesn't know its final closure set yet
        if class == self.type_id && self.closures.is_some() {
            let marker = self.self_closure_marker(!leading.is_empty(), !trailing.is_empty());
            return Ok(format!(
                "(new {}({}{}{}))",
                class_name,
                leading.join(", "),
                marker,
                trailing
            ));
        }

        if let Some(closures) = closures {
            leading.extend(self.closure_arguments(&closures)?);
        }
        if !trailing.is_empty() {
            leading.push(trailing);
        }

        Ok(format!("(new {}({}))", class_name, leading.join(", ")))
    }

    /// `new T[] { ... }` and bare array initializers
    pub(crate) fn lower_array_values(
        &mut self,
        array_type: TypeId,
        values: &'a [Expression],
    ) -> Result<String, TranslatorError> {
        self.deps
            .classify(self.ctx.types, array_type, UsageKind::MemberAccess)?;

        let mut lowered = vec![values.len().to_string()];
        for value in values {
            self.deps
                .classify(self.ctx.types, value.ty, UsageKind::ImplicitConversion)?;
            lowered.push(self.lower_expr(value)?);
        }

        let array_name = relative_name(self.ctx.types, array_type, self.type_id)?;
        Ok(format!("(new {}({}))", array_name, lowered.join(", ")))
    }

    fn lower_array_creation(
        &mut self,
        array_type: TypeId,
        dimensions: &'a [Expression],
        initializer: Option<&'a [Expression]>,
    ) -> Result<String, TranslatorError> {
        if let Some(values) = initializer {
            return self.lower_array_values(array_type, values);
        }

        self.deps
            .classify(self.ctx.types, array_type, UsageKind::MemberAccess)?;
        let array_name = relative_name(self.ctx.types, array_type, self.type_id)?;

        match dimensions {
            [] => Err(TranslatorError::binding_gap(
                "Array creation without dimensions or initializer",
            )),
            [length] => Ok(format!("(new {}({}))", array_name, self.lower_expr(length)?)),
            _ => self.lower_multi_dimensional_array(array_type, dimensions),
        }
    }

    // Allocates every given dimension inside an immediately invoked lambda, so each
    // dimension expression is evaluated once
    fn lower_multi_dimensional_array(
        &mut self,
        array_type: TypeId,
        dimensions: &'a [Expression],
    ) -> Result<String, TranslatorError> {
        let mut statements = Vec::new();
        let mut lengths = Vec::with_capacity(dimensions.len());

        for dimension in dimensions {
            let length = self.next_temp_identifier("length");
            statements.push(format!("int32_t {} = {};", length, self.lower_expr(dimension)?));
            lengths.push(length);
        }

        let array = self.next_temp_identifier("array");
        let array_name = relative_name(self.ctx.types, array_type, self.type_id)?;
        statements.push(format!("auto {} = new {}({});", array, array_name, lengths[0]));

        if let Some(fill) = self.fill_dimension(0, array_type, &array, &lengths)? {
            statements.push(fill);
        }
        statements.push(format!("return {};", array));

        Ok(format!("([&]() {{ {} }})()", statements.join(" ")))
    }

    fn fill_dimension(
        &mut self,
        level: usize,
        array_type: TypeId,
        array: &str,
        lengths: &[String],
    ) -> Result<Option<String>, TranslatorError> {
        if level + 1 >= lengths.len() {
            return Ok(None);
        }

        let TypeKind::Array { component } = self.ctx.ty(array_type)?.kind else {
            return Err(TranslatorError::binding_gap(
                "Array creation has more dimensions than its type",
            ));
        };

        self.deps
            .classify(self.ctx.types, component, UsageKind::MemberAccess)?;
        let component_name = relative_name(self.ctx.types, component, self.type_id)?;

        let index = self.next_temp_identifier("index");
        let child = self.next_temp_identifier("array");
        let inner = self
            .fill_dimension(level + 1, component, &child, lengths)?
            .map(|fill| format!("{} ", fill))
            .unwrap_or_default();

        Ok(Some(format!(
            "for (int32_t {index} = 0; {index} < {length}; ++{index}) {{ auto {child} = new {component_name}({next}); {inner}(*{array})[{index}] = {child}; }}",
            length = lengths[level],
            next = lengths[level + 1],
        )))
    }

    fn lower_assignment(
        &mut self,
        target: &'a Expression,
        operator: AssignmentOperator,
        value: &'a Expression,
    ) -> Result<String, TranslatorError> {
        self.deps
            .classify(self.ctx.types, value.ty, UsageKind::ImplicitConversion)?;
        let target_text = self.lower_assignment_target(target)?;
        let value_text = self.lower_expr(value)?;

        let is_unsigned_shift = operator == AssignmentOperator::RightShiftUnsignedAssign;
        let is_concat = operator == AssignmentOperator::PlusAssign && self.is_string(target.ty)?;
        if !is_unsigned_shift && !is_concat {
            return Ok(format!("{} {} {}", target_text, operator.token(), value_text));
        }

        // `x op= v` becomes `x = f(x, v)`, so a target with side effects is bound once first
        let (place, binding) = if is_stable_place(target) {
            (target_text, None)
        } else {
            let place = self.next_temp_identifier("place");
            let binding = format!("auto &{} = {};", place, target_text);
            (place, Some(binding))
        };

        let combined = if is_unsigned_shift {
            self.unsigned_shift(target.ty, &place, &value_text)?
        } else {
            self.classify_string()?;
            let value_text = self.join_operand(value, value_text)?;
            format!("::join({}, {})", place, value_text)
        };

        match binding {
            None => Ok(format!("{} = {}", place, combined)),
            Some(binding) => Ok(format!(
                "([&]() -> decltype(auto) {{ {} return ({} = {}); }})()",
                binding, place, combined
            )),
        }
    }

    fn lower_assignment_target(&mut self, target: &'a Expression) -> Result<String, TranslatorError> {
        match &target.kind {
            ExpressionKind::Variable(variable) => self.lower_variable(*variable),
            ExpressionKind::FieldAccess { target, field } => self.lower_field_access(target, *field),
            ExpressionKind::Parenthesized(inner) => self.lower_assignment_target(inner),
            _ => self.lower_expr(target),
        }
    }

    fn lower_infix(
        &mut self,
        result_type: TypeId,
        left: &'a Expression,
        operator: InfixOperator,
        right: &'a Expression,
        extended: &'a [Expression],
    ) -> Result<String, TranslatorError> {
        let operands = std::iter::once(left)
            .chain(std::iter::once(right))
            .chain(extended.iter())
            .collect::<Vec<_>>();

        // String concatenation folds into one variadic join call
        if operator == InfixOperator::Plus && self.is_string(result_type)? {
            self.classify_string()?;

            // Operands left of the first String still add up as numbers: 1 + 2 + "a" is "3a"
            let mut first_string = operands.len();
            for (index, operand) in operands.iter().enumerate() {
                if self.is_string(operand.ty)? {
                    first_string = index;
                    break;
                }
            }

            let folded = if first_string >= 2 { first_string } else { 0 };

            let mut lowered = Vec::with_capacity(operands.len());
            if folded > 0 {
                let mut sum = Vec::with_capacity(folded);
                for operand in operands[..folded].iter().copied() {
                    self.deps
                        .classify(self.ctx.types, operand.ty, UsageKind::ImplicitConversion)?;
                    sum.push(self.lower_expr(operand)?);
                }
                lowered.push(format!("({})", sum.join(" + ")));
            }

            for operand in operands.into_iter().skip(folded) {
                self.deps
                    .classify(self.ctx.types, operand.ty, UsageKind::ImplicitConversion)?;
                let text = self.lower_expr(operand)?;
                lowered.push(self.join_operand(operand, text)?);
            }
            return Ok(format!("::join({})", lowered.join(", ")));
        }

        let mut accumulated = self.lower_expr(left)?;
        for operand in operands.iter().skip(1).copied() {
            self.deps
                .classify(self.ctx.types, operand.ty, UsageKind::ImplicitConversion)?;
            let text = self.lower_expr(operand)?;

            accumulated = if operator == InfixOperator::RightShiftUnsigned {
                self.unsigned_shift(result_type, &accumulated, &text)?
            } else {
                format!("{} {} {}", accumulated, operator.token(), text)
            };
        }
        self.deps
            .classify(self.ctx.types, left.ty, UsageKind::ImplicitConversion)?;

        Ok(accumulated)
    }

    // Null operands need a type to pick a join overload
    fn join_operand(&mut self, operand: &Expression, text: String) -> Result<String, TranslatorError> {
        if self.ctx.ty(operand.ty)?.is_null() {
            return Ok(String::from("static_cast<::java::lang::Object *>(nullptr)"));
        }
        Ok(text)
    }

    /// `>>>` shifts the unsigned reinterpretation and converts back
    fn unsigned_shift(&self, ty: TypeId, left: &str, right: &str) -> Result<String, TranslatorError> {
        let is_long = matches!(
            self.ctx.ty(ty)?.kind,
            TypeKind::Primitive(PrimitiveCode::Long)
        );

        if is_long {
            Ok(format!(
                "static_cast<int64_t>(static_cast<uint64_t>({}) >> {})",
                left, right
            ))
        } else {
            Ok(format!(
                "static_cast<int32_t>(static_cast<uint32_t>({}) >> {})",
                left, right
            ))
        }
    }

    fn lower_cast(&mut self, target: TypeId, operand: &'a Expression) -> Result<String, TranslatorError> {
        let target_type = self.ctx.ty(target)?;
        let operand_type = self.ctx.ty(operand.ty)?;
        let operand_text = self.lower_expr(operand)?;

        if target_type.is_primitive() {
            if operand_type.is_reference() {
                return Err(TranslatorError::unsupported(
                    "Unboxing casts from a reference to a primitive type",
                ));
            }
            let target = value_type(self.ctx.types, target, self.type_id)?;
            return Ok(format!("static_cast<{}>({})", target, operand_text));
        }

        if operand_type.is_primitive() {
            return Err(TranslatorError::unsupported(
                "Boxing casts from a primitive to a reference type",
            ));
        }

        if operand_type.is_null() {
            self.deps
                .classify(self.ctx.types, target, UsageKind::PointerUse)?;
            let target = value_type(self.ctx.types, target, self.type_id)?;
            return Ok(format!("static_cast<{}>({})", target, operand_text));
        }

        self.deps
            .classify(self.ctx.types, target, UsageKind::MemberAccess)?;
        self.deps
            .classify(self.ctx.types, operand.ty, UsageKind::MemberAccess)?;
        let target = value_type(self.ctx.types, target, self.type_id)?;
        // Downcasts through virtual bases need the runtime check, a failed one yields nullptr
        Ok(format!("dynamic_cast<{}>({})", target, operand_text))
    }

    // Branches of a conditional with different reference types meet at the result type
    fn lower_branch_value(
        &mut self,
        result_type: TypeId,
        branch: &'a Expression,
    ) -> Result<String, TranslatorError> {
        let text = self.lower_expr(branch)?;
        let result = self.ctx.ty(result_type)?;
        let branch_type = self.ctx.ty(branch.ty)?;

        if !result.is_reference() || !branch_type.is_reference() || branch.ty == result_type {
            return Ok(text);
        }

        self.deps
            .classify(self.ctx.types, branch.ty, UsageKind::ImplicitConversion)?;
        self.deps
            .classify(self.ctx.types, result_type, UsageKind::PointerUse)?;
        let result = value_type(self.ctx.types, result_type, self.type_id)?;
        Ok(format!("static_cast<{}>({})", result, text))
    }

    fn lower_type_literal(&mut self, literal_type: TypeId) -> Result<String, TranslatorError> {
        if let TypeKind::Primitive(code) = self.ctx.ty(literal_type)?.kind {
            let Some(box_type) = self.ctx.types.lookup(code.box_class_name()) else {
                return Err(TranslatorError::binding_gap(format!(
                    "{} is needed for {}.class but is missing from the type table",
                    code.box_class_name(),
                    code.keyword()
                )));
            };

            self.deps
                .classify(self.ctx.types, box_type, UsageKind::MemberAccess)?;
            let box_name = relative_name(self.ctx.types, box_type, self.type_id)?;
            return Ok(format!("{}::{}", box_name, field_name("TYPE")));
        }

        self.deps
            .classify(self.ctx.types, literal_type, UsageKind::MemberAccess)?;
        let class_name = relative_name(self.ctx.types, literal_type, self.type_id)?;
        Ok(format!("{}::class_()", class_name))
    }

    /// Generic members are erased to their bound. Reads that the front end typed more
    /// precisely than the declaration get a checked cast.
    fn erasure_cast(
        &mut self,
        lowered: String,
        declared: TypeId,
        expected: TypeId,
    ) -> Result<String, TranslatorError> {
        if declared == expected {
            return Ok(lowered);
        }

        let declared_type = self.ctx.ty(declared)?;
        let expected_type = self.ctx.ty(expected)?;
        if !declared_type.is_reference()
            || !expected_type.is_reference()
            || self.ctx.types.is_subtype(declared, expected)
        {
            return Ok(lowered);
        }

        self.deps
            .classify(self.ctx.types, expected, UsageKind::MemberAccess)?;
        self.deps
            .classify(self.ctx.types, declared, UsageKind::MemberAccess)?;
        let expected = value_type(self.ctx.types, expected, self.type_id)?;
        Ok(format!("dynamic_cast<{}>({})", expected, lowered))
    }
}

pub(crate) fn int_literal(value: i32) -> String {
    if value == i32::MIN {
        String::from("(-2147483647 - 1)")
    } else {
        value.to_string()
    }
}

pub(crate) fn long_literal(value: i64) -> String {
    if value == i64::MIN {
        String::from("(-9223372036854775807ll - 1)")
    } else {
        format!("int64_t({}ll)", value)
    }
}

pub(crate) fn float_literal(value: f32) -> String {
    if value.is_nan() {
        String::from("std::numeric_limits<float>::quiet_NaN()")
    } else if value.is_infinite() {
        let sign = if value < 0.0 { "-" } else { "" };
        format!("{}std::numeric_limits<float>::infinity()", sign)
    } else {
        format!("{:?}f", value)
    }
}

pub(crate) fn double_literal(value: f64) -> String {
    if value.is_nan() {
        String::from("std::numeric_limits<double>::quiet_NaN()")
    } else if value.is_infinite() {
        let sign = if value < 0.0 { "-" } else { "" };
        format!("{}std::numeric_limits<double>::infinity()", sign)
    } else {
        format!("{:?}", value)
    }
}

/// Printable ASCII as a wide character literal, everything else by code
pub(crate) fn char_literal(value: u16) -> String {
    match value {
        0x27 => String::from("L'\\''"),
        0x5c => String::from("L'\\\\'"),
        0x20..=0x7e => format!("L'{}'", value as u8 as char),
        _ => format!("wchar_t({})", value),
    }
}

/// Java strings become runtime strings built from a wide literal
pub(crate) fn string_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 2);

    for c in value.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '?' => escaped.push_str("\\?"),
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                escaped.push_str(&format!("\\{:03o}", c as u32));
            }
            c if (c as u32) < 0x80 => escaped.push(c),
            c if (c as u32) < 0xa0 => escaped.push_str(&format!("\\{:03o}", c as u32)),
            c if (c as u32) <= 0xffff => escaped.push_str(&format!("\\u{:04x}", c as u32)),
            c => escaped.push_str(&format!("\\U{:08x}", c as u32)),
        }
    }

    format!("::lit(L\"{}\")", escaped)
}

/// Initializer text of a compile-time constant field
pub(crate) fn constant_literal(constant: &ConstantValue) -> String {
    match constant {
        ConstantValue::Boolean(value) => value.to_string(),
        ConstantValue::Byte(value) => value.to_string(),
        ConstantValue::Short(value) => value.to_string(),
        ConstantValue::Char(value) => char_literal(*value),
        ConstantValue::Int(value) => int_literal(*value),
        ConstantValue::Long(value) => long_literal(*value),
        ConstantValue::Float(value) => float_literal(*value),
        ConstantValue::Double(value) => double_literal(*value),
        ConstantValue::String(value) => string_literal(value),
    }
}

// Targets whose lowering can be repeated without evaluating anything twice
fn is_stable_place(target: &Expression) -> bool {
    match &target.kind {
        ExpressionKind::Variable(_)
        | ExpressionKind::This { .. }
        | ExpressionKind::TypeName(_)
        | ExpressionKind::SuperFieldAccess { .. }
        | ExpressionKind::Literal(_) => true,
        ExpressionKind::FieldAccess { target, .. } => is_stable_place(target),
        ExpressionKind::ArrayAccess { array, index } => is_stable_place(array) && is_stable_place(index),
        ExpressionKind::Parenthesized(inner) => is_stable_place(inner),
        _ => false,
    }
}
