use j2cpp::Translator;
use j2cpp::frontend_model::program::{CompilationUnit, Program};
use j2cpp::frontend_model::syntax::{
    Block, BodyDeclaration, Expression, ExpressionKind, FieldDeclaration, Literal,
    MethodDeclaration, Statement, TypeDeclaration, VariableFragment,
};
use j2cpp::frontend_model::types::{
    MethodBinding, MethodRef, Modifiers, PrimitiveCode, ResolvedType, TypeId, TypeTable,
};
use j2cpp::frontend_model::variables::{VariableBinding, VariableTable};
use j2cpp::projects::settings::Settings;
use j2cpp::translator_messages::translator_errors::ErrorType;
use std::fs;
use std::path::{Path, PathBuf};

struct Library {
    types: TypeTable,
    variables: VariableTable,
    string: TypeId,
}

// The java.lang types a translated program links against
fn library() -> Library {
    let mut types = TypeTable::new();
    let object = types.insert(ResolvedType::class("java.lang", "Object").with_modifiers(Modifiers::PUBLIC));
    let comparable = types.insert(
        ResolvedType::interface("java.lang", "Comparable").with_modifiers(Modifiers::PUBLIC),
    );
    let string = types.insert(
        ResolvedType::class("java.lang", "String")
            .with_modifiers(Modifiers::PUBLIC | Modifiers::FINAL)
            .with_superclass(object)
            .with_interfaces(vec![comparable]),
    );
    types.insert(
        ResolvedType::class("java.lang", "Class")
            .with_modifiers(Modifiers::PUBLIC | Modifiers::FINAL)
            .with_superclass(object),
    );

    Library {
        types,
        variables: VariableTable::new(),
        string,
    }
}

fn method_binding(name: &str, modifiers: u32, return_type: TypeId) -> MethodBinding {
    MethodBinding {
        name: name.to_owned(),
        modifiers: Modifiers::new(modifiers),
        is_constructor: false,
        return_type,
        parameters: Vec::new(),
        thrown: Vec::new(),
        type_parameters: Vec::new(),
        is_varargs: false,
    }
}

fn method_declaration(method: MethodRef, statements: Vec<Statement>) -> BodyDeclaration {
    BodyDeclaration::Method(MethodDeclaration {
        method,
        parameters: Vec::new(),
        body: Some(Block { statements }),
    })
}

/// `p.Greeter` with a greeting field and a method returning it wrapped in an array
fn greeter_program() -> Program {
    let Library {
        mut types,
        mut variables,
        string,
    } = library();

    let object = types.object().unwrap();
    let greeter = types.insert(
        ResolvedType::class("p", "Greeter")
            .with_modifiers(Modifiers::PUBLIC)
            .with_superclass(object),
    );
    let strings = types.intern_array(string).unwrap();

    let greeting = variables.insert(VariableBinding::field("greeting", string, greeter, Modifiers::PRIVATE));
    types.get_mut(greeter).unwrap().fields.push(greeting);
    let names = types
        .add_method(greeter, method_binding("names", Modifiers::PUBLIC, strings))
        .unwrap();

    let declaration = TypeDeclaration {
        binding: greeter,
        enum_constants: Vec::new(),
        body: vec![
            BodyDeclaration::Field(FieldDeclaration {
                fragments: vec![VariableFragment {
                    variable: greeting,
                    initializer: Some(Expression::new(
                        ExpressionKind::Literal(Literal::String(String::from("hello"))),
                        string,
                    )),
                }],
            }),
            method_declaration(
                names,
                vec![Statement::Return(Some(Expression::new(
                    ExpressionKind::ArrayCreation {
                        array_type: strings,
                        dimensions: Vec::new(),
                        initializer: Some(vec![Expression::new(ExpressionKind::Variable(greeting), string)]),
                    },
                    strings,
                )))],
            ),
        ],
    };

    let mut program = Program::new(types, variables);
    program.units.push(CompilationUnit {
        source_path: Some(String::from("src/p/Greeter.java")),
        types: vec![declaration],
    });
    program
}

fn settings_for(output_dir: &Path) -> Settings {
    Settings {
        output_dir: output_dir.to_path_buf(),
        ..Settings::default()
    }
}

#[test]
fn translates_a_program_into_a_source_tree() {
    let output_dir = tempfile::tempdir().unwrap();
    let translator = Translator::new(settings_for(output_dir.path()));

    let output = translator.translate_to_disk(&greeter_program()).unwrap();

    let headers = output
        .units
        .iter()
        .map(|unit| unit.header_path.clone())
        .collect::<Vec<_>>();
    assert_eq!(
        headers,
        vec![
            PathBuf::from("java").join("lang").join("ComparableArray.h"),
            PathBuf::from("java").join("lang").join("ObjectArray.h"),
            PathBuf::from("java").join("lang").join("StringArray.h"),
            PathBuf::from("p").join("Greeter.h"),
        ]
    );
    assert_eq!(output.file_count(), 8);

    for unit in &output.units {
        let header = output_dir.path().join(&unit.header_path);
        let implementation = output_dir.path().join(&unit.impl_path);
        assert_eq!(fs::read_to_string(&header).unwrap(), unit.header);
        assert_eq!(fs::read_to_string(&implementation).unwrap(), unit.implementation);
    }

    let greeter = fs::read_to_string(output_dir.path().join("p").join("Greeter.cpp")).unwrap();
    assert!(greeter.starts_with("// Generated from src/p/Greeter.java\n#include \"p/Greeter.h\"\n"));
    assert!(greeter.contains("    greeting_ = ::lit(L\"hello\");\n"));
    assert!(greeter.contains("    return (new ::java::lang::StringArray(1, greeting_));\n"));

    let header = fs::read_to_string(output_dir.path().join("p").join("Greeter.h")).unwrap();
    assert!(header.contains("    virtual ::java::lang::StringArray *names();\n"));
    assert!(header.contains("    ::java::lang::String *greeting_;\n"));
}

#[test]
fn repeated_runs_produce_identical_output() {
    let translator = Translator::new(Settings::default());
    let program = greeter_program();

    let first = translator.translate(&program).unwrap();
    let second = translator.translate(&program).unwrap();
    assert_eq!(first.units, second.units);
}

#[test]
fn program_documents_round_trip_through_json() {
    let program = greeter_program();
    let document = program.to_json().unwrap();
    let reloaded = Program::from_json(&document).unwrap();

    assert_eq!(reloaded.units, program.units);
    assert_eq!(reloaded.types.lookup("p.Greeter"), program.types.lookup("p.Greeter"));

    let translator = Translator::new(Settings::default());
    assert_eq!(
        translator.translate(&reloaded).unwrap().units,
        translator.translate(&program).unwrap().units
    );
}

#[test]
fn malformed_documents_are_input_errors() {
    let error = Program::from_json("{ \"types\": 3 }").unwrap_err();
    assert_eq!(error.error_type, ErrorType::Input);
}

#[test]
fn every_failing_type_is_reported() {
    let Library {
        mut types,
        variables,
        ..
    } = library();

    let object = types.object().unwrap();
    let int = types.primitive(PrimitiveCode::Int).unwrap();
    let mut units = Vec::new();

    for name in ["First", "Second"] {
        let class = types.insert(
            ResolvedType::class("p", name)
                .with_modifiers(Modifiers::PUBLIC)
                .with_superclass(object),
        );
        let boxed = types
            .add_method(class, method_binding("boxed", Modifiers::PUBLIC, object))
            .unwrap();

        let boxing = Expression::new(
            ExpressionKind::Cast {
                target: object,
                operand: Box::new(Expression::new(ExpressionKind::Literal(Literal::Int(1)), int)),
            },
            object,
        );

        units.push(CompilationUnit {
            source_path: None,
            types: vec![TypeDeclaration {
                binding: class,
                enum_constants: Vec::new(),
                body: vec![method_declaration(boxed, vec![Statement::Return(Some(boxing))])],
            }],
        });
    }

    let mut program = Program::new(types, variables);
    program.units = units;

    let errors = Translator::new(Settings::default())
        .translate(&program)
        .unwrap_err();

    let mut failed = errors
        .iter()
        .map(|error| {
            assert_eq!(error.error_type, ErrorType::UnsupportedConstruct);
            error.type_name.clone().unwrap_or_default()
        })
        .collect::<Vec<_>>();
    failed.sort();
    assert_eq!(failed, vec![String::from("p.First"), String::from("p.Second")]);
}
