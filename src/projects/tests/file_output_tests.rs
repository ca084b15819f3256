//! Tests for writing emitted units to disk.

use super::{implementation_failure, write_unit, write_units};
use crate::backends::cpp::EmittedUnit;
use crate::frontend_model::types::TypeId;
use crate::translator_messages::translator_errors::ErrorType;
use std::fs;
use std::io;
use std::path::PathBuf;

fn unit(header_path: &str, impl_path: &str) -> EmittedUnit {
    EmittedUnit {
        type_id: TypeId(0),
        qualified_name: String::from("p::Foo"),
        header_path: PathBuf::from(header_path),
        impl_path: PathBuf::from(impl_path),
        header: String::from("#pragma once\n"),
        implementation: String::from("#include \"p/Foo.h\"\n"),
        referenced_arrays: Vec::new(),
    }
}

#[test]
fn units_are_written_under_their_namespace_directories() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let units = vec![unit("p/q/Foo.h", "p/q/Foo.cpp"), unit("Bar.h", "Bar.cpp")];

    let written = write_units(dir.path(), &units).expect("units should be written");
    assert_eq!(written, 4);

    let header = fs::read_to_string(dir.path().join("p/q/Foo.h")).expect("header should exist");
    assert_eq!(header, "#pragma once\n");
    let implementation =
        fs::read_to_string(dir.path().join("p/q/Foo.cpp")).expect("implementation should exist");
    assert_eq!(implementation, "#include \"p/Foo.h\"\n");
    assert!(dir.path().join("Bar.h").is_file());
}

#[test]
fn rewriting_a_unit_replaces_the_previous_files() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let mut emitted = unit("p/Foo.h", "p/Foo.cpp");
    write_unit(dir.path(), &emitted).expect("first write should succeed");

    emitted.header = String::from("// second\n");
    write_unit(dir.path(), &emitted).expect("second write should succeed");

    let header = fs::read_to_string(dir.path().join("p/Foo.h")).expect("header should exist");
    assert_eq!(header, "// second\n");

    // Staged temporary files never stay behind
    let leftovers = fs::read_dir(dir.path().join("p"))
        .expect("directory should exist")
        .count();
    assert_eq!(leftovers, 2);
}

#[test]
fn failed_implementation_removes_the_header() {
    let dir = tempfile::tempdir().expect("temp dir should be created");

    // A directory where the implementation file should go makes the persist fail
    fs::create_dir_all(dir.path().join("p/Foo.cpp/blocked")).expect("blocker should be created");

    let error = write_unit(dir.path(), &unit("p/Foo.h", "p/Foo.cpp"))
        .expect_err("implementation write should fail");
    assert_eq!(error.error_type, ErrorType::File);
    assert!(!dir.path().join("p/Foo.h").exists());
}

#[test]
fn failed_header_cleanup_is_reported() {
    let persist_error = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
    let header = PathBuf::from("out/p/Foo.h");
    let implementation = PathBuf::from("out/p/Foo.cpp");

    let error = implementation_failure(
        &implementation,
        &header,
        &persist_error,
        Err(io::Error::new(io::ErrorKind::NotFound, "gone")),
    );
    assert_eq!(error.error_type, ErrorType::File);
    assert_eq!(error.path, Some(implementation.clone()));
    assert!(error.msg.contains("denied"));
    assert!(error.msg.contains("Foo.h could not be removed"));
    assert!(error.msg.contains("gone"));

    let error = implementation_failure(&implementation, &header, &persist_error, Ok(()));
    assert!(!error.msg.contains("could not be removed"));
}
