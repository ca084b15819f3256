
mod array_tests;
mod dependency_tests;
mod implementation_tests;
mod name_tests;
