fn main() {
    // New golden files must regenerate the tests in tests/lang.rs.
    build_deps::rerun_if_changed_paths("res/examples/**/*.rill").unwrap();
    build_deps::rerun_if_changed_paths("res/examples/**").unwrap();
}
