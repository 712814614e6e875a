// Main integration test file that includes all test modules

mod integration {
    pub mod engine_tests;
    pub mod import_tests;
    pub mod scan_tests;
}

mod helpers {
    pub mod test_harness;
}
