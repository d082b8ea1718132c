//! Integration test suites, one module per API surface

mod assets_tests;
mod audit_tests;
mod auth_tests;
mod change_requests_tests;
mod custom_fields_tests;
mod health_tests;
mod inventory_tests;
mod organizations_tests;
mod projects_tests;
mod settings_tests;
mod tickets_tests;
