//! paygate-fixtures: spreadsheet test cases to gateway request fixtures.
//!
//! Reads payment test cases from an Excel workbook, maps each row to a
//! gateway-specific JSON request payload, writes fixtures into a
//! taxonomy-encoding directory tree, and assembles Postman Collection
//! v2.1.0 documents from them.

pub mod currency;
pub mod description;
pub mod excel;
pub mod fixture;
pub mod gateway;
pub mod mapper;
pub mod paths;
pub mod postman;
pub mod report;
pub mod row;
pub mod runner;
