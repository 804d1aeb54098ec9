pub mod access_service;
pub mod auth;
pub mod evaluation_service;
pub mod kpi_service;
pub mod org_service;
pub mod round_service;
