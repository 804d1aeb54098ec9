pub mod auth;
pub mod companies;
pub mod evaluations;
pub mod kpis;
pub mod people;
pub mod public;
pub mod rounds;
