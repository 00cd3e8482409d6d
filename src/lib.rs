// Library for tests to access modules

pub mod config;
pub mod derive;
pub mod history;
pub mod models;
pub mod probe;
pub mod reconcile;
pub mod routes;
pub mod tier;
pub mod version;
pub mod worker;
