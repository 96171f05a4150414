#![forbid(unsafe_code)]

pub mod gateway;
pub mod http;

pub use gateway::{
    ConjugationCatalog, ConjugationDrillGateway, GatewayError, InMemoryGateway, OptionsGateway,
    WordCatalog, WordDrillGateway,
};
pub use http::HttpGateway;
