pub mod client;
pub mod handlers;
pub mod models;
pub mod session;
pub mod validation;

pub use client::{DiscoveryClient, DiscoveryError, ErrorKind};
pub use models::{
    Analysis, BackendErrorBody, Coordinates, DiscoveryRequest, DiscoveryResponse, HiddenGem,
    WeatherInfo,
};
pub use session::{SearchOutcome, SearchSession, SearchTicket, SearchView};
pub use validation::{QueryValidationError, SearchQuery};
