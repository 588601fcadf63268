pub mod routes;
pub mod signer;
pub mod wire;

pub use routes::RouteComposer;
pub use signer::RequestSigner;
