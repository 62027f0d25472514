mod error;
mod routes;

pub use routes::router;
