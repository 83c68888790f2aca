pub mod client;

pub use client::{PublishRequest, RESULT_SUCCESS, RegistrarApi, RegistrarClient};
