//! REST client for the partsbay marketplace backend.
//!
//! The storefront, vendor and admin screens all talk to the backend through
//! one uniform CRUD contract: list/get/create/update/delete over named
//! resources, with pagination, sorting and filtering. This crate is that
//! contract. [`PartsbayClient`] maps resource names to endpoints, attaches the
//! bearer token from the injected session store, normalizes the backend's two
//! list body shapes into one envelope, and picks a JSON or multipart request
//! body from the draft's declared field types.
//!
//! There is deliberately no retry, backoff or implicit token refresh here;
//! callers decide how to react to a failure.

pub mod client;
pub mod error;
pub mod resources;
pub mod types;

pub use client::{api_base_url, PartsbayClient, API_URL_ENV, DEFAULT_API_URL};
pub use error::{ConnectError, Result};
pub use types::{
    FileUpload, ListPage, ListQuery, Record, RecordDraft, RecordId, Role, SortOrder,
};
