//! Core domain types and ports for lvhttp.
//!
//! - [`ResultState`] - the tri-state outcome delivered to callers
//! - [`Envelope`], [`BaseResponse`], [`ResponseStrategy`] - envelope
//!   verification
//! - [`RequestError`], [`ErrorKey`] - the error taxonomy
//! - [`ErrorRegistry`] - handlers keyed by error category
//! - [`LaunchSettings`] - expected code and fallback messages
//! - [`ports::MainDispatcher`] - the serialized delivery context

#![deny(unused_crate_dependencies)]

pub mod envelope;
pub mod error;
pub mod ports;
pub mod registry;
pub mod result_state;
pub mod settings;

pub use envelope::{BaseResponse, Envelope, Enveloped, ResponseStrategy, SYNTHETIC_CODE, Unwrapped};
pub use error::{CodeError, ErrorKey, RequestError, RequestResult};
pub use ports::{InlineDispatcher, MainDispatcher, MainJob};
pub use registry::{ErrorHandler, ErrorRegistry};
pub use result_state::ResultState;
pub use settings::{
    DEFAULT_EXPECTED_CODE, EXPECTED_CODE_ENV, LaunchSettings, SettingsError, validate_settings,
};
