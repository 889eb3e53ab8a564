//! Request and response bodies.
//!
//! Field names are camelCase on the wire.

pub mod request;
pub mod response;

pub use request::{
    FirstLoginRequest, ForgotRequest, LoginRequest, ReservationQuery, ResetRequest,
    SetPasswordRequest, VerifyOtpRequest, VerifyTokenRequest,
};
pub use response::{
    ForgotResponse, HealthResponse, LoginResponse, OkResponse, VerifyTokenResponse,
};
