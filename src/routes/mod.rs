/// Router Module Index
///
/// Routes are split by who may reach them. Authentication is applied as a layer on the
/// `/protected` tree; role checks happen inside each handler through `Session::require`.

/// Sign-in, sign-up, sign-out, session lookup and health.
pub mod public;

/// Session-protected routes shared by every role, plus the visitor/adopter/trainer views.
pub mod authenticated;

/// Session-protected staff work: veterinary records, feeding, and administration.
pub mod staff;
