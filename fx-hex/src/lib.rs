//! # FX Hex
//!
//! Application service layer, refresh scheduler and HTTP adapter for the
//! exchange rate refresh service.
//!
//! ## Architecture
//!
//! - `service` - Rate update service (batch refresh, offsets, ad-hoc rates)
//! - `scheduler` - Periodic driver for the batch refresh
//! - `inbound` - HTTP adapter (Axum server)
//! - `openapi` - OpenAPI document served by the adapter
//!
//! The service is generic over `R: ExchangeRateRepository`, allowing
//! different repository implementations to be injected.

pub mod inbound;
pub mod openapi;
pub mod scheduler;
pub mod service;


pub use scheduler::RefreshScheduler;
pub use service::RateUpdateService;
