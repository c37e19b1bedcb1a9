#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! Startup-time endpoint binder.
//!
//! Endpoint types are collected in a [`Catalog`], instantiated and validated into
//! [`EndpointDescriptor`]s, given a synthesized permission policy and bound to every
//! `(route, verb)` they declare. The [`Registrar`] runs the pass all-or-nothing; the
//! resulting [`Registration`] is turned into an `axum::Router` with
//! [`Registration::into_router`].

// Pipeline
pub mod binder;
pub mod catalog;
pub mod descriptor;
pub mod registrar;
pub mod router;
pub mod synthesizer;

pub mod errors;

// Ambient
pub mod config;
pub mod telemetry;

pub use binder::RouteBinding;
pub use catalog::{Catalog, DiscoveredEndpoint, EndpointRegistration};
pub use descriptor::{Endpoint, EndpointDescriptor, EndpointHandler};
pub use errors::{ConfigurationIssue, DiscoveryError, RegistrationError, RouterError};
pub use registrar::{Registrar, Registration};
pub use synthesizer::{PermissionMatch, PermissionPolicy, PolicySynthesizer};

pub use config::AppConfig;

#[doc(hidden)]
pub mod __private {
    pub use anyhow;
    pub use inventory;
}
