//! Sluice - Embeddable expression language with pipe operators
//!
//! This crate re-exports all layers of the Sluice system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 2: sluice_stdlib       Standard library functions
//! Layer 1: sluice_language     Lexer, parser, compiler, bytecode VM, pipes
//! Layer 0: sluice_foundation   Core types (Value, Type, Error)
//! ```

use std::sync::{Arc, Once};

pub use sluice_foundation as foundation;
pub use sluice_language as language;
pub use sluice_stdlib as stdlib;

use sluice_language::{PipeRegistry, Vm};

static TRACING_INIT: Once = Once::new();

/// Installs a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing when `RUST_LOG` is unset. Safe to call more than once; only
/// the first call has an effect.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            let installed = tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .try_init();
            if installed.is_ok() {
                tracing::debug!("tracing initialised");
            }
        }
    });
}

/// Creates a VM with the standard functions and the built-in pipe stages.
#[must_use]
pub fn standard_vm() -> Vm {
    Vm::with_registries(
        Arc::new(sluice_stdlib::registry()),
        Arc::new(PipeRegistry::builtin()),
    )
}
