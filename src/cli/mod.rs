//! # CLI Module
//!
//! Command-line front end of the `faultroute` binary.
//!
//! ## Commands
//!
//! ### `check`
//!
//! Load a routing document for one environment and resolve every reporter,
//! format resolver and route controller it names against the built-in
//! components:
//!
//! ```bash
//! faultroute check --config app/errors.yaml --env live
//! ```
//!
//! ### `simulate`
//!
//! Arm a front controller with the built-ins and trigger it with one fault;
//! the committed response is printed to stdout, logs go to stderr:
//!
//! ```bash
//! faultroute simulate --config app/errors.yaml --fault app::errors::PathNotFound --message "/nope"
//! ```
//!
//! Every option falls back to the `FAULTROUTE_*` environment variables read
//! by [`RuntimeConfig`](crate::runtime_config::RuntimeConfig).

mod commands;

pub use commands::{
    builtin_registry, check, run_cli, simulate, CheckReport, Cli, Commands, TargetArgs,
};
