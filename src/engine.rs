//! Template parsing and filter execution engine.
//!
//! The engine is split into focused submodules under `src/engine/`; this file
//! only wires them together and re-exports the public names.
//!
//! ## How the parts work together
//!
//! ```text
//! template ── scan_and_replace (scanner.rs) ───────────────────────────┐
//!               - one regex per placeholder                            │
//!               - escape check, cursor past each splice                │
//!               │                                                      │
//!               v                                                      │
//!        Placeholder { prefix, name, chain, suffix }                   │
//!               │   chain text ── parse_chain (chain.rs)               │
//!               │                   └─ parse_args (args.rs)            │
//!               │                        └─ tag/untag (tagger.rs)      │
//!               v                                                      │
//!        execute (executor.rs)                                         │
//!          - Resolver (resolve.rs): registry, dynamic source, ops      │
//!          - priority order, merged Args (context.rs)                  │
//!          - error / empty policies (policy.rs)                        │
//!               │                                                      │
//!               v                                                      │
//!        prefix + rendered value + suffix ─────────── spliced back ────┘
//! ```
//!
//! ## Responsibilities by module
//!
//! - `tagger.rs`: bracket depth markers so a regex can see whole literals.
//! - `args.rs`: typed argument slots, with unset slots kept distinct.
//! - `chain.rs`: splits `| f(..) | g` into calls.
//! - `scanner.rs`: placeholder grammar and in-place substitution.
//! - `definition.rs`: `FilterDef`, its builder and the handler types.
//! - `context.rs`: `Args` and the per-chain `FilterContext`.
//! - `policy.rs`: `Behavior` and its translation into chain flow.
//! - `resolve.rs`: name to definition lookup.
//! - `executor.rs`: runs one chain and wraps the result.
//!
//! ## Debugging
//!
//! Every stage logs through `tracing`: unknown filters and failures at
//! `debug`, individual filter runs at `trace`, failing policy handlers at
//! `warn`.

#[path = "engine/args.rs"]
mod args;
#[path = "engine/chain.rs"]
mod chain;
#[path = "engine/context.rs"]
mod context;
#[path = "engine/definition.rs"]
mod definition;
#[path = "engine/executor.rs"]
mod executor;
#[path = "engine/policy.rs"]
mod policy;
#[path = "engine/resolve.rs"]
mod resolve;
#[path = "engine/scanner.rs"]
mod scanner;
#[path = "engine/tagger.rs"]
mod tagger;

pub use args::parse_args;
pub use chain::parse_chain;
pub use context::{Args, FilterContext};
pub use definition::{
    Defaults, EmptyHandler, ErrorHandler, FilterBuilder, FilterDef, FilterLookup, GetFilter, IsEmpty, Transform,
};
pub use policy::Behavior;
pub use scanner::{has_interpolation, parse_template};
pub use tagger::{tag, tag_pairs, untag, untag_pairs};

pub(crate) use executor::execute;
pub(crate) use resolve::Resolver;
pub(crate) use scanner::{ScanMode, scan_and_replace};
