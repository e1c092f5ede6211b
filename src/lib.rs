#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_self)]
#![allow(clippy::cast_possible_truncation)]

//! # Brandflow
//!
//! Staged brand-consulting generation: diagnosis, naming, concept, story and
//! logo, one stage per invocation.
//!
//! Each invocation takes the answers for the current step plus whatever the
//! previous steps returned, asks a generative backend for output, and hands
//! back three ranked candidates (one analysis for step 1) together with the
//! context the caller must pass forward.
//!
//! ## Quick Start
//!
//! ```bash
//! # Step 1: diagnosis
//! echo '{"user_input": {"q1": "A neighbourhood bakery"}}' | brandflow invoke --step 1
//!
//! # Step 2: naming, carrying the diagnosis forward
//! brandflow invoke --step 2 --input naming.json
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
// Allow common patterns that are intentional in this codebase
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::significant_drop_tightening)]
#![allow(clippy::map_unwrap_or)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::redundant_clone)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::use_self)]

pub mod ai;
pub mod core;
pub mod workflow;

pub use ai::{AIError, DisabledRenderer, GenerationManager, Generator, LogoRenderer};
#[cfg(feature = "ai")]
pub use ai::{ClaudeProvider, OllamaProvider, OpenAIProvider};
pub use core::{Config, FileStore, MemoryStore, ResultStore};
pub use workflow::{route, Stage, StageResponse, WorkflowError, WorkflowRunner};
