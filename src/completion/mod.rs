//! Query completion core.
//!
//! Three cooperating pieces, all pure with respect to their inputs:
//!
//! - [`classifier`]: (query text, cursor) to [`ParsedQuery`], deciding
//!   which grammatical slot the cursor sits in.
//! - [`SuggestionEngine`]: [`ParsedQuery`] to ranked [`Suggestion`]s,
//!   drawing on the static registry and the server capability snapshot.
//! - [`apply`]: splicing an accepted suggestion back into the text.
//!
//! The same core backs the one-shot CLI subcommands and the interactive
//! console; neither adds completion logic of its own.

mod apply;
mod classifier;
mod context;
mod engine;

pub use apply::apply_suggestion;
pub use classifier::classify;
pub use context::{AppliedEdit, ParsedQuery, QueryContext, Suggestion, SuggestionCategory};
pub use engine::SuggestionEngine;

pub(crate) use apply::{insertion_text, replace_start};
