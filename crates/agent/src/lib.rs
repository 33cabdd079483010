//! The conversation loop for Rapport.
//!
//! A session runs in one logical thread of control:
//!
//! 1. **Load** the profile and compact it if anything is known
//! 2. **Ask** an opening question (contextual, or the fallback on first meeting)
//! 3. **Extract** whatever the answer reveals and merge it into the narrative
//! 4. **Persist**, summarizing first once the narrative outgrows its threshold
//! 5. **Ask** about a new topic and go back to step 3
//!
//! The loop ends on an exit keyword or end of input, saving the profile.

pub mod driver;
pub mod gateway;
pub mod interviewer;
pub mod keeper;
pub mod policy;

#[cfg(test)]
mod test_helpers;

pub use driver::{Console, ConversationDriver, SessionEnd, SessionOutcome};
pub use gateway::{StructuredGateway, parse_structured};
pub use interviewer::{Extraction, Interviewer};
pub use keeper::ProfileKeeper;
pub use policy::{Summarizer, merge};
