//! Agent layer: personas, intent routing, and request dispatch.
//!
//! A request flows through three stages:
//!
//! 1. [`router::route`] picks a persona role from the newest user
//!    message (or an explicit override skips routing entirely)
//! 2. [`persona::PersonaCatalog`] resolves the role to a prompt, model,
//!    and temperature
//! 3. [`dispatcher::Dispatcher`] drives the completion provider through
//!    bounded tool rounds and produces the final answer

pub mod dispatcher;
pub mod persona;
pub mod router;

pub use dispatcher::{ChatEvent, ChatOutcome, ChatStream, Dispatcher, MAX_TOOL_ROUNDS};
pub use persona::{AgentRole, PersonaCatalog, PersonaConfig};
pub use router::route;
