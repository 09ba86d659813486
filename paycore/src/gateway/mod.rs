mod effect;
mod mock;
mod outcome;

pub use effect::GatewayEffect;
pub use mock::{ScriptedGateway, ScriptedOutcome, SimulatedGateway, SimulatedGatewayParams};
pub use outcome::{ErrorKind, Outcome};
