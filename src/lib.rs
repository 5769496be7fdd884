pub mod config;
pub mod constants;
pub mod controller;
pub mod error;
pub mod flow;
pub mod geo;
pub mod loader;
pub mod math_utils;
pub mod particle;
pub mod render;

pub use config::FlowConfig;
pub use controller::{ControllerProps, FrameId, FrameScheduler, InteractionController, QueuedScheduler};
pub use error::{FlowError, FlowResult};
