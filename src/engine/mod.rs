mod config;
mod context;
mod error;
mod events;
mod interpolate;
mod registry;
mod reporter;
mod result;
mod runner;
mod state;
mod store;

pub use config::{RunnerConfig, load_config_from_file, load_config_from_reader};
pub use context::RunnerContext;
pub use error::{AssertionFailure, RegistryError, RunError, StepError, assert_value_eq};
pub use events::{EngineEvent, ProgressEvent};
pub use interpolate::{InterpolationError, Interpolator, interpolate};
pub use registry::{MatchGroups, RegexStepRunner, StepHandler, StepOutcome, StepRegistry, StepRunner};
pub use reporter::{ChannelReporter, NullReporter, ProgressSink, Reporter, Reporters, TracingReporter};
pub use result::{FeatureResult, RunResult, RunSummary, ScenarioResult, StepResult, Tally};
pub use runner::FeatureRunner;
pub use state::UnitStatus;
pub use store::{StepValue, Store};
