pub mod app;
pub mod config;
pub mod engine;
pub mod error;
pub mod frame;
pub mod instantiate;
pub mod logsys;
pub mod module;
pub mod platform;
pub mod registry;
pub mod schedule;
pub mod signals;
pub mod stage;
pub mod table;
pub mod telemetry;
pub mod time;
pub mod type_registry;
pub mod version;

pub use crate::app::App;
pub use crate::config::EngineConfig;
pub use crate::engine::{Engine, EngineBuilder, EngineState, Iteration};
pub use crate::error::{EngineError, EngineResult, StuckModule};
pub use crate::frame::{FrameClock, FrameContext};
pub use crate::module::{Module, Registrar};
pub use crate::platform::{HeadlessPlatform, Platform};
pub use crate::registry::{ModuleCatalog, ModuleDescriptor};
pub use crate::signals::{ShutdownFlag, StopReason};
pub use crate::stage::Stage;
pub use crate::table::{Handle, ModuleDeps, ModuleInfo, ModuleTable};
pub use crate::time::{Clock, Interval, ManualClock, SystemClock, Time, TimePoint};
pub use crate::type_registry::{TypeKey, TypeRegistry};
pub use crate::version::Version;
