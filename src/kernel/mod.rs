pub(crate) mod context;
mod dispatcher;
mod error;
mod pcb;
mod pcb_manager;

use context::Context;
use dispatcher::{Dispatcher, Operation};
use error::KernelError;
use pcb::{DispatchingState, ExecutionState, Pcb, PcbId, ProcessClass};
use pcb_manager::{PcbManager, QueueId};

pub mod driver;

pub use driver::Driver;
