pub mod dispatcher;
pub mod notification;
pub mod scheduler;

pub use self::{
    dispatcher::{DispatchSettings, Dispatcher, TickReport},
    scheduler::Scheduler,
};
