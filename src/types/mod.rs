pub use self::{
    event::{
        CreatedResponse, DeletedResponse, EventRequest, MonthQuery,
        DATE_FORMAT, TIME_FORMAT,
    },
    push::{
        Claims, PushHeader, PushPayload, SubscriptionKeys,
        SubscriptionRequest, Urgency,
    },
};

mod event;
mod push;
