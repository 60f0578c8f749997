pub mod canceller;
pub mod observer;
