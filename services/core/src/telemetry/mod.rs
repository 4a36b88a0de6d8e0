pub mod logging;

pub use logging::{init_subscriber, make_subscriber};
