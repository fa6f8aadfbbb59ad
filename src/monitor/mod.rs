mod refresher;

pub use refresher::{Refresher, RENEWING_MESSAGE};
