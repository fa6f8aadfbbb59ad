mod store;

pub use store::{DashboardState, TabState, TabStore, ViewId};
