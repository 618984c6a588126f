pub use crate::dep::{Dep, Subscriber, SubscriberId};
pub use crate::error::{Error, Result};
pub use crate::expr::{Expr, evaluate, parse};
pub use crate::observer::{ObserveOptions, ReactiveProp, Scope, observe, observe_with};
pub use crate::reactive::{TrackGuard, Tracker};
pub use crate::value::{Method, Object, Value};
pub use crate::watcher::{Callback, Watcher};
