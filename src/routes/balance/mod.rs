mod get;
mod top_up;
mod webhook;
mod withdraw;

pub use get::*;
pub use top_up::*;
pub use webhook::*;
pub use withdraw::*;
