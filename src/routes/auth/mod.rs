mod google;
mod me;
mod telegram;

pub use google::*;
pub use me::*;
pub use telegram::*;
