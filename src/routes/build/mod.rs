mod add;
mod comment;
mod delete;
mod get;
mod rating;
mod update;

pub use add::*;
pub use comment::*;
pub use delete::*;
pub use get::*;
pub use rating::*;
pub use update::*;
