mod listener;

pub use listener::ListenCommand;
