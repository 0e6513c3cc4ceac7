pub mod value;
pub mod environment;
pub mod builtins;
pub mod interpreter;
