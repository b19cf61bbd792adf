pub mod sandbox;

pub use sandbox::Sandbox;
