//! Background scheduling used by a [`crate::session::Session`].

mod debounce;

pub use debounce::Debouncer;
