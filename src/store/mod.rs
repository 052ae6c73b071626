//! Host-side state store.
//!
//! `StateStore` is the application's central state tree: a registry of
//! named modules. Each module holds a [`Container`] of string-keyed
//! JSON values plus derived getters, with subscriber notification on
//! every mutation.

mod store;

pub use store::{AlreadyRegistered, Container, Getter, ModuleState, StateStore};
