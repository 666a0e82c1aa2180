pub use clients::{Client, NewClientCmd};
pub use error::RegistryError;
pub use ops::{Registry, RegistryBuilder};

mod clients;
mod error;
mod ops;

type ResultRegistry<T> = Result<T, RegistryError>;
