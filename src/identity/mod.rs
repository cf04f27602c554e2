// Identity module - who is calling
// Account addresses; key management lives outside this crate

mod address;

pub use address::{Address, AddressError};
