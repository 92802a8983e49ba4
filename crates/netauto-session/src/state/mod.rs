//! Parsers turning device state replies into the intent model.

pub mod eos;
pub mod ocnos;
