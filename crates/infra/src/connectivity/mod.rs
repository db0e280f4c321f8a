//! HTTP implementation of the connectivity probe port.

pub mod probe;

pub use probe::HttpConnectivityProbe;
