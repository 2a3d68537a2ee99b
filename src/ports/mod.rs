/// Ports module defining interfaces for hexagonal architecture
///
/// Only outbound (driven) ports exist: the use cases are called directly by
/// the CLI and by library users.
pub mod outbound;
