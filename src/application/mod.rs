/// Application layer - Use cases, collectors and DTOs
///
/// This layer contains the application logic that orchestrates
/// domain services and coordinates with infrastructure through ports.
pub mod artifacts;
pub mod collectors;
pub mod dto;
pub mod pacing;
pub mod resume;
pub mod use_cases;
