// Business domains
pub mod posts;
pub mod runs;
pub mod topics;
