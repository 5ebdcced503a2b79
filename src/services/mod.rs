pub mod background_jobs;
pub mod comparables_service;
pub mod feed_service;
pub mod scoring;
pub mod session_service;
