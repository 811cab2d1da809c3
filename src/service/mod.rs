pub mod application_service;
pub mod error;
pub mod escrow_service;
pub mod gig_service;
pub mod mining_service;
pub mod profile_service;
pub mod storage_service;
pub mod wallet_service;
