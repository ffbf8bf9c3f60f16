pub mod ownership;
pub mod storage;
pub mod toggle;
