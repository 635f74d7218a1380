//! Room registry implementations.
//!
//! ## 実装
//!
//! - `inmemory`: HashMap を使ったプロセス内実装
//! - 将来的に: 複数プロセス間で共有するブローカー実装

pub mod inmemory;

pub use inmemory::InMemoryRoomRegistry;
