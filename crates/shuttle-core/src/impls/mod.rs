//! Impls - ports の実装
//!
//! # 本番用
//! - **FsTaskStore**: ディレクトリツリー
//! - **FsDeleteRequests**: `delete_requests/` のマーカーファイル
//! - **ContainerExecutor**: `docker run`
//!
//! # テスト用
//! - **InMemoryTaskStore**
//! - **InMemoryDeleteRequests**

pub mod container_executor;
pub mod fs_delete_requests;
pub mod fs_store;
pub mod inmem_delete_requests;
pub mod inmem_store;

// 主要な型を再エクスポート
pub use self::container_executor::ContainerExecutor;
pub use self::fs_delete_requests::{DELETE_REQUESTS_DIR, FsDeleteRequests};
pub use self::fs_store::FsTaskStore;
pub use self::inmem_delete_requests::InMemoryDeleteRequests;
pub use self::inmem_store::InMemoryTaskStore;
