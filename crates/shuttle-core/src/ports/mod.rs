//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 各 trait は外部のもの（ディレクトリツリー、コンテナ、時計）への
//! インターフェースを提供し、実装の詳細を隠蔽します。
//!
//! # 設計原則
//! - 共有ディレクトリツリーが source of truth（正本）
//! - 状態遷移は atomic rename 1 回
//! - 削除は runner 側のループに集約する（producer は依頼を置くだけ）

pub mod clock;
pub mod delete_requests;
pub mod executor;
pub mod id_generator;
pub mod task_store;

// 主要な trait を再エクスポート
pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::delete_requests::DeleteRequestQueue;
pub use self::executor::{ExecutionOutput, ExecutionRequest, Executor};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::task_store::TaskStore;
