//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせてアプリケーションロジックを実装します。
//!
//! # 主要コンポーネント
//! - **AppBuilder**: アプリケーションの構築とワイヤリング
//! - **SubmissionService**: タスクの投入（producer 側）
//! - **StatusService**: ステータスクエリと完了待ち（producer 側）
//! - **DeleteChannel**: 削除リクエストの受付（producer 側）と取り出し（runner 側）
//! - **TaskRunner**: タスク実行ループ（runner 側）

pub mod builder;
pub mod delete;
pub mod runner;
pub mod status;
pub mod submission;

// 主要な型を再エクスポート
pub use self::builder::{App, AppBuilder};
pub use self::delete::DeleteChannel;
pub use self::runner::{Iteration, TaskRunner};
pub use self::status::StatusService;
pub use self::submission::{SubmissionService, SubmitReceipt, SubmitRequest};
