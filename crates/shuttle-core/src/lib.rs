//! shuttle-core
//!
//! Filesystem-backed job queue: a task's lifecycle stage is the directory it
//! lives in, and every transition is a single rename.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, stage, task, result, status）
//! - **ports**: 抽象化レイヤー（TaskStore, DeleteRequestQueue, Executor, Clock, IdGenerator）
//! - **impls**: 実装（FsTaskStore, FsDeleteRequests, ContainerExecutor, InMemory*）
//! - **app**: アプリケーションロジック（submission, status, delete, runner, builder）
//! - **config**: 設定（TOML）
//! - **observability**: stage ごとの件数

pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod impls;
pub mod observability;
pub mod ports;

pub use app::{App, AppBuilder, TaskRunner};
pub use config::Settings;
pub use error::{Result, ShuttleError};
