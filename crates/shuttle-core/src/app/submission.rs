//! SubmissionService - タスクの投入
//!
//! # フロー
//! 1. 入力を検証（payload は必須）
//! 2. IdGenerator で新しい TaskId を払い出す
//! 3. 記録（TaskRecord）を組み立てる
//! 4. TaskStore::create() で Submitted に置く
//!
//! 書き込み順序（payload → record）は TaskStore 側が保証します。

use std::sync::Arc;

use serde::Serialize;

use crate::config::ServiceConfig;
use crate::domain::task::PAYLOAD_FILE;
use crate::domain::{Owner, TaskId, TaskRecord};
use crate::error::{Result, ShuttleError};
use crate::ports::{IdGenerator, TaskStore};

pub const DEFAULT_ALPHA: f64 = 0.05;
pub const DEFAULT_BETA: f64 = 0.5;

/// Validated submission input.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitRequest {
    pub payload: Option<Vec<u8>>,
    pub alpha: f64,
    pub beta: f64,
}

impl SubmitRequest {
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: Some(payload.into()),
            alpha: DEFAULT_ALPHA,
            beta: DEFAULT_BETA,
        }
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }
}

/// What the caller gets back after a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitReceipt {
    pub id: TaskId,
    /// `<namespace>/<id>`
    pub location: String,
}

pub struct SubmissionService {
    store: Arc<dyn TaskStore>,
    ids: Arc<dyn IdGenerator>,
    config: ServiceConfig,
}

impl SubmissionService {
    pub fn new(store: Arc<dyn TaskStore>, ids: Arc<dyn IdGenerator>, config: ServiceConfig) -> Self {
        Self { store, ids, config }
    }

    pub async fn submit(&self, owner: &Owner, request: SubmitRequest) -> Result<SubmitReceipt> {
        let payload = request.payload.ok_or(ShuttleError::MissingPayload)?;
        let id = self.ids.generate_task_id();

        let mut record = TaskRecord::default();
        record.insert(TaskRecord::ALPHA, request.alpha);
        record.insert(TaskRecord::BETA, request.beta);
        record.insert(TaskRecord::REMOTE_IP, owner.as_str());
        record.insert(TaskRecord::UUID, id.as_str());
        record.insert(TaskRecord::TASK_TYPE, self.config.task_type.as_str());
        record.insert(TaskRecord::INPUT_FILE, PAYLOAD_FILE);

        let location = self
            .store
            .create(owner, &id, &record, &payload)
            .await
            .inspect_err(|err| {
                tracing::error!(task_id = %id, owner = %owner, error = %err, "error creating task");
            })?;
        tracing::info!(task_id = %id, owner = %owner, path = %location, "task submitted");

        Ok(SubmitReceipt {
            location: format!("{}/{}", self.config.namespace, id),
            id,
        })
    }
}
