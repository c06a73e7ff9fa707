//! Domain model (IDs, stages, locations, records, results, status views).
//!
//! このモジュールはストレージにもプロセスにも依存しません。
//! ファイル名などの定数はここで定義し、ports / impls から参照します。

pub mod ids;
pub mod result;
pub mod stage;
pub mod status;
pub mod task;

pub use ids::{MAX_TASK_ID_LEN, Owner, TaskId};
pub use result::{ResultRow, ResultRows, parse_table};
pub use stage::Stage;
pub use status::TaskStatus;
pub use task::{Parameters, Task, TaskLocation, TaskRecord};
