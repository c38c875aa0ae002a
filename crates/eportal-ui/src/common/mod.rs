mod task;

pub use task::{TaskId, TaskSeq, TaskState, Tasks};
