mod task;

pub use task::{now_rfc3339, parse_timestamp, DeleteAck, ListTasks, OverdueQuery, Task, UpdateTask};
