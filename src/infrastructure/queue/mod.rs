mod jobs;

pub use jobs::{
    keys, queues, EmbedJdJob, JobStatusRecord, QueueJobStatus, RESULT_TTL_SECONDS,
};
