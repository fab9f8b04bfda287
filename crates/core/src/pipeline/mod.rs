pub mod dispatcher;
pub mod infrastructure;
pub mod observation_reporter;
pub mod pipeline_logger;
pub mod stream_executor;
pub mod watch_stream_use_case;
