pub mod constants;
pub mod frame;
pub mod observation;
pub mod stream_info;
