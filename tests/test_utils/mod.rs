#![allow(dead_code, unused_imports)]

pub mod mock_seq;

pub use mock_seq::{CapturedRequest, MockResponse, spawn_seq_server};
