//! 服务层：short id 生成器与短链接服务

pub mod generator;
mod shortener;

pub use generator::{ALPHABET, IdGenerator, SHORT_ID_LEN, is_valid_short_id};
pub use shortener::{DEFAULT_MAX_ATTEMPTS, LinkShortener, ShortenOutcome};
