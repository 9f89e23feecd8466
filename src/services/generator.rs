//! short id 生成器
//!
//! 从 `[A-Za-z0-9]` 中均匀抽取 `SHORT_ID_LEN` 个字符。每个生成器持有自己的
//! `StdRng`，固定种子即可得到可复现的序列。

use parking_lot::Mutex;
use rand::SeedableRng;
use rand::distr::{Alphanumeric, Distribution};
use rand::rngs::StdRng;

pub const SHORT_ID_LEN: usize = 8;

pub const ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

pub struct IdGenerator {
    rng: Mutex<StdRng>,
}

impl IdGenerator {
    /// 由线程随机数播种
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    /// 固定种子，测试用
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn generate(&self) -> String {
        let mut rng = self.rng.lock();
        (0..SHORT_ID_LEN)
            .map(|_| char::from(Alphanumeric.sample(&mut *rng)))
            .collect()
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// 判断字符串是否符合生成器的输出格式
pub fn is_valid_short_id(id: &str) -> bool {
    id.len() == SHORT_ID_LEN && id.bytes().all(|b| b.is_ascii_alphanumeric())
}
