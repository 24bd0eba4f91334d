//! 节拍器
//!
//! 用绝对时间锚点消除累积漂移：每个周期把锚点前移一格，再睡到
//! 锚点为止。某一拍超时只丢当拍，不会在后续拍里补发。

use std::time::{Duration, Instant};

use tracing::warn;

/// 固定周期节拍器
///
/// 创建即锚定当前时刻。每次 [`wait`](Metronome::wait) 返回时恰好
/// 跨过一个周期边界；调用之间的耗时会从睡眠时间里自动扣除。
#[derive(Debug)]
pub struct Metronome {
    period: Duration,
    next_tick: Instant,
}

impl Metronome {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_tick: Instant::now(),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// 睡到下一个锚点
    ///
    /// 超时（本拍工作量超过周期）时告警并把锚点重置到当前时刻，
    /// 避免错过的拍子堆积成突发。
    pub fn wait(&mut self) {
        self.next_tick += self.period;

        let now = Instant::now();
        if self.next_tick > now {
            spin_sleep::sleep(self.next_tick - now);
        } else {
            warn!(
                "Tick overrun: fell behind by {:?} (period {:?}), re-anchoring",
                now.duration_since(self.next_tick),
                self.period
            );
            self.next_tick = now;
        }
    }
}
