//! 仿真端口
//!
//! 把方向/脉冲操作记成带时间戳的事件流，test 与 `kerf run`
//! 的干跑模式都靠它观察发生器的真实输出。可选的 dwell 模拟
//! 真实端口里脉冲的电平保持时间。

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::{Axis, Direction, MotionPort};

/// 端口上发生过的一次操作
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PortEvent {
    Direction {
        axis: Axis,
        direction: Direction,
        at: Instant,
    },
    Pulse {
        axis: Axis,
        at: Instant,
    },
}

/// 事件日志的共享句柄
///
/// 端口本体会被移交给脉冲发生器的节拍线程，观察方持有克隆的
/// 句柄即可在外部读取事件。
#[derive(Debug, Clone, Default)]
pub struct SimLog {
    events: Arc<Mutex<Vec<PortEvent>>>,
}

impl SimLog {
    /// 事件快照（按发生顺序）
    pub fn events(&self) -> Vec<PortEvent> {
        self.events.lock().clone()
    }

    /// 某轴累计的脉冲数
    pub fn pulse_count(&self, axis: Axis) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|event| matches!(event, PortEvent::Pulse { axis: a, .. } if *a == axis))
            .count()
    }

    /// 某轴每个脉冲的时间戳（按发生顺序）
    pub fn pulse_instants(&self, axis: Axis) -> Vec<Instant> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                PortEvent::Pulse { axis: a, at } if *a == axis => Some(*at),
                _ => None,
            })
            .collect()
    }

    /// 某轴最后一次设定的方向
    pub fn last_direction(&self, axis: Axis) -> Option<Direction> {
        self.events
            .lock()
            .iter()
            .rev()
            .find_map(|event| match event {
                PortEvent::Direction {
                    axis: a, direction, ..
                } if *a == axis => Some(*direction),
                _ => None,
            })
    }

    /// 某轴是否在第一个脉冲之前就设好了方向
    ///
    /// 没有脉冲的轴视为满足；有脉冲却从未设方向的轴视为违约。
    pub fn direction_set_before_pulses(&self, axis: Axis) -> bool {
        for event in self.events.lock().iter() {
            match event {
                PortEvent::Direction { axis: a, .. } if *a == axis => return true,
                PortEvent::Pulse { axis: a, .. } if *a == axis => return false,
                _ => {},
            }
        }
        true
    }
}

/// 仿真步进端口
#[derive(Debug)]
pub struct SimPort {
    log: SimLog,
    dwell: Duration,
}

impl SimPort {
    pub fn new() -> Self {
        Self::with_dwell(Duration::ZERO)
    }

    /// 带电平保持时间的端口：每个脉冲返回前额外停留 `dwell`
    pub fn with_dwell(dwell: Duration) -> Self {
        Self {
            log: SimLog::default(),
            dwell,
        }
    }

    /// 观察端口输出用的日志句柄
    pub fn log(&self) -> SimLog {
        self.log.clone()
    }
}

impl Default for SimPort {
    fn default() -> Self {
        Self::new()
    }
}

impl MotionPort for SimPort {
    fn set_direction(&mut self, axis: Axis, direction: Direction) {
        self.log.events.lock().push(PortEvent::Direction {
            axis,
            direction,
            at: Instant::now(),
        });
    }

    fn pulse(&mut self, axis: Axis) {
        self.log.events.lock().push(PortEvent::Pulse {
            axis,
            at: Instant::now(),
        });
        // 锁已释放，保持时间不占用日志锁
        if !self.dwell.is_zero() {
            spin_sleep::sleep(self.dwell);
        }
    }
}
