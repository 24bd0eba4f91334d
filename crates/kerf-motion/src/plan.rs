//! 插补计划
//!
//! 由一次运动请求和配置确定性地导出，算出后不再变化。比例相位
//! 的配额判定每拍从头重算（非增量），与冲刷相位共同保证两轴
//! 精确送满各自的目标步数。

use kerf_hal::{Axis, Direction};

use crate::{MotionConfig, MotionError};

/// 一次运动请求的执行计划
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterpolationPlan {
    /// 比例相位的总拍数；为 0 时全部脉冲走冲刷相位
    pub total_ticks: u64,
    pub steps_x: u64,
    pub steps_y: u64,
    pub dir_x: Direction,
    pub dir_y: Direction,
    /// 请求的进给速度，仅用于遥测展示
    pub feedrate: f64,
}

impl InterpolationPlan {
    /// 校验请求并计算计划
    ///
    /// 位移符号进入方向，绝对值进入步数目标。总拍数为
    /// `floor(物理行程 / 进给速度 × 节拍频率)`。
    pub fn compute(
        dx: i64,
        dy: i64,
        feedrate: f64,
        config: &MotionConfig,
    ) -> Result<Self, MotionError> {
        if !(feedrate > 0.0) {
            return Err(MotionError::InvalidFeedrate(feedrate));
        }

        let length = f64::hypot(
            dx as f64 * config.pulse_length,
            dy as f64 * config.pulse_length,
        );
        let total_ticks = (length / feedrate * config.tick_hz as f64).floor() as u64;

        Ok(Self {
            total_ticks,
            steps_x: dx.unsigned_abs(),
            steps_y: dy.unsigned_abs(),
            dir_x: Direction::from_delta(dx),
            dir_y: Direction::from_delta(dy),
            feedrate,
        })
    }

    pub fn steps(&self, axis: Axis) -> u64 {
        match axis {
            Axis::X => self.steps_x,
            Axis::Y => self.steps_y,
        }
    }

    pub fn direction(&self, axis: Axis) -> Direction {
        match axis {
            Axis::X => self.dir_x,
            Axis::Y => self.dir_y,
        }
    }

    /// 第 `tick` 拍（1 起始）某轴是否应发一个脉冲
    ///
    /// 判定规则：该拍的理想进度 `(tick/total_ticks)·steps` 达到或
    /// 超过已发数即发（非严格 ≥，平局发出）；已达目标的轴不再发。
    pub fn axis_due(&self, tick: u64, axis: Axis, emitted: u64) -> bool {
        let steps = self.steps(axis);
        if emitted >= steps {
            return false;
        }
        let ideal = tick as f64 / self.total_ticks as f64 * steps as f64;
        ideal >= emitted as f64
    }
}
