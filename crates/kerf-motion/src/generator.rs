//! 脉冲发生器
//!
//! 两相位执行：比例相位由专设的节拍线程按固定周期发脉冲，冲刷
//! 相位在节拍结束后把两轴补足到精确目标。端口在整个运动期间归
//! 节拍线程独占，前台只通过遥测原子量观察进度，任何相位都不在
//! 脉冲电平保持期间持锁。

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use kerf_hal::{Axis, Metronome, MotionPort};
use tracing::{debug, trace};

use crate::{InterpolationPlan, MotionConfig, MotionError, MotionTelemetry};

/// 两轴脉冲发生器
///
/// 同一时刻至多一个在途运动（`&mut self` 使请求严格串行）。
/// [`move_linear`](MotionGenerator::move_linear) 阻塞到两轴都送满
/// 目标步数才返回；参数错误的运动不发任何脉冲，线程级故障则使
/// 发生器失效（端口随故障线程丢失）。
pub struct MotionGenerator<P> {
    port: Option<P>,
    config: MotionConfig,
    telemetry: Arc<MotionTelemetry>,
}

impl<P: MotionPort + 'static> MotionGenerator<P> {
    pub fn new(port: P, config: MotionConfig) -> Self {
        Self {
            port: Some(port),
            config,
            telemetry: Arc::new(MotionTelemetry::default()),
        }
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    /// 观察进度用的遥测句柄
    pub fn telemetry(&self) -> Arc<MotionTelemetry> {
        Arc::clone(&self.telemetry)
    }

    /// 取回端口；发生器随之失效
    pub fn into_port(self) -> Option<P> {
        self.port
    }

    /// 阻塞执行一次直线插补运动
    ///
    /// X 轴走 `dx` 步、Y 轴走 `dy` 步（符号编码方向），两轴按各自
    /// 比例同步推进，同时到达终点。方向脚在该轴第一个脉冲之前
    /// 设定完毕。
    pub fn move_linear(&mut self, dx: i64, dy: i64, feedrate: f64) -> Result<(), MotionError> {
        let plan = InterpolationPlan::compute(dx, dy, feedrate, &self.config)?;
        let mut port = self.port.take().ok_or(MotionError::PortUnavailable)?;

        debug!(
            "Move begin: dx={} dy={} feedrate={} ticks={}",
            dx, dy, feedrate, plan.total_ticks
        );

        for axis in Axis::ALL {
            port.set_direction(axis, plan.direction(axis));
        }

        self.telemetry.begin(&plan);

        // 零拍运动没有比例相位，直接在前台冲刷
        if plan.total_ticks == 0 {
            flush_remaining(
                &mut port,
                &plan,
                &self.telemetry,
                [0, 0],
                self.config.flush_gap,
            );
            self.telemetry.finish();
            self.port = Some(port);
            return Ok(());
        }

        let telemetry = Arc::clone(&self.telemetry);
        let config = self.config;
        let handle = thread::Builder::new()
            .name("kerf-tick".into())
            .spawn(move || {
                tick_loop(&mut port, &plan, &telemetry, &config);
                port
            })?;

        // 有界轮询等待完成标志；节拍线程意外终止时跳出并上抛
        while !self.telemetry.is_complete() {
            if handle.is_finished() {
                break;
            }
            spin_sleep::sleep(self.config.poll_interval);
        }

        let port = handle.join().map_err(|_| MotionError::TickThreadPanicked)?;
        self.port = Some(port);

        debug!(
            "Move complete: {} + {} pulses delivered",
            plan.steps_x, plan.steps_y
        );
        Ok(())
    }
}

/// 比例相位与冲刷相位，在节拍线程上先后执行
///
/// 每拍对两轴独立做配额判定，到点的轴各发一个脉冲（同拍内
/// 背靠背，不要求同时）。拍循环结束后冲刷余量并发布完成标志。
fn tick_loop<P: MotionPort>(
    port: &mut P,
    plan: &InterpolationPlan,
    telemetry: &MotionTelemetry,
    config: &MotionConfig,
) {
    #[cfg(feature = "realtime")]
    raise_priority();

    let mut emitted = [0u64; 2];
    let mut metronome = Metronome::new(config.tick_period());

    for tick in 1..=plan.total_ticks {
        for axis in Axis::ALL {
            if plan.axis_due(tick, axis, emitted[axis.index()]) {
                port.pulse(axis);
                emitted[axis.index()] += 1;
                telemetry.record_pulse(axis);
            }
        }
        telemetry.record_tick();
        metronome.wait();
    }

    flush_remaining(port, plan, telemetry, emitted, config.flush_gap);
    telemetry.finish();
}

/// 冲刷相位：逐轴串行补足到精确目标，相邻脉冲保持固定间距
fn flush_remaining<P: MotionPort>(
    port: &mut P,
    plan: &InterpolationPlan,
    telemetry: &MotionTelemetry,
    mut emitted: [u64; 2],
    gap: Duration,
) {
    for axis in Axis::ALL {
        let target = plan.steps(axis);
        let missing = target - emitted[axis.index()];
        if missing > 0 {
            trace!("Flushing {} pulses on {:?}", missing, axis);
        }
        while emitted[axis.index()] < target {
            port.pulse(axis);
            emitted[axis.index()] += 1;
            telemetry.record_pulse(axis);
            spin_sleep::sleep(gap);
        }
    }
}

#[cfg(feature = "realtime")]
fn raise_priority() {
    use thread_priority::{ThreadPriority, set_current_thread_priority};

    if let Err(err) = set_current_thread_priority(ThreadPriority::Max) {
        tracing::warn!("Failed to raise tick thread priority: {:?}", err);
    }
}
