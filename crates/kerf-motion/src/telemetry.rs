//! 发生器遥测
//!
//! 节拍线程写、任意观察方读。计数器用 Relaxed 自增（单调且不会
//! 撕裂），完成标志用 Release 发布；以 Acquire 读到完成后，所有
//! 计数必定已是终值。前台的阻塞等待和 CLI 的进度显示都只经由
//! 这里观察运动状态。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use arc_swap::ArcSwapOption;
use kerf_hal::Axis;

use crate::InterpolationPlan;

/// 活动运动的形状：begin 时发布，运动期间不变
#[derive(Debug, Clone, Copy)]
struct MoveShape {
    steps_x: u64,
    steps_y: u64,
    total_ticks: u64,
    feedrate: f64,
}

/// 某一时刻的运动状态快照
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSnapshot {
    pub steps_x: u64,
    pub steps_y: u64,
    pub emitted_x: u64,
    pub emitted_y: u64,
    pub total_ticks: u64,
    pub ticks: u64,
    pub feedrate: f64,
    pub complete: bool,
}

impl MotionSnapshot {
    /// 两轴合计的完成比例，0.0 到 1.0
    pub fn progress(&self) -> f64 {
        let target = self.steps_x + self.steps_y;
        if target == 0 {
            return 1.0;
        }
        (self.emitted_x + self.emitted_y) as f64 / target as f64
    }
}

/// 脉冲发生器的共享遥测
#[derive(Debug, Default)]
pub struct MotionTelemetry {
    shape: ArcSwapOption<MoveShape>,
    pulses_x: AtomicU64,
    pulses_y: AtomicU64,
    ticks: AtomicU64,
    complete: AtomicBool,
}

impl MotionTelemetry {
    /// 发布新运动的形状并清零计数；在节拍线程启动前由前台调用
    pub(crate) fn begin(&self, plan: &InterpolationPlan) {
        self.complete.store(false, Ordering::Release);
        self.pulses_x.store(0, Ordering::Relaxed);
        self.pulses_y.store(0, Ordering::Relaxed);
        self.ticks.store(0, Ordering::Relaxed);
        self.shape.store(Some(Arc::new(MoveShape {
            steps_x: plan.steps_x,
            steps_y: plan.steps_y,
            total_ticks: plan.total_ticks,
            feedrate: plan.feedrate,
        })));
    }

    pub(crate) fn record_pulse(&self, axis: Axis) {
        let counter = match axis {
            Axis::X => &self.pulses_x,
            Axis::Y => &self.pulses_y,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn finish(&self) {
        self.complete.store(true, Ordering::Release);
    }

    /// 当前运动是否已完成（含冲刷相位）
    pub fn is_complete(&self) -> bool {
        self.complete.load(Ordering::Acquire)
    }

    /// 某轴已发出的脉冲数
    pub fn pulses(&self, axis: Axis) -> u64 {
        match axis {
            Axis::X => &self.pulses_x,
            Axis::Y => &self.pulses_y,
        }
        .load(Ordering::Relaxed)
    }

    /// 状态快照；尚未开始过任何运动时为 `None`
    pub fn snapshot(&self) -> Option<MotionSnapshot> {
        let shape = self.shape.load_full()?;
        Some(MotionSnapshot {
            steps_x: shape.steps_x,
            steps_y: shape.steps_y,
            emitted_x: self.pulses_x.load(Ordering::Relaxed),
            emitted_y: self.pulses_y.load(Ordering::Relaxed),
            total_ticks: shape.total_ticks,
            ticks: self.ticks.load(Ordering::Relaxed),
            feedrate: shape.feedrate,
            complete: self.is_complete(),
        })
    }
}
